use crate::story::Story;

/// Observable state of the single active generation run.
///
/// Idle -> InProgress (monotone progress) -> Completed | Failed.
/// Only the orchestrator mutates it; presentation layers subscribe through
/// the watch channel and render status/progress from snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RunState {
    #[default]
    Idle,
    InProgress {
        status: String,
        progress: f64,
    },
    Completed(Story),
    /// Terminal failure. Keeps the progress the run had reached so the
    /// fraction subscribers observe never regresses.
    Failed {
        message: String,
        progress: f64,
    },
}

impl RunState {
    pub fn progress(&self) -> f64 {
        match self {
            RunState::Idle => 0.0,
            RunState::InProgress { progress, .. } => *progress,
            RunState::Completed(_) => 1.0,
            RunState::Failed { progress, .. } => *progress,
        }
    }

    pub fn status(&self) -> &str {
        match self {
            RunState::Idle => "Ready to create your story",
            RunState::InProgress { status, .. } => status,
            RunState::Completed(_) => "Your story is ready!",
            RunState::Failed { .. } => "Story creation failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed(_) | RunState::Failed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_idle() {
        let state = RunState::default();
        assert_eq!(state, RunState::Idle);
        assert_eq!(state.progress(), 0.0);
        assert_eq!(state.status(), "Ready to create your story");
        assert!(!state.is_terminal());
    }

    #[test]
    fn test_terminal_states() {
        assert!(RunState::Failed {
            message: "boom".to_string(),
            progress: 0.3
        }
        .is_terminal());
        assert!(!RunState::InProgress {
            status: "Writing your adventure...".to_string(),
            progress: 0.1
        }
        .is_terminal());
    }

    #[test]
    fn test_failed_state_keeps_reached_progress() {
        let state = RunState::Failed {
            message: "boom".to_string(),
            progress: 0.66,
        };
        assert_eq!(state.progress(), 0.66);
        assert_eq!(state.status(), "Story creation failed");
    }
}
