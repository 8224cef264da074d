use crate::illustrator::Illustrator;
use crate::llm::TextClient;
use crate::pages::{split_into_pages, PAGE_BREAK_MARKER, PAGE_COUNT};
use crate::preferences::{Genre, Preferences, Season};
use crate::state::RunState;
use crate::story::{Story, StoryPage};
use anyhow::{anyhow, bail, Result};
use log::{error, info};
use rand::seq::IndexedRandom;
use rand::Rng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

const SYSTEM_PROMPT: &str = "You are a creative children's story writer. Create engaging, \
    age-appropriate stories with vivid descriptions. Always end each page with [PAGE BREAK] \
    exactly as shown.";

/// Drives one end-to-end generation run: text generation, segmentation into
/// pages, per-page illustration resolution, story assembly. Publishes
/// progress through a watch channel and guards against overlapping runs.
pub struct StoryGenerator {
    text: Box<dyn TextClient>,
    illustrator: Illustrator,
    max_tokens: u32,
    page_delay: Duration,
    state: watch::Sender<RunState>,
    running: AtomicBool,
}

impl StoryGenerator {
    pub fn new(text: Box<dyn TextClient>, illustrator: Illustrator) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            text,
            illustrator,
            max_tokens: 2000,
            page_delay: Duration::from_millis(500),
            state,
            running: AtomicBool::new(false),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Pause between pages, to stay inside upstream provider rate limits.
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// Returns the run state to Idle. Call between runs, not during one.
    pub fn reset(&self) {
        self.state.send_replace(RunState::Idle);
    }

    /// Runs the full pipeline. Only the text-generation step can fail the
    /// run; illustration always degrades to placeholder art. A second call
    /// while a run is live is rejected without touching the run state.
    pub async fn run(
        &self,
        preferences: &Preferences,
        cancel: &CancellationToken,
    ) -> Result<Story> {
        if self.running.swap(true, Ordering::SeqCst) {
            bail!("a story generation run is already in progress");
        }

        let result = self.run_inner(preferences, cancel).await;
        match &result {
            Ok(story) => {
                self.state.send_replace(RunState::Completed(story.clone()));
            }
            Err(e) => {
                let message = format!("Failed to create your story: {e:#}");
                error!("{message}");
                // Keep the progress reached so far; subscribers must never
                // see the fraction go backwards.
                let progress = self.state.borrow().progress();
                self.state
                    .send_replace(RunState::Failed { message, progress });
            }
        }

        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_inner(
        &self,
        preferences: &Preferences,
        cancel: &CancellationToken,
    ) -> Result<Story> {
        self.update("Writing your adventure...", 0.0);
        self.check_cancelled(cancel)?;
        self.update("Writing your adventure...", 0.1);

        let story_text = self
            .text
            .complete(SYSTEM_PROMPT, &story_prompt(preferences), self.max_tokens)
            .await?;

        let name = preferences.display_name().to_string();
        let page_texts = split_into_pages(&story_text, &name);
        self.update("Story written! Creating illustrations...", 0.3);

        let total = page_texts.len();
        let mut pages = Vec::with_capacity(PAGE_COUNT);
        for (index, page_text) in page_texts.into_iter().enumerate() {
            self.check_cancelled(cancel)?;
            let page_number = (index + 1) as u32;
            self.update(
                &format!("Creating illustration {page_number} of {total}..."),
                0.3 + (index as f64 / total as f64) * 0.6,
            );

            let art = self.illustrator.resolve(&page_text, page_number, preferences).await;
            pages.push(StoryPage {
                page_number,
                text: page_text,
                image_url: art.url,
                image_data: art.data,
            });

            tokio::time::sleep(self.page_delay).await;
        }

        self.update("Finalizing your story...", 0.95);
        let title = generate_title(preferences, &mut rand::rng());
        let story = Story::new(title, pages, preferences.clone());
        info!("assembled story {} ({})", story.id, story.title);

        self.update("Your story is ready!", 1.0);
        Ok(story)
    }

    fn check_cancelled(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(anyhow!("story generation cancelled"));
        }
        Ok(())
    }

    fn update(&self, status: &str, progress: f64) {
        self.state.send_replace(RunState::InProgress {
            status: status.to_string(),
            progress,
        });
    }
}

/// User prompt assembled from every preference field plus the fixed
/// structural requirements.
pub fn story_prompt(preferences: &Preferences) -> String {
    let name = preferences.display_name();
    format!(
        "Create a captivating children's story with the following specifications:\n\
         \n\
         - Main character name: {name}\n\
         - Character age: {age}\n\
         - Gender: {gender}\n\
         - Genre: {genre}\n\
         - Setting season: {season}\n\
         - Video game reference: {game}\n\
         - Fashion style: {fashion}\n\
         \n\
         Requirements:\n\
         - Write exactly {count} pages of story content\n\
         - Each page should be 4-6 sentences long\n\
         - Include unique supporting character names\n\
         - Make it suspenseful and engaging\n\
         - Age-appropriate content for a {age} year old\n\
         - Include vivid visual descriptions for illustration\n\
         - End each page with exactly \"{marker}\" on a new line\n\
         - Make {name} the hero of the adventure\n\
         - Incorporate elements from {game} naturally into the story\n\
         \n\
         The story should be original and exciting, perfect for a young reader who loves \
         {genre} adventures!",
        age = preferences.child_age,
        gender = preferences.gender.label(),
        genre = preferences.genre.label(),
        season = preferences.season.label(),
        game = preferences.favorite_game,
        fashion = preferences.fashion_style.label(),
        count = PAGE_COUNT,
        marker = PAGE_BREAK_MARKER,
    )
}

/// Title assembled from the genre/season adjective maps and one of four
/// fixed templates. The caller supplies the randomness so tests can seed it.
pub fn generate_title<R: Rng + ?Sized>(preferences: &Preferences, rng: &mut R) -> String {
    let name = preferences.display_name();
    let genre_adj = genre_adjective(preferences.genre);
    let season_adj = season_adjective(preferences.season);

    let templates = [
        format!("{name}'s {genre_adj} Adventure"),
        format!("The {genre_adj} Quest of {name}"),
        format!("{name} and the {season_adj} {genre_adj} Mystery"),
        format!("{name}'s {season_adj} Journey"),
    ];

    templates
        .choose(rng)
        .cloned()
        .unwrap_or_else(|| format!("{name}'s Amazing Adventure"))
}

fn genre_adjective(genre: Genre) -> &'static str {
    match genre {
        Genre::SciFi => "Space",
        Genre::Fantasy => "Magical",
        Genre::Sports => "Championship",
        Genre::Fiction => "Amazing",
        Genre::Drama => "Heartwarming",
        Genre::Suspense => "Mysterious",
        Genre::KidFriendlyHorror => "Spooky",
    }
}

fn season_adjective(season: Season) -> &'static str {
    match season {
        Season::Spring => "Blooming",
        Season::Summer => "Sunny",
        Season::Fall => "Golden",
        Season::Winter => "Snowy",
    }
}
