use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use storyspin::config::Config;
use storyspin::generator::StoryGenerator;
use storyspin::illustrator::Illustrator;
use storyspin::imagegen::create_image_clients;
use storyspin::llm::create_text_client;
use storyspin::state::RunState;
use storyspin::story::Story;
use storyspin::wizard;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error loading config: {e}");
            eprintln!("Please ensure 'config.yml' exists with valid text provider settings.");
            return Err(e);
        }
    };
    config.ensure_directories()?;

    let preferences = wizard::collect_preferences()?;

    let text = create_text_client(&config)?;
    let (primary, secondary) = create_image_clients(&config.image);
    let illustrator = Illustrator::new(primary, secondary);
    let generator = std::sync::Arc::new(
        StoryGenerator::new(text, illustrator)
            .with_max_tokens(config.text.max_tokens)
            .with_page_delay(Duration::from_millis(config.page_delay_ms)),
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let progress = spawn_progress_bar(generator.subscribe());
    let story = generator.run(&preferences, &cancel).await;
    progress.await.ok();

    match story {
        Ok(story) => {
            let folder = write_story(&config.output_folder, &story)?;
            println!("\"{}\" saved to {}", story.title, folder.display());
            Ok(())
        }
        Err(e) => {
            eprintln!("Failed to create your story: {e:#}");
            Err(e)
        }
    }
}

/// Mirrors the generator's run state onto a terminal progress bar until the
/// run reaches a terminal state.
fn spawn_progress_bar(
    mut rx: tokio::sync::watch::Receiver<RunState>,
) -> tokio::task::JoinHandle<()> {
    let bar = ProgressBar::new(100);
    if let Ok(style) = ProgressStyle::with_template("{bar:40.cyan/blue} {percent:>3}% {msg}") {
        bar.set_style(style);
    }

    tokio::spawn(async move {
        loop {
            {
                let state = rx.borrow_and_update();
                bar.set_position((state.progress() * 100.0) as u64);
                bar.set_message(state.status().to_string());
                if state.is_terminal() {
                    break;
                }
            }
            if rx.changed().await.is_err() {
                break;
            }
        }
        bar.finish();
    })
}

/// Writes the story as story.json plus one PNG per illustrated page under
/// output_folder/story_<id>/.
fn write_story(output_folder: &str, story: &Story) -> Result<PathBuf> {
    let folder = Path::new(output_folder).join(format!("story_{}", story.id));
    fs::create_dir_all(&folder)
        .with_context(|| format!("Failed to create {}", folder.display()))?;

    let json = serde_json::to_string_pretty(story)?;
    fs::write(folder.join("story.json"), json).context("Failed to write story.json")?;

    for page in &story.pages {
        if let Some(data) = &page.image_data {
            let path = folder.join(format!("page_{}.png", page.page_number));
            fs::write(&path, data)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
    }

    info!("wrote {} pages to {}", story.pages.len(), folder.display());
    Ok(folder)
}
