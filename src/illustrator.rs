use crate::imagegen::ImageClient;
use crate::placeholder::{GradientPlaceholder, PlaceholderRenderer};
use crate::preferences::Preferences;
use anyhow::Result;
use log::{info, warn};

// Thematic nouns and adjectives worth surfacing to the image model.
const VISUAL_VOCABULARY: &[&str] = &[
    "forest", "castle", "dragon", "magic", "sword", "treasure", "mountain", "river", "cave",
    "bridge", "tower", "garden", "door", "window", "stairs", "path", "light", "dark", "bright",
    "colorful", "mysterious", "glowing", "sparkling",
];

const KEYWORD_FALLBACK: &str = "adventure scene";

/// Outcome of resolving one page's illustration. `url` is only set when a
/// remote provider produced the bytes; placeholder art carries bytes alone.
#[derive(Debug, Clone, Default)]
pub struct PageArt {
    pub url: Option<String>,
    pub data: Option<Vec<u8>>,
}

/// Resolves an illustration for each page through an ordered fallback chain:
/// primary provider, secondary provider, locally rendered placeholder.
/// Never returns an error; a page without any art just carries empty fields.
pub struct Illustrator {
    primary: Option<Box<dyn ImageClient>>,
    secondary: Option<Box<dyn ImageClient>>,
    placeholder: Box<dyn PlaceholderRenderer>,
}

impl Illustrator {
    pub fn new(
        primary: Option<Box<dyn ImageClient>>,
        secondary: Option<Box<dyn ImageClient>>,
    ) -> Self {
        Self {
            primary,
            secondary,
            placeholder: Box::new(GradientPlaceholder::default()),
        }
    }

    #[cfg(test)]
    pub fn with_placeholder(mut self, placeholder: Box<dyn PlaceholderRenderer>) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub async fn resolve(
        &self,
        page_text: &str,
        page_number: u32,
        preferences: &Preferences,
    ) -> PageArt {
        let prompt = illustration_prompt(page_text, page_number, preferences);

        if let Some(client) = &self.primary {
            match attempt(client.as_ref(), &prompt).await {
                Ok((url, data)) => {
                    info!("generated illustration for page {}", page_number);
                    return PageArt {
                        url: Some(url),
                        data: Some(data),
                    };
                }
                Err(e) => warn!(
                    "primary image generation failed for page {}: {:#}",
                    page_number, e
                ),
            }
        }

        if let Some(client) = &self.secondary {
            match attempt(client.as_ref(), &prompt).await {
                Ok((url, data)) => {
                    info!("alternative provider illustrated page {}", page_number);
                    return PageArt {
                        url: Some(url),
                        data: Some(data),
                    };
                }
                Err(e) => warn!(
                    "alternative image generation failed for page {}: {:#}",
                    page_number, e
                ),
            }
        }

        match self.placeholder.render(page_text, preferences) {
            Ok(data) => {
                info!("using placeholder image for page {}", page_number);
                PageArt {
                    url: None,
                    data: Some(data),
                }
            }
            Err(e) => {
                warn!("placeholder rendering failed for page {}: {:#}", page_number, e);
                PageArt::default()
            }
        }
    }
}

async fn attempt(client: &dyn ImageClient, prompt: &str) -> Result<(String, Vec<u8>)> {
    let url = client.generate(prompt).await?;
    let data = client.download(&url).await?;
    Ok((url, data))
}

/// Up to three vocabulary words found in the page text, in order of
/// appearance, or a generic fallback phrase when nothing matches.
pub fn extract_visual_keywords(text: &str) -> String {
    let lowered = text.to_lowercase();
    let found: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|word| VISUAL_VOCABULARY.contains(word))
        .take(3)
        .collect();

    if found.is_empty() {
        KEYWORD_FALLBACK.to_string()
    } else {
        found.join(", ")
    }
}

/// The scene half of the prompt: what this particular page shows.
fn scene_prompt(page_text: &str, page_number: u32, name: &str) -> String {
    let excerpt: String = page_text.chars().take(100).collect();
    let keywords = extract_visual_keywords(page_text);
    format!(
        "Page {page_number} of children's book featuring {name}.\n\
         Scene description: {excerpt}...\n\
         Visual focus: {keywords}\n\
         Character: {name} as the main character in this scene.\n\
         Style: Consistent character appearance across all illustrations."
    )
}

/// Full prompt sent to the image providers: the scene wrapped in the fixed
/// character, season, style and content-safety directives.
pub fn illustration_prompt(page_text: &str, page_number: u32, preferences: &Preferences) -> String {
    let name = preferences.display_name();
    let scene = scene_prompt(page_text, page_number, name);
    format!(
        "Children's book illustration, high quality digital art.\n\
         Scene: {scene}\n\
         Main character: {name}, age {age}, {gender}, wearing {fashion} style clothing.\n\
         Setting: {season} atmosphere and mood.\n\
         Style: Warm, colorful, friendly cartoon illustration suitable for children's books.\n\
         Elements: Include subtle references to {game} in the background or details.\n\
         Quality: Professional children's book illustration, vibrant colors, engaging composition.\n\
         Avoid: Dark themes, scary elements, inappropriate content.",
        age = preferences.child_age,
        gender = preferences.gender.label().to_lowercase(),
        fashion = preferences.fashion_style.label().to_lowercase(),
        season = preferences.season.label(),
        game = preferences.favorite_game,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug)]
    struct MockImageClient {
        label: &'static str,
        generate_fails: bool,
        download_fails: bool,
        calls: Arc<AtomicUsize>,
    }

    impl MockImageClient {
        fn ok(label: &'static str) -> Self {
            Self {
                label,
                generate_fails: false,
                download_fails: false,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing(label: &'static str) -> Self {
            Self {
                generate_fails: true,
                ..Self::ok(label)
            }
        }
    }

    #[async_trait]
    impl ImageClient for MockImageClient {
        async fn generate(&self, _prompt: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.generate_fails {
                Err(anyhow!("mock generate error"))
            } else {
                Ok(format!("https://img.example/{}.png", self.label))
            }
        }

        async fn download(&self, url: &str) -> Result<Vec<u8>> {
            if self.download_fails {
                Err(anyhow!("mock download error"))
            } else {
                Ok(url.as_bytes().to_vec())
            }
        }
    }

    fn prefs() -> Preferences {
        Preferences {
            child_name: "Mira".to_string(),
            child_age: "7".to_string(),
            favorite_game: "Starfall Racers".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_primary_success_short_circuits() {
        let primary = MockImageClient::ok("primary");
        let secondary = MockImageClient::ok("secondary");
        let secondary_calls = secondary.calls.clone();

        let illustrator = Illustrator::new(Some(Box::new(primary)), Some(Box::new(secondary)));
        let art = illustrator.resolve("A castle by the river.", 1, &prefs()).await;

        assert_eq!(art.url.as_deref(), Some("https://img.example/primary.png"));
        assert_eq!(
            art.data.as_deref(),
            Some("https://img.example/primary.png".as_bytes())
        );
        assert_eq!(secondary_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_primary_failure_falls_back_to_secondary() {
        let primary = MockImageClient::failing("primary");
        let secondary = MockImageClient::ok("secondary");

        let illustrator = Illustrator::new(Some(Box::new(primary)), Some(Box::new(secondary)));
        let art = illustrator.resolve("A dark cave.", 2, &prefs()).await;

        assert_eq!(art.url.as_deref(), Some("https://img.example/secondary.png"));
        assert!(art.data.is_some());
    }

    #[tokio::test]
    async fn test_download_failure_counts_as_provider_failure() {
        let primary = MockImageClient {
            download_fails: true,
            ..MockImageClient::ok("primary")
        };
        let secondary = MockImageClient::ok("secondary");

        let illustrator = Illustrator::new(Some(Box::new(primary)), Some(Box::new(secondary)));
        let art = illustrator.resolve("A glowing bridge.", 3, &prefs()).await;

        assert_eq!(art.url.as_deref(), Some("https://img.example/secondary.png"));
    }

    #[tokio::test]
    async fn test_all_remote_failures_yield_placeholder_without_url() {
        let primary = MockImageClient::failing("primary");
        let secondary = MockImageClient::failing("secondary");

        let illustrator = Illustrator::new(Some(Box::new(primary)), Some(Box::new(secondary)));
        let art = illustrator.resolve("A sparkling tower.", 4, &prefs()).await;

        assert!(art.url.is_none());
        let data = art.data.expect("placeholder bytes");
        assert_eq!(&data[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[tokio::test]
    async fn test_no_providers_configured_still_yields_placeholder() {
        let illustrator = Illustrator::new(None, None);
        let art = illustrator.resolve("A quiet garden.", 5, &prefs()).await;
        assert!(art.url.is_none());
        assert!(art.data.is_some());
    }

    #[derive(Debug)]
    struct BrokenRenderer;

    impl PlaceholderRenderer for BrokenRenderer {
        fn render(&self, _page_text: &str, _preferences: &Preferences) -> Result<Vec<u8>> {
            Err(anyhow!("mock render error"))
        }
    }

    #[tokio::test]
    async fn test_total_failure_leaves_page_artless_but_does_not_error() {
        let illustrator =
            Illustrator::new(None, None).with_placeholder(Box::new(BrokenRenderer));
        let art = illustrator.resolve("A page.", 1, &prefs()).await;
        assert!(art.url.is_none());
        assert!(art.data.is_none());
    }

    #[test]
    fn test_keyword_extraction_matches_whole_words() {
        let keywords =
            extract_visual_keywords("The Dragon guarded a dark, GLOWING treasure near the castle!");
        assert_eq!(keywords, "dragon, dark, glowing");
    }

    #[test]
    fn test_keyword_extraction_fallback() {
        assert_eq!(
            extract_visual_keywords("Nothing thematic happens here."),
            "adventure scene"
        );
    }

    #[test]
    fn test_keyword_extraction_ignores_substrings() {
        // "forestry" must not match "forest".
        assert_eq!(extract_visual_keywords("Forestry is a job."), "adventure scene");
    }

    #[test]
    fn test_illustration_prompt_carries_preference_fields() {
        let prompt = illustration_prompt("Mira crossed the bridge.", 2, &prefs());
        assert!(prompt.contains("Page 2 of children's book featuring Mira."));
        assert!(prompt.contains("Visual focus: bridge"));
        assert!(prompt.contains("age 7"));
        assert!(prompt.contains("Starfall Racers"));
        assert!(prompt.contains("Avoid: Dark themes, scary elements, inappropriate content."));
    }
}
