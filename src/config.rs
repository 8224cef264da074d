use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_output")]
    pub output_folder: String,

    pub text: TextConfig,

    #[serde(default)]
    pub image: ImageConfig,

    /// Pause between page illustrations, to stay inside upstream rate limits.
    #[serde(default = "default_page_delay_ms")]
    pub page_delay_ms: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TextConfig {
    pub provider: String, // "openrouter" or "ollama"
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    pub openrouter: Option<OpenRouterConfig>,
    pub ollama: Option<OllamaConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    #[serde(default = "default_openrouter_model")]
    pub model: String,
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_base_url")]
    pub base_url: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageConfig {
    pub primary: Option<ImageProviderConfig>,
    pub secondary: Option<ImageProviderConfig>,
    #[serde(default = "default_image_size")]
    pub size: String,
    #[serde(default = "default_image_quality")]
    pub quality: String,
}

// An absent `image:` section must carry the same size/quality defaults as a
// present-but-sparse one.
impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            primary: None,
            secondary: None,
            size: default_image_size(),
            quality: default_image_quality(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ImageProviderConfig {
    pub api_key: String,
    pub model: String,
    #[serde(default = "default_openrouter_base_url")]
    pub base_url: String,
}

fn default_output() -> String {
    "output".to_string()
}
fn default_page_delay_ms() -> u64 {
    500
}
fn default_max_tokens() -> u32 {
    2000
}
fn default_openrouter_model() -> String {
    "google/gemma-3-27b-it:free".to_string()
}
fn default_openrouter_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}
fn default_ollama_base_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_image_size() -> String {
    "1024x1024".to_string()
}
fn default_image_quality() -> String {
    "standard".to_string()
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Path::new("config.yml");
        if !path.exists() {
            anyhow::bail!("config.yml not found. Please create one.");
        }

        let content = fs::read_to_string(path).context("Failed to read config.yml")?;
        let config: Config =
            serde_yaml_ng::from_str(&content).context("Failed to parse config.yml")?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let content = serde_yaml_ng::to_string(self)?;
        fs::write("config.yml", content).context("Failed to write config.yml")?;
        Ok(())
    }

    pub fn ensure_directories(&self) -> Result<()> {
        fs::create_dir_all(&self.output_folder)?;
        Ok(())
    }
}
