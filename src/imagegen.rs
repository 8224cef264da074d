use crate::config::{ImageConfig, ImageProviderConfig};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Remote illustration provider: turns a prompt into a hosted image URL,
/// then fetches the bytes behind it.
#[async_trait]
pub trait ImageClient: Send + Sync + Debug {
    async fn generate(&self, prompt: &str) -> Result<String>;
    async fn download(&self, url: &str) -> Result<Vec<u8>>;
}

/// Builds the (primary, secondary) provider pair from config. Either slot
/// may be absent; the illustrator skips missing slots in its fallback chain.
pub fn create_image_clients(
    config: &ImageConfig,
) -> (Option<Box<dyn ImageClient>>, Option<Box<dyn ImageClient>>) {
    let build = |cfg: &ImageProviderConfig| -> Box<dyn ImageClient> {
        Box::new(RemoteImageClient::new(cfg, &config.size, &config.quality))
    };
    (
        config.primary.as_ref().map(build),
        config.secondary.as_ref().map(build),
    )
}

/// OpenRouter-style `images/generations` endpoint.
#[derive(Debug)]
pub struct RemoteImageClient {
    api_key: String,
    model: String,
    base_url: String,
    size: String,
    quality: String,
    client: reqwest::Client,
}

impl RemoteImageClient {
    pub fn new(cfg: &ImageProviderConfig, size: &str, quality: &str) -> Self {
        Self {
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.trim_end_matches('/').to_string(),
            size: size.to_string(),
            quality: quality.to_string(),
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct ImageGenerationRequest {
    model: String,
    prompt: String,
    size: String,
    quality: String,
    n: u32,
}

#[derive(Deserialize)]
struct ImageGenerationResponse {
    #[serde(default)]
    data: Vec<ImageData>,
}

#[derive(Deserialize)]
struct ImageData {
    url: Option<String>,
}

#[async_trait]
impl ImageClient for RemoteImageClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/images/generations", self.base_url);

        let request_body = ImageGenerationRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            size: self.size.clone(),
            quality: self.quality.clone(),
            n: 1,
        };

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("HTTP-Referer", "https://storyspin.example.com")
            .header("X-Title", "storyspin")
            .json(&request_body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let error_text = resp.text().await?;
            return Err(anyhow!("image generation API error: {}", error_text));
        }

        let result: ImageGenerationResponse = resp.json().await?;
        result
            .data
            .first()
            .and_then(|d| d.url.clone())
            .ok_or_else(|| anyhow!("no image URL received"))
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(anyhow!("image download failed: HTTP {}", resp.status()));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_response_parsing_success() {
        let json = r#"{
            "created": 1718400000,
            "data": [
                { "url": "https://img.example/generated/abc.png" },
                { "url": "https://img.example/generated/def.png" }
            ]
        }"#;

        let result: ImageGenerationResponse = serde_json::from_str(json).unwrap();
        assert_eq!(
            result.data.first().and_then(|d| d.url.as_deref()),
            Some("https://img.example/generated/abc.png")
        );
    }

    #[test]
    fn test_image_response_parsing_empty_data() {
        let result: ImageGenerationResponse = serde_json::from_str(r#"{"data": []}"#).unwrap();
        assert!(result.data.is_empty());

        // Some providers omit the field entirely on refusal.
        let result: ImageGenerationResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(result.data.is_empty());
    }

    #[test]
    fn test_image_request_shape() {
        let request = ImageGenerationRequest {
            model: "black-forest-labs/flux-1.1-pro".to_string(),
            prompt: "a friendly dragon".to_string(),
            size: "1024x1024".to_string(),
            quality: "standard".to_string(),
            n: 1,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["size"], "1024x1024");
        assert_eq!(json["n"], 1);
    }
}
