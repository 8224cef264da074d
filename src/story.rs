use crate::preferences::Preferences;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A fully assembled story. Built once per successful generation run and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Story {
    pub id: Uuid,
    pub title: String,
    pub pages: Vec<StoryPage>,
    pub created_at: DateTime<Utc>,
    pub preferences: Preferences,
}

impl Story {
    pub fn new(title: String, pages: Vec<StoryPage>, preferences: Preferences) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            pages,
            created_at: Utc::now(),
            preferences,
        }
    }
}

/// One page of a story. `image_url` is set only when a remote generation
/// attempt produced the bytes; placeholder art has bytes but no URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoryPage {
    pub page_number: u32,
    pub text: String,
    pub image_url: Option<String>,
    // Exported as separate PNG files, not inlined into the story JSON.
    #[serde(skip)]
    pub image_data: Option<Vec<u8>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_story_json_omits_image_bytes() {
        let story = Story::new(
            "Theo's Magical Adventure".to_string(),
            vec![StoryPage {
                page_number: 1,
                text: "Once upon a time...".to_string(),
                image_url: Some("https://img.example/1.png".to_string()),
                image_data: Some(vec![1, 2, 3]),
            }],
            Preferences::default(),
        );

        let json = serde_json::to_string(&story).unwrap();
        assert!(json.contains("\"image_url\""));
        assert!(!json.contains("image_data"));
    }
}
