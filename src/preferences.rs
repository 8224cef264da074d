use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of everything the wizard collects about the reader.
/// Consumed immutably by a generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    pub child_name: String,
    pub child_age: String,
    /// Overrides `child_name` everywhere the story refers to the child.
    #[serde(default)]
    pub nickname: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub genre: Genre,
    #[serde(default)]
    pub season: Season,
    #[serde(default)]
    pub favorite_game: String,
    #[serde(default)]
    pub fashion_style: FashionStyle,
}

impl Preferences {
    /// Name used in prompts, titles and placeholder art.
    pub fn display_name(&self) -> &str {
        if self.nickname.is_empty() {
            &self.child_name
        } else {
            &self.nickname
        }
    }

    /// Form-level message shown by the wizard. A run must not start while
    /// this returns Some.
    pub fn validation_message(&self) -> Option<&'static str> {
        if self.child_name.trim().is_empty() {
            return Some("Please enter your child's name");
        }
        if self.child_age.trim().is_empty() {
            return Some("Please enter your child's age");
        }
        None
    }

    pub fn is_valid(&self) -> bool {
        self.validation_message().is_none()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    #[default]
    Other,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Male",
            Gender::Female => "Female",
            Gender::Other => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    SciFi,
    #[default]
    Fantasy,
    Sports,
    Fiction,
    Drama,
    Suspense,
    KidFriendlyHorror,
}

impl Genre {
    pub const ALL: [Genre; 7] = [
        Genre::SciFi,
        Genre::Fantasy,
        Genre::Sports,
        Genre::Fiction,
        Genre::Drama,
        Genre::Suspense,
        Genre::KidFriendlyHorror,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Genre::SciFi => "Sci-fi",
            Genre::Fantasy => "Fantasy",
            Genre::Sports => "Sports",
            Genre::Fiction => "Fiction",
            Genre::Drama => "Drama",
            Genre::Suspense => "Suspense",
            Genre::KidFriendlyHorror => "Scary / Kid Friendly Horror",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    #[default]
    Spring,
    Summer,
    Fall,
    Winter,
}

impl Season {
    pub const ALL: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

    pub fn label(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Fall => "Fall",
            Season::Winter => "Winter",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FashionStyle {
    #[default]
    Casual,
    Sporty,
    Elegant,
    Trendy,
    Vintage,
    Bohemian,
}

impl FashionStyle {
    pub const ALL: [FashionStyle; 6] = [
        FashionStyle::Casual,
        FashionStyle::Sporty,
        FashionStyle::Elegant,
        FashionStyle::Trendy,
        FashionStyle::Vintage,
        FashionStyle::Bohemian,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FashionStyle::Casual => "Casual",
            FashionStyle::Sporty => "Sporty",
            FashionStyle::Elegant => "Elegant",
            FashionStyle::Trendy => "Trendy",
            FashionStyle::Vintage => "Vintage",
            FashionStyle::Bohemian => "Bohemian",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl fmt::Display for FashionStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_prefers_nickname() {
        let mut prefs = Preferences {
            child_name: "Amira".to_string(),
            ..Default::default()
        };
        assert_eq!(prefs.display_name(), "Amira");

        prefs.nickname = "Miri".to_string();
        assert_eq!(prefs.display_name(), "Miri");
    }

    #[test]
    fn test_validation_requires_name_and_age() {
        let mut prefs = Preferences::default();
        assert_eq!(
            prefs.validation_message(),
            Some("Please enter your child's name")
        );

        prefs.child_name = "  ".to_string();
        assert_eq!(
            prefs.validation_message(),
            Some("Please enter your child's name")
        );

        prefs.child_name = "Theo".to_string();
        assert_eq!(
            prefs.validation_message(),
            Some("Please enter your child's age")
        );

        prefs.child_age = "7".to_string();
        assert!(prefs.is_valid());
    }

    #[test]
    fn test_labels_are_fixed() {
        assert_eq!(Genre::SciFi.label(), "Sci-fi");
        assert_eq!(
            Genre::KidFriendlyHorror.label(),
            "Scary / Kid Friendly Horror"
        );
        assert_eq!(Season::Fall.label(), "Fall");
        assert_eq!(FashionStyle::Bohemian.to_string(), "Bohemian");
    }
}
