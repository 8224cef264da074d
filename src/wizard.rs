use crate::preferences::{FashionStyle, Gender, Genre, Preferences, Season};
use anyhow::Result;
use inquire::{Select, Text};

/// Walks the parent through every preference field. Required fields are
/// re-prompted until they pass validation, so the returned snapshot is
/// always safe to hand to the generator.
pub fn collect_preferences() -> Result<Preferences> {
    let child_name = required_text("Child's name:", "Please enter your child's name")?;
    let child_age = required_text("Child's age:", "Please enter your child's age")?;
    let nickname = Text::new("Nickname (optional):")
        .with_help_message("Used instead of the name when set")
        .prompt()?;

    let gender = Select::new("Gender:", Gender::ALL.to_vec()).prompt()?;
    let genre = Select::new("Favorite genre:", Genre::ALL.to_vec()).prompt()?;
    let season = Select::new("Favorite season:", Season::ALL.to_vec()).prompt()?;
    let favorite_game = Text::new("Favorite video game (optional):").prompt()?;
    let fashion_style = Select::new("Fashion style:", FashionStyle::ALL.to_vec()).prompt()?;

    let preferences = Preferences {
        child_name,
        child_age,
        nickname: nickname.trim().to_string(),
        gender,
        genre,
        season,
        favorite_game: favorite_game.trim().to_string(),
        fashion_style,
    };

    debug_assert!(preferences.is_valid());
    Ok(preferences)
}

fn required_text(prompt: &str, message: &str) -> Result<String> {
    loop {
        let value = Text::new(prompt).prompt()?;
        if !value.trim().is_empty() {
            return Ok(value.trim().to_string());
        }
        println!("{message}");
    }
}
