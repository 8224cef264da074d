pub mod config;
pub mod generator;
pub mod illustrator;
pub mod imagegen;
pub mod llm;
pub mod pages;
pub mod placeholder;
pub mod preferences;
pub mod state;
pub mod story;
pub mod wizard;
