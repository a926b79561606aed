//! Loads simulation rules for `factorish-core` from RON, TOML or JSON files.

pub mod loader;
pub mod schema;

pub use loader::{DataLoadError, GameData, load_config, load_game_data, load_recipes};
