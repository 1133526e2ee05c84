use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use breach_core::Progression;

/// Reads progression settings (including the initial round parameters) from a TOML file.
///
/// Missing keys keep their defaults, no file at all means the stock game.
pub fn load_progression(path: Option<&Path>) -> Result<Progression> {
    let Some(path) = path else {
        return Ok(Progression::default());
    };

    let text = fs::read_to_string(path)
        .with_context(|| format!("Could not read config file {}", path.display()))?;
    let progression = parse_progression(&text)
        .with_context(|| format!("Invalid config file {}", path.display()))?;
    log::info!("Loaded settings from {}", path.display());
    Ok(progression)
}

fn parse_progression(text: &str) -> Result<Progression> {
    let progression: Progression = toml::from_str(text)?;
    progression.initial.validate()?;
    Ok(progression)
}
