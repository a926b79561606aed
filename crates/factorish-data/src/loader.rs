//! Reads rule files, resolves item names and builds the core's
//! `SimConfig` and `RecipeBook`.
//!
//! Provides format detection (RON/JSON/TOML), file discovery, and
//! deserialization helpers used by the loading pipeline.

use crate::schema::{ConfigData, ItemAmountData, MiningData, RecipeBookData, RecipeData};
use factorish_core::config::SimConfig;
use factorish_core::fixed::{Fixed64, f64_to_fixed64};
use factorish_core::id::ItemType;
use factorish_core::grid::MAX_WORLD_SIZE;
use factorish_core::recipe::{MAX_RECIPE_TIME, Recipe, RecipeBook};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// ===========================================================================
// Errors
// ===========================================================================

#[derive(Debug, thiserror::Error)]
pub enum DataLoadError {
    #[error("unsupported format for file: {file}")]
    UnsupportedFormat { file: PathBuf },

    /// Two files with the same base name but different formats exist.
    #[error("conflicting formats: {a} and {b}")]
    ConflictingFormats { a: PathBuf, b: PathBuf },

    #[error("parse error in {file}: {detail}")]
    Parse { file: PathBuf, detail: String },

    #[error("unknown item '{name}' in {file}")]
    UnresolvedItem { file: PathBuf, name: String },

    #[error("invalid value for {field} in {file}: {detail}")]
    InvalidValue {
        file: PathBuf,
        field: String,
        detail: String,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// ===========================================================================
// Format detection
// ===========================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Ron,
    Toml,
    Json,
}

pub fn detect_format(path: &Path) -> Result<Format, DataLoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("ron") => Ok(Format::Ron),
        Some("toml") => Ok(Format::Toml),
        Some("json") => Ok(Format::Json),
        _ => Err(DataLoadError::UnsupportedFormat {
            file: path.to_path_buf(),
        }),
    }
}

// ===========================================================================
// File discovery
// ===========================================================================

/// Scan `dir` for `{base_name}.ron`, `.toml` or `.json`.
///
/// Returns `Ok(None)` if no file is found, or `Err(ConflictingFormats)` if
/// more than one format exists for the same base name.
pub fn find_data_file(dir: &Path, base_name: &str) -> Result<Option<PathBuf>, DataLoadError> {
    let mut found: Option<PathBuf> = None;
    for ext in ["ron", "toml", "json"] {
        let candidate = dir.join(format!("{base_name}.{ext}"));
        if candidate.exists() {
            if let Some(existing) = found {
                return Err(DataLoadError::ConflictingFormats {
                    a: existing,
                    b: candidate,
                });
            }
            found = Some(candidate);
        }
    }
    Ok(found)
}

// ===========================================================================
// Deserialization
// ===========================================================================

/// Parse `content` in `format`. `file` is only used for error messages.
pub fn deserialize_str<T: DeserializeOwned>(content: &str, format: Format, file: &Path) -> Result<T, DataLoadError> {
    let parse_error = |detail: String| DataLoadError::Parse {
        file: file.to_path_buf(),
        detail,
    };
    match format {
        Format::Ron => ron::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string())),
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string())),
    }
}

/// Read a file and deserialize it according to its extension.
pub fn deserialize_file<T: DeserializeOwned>(path: &Path) -> Result<T, DataLoadError> {
    let format = detect_format(path)?;
    let content = std::fs::read_to_string(path)?;
    deserialize_str(&content, format, path)
}

// ===========================================================================
// Resolution
// ===========================================================================

/// Checks shared by every fractional field: finite, non-negative and,
/// for rates, at most one.
fn fraction(file: &Path, field: &str, value: f64, max: Option<f64>) -> Result<Fixed64, DataLoadError> {
    let invalid = |detail: String| DataLoadError::InvalidValue {
        file: file.to_path_buf(),
        field: field.to_string(),
        detail,
    };
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(format!("{value} is not a finite non-negative number")));
    }
    if let Some(max) = max
        && value > max
    {
        return Err(invalid(format!("{value} exceeds {max}")));
    }
    if Fixed64::checked_from_num(value).is_none() {
        return Err(invalid(format!("{value} is out of range")));
    }
    Ok(f64_to_fixed64(value))
}

pub fn resolve_config(data: &ConfigData, file: &Path) -> Result<SimConfig, DataLoadError> {
    let mut config = SimConfig::default();
    let set = |target: &mut Fixed64, field: &str, value: Option<f64>, max: Option<f64>| {
        if let Some(value) = value {
            *target = fraction(file, field, value, max)?;
        }
        Ok::<(), DataLoadError>(())
    };

    set(&mut config.fuel_energy, "fuel_energy", data.fuel_energy, None)?;
    set(&mut config.diffusion_rate, "diffusion_rate", data.diffusion_rate, Some(1.0))?;
    set(&mut config.well_pump_rate, "well_pump_rate", data.well_pump_rate, None)?;
    set(&mut config.item_hit_radius, "item_hit_radius", data.item_hit_radius, None)?;
    set(
        &mut config.steam_engine_max_power,
        "steam_engine_max_power",
        data.steam_engine_max_power,
        None,
    )?;
    set(&mut config.steam_per_tick, "steam_per_tick", data.steam_per_tick, None)?;
    set(&mut config.power_per_steam, "power_per_steam", data.power_per_steam, None)?;
    set(
        &mut config.assembler_max_electricity,
        "assembler_max_electricity",
        data.assembler_max_electricity,
        None,
    )?;
    set(
        &mut config.boiler_fluid_per_progress,
        "boiler_fluid_per_progress",
        data.boiler_fluid_per_progress,
        None,
    )?;
    set(&mut config.fluid_box_capacity, "fluid_box_capacity", data.fluid_box_capacity, None)?;

    if let Some(cooldown) = data.inserter_cooldown {
        config.inserter_cooldown = cooldown;
    }
    if let Some(radius) = data.power_radius {
        if radius < 0 || radius as u32 > MAX_WORLD_SIZE {
            return Err(DataLoadError::InvalidValue {
                file: file.to_path_buf(),
                field: "power_radius".to_string(),
                detail: format!("{radius} is outside 0..={MAX_WORLD_SIZE}"),
            });
        }
        config.power_radius = radius;
    }
    if let Some(capacity) = data.chest_capacity {
        config.chest_capacity = capacity;
    }
    if let Some(capacity) = data.player_capacity {
        config.player_capacity = capacity;
    }
    Ok(config)
}

fn resolve_amounts(amounts: &[ItemAmountData], file: &Path) -> Result<BTreeMap<ItemType, u32>, DataLoadError> {
    let mut resolved = BTreeMap::new();
    for amount in amounts {
        let item = ItemType::from_name(amount.item()).ok_or_else(|| DataLoadError::UnresolvedItem {
            file: file.to_path_buf(),
            name: amount.item().to_string(),
        })?;
        let count = resolved.entry(item).or_insert(0u32);
        *count = count.saturating_add(amount.count());
    }
    Ok(resolved)
}

fn recipe_time(file: &Path, field: &str, time: u32) -> Result<u32, DataLoadError> {
    if time > MAX_RECIPE_TIME {
        return Err(DataLoadError::InvalidValue {
            file: file.to_path_buf(),
            field: field.to_string(),
            detail: format!("{time} exceeds the longest cycle of {MAX_RECIPE_TIME}"),
        });
    }
    Ok(time)
}

pub fn resolve_recipe(data: &RecipeData, file: &Path) -> Result<Recipe, DataLoadError> {
    Ok(Recipe {
        inputs: resolve_amounts(&data.inputs, file)?,
        outputs: resolve_amounts(&data.outputs, file)?,
        time: recipe_time(file, "time", data.time)?,
        power_cost: fraction(file, "power_cost", data.power_cost, None)?,
    })
}

fn resolve_list(list: &[RecipeData], file: &Path) -> Result<Vec<Recipe>, DataLoadError> {
    list.iter().map(|data| resolve_recipe(data, file)).collect()
}

pub fn resolve_recipes(data: &RecipeBookData, file: &Path) -> Result<RecipeBook, DataLoadError> {
    let mut book = RecipeBook::default();
    if let Some(smelting) = &data.smelting {
        book.smelting = resolve_list(smelting, file)?;
    }
    if let Some(assembly) = &data.assembly {
        book.assembly = resolve_list(assembly, file)?;
    }
    if let Some(MiningData { time, power_cost }) = &data.mining {
        if let Some(time) = time {
            book.mining.time = recipe_time(file, "mining.time", *time)?;
        }
        if let Some(cost) = power_cost {
            book.mining.power_cost = fraction(file, "mining.power_cost", *cost, None)?;
        }
    }
    if let Some(boiling) = &data.boiling {
        book.boiling = resolve_recipe(boiling, file)?;
    }
    Ok(book)
}

// ===========================================================================
// Entry points
// ===========================================================================

/// Everything a world needs besides its map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameData {
    pub config: SimConfig,
    pub recipes: RecipeBook,
}

pub fn load_config(path: &Path) -> Result<SimConfig, DataLoadError> {
    let data: ConfigData = deserialize_file(path)?;
    resolve_config(&data, path)
}

pub fn load_recipes(path: &Path) -> Result<RecipeBook, DataLoadError> {
    let data: RecipeBookData = deserialize_file(path)?;
    resolve_recipes(&data, path)
}

/// Load `config.*` and `recipes.*` from `dir`. Either file may be missing,
/// in which case the stock rules are used for it.
pub fn load_game_data(dir: &Path) -> Result<GameData, DataLoadError> {
    let config = match find_data_file(dir, "config")? {
        Some(path) => load_config(&path)?,
        None => SimConfig::default(),
    };
    let recipes = match find_data_file(dir, "recipes")? {
        Some(path) => load_recipes(&path)?,
        None => RecipeBook::default(),
    };
    tracing::info!(
        dir = %dir.display(),
        smelting = recipes.smelting.len(),
        assembly = recipes.assembly.len(),
        "loaded game data"
    );
    Ok(GameData { config, recipes })
}

// ===========================================================================
// Tests
// ===========================================================================
