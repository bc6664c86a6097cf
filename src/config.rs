//! Search configuration.
//!
//! Every field carries a serde default, so `{}` is a complete config file and
//! callers only spell out what they want to change.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Bounds on a single search call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Candidates kept per round (split evenly between the two tracks).
    #[serde(default = "default_beam_width")]
    pub beam_width: usize,
    /// Expansion rounds before giving up.
    #[serde(default = "default_max_steps")]
    pub max_steps: u32,
    /// Optional wall-clock budget in milliseconds.
    #[serde(default)]
    pub time_ms: Option<u64>,
}

fn default_beam_width() -> usize {
    100
}

fn default_max_steps() -> u32 {
    1000
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            beam_width: default_beam_width(),
            max_steps: default_max_steps(),
            time_ms: None,
        }
    }
}

/// Upper resource caps the escalation ladder may raise to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationCaps {
    #[serde(default = "default_cap")]
    pub max_plat: u32,
    #[serde(default = "default_cap")]
    pub max_guaranteed: u32,
}

fn default_cap() -> u32 {
    1
}

impl Default for EscalationCaps {
    fn default() -> Self {
        Self {
            max_plat: default_cap(),
            max_guaranteed: default_cap(),
        }
    }
}

/// Heuristic weights for ranking partial routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreWeights {
    #[serde(default = "w_continuity")]
    pub continuity: i64,
    #[serde(default = "w_target_banner")]
    pub target_banner: i64,
    #[serde(default = "w_primary_character")]
    pub primary_character: i64,
    #[serde(default = "w_limited_character")]
    pub limited_character: i64,
    #[serde(default = "w_top_rarity")]
    pub top_rarity: i64,
    #[serde(default = "w_second_rarity")]
    pub second_rarity: i64,
    #[serde(default = "w_progress_scale")]
    pub progress_scale: i64,
    /// Subtracted from every guaranteed-segment move.
    #[serde(default = "w_guaranteed_penalty")]
    pub guaranteed_penalty: i64,
    /// Greedy only: subtracted when the remaining distance has the wrong parity.
    #[serde(default = "w_parity_penalty")]
    pub parity_penalty: i64,
}

fn w_continuity() -> i64 {
    100
}
fn w_target_banner() -> i64 {
    50
}
fn w_primary_character() -> i64 {
    10_000
}
fn w_limited_character() -> i64 {
    500
}
fn w_top_rarity() -> i64 {
    2000
}
fn w_second_rarity() -> i64 {
    300
}
fn w_progress_scale() -> i64 {
    200
}
fn w_guaranteed_penalty() -> i64 {
    1000
}
fn w_parity_penalty() -> i64 {
    1000
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            continuity: w_continuity(),
            target_banner: w_target_banner(),
            primary_character: w_primary_character(),
            limited_character: w_limited_character(),
            top_rarity: w_top_rarity(),
            second_rarity: w_second_rarity(),
            progress_scale: w_progress_scale(),
            guaranteed_penalty: w_guaranteed_penalty(),
            parity_penalty: w_parity_penalty(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub limits: SearchLimits,
    #[serde(default)]
    pub caps: EscalationCaps,
    #[serde(default)]
    pub weights: ScoreWeights,
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.beam_width == 0 {
            return Err(ConfigError::Invalid("beam_width must be > 0".into()));
        }
        if self.limits.max_steps == 0 {
            return Err(ConfigError::Invalid("max_steps must be > 0".into()));
        }
        Ok(())
    }
}

/// Load and validate a JSON search config.
pub fn load_search_config<P: AsRef<Path>>(path: P) -> Result<SearchConfig, ConfigError> {
    let s = fs::read_to_string(path)?;
    let cfg: SearchConfig = serde_json::from_str(&s)?;
    cfg.validate()?;
    Ok(cfg)
}
