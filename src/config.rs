//! Runtime configuration from `CIRCLEFIT_*` environment variables.
//!
//! Every knob has a typed default. A value that is present but does not
//! parse falls back to the default with a warning rather than aborting
//! startup.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

use plane::engine::EngineConfig;
use plane::store::DEFAULT_SCENE_PATH;
use tracing::warn;

pub const DEFAULT_SEED_POINTS: usize = 10;
pub const DEFAULT_WIDTH: u32 = 1280;
pub const DEFAULT_HEIGHT: u32 = 800;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub scene_path: PathBuf,
    pub seed_points: usize,
    pub rng_seed: Option<u64>,
    pub font_path: Option<PathBuf>,
    /// Initial inner size in logical pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            scene_path: PathBuf::from(DEFAULT_SCENE_PATH),
            seed_points: DEFAULT_SEED_POINTS,
            rng_seed: None,
            font_path: None,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

impl AppConfig {
    /// Read configuration from the process environment.
    ///
    /// - `CIRCLEFIT_SCENE_PATH`: scene file for save/load (default `resources/conf.json`)
    /// - `CIRCLEFIT_SEED_POINTS`: random points in the first scene (default 10)
    /// - `CIRCLEFIT_RNG_SEED`: fixed RNG seed (default: OS entropy)
    /// - `CIRCLEFIT_FONT_PATH`: TTF/OTF for labels (default: none, text disabled)
    /// - `CIRCLEFIT_WIDTH`, `CIRCLEFIT_HEIGHT`: window size (default 1280 x 800)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            scene_path: non_empty("CIRCLEFIT_SCENE_PATH").map_or(defaults.scene_path, PathBuf::from),
            seed_points: parse_or(non_empty("CIRCLEFIT_SEED_POINTS"), "CIRCLEFIT_SEED_POINTS", defaults.seed_points),
            rng_seed: non_empty("CIRCLEFIT_RNG_SEED").and_then(|raw| parse_opt(&raw, "CIRCLEFIT_RNG_SEED")),
            font_path: non_empty("CIRCLEFIT_FONT_PATH").map(PathBuf::from),
            width: positive_or(non_empty("CIRCLEFIT_WIDTH"), "CIRCLEFIT_WIDTH", defaults.width),
            height: positive_or(non_empty("CIRCLEFIT_HEIGHT"), "CIRCLEFIT_HEIGHT", defaults.height),
        }
    }

    #[must_use]
    pub fn engine(&self) -> EngineConfig {
        EngineConfig { scene_path: self.scene_path.clone(), seed_points: self.seed_points, rng_seed: self.rng_seed }
    }
}

fn parse_opt<T: FromStr>(raw: &str, key: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            warn!(key, value = raw, "invalid value ignored");
            None
        }
    }
}

fn parse_or<T>(raw: Option<String>, key: &str, default: T) -> T
where
    T: FromStr + Copy + Display,
{
    match raw {
        None => default,
        Some(raw) => parse_opt(&raw, key).unwrap_or_else(|| {
            warn!(key, %default, "using default");
            default
        }),
    }
}

fn positive_or(raw: Option<String>, key: &str, default: u32) -> u32 {
    match parse_or(raw, key, default) {
        0 => {
            warn!(key, default, "zero size, using default");
            default
        }
        v => v,
    }
}
