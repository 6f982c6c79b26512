//! Studio configuration read from the environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use storyboard_core::story::RenderSettings;
use storyboard_history::{DEFAULT_CAPACITY, HistoryConfig};

use crate::error::ConfigError;

/// Default directory of the file-backed store.
pub const DEFAULT_DATA_DIR: &str = "./storyboard-data";

/// Default number of scenes requested per storyboard.
pub const DEFAULT_SCENE_COUNT: u32 = 10;

/// Largest accepted history capacity.
pub const MAX_HISTORY_CAPACITY: usize = 10_000;

const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Everything the studio needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudioConfig {
    /// Directory of the file-backed key-value store.
    pub data_dir: PathBuf,
    /// History persistence quiet interval.
    pub persist_debounce: Duration,
    /// History capacity bound.
    pub history_capacity: usize,
    /// Scene count used for new requests.
    pub scene_count: u32,
    /// Initial render settings.
    pub render_settings: RenderSettings,
    /// Environment-provided credential.
    pub api_key: Option<String>,
}

impl Default for StudioConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            persist_debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            history_capacity: DEFAULT_CAPACITY,
            scene_count: DEFAULT_SCENE_COUNT,
            render_settings: RenderSettings::default(),
            api_key: None,
        }
    }
}

impl StudioConfig {
    /// Reads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a variable is set to an unusable
    /// value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if a variable is set to an unusable
    /// value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let debounce_ms: u64 = parse(&lookup, "STORYBOARD_PERSIST_DEBOUNCE_MS")?
            .unwrap_or(DEFAULT_DEBOUNCE_MS);
        let history_capacity = parse(&lookup, "STORYBOARD_HISTORY_CAPACITY")?
            .unwrap_or(defaults.history_capacity);
        if !(1..=MAX_HISTORY_CAPACITY).contains(&history_capacity) {
            return Err(invalid(
                "STORYBOARD_HISTORY_CAPACITY",
                format!("must be between 1 and {MAX_HISTORY_CAPACITY}"),
            ));
        }
        let scene_count =
            parse(&lookup, "STORYBOARD_SCENE_COUNT")?.unwrap_or(defaults.scene_count);
        if scene_count == 0 {
            return Err(invalid("STORYBOARD_SCENE_COUNT", "must be at least 1"));
        }

        let render_settings = RenderSettings {
            model: parse(&lookup, "STORYBOARD_MODEL")?
                .unwrap_or(defaults.render_settings.model),
            aspect_ratio: parse(&lookup, "STORYBOARD_ASPECT_RATIO")?
                .unwrap_or(defaults.render_settings.aspect_ratio),
            resolution: parse(&lookup, "STORYBOARD_RESOLUTION")?
                .unwrap_or(defaults.render_settings.resolution),
        };

        Ok(Self {
            data_dir: lookup("STORYBOARD_DATA_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map_or(defaults.data_dir, PathBuf::from),
            persist_debounce: Duration::from_millis(debounce_ms),
            history_capacity,
            scene_count,
            render_settings,
            api_key: lookup("API_KEY").filter(|key| !key.trim().is_empty()),
        })
    }

    /// History Store tunables derived from this configuration.
    #[must_use]
    pub fn history_config(&self) -> HistoryConfig {
        HistoryConfig {
            capacity: self.history_capacity,
            debounce: self.persist_debounce,
            ..HistoryConfig::default()
        }
    }
}

fn parse<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(var)
        .map(|raw| raw.trim().parse().map_err(|e: T::Err| invalid(var, e.to_string())))
        .transpose()
}

fn invalid(var: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.into(),
    }
}
