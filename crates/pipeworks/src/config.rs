//! # Application Configuration
//!
//! One TOML file, loaded once at startup:
//!
//! ```toml
//! [world]
//! bounds = [20, 20, 20]
//! max_pipes = 4
//! seed = 42
//! death_curve = "identity"
//!
//! [render]
//! initial_capacity = 128
//! tick_interval_secs = 0.25
//! ```
//!
//! Every key is optional; missing keys take their defaults. Unknown keys are
//! rejected so typos do not pass silently.

use std::path::Path;

use pipeworks_core::WorldConfig;
use pipeworks_rendering::RenderLoopConfig;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// The whole config file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Simulation settings.
    pub world: WorldConfig,
    /// Frame loop and instance storage settings.
    pub render: RenderLoopConfig,
}

impl AppConfig {
    /// Parses and validates a config from TOML text.
    ///
    /// # Errors
    ///
    /// [`AppError::Parse`] for malformed TOML, or the validation error of the
    /// offending section.
    pub fn from_toml_str(source: &str) -> AppResult<Self> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a config file.
    ///
    /// # Errors
    ///
    /// [`AppError::Io`] if the file cannot be read, then as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| AppError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::info!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// Checks both sections.
    ///
    /// # Errors
    ///
    /// The first section's validation error.
    pub fn validate(&self) -> AppResult<()> {
        self.world.validate()?;
        self.render.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipeworks_core::DeathCurve;

    #[test]
    fn test_empty_file_is_default() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.world.bounds, [20, 20, 20]);
        assert_eq!(config.render.initial_capacity, 128);
    }

    #[test]
    fn test_parse_sections() {
        let config = AppConfig::from_toml_str(
            r#"
            [world]
            bounds = [4, 5, 6]
            max_pipes = 2
            seed = 7
            death_curve = "disabled"

            [render]
            initial_capacity = 16
            tick_interval_secs = 0.5
            "#,
        )
        .unwrap();

        assert_eq!(config.world.bounds, [4, 5, 6]);
        assert_eq!(config.world.seed, Some(7));
        assert_eq!(config.world.death_curve, DeathCurve::Disabled);
        assert_eq!(config.render.initial_capacity, 16);
        assert!((config.render.tick_interval_secs - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_unknown_keys_and_bad_values() {
        assert!(matches!(
            AppConfig::from_toml_str("[world]\ncolour = 1\n"),
            Err(AppError::Parse(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[audio]\n"),
            Err(AppError::Parse(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[world]\nmax_pipes = 0\n"),
            Err(AppError::Simulation(_))
        ));
        assert!(matches!(
            AppConfig::from_toml_str("[render]\ninitial_capacity = 0\n"),
            Err(AppError::Render(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = AppConfig::load("/nonexistent/pipeworks.toml").unwrap_err();
        assert!(matches!(err, AppError::Io { .. }));
    }
}
