//! # World Configuration
//!
//! Loaded once at startup from the `[world]` table of the TOML config.
//!
//! ```toml
//! [world]
//! bounds = [20, 20, 20]
//! max_pipes = 4
//! seed = 42
//! death_curve = "identity"
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::grid::GridBounds;

/// Maps the grid fill ratio to the per-step kill probability of a long pipe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCurve {
    /// `p = used / total`.
    #[default]
    Identity,
    /// Pipes only die when boxed in.
    Disabled,
}

impl DeathCurve {
    /// Kill probability for a given fill ratio.
    #[inline]
    #[must_use]
    pub fn kill_probability(self, fill_ratio: f64) -> f64 {
        match self {
            Self::Identity => fill_ratio,
            Self::Disabled => 0.0,
        }
    }
}

/// Configuration for [`World`](crate::World).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorldConfig {
    /// Grid extent along X, Y and Z.
    pub bounds: [u32; 3],
    /// Maximum number of pipes ever spawned.
    pub max_pipes: u8,
    /// RNG seed. `None` lets the caller pick one.
    pub seed: Option<u64>,
    /// Death bias curve.
    pub death_curve: DeathCurve,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            bounds: [20, 20, 20],
            max_pipes: 4,
            seed: None,
            death_curve: DeathCurve::Identity,
        }
    }
}

impl WorldConfig {
    /// Parses a standalone `WorldConfig` from TOML.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] on malformed TOML or invalid values.
    pub fn from_toml_str(source: &str) -> SimResult<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| SimError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks every value.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBounds`] or [`SimError::InvalidConfig`].
    pub fn validate(&self) -> SimResult<()> {
        self.grid_bounds()?;
        if self.max_pipes == 0 {
            return Err(SimError::InvalidConfig(
                "max_pipes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Grid bounds described by this config.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidBounds`] for a zero or overflowing extent.
    pub fn grid_bounds(&self) -> SimResult<GridBounds> {
        let [x, y, z] = self.bounds;
        GridBounds::new(x, y, z)
    }
}
