//! Configuration for leader election.

use thiserror::Error;

/// Invalid election configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// The area must be a positive, finite distance.
    #[error("Area must be positive and finite, got {0}")]
    InvalidArea(f64),
}

/// Network-wide election parameters.
///
/// Validation happens here, at setup time. The election itself trusts the
/// values it is given.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElectionConfig {
    /// Maximum distance within which a region keeps a single leader. Also
    /// the scale of the buffer band between regions.
    area: f64,
}

impl ElectionConfig {
    /// Create a config, rejecting non-positive or non-finite areas.
    pub fn new(area: f64) -> Result<Self, ConfigError> {
        if !area.is_finite() || area <= 0.0 {
            return Err(ConfigError::InvalidArea(area));
        }
        Ok(Self { area })
    }

    /// The configured area.
    pub fn area(&self) -> f64 {
        self.area
    }
}
