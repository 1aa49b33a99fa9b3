//! Configuration validation with range checks.

use crate::error::ConfigError;
use crate::types::SizeCap;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.engine.identify.is_empty() || self.engine.convert.is_empty() {
            return Err(ConfigError::ValidationError(
                "engine.identify and engine.convert must name a program".into(),
            ));
        }
        if !(1..=100).contains(&self.conversion.quality) {
            return Err(ConfigError::ValidationError(
                "conversion.quality must be between 1 and 100".into(),
            ));
        }
        if self.conversion.density == 0 {
            return Err(ConfigError::ValidationError(
                "conversion.density must be > 0".into(),
            ));
        }
        match self.conversion.size_cap {
            SizeCap::Area { max_area: 0 } => {
                return Err(ConfigError::ValidationError(
                    "conversion.size_cap.max_area must be > 0".into(),
                ));
            }
            SizeCap::Dimensions {
                max_width,
                max_height,
            } if max_width == 0 || max_height == 0 => {
                return Err(ConfigError::ValidationError(
                    "conversion.size_cap max_width/max_height must be > 0".into(),
                ));
            }
            _ => {}
        }
        if self.thumbnail.resolution == 0 {
            return Err(ConfigError::ValidationError(
                "thumbnail.resolution must be > 0".into(),
            ));
        }
        if let Some(q) = self.thumbnail.quality {
            if !(1..=100).contains(&q) {
                return Err(ConfigError::ValidationError(
                    "thumbnail.quality must be between 1 and 100".into(),
                ));
            }
        }
        if self.thumbnail.density == Some(0) {
            return Err(ConfigError::ValidationError(
                "thumbnail.density must be > 0".into(),
            ));
        }
        if self.processing.parallel_workers == 0 {
            return Err(ConfigError::ValidationError(
                "processing.parallel_workers must be > 0".into(),
            ));
        }
        Ok(())
    }
}
