//! Configuration validator
//!
//! Validates configuration values to ensure they are within acceptable ranges.

use super::loader::{CaptureConfig, Config, ConfigError, LoggingConfig};

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validates the entire configuration
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        Self::validate_capture(&config.capture)?;
        Self::validate_logging(&config.logging)?;
        Ok(())
    }

    /// Validates capture configuration
    fn validate_capture(capture: &CaptureConfig) -> Result<(), ConfigError> {
        // Must be a power of 2 for alignment
        if capture.read_chunk_size == 0 || !capture.read_chunk_size.is_power_of_two() {
            return Err(ConfigError::Invalid(
                "Read chunk size must be a power of 2".to_string(),
            ));
        }

        if capture.max_region_bytes != 0
            && capture.max_region_bytes < capture.read_chunk_size as u64
        {
            return Err(ConfigError::Invalid(
                "Maximum region size must be 0 (unlimited) or at least the read chunk size"
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Validates logging configuration
    fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
        let valid_levels = ["trace", "debug", "info", "warn", "error", "off"];
        if !valid_levels.contains(&logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::Invalid(format!(
                "Invalid log level: {}. Must be one of: {:?}",
                logging.level, valid_levels
            )));
        }

        Ok(())
    }
}

/// Validates a configuration
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    ConfigValidator::validate(config)
}
