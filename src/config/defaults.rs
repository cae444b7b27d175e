//! Default configuration values

use super::loader::Config;

/// Bytes requested per backend read while fingerprinting a region (64 KiB)
pub const DEFAULT_READ_CHUNK_SIZE: usize = 65536;

/// Regions larger than this are recorded unreadable instead of read;
/// 0 disables the limit (256 MiB)
pub const DEFAULT_MAX_REGION_BYTES: u64 = 268_435_456;

/// Default log level for the demo binary
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Returns the default configuration
pub fn default_config() -> Config {
    Config::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constants() {
        assert!(DEFAULT_READ_CHUNK_SIZE.is_power_of_two());
        assert!(DEFAULT_MAX_REGION_BYTES >= DEFAULT_READ_CHUNK_SIZE as u64);
        assert_eq!(DEFAULT_LOG_LEVEL, "info");
    }

    #[test]
    fn test_default_config() {
        let config = default_config();
        assert_eq!(config.capture.read_chunk_size, DEFAULT_READ_CHUNK_SIZE);
        assert_eq!(config.capture.max_region_bytes, DEFAULT_MAX_REGION_BYTES);
        assert_eq!(config.logging.level, DEFAULT_LOG_LEVEL);
    }

    #[test]
    fn test_serialization() {
        let config = default_config();
        let serialized = toml::to_string(&config).unwrap();
        assert!(serialized.contains("read_chunk_size"));
        assert!(serialized.contains("level"));

        let deserialized: Config = toml::from_str(&serialized).unwrap();
        assert_eq!(deserialized, config);
    }
}
