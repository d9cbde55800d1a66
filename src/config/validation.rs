//! Construction-time configuration validation.
//!
//! # Responsibilities
//! - Reject missing or malformed parameters before any scheduling begins
//! - Parse the comma-separated port list
//! - Default the update frequency when omitted
//!
//! # Design Decisions
//! - Every failure here is fatal; the reconciliation loop never starts on a
//!   half-valid configuration

use thiserror::Error;

use crate::config::schema::{MirrorConfig, MirrorPaths, DEFAULT_UPDATE_FREQUENCY_SECS};
use crate::source::SourceConfig;

/// Fatal configuration error, raised before the engine is constructed.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No source descriptor was given.
    #[error("source_config required")]
    MissingSourceConfig,

    /// The source descriptor did not parse as a tagged payload.
    #[error("invalid source_config: {0}")]
    InvalidSourceConfig(#[from] serde_json::Error),

    /// No port list was given.
    #[error("ports required")]
    MissingPorts,

    /// A port list entry was not a valid port number.
    #[error("invalid port entry {entry:?}: {source}")]
    InvalidPort {
        entry: String,
        source: std::num::ParseIntError,
    },

    /// max_qps was zero.
    #[error("max_qps required")]
    MissingMaxQps,
}

/// Build a validated configuration from the raw construction parameters.
///
/// `ports` is a comma-separated list of integers, e.g. `"8080,8081"`.
/// A missing `update_frequency_secs` defaults silently; everything else is
/// required.
pub fn load_mirror_config(
    source_config: &str,
    ports: &str,
    max_qps: u32,
    update_frequency_secs: Option<u64>,
    paths: MirrorPaths,
) -> Result<(SourceConfig, MirrorConfig), ConfigError> {
    if source_config.trim().is_empty() {
        return Err(ConfigError::MissingSourceConfig);
    }
    let source: SourceConfig = serde_json::from_str(source_config)?;

    let ports = parse_ports(ports)?;
    if max_qps == 0 {
        return Err(ConfigError::MissingMaxQps);
    }

    let config = MirrorConfig {
        ports,
        max_qps,
        update_frequency_secs: update_frequency_secs.unwrap_or(DEFAULT_UPDATE_FREQUENCY_SECS),
        paths,
    };
    Ok((source, config))
}

/// Parse a comma-separated port list.
pub fn parse_ports(raw: &str) -> Result<Vec<u16>, ConfigError> {
    if raw.trim().is_empty() {
        return Err(ConfigError::MissingPorts);
    }
    raw.split(',')
        .map(|entry| {
            let entry = entry.trim();
            entry.parse::<u16>().map_err(|source| ConfigError::InvalidPort {
                entry: entry.to_string(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const STATIC_SOURCE: &str =
        r#"{"source_class": "static", "endpoints": [{"host": "10.0.0.5", "port": 9000}]}"#;

    #[test]
    fn test_parse_ports() {
        assert_eq!(parse_ports("8080,8081").unwrap(), vec![8080, 8081]);
        assert_eq!(parse_ports(" 8080 , 8081 ").unwrap(), vec![8080, 8081]);
        assert!(matches!(parse_ports(""), Err(ConfigError::MissingPorts)));
        assert!(matches!(
            parse_ports("8080,web"),
            Err(ConfigError::InvalidPort { .. })
        ));
    }

    #[test]
    fn test_load_valid_config() {
        let (source, config) =
            load_mirror_config(STATIC_SOURCE, "8080,8081", 100, None, MirrorPaths::default())
                .unwrap();
        assert!(matches!(source, SourceConfig::Static { .. }));
        assert_eq!(config.ports, vec![8080, 8081]);
        assert_eq!(config.max_qps, 100);
        assert_eq!(config.update_frequency_secs, DEFAULT_UPDATE_FREQUENCY_SECS);
    }

    #[test]
    fn test_update_frequency_override() {
        let (_, config) =
            load_mirror_config(STATIC_SOURCE, "8080", 100, Some(30), MirrorPaths::default())
                .unwrap();
        assert_eq!(config.update_frequency_secs, 30);
    }

    #[test]
    fn test_missing_source_config() {
        let err = load_mirror_config("", "8080", 100, None, MirrorPaths::default()).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSourceConfig));
    }

    #[test]
    fn test_malformed_source_config() {
        let err = load_mirror_config("{not json", "8080", 100, None, MirrorPaths::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSourceConfig(_)));
    }

    #[test]
    fn test_zero_max_qps() {
        let err = load_mirror_config(STATIC_SOURCE, "8080", 0, None, MirrorPaths::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingMaxQps));
    }
}
