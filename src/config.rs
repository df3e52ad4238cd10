//! Upload configuration.
//!
//! Every key is optional; a missing key keeps its default.
//!
//! ```toml
//! max_errors_collected = 10
//! max_errors_reported = 5
//! csv_delimiter = ","
//! alert_at_or_above = "critical"
//!
//! [extra_aliases.oceanographic]
//! temperature = ["TEMP", "Water Temp"]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::ingestion::{ParseOptions, UploadSeverity};
use crate::mapping::MappingPolicy;
use crate::persistence::PersistLimits;

/// Errors raised while loading or validating [`UploadOptions`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config: {message}")]
    Invalid { message: String },
}

/// Tunables for [`crate::upload::UploadService`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct UploadOptions {
    /// Persistence stops once this many row errors have been collected.
    pub max_errors_collected: usize,
    /// How many of the collected errors are returned to the caller.
    pub max_errors_reported: usize,
    /// CSV field delimiter (single ASCII character).
    pub csv_delimiter: char,
    /// Fatal errors at or above this severity trigger `on_alert`.
    pub alert_at_or_above: UploadSeverity,
    /// Extra source column names, keyed by data type then document path.
    pub extra_aliases: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            max_errors_collected: 10,
            max_errors_reported: 5,
            csv_delimiter: ',',
            alert_at_or_above: UploadSeverity::Critical,
            extra_aliases: BTreeMap::new(),
        }
    }
}

impl UploadOptions {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let options: Self = toml::from_str(s)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_errors_collected == 0 || self.max_errors_reported == 0 {
            return Err(invalid("error caps must be at least 1"));
        }
        if self.max_errors_reported > self.max_errors_collected {
            return Err(invalid(format!(
                "max_errors_reported ({}) exceeds max_errors_collected ({})",
                self.max_errors_reported, self.max_errors_collected
            )));
        }
        if !self.csv_delimiter.is_ascii() {
            return Err(invalid(format!("csv_delimiter {:?} is not ASCII", self.csv_delimiter)));
        }
        Ok(())
    }

    /// Decoder options derived from these settings.
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            // validate() guarantees ASCII; fall back to ',' for unvalidated values.
            csv_delimiter: u8::try_from(self.csv_delimiter).unwrap_or(b','),
        }
    }

    pub fn persist_limits(&self) -> PersistLimits {
        PersistLimits {
            max_errors_collected: self.max_errors_collected,
        }
    }

    /// The standard mapping policy plus `extra_aliases`.
    pub fn mapping_policy(&self) -> Result<MappingPolicy, ConfigError> {
        MappingPolicy::standard().with_overrides(&self.extra_aliases)
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        message: message.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, UploadOptions};
    use crate::ingestion::UploadSeverity;
    use crate::records::RecordKind;

    #[test]
    fn empty_config_uses_defaults() {
        let options = UploadOptions::from_toml_str("").unwrap();
        assert_eq!(options, UploadOptions::default());
        assert_eq!(options.max_errors_collected, 10);
        assert_eq!(options.max_errors_reported, 5);
        assert_eq!(options.parse_options().csv_delimiter, b',');
    }

    #[test]
    fn parses_every_key() {
        let options = UploadOptions::from_toml_str(
            r#"
            max_errors_collected = 20
            max_errors_reported = 3
            csv_delimiter = ";"
            alert_at_or_above = "warning"

            [extra_aliases.oceanographic]
            temperature = ["TEMP"]
            "#,
        )
        .unwrap();
        assert_eq!(options.max_errors_collected, 20);
        assert_eq!(options.max_errors_reported, 3);
        assert_eq!(options.parse_options().csv_delimiter, b';');
        assert_eq!(options.alert_at_or_above, UploadSeverity::Warning);

        let policy = options.mapping_policy().unwrap();
        let rule = policy.rule(RecordKind::Oceanographic, "temperature").unwrap();
        assert_eq!(rule.aliases.last().map(String::as_str), Some("TEMP"));
    }

    #[test]
    fn rejects_inconsistent_caps() {
        let err = UploadOptions::from_toml_str("max_errors_collected = 2\nmax_errors_reported = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
        assert!(UploadOptions::from_toml_str("max_errors_collected = 0").is_err());
    }

    #[test]
    fn rejects_non_ascii_delimiter_and_unknown_keys() {
        assert!(matches!(
            UploadOptions::from_toml_str("csv_delimiter = \"§\""),
            Err(ConfigError::Invalid { .. })
        ));
        assert!(matches!(
            UploadOptions::from_toml_str("max_errors = 3"),
            Err(ConfigError::Toml(_))
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = UploadOptions::from_path("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
