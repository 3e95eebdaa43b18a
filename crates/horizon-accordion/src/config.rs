//! Accordion configuration.
//!
//! [`AccordionConfig`] names the classes the widgets look for and apply, the
//! height transition, and the prefix used for generated fan groups. It is
//! stored in the document by [`install_with_config`](crate::install_with_config)
//! and can be loaded from TOML:
//!
//! ```
//! use horizon_accordion::AccordionConfig;
//!
//! let config = AccordionConfig::from_toml_str(r#"
//! title_class = "panel-title"
//! expand_transition = "height 150ms ease-out"
//! "#).unwrap();
//!
//! assert_eq!(config.title_class, "panel-title");
//! assert_eq!(config.body_class, "accordion-body");
//! ```

use std::path::{Path, PathBuf};

use horizon_accordion_core::Document;
use serde::{Deserialize, Serialize};

/// Class marking (or given to) the title region.
pub const DEFAULT_TITLE_CLASS: &str = "accordion-title";
/// Class marking (or given to) the body region.
pub const DEFAULT_BODY_CLASS: &str = "accordion-body";
/// Class added to an accordion while it is open.
pub const DEFAULT_OPEN_CLASS: &str = "open";
/// Transition applied to body heights.
pub const DEFAULT_EXPAND_TRANSITION: &str = "var(--accordion-expand-rate)";
/// Prefix of generated fan group labels.
pub const DEFAULT_FAN_GROUP_PREFIX: &str = "fan-";

/// Errors raised while loading an [`AccordionConfig`].
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("Failed to read accordion config {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The TOML was malformed or had fields of the wrong type.
    #[error("Invalid accordion config: {0}")]
    Parse(#[from] toml::de::Error),

    /// The configuration could not be written as TOML.
    #[error("Failed to serialize accordion config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Class names and styling used by the accordion widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AccordionConfig {
    /// Class of the title region.
    pub title_class: String,
    /// Class of the body region.
    pub body_class: String,
    /// Class toggled on the accordion itself while open.
    pub open_class: String,
    /// Height transition restored on the body after a reflow.
    pub expand_transition: String,
    /// Prefix of the group labels generated by fans.
    pub fan_group_prefix: String,
}

impl Default for AccordionConfig {
    fn default() -> Self {
        Self {
            title_class: DEFAULT_TITLE_CLASS.to_string(),
            body_class: DEFAULT_BODY_CLASS.to_string(),
            open_class: DEFAULT_OPEN_CLASS.to_string(),
            expand_transition: DEFAULT_EXPAND_TRANSITION.to_string(),
            fan_group_prefix: DEFAULT_FAN_GROUP_PREFIX.to_string(),
        }
    }
}

impl AccordionConfig {
    /// The configuration stored in `doc`, or the default one.
    pub fn for_document(doc: &Document) -> Self {
        doc.extension::<Self>().cloned().unwrap_or_default()
    }

    /// Parse a configuration from TOML. Missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Read a TOML configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&source)?;
        tracing::debug!(target: crate::targets::CONFIG, path = %path.display(), "loaded accordion config");
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string(self)?)
    }

    /// Set the title class.
    pub fn with_title_class(mut self, class: impl Into<String>) -> Self {
        self.title_class = class.into();
        self
    }

    /// Set the body class.
    pub fn with_body_class(mut self, class: impl Into<String>) -> Self {
        self.body_class = class.into();
        self
    }

    /// Set the open class.
    pub fn with_open_class(mut self, class: impl Into<String>) -> Self {
        self.open_class = class.into();
        self
    }

    /// Set the body height transition.
    pub fn with_expand_transition(mut self, transition: impl Into<String>) -> Self {
        self.expand_transition = transition.into();
        self
    }

    /// Set the fan group prefix.
    pub fn with_fan_group_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.fan_group_prefix = prefix.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_defaults() {
        let config = AccordionConfig::default();
        assert_eq!(config.title_class, "accordion-title");
        assert_eq!(config.body_class, "accordion-body");
        assert_eq!(config.open_class, "open");
        assert_eq!(config.expand_transition, "var(--accordion-expand-rate)");
        assert_eq!(config.fan_group_prefix, "fan-");
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(
            AccordionConfig::from_toml_str("").unwrap(),
            AccordionConfig::default()
        );
    }

    #[test]
    fn test_partial_toml() {
        let config = AccordionConfig::from_toml_str("open_class = \"expanded\"").unwrap();
        assert_eq!(config.open_class, "expanded");
        assert_eq!(config.title_class, DEFAULT_TITLE_CLASS);
    }

    #[test]
    fn test_wrong_type_is_parse_error() {
        let err = AccordionConfig::from_toml_str("open_class = 3").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_toml_output_reloads() {
        let config = AccordionConfig::default().with_fan_group_prefix("set-");
        let text = config.to_toml_string().unwrap();
        assert!(text.contains("fan_group_prefix = \"set-\""));
        assert_eq!(AccordionConfig::from_toml_str(&text).unwrap(), config);
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "body_class = \"content\"").unwrap();
        let config = AccordionConfig::from_file(file.path()).unwrap();
        assert_eq!(config.body_class, "content");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = AccordionConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
        assert!(err.to_string().contains("missing.toml"));
    }
}
