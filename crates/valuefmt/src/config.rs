//! Formatter configuration files.
//!
//! A configuration maps attribute names to templates and optionally sets the
//! service URL:
//!
//! ```yaml
//! service_url: https://example.org/api
//! templates:
//!   name: "{{value|toUpper}}"
//!   description: "{{value|markdown}}"
//!   link: "{{serviceUrl}}/items/{{value|urlEncode}}"
//! ```
//!
//! YAML (`.yaml`, `.yml`) and JSON (`.json`) are accepted; the format is
//! picked from the file extension.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ConfigError, Result};
use crate::renderer::{validate_template, DEFAULT_VARIABLE};

/// Loaded formatter settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatterConfig {
    /// Substituted for `{{serviceUrl}}` after rendering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_url: Option<String>,

    /// Attribute name to template.
    #[serde(default)]
    pub templates: BTreeMap<String, String>,
}

impl FormatterConfig {
    /// Reads and parses a config file, choosing the parser by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase);

        let parse: fn(&str) -> Result<Self> = match extension.as_deref() {
            Some("yaml") | Some("yml") => Self::from_yaml_str,
            Some("json") => Self::from_json_str,
            _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
        };

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = parse(&content)?;
        debug!(
            path = %path.display(),
            templates = config.templates.len(),
            "loaded formatter config"
        );
        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Checks every template for unsupported filters. Stops at the first
    /// attribute (in name order) that has any.
    pub fn validate(&self) -> Result<()> {
        for (attribute, template) in &self.templates {
            validate_template(template, DEFAULT_VARIABLE).map_err(|source| {
                ConfigError::InvalidTemplate {
                    attribute: attribute.clone(),
                    source,
                }
            })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_yaml() {
        let config = FormatterConfig::from_yaml_str(
            "service_url: http://s\ntemplates:\n  name: \"{{value|toUpper}}\"\n",
        )
        .unwrap();
        assert_eq!(config.service_url.as_deref(), Some("http://s"));
        assert_eq!(config.templates["name"], "{{value|toUpper}}");
    }

    #[test]
    fn parses_json_with_defaults() {
        let config = FormatterConfig::from_json_str("{}").unwrap();
        assert_eq!(config, FormatterConfig::default());
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = FormatterConfig::from_yaml_str("serviceUrl: x\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn validate_names_the_attribute() {
        let mut config = FormatterConfig::default();
        config
            .templates
            .insert("a".into(), "{{value|toUpper}}".into());
        config.templates.insert("b".into(), "{{value|upper}}".into());

        match config.validate() {
            Err(ConfigError::InvalidTemplate { attribute, source }) => {
                assert_eq!(attribute, "b");
                assert_eq!(source.filters[0].name, "upper");
            }
            other => panic!("expected InvalidTemplate, got {:?}", other),
        }
    }
}
