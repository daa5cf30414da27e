//! Error types.
//!
//! Rendering itself never fails. Errors only come from loading formatter
//! configuration and from explicit template validation.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// A filter invocation whose name is not a supported filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnsupportedFilter {
    /// The filter name as written.
    pub name: String,
    /// Byte offset of the enclosing placeholder.
    pub offset: usize,
}

impl fmt::Display for UnsupportedFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}' at byte {}", self.name, self.offset)
    }
}

/// Returned by [`validate_template`](crate::validate_template) when a template
/// uses filters that rendering would skip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported filter {}", join(.filters))]
pub struct ValidationError {
    pub filters: Vec<UnsupportedFilter>,
}

fn join(filters: &[UnsupportedFilter]) -> String {
    filters
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors raised while loading a [`FormatterConfig`](crate::FormatterConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    /// The file extension is none of `.yaml`, `.yml`, `.json`.
    #[error("unsupported config format: {} (expected .yaml, .yml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("template for attribute '{attribute}': {source}")]
    InvalidTemplate {
        attribute: String,
        #[source]
        source: ValidationError,
    },
}

/// Result type for configuration loading.
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_lists_every_filter() {
        let err = ValidationError {
            filters: vec![
                UnsupportedFilter {
                    name: "upper".into(),
                    offset: 0,
                },
                UnsupportedFilter {
                    name: "bold".into(),
                    offset: 12,
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "unsupported filter 'upper' at byte 0, 'bold' at byte 12"
        );
    }

    #[test]
    fn unsupported_format_names_the_file() {
        let err = ConfigError::UnsupportedFormat(PathBuf::from("fmt.toml"));
        assert!(err.to_string().contains("fmt.toml"));
    }
}
