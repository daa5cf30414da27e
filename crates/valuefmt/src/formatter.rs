//! Attribute value formatting.
//!
//! [`ValueFormatter`] keeps one template per attribute and renders attribute
//! values through it. After rendering it substitutes the base service URL for
//! the literal `{{serviceUrl}}` token, which the engine leaves alone because
//! `serviceUrl` is not the substitution variable.
//!
//! ```rust
//! use valuefmt::{ContentType, ValueFormatter};
//!
//! let formatter = ValueFormatter::new()
//!     .with_service_url("https://example.org")
//!     .with_template("id", "{{serviceUrl}}/items/{{value|urlEncode}}")
//!     .with_template("name", "{{value|markdown}}");
//!
//! let id = formatter.format("id", "a/b");
//! assert_eq!(id.text, "https://example.org/items/a%2Fb");
//! assert_eq!(id.content_type.mime(), "text/plain");
//!
//! let name = formatter.format("name", "**Bob**");
//! assert_eq!(name.text, "<strong>Bob</strong>");
//! assert_eq!(name.content_type, ContentType::Html);
//!
//! let untouched = formatter.format("other", "x");
//! assert_eq!(untouched.text, "x");
//! assert_eq!(untouched.content_type, ContentType::Plain);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::config::FormatterConfig;
use crate::renderer::{render, RenderResult};

/// The token replaced with the configured service URL.
pub const SERVICE_URL_TOKEN: &str = "{{serviceUrl}}";

/// Content type of a formatted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Plain,
    Html,
}

impl ContentType {
    pub fn mime(&self) -> &'static str {
        match self {
            ContentType::Plain => "text/plain",
            ContentType::Html => "text/html",
        }
    }
}

/// A formatted attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedValue {
    pub text: String,
    pub content_type: ContentType,
}

impl From<RenderResult> for FormattedValue {
    fn from(result: RenderResult) -> Self {
        let content_type = if result.markdown {
            ContentType::Html
        } else {
            ContentType::Plain
        };
        Self {
            text: result.text,
            content_type,
        }
    }
}

/// Per-attribute templates plus an optional service URL.
#[derive(Debug, Clone, Default)]
pub struct ValueFormatter {
    templates: BTreeMap<String, String>,
    service_url: Option<String>,
}

impl ValueFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a formatter from loaded configuration.
    pub fn from_config(config: FormatterConfig) -> Self {
        Self {
            templates: config.templates,
            service_url: config.service_url,
        }
    }

    /// Sets the template for `attribute`, replacing any previous one.
    pub fn with_template(
        mut self,
        attribute: impl Into<String>,
        template: impl Into<String>,
    ) -> Self {
        self.templates.insert(attribute.into(), template.into());
        self
    }

    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        self.service_url = Some(url.into());
        self
    }

    pub fn template(&self, attribute: &str) -> Option<&str> {
        self.templates.get(attribute).map(String::as_str)
    }

    pub fn attributes(&self) -> impl Iterator<Item = &str> {
        self.templates.keys().map(String::as_str)
    }

    /// Formats `value` for `attribute`.
    ///
    /// Attributes without a template pass the value through as plain text.
    /// The service URL is substituted after rendering, so it is never seen by
    /// filters.
    pub fn format(&self, attribute: &str, value: &str) -> FormattedValue {
        let Some(template) = self.templates.get(attribute) else {
            return FormattedValue {
                text: value.to_string(),
                content_type: ContentType::Plain,
            };
        };

        let mut formatted = FormattedValue::from(render(template, value));
        if let Some(url) = &self.service_url {
            if formatted.text.contains(SERVICE_URL_TOKEN) {
                formatted.text = formatted.text.replace(SERVICE_URL_TOKEN, url);
            }
        }
        formatted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_attribute_passes_through() {
        let formatter = ValueFormatter::new().with_service_url("http://s");
        let out = formatter.format("x", "{{serviceUrl}}");
        assert_eq!(out.text, "{{serviceUrl}}");
        assert_eq!(out.content_type, ContentType::Plain);
    }

    #[test]
    fn service_url_substituted_after_rendering() {
        let formatter = ValueFormatter::new()
            .with_service_url("http://s/api")
            .with_template("link", "{{serviceUrl}}/items/{{value|urlEncode}}");
        let out = formatter.format("link", "a b");
        assert_eq!(out.text, "http://s/api/items/a+b");
        assert_eq!(out.content_type, ContentType::Plain);
    }

    #[test]
    fn service_url_token_kept_without_url() {
        let formatter =
            ValueFormatter::new().with_template("link", "{{serviceUrl}}/{{value}}");
        assert_eq!(formatter.format("link", "1").text, "{{serviceUrl}}/1");
    }

    #[test]
    fn markdown_gives_html_content_type() {
        let formatter = ValueFormatter::new()
            .with_service_url("http://s")
            .with_template("name", "{{value|markdown}} at {{serviceUrl}}");
        let out = formatter.format("name", "**b**");
        assert_eq!(out.content_type, ContentType::Html);
        assert_eq!(out.content_type.mime(), "text/html");
        assert_eq!(out.text, "<strong>b</strong> at http://s");
    }

    #[test]
    fn with_template_replaces_previous() {
        let formatter = ValueFormatter::new()
            .with_template("a", "1")
            .with_template("a", "2");
        assert_eq!(formatter.template("a"), Some("2"));
        assert_eq!(formatter.attributes().collect::<Vec<_>>(), ["a"]);
    }
}
