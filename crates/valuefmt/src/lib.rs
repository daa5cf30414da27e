//! # valuefmt - Placeholder Filter Templates
//!
//! `valuefmt` formats a single value through a short template made of literal
//! text and `{{value|filter|...}}` placeholders. It is used to turn raw
//! attribute values into display text or inline HTML.
//!
//! ## Quick Start
//!
//! ```rust
//! use valuefmt::render;
//!
//! let result = render(
//!     "{{value|toUpper|assignTo:'code'}} - see {{value|prepend:'<https://x.test/'|append:'>'|markdown}} ({{code}})",
//!     "ab",
//! );
//! assert_eq!(
//!     result.text,
//!     "AB - see <a target=\"_blank\" href=\"https://x.test/ab\">https://x.test/ab</a> (AB)"
//! );
//! assert!(result.markdown);
//! ```
//!
//! ## Template Syntax
//!
//! ```text
//! {{ value ( | filter (:'param')* )* }}
//! ```
//!
//! | Filter | Effect |
//! |--------|--------|
//! | `markdown` | Render Markdown as inline HTML (no `<p>`, links open in a new tab) |
//! | `replace:'re':'with'` | Regex replace-all |
//! | `prepend:'text'` / `append:'text'` | Concatenate |
//! | `urlEncode` (`urlencode`) | Form-urlencode |
//! | `toLower` / `toUpper` | Change case |
//! | `assignTo:'name'` | Store the current value for bare `{{name}}` references |
//!
//! Unsupported filters and malformed placeholders never fail a render: the
//! filter is skipped with a warning, the placeholder stays literal text. Use
//! [`validate_template`] to catch them up front.
//!
//! ## Key Types
//!
//! - [`render`] / [`render_with_variable`]: the engine entry points
//! - [`RenderResult`]: rendered text plus whether Markdown was applied
//! - [`ValueFormatter`]: per-attribute templates with service URL substitution
//! - [`FormatterConfig`]: YAML/JSON configuration for a formatter
//! - [`Scanner`] / [`apply_pipeline`]: the lower level pieces
//!
//! Diagnostics go through [`tracing`]; this crate never installs a subscriber.

pub mod config;
pub mod error;
pub mod filter;
pub mod formatter;
pub mod markdown;
pub mod renderer;
pub mod scanner;

pub use config::FormatterConfig;
pub use error::{ConfigError, UnsupportedFilter, ValidationError};
pub use filter::{apply_pipeline, Assignments, FilterInvocation, FilterKind, PipelineOutput};
pub use formatter::{ContentType, FormattedValue, ValueFormatter, SERVICE_URL_TOKEN};
pub use markdown::to_inline_html;
pub use renderer::{
    render, render_with_variable, validate_template, RenderResult, DEFAULT_VARIABLE,
};
pub use scanner::{scan, Placeholder, Scanner};
