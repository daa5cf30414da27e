//! Template rendering: scan, filter, splice, resolve assignments.
//!
//! ## Two Passes
//!
//! **Pass 1 - Placeholders**: every `{{value|...}}` is replaced by its
//! pipeline result, literal text in between is copied as is.
//!
//! **Pass 2 - Assignments**: every bare `{{name}}` whose name was recorded by
//! an `assignTo` filter anywhere in the template is replaced by the assigned
//! value. This runs over the assembled output, so a reference may appear
//! before the placeholder that assigns it.
//!
//! ```text
//! Template: {{value|toUpper|assignTo:'id'}}: <a href="/x/{{id}}">{{value}}</a>
//! Value:    ab
//! Pass 1:   AB: <a href="/x/{{id}}">ab</a>
//! Pass 2:   AB: <a href="/x/AB">ab</a>
//! ```
//!
//! Rendering holds no state between calls and never fails: unsupported filters
//! and malformed placeholders degrade to pass-through.

use serde::Serialize;
use tracing::trace;

use crate::error::{UnsupportedFilter, ValidationError};
use crate::filter::{apply_pipeline, Assignments};
use crate::scanner::Scanner;

/// The substitution variable name used by [`render`].
pub const DEFAULT_VARIABLE: &str = "value";

/// Output of one render call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderResult {
    pub text: String,
    /// True if any placeholder in the template ran the `markdown` filter.
    pub markdown: bool,
}

/// Renders `template` with `value` bound to `{{value}}`.
///
/// ```rust
/// use valuefmt::render;
///
/// let result = render("Name: {{value|toUpper|append:'!'}}", "ok");
/// assert_eq!(result.text, "Name: OK!");
/// assert!(!result.markdown);
/// ```
pub fn render(template: &str, value: &str) -> RenderResult {
    render_with_variable(template, value, DEFAULT_VARIABLE)
}

/// Same as [`render`], with a caller-chosen variable name.
///
/// ```rust
/// use valuefmt::render_with_variable;
///
/// let result = render_with_variable("{{id|prepend:'#'}} {{value}}", "7", "id");
/// assert_eq!(result.text, "#7 {{value}}");
/// ```
pub fn render_with_variable(template: &str, value: &str, variable: &str) -> RenderResult {
    let mut assignments = Assignments::new();
    let mut output = String::with_capacity(template.len() + value.len());
    let mut markdown = false;
    let mut cursor = 0;
    let mut count = 0;

    for placeholder in Scanner::new(template, variable) {
        output.push_str(&template[cursor..placeholder.start]);
        let rendered = apply_pipeline(&placeholder.filters, value, &mut assignments);
        output.push_str(&rendered.value);
        markdown |= rendered.markdown;
        cursor = placeholder.end;
        count += 1;
    }
    output.push_str(&template[cursor..]);

    trace!(
        variable,
        placeholders = count,
        assignments = assignments.len(),
        markdown,
        "rendered template"
    );

    RenderResult {
        text: assignments.resolve(output),
        markdown,
    }
}

/// Checks that every filter used by `variable` placeholders in `template` is
/// supported.
///
/// Rendering tolerates unsupported filters; this is for catching typos when
/// templates are loaded.
///
/// ```rust
/// use valuefmt::validate_template;
///
/// assert!(validate_template("{{value|toUpper}}", "value").is_ok());
///
/// let err = validate_template("{{value|upper}}", "value").unwrap_err();
/// assert_eq!(err.filters[0].name, "upper");
/// ```
pub fn validate_template(template: &str, variable: &str) -> Result<(), ValidationError> {
    let filters: Vec<UnsupportedFilter> = Scanner::new(template, variable)
        .flat_map(|placeholder| {
            let offset = placeholder.start;
            placeholder
                .filters
                .into_iter()
                .filter(|f| !f.kind().is_supported())
                .map(move |f| UnsupportedFilter {
                    name: f.name,
                    offset,
                })
        })
        .collect();

    if filters.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { filters })
    }
}
