//! Filter registry and pipeline execution.
//!
//! A placeholder such as `{{value | toUpper | append:'!'}}` carries an ordered
//! list of [`FilterInvocation`]s. [`apply_pipeline`] threads the substitution
//! value through them left to right.
//!
//! ## Supported Filters
//!
//! | Name | Parameters | Effect |
//! |------|------------|--------|
//! | `markdown` | - | Markdown rendered to inline HTML |
//! | `replace` | pattern, replacement | Regex replace-all |
//! | `prepend` | text | `text + value` |
//! | `append` | text | `value + text` |
//! | `urlEncode` / `urlencode` | - | Form-urlencoded (UTF-8) |
//! | `toLower` | - | Lower-case |
//! | `toUpper` | - | Upper-case |
//! | `assignTo` | name | Value unchanged; stored for `{{name}}` references |
//!
//! Anything else is logged and leaves the value unchanged. A filter given too
//! few parameters is a no-op for that step.

use std::collections::BTreeMap;

use regex::Regex;
use tracing::{debug, warn};

use crate::markdown;

/// The closed set of filter behaviours, resolved from a filter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Markdown,
    Replace,
    Prepend,
    Append,
    UrlEncode,
    ToLower,
    ToUpper,
    AssignTo,
    /// Any name outside the supported set. Behaves as a no-op.
    Unsupported,
}

impl FilterKind {
    /// Every supported kind, in documentation order.
    pub const ALL: [FilterKind; 8] = [
        FilterKind::Markdown,
        FilterKind::Replace,
        FilterKind::Prepend,
        FilterKind::Append,
        FilterKind::UrlEncode,
        FilterKind::ToLower,
        FilterKind::ToUpper,
        FilterKind::AssignTo,
    ];

    /// Resolves a filter name as written in a template.
    ///
    /// Names are case-sensitive. `urlencode` is accepted as an alias of
    /// `urlEncode`.
    ///
    /// ```rust
    /// use valuefmt::FilterKind;
    ///
    /// assert_eq!(FilterKind::parse("toUpper"), FilterKind::ToUpper);
    /// assert_eq!(FilterKind::parse("urlencode"), FilterKind::UrlEncode);
    /// assert_eq!(FilterKind::parse("upper"), FilterKind::Unsupported);
    /// ```
    pub fn parse(name: &str) -> Self {
        match name {
            "markdown" => FilterKind::Markdown,
            "replace" => FilterKind::Replace,
            "prepend" => FilterKind::Prepend,
            "append" => FilterKind::Append,
            "urlEncode" | "urlencode" => FilterKind::UrlEncode,
            "toLower" => FilterKind::ToLower,
            "toUpper" => FilterKind::ToUpper,
            "assignTo" => FilterKind::AssignTo,
            _ => FilterKind::Unsupported,
        }
    }

    /// Canonical template name. `None` for [`FilterKind::Unsupported`].
    pub fn name(&self) -> Option<&'static str> {
        match self {
            FilterKind::Markdown => Some("markdown"),
            FilterKind::Replace => Some("replace"),
            FilterKind::Prepend => Some("prepend"),
            FilterKind::Append => Some("append"),
            FilterKind::UrlEncode => Some("urlEncode"),
            FilterKind::ToLower => Some("toLower"),
            FilterKind::ToUpper => Some("toUpper"),
            FilterKind::AssignTo => Some("assignTo"),
            FilterKind::Unsupported => None,
        }
    }

    /// Number of parameters the filter needs to have an effect.
    pub fn required_params(&self) -> usize {
        match self {
            FilterKind::Replace => 2,
            FilterKind::Prepend | FilterKind::Append | FilterKind::AssignTo => 1,
            _ => 0,
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, FilterKind::Unsupported)
    }
}

/// One step of a placeholder's pipeline: a filter name and its quoted
/// parameters, in template order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterInvocation {
    pub name: String,
    pub params: Vec<String>,
}

impl FilterInvocation {
    pub fn new(name: impl Into<String>, params: Vec<String>) -> Self {
        Self {
            name: name.into(),
            params,
        }
    }

    /// Shorthand for an invocation without parameters.
    pub fn bare(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn kind(&self) -> FilterKind {
        FilterKind::parse(&self.name)
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(String::as_str)
    }
}

/// Values stashed by `assignTo` during one render call.
///
/// Later writes to the same name replace earlier ones. Iteration is in name
/// order, which keeps [`Assignments::resolve`] deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignments {
    values: BTreeMap<String, String>,
}

impl Assignments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Replaces every literal `{{name}}` in `text` with its assigned value.
    ///
    /// Only the exact brace form matches; `{{ name }}` or `{{name|x}}` are
    /// left alone.
    pub fn resolve(&self, mut text: String) -> String {
        for (name, value) in &self.values {
            let token = format!("{{{{{}}}}}", name);
            if text.contains(&token) {
                text = text.replace(&token, value);
            }
        }
        text
    }
}

/// Result of running one placeholder's pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOutput {
    pub value: String,
    /// Whether any `markdown` step ran.
    pub markdown: bool,
}

/// Applies `invocations` in order to `initial`, recording `assignTo` values
/// into `assignments`.
///
/// ```rust
/// use valuefmt::{apply_pipeline, Assignments, FilterInvocation};
///
/// let steps = vec![
///     FilterInvocation::bare("toUpper"),
///     FilterInvocation::new("append", vec!["!".into()]),
/// ];
/// let mut assignments = Assignments::new();
/// let out = apply_pipeline(&steps, "ok", &mut assignments);
/// assert_eq!(out.value, "OK!");
/// assert!(!out.markdown);
/// ```
pub fn apply_pipeline(
    invocations: &[FilterInvocation],
    initial: &str,
    assignments: &mut Assignments,
) -> PipelineOutput {
    let mut value = initial.to_string();
    let mut markdown = false;

    for invocation in invocations {
        let kind = invocation.kind();
        if invocation.params.len() < kind.required_params() {
            debug!(
                filter = %invocation.name,
                given = invocation.params.len(),
                required = kind.required_params(),
                "filter skipped, missing parameters"
            );
            continue;
        }

        value = match kind {
            FilterKind::Markdown => {
                markdown = true;
                markdown::to_inline_html(&value)
            }
            FilterKind::Replace => replace(&value, &invocation.params[0], &invocation.params[1]),
            FilterKind::Prepend => format!("{}{}", invocation.params[0], value),
            FilterKind::Append => format!("{}{}", value, invocation.params[0]),
            FilterKind::UrlEncode => url_encode(&value),
            FilterKind::ToLower => value.to_lowercase(),
            FilterKind::ToUpper => value.to_uppercase(),
            FilterKind::AssignTo => {
                assignments.insert(invocation.params[0].clone(), value.clone());
                value
            }
            FilterKind::Unsupported => {
                warn!(filter = %invocation.name, "unsupported template filter, value left unchanged");
                value
            }
        };
    }

    PipelineOutput { value, markdown }
}

fn replace(value: &str, pattern: &str, replacement: &str) -> String {
    match Regex::new(pattern) {
        Ok(regex) => {
            let expansion = expansion_for(&regex, replacement);
            regex.replace_all(value, expansion.as_str()).into_owned()
        }
        Err(err) => {
            warn!(%pattern, error = %err, "invalid replace pattern, value left unchanged");
            value.to_string()
        }
    }
}

/// Rewrites a replacement string into `regex` expansion syntax.
///
/// `$n` takes as many digits as still name an existing group, so `$1px` is
/// group 1 followed by `px`. `\c` is a literal `c`. Other `$` forms (`${name}`)
/// are left for `regex` to expand.
fn expansion_for(regex: &Regex, replacement: &str) -> String {
    let groups = regex.captures_len();
    let mut out = String::with_capacity(replacement.len() + 4);
    let mut chars = replacement.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('$') => out.push_str("$$"),
                Some(escaped) => out.push(escaped),
                None => out.push('\\'),
            },
            '$' if chars.peek().is_some_and(|d| d.is_ascii_digit()) => {
                let mut group = String::new();
                while let Some(&d) = chars.peek() {
                    let Some(digit) = d.to_digit(10) else { break };
                    let candidate = group.parse::<usize>().unwrap_or(0) * 10 + digit as usize;
                    if !group.is_empty() && candidate >= groups {
                        break;
                    }
                    group.push(d);
                    chars.next();
                }
                out.push_str("${");
                out.push_str(&group);
                out.push('}');
            }
            other => out.push(other),
        }
    }
    out
}

/// Query-component encoding: unreserved characters kept, space as `+`,
/// everything else percent-encoded as UTF-8.
fn url_encode(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(steps: &[FilterInvocation], value: &str) -> PipelineOutput {
        let mut assignments = Assignments::new();
        apply_pipeline(steps, value, &mut assignments)
    }

    fn with(name: &str, params: &[&str]) -> FilterInvocation {
        FilterInvocation::new(name, params.iter().map(|p| p.to_string()).collect())
    }

    #[test]
    fn parse_round_trips_canonical_names() {
        for kind in FilterKind::ALL {
            let name = kind.name().unwrap();
            assert_eq!(FilterKind::parse(name), kind);
        }
        assert_eq!(FilterKind::Unsupported.name(), None);
    }

    #[test]
    fn parse_is_case_sensitive() {
        assert_eq!(FilterKind::parse("TOUPPER"), FilterKind::Unsupported);
        assert_eq!(FilterKind::parse("Markdown"), FilterKind::Unsupported);
        assert!(!FilterKind::parse("").is_supported());
    }

    #[test]
    fn empty_pipeline_is_identity() {
        let out = run(&[], "same");
        assert_eq!(out.value, "same");
        assert!(!out.markdown);
    }

    #[test]
    fn case_filters() {
        assert_eq!(run(&[with("toUpper", &[])], "abc").value, "ABC");
        assert_eq!(run(&[with("toLower", &[])], "ÄBC").value, "äbc");
    }

    #[test]
    fn prepend_and_append() {
        let out = run(&[with("prepend", &["<"]), with("append", &[">"])], "x");
        assert_eq!(out.value, "<x>");
    }

    #[test]
    fn replace_uses_regex_and_group_references() {
        assert_eq!(
            run(&[with("replace", &["[0-9]+", "#"])], "a1b22c").value,
            "a#b#c"
        );
        assert_eq!(
            run(&[with("replace", &["(\\w+)@(\\w+)", "$2 at $1"])], "me@home").value,
            "home at me"
        );
    }

    #[test]
    fn replace_group_reference_followed_by_text() {
        assert_eq!(
            run(&[with("replace", &["([0-9]+)", "$1px"])], "width 12").value,
            "width 12px"
        );
        assert_eq!(run(&[with("replace", &["(a)", "$1_x"])], "a").value, "a_x");
    }

    #[test]
    fn replace_multi_digit_group_only_when_it_exists() {
        let many = "(a)(b)(c)(d)(e)(f)(g)(h)(i)(j)(k)";
        assert_eq!(run(&[with("replace", &[many, "$11"])], "abcdefghijk").value, "k");
        assert_eq!(run(&[with("replace", &["(a)", "$10"])], "a").value, "a0");
    }

    #[test]
    fn replace_escaped_dollar_is_literal() {
        assert_eq!(run(&[with("replace", &["([0-9]+)", "\\$$1"])], "5").value, "$5");
        assert_eq!(run(&[with("replace", &["x", "${0}!"])], "x").value, "x!");
    }

    #[test]
    fn invalid_replace_pattern_is_noop() {
        assert_eq!(run(&[with("replace", &["(", "x"])], "a(b").value, "a(b");
    }

    #[test]
    fn missing_params_are_noops() {
        assert_eq!(run(&[with("replace", &["a"])], "aaa").value, "aaa");
        assert_eq!(run(&[with("prepend", &[])], "v").value, "v");
        assert_eq!(run(&[with("append", &[])], "v").value, "v");

        let mut assignments = Assignments::new();
        apply_pipeline(&[with("assignTo", &[])], "v", &mut assignments);
        assert!(assignments.is_empty());
    }

    #[test]
    fn extra_params_are_ignored() {
        assert_eq!(run(&[with("append", &["1", "2"])], "v").value, "v1");
    }

    #[test]
    fn url_encode_form_style() {
        assert_eq!(run(&[with("urlEncode", &[])], "a b&c=ü").value, "a+b%26c%3D%C3%BC");
        assert_eq!(run(&[with("urlencode", &[])], "x/y").value, "x%2Fy");
        assert_eq!(run(&[with("urlEncode", &[])], "a-b_c.d*").value, "a-b_c.d*");
    }

    #[test]
    fn assign_to_keeps_value_and_records_current_state() {
        let mut assignments = Assignments::new();
        let steps = [
            with("toUpper", &[]),
            with("assignTo", &["upper"]),
            with("append", &["!"]),
        ];
        let out = apply_pipeline(&steps, "hi", &mut assignments);
        assert_eq!(out.value, "HI!");
        assert_eq!(assignments.get("upper"), Some("HI"));
    }

    #[test]
    fn later_assignment_wins() {
        let mut assignments = Assignments::new();
        let steps = [
            with("assignTo", &["x"]),
            with("append", &["2"]),
            with("assignTo", &["x"]),
        ];
        apply_pipeline(&steps, "v", &mut assignments);
        assert_eq!(assignments.get("x"), Some("v2"));
        assert_eq!(assignments.len(), 1);
    }

    #[test]
    fn unsupported_filter_passes_value_through() {
        let out = run(&[with("bogus", &["arg"]), with("append", &["!"])], "abc");
        assert_eq!(out.value, "abc!");
        assert!(!out.markdown);
    }

    #[test]
    fn markdown_sets_flag() {
        let out = run(&[with("markdown", &[])], "**bold**");
        assert_eq!(out.value, "<strong>bold</strong>");
        assert!(out.markdown);
    }

    #[test]
    fn resolve_only_matches_exact_braces() {
        let mut assignments = Assignments::new();
        assignments.insert("x", "1");
        let text = "{{x}} {{ x }} {{x|toUpper}} {{xy}}".to_string();
        assert_eq!(assignments.resolve(text), "1 {{ x }} {{x|toUpper}} {{xy}}");
    }

    #[test]
    fn resolve_runs_in_name_order() {
        let mut assignments = Assignments::new();
        assignments.insert("b", "B");
        assignments.insert("a", "<{{b}}>");
        assert_eq!(assignments.resolve("{{a}}".to_string()), "<B>");
    }
}
