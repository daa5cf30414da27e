//! Placeholder scanner.
//!
//! Finds every placeholder for one variable name and splits it into its
//! filter invocations. The accepted syntax is:
//!
//! ```text
//! {{ <variable> ( | <filter> (:'<param>')* )* }}
//! ```
//!
//! Whitespace directly inside the braces and around `|` is optional. Filter
//! names are word characters (letters, digits, `_`). Parameters are single
//! quoted and cannot contain a single quote.
//!
//! Anything that does not fit the syntax (an unterminated quote, a different
//! variable name, a stray brace) is not a placeholder and stays literal text.
//! No filter name validation happens here.

use crate::filter::FilterInvocation;

/// A located placeholder. `start..end` is the byte range in the template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub start: usize,
    pub end: usize,
    pub filters: Vec<FilterInvocation>,
}

impl Placeholder {
    /// The placeholder's source text.
    pub fn source<'a>(&self, template: &'a str) -> &'a str {
        &template[self.start..self.end]
    }
}

/// Iterator over the placeholders of one variable, in document order.
///
/// ```rust
/// use valuefmt::Scanner;
///
/// let found: Vec<_> = Scanner::new("Hi {{value|toUpper}}!", "value").collect();
/// assert_eq!(found.len(), 1);
/// assert_eq!((found[0].start, found[0].end), (3, 20));
/// assert_eq!(found[0].filters[0].name, "toUpper");
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    template: &'a str,
    variable: &'a str,
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(template: &'a str, variable: &'a str) -> Self {
        Self {
            template,
            variable,
            pos: 0,
        }
    }

    /// Tries to read one placeholder starting at `start`, which must point at
    /// `{{`. Returns the end offset and the pipeline.
    fn parse_at(&self, start: usize) -> Option<(usize, Vec<FilterInvocation>)> {
        let mut cursor = Cursor::new(self.template, start);
        if !cursor.eat("{{") {
            return None;
        }
        cursor.skip_whitespace();
        if self.variable.is_empty() || !cursor.eat(self.variable) {
            return None;
        }

        let mut filters = Vec::new();
        loop {
            cursor.skip_whitespace();
            if !cursor.eat("|") {
                break;
            }
            cursor.skip_whitespace();
            let name = cursor.take_while(is_word_char);
            if name.is_empty() {
                return None;
            }
            let mut params = Vec::new();
            while cursor.eat(":'") {
                params.push(cursor.take_quoted()?.to_string());
            }
            filters.push(FilterInvocation::new(name, params));
        }

        cursor.skip_whitespace();
        if !cursor.eat("}}") {
            return None;
        }
        Some((cursor.pos, filters))
    }
}

impl Iterator for Scanner<'_> {
    type Item = Placeholder;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.template.len() {
            let offset = self.template[self.pos..].find("{{")?;
            let start = self.pos + offset;

            if let Some((end, filters)) = self.parse_at(start) {
                self.pos = end;
                return Some(Placeholder {
                    start,
                    end,
                    filters,
                });
            }
            // Not a placeholder here; a later brace may still open one.
            self.pos = start + 1;
        }
        None
    }
}

/// Collects all placeholders for `variable` in `template`.
pub fn scan(template: &str, variable: &str) -> Vec<Placeholder> {
    Scanner::new(template, variable).collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str, pos: usize) -> Self {
        Self { src, pos }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn eat(&mut self, literal: &str) -> bool {
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let len = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += len;
        &rest[..len]
    }

    fn skip_whitespace(&mut self) {
        self.take_while(char::is_whitespace);
    }

    /// Reads up to the closing `'` (the opening one is already consumed) and
    /// steps past it. `None` if the quote is never closed.
    fn take_quoted(&mut self) -> Option<&'a str> {
        let rest = self.rest();
        let len = rest.find('\'')?;
        self.pos += len + 1;
        Some(&rest[..len])
    }
}
