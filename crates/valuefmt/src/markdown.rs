//! Markdown to inline HTML.
//!
//! Output is meant to sit inside a larger HTML fragment, so paragraphs are
//! not wrapped in `<p>`: only their inline content is emitted, and consecutive
//! paragraphs are separated by a newline. Every `<a>` tag in the output,
//! whether produced from Markdown links or written as raw HTML, opens in a new
//! browsing context unless it already sets `target`.

use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};

const NEW_TAB: &str = " target=\"_blank\"";

/// Renders `markdown` as HTML without paragraph wrappers.
///
/// Tables, strikethrough and task lists are enabled.
///
/// ```rust
/// use valuefmt::to_inline_html;
///
/// assert_eq!(to_inline_html("*hi*"), "<em>hi</em>");
/// assert_eq!(
///     to_inline_html("[docs](https://example.org)"),
///     "<a target=\"_blank\" href=\"https://example.org\">docs</a>"
/// );
/// ```
pub fn to_inline_html(markdown: &str) -> String {
    let options =
        Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS;
    let parser = Parser::new_ext(markdown, options);

    let mut seen_paragraph = false;
    let events = parser.filter_map(|event| match event {
        Event::Start(Tag::Paragraph) => {
            if seen_paragraph {
                Some(Event::SoftBreak)
            } else {
                seen_paragraph = true;
                None
            }
        }
        Event::End(TagEnd::Paragraph) => None,
        other => Some(other),
    });

    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, events);
    open_links_in_new_tab(&output)
}

/// Inserts `target="_blank"` right after `<a` in every anchor start tag that
/// has no `target` attribute. Tag names match case-insensitively.
fn open_links_in_new_tab(html: &str) -> String {
    let mut output = String::with_capacity(html.len() + 32);
    let mut rest = html;

    while let Some(start) = find_anchor_start(rest) {
        let (head, tail) = rest.split_at(start + 2);
        let tag_end = tail.find('>').unwrap_or(tail.len());
        output.push_str(head);
        if !tail[..tag_end].to_ascii_lowercase().contains("target=") {
            output.push_str(NEW_TAB);
        }
        rest = tail;
    }
    output.push_str(rest);
    output
}

/// Byte offset of the next `<a` followed by whitespace, `/` or `>`.
fn find_anchor_start(html: &str) -> Option<usize> {
    let bytes = html.as_bytes();
    html.match_indices('<').map(|(i, _)| i).find(|&i| {
        let after = bytes.get(i + 2).copied();
        matches!(bytes.get(i + 1), Some(b'a' | b'A'))
            && matches!(after, Some(b) if b.is_ascii_whitespace() || b == b'>' || b == b'/')
    })
}
