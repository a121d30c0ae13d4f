//! Plain-text normalization of HTML description fragments
//!
//! Catalog descriptions arrive as HTML fragments. Batch artifacts store them
//! as plain text: tags removed, block boundaries collapsed to single
//! newlines, surrounding whitespace trimmed.

use scraper::Html;

/// Strip markup from an HTML fragment, yielding newline-separated plain text
///
/// Text nodes are joined with a newline separator and the result is trimmed.
/// Entities are decoded by the parser (`&amp;` becomes `&`). An input with no
/// markup passes through unchanged apart from trimming.
///
/// # Examples
///
/// ```
/// use catalog_dl::html::strip_html;
///
/// let text = strip_html("<p>Ceramic teapot</p><p>0.8 litre</p>");
/// assert_eq!(text, "Ceramic teapot\n0.8 litre");
/// ```
#[must_use]
pub fn strip_html(fragment: &str) -> String {
    if fragment.is_empty() {
        return String::new();
    }

    let document = Html::parse_fragment(fragment);
    let parts: Vec<String> = document
        .root_element()
        .text()
        .map(|chunk| chunk.trim().to_string())
        .filter(|chunk| !chunk.is_empty())
        .collect();

    parts.join("\n")
}
