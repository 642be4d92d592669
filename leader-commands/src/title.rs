//! Page title extraction for links posted in channel.

use scraper::{Html, Selector};

/// Pull the first `<title>` text out of an HTML page, whitespace collapsed.
///
/// ```
/// use leader_commands::title::extract_title;
///
/// let html = "<html><head><TITLE>\n  Rock &amp; Roll\n</TITLE></head></html>";
/// assert_eq!(extract_title(html).as_deref(), Some("Rock & Roll"));
/// assert_eq!(extract_title("<p>no head</p>"), None);
/// ```
pub fn extract_title(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let title = doc.select(&selector).next()?;

    let text = title.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() { None } else { Some(text) }
}
