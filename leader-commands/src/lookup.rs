//! Search links the bot hands back instead of fetching anything itself.

use url::form_urlencoded;

pub const URBAN_DICTIONARY_BASE: &str = "http://www.urbandictionary.com/define.php?term=";
pub const LMGTFY_BASE: &str = "http://lmgtfy.com/?q=";

/// Form-encode `raw` for use as a query parameter value (space becomes `+`).
pub fn query_escape(raw: &str) -> String {
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// ```
/// use leader_commands::lookup::urban_dictionary_url;
///
/// assert_eq!(
///     urban_dictionary_url("rick roll"),
///     "http://www.urbandictionary.com/define.php?term=rick+roll"
/// );
/// ```
pub fn urban_dictionary_url(term: &str) -> String {
    format!("{URBAN_DICTIONARY_BASE}{}", query_escape(term))
}

pub fn lmgtfy_url(query: &str) -> String {
    format!("{LMGTFY_BASE}{}", query_escape(query))
}
