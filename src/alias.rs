//! ASCII alias generation for names carrying diacritics.

use unicode_general_category::{get_general_category, GeneralCategory};
use unicode_normalization::UnicodeNormalization;

fn is_nonspacing_mark(c: char) -> bool {
    get_general_category(c) == GeneralCategory::NonspacingMark
}

/// If `name` contains non-spacing marks after canonical decomposition,
/// return the version without them for use as an alias.
///
/// Returns `None` for empty input, for pure ASCII input, and when stripping
/// marks leaves the text unchanged.
pub fn ascii_alias(name: Option<&str>) -> Option<String> {
    let name = name.filter(|n| !n.is_empty())?;
    if name.is_ascii() {
        return None;
    }

    let alias: String = name.nfd().filter(|c| !is_nonspacing_mark(*c)).collect();
    if alias == name {
        return None;
    }
    Some(alias)
}
