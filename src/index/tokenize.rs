//! Text normalization shared by index construction and query parsing.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Compatibility-decompose and drop Latin combining marks, so `Pokémon`
/// and full-width `Ｐｏｋｅｍｏｎ` both become `Pokemon`.
#[must_use]
pub fn strip_diacritics(text: &str) -> String {
    text.nfkd()
        .filter(|c| !('\u{0300}'..='\u{036F}').contains(c))
        .collect()
}

/// Lowercase, strip diacritics and drop commas. Punctuation is kept so
/// tokens like `3-tpa`, `br+` and `r/b` survive.
#[must_use]
pub fn normalize_query(query: &str) -> String {
    strip_diacritics(query)
        .to_lowercase()
        .replace(',', "")
        .replace(['\u{201C}', '\u{201D}'], "\"")
}

/// Split a monster name into lowercase word tokens. Apostrophes vanish
/// (`Saria's` is `sarias`); any other punctuation separates words.
#[must_use]
pub fn name_words(name: &str) -> Vec<String> {
    let cleaned: String = strip_diacritics(name)
        .to_lowercase()
        .chars()
        .filter(|c| !matches!(c, '\'' | '\u{2019}'))
        .map(|c| {
            if c.is_alphanumeric() || is_combining_mark(c) {
                c
            } else {
                ' '
            }
        })
        .collect();
    cleaned.split_whitespace().map(ToString::to_string).collect()
}

/// Words of the last comma-separated segment of a name
/// (`Blazing Phoenix, Horus` gives `horus`).
fn last_segment_words(name: &str) -> Vec<String> {
    let tail = name.rsplit(',').next().unwrap_or(name);
    name_words(tail)
}

/// Name shared by an evolution tree: the longest run of trailing words
/// that the base and every member end with. A tree whose members share no
/// trailing word is named by its base alone.
#[must_use]
pub fn tree_name_words<'a>(base: &str, members: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let base_words = last_segment_words(base);
    let mut common = base_words.clone();
    for member in members {
        let words = last_segment_words(member);
        let shared = common
            .iter()
            .rev()
            .zip(words.iter().rev())
            .take_while(|(left, right)| left == right)
            .count();
        common.drain(..common.len() - shared);
    }
    if common.is_empty() { base_words } else { common }
}
