//! Query tokenization and the modifier/name split.

use serde::Serialize;

use crate::config::MatchThresholds;
use crate::index::MonsterIndex;
use crate::index::tokenize::normalize_query;

use super::scoring::ratio_modifier;

/// Minimum length of a multi-word part that may match fuzzily.
const FUZZY_PART_LEN: usize = 5;
/// Leading tokens this long may fuzzy-match a long modifier.
const LONG_MODIFIER_LEN: usize = 8;
const SEPARATOR: &str = "|";

/// One query word. `-word` is negated and `"word"` is exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub value: String,
    pub negated: bool,
    pub exact: bool,
}

impl Token {
    fn parse(raw: &str) -> Option<Self> {
        let (negated, rest) = match raw.strip_prefix('-') {
            Some(rest) if !rest.is_empty() => (true, rest),
            _ => (false, raw),
        };
        let (exact, value) = match rest.strip_prefix('"').and_then(|r| r.strip_suffix('"')) {
            Some(inner) => (true, inner),
            None => (false, rest.trim_matches('"')),
        };
        if value.is_empty() || value == SEPARATOR {
            return None;
        }
        Some(Self {
            value: value.to_string(),
            negated,
            exact,
        })
    }
}

/// Normalize and split a query into tokens, before multi-word merging.
#[must_use]
pub fn raw_tokens(query: &str) -> Vec<Token> {
    normalize_query(query)
        .split_whitespace()
        .filter_map(Token::parse)
        .collect()
}

/// Fuse known multi-word sequences into single tokens, longest first.
///
/// Parts of five or more characters may match fuzzily so a typo inside
/// `super reincarnated` still fuses.
#[must_use]
pub fn merge_multi_word(
    tokens: &[Token],
    index: &MonsterIndex,
    thresholds: &MatchThresholds,
) -> Vec<Token> {
    let mut merged = Vec::with_capacity(tokens.len());
    let mut position = 0;

    while position < tokens.len() {
        let fused = index.multi_word_tokens().iter().find(|words| {
            tokens.len() - position >= words.len()
                && words.iter().zip(&tokens[position..]).all(|(word, token)| {
                    token.value == *word
                        || (!token.exact
                            && word.chars().count() >= FUZZY_PART_LEN
                            && ratio_modifier(&token.value, word) >= thresholds.modifier)
                })
        });

        match fused {
            Some(words) => {
                let first = &tokens[position];
                merged.push(Token {
                    value: words.concat(),
                    negated: first.negated,
                    exact: first.exact,
                });
                position += words.len();
            }
            None => {
                merged.push(tokens[position].clone());
                position += 1;
            }
        }
    }

    merged
}

/// A query split into modifier and name bags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuerySplit {
    pub pos_mod: Vec<Token>,
    pub neg_mod: Vec<Token>,
    pub pos_name: Vec<Token>,
    pub neg_name: Vec<Token>,
    /// Modifier tokens no monster carries.
    pub typo_mods: Vec<String>,
}

impl QuerySplit {
    #[must_use]
    pub fn has_names(&self) -> bool {
        !self.pos_name.is_empty() || !self.neg_name.is_empty()
    }

    #[must_use]
    pub fn modifier_count(&self) -> usize {
        self.pos_mod.len() + self.neg_mod.len()
    }

    fn push_modifier(&mut self, token: Token) {
        if token.negated {
            self.neg_mod.push(token);
        } else {
            self.pos_mod.push(token);
        }
    }
}

/// Split tokens into modifiers and names.
///
/// Trailing modifiers are peeled off right to left, then leading modifiers
/// left to right; whatever is left is the name. A query made of modifiers
/// only whose last leading modifier is a curator nickname gets that token
/// back as its name.
#[must_use]
pub fn split_query(
    tokens: &[Token],
    index: &MonsterIndex,
    thresholds: &MatchThresholds,
) -> QuerySplit {
    let mut split = QuerySplit::default();

    let mut end = tokens.len();
    let mut trailing = Vec::new();
    while end > 0 && is_suffix(&tokens[end - 1], index, thresholds) {
        trailing.push(tokens[end - 1].clone());
        end -= 1;
    }

    let mut start = 0;
    let mut last_leading: Option<Token> = None;
    while start < end && is_leading_modifier(&tokens[start], index, thresholds) {
        last_leading = Some(tokens[start].clone());
        split.push_modifier(tokens[start].clone());
        start += 1;
    }
    for token in trailing.into_iter().rev() {
        split.push_modifier(token);
    }

    for token in &tokens[start..end] {
        if token.negated {
            split.neg_name.push(token.clone());
        } else {
            split.pos_name.push(token.clone());
        }
    }

    if !split.has_names()
        && let Some(promoted) = last_leading.filter(|token| !token.negated)
        && index.is_manual_token(&promoted.value)
        && let Some(position) = split.pos_mod.iter().position(|token| *token == promoted)
    {
        split.pos_mod.remove(position);
        split.pos_name.push(promoted);
    }

    split.typo_mods = split
        .pos_mod
        .iter()
        .chain(&split.neg_mod)
        .filter(|token| !index.is_modifier(&token.value))
        .map(|token| token.value.clone())
        .collect();

    split
}

fn is_suffix(token: &Token, index: &MonsterIndex, thresholds: &MatchThresholds) -> bool {
    if index.suffixes().contains(&token.value) {
        return true;
    }
    !token.exact
        && index
            .suffixes()
            .iter()
            .any(|suffix| ratio_modifier(&token.value, suffix) >= thresholds.modifier)
}

fn is_leading_modifier(token: &Token, index: &MonsterIndex, thresholds: &MatchThresholds) -> bool {
    if index.is_modifier(&token.value) {
        return true;
    }
    !token.exact
        && token.value.chars().count() >= LONG_MODIFIER_LEN
        && !index.is_name_token(&token.value)
        && index.all_modifiers().iter().any(|modifier| {
            modifier.chars().count() > LONG_MODIFIER_LEN
                && ratio_modifier(&token.value, modifier) >= thresholds.modifier
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_index;

    fn values(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|token| token.value.as_str()).collect()
    }

    #[test]
    fn parses_negation_quotes_and_separator() {
        let tokens = raw_tokens("Sária -REVO \"ra\" | -");
        assert_eq!(values(&tokens), vec!["saria", "revo", "ra", "-"]);
        assert!(tokens[1].negated);
        assert!(tokens[2].exact);
        assert!(!tokens[3].negated);
    }

    #[test]
    fn merges_longest_sequence_first() {
        let (_, index) = fixture_index();
        let thresholds = MatchThresholds::default();
        let merged = merge_multi_word(&raw_tokens("super reincarnated hera"), &index, &thresholds);
        assert_eq!(values(&merged), vec!["superreincarnated", "hera"]);

        let typo = merge_multi_word(&raw_tokens("super reincarnatd hera"), &index, &thresholds);
        assert_eq!(values(&typo), vec!["superreincarnated", "hera"]);
    }

    #[test]
    fn merge_leaves_unrelated_tokens_alone() {
        let (_, index) = fixture_index();
        let tokens = raw_tokens("flame knight");
        let merged = merge_multi_word(&tokens, &index, &MatchThresholds::default());
        assert_eq!(merged, tokens);
    }

    #[test]
    fn splits_trailing_and_leading_modifiers() {
        let (_, index) = fixture_index();
        let thresholds = MatchThresholds::default();
        let split = split_query(&raw_tokens("awoken saria -red 3-tpa"), &index, &thresholds);
        assert_eq!(values(&split.pos_mod), vec!["awoken", "3-tpa"]);
        assert_eq!(values(&split.neg_mod), vec!["red"]);
        assert_eq!(values(&split.pos_name), vec!["saria"]);
        assert!(split.typo_mods.is_empty());
    }

    #[test]
    fn negated_names_stay_names() {
        let (_, index) = fixture_index();
        let split = split_query(&raw_tokens("saria -zzzz"), &index, &MatchThresholds::default());
        assert_eq!(values(&split.pos_name), vec!["saria"]);
        assert_eq!(values(&split.neg_name), vec!["zzzz"]);
    }

    #[test]
    fn lone_nickname_is_promoted_to_name() {
        let (_, index) = fixture_index();
        let split = split_query(&raw_tokens("samurai"), &index, &MatchThresholds::default());
        assert!(split.pos_mod.is_empty());
        assert_eq!(values(&split.pos_name), vec!["samurai"]);
    }

    #[test]
    fn fuzzy_trailing_modifier_is_a_typo() {
        let (_, index) = fixture_index();
        let split = split_query(
            &raw_tokens("saria reincarnatd"),
            &index,
            &MatchThresholds::default(),
        );
        assert_eq!(values(&split.pos_mod), vec!["reincarnatd"]);
        assert_eq!(split.typo_mods, vec!["reincarnatd".to_string()]);
    }
}
