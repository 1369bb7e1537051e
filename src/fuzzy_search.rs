//! Monster name suggestions for slash-command autocomplete.

use std::collections::HashSet;

use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use log::debug;

use crate::catalog::{Monster, MonsterGraph};

/// Display names matching `query` in any case, best first and without
/// repeats.
///
/// Equal scores fall back to the older monster.
#[must_use]
pub fn search_names(graph: &MonsterGraph, query: &str, limit: usize) -> Vec<String> {
    let query = query.trim();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    let matcher = SkimMatcherV2::default().ignore_case();
    let mut scored_matches: Vec<(&Monster, i64)> = graph
        .all_monsters()
        .filter_map(|monster| {
            matcher
                .fuzzy_match(monster.name(), query)
                .map(|score| (monster, score))
        })
        .collect();

    scored_matches.sort_by(|(left, left_score), (right, right_score)| {
        right_score
            .cmp(left_score)
            .then_with(|| left.id.cmp(&right.id))
    });
    debug!("{} names match {query:?}", scored_matches.len());

    let mut seen = HashSet::new();
    scored_matches
        .into_iter()
        .map(|(monster, _)| monster.name())
        .filter(|name| seen.insert(*name))
        .take(limit)
        .map(ToString::to_string)
        .collect()
}
