//! Query resolution: name fan-out, tree expansion, modifier filtering and ranking.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use log::debug;
use serde::Serialize;

use crate::catalog::MonsterGraph;
use crate::config::MatchThresholds;
use crate::index::MonsterIndex;
use crate::types::MonsterId;

use super::priority::{MonsterPriority, RankContext, has_four_digit_run};
use super::query::{QuerySplit, Token, merge_multi_word, raw_tokens, split_query};
use super::scoring::{ratio_modifier, ratio_name};

/// Extra score for a manual-token hit, so nicknames win exact ties.
const MANUAL_BONUS: f64 = 0.001;
const FLUFF_WEIGHT: f64 = 0.5;
const NEGATIVE_WEIGHT: f64 = -10.0;
/// Score handicap for a monster reached only through its evolution tree.
const EVO_PENALTY: f64 = 0.003;
/// Modifier tokens shorter than this must match exactly.
const SHORT_MODIFIER_LEN: usize = 6;
const MIN_JAPANESE_QUERY: usize = 2;
const MIN_ASCII_QUERY: usize = 4;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    /// Prefer monsters released in NA among otherwise equal candidates.
    pub na_priority: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NameSource {
    Manual,
    Name,
    Fluff,
    FromEvo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameHit {
    pub query_token: String,
    pub matched_token: String,
    pub source: NameSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModifierHit {
    pub query_token: String,
    pub matched_token: String,
}

/// Why a monster scored what it did for one query.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatchRecord {
    pub score: f64,
    pub name_hits: Vec<NameHit>,
    pub modifier_hits: Vec<ModifierHit>,
}

/// Which token sequence produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenVariant {
    Merged,
    Unmerged,
}

/// Step-by-step account of a resolution, for `iddebug` and the journal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolveTrace {
    pub query: String,
    pub variant: TokenVariant,
    pub tokens: Vec<String>,
    pub split: QuerySplit,
    /// Candidates after name matching, before tree expansion.
    pub name_seed: usize,
    /// Candidates after tree expansion.
    pub expanded: usize,
    /// Candidates left after modifier filtering.
    pub survivors: usize,
    /// Why nothing was found, or how to ask better.
    pub hint: Option<String>,
}

impl ResolveTrace {
    fn new(query: &str, variant: TokenVariant, tokens: &[Token], split: QuerySplit) -> Self {
        Self {
            query: query.to_string(),
            variant,
            tokens: tokens.iter().map(|token| token.value.clone()).collect(),
            split,
            name_seed: 0,
            expanded: 0,
            survivors: 0,
            hint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
    pub best: Option<MonsterId>,
    pub matches: BTreeMap<MonsterId, MatchRecord>,
    pub candidates: BTreeSet<MonsterId>,
    /// Candidates, best first.
    pub ranked: Vec<MonsterId>,
    pub trace: ResolveTrace,
}

impl Resolution {
    fn absent(mut trace: ResolveTrace, hint: impl Into<String>) -> Self {
        trace.hint = Some(hint.into());
        Self {
            best: None,
            matches: BTreeMap::new(),
            candidates: BTreeSet::new(),
            ranked: Vec::new(),
            trace,
        }
    }

    /// Score of the winning monster; 0 when it matched on modifiers only.
    #[must_use]
    pub fn best_score(&self) -> Option<f64> {
        self.best
            .map(|id| self.matches.get(&id).map_or(0.0, |record| record.score))
    }

    /// Modifier tokens the index does not know.
    #[must_use]
    pub fn typo_mods(&self) -> &[String] {
        &self.trace.split.typo_mods
    }
}

/// Ranked search result with an optional hint for malformed queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedMonsters {
    pub ids: Vec<MonsterId>,
    pub hint: Option<String>,
}

/// A name fan-out hit for one monster.
struct FanOutHit {
    id: MonsterId,
    gain: f64,
    hit: NameHit,
}

/// Resolves free-text queries against one (graph, index) snapshot.
pub struct Resolver<'a> {
    graph: &'a MonsterGraph,
    index: &'a MonsterIndex,
    thresholds: MatchThresholds,
}

impl<'a> Resolver<'a> {
    #[must_use]
    pub fn new(graph: &'a MonsterGraph, index: &'a MonsterIndex, thresholds: MatchThresholds) -> Self {
        Self {
            graph,
            index,
            thresholds,
        }
    }

    /// Resolve `query` to its best monster.
    ///
    /// Runs the pipeline on the query with and without multi-word merging
    /// and keeps the run whose best monster scores higher; merged wins ties.
    #[must_use]
    pub fn resolve(&self, query: &str, options: ResolveOptions) -> Resolution {
        let raw = raw_tokens(query);
        if raw.is_empty() {
            let trace = ResolveTrace::new(query, TokenVariant::Unmerged, &raw, QuerySplit::default());
            return Resolution::absent(trace, "The query is empty.");
        }

        let merged = merge_multi_word(&raw, self.index, &self.thresholds);
        if merged == raw {
            return self.run(query, &raw, TokenVariant::Unmerged, options);
        }

        let with_merge = self.run(query, &merged, TokenVariant::Merged, options);
        let without_merge = self.run(query, &raw, TokenVariant::Unmerged, options);
        let resolution = match (with_merge.best_score(), without_merge.best_score()) {
            (None, Some(_)) => without_merge,
            (Some(merged_score), Some(unmerged_score)) if unmerged_score > merged_score => {
                without_merge
            }
            _ => with_merge,
        };
        debug!(
            "Resolved {query:?} via {:?} tokens to {:?}",
            resolution.trace.variant, resolution.best
        );
        resolution
    }

    /// Every surviving candidate for `query`, best first.
    ///
    /// Very short queries return nothing with a hint instead of a flood of
    /// weak matches.
    #[must_use]
    pub fn resolve_all(&self, query: &str, options: ResolveOptions) -> RankedMonsters {
        if let Some(hint) = bad_query_hint(query) {
            return RankedMonsters {
                ids: Vec::new(),
                hint: Some(hint),
            };
        }
        let resolution = self.resolve(query, options);
        RankedMonsters {
            ids: resolution.ranked,
            hint: resolution.trace.hint,
        }
    }

    fn run(
        &self,
        query: &str,
        tokens: &[Token],
        variant: TokenVariant,
        options: ResolveOptions,
    ) -> Resolution {
        let split = split_query(tokens, self.index, &self.thresholds);
        let mut trace = ResolveTrace::new(query, variant, tokens, split.clone());

        if !split.has_names() && split.modifier_count() == 1 {
            let modifier = split
                .pos_mod
                .iter()
                .chain(&split.neg_mod)
                .map(|token| token.value.as_str())
                .next()
                .unwrap_or_default();
            return Resolution::absent(
                trace,
                format!("`{modifier}` only describes monsters; add a name to search for."),
            );
        }

        let mut matches: BTreeMap<MonsterId, MatchRecord> = BTreeMap::new();
        let mut candidates: BTreeSet<MonsterId> = self.graph.all_monsters().map(|m| m.id).collect();

        if split.has_names() {
            for token in &split.pos_name {
                let touched = self.apply_name_token(token, &mut matches);
                candidates.retain(|id| touched.contains(id));
            }
            for token in &split.neg_name {
                for hit in self.fan_out(token) {
                    if let Some(record) = matches.get_mut(&hit.id) {
                        record.score += NEGATIVE_WEIGHT * hit.gain;
                    }
                    candidates.remove(&hit.id);
                }
            }
            trace.name_seed = candidates.len();
            if candidates.is_empty() {
                return Resolution::absent(trace, "No monster name matched.");
            }
            candidates = self.expand_trees(&candidates, &mut matches);
        } else {
            trace.name_seed = candidates.len();
        }
        trace.expanded = candidates.len();

        for token in &split.pos_mod {
            candidates.retain(|id| match self.modifier_match(*id, token) {
                Some((matched_token, gain)) => {
                    let record = matches.entry(*id).or_default();
                    record.score += gain;
                    record.modifier_hits.push(ModifierHit {
                        query_token: token.value.clone(),
                        matched_token,
                    });
                    true
                }
                None => false,
            });
            if candidates.is_empty() {
                return Resolution::absent(
                    trace,
                    format!("No matching monster has modifier `{}`.", token.value),
                );
            }
        }
        for token in &split.neg_mod {
            candidates.retain(|id| self.modifier_match(*id, token).is_none());
            if candidates.is_empty() {
                return Resolution::absent(
                    trace,
                    format!("Every matching monster has modifier `{}`.", token.value),
                );
            }
        }
        trace.survivors = candidates.len();

        let context = RankContext {
            equips_allowed: split
                .pos_mod
                .iter()
                .any(|token| token.value == "new" || token.value == "base"),
            numeric_query: has_four_digit_run(query),
            na_priority: options.na_priority,
        };
        let ranked = self.rank(&candidates, &matches, context);
        matches.retain(|id, _| candidates.contains(id));

        Resolution {
            best: ranked.first().copied(),
            matches,
            candidates,
            ranked,
            trace,
        }
    }

    /// Score every monster `token` names and return the ids it touched.
    fn apply_name_token(
        &self,
        token: &Token,
        matches: &mut BTreeMap<MonsterId, MatchRecord>,
    ) -> HashSet<MonsterId> {
        let mut touched = HashSet::new();
        for FanOutHit { id, gain, hit } in self.fan_out(token) {
            touched.insert(id);
            let record = matches.entry(id).or_default();
            record.score += gain;
            record.name_hits.push(hit);
        }
        touched
    }

    /// Monsters reached by `token` through the name buckets, at most once
    /// each: the first matching name token and bucket (manual, name, fluff)
    /// wins.
    fn fan_out(&self, token: &Token) -> Vec<FanOutHit> {
        let mut seen = HashSet::new();
        let mut hits = Vec::new();

        for (name_token, score) in self.matching_name_tokens(token) {
            let buckets = [
                (self.index.manual_bucket(&name_token), NameSource::Manual, 1.0, MANUAL_BONUS),
                (self.index.name_bucket(&name_token), NameSource::Name, 1.0, 0.0),
                (self.index.fluff_bucket(&name_token), NameSource::Fluff, FLUFF_WEIGHT, 0.0),
            ];
            for (bucket, source, weight, bonus) in buckets {
                for id in bucket.into_iter().flatten() {
                    if seen.insert(*id) {
                        hits.push(FanOutHit {
                            id: *id,
                            gain: score * weight + bonus,
                            hit: NameHit {
                                query_token: token.value.clone(),
                                matched_token: name_token.clone(),
                                source,
                            },
                        });
                    }
                }
            }
        }

        hits
    }

    /// Name tokens similar to `token`, best first, followed by any name
    /// token `token` is a prefix of.
    fn matching_name_tokens(&self, token: &Token) -> Vec<(String, f64)> {
        let value = token.value.as_str();
        if token.exact {
            return if self.index.is_name_token(value) {
                vec![(value.to_string(), 1.0)]
            } else {
                Vec::new()
            };
        }

        let score = |name_token: &str| ratio_name(value, name_token, self.index.mwt_len(name_token));
        let mut scored: Vec<(String, f64)> = self
            .index
            .all_name_tokens()
            .iter()
            .map(|name_token| (name_token.clone(), score(name_token.as_str())))
            .filter(|(_, s)| *s > self.thresholds.token)
            .collect();
        scored.sort_by(|left, right| right.1.total_cmp(&left.1).then_with(|| left.0.cmp(&right.0)));

        let listed: HashSet<String> = scored.iter().map(|(name_token, _)| name_token.clone()).collect();
        let prefixed: Vec<(String, f64)> = self
            .index
            .all_name_tokens()
            .iter()
            .filter(|name_token| name_token.starts_with(value) && !listed.contains(*name_token))
            .map(|name_token| (name_token.clone(), score(name_token.as_str())))
            .collect();
        scored.extend(prefixed);
        scored
    }

    /// Grow the candidate set to whole alt trees. New members copy the name
    /// hits of the best-scoring seed in their tree, slightly handicapped.
    fn expand_trees(
        &self,
        seed: &BTreeSet<MonsterId>,
        matches: &mut BTreeMap<MonsterId, MatchRecord>,
    ) -> BTreeSet<MonsterId> {
        let mut expanded = seed.clone();
        let mut visited_trees = HashSet::new();

        for id in seed {
            if !visited_trees.insert(self.graph.get_base_id(*id)) {
                continue;
            }
            let tree = self.graph.alt_tree_ids(*id);
            let score_of = |member: &MonsterId| matches.get(member).map_or(0.0, |record| record.score);
            let Some(source) = tree
                .iter()
                .filter(|member| seed.contains(member))
                .max_by(|left, right| {
                    score_of(*left)
                        .total_cmp(&score_of(*right))
                        .then(right.cmp(left))
                })
            else {
                continue;
            };
            let source_record = matches.get(source).cloned().unwrap_or_default();

            for member in tree.iter().filter(|member| !seed.contains(member)) {
                expanded.insert(*member);
                matches.insert(
                    *member,
                    MatchRecord {
                        score: source_record.score - EVO_PENALTY,
                        name_hits: source_record
                            .name_hits
                            .iter()
                            .map(|hit| NameHit {
                                source: NameSource::FromEvo,
                                ..hit.clone()
                            })
                            .collect(),
                        modifier_hits: Vec::new(),
                    },
                );
            }
        }

        expanded
    }

    /// The modifier of `id` that `token` matches, with its score gain.
    fn modifier_match(&self, id: MonsterId, token: &Token) -> Option<(String, f64)> {
        let modifiers = self.index.modifiers_of(id)?;
        if modifiers.contains(&token.value) {
            return Some((token.value.clone(), 1.0));
        }
        if token.exact || token.value.chars().count() < SHORT_MODIFIER_LEN {
            return None;
        }
        modifiers
            .iter()
            .map(|modifier| (modifier, ratio_modifier(&token.value, modifier)))
            .max_by(|left, right| left.1.total_cmp(&right.1))
            .filter(|(_, ratio)| *ratio > self.thresholds.modifier)
            .map(|(modifier, ratio)| (modifier.clone(), ratio))
    }

    fn rank(
        &self,
        candidates: &BTreeSet<MonsterId>,
        matches: &BTreeMap<MonsterId, MatchRecord>,
        context: RankContext,
    ) -> Vec<MonsterId> {
        let mut keyed: Vec<(MonsterPriority, MonsterId)> = candidates
            .iter()
            .filter_map(|id| {
                let monster = self.graph.get(*id)?;
                let score = matches.get(id).map_or(0.0, |record| record.score);
                Some((MonsterPriority::new(self.graph, monster, score, context), *id))
            })
            .collect();
        keyed.sort_by(|left, right| right.0.cmp(&left.0));
        keyed.into_iter().map(|(_, id)| id).collect()
    }
}

/// Hint for queries too short to search on: one Japanese character, or
/// a single ASCII word under four characters.
#[must_use]
pub fn bad_query_hint(query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return Some("The query is empty.".to_string());
    }
    let chars: Vec<char> = query.chars().filter(|c| !c.is_whitespace()).collect();
    if chars.iter().all(|c| is_japanese(*c)) && chars.len() < MIN_JAPANESE_QUERY {
        return Some(format!(
            "Japanese queries need at least {MIN_JAPANESE_QUERY} characters."
        ));
    }
    if query.is_ascii() && !query.contains(char::is_whitespace) && query.len() < MIN_ASCII_QUERY {
        return Some(format!(
            "Searches need at least {MIN_ASCII_QUERY} characters; use /id for short names."
        ));
    }
    None
}

fn is_japanese(c: char) -> bool {
    matches!(c,
        '\u{3040}'..='\u{309F}'
        | '\u{30A0}'..='\u{30FF}'
        | '\u{4E00}'..='\u{9FFF}'
        | '\u{FF66}'..='\u{FF9F}')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_index;

    fn best(query: &str) -> Option<MonsterId> {
        let (graph, index) = fixture_index();
        Resolver::new(&graph, &index, MatchThresholds::default())
            .resolve(query, ResolveOptions::default())
            .best
    }

    fn resolution(query: &str) -> Resolution {
        let (graph, index) = fixture_index();
        Resolver::new(&graph, &index, MatchThresholds::default())
            .resolve(query, ResolveOptions::default())
    }

    #[test]
    fn awoken_modifier_picks_awoken_form() {
        assert_eq!(best("awoken saria"), Some(101));
    }

    #[test]
    fn bare_name_prefers_highest_rarity_non_equip() {
        assert_eq!(best("saria"), Some(102));
        assert_eq!(best("hera"), Some(202));
    }

    #[test]
    fn negated_modifier_excludes_stage() {
        assert_eq!(best("saria -revo"), Some(101));
    }

    #[test]
    fn equip_modifier_selects_equip() {
        assert_eq!(best("saria equip"), Some(103));
    }

    #[test]
    fn multi_word_modifier_is_fused() {
        let resolution = resolution("super reincarnated hera");
        assert_eq!(resolution.best, Some(202));
        assert_eq!(resolution.trace.variant, TokenVariant::Merged);
    }

    #[test]
    fn awakening_count_and_color() {
        assert_eq!(best("3-tpa red"), Some(300));
    }

    #[test]
    fn nicknames_resolve_to_their_monster() {
        assert_eq!(best("fk"), Some(300));
        assert_eq!(best("flame lord"), Some(300));
        assert_eq!(best("samurai"), Some(400));
    }

    #[test]
    fn tree_name_override_covers_whole_tree() {
        let resolution = resolution("moon god");
        assert_eq!(resolution.candidates, BTreeSet::from([600, 601]));
    }

    #[test]
    fn full_base_name_picks_the_base() {
        assert_eq!(best("young hermes"), Some(700));
        assert_eq!(best("hermes"), Some(701));
    }

    #[test]
    fn numeric_id_wins() {
        assert_eq!(best("1234"), Some(1234));
    }

    #[test]
    fn single_modifier_is_absent_with_hint() {
        let resolution = resolution("legends");
        assert_eq!(resolution.best, None);
        assert!(resolution.candidates.is_empty());
        assert!(resolution.trace.hint.is_some());
    }

    #[test]
    fn empty_query_is_absent() {
        let resolution = resolution("   ");
        assert_eq!(resolution.best, None);
        assert!(resolution.matches.is_empty());
    }

    #[test]
    fn unknown_names_are_absent() {
        let resolution = resolution("qwertyuiop");
        assert_eq!(resolution.best, None);
        assert!(resolution.trace.hint.is_some());
    }

    #[test]
    fn typo_modifiers_still_match_and_are_reported() {
        let resolution = resolution("saria reincarnatd");
        assert_eq!(resolution.best, Some(102));
        assert_eq!(resolution.typo_mods(), &["reincarnatd".to_string()]);
    }

    #[test]
    fn negating_an_unknown_word_changes_nothing() {
        let plain = resolution("saria");
        let negated = resolution("saria -zzzz");
        assert_eq!(plain.best, negated.best);
        assert_eq!(plain.best_score(), negated.best_score());
        assert_eq!(plain.candidates, negated.candidates);
    }

    #[test]
    fn whitespace_is_collapsed() {
        assert_eq!(resolution("awoken   saria").best, resolution("awoken saria").best);
    }

    #[test]
    fn fluff_match_expands_to_whole_tree() {
        let resolution = resolution("circlet");
        assert_eq!(resolution.best, Some(103));
        assert_eq!(resolution.candidates, BTreeSet::from([100, 101, 102, 103]));
        let copied = resolution.matches.get(&100).map(|record| record.name_hits[0].source);
        assert_eq!(copied, Some(NameSource::FromEvo));
    }

    #[test]
    fn best_is_always_a_candidate() {
        for query in ["saria", "hera", "dark", "knight", "3-tpa red", "fk"] {
            let resolution = resolution(query);
            if let Some(best) = resolution.best {
                assert!(resolution.candidates.contains(&best), "{query}");
                assert_eq!(resolution.ranked.first(), Some(&best));
            }
        }
    }

    #[test]
    fn adding_a_name_never_grows_candidates() {
        let broad = resolution("knight");
        let narrow = resolution("knight flame");
        assert!(narrow.candidates.is_subset(&broad.candidates));
        assert_eq!(narrow.best, Some(300));
    }

    #[test]
    fn resolution_is_deterministic() {
        assert_eq!(resolution("awoken saria"), resolution("awoken saria"));
    }

    #[test]
    fn exact_tokens_skip_fuzzy_names() {
        assert_eq!(best("\"sari\""), None);
        assert_eq!(best("sari"), Some(102));
    }

    #[test]
    fn resolve_all_ranks_and_rejects_short_words() {
        let (graph, index) = fixture_index();
        let resolver = Resolver::new(&graph, &index, MatchThresholds::default());
        let ranked = resolver.resolve_all("knight", ResolveOptions::default());
        assert_eq!(ranked.ids.len(), 2);
        assert!(ranked.hint.is_none());

        let short = resolver.resolve_all("ra", ResolveOptions::default());
        assert!(short.ids.is_empty());
        assert!(short.hint.is_some());
    }

    #[test]
    fn bad_query_hints() {
        assert!(bad_query_hint("ヘ").is_some());
        assert!(bad_query_hint("ヘラ").is_none());
        assert!(bad_query_hint("abc").is_some());
        assert!(bad_query_hint("ab cd").is_none());
        assert!(bad_query_hint("hera").is_none());
    }
}
