//! Inverted index over monster names and modifiers.

use std::collections::{BTreeSet, HashMap};

use log::{debug, info};
use serde::Serialize;

use crate::catalog::MonsterGraph;
use crate::types::MonsterId;
use crate::vocabulary::{MULTI_WORD_TOKENS, curated_tokens};

use super::modifiers::{Pantheon, monster_modifiers};
use super::overrides::Overrides;
use super::tokenize::{name_words, tree_name_words};

type Bucket = HashMap<String, BTreeSet<MonsterId>>;

/// Token buckets for one catalog load. Immutable once built.
#[derive(Debug, Default)]
pub struct MonsterIndex {
    name_tokens: Bucket,
    fluff_tokens: Bucket,
    manual_tokens: Bucket,
    modifiers: HashMap<MonsterId, BTreeSet<String>>,
    all_name_tokens: BTreeSet<String>,
    all_modifiers: BTreeSet<String>,
    suffixes: BTreeSet<String>,
    /// Longest sequences first.
    multi_word_tokens: Vec<Vec<String>>,
    mwt_to_len: HashMap<String, usize>,
    monster_count: usize,
}

/// Bucket sizes, for introspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IndexStats {
    pub monsters: usize,
    pub name_tokens: usize,
    pub fluff_tokens: usize,
    pub manual_tokens: usize,
    pub modifiers: usize,
    pub suffixes: usize,
    pub multi_word_tokens: usize,
}

impl MonsterIndex {
    /// Build the index for every monster in `graph`.
    ///
    /// Override entries naming unknown monsters are skipped; construction
    /// never fails.
    #[must_use]
    pub fn build(graph: &MonsterGraph, overrides: &Overrides) -> Self {
        let mut index = Self {
            monster_count: graph.len(),
            suffixes: curated_tokens(),
            ..Self::default()
        };
        for words in MULTI_WORD_TOKENS {
            index.register_words(&words.iter().map(ToString::to_string).collect::<Vec<_>>());
        }

        let manual = index.manual_names(graph, overrides);
        let pantheons: Vec<Pantheon> = overrides
            .pantheons
            .iter()
            .filter_map(|(nickname, series_name)| {
                index.register_override(nickname).map(|token| Pantheon {
                    token,
                    series_name: series_name.to_lowercase(),
                })
            })
            .collect();

        let mut tree_names: HashMap<MonsterId, Vec<String>> = HashMap::new();
        for monster in graph.all_monsters() {
            let base_id = graph.get_base_id(monster.id);
            let tree_tokens = tree_names.entry(base_id).or_insert_with(|| {
                graph
                    .get(base_id)
                    .map(|base| {
                        let tree = graph.get_alt_tree(base_id);
                        tree_name_words(base.name(), tree.iter().map(|member| member.name()))
                    })
                    .unwrap_or_default()
            });

            let manual_set = manual.get(&monster.id).cloned().unwrap_or_default();
            let mut name_set: BTreeSet<String> = tree_tokens.iter().cloned().collect();
            name_set.extend(name_words(&monster.name_ja));
            name_set.insert(monster.id.to_string());
            if monster.monster_no_na != 0 {
                name_set.insert(monster.monster_no_na.to_string());
            }
            let fluff_set: BTreeSet<String> = name_words(monster.name())
                .into_iter()
                .filter(|word| !name_set.contains(word) && !manual_set.contains(word))
                .collect();
            name_set.retain(|word| !manual_set.contains(word));

            insert_all(&mut index.manual_tokens, &manual_set, monster.id);
            insert_all(&mut index.name_tokens, &name_set, monster.id);
            insert_all(&mut index.fluff_tokens, &fluff_set, monster.id);
            index.all_name_tokens.extend(manual_set);
            index.all_name_tokens.extend(name_set);
            index.all_name_tokens.extend(fluff_set);

            let modifiers = monster_modifiers(graph, monster, &pantheons);
            index.all_modifiers.extend(modifiers.tokens.iter().cloned());
            index.suffixes.extend(modifiers.derived_suffixes);
            index.modifiers.insert(monster.id, modifiers.tokens);
        }

        index.multi_word_tokens.sort_by(|left, right| {
            let left_len: usize = left.iter().map(String::len).sum();
            let right_len: usize = right.iter().map(String::len).sum();
            right_len.cmp(&left_len).then_with(|| left.cmp(right))
        });

        info!(
            "Built monster index: {} monsters, {} name tokens, {} modifiers",
            index.monster_count,
            index.all_name_tokens.len(),
            index.all_modifiers.len()
        );
        index
    }

    /// Manual tokens per monster, from per-monster nicknames and per-tree names.
    fn manual_names(
        &mut self,
        graph: &MonsterGraph,
        overrides: &Overrides,
    ) -> HashMap<MonsterId, BTreeSet<String>> {
        let mut manual: HashMap<MonsterId, BTreeSet<String>> = HashMap::new();

        for (id, nicknames) in &overrides.nicknames {
            if graph.get(*id).is_none() {
                debug!("Skipping nicknames for unknown monster {id}");
                continue;
            }
            for nickname in nicknames {
                if let Some(token) = self.register_override(nickname) {
                    manual.entry(*id).or_default().insert(token);
                }
            }
        }

        for (id, names) in &overrides.tree_names {
            let tree = graph.alt_tree_ids(*id);
            if tree.is_empty() {
                debug!("Skipping tree names for unknown monster {id}");
                continue;
            }
            for name in names {
                if let Some(token) = self.register_override(name) {
                    for member in tree {
                        manual.entry(*member).or_default().insert(token.clone());
                    }
                }
            }
        }

        manual
    }

    /// Fuse a curator phrase into one token, registering it as multi-word
    /// when it spans several words.
    fn register_override(&mut self, phrase: &str) -> Option<String> {
        let words = name_words(phrase);
        match words.len() {
            0 => None,
            1 => words.into_iter().next(),
            _ => Some(self.register_words(&words)),
        }
    }

    fn register_words(&mut self, words: &[String]) -> String {
        let fused = words.concat();
        let len = self.mwt_to_len.entry(fused.clone()).or_insert(1);
        *len = (*len).max(words.len());
        if !self.multi_word_tokens.iter().any(|known| known == words) {
            self.multi_word_tokens.push(words.to_vec());
        }
        fused
    }

    #[must_use]
    pub fn name_bucket(&self, token: &str) -> Option<&BTreeSet<MonsterId>> {
        self.name_tokens.get(token)
    }

    #[must_use]
    pub fn fluff_bucket(&self, token: &str) -> Option<&BTreeSet<MonsterId>> {
        self.fluff_tokens.get(token)
    }

    #[must_use]
    pub fn manual_bucket(&self, token: &str) -> Option<&BTreeSet<MonsterId>> {
        self.manual_tokens.get(token)
    }

    #[must_use]
    pub fn modifiers_of(&self, id: MonsterId) -> Option<&BTreeSet<String>> {
        self.modifiers.get(&id)
    }

    #[must_use]
    pub fn all_name_tokens(&self) -> &BTreeSet<String> {
        &self.all_name_tokens
    }

    #[must_use]
    pub fn all_modifiers(&self) -> &BTreeSet<String> {
        &self.all_modifiers
    }

    #[must_use]
    pub fn suffixes(&self) -> &BTreeSet<String> {
        &self.suffixes
    }

    #[must_use]
    pub fn is_name_token(&self, token: &str) -> bool {
        self.all_name_tokens.contains(token)
    }

    #[must_use]
    pub fn is_modifier(&self, token: &str) -> bool {
        self.all_modifiers.contains(token)
    }

    #[must_use]
    pub fn is_manual_token(&self, token: &str) -> bool {
        self.manual_tokens.contains_key(token)
    }

    #[must_use]
    pub fn multi_word_tokens(&self) -> &[Vec<String>] {
        &self.multi_word_tokens
    }

    /// Words in the longest multi-word token fusing to `token`; 1 otherwise.
    #[must_use]
    pub fn mwt_len(&self, token: &str) -> usize {
        self.mwt_to_len.get(token).copied().unwrap_or(1)
    }

    #[must_use]
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            monsters: self.monster_count,
            name_tokens: self.name_tokens.len(),
            fluff_tokens: self.fluff_tokens.len(),
            manual_tokens: self.manual_tokens.len(),
            modifiers: self.all_modifiers.len(),
            suffixes: self.suffixes.len(),
            multi_word_tokens: self.multi_word_tokens.len(),
        }
    }
}

fn insert_all(bucket: &mut Bucket, tokens: &BTreeSet<String>, id: MonsterId) {
    for token in tokens {
        bucket.entry(token.clone()).or_default().insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::fixture_index;

    fn bucket_snapshot(bucket: Option<&BTreeSet<MonsterId>>) -> Vec<MonsterId> {
        bucket.map(|ids| ids.iter().copied().collect()).unwrap_or_default()
    }

    #[test]
    fn tree_name_reaches_every_member() {
        let (_, index) = fixture_index();
        assert_eq!(
            bucket_snapshot(index.name_bucket("saria")),
            vec![100, 101, 102, 103]
        );
        assert_eq!(bucket_snapshot(index.name_bucket("hera")), vec![200, 201, 202]);
    }

    #[test]
    fn residual_words_are_fluff() {
        let (_, index) = fixture_index();
        assert_eq!(bucket_snapshot(index.fluff_bucket("awoken")), vec![101, 201]);
        assert_eq!(bucket_snapshot(index.fluff_bucket("circlet")), vec![103]);
        assert!(index.fluff_bucket("saria").is_none());
    }

    #[test]
    fn base_only_words_stay_fluff_on_the_base() {
        let (_, index) = fixture_index();
        assert_eq!(bucket_snapshot(index.name_bucket("hermes")), vec![700, 701]);
        assert_eq!(bucket_snapshot(index.fluff_bucket("young")), vec![700]);
        assert!(index.name_bucket("young").is_none());
    }

    #[test]
    fn ids_and_japanese_names_are_name_tokens() {
        let (_, index) = fixture_index();
        assert_eq!(bucket_snapshot(index.name_bucket("1234")), vec![1234]);
        assert_eq!(bucket_snapshot(index.name_bucket("ヘラ")), vec![200]);
    }

    #[test]
    fn overrides_become_manual_tokens() {
        let (_, index) = fixture_index();
        assert_eq!(bucket_snapshot(index.manual_bucket("fk")), vec![300]);
        assert_eq!(bucket_snapshot(index.manual_bucket("flamelord")), vec![300]);
        assert_eq!(bucket_snapshot(index.manual_bucket("moongod")), vec![600, 601]);
        assert_eq!(index.mwt_len("flamelord"), 2);
        assert_eq!(index.mwt_len("fk"), 1);
        assert!(
            index
                .multi_word_tokens()
                .contains(&vec!["moon".to_string(), "god".to_string()])
        );
    }

    #[test]
    fn buckets_are_disjoint_per_monster() {
        let (graph, index) = fixture_index();
        for token in index.all_name_tokens() {
            for monster in graph.all_monsters() {
                let hits = [
                    index.manual_bucket(token),
                    index.name_bucket(token),
                    index.fluff_bucket(token),
                ]
                .into_iter()
                .filter(|bucket| bucket.is_some_and(|ids| ids.contains(&monster.id)))
                .count();
                assert!(hits <= 1, "{token} is in several buckets of {}", monster.id);
            }
        }
    }

    #[test]
    fn multi_word_tokens_are_longest_first() {
        let (_, index) = fixture_index();
        let lengths: Vec<usize> = index
            .multi_word_tokens()
            .iter()
            .map(|words| words.iter().map(String::len).sum())
            .collect();
        assert!(lengths.windows(2).all(|pair| pair[0] >= pair[1]));
        assert_eq!(
            index.multi_word_tokens().first(),
            Some(&vec!["super".to_string(), "reincarnated".to_string()])
        );
    }

    #[test]
    fn catalog_derived_suffixes_and_modifiers() {
        let (_, index) = fixture_index();
        assert!(index.suffixes().contains("3-tpa"));
        assert!(index.suffixes().contains("red"));
        assert!(!index.suffixes().contains("legends"));
        assert!(index.is_modifier("legends"));
        assert!(index.is_modifier("warlords"));
        assert!(index.modifiers_of(102).is_some_and(|tokens| tokens.contains("2-bindres")));
    }

    #[test]
    fn stats_count_buckets() {
        let (graph, index) = fixture_index();
        let stats = index.stats();
        assert_eq!(stats.monsters, graph.len());
        assert_eq!(stats.manual_tokens, 4);
        assert!(stats.name_tokens > 0 && stats.fluff_tokens > 0);
    }
}
