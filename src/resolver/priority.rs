//! Tie-break ordering between candidate monsters.
//!
//! Keys are compared in field order, higher first. New tie-breakers go at
//! the end, just before `older_monster`, so existing orderings keep holding.

use std::cmp::{Ordering, Reverse};

use crate::catalog::{Monster, MonsterGraph};
use crate::types::{MonsterId, SeriesType};

/// Ids above this are NA-only renumberings.
const NA_ID_FLOOR: MonsterId = 10_000;

/// Query-wide inputs to the priority key.
#[derive(Debug, Clone, Copy, Default)]
pub struct RankContext {
    /// A `new` or `base` modifier lets equips compete equally.
    pub equips_allowed: bool,
    /// The query contains a run of four digits.
    pub numeric_query: bool,
    /// The caller prefers monsters released in NA.
    pub na_priority: bool,
}

/// Ranking key for one candidate. Compare with [`Ord`]; greater wins.
#[derive(Debug, Clone, Copy)]
pub struct MonsterPriority {
    pub score: f64,
    pub not_equip_unless_allowed: bool,
    pub na_id_for_numeric_query: bool,
    pub series_priority: u8,
    pub na_collab: bool,
    pub rem_evo: bool,
    pub not_all_fodder: bool,
    pub no_fodder: bool,
    pub older_tree: Reverse<MonsterId>,
    pub na_when_requested: bool,
    pub not_equip: bool,
    pub rarity: u8,
    pub monster_no_na: u32,
    /// Final key so that ranking is a total order.
    pub older_monster: Reverse<MonsterId>,
}

impl MonsterPriority {
    #[must_use]
    pub fn new(graph: &MonsterGraph, monster: &Monster, score: f64, context: RankContext) -> Self {
        let series_type = monster.series_type();
        Self {
            score,
            not_equip_unless_allowed: context.equips_allowed || !monster.is_equip(),
            na_id_for_numeric_query: monster.id > NA_ID_FLOOR && context.numeric_query,
            series_priority: SeriesType::priority(series_type),
            na_collab: series_type != Some(SeriesType::Collab) || monster.on_na,
            rem_evo: graph.monster_is_rem_evo(monster.id),
            not_all_fodder: !monster.types.iter().all(|t| t.is_fodder()),
            no_fodder: !monster.types.iter().any(|t| t.is_fodder()),
            older_tree: Reverse(graph.get_base_id(monster.id)),
            na_when_requested: !context.na_priority || monster.on_na,
            not_equip: !monster.is_equip(),
            rarity: monster.rarity,
            monster_no_na: monster.monster_no_na,
            older_monster: Reverse(monster.id),
        }
    }
}

impl PartialEq for MonsterPriority {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for MonsterPriority {}

impl PartialOrd for MonsterPriority {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MonsterPriority {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then(self.not_equip_unless_allowed.cmp(&other.not_equip_unless_allowed))
            .then(self.na_id_for_numeric_query.cmp(&other.na_id_for_numeric_query))
            .then(self.series_priority.cmp(&other.series_priority))
            .then(self.na_collab.cmp(&other.na_collab))
            .then(self.rem_evo.cmp(&other.rem_evo))
            .then(self.not_all_fodder.cmp(&other.not_all_fodder))
            .then(self.no_fodder.cmp(&other.no_fodder))
            .then(self.older_tree.cmp(&other.older_tree))
            .then(self.na_when_requested.cmp(&other.na_when_requested))
            .then(self.not_equip.cmp(&other.not_equip))
            .then(self.rarity.cmp(&other.rarity))
            .then(self.monster_no_na.cmp(&other.monster_no_na))
            .then(self.older_monster.cmp(&other.older_monster))
    }
}

/// Whether `query` has a run of at least four ASCII digits.
#[must_use]
pub fn has_four_digit_run(query: &str) -> bool {
    let mut run = 0;
    for c in query.chars() {
        if c.is_ascii_digit() {
            run += 1;
            if run >= 4 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}
