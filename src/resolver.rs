//! Free-text monster lookup.
//!
//! A query is normalized, split into modifier and name tokens, matched
//! against the [`MonsterIndex`](crate::index::MonsterIndex), expanded to
//! whole evolution trees, filtered by modifiers and ranked.

mod engine;
mod priority;
mod query;
mod scoring;

pub use engine::{
    MatchRecord, ModifierHit, NameHit, NameSource, RankedMonsters, Resolution, ResolveOptions,
    ResolveTrace, Resolver, TokenVariant, bad_query_hint,
};
pub use priority::{MonsterPriority, RankContext};
pub use query::{QuerySplit, Token};
pub use scoring::{jaro_winkler, ratio_modifier, ratio_name};
