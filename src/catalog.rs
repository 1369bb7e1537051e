//! Read-only monster catalog: SQLite reader, fetcher and evolution graph.

mod database;
mod fetch;
mod graph;
mod model;

pub use database::{load_catalog, open_catalog};
pub use fetch::fetch_catalog;
pub use graph::MonsterGraph;
pub use model::{
    AwokenSkill, CatalogData, EQUIP_AWAKENING, EvolutionEdge, EvolutionRecord, Monster, Series,
};
