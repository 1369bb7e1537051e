//! Inverted monster index, rebuilt on every catalog load.

mod builder;
mod modifiers;
mod overrides;
pub mod tokenize;

pub use builder::{IndexStats, MonsterIndex};
pub use overrides::Overrides;
