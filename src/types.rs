//! Common domain types shared by the catalog, index and resolver.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Stable monster identifier. Lower ids were released earlier.
pub type MonsterId = u32;

/// Orb attribute of a monster.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum Attribute {
    Fire,
    Water,
    Wood,
    Light,
    Dark,
    /// Attribute id the catalog carries but we do not know
    Unknown,
    /// No attribute (secondary slot left empty)
    Nil,
}

impl Attribute {
    /// Maps a catalog attribute id. A missing id means "no attribute".
    #[must_use]
    pub fn from_id(id: Option<i64>) -> Self {
        match id {
            Some(0) => Attribute::Fire,
            Some(1) => Attribute::Water,
            Some(2) => Attribute::Wood,
            Some(3) => Attribute::Light,
            Some(4) => Attribute::Dark,
            Some(6) | None => Attribute::Nil,
            Some(_) => Attribute::Unknown,
        }
    }
}

/// Monster type. A monster carries up to three.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display, EnumIter,
)]
pub enum MonsterType {
    Evolve,
    Balanced,
    Physical,
    Healer,
    Dragon,
    God,
    Attacker,
    Devil,
    Machine,
    Awoken,
    Enhance,
    Vendor,
}

impl MonsterType {
    #[must_use]
    pub fn from_id(id: i64) -> Option<Self> {
        match id {
            0 => Some(MonsterType::Evolve),
            1 => Some(MonsterType::Balanced),
            2 => Some(MonsterType::Physical),
            3 => Some(MonsterType::Healer),
            4 => Some(MonsterType::Dragon),
            5 => Some(MonsterType::God),
            6 => Some(MonsterType::Attacker),
            7 => Some(MonsterType::Devil),
            8 => Some(MonsterType::Machine),
            12 => Some(MonsterType::Awoken),
            14 => Some(MonsterType::Enhance),
            15 => Some(MonsterType::Vendor),
            _ => None,
        }
    }

    /// Material types: monsters that exist to be fed to other monsters.
    #[must_use]
    pub fn is_fodder(self) -> bool {
        matches!(
            self,
            MonsterType::Evolve | MonsterType::Enhance | MonsterType::Awoken | MonsterType::Vendor
        )
    }
}

/// Stage class of an evolution edge (or `Base` for a monster with no parent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum EvoKind {
    Base,
    Normal,
    Ultimate,
    Reincarnated,
    SuperReincarnated,
    Pixel,
    Assist,
}

impl EvoKind {
    /// Maps the catalog `evolution_type` column.
    #[must_use]
    pub fn from_id(id: i64) -> Self {
        match id {
            2 => EvoKind::Ultimate,
            3 => EvoKind::Reincarnated,
            4 => EvoKind::SuperReincarnated,
            5 => EvoKind::Pixel,
            6 => EvoKind::Assist,
            _ => EvoKind::Normal,
        }
    }
}

/// Kind of series a monster belongs to, used for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SeriesType {
    Regular,
    Event,
    Seasonal,
    Collab,
    #[strum(serialize = "ghcollab")]
    GhCollab,
    #[strum(serialize = "lowpriority")]
    LowPriority,
}

impl SeriesType {
    /// Ranking weight of the series type; a monster without series weighs 0.
    #[must_use]
    pub fn priority(series_type: Option<Self>) -> u8 {
        match series_type {
            Some(SeriesType::Regular | SeriesType::Event) => 4,
            Some(SeriesType::Seasonal) => 3,
            Some(SeriesType::GhCollab) => 2,
            Some(SeriesType::Collab) => 1,
            Some(SeriesType::LowPriority) | None => 0,
        }
    }
}
