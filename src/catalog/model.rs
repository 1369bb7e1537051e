//! Read-only monster catalog records.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{Attribute, EvoKind, MonsterId, MonsterType, SeriesType};

/// Awakening id that marks a monster as an equip (assist) form.
pub const EQUIP_AWAKENING: u32 = 49;

/// Static awoken-skill metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AwokenSkill {
    pub id: u32,
    pub name_en: String,
    pub name_ja: String,
    pub description: String,
}

/// Named grouping of monsters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Series {
    pub id: u32,
    pub name_en: String,
    pub name_ja: String,
    pub series_type: Option<SeriesType>,
}

/// A single catalog monster.
#[derive(Debug, Clone, Serialize)]
pub struct Monster {
    pub id: MonsterId,
    pub monster_no_na: u32,
    pub name_en: String,
    pub name_ja: String,
    pub name_override: Option<String>,
    /// (primary, secondary)
    pub attributes: (Attribute, Attribute),
    pub types: Vec<MonsterType>,
    /// Regular awakenings followed by the `super_count` super awakenings.
    pub awakenings: Vec<u32>,
    pub super_count: usize,
    pub series: Option<Series>,
    pub rarity: u8,
    pub on_na: bool,
    pub on_jp: bool,
    pub is_farmable: bool,
    pub in_rem: bool,
    pub in_pem: bool,
    pub in_mpshop: bool,
}

impl Monster {
    /// Display name: the curator override when present, else the English name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name_override.as_deref().unwrap_or(&self.name_en)
    }

    #[must_use]
    pub fn regular_awakenings(&self) -> &[u32] {
        &self.awakenings[..self.awakenings.len().saturating_sub(self.super_count)]
    }

    #[must_use]
    pub fn super_awakenings(&self) -> &[u32] {
        &self.awakenings[self.awakenings.len().saturating_sub(self.super_count)..]
    }

    #[must_use]
    pub fn is_equip(&self) -> bool {
        self.awakenings.contains(&EQUIP_AWAKENING)
    }

    #[must_use]
    pub fn series_type(&self) -> Option<SeriesType> {
        self.series.as_ref().and_then(|series| series.series_type)
    }
}

/// Metadata attached to an evolution edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvolutionRecord {
    pub kind: EvoKind,
    pub materials: Vec<MonsterId>,
    pub timestamp: Option<DateTime<Utc>>,
}

/// Directed evolution edge as stored in the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvolutionEdge {
    pub from: MonsterId,
    pub to: MonsterId,
    pub record: EvolutionRecord,
}

/// Everything read from one catalog file.
#[derive(Debug, Default)]
pub struct CatalogData {
    pub monsters: Vec<Monster>,
    pub evolutions: Vec<EvolutionEdge>,
    pub transformations: Vec<(MonsterId, MonsterId)>,
    pub awoken_skills: Vec<AwokenSkill>,
}
