//! SQLite catalog reader.
//!
//! The catalog is read once per refresh into a [`CatalogData`] and the
//! connection is dropped; snapshots never keep a handle open.

use std::collections::HashMap;
use std::path::Path;

use chrono::DateTime;
use log::{debug, info};
use rusqlite::{Connection, OpenFlags};

use crate::error::Result;
use crate::types::{Attribute, EvoKind, MonsterId, MonsterType, SeriesType};

use super::model::{AwokenSkill, CatalogData, EvolutionEdge, EvolutionRecord, Monster, Series};

/// Open a catalog file read-only and load it into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or a required table is missing.
pub fn open_catalog(path: &Path) -> Result<CatalogData> {
    debug!("Opening catalog at {}", path.display());
    let conn = Connection::open_with_flags(
        path,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )?;
    load_catalog(&conn)
}

/// Load every table the lookup needs from an open connection.
///
/// # Errors
///
/// Returns an error if any query fails.
pub fn load_catalog(conn: &Connection) -> Result<CatalogData> {
    let awoken_skills = load_awoken_skills(conn)?;
    let series = load_series(conn)?;
    let awakenings = load_awakenings(conn)?;
    let monsters = load_monsters(conn, &series, awakenings)?;
    let evolutions = load_evolutions(conn)?;
    let transformations = load_transformations(conn)?;

    info!(
        "Loaded catalog: {} monsters, {} evolutions, {} transformations, {} awoken skills",
        monsters.len(),
        evolutions.len(),
        transformations.len(),
        awoken_skills.len()
    );

    Ok(CatalogData {
        monsters,
        evolutions,
        transformations,
        awoken_skills,
    })
}

fn load_awoken_skills(conn: &Connection) -> Result<Vec<AwokenSkill>> {
    let mut stmt = conn.prepare(
        "SELECT awoken_skill_id, name_en, name_ja, desc_en FROM awoken_skills ORDER BY awoken_skill_id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(AwokenSkill {
            id: row.get(0)?,
            name_en: row.get(1)?,
            name_ja: row.get(2)?,
            description: row.get(3)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn load_series(conn: &Connection) -> Result<HashMap<u32, Series>> {
    let mut stmt = conn.prepare("SELECT series_id, name_en, name_ja, series_type FROM series")?;
    let rows = stmt.query_map([], |row| {
        let series_type: Option<String> = row.get(3)?;
        Ok(Series {
            id: row.get(0)?,
            name_en: row.get(1)?,
            name_ja: row.get(2)?,
            series_type: series_type.and_then(|raw| raw.parse::<SeriesType>().ok()),
        })
    })?;

    let mut series = HashMap::new();
    for row in rows {
        let row = row?;
        series.insert(row.id, row);
    }
    Ok(series)
}

/// Awakenings per monster, regular block first, plus the super count.
fn load_awakenings(conn: &Connection) -> Result<HashMap<MonsterId, (Vec<u32>, usize)>> {
    let mut stmt = conn.prepare(
        "SELECT monster_id, awoken_skill_id, is_super FROM awakenings \
         ORDER BY monster_id, is_super, order_idx",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok((
            row.get::<_, MonsterId>(0)?,
            row.get::<_, u32>(1)?,
            row.get::<_, bool>(2)?,
        ))
    })?;

    let mut awakenings: HashMap<MonsterId, (Vec<u32>, usize)> = HashMap::new();
    for row in rows {
        let (monster_id, skill_id, is_super) = row?;
        let entry = awakenings.entry(monster_id).or_default();
        entry.0.push(skill_id);
        if is_super {
            entry.1 += 1;
        }
    }
    Ok(awakenings)
}

fn load_monsters(
    conn: &Connection,
    series: &HashMap<u32, Series>,
    mut awakenings: HashMap<MonsterId, (Vec<u32>, usize)>,
) -> Result<Vec<Monster>> {
    let mut stmt = conn.prepare(
        "SELECT monster_id, monster_no_na, name_en, name_ja, name_en_override, \
                attribute_1_id, attribute_2_id, type_1_id, type_2_id, type_3_id, \
                rarity, series_id, on_na, on_jp, is_farmable, in_rem, in_pem, in_mpshop \
         FROM monsters ORDER BY monster_id",
    )?;

    let rows = stmt.query_map([], |row| {
        let type_ids: [Option<i64>; 3] = [row.get(7)?, row.get(8)?, row.get(9)?];
        let series_id: Option<u32> = row.get(11)?;
        Ok((
            Monster {
                id: row.get(0)?,
                monster_no_na: row.get(1)?,
                name_en: row.get(2)?,
                name_ja: row.get(3)?,
                name_override: row.get(4)?,
                attributes: (
                    Attribute::from_id(row.get(5)?),
                    Attribute::from_id(row.get(6)?),
                ),
                types: type_ids
                    .into_iter()
                    .flatten()
                    .filter_map(MonsterType::from_id)
                    .collect(),
                awakenings: Vec::new(),
                super_count: 0,
                series: None,
                rarity: row.get(10)?,
                on_na: row.get(12)?,
                on_jp: row.get(13)?,
                is_farmable: row.get(14)?,
                in_rem: row.get(15)?,
                in_pem: row.get(16)?,
                in_mpshop: row.get(17)?,
            },
            series_id,
        ))
    })?;

    let mut monsters = Vec::new();
    for row in rows {
        let (mut monster, series_id) = row?;
        if let Some(series_id) = series_id {
            monster.series = series.get(&series_id).cloned();
            if monster.series.is_none() {
                debug!(
                    "Monster {} references missing series {series_id}",
                    monster.id
                );
            }
        }
        if let Some((list, super_count)) = awakenings.remove(&monster.id) {
            monster.awakenings = list;
            monster.super_count = super_count;
        }
        monsters.push(monster);
    }
    Ok(monsters)
}

fn load_evolutions(conn: &Connection) -> Result<Vec<EvolutionEdge>> {
    let mut stmt = conn.prepare(
        "SELECT from_id, to_id, evolution_type, mat_1_id, mat_2_id, mat_3_id, mat_4_id, mat_5_id, tstamp \
         FROM evolutions ORDER BY from_id, to_id",
    )?;
    let rows = stmt.query_map([], |row| {
        let materials: [Option<MonsterId>; 5] = [
            row.get(3)?,
            row.get(4)?,
            row.get(5)?,
            row.get(6)?,
            row.get(7)?,
        ];
        let tstamp: Option<i64> = row.get(8)?;
        Ok(EvolutionEdge {
            from: row.get(0)?,
            to: row.get(1)?,
            record: EvolutionRecord {
                kind: EvoKind::from_id(row.get(2)?),
                materials: materials.into_iter().flatten().collect(),
                timestamp: tstamp.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            },
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn load_transformations(conn: &Connection) -> Result<Vec<(MonsterId, MonsterId)>> {
    let mut stmt =
        conn.prepare("SELECT from_id, to_id FROM transformations ORDER BY from_id, to_id")?;
    let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}
