//! Shared catalog fixture for unit tests.

use rusqlite::Connection;

use crate::catalog::{MonsterGraph, load_catalog};
use crate::index::{MonsterIndex, Overrides};

/// Schema plus a handful of monster trees that exercise the lookup rules.
pub const FIXTURE_SQL: &str = r"
CREATE TABLE awoken_skills (
    awoken_skill_id INTEGER PRIMARY KEY,
    name_en TEXT NOT NULL,
    name_ja TEXT NOT NULL DEFAULT '',
    desc_en TEXT NOT NULL DEFAULT ''
);
CREATE TABLE series (
    series_id INTEGER PRIMARY KEY,
    name_en TEXT NOT NULL,
    name_ja TEXT NOT NULL DEFAULT '',
    series_type TEXT
);
CREATE TABLE monsters (
    monster_id INTEGER PRIMARY KEY,
    monster_no_na INTEGER NOT NULL,
    name_en TEXT NOT NULL,
    name_ja TEXT NOT NULL DEFAULT '',
    name_en_override TEXT,
    attribute_1_id INTEGER NOT NULL,
    attribute_2_id INTEGER,
    type_1_id INTEGER NOT NULL,
    type_2_id INTEGER,
    type_3_id INTEGER,
    rarity INTEGER NOT NULL,
    series_id INTEGER,
    on_na INTEGER NOT NULL DEFAULT 1,
    on_jp INTEGER NOT NULL DEFAULT 1,
    is_farmable INTEGER NOT NULL DEFAULT 0,
    in_rem INTEGER NOT NULL DEFAULT 0,
    in_pem INTEGER NOT NULL DEFAULT 0,
    in_mpshop INTEGER NOT NULL DEFAULT 0
);
CREATE TABLE awakenings (
    monster_id INTEGER NOT NULL,
    awoken_skill_id INTEGER NOT NULL,
    is_super INTEGER NOT NULL DEFAULT 0,
    order_idx INTEGER NOT NULL
);
CREATE TABLE evolutions (
    from_id INTEGER NOT NULL,
    to_id INTEGER NOT NULL,
    evolution_type INTEGER NOT NULL,
    mat_1_id INTEGER,
    mat_2_id INTEGER,
    mat_3_id INTEGER,
    mat_4_id INTEGER,
    mat_5_id INTEGER,
    tstamp INTEGER
);
CREATE TABLE transformations (
    from_id INTEGER NOT NULL,
    to_id INTEGER NOT NULL
);

INSERT INTO awoken_skills (awoken_skill_id, name_en) VALUES
    (2, 'Enhanced Attack'),
    (10, 'Resistance-Bind'),
    (19, 'Extend Time'),
    (21, 'Skill Boost'),
    (27, 'Two-Pronged Attack'),
    (43, 'Enhanced Combos'),
    (48, 'Damage Void Piercer'),
    (49, 'Awoken Assist'),
    (51, 'Skill Charge'),
    (52, 'Resistance-Bind+'),
    (53, 'Extend Time+');

INSERT INTO series (series_id, name_en, series_type) VALUES
    (1, 'Goddesses', 'regular'),
    (2, 'Dawn Order', 'event'),
    (3, 'Samurai Legends', 'collab');

INSERT INTO monsters (monster_id, monster_no_na, name_en, name_ja, attribute_1_id, attribute_2_id,
                      type_1_id, type_2_id, rarity, series_id, on_na, is_farmable, in_rem) VALUES
    (100, 100, 'Saria', 'サリア', 1, 3, 3, NULL, 4, 1, 1, 0, 1),
    (101, 101, 'Awoken Saria', '覚醒サリア', 1, 3, 3, 5, 5, 1, 1, 0, 0),
    (102, 102, 'Reincarnated Saria', '転生サリア', 1, 3, 3, 5, 6, 1, 1, 0, 0),
    (103, 103, 'Saria''s Circlet', 'サリアの髪飾り', 1, 3, 3, NULL, 6, 1, 1, 0, 0),
    (200, 200, 'Hera', 'ヘラ', 4, NULL, 5, NULL, 5, 1, 1, 0, 1),
    (201, 201, 'Awoken Hera', '覚醒ヘラ', 4, 4, 5, 7, 6, 1, 1, 0, 0),
    (202, 202, 'Super Reincarnated Hera', '超転生ヘラ', 4, 0, 5, 7, 7, 1, 1, 0, 0),
    (300, 300, 'Flame Knight', '炎の騎士', 0, 0, 6, NULL, 5, 2, 1, 1, 0),
    (301, 301, 'Blaze Warden', '炎の番人', 0, NULL, 2, NULL, 4, 2, 1, 1, 0),
    (302, 302, 'Tidal Knight', '潮の騎士', 1, 1, 6, NULL, 5, 2, 1, 1, 0),
    (400, 400, 'Kenshin', '謙信', 2, 3, 6, NULL, 7, 3, 0, 0, 0),
    (500, 500, 'Ruby Dragon Fruit', 'ルビードラゴンフルーツ', 0, NULL, 0, NULL, 3, NULL, 1, 1, 0),
    (600, 600, 'Tsukuyomi', 'ツクヨミ', 4, NULL, 5, NULL, 5, 1, 1, 0, 0),
    (601, 601, 'Dark Tsukuyomi', '闇ツクヨミ', 4, 4, 5, 7, 6, 1, 1, 0, 0),
    (700, 700, 'Young Hermes', '幼きヘルメス', 3, NULL, 1, NULL, 4, 2, 1, 1, 0),
    (701, 701, 'Hermes', 'ヘルメス', 3, 3, 1, NULL, 5, 2, 1, 1, 0),
    (1234, 1234, 'Ra', 'ラー', 3, 0, 5, NULL, 7, 99, 1, 0, 1);

INSERT INTO awakenings (monster_id, awoken_skill_id, is_super, order_idx) VALUES
    (100, 21, 0, 0), (100, 10, 0, 1), (100, 27, 0, 2),
    (101, 21, 0, 0), (101, 10, 0, 1), (101, 27, 0, 2), (101, 27, 0, 3), (101, 51, 1, 4),
    (102, 52, 0, 0), (102, 27, 0, 1), (102, 27, 0, 2), (102, 27, 0, 3), (102, 43, 1, 4),
    (103, 49, 0, 0), (103, 27, 0, 1),
    (200, 2, 0, 0), (200, 21, 0, 1),
    (201, 2, 0, 0), (201, 21, 0, 1), (201, 27, 0, 2),
    (202, 2, 0, 0), (202, 21, 0, 1), (202, 27, 0, 2), (202, 27, 0, 3), (202, 48, 1, 4),
    (300, 27, 0, 0), (300, 27, 0, 1), (300, 27, 0, 2), (300, 21, 0, 3), (300, 27, 1, 4),
    (301, 27, 0, 0), (301, 21, 0, 1),
    (302, 27, 0, 0), (302, 27, 0, 1), (302, 27, 0, 2),
    (400, 43, 0, 0), (400, 21, 0, 1),
    (600, 21, 0, 0),
    (601, 21, 0, 0), (601, 27, 0, 1),
    (1234, 19, 0, 0), (1234, 19, 0, 1), (1234, 53, 0, 2);

INSERT INTO evolutions (from_id, to_id, evolution_type, mat_1_id, tstamp) VALUES
    (100, 101, 2, 500, 1500000000),
    (101, 102, 3, 500, 1550000000),
    (102, 103, 6, NULL, 1600000000),
    (200, 201, 2, NULL, NULL),
    (201, 202, 4, NULL, NULL),
    (700, 701, 1, NULL, NULL);

INSERT INTO transformations (from_id, to_id) VALUES (600, 601);
";

pub fn fixture_connection() -> Connection {
    let conn = Connection::open_in_memory().expect("in-memory sqlite");
    conn.execute_batch(FIXTURE_SQL).expect("fixture sql");
    conn
}

pub fn fixture_graph() -> MonsterGraph {
    let data = load_catalog(&fixture_connection()).expect("fixture catalog loads");
    MonsterGraph::new(data)
}

/// Curator overrides used by the resolver tests.
pub fn fixture_overrides() -> Overrides {
    serde_json::from_str(
        r#"{
            "nicknames": {"300": ["fk", "flame lord"], "400": ["samurai"]},
            "tree_names": {"600": ["moon god"]},
            "pantheons": {"warlords": "Samurai Legends"}
        }"#,
    )
    .expect("fixture overrides parse")
}

pub fn fixture_index() -> (MonsterGraph, MonsterIndex) {
    let graph = fixture_graph();
    let index = MonsterIndex::build(&graph, &fixture_overrides());
    (graph, index)
}
