//! Curated token vocabulary: how the community spells colors, types,
//! awakenings, evolution stages and availability flags.

use std::collections::BTreeSet;

use strum::{EnumIter, IntoEnumIterator};

use crate::types::{Attribute, MonsterType};

/// Word sequences fused into one token before matching.
pub const MULTI_WORD_TOKENS: &[&[&str]] = &[
    &["super", "reincarnated"],
    &["mega", "awoken"],
    &["skill", "boost"],
    &["two", "pronged"],
    &["new", "year"],
];

/// Highest rarity that gets `<n>*` tokens in the curated set.
const MAX_RARITY: u8 = 10;

/// Tokens for a monster's main attribute.
#[must_use]
pub fn attribute_tokens(attribute: Attribute) -> &'static [&'static str] {
    match attribute {
        Attribute::Fire => &["r", "red", "fire"],
        Attribute::Water => &["b", "blue", "water"],
        Attribute::Wood => &["g", "green", "wood"],
        Attribute::Light => &["l", "light", "yellow"],
        Attribute::Dark => &["d", "dark", "purple"],
        Attribute::Nil => &["x", "nil", "none"],
        Attribute::Unknown => &[],
    }
}

/// Tokens for the secondary attribute: the main tokens prefixed with `?`.
#[must_use]
pub fn sub_attribute_tokens(attribute: Attribute) -> Vec<String> {
    attribute_tokens(attribute)
        .iter()
        .map(|token| format!("?{token}"))
        .collect()
}

/// Dual-color tokens such as `rb`, `r/b` and `red/blue`.
///
/// A Nil secondary only yields the single-letter forms (`rx`, `r/x`); a Nil
/// main attribute yields nothing.
#[must_use]
pub fn dual_color_tokens(main: Attribute, sub: Attribute) -> Vec<String> {
    if matches!(main, Attribute::Nil | Attribute::Unknown) || sub == Attribute::Unknown {
        return Vec::new();
    }
    let (Some(main_letter), Some(sub_letter)) = (
        attribute_tokens(main).first(),
        attribute_tokens(sub).first(),
    ) else {
        return Vec::new();
    };

    let mut tokens = vec![
        format!("{main_letter}{sub_letter}"),
        format!("{main_letter}/{sub_letter}"),
    ];
    if sub != Attribute::Nil
        && let (Some(main_word), Some(sub_word)) =
            (attribute_tokens(main).get(1), attribute_tokens(sub).get(1))
    {
        tokens.push(format!("{main_word}/{sub_word}"));
    }
    tokens
}

#[must_use]
pub fn type_tokens(monster_type: MonsterType) -> &'static [&'static str] {
    match monster_type {
        MonsterType::Evolve => &["evolve", "evomat"],
        MonsterType::Balanced => &["balanced", "bal"],
        MonsterType::Physical => &["physical", "phys"],
        MonsterType::Healer => &["healer"],
        MonsterType::Dragon => &["dragon", "dra"],
        MonsterType::God => &["god"],
        MonsterType::Attacker => &["attacker", "atk"],
        MonsterType::Devil => &["devil", "dev"],
        MonsterType::Machine => &["machine", "mech"],
        MonsterType::Awoken => &["awakening"],
        MonsterType::Enhance => &["enhance"],
        MonsterType::Vendor => &["vendor", "redeemable"],
    }
}

/// Evolution-stage labels a monster can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum EvoTag {
    Base,
    Evo,
    Uvo,
    Revo,
    SuperRevo,
    Pixel,
    NonPixel,
    Equip,
    NonEquip,
    Awoken,
    MegaAwoken,
    Transform,
    NonTransform,
    New,
    NonRevo,
}

impl EvoTag {
    #[must_use]
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            EvoTag::Base => &["base"],
            EvoTag::Evo => &["evo"],
            EvoTag::Uvo => &["uvo", "uevo", "ult", "ultimate"],
            EvoTag::Revo => &["revo", "reincarnated", "rv"],
            EvoTag::SuperRevo => &["srevo", "superreincarnated", "super", "sr"],
            EvoTag::Pixel => &["pixel", "dot"],
            EvoTag::NonPixel => &["nonpixel"],
            EvoTag::Equip => &["equip", "assist", "eq"],
            EvoTag::NonEquip => &["nonequip"],
            EvoTag::Awoken => &["awoken", "awo"],
            EvoTag::MegaAwoken => &["megaawoken", "mega"],
            EvoTag::Transform => &["transform", "trans"],
            EvoTag::NonTransform => &["nontrans", "nontransform"],
            EvoTag::New => &["new"],
            EvoTag::NonRevo => &["nonrevo"],
        }
    }
}

/// Availability, server and series-kind flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum MiscFlag {
    Farmable,
    NonFarmable,
    Rem,
    Pem,
    MpShop,
    Regular,
    Event,
    Seasonal,
    Collab,
    Na,
    JpOnly,
}

impl MiscFlag {
    #[must_use]
    pub fn tokens(self) -> &'static [&'static str] {
        match self {
            MiscFlag::Farmable => &["farmable", "farm"],
            MiscFlag::NonFarmable => &["nonfarmable", "nf"],
            MiscFlag::Rem => &["rem", "gacha"],
            MiscFlag::Pem => &["pem"],
            MiscFlag::MpShop => &["mp", "mpshop"],
            MiscFlag::Regular => &["regular"],
            MiscFlag::Event => &["event"],
            MiscFlag::Seasonal => &["seasonal"],
            MiscFlag::Collab => &["collab"],
            MiscFlag::Na => &["na"],
            MiscFlag::JpOnly => &["jp", "jponly"],
        }
    }
}

/// Tokens for an awoken skill id. Unknown ids have none.
#[must_use]
pub fn awakening_tokens(awakening: u32) -> &'static [&'static str] {
    match awakening {
        1 => &["hp+", "enhp"],
        2 => &["atk+", "enatk"],
        3 => &["rcv+", "enrcv"],
        4 => &["rres", "fireres"],
        5 => &["bres", "waterres"],
        6 => &["gres", "woodres"],
        7 => &["lres", "lightres"],
        8 => &["dres", "darkres"],
        9 => &["autoheal", "autorcv"],
        10 => &["bindres", "br"],
        11 => &["blindres", "blind"],
        12 => &["jammerres", "jammer"],
        13 => &["poisonres", "poison"],
        14 => &["roe", "fireoe"],
        15 => &["boe", "wateroe"],
        16 => &["goe", "woodoe"],
        17 => &["loe", "lightoe"],
        18 => &["doe", "darkoe"],
        19 => &["te", "extend"],
        20 => &["bindrcv", "rcvbind"],
        21 => &["sb", "skillboost"],
        22 => &["rrow", "firerow"],
        23 => &["brow", "waterrow"],
        24 => &["grow", "woodrow"],
        25 => &["lrow", "lightrow"],
        26 => &["drow", "darkrow"],
        27 => &["tpa", "pronged", "twopronged"],
        28 => &["sbr", "skillbindres"],
        29 => &["hoe", "healoe"],
        30 => &["multiboost", "coop"],
        31 => &["dk", "dragonkiller"],
        32 => &["gk", "godkiller"],
        33 => &["devk", "devilkiller"],
        34 => &["mk", "machinekiller"],
        35 => &["bk", "balancedkiller"],
        36 => &["ak", "attackerkiller"],
        37 => &["pk", "physicalkiller"],
        38 => &["hk", "healerkiller"],
        39 => &["evok", "evokiller"],
        40 => &["awakk", "awakeningkiller"],
        41 => &["enhk", "enhancekiller"],
        42 => &["vendork", "vendorkiller"],
        43 => &["7c", "sevencombo"],
        44 => &["gb", "guardbreak"],
        45 => &["fua", "bonusattack"],
        46 => &["teamhp"],
        47 => &["teamrcv"],
        48 => &["vdp", "voidpen"],
        49 => &["awokenassist", "assistawk"],
        50 => &["sfua", "superbonusattack"],
        51 => &["sc", "skillcharge"],
        52 => &["br+", "bindres+"],
        53 => &["te+", "extend+"],
        54 => &["cloudres", "cloud"],
        55 => &["taperes", "tape"],
        56 => &["sb+", "skillboost+"],
        57 => &["highhp", "hp80"],
        58 => &["lowhp", "hp50"],
        59 => &["lshield", "lguard"],
        60 => &["lunlock", "lattack"],
        61 => &["10c", "tencombo"],
        62 => &["comboorb", "combo"],
        63 => &["voice", "skillvoice"],
        64 => &["dungeonbonus"],
        65 => &["hp-", "lesshp"],
        66 => &["atk-", "lessatk"],
        67 => &["rcv-", "lessrcv"],
        68 => &["blind+", "blindres+"],
        69 => &["jammer+", "jammerres+"],
        70 => &["poison+", "poisonres+"],
        71 => &["jammerboost", "jammerblessing"],
        72 => &["poisonboost", "poisonblessing"],
        73 => &["rcombo", "firecombo"],
        74 => &["bcombo", "watercombo"],
        75 => &["gcombo", "woodcombo"],
        76 => &["lcombo", "lightcombo"],
        77 => &["dcombo", "darkcombo"],
        78 => &["cross", "crossattack"],
        79 => &["tricolor", "3color"],
        80 => &["quadcolor", "4color"],
        81 => &["pentacolor", "5color"],
        _ => &[],
    }
}

/// Plus-awakenings that count as several of a plain one: `(weight, plain id)`.
#[must_use]
pub fn awakening_equivalence(awakening: u32) -> Option<(u32, u32)> {
    match awakening {
        52 => Some((2, 10)),
        53 => Some((2, 19)),
        56 => Some((2, 21)),
        68 => Some((5, 11)),
        69 => Some((5, 12)),
        70 => Some((5, 13)),
        _ => None,
    }
}

/// Seasonal aliases keyed by a phrase found in the lowercased series name.
const SERIES_ALIASES: &[(&str, &[&str])] = &[
    ("halloween", &["halloween", "hw"]),
    ("christmas", &["christmas", "xmas"]),
    ("valentine", &["valentines", "vday"]),
    ("new year", &["newyear", "ny"]),
    ("bride", &["bride", "wedding"]),
    ("wedding", &["bride", "wedding"]),
    ("summer", &["summer", "beach"]),
    ("beach", &["summer", "beach"]),
    ("easter", &["easter"]),
    ("school", &["school", "academy"]),
    ("academy", &["school", "academy"]),
];

/// Curated aliases for a lowercased series name.
pub fn series_aliases(series_name: &str) -> impl Iterator<Item = &'static str> + '_ {
    SERIES_ALIASES
        .iter()
        .filter(move |(needle, _)| series_name.contains(needle))
        .flat_map(|(_, aliases)| aliases.iter().copied())
}

#[must_use]
pub fn rarity_tokens(rarity: u8) -> [String; 2] {
    [format!("{rarity}*"), format!("{rarity}star")]
}

/// Every hand-curated modifier token. These are the tokens admissible as
/// trailing modifiers before any catalog-derived ones are added.
#[must_use]
pub fn curated_tokens() -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();
    let attributes: Vec<Attribute> = Attribute::iter()
        .filter(|attribute| *attribute != Attribute::Unknown)
        .collect();

    for main in &attributes {
        tokens.extend(attribute_tokens(*main).iter().map(ToString::to_string));
        tokens.extend(sub_attribute_tokens(*main));
        for sub in &attributes {
            tokens.extend(dual_color_tokens(*main, *sub));
        }
    }
    for monster_type in MonsterType::iter() {
        tokens.extend(type_tokens(monster_type).iter().map(ToString::to_string));
    }
    for tag in EvoTag::iter() {
        tokens.extend(tag.tokens().iter().map(ToString::to_string));
    }
    for flag in MiscFlag::iter() {
        tokens.extend(flag.tokens().iter().map(ToString::to_string));
    }
    for awakening in 1..=81 {
        tokens.extend(awakening_tokens(awakening).iter().map(ToString::to_string));
    }
    for (_, aliases) in SERIES_ALIASES {
        tokens.extend(aliases.iter().map(ToString::to_string));
    }
    for rarity in 1..=MAX_RARITY {
        tokens.extend(rarity_tokens(rarity));
    }
    tokens
}
