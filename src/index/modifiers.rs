//! Modifier tokens carried by a single monster.

use std::collections::{BTreeMap, BTreeSet};

use crate::catalog::{Monster, MonsterGraph};
use crate::types::{EvoKind, SeriesType};
use crate::vocabulary::{
    EvoTag, MiscFlag, attribute_tokens, awakening_equivalence, awakening_tokens,
    dual_color_tokens, rarity_tokens, series_aliases, sub_attribute_tokens, type_tokens,
};

use super::tokenize::name_words;

const SERIES_STOP_WORDS: &[&str] = &["the", "and", "of", "series"];

/// A pantheon nickname resolved against a series name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pantheon {
    pub token: String,
    /// Lowercased series name the nickname applies to.
    pub series_name: String,
}

#[derive(Debug, Default)]
pub struct ModifierTokens {
    pub tokens: BTreeSet<String>,
    /// Catalog-derived tokens (`3-tpa`, `sa-7c`) that may trail a query.
    pub derived_suffixes: BTreeSet<String>,
}

impl ModifierTokens {
    fn add(&mut self, tokens: &[&str]) {
        self.tokens.extend(tokens.iter().map(ToString::to_string));
    }
}

/// Collect every modifier token `monster` carries.
#[must_use]
pub fn monster_modifiers(
    graph: &MonsterGraph,
    monster: &Monster,
    pantheons: &[Pantheon],
) -> ModifierTokens {
    let mut out = ModifierTokens::default();

    let (main, sub) = monster.attributes;
    out.add(attribute_tokens(main));
    out.tokens.extend(sub_attribute_tokens(sub));
    out.tokens.extend(dual_color_tokens(main, sub));

    for monster_type in &monster.types {
        out.add(type_tokens(*monster_type));
    }

    for tag in evo_tags(graph, monster) {
        out.add(tag.tokens());
    }

    add_awakenings(&mut out, monster);
    add_series(&mut out, monster, pantheons);

    for flag in misc_flags(graph, monster) {
        out.add(flag.tokens());
    }
    out.tokens.extend(rarity_tokens(monster.rarity));

    out
}

/// Evolution-stage labels, from the catalog edge kind and the monster's own name.
#[must_use]
pub fn evo_tags(graph: &MonsterGraph, monster: &Monster) -> Vec<EvoTag> {
    let kind = graph.true_evo_type(monster.id);
    let name = name_words(monster.name()).join(" ");
    let tree = graph.alt_tree_ids(monster.id);
    let mut tags = Vec::new();

    if graph.get_base_id(monster.id) == monster.id {
        tags.push(EvoTag::Base);
    }
    if tree.last().is_none_or(|newest| *newest == monster.id) {
        tags.push(EvoTag::New);
    }
    match kind {
        EvoKind::Normal => tags.push(EvoTag::Evo),
        EvoKind::Ultimate => tags.push(EvoTag::Uvo),
        _ => {}
    }

    let super_revo = kind == EvoKind::SuperReincarnated || name.contains("super reincarnated");
    let revo = !super_revo && (kind == EvoKind::Reincarnated || name.contains("reincarnated"));
    if super_revo {
        tags.push(EvoTag::SuperRevo);
    } else if revo {
        tags.push(EvoTag::Revo);
    } else {
        tags.push(EvoTag::NonRevo);
    }

    if name.contains("mega awoken") {
        tags.push(EvoTag::MegaAwoken);
    } else if name.contains("awoken") {
        tags.push(EvoTag::Awoken);
    }

    if kind == EvoKind::Pixel || name.starts_with("pixel") {
        tags.push(EvoTag::Pixel);
    } else {
        tags.push(EvoTag::NonPixel);
    }

    tags.push(if monster.is_equip() {
        EvoTag::Equip
    } else {
        EvoTag::NonEquip
    });

    tags.push(if graph.transforms_from(monster.id).is_empty() {
        EvoTag::NonTransform
    } else {
        EvoTag::Transform
    });

    tags
}

/// Plain tokens for every awakening, `sa-` tokens for supers and `<n>-`
/// count tokens for the regular block, where plus-awakenings count toward
/// their plain variant with their weight.
fn add_awakenings(out: &mut ModifierTokens, monster: &Monster) {
    for awakening in &monster.awakenings {
        out.add(awakening_tokens(*awakening));
        if let Some((_, plain)) = awakening_equivalence(*awakening) {
            out.add(awakening_tokens(plain));
        }
    }

    for awakening in monster.super_awakenings() {
        for token in awakening_tokens(*awakening) {
            let token = format!("sa-{token}");
            out.tokens.insert(token.clone());
            out.derived_suffixes.insert(token);
        }
    }

    let mut counts: BTreeMap<u32, u32> = BTreeMap::new();
    for awakening in monster.regular_awakenings() {
        *counts.entry(*awakening).or_default() += 1;
        if let Some((weight, plain)) = awakening_equivalence(*awakening) {
            *counts.entry(plain).or_default() += weight;
        }
    }
    for (awakening, count) in counts {
        for token in awakening_tokens(awakening) {
            for n in 1..=count {
                let token = format!("{n}-{token}");
                out.tokens.insert(token.clone());
                out.derived_suffixes.insert(token);
            }
        }
    }
}

fn add_series(out: &mut ModifierTokens, monster: &Monster, pantheons: &[Pantheon]) {
    let Some(series) = &monster.series else {
        return;
    };
    let series_name = series.name_en.to_lowercase();

    out.tokens.extend(
        name_words(&series.name_en)
            .into_iter()
            .filter(|word| word.chars().count() >= 3 && !SERIES_STOP_WORDS.contains(&word.as_str())),
    );
    out.add(&series_aliases(&series_name).collect::<Vec<_>>());
    out.tokens.extend(
        pantheons
            .iter()
            .filter(|pantheon| pantheon.series_name == series_name)
            .map(|pantheon| pantheon.token.clone()),
    );
}

fn misc_flags(graph: &MonsterGraph, monster: &Monster) -> Vec<MiscFlag> {
    let mut flags = vec![if monster.is_farmable {
        MiscFlag::Farmable
    } else {
        MiscFlag::NonFarmable
    }];
    if graph.monster_is_rem_evo(monster.id) {
        flags.push(MiscFlag::Rem);
    }
    if monster.in_pem {
        flags.push(MiscFlag::Pem);
    }
    if monster.in_mpshop {
        flags.push(MiscFlag::MpShop);
    }
    match monster.series_type() {
        Some(SeriesType::Regular) => flags.push(MiscFlag::Regular),
        Some(SeriesType::Event) => flags.push(MiscFlag::Event),
        Some(SeriesType::Seasonal) => flags.push(MiscFlag::Seasonal),
        Some(SeriesType::Collab | SeriesType::GhCollab) => flags.push(MiscFlag::Collab),
        Some(SeriesType::LowPriority) | None => {}
    }
    if monster.on_na {
        flags.push(MiscFlag::Na);
    } else if monster.on_jp {
        flags.push(MiscFlag::JpOnly);
    }
    flags
}
