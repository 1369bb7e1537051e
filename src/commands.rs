//! Poise slash commands for monster lookup.

use std::fmt::Write as _;

use log::info;

use crate::bot::Data;
use crate::catalog::Monster;
use crate::error::{BotError, Result};
use crate::lookup::{Resolved, SearchResults};
use crate::resolver::{Resolution, ResolveOptions};
use crate::types::Attribute;

/// Context type for lookup commands.
type Context<'a> = poise::Context<'a, Data, BotError>;

const AUTOCOMPLETE_LIMIT: usize = 25;
const SEARCH_LIMIT: usize = 10;
/// Room left for the code fence inside Discord's 2000 character cap.
const DEBUG_REPLY_LIMIT: usize = 1900;

async fn autocomplete_monster(ctx: Context<'_>, partial: &str) -> Vec<String> {
    ctx.data().lookup.autocomplete(partial, AUTOCOMPLETE_LIMIT)
}

/// Look up a monster by name, nickname, id or modifiers.
#[poise::command(slash_command)]
pub async fn id(
    ctx: Context<'_>,
    #[description = "Monster query, e.g. \"revo saria\" or \"3-tpa red\""]
    #[autocomplete = "autocomplete_monster"]
    query: String,
) -> Result<()> {
    lookup_reply(ctx, &query, ResolveOptions::default()).await
}

/// Look up a monster, preferring ones released in NA.
#[poise::command(slash_command)]
pub async fn idna(
    ctx: Context<'_>,
    #[description = "Monster query"]
    #[autocomplete = "autocomplete_monster"]
    query: String,
) -> Result<()> {
    lookup_reply(ctx, &query, ResolveOptions { na_priority: true }).await
}

/// List the best matches for a query.
#[poise::command(slash_command)]
pub async fn idsearch(
    ctx: Context<'_>,
    #[description = "Monster query"]
    #[autocomplete = "autocomplete_monster"]
    query: String,
) -> Result<()> {
    let results = ctx
        .data()
        .lookup
        .resolve_all(&query, ResolveOptions::default())
        .await?;
    ctx.say(describe_search(&query, &results)).await?;
    info!(
        "Search by {} for {query:?} returned {} monsters",
        ctx.author().tag(),
        results.monsters.len()
    );
    Ok(())
}

/// Show how a query was interpreted.
#[poise::command(slash_command)]
pub async fn iddebug(
    ctx: Context<'_>,
    #[description = "Monster query"]
    #[autocomplete = "autocomplete_monster"]
    query: String,
) -> Result<()> {
    let resolved = ctx
        .data()
        .lookup
        .resolve(&query, ResolveOptions::default())
        .await?;
    ctx.say(debug_block(&resolved.resolution)?).await?;
    Ok(())
}

/// Show the size of the loaded monster index.
#[poise::command(slash_command)]
pub async fn idstats(ctx: Context<'_>) -> Result<()> {
    let stats = ctx.data().lookup.index_stats().await?;
    let index = stats.index;
    ctx.say(format!(
        "Catalog generation {} loaded {}\n\
         {} monsters, {} name tokens, {} fluff tokens, {} nicknames, \
         {} modifiers, {} suffixes, {} multi-word tokens",
        stats.generation,
        stats.loaded_at.format("%Y-%m-%d %H:%M UTC"),
        index.monsters,
        index.name_tokens,
        index.fluff_tokens,
        index.manual_tokens,
        index.modifiers,
        index.suffixes,
        index.multi_word_tokens,
    ))
    .await?;
    Ok(())
}

async fn lookup_reply(ctx: Context<'_>, query: &str, options: ResolveOptions) -> Result<()> {
    let resolved = ctx.data().lookup.resolve(query, options).await?;
    let reply = describe_resolution(query, &resolved);
    ctx.say(&reply).await?;
    info!("Answered {} with {:?}", ctx.author().tag(), resolved.resolution.best);
    Ok(())
}

/// One-line summary of a monster.
#[must_use]
pub fn describe_monster(monster: &Monster) -> String {
    let (main, sub) = monster.attributes;
    let attributes = if sub == Attribute::Nil {
        main.to_string()
    } else {
        format!("{main}/{sub}")
    };
    let types = monster
        .types
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("/");
    format!(
        "**No. {} {}** | {attributes} | {types} | {}*",
        monster.id,
        monster.name(),
        monster.rarity
    )
}

/// Reply text for a single lookup.
#[must_use]
pub fn describe_resolution(query: &str, resolved: &Resolved) -> String {
    let mut reply = match &resolved.monster {
        Some(monster) => describe_monster(monster),
        None => {
            let mut text = format!("No monster matched `{}`.", query.trim());
            if let Some(hint) = &resolved.resolution.trace.hint {
                let _ = write!(text, " {hint}");
            }
            text
        }
    };

    let typos = resolved.resolution.typo_mods();
    if !typos.is_empty() {
        let _ = write!(
            reply,
            "\nUnrecognized modifiers (matched fuzzily): {}",
            typos.join(", ")
        );
    }
    reply
}

/// Reply text for a ranked search, capped at the top matches.
#[must_use]
pub fn describe_search(query: &str, results: &SearchResults) -> String {
    if results.monsters.is_empty() {
        let mut text = format!("No monsters matched `{}`.", query.trim());
        if let Some(hint) = &results.hint {
            let _ = write!(text, " {hint}");
        }
        return text;
    }

    let mut text = String::new();
    for (rank, monster) in results.monsters.iter().take(SEARCH_LIMIT).enumerate() {
        let _ = writeln!(text, "{}. {}", rank + 1, describe_monster(monster));
    }
    let hidden = results.monsters.len().saturating_sub(SEARCH_LIMIT);
    if hidden > 0 {
        let _ = writeln!(text, "...and {hidden} more");
    }
    text.trim_end().to_string()
}

/// The resolution trace as a JSON code block that fits in one message.
///
/// # Errors
///
/// Returns an error if the trace cannot be serialized.
pub fn debug_block(resolution: &Resolution) -> Result<String> {
    let json = serde_json::to_string_pretty(&resolution.trace)?;
    let body = if json.chars().count() > DEBUG_REPLY_LIMIT {
        let cut: String = json.chars().take(DEBUG_REPLY_LIMIT).collect();
        format!("{cut}\n...")
    } else {
        json
    };
    Ok(format!("```json\n{body}\n```"))
}

/// Get available lookup commands.
#[must_use]
pub fn lookup_commands() -> Vec<poise::Command<Data, BotError>> {
    vec![id(), idna(), idsearch(), iddebug(), idstats()]
}
