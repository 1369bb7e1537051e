//! Curator-authored name overrides, read as JSON from a file or URL.

use std::collections::BTreeMap;

use log::{info, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::config::DataSource;
use crate::error::{BotError, Result};
use crate::types::MonsterId;

/// The three override tables. Each source file holds just its own map:
///
/// * nicknames: `{"1234": ["ra", "sun god"]}` (monster id to nicknames)
/// * tree names: `{"600": ["moon god"]}` (any tree member id to names for the whole tree)
/// * pantheons: `{"warlords": "Samurai Legends"}` (nickname to series name)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Overrides {
    pub nicknames: BTreeMap<MonsterId, Vec<String>>,
    pub tree_names: BTreeMap<MonsterId, Vec<String>>,
    pub pantheons: BTreeMap<String, String>,
}

impl Overrides {
    /// Read whichever sources are configured.
    ///
    /// A source that cannot be read or parsed is logged and left empty; the
    /// catalog still loads without it.
    pub async fn load(
        client: &Client,
        nicknames: Option<&DataSource>,
        tree_names: Option<&DataSource>,
        pantheons: Option<&DataSource>,
    ) -> Self {
        let overrides = Self {
            nicknames: load_table(client, nicknames, "nickname").await,
            tree_names: load_table(client, tree_names, "tree name").await,
            pantheons: load_table(client, pantheons, "pantheon").await,
        };
        info!(
            "Loaded overrides: {} nicknamed monsters, {} named trees, {} pantheons",
            overrides.nicknames.len(),
            overrides.tree_names.len(),
            overrides.pantheons.len()
        );
        overrides
    }
}

async fn load_table<T: DeserializeOwned + Default>(
    client: &Client,
    source: Option<&DataSource>,
    label: &str,
) -> T {
    let Some(source) = source else {
        return T::default();
    };
    match fetch_json(client, source).await {
        Ok(table) => table,
        Err(e) => {
            warn!("Ignoring {label} overrides from {source:?}: {e}");
            T::default()
        }
    }
}

async fn fetch_json<T: DeserializeOwned>(client: &Client, source: &DataSource) -> Result<T> {
    match source {
        DataSource::File(path) => {
            let bytes = tokio::fs::read(path).await?;
            Ok(serde_json::from_slice(&bytes)?)
        }
        DataSource::Remote(url) => {
            let response = client.get(url.clone()).send().await?;
            if !response.status().is_success() {
                return Err(BotError::CatalogDownload {
                    status: response.status(),
                    url: url.to_string(),
                });
            }
            let bytes = response.bytes().await?;
            Ok(serde_json::from_slice(&bytes)?)
        }
    }
}
