//! Monster lookup service: periodic catalog refresh and snapshot publication.
//!
//! Each successful refresh builds a fresh [`MonsterGraph`] and
//! [`MonsterIndex`] and publishes them together as one [`Snapshot`] through a
//! `watch` channel. Resolves clone the current `Arc` and work against it, so
//! a refresh that lands mid-resolve never tears a read.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use reqwest::Client;
use serde::Serialize;
use tokio::sync::{Mutex, watch};

use crate::catalog::{Monster, MonsterGraph, fetch_catalog, open_catalog};
use crate::config::{LookupConfig, MatchThresholds};
use crate::error::{BotError, Result};
use crate::fuzzy_search::search_names;
use crate::index::{IndexStats, MonsterIndex, Overrides};
use crate::journal::{Journal, JournalEntry};
use crate::resolver::{Resolution, ResolveOptions, Resolver};
use crate::types::MonsterId;

/// One published (graph, index) pair.
#[derive(Debug)]
pub struct Snapshot {
    pub generation: u64,
    pub graph: MonsterGraph,
    pub index: MonsterIndex,
    pub thresholds: MatchThresholds,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    #[must_use]
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(&self.graph, &self.index, self.thresholds)
    }
}

/// Outcome of a single-monster lookup.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub monster: Option<Monster>,
    pub resolution: Resolution,
    /// Snapshot generation the query ran against.
    pub generation: u64,
}

/// Ranked monsters for a query, best first.
#[derive(Debug, Clone)]
pub struct SearchResults {
    pub monsters: Vec<Monster>,
    pub hint: Option<String>,
    pub generation: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LookupStats {
    pub generation: u64,
    pub loaded_at: DateTime<Utc>,
    pub index: IndexStats,
}

pub struct MonsterLookup {
    config: LookupConfig,
    client: Client,
    journal: Option<Journal>,
    snapshot_tx: watch::Sender<Option<Arc<Snapshot>>>,
    generation: AtomicU64,
    refresh_lock: Mutex<()>,
}

impl MonsterLookup {
    /// Create the service with no snapshot loaded.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: LookupConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("padbot/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let journal = config.journal_path.clone().map(Journal::new);
        let (snapshot_tx, _) = watch::channel(None);

        Ok(Self {
            config,
            client,
            journal,
            snapshot_tx,
            generation: AtomicU64::new(0),
            refresh_lock: Mutex::new(()),
        })
    }

    /// The snapshot currently published, if any.
    #[must_use]
    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.snapshot_tx.borrow().clone()
    }

    /// Fetch the catalog, rebuild the index and publish it.
    ///
    /// On failure the previous snapshot stays published.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be fetched, read or is empty.
    pub async fn refresh(&self) -> Result<u64> {
        let _guard = self.refresh_lock.lock().await;
        info!("Refreshing monster catalog");

        let working_path = self.config.catalog_path();
        fetch_catalog(&self.client, &self.config.catalog_source, &working_path).await?;

        let overrides = Overrides::load(
            &self.client,
            self.config.nickname_overrides.as_ref(),
            self.config.tree_name_overrides.as_ref(),
            self.config.pantheon_overrides.as_ref(),
        )
        .await;

        let (graph, index) = tokio::task::spawn_blocking(move || -> Result<_> {
            let graph = MonsterGraph::new(open_catalog(&working_path)?);
            if graph.is_empty() {
                return Err(BotError::RefreshFailed(
                    "catalog contains no monsters".to_string(),
                ));
            }
            let index = MonsterIndex::build(&graph, &overrides);
            Ok((graph, index))
        })
        .await??;

        Ok(self.publish(graph, index))
    }

    /// Publish a new snapshot and return its generation.
    pub fn publish(&self, graph: MonsterGraph, index: MonsterIndex) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let stats = index.stats();
        let snapshot = Snapshot {
            generation,
            graph,
            index,
            thresholds: self.config.thresholds,
            loaded_at: Utc::now(),
        };
        self.snapshot_tx.send_replace(Some(Arc::new(snapshot)));
        info!(
            "Published catalog generation {generation}: {} monsters, {} name tokens, {} modifiers",
            stats.monsters, stats.name_tokens, stats.modifiers
        );
        generation
    }

    /// Refresh now and then every `refresh_interval` until `shutdown` flips.
    ///
    /// A failed refresh is retried after `retry_interval`. A refresh still
    /// running when shutdown arrives is discarded.
    pub async fn run_refresh_loop(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        loop {
            if *shutdown.borrow() {
                break;
            }

            let delay = tokio::select! {
                result = self.refresh() => match result {
                    Ok(generation) => {
                        debug!("Refresh {generation} done");
                        self.config.refresh_interval
                    }
                    Err(e) => {
                        error!("Catalog refresh failed, keeping previous snapshot: {e}");
                        self.config.retry_interval
                    }
                },
                _ = shutdown.changed() => break,
            };

            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => break,
            }
        }
        info!("Catalog refresh loop stopped");
    }

    /// Wait for the first snapshot, up to `ready_timeout`.
    ///
    /// # Errors
    ///
    /// Returns `BotError::CatalogUnavailable` if nothing is published in time.
    pub async fn wait_until_ready(&self) -> Result<Arc<Snapshot>> {
        if let Some(snapshot) = self.snapshot() {
            return Ok(snapshot);
        }

        let mut rx = self.snapshot_tx.subscribe();
        let waited = tokio::time::timeout(self.config.ready_timeout, rx.wait_for(Option::is_some))
            .await
            .ok()
            .and_then(std::result::Result::ok)
            .and_then(|snapshot| snapshot.clone());
        waited.ok_or(BotError::CatalogUnavailable)
    }

    /// Resolve `query` to a single monster and journal the outcome.
    ///
    /// # Errors
    ///
    /// Returns `BotError::CatalogUnavailable` if no catalog is loaded in time.
    pub async fn resolve(&self, query: &str, options: ResolveOptions) -> Result<Resolved> {
        let snapshot = self.wait_until_ready().await?;
        let resolution = snapshot.resolver().resolve(query, options);
        let monster = resolution
            .best
            .and_then(|id| snapshot.graph.get(id))
            .cloned();

        self.record(query, &resolution, snapshot.generation).await;

        Ok(Resolved {
            monster,
            resolution,
            generation: snapshot.generation,
        })
    }

    /// Every candidate for `query`, best first.
    ///
    /// # Errors
    ///
    /// Returns `BotError::CatalogUnavailable` if no catalog is loaded in time.
    pub async fn resolve_all(&self, query: &str, options: ResolveOptions) -> Result<SearchResults> {
        let snapshot = self.wait_until_ready().await?;
        let ranked = snapshot.resolver().resolve_all(query, options);
        let monsters = ranked
            .ids
            .iter()
            .filter_map(|id| snapshot.graph.get(*id))
            .cloned()
            .collect();

        Ok(SearchResults {
            monsters,
            hint: ranked.hint,
            generation: snapshot.generation,
        })
    }

    /// # Errors
    ///
    /// Returns `BotError::CatalogUnavailable` if no catalog is loaded in time.
    pub async fn get_monster(&self, id: MonsterId) -> Result<Option<Monster>> {
        let snapshot = self.wait_until_ready().await?;
        Ok(snapshot.graph.get(id).cloned())
    }

    /// # Errors
    ///
    /// Returns `BotError::CatalogUnavailable` if no catalog is loaded in time.
    pub async fn index_stats(&self) -> Result<LookupStats> {
        let snapshot = self.wait_until_ready().await?;
        Ok(LookupStats {
            generation: snapshot.generation,
            loaded_at: snapshot.loaded_at,
            index: snapshot.index.stats(),
        })
    }

    /// Monster names for autocomplete. Never waits for a catalog.
    #[must_use]
    pub fn autocomplete(&self, partial: &str, limit: usize) -> Vec<String> {
        self.snapshot()
            .map(|snapshot| search_names(&snapshot.graph, partial, limit))
            .unwrap_or_default()
    }

    async fn record(&self, query: &str, resolution: &Resolution, generation: u64) {
        let Some(journal) = &self.journal else {
            return;
        };
        let timestamp = Utc::now();
        let mut entries = vec![JournalEntry::Query {
            timestamp,
            query: query.to_string(),
            chosen_id: resolution.best,
            generation,
        }];
        entries.extend(resolution.typo_mods().iter().map(|token| {
            JournalEntry::TypoModifier {
                timestamp,
                query: query.to_string(),
                token: token.clone(),
                generation,
            }
        }));
        journal.append(&entries).await;
    }
}
