//! Append-only JSON-lines journal of resolved queries and unknown modifiers.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::types::MonsterId;

/// One journal line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JournalEntry {
    Query {
        timestamp: DateTime<Utc>,
        query: String,
        chosen_id: Option<MonsterId>,
        generation: u64,
    },
    TypoModifier {
        timestamp: DateTime<Utc>,
        query: String,
        token: String,
        generation: u64,
    },
}

/// JSON-lines file shared by every resolve. Appends are serialized.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    lock: Mutex<()>,
}

impl Journal {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `entries` as one write. Failures are logged, never returned.
    pub async fn append(&self, entries: &[JournalEntry]) {
        if entries.is_empty() {
            return;
        }
        let _guard = self.lock.lock().await;
        match self.write(entries).await {
            Ok(()) => debug!("Journaled {} entries", entries.len()),
            Err(e) => warn!("Failed to write journal {}: {e}", self.path.display()),
        }
    }

    async fn write(&self, entries: &[JournalEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut buffer = String::new();
        for entry in entries {
            buffer.push_str(&serde_json::to_string(entry)?);
            buffer.push('\n');
        }

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(buffer.as_bytes()).await?;
        file.flush().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query_entry(query: &str, chosen_id: Option<MonsterId>) -> JournalEntry {
        JournalEntry::Query {
            timestamp: Utc::now(),
            query: query.to_string(),
            chosen_id,
            generation: 1,
        }
    }

    #[tokio::test]
    async fn appends_one_json_object_per_line() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = Journal::new(dir.path().join("logs").join("journal.jsonl"));

        journal.append(&[query_entry("saria", Some(102))]).await;
        journal
            .append(&[
                query_entry("zzzz", None),
                JournalEntry::TypoModifier {
                    timestamp: Utc::now(),
                    query: "saria reincarnatd".to_string(),
                    token: "reincarnatd".to_string(),
                    generation: 1,
                },
            ])
            .await;

        let contents = tokio::fs::read_to_string(journal.path())
            .await
            .expect("journal exists");
        let lines: Vec<serde_json::Value> = contents
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid json"))
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["kind"], "query");
        assert_eq!(lines[0]["chosen_id"], 102);
        assert!(lines[1]["chosen_id"].is_null());
        assert_eq!(lines[2]["kind"], "typo_modifier");
        assert_eq!(lines[2]["token"], "reincarnatd");
    }

    #[tokio::test]
    async fn unwritable_journal_does_not_panic() {
        let dir = tempfile::tempdir().expect("tempdir");
        let journal = Journal::new(dir.path().to_path_buf());
        journal.append(&[query_entry("saria", Some(102))]).await;
    }
}
