//! File-backed structured store mapping agent names to append-only logs.

use crate::error::MemoryError;
use crate::model::{AgentLog, AgentSummary, FactRecord, InteractionRecord};
use chrono::Utc;
use log::{debug, warn};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Durable mapping from agent name to an append-only interaction/fact log.
///
/// The whole store is serialized as a single JSON snapshot and rewritten on
/// every mutation. Save failures are logged rather than propagated, so a
/// mutation can remain memory-only until the next successful save.
#[derive(Debug)]
pub struct StructuredStore {
    path: PathBuf,
    agents: HashMap<String, AgentLog>,
}

impl StructuredStore {
    /// Open a store backed by the given snapshot path.
    ///
    /// A missing file yields an empty store. An unreadable or corrupt file is
    /// surfaced as an error so callers decide how to recover; use
    /// [`StructuredStore::open_or_empty`] for the lenient behavior.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        let agents = if path.exists() {
            let raw = std::fs::read_to_string(&path)?;
            serde_json::from_str(&raw)?
        } else {
            HashMap::new()
        };
        debug!(
            "opened structured store (path={}, agents={})",
            path.display(),
            agents.len()
        );
        Ok(Self { path, agents })
    }

    /// Open a store, substituting an empty one when the snapshot cannot be read.
    pub fn open_or_empty(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(store) => store,
            Err(err) => {
                warn!(
                    "ignoring unreadable snapshot (path={}, error={err})",
                    path.display()
                );
                Self {
                    path: path.to_path_buf(),
                    agents: HashMap::new(),
                }
            }
        }
    }

    /// Path of the backing snapshot file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append an interaction to an agent's log, creating the log if absent,
    /// and persist the snapshot.
    pub fn store_interaction(&mut self, agent: &str, input: &str, output: &str) {
        let log = self.agents.entry(agent.to_string()).or_default();
        log.interactions.push(InteractionRecord {
            timestamp: Utc::now(),
            input: input.to_string(),
            output: output.to_string(),
        });
        self.save_reported();
    }

    /// Append a learned fact to an agent's log and persist the snapshot.
    pub fn store_fact(&mut self, agent: &str, fact: &str) {
        let log = self.agents.entry(agent.to_string()).or_default();
        log.facts.push(FactRecord {
            timestamp: Utc::now(),
            fact: fact.to_string(),
        });
        self.save_reported();
    }

    /// All interactions for an agent, oldest first. Empty if unknown.
    pub fn agent_history(&self, agent: &str) -> &[InteractionRecord] {
        self.agents
            .get(agent)
            .map(|log| log.interactions.as_slice())
            .unwrap_or_default()
    }

    /// All facts for an agent, oldest first. Empty if unknown.
    pub fn agent_facts(&self, agent: &str) -> &[FactRecord] {
        self.agents
            .get(agent)
            .map(|log| log.facts.as_slice())
            .unwrap_or_default()
    }

    /// The most recent interactions for an agent, insertion order preserved.
    pub fn recent_interactions(&self, agent: &str, limit: usize) -> &[InteractionRecord] {
        let history = self.agent_history(agent);
        let start = history.len().saturating_sub(limit);
        &history[start..]
    }

    /// Remove an agent's entire log and persist. No-op for unknown agents.
    pub fn clear_agent_memory(&mut self, agent: &str) {
        if self.agents.remove(agent).is_some() {
            self.save_reported();
        }
    }

    /// Reset the store to empty and delete the backing file if present.
    pub fn clear_all_memory(&mut self) {
        self.agents.clear();
        if self.path.exists() {
            if let Err(err) = std::fs::remove_file(&self.path) {
                warn!(
                    "failed to delete snapshot (path={}, error={err})",
                    self.path.display()
                );
            }
        }
    }

    /// Per-agent interaction/fact counts with the last interaction timestamp.
    pub fn memory_summary(&self) -> HashMap<String, AgentSummary> {
        self.agents
            .iter()
            .map(|(name, log)| {
                (
                    name.clone(),
                    AgentSummary {
                        interaction_count: log.interactions.len(),
                        fact_count: log.facts.len(),
                        last_interaction: log.interactions.last().map(|record| record.timestamp),
                    },
                )
            })
            .collect()
    }

    /// Write the whole snapshot atomically (temp file + rename).
    pub fn save(&self) -> Result<(), MemoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let temp_path = self.temp_path();
        std::fs::write(&temp_path, serde_json::to_string_pretty(&self.agents)?)?;
        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }

    /// Persist the snapshot, logging instead of propagating failures.
    fn save_reported(&self) {
        if let Err(err) = self.save() {
            warn!(
                "failed to persist structured store (path={}, error={err})",
                self.path.display()
            );
        }
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[cfg(test)]
mod tests {
    use super::StructuredStore;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn round_trips_counts_across_reopen() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("memory.json");

        let mut store = StructuredStore::open(&path).expect("open");
        store.store_interaction("echo", "hi", "hello");
        store.store_interaction("echo", "bye", "goodbye");
        store.store_fact("echo", "user greets in english");
        drop(store);

        let store = StructuredStore::open(&path).expect("reopen");
        let summary = store.memory_summary();
        let echo = summary.get("echo").expect("echo summary");
        assert_eq!(echo.interaction_count, 2);
        assert_eq!(echo.fact_count, 1);
        assert!(echo.last_interaction.is_some());
    }

    #[test]
    fn unknown_agent_yields_empty_sequences() {
        let temp = tempdir().expect("tempdir");
        let store = StructuredStore::open(temp.path().join("memory.json")).expect("open");
        assert!(store.agent_history("ghost").is_empty());
        assert!(store.agent_facts("ghost").is_empty());
        assert!(store.recent_interactions("ghost", 3).is_empty());
    }

    #[test]
    fn recent_interactions_returns_ordered_suffix() {
        let temp = tempdir().expect("tempdir");
        let mut store = StructuredStore::open(temp.path().join("memory.json")).expect("open");
        for i in 0..5 {
            store.store_interaction("echo", &format!("in-{i}"), &format!("out-{i}"));
        }

        let recent = store.recent_interactions("echo", 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].input, "in-3");
        assert_eq!(recent[1].input, "in-4");

        // Limit larger than the history returns everything.
        assert_eq!(store.recent_interactions("echo", 10).len(), 5);
    }

    #[test]
    fn clear_agent_memory_removes_only_that_agent() {
        let temp = tempdir().expect("tempdir");
        let mut store = StructuredStore::open(temp.path().join("memory.json")).expect("open");
        store.store_fact("a", "fact a");
        store.store_fact("b", "fact b");

        store.clear_agent_memory("a");
        let summary = store.memory_summary();
        assert!(!summary.contains_key("a"));
        assert_eq!(summary.get("b").expect("b").fact_count, 1);

        // Clearing an unknown agent is a no-op.
        store.clear_agent_memory("ghost");
    }

    #[test]
    fn clear_all_memory_deletes_backing_file() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("memory.json");
        let mut store = StructuredStore::open(&path).expect("open");
        store.store_interaction("echo", "hi", "hello");
        assert!(path.exists());

        store.clear_all_memory();
        assert!(store.memory_summary().is_empty());
        assert!(!path.exists());
    }

    #[test]
    fn open_rejects_corrupt_snapshot_but_lenient_open_recovers() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("memory.json");
        std::fs::write(&path, "{not json").expect("write");

        assert!(StructuredStore::open(&path).is_err());
        let store = StructuredStore::open_or_empty(&path);
        assert!(store.memory_summary().is_empty());
    }

    #[test]
    fn snapshot_is_created_under_missing_parent_directory() {
        let temp = tempdir().expect("tempdir");
        let path = temp.path().join("nested").join("memory.json");
        let mut store = StructuredStore::open(&path).expect("open");
        store.store_fact("echo", "nested fact");
        assert!(path.exists());
    }
}
