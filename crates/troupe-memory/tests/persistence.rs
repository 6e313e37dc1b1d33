//! End-to-end persistence scenarios across process-style restarts.

use std::path::Path;
use std::sync::Arc;
use troupe_memory::{HashEmbedder, SearchOptions, SemanticIndex, StructuredStore};

fn open(dir: &Path) -> SemanticIndex {
    SemanticIndex::open(
        dir.join("memory.json"),
        dir.join("embeddings.index"),
        Arc::new(HashEmbedder::default()),
    )
    .expect("open semantic index")
}

#[test]
fn restart_preserves_structured_counts_and_embeddings() {
    let temp = tempfile::tempdir().expect("tempdir");

    let mut index = open(temp.path());
    index.store_interaction("researcher", "what is rust", "a systems language");
    index.store_fact("researcher", "rust favors explicit ownership");
    index.close().expect("close");

    // A new instance over the same paths sees everything the old one saved.
    let index = open(temp.path());
    let summary = index.memory_summary();
    let researcher = summary.get("researcher").expect("researcher summary");
    assert_eq!(researcher.interaction_count, 1);
    assert_eq!(researcher.fact_count, 1);
    assert_eq!(index.total_embeddings(), 2);

    let analytics = index.memory_analytics();
    assert_eq!(analytics.embeddings.agent_distribution["researcher"], 2);
}

#[test]
fn reloaded_index_still_answers_semantic_queries() {
    let temp = tempfile::tempdir().expect("tempdir");

    let mut index = open(temp.path());
    index.store_fact("researcher", "rust favors explicit ownership");
    index.store_fact("writer", "essays need strong openings");
    index.close().expect("close");

    let index = open(temp.path());
    let hits = index.semantic_search("rust explicit ownership", &SearchOptions::default());
    assert!(!hits.is_empty());
    assert_eq!(hits[0].metadata.agent_name, "researcher");

    // Insights about the researcher's topic, excluding the researcher,
    // must not leak researcher entries.
    let insights = index.cross_agent_insights("rust explicit ownership", Some("researcher"));
    assert!(
        insights
            .iter()
            .all(|hit| hit.metadata.agent_name != "researcher")
    );
}

#[test]
fn structured_store_survives_independent_reopen() {
    let temp = tempfile::tempdir().expect("tempdir");
    let path = temp.path().join("memory.json");

    let mut store = StructuredStore::open(&path).expect("open");
    for i in 0..3 {
        store.store_interaction("echo", &format!("in-{i}"), &format!("out-{i}"));
    }
    store.store_fact("echo", "remembers across runs");
    drop(store);

    let store = StructuredStore::open(&path).expect("reopen");
    assert_eq!(store.agent_history("echo").len(), 3);
    assert_eq!(store.agent_facts("echo").len(), 1);
    assert_eq!(store.recent_interactions("echo", 2)[0].input, "in-1");
}
