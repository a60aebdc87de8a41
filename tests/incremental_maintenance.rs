//! Index maintenance driven by transaction commits

use std::sync::Arc;

use quarry::config::{EngineSettings, TokenizerConfig};
use quarry::engine::{EngineRegistry, IndexEngine};
use quarry::models::ObjectId;
use quarry::query::MatchMode;
use quarry::store::{MemoryDatabase, MemoryTransaction};

const INDEX_TYPE: u32 = 1;
const NOTE: u32 = 10;
const TAG: u32 = 11;
const TEXT: u32 = 100;
const TITLE: u32 = 101;

fn documents(engine: &IndexEngine<MemoryTransaction>, term: &str) -> Vec<ObjectId> {
    engine
        .find(term, MatchMode::Exact)
        .unwrap()
        .into_iter()
        .map(|hit| hit.document)
        .collect()
}

fn configure(engine: &mut IndexEngine<MemoryTransaction>) {
    engine.configure_analysis(&TokenizerConfig::default());
    engine.watch_type(NOTE);
    engine.watch_attribute(TEXT);
}

/// Index living in the same transaction as the notes
fn same_scope() -> (MemoryDatabase, MemoryTransaction, Arc<IndexEngine<MemoryTransaction>>) {
    let db = MemoryDatabase::new();
    let txn = db.begin();
    let index = txn.create_object(INDEX_TYPE).unwrap();
    let mut engine = IndexEngine::open(index, txn.clone(), None).unwrap();
    configure(&mut engine);
    let engine = Arc::new(engine);
    txn.add_observer(engine.clone());
    (db, txn, engine)
}

#[test]
fn test_commit_indexes_new_objects() {
    let (_db, txn, engine) = same_scope();
    let note = txn.create_object(NOTE).unwrap();
    txn.set_value(note, TEXT, "the cat sat").unwrap();
    assert!(documents(&engine, "cat").is_empty());

    txn.commit().unwrap();
    assert_eq!(documents(&engine, "cat"), vec![note]);
    assert_eq!(documents(&engine, "sat"), vec![note]);
}

#[test]
fn test_update_replaces_old_tokens() {
    let (_db, txn, engine) = same_scope();
    let note = txn.create_object(NOTE).unwrap();
    txn.set_value(note, TEXT, "the cat sat").unwrap();
    txn.commit().unwrap();

    txn.set_value(note, TEXT, "the dog sat").unwrap();
    txn.commit().unwrap();

    assert!(documents(&engine, "cat").is_empty());
    assert_eq!(documents(&engine, "dog"), vec![note]);
    let hits = engine.find("sat", MatchMode::Exact).unwrap();
    assert_eq!(hits[0].rank, 1);
}

#[test]
fn test_erase_removes_all_postings() {
    let (_db, txn, engine) = same_scope();
    let note = txn.create_object(NOTE).unwrap();
    txn.set_value(note, TEXT, "short lived").unwrap();
    txn.commit().unwrap();

    txn.erase_object(note).unwrap();
    txn.commit().unwrap();

    assert!(documents(&engine, "short").is_empty());
    let stats = engine.stats().unwrap();
    assert_eq!(stats.document_postings, 0);
    assert_eq!(stats.terms, 2);
    assert!(engine.verify().unwrap().is_empty());
}

#[test]
fn test_unwatched_changes_ignored() {
    let (_db, txn, engine) = same_scope();
    let tag = txn.create_object(TAG).unwrap();
    txn.set_value(tag, TEXT, "invisible").unwrap();
    let note = txn.create_object(NOTE).unwrap();
    txn.set_value(note, TITLE, "untracked").unwrap();
    txn.commit().unwrap();

    assert!(documents(&engine, "invisible").is_empty());
    assert!(documents(&engine, "untracked").is_empty());
    assert!(engine.is_empty().unwrap());
}

#[test]
fn test_rollback_leaves_index_untouched() {
    let (_db, txn, engine) = same_scope();
    let note = txn.create_object(NOTE).unwrap();
    txn.set_value(note, TEXT, "never").unwrap();
    txn.rollback();
    assert!(documents(&engine, "never").is_empty());
    assert!(engine.is_empty().unwrap());
}

#[test]
fn test_separate_scope_skips_while_empty() {
    let db = MemoryDatabase::new();
    let index_txn = db.begin();
    let index = index_txn.create_object(INDEX_TYPE).unwrap();
    index_txn.commit().unwrap();

    let source = db.begin();
    let mut engine = IndexEngine::open(index, index_txn.clone(), Some(source.id())).unwrap();
    configure(&mut engine);
    assert!(engine.check_empty());
    let engine = Arc::new(engine);
    source.add_observer(engine.clone());

    let note = source.create_object(NOTE).unwrap();
    source.set_value(note, TEXT, "alpha").unwrap();
    source.commit().unwrap();
    assert!(documents(&engine, "alpha").is_empty());

    // Seed the index explicitly; from now on commits are maintained
    engine.index_object(&source, note, false).unwrap();
    engine.commit(false).unwrap();
    assert_eq!(documents(&engine, "alpha"), vec![note]);

    source.set_value(note, TEXT, "beta").unwrap();
    source.commit().unwrap();
    assert!(documents(&engine, "alpha").is_empty());
    assert_eq!(documents(&engine, "beta"), vec![note]);

    // The term counter was committed with the index transaction
    let reader = IndexEngine::open(index, db.begin_read_only(), None).unwrap();
    assert!(reader.is_initialized());
    assert!(!reader.is_empty().unwrap());
    assert_eq!(documents(&reader, "beta"), vec![note]);
}

#[test]
fn test_separate_scope_without_empty_check() {
    let db = MemoryDatabase::new();
    let index_txn = db.begin();
    let index = index_txn.create_object(INDEX_TYPE).unwrap();
    index_txn.commit().unwrap();

    let source = db.begin();
    let mut engine = IndexEngine::open(index, index_txn, Some(source.id()))
        .unwrap()
        .with_settings(EngineSettings::default().with_check_empty(false));
    configure(&mut engine);
    let engine = Arc::new(engine);
    source.add_observer(engine.clone());

    let note = source.create_object(NOTE).unwrap();
    source.set_value(note, TEXT, "gamma").unwrap();
    source.commit().unwrap();
    assert_eq!(documents(&engine, "gamma"), vec![note]);
}

#[test]
fn test_registry_finds_engine_for_transaction() {
    let (_db, txn, engine) = same_scope();
    let registry = EngineRegistry::new();
    registry.register(&engine);

    let found = registry.lookup(txn.id()).unwrap();
    let note = txn.create_object(NOTE).unwrap();
    txn.set_value(note, TEXT, "lookup works").unwrap();
    txn.commit().unwrap();
    assert_eq!(documents(&found, "lookup"), vec![note]);

    drop(found);
    drop(engine);
    assert!(registry.lookup(txn.id()).is_none());
}

#[test]
fn test_commits_maintain_item_postings() {
    let db = MemoryDatabase::new();
    let txn = db.begin();
    let index = txn.create_object(INDEX_TYPE).unwrap();
    let document = txn.create_object(NOTE).unwrap();
    let paragraph = txn.create_object(NOTE).unwrap();

    let mut engine = IndexEngine::open(index, txn.clone(), None)
        .unwrap()
        .with_settings(EngineSettings::default().with_resolve_documents(true));
    configure(&mut engine);
    engine.set_document_resolver(move |object: ObjectId| (object == paragraph).then_some(document));
    let engine = Arc::new(engine);
    txn.add_observer(engine.clone());

    txn.set_value(paragraph, TEXT, "red apple").unwrap();
    txn.commit().unwrap();
    let hits = engine.find("apple", MatchMode::Exact).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document, document);
    assert_eq!(hits[0].items.iter().map(|i| i.item).collect::<Vec<_>>(), vec![paragraph]);
    assert_eq!(engine.stats().unwrap().item_postings, 2);

    txn.set_value(paragraph, TEXT, "green apple").unwrap();
    txn.commit().unwrap();
    assert!(documents(&engine, "red").is_empty());
    let hits = engine.find("green", MatchMode::Exact).unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].document, document);
    assert_eq!(hits[0].items.len(), 1);
    assert_eq!(hits[0].items[0].item, paragraph);
    let apple = engine.find("apple", MatchMode::Exact).unwrap();
    assert_eq!(apple[0].rank, 1);
    assert_eq!(apple[0].items[0].rank, 1);
    let stats = engine.stats().unwrap();
    assert_eq!(stats.document_postings, 2);
    assert_eq!(stats.item_postings, 2);
    assert!(engine.verify().unwrap().is_empty());

    txn.erase_object(paragraph).unwrap();
    txn.commit().unwrap();
    assert!(documents(&engine, "apple").is_empty());
    let stats = engine.stats().unwrap();
    assert_eq!(stats.document_postings, 0);
    assert_eq!(stats.item_postings, 0);
    assert!(engine.verify().unwrap().is_empty());
}
