//! Word progress store: the interface the engine depends on, plus the
//! in-memory implementation the binary and the tests use.

use std::collections::HashMap;

use crate::models::WordProgress;

/// Keyed progress collection the engine reads and writes.
///
/// The engine never assumes more than these operations, so any conforming
/// key-value or relational backing satisfies the contract. Implementations
/// hand out copies; durability is the caller's concern.
pub trait ProgressStore {
    fn get(&self, word_id: &str) -> Option<WordProgress>;
    fn upsert(&mut self, progress: WordProgress);
    fn all(&self) -> Vec<WordProgress>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// HashMap-backed store. Records loaded from disk are sanitized on the way
/// in so a corrupt interval index can never escape into scheduling.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: HashMap<String, WordProgress>,
}

impl MemoryProgressStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<WordProgress>) -> Self {
        let mut store = Self::new();
        for mut progress in records {
            progress.sanitize();
            store.records.insert(progress.word_id.clone(), progress);
        }
        store
    }

    /// Drain into a stable, sorted record list for persistence.
    pub fn into_records(self) -> Vec<WordProgress> {
        let mut records: Vec<WordProgress> = self.records.into_values().collect();
        records.sort_by(|a, b| a.word_id.cmp(&b.word_id));
        records
    }
}

impl ProgressStore for MemoryProgressStore {
    fn get(&self, word_id: &str) -> Option<WordProgress> {
        self.records.get(word_id).cloned()
    }

    fn upsert(&mut self, progress: WordProgress) {
        self.records.insert(progress.word_id.clone(), progress);
    }

    fn all(&self) -> Vec<WordProgress> {
        self.records.values().cloned().collect()
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
