//! Daily batch selection: eligibility, deterministic shuffling, and quotas.
//!
//! The word set for a study mode is picked once per calendar day and cached,
//! so reopening the app reproduces the same batch. Ordering is driven by a
//! seed derived purely from the date and the mode; nothing here reads the
//! wall clock or an entropy source.

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::models::{BatchKind, DailyBatch, FilterSettings, VocabularyWord, WordProgress};
use crate::store::ProgressStore;

/// Seed for one day's shuffle. Derived only from the date, the batch kind,
/// and a reshuffle counter, so the two modes never share a sequence and a
/// re-study pass gets a fresh ordering without changing membership.
fn daily_seed(date: NaiveDate, kind: BatchKind, reshuffle: u32) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());
    hasher.update(b"|");
    hasher.update(kind.label().as_bytes());
    hasher.update(b"|");
    hasher.update(reshuffle.to_le_bytes());
    let digest = hasher.finalize();

    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(bytes)
}

/// Uniform Fisher-Yates shuffle from a fixed seed.
fn shuffle_seeded<T>(items: &mut [T], seed: u64) {
    let mut rng = StdRng::seed_from_u64(seed);
    items.shuffle(&mut rng);
}

/// Eligible for learning: no record yet, or a record never answered
/// correctly.
fn new_eligible(progress: Option<&WordProgress>) -> bool {
    progress.map_or(true, WordProgress::is_new)
}

/// Picks and caches the day's word batches, one per study mode.
#[derive(Debug, Default)]
pub struct BatchSelector {
    learning: Option<DailyBatch>,
    review: Option<DailyBatch>,
}

impl BatchSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore cached batches saved by the persistence collaborator.
    pub fn from_batches(batches: Vec<DailyBatch>) -> Self {
        let mut selector = Self::new();
        for batch in batches {
            let kind = batch.kind;
            *selector.slot(kind) = Some(batch);
        }
        selector
    }

    /// Snapshot the caches for persistence.
    pub fn batches(&self) -> Vec<DailyBatch> {
        self.learning.iter().chain(self.review.iter()).cloned().collect()
    }

    fn slot(&mut self, kind: BatchKind) -> &mut Option<DailyBatch> {
        match kind {
            BatchKind::Learning => &mut self.learning,
            BatchKind::Review => &mut self.review,
        }
    }

    fn cached(
        &mut self,
        kind: BatchKind,
        filters: &FilterSettings,
        quota: u32,
        today: NaiveDate,
    ) -> Option<&mut DailyBatch> {
        self.slot(kind)
            .as_mut()
            .filter(|batch| batch.date == today && batch.quota == quota && &batch.filters == filters)
    }

    /// Today's learning batch: unseen (or never-correct) words matching the
    /// filters, shuffled deterministically, truncated to the remaining daily
    /// quota. Repeat calls the same day return the same membership, minus
    /// words that have since been answered correctly.
    pub fn select_learning(
        &mut self,
        vocabulary: &[VocabularyWord],
        store: &dyn ProgressStore,
        filters: &FilterSettings,
        daily_goal: u32,
        learned_today: u32,
        today: NaiveDate,
    ) -> Vec<String> {
        let remaining = daily_goal.saturating_sub(learned_today) as usize;

        if let Some(batch) = self.cached(BatchKind::Learning, filters, daily_goal, today) {
            return batch
                .word_ids
                .iter()
                .filter(|id| new_eligible(store.get(id.as_str()).as_ref()))
                .take(remaining)
                .cloned()
                .collect();
        }

        let mut pool: Vec<String> = vocabulary
            .iter()
            .filter(|word| filters.matches(word))
            .filter(|word| new_eligible(store.get(&word.id).as_ref()))
            .map(|word| word.id.clone())
            .collect();

        shuffle_seeded(&mut pool, daily_seed(today, BatchKind::Learning, 0));
        pool.truncate(remaining);
        debug!(count = pool.len(), %today, "selected learning batch");

        *self.slot(BatchKind::Learning) = Some(DailyBatch {
            kind: BatchKind::Learning,
            date: today,
            filters: filters.clone(),
            quota: daily_goal,
            word_ids: pool.clone(),
            reshuffles: 0,
        });
        pool
    }

    /// Today's review batch: due, unmastered words matching the filters,
    /// most overdue first. Ties on the review date fall in the order of the
    /// day's seeded shuffle rather than dictionary order.
    pub fn select_review(
        &mut self,
        vocabulary: &[VocabularyWord],
        store: &dyn ProgressStore,
        filters: &FilterSettings,
        review_limit: u32,
        reviewed_today: u32,
        today: NaiveDate,
    ) -> Vec<String> {
        let remaining = review_limit.saturating_sub(reviewed_today) as usize;

        if let Some(batch) = self.cached(BatchKind::Review, filters, review_limit, today) {
            return batch
                .word_ids
                .iter()
                .filter(|id| {
                    store
                        .get(id.as_str())
                        .map_or(false, |progress| progress.is_due(today))
                })
                .take(remaining)
                .cloned()
                .collect();
        }

        let mut pool: Vec<(String, NaiveDate)> = vocabulary
            .iter()
            .filter(|word| filters.matches(word))
            .filter_map(|word| {
                let progress = store.get(&word.id)?;
                let due = progress.next_review_date?;
                progress.is_due(today).then(|| (word.id.clone(), due))
            })
            .collect();

        shuffle_seeded(&mut pool, daily_seed(today, BatchKind::Review, 0));
        pool.sort_by_key(|(_, due)| *due);

        let mut ids: Vec<String> = pool.into_iter().map(|(id, _)| id).collect();
        ids.truncate(remaining);
        debug!(count = ids.len(), %today, "selected review batch");

        *self.slot(BatchKind::Review) = Some(DailyBatch {
            kind: BatchKind::Review,
            date: today,
            filters: filters.clone(),
            quota: review_limit,
            word_ids: ids.clone(),
            reshuffles: 0,
        });
        ids
    }

    /// The re-study path: today's cached membership regardless of quota,
    /// reshuffled with a per-request seed. Empty when nothing was selected
    /// today or the filters have changed since.
    pub fn todays_batch(
        &mut self,
        kind: BatchKind,
        filters: &FilterSettings,
        today: NaiveDate,
    ) -> Vec<String> {
        let Some(batch) = self.slot(kind).as_mut() else {
            return Vec::new();
        };
        if batch.date != today || &batch.filters != filters {
            return Vec::new();
        }

        batch.reshuffles += 1;
        let mut ids = batch.word_ids.clone();
        let seed = daily_seed(today, kind, batch.reshuffles);
        shuffle_seeded(&mut ids, seed);
        ids
    }
}
