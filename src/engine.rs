//! The study engine: the context object tying vocabulary, progress store,
//! learner state, and batch selection together behind the public API.
//!
//! Everything is injected at construction and every operation takes `today`
//! explicitly, so the caller owns the clock and the persistence of whatever
//! the accessors hand back.

use std::collections::HashMap;

use chrono::{DateTime, Local, NaiveDate};

use crate::daily::LearnerState;
use crate::models::{
    BatchKind, DailyBatch, FilterSettings, StudyOutcome, VocabularyWord, WordProgress,
    WordStatus,
};
use crate::selector::BatchSelector;
use crate::session::{self, SessionReport};
use crate::store::ProgressStore;

/// Read-only snapshot of overall learning progress.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressStats {
    pub words_learned_today: u32,
    pub words_reviewed_today: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub due_count: usize,
    pub mastered_count: usize,
    pub total_words_learned: usize,
}

/// What a finished session did, plus the stats as they stand afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub report: SessionReport,
    pub stats: ProgressStats,
}

pub struct StudyEngine<S: ProgressStore> {
    vocabulary: Vec<VocabularyWord>,
    by_id: HashMap<String, usize>,
    store: S,
    state: LearnerState,
    selector: BatchSelector,
}

impl<S: ProgressStore> StudyEngine<S> {
    pub fn new(vocabulary: Vec<VocabularyWord>, store: S) -> Self {
        Self::with_state(vocabulary, store, LearnerState::default(), Vec::new())
    }

    /// Rebuild an engine from state the persistence collaborator loaded.
    pub fn with_state(
        vocabulary: Vec<VocabularyWord>,
        store: S,
        state: LearnerState,
        batches: Vec<DailyBatch>,
    ) -> Self {
        let by_id = vocabulary
            .iter()
            .enumerate()
            .map(|(i, word)| (word.id.clone(), i))
            .collect();
        Self {
            vocabulary,
            by_id,
            store,
            state,
            selector: BatchSelector::from_batches(batches),
        }
    }

    fn resolve(&self, ids: &[String]) -> Vec<VocabularyWord> {
        ids.iter()
            .filter_map(|id| self.by_id.get(id))
            .map(|&i| self.vocabulary[i].clone())
            .collect()
    }

    /// New words to study now, shuffled for the day and capped by the
    /// remaining daily goal.
    pub fn words_for_learning(
        &mut self,
        filters: &FilterSettings,
        daily_goal: u32,
        today: NaiveDate,
    ) -> Vec<VocabularyWord> {
        self.state.roll_to(today);
        let learned = self.state.words_learned_today();
        let ids = self.selector.select_learning(
            &self.vocabulary,
            &self.store,
            filters,
            daily_goal,
            learned,
            today,
        );
        self.resolve(&ids)
    }

    /// Due words to review now, most overdue first, capped by the remaining
    /// daily review limit.
    pub fn words_for_review(
        &mut self,
        filters: &FilterSettings,
        review_limit: u32,
        today: NaiveDate,
    ) -> Vec<VocabularyWord> {
        self.state.roll_to(today);
        let reviewed = self.state.words_reviewed_today();
        let ids = self.selector.select_review(
            &self.vocabulary,
            &self.store,
            filters,
            review_limit,
            reviewed,
            today,
        );
        self.resolve(&ids)
    }

    /// Re-study today's learning batch, quota notwithstanding.
    pub fn todays_learning_batch(
        &mut self,
        filters: &FilterSettings,
        today: NaiveDate,
    ) -> Vec<VocabularyWord> {
        let ids = self.selector.todays_batch(BatchKind::Learning, filters, today);
        self.resolve(&ids)
    }

    /// Re-study today's review batch, quota notwithstanding.
    pub fn todays_review_batch(
        &mut self,
        filters: &FilterSettings,
        today: NaiveDate,
    ) -> Vec<VocabularyWord> {
        let ids = self.selector.todays_batch(BatchKind::Review, filters, today);
        self.resolve(&ids)
    }

    /// Apply one session's outcomes in order and return what happened,
    /// together with the updated stats snapshot.
    pub fn process_study_results(
        &mut self,
        outcomes: &[StudyOutcome],
        today: NaiveDate,
        now: DateTime<Local>,
    ) -> SessionSummary {
        let report = session::apply_outcomes(
            outcomes,
            |id| self.by_id.contains_key(id),
            &mut self.store,
            &mut self.state,
            today,
            now,
        );
        let stats = self.progress_stats(today);
        SessionSummary { report, stats }
    }

    /// Flip a word's bookmark flag, creating the progress record lazily.
    /// Returns the new flag, or `None` for an id not in the dictionary.
    pub fn toggle_bookmark(&mut self, word_id: &str) -> Option<bool> {
        if !self.by_id.contains_key(word_id) {
            return None;
        }
        let mut progress = self
            .store
            .get(word_id)
            .unwrap_or_else(|| WordProgress::new(word_id.to_string()));
        progress.sanitize();
        progress.is_bookmarked = !progress.is_bookmarked;
        let flagged = progress.is_bookmarked;
        self.store.upsert(progress);
        Some(flagged)
    }

    /// All bookmarked words, in dictionary order.
    pub fn bookmarked_words(&self) -> Vec<VocabularyWord> {
        let mut indices: Vec<usize> = self
            .store
            .all()
            .into_iter()
            .filter(|progress| progress.is_bookmarked)
            .filter_map(|progress| self.by_id.get(&progress.word_id).copied())
            .collect();
        indices.sort_unstable();
        indices
            .into_iter()
            .map(|i| self.vocabulary[i].clone())
            .collect()
    }

    pub fn progress_stats(&mut self, today: NaiveDate) -> ProgressStats {
        self.state.roll_to(today);

        let mut due_count = 0;
        let mut mastered_count = 0;
        for progress in self.store.all() {
            if progress.status == WordStatus::Mastered {
                mastered_count += 1;
            } else if progress.is_due(today) {
                due_count += 1;
            }
        }

        ProgressStats {
            words_learned_today: self.state.words_learned_today(),
            words_reviewed_today: self.state.words_reviewed_today(),
            current_streak: self.state.streak.current_streak,
            longest_streak: self.state.streak.longest_streak,
            due_count,
            mastered_count,
            total_words_learned: self.store.len(),
        }
    }

    /// Distinct level tags, sorted.
    pub fn available_levels(&self) -> Vec<String> {
        let mut levels: Vec<String> = self
            .vocabulary
            .iter()
            .map(|word| word.level.clone())
            .filter(|level| !level.is_empty())
            .collect();
        levels.sort();
        levels.dedup();
        levels
    }

    /// Distinct category tags, sorted.
    pub fn available_categories(&self) -> Vec<String> {
        let mut categories: Vec<String> = self
            .vocabulary
            .iter()
            .map(|word| word.category.clone())
            .filter(|category| !category.is_empty())
            .collect();
        categories.sort();
        categories.dedup();
        categories
    }

    pub fn word(&self, word_id: &str) -> Option<&VocabularyWord> {
        self.by_id.get(word_id).map(|&i| &self.vocabulary[i])
    }

    /// Find a word by its display text (exact match).
    pub fn word_by_text(&self, text: &str) -> Option<&VocabularyWord> {
        self.vocabulary.iter().find(|word| word.text == text)
    }

    pub fn vocabulary(&self) -> &[VocabularyWord] {
        &self.vocabulary
    }

    pub fn state(&self) -> &LearnerState {
        &self.state
    }

    /// Tear down into the pieces the persistence collaborator saves.
    pub fn into_parts(self) -> (S, LearnerState, Vec<DailyBatch>) {
        (self.store, self.state, self.selector.batches())
    }
}
