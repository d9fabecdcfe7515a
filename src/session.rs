//! Applies a finished study session's outcomes to progress records, daily
//! counters, and the streak.

use chrono::{DateTime, Local, NaiveDate};
use tracing::warn;

use crate::daily::LearnerState;
use crate::ladder;
use crate::models::{Recall, StudyOutcome, WordProgress};
use crate::store::ProgressStore;

/// What happened while applying one session's outcomes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionReport {
    /// Entries applied, including skips.
    pub applied: usize,
    /// First-ever interactions, counted against the learning goal.
    pub new_words: usize,
    /// Repeat interactions, counted against the review limit.
    pub reviews: usize,
    /// Outcomes naming a word id missing from the dictionary.
    pub skipped_unknown: usize,
}

/// Apply outcomes in input order.
///
/// Unknown word ids are dropped without aborting the batch. A skipped card
/// leaves counters and scheduling untouched but still consumes quota.
/// Whether an entry counts as "learned" or "reviewed" depends on the word's
/// history, not on which mode the session nominally ran in.
pub fn apply_outcomes<F>(
    outcomes: &[StudyOutcome],
    is_known: F,
    store: &mut dyn ProgressStore,
    state: &mut LearnerState,
    today: NaiveDate,
    now: DateTime<Local>,
) -> SessionReport
where
    F: Fn(&str) -> bool,
{
    state.roll_to(today);
    let mut report = SessionReport::default();

    for outcome in outcomes {
        if !is_known(&outcome.word_id) {
            warn!(word_id = %outcome.word_id, "outcome for unknown word, skipping");
            report.skipped_unknown += 1;
            continue;
        }

        let existing = store.get(&outcome.word_id);
        let first_interaction = existing.is_none();
        let mut progress =
            existing.unwrap_or_else(|| WordProgress::new(outcome.word_id.clone()));
        progress.sanitize();

        match outcome.recall {
            Recall::Skipped => {
                progress.last_reviewed_at = Some(now);
            }
            Recall::Correct | Recall::Incorrect => {
                let was_correct = outcome.recall == Recall::Correct;
                let index = ladder::next_index(progress.interval_index, was_correct);
                progress.interval_index = index;
                if was_correct {
                    progress.correct_count += 1;
                } else {
                    progress.incorrect_count += 1;
                }
                progress.next_review_date = Some(ladder::next_review_date(index, today));
                progress.status = ladder::status_for(index, progress.correct_count > 0);
                progress.last_reviewed_at = Some(now);
            }
        }

        store.upsert(progress);

        if first_interaction {
            state.record_learned(today);
            report.new_words += 1;
        } else {
            state.record_reviewed(today);
            report.reviews += 1;
        }
        report.applied += 1;
    }

    if report.applied > 0 {
        state.mark_activity(today);
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WordStatus;
    use crate::store::MemoryProgressStore;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    fn outcome(id: &str, recall: Recall) -> StudyOutcome {
        StudyOutcome {
            word_id: id.into(),
            recall,
        }
    }

    fn apply(
        outcomes: &[StudyOutcome],
        store: &mut MemoryProgressStore,
        state: &mut LearnerState,
        today: NaiveDate,
    ) -> SessionReport {
        apply_outcomes(outcomes, |_| true, store, state, today, Local::now())
    }

    #[test]
    fn first_correct_answer_climbs_and_schedules() {
        let mut store = MemoryProgressStore::new();
        let mut state = LearnerState::default();

        let report = apply(
            &[outcome("w1", Recall::Correct)],
            &mut store,
            &mut state,
            day(10),
        );
        assert_eq!(report.applied, 1);
        assert_eq!(report.new_words, 1);
        assert_eq!(report.reviews, 0);

        let progress = store.get("w1").unwrap();
        assert_eq!(progress.interval_index, 1);
        assert_eq!(progress.correct_count, 1);
        assert_eq!(progress.status, WordStatus::Reviewing);
        assert_eq!(
            progress.next_review_date,
            Some(ladder::next_review_date(1, day(10)))
        );
        assert!(progress.last_reviewed_at.is_some());
        assert_eq!(state.words_learned_today(), 1);
        assert_eq!(state.words_reviewed_today(), 0);
    }

    #[test]
    fn miss_resets_to_first_rung() {
        let mut store = MemoryProgressStore::new();
        let mut state = LearnerState::default();

        let mut progress = WordProgress::new("w1".into());
        progress.interval_index = 2;
        progress.correct_count = 2;
        progress.status = WordStatus::Reviewing;
        store.upsert(progress);

        apply(
            &[outcome("w1", Recall::Incorrect)],
            &mut store,
            &mut state,
            day(10),
        );

        let progress = store.get("w1").unwrap();
        assert_eq!(progress.interval_index, 0);
        assert_eq!(progress.incorrect_count, 1);
        assert_eq!(progress.correct_count, 2);
        // Ever answered correctly, so a reset does not return it to Learning.
        assert_eq!(progress.status, WordStatus::Reviewing);
        assert_eq!(progress.next_review_date, Some(day(11)));
        assert_eq!(state.words_reviewed_today(), 1);
    }

    #[test]
    fn counting_follows_word_history_not_session_mode() {
        let mut store = MemoryProgressStore::new();
        let mut state = LearnerState::default();

        store.upsert(WordProgress::new("seen".into()));

        let report = apply(
            &[
                outcome("fresh", Recall::Correct),
                outcome("seen", Recall::Correct),
            ],
            &mut store,
            &mut state,
            day(10),
        );
        assert_eq!(report.new_words, 1);
        assert_eq!(report.reviews, 1);
        assert_eq!(state.words_learned_today(), 1);
        assert_eq!(state.words_reviewed_today(), 1);
    }

    #[test]
    fn skip_creates_a_record_and_consumes_quota() {
        let mut store = MemoryProgressStore::new();
        let mut state = LearnerState::default();

        let report = apply(
            &[outcome("w1", Recall::Skipped)],
            &mut store,
            &mut state,
            day(10),
        );
        assert_eq!(report.applied, 1);
        assert_eq!(report.new_words, 1);

        let progress = store.get("w1").unwrap();
        assert_eq!(progress.interval_index, 0);
        assert_eq!(progress.correct_count, 0);
        assert_eq!(progress.incorrect_count, 0);
        assert_eq!(progress.next_review_date, None);
        assert!(progress.last_reviewed_at.is_some());
        // Skipped but never answered: still eligible as new tomorrow.
        assert!(progress.is_new());
        assert_eq!(state.words_learned_today(), 1);
    }

    #[test]
    fn unknown_ids_are_skipped_without_aborting() {
        let mut store = MemoryProgressStore::new();
        let mut state = LearnerState::default();

        let report = apply_outcomes(
            &[
                outcome("known", Recall::Correct),
                outcome("ghost", Recall::Correct),
                outcome("known2", Recall::Incorrect),
            ],
            |id| id != "ghost",
            &mut store,
            &mut state,
            day(10),
            Local::now(),
        );
        assert_eq!(report.applied, 2);
        assert_eq!(report.skipped_unknown, 1);
        assert!(store.get("ghost").is_none());
        assert!(store.get("known").is_some());
    }

    #[test]
    fn climbing_the_full_ladder_masters_the_word() {
        let mut store = MemoryProgressStore::new();
        let mut state = LearnerState::default();

        let mut progress = WordProgress::new("w1".into());
        progress.interval_index = ladder::MAX_INDEX - 1;
        progress.correct_count = 8;
        progress.status = WordStatus::Reviewing;
        store.upsert(progress);

        apply(
            &[outcome("w1", Recall::Correct)],
            &mut store,
            &mut state,
            day(10),
        );

        let progress = store.get("w1").unwrap();
        assert_eq!(progress.interval_index, ladder::MAX_INDEX);
        assert_eq!(progress.status, WordStatus::Mastered);
        assert_eq!(
            progress.next_review_date,
            Some(ladder::next_review_date(ladder::MAX_INDEX, day(10)))
        );
    }

    #[test]
    fn streak_updates_once_per_day_across_sessions() {
        let mut store = MemoryProgressStore::new();
        let mut state = LearnerState::default();

        apply(&[outcome("w1", Recall::Correct)], &mut store, &mut state, day(10));
        apply(&[outcome("w2", Recall::Correct)], &mut store, &mut state, day(10));

        assert_eq!(state.streak.current_streak, 1);
        assert_eq!(state.words_learned_today(), 2);

        apply(&[outcome("w3", Recall::Correct)], &mut store, &mut state, day(11));
        assert_eq!(state.streak.current_streak, 2);
        // New day: counters were reset before the increment.
        assert_eq!(state.words_learned_today(), 1);
    }

    #[test]
    fn empty_or_all_unknown_sessions_do_not_touch_the_streak() {
        let mut store = MemoryProgressStore::new();
        let mut state = LearnerState::default();

        apply(&[], &mut store, &mut state, day(10));
        assert_eq!(state.streak.current_streak, 0);

        apply_outcomes(
            &[outcome("ghost", Recall::Correct)],
            |_| false,
            &mut store,
            &mut state,
            day(10),
            Local::now(),
        );
        assert_eq!(state.streak.current_streak, 0);
    }
}
