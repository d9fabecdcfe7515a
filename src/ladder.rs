//! The fixed interval ladder and its transition rules.
//!
//! Review gaps follow a Fibonacci-like sequence of day counts. A correct
//! answer climbs one rung, a miss falls back to the first rung, and reaching
//! the last rung marks the word as mastered.

use chrono::{Duration, NaiveDate};

use crate::models::WordStatus;

/// Review gaps in days.
pub const INTERVALS: [u32; 9] = [1, 2, 3, 5, 8, 13, 21, 34, 55];

/// Index of the final rung; reaching it means mastery.
pub const MAX_INDEX: usize = INTERVALS.len() - 1;

/// Clamp an index into `[0, MAX_INDEX]`.
pub fn clamp_index(index: usize) -> usize {
    index.min(MAX_INDEX)
}

/// Climb one rung on a correct answer, fall back to the start on a miss.
pub fn next_index(current: usize, was_correct: bool) -> usize {
    if was_correct {
        clamp_index(current + 1)
    } else {
        0
    }
}

/// The gap in days for a rung.
pub fn interval_days(index: usize) -> u32 {
    INTERVALS[clamp_index(index)]
}

/// Schedule the next review, at day granularity.
pub fn next_review_date(index: usize, today: NaiveDate) -> NaiveDate {
    today + Duration::days(i64::from(interval_days(index)))
}

pub fn is_mastered(index: usize) -> bool {
    clamp_index(index) == MAX_INDEX
}

/// Derive lifecycle status from ladder position and answer history.
///
/// A word sits in `Learning` only while it has never been answered
/// correctly; mastery requires actually climbing to the last rung.
pub fn status_for(index: usize, ever_correct: bool) -> WordStatus {
    let index = clamp_index(index);
    if index == MAX_INDEX && ever_correct {
        WordStatus::Mastered
    } else if index == 0 && !ever_correct {
        WordStatus::Learning
    } else {
        WordStatus::Reviewing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, d).unwrap()
    }

    #[test]
    fn intervals_strictly_increase() {
        for pair in INTERVALS.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn correct_answers_climb_without_skipping() {
        for i in 0..=MAX_INDEX {
            let next = next_index(i, true);
            assert!(next >= i);
            assert!(next <= MAX_INDEX);
        }
        assert_eq!(next_index(MAX_INDEX, true), MAX_INDEX);
    }

    #[test]
    fn a_miss_resets_to_the_first_rung() {
        for i in 0..=MAX_INDEX {
            assert_eq!(next_index(i, false), 0);
        }
    }

    #[test]
    fn mastery_boundary() {
        assert!(is_mastered(MAX_INDEX));
        assert!(!is_mastered(MAX_INDEX - 1));
        // Out-of-range indices clamp onto the last rung.
        assert!(is_mastered(MAX_INDEX + 10));
    }

    #[test]
    fn review_date_is_deterministic() {
        let today = day(10);
        assert_eq!(next_review_date(4, today), next_review_date(4, today));
    }

    #[test]
    fn correct_on_day_ten_schedules_day_fifteen() {
        // Rung 2 (3 days) answered correctly climbs to rung 3 (5 days).
        let index = next_index(2, true);
        assert_eq!(index, 3);
        assert_eq!(next_review_date(index, day(10)), day(15));
    }

    #[test]
    fn miss_on_day_ten_schedules_day_eleven() {
        let index = next_index(2, false);
        assert_eq!(index, 0);
        assert_eq!(next_review_date(index, day(10)), day(11));
    }

    #[test]
    fn status_follows_index_and_history() {
        assert_eq!(status_for(0, false), WordStatus::Learning);
        assert_eq!(status_for(0, true), WordStatus::Reviewing);
        assert_eq!(status_for(3, true), WordStatus::Reviewing);
        assert_eq!(status_for(MAX_INDEX, true), WordStatus::Mastered);
        // A clamped record with no correct answers is not mastered.
        assert_eq!(status_for(MAX_INDEX, false), WordStatus::Reviewing);
    }
}
