//! Day-boundary bookkeeping: daily counters, quotas, and the study streak.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::models::{DailyStats, StreakState};

/// Per-learner daily counters and streak, shared by batch selection and
/// outcome processing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearnerState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily: Option<DailyStats>,
    #[serde(default)]
    pub streak: StreakState,
}

impl LearnerState {
    /// Reset the daily counters when the calendar day has rolled over.
    ///
    /// A `today` earlier than the stored date means the clock ran backwards;
    /// that is treated as "not a new day" and the counters are kept.
    pub fn roll_to(&mut self, today: NaiveDate) {
        match &self.daily {
            Some(day) if day.date >= today => {}
            _ => self.daily = Some(DailyStats::new(today)),
        }
    }

    pub fn words_learned_today(&self) -> u32 {
        self.daily.as_ref().map_or(0, |day| day.new_words_learned)
    }

    pub fn words_reviewed_today(&self) -> u32 {
        self.daily.as_ref().map_or(0, |day| day.reviews_completed)
    }

    pub fn record_learned(&mut self, today: NaiveDate) {
        self.roll_to(today);
        if let Some(day) = &mut self.daily {
            day.new_words_learned += 1;
        }
    }

    pub fn record_reviewed(&mut self, today: NaiveDate) {
        self.roll_to(today);
        if let Some(day) = &mut self.daily {
            day.reviews_completed += 1;
        }
    }

    /// `max(0, goal - learned)`; never negative however far the goal is
    /// overshot.
    pub fn remaining_learning_quota(&mut self, daily_goal: u32, today: NaiveDate) -> u32 {
        self.roll_to(today);
        daily_goal.saturating_sub(self.words_learned_today())
    }

    pub fn remaining_review_quota(&mut self, review_limit: u32, today: NaiveDate) -> u32 {
        self.roll_to(today);
        review_limit.saturating_sub(self.words_reviewed_today())
    }

    pub fn learning_goal_reached(&mut self, daily_goal: u32, today: NaiveDate) -> bool {
        self.remaining_learning_quota(daily_goal, today) == 0
    }

    pub fn review_goal_reached(&mut self, review_limit: u32, today: NaiveDate) -> bool {
        self.remaining_review_quota(review_limit, today) == 0
    }

    /// Advance the streak for a study action on `today`. Idempotent within a
    /// calendar day; a gap of two or more days, or a stored activity date in
    /// the future, resets the run to one.
    pub fn mark_activity(&mut self, today: NaiveDate) {
        let streak = &mut self.streak;
        match streak.last_activity_date {
            Some(last) if last == today => {}
            Some(last) if last.succ_opt() == Some(today) => streak.current_streak += 1,
            _ => streak.current_streak = 1,
        }
        streak.last_activity_date = Some(today);
        streak.longest_streak = streak.longest_streak.max(streak.current_streak);
    }
}
