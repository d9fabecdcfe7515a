//! Data models for vocabulary words and learner progress.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::ladder;

/// A dictionary entry. Loaded once at startup, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VocabularyWord {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub pronunciation: String,
    pub definition: String,
    #[serde(default)]
    pub level: String,
    #[serde(default)]
    pub category: String,
}

/// Derive a stable identifier from the immutable content fields.
///
/// The same word always maps to the same id across dictionary reloads,
/// which lets progress records survive a dictionary update.
pub fn stable_word_id(text: &str, pronunciation: &str, definition: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hasher.update(b"|");
    hasher.update(pronunciation.as_bytes());
    hasher.update(b"|");
    hasher.update(definition.as_bytes());
    let digest = hasher.finalize();
    format!("w{}", hex::encode(&digest[..8]))
}

/// Where a word sits in its review lifecycle.
///
/// Always derived from the interval index and answer history, never set
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Learning,
    Reviewing,
    Mastered,
}

/// Per-word study progress, created lazily on first interaction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordProgress {
    pub word_id: String,
    pub status: WordStatus,
    pub interval_index: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_review_date: Option<NaiveDate>,
    pub correct_count: u32,
    pub incorrect_count: u32,
    #[serde(default)]
    pub is_bookmarked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reviewed_at: Option<DateTime<Local>>,
}

impl WordProgress {
    pub fn new(word_id: String) -> Self {
        Self {
            word_id,
            status: WordStatus::Learning,
            interval_index: 0,
            next_review_date: None,
            correct_count: 0,
            incorrect_count: 0,
            is_bookmarked: false,
            last_reviewed_at: None,
        }
    }

    /// A word never answered correctly still counts as new.
    pub fn is_new(&self) -> bool {
        self.interval_index == 0 && self.correct_count == 0
    }

    /// Scheduled on or before `today` and not yet mastered.
    pub fn is_due(&self, today: NaiveDate) -> bool {
        self.status != WordStatus::Mastered
            && self.next_review_date.map_or(false, |due| due <= today)
    }

    /// Clamp a corrupt interval index into range and re-derive the status.
    pub fn sanitize(&mut self) {
        self.interval_index = ladder::clamp_index(self.interval_index);
        self.status = ladder::status_for(self.interval_index, self.correct_count > 0);
    }
}

/// Recall judgment for one card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recall {
    Correct,
    Incorrect,
    Skipped,
}

impl Recall {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            'y' => Some(Self::Correct),
            'n' => Some(Self::Incorrect),
            's' => Some(Self::Skipped),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Correct => "knew it",
            Self::Incorrect => "missed it",
            Self::Skipped => "skipped",
        }
    }
}

/// One per-word result from a finished study session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyOutcome {
    pub word_id: String,
    pub recall: Recall,
}

/// Level/category restriction for batch selection.
///
/// An empty list means no restriction; a value matching nothing in the
/// dictionary simply yields an empty result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSettings {
    #[serde(default)]
    pub levels: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
}

impl FilterSettings {
    pub fn matches(&self, word: &VocabularyWord) -> bool {
        let level_ok = self.levels.is_empty() || self.levels.contains(&word.level);
        let category_ok =
            self.categories.is_empty() || self.categories.contains(&word.category);
        level_ok && category_ok
    }
}

/// Counters for one calendar day of study.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub date: NaiveDate,
    pub new_words_learned: u32,
    pub reviews_completed: u32,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            new_words_learned: 0,
            reviews_completed: 0,
        }
    }
}

/// Consecutive-day study streak.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_activity_date: Option<NaiveDate>,
}

/// Which study mode a daily batch belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchKind {
    Learning,
    Review,
}

impl BatchKind {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Learning => "learning",
            Self::Review => "review",
        }
    }
}

/// The day's cached word selection for one study mode, together with the
/// settings it was computed under. A change of day, filters, or quota makes
/// the cache stale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DailyBatch {
    pub kind: BatchKind,
    pub date: NaiveDate,
    pub filters: FilterSettings,
    pub quota: u32,
    pub word_ids: Vec<String>,
    pub reshuffles: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(level: &str, category: &str) -> VocabularyWord {
        VocabularyWord {
            id: "w1".into(),
            text: "你好".into(),
            pronunciation: "nǐ hǎo".into(),
            definition: "hello".into(),
            level: level.into(),
            category: category.into(),
        }
    }

    #[test]
    fn stable_id_is_deterministic() {
        let a = stable_word_id("你好", "nǐ hǎo", "hello");
        let b = stable_word_id("你好", "nǐ hǎo", "hello");
        assert_eq!(a, b);
        assert!(a.starts_with('w'));
    }

    #[test]
    fn stable_id_distinguishes_content() {
        let a = stable_word_id("你好", "nǐ hǎo", "hello");
        let b = stable_word_id("再见", "zài jiàn", "goodbye");
        assert_ne!(a, b);
    }

    #[test]
    fn empty_filter_matches_everything() {
        let filters = FilterSettings::default();
        assert!(filters.matches(&word("HSK1", "greetings")));
    }

    #[test]
    fn filter_restricts_by_level_and_category() {
        let filters = FilterSettings {
            levels: vec!["HSK1".into()],
            categories: vec!["greetings".into()],
        };
        assert!(filters.matches(&word("HSK1", "greetings")));
        assert!(!filters.matches(&word("HSK2", "greetings")));
        assert!(!filters.matches(&word("HSK1", "food")));
    }

    #[test]
    fn unknown_filter_value_matches_nothing() {
        let filters = FilterSettings {
            levels: vec!["HSK99".into()],
            categories: vec![],
        };
        assert!(!filters.matches(&word("HSK1", "greetings")));
    }

    #[test]
    fn fresh_progress_is_new_until_first_correct() {
        let mut progress = WordProgress::new("w1".into());
        assert!(progress.is_new());

        progress.incorrect_count = 3;
        assert!(progress.is_new());

        progress.correct_count = 1;
        assert!(!progress.is_new());
    }

    #[test]
    fn sanitize_clamps_out_of_range_index() {
        let mut progress = WordProgress::new("w1".into());
        progress.interval_index = 99;
        progress.correct_count = 4;
        progress.sanitize();
        assert_eq!(progress.interval_index, ladder::MAX_INDEX);
        assert_eq!(progress.status, WordStatus::Mastered);
    }

    #[test]
    fn due_check_respects_date_and_mastery() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut progress = WordProgress::new("w1".into());
        assert!(!progress.is_due(today));

        progress.next_review_date = Some(today);
        assert!(progress.is_due(today));

        progress.next_review_date = Some(today.succ_opt().unwrap());
        assert!(!progress.is_due(today));

        progress.next_review_date = Some(today);
        progress.status = WordStatus::Mastered;
        assert!(!progress.is_due(today));
    }

    #[test]
    fn recall_from_key() {
        assert_eq!(Recall::from_key('y'), Some(Recall::Correct));
        assert_eq!(Recall::from_key('n'), Some(Recall::Incorrect));
        assert_eq!(Recall::from_key('s'), Some(Recall::Skipped));
        assert_eq!(Recall::from_key('x'), None);
    }
}
