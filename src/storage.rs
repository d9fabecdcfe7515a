//! Storage module for the learner profile and the vocabulary dictionary.
//!
//! The engine never touches the filesystem; this collaborator loads records
//! into memory, hands them to the engine, and writes updated copies back.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::daily::LearnerState;
use crate::models::{stable_word_id, DailyBatch, VocabularyWord, WordProgress};

/// Bundled sample dictionary, used when no vocabulary file is configured.
const BUNDLED_VOCABULARY: &str = include_str!("../data/vocabulary.sample.json");

/// Everything persisted for one learner.
#[derive(Debug, Default)]
pub struct Profile {
    pub progress: Vec<WordProgress>,
    pub state: LearnerState,
    pub batches: Vec<DailyBatch>,
}

/// State-file payload: learner state plus the cached daily batches.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StateFile {
    #[serde(default)]
    state: LearnerState,
    #[serde(default)]
    batches: Vec<DailyBatch>,
}

/// Handles profile persistence under a single directory.
pub struct ProfileStorage {
    profile_dir: PathBuf,
}

impl ProfileStorage {
    pub fn new(profile_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&profile_dir)
            .with_context(|| format!("Failed to create profile directory: {:?}", profile_dir))?;
        Ok(Self { profile_dir })
    }

    /// Get default storage location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordpath")
    }

    fn progress_path(&self) -> PathBuf {
        self.profile_dir.join("progress.json")
    }

    fn state_path(&self) -> PathBuf {
        self.profile_dir.join("state.json")
    }

    /// Load the profile, reconciling progress against the dictionary.
    ///
    /// Records for words that no longer exist in the dictionary are dropped,
    /// so a dictionary update cannot leave orphaned progress behind.
    pub fn load_profile(&self, vocabulary: &[VocabularyWord]) -> Result<Profile> {
        let known: HashSet<&str> = vocabulary.iter().map(|word| word.id.as_str()).collect();

        let mut progress: Vec<WordProgress> = read_json_or_default(&self.progress_path())?;
        let before = progress.len();
        progress.retain(|record| known.contains(record.word_id.as_str()));
        let orphaned = before - progress.len();
        if orphaned > 0 {
            info!(orphaned, kept = progress.len(), "dropped orphaned progress records");
        }

        let state_file: StateFile = read_json_or_default(&self.state_path())?;

        Ok(Profile {
            progress,
            state: state_file.state,
            batches: state_file.batches,
        })
    }

    /// Save the profile. Each file is replaced atomically so a torn write
    /// cannot corrupt the progress list or the batch cache.
    pub fn save_profile(&self, profile: &Profile) -> Result<()> {
        write_json_atomic(&self.progress_path(), &profile.progress)?;
        write_json_atomic(
            &self.state_path(),
            &StateFile {
                state: profile.state.clone(),
                batches: profile.batches.clone(),
            },
        )?;
        Ok(())
    }
}

fn read_json_or_default<T: Default + for<'de> Deserialize<'de>>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {:?}", path))?;
    serde_json::from_str(&json).with_context(|| format!("Failed to parse {:?}", path))
}

fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {:?}", tmp))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {:?}", path))?;
    Ok(())
}

/// Dictionary entry as it appears on disk; the id is optional and derived
/// from the content fields when missing.
#[derive(Debug, Deserialize)]
struct RawWord {
    #[serde(default)]
    id: Option<String>,
    text: String,
    #[serde(default)]
    pronunciation: String,
    #[serde(default)]
    definition: String,
    #[serde(default)]
    level: String,
    #[serde(default)]
    category: String,
}

/// Load the vocabulary dictionary from a JSON file.
pub fn load_vocabulary(path: &Path) -> Result<Vec<VocabularyWord>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read vocabulary file: {:?}", path))?;
    parse_vocabulary(&json).with_context(|| format!("Failed to parse vocabulary file: {:?}", path))
}

/// The dictionary shipped with the binary.
pub fn bundled_vocabulary() -> Result<Vec<VocabularyWord>> {
    parse_vocabulary(BUNDLED_VOCABULARY).context("Failed to parse bundled vocabulary")
}

fn parse_vocabulary(json: &str) -> Result<Vec<VocabularyWord>> {
    let raw: Vec<RawWord> = serde_json::from_str(json)?;
    let words = raw
        .into_iter()
        .filter_map(|entry| {
            let text = entry.text.trim().to_string();
            let definition = entry.definition.trim().to_string();
            if text.is_empty() || definition.is_empty() {
                return None;
            }
            let pronunciation = entry.pronunciation.trim().to_string();
            let id = entry
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| stable_word_id(&text, &pronunciation, &definition));
            Some(VocabularyWord {
                id,
                text,
                pronunciation,
                definition,
                level: entry.level.trim().to_string(),
                category: entry.category.trim().to_string(),
            })
        })
        .collect();
    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn word(text: &str) -> VocabularyWord {
        VocabularyWord {
            id: stable_word_id(text, "", "def"),
            text: text.into(),
            pronunciation: String::new(),
            definition: "def".into(),
            level: String::new(),
            category: String::new(),
        }
    }

    #[test]
    fn missing_profile_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ProfileStorage::new(dir.path().join("profile")).unwrap();
        let profile = storage.load_profile(&[word("a")]).unwrap();
        assert!(profile.progress.is_empty());
        assert!(profile.batches.is_empty());
        assert_eq!(profile.state.streak.current_streak, 0);
    }

    #[test]
    fn profile_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ProfileStorage::new(dir.path().to_path_buf()).unwrap();
        let words = [word("a"), word("b")];

        let mut state = LearnerState::default();
        state.record_learned(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
        state.mark_activity(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());

        let profile = Profile {
            progress: vec![WordProgress::new(words[0].id.clone())],
            state,
            batches: Vec::new(),
        };
        storage.save_profile(&profile).unwrap();

        let loaded = storage.load_profile(&words).unwrap();
        assert_eq!(loaded.progress.len(), 1);
        assert_eq!(loaded.progress[0].word_id, words[0].id);
        assert_eq!(loaded.state.streak.current_streak, 1);
        assert_eq!(loaded.state.words_learned_today(), 1);
    }

    #[test]
    fn orphaned_progress_is_dropped_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let storage = ProfileStorage::new(dir.path().to_path_buf()).unwrap();

        let profile = Profile {
            progress: vec![
                WordProgress::new(word("kept").id),
                WordProgress::new("wgone000000000".into()),
            ],
            state: LearnerState::default(),
            batches: Vec::new(),
        };
        storage.save_profile(&profile).unwrap();

        let loaded = storage.load_profile(&[word("kept")]).unwrap();
        assert_eq!(loaded.progress.len(), 1);
        assert_eq!(loaded.progress[0].word_id, word("kept").id);
    }

    #[test]
    fn vocabulary_parsing_fills_ids_and_skips_blank_rows() {
        let json = r#"[
            {"text": "你好", "pronunciation": "nǐ hǎo", "definition": "hello", "level": "HSK1", "category": "greetings"},
            {"text": "  ", "definition": "blank text"},
            {"text": "再见", "definition": ""},
            {"id": "custom1", "text": "谢谢", "pronunciation": "xiè xie", "definition": "thanks"}
        ]"#;

        let words = parse_vocabulary(json).unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].id, stable_word_id("你好", "nǐ hǎo", "hello"));
        assert_eq!(words[0].level, "HSK1");
        assert_eq!(words[1].id, "custom1");
    }

    #[test]
    fn bundled_vocabulary_parses() {
        let words = bundled_vocabulary().unwrap();
        assert!(!words.is_empty());
        for word in &words {
            assert!(!word.id.is_empty());
            assert!(!word.text.is_empty());
        }
    }
}
