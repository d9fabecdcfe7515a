//! wordpath - vocabulary flashcards in the terminal
//!
//! Fixed-ladder spaced repetition over a JSON dictionary, with per-day
//! deterministic batches, daily goals, and a study streak.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wordpath::config::Config;
use wordpath::models::{FilterSettings, Recall, StudyOutcome, VocabularyWord};
use wordpath::storage::{self, Profile, ProfileStorage};
use wordpath::store::MemoryProgressStore;
use wordpath::{SessionReport, StudyEngine};

// ══════════════════════════════════════════════════════════════════════════
// CLI Arguments
// ══════════════════════════════════════════════════════════════════════════

#[derive(Parser, Debug)]
#[command(name = "wordpath")]
#[command(author, version, about = "Vocabulary flashcards with spaced repetition", long_about = None)]
struct Args {
    /// Directory containing the learner profile
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Vocabulary dictionary file (JSON)
    #[arg(long)]
    vocab: Option<PathBuf>,

    /// Override the daily new-word goal
    #[arg(long)]
    goal: Option<u32>,

    /// Override the daily review limit
    #[arg(long)]
    review_limit: Option<u32>,

    /// Restrict to these levels (repeatable)
    #[arg(short, long)]
    level: Vec<String>,

    /// Restrict to these categories (repeatable)
    #[arg(short, long)]
    category: Vec<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Study new words
    Learn,
    /// Review words that are due
    Review,
    /// Re-study today's batch without consuming quota
    Again {
        /// Re-study the review batch instead of the learning batch
        #[arg(long)]
        review: bool,
    },
    /// Show progress statistics
    Stats,
    /// Toggle a word's bookmark
    Bookmark {
        /// The word text as it appears in the dictionary
        word: String,
    },
    /// List bookmarked words
    Bookmarks,
    /// Persist settings changes
    Settings {
        /// Set the daily new-word goal
        #[arg(long)]
        goal: Option<u32>,
        /// Set the daily review limit
        #[arg(long)]
        review_limit: Option<u32>,
    },
}

// ══════════════════════════════════════════════════════════════════════════
// Main Entry Point
// ══════════════════════════════════════════════════════════════════════════

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    let mut config = Config::load().unwrap_or_default();

    let daily_goal = args.goal.unwrap_or(config.daily_goal);
    let review_limit = args.review_limit.unwrap_or(config.review_limit);
    let filters = FilterSettings {
        levels: args.level.clone(),
        categories: args.category.clone(),
    };

    // Dictionary: explicit flag, then config, then the bundled sample.
    let vocabulary = match args.vocab.as_ref().or(config.vocabulary.as_ref()) {
        Some(path) => storage::load_vocabulary(path)?,
        None => storage::bundled_vocabulary()?,
    };

    let data_dir = args
        .data_dir
        .clone()
        .unwrap_or_else(ProfileStorage::default_path);
    let storage = ProfileStorage::new(data_dir)?;
    let profile = storage.load_profile(&vocabulary)?;

    let mut engine = StudyEngine::with_state(
        vocabulary,
        MemoryProgressStore::from_records(profile.progress),
        profile.state,
        profile.batches,
    );

    let today = Local::now().date_naive();

    match args.command {
        Command::Learn => {
            let words = engine.words_for_learning(&filters, daily_goal, today);
            if words.is_empty() {
                let stats = engine.progress_stats(today);
                if stats.words_learned_today >= daily_goal {
                    println!(
                        "Daily goal reached ({} words). Try `wordpath again` to repeat today's batch.",
                        stats.words_learned_today
                    );
                } else {
                    println!("No new words match the current filters.");
                    println!("Levels: {}", engine.available_levels().join(", "));
                    println!("Categories: {}", engine.available_categories().join(", "));
                }
                save(&storage, engine)
            } else {
                study(&mut engine, words, today)?;
                save(&storage, engine)
            }
        }
        Command::Review => {
            let words = engine.words_for_review(&filters, review_limit, today);
            if words.is_empty() {
                println!("Nothing due for review. Come back tomorrow.");
                save(&storage, engine)
            } else {
                study(&mut engine, words, today)?;
                save(&storage, engine)
            }
        }
        Command::Again { review } => {
            let words = if review {
                engine.todays_review_batch(&filters, today)
            } else {
                engine.todays_learning_batch(&filters, today)
            };
            if words.is_empty() {
                println!(
                    "No batch selected today yet. Run `wordpath learn` or `wordpath review` first."
                );
                save(&storage, engine)
            } else {
                study(&mut engine, words, today)?;
                save(&storage, engine)
            }
        }
        Command::Stats => {
            let stats = engine.progress_stats(today);
            print_stats(&stats);
            save(&storage, engine)
        }
        Command::Bookmark { word } => {
            let id = engine.word_by_text(&word).map(|w| w.id.clone());
            match id.and_then(|id| engine.toggle_bookmark(&id)) {
                Some(true) => println!("Bookmarked '{}'.", word),
                Some(false) => println!("Removed bookmark from '{}'.", word),
                None => println!("'{}' is not in the dictionary.", word),
            }
            save(&storage, engine)
        }
        Command::Bookmarks => {
            let words = engine.bookmarked_words();
            if words.is_empty() {
                println!("No bookmarks yet.");
            } else {
                for word in words {
                    print_word_line(&word);
                }
            }
            Ok(())
        }
        Command::Settings { goal, review_limit } => {
            if let Some(goal) = goal {
                config.daily_goal = goal;
            }
            if let Some(limit) = review_limit {
                config.review_limit = limit;
            }
            config.save()?;
            println!(
                "Daily goal {}, review limit {}.",
                config.daily_goal, config.review_limit
            );
            Ok(())
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Interactive Session
// ══════════════════════════════════════════════════════════════════════════

/// Walk through the cards, apply the collected outcomes in one batch, and
/// print the session summary.
fn study(
    engine: &mut StudyEngine<MemoryProgressStore>,
    words: Vec<VocabularyWord>,
    today: NaiveDate,
) -> Result<()> {
    let outcomes = run_cards(engine, &words)?;
    let summary = engine.process_study_results(&outcomes, today, Local::now());
    print_report(&summary.report);
    print_stats(&summary.stats);
    Ok(())
}

/// Present each card and collect a recall judgment for it. Quitting early
/// keeps the outcomes gathered so far.
fn run_cards(
    engine: &mut StudyEngine<MemoryProgressStore>,
    words: &[VocabularyWord],
) -> Result<Vec<StudyOutcome>> {
    println!(
        "{} word(s). Enter shows the answer; then y = knew it, n = missed it, s = skip, b = bookmark, q = quit.\n",
        words.len()
    );

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    let mut outcomes: Vec<StudyOutcome> = Vec::new();

    'cards: for (i, word) in words.iter().enumerate() {
        println!("[{}/{}] {}", i + 1, words.len(), word.text);
        if lines.next().transpose()?.is_none() {
            break;
        }
        println!("        {}  -  {}", word.pronunciation, word.definition);

        let recall = loop {
            print!("        [y/n/s/b/q] ");
            io::stdout().flush()?;
            let Some(line) = lines.next().transpose()? else {
                break 'cards;
            };
            match line.trim().chars().next() {
                Some('b') => {
                    if let Some(flagged) = engine.toggle_bookmark(&word.id) {
                        println!(
                            "        {}",
                            if flagged { "bookmarked" } else { "bookmark removed" }
                        );
                    }
                }
                Some('q') => break 'cards,
                Some(key) => {
                    if let Some(recall) = Recall::from_key(key) {
                        break recall;
                    }
                }
                None => {}
            }
        };

        println!("        ({})\n", recall.name());
        outcomes.push(StudyOutcome {
            word_id: word.id.clone(),
            recall,
        });
    }

    Ok(outcomes)
}

fn print_report(report: &SessionReport) {
    println!(
        "\nSession complete: {} card(s), {} new, {} reviewed.",
        report.applied, report.new_words, report.reviews
    );
    if report.skipped_unknown > 0 {
        println!(
            "{} outcome(s) referenced unknown words and were ignored.",
            report.skipped_unknown
        );
    }
}

fn print_stats(stats: &wordpath::ProgressStats) {
    println!(
        "Today: {} learned, {} reviewed | streak {} (best {}) | {} due, {} mastered, {} words started",
        stats.words_learned_today,
        stats.words_reviewed_today,
        stats.current_streak,
        stats.longest_streak,
        stats.due_count,
        stats.mastered_count,
        stats.total_words_learned,
    );
}

fn print_word_line(word: &VocabularyWord) {
    if word.pronunciation.is_empty() {
        println!("{}  -  {}", word.text, word.definition);
    } else {
        println!(
            "{} ({})  -  {}",
            word.text, word.pronunciation, word.definition
        );
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Persistence
// ══════════════════════════════════════════════════════════════════════════

fn save(storage: &ProfileStorage, engine: StudyEngine<MemoryProgressStore>) -> Result<()> {
    let (store, state, batches) = engine.into_parts();
    storage.save_profile(&Profile {
        progress: store.into_records(),
        state,
        batches,
    })
}
