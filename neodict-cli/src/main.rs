// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! NeoDict CLI
//!
//! Command-line interface for the emerging-word dictionary.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use neodict_core::{write_json, write_mecab, DictionaryEntry, PartOfSpeech, WordSource, MECAB_FILE_NAME};
use neodict_storage::LexiconStore;
use neodict_updater::{
    default_config_path, CycleStats, CycleStatus, DocumentSource, FileSource, Schedule,
    UpdateOrchestrator, UpdateScheduler, UpdaterConfig,
};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn, Level};

const JSON_FILE_NAME: &str = "neodict.json";

#[derive(Parser)]
#[command(name = "neodict")]
#[command(about = "NeoDict - emerging-word dictionary for Japanese tokenizers", long_about = None)]
struct Cli {
    /// Database file (overrides the config file)
    #[arg(short, long)]
    db_path: Option<PathBuf>,

    /// Configuration file [default: ~/.neodict/config.toml]
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Output as JSON (machine-readable)
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an update cycle over the configured sources
    Update {
        /// Only this configured source, overwriting existing entries
        #[arg(long)]
        source: Option<String>,

        /// Minimum aggregated frequency (overrides the config file)
        #[arg(long)]
        min_frequency: Option<i64>,
    },

    /// Search by surface or reading
    Search {
        query: String,

        /// Substring match instead of exact match
        #[arg(long)]
        fuzzy: bool,

        /// Maximum results
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Add or overwrite a word
    Add {
        word: String,

        /// Part of speech (名詞, 動詞, ... or noun, verb, ...)
        #[arg(long, default_value = "名詞")]
        pos: String,

        /// Reading in katakana
        #[arg(long)]
        reading: Option<String>,

        /// Free-form category
        #[arg(long)]
        category: Option<String>,

        /// Source tag
        #[arg(long, default_value = "manual")]
        source: String,

        #[arg(long, default_value = "1")]
        frequency: i64,
    },

    /// Remove a word
    Remove { word: String },

    /// Show dictionary statistics
    Stats,

    /// Export the dictionary
    Export {
        /// Output format: mecab or json
        #[arg(short, long, default_value = "mecab")]
        format: String,

        /// Output file, or directory to write the default file name into
        #[arg(short, long)]
        output: PathBuf,

        /// Export only the most frequent N words
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Run update cycles on a schedule until interrupted
    Schedule {
        /// Run once a day
        #[arg(long, conflicts_with = "hourly")]
        daily: bool,

        /// Run once an hour
        #[arg(long)]
        hourly: bool,

        /// Hour for daily runs
        #[arg(long)]
        hour: Option<u32>,

        /// Minute past the hour
        #[arg(long)]
        minute: Option<u32>,
    },

    /// Show the update history
    History {
        #[arg(long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Mecab,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = UpdaterConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;
    if let Some(db_path) = &cli.db_path {
        config.db_path = db_path.clone();
    }

    let store = Arc::new(
        LexiconStore::open(&config.db_path)
            .with_context(|| format!("Failed to open database at {}", config.db_path.display()))?,
    );

    match cli.command {
        Commands::Update {
            source,
            min_frequency,
        } => cmd_update(store, &config, source, min_frequency, cli.json)?,

        Commands::Search {
            query,
            fuzzy,
            limit,
        } => {
            let entries = store.search(&query, fuzzy, limit)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else if entries.is_empty() {
                println!("No words matching {}", query);
            } else {
                println!("Found {} words:", entries.len());
                for entry in &entries {
                    print_entry(entry);
                }
            }
        }

        Commands::Add {
            word,
            pos,
            reading,
            category,
            source,
            frequency,
        } => {
            let pos: PartOfSpeech = pos.parse()?;
            let source: WordSource = source.parse()?;

            let mut entry = DictionaryEntry::new(word)?
                .pos(pos)
                .source(source)
                .frequency(frequency)
                .category(category);
            if let Some(reading) = reading {
                entry = entry.reading(reading);
            }

            let id = store.upsert(&entry)?;
            info!(surface = %entry.surface, id, "Added word");

            if cli.json {
                println!("{}", serde_json::json!({ "id": id, "surface": entry.surface }));
            } else {
                println!("✓ Added {} ({})", entry.surface, entry.pos);
            }
        }

        Commands::Remove { word } => {
            if store.delete(&word)? == 0 {
                anyhow::bail!("Word not found: {}", word);
            }

            if cli.json {
                println!("{}", serde_json::json!({ "removed": word }));
            } else {
                println!("✓ Removed {}", word);
            }
        }

        Commands::Stats => {
            let stats = store.stats()?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                println!("NeoDict Statistics");
                println!("==================");
                println!();
                println!("  Total words: {}", stats.total_count);
                println!("  Parts of speech: {}", stats.distinct_pos_count);
                println!();
                println!("By source:");
                for (source, count) in &stats.counts_by_source {
                    println!("  {}: {}", source, count);
                }
                println!();
                println!("By part of speech:");
                for (pos, count) in &stats.counts_by_pos {
                    println!("  {}: {}", pos, count);
                }
            }
        }

        Commands::Export {
            format,
            output,
            limit,
        } => {
            let format = parse_export_format(&format)?;
            let path = export_path(&output, format);
            let count = export(&store, format, &path, limit)?;

            if cli.json {
                println!("{}", serde_json::json!({ "path": path, "word_count": count }));
            } else {
                println!("✓ Exported {} words to {}", count, path.display());
            }
        }

        Commands::Schedule {
            daily,
            hourly,
            hour,
            minute,
        } => {
            let schedule = schedule_from_flags(daily, hourly, hour, minute, config.schedule);
            let orchestrator = Arc::new(UpdateOrchestrator::from_config(store, &config));
            let mut scheduler = UpdateScheduler::new(orchestrator, schedule)?;

            println!("✓ Scheduler started: {}", schedule);
            println!("  Next run: {}", scheduler.next_run().format("%Y-%m-%d %H:%M:%S"));
            println!("  Press Ctrl+C to stop");
            scheduler.run_blocking()?;
        }

        Commands::History { limit } => {
            let versions = store.versions(limit)?;

            if cli.json {
                println!("{}", serde_json::to_string_pretty(&versions)?);
            } else if versions.is_empty() {
                println!("No updates recorded");
            } else {
                for version in &versions {
                    println!(
                        "  #{} {} {} words  {}",
                        version.version_id,
                        version.created_at.format("%Y-%m-%d %H:%M:%S"),
                        version.word_count,
                        version.description.as_deref().unwrap_or("-")
                    );
                }
            }
        }
    }

    Ok(())
}

fn cmd_update(
    store: Arc<LexiconStore>,
    config: &UpdaterConfig,
    source: Option<String>,
    min_frequency: Option<i64>,
    json: bool,
) -> Result<()> {
    let orchestrator = UpdateOrchestrator::from_config(store, config);

    if let Some(source_id) = source {
        let source = config
            .sources
            .iter()
            .find(|s| s.id == source_id)
            .with_context(|| format!("Unknown source: {}", source_id))?;
        let documents = FileSource::new(source.id.clone(), source.path.clone())
            .fetch()
            .with_context(|| format!("Failed to read source {}", source_id))?;

        let written = orchestrator.run_single_source(&source_id, &documents, min_frequency)?;
        if json {
            println!("{}", serde_json::json!({ "source": source_id, "written": written }));
        } else {
            println!("✓ Wrote {} words from {}", written, source_id);
        }
        return Ok(());
    }

    if config.sources.is_empty() {
        warn!("No sources configured, nothing to collect");
    }

    let orchestrator = match min_frequency {
        Some(min) => orchestrator.with_min_frequency(min),
        None => orchestrator,
    };
    let stats = orchestrator.run_configured_cycle();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_cycle(&stats);
    }

    if let CycleStatus::Failed { reason } = stats.status {
        anyhow::bail!("Update failed: {}", reason);
    }
    Ok(())
}

fn print_cycle(stats: &CycleStats) {
    match &stats.status {
        CycleStatus::Completed => {
            println!("✓ Update completed in {:.2}s", stats.duration_seconds)
        }
        CycleStatus::Failed { reason } => println!("✗ Update failed: {}", reason),
    }
    println!(
        "  Collected: {}, Unique: {}, Added: {}, Updated: {}",
        stats.collected_words, stats.unique_words, stats.added, stats.updated
    );
}

fn print_entry(entry: &DictionaryEntry) {
    println!(
        "  {} [{}] {} freq={} source={}",
        entry.surface,
        entry.reading.as_deref().unwrap_or("-"),
        entry.pos,
        entry.frequency,
        entry.source
    );
}

fn parse_export_format(s: &str) -> Result<ExportFormat> {
    Ok(match s.to_lowercase().as_str() {
        "mecab" | "csv" => ExportFormat::Mecab,
        "json" => ExportFormat::Json,
        _ => anyhow::bail!("Invalid export format: {} (expected mecab or json)", s),
    })
}

fn export_path(output: &Path, format: ExportFormat) -> PathBuf {
    if !output.is_dir() {
        return output.to_path_buf();
    }
    match format {
        ExportFormat::Mecab => output.join(MECAB_FILE_NAME),
        ExportFormat::Json => output.join(JSON_FILE_NAME),
    }
}

fn export(store: &LexiconStore, format: ExportFormat, path: &Path, limit: Option<usize>) -> Result<usize> {
    let entries = store.all_entries(limit)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let file = File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);

    let count = match format {
        ExportFormat::Mecab => write_mecab(&mut writer, &entries)?,
        ExportFormat::Json => write_json(&mut writer, &entries)?,
    };
    writer.flush()?;

    info!(path = %path.display(), count, "Export finished");
    Ok(count)
}

fn schedule_from_flags(
    daily: bool,
    hourly: bool,
    hour: Option<u32>,
    minute: Option<u32>,
    configured: Schedule,
) -> Schedule {
    if hourly {
        Schedule::Hourly {
            minute: minute.unwrap_or(0),
        }
    } else if daily || hour.is_some() {
        Schedule::Daily {
            hour: hour.unwrap_or(3),
            minute: minute.unwrap_or(0),
        }
    } else {
        configured
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use tempfile::tempdir;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_add_defaults() {
        let cli = Cli::parse_from(["neodict", "add", "推し活"]);
        match cli.command {
            Commands::Add { word, pos, source, .. } => {
                assert_eq!(word, "推し活");
                assert_eq!(pos, "名詞");
                assert_eq!(source, "manual");
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_daily_conflicts_with_hourly() {
        assert!(Cli::try_parse_from(["neodict", "schedule", "--daily", "--hourly"]).is_err());
    }

    #[test]
    fn test_parse_export_format() {
        assert_eq!(parse_export_format("MeCab").unwrap(), ExportFormat::Mecab);
        assert_eq!(parse_export_format("json").unwrap(), ExportFormat::Json);
        assert!(parse_export_format("sudachi").is_err());
    }

    #[test]
    fn test_export_path_for_directory() {
        let dir = tempdir().unwrap();
        assert_eq!(export_path(dir.path(), ExportFormat::Mecab), dir.path().join("neodict.csv"));
        assert_eq!(export_path(dir.path(), ExportFormat::Json), dir.path().join("neodict.json"));

        let file = dir.path().join("custom.csv");
        assert_eq!(export_path(&file, ExportFormat::Mecab), file);
    }

    #[test]
    fn test_schedule_from_flags() {
        let configured = Schedule::Every { minutes: 30 };
        assert_eq!(schedule_from_flags(false, false, None, None, configured), configured);
        assert_eq!(
            schedule_from_flags(false, true, None, Some(15), configured),
            Schedule::Hourly { minute: 15 }
        );
        assert_eq!(
            schedule_from_flags(true, false, None, None, configured),
            Schedule::Daily { hour: 3, minute: 0 }
        );
        assert_eq!(
            schedule_from_flags(false, false, Some(6), None, configured),
            Schedule::Daily { hour: 6, minute: 0 }
        );
    }

    #[test]
    fn test_export_writes_files() {
        let dir = tempdir().unwrap();
        let store = LexiconStore::open_in_memory().unwrap();
        store
            .upsert(&DictionaryEntry::new("推し活").unwrap().reading("オシカツ").frequency(5))
            .unwrap();
        store.upsert(&DictionaryEntry::new("チャットボット").unwrap()).unwrap();

        let csv = dir.path().join("out").join("dict.csv");
        assert_eq!(export(&store, ExportFormat::Mecab, &csv, None).unwrap(), 2);
        let text = fs::read_to_string(&csv).unwrap();
        assert!(text.lines().next().unwrap().starts_with("推し活,"));

        let json = dir.path().join("dict.json");
        assert_eq!(export(&store, ExportFormat::Json, &json, Some(1)).unwrap(), 1);
        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&json).unwrap()).unwrap();
        assert_eq!(value["word_count"], 1);
        assert_eq!(value["words"][0]["surface"], "推し活");
    }
}
