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

//! Update cycle orchestration
//!
//! One cycle turns raw documents into committed lexicon entries:
//!
//! ```text
//! DocumentSource ─► RawDocument ─► PatternMiner ─► FrequencyAggregator
//!                                                        │
//!                                    min_frequency filter ┘─► LexiconStore
//! ```
//!
//! Cycles are serialised by a single-slot guard so a scheduler and a manual
//! trigger never write the store concurrently.

use crate::config::UpdaterConfig;
use crate::source::DocumentSource;
use chrono::{DateTime, Utc};
use neodict_core::{
    CandidateCategory, CandidateEmission, DictionaryEntry, FrequencyAggregator, PartOfSpeech,
    PatternMiner, RawDocument, WordSource,
};
use neodict_storage::{LexiconStore, StoreError, StoreResult};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Default aggregated-frequency threshold for a full cycle
pub const DEFAULT_MIN_FREQUENCY: i64 = 2;

/// Default threshold for `run_single_source`
pub const DEFAULT_SINGLE_SOURCE_MIN_FREQUENCY: i64 = 1;

/// Outcome of a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CycleStatus {
    Completed,
    Failed { reason: String },
}

/// Statistics reported by every cycle, including failed ones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    /// Emissions produced by the miner across all documents
    pub collected_words: usize,
    /// Distinct surfaces after aggregation
    pub unique_words: usize,
    pub added: usize,
    pub updated: usize,
    pub duration_seconds: f64,
    pub timestamp: DateTime<Utc>,
    pub status: CycleStatus,
}

impl CycleStats {
    fn started() -> Self {
        Self {
            collected_words: 0,
            unique_words: 0,
            added: 0,
            updated: 0,
            duration_seconds: 0.0,
            timestamp: Utc::now(),
            status: CycleStatus::Completed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CycleStatus::Completed
    }
}

/// Drives mining, aggregation and commit against one store
pub struct UpdateOrchestrator {
    store: Arc<LexiconStore>,
    miner: PatternMiner,
    sources: Vec<Box<dyn DocumentSource>>,
    min_frequency: i64,
    single_source_min_frequency: i64,
    cycle_guard: Mutex<()>,
}

impl UpdateOrchestrator {
    pub fn new(store: Arc<LexiconStore>) -> Self {
        Self {
            store,
            miner: PatternMiner::new(),
            sources: Vec::new(),
            min_frequency: DEFAULT_MIN_FREQUENCY,
            single_source_min_frequency: DEFAULT_SINGLE_SOURCE_MIN_FREQUENCY,
            cycle_guard: Mutex::new(()),
        }
    }

    /// Orchestrator with thresholds and enabled sources taken from `config`
    pub fn from_config(store: Arc<LexiconStore>, config: &UpdaterConfig) -> Self {
        let mut orchestrator = Self::new(store)
            .with_min_frequency(config.min_frequency)
            .with_single_source_min_frequency(config.single_source_min_frequency);
        for source in config.build_sources() {
            orchestrator.sources.push(source);
        }
        orchestrator
    }

    pub fn with_min_frequency(mut self, min_frequency: i64) -> Self {
        self.min_frequency = min_frequency;
        self
    }

    pub fn with_single_source_min_frequency(mut self, min_frequency: i64) -> Self {
        self.single_source_min_frequency = min_frequency;
        self
    }

    pub fn with_source(mut self, source: impl DocumentSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    pub fn store(&self) -> &Arc<LexiconStore> {
        &self.store
    }

    pub fn min_frequency(&self) -> i64 {
        self.min_frequency
    }

    pub fn source_ids(&self) -> Vec<&str> {
        self.sources.iter().map(|s| s.id()).collect()
    }

    /// Fetch from every configured source. A failing source is logged and
    /// contributes nothing.
    pub fn collect_documents(&self) -> Vec<RawDocument> {
        let mut documents = Vec::new();
        for source in &self.sources {
            match source.fetch() {
                Ok(mut docs) => {
                    info!(source = source.id(), documents = docs.len(), "Collected documents");
                    documents.append(&mut docs);
                }
                Err(e) => {
                    warn!(source = source.id(), error = %e, "Source failed, skipping for this cycle");
                }
            }
        }
        documents
    }

    /// Run a cycle over `documents`, waiting for any cycle already running
    pub fn run_update_cycle(&self, documents: &[RawDocument], min_frequency: i64) -> CycleStats {
        let _guard = self.cycle_guard.lock();
        self.cycle(documents, min_frequency)
    }

    /// Run a cycle unless one is already in progress
    pub fn try_run_update_cycle(
        &self,
        documents: &[RawDocument],
        min_frequency: i64,
    ) -> Option<CycleStats> {
        let _guard = self.cycle_guard.try_lock()?;
        Some(self.cycle(documents, min_frequency))
    }

    /// Collect from the configured sources and run a cycle with the
    /// configured threshold
    pub fn run_configured_cycle(&self) -> CycleStats {
        let _guard = self.cycle_guard.lock();
        let documents = self.collect_documents();
        self.cycle(&documents, self.min_frequency)
    }

    /// As `run_configured_cycle`, but returns `None` without fetching when a
    /// cycle is already running
    pub fn try_run_configured_cycle(&self) -> Option<CycleStats> {
        let _guard = self.cycle_guard.try_lock()?;
        let documents = self.collect_documents();
        Some(self.cycle(&documents, self.min_frequency))
    }

    /// Mine `documents` as if they all came from `source_id` and write every
    /// candidate at or above `min_frequency` (the configured single-source
    /// threshold when `None`), overwriting existing entries. Returns the
    /// number of entries written.
    pub fn run_single_source(
        &self,
        source_id: &str,
        documents: &[RawDocument],
        min_frequency: Option<i64>,
    ) -> StoreResult<usize> {
        let _guard = self.cycle_guard.lock();
        let threshold = min_frequency.unwrap_or(self.single_source_min_frequency);

        let mut aggregator = FrequencyAggregator::new();
        for document in documents {
            aggregator.extend(self.emissions(source_id, &document.text));
        }

        let mut written = 0;
        for candidate in aggregator.into_candidates() {
            if candidate.total_frequency < threshold {
                continue;
            }
            let entry = new_entry(
                &candidate.surface,
                candidate.total_frequency,
                source_id,
                candidate.first_seen_category,
            )?;
            self.store.upsert(&entry)?;
            written += 1;
        }

        info!(source = source_id, written, "Single-source update finished");
        Ok(written)
    }

    fn cycle(&self, documents: &[RawDocument], min_frequency: i64) -> CycleStats {
        let start = Instant::now();
        let mut stats = CycleStats::started();
        info!(documents = documents.len(), min_frequency, "Update cycle started");

        if let Err(e) = self.commit(documents, min_frequency, &mut stats) {
            error!(error = %e, added = stats.added, updated = stats.updated, "Update cycle failed");
            stats.status = CycleStatus::Failed {
                reason: e.to_string(),
            };
        }

        stats.duration_seconds = start.elapsed().as_secs_f64();

        if stats.is_success() {
            info!(
                collected = stats.collected_words,
                unique = stats.unique_words,
                added = stats.added,
                updated = stats.updated,
                duration_secs = stats.duration_seconds,
                "Update cycle completed"
            );
        }
        stats
    }

    fn commit(
        &self,
        documents: &[RawDocument],
        min_frequency: i64,
        stats: &mut CycleStats,
    ) -> Result<(), StoreError> {
        let mut aggregator = FrequencyAggregator::new();
        for document in documents {
            aggregator.extend(self.emissions(&document.source_id, &document.text));
        }

        stats.collected_words = aggregator.emission_count();
        stats.unique_words = aggregator.len();

        let survivors: Vec<_> = aggregator
            .into_candidates()
            .into_iter()
            .filter(|c| c.total_frequency >= min_frequency)
            .collect();
        debug!(survivors = survivors.len(), "Frequency filter applied");

        for candidate in survivors {
            // Existing entries are counted but left as stored
            if self.store.get(&candidate.surface)?.is_some() {
                stats.updated += 1;
                continue;
            }

            let entry = new_entry(
                &candidate.surface,
                candidate.total_frequency,
                &candidate.first_seen_source_tag,
                candidate.first_seen_category,
            )?;
            self.store.upsert(&entry)?;
            stats.added += 1;
        }

        let description = format!(
            "update cycle: {} added, {} updated",
            stats.added, stats.updated
        );
        self.store.record_version(Some(&description))?;
        Ok(())
    }

    /// One emission per (category, surface) of a single document, in
    /// category order
    fn emissions(&self, source_id: &str, text: &str) -> Vec<CandidateEmission> {
        let mut emissions = Vec::new();
        for (category, words) in self.miner.mine(text) {
            let counts = PatternMiner::count_frequency(text, &words);
            for surface in words {
                let local_frequency = counts.get(&surface).copied().unwrap_or(1);
                emissions.push(CandidateEmission {
                    surface,
                    category,
                    local_frequency,
                    source_tag: source_id.to_string(),
                });
            }
        }
        emissions
    }
}

fn new_entry(
    surface: &str,
    frequency: i64,
    source_tag: &str,
    category: CandidateCategory,
) -> Result<DictionaryEntry, StoreError> {
    Ok(DictionaryEntry::new(surface)?
        .pos(PartOfSpeech::Noun)
        .frequency(frequency)
        .source(WordSource::classify(source_tag))
        .category(Some(category.as_str().to_string())))
}
