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

//! NeoDict Updater
//!
//! Runs update cycles against a [`neodict_storage::LexiconStore`]: collects
//! raw text from configured sources, mines and aggregates candidate words,
//! and commits those above the frequency threshold.
//!
//! # Example
//!
//! ```no_run
//! use neodict_core::RawDocument;
//! use neodict_storage::LexiconStore;
//! use neodict_updater::UpdateOrchestrator;
//! use std::sync::Arc;
//!
//! let store = Arc::new(LexiconStore::open("dict.db")?);
//! let orchestrator = UpdateOrchestrator::new(store);
//!
//! let docs = vec![RawDocument::new("news_nhk", "ChatGPTはチャットボットです。")];
//! let stats = orchestrator.run_update_cycle(&docs, 1);
//! println!("added {} words", stats.added);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod scheduler;
pub mod source;

pub use config::{default_config_path, default_db_path, SourceConfig, UpdaterConfig};
pub use error::{SourceError, UpdaterError, UpdaterResult};
pub use orchestrator::{
    CycleStats, CycleStatus, UpdateOrchestrator, DEFAULT_MIN_FREQUENCY,
    DEFAULT_SINGLE_SOURCE_MIN_FREQUENCY,
};
pub use scheduler::{Schedule, UpdateScheduler};
pub use source::{DocumentSource, FileSource, StaticSource};
