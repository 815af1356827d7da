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

//! NeoDict Core
//!
//! Entity types and the pure parts of the lexicon update pipeline:
//!
//! ```text
//! RawDocument ─► PatternMiner ─► CandidateEmission ─► FrequencyAggregator ─► AggregatedCandidate
//! ```
//!
//! Nothing in this crate performs I/O beyond the export writers; persistence
//! lives in `neodict-storage` and cycle orchestration in `neodict-updater`.

pub mod aggregate;
pub mod candidate;
pub mod entry;
pub mod error;
pub mod export;
pub mod miner;

pub use aggregate::{aggregate, FrequencyAggregator};
pub use candidate::{AggregatedCandidate, CandidateCategory, CandidateEmission, RawDocument};
pub use entry::{DictionaryEntry, PartOfSpeech, WordSource, DEFAULT_CONTEXT_ID, DEFAULT_COST, WILDCARD};
pub use error::{EntryError, EntryResult};
pub use export::{mecab_row, write_json, write_mecab, JsonExport, JsonWord, MECAB_FILE_NAME};
pub use miner::{MinedCandidates, PatternMiner, MAX_SURFACE_CHARS};
