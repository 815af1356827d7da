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

//! Updater error types

use neodict_storage::StoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for updater configuration and setup
pub type UpdaterResult<T> = Result<T, UpdaterError>;

/// Failure of a single document source.
///
/// Always recovered by the orchestrator: the source contributes no
/// documents for that cycle.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Source location does not exist or is not readable as text
    #[error("Source {source_id} unavailable: {reason}")]
    Unavailable { source_id: String, reason: String },

    /// Reading the source failed part-way
    #[error("Source {source_id} failed to read {path}: {error}")]
    Io {
        source_id: String,
        path: PathBuf,
        #[source]
        error: std::io::Error,
    },
}

/// Errors from updater configuration and setup
#[derive(Debug, Error)]
pub enum UpdaterError {
    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schedule fields out of range
    #[error("Invalid schedule: {0}")]
    InvalidSchedule(String),

    /// Storage failure
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for UpdaterError {
    fn from(e: toml::de::Error) -> Self {
        UpdaterError::Config(e.to_string())
    }
}
