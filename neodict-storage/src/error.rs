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

//! Storage error types

use neodict_core::EntryError;
use thiserror::Error;

/// Result type for lexicon store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the lexicon store.
///
/// Duplicate surfaces never show up here: `upsert` turns them into updates.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Entry rejected before reaching the database
    #[error("Invalid entry: {0}")]
    Validation(#[from] EntryError),

    /// Stored row could not be decoded
    #[error("Corrupt value in column {column}: {reason}")]
    Corrupt { column: usize, reason: String },

    /// SQLite failure
    #[error("SQLite error: {0}")]
    Sqlite(rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::FromSqlConversionFailure(column, _, source) => StoreError::Corrupt {
                column,
                reason: source.to_string(),
            },
            other => StoreError::Sqlite(other),
        }
    }
}
