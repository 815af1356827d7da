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

//! Entry validation errors

use thiserror::Error;

/// Result type for entry construction and parsing
pub type EntryResult<T> = Result<T, EntryError>;

/// Errors raised at the entry boundary, before anything reaches the store
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntryError {
    /// Surface was empty or whitespace only
    #[error("Surface must not be empty")]
    EmptySurface,

    /// Part-of-speech tag is not one of the known labels
    #[error("Unknown part of speech: {0}")]
    UnknownPartOfSpeech(String),

    /// Source tag is not one of the known sources
    #[error("Unknown source: {0}")]
    UnknownSource(String),

    /// Candidate category label is not recognised
    #[error("Unknown candidate category: {0}")]
    UnknownCategory(String),
}
