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

//! Raw documents and candidate records flowing through an update cycle

use crate::error::{EntryError, EntryResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unstructured text handed over by a source collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub source_id: String,
    pub text: String,
}

impl RawDocument {
    pub fn new(source_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            text: text.into(),
        }
    }
}

/// Pattern family a candidate was mined by.
///
/// Declaration order is the order families are visited within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateCategory {
    Katakana,
    Alphanumeric,
    ProperNoun,
}

impl CandidateCategory {
    pub const ALL: [CandidateCategory; 3] = [
        CandidateCategory::Katakana,
        CandidateCategory::Alphanumeric,
        CandidateCategory::ProperNoun,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CandidateCategory::Katakana => "katakana",
            CandidateCategory::Alphanumeric => "alphanumeric",
            CandidateCategory::ProperNoun => "proper_noun",
        }
    }
}

impl fmt::Display for CandidateCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CandidateCategory {
    type Err = EntryError;

    fn from_str(s: &str) -> EntryResult<Self> {
        CandidateCategory::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| EntryError::UnknownCategory(s.to_string()))
    }
}

/// One surface mined from one document by one pattern family
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateEmission {
    pub surface: String,
    pub category: CandidateCategory,
    /// Substring occurrences of `surface` in the originating document
    pub local_frequency: i64,
    pub source_tag: String,
}

/// All emissions for one surface within a cycle, collapsed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedCandidate {
    pub surface: String,
    pub total_frequency: i64,
    pub first_seen_source_tag: String,
    pub first_seen_category: CandidateCategory,
}
