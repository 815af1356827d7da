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

//! Dictionary entry model
//!
//! A [`DictionaryEntry`] is the unit persisted by the lexicon store. The
//! surface form is its only key; everything else is payload that downstream
//! tokenizer dictionaries consume as-is.

use crate::error::{EntryError, EntryResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default tokenizer cost (lower means higher priority)
pub const DEFAULT_COST: i64 = 6000;

/// Default left/right context id for unknown-class nouns
pub const DEFAULT_CONTEXT_ID: i64 = 1285;

/// Placeholder for unset detail fields
pub const WILDCARD: &str = "*";

/// Part of speech, labelled the way IPA-style dictionaries label it
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum PartOfSpeech {
    Noun,
    Verb,
    Adjective,
    Adverb,
    Particle,
    Auxiliary,
    Conjunction,
    Interjection,
    Symbol,
    #[default]
    Unknown,
}

impl PartOfSpeech {
    pub const ALL: [PartOfSpeech; 10] = [
        PartOfSpeech::Noun,
        PartOfSpeech::Verb,
        PartOfSpeech::Adjective,
        PartOfSpeech::Adverb,
        PartOfSpeech::Particle,
        PartOfSpeech::Auxiliary,
        PartOfSpeech::Conjunction,
        PartOfSpeech::Interjection,
        PartOfSpeech::Symbol,
        PartOfSpeech::Unknown,
    ];

    /// Label written to the store and to exported dictionaries
    pub fn label(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "名詞",
            PartOfSpeech::Verb => "動詞",
            PartOfSpeech::Adjective => "形容詞",
            PartOfSpeech::Adverb => "副詞",
            PartOfSpeech::Particle => "助詞",
            PartOfSpeech::Auxiliary => "助動詞",
            PartOfSpeech::Conjunction => "接続詞",
            PartOfSpeech::Interjection => "感動詞",
            PartOfSpeech::Symbol => "記号",
            PartOfSpeech::Unknown => "未知語",
        }
    }

    fn english_name(self) -> &'static str {
        match self {
            PartOfSpeech::Noun => "noun",
            PartOfSpeech::Verb => "verb",
            PartOfSpeech::Adjective => "adjective",
            PartOfSpeech::Adverb => "adverb",
            PartOfSpeech::Particle => "particle",
            PartOfSpeech::Auxiliary => "auxiliary",
            PartOfSpeech::Conjunction => "conjunction",
            PartOfSpeech::Interjection => "interjection",
            PartOfSpeech::Symbol => "symbol",
            PartOfSpeech::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for PartOfSpeech {
    type Err = EntryError;

    /// Accepts either the dictionary label (`名詞`) or the English name (`noun`)
    fn from_str(s: &str) -> EntryResult<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        PartOfSpeech::ALL
            .into_iter()
            .find(|pos| pos.label() == s.trim() || pos.english_name() == lowered)
            .ok_or_else(|| EntryError::UnknownPartOfSpeech(s.to_string()))
    }
}

impl TryFrom<String> for PartOfSpeech {
    type Error = EntryError;

    fn try_from(value: String) -> EntryResult<Self> {
        value.parse()
    }
}

impl From<PartOfSpeech> for String {
    fn from(pos: PartOfSpeech) -> Self {
        pos.label().to_string()
    }
}

/// Where an entry was collected from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordSource {
    Wikipedia,
    News,
    Twitter,
    Manual,
    Hatena,
    #[default]
    Other,
}

impl WordSource {
    pub const ALL: [WordSource; 6] = [
        WordSource::Wikipedia,
        WordSource::News,
        WordSource::Twitter,
        WordSource::Manual,
        WordSource::Hatena,
        WordSource::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WordSource::Wikipedia => "wikipedia",
            WordSource::News => "news",
            WordSource::Twitter => "twitter",
            WordSource::Manual => "manual",
            WordSource::Hatena => "hatena",
            WordSource::Other => "other",
        }
    }

    /// Classify a collaborator source id such as `news_nhk`.
    ///
    /// Only the prefix before the first `_` is considered. Unlike
    /// [`FromStr`], this never fails: unrecognised ids map to `Other`.
    pub fn classify(source_id: &str) -> Self {
        let prefix = source_id.split('_').next().unwrap_or(source_id);
        prefix.parse().unwrap_or(WordSource::Other)
    }
}

impl fmt::Display for WordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WordSource {
    type Err = EntryError;

    fn from_str(s: &str) -> EntryResult<Self> {
        let lowered = s.trim().to_ascii_lowercase();
        WordSource::ALL
            .into_iter()
            .find(|source| source.as_str() == lowered)
            .ok_or_else(|| EntryError::UnknownSource(s.to_string()))
    }
}

/// A dictionary entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    /// Row id assigned by the store (None until persisted)
    pub id: Option<i64>,
    /// Surface form, the unique key
    pub surface: String,
    pub reading: Option<String>,
    pub pronunciation: Option<String>,
    pub pos: PartOfSpeech,
    pub pos_detail1: String,
    pub pos_detail2: String,
    pub pos_detail3: String,
    pub conjugation_type: String,
    pub conjugation_form: String,
    pub base_form: String,
    pub frequency: i64,
    pub source: WordSource,
    /// Free-form topical or extraction category
    pub category: Option<String>,
    /// Tokenizer cost (lower is preferred)
    pub cost: i64,
    pub left_context_id: i64,
    pub right_context_id: i64,
    /// Set once on creation
    pub added_at: DateTime<Utc>,
    /// Refreshed on every write
    pub updated_at: DateTime<Utc>,
}

impl DictionaryEntry {
    /// Create an entry with dictionary defaults.
    ///
    /// Fails with [`EntryError::EmptySurface`] for blank surfaces.
    pub fn new(surface: impl Into<String>) -> EntryResult<Self> {
        let surface = surface.into();
        if surface.trim().is_empty() {
            return Err(EntryError::EmptySurface);
        }

        let now = Utc::now();
        Ok(Self {
            id: None,
            base_form: surface.clone(),
            surface,
            reading: None,
            pronunciation: None,
            pos: PartOfSpeech::Unknown,
            pos_detail1: WILDCARD.to_string(),
            pos_detail2: WILDCARD.to_string(),
            pos_detail3: WILDCARD.to_string(),
            conjugation_type: WILDCARD.to_string(),
            conjugation_form: WILDCARD.to_string(),
            frequency: 0,
            source: WordSource::Other,
            category: None,
            cost: DEFAULT_COST,
            left_context_id: DEFAULT_CONTEXT_ID,
            right_context_id: DEFAULT_CONTEXT_ID,
            added_at: now,
            updated_at: now,
        })
    }

    /// Set the reading; pronunciation follows it unless already set
    pub fn reading(mut self, reading: impl Into<String>) -> Self {
        let reading = reading.into();
        if self.pronunciation.is_none() {
            self.pronunciation = Some(reading.clone());
        }
        self.reading = Some(reading);
        self
    }

    pub fn pronunciation(mut self, pronunciation: impl Into<String>) -> Self {
        self.pronunciation = Some(pronunciation.into());
        self
    }

    pub fn pos(mut self, pos: PartOfSpeech) -> Self {
        self.pos = pos;
        self
    }

    pub fn pos_details(
        mut self,
        detail1: impl Into<String>,
        detail2: impl Into<String>,
        detail3: impl Into<String>,
    ) -> Self {
        self.pos_detail1 = detail1.into();
        self.pos_detail2 = detail2.into();
        self.pos_detail3 = detail3.into();
        self
    }

    pub fn conjugation(mut self, kind: impl Into<String>, form: impl Into<String>) -> Self {
        self.conjugation_type = kind.into();
        self.conjugation_form = form.into();
        self
    }

    pub fn base_form(mut self, base_form: impl Into<String>) -> Self {
        self.base_form = base_form.into();
        self
    }

    pub fn frequency(mut self, frequency: i64) -> Self {
        self.frequency = frequency;
        self
    }

    pub fn source(mut self, source: WordSource) -> Self {
        self.source = source;
        self
    }

    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category;
        self
    }

    pub fn cost(mut self, cost: i64) -> Self {
        self.cost = cost;
        self
    }

    pub fn context_ids(mut self, left: i64, right: i64) -> Self {
        self.left_context_id = left;
        self.right_context_id = right;
        self
    }

    /// Reject entries that cannot be stored at all
    pub fn validate(&self) -> EntryResult<()> {
        if self.surface.trim().is_empty() {
            return Err(EntryError::EmptySurface);
        }
        Ok(())
    }

    /// Restore the derived-field invariants that struct literals and
    /// deserialized values can bypass: pronunciation follows reading, base
    /// form falls back to surface, and `updated_at` is never before
    /// `added_at`.
    pub fn normalize(&mut self) {
        if self.pronunciation.is_none() {
            self.pronunciation = self.reading.clone();
        }
        if self.base_form.trim().is_empty() {
            self.base_form = self.surface.clone();
        }
        if self.updated_at < self.added_at {
            self.updated_at = self.added_at;
        }
    }
}
