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

//! Candidate mining from raw text.
//!
//! Three independent pattern families run over the same text:
//!
//! - **katakana runs**: two or more katakana (including the prolonged sound mark)
//! - **alphanumeric-mixed tokens**: loanword/brand shapes such as `iPhone15`
//!   or `ChatGPT`, at least three characters, starting and ending in ASCII
//!   alphanumerics
//! - **proper nouns**: a katakana run directly followed by a case particle;
//!   only the run is kept
//!
//! Every candidate goes through the same exclusion rule regardless of the
//! family that produced it.

use crate::candidate::CandidateCategory;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};

/// Candidates longer than this (in characters) are dropped
pub const MAX_SURFACE_CHARS: usize = 20;

/// Katakana prolonged sound mark
pub const PROLONGED_SOUND_MARK: char = 'ー';

const KATAKANA_PATTERN: &str = r"[ァ-ヴー]{2,}";
const ALPHANUMERIC_PATTERN: &str = r"[A-Za-z0-9][A-Za-z0-9ァ-ヴー]{1,}[A-Za-z0-9]";
const PROPER_NOUN_PATTERN: &str = r"([ァ-ヴー]{2,})(?:が|は|を|に|で|と|や|の)";

/// Mined candidates keyed by family; every family is present, possibly empty
pub type MinedCandidates = BTreeMap<CandidateCategory, BTreeSet<String>>;

/// Pattern-based candidate miner.
///
/// Holds only compiled patterns and is never mutated after construction, so
/// one instance can be shared by reference across cycles and threads.
#[derive(Debug, Clone)]
pub struct PatternMiner {
    katakana_re: Regex,
    alphanumeric_re: Regex,
    proper_noun_re: Regex,
}

impl Default for PatternMiner {
    fn default() -> Self {
        Self::new()
    }
}

impl PatternMiner {
    pub fn new() -> Self {
        Self {
            katakana_re: Regex::new(KATAKANA_PATTERN).unwrap(),
            alphanumeric_re: Regex::new(ALPHANUMERIC_PATTERN).unwrap(),
            proper_noun_re: Regex::new(PROPER_NOUN_PATTERN).unwrap(),
        }
    }

    /// Run all three families over `text`
    pub fn mine(&self, text: &str) -> MinedCandidates {
        let mut mined = MinedCandidates::new();
        mined.insert(CandidateCategory::Katakana, self.katakana_words(text));
        mined.insert(CandidateCategory::Alphanumeric, self.alphanumeric_words(text));
        mined.insert(CandidateCategory::ProperNoun, self.proper_nouns(text));
        mined
    }

    /// Maximal katakana runs
    pub fn katakana_words(&self, text: &str) -> BTreeSet<String> {
        self.katakana_re
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|word| !Self::should_exclude(word))
            .map(str::to_string)
            .collect()
    }

    /// Alphanumeric tokens that may embed katakana
    pub fn alphanumeric_words(&self, text: &str) -> BTreeSet<String> {
        self.alphanumeric_re
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|word| !Self::should_exclude(word))
            .map(str::to_string)
            .collect()
    }

    /// Katakana runs immediately followed by a particle
    pub fn proper_nouns(&self, text: &str) -> BTreeSet<String> {
        self.proper_noun_re
            .captures_iter(text)
            .filter_map(|cap| cap.get(1))
            .map(|m| m.as_str())
            .filter(|word| !Self::should_exclude(word))
            .map(str::to_string)
            .collect()
    }

    /// Whether a candidate must be dropped
    pub fn should_exclude(word: &str) -> bool {
        let len = word.chars().count();
        if len == 0 {
            return true;
        }

        // Single katakana
        if len == 1 && word.chars().all(is_katakana) {
            return true;
        }

        // Prolonged sound marks only
        if word.chars().all(|c| c == PROLONGED_SOUND_MARK) {
            return true;
        }

        if word.chars().all(|c| c.is_ascii_digit()) {
            return true;
        }

        len > MAX_SURFACE_CHARS
    }

    /// Count non-overlapping exact occurrences of each word in `text`.
    ///
    /// Words that do not occur are left out of the result.
    pub fn count_frequency<I, S>(text: &str, words: I) -> BTreeMap<String, i64>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut frequency = BTreeMap::new();

        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            let count = text.matches(word).count() as i64;
            if count > 0 {
                frequency.insert(word.to_string(), count);
            }
        }

        frequency
    }
}

/// Katakana block member as used by the patterns (`ァ`..=`ヴ` plus `ー`)
pub fn is_katakana(c: char) -> bool {
    matches!(c, 'ァ'..='ヴ' | PROLONGED_SOUND_MARK)
}
