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

//! Per-cycle frequency aggregation.
//!
//! Collapses candidate emissions into one record per surface. Frequencies
//! are summed across every emission regardless of category; provenance
//! (source tag and category) is fixed by the first emission seen for a
//! surface and never overwritten.

use crate::candidate::{AggregatedCandidate, CandidateEmission};
use std::collections::HashMap;

/// Order-preserving aggregator over candidate emissions
#[derive(Debug, Default, Clone)]
pub struct FrequencyAggregator {
    candidates: Vec<AggregatedCandidate>,
    positions: HashMap<String, usize>,
    emissions: usize,
}

impl FrequencyAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one emission into the aggregate
    pub fn push(&mut self, emission: CandidateEmission) {
        self.emissions += 1;

        if let Some(&idx) = self.positions.get(&emission.surface) {
            self.candidates[idx].total_frequency += emission.local_frequency;
            return;
        }

        self.positions
            .insert(emission.surface.clone(), self.candidates.len());
        self.candidates.push(AggregatedCandidate {
            surface: emission.surface,
            total_frequency: emission.local_frequency,
            first_seen_source_tag: emission.source_tag,
            first_seen_category: emission.category,
        });
    }

    /// Aggregated record for a surface, if any emission mentioned it
    pub fn get(&self, surface: &str) -> Option<&AggregatedCandidate> {
        self.positions.get(surface).map(|&idx| &self.candidates[idx])
    }

    /// Number of distinct surfaces
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// Number of emissions folded in so far
    pub fn emission_count(&self) -> usize {
        self.emissions
    }

    /// Aggregated candidates in first-seen order
    pub fn into_candidates(self) -> Vec<AggregatedCandidate> {
        self.candidates
    }
}

impl Extend<CandidateEmission> for FrequencyAggregator {
    fn extend<T: IntoIterator<Item = CandidateEmission>>(&mut self, iter: T) {
        for emission in iter {
            self.push(emission);
        }
    }
}

impl FromIterator<CandidateEmission> for FrequencyAggregator {
    fn from_iter<T: IntoIterator<Item = CandidateEmission>>(iter: T) -> Self {
        let mut aggregator = Self::new();
        aggregator.extend(iter);
        aggregator
    }
}

/// Aggregate a complete emission sequence
pub fn aggregate<I>(emissions: I) -> Vec<AggregatedCandidate>
where
    I: IntoIterator<Item = CandidateEmission>,
{
    emissions
        .into_iter()
        .collect::<FrequencyAggregator>()
        .into_candidates()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::CandidateCategory;
    use proptest::prelude::*;

    fn emission(surface: &str, category: CandidateCategory, freq: i64, source: &str) -> CandidateEmission {
        CandidateEmission {
            surface: surface.to_string(),
            category,
            local_frequency: freq,
            source_tag: source.to_string(),
        }
    }

    #[test]
    fn test_sums_across_categories() {
        let aggregated = aggregate(vec![
            emission("AI", CandidateCategory::Alphanumeric, 2, "news_nhk"),
            emission("AI", CandidateCategory::ProperNoun, 1, "news_nhk"),
        ]);

        assert_eq!(aggregated.len(), 1);
        assert_eq!(aggregated[0].total_frequency, 3);
    }

    #[test]
    fn test_first_emission_fixes_provenance() {
        let aggregator: FrequencyAggregator = vec![
            emission("テスト", CandidateCategory::Katakana, 1, "wikipedia"),
            emission("サンプル", CandidateCategory::Katakana, 4, "wikipedia"),
            emission("テスト", CandidateCategory::ProperNoun, 2, "news_yahoo"),
        ]
        .into_iter()
        .collect();

        assert_eq!(aggregator.emission_count(), 3);
        assert_eq!(aggregator.len(), 2);

        let test = aggregator.get("テスト").unwrap();
        assert_eq!(test.total_frequency, 3);
        assert_eq!(test.first_seen_source_tag, "wikipedia");
        assert_eq!(test.first_seen_category, CandidateCategory::Katakana);

        let order: Vec<_> = aggregator
            .into_candidates()
            .into_iter()
            .map(|c| c.surface)
            .collect();
        assert_eq!(order, vec!["テスト", "サンプル"]);
    }

    #[test]
    fn test_empty_input() {
        let aggregator = FrequencyAggregator::new();
        assert!(aggregator.is_empty());
        assert_eq!(aggregator.emission_count(), 0);
        assert!(aggregator.get("AI").is_none());
    }

    proptest! {
        #[test]
        fn prop_total_matches_sum(freqs in proptest::collection::vec((0usize..4, 1i64..10), 0..40)) {
            let surfaces = ["AI", "テスト", "ChatGPT", "トヨタ"];
            let emissions: Vec<_> = freqs
                .iter()
                .map(|&(s, f)| emission(surfaces[s], CandidateCategory::Katakana, f, "other"))
                .collect();

            let aggregated = aggregate(emissions.clone());
            prop_assert!(aggregated.len() <= emissions.len());

            for candidate in &aggregated {
                let expected: i64 = emissions
                    .iter()
                    .filter(|e| e.surface == candidate.surface)
                    .map(|e| e.local_frequency)
                    .sum();
                prop_assert_eq!(candidate.total_frequency, expected);
            }
        }
    }
}
