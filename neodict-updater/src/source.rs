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

//! Raw-text sources
//!
//! A source hands the orchestrator `RawDocument`s. Network crawling lives
//! outside this crate; the sources here cover text already on disk or in
//! memory.

use crate::error::SourceError;
use neodict_core::RawDocument;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Producer of raw documents for one logical source
pub trait DocumentSource: Send + Sync {
    /// Source id attached to every document (e.g. `news_nhk`)
    fn id(&self) -> &str;

    /// Produce this cycle's documents
    fn fetch(&self) -> Result<Vec<RawDocument>, SourceError>;
}

/// Fixed set of texts held in memory
#[derive(Debug, Clone)]
pub struct StaticSource {
    id: String,
    texts: Vec<String>,
}

impl StaticSource {
    pub fn new(id: impl Into<String>, texts: Vec<String>) -> Self {
        Self {
            id: id.into(),
            texts,
        }
    }
}

impl DocumentSource for StaticSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self) -> Result<Vec<RawDocument>, SourceError> {
        Ok(self
            .texts
            .iter()
            .map(|text| RawDocument::new(self.id.clone(), text.clone()))
            .collect())
    }
}

/// Text file, or directory of `.txt` files, read on every fetch
#[derive(Debug, Clone)]
pub struct FileSource {
    id: String,
    path: PathBuf,
}

impl FileSource {
    pub fn new(id: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self, path: &Path) -> Result<RawDocument, SourceError> {
        let text = fs::read_to_string(path).map_err(|error| SourceError::Io {
            source_id: self.id.clone(),
            path: path.to_path_buf(),
            error,
        })?;
        Ok(RawDocument::new(self.id.clone(), text))
    }
}

impl DocumentSource for FileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self) -> Result<Vec<RawDocument>, SourceError> {
        if self.path.is_file() {
            return Ok(vec![self.read(&self.path)?]);
        }

        if !self.path.is_dir() {
            return Err(SourceError::Unavailable {
                source_id: self.id.clone(),
                reason: format!("{} does not exist", self.path.display()),
            });
        }

        let listing = fs::read_dir(&self.path).map_err(|error| SourceError::Io {
            source_id: self.id.clone(),
            path: self.path.clone(),
            error,
        })?;

        // Sorted so document order, and therefore provenance, is stable
        let mut files: Vec<PathBuf> = listing
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && p.extension().map(|e| e == "txt").unwrap_or(false))
            .collect();
        files.sort();

        debug!(source = %self.id, files = files.len(), "Reading source directory");
        files.iter().map(|p| self.read(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_static_source() {
        let source = StaticSource::new("wikipedia", vec!["テスト".to_string(), "ChatGPT".to_string()]);
        let docs = source.fetch().unwrap();

        assert_eq!(docs.len(), 2);
        assert!(docs.iter().all(|d| d.source_id == "wikipedia"));
    }

    #[test]
    fn test_file_source_directory() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), "二つ目").unwrap();
        fs::write(dir.path().join("a.txt"), "一つ目").unwrap();
        fs::write(dir.path().join("skip.html"), "<p>ignored</p>").unwrap();

        let source = FileSource::new("news_local", dir.path());
        let docs = source.fetch().unwrap();

        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].text, "一つ目");
        assert_eq!(docs[1].text, "二つ目");
        assert_eq!(docs[0].source_id, "news_local");
    }

    #[test]
    fn test_file_source_single_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("feed.txt");
        fs::write(&file, "トヨタが発表").unwrap();

        let docs = FileSource::new("news", &file).fetch().unwrap();
        assert_eq!(docs, vec![RawDocument::new("news", "トヨタが発表")]);
    }

    #[test]
    fn test_missing_path_is_unavailable() {
        let dir = tempdir().unwrap();
        let source = FileSource::new("news", dir.path().join("missing"));

        assert!(matches!(source.fetch(), Err(SourceError::Unavailable { .. })));
    }
}
