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

//! Updater configuration

use crate::error::{UpdaterError, UpdaterResult};
use crate::orchestrator::{DEFAULT_MIN_FREQUENCY, DEFAULT_SINGLE_SOURCE_MIN_FREQUENCY};
use crate::scheduler::Schedule;
use crate::source::{DocumentSource, FileSource};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Configuration for the update pipeline, read from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// SQLite database file
    pub db_path: PathBuf,

    /// Aggregated-frequency threshold for full cycles
    pub min_frequency: i64,

    /// Threshold for single-source runs
    pub single_source_min_frequency: i64,

    /// Raw-text sources, fetched in the listed order
    pub sources: Vec<SourceConfig>,

    /// When scheduled cycles run
    pub schedule: Schedule,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            min_frequency: DEFAULT_MIN_FREQUENCY,
            single_source_min_frequency: DEFAULT_SINGLE_SOURCE_MIN_FREQUENCY,
            sources: Vec::new(),
            schedule: Schedule::default(),
        }
    }
}

/// A text file or directory of `.txt` files
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source id; the prefix before `_` selects the stored source tag
    pub id: String,
    pub path: PathBuf,
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

fn enabled_by_default() -> bool {
    true
}

/// `~/.neodict/dict.db`, or `./.neodict/dict.db` without a home directory
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".neodict")
        .join("dict.db")
}

/// `~/.neodict/config.toml`
pub fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".neodict")
        .join("config.toml")
}

/// Replace a leading `~` with the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

impl UpdaterConfig {
    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> UpdaterResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let raw = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&raw)?;

        config.db_path = expand_home(&config.db_path);
        for source in &mut config.sources {
            source.path = expand_home(&source.path);
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> UpdaterResult<()> {
        if self.min_frequency < 1 {
            return Err(UpdaterError::Config(format!(
                "min_frequency must be at least 1, got {}",
                self.min_frequency
            )));
        }
        if self.single_source_min_frequency < 1 {
            return Err(UpdaterError::Config(format!(
                "single_source_min_frequency must be at least 1, got {}",
                self.single_source_min_frequency
            )));
        }

        let mut seen = HashSet::new();
        for source in &self.sources {
            if source.id.trim().is_empty() {
                return Err(UpdaterError::Config("source id must not be empty".to_string()));
            }
            if !seen.insert(source.id.as_str()) {
                return Err(UpdaterError::Config(format!("duplicate source id {}", source.id)));
            }
        }

        self.schedule.validate()
    }

    /// Enabled sources as file-backed document sources
    pub fn build_sources(&self) -> Vec<Box<dyn DocumentSource>> {
        self.sources
            .iter()
            .filter(|s| s.enabled)
            .map(|s| Box::new(FileSource::new(s.id.clone(), s.path.clone())) as Box<dyn DocumentSource>)
            .collect()
    }

    pub fn to_toml_string(&self) -> UpdaterResult<String> {
        toml::to_string_pretty(self).map_err(|e| UpdaterError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = UpdaterConfig::default();
        assert_eq!(config.min_frequency, 2);
        assert_eq!(config.single_source_min_frequency, 1);
        assert!(config.db_path.ends_with(".neodict/dict.db"));
        assert!(config.sources.is_empty());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = UpdaterConfig::load(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, UpdaterConfig::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
min_frequency = 3

[[sources]]
id = "news_local"
path = "/var/feeds/news"

[[sources]]
id = "hatena"
path = "/var/feeds/hatena"
enabled = false

[schedule]
kind = "weekly"
weekday = "Mon"
hour = 4
minute = 30
"#,
        )
        .unwrap();

        let config = UpdaterConfig::load(&path).unwrap();
        assert_eq!(config.min_frequency, 3);
        assert_eq!(config.single_source_min_frequency, 1);
        assert_eq!(config.sources.len(), 2);
        assert!(config.sources[0].enabled);
        assert!(!config.sources[1].enabled);
        assert_eq!(
            config.schedule,
            Schedule::Weekly {
                weekday: Weekday::Mon,
                hour: 4,
                minute: 30
            }
        );
        assert_eq!(config.build_sources().len(), 1);
    }

    #[test]
    fn test_rejects_zero_threshold() {
        let config = UpdaterConfig {
            min_frequency: 0,
            ..UpdaterConfig::default()
        };
        assert!(matches!(config.validate(), Err(UpdaterError::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_source_ids() {
        let source = SourceConfig {
            id: "news".to_string(),
            path: PathBuf::from("/tmp/news"),
            enabled: true,
        };
        let config = UpdaterConfig {
            sources: vec![source.clone(), source],
            ..UpdaterConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "min_frequency = \"lots\"").unwrap();

        assert!(matches!(UpdaterConfig::load(&path), Err(UpdaterError::Config(_))));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = UpdaterConfig {
            schedule: Schedule::Hourly { minute: 10 },
            ..UpdaterConfig::default()
        };
        let text = config.to_toml_string().unwrap();
        let parsed: UpdaterConfig = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_expand_home() {
        let plain = Path::new("/var/lib/dict.db");
        assert_eq!(expand_home(plain), plain);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/dict.db")), home.join("dict.db"));
        }
    }
}
