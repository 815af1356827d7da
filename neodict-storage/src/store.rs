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

//! SQLite-backed lexicon store

use crate::error::StoreResult;
use crate::schema::{init_schema, ENTRY_COLUMNS};
use chrono::{DateTime, Utc};
use neodict_core::{DictionaryEntry, EntryError, PartOfSpeech, WordSource, WILDCARD};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, Transaction};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Store-wide counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LexiconStats {
    pub total_count: usize,
    pub distinct_pos_count: usize,
    pub counts_by_source: BTreeMap<WordSource, usize>,
    /// Sorted by count, descending
    pub counts_by_pos: Vec<(PartOfSpeech, usize)>,
}

/// One row of the version log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRecord {
    pub version_id: i64,
    pub created_at: DateTime<Utc>,
    pub word_count: i64,
    pub description: Option<String>,
}

/// Uniquely keyed, persistent table of dictionary entries.
///
/// The connection sits behind a mutex and every public method takes the lock
/// exactly once, so each call is atomic with respect to the others. Nothing
/// spans multiple calls.
#[derive(Debug)]
pub struct LexiconStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl LexiconStore {
    /// Open (or create) a store at `path`
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(&path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        init_schema(&conn)?;

        info!(path = %path.display(), "Opened lexicon store");
        Ok(Self {
            conn: Mutex::new(conn),
            path: Some(path),
        })
    }

    /// Open a throwaway store that lives only as long as the value
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        init_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            path: None,
        })
    }

    /// Database file, None for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Insert `entry`, or overwrite the existing row with the same surface.
    ///
    /// Insert is attempted first; a unique violation on `surface` falls back
    /// to a full-field update that leaves `id` and `added_at` alone and sets
    /// `updated_at` to now. Both steps run in one transaction. Derived fields
    /// are normalised first (see [`DictionaryEntry::normalize`]). Returns the
    /// row id, new or existing.
    pub fn upsert(&self, entry: &DictionaryEntry) -> StoreResult<i64> {
        let now = Utc::now();
        let entry = &prepare(entry, now)?;

        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;

        let id = match insert_entry(&tx, entry) {
            Ok(id) => id,
            Err(err) if is_unique_violation(&err) => {
                debug!(surface = %entry.surface, "Surface exists, updating in place");
                update_entry(&tx, entry, now)?;
                tx.query_row(
                    "SELECT id FROM words WHERE surface = ?1",
                    params![entry.surface],
                    |row| row.get(0),
                )?
            }
            Err(err) => return Err(err.into()),
        };

        tx.commit()?;
        Ok(id)
    }

    /// Overwrite every mutable field of the entry with this surface.
    ///
    /// Returns the number of rows touched (0 when the surface is unknown).
    pub fn update(&self, entry: &DictionaryEntry) -> StoreResult<usize> {
        let now = Utc::now();
        let entry = prepare(entry, now)?;

        let conn = self.conn.lock();
        let changed = update_entry(&conn, &entry, now)?;
        Ok(changed)
    }

    /// Look up an entry by surface
    pub fn get(&self, surface: &str) -> StoreResult<Option<DictionaryEntry>> {
        let conn = self.conn.lock();
        let entry = conn
            .query_row(
                &format!("SELECT {} FROM words WHERE surface = ?1", ENTRY_COLUMNS),
                params![surface],
                row_to_entry,
            )
            .optional()?;
        Ok(entry)
    }

    /// Search by surface or reading.
    ///
    /// Exact mode matches entries whose surface or reading equals `query`;
    /// fuzzy mode matches entries where either contains it. At most `limit`
    /// entries come back, in id order.
    pub fn search(&self, query: &str, fuzzy: bool, limit: usize) -> StoreResult<Vec<DictionaryEntry>> {
        let predicate = if fuzzy {
            "instr(surface, ?1) > 0 OR instr(reading, ?1) > 0"
        } else {
            "surface = ?1 OR reading = ?1"
        };
        let sql = format!(
            "SELECT {} FROM words WHERE {} ORDER BY id LIMIT ?2",
            ENTRY_COLUMNS, predicate
        );

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![query, clamp_limit(limit)], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Remove the entry with this surface, returning 0 or 1
    pub fn delete(&self, surface: &str) -> StoreResult<usize> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM words WHERE surface = ?1", params![surface])?;
        if deleted > 0 {
            debug!(surface, "Deleted entry");
        }
        Ok(deleted)
    }

    /// Entries by descending frequency, optionally capped
    pub fn all_entries(&self, limit: Option<usize>) -> StoreResult<Vec<DictionaryEntry>> {
        let sql = format!(
            "SELECT {} FROM words ORDER BY frequency DESC, id LIMIT ?1",
            ENTRY_COLUMNS
        );
        let limit = limit.map(clamp_limit).unwrap_or(-1);

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![limit], row_to_entry)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    /// Number of stored entries
    pub fn len(&self) -> StoreResult<usize> {
        let conn = self.conn.lock();
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Aggregate counts over the whole table
    pub fn stats(&self) -> StoreResult<LexiconStats> {
        let conn = self.conn.lock();

        let (total, distinct_pos): (i64, i64) = conn.query_row(
            "SELECT COUNT(*), COUNT(DISTINCT pos) FROM words",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let mut stmt = conn.prepare("SELECT source, COUNT(*) FROM words GROUP BY source")?;
        let counts_by_source = stmt
            .query_map([], |row| {
                Ok((parse_column::<WordSource>(row, 0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<rusqlite::Result<BTreeMap<_, _>>>()?;

        let mut stmt =
            conn.prepare("SELECT pos, COUNT(*) AS n FROM words GROUP BY pos ORDER BY n DESC, pos")?;
        let counts_by_pos = stmt
            .query_map([], |row| {
                Ok((parse_column::<PartOfSpeech>(row, 0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(LexiconStats {
            total_count: total as usize,
            distinct_pos_count: distinct_pos as usize,
            counts_by_source,
            counts_by_pos,
        })
    }

    /// Upsert every entry, returning how many were written
    pub fn import<'a, I>(&self, entries: I) -> StoreResult<usize>
    where
        I: IntoIterator<Item = &'a DictionaryEntry>,
    {
        let mut count = 0;
        for entry in entries {
            self.upsert(entry)?;
            count += 1;
        }
        Ok(count)
    }

    /// Append a row to the version log
    pub fn record_version(&self, description: Option<&str>) -> StoreResult<i64> {
        let conn = self.conn.lock();
        let word_count: i64 = conn.query_row("SELECT COUNT(*) FROM words", [], |row| row.get(0))?;
        conn.execute(
            "INSERT INTO versions (created_date, word_count, description) VALUES (?1, ?2, ?3)",
            params![Utc::now(), word_count, description],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// Most recent version log rows, newest first
    pub fn versions(&self, limit: usize) -> StoreResult<Vec<VersionRecord>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT version_id, created_date, word_count, description
             FROM versions ORDER BY version_id DESC LIMIT ?1",
        )?;
        let versions = stmt
            .query_map(params![clamp_limit(limit)], |row| {
                Ok(VersionRecord {
                    version_id: row.get(0)?,
                    created_at: row.get(1)?,
                    word_count: row.get(2)?,
                    description: row.get(3)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(versions)
    }
}

// `added_at` never lies past `now`, so any later update keeps
// `updated_at >= added_at`
fn prepare(entry: &DictionaryEntry, now: DateTime<Utc>) -> StoreResult<DictionaryEntry> {
    entry.validate()?;
    let mut entry = entry.clone();
    entry.added_at = entry.added_at.min(now);
    entry.normalize();
    Ok(entry)
}

fn insert_entry(tx: &Transaction<'_>, entry: &DictionaryEntry) -> rusqlite::Result<i64> {
    tx.execute(
        "INSERT INTO words (
            surface, reading, pronunciation, pos,
            pos_detail1, pos_detail2, pos_detail3,
            conjugation_type, conjugation_form, base_form,
            frequency, source, category,
            cost, left_context_id, right_context_id,
            added_date, last_updated
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
        params![
            entry.surface,
            entry.reading,
            entry.pronunciation,
            entry.pos.label(),
            entry.pos_detail1,
            entry.pos_detail2,
            entry.pos_detail3,
            entry.conjugation_type,
            entry.conjugation_form,
            entry.base_form,
            entry.frequency,
            entry.source.as_str(),
            entry.category,
            entry.cost,
            entry.left_context_id,
            entry.right_context_id,
            entry.added_at,
            entry.updated_at,
        ],
    )?;
    Ok(tx.last_insert_rowid())
}

// `added_date` is never rewritten
fn update_entry(conn: &Connection, entry: &DictionaryEntry, now: DateTime<Utc>) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE words SET
            reading = ?1,
            pronunciation = ?2,
            pos = ?3,
            pos_detail1 = ?4,
            pos_detail2 = ?5,
            pos_detail3 = ?6,
            conjugation_type = ?7,
            conjugation_form = ?8,
            base_form = ?9,
            frequency = ?10,
            source = ?11,
            category = ?12,
            cost = ?13,
            left_context_id = ?14,
            right_context_id = ?15,
            last_updated = ?16
        WHERE surface = ?17",
        params![
            entry.reading,
            entry.pronunciation,
            entry.pos.label(),
            entry.pos_detail1,
            entry.pos_detail2,
            entry.pos_detail3,
            entry.conjugation_type,
            entry.conjugation_form,
            entry.base_form,
            entry.frequency,
            entry.source.as_str(),
            entry.category,
            entry.cost,
            entry.left_context_id,
            entry.right_context_id,
            now,
            entry.surface,
        ],
    )
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.code == ErrorCode::ConstraintViolation
                && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn clamp_limit(limit: usize) -> i64 {
    i64::try_from(limit).unwrap_or(i64::MAX)
}

fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = EntryError>,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<DictionaryEntry> {
    let surface: String = row.get(1)?;
    let detail = |idx: usize| -> rusqlite::Result<String> {
        Ok(row
            .get::<_, Option<String>>(idx)?
            .unwrap_or_else(|| WILDCARD.to_string()))
    };
    let now = Utc::now();

    Ok(DictionaryEntry {
        id: Some(row.get(0)?),
        reading: row.get(2)?,
        pronunciation: row.get(3)?,
        pos: parse_column(row, 4)?,
        pos_detail1: detail(5)?,
        pos_detail2: detail(6)?,
        pos_detail3: detail(7)?,
        conjugation_type: detail(8)?,
        conjugation_form: detail(9)?,
        base_form: row
            .get::<_, Option<String>>(10)?
            .unwrap_or_else(|| surface.clone()),
        frequency: row.get(11)?,
        source: parse_column(row, 12)?,
        category: row.get(13)?,
        cost: row.get(14)?,
        left_context_id: row.get(15)?,
        right_context_id: row.get(16)?,
        added_at: row.get::<_, Option<DateTime<Utc>>>(17)?.unwrap_or(now),
        updated_at: row.get::<_, Option<DateTime<Utc>>>(18)?.unwrap_or(now),
        surface,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use chrono::TimeZone;

    fn store() -> LexiconStore {
        LexiconStore::open_in_memory().unwrap()
    }

    #[test]
    fn test_insert_then_get() {
        let store = store();
        let entry = DictionaryEntry::new("テスト語")
            .unwrap()
            .reading("テストゴ")
            .pos(PartOfSpeech::Noun)
            .source(WordSource::Manual);

        let id = store.upsert(&entry).unwrap();
        assert!(id > 0);

        let loaded = store.get("テスト語").unwrap().unwrap();
        assert_eq!(loaded.id, Some(id));
        assert_eq!(loaded.reading.as_deref(), Some("テストゴ"));
        assert_eq!(loaded.pronunciation.as_deref(), Some("テストゴ"));
        assert_eq!(loaded.pos, PartOfSpeech::Noun);
        assert_eq!(loaded.source, WordSource::Manual);
        assert_eq!(loaded.base_form, "テスト語");
        assert_eq!(loaded.pos_detail2, "*");
    }

    #[test]
    fn test_upsert_duplicate_updates_in_place() {
        let store = store();
        let first = DictionaryEntry::new("ChatGPT").unwrap().frequency(2);
        let id = store.upsert(&first).unwrap();
        let before = store.get("ChatGPT").unwrap().unwrap();

        let second = DictionaryEntry::new("ChatGPT")
            .unwrap()
            .frequency(9)
            .reading("チャットジーピーティー")
            .category(Some("ai".to_string()));
        let again = store.upsert(&second).unwrap();
        let after = store.get("ChatGPT").unwrap().unwrap();

        assert_eq!(again, id);
        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(after.frequency, 9);
        assert_eq!(after.category.as_deref(), Some("ai"));
        assert_eq!(after.added_at, before.added_at);
        assert!(after.updated_at >= before.updated_at);
        assert!(after.updated_at >= after.added_at);
    }

    #[test]
    fn test_ids_increase() {
        let store = store();
        let a = store.upsert(&DictionaryEntry::new("アルファ").unwrap()).unwrap();
        let b = store.upsert(&DictionaryEntry::new("ベータ").unwrap()).unwrap();
        assert!(b > a);
    }

    #[test]
    fn test_delete() {
        let store = store();
        store.upsert(&DictionaryEntry::new("推し活").unwrap()).unwrap();

        assert_eq!(store.delete("推し活").unwrap(), 1);
        assert!(store.get("推し活").unwrap().is_none());
        assert_eq!(store.delete("推し活").unwrap(), 0);
    }

    #[test]
    fn test_blank_surface_rejected() {
        let store = store();
        let mut entry = DictionaryEntry::new("ok").unwrap();
        entry.surface = String::new();

        let err = store.upsert(&entry).unwrap_err();
        assert!(matches!(err, StoreError::Validation(EntryError::EmptySurface)));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_update_missing_surface() {
        let store = store();
        let entry = DictionaryEntry::new("未登録").unwrap();
        assert_eq!(store.update(&entry).unwrap(), 0);
        assert!(store.get("未登録").unwrap().is_none());
    }

    #[test]
    fn test_exact_and_fuzzy_search() {
        let store = store();
        for surface in ["ChatGPT", "生成AI", "AIアシスタント"] {
            store.upsert(&DictionaryEntry::new(surface).unwrap()).unwrap();
        }
        store
            .upsert(&DictionaryEntry::new("推し活").unwrap().reading("オシカツ"))
            .unwrap();

        let exact = store.search("AI", false, 100).unwrap();
        assert!(exact.is_empty());

        let fuzzy = store.search("AI", true, 100).unwrap();
        let surfaces: Vec<_> = fuzzy.iter().map(|e| e.surface.as_str()).collect();
        assert_eq!(surfaces, vec!["生成AI", "AIアシスタント"]);

        let by_reading = store.search("オシカツ", false, 100).unwrap();
        assert_eq!(by_reading.len(), 1);
        assert_eq!(by_reading[0].surface, "推し活");

        let capped = store.search("AI", true, 1).unwrap();
        assert_eq!(capped.len(), 1);
    }

    #[test]
    fn test_all_entries_by_frequency() {
        let store = store();
        store.upsert(&DictionaryEntry::new("低").unwrap().frequency(1)).unwrap();
        store.upsert(&DictionaryEntry::new("高").unwrap().frequency(10)).unwrap();
        store.upsert(&DictionaryEntry::new("中").unwrap().frequency(5)).unwrap();

        let all: Vec<_> = store
            .all_entries(None)
            .unwrap()
            .into_iter()
            .map(|e| e.surface)
            .collect();
        assert_eq!(all, vec!["高", "中", "低"]);

        assert_eq!(store.all_entries(Some(2)).unwrap().len(), 2);
    }

    #[test]
    fn test_stats() {
        let store = store();
        store
            .upsert(&DictionaryEntry::new("走る").unwrap().pos(PartOfSpeech::Verb).source(WordSource::Manual))
            .unwrap();
        store
            .upsert(&DictionaryEntry::new("推し活").unwrap().pos(PartOfSpeech::Noun).source(WordSource::Manual))
            .unwrap();
        store
            .upsert(&DictionaryEntry::new("ChatGPT").unwrap().pos(PartOfSpeech::Noun).source(WordSource::News))
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_count, 3);
        assert_eq!(stats.distinct_pos_count, 2);
        assert_eq!(stats.counts_by_source[&WordSource::Manual], 2);
        assert_eq!(stats.counts_by_source[&WordSource::News], 1);
        assert_eq!(stats.counts_by_pos[0], (PartOfSpeech::Noun, 2));
        assert_eq!(stats.counts_by_pos[1], (PartOfSpeech::Verb, 1));
    }

    #[test]
    fn test_version_log() {
        let store = store();
        store.upsert(&DictionaryEntry::new("テスト").unwrap()).unwrap();
        let v1 = store.record_version(Some("first")).unwrap();
        let v2 = store.record_version(None).unwrap();

        let versions = store.versions(10).unwrap();
        assert_eq!(versions.len(), 2);
        assert_eq!(versions[0].version_id, v2);
        assert_eq!(versions[1].version_id, v1);
        assert_eq!(versions[1].description.as_deref(), Some("first"));
        assert_eq!(versions[1].word_count, 1);
    }

    #[test]
    fn test_corrupt_pos_is_reported() {
        let store = store();
        store.upsert(&DictionaryEntry::new("テスト").unwrap()).unwrap();
        store
            .conn
            .lock()
            .execute("UPDATE words SET pos = 'bogus'", [])
            .unwrap();

        let err = store.get("テスト").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { column: 4, .. }));
    }

    #[test]
    fn test_reading_without_pronunciation_is_filled() {
        let store = store();
        let mut entry = DictionaryEntry::new("推し活").unwrap();
        entry.reading = Some("オシカツ".to_string());

        store.upsert(&entry).unwrap();
        let loaded = store.get("推し活").unwrap().unwrap();

        assert_eq!(loaded.reading.as_deref(), Some("オシカツ"));
        assert_eq!(loaded.pronunciation.as_deref(), Some("オシカツ"));
    }

    #[test]
    fn test_empty_base_form_falls_back_to_surface() {
        let store = store();
        let mut entry = DictionaryEntry::new("サブスク").unwrap();
        entry.base_form = String::new();

        store.upsert(&entry).unwrap();
        assert_eq!(store.get("サブスク").unwrap().unwrap().base_form, "サブスク");

        // Update path normalises as well
        assert_eq!(store.update(&entry).unwrap(), 1);
        assert_eq!(store.get("サブスク").unwrap().unwrap().base_form, "サブスク");
    }

    #[test]
    fn test_future_added_at_is_clamped() {
        let store = store();
        let mut entry = DictionaryEntry::new("メタバース").unwrap();
        entry.added_at = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
        entry.updated_at = entry.added_at;

        store.import([&entry]).unwrap();
        let inserted = store.get("メタバース").unwrap().unwrap();
        assert!(inserted.added_at <= Utc::now());
        assert!(inserted.updated_at >= inserted.added_at);

        store.upsert(&entry).unwrap();
        let updated = store.get("メタバース").unwrap().unwrap();
        assert_eq!(updated.added_at, inserted.added_at);
        assert!(updated.updated_at >= updated.added_at);
    }
}
