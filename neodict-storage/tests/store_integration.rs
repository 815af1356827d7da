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

//! Integration tests for the on-disk lexicon store

use neodict_core::{DictionaryEntry, PartOfSpeech, WordSource};
use neodict_storage::LexiconStore;
use std::sync::Arc;
use std::thread;
use tempfile::tempdir;

/// Entries survive closing and reopening the database
#[test]
fn test_persistence_across_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("dict.db");

    let id = {
        let store = LexiconStore::open(&path).unwrap();
        store
            .upsert(
                &DictionaryEntry::new("推し活")
                    .unwrap()
                    .reading("オシカツ")
                    .pos(PartOfSpeech::Noun)
                    .source(WordSource::Manual),
            )
            .unwrap()
    };

    let store = LexiconStore::open(&path).unwrap();
    assert_eq!(store.path(), Some(path.as_path()));

    let entry = store.get("推し活").unwrap().unwrap();
    assert_eq!(entry.id, Some(id));
    assert_eq!(entry.reading.as_deref(), Some("オシカツ"));
    assert_eq!(entry.source, WordSource::Manual);
}

/// Upserting the same entry twice keeps the creation time
#[test]
fn test_upsert_idempotent_on_added_at() {
    let dir = tempdir().unwrap();
    let store = LexiconStore::open(dir.path().join("dict.db")).unwrap();
    let entry = DictionaryEntry::new("ChatGPT").unwrap().frequency(3);

    let first_id = store.upsert(&entry).unwrap();
    let first = store.get("ChatGPT").unwrap().unwrap();
    let second_id = store.upsert(&entry).unwrap();
    let second = store.get("ChatGPT").unwrap().unwrap();

    assert_eq!(first_id, second_id);
    assert_eq!(first.added_at, second.added_at);
    assert!(second.updated_at >= first.updated_at);
    assert_eq!(second.frequency, 3);
}

/// Concurrent upserts of the same surface never produce duplicates
#[test]
fn test_concurrent_upserts_keep_one_row() {
    let dir = tempdir().unwrap();
    let store = Arc::new(LexiconStore::open(dir.path().join("dict.db")).unwrap());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let entry = DictionaryEntry::new("チャットボット").unwrap().frequency(i);
                store.upsert(&entry).unwrap()
            })
        })
        .collect();

    let ids: Vec<i64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(ids.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(store.len().unwrap(), 1);
}

/// Bulk import upserts every entry
#[test]
fn test_import() {
    let store = LexiconStore::open_in_memory().unwrap();
    let entries = vec![
        DictionaryEntry::new("生成AI").unwrap(),
        DictionaryEntry::new("推し活").unwrap(),
        DictionaryEntry::new("生成AI").unwrap().frequency(4),
    ];

    assert_eq!(store.import(&entries).unwrap(), 3);
    assert_eq!(store.len().unwrap(), 2);
    assert_eq!(store.get("生成AI").unwrap().unwrap().frequency, 4);
}

/// Stats serialize to JSON for the CLI
#[test]
fn test_stats_serialize() {
    let store = LexiconStore::open_in_memory().unwrap();
    store
        .upsert(&DictionaryEntry::new("テスト").unwrap().source(WordSource::News))
        .unwrap();

    let json = serde_json::to_value(store.stats().unwrap()).unwrap();
    assert_eq!(json["total_count"], 1);
    assert_eq!(json["counts_by_source"]["news"], 1);
    assert_eq!(json["counts_by_pos"][0][0], "未知語");
}
