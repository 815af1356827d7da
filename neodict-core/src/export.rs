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

//! Rendering entries for downstream tokenizer dictionaries

use crate::entry::DictionaryEntry;
use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};

/// File name used when exporting a MeCab user dictionary into a directory
pub const MECAB_FILE_NAME: &str = "neodict.csv";

/// Version tag embedded in JSON exports
pub const EXPORT_FORMAT_VERSION: &str = "0.1.0";

/// Render one MeCab dictionary CSV row.
///
/// Column order: surface, left id, right id, cost, pos, three pos details,
/// conjugation type, conjugation form, base form, reading, pronunciation.
/// A missing reading falls back to the surface and a missing pronunciation
/// to the reading.
pub fn mecab_row(entry: &DictionaryEntry) -> String {
    let reading = entry.reading.as_deref().unwrap_or(&entry.surface);
    let pronunciation = entry.pronunciation.as_deref().unwrap_or(reading);

    let left = entry.left_context_id.to_string();
    let right = entry.right_context_id.to_string();
    let cost = entry.cost.to_string();

    let fields: [&str; 13] = [
        &entry.surface,
        &left,
        &right,
        &cost,
        entry.pos.label(),
        &entry.pos_detail1,
        &entry.pos_detail2,
        &entry.pos_detail3,
        &entry.conjugation_type,
        &entry.conjugation_form,
        &entry.base_form,
        reading,
        pronunciation,
    ];

    fields
        .iter()
        .map(|field| escape_field(field))
        .collect::<Vec<_>>()
        .join(",")
}

// MeCab's dictionary compiler accepts double-quoted fields
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Write every entry as a MeCab CSV line, returning the number written
pub fn write_mecab<'a, W, I>(mut writer: W, entries: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a DictionaryEntry>,
{
    let mut written = 0;
    for entry in entries {
        writeln!(writer, "{}", mecab_row(entry))?;
        written += 1;
    }
    writer.flush()?;
    Ok(written)
}

/// Conjugation pair as nested in the JSON export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonConjugation {
    #[serde(rename = "type")]
    pub kind: String,
    pub form: String,
}

/// One entry in the JSON export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonWord {
    pub surface: String,
    pub reading: Option<String>,
    pub pronunciation: Option<String>,
    pub pos: String,
    pub pos_detail: [String; 3],
    pub conjugation: JsonConjugation,
    pub base_form: String,
    pub frequency: i64,
    pub source: String,
    pub category: Option<String>,
    pub added_date: String,
    pub last_updated: String,
}

impl From<&DictionaryEntry> for JsonWord {
    fn from(entry: &DictionaryEntry) -> Self {
        Self {
            surface: entry.surface.clone(),
            reading: entry.reading.clone(),
            pronunciation: entry.pronunciation.clone(),
            pos: entry.pos.label().to_string(),
            pos_detail: [
                entry.pos_detail1.clone(),
                entry.pos_detail2.clone(),
                entry.pos_detail3.clone(),
            ],
            conjugation: JsonConjugation {
                kind: entry.conjugation_type.clone(),
                form: entry.conjugation_form.clone(),
            },
            base_form: entry.base_form.clone(),
            frequency: entry.frequency,
            source: entry.source.as_str().to_string(),
            category: entry.category.clone(),
            added_date: entry.added_at.to_rfc3339_opts(SecondsFormat::Micros, true),
            last_updated: entry.updated_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// Whole-dictionary JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JsonExport {
    pub version: String,
    pub word_count: usize,
    pub words: Vec<JsonWord>,
}

impl JsonExport {
    pub fn from_entries<'a, I>(entries: I) -> Self
    where
        I: IntoIterator<Item = &'a DictionaryEntry>,
    {
        let words: Vec<JsonWord> = entries.into_iter().map(JsonWord::from).collect();
        Self {
            version: EXPORT_FORMAT_VERSION.to_string(),
            word_count: words.len(),
            words,
        }
    }
}

/// Write the JSON export, returning the number of words written
pub fn write_json<'a, W, I>(writer: W, entries: I) -> io::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = &'a DictionaryEntry>,
{
    let export = JsonExport::from_entries(entries);
    serde_json::to_writer_pretty(writer, &export)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(export.word_count)
}
