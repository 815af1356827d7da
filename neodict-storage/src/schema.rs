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

//! Database schema
//!
//! One `words` table keyed by surface (unique) with a monotonically
//! increasing row id, secondary indexes for the lookup paths, and a
//! `versions` table logging completed update cycles.

use rusqlite::Connection;

/// Column list shared by every `SELECT` that decodes a full entry
pub(crate) const ENTRY_COLUMNS: &str = "id, surface, reading, pronunciation, pos, \
     pos_detail1, pos_detail2, pos_detail3, conjugation_type, conjugation_form, base_form, \
     frequency, source, category, cost, left_context_id, right_context_id, \
     added_date, last_updated";

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS words (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    surface TEXT NOT NULL UNIQUE,
    reading TEXT,
    pronunciation TEXT,
    pos TEXT NOT NULL,
    pos_detail1 TEXT,
    pos_detail2 TEXT,
    pos_detail3 TEXT,
    conjugation_type TEXT,
    conjugation_form TEXT,
    base_form TEXT,
    frequency INTEGER NOT NULL DEFAULT 0,
    source TEXT NOT NULL,
    category TEXT,
    cost INTEGER NOT NULL DEFAULT 6000,
    left_context_id INTEGER NOT NULL DEFAULT 1285,
    right_context_id INTEGER NOT NULL DEFAULT 1285,
    added_date TEXT,
    last_updated TEXT
);

CREATE INDEX IF NOT EXISTS idx_words_surface ON words(surface);
CREATE INDEX IF NOT EXISTS idx_words_reading ON words(reading);
CREATE INDEX IF NOT EXISTS idx_words_pos ON words(pos);
CREATE INDEX IF NOT EXISTS idx_words_frequency ON words(frequency DESC);
CREATE INDEX IF NOT EXISTS idx_words_source ON words(source);

CREATE TABLE IF NOT EXISTS versions (
    version_id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_date TEXT NOT NULL,
    word_count INTEGER NOT NULL,
    description TEXT
);
";

/// Create tables and indexes if missing
pub(crate) fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)
}
