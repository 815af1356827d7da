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

//! NeoDict Storage Layer
//!
//! SQLite-backed persistence for the lexicon.
//!
//! ## Guarantees
//!
//! - **Unique surfaces**: `surface` carries a UNIQUE constraint; a duplicate
//!   insert is turned into an update inside the same transaction
//! - **Stable creation time**: `added_at` is written once and never touched
//!   by later writes
//! - **Per-call atomicity**: each public operation holds the connection lock
//!   for its whole duration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use neodict_core::DictionaryEntry;
//! use neodict_storage::LexiconStore;
//!
//! let store = LexiconStore::open("data/dict.db")?;
//! store.upsert(&DictionaryEntry::new("推し活")?.reading("オシカツ"))?;
//! let hits = store.search("オシ", true, 10)?;
//! ```

pub mod error;
mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::{LexiconStats, LexiconStore, VersionRecord};
