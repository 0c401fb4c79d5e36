#![forbid(unsafe_code)]

//! Key/value preferences and the layouts stored in them.
//!
//! [`PreferencesStore`] is a flat string map. [`MacroPreferences`] and
//! [`BookmarkPreferences`] lay their records out over sequential indexed
//! keys:
//!
//! ```text
//! macrosCount            = 2
//! macro.0.name           = Macro 1
//! macro.0.step.1         = key-press("hi")
//! macro.0.step.2         = caret-move(RIGHT,2)
//! bookmarksCount         = 1
//! bookmark.0.startPosition = 16
//! bookmark.0.length      = 4
//! bookmark.0.bookmarkColor = #ff8000
//! ```
//!
//! With the `persistence` feature, [`JsonFilePreferences`] keeps the map in
//! a versioned JSON file written with a temp-file-then-rename.

use std::collections::BTreeMap;
use std::fmt;
use std::io;

use crate::macros::MacroRecord;

const MACROS_COUNT: &str = "macrosCount";
const MACRO_PREFIX: &str = "macro.";
const BOOKMARKS_COUNT: &str = "bookmarksCount";
const BOOKMARK_PREFIX: &str = "bookmark.";

/// Errors raised by a preferences backend.
#[derive(Debug)]
pub enum PreferencesError {
    Io(io::Error),
    /// The stored data could not be read or written.
    Format(String),
    /// The file was written by an incompatible version.
    Version { found: u64, expected: u64 },
}

impl fmt::Display for PreferencesError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "preferences I/O error: {e}"),
            Self::Format(msg) => write!(f, "invalid preferences data: {msg}"),
            Self::Version { found, expected } => write!(
                f,
                "unsupported preferences version: {found} (expected {expected})"
            ),
        }
    }
}

impl std::error::Error for PreferencesError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for PreferencesError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

/// Flat string key/value storage.
pub trait PreferencesStore {
    fn get(&self, key: &str) -> Option<String>;

    fn put(&mut self, key: &str, value: &str);

    fn remove(&mut self, key: &str);

    /// Persist pending changes.
    fn flush(&mut self) -> Result<(), PreferencesError>;

    /// Integer value; unparsable values read as `default`.
    fn get_u64(&self, key: &str, default: u64) -> u64 {
        self.get(key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn put_u64(&mut self, key: &str, value: u64) {
        self.put(key, &value.to_string());
    }
}

/// In-memory preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryPreferences {
    values: BTreeMap<String, String>,
    flushes: usize,
}

impl MemoryPreferences {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }

    /// Number of `flush` calls so far.
    #[must_use]
    pub const fn flush_count(&self) -> usize {
        self.flushes
    }
}

impl PreferencesStore for MemoryPreferences {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn put(&mut self, key: &str, value: &str) {
        self.values.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn flush(&mut self) -> Result<(), PreferencesError> {
        self.flushes += 1;
        Ok(())
    }
}

#[cfg(feature = "persistence")]
pub use file::JsonFilePreferences;

#[cfg(feature = "persistence")]
mod file {
    use std::collections::BTreeMap;
    use std::path::{Path, PathBuf};

    use serde::{Deserialize, Serialize};

    use super::{PreferencesError, PreferencesStore};

    const FORMAT_VERSION: u64 = 1;

    #[derive(Debug, Serialize, Deserialize)]
    struct PreferencesFile {
        version: u64,
        values: BTreeMap<String, String>,
    }

    /// Preferences backed by a JSON file.
    ///
    /// Changes stay in memory until [`flush`](PreferencesStore::flush).
    #[derive(Debug, Clone)]
    pub struct JsonFilePreferences {
        path: PathBuf,
        values: BTreeMap<String, String>,
        dirty: bool,
    }

    impl JsonFilePreferences {
        /// Open `path`; a missing file yields empty preferences.
        pub fn open(path: impl Into<PathBuf>) -> Result<Self, PreferencesError> {
            let path = path.into();
            let values = if path.exists() {
                let contents = std::fs::read_to_string(&path)?;
                let file: PreferencesFile = serde_json::from_str(&contents)
                    .map_err(|e| PreferencesError::Format(e.to_string()))?;
                if file.version != FORMAT_VERSION {
                    return Err(PreferencesError::Version {
                        found: file.version,
                        expected: FORMAT_VERSION,
                    });
                }
                file.values
            } else {
                BTreeMap::new()
            };
            tracing::debug!(path = %path.display(), entries = values.len(), "preferences loaded");
            Ok(Self {
                path,
                values,
                dirty: false,
            })
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        /// Whether there are changes not yet flushed.
        #[must_use]
        pub const fn is_dirty(&self) -> bool {
            self.dirty
        }
    }

    impl PreferencesStore for JsonFilePreferences {
        fn get(&self, key: &str) -> Option<String> {
            self.values.get(key).cloned()
        }

        fn put(&mut self, key: &str, value: &str) {
            self.values.insert(key.to_string(), value.to_string());
            self.dirty = true;
        }

        fn remove(&mut self, key: &str) {
            if self.values.remove(key).is_some() {
                self.dirty = true;
            }
        }

        fn flush(&mut self) -> Result<(), PreferencesError> {
            if !self.dirty {
                return Ok(());
            }
            let file = PreferencesFile {
                version: FORMAT_VERSION,
                values: self.values.clone(),
            };
            let json = serde_json::to_string_pretty(&file)
                .map_err(|e| PreferencesError::Format(e.to_string()))?;
            let temp = self.path.with_extension("json.tmp");
            std::fs::write(&temp, json)?;
            std::fs::rename(&temp, &self.path)?;
            self.dirty = false;
            tracing::debug!(path = %self.path.display(), "preferences flushed");
            Ok(())
        }
    }
}

// ============================================================================
// Macro layout
// ============================================================================

/// Macro records stored in a preferences store.
#[derive(Debug, Clone, Default)]
pub struct MacroPreferences<P> {
    store: P,
}

impl<P: PreferencesStore> MacroPreferences<P> {
    #[must_use]
    pub const fn new(store: P) -> Self {
        Self { store }
    }

    #[must_use]
    pub const fn store(&self) -> &P {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut P {
        &mut self.store
    }

    #[must_use]
    pub fn into_inner(self) -> P {
        self.store
    }

    fn step_key(index: usize, step: usize) -> String {
        format!("{MACRO_PREFIX}{index}.step.{step}")
    }

    #[must_use]
    pub fn macros_count(&self) -> usize {
        usize::try_from(self.store.get_u64(MACROS_COUNT, 0)).unwrap_or(0)
    }

    pub fn set_macros_count(&mut self, count: usize) {
        self.store.put_u64(MACROS_COUNT, count as u64);
    }

    /// Record at `index`. Steps are read from 1 up to the first missing or
    /// blank entry.
    #[must_use]
    pub fn macro_record(&self, index: usize) -> MacroRecord {
        let name = self
            .store
            .get(&format!("{MACRO_PREFIX}{index}.name"))
            .unwrap_or_default();
        let steps = (1..)
            .map(|step| self.store.get(&Self::step_key(index, step)))
            .take_while(|line| line.as_ref().is_some_and(|l| !l.trim().is_empty()))
            .flatten()
            .collect();
        MacroRecord::with_steps(name, steps)
    }

    /// Store `record` at `index`, removing stale steps of a longer previous
    /// record.
    pub fn set_macro_record(&mut self, index: usize, record: &MacroRecord) {
        self.store
            .put(&format!("{MACRO_PREFIX}{index}.name"), &record.name);
        for (i, step) in record.steps.iter().enumerate() {
            self.store.put(&Self::step_key(index, i + 1), step);
        }
        let mut stale = record.steps.len() + 1;
        while let Some(old) = self.store.get(&Self::step_key(index, stale)) {
            self.store.remove(&Self::step_key(index, stale));
            if old.trim().is_empty() {
                break;
            }
            stale += 1;
        }
    }

    /// All stored records.
    #[must_use]
    pub fn load_records(&self) -> Vec<MacroRecord> {
        (0..self.macros_count()).map(|i| self.macro_record(i)).collect()
    }

    /// Replace all stored records and flush.
    pub fn save_records(&mut self, records: &[MacroRecord]) -> Result<(), PreferencesError> {
        self.set_macros_count(records.len());
        for (i, record) in records.iter().enumerate() {
            self.set_macro_record(i, record);
        }
        self.store.flush()
    }
}

// ============================================================================
// Bookmark layout
// ============================================================================

/// An RGB colour written as `#rrggbb`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse `#rrggbb` (case-insensitive).
    #[must_use]
    pub fn from_hex(text: &str) -> Option<Self> {
        let hex = text.trim().strip_prefix('#')?;
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// A highlighted document range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookmarkRecord {
    pub start_position: u64,
    pub length: u64,
    pub color: Option<Rgb>,
}

impl BookmarkRecord {
    #[must_use]
    pub const fn new(start_position: u64, length: u64, color: Option<Rgb>) -> Self {
        Self {
            start_position,
            length,
            color,
        }
    }

    /// Whether the bookmark covers no bytes.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }
}

/// Bookmark records stored in a preferences store.
#[derive(Debug, Clone, Default)]
pub struct BookmarkPreferences<P> {
    store: P,
}

impl<P: PreferencesStore> BookmarkPreferences<P> {
    #[must_use]
    pub const fn new(store: P) -> Self {
        Self { store }
    }

    #[must_use]
    pub fn into_inner(self) -> P {
        self.store
    }

    #[must_use]
    pub fn bookmarks_count(&self) -> usize {
        usize::try_from(self.store.get_u64(BOOKMARKS_COUNT, 0)).unwrap_or(0)
    }

    /// Bookmark at `index`; a missing or unreadable colour reads as none.
    #[must_use]
    pub fn bookmark_record(&self, index: usize) -> BookmarkRecord {
        let prefix = format!("{BOOKMARK_PREFIX}{index}.");
        let color = self
            .store
            .get(&format!("{prefix}bookmarkColor"))
            .and_then(|text| Rgb::from_hex(&text));
        BookmarkRecord {
            start_position: self.store.get_u64(&format!("{prefix}startPosition"), 0),
            length: self.store.get_u64(&format!("{prefix}length"), 0),
            color,
        }
    }

    pub fn set_bookmark_record(&mut self, index: usize, record: &BookmarkRecord) {
        let prefix = format!("{BOOKMARK_PREFIX}{index}.");
        self.store
            .put_u64(&format!("{prefix}startPosition"), record.start_position);
        self.store.put_u64(&format!("{prefix}length"), record.length);
        let color_key = format!("{prefix}bookmarkColor");
        match record.color {
            Some(color) => self.store.put(&color_key, &color.to_string()),
            None => self.store.remove(&color_key),
        }
    }

    #[must_use]
    pub fn load_records(&self) -> Vec<BookmarkRecord> {
        (0..self.bookmarks_count())
            .map(|i| self.bookmark_record(i))
            .collect()
    }

    pub fn save_records(&mut self, records: &[BookmarkRecord]) -> Result<(), PreferencesError> {
        self.store.put_u64(BOOKMARKS_COUNT, records.len() as u64);
        for (i, record) in records.iter().enumerate() {
            self.set_bookmark_record(i, record);
        }
        self.store.flush()
    }
}
