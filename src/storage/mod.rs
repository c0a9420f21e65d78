//! # Label Persistence
//!
//! Persists the last-edited [`LabelRecord`] so it survives restarts.
//!
//! ## Layers
//!
//! ```text
//! LabelStore ── layout ──► KeyValueStore
//!  (record)   Blob/PerField  (FileStore | MemoryStore)
//! ```
//!
//! ## Layouts
//!
//! | Layout | Keys | Values |
//! |--------|------|--------|
//! | `Blob` | one key (default `fba-label-kit`) | the record as JSON |
//! | `PerField` | `<prefix>fnsku`, `<prefix>title`, ... | raw strings |
//!
//! Both layouts hold the same information. Loading never fails: missing,
//! unreadable or malformed data falls back to [`LabelRecord::default`].

mod file;

pub use file::FileStore;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Mutex, PoisonError};

use crate::error::StorageError;
use crate::label::LabelRecord;

/// Default key for the single-blob layout.
pub const DEFAULT_BLOB_KEY: &str = "fba-label-kit";

/// Default key prefix for the per-field layout.
pub const DEFAULT_FIELD_PREFIX: &str = "fba-label-kit.";

/// A string key/value store, the shape of browser local storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-process store. Contents are lost when dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> StorageError {
    StorageError::Unavailable("store lock poisoned".to_string())
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let entries = self.entries.lock().map_err(poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self.entries.lock().map_err(poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        (**self).remove(key)
    }
}

// ============================================================================
// LAYOUT
// ============================================================================

/// How a record is spread over keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageLayout {
    /// Whole record as one JSON blob.
    Blob { key: String },
    /// One key per field.
    PerField { prefix: String },
}

impl Default for StorageLayout {
    fn default() -> Self {
        Self::Blob {
            key: DEFAULT_BLOB_KEY.to_string(),
        }
    }
}

impl StorageLayout {
    pub fn per_field() -> Self {
        Self::PerField {
            prefix: DEFAULT_FIELD_PREFIX.to_string(),
        }
    }
}

impl fmt::Display for StorageLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob { key } => write!(f, "blob ({})", key),
            Self::PerField { prefix } => write!(f, "per_field ({}*)", prefix),
        }
    }
}

impl FromStr for StorageLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "blob" | "json" => Ok(Self::default()),
            "per_field" | "per-field" | "fields" => Ok(Self::per_field()),
            other => Err(format!(
                "Unknown storage layout '{}'. Use 'blob' or 'per_field'",
                other
            )),
        }
    }
}

const FIELD_FNSKU: &str = "fnsku";
const FIELD_TITLE: &str = "title";
const FIELD_CONDITION: &str = "condition";
const FIELD_SKU: &str = "sku";
const FIELD_LABEL_SIZE: &str = "labelSize";

const FIELDS: [&str; 5] = [
    FIELD_FNSKU,
    FIELD_TITLE,
    FIELD_CONDITION,
    FIELD_SKU,
    FIELD_LABEL_SIZE,
];

// ============================================================================
// LABEL STORE
// ============================================================================

/// Reads and writes a [`LabelRecord`] through a [`KeyValueStore`].
pub struct LabelStore<S> {
    store: S,
    layout: StorageLayout,
}

impl<S: KeyValueStore> LabelStore<S> {
    pub fn new(store: S, layout: StorageLayout) -> Self {
        Self { store, layout }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    pub fn backend(&self) -> &S {
        &self.store
    }

    /// Load the stored record, falling back to defaults on any failure.
    pub fn load(&self) -> LabelRecord {
        match self.try_load() {
            Ok(Some(record)) => record,
            Ok(None) => {
                tracing::debug!(layout = %self.layout, "no stored label, using defaults");
                LabelRecord::default()
            }
            Err(e) => {
                tracing::warn!(layout = %self.layout, error = %e, "stored label unusable, using defaults");
                LabelRecord::default()
            }
        }
    }

    /// Load the stored record, reporting storage and parse failures.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    pub fn try_load(&self) -> Result<Option<LabelRecord>, StorageError> {
        match &self.layout {
            StorageLayout::Blob { key } => match self.store.get(key)? {
                Some(json) => {
                    let record: LabelRecord = serde_json::from_str(&json)?;
                    Ok(Some(record.normalized()))
                }
                None => Ok(None),
            },
            StorageLayout::PerField { prefix } => self.load_fields(prefix),
        }
    }

    /// Unknown condition or size values fall back field by field.
    fn load_fields(&self, prefix: &str) -> Result<Option<LabelRecord>, StorageError> {
        let mut values = BTreeMap::new();
        for field in FIELDS {
            if let Some(value) = self.store.get(&format!("{}{}", prefix, field))? {
                values.insert(field, value);
            }
        }
        if values.is_empty() {
            return Ok(None);
        }

        let mut record = LabelRecord::default();
        if let Some(v) = values.get(FIELD_FNSKU) {
            record.set_identifier(v);
        }
        if let Some(v) = values.get(FIELD_TITLE) {
            record.set_title(v);
        }
        if let Some(v) = values.get(FIELD_SKU) {
            record.set_sku(v);
        }
        if let Some(v) = values.get(FIELD_CONDITION)
            && !record.set_condition_str(v)
        {
            tracing::warn!(value = %v, "ignoring stored condition");
        }
        if let Some(v) = values.get(FIELD_LABEL_SIZE)
            && !record.set_label_size_str(v)
        {
            tracing::warn!(value = %v, "ignoring stored label size");
        }
        Ok(Some(record))
    }

    /// Persist the whole record.
    pub fn save(&self, record: &LabelRecord) -> Result<(), StorageError> {
        match &self.layout {
            StorageLayout::Blob { key } => {
                let json = serde_json::to_string(record)?;
                self.store.set(key, &json)
            }
            StorageLayout::PerField { prefix } => {
                let key = |field: &str| format!("{}{}", prefix, field);
                self.store.set(&key(FIELD_FNSKU), &record.identifier)?;
                self.store.set(&key(FIELD_TITLE), &record.title)?;
                self.store.set(&key(FIELD_CONDITION), record.condition.label())?;
                self.store.set(&key(FIELD_SKU), &record.sku)?;
                self.store.set(&key(FIELD_LABEL_SIZE), record.label_size.tag())
            }
        }
    }

    /// Remove everything this layout stored.
    pub fn clear(&self) -> Result<(), StorageError> {
        match &self.layout {
            StorageLayout::Blob { key } => self.store.remove(key),
            StorageLayout::PerField { prefix } => {
                for field in FIELDS {
                    self.store.remove(&format!("{}{}", prefix, field))?;
                }
                Ok(())
            }
        }
    }
}
