//! Editing session over one [`LabelRecord`] with optional autosave.

use super::{Condition, IdentifierAdvisory, LabelRecord, LabelSize};
use crate::storage::{KeyValueStore, LabelStore};

type DynStore = LabelStore<Box<dyn KeyValueStore>>;

/// Applies field edits to a record and persists after each accepted change.
///
/// Persistence failures are logged and swallowed: the in-memory record is
/// always the source of truth for the current session.
pub struct LabelEditor {
    record: LabelRecord,
    store: Option<DynStore>,
}

impl Default for LabelEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl LabelEditor {
    /// Editor without persistence.
    pub fn new() -> Self {
        Self {
            record: LabelRecord::default(),
            store: None,
        }
    }

    /// Editor that restores the stored record and autosaves changes.
    pub fn with_store(store: DynStore) -> Self {
        let record = store.load();
        tracing::info!(layout = %store.layout(), fnsku = %record.identifier, "restored label");
        Self {
            record,
            store: Some(store),
        }
    }

    pub fn record(&self) -> &LabelRecord {
        &self.record
    }

    pub fn advisory(&self) -> IdentifierAdvisory {
        self.record.advisory()
    }

    pub fn set_identifier(&mut self, raw: &str) {
        self.record.set_identifier(raw);
        self.persist();
    }

    pub fn set_title(&mut self, raw: &str) {
        self.record.set_title(raw);
        self.persist();
    }

    pub fn set_sku(&mut self, raw: &str) {
        self.record.set_sku(raw);
        self.persist();
    }

    pub fn set_condition(&mut self, condition: Condition) {
        self.record.set_condition(condition);
        self.persist();
    }

    /// Returns `false` for unknown values; nothing is stored in that case.
    pub fn set_condition_str(&mut self, value: &str) -> bool {
        let accepted = self.record.set_condition_str(value);
        if accepted {
            self.persist();
        }
        accepted
    }

    pub fn set_label_size(&mut self, size: LabelSize) {
        self.record.set_label_size(size);
        self.persist();
    }

    /// Returns `false` for unknown size tags; nothing is stored in that case.
    pub fn set_label_size_str(&mut self, value: &str) -> bool {
        let accepted = self.record.set_label_size_str(value);
        if accepted {
            self.persist();
        }
        accepted
    }

    /// Replace the whole record (normalizing the identifier).
    pub fn replace(&mut self, record: LabelRecord) {
        self.record = record.normalized();
        self.persist();
    }

    /// See [`LabelRecord::reset`]; the label size survives.
    pub fn reset(&mut self) {
        self.record.reset();
        self.persist();
    }

    fn persist(&self) {
        if let Some(store) = &self.store
            && let Err(e) = store.save(&self.record)
        {
            tracing::warn!(error = %e, "failed to persist label");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, StorageLayout};
    use std::sync::Arc;

    /// Shares one MemoryStore between an editor and the test.
    struct Shared(Arc<MemoryStore>);

    impl KeyValueStore for Shared {
        fn get(&self, key: &str) -> Result<Option<String>, crate::error::StorageError> {
            self.0.get(key)
        }
        fn set(&self, key: &str, value: &str) -> Result<(), crate::error::StorageError> {
            self.0.set(key, value)
        }
        fn remove(&self, key: &str) -> Result<(), crate::error::StorageError> {
            self.0.remove(key)
        }
    }

    fn editor_over(backend: &Arc<MemoryStore>) -> LabelEditor {
        let store: Box<dyn KeyValueStore> = Box::new(Shared(backend.clone()));
        LabelEditor::with_store(LabelStore::new(store, StorageLayout::default()))
    }

    #[test]
    fn test_autosave_and_restore() {
        let backend = Arc::new(MemoryStore::new());

        let mut editor = editor_over(&backend);
        editor.set_identifier("x001234567");
        editor.set_title("Silicone Spatula Set");
        editor.set_condition(Condition::UsedGood);
        editor.set_label_size(LabelSize::Compact);

        let restored = editor_over(&backend);
        assert_eq!(restored.record(), editor.record());
        assert_eq!(restored.record().identifier, "X001234567");
    }

    #[test]
    fn test_rejected_condition_not_persisted() {
        let backend = Arc::new(MemoryStore::new());
        let mut editor = editor_over(&backend);
        assert!(!editor.set_condition_str("Pristine"));
        assert!(backend.get(crate::storage::DEFAULT_BLOB_KEY).unwrap().is_none());
    }

    #[test]
    fn test_reset_persists() {
        let backend = Arc::new(MemoryStore::new());
        let mut editor = editor_over(&backend);
        editor.set_identifier("X001234567");
        editor.set_label_size(LabelSize::Compact);
        editor.reset();

        let restored = editor_over(&backend);
        assert_eq!(restored.record().identifier, "");
        assert_eq!(restored.record().label_size, LabelSize::Compact);
    }

    #[test]
    fn test_without_store() {
        let mut editor = LabelEditor::new();
        editor.set_identifier(" abc ");
        assert_eq!(editor.record().identifier, "ABC");
        assert_eq!(editor.advisory(), IdentifierAdvisory::TooShort { len: 3 });
    }
}
