use std::collections::HashMap;

use super::Store;
use crate::error::StorageError;

/// In-process store. Nothing survives the process.
///
/// Writes can be made to fail on demand, to exercise persistence-failure
/// handling.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    fail_writes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: "store is read-only".into(),
            });
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        if self.fail_writes {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                message: "store is read-only".into(),
            });
        }
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_writes_keep_old_value() {
        let mut store = MemoryStore::new();
        store.set("k", "v1").unwrap();
        store.set_fail_writes(true);
        assert!(store.set("k", "v2").is_err());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v1"));
    }
}
