//! Key-value store for data that outlives a session
//!
//! The board engine persists nothing. The frontend hands a finished
//! session's score to a [`KeyValueStore`] through [`credit`].

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Key holding the player's accumulated balance as a decimal string
pub const BALANCE_KEY: &str = "balance";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("store file is not a JSON object of strings: {0}")]
    Json(#[from] serde_json::Error),
    #[error("value {value:?} under {key:?} is not a number")]
    Parse { key: String, value: String },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Io(_) => "io",
            StoreError::Json(_) => "json",
            StoreError::Parse { .. } => "parse",
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// `get(key) -> value | absent` and `set(key, value)`
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A flat JSON object on disk, rewritten on every `set`.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl JsonFileStore {
    /// Open `path`, starting empty when the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match fs::read_to_string(&path) {
            Ok(content) if content.trim().is_empty() => BTreeMap::new(),
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => return Err(e.into()),
        };
        log::debug!("opened store {} ({} keys)", path.display(), entries.len());
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.entries)?;
        // Replace atomically.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.flush() {
            match previous {
                Some(v) => self.entries.insert(key.to_string(), v),
                None => self.entries.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }
}

/// Stored balance; an absent key reads as 0.
pub fn balance(store: &impl KeyValueStore) -> Result<u64> {
    match store.get(BALANCE_KEY)? {
        None => Ok(0),
        Some(value) => value.trim().parse().map_err(|_| StoreError::Parse {
            key: BALANCE_KEY.to_string(),
            value,
        }),
    }
}

/// Add `amount` to the stored balance and return the new total.
pub fn credit(store: &mut impl KeyValueStore, amount: u64) -> Result<u64> {
    let total = balance(store)?.saturating_add(amount);
    store.set(BALANCE_KEY, &total.to_string())?;
    log::info!("credited {} (balance {})", amount, total);
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_get_set() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);
        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn balance_defaults_to_zero_and_accumulates() {
        let mut store = MemoryStore::new();
        assert_eq!(balance(&store).unwrap(), 0);
        assert_eq!(credit(&mut store, 30).unwrap(), 30);
        assert_eq!(credit(&mut store, 12).unwrap(), 42);
        assert_eq!(store.get(BALANCE_KEY).unwrap().as_deref(), Some("42"));
    }

    #[test]
    fn garbage_balance_is_a_parse_error() {
        let mut store = MemoryStore::new();
        store.set(BALANCE_KEY, "lots").unwrap();
        let err = balance(&store).unwrap_err();
        assert_eq!(err.code(), "parse");
        assert!(credit(&mut store, 1).is_err());
        assert_eq!(store.get(BALANCE_KEY).unwrap().as_deref(), Some("lots"));
    }

    #[test]
    fn json_file_store_persists_across_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("store.json");

        let mut store = JsonFileStore::open(&path).unwrap();
        assert_eq!(balance(&store).unwrap(), 0);
        credit(&mut store, 25).unwrap();
        store.set("items", "[\"pin\"]").unwrap();

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(balance(&reopened).unwrap(), 25);
        assert_eq!(reopened.get("items").unwrap().as_deref(), Some("[\"pin\"]"));
    }

    #[test]
    fn corrupt_file_is_a_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("store.json");
        fs::write(&path, "[1, 2").unwrap();
        let err = JsonFileStore::open(&path).unwrap_err();
        assert_eq!(err.code(), "json");
    }
}
