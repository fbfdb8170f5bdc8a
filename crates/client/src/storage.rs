//! Cross-platform storage module.
//!
//! Provides a unified key/value API for persistent storage:
//! - Web: `localStorage`
//! - Desktop: JSON files in a data directory, by default the
//!   platform-appropriate config directory:
//!   - Linux: `~/.config/hexchat/`
//!   - macOS: `~/Library/Application Support/hexchat/`
//!   - Windows: `%APPDATA%\hexchat\`
//! - Tests: an in-memory map
//!
//! Every write is best-effort: failures are reported as `false`, never as errors.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use serde::{de::DeserializeOwned, Serialize};

/// Storage keys shared with the web client.
pub mod keys {
    pub const TOKEN: &str = "token";
    pub const USERNAME: &str = "username";
    pub const CHAT_CHANNELS: &str = "chatChannels";
    pub const CHAT_MESSAGES: &str = "chatMessages";
    pub const LANGUAGE: &str = "language";
}

/// Raw string key/value backend.
pub trait Storage: Send + Sync {
    /// Store `value` under `key`. Returns `true` if the write succeeded.
    fn save_raw(&self, key: &str, value: &str) -> bool;

    fn load_raw(&self, key: &str) -> Option<String>;

    fn remove(&self, key: &str);

    /// Check if a key exists in storage.
    fn exists(&self, key: &str) -> bool {
        self.load_raw(key).is_some()
    }
}

/// Save a value as JSON.
///
/// Returns `true` if the operation succeeded.
pub fn save<T: Serialize + ?Sized>(storage: &dyn Storage, key: &str, value: &T) -> bool {
    match serde_json::to_string(value) {
        Ok(json) => storage.save_raw(key, &json),
        Err(_) => false,
    }
}

/// Load a JSON value.
///
/// Returns `None` if the key doesn't exist or deserialization fails.
pub fn load<T: DeserializeOwned>(storage: &dyn Storage, key: &str) -> Option<T> {
    let json = storage.load_raw(key)?;
    serde_json::from_str(&json).ok()
}

// =========================================
// In-memory implementation
// =========================================

#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save_raw(&self, key: &str, value: &str) -> bool {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        true
    }

    fn load_raw(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn remove(&self, key: &str) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }
}

// =========================================
// Web (WASM) implementation
// =========================================

#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window()?.local_storage().ok()?
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn save_raw(&self, key: &str, value: &str) -> bool {
        match Self::storage() {
            Some(storage) => storage.set_item(key, value).is_ok(),
            None => false,
        }
    }

    fn load_raw(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok()?
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

// =========================================
// Desktop (native) implementation
// =========================================

#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStorage {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage under the platform config directory, if there is one.
    pub fn default_location() -> Option<Self> {
        Some(Self::new(dirs::config_dir()?.join("hexchat")))
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn file_path(&self, key: &str) -> Option<std::path::PathBuf> {
        // Ensure the directory exists
        if !self.dir.exists() {
            std::fs::create_dir_all(&self.dir).ok()?;
        }
        // Sanitize key to be a valid filename
        let safe_key = key.replace(['/', '\\', ':', '*', '?', '"', '<', '>', '|'], "_");
        Some(self.dir.join(format!("{}.json", safe_key)))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl Storage for FileStorage {
    fn save_raw(&self, key: &str, value: &str) -> bool {
        let Some(path) = self.file_path(key) else {
            return false;
        };
        std::fs::write(path, value).is_ok()
    }

    fn load_raw(&self, key: &str) -> Option<String> {
        let path = self.file_path(key)?;
        std::fs::read_to_string(path).ok()
    }

    fn remove(&self, key: &str) {
        if let Some(path) = self.file_path(key) {
            let _ = std::fs::remove_file(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_roundtrip() {
        let storage = MemoryStorage::new();
        assert!(save(&storage, "k", &vec![1, 2, 3]));
        assert_eq!(load::<Vec<i32>>(&storage, "k"), Some(vec![1, 2, 3]));
        assert!(storage.exists("k"));

        storage.remove("k");
        assert!(!storage.exists("k"));
        assert_eq!(load::<Vec<i32>>(&storage, "k"), None);
    }

    #[test]
    fn load_ignores_garbage() {
        let storage = MemoryStorage::new();
        storage.save_raw("k", "{not json");
        assert_eq!(load::<Vec<i32>>(&storage, "k"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn file_storage_sanitizes_keys_and_creates_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(tmp.path().join("nested"));

        assert!(save(&storage, "a/b:c", "value"));
        assert!(tmp.path().join("nested").join("a_b_c.json").exists());
        assert_eq!(load::<String>(&storage, "a/b:c").as_deref(), Some("value"));

        storage.remove("a/b:c");
        assert!(!storage.exists("a/b:c"));
    }
}
