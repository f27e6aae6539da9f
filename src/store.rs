//! Key-value persistence capability.
//!
//! The session record and the combination cache both persist through this
//! trait instead of reaching for `localStorage` directly, so tests run
//! against [`MemoryStore`] and a browser without storage access degrades to
//! an in-memory session instead of crashing.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Browser-console warning; a no-op on the host so persistence code paths
/// stay exercisable in unit tests.
pub fn warn(msg: &str) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&msg.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = msg;
}

/// Minimal string key-value store. Writes are fire-and-forget: failures are
/// logged by the implementation, never surfaced to game logic.
pub trait KvStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

impl<K: KvStore + ?Sized> KvStore for Rc<K> {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory store. Used by tests and as the fallback when the browser
/// refuses storage access (private mode, quota, iframe sandbox).
#[derive(Default, Clone)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// `localStorage`-backed store. Construction fails when the browser denies
/// storage access; callers fall back to [`MemoryStore`].
pub struct BrowserStorage {
    storage: web_sys::Storage,
}

impl BrowserStorage {
    pub fn open() -> Option<Self> {
        let storage = web_sys::window()?.local_storage().ok()??;
        Some(Self { storage })
    }
}

impl KvStore for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) {
        if let Err(e) = self.storage.set_item(key, value) {
            warn(&format!("storage write failed for {key}: {e:?}"));
        }
    }

    fn remove(&self, key: &str) {
        let _ = self.storage.remove_item(key);
    }
}
