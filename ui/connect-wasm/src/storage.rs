//! `localStorage` adapter.

use anyhow::{Result, anyhow};
use gloo_storage::{LocalStorage, Storage};
use sc_storage::KeyValueStore;

/// Raw string access to `window.localStorage`; JSON encoding is done by
/// the accessor in `sc-storage`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStore;

impl KeyValueStore for LocalStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        LocalStorage::raw()
            .get_item(key)
            .map_err(|e| anyhow!("localStorage read failed: {:?}", e))
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        LocalStorage::raw()
            .set_item(key, value)
            .map_err(|e| anyhow!("localStorage write failed: {:?}", e))
    }
}
