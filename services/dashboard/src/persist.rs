//! Persisted state blobs
//!
//! Store snapshots are written as `{"state": ..., "version": 0}` so the
//! layout matches what the web client keeps in local storage.

use common::{KeyValueStorage, load_json, save_json};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::warn;

pub const STATE_VERSION: u32 = 0;

#[derive(Debug, Serialize, Deserialize)]
struct Persisted<T> {
    state: T,
    #[serde(default)]
    version: u32,
}

/// Read the state stored under `key`, if any can be decoded
pub(crate) fn hydrate<T: DeserializeOwned>(storage: &dyn KeyValueStorage, key: &str) -> Option<T> {
    let persisted: Persisted<T> = load_json(storage, key)?;
    if persisted.version != STATE_VERSION {
        warn!(
            "Discarding {} persisted with unsupported version {}",
            key, persisted.version
        );
        return None;
    }
    Some(persisted.state)
}

/// Write `state` under `key`; failures are logged and swallowed
pub(crate) fn persist<T: Serialize>(storage: &dyn KeyValueStorage, key: &str, state: T) {
    let blob = Persisted {
        state,
        version: STATE_VERSION,
    };
    if let Err(e) = save_json(storage, key, &blob) {
        warn!("Failed to persist {}: {}", key, e);
    }
}
