//! Config bridge between the installer document and its JSON form.
//!
//! # Data Flow
//! ```text
//! GET /config:   store.load() → ConfigDocument → serde_json::Value (key order kept)
//! POST /config:  JSON body → update.rs (ConfigUpdate, coerce.rs per value)
//!                → store.load() → apply entries → store.save()
//! ```
//!
//! # Design Decisions
//! - A payload that is not an object is rejected before the file is touched
//! - `apply` calls are serialized in-process; `read` never waits on them
//! - Writers in other processes still race; the last save wins

pub mod coerce;
pub mod update;

use std::sync::{Mutex, PoisonError};

use serde_json::Value as JsonValue;

use crate::document::DocumentStore;
use crate::error::{Error, Result};

pub use coerce::coerce;
pub use update::ConfigUpdate;

/// Reads the installer document as JSON and applies JSON updates to it.
#[derive(Debug)]
pub struct ConfigBridge {
    store: DocumentStore,
    write_gate: Mutex<()>,
}

impl ConfigBridge {
    pub fn new(store: DocumentStore) -> Self {
        Self {
            store,
            write_gate: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    /// The current document as a JSON object in document key order.
    pub fn read(&self) -> Result<JsonValue> {
        let document = self.store.load()?;
        serde_json::to_value(&document)
            .map_err(|e| Error::parse(format!("failed to encode document as JSON: {}", e)))
    }

    /// Fold `payload` into the current document and save it.
    pub fn apply(&self, payload: JsonValue) -> Result<()> {
        let update = ConfigUpdate::try_from(payload)?;
        let keys: Vec<String> = update.keys().map(str::to_string).collect();

        // The gate only guards the load-modify-save cycle; a poisoned gate
        // still protects it.
        let _guard = self.write_gate.lock().unwrap_or_else(PoisonError::into_inner);
        let mut document = self.store.load()?;
        update.apply_to(&mut document)?;
        self.store.save(&document)?;

        tracing::info!(
            path = %self.store.path().display(),
            keys = ?keys,
            "Config updated"
        );
        Ok(())
    }
}
