use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info};

use crate::blob::BlobStore;
use crate::error::StoreError;
use crate::gate::WriteGate;
use crate::partition::day_key;
use crate::reader::fetch_day_log;

const JSON_CONTENT_TYPE: &str = "application/json";

/// Serializes read-merge-write cycles against the day's log document.
///
/// The store offers no read-modify-write primitive, so two overlapping
/// appends could both read the same prior document and the later write
/// would drop the earlier record. The gate forces the cycles to run one at
/// a time within this process. Nothing is cached between appends; every
/// cycle re-fetches the stored document.
pub struct LogAppender {
    store: Arc<dyn BlobStore>,
    gate: WriteGate,
}

impl LogAppender {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self {
            store,
            gate: WriteGate::new(),
        }
    }

    /// Append `record` to today's log document for `base_name`.
    ///
    /// The key is fixed before the gate is taken; an append that crosses
    /// UTC midnight while waiting still writes to the day it started on.
    /// Read failures are absorbed as an empty prior log; a failed `put`
    /// propagates, with the gate released either way.
    pub async fn append(&self, base_name: &str, record: Value) -> Result<(), StoreError> {
        let key = day_key(base_name, Utc::now());

        let _permit = self.gate.acquire().await;

        let mut records = fetch_day_log(self.store.as_ref(), &key).await;
        records.push(record);
        debug!(key = %key, total = records.len(), "writing log document");

        let body = serde_json::to_vec(&records).map_err(|source| StoreError::Serialize {
            key: key.clone(),
            source,
        })?;

        self.store
            .put(&key, Bytes::from(body), JSON_CONTENT_TYPE)
            .await
            .map_err(|source| StoreError::Write {
                key: key.clone(),
                source,
            })?;

        info!(key = %key, "log document updated");
        Ok(())
    }

    /// True when no append currently holds the gate.
    pub fn gate_is_free(&self) -> bool {
        self.gate.is_free()
    }

    pub fn store(&self) -> &Arc<dyn BlobStore> {
        &self.store
    }
}
