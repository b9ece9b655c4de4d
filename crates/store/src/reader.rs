use serde_json::Value;
use tracing::{debug, warn};

use crate::blob::BlobStore;
use crate::error::BlobError;

/// Fetch and parse the log document stored under `key`.
///
/// Any failure — missing object, transport error, content that is not a
/// JSON array — yields the empty log rather than an error, so a read
/// problem never blocks an append. A failure other than not-found is
/// indistinguishable from an empty day once swallowed, so it is logged at
/// `warn` with the key for later diagnosis.
pub async fn fetch_day_log(store: &dyn BlobStore, key: &str) -> Vec<Value> {
    let bytes = match store.get(key).await {
        Ok(bytes) => bytes,
        Err(BlobError::NotFound(_)) => {
            debug!(key, "no log document yet, starting empty");
            return Vec::new();
        }
        Err(err) => {
            warn!(key, error = %err, "fetch failed, treating log as empty");
            return Vec::new();
        }
    };

    match serde_json::from_slice::<Vec<Value>>(&bytes) {
        Ok(records) => records,
        Err(err) => {
            warn!(key, error = %err, "log document is not a JSON array, treating as empty");
            Vec::new()
        }
    }
}
