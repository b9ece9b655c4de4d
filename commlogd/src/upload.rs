//! Bulk multipart upload proxy.
//!
//! Streams multipart file parts into the blob store. A `pathmap` field maps
//! original filenames to their relative directory paths so directory uploads
//! keep their layout, and a process-wide counter tracks how many files each
//! client-side process id has stored so far.

use std::collections::HashMap;
use std::sync::Mutex;

use axum::{
    extract::{Extension, Multipart},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde_json::json;
use tracing::debug;

use crate::http::{ApiError, AppState};

const UPLOAD_KEY_PREFIX: &str = "test-images/";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Cumulative per-process upload counts, kept for the process lifetime.
pub struct UploadCounter {
    counts: Mutex<HashMap<String, u64>>,
}

impl UploadCounter {
    pub fn new() -> Self {
        Self {
            counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn record(&self, process_id: &str) {
        let mut counts = self.counts.lock().expect("upload counter poisoned");
        *counts.entry(process_id.to_string()).or_insert(0) += 1;
    }

    pub fn count(&self, process_id: &str) -> u64 {
        let counts = self.counts.lock().expect("upload counter poisoned");
        counts.get(process_id).copied().unwrap_or(0)
    }
}

impl Default for UploadCounter {
    fn default() -> Self {
        Self::new()
    }
}

pub async fn upload(
    Extension(state): Extension<AppState>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let mut pathmap: HashMap<String, String> = HashMap::new();
    let mut process_id = String::new();
    let mut files: Vec<FilePart> = Vec::new();

    // Fields arrive in client order; pathmap and processId may come before
    // or after the file parts, so files are buffered until the form is read.
    while let Some(field) = multipart.next_field().await.map_err(ApiError::internal)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("pathmap") => {
                let raw = field.text().await.map_err(ApiError::internal)?;
                pathmap = serde_json::from_str(&raw).map_err(ApiError::internal)?;
            }
            Some("processId") => {
                process_id = field.text().await.map_err(ApiError::internal)?;
            }
            Some("files") => {
                let file_name = field
                    .file_name()
                    .unwrap_or("upload.bin")
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(FALLBACK_CONTENT_TYPE)
                    .to_string();
                let data = field.bytes().await.map_err(ApiError::internal)?;
                files.push(FilePart {
                    file_name,
                    content_type,
                    data,
                });
            }
            _ => {}
        }
    }

    for part in files {
        let relative = pathmap
            .get(&part.file_name)
            .cloned()
            .unwrap_or_else(|| part.file_name.clone());
        let key = format!("{UPLOAD_KEY_PREFIX}{relative}");
        debug!(original = %part.file_name, key = %key, "storing uploaded file");

        state
            .store()
            .put(&key, part.data, &part.content_type)
            .await
            .map_err(ApiError::internal)?;
        state.uploads().record(&process_id);
    }

    let uploaded = state.uploads().count(&process_id);
    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Files uploaded successfully.",
            "uploadedCount": uploaded,
        })),
    )
        .into_response())
}

struct FilePart {
    file_name: String,
    content_type: String,
    data: Bytes,
}
