//! Background ingestion jobs, tracked per session.
//!
//! Uploads schedule a text-extraction pass over the session folder; the
//! job's status stays queryable so callers can check completion instead of
//! racing it. A request that races ahead anyway just sees whatever text is
//! currently on disk.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};

use crate::extract;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IngestStatus {
    Pending,
    Running,
    Done { chars: usize },
    Failed { message: String },
}

/// Registry of ingestion jobs keyed by session id.
#[derive(Clone, Default)]
pub struct IngestTracker {
    jobs: Arc<Mutex<HashMap<String, IngestStatus>>>,
}

impl IngestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self, session_id: &str) -> Option<IngestStatus> {
        self.jobs.lock().unwrap().get(session_id).cloned()
    }

    fn set(&self, session_id: &str, status: IngestStatus) {
        self.jobs
            .lock()
            .unwrap()
            .insert(session_id.to_string(), status);
    }

    /// Schedule extraction for the session's uploads. Returns immediately;
    /// progress is queryable via [`IngestTracker::status`].
    pub fn schedule(&self, upload_root: PathBuf, session_id: String) {
        self.set(&session_id, IngestStatus::Pending);
        let tracker = self.clone();
        tokio::spawn(async move {
            tracker.set(&session_id, IngestStatus::Running);
            let task = tokio::task::spawn_blocking({
                let upload_root = upload_root.clone();
                let session_id = session_id.clone();
                move || extract::session_text(&upload_root, &session_id)
            });
            match task.await {
                Ok(text) if !text.is_empty() => {
                    info!(session = %session_id, chars = text.chars().count(), "ingestion finished");
                    tracker.set(
                        &session_id,
                        IngestStatus::Done {
                            chars: text.chars().count(),
                        },
                    );
                }
                Ok(_) => {
                    warn!(session = %session_id, "ingestion produced no text");
                    tracker.set(
                        &session_id,
                        IngestStatus::Failed {
                            message: "no extractable text".to_string(),
                        },
                    );
                }
                Err(err) => {
                    warn!(session = %session_id, error = %err, "ingestion task failed");
                    tracker.set(
                        &session_id,
                        IngestStatus::Failed {
                            message: err.to_string(),
                        },
                    );
                }
            }
        });
    }
}
