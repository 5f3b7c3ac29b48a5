//! Couples the local alert buffer to the authoritative read-state API.
//!
//! Read-state mutations are applied optimistically to the local copy first,
//! then written through. On failure the local mutation is rolled back --
//! one record for `mark_read`, the entire buffer for `mark_all_read` --
//! and the error is returned for the caller to surface. Nothing retries
//! automatically; retry is an explicit user action.

use std::sync::{Arc, Mutex};

use tracing::warn;

use crate::api::{AlertListResponse, ApiClient};
use crate::error::ApiError;
use crate::session::Session;

use super::buffer::AlertBuffer;

pub struct AlertInbox {
    api: ApiClient,
    owner_id: i64,
    buffer: Arc<Mutex<AlertBuffer>>,
}

impl AlertInbox {
    /// The buffer is shared with the stream client that fills it.
    pub fn new(api: ApiClient, session: &Session, buffer: Arc<Mutex<AlertBuffer>>) -> Self {
        Self {
            api,
            owner_id: session.owner_id,
            buffer,
        }
    }

    pub fn buffer(&self) -> Arc<Mutex<AlertBuffer>> {
        Arc::clone(&self.buffer)
    }

    /// Local unread count, recomputed on demand.
    pub fn unread_count(&self) -> usize {
        self.buffer.lock().expect("alert buffer poisoned").unread_count()
    }

    /// Mark one alert read: optimistic local flip, then the authoritative
    /// write. Rolled back if the write fails or is rejected.
    pub async fn mark_read(&self, alert_id: i64) -> Result<(), ApiError> {
        let prior = self
            .buffer
            .lock()
            .expect("alert buffer poisoned")
            .set_read(alert_id, true);

        let result = self.api.mark_alert_read(alert_id, self.owner_id).await;
        let ok = match result {
            Ok(true) => return Ok(()),
            Ok(false) => Err(ApiError::Rejected {
                endpoint: format!("/alerts/{alert_id}/read"),
            }),
            Err(e) => Err(e),
        };

        // Only undo a flip we actually made.
        if prior == Some(false) {
            warn!(alert_id, "mark-read failed, rolling back local flag");
            self.buffer
                .lock()
                .expect("alert buffer poisoned")
                .set_read(alert_id, false);
        }
        ok
    }

    /// Mark every alert read: snapshot, flip all, one batch write. On
    /// failure the whole buffer is restored from the snapshot -- the
    /// operation is a single transaction from the caller's perspective.
    pub async fn mark_all_read(&self) -> Result<u64, ApiError> {
        let snapshot = {
            let mut buffer = self.buffer.lock().expect("alert buffer poisoned");
            let snapshot = buffer.snapshot();
            buffer.mark_all_read();
            snapshot
        };

        match self.api.mark_all_read(self.owner_id).await {
            Ok(updated) => Ok(updated),
            Err(e) => {
                warn!("mark-all-read failed, restoring buffer snapshot");
                self.buffer
                    .lock()
                    .expect("alert buffer poisoned")
                    .restore(snapshot);
                Err(e)
            }
        }
    }

    /// Server-side alert history, paged.
    pub async fn history(
        &self,
        limit: u32,
        offset: u32,
        unread_only: bool,
    ) -> Result<AlertListResponse, ApiError> {
        self.api
            .alert_history(self.owner_id, limit, offset, unread_only)
            .await
    }

    /// Server-side unread count (the local one is `unread_count`).
    pub async fn remote_unread_count(&self) -> Result<u64, ApiError> {
        self.api.unread_count(self.owner_id).await
    }
}
