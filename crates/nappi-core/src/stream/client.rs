//! Live alert stream client.
//!
//! Maintains one SSE connection per signed-in owner and feeds the shared
//! alert buffer. Disconnects are recovered with a fixed-delay reconnect;
//! the UI only ever observes the connection state, never a hard error.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::StreamExt;
use reqwest::header;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;

use crate::alerts::{AlertBuffer, AlertRecord};
use crate::error::StreamError;

use super::sse::{SseDecoder, SseFrame};

/// Fixed delay between reconnect attempts. Deliberately not exponential --
/// the server is local-network and a stale client is worse than a chatty
/// one.
pub const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Name of the liveness event the server sends independent of the
/// transport-level open.
const CONNECTED_EVENT: &str = "connected";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

/// Caller-supplied "new alert" callback. Held in a swappable slot so it can
/// be replaced without tearing down the connection.
pub type AlertHandler = Box<dyn FnMut(&AlertRecord) + Send>;

/// Everything the connection task needs, cloned out of the client so the
/// task owns its handles.
struct StreamContext {
    http: reqwest::Client,
    url: Url,
    reconnect_delay: Duration,
    buffer: Arc<Mutex<AlertBuffer>>,
    latest: Arc<Mutex<Option<AlertRecord>>>,
    handler: Arc<Mutex<Option<AlertHandler>>>,
    state: watch::Sender<ConnectionState>,
}

/// One live streaming connection per client instance.
///
/// `connect` must be called from within a tokio runtime; the connection
/// loop runs on a spawned task until `disconnect` (or drop) aborts it.
pub struct AlertStreamClient {
    base_url: Url,
    http: reqwest::Client,
    reconnect_delay: Duration,
    buffer: Arc<Mutex<AlertBuffer>>,
    latest: Arc<Mutex<Option<AlertRecord>>>,
    handler: Arc<Mutex<Option<AlertHandler>>>,
    state_tx: watch::Sender<ConnectionState>,
    state_rx: watch::Receiver<ConnectionState>,
    task: Option<JoinHandle<()>>,
}

impl AlertStreamClient {
    pub fn new(base_url: &str) -> Result<Self, StreamError> {
        Self::with_reconnect_delay(base_url, RECONNECT_DELAY)
    }

    /// The delay is injectable for tests; production callers use `new`.
    pub fn with_reconnect_delay(
        base_url: &str,
        reconnect_delay: Duration,
    ) -> Result<Self, StreamError> {
        let base_url = Url::parse(base_url)?;
        // No request timeout: the stream response stays open indefinitely.
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        let (state_tx, state_rx) = watch::channel(ConnectionState::Disconnected);
        Ok(Self {
            base_url,
            http,
            reconnect_delay,
            buffer: Arc::new(Mutex::new(AlertBuffer::new())),
            latest: Arc::new(Mutex::new(None)),
            handler: Arc::new(Mutex::new(None)),
            state_tx,
            state_rx,
            task: None,
        })
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> ConnectionState {
        *self.state_rx.borrow()
    }

    /// Watch channel for connectivity; the UI renders `connected: false`
    /// during gaps.
    pub fn state_watch(&self) -> watch::Receiver<ConnectionState> {
        self.state_rx.clone()
    }

    /// Shared buffer filled by this connection.
    pub fn buffer(&self) -> Arc<Mutex<AlertBuffer>> {
        Arc::clone(&self.buffer)
    }

    /// The most recently received alert, surviving reconnects.
    pub fn latest(&self) -> Option<AlertRecord> {
        self.latest.lock().expect("latest alert poisoned").clone()
    }

    // ── Handler slot ─────────────────────────────────────────────────

    /// Install or replace the "new alert" callback without resubscribing.
    pub fn set_handler(&self, handler: impl FnMut(&AlertRecord) + Send + 'static) {
        *self.handler.lock().expect("handler slot poisoned") = Some(Box::new(handler));
    }

    pub fn clear_handler(&self) {
        *self.handler.lock().expect("handler slot poisoned") = None;
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Open the stream for an owner. Idempotent: any existing connection
    /// (and its pending reconnect timer) is torn down first, so there is
    /// never more than one live connection per instance.
    pub fn connect(&mut self, owner_id: i64) {
        self.disconnect();

        let mut url = match self.base_url.join("/alerts/stream") {
            Ok(url) => url,
            Err(e) => {
                // Unreachable with a parsed base URL; keep the state honest.
                warn!(error = %e, "invalid stream URL, staying disconnected");
                return;
            }
        };
        url.query_pairs_mut()
            .append_pair("user_id", &owner_id.to_string());

        let ctx = StreamContext {
            http: self.http.clone(),
            url,
            reconnect_delay: self.reconnect_delay,
            buffer: Arc::clone(&self.buffer),
            latest: Arc::clone(&self.latest),
            handler: Arc::clone(&self.handler),
            state: self.state_tx.clone(),
        };
        self.task = Some(tokio::spawn(run_loop(ctx)));
    }

    /// Close the connection and cancel a pending reconnect, if any. No
    /// callbacks fire afterward. Must be called on owner change or
    /// shutdown.
    pub fn disconnect(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        self.state_tx.send_replace(ConnectionState::Disconnected);
    }
}

impl Drop for AlertStreamClient {
    fn drop(&mut self) {
        self.disconnect();
    }
}

/// Connection loop: connect, drain frames in arrival order, then wait the
/// fixed delay and try again. Aborting the task cancels whichever await is
/// pending -- the body read or the reconnect sleep.
async fn run_loop(ctx: StreamContext) {
    loop {
        ctx.state.send_replace(ConnectionState::Connecting);

        match ctx
            .http
            .get(ctx.url.clone())
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await
        {
            Ok(resp) if resp.status().is_success() => {
                info!("alert stream connected");
                ctx.state.send_replace(ConnectionState::Connected);

                let mut decoder = SseDecoder::new();
                let mut body = resp.bytes_stream();
                while let Some(chunk) = body.next().await {
                    match chunk {
                        Ok(bytes) => {
                            for frame in decoder.feed(&bytes) {
                                handle_frame(&ctx, frame);
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "alert stream read error");
                            break;
                        }
                    }
                }
                info!("alert stream closed");
            }
            Ok(resp) => {
                warn!(status = resp.status().as_u16(), "alert stream rejected");
            }
            Err(e) => {
                warn!(error = %e, "alert stream connect failed");
            }
        }

        ctx.state.send_replace(ConnectionState::Disconnected);
        tokio::time::sleep(ctx.reconnect_delay).await;
        debug!("attempting stream reconnect");
    }
}

/// Process one frame: liveness events re-assert Connected; unnamed data
/// frames are parsed as alerts. Frames carrying any other event name are
/// dropped, as are parse failures -- the connection stays up and no
/// callback fires.
fn handle_frame(ctx: &StreamContext, frame: SseFrame) {
    match frame.event.as_deref() {
        Some(CONNECTED_EVENT) => {
            debug!("liveness event received");
            ctx.state.send_replace(ConnectionState::Connected);
            return;
        }
        Some(name) => {
            debug!(event = name, "ignoring unrecognized event");
            return;
        }
        None => {}
    }
    if frame.data.is_empty() {
        return;
    }

    match serde_json::from_str::<AlertRecord>(&frame.data) {
        Ok(alert) => {
            debug!(alert_id = alert.id, "alert received");
            // Callback first, then buffer, then the latest pointer.
            if let Some(handler) = ctx.handler.lock().expect("handler slot poisoned").as_mut() {
                handler(&alert);
            }
            ctx.buffer
                .lock()
                .expect("alert buffer poisoned")
                .push_front(alert.clone());
            *ctx.latest.lock().expect("latest alert poisoned") = Some(alert);
        }
        Err(e) => {
            warn!(error = %e, "dropping malformed alert frame");
        }
    }
}
