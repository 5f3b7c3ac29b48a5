//! Server-Sent Events alert stream: wire decoder and the reconnecting
//! client that feeds the alert buffer.

mod client;
mod sse;

pub use client::{AlertHandler, AlertStreamClient, ConnectionState, RECONNECT_DELAY};
pub use sse::{SseDecoder, SseFrame};
