//! Alert data model: wire records, the bounded client-side buffer, and the
//! inbox that writes read-state through to the server.

mod buffer;
mod inbox;
mod record;

pub use buffer::{AlertBuffer, ALERT_BUFFER_CAPACITY};
pub use inbox::AlertInbox;
pub use record::{AlertKind, AlertRecord, Severity};
