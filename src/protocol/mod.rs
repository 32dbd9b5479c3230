//! Wire protocol module.
//!
//! Defines the attendance claim and response types, and message framing for
//! collector connections.
//!
//! ## Wire Format
//!
//! Messages are length-prefixed JSON:
//! ```text
//! [4 bytes: length (big-endian u32)][JSON payload]
//! ```

mod request;
mod response;
mod wire;

pub use request::AttendanceClaim;
pub use response::ReportResponse;
pub use wire::{read_frame, write_frame};
