//! TCP server module.
//!
//! Accepts device connections and drives incoming claims through the
//! verifier.

mod connection;
mod listener;

pub use connection::handle_connection;
pub use listener::{CollectorListener, ConnectionMetrics};
