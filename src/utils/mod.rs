//! Utility functions module
//!
//! Clock abstraction for elapsed-time math and signal handling for shutdown.

pub mod clock;
pub mod signals;

pub use clock::{rounded_minutes_between, Clock, SystemClock};
pub use signals::{shutdown_channel, shutdown_signal};
