//! Shared `tracing` subscriber setup for the WebPulse binaries.

mod tracing;

pub use self::tracing::{LogFormat, init as init_tracing, init_with as init_tracing_with};
