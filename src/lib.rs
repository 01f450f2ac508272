pub mod config;
pub mod serial;
pub mod session;
pub mod signal;
pub mod telemetry;
pub mod timer;
