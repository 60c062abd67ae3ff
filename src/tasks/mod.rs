//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Health monitor: logs the directory's aggregate health at a fixed interval

mod health;

pub use health::spawn_health_monitor;
