//! Background Tasks Module
//!
//! Periodic work that runs alongside the HTTP server.
//!
//! # Tasks
//! - Cache sweep: drops expired search results, endpoint bodies and metrics

mod cleanup;

pub use cleanup::spawn_cleanup_task;
