//! Background Tasks Module
//!
//! Contains background tasks that run periodically during gateway operation.
//!
//! # Tasks
//! - Cache reaper: removes expired cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
