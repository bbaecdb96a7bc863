//! Background task management for Surge
//!
//! Holds the handle for the change watcher task.

pub mod handle;

pub use handle::WatcherHandle;
