//! Server core functionality
//!
//! Binds the listener, provisions the storage root, and accepts connections.

pub mod core;

pub use core::Server;
