//! Client connection management
//!
//! Handles the per-connection session and its request loop.

pub mod handler;
pub mod session;

pub use handler::handle_client;
pub use session::ConnectionSession;
