//! Wire protocol implementation
//!
//! Handles request decoding, dispatch, and response encoding.

pub mod handlers;
pub mod requests;
pub mod responses;

pub use handlers::Dispatcher;
pub use requests::{Request, RequestKind, parse_request};
pub use responses::Response;
