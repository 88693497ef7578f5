//! Error handlers
//!
//! Logs request failures and shapes them into client-facing messages.

use crate::error::types::{ErrorKind, ServerError};
use log::{error, warn};

/// Log a server error along with its kind
pub fn handle_error(session_id: &str, err: &ServerError) {
    match err.kind() {
        ErrorKind::Io => error!("[{}] {:?}: {}", session_id, err.kind(), err),
        kind => warn!("[{}] {:?}: {}", session_id, kind, err),
    }
}

/// Convert error to the message carried by an `ERROR` response
pub fn error_to_message(err: &ServerError) -> String {
    err.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RequestError, StorageError};

    #[test]
    fn test_messages_use_virtual_paths() {
        let err = ServerError::from(StorageError::DirectoryNotEmpty("/docs".into()));
        assert_eq!(error_to_message(&err), "Directory not empty: /docs");

        let err = ServerError::from(RequestError::Malformed("missing field `path`".into()));
        assert_eq!(
            error_to_message(&err),
            "Malformed request: missing field `path`"
        );
    }
}
