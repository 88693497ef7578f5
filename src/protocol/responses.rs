//! Response encoding
//!
//! Every request produces exactly one of these, encoded as a JSON text frame.

use serde::Serialize;

use crate::storage::{FileEntry, VirtualPath};

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Response {
    FilesList {
        data: Vec<FileEntry>,
    },
    FolderCreated {
        path: VirtualPath,
    },
    EntryDeleted {
        path: VirtualPath,
    },
    EntryRenamed {
        path: VirtualPath,
        #[serde(rename = "oldPath")]
        old_path: VirtualPath,
    },
    Error {
        message: String,
    },
}

impl Response {
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Response::Error { .. })
    }

    /// Encodes the response as a JSON text frame.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| {
            serde_json::json!({
                "type": "ERROR",
                "message": format!("Failed to encode response: {e}"),
            })
            .to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn encoded(response: &Response) -> Value {
        serde_json::from_str(&response.to_json()).unwrap()
    }

    #[test]
    fn test_empty_listing_shape() {
        let response = Response::FilesList { data: vec![] };
        assert_eq!(encoded(&response), json!({"type": "FILES_LIST", "data": []}));
    }

    #[test]
    fn test_path_responses_shape() {
        let path = VirtualPath::parse("/docs/new").unwrap();
        assert_eq!(
            encoded(&Response::FolderCreated { path: path.clone() }),
            json!({"type": "FOLDER_CREATED", "path": "/docs/new"})
        );
        assert_eq!(
            encoded(&Response::EntryDeleted { path: path.clone() }),
            json!({"type": "ENTRY_DELETED", "path": "/docs/new"})
        );
        assert_eq!(
            encoded(&Response::EntryRenamed {
                path,
                old_path: VirtualPath::parse("/docs/old").unwrap(),
            }),
            json!({"type": "ENTRY_RENAMED", "path": "/docs/new", "oldPath": "/docs/old"})
        );
    }

    #[test]
    fn test_error_shape() {
        let response = Response::error("Unknown request type");
        assert!(response.is_error());
        assert_eq!(
            encoded(&response),
            json!({"type": "ERROR", "message": "Unknown request type"})
        );
    }
}
