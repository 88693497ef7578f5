//! Request decoding
//!
//! Defines the typed request model and decodes incoming text frames into it.

use serde::Deserialize;
use serde_json::Value;

use crate::error::RequestError;

/// Request discriminator carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestKind {
    ListFiles,
    CreateFolder,
    Delete,
    Rename,
    SearchFiles,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::ListFiles => "LIST_FILES",
            RequestKind::CreateFolder => "CREATE_FOLDER",
            RequestKind::Delete => "DELETE",
            RequestKind::Rename => "RENAME",
            RequestKind::SearchFiles => "SEARCH_FILES",
        }
    }
}

/// A client request. Paths are raw virtual paths, not yet normalized.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Request {
    ListFiles {
        path: String,
    },
    CreateFolder {
        path: String,
        name: String,
    },
    Delete {
        path: String,
    },
    Rename {
        path: String,
        #[serde(rename = "newName", alias = "name")]
        new_name: String,
    },
    SearchFiles {
        #[serde(default = "root_path")]
        path: String,
        term: String,
    },
}

fn root_path() -> String {
    "/".to_string()
}

impl Request {
    pub fn kind(&self) -> RequestKind {
        match self {
            Request::ListFiles { .. } => RequestKind::ListFiles,
            Request::CreateFolder { .. } => RequestKind::CreateFolder,
            Request::Delete { .. } => RequestKind::Delete,
            Request::Rename { .. } => RequestKind::Rename,
            Request::SearchFiles { .. } => RequestKind::SearchFiles,
        }
    }
}

/// Parses a raw text frame into a [`Request`].
///
/// An unrecognized `type` is reported separately from a structurally
/// malformed message so the two can be told apart in responses and logs.
pub fn parse_request(raw: &str) -> Result<Request, RequestError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| RequestError::Malformed(e.to_string()))?;

    let Some(object) = value.as_object() else {
        return Err(RequestError::Malformed("expected a JSON object".into()));
    };

    let type_value = object
        .get("type")
        .ok_or_else(|| RequestError::Malformed("missing field `type`".into()))?;
    let type_name = type_value
        .as_str()
        .ok_or_else(|| RequestError::Malformed("field `type` must be a string".into()))?;

    if RequestKind::deserialize(type_value).is_err() {
        return Err(RequestError::UnknownType(type_name.to_string()));
    }

    Request::deserialize(value).map_err(|e| RequestError::Malformed(e.to_string()))
}
