//! Error types
//!
//! Defines domain-specific error types for each module of the filesystem server.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

/// Kind of failure surfaced to a client, used for logging and for shaping
/// `ERROR` responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    MalformedRequest,
    PathEscape,
    NotFound,
    AlreadyExists,
    NotADirectory,
    DirectoryNotEmpty,
    PermissionDenied,
    UnknownRequestType,
    Io,
}

/// Path mapper errors
#[derive(Debug, Error)]
pub enum PathError {
    #[error("Path escapes storage root: {0}")]
    Escape(String),
    #[error("Invalid entry name: {0:?}")]
    InvalidName(String),
    #[error("Invalid path: {0:?}")]
    InvalidPath(String),
}

/// Storage module errors
///
/// Paths carried by these variants are always virtual paths so that the
/// `Display` output can be sent to clients as-is.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Not a directory: {0}")]
    NotADirectory(String),
    #[error("Directory not empty: {0}")]
    DirectoryNotEmpty(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
}

impl StorageError {
    /// Classifies an I/O error raised while operating on `path`.
    pub fn from_io(source: io::Error, path: &str) -> Self {
        let path = path.to_string();
        match source.kind() {
            io::ErrorKind::NotFound => StorageError::NotFound(path),
            io::ErrorKind::AlreadyExists => StorageError::AlreadyExists(path),
            io::ErrorKind::NotADirectory => StorageError::NotADirectory(path),
            io::ErrorKind::DirectoryNotEmpty => StorageError::DirectoryNotEmpty(path),
            io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(path),
            _ => StorageError::Io { path, source },
        }
    }
}

/// Request decoding errors
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("Malformed request: {0}")]
    Malformed(String),
    #[error("Unknown request type")]
    UnknownType(String),
}

/// General server error that encompasses all error types
#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Request(#[from] RequestError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("WebSocket error with {peer}: {source}")]
    WebSocket {
        peer: SocketAddr,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<PathError> for ServerError {
    fn from(error: PathError) -> Self {
        ServerError::Storage(StorageError::Path(error))
    }
}

impl ServerError {
    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServerError::Request(RequestError::Malformed(_)) => ErrorKind::MalformedRequest,
            ServerError::Request(RequestError::UnknownType(_)) => ErrorKind::UnknownRequestType,
            ServerError::Storage(e) => e.kind(),
            ServerError::Config(_) | ServerError::WebSocket { .. } | ServerError::Io(_) => {
                ErrorKind::Io
            }
        }
    }
}

impl StorageError {
    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StorageError::NotFound(_) => ErrorKind::NotFound,
            StorageError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            StorageError::NotADirectory(_) => ErrorKind::NotADirectory,
            StorageError::DirectoryNotEmpty(_) => ErrorKind::DirectoryNotEmpty,
            StorageError::PermissionDenied(_) => ErrorKind::PermissionDenied,
            StorageError::Path(PathError::Escape(_)) => ErrorKind::PathEscape,
            StorageError::Path(_) => ErrorKind::MalformedRequest,
            StorageError::Io { .. } => ErrorKind::Io,
        }
    }
}
