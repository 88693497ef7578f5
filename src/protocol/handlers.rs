//! Request handlers module for the filesystem server.
//!
//! This module routes decoded requests to the storage operations and shapes
//! their results into responses. A single [`Dispatcher`] is built at startup
//! and shared read-only by every connection.

use log::debug;

use crate::error::handlers::{error_to_message, handle_error};
use crate::error::{RequestError, ServerError};
use crate::protocol::requests::{Request, parse_request};
use crate::protocol::responses::Response;
use crate::storage::{
    PathMapper, create_folder, delete_entry, list_directory, rename_entry, search_files,
};

/// Routes requests to storage operations under one storage root.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    mapper: PathMapper,
}

impl Dispatcher {
    pub fn new(mapper: PathMapper) -> Self {
        Self { mapper }
    }

    /// Handles one raw message and returns the single response for it.
    ///
    /// # Arguments
    ///
    /// * `session_id` - Identifier of the requesting session, used in logs.
    /// * `raw` - The text frame received from the client.
    ///
    /// # Returns
    ///
    /// * `Response` - A success response, or `ERROR` for any failure.
    pub fn handle(&self, session_id: &str, raw: &str) -> Response {
        let result = parse_request(raw)
            .map_err(ServerError::from)
            .and_then(|request| {
                debug!("[{}] dispatching {}", session_id, request.kind().as_str());
                self.dispatch(request)
            });

        match result {
            Ok(response) => response,
            Err(e) => {
                handle_error(session_id, &e);
                Response::error(error_to_message(&e))
            }
        }
    }

    /// Dispatches a decoded request to its handler.
    pub fn dispatch(&self, request: Request) -> Result<Response, ServerError> {
        match request {
            Request::ListFiles { path } => self.handle_list_files(&path),
            Request::CreateFolder { path, name } => self.handle_create_folder(&path, &name),
            Request::Delete { path } => self.handle_delete(&path),
            Request::Rename { path, new_name } => self.handle_rename(&path, &new_name),
            Request::SearchFiles { path, term } => self.handle_search_files(&path, &term),
        }
    }

    fn handle_list_files(&self, path: &str) -> Result<Response, ServerError> {
        let dir = self.mapper.resolve(path)?;
        let data = list_directory(&self.mapper, &dir)?;
        Ok(Response::FilesList { data })
    }

    fn handle_create_folder(&self, path: &str, name: &str) -> Result<Response, ServerError> {
        let parent = self.mapper.resolve(path)?;
        let path = create_folder(&self.mapper, &parent, name)?;
        Ok(Response::FolderCreated { path })
    }

    fn handle_delete(&self, path: &str) -> Result<Response, ServerError> {
        let target = self.mapper.resolve(path)?;
        let path = delete_entry(&self.mapper, &target)?;
        Ok(Response::EntryDeleted { path })
    }

    fn handle_rename(&self, path: &str, new_name: &str) -> Result<Response, ServerError> {
        let source = self.mapper.resolve(path)?;
        let renamed = rename_entry(&self.mapper, &source, new_name)?;
        Ok(Response::EntryRenamed {
            path: renamed.new_path,
            old_path: renamed.old_path,
        })
    }

    fn handle_search_files(&self, path: &str, term: &str) -> Result<Response, ServerError> {
        if term.trim().is_empty() {
            return Err(RequestError::Malformed("search term must not be empty".into()).into());
        }
        let dir = self.mapper.resolve(path)?;
        let data = search_files(&self.mapper, &dir, term)?;
        Ok(Response::FilesList { data })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::fs;
    use tempfile::TempDir;

    fn setup() -> (TempDir, Dispatcher) {
        let dir = TempDir::new().unwrap();
        let dispatcher = Dispatcher::new(PathMapper::new(dir.path()));
        (dir, dispatcher)
    }

    fn send(dispatcher: &Dispatcher, request: Value) -> Value {
        let response = dispatcher.handle("test", &request.to_string());
        serde_json::from_str(&response.to_json()).unwrap()
    }

    fn listed_paths(response: &Value) -> Vec<String> {
        let mut paths: Vec<String> = response["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["path"].as_str().unwrap().to_string())
            .collect();
        paths.sort();
        paths
    }

    #[test]
    fn test_list_empty_root() {
        let (_dir, dispatcher) = setup();
        let response = send(&dispatcher, json!({"type": "LIST_FILES", "path": "/"}));
        assert_eq!(response, json!({"type": "FILES_LIST", "data": []}));
    }

    #[test]
    fn test_list_file_and_folder() {
        let (dir, dispatcher) = setup();
        fs::write(dir.path().join("a.txt"), b"0123456789").unwrap();
        fs::create_dir(dir.path().join("b")).unwrap();

        let response = send(&dispatcher, json!({"type": "LIST_FILES", "path": "/"}));
        assert_eq!(response["type"], "FILES_LIST");

        let data = response["data"].as_array().unwrap();
        let a = data.iter().find(|e| e["name"] == "a.txt").unwrap();
        let b = data.iter().find(|e| e["name"] == "b").unwrap();
        assert_eq!(a["path"], "/a.txt");
        assert_eq!(a["isDirectory"], false);
        assert_eq!(a["size"], 10);
        assert_eq!(b["path"], "/b");
        assert_eq!(b["isDirectory"], true);

        let modified = a["modified"].as_str().unwrap();
        assert_eq!(modified.len(), "YYYY-MM-DDTHH:MM:SSZ".len());
        assert!(modified.ends_with('Z'));
    }

    #[test]
    fn test_create_then_list() {
        let (_dir, dispatcher) = setup();
        let created = send(
            &dispatcher,
            json!({"type": "CREATE_FOLDER", "path": "/", "name": "new"}),
        );
        assert_eq!(created, json!({"type": "FOLDER_CREATED", "path": "/new"}));

        let listed = send(&dispatcher, json!({"type": "LIST_FILES", "path": "/"}));
        let entry = &listed["data"][0];
        assert_eq!(entry["path"], "/new");
        assert_eq!(entry["isDirectory"], true);
    }

    #[test]
    fn test_create_nested_uses_normalized_path() {
        let (dir, dispatcher) = setup();
        fs::create_dir(dir.path().join("docs")).unwrap();

        let created = send(
            &dispatcher,
            json!({"type": "CREATE_FOLDER", "path": "docs//./", "name": "reports"}),
        );
        assert_eq!(created["path"], "/docs/reports");
    }

    #[test]
    fn test_create_existing_fails() {
        let (dir, dispatcher) = setup();
        fs::create_dir(dir.path().join("new")).unwrap();
        fs::write(dir.path().join("new/keep.txt"), b"keep").unwrap();

        let response = send(
            &dispatcher,
            json!({"type": "CREATE_FOLDER", "path": "/", "name": "new"}),
        );
        assert_eq!(response["type"], "ERROR");
        assert_eq!(response["message"], "Already exists: /new");
        assert!(dir.path().join("new/keep.txt").is_file());
    }

    #[test]
    fn test_delete_non_empty_directory_fails() {
        let (dir, dispatcher) = setup();
        fs::create_dir(dir.path().join("full")).unwrap();
        fs::write(dir.path().join("full/a.txt"), b"a").unwrap();

        let response = send(&dispatcher, json!({"type": "DELETE", "path": "/full"}));
        assert_eq!(
            response,
            json!({"type": "ERROR", "message": "Directory not empty: /full"})
        );
        assert_eq!(fs::read(dir.path().join("full/a.txt")).unwrap(), b"a");
    }

    #[test]
    fn test_delete_file() {
        let (dir, dispatcher) = setup();
        fs::write(dir.path().join("gone.txt"), b"").unwrap();

        let response = send(&dispatcher, json!({"type": "DELETE", "path": "/gone.txt"}));
        assert_eq!(response, json!({"type": "ENTRY_DELETED", "path": "/gone.txt"}));
        assert!(!dir.path().join("gone.txt").exists());
    }

    #[test]
    fn test_rename_then_list() {
        let (dir, dispatcher) = setup();
        fs::create_dir(dir.path().join("old")).unwrap();

        let response = send(
            &dispatcher,
            json!({"type": "RENAME", "path": "/old", "newName": "renamed"}),
        );
        assert_eq!(
            response,
            json!({"type": "ENTRY_RENAMED", "path": "/renamed", "oldPath": "/old"})
        );

        let listed = send(&dispatcher, json!({"type": "LIST_FILES", "path": "/"}));
        assert_eq!(listed_paths(&listed), vec!["/renamed".to_string()]);
    }

    #[test]
    fn test_escape_is_rejected_without_side_effects() {
        let outer = TempDir::new().unwrap();
        let root = outer.path().join("storage");
        fs::create_dir(&root).unwrap();
        let dispatcher = Dispatcher::new(PathMapper::new(&root));

        let response = send(
            &dispatcher,
            json!({"type": "CREATE_FOLDER", "path": "/../", "name": "evil"}),
        );
        assert_eq!(response["type"], "ERROR");
        assert!(
            response["message"]
                .as_str()
                .unwrap()
                .starts_with("Path escapes storage root")
        );
        assert!(!outer.path().join("evil").exists());

        let response = send(
            &dispatcher,
            json!({"type": "CREATE_FOLDER", "path": "/", "name": ".."}),
        );
        assert_eq!(response["type"], "ERROR");

        let response = send(&dispatcher, json!({"type": "LIST_FILES", "path": "/a/../../"}));
        assert_eq!(response["type"], "ERROR");
    }

    #[test]
    fn test_unknown_type() {
        let (dir, dispatcher) = setup();
        let response = send(&dispatcher, json!({"type": "COPY", "path": "/"}));
        assert_eq!(
            response,
            json!({"type": "ERROR", "message": "Unknown request type"})
        );
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_malformed_request() {
        let (_dir, dispatcher) = setup();
        let response = dispatcher.handle("test", "{not json");
        assert!(response.is_error());

        let response = send(&dispatcher, json!({"type": "CREATE_FOLDER", "path": "/"}));
        assert_eq!(response["type"], "ERROR");
        assert!(
            response["message"]
                .as_str()
                .unwrap()
                .contains("missing field `name`")
        );
    }

    #[test]
    fn test_search() {
        let (dir, dispatcher) = setup();
        fs::create_dir_all(dir.path().join("music/rock")).unwrap();
        fs::write(dir.path().join("music/rock/song.MP3"), b"").unwrap();
        fs::write(dir.path().join("notes.txt"), b"").unwrap();

        let response = send(&dispatcher, json!({"type": "SEARCH_FILES", "term": "mp3"}));
        assert_eq!(response["type"], "FILES_LIST");
        assert_eq!(
            listed_paths(&response),
            vec!["/music/rock/song.MP3".to_string()]
        );

        let response = send(&dispatcher, json!({"type": "SEARCH_FILES", "term": "  "}));
        assert_eq!(response["type"], "ERROR");
    }
}
