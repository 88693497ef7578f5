//! File system storage management
//!
//! Handles path mapping and the filesystem operations behind each request.

pub mod operations;
pub mod results;
pub mod validation;

pub use operations::{create_folder, delete_entry, list_directory, rename_entry, search_files};
pub use results::{FileEntry, RenameResult};
pub use validation::{PathMapper, VirtualPath};
