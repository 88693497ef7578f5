//! Storage operations
//!
//! Handles the filesystem actions behind each request: list, create folder,
//! delete, rename and search. All paths passed in have already been resolved
//! by the [`PathMapper`]; results carry virtual paths rebuilt through it.

use log::{debug, info, warn};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

use crate::error::StorageError;
use crate::storage::results::{FileEntry, RenameResult};
use crate::storage::validation::{PathMapper, VirtualPath};

/// Lists the contents of a directory.
///
/// Entries that vanish or cannot be stat'ed between enumeration and stat are
/// skipped. Order is whatever the filesystem yields.
pub fn list_directory(mapper: &PathMapper, dir: &Path) -> Result<Vec<FileEntry>, StorageError> {
    let virtual_dir = mapper.to_virtual(dir)?;

    let entries = fs::read_dir(dir).map_err(|e| StorageError::from_io(e, virtual_dir.as_str()))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry in {}: {}", virtual_dir, e);
                continue;
            }
        };

        let name = entry.file_name().to_string_lossy().into_owned();
        if name == "." || name == ".." {
            continue;
        }

        let entry_path = entry.path();
        let metadata = match fs::metadata(&entry_path) {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Skipping {} in {}: {}", name, virtual_dir, e);
                continue;
            }
        };

        // Names that are not valid UTF-8 have no virtual path
        let virtual_path = match mapper.to_virtual(&entry_path) {
            Ok(path) => path,
            Err(e) => {
                warn!("Skipping {} in {}: {}", name, virtual_dir, e);
                continue;
            }
        };

        files.push(FileEntry::from_metadata(name, virtual_path, &metadata));
    }

    info!("Listed directory {} - {} entries", virtual_dir, files.len());

    Ok(files)
}

/// Creates a single directory `name` under `parent`.
///
/// Missing intermediate directories are not created.
pub fn create_folder(
    mapper: &PathMapper,
    parent: &Path,
    name: &str,
) -> Result<VirtualPath, StorageError> {
    let folder = mapper.join_name(parent, name)?;
    let virtual_folder = mapper.to_virtual(&folder)?;

    let mut builder = fs::DirBuilder::new();
    builder.recursive(false);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o755);
    }

    builder.create(&folder).map_err(|e| {
        // mkdir reports ENOENT for a missing parent, and ENOTDIR when the
        // parent is a file; both belong to the parent, not the new folder.
        match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::NotADirectory => {
                let virtual_parent = mapper
                    .to_virtual(parent)
                    .map(|p| p.to_string())
                    .unwrap_or_else(|_| virtual_folder.to_string());
                StorageError::from_io(e, &virtual_parent)
            }
            _ => StorageError::from_io(e, virtual_folder.as_str()),
        }
    })?;

    info!("Created folder {}", virtual_folder);

    Ok(virtual_folder)
}

/// Deletes a file, or a directory if it is empty.
pub fn delete_entry(mapper: &PathMapper, target: &Path) -> Result<VirtualPath, StorageError> {
    let virtual_target = mapper.to_virtual(target)?;
    if virtual_target.is_root() {
        return Err(StorageError::PermissionDenied(virtual_target.to_string()));
    }

    let metadata = fs::symlink_metadata(target)
        .map_err(|e| StorageError::from_io(e, virtual_target.as_str()))?;

    let removed = if metadata.is_dir() {
        fs::remove_dir(target)
    } else {
        fs::remove_file(target)
    };
    removed.map_err(|e| StorageError::from_io(e, virtual_target.as_str()))?;

    info!(
        "Deleted {} {}",
        if metadata.is_dir() { "directory" } else { "file" },
        virtual_target
    );

    Ok(virtual_target)
}

/// Renames an entry within its parent directory.
pub fn rename_entry(
    mapper: &PathMapper,
    source: &Path,
    new_name: &str,
) -> Result<RenameResult, StorageError> {
    let old_path = mapper.to_virtual(source)?;
    if old_path.is_root() {
        return Err(StorageError::PermissionDenied(old_path.to_string()));
    }

    let parent = source
        .parent()
        .ok_or_else(|| StorageError::PermissionDenied(old_path.to_string()))?;
    let destination = mapper.join_name(parent, new_name)?;
    let new_path = mapper.to_virtual(&destination)?;

    fs::symlink_metadata(source).map_err(|e| StorageError::from_io(e, old_path.as_str()))?;

    // rename(2) silently replaces an existing file, so check first. A
    // concurrent creation between the check and the rename is not guarded.
    if fs::symlink_metadata(&destination).is_ok() {
        return Err(StorageError::AlreadyExists(new_path.to_string()));
    }

    fs::rename(source, &destination).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StorageError::NotFound(old_path.to_string()),
        _ => StorageError::from_io(e, new_path.as_str()),
    })?;

    info!("Renamed {} to {}", old_path, new_path);

    Ok(RenameResult { old_path, new_path })
}

/// Recursively searches `dir` for files whose name contains `term`,
/// ignoring case. Directories are walked but never returned.
pub fn search_files(
    mapper: &PathMapper,
    dir: &Path,
    term: &str,
) -> Result<Vec<FileEntry>, StorageError> {
    let virtual_dir = mapper.to_virtual(dir)?;

    let metadata = fs::metadata(dir).map_err(|e| StorageError::from_io(e, virtual_dir.as_str()))?;
    if !metadata.is_dir() {
        return Err(StorageError::NotADirectory(virtual_dir.to_string()));
    }

    let needle = term.to_lowercase();
    let mut results = Vec::new();

    for entry in WalkDir::new(dir).min_depth(1).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Search in {} skipped an entry: {}", virtual_dir, e);
                continue;
            }
        };

        if entry.file_type().is_dir() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.to_lowercase().contains(&needle) {
            continue;
        }

        let metadata = match fs::metadata(entry.path()) {
            Ok(metadata) if !metadata.is_dir() => metadata,
            Ok(_) => continue,
            Err(e) => {
                debug!("Skipping {} during search: {}", entry.path().display(), e);
                continue;
            }
        };

        match mapper.to_virtual(entry.path()) {
            Ok(virtual_path) => {
                results.push(FileEntry::from_metadata(name, virtual_path, &metadata))
            }
            Err(e) => warn!("Skipping {} during search: {}", name, e),
        }
    }

    info!(
        "Searched {} for {:?} - {} matches",
        virtual_dir,
        term,
        results.len()
    );

    Ok(results)
}
