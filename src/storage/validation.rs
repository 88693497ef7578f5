//! Path validation
//!
//! Maps client-visible virtual paths onto the storage root and back. Every
//! physical path the server touches is built here from normalized segments,
//! so nothing outside the storage root can be named by a request.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Serialize, Serializer};

use crate::error::PathError;

/// A normalized, slash-rooted path as seen by clients.
///
/// Never contains `.`, `..` or empty segments. The root is `/`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VirtualPath(String);

impl VirtualPath {
    pub fn root() -> Self {
        VirtualPath("/".to_string())
    }

    /// Normalizes a raw client path.
    ///
    /// Collapses repeated slashes, drops `.` segments and resolves `..`
    /// against the preceding segment. A `..` with nothing left to pop would
    /// leave the storage root and is rejected.
    pub fn parse(raw: &str) -> Result<Self, PathError> {
        if raw.contains('\0') {
            return Err(PathError::InvalidPath(raw.to_string()));
        }

        let mut segments: Vec<&str> = Vec::new();
        for segment in raw.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    if segments.pop().is_none() {
                        return Err(PathError::Escape(raw.to_string()));
                    }
                }
                other => {
                    if !is_single_component(other) {
                        return Err(PathError::Escape(raw.to_string()));
                    }
                    segments.push(other);
                }
            }
        }

        Ok(Self::from_segments(segments))
    }

    fn from_segments<'a>(segments: impl IntoIterator<Item = &'a str>) -> Self {
        let mut path = String::new();
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        if path.is_empty() {
            path.push('/');
        }
        VirtualPath(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "/"
    }

    /// Segments below the root, in order.
    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/').filter(|s| !s.is_empty())
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for VirtualPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Checks that `name` is usable as a single directory entry name.
pub fn validate_name(name: &str) -> Result<(), PathError> {
    if name.is_empty() {
        return Err(PathError::InvalidName(name.to_string()));
    }
    if name.contains('\0') {
        return Err(PathError::InvalidName(name.to_string()));
    }
    if name == "." || name == ".." || name.contains('/') || !is_single_component(name) {
        return Err(PathError::Escape(name.to_string()));
    }
    Ok(())
}

/// True when the platform parses `segment` as exactly one normal component.
fn is_single_component(segment: &str) -> bool {
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Translates between virtual paths and physical paths under a storage root.
#[derive(Debug, Clone)]
pub struct PathMapper {
    root: PathBuf,
}

impl PathMapper {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a raw client path to its physical location.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, PathError> {
        let virtual_path = VirtualPath::parse(raw)?;
        Ok(self.to_physical(&virtual_path))
    }

    /// Joins a validated virtual path onto the storage root.
    pub fn to_physical(&self, virtual_path: &VirtualPath) -> PathBuf {
        let mut physical = self.root.clone();
        physical.extend(virtual_path.segments());
        physical
    }

    /// Resolves `name` as a direct child of the physical directory `parent`.
    pub fn join_name(&self, parent: &Path, name: &str) -> Result<PathBuf, PathError> {
        validate_name(name)?;
        Ok(parent.join(name))
    }

    /// Strips the storage root from a physical path.
    ///
    /// Responses build every path through here so clients never see
    /// physical locations.
    pub fn to_virtual(&self, physical: &Path) -> Result<VirtualPath, PathError> {
        let escape = || PathError::Escape(physical.to_string_lossy().into_owned());

        let relative = physical.strip_prefix(&self.root).map_err(|_| escape())?;

        let mut segments = Vec::new();
        for component in relative.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_str().ok_or_else(escape)?),
                Component::CurDir => continue,
                _ => return Err(escape()),
            }
        }

        Ok(VirtualPath::from_segments(segments))
    }
}
