//! Mapping of request paths onto the filesystem.
//!
//! The remainder of a request is normalized lexically before it is joined to
//! its root: `.` segments are dropped, `..` pops the previous segment, and any
//! attempt to climb above the root is rejected. The resolved path is then
//! checked to lie under the root before anything touches the filesystem
//! beneath it.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use super::roots::{Root, RootDiscovery};
use crate::error::FsError;

/// A request path as received from the router, already percent-decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestPath {
    /// Name of the root, the first URL segment.
    pub root: String,
    /// Slash-separated path beneath the root.
    pub remainder: String,
}

impl RequestPath {
    pub fn new(root: impl Into<String>, remainder: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            remainder: remainder.into(),
        }
    }

    /// A request for the root itself.
    pub fn root(root: impl Into<String>) -> Self {
        Self::new(root, "")
    }
}

/// A request path mapped onto an absolute filesystem location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub root: Root,
    /// Normalized segments beneath the root.
    pub segments: Vec<String>,
    /// `root.path` joined with `segments`.
    pub absolute: PathBuf,
}

impl ResolvedPath {
    /// The final segment, or the root name for the root itself.
    pub fn file_name(&self) -> &str {
        self.segments
            .last()
            .map(String::as_str)
            .unwrap_or(&self.root.name)
    }
}

/// Resolves request paths against the currently available roots.
#[derive(Clone)]
pub struct PathResolver {
    roots: Arc<dyn RootDiscovery>,
}

impl PathResolver {
    pub fn new(roots: Arc<dyn RootDiscovery>) -> Self {
        Self { roots }
    }

    pub fn roots(&self) -> &dyn RootDiscovery {
        self.roots.as_ref()
    }

    /// Resolve `request` to an absolute path under its root.
    pub fn resolve(&self, request: &RequestPath) -> Result<ResolvedPath, FsError> {
        let root = self
            .roots
            .find_root(&request.root)
            .ok_or_else(|| FsError::UnknownRoot(request.root.clone()))?;

        let segments = normalize_remainder(&request.remainder)?;
        let absolute = segments
            .iter()
            .fold(root.path.clone(), |path, segment| path.join(segment));

        if !absolute.starts_with(&root.path) {
            return Err(FsError::InvalidPath(request.remainder.clone()));
        }

        Ok(ResolvedPath {
            root,
            segments,
            absolute,
        })
    }
}

/// Split a remainder into clean segments that stay beneath the root.
pub fn normalize_remainder(remainder: &str) -> Result<Vec<String>, FsError> {
    let mut segments: Vec<String> = Vec::new();

    for segment in remainder.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    return Err(FsError::InvalidPath(remainder.to_string()));
                }
            }
            _ => {
                if !is_plain_segment(segment) {
                    return Err(FsError::InvalidPath(remainder.to_string()));
                }
                segments.push(segment.to_string());
            }
        }
    }

    Ok(segments)
}

// Exactly one normal component: no platform separators, drive prefixes or
// parent references hidden inside the segment.
fn is_plain_segment(segment: &str) -> bool {
    if segment.contains('\0') {
        return false;
    }
    let mut components = Path::new(segment).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
