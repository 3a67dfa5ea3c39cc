//! Filesystem access for browsing and downloads.
//!
//! This module provides:
//! - Root discovery (drive letters or configured mount points)
//! - Request path resolution with traversal protection
//! - Single-pass directory listing split into directories and files
//! - Chunked file downloads
//!
//! # Security
//!
//! Request remainders are normalized and checked against their root before
//! any filesystem access below the root happens. A remainder that climbs out
//! of its root is rejected with [`FsError::InvalidPath`](crate::error::FsError).

pub mod browser;
pub mod resolver;
pub mod roots;
pub mod transfer;

pub use browser::{DirectoryEntry, DirectoryLister, Listing, ListingOptions};
pub use resolver::{PathResolver, RequestPath, ResolvedPath};
pub use roots::{DriveLetterRoots, MountRoots, Root, RootDiscovery};
pub use transfer::{Download, FileTransfer};
