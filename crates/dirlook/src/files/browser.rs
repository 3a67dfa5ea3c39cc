//! Directory listing.
//!
//! A listing reads the immediate children of one directory in a single
//! `read_dir` pass and partitions them into sub-directories and files.

use std::fs;
use std::path::Path;

use crate::error::FsError;

/// A child of a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectoryEntry {
    /// Entry name (not full path).
    pub name: String,
    /// Whether the entry is a directory.
    pub is_directory: bool,
}

/// The immediate children of a directory, split by type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub directories: Vec<DirectoryEntry>,
    pub files: Vec<DirectoryEntry>,
}

impl Listing {
    /// Iterate over all entries, directories first.
    pub fn entries(&self) -> impl Iterator<Item = &DirectoryEntry> {
        self.directories.iter().chain(self.files.iter())
    }

    pub fn len(&self) -> usize {
        self.directories.len() + self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }

    fn push(&mut self, entry: DirectoryEntry) {
        if entry.is_directory {
            self.directories.push(entry);
        } else {
            self.files.push(entry);
        }
    }
}

/// Options controlling what a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOptions {
    /// Include entries whose name starts with '.'.
    pub show_hidden: bool,
    /// Sort directories and files by name. Otherwise filesystem order is kept.
    pub sort_entries: bool,
}

impl Default for ListingOptions {
    fn default() -> Self {
        Self {
            show_hidden: true,
            sort_entries: false,
        }
    }
}

/// Lists directory children.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLister {
    options: ListingOptions,
}

impl DirectoryLister {
    pub fn new(options: ListingOptions) -> Self {
        Self { options }
    }

    /// List the immediate children of `path`.
    ///
    /// Either the whole directory is read or an error is returned; an entry
    /// that cannot be read fails the listing instead of being dropped.
    pub fn list_children(&self, path: &Path) -> Result<Listing, FsError> {
        let metadata = fs::metadata(path).map_err(|e| FsError::from_io(e, path))?;
        if !metadata.is_dir() {
            return Err(FsError::NotADirectory(path.to_path_buf()));
        }

        let entries = fs::read_dir(path).map_err(|e| FsError::from_io(e, path))?;

        let mut listing = Listing::default();
        for entry_result in entries {
            let entry = entry_result.map_err(|e| FsError::from_io(e, path))?;
            let name = entry.file_name().to_string_lossy().to_string();

            if !self.options.show_hidden && name.starts_with('.') {
                continue;
            }

            // Follow symlinks like the OS does; a dangling link falls back to
            // the link's own type and lands among the files.
            let is_directory = match fs::metadata(entry.path()) {
                Ok(m) => m.is_dir(),
                Err(_) => entry
                    .file_type()
                    .map_err(|e| FsError::from_io(e, &entry.path()))?
                    .is_dir(),
            };

            listing.push(DirectoryEntry { name, is_directory });
        }

        if self.options.sort_entries {
            listing.directories.sort_by_key(|e| e.name.to_lowercase());
            listing.files.sort_by_key(|e| e.name.to_lowercase());
        }

        Ok(listing)
    }
}
