//! Discovery of the top-level roots a client may browse.
//!
//! A root is addressed by a single URL segment (its `name`) and maps to an
//! absolute filesystem location. Roots are re-probed on every call so that a
//! volume that disappears stops being offered immediately.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{RootStrategy, RootsConfig};

/// A browsable top-level location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Root {
    /// URL segment identifying the root.
    pub name: String,
    /// Absolute filesystem path of the root.
    pub path: PathBuf,
}

impl Root {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Strategy for enumerating the roots of the host filesystem.
///
/// Implementations supply a fixed, ordered candidate universe and a probe;
/// the provided methods never fail as a whole, a candidate whose probe fails
/// is simply left out.
pub trait RootDiscovery: Send + Sync {
    /// Every root this strategy could ever offer, in display order.
    fn candidates(&self) -> Vec<Root>;

    /// Whether `root` currently exists and is accessible.
    fn probe(&self, root: &Root) -> bool;

    /// Whether a request segment names `root`.
    fn matches(&self, root: &Root, name: &str) -> bool {
        root.name == name
    }

    /// The roots that currently exist, in candidate order.
    fn list_roots(&self) -> Vec<Root> {
        self.candidates()
            .into_iter()
            .filter(|root| self.probe(root))
            .collect()
    }

    /// Look up a single root by its request segment.
    fn find_root(&self, name: &str) -> Option<Root> {
        self.candidates()
            .into_iter()
            .find(|root| self.matches(root, name))
            .filter(|root| self.probe(root))
    }
}

/// Drive letters `A:` through `Z:`, as found on volume-letter hosts.
pub struct DriveLetterRoots {
    probe: fn(&Path) -> bool,
}

impl DriveLetterRoots {
    pub fn new() -> Self {
        Self {
            probe: stat_succeeds,
        }
    }

    /// Use a custom existence check instead of a stat call.
    pub fn with_probe(probe: fn(&Path) -> bool) -> Self {
        Self { probe }
    }
}

impl Default for DriveLetterRoots {
    fn default() -> Self {
        Self::new()
    }
}

impl RootDiscovery for DriveLetterRoots {
    fn candidates(&self) -> Vec<Root> {
        ('A'..='Z')
            .map(|letter| Root::new(format!("{letter}:"), format!("{letter}:\\")))
            .collect()
    }

    fn probe(&self, root: &Root) -> bool {
        (self.probe)(&root.path)
    }

    // Drive letters are case-insensitive.
    fn matches(&self, root: &Root, name: &str) -> bool {
        root.name.eq_ignore_ascii_case(name)
    }
}

/// A configured, ordered list of mount points.
pub struct MountRoots {
    mounts: Vec<Root>,
}

impl MountRoots {
    pub fn new(mounts: Vec<Root>) -> Self {
        Self { mounts }
    }
}

impl RootDiscovery for MountRoots {
    fn candidates(&self) -> Vec<Root> {
        self.mounts.clone()
    }

    fn probe(&self, root: &Root) -> bool {
        match fs::metadata(&root.path) {
            Ok(metadata) => metadata.is_dir(),
            Err(e) => {
                debug!("Excluding root {} ({}): {}", root.name, root.path.display(), e);
                false
            }
        }
    }
}

/// Build the discovery strategy selected by the configuration.
pub fn discovery_from_config(config: &RootsConfig) -> Arc<dyn RootDiscovery> {
    match config.strategy {
        RootStrategy::DriveLetters => Arc::new(DriveLetterRoots::new()),
        RootStrategy::Mounts => Arc::new(MountRoots::new(config.mounts.clone())),
    }
}

fn stat_succeeds(path: &Path) -> bool {
    fs::metadata(path).is_ok()
}
