//! # dirlook
//!
//! Read-only HTTP browser for the host filesystem.
//!
//! ## Overview
//!
//! dirlook lists the browsable roots of a machine, lets a client walk
//! directories one level at a time through generated links, and streams
//! individual files for download:
//!
//! - **Root discovery**: drive letters or a configured list of mount points
//! - **Directory listing**: one pass per directory, split into directories and files
//! - **Path resolution**: request paths are normalized and confined to their root
//! - **Downloads**: chunked streaming with bounded memory
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    axum Router (web)                     │
//! │   /    /{root}    /{root}/{*path}    /download/...       │
//! ├──────────────────────────────────────────────────────────┤
//! │  ┌──────────────┐  ┌──────────────┐  ┌────────────────┐  │
//! │  │ PathResolver │─▶│ Directory    │─▶│ render (maud)  │  │
//! │  │              │  │ Lister       │  └────────────────┘  │
//! │  │              │─▶│ FileTransfer │─▶ chunked body       │
//! │  └──────┬───────┘  └──────────────┘                      │
//! │         ▼                                                │
//! │  ┌──────────────┐                                        │
//! │  │RootDiscovery │  drive letters | mounts                │
//! │  └──────────────┘                                        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dirlook::{AppState, Config, DirServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load_default()?;
//!     let state = AppState::from_config(&config);
//!
//!     let server = DirServer::bind(config.server.bind_addr, state).await?;
//!     server.run_until(dirlook::shutdown_signal()).await
//! }
//! ```

pub mod config;
pub mod error;
pub mod files;
pub mod web;

pub use config::Config;
pub use error::FsError;

pub use files::{
    DirectoryEntry, DirectoryLister, DriveLetterRoots, FileTransfer, Listing, ListingOptions,
    MountRoots, PathResolver, RequestPath, ResolvedPath, Root, RootDiscovery,
};

pub use web::{router, shutdown_signal, AppState, DirServer};
