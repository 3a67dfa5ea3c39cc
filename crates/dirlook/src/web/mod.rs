//! HTTP surface: routing, rendering and the server lifecycle.

pub mod render;
pub mod routes;
pub mod server;

pub use routes::{router, AppState, DOWNLOAD_PREFIX};
pub use server::{shutdown_signal, DirServer};
