//! HTTP server lifecycle: binding, serving and graceful shutdown.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::routes::{router, AppState};

/// Default time allowed for in-flight requests to finish on shutdown.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// A bound HTTP server that has not started serving yet.
pub struct DirServer {
    listener: TcpListener,
    router: Router,
    shutdown_timeout: Duration,
}

impl DirServer {
    /// Bind the server to `addr`.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn bind(addr: SocketAddr, state: AppState) -> Result<Self, io::Error> {
        let listener = TcpListener::bind(addr).await?;
        Ok(Self::from_listener(listener, state))
    }

    /// Serve on an already bound listener.
    pub fn from_listener(listener: TcpListener, state: AppState) -> Self {
        Self {
            listener,
            router: router(state),
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }

    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }

    pub fn local_addr(&self) -> Result<SocketAddr, io::Error> {
        self.listener.local_addr()
    }

    /// Serve requests until `shutdown` completes.
    ///
    /// Once `shutdown` fires the listener stops accepting connections and
    /// in-flight requests get `shutdown_timeout` to finish before the server
    /// is torn down.
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send,
    {
        let token = CancellationToken::new();
        let drain = token.clone();

        let serve = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(async move { drain.cancelled().await });
        let mut handle = tokio::spawn(async move { serve.await });

        tokio::select! {
            result = &mut handle => {
                return result
                    .context("Server task panicked")?
                    .context("Server error");
            }
            _ = shutdown => {}
        }

        info!("Shutting down, waiting up to {:?} for open requests", self.shutdown_timeout);
        let started = Instant::now();
        token.cancel();

        match tokio::time::timeout(self.shutdown_timeout, &mut handle).await {
            Ok(result) => {
                result
                    .context("Server task panicked")?
                    .context("Server error")?;
                info!("Server stopped after {:?}", started.elapsed());
            }
            Err(_) => {
                warn!(
                    "Graceful shutdown timed out after {:?}, aborting open connections",
                    self.shutdown_timeout
                );
                handle.abort();
            }
        }

        Ok(())
    }
}

/// Wait for a shutdown signal (SIGTERM or SIGINT).
#[cfg(unix)]
pub async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut sigterm, mut sigint) = match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
        (Err(e), _) | (_, Err(e)) => {
            warn!("Failed to register signal handlers ({}), falling back to ctrl-c", e);
            ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = sigterm.recv() => {
            info!("Received SIGTERM");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT");
        }
    }
}

/// Wait for a shutdown signal (ctrl-c).
#[cfg(not(unix))]
pub async fn shutdown_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Received ctrl-c"),
        Err(e) => {
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
