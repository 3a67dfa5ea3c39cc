//! Streaming file downloads.
//!
//! Files are read in fixed-size chunks so that memory use stays bounded no
//! matter how large the file is.

use tokio::fs::File;
use tokio::io::{AsyncReadExt, Take};
use tokio_util::io::ReaderStream;
use tracing::debug;

use super::resolver::ResolvedPath;
use crate::error::FsError;

/// Default chunk size for downloads (64KB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Maximum chunk size (1MB).
pub const MAX_CHUNK_SIZE: usize = 1024 * 1024;

/// Opens resolved paths for streaming.
#[derive(Debug, Clone, Copy)]
pub struct FileTransfer {
    chunk_size: usize,
}

impl FileTransfer {
    /// Create a transfer reading `chunk_size` bytes at a time.
    ///
    /// The chunk size is clamped to `1..=MAX_CHUNK_SIZE`.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.clamp(1, MAX_CHUNK_SIZE),
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Open the file at `resolved` for download.
    ///
    /// Fails if the file cannot be opened or is a directory; nothing has been
    /// sent to the client at that point, so a failure never truncates a body.
    pub async fn open(&self, resolved: &ResolvedPath) -> Result<Download, FsError> {
        let path = &resolved.absolute;

        let file = File::open(path)
            .await
            .map_err(|e| FsError::from_io(e, path))?;
        let metadata = file
            .metadata()
            .await
            .map_err(|e| FsError::from_io(e, path))?;
        if metadata.is_dir() {
            return Err(FsError::IsADirectory(path.clone()));
        }

        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .to_string();

        debug!(
            "Opened {} for download ({} bytes, {})",
            path.display(),
            metadata.len(),
            content_type
        );

        Ok(Download {
            file,
            len: metadata.len(),
            content_type,
            file_name: resolved.file_name().to_string(),
            chunk_size: self.chunk_size,
        })
    }
}

impl Default for FileTransfer {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}

/// An opened file ready to be streamed.
#[derive(Debug)]
pub struct Download {
    file: File,
    /// File length in bytes at open time.
    pub len: u64,
    /// MIME type guessed from the extension.
    pub content_type: String,
    /// Name offered to the client.
    pub file_name: String,
    chunk_size: usize,
}

impl Download {
    /// Turn the download into a stream of chunks.
    ///
    /// The stream stops after `len` bytes even if the file has grown since it
    /// was opened, so the body always matches the advertised length.
    pub fn into_stream(self) -> ReaderStream<Take<File>> {
        ReaderStream::with_capacity(self.file.take(self.len), self.chunk_size)
    }
}
