//! Error types for pagepool.

use std::fmt;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
/// This is a common Rust pattern (see `std::io::Result`).
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagepool.
///
/// By having a single error type, error handling stays consistent across
/// the storage and buffer layers.
#[derive(Debug)]
pub enum Error {
    /// I/O error from disk operations.
    ///
    /// This wraps `std::io::Error` from file read/write operations.
    Io(std::io::Error),

    /// Requested page does not exist in the file (out of range or deleted).
    PageNotFound(u32),

    /// Every frame in the buffer pool is pinned; nothing can be evicted.
    ///
    /// The workload exceeds the pool capacity. Not recoverable by the
    /// manager; the caller must release pins.
    BufferExceeded,

    /// Attempted to unpin a resident page whose pin count is already zero.
    ///
    /// This indicates a caller bug - unpinning should match pinning.
    PageNotPinned(u32),

    /// The operation requires the page to be unpinned, but it is pinned.
    ///
    /// Raised by per-file flushing and page disposal. The caller should
    /// quiesce its pins and retry.
    PagePinned(u32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::PageNotFound(pid) => write!(f, "Page {} not found", pid),
            Error::BufferExceeded => write!(f, "All buffer frames are pinned"),
            Error::PageNotPinned(pid) => write!(f, "Page {} is not pinned", pid),
            Error::PagePinned(pid) => write!(f, "Page {} is pinned", pid),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            // I/O errors have a source (the underlying std::io::Error)
            Error::Io(e) => Some(e),
            // Our custom errors don't have a source
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}
