//! DbFile - page-granular I/O on a single database file.
//!
//! A [`DbFile`] owns one on-disk file and exposes the four operations the
//! buffer pool consumes:
//! - Allocating new pages
//! - Reading and writing pages
//! - Deleting pages
//!
//! Handles are shared: [`FileRef`] is an `Arc<DbFile>`, and every open
//! file carries a process-unique [`FileId`] so the buffer pool can key
//! resident pages by `(FileId, PageId)`.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::common::config::PAGE_SIZE;
use crate::common::{Error, FileId, PageId, Result};
use crate::storage::page::Page;

/// Source of process-unique file ids.
static NEXT_FILE_ID: AtomicU64 = AtomicU64::new(0);

/// Shared handle to an open database file.
pub type FileRef = Arc<DbFile>;

/// A single database file, stored as a sequence of fixed-size pages.
///
/// # File Layout
/// Pages are laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Page N is located at file offset `N × PAGE_SIZE`.
///
/// # Deletion
/// `delete_page` zeroes the page region and records the id on an
/// in-memory free list; `allocate_page` reuses freed ids before
/// extending the file. Reads and writes of a freed page fail with
/// `PageNotFound`. The free list is not persisted across reopen.
///
/// # Thread Safety
/// All methods take `&self`; the file position, page count, and free
/// list live behind a mutex so a handle can be shared across the buffer
/// pool and its callers.
///
/// # Durability
/// Page writes and allocations are followed by `fsync()`.
pub struct DbFile {
    id: FileId,
    inner: Mutex<FileInner>,
}

struct FileInner {
    file: File,
    /// Number of pages in the file, including freed ones.
    page_count: u32,
    /// Ids of deleted pages available for reuse.
    free_pages: Vec<PageId>,
}

impl DbFile {
    /// Create a new database file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<FileRef> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self::from_parts(file, 0))
    }

    /// Open an existing database file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<FileRef> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;

        // Calculate page count from file size
        let metadata = file.metadata()?;
        let file_size = metadata.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        Ok(Self::from_parts(file, page_count))
    }

    /// Open an existing database file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<FileRef> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    fn from_parts(file: File, page_count: u32) -> FileRef {
        Arc::new(Self {
            id: FileId::new(NEXT_FILE_ID.fetch_add(1, Ordering::Relaxed)),
            inner: Mutex::new(FileInner {
                file,
                page_count,
                free_pages: Vec::new(),
            }),
        })
    }

    /// Get this handle's process-unique id.
    #[inline]
    pub fn id(&self) -> FileId {
        self.id
    }

    /// Allocate a new page, returning its id.
    ///
    /// Reuses a previously deleted page id if one is available, otherwise
    /// extends the file with a zeroed page. Either way the page contents
    /// start out as all zeros.
    pub fn allocate_page(&self) -> Result<PageId> {
        let mut inner = self.inner.lock();

        // Freed page regions were zeroed at deletion
        if let Some(page_id) = inner.free_pages.pop() {
            return Ok(page_id);
        }

        let page_id = PageId::new(inner.page_count);

        // Extend file with a zeroed page
        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        inner.file.seek(SeekFrom::Start(offset))?;

        let zeros = [0u8; PAGE_SIZE];
        inner.file.write_all(&zeros)?;
        inner.file.sync_all()?;

        inner.page_count += 1;
        Ok(page_id)
    }

    /// Read a page from disk.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page doesn't exist or has
    /// been deleted.
    pub fn read_page(&self, page_id: PageId) -> Result<Page> {
        let mut inner = self.inner.lock();
        inner.check_allocated(page_id)?;

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        inner.file.seek(SeekFrom::Start(offset))?;

        let mut page = Page::new();
        inner.file.read_exact(page.as_mut_slice())?;

        Ok(page)
    }

    /// Write a page to disk.
    ///
    /// The page must have been previously allocated with `allocate_page()`.
    ///
    /// # Durability
    /// This method calls `fsync()` after writing.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page hasn't been allocated or
    /// has been deleted.
    pub fn write_page(&self, page_id: PageId, page: &Page) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.check_allocated(page_id)?;

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        inner.file.seek(SeekFrom::Start(offset))?;
        inner.file.write_all(page.as_slice())?;
        inner.file.sync_all()?;

        Ok(())
    }

    /// Delete a page from the file.
    ///
    /// The page region is zeroed and the id becomes available for reuse
    /// by `allocate_page`. Subsequent reads and writes of the id fail
    /// until it is reallocated.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page doesn't exist or is
    /// already deleted.
    pub fn delete_page(&self, page_id: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.check_allocated(page_id)?;

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        inner.file.seek(SeekFrom::Start(offset))?;

        let zeros = [0u8; PAGE_SIZE];
        inner.file.write_all(&zeros)?;
        inner.file.sync_all()?;

        inner.free_pages.push(page_id);
        Ok(())
    }

    /// Get the number of live (non-deleted) pages in the file.
    pub fn page_count(&self) -> u32 {
        let inner = self.inner.lock();
        inner.page_count - inner.free_pages.len() as u32
    }
}

impl FileInner {
    fn check_allocated(&self, page_id: PageId) -> Result<()> {
        if page_id.0 >= self.page_count || self.free_pages.contains(&page_id) {
            return Err(Error::PageNotFound(page_id.0));
        }
        Ok(())
    }
}
