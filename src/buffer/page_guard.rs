//! RAII guards for page access.
//!
//! These guards provide safe access to pages in the buffer pool:
//! - [`PageReadGuard`] - Shared read access (multiple allowed)
//! - [`PageWriteGuard`] - Exclusive write access (auto-marks dirty)
//!
//! Both guards hold a pin on their frame and release it when dropped, so
//! the borrowed page bytes can never outlive the pinned interval. For
//! callers that need a pin to outlive the borrow (an index traversal
//! holding an ancestor while it descends), [`PageReadGuard::leak`] and
//! [`PageWriteGuard::leak`] release the latch while keeping the pin; the
//! matching release is [`BufferManager::unpin_page`].

use std::ops::{Deref, DerefMut};

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::common::{FrameId, PageId};
use crate::storage::Page;

use super::buffer_manager::BufferManager;

/// Guard for read-only page access.
///
/// Multiple `PageReadGuard`s can exist for the same page simultaneously.
/// The page is automatically unpinned when the guard is dropped.
///
/// # Example
/// ```ignore
/// let guard = bm.fetch_page_read(&file, page_no)?;
/// let data = guard.as_slice();  // Deref to &Page
/// // guard drops here, page unpinned
/// ```
pub struct PageReadGuard<'a> {
    /// Reference back to the manager for unpin on drop.
    bm: &'a BufferManager,
    /// Frame holding this page.
    frame_id: FrameId,
    /// Page identity for convenience.
    page_no: PageId,
    /// Latch providing access to the page bytes. `None` only after
    /// `leak` has released it.
    lock: Option<RwLockReadGuard<'a, Page>>,
}

impl<'a> PageReadGuard<'a> {
    /// Create a new read guard.
    ///
    /// Called by `BufferManager::fetch_page_read()`.
    pub(crate) fn new(
        bm: &'a BufferManager,
        frame_id: FrameId,
        page_no: PageId,
        lock: RwLockReadGuard<'a, Page>,
    ) -> Self {
        Self {
            bm,
            frame_id,
            page_no,
            lock: Some(lock),
        }
    }

    /// Get the page identity within its file.
    #[inline]
    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    /// Get the frame ID.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Release the latch but keep the pin.
    ///
    /// The frame stays ineligible for eviction until the caller hands
    /// the pin back with `BufferManager::unpin_page`.
    pub fn leak(mut self) {
        self.lock = None;
        std::mem::forget(self);
    }
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        self.lock.as_deref().expect("page latch released")
    }
}

impl Drop for PageReadGuard<'_> {
    fn drop(&mut self) {
        // Read guard: not dirty
        self.bm.unpin_page_internal(self.frame_id, false);
    }
}

/// Guard for exclusive write access to a page.
///
/// Only one `PageWriteGuard` can exist for a page at a time.
/// The page is automatically marked dirty and unpinned when the guard is
/// dropped.
///
/// # Example
/// ```ignore
/// let mut guard = bm.fetch_page_write(&file, page_no)?;
/// guard.as_mut_slice()[0] = 0xFF;  // DerefMut to &mut Page
/// // guard drops here, page marked dirty and unpinned
/// ```
pub struct PageWriteGuard<'a> {
    /// Reference back to the manager for unpin on drop.
    bm: &'a BufferManager,
    /// Frame holding this page.
    frame_id: FrameId,
    /// Page identity for convenience.
    page_no: PageId,
    /// Latch providing access to the page bytes. `None` only after
    /// `leak` has released it.
    lock: Option<RwLockWriteGuard<'a, Page>>,
}

impl<'a> PageWriteGuard<'a> {
    /// Create a new write guard.
    ///
    /// Called by `BufferManager::fetch_page_write()` and `new_page()`.
    pub(crate) fn new(
        bm: &'a BufferManager,
        frame_id: FrameId,
        page_no: PageId,
        lock: RwLockWriteGuard<'a, Page>,
    ) -> Self {
        Self {
            bm,
            frame_id,
            page_no,
            lock: Some(lock),
        }
    }

    /// Get the page identity within its file.
    #[inline]
    pub fn page_no(&self) -> PageId {
        self.page_no
    }

    /// Get the frame ID.
    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Release the latch but keep the pin.
    ///
    /// The dirty bookkeeping normally done at drop moves to the caller:
    /// pass the right flag to `BufferManager::unpin_page` when handing
    /// the pin back.
    pub fn leak(mut self) {
        self.lock = None;
        std::mem::forget(self);
    }
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        self.lock.as_deref().expect("page latch released")
    }
}

impl DerefMut for PageWriteGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        self.lock.as_deref_mut().expect("page latch released")
    }
}

impl Drop for PageWriteGuard<'_> {
    fn drop(&mut self) {
        // Write guard: always dirty
        self.bm.unpin_page_internal(self.frame_id, true);
    }
}
