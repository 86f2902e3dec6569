//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds a [`Page`] plus the descriptor state needed for
//! buffer management:
//! - Which `(file, page)` is resident, if any
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking
//! - Reference bit for the clock sweep

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::PageId;
use crate::storage::{FileRef, Page};

/// A frame in the buffer pool.
///
/// Frames are the "slots" in the buffer pool. Each frame can hold one
/// page of one file. The pool has a fixed number of frames allocated at
/// startup; only their contents mutate.
///
/// # Descriptor states
/// - Invalid: `slot` is `None`; pin count 0, dirty and ref bit clear.
/// - Valid: `slot` names the resident `(file, page)`; the manager's page
///   table holds exactly one entry mapping that identity to this frame.
///
/// [`Frame::assign`] and [`Frame::clear`] are the only transitions
/// between the two states.
///
/// # Thread Safety
/// All fields use interior mutability for safe concurrent access:
/// - `data`: `RwLock` for read/write synchronization of the page bytes
/// - `slot`: `Mutex` for safe identity updates
/// - `pin_count`, `dirty`, `ref_bit`: lock-free atomics
pub struct Frame {
    /// The page bytes, protected by RwLock.
    data: RwLock<Page>,

    /// Identity of the resident page, or None if the frame is empty.
    slot: Mutex<Option<FrameSlot>>,

    /// Number of outstanding unmatched pins.
    pin_count: AtomicU32,

    /// Whether the page has been modified since loading.
    dirty: AtomicBool,

    /// Second-chance bit for the clock sweep.
    ref_bit: AtomicBool,
}

/// Identity of the page resident in a frame.
#[derive(Clone)]
struct FrameSlot {
    file: FileRef,
    page_no: PageId,
}

impl Frame {
    /// Create a new empty frame.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Page::new()),
            slot: Mutex::new(None),
            pin_count: AtomicU32::new(0),
            dirty: AtomicBool::new(false),
            ref_bit: AtomicBool::new(false),
        }
    }

    // ========================================================================
    // Page data access (RwLock)
    // ========================================================================

    /// Acquire read lock on the page bytes.
    #[inline]
    pub fn data(&self) -> RwLockReadGuard<'_, Page> {
        self.data.read()
    }

    /// Acquire write lock on the page bytes.
    #[inline]
    pub fn data_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.data.write()
    }

    // ========================================================================
    // Identity management (Mutex for interior mutability)
    // ========================================================================

    /// Get the identity of the resident page, if any.
    pub fn slot(&self) -> Option<(FileRef, PageId)> {
        self.slot
            .lock()
            .as_ref()
            .map(|s| (FileRef::clone(&s.file), s.page_no))
    }

    /// Check if the frame holds a page.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// Transition to valid: resident `(file, page_no)`, pinned once,
    /// clean, reference bit set.
    ///
    /// Called when a page is loaded or allocated into this frame.
    pub fn assign(&self, file: FileRef, page_no: PageId) {
        *self.slot.lock() = Some(FrameSlot { file, page_no });
        self.pin_count.store(1, Ordering::Relaxed);
        self.dirty.store(false, Ordering::Relaxed);
        self.ref_bit.store(true, Ordering::Relaxed);
    }

    /// Transition to invalid: no identity, pin count 0, dirty and ref
    /// bit clear. Page bytes are left as-is; the next load overwrites
    /// them.
    ///
    /// # Panics
    /// Panics if the frame is still pinned.
    pub fn clear(&self) {
        assert_eq!(self.pin_count(), 0, "clear of pinned frame");
        *self.slot.lock() = None;
        self.dirty.store(false, Ordering::Relaxed);
        self.ref_bit.store(false, Ordering::Relaxed);
    }

    // ========================================================================
    // Pin count operations (Atomic)
    // ========================================================================

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if pin count is already 0.
    #[inline]
    pub fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::Release);
        assert!(old > 0, "pin count underflow");
        old - 1
    }

    /// Get the current pin count.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Acquire)
    }

    /// Check if the frame is currently pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    // ========================================================================
    // Dirty flag operations (Atomic)
    // ========================================================================

    /// Mark the frame as dirty (modified).
    ///
    /// A true dirty flag is sticky: nothing clears it short of a
    /// write-back or [`Frame::clear`].
    #[inline]
    pub fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Relaxed);
    }

    /// Clear the dirty flag after a write-back.
    #[inline]
    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::Relaxed);
    }

    /// Check if the frame is dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Relaxed)
    }

    // ========================================================================
    // Reference bit operations (Atomic)
    // ========================================================================

    /// Set the reference bit (the page was touched).
    #[inline]
    pub fn set_ref_bit(&self) {
        self.ref_bit.store(true, Ordering::Relaxed);
    }

    /// Clear the reference bit, returning its previous value.
    ///
    /// The clock sweep uses this to grant a second chance in one step.
    #[inline]
    pub fn take_ref_bit(&self) -> bool {
        self.ref_bit.swap(false, Ordering::Relaxed)
    }

    /// Check the reference bit.
    #[inline]
    pub fn ref_bit(&self) -> bool {
        self.ref_bit.load(Ordering::Relaxed)
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
