//! Buffer Manager - the core page caching layer.
//!
//! The [`BufferManager`] provides:
//! - Page caching between disk and memory, across any number of files
//! - Pin-based reference counting
//! - Clock (second chance) victim selection
//! - Automatic dirty page write-back

use log::{debug, warn};
use parking_lot::Mutex;

use crate::buffer::page_table::PageTable;
use crate::buffer::replacer::ClockSweep;
use crate::buffer::{BufferStats, Frame, PageReadGuard, PageWriteGuard};
use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::FileRef;

/// Manages a pool of buffer frames caching pages of database files.
///
/// # Architecture
/// ```text
/// ┌──────────────────────────────────────────────────────────────┐
/// │                       BufferManager                          │
/// │  ┌───────────────────┐  ┌────────────────────────────────┐  │
/// │  │ page_table        │  │       frames: Vec<Frame>       │  │
/// │  │(File,Page) → Fid  │─▶│  [Frame0] [Frame1] [Frame2] …  │  │
/// │  └───────────────────┘  └────────────────────────────────┘  │
/// │  ┌───────────────────┐         ▲                            │
/// │  │ clock: ClockSweep │─────────┘ victim selection           │
/// │  └───────────────────┘                                      │
/// └──────────────────────────────────────────────────────────────┘
///            │ read/write/allocate/delete
///            ▼
///   DbFile … DbFile (shared handles, any number of files)
/// ```
///
/// # Thread Safety
/// - `pool` (`Mutex`): page table and clock hand. Every pin increment,
///   identity assignment, and descriptor clear happens while it is
///   held, so a sweep can never select a frame whose pin count rises
///   between inspection and selection.
/// - `frames`: no outer lock - fixed size, each Frame has internal locks
/// - `stats`: no lock - all atomic counters
///
/// File I/O on miss, eviction, and flush paths runs under the pool
/// lock, which serializes buffer operations during I/O.
///
/// # Usage
/// ```ignore
/// let file = DbFile::create("test.db")?;
/// let bm = BufferManager::new(64);
///
/// // Allocate a new page
/// let mut guard = bm.new_page(&file)?;
/// guard.as_mut_slice()[0] = 0xAB;
/// // guard drops: page marked dirty, unpinned
///
/// // Fetch existing page for reading
/// let guard = bm.fetch_page_read(&file, PageId::new(0))?;
/// let data = guard.as_slice();
/// ```
pub struct BufferManager {
    /// Fixed pool of frames allocated at startup.
    frames: Vec<Frame>,

    /// Page index and victim policy, under one exclusion domain.
    pool: Mutex<PoolState>,

    /// Performance statistics.
    stats: BufferStats,

    /// Number of frames in the pool (immutable after construction).
    pool_size: usize,
}

struct PoolState {
    /// Maps resident page identities to frame IDs.
    page_table: PageTable,

    /// Clock cursor for victim selection.
    clock: ClockSweep,
}

impl BufferManager {
    /// Create a new buffer manager.
    ///
    /// # Arguments
    /// * `num_bufs` - Number of frames in the pool
    ///
    /// # Panics
    /// Panics if `num_bufs` is 0.
    pub fn new(num_bufs: usize) -> Self {
        assert!(num_bufs > 0, "num_bufs must be > 0");

        // Allocate all frames upfront; every frame starts invalid
        let frames: Vec<Frame> = (0..num_bufs).map(|_| Frame::new()).collect();

        Self {
            frames,
            pool: Mutex::new(PoolState {
                page_table: PageTable::with_capacity(num_bufs),
                clock: ClockSweep::new(num_bufs),
            }),
            stats: BufferStats::new(),
            pool_size: num_bufs,
        }
    }

    // ========================================================================
    // Public API: Fetch pages
    // ========================================================================

    /// Fetch a page for reading (shared access).
    ///
    /// If the page is already resident, sets its reference bit and pins
    /// it. Otherwise, takes a victim frame (writing its page back if
    /// dirty) and loads the page from the file.
    ///
    /// # Errors
    /// - `Error::BufferExceeded` if every frame is pinned
    /// - `Error::PageNotFound` and I/O errors from the file
    pub fn fetch_page_read<'a>(
        &'a self,
        file: &FileRef,
        page_no: PageId,
    ) -> Result<PageReadGuard<'a>> {
        let frame_id = self.fetch_page_internal(file, page_no)?;
        let lock = self.frames[frame_id.index()].data();

        Ok(PageReadGuard::new(self, frame_id, page_no, lock))
    }

    /// Fetch a page for writing (exclusive access).
    ///
    /// Same as `fetch_page_read`, but returns an exclusive guard.
    /// The page is automatically marked dirty when the guard drops.
    ///
    /// # Errors
    /// - `Error::BufferExceeded` if every frame is pinned
    /// - `Error::PageNotFound` and I/O errors from the file
    pub fn fetch_page_write<'a>(
        &'a self,
        file: &FileRef,
        page_no: PageId,
    ) -> Result<PageWriteGuard<'a>> {
        let frame_id = self.fetch_page_internal(file, page_no)?;
        let lock = self.frames[frame_id.index()].data_mut();

        Ok(PageWriteGuard::new(self, frame_id, page_no, lock))
    }

    // ========================================================================
    // Public API: Create and delete pages
    // ========================================================================

    /// Allocate a new page in `file` and load it into the pool.
    ///
    /// Returns a write guard for the new page, already pinned so the
    /// caller can initialize it; the page id is `guard.page_no()`.
    ///
    /// # Errors
    /// - `Error::BufferExceeded` if every frame is pinned
    /// - I/O errors from page allocation
    pub fn new_page<'a>(&'a self, file: &FileRef) -> Result<PageWriteGuard<'a>> {
        let mut pool = self.pool.lock();

        // Victim first: a BufferExceeded failure must leave the file unchanged
        let frame_id = self.take_victim(&mut pool)?;
        let frame = &self.frames[frame_id.index()];

        let page_no = file.allocate_page()?;

        // Fresh pages start zeroed
        frame.data_mut().reset();

        pool.page_table.insert(file.id(), page_no, frame_id);
        frame.assign(FileRef::clone(file), page_no);
        drop(pool);

        let lock = frame.data_mut();

        Ok(PageWriteGuard::new(self, frame_id, page_no, lock))
    }

    /// Remove a page from the pool (if resident) and delete it from its
    /// file.
    ///
    /// # Errors
    /// - `Error::PagePinned` if the page is resident and pinned
    /// - `Error::PageNotFound` if the file does not know the page
    pub fn dispose_page(&self, file: &FileRef, page_no: PageId) -> Result<()> {
        let mut pool = self.pool.lock();

        if let Some(frame_id) = pool.page_table.lookup(file.id(), page_no) {
            let frame = &self.frames[frame_id.index()];

            // Outstanding pins still borrow the page bytes
            if frame.is_pinned() {
                return Err(Error::PagePinned(page_no.0));
            }

            pool.page_table.remove(file.id(), page_no);
            frame.clear();
        }

        file.delete_page(page_no)
    }

    // ========================================================================
    // Public API: Unpin
    // ========================================================================

    /// Hand back a pin obtained through a leaked guard.
    ///
    /// `dirty` reports whether the caller modified the page; a true flag
    /// is sticky until the page is written back. Unpinning a page that
    /// is not resident is a no-op.
    ///
    /// # Errors
    /// - `Error::PageNotPinned` if the page is resident with pin count 0
    pub fn unpin_page(&self, file: &FileRef, page_no: PageId, dirty: bool) -> Result<()> {
        let pool = self.pool.lock();

        let frame_id = match pool.page_table.lookup(file.id(), page_no) {
            Some(fid) => fid,
            // Already evicted or never resident; nothing to release
            None => return Ok(()),
        };

        let frame = &self.frames[frame_id.index()];
        if !frame.is_pinned() {
            return Err(Error::PageNotPinned(page_no.0));
        }

        if dirty {
            frame.mark_dirty();
        }
        frame.unpin();

        Ok(())
    }

    // ========================================================================
    // Public API: Flush pages
    // ========================================================================

    /// Flush every resident page of `file` and drop it from the pool.
    ///
    /// Frames are handled one at a time: pinned frames fail the scan,
    /// dirty frames are written back, and each handled frame is cleared.
    /// On failure the scan stops; write-backs already performed stay
    /// persisted.
    ///
    /// # Errors
    /// - `Error::PagePinned` if a frame of the file is still pinned
    /// - I/O errors from disk writes
    pub fn flush_file(&self, file: &FileRef) -> Result<()> {
        debug!("flushing {}", file.id());
        let mut pool = self.pool.lock();

        for frame in &self.frames {
            let (resident, page_no) = match frame.slot() {
                Some((f, p)) if f.id() == file.id() => (f, p),
                _ => continue,
            };

            if frame.is_pinned() {
                return Err(Error::PagePinned(page_no.0));
            }

            if frame.is_dirty() {
                let data = frame.data();
                resident.write_page(page_no, &data)?;
                drop(data);
                self.stats.record_disk_write();
            }

            pool.page_table.remove(file.id(), page_no);
            frame.clear();
        }

        Ok(())
    }

    /// Write back every dirty resident page, of every file, without
    /// evicting anything.
    ///
    /// Pinned pages are flushed too; their current bytes are consistent
    /// under the page latch.
    ///
    /// # Errors
    /// - I/O errors from disk writes
    pub fn flush_all(&self) -> Result<()> {
        let _pool = self.pool.lock();

        for frame in &self.frames {
            if let Some((file, page_no)) = frame.slot() {
                if frame.is_dirty() {
                    let data = frame.data();
                    file.write_page(page_no, &data)?;
                    drop(data);
                    frame.clear_dirty();
                    self.stats.record_disk_write();
                }
            }
        }

        Ok(())
    }

    // ========================================================================
    // Public API: Introspection and diagnostics
    // ========================================================================

    /// Get buffer pool statistics.
    pub fn stats(&self) -> &BufferStats {
        &self.stats
    }

    /// Get the pool size.
    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    /// Get the number of pages resident in the pool.
    pub fn page_count(&self) -> usize {
        self.pool.lock().page_table.len()
    }

    /// Check whether a page is resident.
    pub fn contains_page(&self, file: &FileRef, page_no: PageId) -> bool {
        self.pool.lock().page_table.lookup(file.id(), page_no).is_some()
    }

    /// Get the pin count of a resident page, or `None` if not resident.
    pub fn pin_count(&self, file: &FileRef, page_no: PageId) -> Option<u32> {
        let pool = self.pool.lock();
        let frame_id = pool.page_table.lookup(file.id(), page_no)?;
        Some(self.frames[frame_id.index()].pin_count())
    }

    /// Get the dirty flag of a resident page, or `None` if not resident.
    pub fn is_page_dirty(&self, file: &FileRef, page_no: PageId) -> Option<bool> {
        let pool = self.pool.lock();
        let frame_id = pool.page_table.lookup(file.id(), page_no)?;
        Some(self.frames[frame_id.index()].is_dirty())
    }

    /// Render the state of every frame, one line each, plus a count of
    /// valid frames.
    pub fn dump(&self) -> String {
        let _pool = self.pool.lock();

        let mut out = String::new();
        let mut valid_frames = 0;

        for (i, frame) in self.frames.iter().enumerate() {
            match frame.slot() {
                Some((file, page_no)) => {
                    valid_frames += 1;
                    out.push_str(&format!(
                        "frame {}: {} {} pin={} dirty={} ref={}\n",
                        i,
                        file.id(),
                        page_no,
                        frame.pin_count(),
                        frame.is_dirty(),
                        frame.ref_bit(),
                    ));
                }
                None => {
                    out.push_str(&format!("frame {}: empty\n", i));
                }
            }
        }

        out.push_str(&format!("valid frames: {}\n", valid_frames));
        out
    }

    // ========================================================================
    // Internal: Called by PageGuard on drop
    // ========================================================================

    /// Unpin a frame. Called by PageReadGuard/PageWriteGuard on drop.
    ///
    /// This is `pub(crate)` so guards in the same module can call it.
    pub(crate) fn unpin_page_internal(&self, frame_id: FrameId, is_dirty: bool) {
        let frame = &self.frames[frame_id.index()];

        // The dirty flag must be visible before the pin count drops
        if is_dirty {
            frame.mark_dirty();
        }

        frame.unpin();
    }

    // ========================================================================
    // Internal: Core fetch logic
    // ========================================================================

    /// Fetch a page into the pool, returning its frame ID with one pin
    /// added.
    fn fetch_page_internal(&self, file: &FileRef, page_no: PageId) -> Result<FrameId> {
        let mut pool = self.pool.lock();

        // Fast path: cache hit
        if let Some(frame_id) = pool.page_table.lookup(file.id(), page_no) {
            let frame = &self.frames[frame_id.index()];
            frame.set_ref_bit();
            frame.pin();
            self.stats.record_hit();
            return Ok(frame_id);
        }

        // Cache miss: take a victim frame and load from the file
        self.stats.record_miss();

        let frame_id = self.take_victim(&mut pool)?;
        let frame = &self.frames[frame_id.index()];

        let page = file.read_page(page_no)?;
        frame
            .data_mut()
            .as_mut_slice()
            .copy_from_slice(page.as_slice());
        self.stats.record_disk_read();

        pool.page_table.insert(file.id(), page_no, frame_id);
        frame.assign(FileRef::clone(file), page_no);

        Ok(frame_id)
    }

    // ========================================================================
    // Internal: Frame recycling
    // ========================================================================

    /// Select a victim frame and recycle it: write its page back if
    /// dirty, drop its page table entry, and clear its descriptor.
    ///
    /// The returned frame is invalid and unpinned, ready for `assign`.
    fn take_victim(&self, pool: &mut PoolState) -> Result<FrameId> {
        let frame_id = pool.clock.victim(&self.frames)?;
        let frame = &self.frames[frame_id.index()];

        if let Some((file, page_no)) = frame.slot() {
            if frame.is_dirty() {
                debug!("evicting dirty {} of {}", page_no, file.id());
                let data = frame.data();
                file.write_page(page_no, &data)?;
                drop(data);
                self.stats.record_disk_write();
            }

            pool.page_table.remove(file.id(), page_no);
            frame.clear();
            self.stats.record_eviction();
        }

        Ok(frame_id)
    }
}

impl Drop for BufferManager {
    /// Shutdown flush: write back every valid dirty page.
    ///
    /// Pins are a caller contract at this point; they are not checked.
    /// Individual write failures are logged and skipped so one bad file
    /// cannot lose the committed writes of other pages.
    fn drop(&mut self) {
        for frame in &self.frames {
            if let Some((file, page_no)) = frame.slot() {
                if frame.is_dirty() {
                    let data = frame.data();
                    if let Err(e) = file.write_page(page_no, &data) {
                        warn!(
                            "shutdown write-back of {} in {} failed: {}",
                            page_no,
                            file.id(),
                            e
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbFile;
    use tempfile::tempdir;

    /// Helper to create a manager and a file in a temporary directory.
    fn create_test_bm(num_bufs: usize) -> (BufferManager, FileRef, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let file = DbFile::create(dir.path().join("test.db")).unwrap();
        (BufferManager::new(num_bufs), file, dir)
    }

    #[test]
    fn test_new_page() {
        let (bm, file, _dir) = create_test_bm(10);

        let guard = bm.new_page(&file).unwrap();
        assert_eq!(guard.page_no(), PageId::new(0));
        drop(guard);

        let guard = bm.new_page(&file).unwrap();
        assert_eq!(guard.page_no(), PageId::new(1));
    }

    #[test]
    fn test_fetch_page_read() {
        let (bm, file, _dir) = create_test_bm(10);

        // Create a page and write data
        {
            let mut guard = bm.new_page(&file).unwrap();
            guard.as_mut_slice()[0] = 0xAB;
        }

        // Fetch and verify
        {
            let guard = bm.fetch_page_read(&file, PageId::new(0)).unwrap();
            assert_eq!(guard.as_slice()[0], 0xAB);
        }
    }

    #[test]
    fn test_fetch_page_write() {
        let (bm, file, _dir) = create_test_bm(10);

        // Create a page
        {
            let _guard = bm.new_page(&file).unwrap();
        }

        // Fetch for write and modify
        {
            let mut guard = bm.fetch_page_write(&file, PageId::new(0)).unwrap();
            guard.as_mut_slice()[0] = 0xCD;
        }

        // Verify modification
        {
            let guard = bm.fetch_page_read(&file, PageId::new(0)).unwrap();
            assert_eq!(guard.as_slice()[0], 0xCD);
        }
    }

    #[test]
    fn test_cache_hit_sets_ref_bit_and_pin() {
        let (bm, file, _dir) = create_test_bm(10);

        {
            let _guard = bm.new_page(&file).unwrap();
        }

        let pid = PageId::new(0);
        let guard1 = bm.fetch_page_read(&file, pid).unwrap();
        let guard2 = bm.fetch_page_read(&file, pid).unwrap();

        assert_eq!(bm.pin_count(&file, pid), Some(2));

        drop(guard1);
        drop(guard2);
        assert_eq!(bm.pin_count(&file, pid), Some(0));

        let snapshot = bm.stats().snapshot();
        assert!(snapshot.hits >= 2);
    }

    #[test]
    fn test_eviction() {
        let (bm, file, _dir) = create_test_bm(3); // Small pool

        // Fill the pool
        for _ in 0..3 {
            let _guard = bm.new_page(&file).unwrap();
        }

        assert_eq!(bm.page_count(), 3);

        // Create one more page (forces eviction)
        let guard = bm.new_page(&file).unwrap();
        assert_eq!(guard.page_no(), PageId::new(3));

        let snapshot = bm.stats().snapshot();
        assert_eq!(snapshot.evictions, 1);
    }

    #[test]
    fn test_dirty_page_flushed_on_eviction() {
        let (bm, file, _dir) = create_test_bm(1); // Only 1 frame!

        // Create page 0 and write data
        {
            let mut guard = bm.new_page(&file).unwrap();
            guard.as_mut_slice()[0] = 0x42;
        } // Drops, marks dirty

        // Create page 1 (evicts page 0, should flush first)
        {
            let _guard = bm.new_page(&file).unwrap();
        }

        // Fetch page 0 again (should load from disk with our data)
        {
            let guard = bm.fetch_page_read(&file, PageId::new(0)).unwrap();
            assert_eq!(guard.as_slice()[0], 0x42);
        }
    }

    #[test]
    fn test_buffer_exceeded() {
        let (bm, file, _dir) = create_test_bm(2);

        // Pin both frames (hold the guards)
        let _guard1 = bm.new_page(&file).unwrap();
        let _guard2 = bm.new_page(&file).unwrap();

        // All frames pinned, can't bring anything in
        let result = bm.new_page(&file);
        assert!(matches!(result, Err(Error::BufferExceeded)));
    }

    #[test]
    fn test_unpin_page_not_resident_is_noop() {
        let (bm, file, _dir) = create_test_bm(2);

        assert!(bm.unpin_page(&file, PageId::new(99), false).is_ok());
    }

    #[test]
    fn test_unpin_page_zero_pins_fails() {
        let (bm, file, _dir) = create_test_bm(2);

        {
            let _guard = bm.new_page(&file).unwrap();
        } // unpinned on drop

        let result = bm.unpin_page(&file, PageId::new(0), false);
        assert!(matches!(result, Err(Error::PageNotPinned(0))));
    }

    #[test]
    fn test_leak_then_unpin() {
        let (bm, file, _dir) = create_test_bm(2);

        let pid = {
            let guard = bm.new_page(&file).unwrap();
            let pid = guard.page_no();
            guard.leak();
            pid
        };

        // Pin survived the guard
        assert_eq!(bm.pin_count(&file, pid), Some(1));

        bm.unpin_page(&file, pid, true).unwrap();
        assert_eq!(bm.pin_count(&file, pid), Some(0));
        assert_eq!(bm.is_page_dirty(&file, pid), Some(true));
    }

    #[test]
    fn test_dispose_page() {
        let (bm, file, _dir) = create_test_bm(10);

        {
            let _guard = bm.new_page(&file).unwrap();
        }
        assert_eq!(bm.page_count(), 1);

        bm.dispose_page(&file, PageId::new(0)).unwrap();

        assert_eq!(bm.page_count(), 0);
        assert!(!bm.contains_page(&file, PageId::new(0)));
        assert_eq!(file.page_count(), 0);
    }

    #[test]
    fn test_dispose_pinned_page_fails() {
        let (bm, file, _dir) = create_test_bm(10);

        // Create and hold a page
        let _guard = bm.new_page(&file).unwrap();

        let result = bm.dispose_page(&file, PageId::new(0));
        assert!(matches!(result, Err(Error::PagePinned(0))));
    }

    #[test]
    fn test_dispose_non_resident_page() {
        let (bm, file, _dir) = create_test_bm(2);

        let pid = {
            let guard = bm.new_page(&file).unwrap();
            guard.page_no()
        };

        // Push the page out of the pool, then dispose it
        let _a = bm.new_page(&file).unwrap();
        let _b = bm.new_page(&file).unwrap();
        assert!(!bm.contains_page(&file, pid));

        bm.dispose_page(&file, pid).unwrap();
        assert!(bm.fetch_page_read(&file, pid).is_err());
    }

    #[test]
    fn test_flush_file() {
        let (bm, file, _dir) = create_test_bm(10);

        // Create multiple dirty pages
        for i in 0..5u8 {
            let mut guard = bm.new_page(&file).unwrap();
            guard.as_mut_slice()[0] = i;
        }

        bm.flush_file(&file).unwrap();

        // Everything was written and dropped from the pool
        assert_eq!(bm.page_count(), 0);
        let snapshot = bm.stats().snapshot();
        assert_eq!(snapshot.disk_writes, 5);

        // Data still readable, from disk
        let guard = bm.fetch_page_read(&file, PageId::new(3)).unwrap();
        assert_eq!(guard.as_slice()[0], 3);
    }

    #[test]
    fn test_flush_file_pinned_fails() {
        let (bm, file, _dir) = create_test_bm(10);

        let _guard = bm.new_page(&file).unwrap();

        let result = bm.flush_file(&file);
        assert!(matches!(result, Err(Error::PagePinned(_))));
    }

    #[test]
    fn test_flush_file_leaves_other_files_resident() {
        let dir = tempdir().unwrap();
        let file_a = DbFile::create(dir.path().join("a.db")).unwrap();
        let file_b = DbFile::create(dir.path().join("b.db")).unwrap();
        let bm = BufferManager::new(10);

        {
            let _a = bm.new_page(&file_a).unwrap();
            let _b = bm.new_page(&file_b).unwrap();
        }

        bm.flush_file(&file_a).unwrap();

        assert!(!bm.contains_page(&file_a, PageId::new(0)));
        assert!(bm.contains_page(&file_b, PageId::new(0)));
    }

    #[test]
    fn test_flush_all() {
        let (bm, file, _dir) = create_test_bm(10);

        for i in 0..5u8 {
            let mut guard = bm.new_page(&file).unwrap();
            guard.as_mut_slice()[0] = i;
        }

        bm.flush_all().unwrap();

        // Pages stay resident, but are clean now
        assert_eq!(bm.page_count(), 5);
        for i in 0..5 {
            assert_eq!(bm.is_page_dirty(&file, PageId::new(i)), Some(false));
        }

        let snapshot = bm.stats().snapshot();
        assert_eq!(snapshot.disk_writes, 5);
    }

    #[test]
    fn test_dump() {
        let (bm, file, _dir) = create_test_bm(3);

        let _guard = bm.new_page(&file).unwrap();

        let dump = bm.dump();
        assert!(dump.contains("frame 0:"));
        assert!(dump.contains("pin=1"));
        assert!(dump.contains("frame 1: empty"));
        assert!(dump.contains("valid frames: 1"));
    }

    #[test]
    fn test_multiple_read_guards() {
        let (bm, file, _dir) = create_test_bm(10);

        {
            let _guard = bm.new_page(&file).unwrap();
        }

        // Multiple simultaneous read guards should work
        let guard1 = bm.fetch_page_read(&file, PageId::new(0)).unwrap();
        let guard2 = bm.fetch_page_read(&file, PageId::new(0)).unwrap();

        assert_eq!(guard1.page_no(), guard2.page_no());

        drop(guard1);
        drop(guard2);
    }

    #[test]
    fn test_page_not_found() {
        let (bm, file, _dir) = create_test_bm(10);

        // Try to fetch a page that doesn't exist
        let result = bm.fetch_page_read(&file, PageId::new(999));
        assert!(result.is_err());
    }

    #[test]
    fn test_concurrent_reads() {
        use std::sync::Arc;
        use std::thread;

        let (bm, file, _dir) = create_test_bm(10);
        let bm = Arc::new(bm);

        // Create a page
        {
            let mut guard = bm.new_page(&file).unwrap();
            guard.as_mut_slice()[0] = 0x42;
        }

        let mut handles = vec![];

        // Multiple threads reading the same page
        for _ in 0..10 {
            let bm_clone = Arc::clone(&bm);
            let file_clone = FileRef::clone(&file);
            handles.push(thread::spawn(move || {
                let guard = bm_clone.fetch_page_read(&file_clone, PageId::new(0)).unwrap();
                assert_eq!(guard.as_slice()[0], 0x42);
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
