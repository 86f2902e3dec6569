//! PageTable - the (file, page) → frame index.
//!
//! Maps the identity of every resident page to the frame holding it.
//! Misses are an `Option`, not an error: the buffer manager branches on
//! the variant to distinguish a cache hit from a miss.

use std::collections::HashMap;

use crate::common::{FileId, FrameId, PageId};

/// Index of resident pages, keyed by `(FileId, PageId)`.
///
/// Invariant maintained by the buffer manager: there is exactly one
/// entry per valid frame, and it maps that frame's resident identity to
/// its frame number.
pub struct PageTable {
    map: HashMap<(FileId, PageId), FrameId>,
}

impl PageTable {
    /// Create a table sized for a pool of `num_bufs` frames.
    pub fn with_capacity(num_bufs: usize) -> Self {
        Self {
            map: HashMap::with_capacity(num_bufs),
        }
    }

    /// Add a mapping. The caller guarantees the key is absent.
    pub fn insert(&mut self, file: FileId, page_no: PageId, frame_id: FrameId) {
        let prior = self.map.insert((file, page_no), frame_id);
        debug_assert!(prior.is_none(), "duplicate page table entry");
    }

    /// Return the frame holding `(file, page_no)`, or `None` if the page
    /// is not resident.
    #[inline]
    pub fn lookup(&self, file: FileId, page_no: PageId) -> Option<FrameId> {
        self.map.get(&(file, page_no)).copied()
    }

    /// Remove a mapping. The caller guarantees the key is present.
    pub fn remove(&mut self, file: FileId, page_no: PageId) {
        let prior = self.map.remove(&(file, page_no));
        debug_assert!(prior.is_some(), "removal of absent page table entry");
    }

    /// Number of resident pages.
    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Whether the table is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_lookup_remove() {
        let mut table = PageTable::with_capacity(4);
        let file = FileId::new(1);

        assert_eq!(table.lookup(file, PageId::new(7)), None);

        table.insert(file, PageId::new(7), FrameId::new(2));
        assert_eq!(table.lookup(file, PageId::new(7)), Some(FrameId::new(2)));
        assert_eq!(table.len(), 1);

        table.remove(file, PageId::new(7));
        assert_eq!(table.lookup(file, PageId::new(7)), None);
        assert!(table.is_empty());
    }

    #[test]
    fn test_same_page_distinct_files() {
        let mut table = PageTable::with_capacity(4);
        let file_a = FileId::new(1);
        let file_b = FileId::new(2);

        table.insert(file_a, PageId::new(3), FrameId::new(0));
        table.insert(file_b, PageId::new(3), FrameId::new(1));

        assert_eq!(table.lookup(file_a, PageId::new(3)), Some(FrameId::new(0)));
        assert_eq!(table.lookup(file_b, PageId::new(3)), Some(FrameId::new(1)));
    }
}
