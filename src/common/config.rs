//! Compile-time configuration.

/// Bytes per page: the granularity of every disk transfer and of every
/// pool frame.
///
/// Page `n` of a file lives at byte offset `n × PAGE_SIZE`, and frames
/// are aligned to this value for direct I/O. Changing it changes the
/// on-disk layout, so it is a constant rather than a runtime knob.
pub const PAGE_SIZE: usize = 4096;
