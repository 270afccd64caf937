//! Contract for the OS-facing heap segment provider.
//!
//! Reserving and extending the page-granular backing memory is someone
//! else's job (a real `mmap`, `brk`, or `VirtualAlloc`-based
//! implementation). The core only needs the four operations below,
//! expressed generically so `Heap<P>` works over any implementation
//! without the core knowing how pages are actually obtained.

use core::ptr::NonNull;

/// A source of page-granular, contiguous, never-moving backing memory.
///
/// # Contract
///
/// - `init_heap_segment` succeeds at most once per instance.
/// - `extend_heap_segment` always appends immediately after the current end
///   of the segment; the returned pointer equals the old end, and bytes
///   already handed out are never moved or invalidated.
/// - All returned pointers are 8-byte aligned.
pub trait SegmentProvider {
    /// Size of one page in bytes. Must not change over the provider's lifetime.
    fn page_size(&self) -> usize;

    /// Reserve `n_pages` contiguous pages as the initial heap segment.
    ///
    /// Returns `None` if the reservation fails, or if a segment was already
    /// reserved by a prior call.
    fn init_heap_segment(&mut self, n_pages: usize) -> Option<NonNull<u8>>;

    /// Append `n_pages` additional pages immediately after the current end
    /// of the segment.
    ///
    /// Returns `None` on failure (e.g. the provider is exhausted). The
    /// returned pointer equals the prior `heap_segment_size()` added to the
    /// segment's base.
    fn extend_heap_segment(&mut self, n_pages: usize) -> Option<NonNull<u8>>;

    /// Total size in bytes of the segment reserved so far (0 before init).
    fn heap_segment_size(&self) -> usize;
}
