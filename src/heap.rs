//! Heap lifecycle: struct definition, initialization, and extension.

use core::ptr::NonNull;

use crate::block::WORD;
use crate::buckets::{bucket_index, NBUCKETS, NULL};
use crate::config::INIT_NPAGES;
use crate::segment::SegmentProvider;
use crate::{alloc_debug, alloc_warn};

/// A single growable heap: block-and-free-list engine plus the segment
/// provider backing it. `P` is the collaborator responsible for actually
/// reserving memory from the OS; nothing here is a process-wide singleton,
/// so multiple independent heaps can coexist, each with its own provider.
pub struct Heap<P: SegmentProvider> {
    pub(crate) provider: P,
    pub(crate) base: *mut u8,
    pub(crate) size: usize,
    pub(crate) buckets: [u32; NBUCKETS],
}

// SAFETY: `Heap` owns its segment outright and performs no concurrent access
// of its own; it assumes a single logical owner, so callers are responsible
// for external synchronization if a heap is ever shared across threads.
unsafe impl<P: SegmentProvider + Send> Send for Heap<P> {}

impl<P: SegmentProvider> Heap<P> {
    /// Build a heap over `provider` without reserving any memory yet; call
    /// `init` before the first `alloc`.
    pub const fn new(provider: P) -> Self {
        Self {
            provider,
            base: core::ptr::null_mut(),
            size: 0,
            buckets: [NULL; NBUCKETS],
        }
    }

    pub fn is_initialized(&self) -> bool {
        !self.base.is_null()
    }

    /// Reserve the initial segment and lay out the prologue, a single free
    /// block spanning the whole segment, and the epilogue. Returns `false`
    /// if the provider fails.
    pub fn init(&mut self) -> bool {
        if self.is_initialized() {
            return true;
        }
        let Some(base) = self.provider.init_heap_segment(INIT_NPAGES) else {
            alloc_warn!("segalloc: init_heap_segment({}) failed", INIT_NPAGES);
            return false;
        };
        self.base = base.as_ptr();
        self.size = self.provider.heap_segment_size();
        self.buckets = [NULL; NBUCKETS];

        unsafe {
            let bp: u32 = 8;
            let free_size = self.size as u32 - 8 - WORD;
            self.write_header(bp, free_size, false, true);
            self.write_footer(bp);
            self.bucket_insert(bp);

            let epilogue_bp = self.size as u32;
            self.write_header(epilogue_bp, 0, true, false);
        }
        true
    }

    /// Convert a client pointer into a `bp` offset from the segment base.
    pub(crate) fn offset_of(&self, ptr: NonNull<u8>) -> u32 {
        (ptr.as_ptr() as usize - self.base as usize) as u32
    }

    pub(crate) fn ptr_at(&self, bp: u32) -> NonNull<u8> {
        // SAFETY: `bp` is always a valid in-bounds offset produced by this
        // heap's own bookkeeping.
        unsafe { NonNull::new_unchecked(self.base.add(bp as usize)) }
    }

    /// Append whole pages covering at least `min_bytes`, coalesce with a
    /// free predecessor if one borders the old epilogue, and re-stamp the
    /// epilogue. Returns the `bp` of the now-free block the placement
    /// engine should consume, or `None` if the provider can't grow further.
    pub(crate) fn extend(&mut self, min_bytes: u32) -> Option<u32> {
        let page_size = self.provider.page_size() as u32;
        let n_pages = (min_bytes as usize).div_ceil(page_size as usize);
        let nbytes = n_pages as u32 * page_size;

        let old_epilogue_bp = self.size as u32;
        self.provider.extend_heap_segment(n_pages)?;
        self.size = self.provider.heap_segment_size();
        alloc_debug!("segalloc: extended heap by {} bytes ({} pages)", nbytes, n_pages);

        unsafe {
            let new_bp = old_epilogue_bp;
            let old_epilogue_header = self.read_word(new_bp - WORD);
            let predecessor_free = old_epilogue_header & crate::block::PREV_ALLOC == 0;

            let result_bp = if predecessor_free {
                let pred = self.prev_block(new_bp);
                let old_bucket = bucket_index(self.size(pred));
                let pred_prev_alloc = self.prev_alloc(pred);
                let new_size = self.size(pred) + nbytes;
                self.write_header(pred, new_size, false, pred_prev_alloc);
                self.write_footer(pred);
                self.bucket_update(pred, old_bucket);
                pred
            } else {
                self.write_header(new_bp, nbytes - WORD, false, true);
                self.write_footer(new_bp);
                self.bucket_insert(new_bp);
                new_bp
            };

            let new_epilogue_bp = self.size as u32;
            self.write_header(new_epilogue_bp, 0, true, false);

            Some(result_bp)
        }
    }
}
