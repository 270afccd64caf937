//! Placement engine: `Heap::alloc`.

use core::ptr::NonNull;

use crate::block::{MIN_BLOCK_SIZE, WORD};
use crate::buckets::NULL;
use crate::heap::Heap;
use crate::segment::SegmentProvider;
use crate::alloc_trace;

/// Translate a requested payload size to a block size: `r <= 12` maps to
/// `12`; otherwise `roundup(r - 4, 8) + 4`.
pub(crate) fn adjust_request(r: usize) -> u32 {
    if r <= 12 {
        12
    } else {
        let r = r as u32;
        round_up(r - 4, 8) + 4
    }
}

fn round_up(x: u32, align: u32) -> u32 {
    (x + align - 1) & !(align - 1)
}

impl<P: SegmentProvider> Heap<P> {
    /// Allocate `requested` bytes. Returns `None` for a zero-size request,
    /// an uninitialized heap, or provider exhaustion.
    pub fn alloc(&mut self, requested: usize) -> Option<NonNull<u8>> {
        if requested == 0 || !self.is_initialized() {
            return None;
        }
        let a = adjust_request(requested);

        unsafe {
            let mut block = self.find_fit(a);
            if block == NULL {
                let page_size = self.provider.page_size() as u32;
                let nbytes = round_up(a, page_size);
                block = self.extend(nbytes)?;
            }
            let allocated = self.place(block, a);
            Some(self.ptr_at(allocated))
        }
    }

    /// Decide split-vs-whole for `block` (already known to fit `a`) and
    /// hand out the allocated region. Returns the `bp` of the allocated
    /// block, which is `block` itself when consumed whole, or the
    /// higher-address half when split (the free remainder keeps `block`'s
    /// address so the lower addresses in a long-lived free region stay
    /// stable across repeated splits).
    unsafe fn place(&mut self, block: u32, a: u32) -> u32 {
        unsafe {
            let block_size = self.size(block) as i64;
            let left = block_size - a as i64 - WORD as i64;
            let prev_alloc = self.prev_alloc(block);
            self.bucket_remove(block);

            if left < MIN_BLOCK_SIZE as i64 {
                self.write_header(block, block_size as u32, true, prev_alloc);
                let succ = self.next_block(block);
                self.set_prev_alloc(succ, true);
                alloc_trace!("segalloc: consumed whole block bp={} size={}", block, block_size);
                block
            } else {
                let left = left as u32;
                self.write_header(block, left, false, prev_alloc);
                self.write_footer(block);
                self.bucket_insert(block);

                let alloc_bp = self.next_block(block);
                self.write_header(alloc_bp, a, true, false);
                let succ = self.next_block(alloc_bp);
                self.set_prev_alloc(succ, true);
                alloc_trace!(
                    "segalloc: split block bp={} into free={} (size {}) + alloc={} (size {})",
                    block, block, left, alloc_bp, a
                );
                alloc_bp
            }
        }
    }
}
