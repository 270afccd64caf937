//! Coalescing engine: `Heap::free` and its four-case merge logic.

use core::ptr::NonNull;

use crate::block::WORD;
use crate::buckets::bucket_index;
use crate::heap::Heap;
use crate::segment::SegmentProvider;
use crate::alloc_trace;

impl<P: SegmentProvider> Heap<P> {
    /// Free a previously-allocated pointer, coalescing with free neighbors.
    /// A `None` pointer is a no-op.
    pub fn free(&mut self, ptr: Option<NonNull<u8>>) {
        let Some(ptr) = ptr else { return };
        unsafe {
            let bp = self.offset_of(ptr);
            let size = self.size(bp);
            let own_prev_alloc = self.prev_alloc(bp);
            let prev_free = !own_prev_alloc;

            let next = self.next_block(bp);
            let next_free = !self.curr_alloc(next);

            match (prev_free, next_free) {
                (false, false) => {
                    self.write_header(bp, size, false, own_prev_alloc);
                    self.write_footer(bp);
                    self.set_prev_alloc(next, false);
                    self.bucket_insert(bp);
                    alloc_trace!("segalloc: freed bp={} (no coalesce)", bp);
                }
                (false, true) => {
                    let next_size = self.size(next);
                    self.bucket_remove(next);
                    let new_size = size + next_size + WORD;
                    self.write_header(bp, new_size, false, own_prev_alloc);
                    self.write_footer(bp);
                    self.bucket_insert(bp);
                    alloc_trace!("segalloc: freed bp={} coalesced forward into {}", bp, new_size);
                }
                (true, false) => {
                    let q = self.prev_block(bp);
                    let old_bucket = bucket_index(self.size(q));
                    let q_prev_alloc = self.prev_alloc(q);
                    let new_size = self.size(q) + size + WORD;
                    self.write_header(q, new_size, false, q_prev_alloc);
                    self.write_footer(q);
                    self.bucket_update(q, old_bucket);
                    self.set_prev_alloc(next, false);
                    alloc_trace!("segalloc: freed bp={} coalesced backward into q={} size={}", bp, q, new_size);
                }
                (true, true) => {
                    let q = self.prev_block(bp);
                    let old_bucket = bucket_index(self.size(q));
                    let q_prev_alloc = self.prev_alloc(q);
                    let next_size = self.size(next);
                    self.bucket_remove(next);
                    let new_size = self.size(q) + size + next_size + 2 * WORD;
                    self.write_header(q, new_size, false, q_prev_alloc);
                    self.write_footer(q);
                    self.bucket_update(q, old_bucket);
                    alloc_trace!("segalloc: freed bp={} coalesced both ways into q={} size={}", bp, q, new_size);
                }
            }
        }
    }
}
