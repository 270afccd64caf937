//! Reallocation engine: `Heap::realloc`.

use core::ptr::NonNull;

use crate::block::WORD;
use crate::config::REALLOC_MULT;
use crate::heap::Heap;
use crate::placement::adjust_request;
use crate::segment::SegmentProvider;
use crate::alloc_trace;

impl<P: SegmentProvider> Heap<P> {
    /// `oldptr == None` behaves like `alloc(newsz)`. `newsz == 0` with a
    /// live `oldptr` frees it (through this allocator's own `free`, never an
    /// external one) and returns `None`.
    pub fn realloc(&mut self, oldptr: Option<NonNull<u8>>, newsz: usize) -> Option<NonNull<u8>> {
        let Some(old) = oldptr else {
            return self.alloc(newsz);
        };
        if newsz == 0 {
            self.free(Some(old));
            return None;
        }

        unsafe {
            let bp = self.offset_of(old);
            let oldsz = self.size(bp);
            let a = adjust_request(newsz);

            // In-place shrink/reuse: no splitting of the tail.
            if a <= oldsz {
                return Some(old);
            }

            // Forward absorption: grow into a free successor in place.
            let succ = self.next_block(bp);
            if !self.curr_alloc(succ) {
                let succ_size = self.size(succ);
                let combined = oldsz + succ_size + WORD;
                if combined >= a {
                    let own_prev_alloc = self.prev_alloc(bp);
                    let after = self.next_block(succ);
                    self.bucket_remove(succ);
                    self.write_header(bp, combined, true, own_prev_alloc);
                    self.write_footer(bp);
                    self.set_prev_alloc(after, true);
                    alloc_trace!("segalloc: realloc absorbed successor, bp={} new size={}", bp, combined);
                    return Some(old);
                }
            }

            // Fallback: allocate, copy, free.
            let grown = newsz.saturating_mul(REALLOC_MULT);
            let new_ptr = self.alloc(grown)?;
            let copy_len = core::cmp::min(oldsz as usize, newsz);
            core::ptr::copy_nonoverlapping(old.as_ptr(), new_ptr.as_ptr(), copy_len);
            self.free(Some(old));
            alloc_trace!("segalloc: realloc fell back to copy, {} -> {} bytes", oldsz, newsz);
            Some(new_ptr)
        }
    }
}
