//! Segregated free-list index.
//!
//! 30 head slots, each the root of a doubly-linked list of free blocks in one
//! power-of-two size class. Links are stored in-heap (see `block.rs`); the
//! head slots themselves live in the `Heap` struct, not on the heap, so
//! `remove` can't alias a head-slot address as if it were a node — it
//! branches on the null sentinel explicitly instead.

use crate::heap::Heap;
use crate::segment::SegmentProvider;

pub const NBUCKETS: usize = 30;
pub(crate) const NULL: u32 = 0;

/// First-fit: examine at most this many blocks per bucket before moving on.
pub const BUCKET_CUTOFF: usize = 5;
/// Best-fit: examine at most this many blocks per bucket before moving on.
pub const BEST_FIT_CUTOFF: usize = 15;

/// `bucket(s) = 30 - clz(s) - 2`, clamped to `[0, 29]`.
#[inline]
pub(crate) fn bucket_index(size: u32) -> usize {
    debug_assert!(size > 0, "bucket index is undefined for size 0");
    let idx = 30i32 - size.leading_zeros() as i32 - 2;
    idx.clamp(0, (NBUCKETS - 1) as i32) as usize
}

impl<P: SegmentProvider> Heap<P> {
    /// Insert `bp` at the head of its size class's list.
    pub(crate) unsafe fn bucket_insert(&mut self, bp: u32) {
        unsafe {
            let b = bucket_index(self.size(bp));
            let old_head = self.buckets[b];
            self.set_link_next(bp, old_head);
            self.set_link_prev(bp, NULL);
            if old_head != NULL {
                self.set_link_prev(old_head, bp);
            }
            self.buckets[b] = bp;
        }
    }

    /// Unlink `bp` from bucket `b`. Caller must pass the bucket `bp` is
    /// currently filed under (usually `bucket_index(size(bp))`, but see
    /// `bucket_update` for the resize case).
    unsafe fn bucket_unlink(&mut self, bp: u32, b: usize) {
        unsafe {
            let p = self.link_prev(bp);
            let n = self.link_next(bp);
            if p == NULL {
                self.buckets[b] = n;
            } else {
                self.set_link_next(p, n);
            }
            if n != NULL {
                self.set_link_prev(n, p);
            }
        }
    }

    /// Remove `bp` from the free-list index, using its current size to find
    /// which bucket it's in.
    pub(crate) unsafe fn bucket_remove(&mut self, bp: u32) {
        unsafe {
            let b = bucket_index(self.size(bp));
            self.bucket_unlink(bp, b);
        }
    }

    /// `bp`'s size field already reflects its *new* size; `old_bucket` is
    /// the bucket it was filed under before the resize. Moves it to the new
    /// bucket only if the bucket actually changed, leaving list pointers
    /// untouched otherwise.
    pub(crate) unsafe fn bucket_update(&mut self, bp: u32, old_bucket: usize) {
        unsafe {
            let new_bucket = bucket_index(self.size(bp));
            if new_bucket != old_bucket {
                self.bucket_unlink(bp, old_bucket);
                self.bucket_insert(bp);
            }
        }
    }

    /// First-fit search: ascend buckets from `bucket(target)`, giving up on
    /// a bucket after `BUCKET_CUTOFF` unsuccessful examinations.
    #[cfg(not(feature = "best-fit"))]
    pub(crate) unsafe fn find_first_fit(&self, target: u32) -> u32 {
        unsafe {
            for b in bucket_index(target)..NBUCKETS {
                let mut node = self.buckets[b];
                let mut examined = 0usize;
                while node != NULL && examined < BUCKET_CUTOFF {
                    if self.size(node) >= target {
                        return node;
                    }
                    examined += 1;
                    node = self.link_next(node);
                }
            }
            NULL
        }
    }

    /// Best-fit search: within each bucket, track the candidate with the
    /// least slack over `target`, examining at most `BEST_FIT_CUTOFF`
    /// blocks; return the best candidate from the first bucket that yields
    /// one.
    #[cfg(feature = "best-fit")]
    pub(crate) unsafe fn find_best_fit(&self, target: u32) -> u32 {
        unsafe {
            for b in bucket_index(target)..NBUCKETS {
                let mut node = self.buckets[b];
                let mut examined = 0usize;
                let mut best = NULL;
                let mut best_slack = u32::MAX;
                while node != NULL && examined < BEST_FIT_CUTOFF {
                    let sz = self.size(node);
                    if sz >= target {
                        let slack = sz - target;
                        if slack < best_slack {
                            best_slack = slack;
                            best = node;
                        }
                    }
                    examined += 1;
                    node = self.link_next(node);
                }
                if best != NULL {
                    return best;
                }
            }
            NULL
        }
    }

    /// Dispatches to the configured search policy, selected at compile time
    /// by the `best-fit` Cargo feature.
    pub(crate) unsafe fn find_fit(&self, target: u32) -> u32 {
        unsafe {
            #[cfg(feature = "best-fit")]
            {
                self.find_best_fit(target)
            }
            #[cfg(not(feature = "best-fit"))]
            {
                self.find_first_fit(target)
            }
        }
    }
}
