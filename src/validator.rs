//! Validator / inspection: a read-only two-pass invariant checker.
//!
//! Walks the heap and the bucket lists and reports the first invariant
//! violation it finds, so it is usable from tests instead of only as a
//! diagnostic print.

use crate::block::{size_of_word, CURR_ALLOC, PREV_ALLOC, WORD};
use crate::buckets::{bucket_index, NBUCKETS, NULL};
use crate::heap::Heap;
use crate::segment::SegmentProvider;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    /// `bp` is not 8-byte aligned.
    Misaligned { bp: u32 },
    /// `bp` lies outside the reserved segment.
    OutOfBounds { bp: u32 },
    /// A free block's footer doesn't mirror its header.
    HeaderFooterMismatch { bp: u32 },
    /// A block's `prev_alloc` bit disagrees with the previous block's
    /// actual allocation status.
    PrevAllocMismatch { bp: u32 },
    /// Two physically adjacent blocks are both free.
    AdjacentFreeBlocks { bp: u32 },
    /// A free block on the physical walk isn't filed in its expected bucket.
    BucketMembershipMissing { bp: u32, expected_bucket: usize },
    /// A block filed in bucket `bucket` doesn't belong there by size.
    BucketSizeMismatch { bucket: usize, bp: u32 },
    /// A bucket list's backward pointers don't agree with the forward walk.
    ListLinkBroken { bucket: usize, bp: u32 },
    /// The physical walk never reached the epilogue within the segment size.
    EpilogueUnreachable,
}

impl<P: SegmentProvider> Heap<P> {
    /// Check the heap's structural invariants. Returns the first
    /// violation found.
    pub fn validate(&self) -> Result<(), Violation> {
        self.validate_physical_walk()?;
        self.validate_bucket_lists()?;
        Ok(())
    }

    fn validate_physical_walk(&self) -> Result<(), Violation> {
        unsafe {
            let mut bp: u32 = 8;
            let mut prev_was_free = false;
            let limit = self.size as u32;

            loop {
                if bp >= limit {
                    return Err(Violation::EpilogueUnreachable);
                }
                if bp % 8 != 0 {
                    return Err(Violation::Misaligned { bp });
                }

                let header = self.header(bp);
                let size = size_of_word(header);
                if size == 0 {
                    // Epilogue reached.
                    return Ok(());
                }

                if bp + size > limit {
                    return Err(Violation::OutOfBounds { bp });
                }

                let curr_alloc = header & CURR_ALLOC != 0;
                let prev_alloc = header & PREV_ALLOC != 0;
                if prev_alloc == prev_was_free {
                    return Err(Violation::PrevAllocMismatch { bp });
                }

                if !curr_alloc {
                    let footer = self.read_word(bp + size - WORD);
                    if footer != header {
                        return Err(Violation::HeaderFooterMismatch { bp });
                    }
                    if prev_was_free {
                        return Err(Violation::AdjacentFreeBlocks { bp });
                    }
                    let expected_bucket = bucket_index(size);
                    if !self.bucket_list_contains(expected_bucket, bp) {
                        return Err(Violation::BucketMembershipMissing { bp, expected_bucket });
                    }
                }

                prev_was_free = !curr_alloc;
                bp = self.next_block(bp);
            }
        }
    }

    fn validate_bucket_lists(&self) -> Result<(), Violation> {
        unsafe {
            for b in 0..NBUCKETS {
                let mut node = self.buckets[b];
                let mut expected_prev = NULL;
                while node != NULL {
                    if bucket_index(self.size(node)) != b {
                        return Err(Violation::BucketSizeMismatch { bucket: b, bp: node });
                    }
                    if self.link_prev(node) != expected_prev {
                        return Err(Violation::ListLinkBroken { bucket: b, bp: node });
                    }
                    expected_prev = node;
                    node = self.link_next(node);
                }
            }
            Ok(())
        }
    }

    fn bucket_list_contains(&self, b: usize, target: u32) -> bool {
        unsafe {
            let mut node = self.buckets[b];
            while node != NULL {
                if node == target {
                    return true;
                }
                node = self.link_next(node);
            }
        }
        false
    }
}
