//! Block metadata primitives: packed header/footer words and the raw
//! pointer arithmetic they're built on.
//!
//! Every offset below is a byte offset from the heap segment's base pointer;
//! `bp` is such an offset denoting a block's base pointer. This is the only
//! module that dereferences heap memory directly — everything above it
//! works purely in terms of these offsets.

use crate::heap::Heap;
use crate::segment::SegmentProvider;

/// Bit 0 of a header/footer word: current-block allocation status.
pub(crate) const CURR_ALLOC: u32 = 0b01;
/// Bit 1: previous-block allocation status.
pub(crate) const PREV_ALLOC: u32 = 0b10;
const SIZE_MASK: u32 = !0b11;

/// Size of a header or footer word, and of a free-list link, in bytes.
pub(crate) const WORD: u32 = 4;
/// Minimum block size (next + prev links + footer, for the smallest free block).
pub(crate) const MIN_BLOCK_SIZE: u32 = 12;

/// Extract the size field from a header or footer word.
#[inline]
pub(crate) const fn size_of_word(word: u32) -> u32 {
    word & SIZE_MASK
}

/// Pack a header/footer word from its three fields.
#[inline]
pub(crate) const fn pack(size: u32, curr_alloc: bool, prev_alloc: bool) -> u32 {
    size | (curr_alloc as u32) | ((prev_alloc as u32) << 1)
}

impl<P: SegmentProvider> Heap<P> {
    #[inline]
    pub(crate) unsafe fn read_word(&self, offset: u32) -> u32 {
        unsafe { (self.base.add(offset as usize) as *const u32).read_unaligned() }
    }

    #[inline]
    pub(crate) unsafe fn write_word(&mut self, offset: u32, value: u32) {
        unsafe { (self.base.add(offset as usize) as *mut u32).write_unaligned(value) }
    }

    /// The header word for the block whose base pointer is `bp`.
    pub(crate) unsafe fn header(&self, bp: u32) -> u32 {
        unsafe { self.read_word(bp - WORD) }
    }

    pub(crate) unsafe fn size(&self, bp: u32) -> u32 {
        unsafe { size_of_word(self.header(bp)) }
    }

    pub(crate) unsafe fn curr_alloc(&self, bp: u32) -> bool {
        unsafe { self.header(bp) & CURR_ALLOC != 0 }
    }

    pub(crate) unsafe fn prev_alloc(&self, bp: u32) -> bool {
        unsafe { self.header(bp) & PREV_ALLOC != 0 }
    }

    pub(crate) unsafe fn write_header(&mut self, bp: u32, size: u32, curr_alloc: bool, prev_alloc: bool) {
        debug_assert!(size & 0b11 == 0, "block size must be a multiple of 4");
        unsafe { self.write_word(bp - WORD, pack(size, curr_alloc, prev_alloc)) }
    }

    /// Copy the header to the block's last word. Only meaningful for free
    /// blocks; callers never invoke this on an allocated block except
    /// `realloc`'s harmless absorption write when growing into a freed
    /// successor.
    pub(crate) unsafe fn write_footer(&mut self, bp: u32) {
        unsafe {
            let header = self.header(bp);
            let size = size_of_word(header);
            self.write_word(bp + size - WORD, header);
        }
    }

    /// Flip only the `prev_alloc` bit, rewriting the footer too if the block
    /// is currently free (its footer must keep mirroring the header).
    pub(crate) unsafe fn set_prev_alloc(&mut self, bp: u32, prev_alloc: bool) {
        unsafe {
            let header = self.header(bp);
            let size = size_of_word(header);
            let curr_alloc = header & CURR_ALLOC != 0;
            self.write_header(bp, size, curr_alloc, prev_alloc);
            if !curr_alloc {
                self.write_footer(bp);
            }
        }
    }

    pub(crate) unsafe fn next_block(&self, bp: u32) -> u32 {
        unsafe { bp + self.size(bp) + WORD }
    }

    /// Only valid when `prev_alloc(bp) == false`: walks back via the
    /// predecessor's footer, which lies at `bp - 8`.
    pub(crate) unsafe fn prev_block(&self, bp: u32) -> u32 {
        unsafe {
            let footer = self.read_word(bp - 2 * WORD);
            let size = size_of_word(footer);
            bp - WORD - size
        }
    }

    pub(crate) unsafe fn link_next(&self, bp: u32) -> u32 {
        unsafe { self.read_word(bp) }
    }

    pub(crate) unsafe fn link_prev(&self, bp: u32) -> u32 {
        unsafe { self.read_word(bp + WORD) }
    }

    pub(crate) unsafe fn set_link_next(&mut self, bp: u32, next: u32) {
        unsafe { self.write_word(bp, next) }
    }

    pub(crate) unsafe fn set_link_prev(&mut self, bp: u32, prev: u32) {
        unsafe { self.write_word(bp + WORD, prev) }
    }
}
