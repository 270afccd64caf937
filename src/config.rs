//! Compile-time tunables.
//!
//! The search-policy switch itself (first-fit vs. best-fit) lives as the
//! `best-fit` Cargo feature rather than a constant here, since it changes
//! which code path is compiled in, not a runtime value.

/// Number of pages requested from the segment provider on `Heap::init`.
pub const INIT_NPAGES: usize = 3;

/// Multiplier applied to the requested size only on `realloc`'s copy-fallback
/// path. `1` reproduces the size exactly; values above `1` over-allocate to
/// cut down on future fallback copies for growth-heavy reallocation
/// patterns, at the cost of extra internal fragmentation.
pub const REALLOC_MULT: usize = 1;
