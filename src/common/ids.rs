//! Identifiers shared across the storage layer.

use std::fmt;

/// Logical identifier for a page on disk.
///
/// `PageId::INVALID` is the sentinel used throughout the buffer pool to mean
/// "no page" — it must never be looked up in the page table or handed to the
/// disk manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub i64);

impl PageId {
    pub const INVALID: PageId = PageId(-1);

    pub fn is_valid(self) -> bool {
        self != PageId::INVALID
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for PageId {
    fn from(v: i64) -> Self {
        PageId(v)
    }
}

/// Index of a frame slot in the buffer pool's fixed-size frame array.
///
/// Frame identities are stable for the lifetime of the pool; a `FrameId` is
/// just an offset, never reallocated.
pub type FrameId = usize;
