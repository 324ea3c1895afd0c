//! Error kinds surfaced by the storage layer.
//!
//! Contract violations (invalid page ids, double-unpins, ...) are reported
//! here rather than left to panic, so callers — and tests — can exercise
//! them without crashing the process.

use std::fmt;

use crate::common::PageId;

#[derive(Debug)]
pub enum Error {
    /// Every frame is pinned; no victim is available for `fetch_page` or
    /// `new_page`.
    NoFreeFrame,
    /// `page_id` is not present in the page table.
    NotCached(PageId),
    /// `delete_page` was attempted on a page with a non-zero pin count.
    StillPinned(PageId),
    /// `unpin_page` was attempted on a frame whose pin count was already
    /// zero.
    AlreadyUnpinned(PageId),
    /// The `PageId::INVALID` sentinel was supplied where a real page id was
    /// required.
    InvalidPageId,
    /// A disk read, write, allocate, or deallocate failed.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NoFreeFrame => write!(f, "no free frame: every frame is pinned"),
            Error::NotCached(id) => write!(f, "page {id} is not in the buffer pool"),
            Error::StillPinned(id) => write!(f, "page {id} is still pinned"),
            Error::AlreadyUnpinned(id) => write!(f, "page {id} is already unpinned"),
            Error::InvalidPageId => write!(f, "invalid page id"),
            Error::Io(err) => write!(f, "disk i/o error: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
