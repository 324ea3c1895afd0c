//! Write-ahead log manager — out of scope per spec §1 ("the log manager;
//! the core merely notes where log flushes would be invoked").
//!
//! The buffer pool manager holds one of these so the shape is in place for
//! recovery integration later, but nothing in its correctness contract
//! depends on it.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct LogManager {
    next_lsn: AtomicU64,
}

impl LogManager {
    pub fn new() -> Self {
        LogManager {
            next_lsn: AtomicU64::new(0),
        }
    }

    /// Where a buffer pool flush would first have to force the log up to,
    /// under WAL (write-ahead logging must hit disk before the data page
    /// that depends on it). Unused by the core today.
    pub fn next_lsn(&self) -> u64 {
        self.next_lsn.load(Ordering::SeqCst)
    }

    pub fn advance_lsn(&self) -> u64 {
        self.next_lsn.fetch_add(1, Ordering::SeqCst)
    }
}
