//! Plain LRU replacer (spec component B).
//!
//! Tracks which unpinned frames are eligible for eviction, and in what
//! order: the least-recently-unpinned frame is always the next victim.
//!
//! The teacher repo's [`crate`]-adjacent lab used an `LRUKReplacer`
//! (`lru_k_replacer.rs`) tracking per-frame k-length access histories and
//! backward k-distances — useful for approximating "hot" pages over a
//! longer window, but out of scope here (spec explicitly excludes LRU-K and
//! CLOCK; only plain LRU is in scope). This replacer is also not generic
//! over element type (the teacher's LRU-K was parameterized in spirit over
//! frame ids only anyway; genericity bought nothing — spec §9 calls this a
//! non-requirement).
//!
//! Representation follows spec §9's recommendation: an arena + indices
//! doubly linked list rather than the bustub C++ original's `unique_ptr`
//! chain (`lru_replacer.cpp`). The "arena" here is just two `Vec`s sized to
//! the pool, indexed directly by `FrameId` — no separate allocation on
//! insert, no aliasing.

use crate::common::FrameId;

/// O(1) insert/remove/evict plain-LRU set of eviction-eligible frames.
pub struct LruReplacer {
    prev: Vec<Option<FrameId>>,
    next: Vec<Option<FrameId>>,
    present: Vec<bool>,
    /// Head of the list: the next victim (least recently unpinned).
    head: Option<FrameId>,
    /// Tail of the list: the most recently unpinned.
    tail: Option<FrameId>,
    size: usize,
}

impl LruReplacer {
    /// `pool_size` bounds the frame ids this replacer will ever see.
    pub fn new(pool_size: usize) -> Self {
        LruReplacer {
            prev: vec![None; pool_size],
            next: vec![None; pool_size],
            present: vec![false; pool_size],
            head: None,
            tail: None,
            size: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Removes and returns the least-recently-unpinned frame, or `None` if
    /// the replacer is empty.
    pub fn victim(&mut self) -> Option<FrameId> {
        let frame_id = self.head?;
        self.detach(frame_id);
        Some(frame_id)
    }

    /// Removes `frame_id` from the eviction set if present. No-op if
    /// absent. Called whenever a frame becomes ineligible for eviction
    /// (pin count rising from 0, or the frame being repurposed/deleted).
    pub fn pin(&mut self, frame_id: FrameId) {
        if self.present[frame_id] {
            self.detach(frame_id);
        }
    }

    /// Inserts `frame_id` at the most-recently-used end if not already
    /// present. A no-op if already present, keeping its original LRU
    /// position (spec §4.B / §9 open question; matches the reference
    /// semantics this spec adopts).
    pub fn unpin(&mut self, frame_id: FrameId) {
        if !self.present[frame_id] {
            self.append(frame_id);
        }
    }

    fn append(&mut self, frame_id: FrameId) {
        self.prev[frame_id] = self.tail;
        self.next[frame_id] = None;
        match self.tail {
            Some(t) => self.next[t] = Some(frame_id),
            None => self.head = Some(frame_id),
        }
        self.tail = Some(frame_id);
        self.present[frame_id] = true;
        self.size += 1;
    }

    fn detach(&mut self, frame_id: FrameId) {
        let p = self.prev[frame_id];
        let n = self.next[frame_id];
        match p {
            Some(pp) => self.next[pp] = n,
            None => self.head = n,
        }
        match n {
            Some(nn) => self.prev[nn] = p,
            None => self.tail = p,
        }
        self.prev[frame_id] = None;
        self.next[frame_id] = None;
        self.present[frame_id] = false;
        self.size -= 1;
    }
}
