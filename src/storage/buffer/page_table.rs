//! Page table (spec component D): `page_id -> frame_id` for cached pages.
//!
//! No synchronization of its own — protected by the buffer pool manager's
//! single mutex, same as every other component here.

use std::collections::HashMap;

use crate::common::{FrameId, PageId};

#[derive(Debug, Default)]
pub struct PageTable {
    map: HashMap<PageId, FrameId>,
}

impl PageTable {
    pub fn new() -> Self {
        PageTable {
            map: HashMap::new(),
        }
    }

    pub fn get(&self, page_id: PageId) -> Option<FrameId> {
        self.map.get(&page_id).copied()
    }

    pub fn insert(&mut self, page_id: PageId, frame_id: FrameId) {
        self.map.insert(page_id, frame_id);
    }

    pub fn remove(&mut self, page_id: PageId) -> Option<FrameId> {
        self.map.remove(&page_id)
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn page_ids(&self) -> impl Iterator<Item = PageId> + '_ {
        self.map.keys().copied()
    }
}
