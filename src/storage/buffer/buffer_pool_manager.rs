//! Buffer pool manager (spec component E): the public API that owns the
//! frame array, page table, free list, and replacer, and coordinates disk
//! I/O under a single mutex.
//!
//! # Concurrency
//! Every public operation acquires the pool's inner mutex on entry and
//! releases it on every exit path (spec §5): the external history
//! of `fetch_page`/`new_page`/`unpin_page`/`flush_page`/`delete_page` calls
//! is equivalent to some serial order. Disk I/O runs synchronously while
//! the lock is held, which is the simple, scalability-limited baseline the
//! spec explicitly sanctions over a finer-grained refinement.
//!
//! Each frame's byte buffer is additionally wrapped in its own
//! `parking_lot::Mutex` so a [`PageHandle`] returned by `fetch_page`/
//! `new_page` can be read and written by its caller *after* the pool's
//! mutex has been released, for as long as the caller holds the handle
//! pinned — the "shared resource while pinned" contract of spec §5.
//! Concurrent writers to the same frame still need a higher-level latch;
//! that coordination lives above this core.

use std::sync::Arc;

use log::{debug, trace, warn};
use parking_lot::Mutex;

use crate::common::{BufferPoolConfig, Error, FrameId, PageId, Result, PAGE_SIZE};
use crate::storage::disk::DiskManager;
use crate::storage::log::LogManager;
use crate::storage::page::Frame;

use super::free_list::FreeList;
use super::lru_replacer::LruReplacer;
use super::page_table::PageTable;

/// A cloneable, independently-lockable reference to one buffer pool frame.
///
/// Holding a `PageHandle` does **not** keep the page pinned by itself —
/// pinning is tracked by [`Frame::pin_count`], which the manager increments
/// on `fetch_page`/`new_page` and decrements on `unpin_page`. Callers must
/// unpin everything they fetch.
pub type PageHandle = Arc<Mutex<Frame>>;

struct Inner {
    page_table: PageTable,
    free_list: FreeList,
    replacer: LruReplacer,
    disk_manager: DiskManager,
}

/// Reads disk pages to and from a fixed-size in-memory buffer pool.
pub struct BufferPoolManager {
    pool_size: usize,
    /// Array of buffer pool frames. Allocated once at construction; a
    /// frame's index here is its `FrameId` for the pool's entire lifetime.
    frames: Vec<PageHandle>,
    inner: Mutex<Inner>,
    /// Held for future recovery integration; never consulted for
    /// correctness (spec §6).
    log_manager: LogManager,
}

impl BufferPoolManager {
    pub fn new(config: BufferPoolConfig, disk_manager: DiskManager) -> Self {
        config.validate();
        let pool_size = config.pool_size;
        let frames = (0..pool_size)
            .map(|_| Arc::new(Mutex::new(Frame::empty())))
            .collect();

        BufferPoolManager {
            pool_size,
            frames,
            inner: Mutex::new(Inner {
                page_table: PageTable::new(),
                free_list: FreeList::with_all_frames(pool_size),
                replacer: LruReplacer::new(pool_size),
                disk_manager,
            }),
            log_manager: LogManager::new(),
        }
    }

    pub fn builder() -> BufferPoolManagerBuilder {
        BufferPoolManagerBuilder::default()
    }

    pub fn new_with_handle(config: BufferPoolConfig, disk_manager: DiskManager) -> Arc<Self> {
        Arc::new(Self::new(config, disk_manager))
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn log_manager(&self) -> &LogManager {
        &self.log_manager
    }

    pub fn page_count(&self) -> usize {
        self.inner.lock().page_table.len()
    }

    pub fn free_frame_count(&self) -> usize {
        self.inner.lock().free_list.len()
    }

    pub fn replacer_size(&self) -> usize {
        self.inner.lock().replacer.size()
    }

    /// Picks a frame from the free list first, falling back to the
    /// replacer's victim. `None` means every frame is pinned.
    fn acquire_frame(inner: &mut Inner) -> Option<FrameId> {
        if let Some(frame_id) = inner.free_list.pop() {
            return Some(frame_id);
        }
        inner.replacer.victim()
    }

    /// Writes back `frame_id`'s data if dirty and detaches its old page id
    /// from the page table, in preparation for the frame being repurposed
    /// for a different page (spec §4.E steps 4-6 of Fetch, 1/3/4 of
    /// NewPage).
    fn reclaim_frame(&self, inner: &mut Inner, frame_id: FrameId) -> Result<()> {
        let handle = &self.frames[frame_id];
        let frame = handle.lock();
        assert_eq!(
            frame.pin_count(),
            0,
            "a frame handed out by the free list or replacer must be unpinned"
        );

        let old_id = frame.page_id();
        if frame.is_dirty() && old_id.is_valid() {
            trace!("reclaim_frame writing back dirty page {old_id} from frame {frame_id}");
            if let Err(err) = inner.disk_manager.write_page(old_id, frame.data()) {
                // The frame was already pulled out of the free list/replacer by
                // acquire_frame. Put it back in the replacer so it stays
                // eligible for eviction instead of being stranded: still in
                // page_table with pin_count == 0 but nowhere the next
                // acquire_frame call would find it.
                drop(frame);
                inner.replacer.unpin(frame_id);
                return Err(err);
            }
        }
        if old_id.is_valid() {
            inner.page_table.remove(old_id);
        }
        Ok(())
    }

    /// Fetches `page_id` into the buffer pool, pinning it. Reading it a
    /// second time while still pinned is a cache hit and pins it again
    /// (spec §4.E step 2 — `Pin` is called unconditionally on hit, not just
    /// when the count rises from zero, to stay compatible with replacers
    /// that want every access notified).
    pub fn fetch_page(&self, page_id: PageId) -> Result<PageHandle> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId);
        }

        let mut inner = self.inner.lock();

        if let Some(frame_id) = inner.page_table.get(page_id) {
            let handle = self.frames[frame_id].clone();
            handle.lock().pin();
            inner.replacer.pin(frame_id);
            trace!("fetch_page({page_id}) hit in frame {frame_id}");
            return Ok(handle);
        }

        let frame_id = Self::acquire_frame(&mut inner).ok_or(Error::NoFreeFrame)?;
        self.reclaim_frame(&mut inner, frame_id)?;

        let handle = self.frames[frame_id].clone();
        let mut buf = [0u8; PAGE_SIZE];
        inner.disk_manager.read_page(page_id, &mut buf)?;
        {
            let mut frame = handle.lock();
            *frame.data_mut() = buf;
            frame.set_page_id(page_id);
            frame.set_dirty(false);
            frame.pin();
        }
        inner.page_table.insert(page_id, frame_id);
        debug!("fetch_page({page_id}) miss, loaded into frame {frame_id}");
        Ok(handle)
    }

    /// Allocates a fresh page id and loads it, pinned, into the buffer
    /// pool. Fails with [`Error::NoFreeFrame`] if every frame is pinned.
    pub fn new_page(&self) -> Result<(PageId, PageHandle)> {
        let mut inner = self.inner.lock();

        let frame_id = Self::acquire_frame(&mut inner).ok_or(Error::NoFreeFrame)?;
        self.reclaim_frame(&mut inner, frame_id)?;

        let page_id = inner.disk_manager.allocate_page();
        let handle = self.frames[frame_id].clone();
        {
            let mut frame = handle.lock();
            frame.reset_memory();
            frame.set_page_id(page_id);
            frame.set_dirty(false);
            frame.pin();
        }
        inner.page_table.insert(page_id, frame_id);
        debug!("new_page allocated {page_id} in frame {frame_id}");
        Ok((page_id, handle))
    }

    /// Decrements `page_id`'s pin count, marking it evictable once it
    /// reaches zero. `is_dirty` is sticky: passing `false` never clears a
    /// dirty flag set by a previous unpin.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> Result<()> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId);
        }

        let mut inner = self.inner.lock();
        let frame_id = inner
            .page_table
            .get(page_id)
            .ok_or(Error::NotCached(page_id))?;

        let newly_evictable = {
            let mut frame = self.frames[frame_id].lock();
            if frame.pin_count() == 0 {
                warn!("unpin_page({page_id}) called with pin count already zero");
                return Err(Error::AlreadyUnpinned(page_id));
            }
            frame.unpin();
            if is_dirty {
                frame.set_dirty(true);
            }
            frame.pin_count() == 0
        };

        if newly_evictable {
            inner.replacer.unpin(frame_id);
        }
        Ok(())
    }

    /// Writes `page_id`'s current bytes to disk, regardless of its dirty
    /// flag. The dirty flag itself is left untouched (spec §9 open
    /// question: the reference implementation does not clear it on
    /// flush).
    pub fn flush_page(&self, page_id: PageId) -> Result<()> {
        let mut inner = self.inner.lock();
        let frame_id = inner
            .page_table
            .get(page_id)
            .ok_or(Error::NotCached(page_id))?;
        let frame = self.frames[frame_id].lock();
        inner.disk_manager.write_page(page_id, frame.data())?;
        trace!("flush_page({page_id}) wrote frame {frame_id}");
        Ok(())
    }

    /// Flushes every cached page. Non-atomic across pages: each flush is
    /// independently linearized (spec §4.E).
    pub fn flush_all_pages(&self) -> Result<()> {
        let page_ids: Vec<PageId> = {
            let inner = self.inner.lock();
            inner.page_table.page_ids().collect()
        };
        for page_id in page_ids {
            self.flush_page(page_id)?;
        }
        Ok(())
    }

    /// Deletes `page_id` from the buffer pool and tells the disk manager to
    /// free its id. Absence is success (idempotent); a pinned page is
    /// refused.
    pub fn delete_page(&self, page_id: PageId) -> Result<()> {
        if !page_id.is_valid() {
            return Err(Error::InvalidPageId);
        }

        let mut inner = self.inner.lock();
        let frame_id = match inner.page_table.get(page_id) {
            Some(frame_id) => frame_id,
            None => return Ok(()),
        };

        {
            let frame = self.frames[frame_id].lock();
            if frame.pin_count() > 0 {
                return Err(Error::StillPinned(page_id));
            }
        }

        inner.page_table.remove(page_id);
        inner.replacer.pin(frame_id); // defensive: ensure it is out of the replacer
        inner.disk_manager.deallocate_page(page_id);

        {
            let mut frame = self.frames[frame_id].lock();
            frame.set_page_id(PageId::INVALID);
            frame.set_dirty(false);
        }
        inner.free_list.push(frame_id);
        debug!("delete_page({page_id}) freed frame {frame_id}");
        Ok(())
    }
}

#[derive(Default)]
pub struct BufferPoolManagerBuilder {
    config: Option<BufferPoolConfig>,
    disk_manager: Option<DiskManager>,
}

impl BufferPoolManagerBuilder {
    pub fn pool_size(mut self, pool_size: usize) -> Self {
        let mut config = self.config.unwrap_or_default();
        config.pool_size = pool_size;
        self.config = Some(config);
        self
    }

    pub fn config(mut self, config: BufferPoolConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn disk_manager(mut self, disk_manager: DiskManager) -> Self {
        self.disk_manager = Some(disk_manager);
        self
    }

    pub fn build(self) -> BufferPoolManager {
        let config = self.config.expect("`pool_size`/`config` not set before build");
        let disk_manager = self
            .disk_manager
            .expect("`disk_manager` not set before build");
        BufferPoolManager::new(config, disk_manager)
    }

    pub fn build_with_handle(self) -> Arc<BufferPoolManager> {
        Arc::new(self.build())
    }
}
