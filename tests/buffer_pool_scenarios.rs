//! End-to-end scenarios exercising the buffer pool manager as a whole,
//! against a real file-backed disk manager in a temp directory.

use rand::Rng;
use rustydb::storage::disk::DiskManager;
use rustydb::{BufferPoolConfig, BufferPoolManager, Error, PageId, PAGE_SIZE};
use tempfile::tempdir;

fn pool(pool_size: usize) -> (BufferPoolManager, tempfile::TempDir) {
    let dir = tempdir().unwrap();
    let disk_manager = DiskManager::new(dir.path().join("scenario.db")).unwrap();
    (
        BufferPoolManager::new(BufferPoolConfig::new(pool_size), disk_manager),
        dir,
    )
}

#[test]
fn eviction_picks_the_least_recently_unpinned_frame() {
    use std::sync::Arc;

    let (bpm, _dir) = pool(3);

    let (p0, h0) = bpm.new_page().unwrap();
    let (p1, h1) = bpm.new_page().unwrap();
    let (p2, h2) = bpm.new_page().unwrap();

    // Unpin in order p1, p0, p2: p1 is now the least recently unpinned.
    bpm.unpin_page(p1, false).unwrap();
    bpm.unpin_page(p0, false).unwrap();
    bpm.unpin_page(p2, false).unwrap();

    // Pool is full; a fourth page must evict p1's frame, not p0's or p2's.
    let (_p3, h3) = bpm.new_page().unwrap();
    assert!(Arc::ptr_eq(&h1, &h3));

    // p0 and p2 are untouched: fetching them returns the same frame.
    let refetched_p0 = bpm.fetch_page(p0).unwrap();
    assert!(Arc::ptr_eq(&h0, &refetched_p0));
    bpm.unpin_page(p0, false).unwrap();

    let refetched_p2 = bpm.fetch_page(p2).unwrap();
    assert!(Arc::ptr_eq(&h2, &refetched_p2));
    bpm.unpin_page(p2, false).unwrap();
}

#[test]
fn pinned_pages_are_never_evicted() {
    let (bpm, _dir) = pool(2);

    let (p0, _h0) = bpm.new_page().unwrap();
    let (p1, h1) = bpm.new_page().unwrap();
    bpm.unpin_page(p1, false).unwrap();
    // p0 stays pinned (never unpinned); only p1 is evictable.

    let (p2, _h2) = bpm.new_page().unwrap();
    assert_eq!(bpm.page_count(), 2);
    // p1's frame was reused for p2; p0's handle is still the live frame.
    assert_eq!(h1.lock().page_id(), p2);
    let _ = p0;
}

#[test]
fn dirty_page_is_written_back_on_eviction() {
    let (bpm, _dir) = pool(1);

    let (p0, handle) = bpm.new_page().unwrap();
    let mut rng = rand::thread_rng();
    let mut payload = [0u8; PAGE_SIZE];
    rng.fill(&mut payload[..]);
    *handle.lock().data_mut() = payload;
    bpm.unpin_page(p0, true).unwrap();

    // Only one frame: allocating a new page forces p0 out, which must
    // persist its bytes to disk first.
    let (p1, _h1) = bpm.new_page().unwrap();
    bpm.unpin_page(p1, false).unwrap();

    let refetched = bpm.fetch_page(p0).unwrap();
    assert_eq!(*refetched.lock().data(), payload);
}

#[test]
fn clean_page_eviction_does_not_touch_disk_contents() {
    let (bpm, _dir) = pool(1);

    let (p0, _h0) = bpm.new_page().unwrap();
    bpm.unpin_page(p0, false).unwrap(); // never dirtied

    let (p1, _h1) = bpm.new_page().unwrap();
    assert_ne!(p0, p1);
    assert_eq!(bpm.page_count(), 1);
}

#[test]
fn delete_requires_the_page_to_be_fully_unpinned() {
    let (bpm, _dir) = pool(2);
    let (p0, _handle) = bpm.new_page().unwrap();

    assert!(matches!(bpm.delete_page(p0), Err(Error::StillPinned(_))));

    bpm.unpin_page(p0, false).unwrap();
    assert!(bpm.delete_page(p0).is_ok());
    assert_eq!(bpm.free_frame_count(), 2);
}

#[test]
fn fetching_an_already_pinned_page_pins_it_again() {
    let (bpm, _dir) = pool(2);
    let (p0, _h0) = bpm.new_page().unwrap();

    let _h1 = bpm.fetch_page(p0).unwrap();
    // Two pins outstanding now; one unpin must not make it evictable.
    bpm.unpin_page(p0, false).unwrap();
    assert_eq!(bpm.replacer_size(), 0);
    bpm.unpin_page(p0, false).unwrap();
    assert_eq!(bpm.replacer_size(), 1);
}

#[test]
fn flush_persists_current_bytes_without_requiring_dirty_flag() {
    let (bpm, _dir) = pool(1);
    let (p0, handle) = bpm.new_page().unwrap();
    handle.lock().data_mut()[0] = 0x7F;
    // Flush without ever marking the page dirty via unpin.
    bpm.flush_page(p0).unwrap();
    bpm.unpin_page(p0, false).unwrap();

    let (p1, _h1) = bpm.new_page().unwrap(); // evicts p0, clean, no writeback needed
    bpm.unpin_page(p1, false).unwrap();

    let refetched = bpm.fetch_page(p0).unwrap();
    assert_eq!(refetched.lock().data()[0], 0x7F);
}

#[test]
fn flush_all_pages_covers_every_cached_page() {
    let (bpm, _dir) = pool(4);
    let mut ids = Vec::new();
    for i in 0..4u8 {
        let (id, handle) = bpm.new_page().unwrap();
        handle.lock().data_mut()[0] = i;
        bpm.unpin_page(id, true).unwrap();
        ids.push(id);
    }

    bpm.flush_all_pages().unwrap();

    for (i, id) in ids.iter().enumerate() {
        let handle = bpm.fetch_page(*id).unwrap();
        assert_eq!(handle.lock().data()[0], i as u8);
        bpm.unpin_page(*id, false).unwrap();
    }
}

#[test]
fn pool_of_size_one_still_round_trips() {
    let (bpm, _dir) = pool(1);
    let (p0, handle) = bpm.new_page().unwrap();
    handle.lock().data_mut()[0] = 9;
    bpm.unpin_page(p0, true).unwrap();

    let (p1, _h1) = bpm.new_page().unwrap();
    bpm.unpin_page(p1, false).unwrap();
    assert_ne!(p0, p1);

    let refetched = bpm.fetch_page(p0).unwrap();
    assert_eq!(refetched.lock().data()[0], 9);
}

#[test]
fn all_frames_pinned_refuses_new_page_and_uncached_fetch() {
    let (bpm, _dir) = pool(2);
    let (_p0, _h0) = bpm.new_page().unwrap();
    let (_p1, _h1) = bpm.new_page().unwrap();

    assert!(matches!(bpm.new_page(), Err(Error::NoFreeFrame)));
    assert!(matches!(bpm.fetch_page(PageId(999)), Err(Error::NoFreeFrame)));
}
