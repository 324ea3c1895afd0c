//! Small demo entry point: builds a buffer pool manager from config, runs a
//! handful of pages through it, and reports basic pool occupancy. Exercises
//! the library the way a caller embedding it would, nothing more.

use rustydb::storage::disk::DiskManager;
use rustydb::{BufferPoolConfig, BufferPoolManager};

fn main() {
    env_logger::init();

    let config = BufferPoolConfig::from_file("rustydb.toml").unwrap_or_else(|err| {
        log::warn!("falling back to default buffer pool config: {err}");
        BufferPoolConfig::default()
    });

    let db_path = std::env::args().nth(1).unwrap_or_else(|| "rustydb.db".into());
    let disk_manager = DiskManager::new(&db_path).expect("failed to open database file");
    let pool = BufferPoolManager::new(config, disk_manager);

    log::info!(
        "buffer pool ready: {} frames backed by {db_path}",
        pool.pool_size()
    );

    let (page_id, handle) = pool.new_page().expect("pool has no free frames");
    handle.lock().data_mut()[0] = 1;
    pool.unpin_page(page_id, true).expect("page was just fetched, must be pinned");
    pool.flush_page(page_id).expect("page is cached, flush must succeed");

    log::info!(
        "wrote and flushed page {page_id}; {} pages now cached",
        pool.page_count()
    );
}
