//! File-backed disk manager.
//!
//! The buffer pool core treats this as an external collaborator (spec §1,
//! §6): allocate/deallocate page ids, and read/write whole pages. Crash
//! recovery, WAL integration, and checksumming are out of scope here; see
//! [`crate::storage::log`] for the (stub) write-ahead log handle the buffer
//! pool carries but never consults for correctness.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use log::{debug, trace};

use crate::common::{PageId, Result, PAGE_SIZE};

/// Reads and writes fixed-size pages to a single backing file.
///
/// Page `i` (for a single-instance pool) lives at byte offset
/// `i * PAGE_SIZE`. A sharded deployment stripes ids across `num_instances`
/// disk managers, each validating that every id it is handed belongs to its
/// `instance_index` (spec §6/§9).
pub struct DiskManager {
    file: File,
    next_page_id: i64,
    free_page_ids: Vec<PageId>,
    num_instances: u32,
    instance_index: u32,
}

impl DiskManager {
    /// Opens (creating if absent) a single-instance disk manager backed by
    /// `path`.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::sharded(path, 1, 0)
    }

    /// Opens a disk manager that is instance `instance_index` of
    /// `num_instances` in a sharded pool. Page ids it allocates satisfy
    /// `id % num_instances == instance_index`.
    pub fn sharded<P: AsRef<Path>>(path: P, num_instances: u32, instance_index: u32) -> Result<Self> {
        assert!(num_instances > 0);
        assert!(instance_index < num_instances);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        Ok(DiskManager {
            file,
            next_page_id: instance_index as i64,
            free_page_ids: Vec::new(),
            num_instances,
            instance_index,
        })
    }

    fn validate_page_id(&self, page_id: PageId) {
        assert!(page_id.is_valid(), "disk manager handed the invalid page id");
        assert_eq!(
            page_id.0 % self.num_instances as i64,
            self.instance_index as i64,
            "page {page_id} does not belong to this disk manager instance"
        );
    }

    /// Allocates a fresh page id, reusing a previously deallocated one if
    /// available before minting a new one.
    pub fn allocate_page(&mut self) -> PageId {
        let id = if let Some(reused) = self.free_page_ids.pop() {
            reused
        } else {
            let id = PageId(self.next_page_id);
            self.next_page_id += self.num_instances as i64;
            id
        };
        trace!("disk manager allocated page {id}");
        id
    }

    /// Marks `page_id` reusable. Does not truncate or zero the file.
    pub fn deallocate_page(&mut self, page_id: PageId) {
        self.validate_page_id(page_id);
        debug!("disk manager deallocated page {page_id}");
        self.free_page_ids.push(page_id);
    }

    /// Fills `buf` with `page_id`'s on-disk bytes. Pages never written
    /// before read as all zero.
    pub fn read_page(&mut self, page_id: PageId, buf: &mut [u8; PAGE_SIZE]) -> Result<()> {
        self.validate_page_id(page_id);
        let offset = self.offset_of(page_id);
        let len = self.file.metadata()?.len();
        if offset >= len {
            buf.fill(0);
            return Ok(());
        }
        self.file.seek(SeekFrom::Start(offset))?;
        match self.file.read_exact(buf) {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::UnexpectedEof => buf.fill(0),
            Err(err) => return Err(err.into()),
        }
        trace!("disk manager read page {page_id}");
        Ok(())
    }

    /// Persists `data` to `page_id`'s on-disk slot, extending the file as
    /// needed.
    pub fn write_page(&mut self, page_id: PageId, data: &[u8; PAGE_SIZE]) -> Result<()> {
        self.validate_page_id(page_id);
        let offset = self.offset_of(page_id);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(data)?;
        self.file.flush()?;
        trace!("disk manager wrote page {page_id}");
        Ok(())
    }

    fn offset_of(&self, page_id: PageId) -> u64 {
        let slot = page_id.0 / self.num_instances as i64;
        slot as u64 * PAGE_SIZE as u64
    }
}
