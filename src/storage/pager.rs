//! Page cache over the database file.
//!
//! Pages are loaded lazily on first access and kept in a bounded,
//! fixed-capacity cache (`heapless::Vec`, matching the reference design's
//! `TABLE_MAX_PAGES` array of page slots) rather than a growable `Vec`: a
//! page number past the cap is a configuration error, not something to
//! silently grow into.
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use heapless::Vec as HVec;
use tracing::{debug, info, warn};

use crate::errors::Error;
use crate::fatal;
use crate::storage::node::{Node, PAGE_SIZE};

/// Upper bound on pages this engine will manage. With 4 KiB pages that is
/// a 400 KiB file ceiling, intentionally tiny: this is a learning-scale
/// engine, not a production store.
pub const TABLE_MAX_PAGES: usize = 100;

pub struct Pager {
    file: File,
    file_length: u64,
    num_pages: u32,
    pages: HVec<Option<Node>, TABLE_MAX_PAGES>,
}

impl Pager {
    pub fn open(path: &Path) -> Result<Self, Error> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(path)?;
        let file_length = file.metadata()?.len();

        if file_length % PAGE_SIZE as u64 != 0 {
            return Err(Error::Corrupt(format!(
                "file length {} is not a multiple of the page size {}",
                file_length, PAGE_SIZE
            )));
        }
        let num_pages = (file_length / PAGE_SIZE as u64) as u32;

        let mut pages = HVec::new();
        for _ in 0..TABLE_MAX_PAGES {
            // HVec has no fallible resize helper; push is infallible here
            // because the loop bound equals the const capacity.
            let _ = pages.push(None);
        }

        info!(path = %path.display(), num_pages, "opened database file");
        Ok(Pager {
            file,
            file_length,
            num_pages,
            pages,
        })
    }

    pub fn num_pages(&self) -> u32 {
        self.num_pages
    }

    /// Returns the first page number one past the high-water mark, without
    /// reserving it. Valid only because this engine never frees a page
    /// once allocated.
    pub fn get_unused_page_num(&self) -> u32 {
        self.num_pages
    }

    /// Loads `page_num` into the cache if absent, then returns a reference
    /// to it. A page at or past `num_pages` that is still within bounds
    /// is treated as a fresh, zeroed page — this is how a brand-new leaf
    /// or the promoted root is first materialized.
    pub fn get_page(&mut self, page_num: u32) -> Result<&Node, Error> {
        self.load_page(page_num)?;
        Ok(self.pages[page_num as usize].as_ref().unwrap())
    }

    pub fn get_page_mut(&mut self, page_num: u32) -> Result<&mut Node, Error> {
        self.load_page(page_num)?;
        Ok(self.pages[page_num as usize].as_mut().unwrap())
    }

    fn load_page(&mut self, page_num: u32) -> Result<(), Error> {
        if page_num as usize >= TABLE_MAX_PAGES {
            return Err(fatal!(
                "page number {} exceeds TABLE_MAX_PAGES {}",
                page_num,
                TABLE_MAX_PAGES
            ));
        }

        if self.pages[page_num as usize].is_none() {
            let num_pages_on_disk = (self.file_length / PAGE_SIZE as u64) as u32;
            let node = if page_num < num_pages_on_disk {
                let mut buf = [0u8; PAGE_SIZE];
                self.file.seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
                self.file.read_exact(&mut buf)?;
                debug!(page_num, "read page from disk");
                Node::from_bytes(buf)
            } else {
                debug!(page_num, "allocating fresh page");
                Node::zeroed()
            };
            self.pages[page_num as usize] = Some(node);

            if page_num >= self.num_pages {
                self.num_pages = page_num + 1;
            }
        }
        Ok(())
    }

    fn flush_page(&mut self, page_num: u32) -> Result<(), Error> {
        let Some(node) = self.pages[page_num as usize].as_ref() else {
            return Err(fatal!("tried to flush page {} but it is not cached", page_num));
        };
        self.file.seek(SeekFrom::Start(page_num as u64 * PAGE_SIZE as u64))?;
        self.file.write_all(node.as_bytes())?;
        let end = (page_num as u64 + 1) * PAGE_SIZE as u64;
        if end > self.file_length {
            self.file_length = end;
        }
        Ok(())
    }

    /// Flushes every cached, allocated page to disk and syncs the file.
    /// Called once, when the REPL exits.
    pub fn flush_all(&mut self) -> Result<(), Error> {
        for page_num in 0..self.num_pages {
            if self.pages[page_num as usize].is_some() {
                self.flush_page(page_num)?;
            }
        }
        self.file.sync_all()?;
        info!(num_pages = self.num_pages, "flushed database file");
        Ok(())
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        if let Err(e) = self.flush_all() {
            warn!(error = %e, "failed to flush pager on drop");
        }
    }
}
