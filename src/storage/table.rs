//! The B+-tree: `find`/`insert`/`scan` over leaf and internal node pages,
//! leaf overflow handling, and root promotion.
use std::path::Path;

use tracing::info;

use crate::errors::Error;
use crate::storage::cursor::Cursor;
use crate::storage::node;
use crate::storage::pager::Pager;
use crate::storage::row::{self, Row};

/// Result of a failed insert that the dispatcher, not the engine, must
/// react to: neither variant unwinds or terminates the process.
#[derive(Debug)]
pub enum InsertError {
    /// `row.id` already exists in the tree.
    Duplicate,
    /// The insert would require splitting a non-root leaf, which this
    /// design does not implement (see the crate's design notes).
    Full,
    /// An underlying pager/node failure.
    Engine(Error),
}

impl From<Error> for InsertError {
    fn from(err: Error) -> Self {
        InsertError::Engine(err)
    }
}

pub struct Table {
    pager: Pager,
    root_page_num: u32,
}

impl Table {
    /// Opens (creating if absent) the database file at `path`, initializing
    /// page 0 as an empty leaf root the first time the file is created.
    pub fn open(path: &Path) -> Result<Table, Error> {
        let mut pager = Pager::open(path)?;
        let root_page_num = 0;
        if pager.num_pages() == 0 {
            let root = pager.get_page_mut(root_page_num)?;
            root.init_leaf();
            root.set_root(true);
        }
        Ok(Table {
            pager,
            root_page_num,
        })
    }

    /// Flushes every dirty page and closes the underlying file. This is
    /// the only point at which mutations are guaranteed to reach disk.
    pub fn close(mut self) -> Result<(), Error> {
        self.pager.flush_all()
    }

    pub fn root_page_num(&self) -> u32 {
        self.root_page_num
    }

    pub fn pager_mut(&mut self) -> &mut Pager {
        &mut self.pager
    }

    /// Inserts `row` keyed by `row.id`. Rejects a key already present and
    /// reports (rather than attempts) the unimplemented non-root split.
    pub fn insert(&mut self, row: &Row) -> Result<(), InsertError> {
        let key = row.id;
        let cursor = Cursor::find(self, key)?;
        let node = self.pager.get_page(cursor.page_num)?;
        if cursor.cell_num < node.leaf_num_cells()
            && node.leaf_key(cursor.cell_num as usize) == key
        {
            return Err(InsertError::Duplicate);
        }
        self.leaf_insert(&cursor, key, row)
    }

    fn leaf_insert(&mut self, cursor: &Cursor, key: u32, row: &Row) -> Result<(), InsertError> {
        let num_cells = self.pager.get_page(cursor.page_num)?.leaf_num_cells();
        if num_cells as usize >= node::LEAF_NODE_MAX_CELLS {
            return self.leaf_split_and_insert(cursor, key, row);
        }

        let mut buf = [0u8; row::ROW_SIZE];
        row::serialize(row, &mut buf);

        let leaf = self.pager.get_page_mut(cursor.page_num)?;
        leaf.leaf_shift_cells_right(cursor.cell_num as usize, num_cells as usize);
        leaf.set_leaf_key(cursor.cell_num as usize, key);
        leaf.set_leaf_value(cursor.cell_num as usize, &buf);
        leaf.set_leaf_num_cells(num_cells + 1);
        Ok(())
    }

    /// Splits an overflowing leaf into two 7-cell leaves, redistributing
    /// the 13 existing cells plus the new one by logical position. Only
    /// supported when the overflowing leaf is the root; see the crate's
    /// design notes for why a non-root split is out of scope.
    fn leaf_split_and_insert(
        &mut self,
        cursor: &Cursor,
        key: u32,
        row: &Row,
    ) -> Result<(), InsertError> {
        let old_page_num = cursor.page_num;
        if !self.pager.get_page(old_page_num)?.is_root() {
            return Err(InsertError::Full);
        }

        let mut new_row_buf = [0u8; row::ROW_SIZE];
        row::serialize(row, &mut new_row_buf);

        const TOTAL: usize = node::LEAF_NODE_MAX_CELLS + 1;
        let mut cells = [[0u8; node::LEAF_NODE_CELL_SIZE]; TOTAL];
        {
            let old = self.pager.get_page(old_page_num)?;
            for i in (0..TOTAL).rev() {
                if i == cursor.cell_num as usize {
                    cells[i][0..4].copy_from_slice(&key.to_le_bytes());
                    cells[i][4..].copy_from_slice(&new_row_buf);
                } else {
                    let src = if i > cursor.cell_num as usize { i - 1 } else { i };
                    cells[i].copy_from_slice(old.leaf_cell(src));
                }
            }
        }

        let new_page_num = self.pager.get_unused_page_num();
        let old_next_leaf = self.pager.get_page(old_page_num)?.leaf_next_leaf();

        let new_node = self.pager.get_page_mut(new_page_num)?;
        new_node.init_leaf();
        new_node.set_leaf_next_leaf(old_next_leaf);
        new_node.set_leaf_num_cells(node::LEAF_NODE_RIGHT_SPLIT_COUNT as u32);
        for i in 0..node::LEAF_NODE_RIGHT_SPLIT_COUNT {
            new_node
                .leaf_cell_mut(i)
                .copy_from_slice(&cells[node::LEAF_NODE_LEFT_SPLIT_COUNT + i]);
        }

        let old = self.pager.get_page_mut(old_page_num)?;
        old.set_leaf_next_leaf(new_page_num);
        old.set_leaf_num_cells(node::LEAF_NODE_LEFT_SPLIT_COUNT as u32);
        for i in 0..node::LEAF_NODE_LEFT_SPLIT_COUNT {
            old.leaf_cell_mut(i).copy_from_slice(&cells[i]);
        }

        self.create_new_root(new_page_num)?;
        Ok(())
    }

    /// Promotes the current root: its full contents move into a fresh
    /// left child, and the root page itself is re-initialized as an
    /// internal node pointing at the old-root-copy and `right_child_page_num`.
    fn create_new_root(&mut self, right_child_page_num: u32) -> Result<(), Error> {
        let root_page_num = self.root_page_num;
        let left_child_page_num = self.pager.get_unused_page_num();

        let root_bytes = *self.pager.get_page(root_page_num)?.as_bytes();
        let left = self.pager.get_page_mut(left_child_page_num)?;
        *left.as_bytes_mut() = root_bytes;
        left.set_root(false);
        let left_max_key = left.max_key()?;

        self.pager
            .get_page_mut(right_child_page_num)?
            .set_parent(root_page_num);
        self.pager
            .get_page_mut(left_child_page_num)?
            .set_parent(root_page_num);

        let root = self.pager.get_page_mut(root_page_num)?;
        root.init_internal();
        root.set_root(true);
        root.set_internal_num_keys(1);
        root.set_internal_child(0, left_child_page_num);
        root.set_internal_key(0, left_max_key);
        root.set_internal_right_child(right_child_page_num);

        info!(
            root_page_num,
            left_child_page_num, right_child_page_num, left_max_key, "promoted root to internal node"
        );
        Ok(())
    }
}
