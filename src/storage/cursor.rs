//! A logical position into the tree: `(page_num, cell_num, end_of_table)`.
//!
//! `Cursor` carries no reference back to its table (see the crate's
//! design notes on avoiding a self-referential handle); every movement
//! takes the table as an explicit argument, the same way the reference
//! engine threads its `Table *` through every cursor function.
use crate::errors::Error;
use crate::storage::node::NodeType;
use crate::storage::table::Table;

#[derive(Debug, Clone, Copy)]
pub struct Cursor {
    pub page_num: u32,
    pub cell_num: u32,
    pub end_of_table: bool,
}

impl Cursor {
    /// Descends from the root, binary-searching internal nodes for the
    /// smallest key `>= key` (ties go left, since an internal key stores
    /// its left subtree's maximum) and then the landed leaf for `key`
    /// itself. Lands on the insertion point even when `key` is absent.
    pub fn find(table: &mut Table, key: u32) -> Result<Cursor, Error> {
        let mut page_num = table.root_page_num();
        loop {
            let node = table.pager_mut().get_page(page_num)?;
            match node.node_type() {
                NodeType::Leaf => {
                    let num_cells = node.leaf_num_cells();
                    let cell_num = match node.leaf_find(key) {
                        Ok(i) | Err(i) => i as u32,
                    };
                    return Ok(Cursor {
                        page_num,
                        cell_num,
                        end_of_table: num_cells == 0,
                    });
                }
                NodeType::Internal => {
                    let num_keys = node.internal_num_keys();
                    let mut lo = 0u32;
                    let mut hi = num_keys;
                    while lo != hi {
                        let mid = lo + (hi - lo) / 2;
                        if node.internal_key(mid) >= key {
                            hi = mid;
                        } else {
                            lo = mid + 1;
                        }
                    }
                    page_num = node.internal_child(lo)?;
                }
            }
        }
    }

    /// The leftmost cell of the leftmost leaf, whether or not key 0 is
    /// actually present.
    pub fn scan_start(table: &mut Table) -> Result<Cursor, Error> {
        let mut cursor = Cursor::find(table, 0)?;
        let node = table.pager_mut().get_page(cursor.page_num)?;
        cursor.end_of_table = node.leaf_num_cells() == 0;
        Ok(cursor)
    }

    /// Moves one cell forward, following `next_leaf` across leaf
    /// boundaries and setting `end_of_table` once the chain runs out.
    pub fn advance(&mut self, table: &mut Table) -> Result<(), Error> {
        let node = table.pager_mut().get_page(self.page_num)?;
        self.cell_num += 1;
        if self.cell_num >= node.leaf_num_cells() {
            let next_leaf = node.leaf_next_leaf();
            if next_leaf == 0 {
                self.end_of_table = true;
            } else {
                self.page_num = next_leaf;
                self.cell_num = 0;
            }
        }
        Ok(())
    }

    pub fn value<'t>(&self, table: &'t mut Table) -> Result<&'t [u8], Error> {
        let node = table.pager_mut().get_page(self.page_num)?;
        Ok(node.leaf_value(self.cell_num as usize))
    }
}
