//! `.btree` and `.constants` introspection, matching the exact output
//! format the dispatcher's meta-commands print.
use crate::errors::Error;
use crate::storage::node::{self, NodeType};
use crate::storage::row;
use crate::storage::table::Table;

/// Renders the subtree rooted at `page_num`, two-space indent per depth:
/// `"- leaf (size N)"` / `"- <key>"` for leaves, `"- internal (size N)"`
/// followed by each child subtree and `"- key <K>"` for internals.
pub fn print_tree(table: &mut Table, page_num: u32, depth: usize) -> Result<Vec<String>, Error> {
    let node = table.pager_mut().get_page(page_num)?.clone();
    let indent = "  ".repeat(depth);
    let mut lines = Vec::new();

    match node.node_type() {
        NodeType::Leaf => {
            let num_cells = node.leaf_num_cells();
            lines.push(format!("{indent}- leaf (size {num_cells})"));
            for i in 0..num_cells as usize {
                lines.push(format!("{indent}  - {}", node.leaf_key(i)));
            }
        }
        NodeType::Internal => {
            let num_keys = node.internal_num_keys();
            lines.push(format!("{indent}- internal (size {num_keys})"));
            for i in 0..num_keys {
                let child = node.internal_child(i)?;
                lines.extend(print_tree(table, child, depth + 1)?);
                lines.push(format!("{indent}  - key {}", node.internal_key(i)));
            }
            let right_child = node.internal_right_child();
            lines.extend(print_tree(table, right_child, depth + 1)?);
        }
    }
    Ok(lines)
}

/// The compile-time layout figures `.constants` reports.
pub fn print_constants() -> Vec<String> {
    vec![
        format!("ROW_SIZE: {}", row::ROW_SIZE),
        format!("COMMON_NODE_HEADER_SIZE: {}", node::COMMON_NODE_HEADER_SIZE),
        format!("LEAF_NODE_HEADER_SIZE: {}", node::LEAF_NODE_HEADER_SIZE),
        format!("LEAF_NODE_CELL_SIZE: {}", node::LEAF_NODE_CELL_SIZE),
        format!(
            "LEAF_NODE_SPACE_FOR_CELLS: {}",
            node::LEAF_NODE_SPACE_FOR_CELLS
        ),
        format!("LEAF_NODE_MAX_CELLS: {}", node::LEAF_NODE_MAX_CELLS),
    ]
}
