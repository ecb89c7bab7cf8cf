use super::arena::{FileTree, NodeKind};
use crate::manifest::ScanManifest;

/// Per-node totals: bytes and file count of the subtree.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubtreeTotals {
    pub bytes: u64,
    pub files: u64,
}

/// Compute subtree totals for every node (bottom-up), indexed by `NodeId::index()`.
pub fn aggregate_totals(tree: &FileTree, manifest: &ScanManifest) -> Vec<SubtreeTotals> {
    let mut totals = vec![SubtreeTotals::default(); tree.len()];

    // Process nodes in reverse order (children before parents) since
    // children always have higher indices than their parents in our arena.
    // This is guaranteed by the add_child insertion order.
    for i in (0..tree.nodes.len()).rev() {
        let node = &tree.nodes[i];
        match node.kind {
            NodeKind::File => {
                let bytes = manifest.entry(&node.path).map(|e| e.size).unwrap_or(0);
                totals[i] = SubtreeTotals { bytes, files: 1 };
            }
            NodeKind::Directory => {
                let mut sum = SubtreeTotals::default();
                let mut child = node.first_child;
                while let Some(child_id) = child {
                    let t = totals[child_id.index()];
                    sum.bytes += t.bytes;
                    sum.files += t.files;
                    child = tree.nodes[child_id.index()].next_sibling;
                }
                totals[i] = sum;
            }
        }
    }

    totals
}
