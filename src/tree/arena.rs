use std::collections::HashMap;

use compact_str::CompactString;

/// Index into the arena `Vec<TreeNode>`. Uses u32 to save memory (supports up to ~4 billion nodes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Directory,
    File,
}

/// A single node in the path tree, stored in a flat arena.
/// Uses sibling-list representation: each node has `first_child` and `next_sibling`.
#[derive(Debug, Clone)]
pub struct TreeNode {
    /// Display label: last path segment, plus ` → TARGET` for symlinks
    pub name: CompactString,
    /// Tag glyphs (files) or the directory glyph
    pub mask: CompactString,
    /// Full normalized path. Directory paths are synthetic and not manifest keys.
    pub path: CompactString,
    pub kind: NodeKind,
    /// Parent node index (None for root)
    pub parent: Option<NodeId>,
    /// First child node index (None for files / empty dirs)
    pub first_child: Option<NodeId>,
    /// Last child, kept so appends preserve insertion order in O(1)
    pub last_child: Option<NodeId>,
    /// Next sibling node index (None if last child)
    pub next_sibling: Option<NodeId>,
    /// Depth in the tree (root = 0)
    pub depth: u16,
}

impl TreeNode {
    pub fn new(kind: NodeKind, name: &str, mask: &str, path: &str) -> Self {
        Self {
            name: CompactString::new(name),
            mask: CompactString::new(mask),
            path: CompactString::new(path),
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            next_sibling: None,
            depth: 0,
        }
    }

    pub fn is_dir(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// A manifest entry that could not be placed in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntry {
    pub path: String,
    pub reason: String,
}

/// The path tree stored as a flat arena of nodes. Immutable once built;
/// filtering never removes nodes.
#[derive(Debug, Clone)]
pub struct FileTree {
    /// All nodes in contiguous memory
    pub nodes: Vec<TreeNode>,
    /// Root node index (an invisible container, not a manifest path)
    pub root: NodeId,
    /// Entries dropped during construction
    pub skipped: Vec<SkippedEntry>,
    dirs_by_path: HashMap<CompactString, NodeId>,
    files_by_path: HashMap<CompactString, NodeId>,
}

impl FileTree {
    /// Create an empty tree with a root node.
    pub fn new() -> Self {
        FileTree {
            nodes: vec![TreeNode::new(NodeKind::Directory, "", "", "")],
            root: NodeId(0),
            skipped: Vec::new(),
            dirs_by_path: HashMap::new(),
            files_by_path: HashMap::new(),
        }
    }

    /// Append a child node under the given parent. Returns the new node's ID.
    pub fn add_child(&mut self, parent: NodeId, mut node: TreeNode) -> NodeId {
        let new_id = NodeId(self.nodes.len() as u32);
        node.parent = Some(parent);
        node.depth = self.nodes[parent.index()].depth + 1;
        node.next_sibling = None;

        match node.kind {
            NodeKind::Directory => self.dirs_by_path.insert(node.path.clone(), new_id),
            NodeKind::File => self.files_by_path.insert(node.path.clone(), new_id),
        };

        match self.nodes[parent.index()].last_child {
            Some(last) => self.nodes[last.index()].next_sibling = Some(new_id),
            None => self.nodes[parent.index()].first_child = Some(new_id),
        }
        self.nodes[parent.index()].last_child = Some(new_id);

        self.nodes.push(node);
        new_id
    }

    /// Get a node by ID.
    pub fn get(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.index()]
    }

    /// Total number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the tree is empty (only root).
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Iterate over children of a node in insertion order.
    pub fn children(&self, parent: NodeId) -> ChildIter<'_> {
        ChildIter {
            tree: self,
            current: self.nodes[parent.index()].first_child,
        }
    }

    pub fn find_dir(&self, path: &str) -> Option<NodeId> {
        self.dirs_by_path.get(path).copied()
    }

    /// File node for a manifest path.
    pub fn find_file(&self, path: &str) -> Option<NodeId> {
        self.files_by_path.get(path).copied()
    }

    /// Any node with this path, preferring the file node when a manifest
    /// path doubles as a directory prefix.
    pub fn find(&self, path: &str) -> Option<NodeId> {
        self.find_file(path).or_else(|| self.find_dir(path))
    }

    pub fn file_count(&self) -> usize {
        self.files_by_path.len()
    }

    pub fn dir_count(&self) -> usize {
        self.dirs_by_path.len()
    }

    /// Manifest-relative path of a node (empty for the root).
    pub fn path_of(&self, id: NodeId) -> &str {
        &self.get(id).path
    }

    /// All node IDs except the root, in arena order (parents before children).
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (1..self.nodes.len() as u32).map(NodeId)
    }
}

impl Default for FileTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the children of a node.
pub struct ChildIter<'a> {
    tree: &'a FileTree,
    current: Option<NodeId>,
}

impl<'a> Iterator for ChildIter<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let id = self.current?;
        self.current = self.tree.nodes[id.index()].next_sibling;
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn children_keep_insertion_order() {
        let mut tree = FileTree::new();
        let dir = tree.add_child(tree.root, TreeNode::new(NodeKind::Directory, "d", "", "d"));
        let a = tree.add_child(dir, TreeNode::new(NodeKind::File, "a", "", "d/a"));
        let b = tree.add_child(dir, TreeNode::new(NodeKind::File, "b", "", "d/b"));
        let c = tree.add_child(dir, TreeNode::new(NodeKind::File, "c", "", "d/c"));

        assert_eq!(tree.children(dir).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(tree.get(c).depth, 2);
        assert_eq!(tree.get(a).parent, Some(dir));
    }

    #[test]
    fn lookup_prefers_file_over_directory_with_same_path() {
        let mut tree = FileTree::new();
        let dir = tree.add_child(tree.root, TreeNode::new(NodeKind::Directory, "x", "", "x"));
        let file = tree.add_child(tree.root, TreeNode::new(NodeKind::File, "x", "", "x"));
        assert_eq!(tree.find("x"), Some(file));
        assert_eq!(tree.find_dir("x"), Some(dir));
        assert_eq!(tree.find("y"), None);
        assert_eq!(tree.path_of(file), "x");
        assert_eq!(tree.path_of(tree.root), "");
    }
}
