pub mod aggregate;
pub mod arena;
pub mod decorations;
pub mod outline;

use std::collections::BTreeSet;

use crate::error::ViewerError;
use crate::manifest::{parent_of, ScanManifest};

use self::arena::{FileTree, NodeId, NodeKind, SkippedEntry, TreeNode};

/// Every directory implied by the manifest paths, ancestors included,
/// sorted so a parent always precedes its children.
fn collect_directories(manifest: &ScanManifest) -> BTreeSet<String> {
    let mut dirs = BTreeSet::new();
    for path in manifest.paths() {
        let mut dir = parent_of(path);
        while !dir.is_empty() {
            if !dirs.insert(dir.to_string()) {
                // Ancestors of an already-seen directory are already present
                break;
            }
            dir = parent_of(dir);
        }
    }
    dirs
}

/// Last segment of `path` below `parent`.
fn segment_after<'a>(path: &'a str, parent: &str) -> &'a str {
    if parent.is_empty() {
        path
    } else {
        &path[parent.len() + 1..]
    }
}

fn parent_node(tree: &FileTree, parent: &str) -> Option<NodeId> {
    if parent.is_empty() {
        Some(tree.root)
    } else {
        tree.find_dir(parent)
    }
}

fn skip(tree: &mut FileTree, path: &str, reason: String) {
    tracing::warn!("Skipping '{}': {}", path, reason);
    tree.skipped.push(SkippedEntry {
        path: path.to_string(),
        reason,
    });
}

/// Build the path tree from the manifest's flat set of paths.
///
/// Directories come first (in sorted path order), then files (sorted).
/// Entries whose parent cannot be resolved are skipped and recorded in
/// `FileTree::skipped`; the rest of the tree is unaffected.
pub fn build_tree(manifest: &ScanManifest) -> FileTree {
    let mut tree = FileTree::new();

    let dirs = collect_directories(manifest);
    tracing::info!(
        "Building tree from {} entries ({} implied directories)",
        manifest.len(),
        dirs.len()
    );

    // First pass: create all directory nodes
    for dir in &dirs {
        let parent = parent_of(dir);
        let Some(parent_id) = parent_node(&tree, parent) else {
            let err = ViewerError::PathInconsistency {
                path: dir.clone(),
                parent: parent.to_string(),
            };
            skip(&mut tree, dir, err.to_string());
            continue;
        };
        let name = segment_after(dir, parent);
        tree.add_child(
            parent_id,
            TreeNode::new(NodeKind::Directory, name, decorations::DIRECTORY_GLYPH, dir),
        );
    }

    // Second pass: create all file nodes
    for entry in manifest.iter() {
        let path = entry.path.as_str();
        if path.is_empty() {
            skip(&mut tree, path, "empty path".to_string());
            continue;
        }
        let parent = parent_of(path);
        let Some(parent_id) = parent_node(&tree, parent) else {
            let err = ViewerError::PathInconsistency {
                path: path.to_string(),
                parent: parent.to_string(),
            };
            skip(&mut tree, path, err.to_string());
            continue;
        };

        let segment = segment_after(path, parent);
        let label = decorations::file_label(segment, entry);
        let mask = decorations::file_mask(entry);
        tree.add_child(parent_id, TreeNode::new(NodeKind::File, &label, &mask, path));
    }

    tracing::info!(
        "Tree built: {} total nodes ({} dirs, {} files, {} skipped), {} direct children of root",
        tree.len(),
        tree.dir_count(),
        tree.file_count(),
        tree.skipped.len(),
        tree.children(tree.root).count()
    );

    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::ScanEntry;

    fn names(tree: &FileTree, id: NodeId) -> Vec<String> {
        tree.children(id).map(|c| tree.get(c).name.to_string()).collect()
    }

    #[test]
    fn single_deep_file_creates_every_ancestor() {
        let manifest = ScanManifest::from_entries(vec![ScanEntry::new("a/b/c.txt")]);
        let tree = build_tree(&manifest);

        assert_eq!(tree.dir_count(), 2);
        assert_eq!(tree.file_count(), 1);
        let a = tree.find_dir("a").unwrap();
        let ab = tree.find_dir("a/b").unwrap();
        let file = tree.find_file("a/b/c.txt").unwrap();
        assert_eq!(tree.get(ab).parent, Some(a));
        assert_eq!(tree.get(file).parent, Some(ab));
        assert_eq!(tree.get(file).name, "c.txt");
        assert_eq!(tree.get(ab).name, "b");
        assert_eq!(tree.get(ab).mask, decorations::DIRECTORY_GLYPH);
    }

    #[test]
    fn directories_precede_files_and_both_are_sorted() {
        let manifest = ScanManifest::from_entries(vec![
            ScanEntry::new("root/zeta.bin"),
            ScanEntry::new("root/alpha.bin"),
            ScanEntry::new("root/sub/x"),
            ScanEntry::new("root/bdir/y"),
        ]);
        let tree = build_tree(&manifest);
        let root = tree.find_dir("root").unwrap();
        assert_eq!(names(&tree, root), vec!["bdir", "sub", "alpha.bin", "zeta.bin"]);
    }

    #[test]
    fn one_node_per_entry_plus_one_per_directory() {
        let manifest = ScanManifest::from_entries(vec![
            ScanEntry::new("a/b/c"),
            ScanEntry::new("a/b/d"),
            ScanEntry::new("a/e"),
            ScanEntry::new("f"),
            ScanEntry::new("g/h/i/j"),
        ]);
        let tree = build_tree(&manifest);
        // dirs: a, a/b, g, g/h, g/h/i
        assert_eq!(tree.dir_count(), 5);
        assert_eq!(tree.file_count(), 5);
        assert_eq!(tree.len(), 1 + 5 + 5);
        assert!(tree.skipped.is_empty());
    }

    #[test]
    fn manifest_path_that_is_also_a_directory_gets_both_nodes() {
        let manifest = ScanManifest::from_entries(vec![
            ScanEntry::new("fw.img").with_size(10),
            ScanEntry::new("fw.img/rootfs/init").with_size(3),
        ]);
        let tree = build_tree(&manifest);
        assert!(tree.find_dir("fw.img").is_some());
        assert!(tree.find_file("fw.img").is_some());
        assert_ne!(tree.find_dir("fw.img"), tree.find_file("fw.img"));
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let manifest = ScanManifest::from_entries(vec![
            ScanEntry::new("x/y.txt").with_size(4).with_tags(&["text"]),
            ScanEntry::new("x/link")
                .with_size(7)
                .with_tags(&["symlink"])
                .with_magic("symbolic link to `y.txt'"),
            ScanEntry::new("z"),
        ]);
        let first = build_tree(&manifest);
        let second = build_tree(&manifest);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.nodes.iter().zip(second.nodes.iter()) {
            assert_eq!(a.name, b.name);
            assert_eq!(a.mask, b.mask);
            assert_eq!(a.path, b.path);
            assert_eq!(a.parent, b.parent);
            assert_eq!(a.first_child, b.first_child);
            assert_eq!(a.next_sibling, b.next_sibling);
        }
    }

    #[test]
    fn labels_and_masks_come_from_entry_metadata() {
        let manifest = ScanManifest::from_entries(vec![
            ScanEntry::new("bin/sh")
                .with_size(7)
                .with_tags(&["symlink"])
                .with_magic("symbolic link to `busybox'"),
            ScanEntry::new("bin/busybox").with_size(900).with_tags(&["static", "ranking"]),
            ScanEntry::new("etc/empty.conf"),
        ]);
        let tree = build_tree(&manifest);
        let sh = tree.get(tree.find_file("bin/sh").unwrap());
        assert_eq!(sh.name, "sh \u{2192} busybox");
        assert_eq!(sh.path, "bin/sh");
        let busybox = tree.get(tree.find_file("bin/busybox").unwrap());
        assert_eq!(busybox.mask, "  \u{24c8}  \u{272a}");
        let empty = tree.get(tree.find_file("etc/empty.conf").unwrap());
        assert_eq!(empty.mask, decorations::EMPTY_FILE_GLYPH);
    }

    #[test]
    fn empty_manifest_builds_bare_root() {
        let tree = build_tree(&ScanManifest::default());
        assert!(tree.is_empty());
        assert_eq!(tree.children(tree.root).count(), 0);
    }
}
