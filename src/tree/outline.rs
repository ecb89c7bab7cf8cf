use crate::filter::FilteredTreeView;

/// Format bytes into human-readable size string.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;
    const TB: u64 = 1024 * GB;

    if bytes >= TB {
        format!("{:.2} TB", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Render the visible rows as indented `name  mask` lines.
pub fn render_outline(view: &FilteredTreeView<'_>) -> String {
    let tree = view.tree();
    let mut out = String::new();
    for row in view.rows() {
        let node = tree.get(row.node);
        let indent = "  ".repeat(row.depth.saturating_sub(1) as usize);
        out.push_str(&indent);
        out.push_str(&node.name);
        if !node.mask.is_empty() {
            out.push_str("  ");
            out.push_str(node.mask.trim_start());
        }
        out.push('\n');
    }
    out
}
