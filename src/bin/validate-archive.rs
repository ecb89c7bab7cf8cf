/// Archive validation tool
/// Tests: Container → Manifest → Tree → Filter → Reports pipeline without a GUI
use batview_rs::archive::{ArchiveReportStore, StoreOptions};
use batview_rs::config::ViewerConfig;
use batview_rs::filter::{FilterSet, FilteredTreeView};
use batview_rs::tree::aggregate::aggregate_totals;
use batview_rs::tree::arena::NodeKind;
use batview_rs::tree::outline::format_size;
use batview_rs::tree;
use std::path::PathBuf;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("batview_rs=info".parse()?),
        )
        .init();

    let Some(archive_path) = std::env::args().nth(1).map(PathBuf::from) else {
        println!("usage: validate-archive <archive> [config.ini]");
        return Ok(());
    };
    let config = match std::env::args().nth(2) {
        Some(path) => ViewerConfig::load(&PathBuf::from(path))?,
        None => ViewerConfig::default(),
    };

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║            BATVIEW-RS ARCHIVE VALIDATION TOOL                ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("Target: {}", archive_path.display());
    println!();

    // === STAGE 1: CONTAINER + MANIFEST ===
    println!("┌─ STAGE 1: OPEN ARCHIVE ────────────────────────────────────┐");
    let start = std::time::Instant::now();
    let mut store = ArchiveReportStore::open(&archive_path, StoreOptions::from(&config))?;
    let open_duration = start.elapsed();

    println!("  ✓ Opened in {:.2}s", open_duration.as_secs_f64());
    println!("  ✓ Format:    {:?}", store.format());
    println!("  ✓ Mode:      {:?}", store.mode());
    println!("  ✓ Extracted: {} members", store.record().len());
    println!("  ✓ Manifest:  {} entries", store.manifest().len());
    println!("└────────────────────────────────────────────────────────────┘");
    println!();

    if store.manifest().is_empty() {
        println!("✗ FAILED: Manifest has no entries!");
        return Ok(());
    }

    // === STAGE 2: TREE BUILDING ===
    println!("┌─ STAGE 2: TREE CONSTRUCTION ───────────────────────────────┐");
    let start = std::time::Instant::now();
    let tree = tree::build_tree(store.manifest());
    let tree_duration = start.elapsed();
    let totals = aggregate_totals(&tree, store.manifest());
    let root_totals = totals[tree.root.index()];

    println!("  ✓ Tree built in {:.2}ms", tree_duration.as_secs_f64() * 1000.0);
    println!("  ✓ Nodes:    {} ({} dirs, {} files)", tree.len(), tree.dir_count(), tree.file_count());
    println!("  ✓ Root:     {} files, {}", root_totals.files, format_size(root_totals.bytes));

    // Every manifest path must be reachable through the tree
    let mut missing = 0;
    for path in store.manifest().paths() {
        if tree.find(path).is_none() {
            println!("  ✗ WARNING: '{}' has no tree node", path);
            missing += 1;
            if missing >= 5 {
                println!("  ... (truncated, too many errors)");
                break;
            }
        }
    }
    for skipped in &tree.skipped {
        println!("  ✗ SKIPPED: '{}' ({})", skipped.path, skipped.reason);
    }
    if missing == 0 && tree.skipped.is_empty() {
        println!("  ✓ Tree structure valid (every manifest path has a node)");
    }
    println!("└────────────────────────────────────────────────────────────┘");
    println!();

    // === STAGE 3: FILTERS ===
    println!("┌─ STAGE 3: FILTER GROUPS ───────────────────────────────────┐");
    let unfiltered = FilteredTreeView::new(&tree, store.manifest()).visible_count();
    println!("  ✓ Unfiltered: {} visible rows", unfiltered);

    let filters = FilterSet::default();
    for (index, group) in filters.groups().iter().enumerate() {
        let mut single = FilterSet::default();
        single.set_active(index, true);
        let visible = FilteredTreeView::new(&tree, store.manifest())
            .with_excluded(single.excluded_tokens())
            .visible_count();
        println!("  • {:<28} {:>8} rows", group.label, visible);
        if visible > unfiltered {
            println!("  ✗ ERROR: enabling a filter revealed rows!");
        }
    }
    println!("└────────────────────────────────────────────────────────────┘");
    println!();

    // === STAGE 4: REPORT PAGES ===
    println!("┌─ STAGE 4: REPORT PAGES ────────────────────────────────────┐");
    let sample = tree
        .node_ids()
        .map(|id| tree.get(id))
        .filter(|node| node.kind == NodeKind::File)
        .find_map(|node| {
            store
                .manifest()
                .checksum_for(&node.path)
                .map(|c| (node.path.to_string(), c.to_string()))
        });

    match sample {
        Some((path, checksum)) => {
            println!("  Sample: {}", path);
            for page in ["elfreport", "names", "unique", "assigned"] {
                match store.report_page(&checksum, page) {
                    Ok(html) => println!("  ✓ {:<10} {} bytes", page, html.len()),
                    Err(e) => println!("  - {:<10} {}", page, e),
                }
            }
            let passes = store.archive_passes();
            match store.hexdump_page(&checksum, "hexdump") {
                Ok(html) => println!("  ✓ hexdump    {} rows", html.matches("<tr>").count()),
                Err(e) => println!("  - hexdump    {}", e),
            }
            let _ = store.hexdump_page(&checksum, "hexdump");
            if store.archive_passes() > passes + 1 {
                println!("  ✗ ERROR: hexdump extracted more than once!");
            } else {
                println!("  ✓ Lazy extraction made {} extra pass(es)", store.archive_passes() - passes);
            }
        }
        None => println!("  - No file with a checksum to sample"),
    }
    println!("└────────────────────────────────────────────────────────────┘");
    println!();

    let workspace = store.workspace_dir().to_path_buf();
    store.close()?;
    if workspace.exists() {
        println!("✗ FAILED: Workspace {} was not removed", workspace.display());
    } else {
        println!("✓ Workspace removed");
    }

    Ok(())
}
