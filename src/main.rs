use std::path::PathBuf;

use anyhow::{Context, Result};

use batview_rs::app::App;
use batview_rs::config::ViewerConfig;
use batview_rs::tree::outline::render_outline;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("batview_rs=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let archive = args
        .next()
        .map(PathBuf::from)
        .context("usage: batview <archive> [config.ini]")?;

    let config = match args.next() {
        Some(path) => ViewerConfig::load(&PathBuf::from(&path))
            .with_context(|| format!("Failed to load configuration from {}", path))?,
        None => ViewerConfig::default(),
    };
    tracing::info!(
        "Configuration: advanced={}, hexdump lines={}",
        config.advanced,
        config.hexdump_line_limit
    );

    let mut app = App::new(config);
    app.open_archive(&archive)
        .with_context(|| format!("Failed to open {}", archive.display()))?;

    if let Some(view) = app.view() {
        print!("{}", render_outline(&view));
        tracing::info!("{} visible rows", view.visible_count());
    }

    app.close()?;
    Ok(())
}
