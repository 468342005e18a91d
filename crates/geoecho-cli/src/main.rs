//! GeoEcho CLI.

mod args;
mod client;
mod display;
mod summary;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use geoecho_app::GeoEcho;
use geoecho_core::manifest::{Manifest, ManifestLoader};
use simple_logger::SimpleLogger;

use args::{Args, Command, Format};
use display::ViewState;

/// `[logging.<key>]` table consulted by the client commands.
const LOGGING_KEY: &str = "cli";

fn main() {
    if let Err(err) = run(Args::parse()) {
        eprintln!("[geoecho] error: {err:#}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let manifest = load_manifest(&args.manifest)?;
    match args.cmd {
        Command::Serve { addr } => {
            geoecho_adapter_axum::run_app::<GeoEcho>(&manifest, addr).context("dev server")
        }
        Command::Location { url, format } => {
            init_logger(&manifest);
            let base = url.unwrap_or_else(|| format!("http://{}", manifest.dev_addr()));
            let view = show_location(&base, format)?;
            println!("{}", view.render(format));
            Ok(())
        }
        Command::Summary => {
            print!("{}", summary::SUMMARY);
            Ok(())
        }
    }
}

fn load_manifest(path: &Path) -> anyhow::Result<Arc<Manifest>> {
    if !path.exists() {
        log::debug!("no manifest at {}, using defaults", path.display());
        return Ok(Arc::new(Manifest::default()));
    }
    let loader = ManifestLoader::from_path(path)
        .with_context(|| format!("failed to load manifest {}", path.display()))?;
    Ok(loader.shared())
}

fn init_logger(manifest: &Manifest) {
    let logging = manifest.logging_or_default(LOGGING_KEY);
    SimpleLogger::new()
        .with_level(logging.level_filter())
        .init()
        .ok();
}

fn show_location(base: &str, format: Format) -> anyhow::Result<ViewState> {
    if format == Format::Card {
        eprintln!("{}", ViewState::Loading.render(format));
    }
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    let client = reqwest::Client::new();
    Ok(runtime.block_on(client::fetch_location(&client, base)))
}
