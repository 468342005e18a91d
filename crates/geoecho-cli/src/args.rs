use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "geoecho", about = "GeoEcho CLI")]
pub struct Args {
    /// Path to the GeoEcho manifest; a missing file means defaults
    #[arg(
        long,
        global = true,
        env = "GEOECHO_MANIFEST",
        default_value = "geoecho.toml"
    )]
    pub manifest: PathBuf,
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the local dev server (API plus static site)
    Serve {
        /// Listen address, overriding `[dev] addr`
        #[arg(long)]
        addr: Option<SocketAddr>,
    },
    /// Fetch `/api/location` once and render it
    Location {
        /// Base URL of a running GeoEcho (default: the manifest's dev address)
        #[arg(long)]
        url: Option<String>,
        #[arg(long, value_enum, default_value_t = Format::Card)]
        format: Format,
    },
    /// Print the project narrative
    Summary,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Card,
    Json,
}
