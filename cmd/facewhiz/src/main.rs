//! facewhiz - face recognition backend service.

mod config;
mod images;
mod server;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use facewhiz_facedb::RedbStore;
use facewhiz_faceid::{Gallery, MemoryStore};

use crate::config::ServiceConfig;

/// Face recognition backend service.
#[derive(Parser, Debug)]
#[command(name = "facewhiz")]
#[command(about = "Face recognition backend service")]
struct Args {
    /// Listen address (e.g. :3000 or 127.0.0.1:3000)
    #[arg(long, default_value = ":3000")]
    addr: String,

    /// Data directory for the database and uploaded images
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Default acceptance threshold (maximum Euclidean distance)
    #[arg(long, default_value_t = 0.5)]
    threshold: f32,

    /// Allowed CORS origin (repeatable; defaults to local dev origins)
    #[arg(long = "origin")]
    origins: Vec<String>,

    /// Keep all state in memory (no database file; for local testing)
    #[arg(long)]
    ephemeral: bool,

    /// Verbose output
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(if args.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .with_target(false)
        .init();

    let cfg = ServiceConfig::new(args.addr, args.data_dir, args.threshold, args.origins);
    std::fs::create_dir_all(&cfg.uploads_dir)?;

    let gallery = if args.ephemeral {
        tracing::info!("using in-memory store; nothing will be persisted");
        Gallery::new(Box::new(MemoryStore::new()))
    } else {
        let db_path = cfg.db_path();
        tracing::info!("database: {}", db_path.display());
        Gallery::new(Box::new(RedbStore::open(&db_path)?))
    };

    server::serve(cfg, gallery).await
}
