//! BlockFS Shell Binary
//!
//! Interactive command interpreter over a BlockFS engine.

use std::io;
use std::path::PathBuf;

use blockfs::shell::Session;
use blockfs::{Config, StorageEngine};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// BlockFS Shell
#[derive(Parser, Debug)]
#[command(name = "blockfs")]
#[command(about = "In-memory block file store with image persistence")]
#[command(version)]
struct Args {
    /// Image file used by SAVE/LOAD without a path
    #[arg(short, long, default_value = "./blockfs.img")]
    image: PathBuf,

    /// Restore the image at startup if it exists
    #[arg(short, long)]
    load: bool,

    /// Number of file slots
    #[arg(long, default_value = "10")]
    max_files: usize,

    /// Number of blocks in the pool
    #[arg(long, default_value = "100")]
    max_blocks: usize,

    /// Block size in bytes
    #[arg(long, default_value = "512")]
    block_size: usize,

    /// Largest number of blocks per file
    #[arg(long, default_value = "10")]
    max_file_blocks: usize,

    /// Do not print the prompt
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    // Initialize tracing/logging (stderr, so replies on stdout stay clean)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("BlockFS v{}", blockfs::VERSION);

    // Build config from args
    let config = Config::builder()
        .image_path(&args.image)
        .max_files(args.max_files)
        .max_blocks(args.max_blocks)
        .block_size(args.block_size)
        .max_file_blocks(args.max_file_blocks)
        .build();

    let mut engine = match StorageEngine::new(config) {
        Ok(e) => e,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    if args.load && args.image.exists() {
        match engine.restore_from_path(&args.image) {
            Ok(()) => tracing::info!(
                "Restored {} files from {}",
                engine.file_count(),
                args.image.display()
            ),
            Err(e) => tracing::warn!("Could not restore {}: {}", args.image.display(), e),
        }
    }

    tracing::info!(
        "Ready: {} blocks of {} bytes, {} file slots",
        engine.config().max_blocks,
        engine.config().block_size,
        engine.config().max_files
    );

    let mut session = Session::new(engine).with_prompt(!args.quiet);
    let stdin = io::stdin();
    if let Err(e) = session.run(stdin.lock(), io::stdout().lock()) {
        tracing::error!("Session error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Session ended");
}
