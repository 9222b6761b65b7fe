//! # DCIMinator - Main Entry Point
//!
//! Punto di ingresso della CLI.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del logging con `tracing` (su stderr)
//! - Creazione dell'`ImportJob` e avvio del `MediaImporter`
//! - Scelta della presentazione: progress bar oppure JSON lines
//!
//! ## Esempio di utilizzo:
//! ```bash
//! dciminator /Volumes/iPhone/DCIM ~/Pictures/import --include-videos --verbose-ffmpeg
//! ```

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use dciminator::{ConsoleReporter, ImportJob, JsonReporter, MediaImporter};

#[derive(Parser)]
#[command(name = "dciminator")]
#[command(about = "Import photos and videos from a camera roll into a flat folder")]
struct Args {
    /// Directory scanned recursively for media files
    source_dir: PathBuf,

    /// Flat destination directory (created if missing)
    target_dir: PathBuf,

    /// Copy HEIC files as they are instead of converting them to JPEG
    #[arg(long)]
    keep_heic: bool,

    /// Process MOV files (skipped otherwise)
    #[arg(long)]
    include_videos: bool,

    /// Copy MOV files as they are instead of transcoding to MP4 (requires --include-videos)
    #[arg(long)]
    keep_mov: bool,

    /// Show ffmpeg output while transcoding (requires --include-videos)
    #[arg(long = "verbose-ffmpeg")]
    verbose_ffmpeg: bool,

    /// Copy PNG files too
    #[arg(long)]
    include_png: bool,

    /// JPEG quality for converted HEIC images (1-100)
    #[arg(short, long, default_value = "75")]
    quality: u8,

    /// Emit one JSON event per line on stdout instead of the progress bar
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over --verbose when set
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let job = ImportJob {
        source_dir: args.source_dir,
        target_dir: args.target_dir,
        keep_heic: args.keep_heic,
        include_videos: args.include_videos,
        keep_mov: args.keep_mov,
        verbose_transcode: args.verbose_ffmpeg,
        include_png: args.include_png,
        jpeg_quality: args.quality,
        json_output: args.json,
    };

    for warning in job.ignored_flag_warnings() {
        warn!("{}", warning);
    }

    debug!("Import job: {}", job.describe());

    let importer = MediaImporter::new(job)?;

    // Per-file failures are reported and counted, they never change the exit status
    if importer.job().json_output {
        let mut reporter = JsonReporter::stdout();
        importer.run(&mut reporter).await?;
    } else {
        let mut reporter = ConsoleReporter::new();
        importer.run(&mut reporter).await?;
    }

    Ok(())
}
