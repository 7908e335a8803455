use clap::Parser;
use log::{error, info};
use medimage_core::api::{self, AppState};
use medimage_core::store::{ResultStore, DEFAULT_STORE_FILE};
use medimage_core::{DicomResize, NormalizerConfig, DEFAULT_TARGET_SIZE};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;

/// HTTP service for image analysis and text utilities
#[derive(Parser, Debug)]
#[command(name = "medimage-serve")]
#[command(about = "Serve the image analyzer and text services over HTTP")]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:5000")]
    bind: SocketAddr,

    /// Treat .dcm uploads as raster images
    #[arg(long)]
    no_dicom: bool,

    /// Resample DICOM frames to the target size
    #[arg(long)]
    resample_dicom: bool,

    /// Square side for resized images
    #[arg(long, default_value_t = DEFAULT_TARGET_SIZE)]
    size: u32,

    /// SQLite file where /analyze results are recorded
    #[arg(long, default_value = DEFAULT_STORE_FILE)]
    db: PathBuf,

    /// Do not record /analyze results
    #[arg(long, conflicts_with = "db")]
    no_store: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = NormalizerConfig::default()
        .with_dicom(!cli.no_dicom)
        .with_target_size(cli.size)
        .with_dicom_resize(if cli.resample_dicom {
            DicomResize::Resample
        } else {
            DicomResize::Native
        });
    info!(
        "Starting with DICOM {} and target size {}",
        if config.dicom_enabled { "enabled" } else { "disabled" },
        config.target_size
    );

    let mut state = AppState::mock(config);
    if !cli.no_store {
        match ResultStore::open(&cli.db) {
            Ok(store) => state = state.with_store(store),
            Err(e) => {
                error!("Failed to open results store: {}", e);
                eprintln!("Error: cannot open {}: {}", cli.db.display(), e);
                process::exit(1);
            }
        }
    }

    if let Err(e) = api::serve(cli.bind, state).await {
        error!("Server error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}
