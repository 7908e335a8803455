use clap::Parser;
use log::{error, info};
use medimage_core::cli::{Cli, OutputFormat};
use medimage_core::{AnalysisOutcome, Analyzer, TextReport};
use std::process;

fn main() {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    // Verify the input exists before doing any work
    if let Err(msg) = cli.check_input() {
        eprintln!("Error: {}", msg);
        process::exit(1);
    }

    let analyzer = Analyzer::mock(cli.normalizer_config());
    match &cli.file {
        Some(path) => info!("Analyzing {}", path.display()),
        None => info!("Analyzing a synthetic image"),
    }

    let outcome = analyzer.analyze(cli.file.as_deref());
    output_outcome(&outcome, cli.format);
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn output_outcome(outcome: &AnalysisOutcome, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            println!("{}", TextReport::new(outcome));
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match serde_json::to_string_pretty(outcome) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                error!("JSON output requested without the 'json' feature");
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}
