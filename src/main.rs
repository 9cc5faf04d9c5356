use anyhow::Result;
use std::env;
use std::process;
use tracing::info;

use sk_export_dashboard::logging::{init_logging, DEFAULT_FILTER};
use sk_export_dashboard::{Pipeline, PipelineConfig, VERSION};

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    match args.get(1).map(String::as_str) {
        None | Some("run") => run(),
        Some(other) => {
            eprintln!("Unknown command: {}", other);
            eprintln!("Usage: sk-export-dashboard [run]");
            eprintln!("  SK_EXPORT_INPUT   input CSV path override");
            process::exit(2);
        }
    }
}

fn run() -> Result<()> {
    init_logging(DEFAULT_FILTER)?;

    let config = PipelineConfig::from_env();
    info!(version = VERSION, input = %config.input_path.display(), "Saskatchewan export dashboard");

    let report = Pipeline::new(config).run()?;

    println!("✓ {}", report.summary());
    Ok(())
}
