use clap::Parser;
use dr_screen_lib::commands::{report, session};
use dr_screen_lib::{AppError, ScreeningConfig};
use std::path::PathBuf;

/// Screen fundus photographs for diabetic retinopathy.
#[derive(Debug, Parser)]
#[command(name = "dr-screen", version, about)]
struct Cli {
    /// Images to analyze, in order.
    #[arg(required = true)]
    images: Vec<String>,

    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write a report for the last successful analysis into this directory.
    #[arg(short, long)]
    report_dir: Option<String>,

    /// Override the mock engine's simulated latency.
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Seed the mock engine for reproducible output.
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dr_screen_lib::init_tracing();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ScreeningConfig::load(path)?,
        None => ScreeningConfig::default(),
    };
    if let Some(latency) = cli.latency_ms {
        config.engine.latency_ms = latency;
    }
    if cli.seed.is_some() {
        config.engine.seed = cli.seed;
    }

    let controller = config.build_controller()?;
    tracing::info!(engine = controller.engine_name(), "screening session started");

    let mut last_ok = false;
    for path in &cli.images {
        if let Err(e) = session::upload_image(&controller, path).await {
            eprintln!("{}: rejected: {}", path, e);
            continue;
        }
        match session::analyze_image(&controller).await {
            Ok(result) => {
                last_ok = true;
                println!(
                    "{}: {} ({:.1}%, severity {}/4)",
                    path,
                    result.label.display_name(),
                    result.confidence * 100.0,
                    result.severity
                );
            }
            Err(e) => {
                last_ok = false;
                eprintln!("{}: analysis failed: {}", path, e);
            }
        }
    }

    let history = session::get_history(&controller).await?;
    println!();
    println!("History ({} of last {}):", history.len(), dr_screen_lib::HISTORY_CAPACITY);
    for entry in &history {
        println!(
            "  {}  {:<18} {}/4  {}",
            entry.result.timestamp.format("%H:%M:%S"),
            entry.result.label.display_name(),
            entry.result.severity,
            entry.filename
        );
    }

    if let Some(dir) = &cli.report_dir {
        if last_ok {
            let exported = report::export_report(&controller, &config, dir).await?;
            println!();
            println!("Report written to {}", exported.path);
        } else {
            eprintln!("No result to report.");
        }
    }

    Ok(())
}
