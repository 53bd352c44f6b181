use clap::Parser;
use log::info;
use price_forecast::data::{concat_series, write_csv_file, Observation};
use price_forecast::pipeline::{self, ItemReport};
use price_forecast::{DataLoader, PipelineConfig, PriceError};
use std::path::PathBuf;
use std::process::ExitCode;

/// Repair raw price exports and forecast each item
#[derive(Debug, Parser)]
#[command(name = "clean_and_forecast", version)]
struct Args {
    /// Raw export file, or a directory of `*.csv` exports
    input: PathBuf,

    /// JSON pipeline configuration; defaults apply when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where to write the repaired observations
    #[arg(long)]
    output: Option<PathBuf>,

    /// Where to write the forecast points
    #[arg(long)]
    forecast_output: Option<PathBuf>,

    /// Only process this item
    #[arg(long)]
    item: Option<String>,
}

fn run(args: &Args) -> Result<(), PriceError> {
    let config = match &args.config {
        Some(path) => PipelineConfig::from_json_file(path)?,
        None => PipelineConfig::default(),
    };

    let mut observations = DataLoader::from_path(&args.input)?;
    if let Some(item) = &args.item {
        observations.retain(|o| &o.item_id == item);
        info!("Kept {} observations for '{}'", observations.len(), item);
    }

    let reports = pipeline::run(observations, &config)?;
    print_summary(&reports);

    if let Some(path) = &args.output {
        let repaired = concat_series(reports.iter().map(|r| &r.repaired));
        write_csv_file(path, &repaired)?;
        println!("Repaired series written to {}", path.display());
    }

    if let Some(path) = &args.forecast_output {
        let forecasts: Vec<Observation> = reports
            .iter()
            .filter_map(|r| r.forecast.as_ref().ok())
            .flat_map(|f| {
                f.points()
                    .iter()
                    .map(move |p| Observation::new(f.item_id(), p.timestamp, p.predicted_price))
            })
            .collect();
        write_csv_file(path, &forecasts)?;
        println!("Forecasts written to {}", path.display());
    }

    Ok(())
}

fn print_summary(reports: &[ItemReport]) {
    println!(
        "{:<16} {:>8} {:>8} {:>8} {:>8} {:>12}",
        "Item", "Points", "Flagged", "Replaced", "Clamped", "Next price"
    );
    for report in reports {
        let next = match &report.forecast {
            Ok(f) => f
                .points()
                .first()
                .map_or_else(|| "-".to_string(), |p| format!("{:.2}", p.predicted_price)),
            Err(_) => "n/a".to_string(),
        };
        println!(
            "{:<16} {:>8} {:>8} {:>8} {:>8} {:>12}",
            report.item_id,
            report.raw.len(),
            report.repair.flagged,
            report.repair.replaced,
            report.repair.clamped,
            next
        );
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();
    let args = Args::parse();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
