use anyhow::Context;
use clap::{Parser, Subcommand};
use queztl_core::application::power::reporting::{export_csv, render_table};
use queztl_core::application::power::{PowerMeter, StressTestRequest};
use queztl_core::config::PowerEnvConfig;
use queztl_core::domain::power::StressTestResult;
use queztl_core::infrastructure::observability::Metrics;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about = "Headless Queztl Core power benchmark", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Export recorded stress results to this CSV file
    #[arg(long, global = true)]
    csv: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Single stress test
    Stress {
        /// Duration in seconds
        #[arg(short, long, default_value = "10")]
        duration: i64,

        /// light, medium, heavy or extreme
        #[arg(short, long, default_value = "medium")]
        intensity: String,
    },
    /// Full suite: light, medium, heavy, extreme
    Suite,
    /// Quick multi-core probe
    Measure,
}

fn finish(results: &[StressTestResult], csv: Option<PathBuf>) -> anyhow::Result<()> {
    print!("{}", render_table(results));
    if let Some(path) = csv {
        export_csv(results, &path)?;
        info!("Results exported to {}", path.display());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Setup logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber).ok();

    let cli = Cli::parse();
    let config = PowerEnvConfig::from_env().context("Failed to load power config")?;
    let meter = PowerMeter::new(config.to_power_config(), Metrics::new()?);

    match cli.command {
        Commands::Stress {
            duration,
            intensity,
        } => {
            let request = StressTestRequest::new(duration, &intensity)?;
            let result = meter.run_stress_test(request).await;
            finish(&[result], cli.csv)?;
        }
        Commands::Suite => {
            let suite = meter.run_benchmark_suite().await;
            finish(&suite.results, cli.csv)?;
            println!(
                "Total ops: {} | Avg: {:.2} ops/s | Peak: {:.2} ops/s | Overall grade: {}",
                suite.total_operations,
                suite.average_ops_per_second,
                suite.peak_ops_per_second,
                suite.overall_grade
            );
        }
        Commands::Measure => {
            let m = meter.measure().await?;
            println!("{}", serde_json::to_string_pretty(&m)?);
        }
    }

    Ok(())
}
