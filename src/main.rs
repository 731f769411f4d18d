use anyhow::{Context, Result};

use monthly_oc_diff::config::Config;
use monthly_oc_diff::pipeline;

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::try_new(&config.logging.level)
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"))
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config);

    tracing::info!(
        input = %config.data.input_path.display(),
        output = %config.chart.output_path.display(),
        "Starting monthly-oc-diff"
    );

    let summary = pipeline::run(&config)
        .with_context(|| format!("failed to chart {}", config.data.input_path.display()))?;

    tracing::info!(rows = summary.rows, months = summary.months, "Done");
    println!("Saved plot to {}", summary.output.display());
    Ok(())
}
