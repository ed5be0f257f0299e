use clap::Parser;
use odte_governor::cli::{Cli, Commands};
use odte_governor::config::Config;
use odte_governor::score::GoPolicy;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing file falls back to defaults; an invalid one is fatal
    let mut config = if Path::new(&cli.config).exists() {
        Config::load(&cli.config)?
    } else {
        eprintln!("Warning: config {} not found, using defaults", cli.config);
        Config::default()
    };

    if let Some(path) = &cli.policy {
        let json = tokio::fs::read_to_string(path).await?;
        config.goscore = GoPolicy::from_json_str(&json)?;
    }

    if matches!(&cli.command, Commands::Replay(args) if args.metrics) {
        config.telemetry.metrics_enabled = true;
    }

    // Initialize telemetry
    let telemetry = odte_governor::telemetry::init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Score(args) => {
            args.execute(&config).await?;
        }
        Commands::Replay(args) => {
            tracing::info!("Starting replay");
            args.execute(&config, &telemetry).await?;
        }
        Commands::Audit(args) => {
            tracing::info!("Starting guardrail audit");
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  RFib sequence: {:?}", config.rfib.sequence.as_slice());
            println!(
                "  RFib: reset above {}, warn at {}%",
                config.rfib.reset_profit_threshold,
                config.rfib.warning_utilization * rust_decimal_macros::dec!(100)
            );
            println!(
                "  GoScore: full >= {}, half >= {}, {} override(s)",
                config.goscore.thresholds.full,
                config.goscore.thresholds.half,
                config.goscore.overrides.len()
            );
            println!(
                "  Telemetry: {} ({:?})",
                config.telemetry.log_level, config.telemetry.log_format
            );
        }
    }

    Ok(())
}
