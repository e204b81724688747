//! Faultline CLI
//!
//! Runs the fault-injecting proxy and helps inspect its configuration.

#![allow(clippy::print_stdout)]

mod sample;
mod serve;

use std::{io, path::PathBuf};

use clap::{Parser, Subcommand};
use infrastructure::{AppConfig, TelemetryConfig, init_telemetry};
use sample::SampleArgs;
use serve::ServeArgs;
use tracing::info;

/// Faultline CLI
#[derive(Parser)]
#[command(name = "faultline")]
#[command(author, version, about = "Fault-injecting HTTP reverse proxy", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the proxy
    ///
    /// Settings come from the configuration file and FAULTLINE_* variables;
    /// flags given here take precedence.
    /// Example: faultline serve -d http://localhost:3000 --drop 0.1 --pre-rate 0.01 --pre-max-ms 500
    Serve(ServeArgs),

    /// Print a sequence of sampled delays in milliseconds
    ///
    /// With a fixed seed the output is identical across runs.
    /// Example: faultline sample --rate 0.01 --max-ms 1000 --seed 42 -n 20
    Sample(SampleArgs),

    /// Load and validate the configuration, then print it
    CheckConfig {
        /// Configuration file (default: ./config.toml if present)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Determine log filter level from verbosity count
const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

fn telemetry_for(verbose: u8, base: &TelemetryConfig) -> TelemetryConfig {
    TelemetryConfig {
        log_filter: log_filter_from_verbosity(verbose).to_string(),
        ..base.clone()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve(args) => {
            let config = args.resolve()?;
            let telemetry = if cli.verbose == 0 {
                config.telemetry.clone()
            } else {
                telemetry_for(cli.verbose, &config.telemetry)
            };
            init_telemetry(&telemetry)?;

            info!("faultline v{} starting", env!("CARGO_PKG_VERSION"));
            let stats = presentation_http::serve(&config).await?;

            println!(
                "requests={} forwarded={} dropped={} failures={} cancelled={} drop_rate={:.4}",
                stats.total_requests,
                stats.forwarded,
                stats.dropped,
                stats.forward_failures,
                stats.cancelled,
                stats.drop_rate()
            );
        },

        Commands::Sample(args) => {
            init_telemetry(&telemetry_for(cli.verbose, &TelemetryConfig::default()))?;
            args.run(&mut io::stdout().lock())?;
        },

        Commands::CheckConfig { config } => {
            init_telemetry(&telemetry_for(cli.verbose, &TelemetryConfig::default()))?;

            let config = AppConfig::load_from(config.as_deref())?;
            let fault = config.fault_config()?;

            println!("{}", toml::to_string_pretty(&config)?);
            println!("# listen: {}", config.server.bind_address());
            println!("# faults: {fault}");
        },
    }

    Ok(())
}
