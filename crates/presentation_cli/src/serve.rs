//! `serve` command: command-line overrides on top of the loaded configuration

use std::path::PathBuf;

use clap::Args;
use infrastructure::AppConfig;

/// Arguments for `faultline serve`
#[derive(Debug, Default, Args)]
pub struct ServeArgs {
    /// Configuration file (default: ./config.toml if present)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Destination URL requests are forwarded to
    #[arg(short, long)]
    pub destination: Option<String>,

    /// Probability in [0, 1] that a request is dropped
    #[arg(long = "drop", value_name = "P")]
    pub drop_probability: Option<f64>,

    /// Pre-forward delay rate (per millisecond, 0 disables)
    #[arg(long, value_name = "RATE")]
    pub pre_rate: Option<f64>,

    /// Pre-forward delay upper bound in milliseconds
    #[arg(long, value_name = "MS")]
    pub pre_max_ms: Option<u64>,

    /// Post-forward delay rate (per millisecond, 0 disables)
    #[arg(long, value_name = "RATE")]
    pub post_rate: Option<f64>,

    /// Post-forward delay upper bound in milliseconds
    #[arg(long, value_name = "MS")]
    pub post_max_ms: Option<u64>,

    /// RNG seed (0 = OS entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Address to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    /// Load the configuration and apply command-line overrides
    pub fn resolve(&self) -> anyhow::Result<AppConfig> {
        let mut config = AppConfig::load_from(self.config.as_deref())?;
        self.apply(&mut config);
        Ok(config)
    }

    /// Overwrite every setting given on the command line
    pub fn apply(&self, config: &mut AppConfig) {
        let proxy = &mut config.proxy;
        if let Some(destination) = &self.destination {
            proxy.destination = Some(destination.clone());
        }
        if let Some(p) = self.drop_probability {
            proxy.drop_probability = p;
        }
        if let Some(rate) = self.pre_rate {
            proxy.pre_delay_rate = rate;
        }
        if let Some(max) = self.pre_max_ms {
            proxy.pre_delay_max_ms = max;
        }
        if let Some(rate) = self.post_rate {
            proxy.post_delay_rate = rate;
        }
        if let Some(max) = self.post_max_ms {
            proxy.post_delay_max_ms = max;
        }
        if let Some(seed) = self.seed {
            proxy.seed = seed;
        }
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}
