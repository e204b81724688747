//! `sample` command: print a delay sequence

use std::io::Write;

use application::DelayGenerator;
use clap::Args;
use domain::{DelaySpec, Seed};

/// Arguments for `faultline sample`
#[derive(Debug, Args)]
pub struct SampleArgs {
    /// Delay rate (per millisecond)
    #[arg(long, value_name = "RATE")]
    pub rate: f64,

    /// Upper bound in milliseconds
    #[arg(long, value_name = "MS")]
    pub max_ms: u64,

    /// RNG seed (0 = OS entropy)
    #[arg(long, default_value_t = 0)]
    pub seed: u64,

    /// Number of delays to draw
    #[arg(short = 'n', long, default_value_t = 10)]
    pub count: usize,
}

impl SampleArgs {
    /// Draw `count` delays and write one millisecond value per line
    pub fn run(&self, out: &mut impl Write) -> anyhow::Result<()> {
        let spec = DelaySpec::from_millis(self.rate, self.max_ms)?;
        let generator = DelayGenerator::new(spec, DelaySpec::disabled(), Seed::new(self.seed));

        for _ in 0..self.count {
            writeln!(out, "{}", generator.pre_delay().as_millis())?;
        }
        Ok(())
    }
}
