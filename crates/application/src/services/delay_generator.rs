//! Delay generator
//!
//! Draws injected delays from an exponential distribution, clamped to a hard
//! maximum, and draws the uniform value used for the drop decision. All
//! draws for one proxy come from a single seedable RNG so that a fixed seed
//! reproduces the whole sequence.
//!
//! Samples are drawn in milliseconds: a rate of `0.01` means a mean delay of
//! 100ms before clamping.

use std::fmt;
use std::time::Duration;

use domain::{DelaySpec, DropProbability, FaultConfig, Seed};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Exp};

/// Draw one delay for `rate` (per millisecond), clamped to `max`
///
/// A rate `<= 0` (or one that cannot parameterise a distribution) yields
/// zero without touching the RNG.
pub fn sample_delay<R: Rng + ?Sized>(rng: &mut R, rate: f64, max: Duration) -> Duration {
    if rate <= 0.0 {
        return Duration::ZERO;
    }
    Exp::new(rate).map_or(Duration::ZERO, |exp| clamp_to_duration(exp.sample(rng), max))
}

/// Convert a sample in milliseconds into a duration no larger than `max`
///
/// Values above `max` become exactly `max`; anything else is truncated to
/// whole milliseconds.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_to_duration(sample_ms: f64, max: Duration) -> Duration {
    let max_ms = max.as_secs_f64() * 1000.0;
    if sample_ms >= max_ms {
        return max;
    }
    Duration::from_millis(sample_ms.max(0.0).trunc() as u64)
}

/// Exponential sampling state for one configured delay
#[derive(Debug, Clone)]
struct DelaySampler {
    distribution: Option<Exp<f64>>,
    max: Duration,
}

impl DelaySampler {
    fn new(spec: DelaySpec) -> Self {
        let distribution = if spec.is_enabled() {
            Exp::new(spec.rate()).ok()
        } else {
            None
        };
        Self {
            distribution,
            max: spec.max(),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        self.distribution
            .as_ref()
            .map_or(Duration::ZERO, |exp| clamp_to_duration(exp.sample(rng), self.max))
    }

    const fn is_enabled(&self) -> bool {
        self.distribution.is_some()
    }
}

/// Source of injected delays and drop decisions for one proxy
///
/// The RNG is shared by every request the owning transport handles. It is
/// locked for a single draw at a time and never across an `.await`.
pub struct DelayGenerator {
    rng: Mutex<StdRng>,
    pre: DelaySampler,
    post: DelaySampler,
    seed: Seed,
}

impl fmt::Debug for DelayGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayGenerator")
            .field("pre", &self.pre)
            .field("post", &self.post)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

impl DelayGenerator {
    /// Create a generator for the given pre/post delays
    ///
    /// A deterministic seed gives a reproducible sequence; `Seed::ENTROPY`
    /// seeds from the operating system.
    pub fn new(pre: DelaySpec, post: DelaySpec, seed: Seed) -> Self {
        let rng = if seed.is_deterministic() {
            StdRng::seed_from_u64(seed.value())
        } else {
            StdRng::from_os_rng()
        };
        Self {
            rng: Mutex::new(rng),
            pre: DelaySampler::new(pre),
            post: DelaySampler::new(post),
            seed,
        }
    }

    /// Create a generator from a fault configuration
    pub fn from_config(config: &FaultConfig) -> Self {
        Self::new(config.pre_delay(), config.post_delay(), config.seed())
    }

    /// Seed this generator was created with
    pub const fn seed(&self) -> Seed {
        self.seed
    }

    /// Draw the delay applied before forwarding
    pub fn pre_delay(&self) -> Duration {
        if !self.pre.is_enabled() {
            return Duration::ZERO;
        }
        self.pre.sample(&mut *self.rng.lock())
    }

    /// Draw the delay applied after forwarding
    pub fn post_delay(&self) -> Duration {
        if !self.post.is_enabled() {
            return Duration::ZERO;
        }
        self.post.sample(&mut *self.rng.lock())
    }

    /// Draw a delay for an arbitrary `DelaySpec` from the shared RNG
    pub fn sample(&self, spec: &DelaySpec) -> Duration {
        if !spec.is_enabled() {
            return Duration::ZERO;
        }
        sample_delay(&mut *self.rng.lock(), spec.rate(), spec.max())
    }

    /// Decide whether a request is dropped
    ///
    /// Draws a uniform value in `[0, 1)` and compares it against the
    /// probability. A zero probability short-circuits without a draw.
    pub fn roll_drop(&self, probability: DropProbability) -> bool {
        if probability.is_never() {
            return false;
        }
        let roll: f64 = self.rng.lock().random();
        probability.is_hit(roll)
    }
}
