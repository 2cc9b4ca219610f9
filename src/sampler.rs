//! Sampling predicates deciding whether an event is sent at all.

use parking_lot::Mutex;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{error::ConfigError, event::Event};

/// Decides whether an event should be delivered.
pub trait EventSampler: Send + Sync {
    fn should_send(&self, event: &Event) -> bool;
}

impl<F> EventSampler for F
where
    F: Fn(&Event) -> bool + Send + Sync,
{
    fn should_send(&self, event: &Event) -> bool {
        self(event)
    }
}

/// Keeps each event with probability `sample_rate`.
pub struct RandomEventSampler {
    sample_rate: f64,
    rng: Mutex<StdRng>,
}

impl RandomEventSampler {
    /// Create a sampler; `sample_rate` must lie within `[0, 1]`.
    pub fn new(sample_rate: f64) -> Result<Self, ConfigError> {
        Self::with_rng(sample_rate, StdRng::from_entropy())
    }

    /// Create a sampler with a deterministic random sequence.
    pub fn with_seed(sample_rate: f64, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(sample_rate, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sample_rate: f64, rng: StdRng) -> Result<Self, ConfigError> {
        if !(0.0..=1.0).contains(&sample_rate) {
            return Err(ConfigError::InvalidConfig(format!(
                "sample rate must be between 0 and 1, got {sample_rate}"
            )));
        }
        Ok(Self {
            sample_rate,
            rng: Mutex::new(rng),
        })
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }
}

impl EventSampler for RandomEventSampler {
    fn should_send(&self, _event: &Event) -> bool {
        self.rng.lock().gen_range(0.0..1.0) < self.sample_rate
    }
}

impl std::fmt::Debug for RandomEventSampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RandomEventSampler")
            .field("sample_rate", &self.sample_rate)
            .finish()
    }
}
