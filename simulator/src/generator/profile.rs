use eventclass::event::{EventRecord, Position};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const RECOIL_ENERGY_KEV: RangeInclusive<f64> = 1.0..=100.0;
pub const SCINTILLATION_YIELD: RangeInclusive<f64> = 10.0..=200.0;
pub const IONIZATION_CHARGE: RangeInclusive<f64> = 50.0..=500.0;
pub const PULSE_SHAPE: RangeInclusive<f64> = 0.1..=1.0;
pub const POSITION_AXIS: RangeInclusive<f64> = -5.0..=5.0;

/// Configuration for generating synthetic detector events.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fixed seed for reproducible batches; entropy-seeded when absent.
    pub seed: Option<u64>,
    pub pulse_shape: bool,
    pub position: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed: None,
            pulse_shape: true,
            position: true,
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Uniform sampler over the fixed detector ranges.
pub struct EventGenerator {
    rng: StdRng,
    config: GeneratorConfig,
}

impl EventGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { rng, config }
    }

    fn sample(&mut self, range: RangeInclusive<f64>) -> f64 {
        round2(self.rng.gen_range(range))
    }

    pub fn generate(&mut self) -> EventRecord {
        let mut event = EventRecord::new(
            self.sample(RECOIL_ENERGY_KEV),
            self.sample(SCINTILLATION_YIELD),
            self.sample(IONIZATION_CHARGE),
        );
        if self.config.pulse_shape {
            event = event.with_pulse_shape(self.sample(PULSE_SHAPE));
        }
        if self.config.position {
            event = event.with_position(Position::new(
                self.sample(POSITION_AXIS),
                self.sample(POSITION_AXIS),
                self.sample(POSITION_AXIS),
            ));
        }
        event
    }
}

impl Iterator for EventGenerator {
    type Item = EventRecord;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.generate())
    }
}
