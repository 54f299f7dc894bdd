use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;

use crate::wire::CityClimate;

/// Climate used when the lookup fails and nothing is cached.
pub const DEFAULT_TEMP: f64 = 24.5;
pub const DEFAULT_HUMIDITY: f64 = 65.0;
pub const DEFAULT_DESCRIPTION: &str = "Default temperate climate.";

const BASE_LIGHT_KLX: f64 = 12.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseClimate {
    pub temperature: f64,
    pub humidity: f64,
}

impl Default for BaseClimate {
    fn default() -> Self {
        Self { temperature: DEFAULT_TEMP, humidity: DEFAULT_HUMIDITY }
    }
}

impl From<&CityClimate> for BaseClimate {
    fn from(c: &CityClimate) -> Self {
        Self { temperature: c.average_temp, humidity: c.average_humidity }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LiveMetrics {
    pub temperature: f64,
    pub humidity: f64,
    pub light_klx: f64,
}

/// Simulated sensor readings jittered around a base climate.
pub struct SensorSimulator {
    base: BaseClimate,
    rng: StdRng,
}

impl SensorSimulator {
    pub fn new(base: BaseClimate) -> Self {
        Self { base, rng: StdRng::from_entropy() }
    }

    pub fn seeded(base: BaseClimate, seed: u64) -> Self {
        Self { base, rng: StdRng::seed_from_u64(seed) }
    }

    pub fn base(&self) -> BaseClimate {
        self.base
    }

    pub fn sample(&mut self) -> LiveMetrics {
        LiveMetrics {
            temperature: self.base.temperature + self.rng.gen_range(-1.0..=1.0),
            humidity: (self.base.humidity + self.rng.gen_range(-2.0..=2.0)).clamp(0.0, 100.0),
            light_klx: BASE_LIGHT_KLX + self.rng.gen_range(-0.2..=0.2),
        }
    }
}
