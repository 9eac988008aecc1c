// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::sampling::{log_normal, normal};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use vitals_core::{
    Gender, METRIC_COUNT, Metric, Population, ReadingTensor, UserProfile, VitalsError,
};

const DEFAULT_USERS: usize = 100;
const DEFAULT_DAYS: usize = 90;

const STEPS_MEDIAN: f64 = 8_000.0;
const STEPS_SIGMA: f64 = 0.35;
const CALORIE_BASELINE: f64 = 1_500.0;
const CALORIE_SPAN: f64 = 2_000.0;
const CALORIE_NOISE_STD: f64 = 200.0;
const ACTIVE_MINUTES_MEAN: f64 = 75.0;
const ACTIVE_MINUTES_STD: f64 = 25.0;
const HEART_RATE_MEAN: f64 = 85.0;
const HEART_RATE_STD: f64 = 12.0;
const MIN_AGE: u8 = 18;
const MAX_AGE: u8 = 70;

/// Population and horizon size of a synthesized dataset.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratorConfig {
    pub users: usize,
    pub days: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            users: DEFAULT_USERS,
            days: DEFAULT_DAYS,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), VitalsError> {
        if self.users == 0 {
            return Err(VitalsError::invalid_input("generator users must be >= 1"));
        }
        if u32::try_from(self.users).is_err() {
            return Err(VitalsError::invalid_input(format!(
                "generator users must fit in a u32 user_id, got {}",
                self.users
            )));
        }
        if self.days == 0 {
            return Err(VitalsError::invalid_input("generator days must be >= 1"));
        }
        if self
            .users
            .checked_mul(self.days)
            .and_then(|cells| cells.checked_mul(METRIC_COUNT))
            .is_none()
        {
            return Err(VitalsError::invalid_input(format!(
                "generator users*days*metrics overflows: users={}, days={}",
                self.users, self.days
            )));
        }
        Ok(())
    }
}

/// Raw readings plus the metadata table describing their user axis.
#[derive(Clone, Debug, PartialEq)]
pub struct SyntheticDataset {
    pub readings: ReadingTensor,
    pub population: Population,
}

/// Synthesizes daily readings from parametric distributions.
#[derive(Clone, Debug, PartialEq)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(config: GeneratorConfig) -> Result<Self, VitalsError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Draws a dataset from `rng`.
    ///
    /// All steps are drawn first, then calorie noise, active minutes, heart
    /// rates, ages and genders, so a given seed always yields the same data.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<SyntheticDataset, VitalsError> {
        let users = self.config.users;
        let days = self.config.days;
        let cells = users * days;

        let steps: Vec<f64> = (0..cells)
            .map(|_| quantize(log_normal(rng, STEPS_MEDIAN.ln(), STEPS_SIGMA), Metric::Steps))
            .collect();

        let (steps_lo, steps_hi) = Metric::Steps.valid_range();
        let calories_per_step = CALORIE_SPAN / (steps_hi - steps_lo);
        let calories: Vec<f64> = steps
            .iter()
            .map(|s| {
                let expected = CALORIE_BASELINE + (s - steps_lo) * calories_per_step;
                quantize(expected + normal(rng, 0.0, CALORIE_NOISE_STD), Metric::Calories)
            })
            .collect();

        let active_minutes: Vec<f64> = (0..cells)
            .map(|_| {
                quantize(
                    normal(rng, ACTIVE_MINUTES_MEAN, ACTIVE_MINUTES_STD),
                    Metric::ActiveMinutes,
                )
            })
            .collect();

        let heart_rate: Vec<f64> = (0..cells)
            .map(|_| quantize(normal(rng, HEART_RATE_MEAN, HEART_RATE_STD), Metric::HeartRate))
            .collect();

        let mut values = Vec::with_capacity(cells * METRIC_COUNT);
        for cell in 0..cells {
            values.extend_from_slice(&[
                steps[cell],
                calories[cell],
                active_minutes[cell],
                heart_rate[cell],
            ]);
        }
        let readings = ReadingTensor::new(values, users, days)?;

        let ages: Vec<u8> = (0..users)
            .map(|_| rng.random_range(MIN_AGE..=MAX_AGE))
            .collect();
        let genders = (0..users)
            .map(|_| Gender::from_code(rng.random_range(0..=1u8)))
            .collect::<Result<Vec<_>, _>>()?;

        let profiles = ages
            .into_iter()
            .zip(genders)
            .enumerate()
            .map(|(idx, (age, gender))| UserProfile {
                // users fits in u32, checked by validate().
                user_id: idx as u32 + 1,
                age,
                gender,
            })
            .collect();
        let population = Population::new(profiles)?;

        tracing::info!(users, days, "synthesized raw readings");
        Ok(SyntheticDataset {
            readings,
            population,
        })
    }

    /// Convenience wrapper seeding a [`StdRng`] from `seed`.
    pub fn generate_seeded(&self, seed: u64) -> Result<SyntheticDataset, VitalsError> {
        let mut rng = StdRng::seed_from_u64(seed);
        self.generate(&mut rng)
    }
}

/// Rounds half to even and clamps into the metric's plausible range.
fn quantize(value: f64, metric: Metric) -> f64 {
    let (lo, hi) = metric.valid_range();
    value.round_ties_even().clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::{Generator, GeneratorConfig, quantize};
    use vitals_core::{Metric, Population};

    fn small() -> Generator {
        Generator::new(GeneratorConfig { users: 12, days: 30 }).expect("config should be valid")
    }

    #[test]
    fn default_config_is_one_hundred_users_over_ninety_days() {
        let dataset = Generator::new(GeneratorConfig::default())
            .expect("default config should be valid")
            .generate_seeded(42)
            .expect("generation should succeed");
        assert_eq!(dataset.readings.shape(), (100, 90, 4));
        assert_eq!(dataset.population.shape(), (100, 3));
    }

    #[test]
    fn readings_are_integral_and_inside_valid_ranges() {
        let dataset = small().generate_seeded(5).expect("generation should succeed");
        assert!(dataset.readings.is_complete());
        for metric in Metric::ALL {
            let (lo, hi) = metric.valid_range();
            for value in dataset.readings.metric_values(metric) {
                assert!((lo..=hi).contains(&value), "{metric}={value} outside [{lo}, {hi}]");
                assert_eq!(value.fract(), 0.0, "{metric}={value} is not integral");
            }
        }
    }

    #[test]
    fn calories_track_steps() {
        let dataset = Generator::new(GeneratorConfig { users: 40, days: 60 })
            .expect("config should be valid")
            .generate_seeded(9)
            .expect("generation should succeed");
        let steps: Vec<f64> = dataset.readings.metric_values(Metric::Steps).collect();
        let calories: Vec<f64> = dataset.readings.metric_values(Metric::Calories).collect();
        let r = vitals_core::stats::pearson(&steps, &calories);
        assert!(r > 0.5, "steps/calories correlation too weak: {r}");
    }

    #[test]
    fn metadata_ids_are_sequential_and_ages_in_range() {
        let dataset = small().generate_seeded(1).expect("generation should succeed");
        let population: &Population = &dataset.population;
        assert_eq!(population.user_ids(), (1..=12).collect::<Vec<u32>>());
        for profile in population.profiles() {
            assert!((18..=70).contains(&profile.age), "age {} out of range", profile.age);
        }
    }

    #[test]
    fn same_seed_is_bit_identical_and_different_seed_is_not() {
        let generator = small();
        let a = generator.generate_seeded(42).expect("first run");
        let b = generator.generate_seeded(42).expect("second run");
        let c = generator.generate_seeded(43).expect("third run");
        assert_eq!(a, b);
        assert_ne!(a.readings, c.readings);
    }

    #[test]
    fn rejects_empty_dimensions() {
        let err = Generator::new(GeneratorConfig { users: 0, days: 90 })
            .expect_err("users=0 must fail");
        assert!(err.to_string().contains("users must be >= 1"));
        let err = Generator::new(GeneratorConfig { users: 10, days: 0 })
            .expect_err("days=0 must fail");
        assert!(err.to_string().contains("days must be >= 1"));
    }

    #[test]
    fn rejects_dimensions_whose_cell_count_overflows() {
        let config = GeneratorConfig {
            users: u32::MAX as usize,
            days: usize::MAX / 2,
        };
        let err = config.validate().expect_err("overflowing shape must fail");
        assert_eq!(err.code(), "invalid_input");
        assert!(err.to_string().contains("overflows"));
        assert!(Generator::new(config).is_err());
    }

    #[test]
    fn quantize_rounds_half_to_even_then_clamps() {
        assert_eq!(quantize(84.5, Metric::HeartRate), 84.0);
        assert_eq!(quantize(85.5, Metric::HeartRate), 86.0);
        assert_eq!(quantize(30.2, Metric::HeartRate), 60.0);
        assert_eq!(quantize(99_999.0, Metric::Steps), 15_000.0);
    }
}
