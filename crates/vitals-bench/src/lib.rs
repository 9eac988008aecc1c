// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Shared fixtures for the criterion benches.

use rand::SeedableRng;
use rand::rngs::StdRng;
use vitals_core::{Population, ReadingTensor, VitalsError};
use vitals_synth::{CorruptionConfig, Corruptor, Generator, GeneratorConfig};

pub const BENCH_SEED: u64 = 42;

/// Corrupted readings and their population for a `users x days` run with
/// default corruption fractions.
pub fn corrupted_fixture(
    users: usize,
    days: usize,
) -> Result<(ReadingTensor, Population), VitalsError> {
    let mut rng = StdRng::seed_from_u64(BENCH_SEED);
    let dataset = Generator::new(GeneratorConfig { users, days })?.generate(&mut rng)?;
    let corrupted = Corruptor::new(CorruptionConfig::default())?.corrupt(&dataset.readings, &mut rng);
    Ok((corrupted.readings, dataset.population))
}
