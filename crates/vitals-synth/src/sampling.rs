// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use rand::Rng;

/// Standard normal draw via the Box-Muller transform.
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    // u1 in (0, 1] keeps ln finite.
    let u1 = 1.0 - rng.random::<f64>();
    let u2 = rng.random::<f64>();
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Normal draw with the given mean and standard deviation.
pub fn normal<R: Rng + ?Sized>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    mean + std_dev * standard_normal(rng)
}

/// Log-normal draw whose underlying normal has mean `mu` and deviation `sigma`.
/// The median of the distribution is `exp(mu)`.
pub fn log_normal<R: Rng + ?Sized>(rng: &mut R, mu: f64, sigma: f64) -> f64 {
    (mu + sigma * standard_normal(rng)).exp()
}

/// `amount` distinct indices from `0..length`, uniformly at random, in draw
/// order. `amount` is capped at `length`.
pub fn sample_without_replacement<R: Rng + ?Sized>(
    rng: &mut R,
    length: usize,
    amount: usize,
) -> Vec<usize> {
    rand::seq::index::sample(rng, length, amount.min(length)).into_vec()
}
