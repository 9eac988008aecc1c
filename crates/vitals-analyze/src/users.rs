// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use std::cmp::Ordering;
use vitals_core::stats::{mean, population_std, quantile, unit_if_zero};
use vitals_core::{CleanedTensor, METRIC_COUNT, Metric, MetricArray, Population, VitalsError};

/// Per-user mean and population standard deviation of each metric across
/// all days. Row `i` belongs to user `i` on the tensor's user axis.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct UserStats {
    pub means: Vec<MetricArray>,
    pub stds: Vec<MetricArray>,
}

impl UserStats {
    pub fn users(&self) -> usize {
        self.means.len()
    }

    /// One metric's per-user means.
    pub fn metric_means(&self, metric: Metric) -> Vec<f64> {
        self.means.iter().map(|row| row[metric.index()]).collect()
    }
}

pub fn per_user_stats(readings: &CleanedTensor) -> UserStats {
    let mut means = Vec::with_capacity(readings.users());
    let mut stds = Vec::with_capacity(readings.users());
    for user in 0..readings.users() {
        let mut mean_row = [0.0; METRIC_COUNT];
        let mut std_row = [0.0; METRIC_COUNT];
        for metric in Metric::ALL {
            let series: Vec<f64> = readings.user_series(user, metric).collect();
            // days >= 1 is a tensor invariant, so both statistics exist.
            mean_row[metric.index()] = mean(&series).unwrap_or(0.0);
            std_row[metric.index()] = population_std(&series).unwrap_or(0.0);
        }
        means.push(mean_row);
        stds.push(std_row);
    }
    UserStats { means, stds }
}

/// Per-user means expressed as z-scores against the population.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Standardized {
    pub z: Vec<MetricArray>,
    pub population_mean: MetricArray,
    pub population_std: MetricArray,
    /// Metrics whose population std was zero and was replaced by one.
    pub unit_scaled: Vec<Metric>,
}

pub fn standardize_user_means(stats: &UserStats) -> Standardized {
    let mut center = [0.0; METRIC_COUNT];
    let mut spread = [0.0; METRIC_COUNT];
    let mut scale = [1.0; METRIC_COUNT];
    let mut unit_scaled = vec![];
    for metric in Metric::ALL {
        let column = stats.metric_means(metric);
        let j = metric.index();
        center[j] = mean(&column).unwrap_or(0.0);
        spread[j] = population_std(&column).unwrap_or(0.0);
        scale[j] = unit_if_zero(spread[j]);
        if spread[j] == 0.0 {
            unit_scaled.push(metric);
        }
    }

    let z = stats
        .means
        .iter()
        .map(|row| std::array::from_fn(|j| (row[j] - center[j]) / scale[j]))
        .collect();

    Standardized {
        z,
        population_mean: center,
        population_std: spread,
        unit_scaled,
    }
}

/// A score per user (table order) and the ids of the best `top_k` users.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Ranking {
    pub scores: Vec<f64>,
    pub top_users: Vec<u32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RankOrder {
    Highest,
    Lowest,
}

/// Ids of the `k` best-scored users. The sort is stable, so ties keep table
/// order.
fn top_k(scores: &[f64], population: &Population, k: usize, order: RankOrder) -> Vec<u32> {
    let mut positions: Vec<usize> = (0..scores.len()).collect();
    positions.sort_by(|&a, &b| {
        let cmp = scores[a].total_cmp(&scores[b]);
        match order {
            RankOrder::Lowest => cmp,
            RankOrder::Highest => cmp.reverse(),
        }
    });
    positions
        .into_iter()
        .take(k)
        .filter_map(|pos| population.user_id(pos))
        .collect()
}

/// Sum of per-metric z-scores; top users have the highest sums.
pub fn activity_ranking(standardized: &Standardized, population: &Population, k: usize) -> Ranking {
    let scores: Vec<f64> = standardized.z.iter().map(|row| row.iter().sum()).collect();
    let top_users = top_k(&scores, population, k, RankOrder::Highest);
    Ranking { scores, top_users }
}

/// Mean of each user's per-metric standard deviations; top users have the
/// lowest values.
pub fn consistency_ranking(stats: &UserStats, population: &Population, k: usize) -> Ranking {
    let scores: Vec<f64> = stats
        .stds
        .iter()
        .map(|row| row.iter().sum::<f64>() / METRIC_COUNT as f64)
        .collect();
    let top_users = top_k(&scores, population, k, RankOrder::Lowest);
    Ranking { scores, top_users }
}

/// Weighted health score: per-metric z-scores times `weights`, summed.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct HealthScores {
    pub weights: MetricArray,
    pub scores: Vec<f64>,
    pub top_users: Vec<u32>,
}

pub fn health_scores(
    standardized: &Standardized,
    population: &Population,
    weights: &MetricArray,
    k: usize,
) -> HealthScores {
    let scores: Vec<f64> = standardized
        .z
        .iter()
        .map(|row| row.iter().zip(weights).map(|(z, w)| z * w).sum())
        .collect();
    let top_users = top_k(&scores, population, k, RankOrder::Highest);
    HealthScores {
        weights: *weights,
        scores,
        top_users,
    }
}

#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActivityLevel {
    Low = 0,
    Medium = 1,
    High = 2,
}

impl ActivityLevel {
    pub const fn tier(self) -> u8 {
        self as u8
    }
}

/// Users bucketed by average steps against the 25th/75th percentiles.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityTiers {
    pub p25: f64,
    pub p75: f64,
    pub levels: Vec<ActivityLevel>,
    /// Users per tier, indexed by [`ActivityLevel::tier`].
    pub counts: [usize; 3],
}

impl ActivityTiers {
    /// Positions on the user axis assigned to `level`.
    pub fn members(&self, level: ActivityLevel) -> Vec<usize> {
        self.levels
            .iter()
            .enumerate()
            .filter_map(|(pos, l)| (*l == level).then_some(pos))
            .collect()
    }
}

pub fn activity_tiers(stats: &UserStats) -> Result<ActivityTiers, VitalsError> {
    let steps = stats.metric_means(Metric::Steps);
    let (Some(p25), Some(p75)) = (quantile(&steps, 0.25), quantile(&steps, 0.75)) else {
        return Err(VitalsError::numerical_issue(
            "activity tiers need at least one user",
        ));
    };

    let mut counts = [0usize; 3];
    let levels = steps
        .iter()
        .map(|avg| {
            let level = match (avg.partial_cmp(&p25), avg.partial_cmp(&p75)) {
                (Some(Ordering::Less), _) => ActivityLevel::Low,
                (_, Some(Ordering::Greater)) => ActivityLevel::High,
                _ => ActivityLevel::Medium,
            };
            counts[usize::from(level.tier())] += 1;
            level
        })
        .collect();

    Ok(ActivityTiers {
        p25,
        p75,
        levels,
        counts,
    })
}
