// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::users::UserStats;
use vitals_core::stats::pearson;
use vitals_core::{CleanedTensor, METRIC_COUNT, Metric, Population};

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct Correlations {
    /// Pearson correlation between metrics over every (user, day) sample.
    pub metrics: [[f64; METRIC_COUNT]; METRIC_COUNT],
    /// Pearson correlation between user age and average daily steps.
    pub age_steps: f64,
}

/// Symmetric metric correlation matrix with a unit diagonal. Pairs where
/// either metric has zero variance report 0.0.
pub fn metric_correlations(readings: &CleanedTensor) -> [[f64; METRIC_COUNT]; METRIC_COUNT] {
    let columns: Vec<Vec<f64>> = Metric::ALL
        .iter()
        .map(|metric| readings.metric_values(*metric).collect())
        .collect();
    let mut matrix = [[0.0; METRIC_COUNT]; METRIC_COUNT];
    for i in 0..METRIC_COUNT {
        matrix[i][i] = 1.0;
        for j in (i + 1)..METRIC_COUNT {
            let r = pearson(&columns[i], &columns[j]);
            matrix[i][j] = r;
            matrix[j][i] = r;
        }
    }
    matrix
}

pub fn age_steps_correlation(stats: &UserStats, population: &Population) -> f64 {
    pearson(&population.ages(), &stats.metric_means(Metric::Steps))
}

pub fn correlations(readings: &CleanedTensor, stats: &UserStats, population: &Population) -> Correlations {
    Correlations {
        metrics: metric_correlations(readings),
        age_steps: age_steps_correlation(stats, population),
    }
}

#[cfg(test)]
mod tests {
    use super::{age_steps_correlation, metric_correlations};
    use crate::users::per_user_stats;
    use vitals_core::{CleanedTensor, Gender, Metric, Population, ReadingTensor, UserProfile};

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "actual={actual}, expected={expected}, tol={tol}"
        );
    }

    fn cleaned(users: usize, days: usize, f: impl FnMut(usize, usize, Metric) -> f64) -> CleanedTensor {
        let tensor = ReadingTensor::from_fn(users, days, f).expect("test tensor should be valid");
        CleanedTensor::try_new(tensor).expect("test tensor is complete")
    }

    #[test]
    fn matrix_is_symmetric_with_unit_diagonal() {
        let readings = cleaned(3, 5, |user, day, metric| match metric {
            Metric::Steps => (user * 5 + day) as f64,
            Metric::Calories => 2.0 * (user * 5 + day) as f64 + 1.0,
            Metric::ActiveMinutes => -((user * 5 + day) as f64),
            Metric::HeartRate => 72.0,
        });
        let matrix = metric_correlations(&readings);
        for i in 0..4 {
            assert_eq!(matrix[i][i], 1.0);
            for j in 0..4 {
                assert_eq!(matrix[i][j], matrix[j][i]);
            }
        }
        assert_close(matrix[0][1], 1.0, 1e-12);
        assert_close(matrix[0][2], -1.0, 1e-12);
        assert_eq!(matrix[0][3], 0.0);
    }

    #[test]
    fn age_correlates_with_average_steps() {
        let ages = [25u8, 35, 45, 55];
        let population = Population::new(
            ages.iter()
                .enumerate()
                .map(|(idx, age)| UserProfile {
                    user_id: idx as u32 + 1,
                    age: *age,
                    gender: Gender::Female,
                })
                .collect(),
        )
        .expect("population should be valid");
        let readings = cleaned(4, 3, |user, _, _| 10_000.0 - 1_000.0 * user as f64);
        let r = age_steps_correlation(&per_user_stats(&readings), &population);
        assert_close(r, -1.0, 1e-12);
    }
}
