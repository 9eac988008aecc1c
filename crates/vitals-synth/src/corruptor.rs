// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::sampling::sample_without_replacement;
use rand::Rng;
use vitals_core::{Metric, ReadingTensor, VitalsError};

const DEFAULT_MISSING_FRACTION: f64 = 0.05;
const DEFAULT_OUTLIER_FRACTION: f64 = 0.02;

/// Fractions of cells to blank out and to overwrite with extremes.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct CorruptionConfig {
    /// Fraction of all cells (every user, day and metric) set missing.
    pub missing_fraction: f64,
    /// Fraction of each metric's remaining valid cells set to an extreme.
    pub outlier_fraction: f64,
}

impl Default for CorruptionConfig {
    fn default() -> Self {
        Self {
            missing_fraction: DEFAULT_MISSING_FRACTION,
            outlier_fraction: DEFAULT_OUTLIER_FRACTION,
        }
    }
}

impl CorruptionConfig {
    pub fn validate(&self) -> Result<(), VitalsError> {
        for (name, value) in [
            ("missing_fraction", self.missing_fraction),
            ("outlier_fraction", self.outlier_fraction),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(VitalsError::invalid_input(format!(
                    "{name} must be finite and in [0, 1], got {value}"
                )));
            }
        }
        Ok(())
    }
}

/// Outliers injected into one metric.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricOutliers {
    pub metric: Metric,
    pub low: usize,
    pub high: usize,
}

impl MetricOutliers {
    pub fn total(&self) -> usize {
        self.low + self.high
    }
}

/// Counts of what the corruptor changed.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CorruptionSummary {
    pub missing_cells: usize,
    pub outliers: Vec<MetricOutliers>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CorruptedData {
    pub readings: ReadingTensor,
    pub summary: CorruptionSummary,
}

/// Injects missing cells and extreme readings into a copy of a tensor.
#[derive(Clone, Debug, PartialEq)]
pub struct Corruptor {
    config: CorruptionConfig,
}

impl Corruptor {
    pub fn new(config: CorruptionConfig) -> Result<Self, VitalsError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CorruptionConfig {
        &self.config
    }

    /// Returns a corrupted copy of `raw`; `raw` itself is never touched.
    ///
    /// Missing positions are drawn over the whole flattened tensor first.
    /// Outlier positions are then drawn per metric, in metric order, from the
    /// cells that are still valid, so a missing cell is never also an outlier.
    pub fn corrupt<R: Rng + ?Sized>(&self, raw: &ReadingTensor, rng: &mut R) -> CorruptedData {
        let mut readings = raw.clone();

        let n_missing = fraction_of(self.config.missing_fraction, readings.len());
        for idx in sample_without_replacement(rng, readings.len(), n_missing) {
            readings.values_mut()[idx] = f64::NAN;
        }

        let outliers = Metric::ALL
            .into_iter()
            .map(|metric| self.inject_outliers(&mut readings, metric, rng))
            .collect();

        let summary = CorruptionSummary {
            missing_cells: readings.n_missing(),
            outliers,
        };
        tracing::info!(
            missing_cells = summary.missing_cells,
            outliers = summary.outliers.iter().map(MetricOutliers::total).sum::<usize>(),
            "corrupted readings"
        );
        CorruptedData { readings, summary }
    }

    fn inject_outliers<R: Rng + ?Sized>(
        &self,
        readings: &mut ReadingTensor,
        metric: Metric,
        rng: &mut R,
    ) -> MetricOutliers {
        let valid: Vec<usize> = readings
            .metric_indices(metric)
            .filter(|idx| !readings.values()[*idx].is_nan())
            .collect();
        if valid.is_empty() {
            tracing::warn!(%metric, "no valid cells left for outlier injection");
            return MetricOutliers {
                metric,
                low: 0,
                high: 0,
            };
        }

        let n_out = fraction_of(self.config.outlier_fraction, valid.len())
            .max(1)
            .min(valid.len());
        let chosen = sample_without_replacement(rng, valid.len(), n_out);
        let half = n_out / 2;
        let (low_value, high_value) = metric.extremes();
        let values = readings.values_mut();
        for (rank, pick) in chosen.iter().enumerate() {
            values[valid[*pick]] = if rank < half { low_value } else { high_value };
        }

        MetricOutliers {
            metric,
            low: half,
            high: n_out - half,
        }
    }
}

/// `floor(fraction * count)`.
fn fraction_of(fraction: f64, count: usize) -> usize {
    (fraction * count as f64).floor() as usize
}

#[cfg(test)]
mod tests {
    use super::{CorruptionConfig, Corruptor, fraction_of};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use vitals_core::{Metric, ReadingTensor};

    fn flat_tensor(users: usize, days: usize) -> ReadingTensor {
        ReadingTensor::from_fn(users, days, |_, _, metric| {
            let (lo, hi) = metric.valid_range();
            (lo + hi) / 2.0
        })
        .expect("flat tensor should be valid")
    }

    fn count_value(tensor: &ReadingTensor, metric: Metric, value: f64) -> usize {
        tensor.metric_values(metric).filter(|v| *v == value).count()
    }

    #[test]
    fn injects_requested_counts() {
        let raw = flat_tensor(100, 90);
        let corruptor = Corruptor::new(CorruptionConfig::default()).expect("defaults are valid");
        let mut rng = StdRng::seed_from_u64(42);
        let out = corruptor.corrupt(&raw, &mut rng);

        assert_eq!(out.readings.n_missing(), 1_800);
        assert_eq!(out.summary.missing_cells, 1_800);
        for outliers in &out.summary.outliers {
            let metric = outliers.metric;
            let valid = 9_000 - out.readings.n_missing_for(metric);
            let expected = (0.02 * valid as f64).floor() as usize;
            assert_eq!(outliers.total(), expected, "{metric}");
            assert_eq!(outliers.low, expected / 2);
            let (lo, hi) = metric.extremes();
            assert_eq!(count_value(&out.readings, metric, lo), outliers.low);
            assert_eq!(count_value(&out.readings, metric, hi), outliers.high);
        }
    }

    #[test]
    fn input_tensor_is_not_mutated() {
        let raw = flat_tensor(10, 10);
        let snapshot = raw.clone();
        let corruptor = Corruptor::new(CorruptionConfig {
            missing_fraction: 0.3,
            outlier_fraction: 0.3,
        })
        .expect("config is valid");
        let _ = corruptor.corrupt(&raw, &mut StdRng::seed_from_u64(1));
        assert_eq!(raw, snapshot);
    }

    #[test]
    fn at_least_one_outlier_per_metric_even_for_zero_fraction() {
        let raw = flat_tensor(2, 3);
        let corruptor = Corruptor::new(CorruptionConfig {
            missing_fraction: 0.0,
            outlier_fraction: 0.0,
        })
        .expect("config is valid");
        let out = corruptor.corrupt(&raw, &mut StdRng::seed_from_u64(8));
        assert_eq!(out.readings.n_missing(), 0);
        for outliers in &out.summary.outliers {
            assert_eq!(outliers.low, 0);
            assert_eq!(outliers.high, 1);
        }
    }

    #[test]
    fn fully_missing_input_skips_outliers() {
        let raw = flat_tensor(2, 2);
        let corruptor = Corruptor::new(CorruptionConfig {
            missing_fraction: 1.0,
            outlier_fraction: 0.5,
        })
        .expect("config is valid");
        let out = corruptor.corrupt(&raw, &mut StdRng::seed_from_u64(2));
        assert_eq!(out.readings.n_missing(), raw.len());
        assert!(out.summary.outliers.iter().all(|o| o.total() == 0));
    }

    #[test]
    fn same_seed_yields_identical_corruption() {
        let raw = flat_tensor(20, 14);
        let corruptor = Corruptor::new(CorruptionConfig::default()).expect("defaults are valid");
        let a = corruptor.corrupt(&raw, &mut StdRng::seed_from_u64(77));
        let b = corruptor.corrupt(&raw, &mut StdRng::seed_from_u64(77));
        assert_eq!(a.summary, b.summary);
        let a_bits: Vec<u64> = a.readings.values().iter().map(|v| v.to_bits()).collect();
        let b_bits: Vec<u64> = b.readings.values().iter().map(|v| v.to_bits()).collect();
        assert_eq!(a_bits, b_bits);
    }

    #[test]
    fn rejects_out_of_range_fractions() {
        for (missing, outlier) in [(1.5, 0.02), (-0.1, 0.02), (0.05, f64::NAN), (0.05, 2.0)] {
            let err = Corruptor::new(CorruptionConfig {
                missing_fraction: missing,
                outlier_fraction: outlier,
            })
            .expect_err("fraction outside [0, 1] must fail");
            assert_eq!(err.code(), "invalid_input");
        }
    }

    #[test]
    fn fraction_of_truncates() {
        assert_eq!(fraction_of(0.05, 36_000), 1_800);
        assert_eq!(fraction_of(0.02, 49), 0);
        assert_eq!(fraction_of(1.0, 7), 7);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn config_fills_missing_fields_and_summary_roundtrips() {
        let config: CorruptionConfig =
            serde_json::from_str(r#"{"missing_fraction": 0.1}"#).expect("config should deserialize");
        assert_eq!(config.missing_fraction, 0.1);
        assert_eq!(config.outlier_fraction, CorruptionConfig::default().outlier_fraction);

        let out = Corruptor::new(CorruptionConfig::default())
            .expect("config should be valid")
            .corrupt(&flat_tensor(5, 10), &mut StdRng::seed_from_u64(3));
        let encoded = serde_json::to_string(&out.summary).expect("summary should serialize");
        assert!(encoded.contains("\"metric\":\"steps\""));
        let decoded: super::CorruptionSummary =
            serde_json::from_str(&encoded).expect("summary should deserialize");
        assert_eq!(decoded, out.summary);
    }
}
