// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Cleaning of corrupted reading tensors.
//!
//! Cleaning is a fixed two-step protocol:
//!
//! 1. [`remove_outliers_iqr`] for every metric in metric order. Quartiles and
//!    the replacement median are computed from non-missing cells only, and
//!    missing cells are left as they are.
//! 2. [`impute_missing`] fills every remaining missing cell with its metric's
//!    mean over the non-missing cells.
//!
//! Outlier replacement must come first: extremes would otherwise distort the
//! quartiles and the imputation mean. [`CleaningPipeline::apply`] runs both
//! steps and then requires that no missing cell remains.

use vitals_core::stats::{mean, median, quantile_sorted, sorted_copy};
use vitals_core::{CleanedTensor, Metric, ReadingTensor, VitalsError};

const DEFAULT_IQR_FENCE: f64 = 1.5;

#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, Debug, PartialEq)]
pub struct CleaningConfig {
    /// IQR multiple added beyond the quartiles to form the outlier bounds.
    pub iqr_fence: f64,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            iqr_fence: DEFAULT_IQR_FENCE,
        }
    }
}

/// Notes recorded by one cleaning step.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepReport {
    pub step: String,
    pub notes: Vec<String>,
}

/// What the outlier step computed and changed for one metric.
#[derive(Clone, Debug, PartialEq)]
pub struct OutlierPass {
    pub metric: Metric,
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
    pub median: f64,
    pub replaced: usize,
}

/// What the imputation step filled for one metric.
#[derive(Clone, Debug, PartialEq)]
pub struct ImputationPass {
    pub metric: Metric,
    pub fill_value: f64,
    pub imputed: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CleanedData {
    pub readings: CleanedTensor,
    pub reports: Vec<StepReport>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CleaningPipeline {
    config: CleaningConfig,
}

impl CleaningPipeline {
    pub fn new(config: CleaningConfig) -> Result<Self, VitalsError> {
        validate_config(&config)?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Runs the outlier step for every metric, then imputation, then the
    /// completeness check.
    ///
    /// Returns [`VitalsError::InvariantViolation`] when a missing cell
    /// survives; this happens only for a metric with no valid cells at all,
    /// and no partially cleaned tensor is handed back.
    pub fn apply(&self, corrupted: &ReadingTensor) -> Result<CleanedData, VitalsError> {
        let mut working = corrupted.clone();
        let mut outlier_notes = Vec::with_capacity(Metric::ALL.len());
        let mut replaced_total = 0;
        for metric in Metric::ALL {
            let (next, pass) = remove_outliers_iqr(&working, metric, self.config.iqr_fence);
            working = next;
            match pass {
                Some(pass) => {
                    tracing::debug!(
                        %metric,
                        q1 = pass.q1,
                        q3 = pass.q3,
                        replaced = pass.replaced,
                        "outlier step"
                    );
                    replaced_total += pass.replaced;
                    outlier_notes.push(format!(
                        "metric={metric}, q1={}, q3={}, lower={}, upper={}, median={}, replaced={}",
                        pass.q1, pass.q3, pass.lower, pass.upper, pass.median, pass.replaced
                    ));
                }
                None => outlier_notes.push(format!("metric={metric}, skipped: no valid cells")),
            }
        }

        let (imputed, passes) = impute_missing(&working);
        let imputed_total: usize = passes.iter().map(|p| p.imputed).sum();
        let imputation_notes = passes
            .iter()
            .map(|pass| {
                format!(
                    "metric={}, fill_value={}, imputed={}",
                    pass.metric, pass.fill_value, pass.imputed
                )
            })
            .collect();

        let readings = CleanedTensor::try_new(imputed)?;
        tracing::info!(
            replaced = replaced_total,
            imputed = imputed_total,
            "cleaned readings"
        );

        Ok(CleanedData {
            readings,
            reports: vec![
                StepReport {
                    step: "remove_outliers_iqr".to_string(),
                    notes: outlier_notes,
                },
                StepReport {
                    step: "impute_missing".to_string(),
                    notes: imputation_notes,
                },
            ],
        })
    }
}

fn validate_config(config: &CleaningConfig) -> Result<(), VitalsError> {
    if !config.iqr_fence.is_finite() || config.iqr_fence <= 0.0 {
        return Err(VitalsError::invalid_input(format!(
            "iqr_fence must be finite and > 0, got {}",
            config.iqr_fence
        )));
    }
    Ok(())
}

/// Replaces one metric's values outside `[Q1 - fence*IQR, Q3 + fence*IQR]`
/// with the metric median.
///
/// Quartiles interpolate linearly between ranks. Missing cells are ignored
/// for every statistic and stay missing. A zero-IQR metric collapses the
/// bounds to a single point, so every value other than Q1 is replaced. The
/// pass is `None` when the metric has no valid cells; the tensor is then
/// returned unchanged.
pub fn remove_outliers_iqr(
    readings: &ReadingTensor,
    metric: Metric,
    fence: f64,
) -> (ReadingTensor, Option<OutlierPass>) {
    let mut cleaned = readings.clone();
    let sorted = sorted_copy(&readings.valid_metric_values(metric));
    let (Some(q1), Some(q3), Some(center)) = (
        quantile_sorted(&sorted, 0.25),
        quantile_sorted(&sorted, 0.75),
        median(&sorted),
    ) else {
        return (cleaned, None);
    };

    let iqr = q3 - q1;
    let lower = q1 - fence * iqr;
    let upper = q3 + fence * iqr;
    let mut replaced = 0;
    let indices: Vec<usize> = readings.metric_indices(metric).collect();
    let values = cleaned.values_mut();
    for idx in indices {
        let value = values[idx];
        if value.is_nan() {
            continue;
        }
        if value < lower || value > upper {
            values[idx] = center;
            replaced += 1;
        }
    }

    (
        cleaned,
        Some(OutlierPass {
            metric,
            q1,
            q3,
            lower,
            upper,
            median: center,
            replaced,
        }),
    )
}

/// Fills every missing cell with its metric's mean over the non-missing cells.
///
/// A metric with no valid cells has no mean; its cells stay missing and the
/// pass reports a `NaN` fill value with nothing imputed.
pub fn impute_missing(readings: &ReadingTensor) -> (ReadingTensor, Vec<ImputationPass>) {
    let mut imputed = readings.clone();
    let passes = Metric::ALL
        .into_iter()
        .map(|metric| {
            let Some(fill_value) = mean(&readings.valid_metric_values(metric)) else {
                tracing::warn!(
                    %metric,
                    missing = readings.n_missing_for(metric),
                    "metric has no valid cells to impute from"
                );
                return ImputationPass {
                    metric,
                    fill_value: f64::NAN,
                    imputed: 0,
                };
            };
            let indices: Vec<usize> = readings.metric_indices(metric).collect();
            let values = imputed.values_mut();
            let mut count = 0;
            for idx in indices {
                if values[idx].is_nan() {
                    values[idx] = fill_value;
                    count += 1;
                }
            }
            ImputationPass {
                metric,
                fill_value,
                imputed: count,
            }
        })
        .collect();
    (imputed, passes)
}
