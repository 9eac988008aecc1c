// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use vitals_core::stats::fit_linear;
use vitals_core::{CleanedTensor, METRIC_COUNT, Metric, MetricArray, VitalsError};

pub const DAYS_PER_WEEK: usize = 7;

/// Population-wide trends over the day axis.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TemporalTrends {
    /// Mean across users for each day, shape (days, metrics).
    pub daily_means: Vec<MetricArray>,
    pub rolling_window: usize,
    /// Trailing rolling mean of `daily_means`, shape (days - window + 1, metrics).
    pub rolling_means: Vec<MetricArray>,
    /// Bucket `day % 7`, shape (7, metrics).
    pub weekday_means: Vec<MetricArray>,
    /// Least-squares slope of each metric's daily mean against the day index.
    pub trend_slopes: MetricArray,
    pub month_over_month: MonthOverMonth,
}

/// Means over equal contiguous windows of days and the relative growth
/// between consecutive windows.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct MonthOverMonth {
    pub window_days: usize,
    pub window_means: Vec<MetricArray>,
    pub growth: Vec<MetricArray>,
}

pub fn daily_means(readings: &CleanedTensor) -> Vec<MetricArray> {
    let users = readings.users() as f64;
    (0..readings.days())
        .map(|day| {
            let mut row = [0.0; METRIC_COUNT];
            for metric in Metric::ALL {
                let total: f64 = (0..readings.users())
                    .map(|user| readings.get(user, day, metric))
                    .sum();
                row[metric.index()] = total / users;
            }
            row
        })
        .collect()
}

fn column_mean(rows: &[MetricArray]) -> MetricArray {
    let mut out = [0.0; METRIC_COUNT];
    if rows.is_empty() {
        return out;
    }
    for row in rows {
        for (acc, value) in out.iter_mut().zip(row) {
            *acc += value;
        }
    }
    let n = rows.len() as f64;
    out.iter_mut().for_each(|v| *v /= n);
    out
}

/// Trailing mean over `window` consecutive rows, emitted only where the full
/// window fits.
pub fn rolling_mean(series: &[MetricArray], window: usize) -> Result<Vec<MetricArray>, VitalsError> {
    if window == 0 {
        return Err(VitalsError::invalid_input("rolling window must be >= 1"));
    }
    if series.len() < window {
        return Err(VitalsError::invalid_input(format!(
            "rolling window {window} exceeds series length {}",
            series.len()
        )));
    }
    Ok(series.windows(window).map(column_mean).collect())
}

/// Mean over every user and every day sharing the same `day % 7` bucket.
pub fn weekday_means(readings: &CleanedTensor) -> Vec<MetricArray> {
    let mut sums = vec![[0.0; METRIC_COUNT]; DAYS_PER_WEEK];
    let mut counts = [0usize; DAYS_PER_WEEK];
    for user in 0..readings.users() {
        for day in 0..readings.days() {
            let bucket = day % DAYS_PER_WEEK;
            counts[bucket] += 1;
            for metric in Metric::ALL {
                sums[bucket][metric.index()] += readings.get(user, day, metric);
            }
        }
    }
    sums.into_iter()
        .zip(counts)
        .map(|(row, count)| {
            if count == 0 {
                [f64::NAN; METRIC_COUNT]
            } else {
                row.map(|v| v / count as f64)
            }
        })
        .collect()
}

pub fn trend_slopes(daily: &[MetricArray]) -> Result<MetricArray, VitalsError> {
    let mut slopes = [0.0; METRIC_COUNT];
    for metric in Metric::ALL {
        let samples: Vec<(f64, f64)> = daily
            .iter()
            .enumerate()
            .map(|(day, row)| (day as f64, row[metric.index()]))
            .collect();
        let Some((_, slope)) = fit_linear(&samples) else {
            return Err(VitalsError::numerical_issue(format!(
                "trend slope for {metric} needs at least two days"
            )));
        };
        slopes[metric.index()] = slope;
    }
    Ok(slopes)
}

/// Splits `daily` into `windows` windows of `daily.len() / windows` days
/// (trailing remainder ignored). Growth divides by the earlier window's mean,
/// with a zero mean replaced by one.
pub fn month_over_month(daily: &[MetricArray], windows: usize) -> Result<MonthOverMonth, VitalsError> {
    if windows == 0 {
        return Err(VitalsError::invalid_input("month window count must be >= 1"));
    }
    let window_days = daily.len() / windows;
    if window_days == 0 {
        return Err(VitalsError::invalid_input(format!(
            "{} days cannot be split into {windows} month windows",
            daily.len()
        )));
    }

    let window_means: Vec<MetricArray> = daily
        .chunks_exact(window_days)
        .take(windows)
        .map(column_mean)
        .collect();
    let growth = window_means
        .windows(2)
        .map(|pair| {
            std::array::from_fn(|j| {
                let base = if pair[0][j] == 0.0 { 1.0 } else { pair[0][j] };
                (pair[1][j] - pair[0][j]) / base
            })
        })
        .collect();

    Ok(MonthOverMonth {
        window_days,
        window_means,
        growth,
    })
}

pub fn temporal_trends(
    readings: &CleanedTensor,
    rolling_window: usize,
    month_windows: usize,
) -> Result<TemporalTrends, VitalsError> {
    let daily = daily_means(readings);
    let rolling_means = rolling_mean(&daily, rolling_window)?;
    let slopes = trend_slopes(&daily)?;
    let month_over_month = month_over_month(&daily, month_windows)?;
    Ok(TemporalTrends {
        weekday_means: weekday_means(readings),
        daily_means: daily,
        rolling_window,
        rolling_means,
        trend_slopes: slopes,
        month_over_month,
    })
}
