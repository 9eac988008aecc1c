// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::VitalsError;
use crate::metric::{METRIC_COUNT, Metric};
use std::ops::Deref;

/// Owned (user, day, metric) reading tensor stored row-major.
///
/// Missing readings are encoded as `NaN`. Infinite values are rejected at
/// construction.
#[derive(Clone, Debug, PartialEq)]
pub struct ReadingTensor {
    values: Vec<f64>,
    users: usize,
    days: usize,
}

impl ReadingTensor {
    /// Constructs a validated tensor from flat `(user, day, metric)` values.
    pub fn new(values: Vec<f64>, users: usize, days: usize) -> Result<Self, VitalsError> {
        if users == 0 {
            return Err(VitalsError::invalid_input("users must be >= 1"));
        }
        if days == 0 {
            return Err(VitalsError::invalid_input("days must be >= 1"));
        }

        let expected_len = users
            .checked_mul(days)
            .and_then(|cells| cells.checked_mul(METRIC_COUNT))
            .ok_or_else(|| {
                VitalsError::invalid_input("users*days*metrics overflow while validating shape")
            })?;
        if values.len() != expected_len {
            return Err(VitalsError::invalid_input(format!(
                "value length mismatch: got {}, expected {expected_len} (users={users}, days={days}, metrics={METRIC_COUNT})",
                values.len()
            )));
        }

        if let Some((idx, value)) = values
            .iter()
            .copied()
            .enumerate()
            .find(|(_, v)| v.is_infinite())
        {
            return Err(VitalsError::invalid_input(format!(
                "readings must be finite or NaN: index {idx} has {value}"
            )));
        }

        Ok(Self {
            values,
            users,
            days,
        })
    }

    /// Builds a tensor by evaluating `f` for every cell in storage order.
    pub fn from_fn(
        users: usize,
        days: usize,
        mut f: impl FnMut(usize, usize, Metric) -> f64,
    ) -> Result<Self, VitalsError> {
        let capacity = users
            .checked_mul(days)
            .and_then(|cells| cells.checked_mul(METRIC_COUNT))
            .ok_or_else(|| {
                VitalsError::invalid_input("users*days*metrics overflow while validating shape")
            })?;
        let mut values = Vec::with_capacity(capacity);
        for user in 0..users {
            for day in 0..days {
                for metric in Metric::ALL {
                    values.push(f(user, day, metric));
                }
            }
        }
        Self::new(values, users, days)
    }

    pub fn users(&self) -> usize {
        self.users
    }

    pub fn days(&self) -> usize {
        self.days
    }

    /// `(users, days, metrics)`.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.users, self.days, METRIC_COUNT)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Mutable access to the flat buffer. Writing an infinite value breaks
    /// the construction invariant; callers only write finite values or `NaN`.
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// Flat storage index of a cell.
    ///
    /// # Panics
    ///
    /// Panics when `user` or `day` is out of range.
    pub fn index_of(&self, user: usize, day: usize, metric: Metric) -> usize {
        assert!(
            user < self.users && day < self.days,
            "cell out of range: user={user}, day={day}, shape=({}, {})",
            self.users,
            self.days
        );
        (user * self.days + day) * METRIC_COUNT + metric.index()
    }

    /// # Panics
    ///
    /// Panics when `user` or `day` is out of range.
    pub fn get(&self, user: usize, day: usize, metric: Metric) -> f64 {
        self.values[self.index_of(user, day, metric)]
    }

    /// # Panics
    ///
    /// Panics when `user` or `day` is out of range.
    pub fn set(&mut self, user: usize, day: usize, metric: Metric, value: f64) {
        let idx = self.index_of(user, day, metric);
        self.values[idx] = value;
    }

    pub fn is_missing(&self, user: usize, day: usize, metric: Metric) -> bool {
        self.get(user, day, metric).is_nan()
    }

    pub fn n_missing(&self) -> usize {
        self.values.iter().filter(|v| v.is_nan()).count()
    }

    pub fn n_missing_for(&self, metric: Metric) -> usize {
        self.metric_values(metric).filter(|v| v.is_nan()).count()
    }

    /// Returns true when no cell is missing.
    pub fn is_complete(&self) -> bool {
        !self.values.iter().any(|v| v.is_nan())
    }

    /// Flat indices of every cell of `metric`, user-major then day.
    pub fn metric_indices(&self, metric: Metric) -> impl Iterator<Item = usize> + use<> {
        let offset = metric.index();
        (0..self.users * self.days).map(move |cell| cell * METRIC_COUNT + offset)
    }

    /// Values of every cell of `metric`, user-major then day.
    pub fn metric_values(&self, metric: Metric) -> impl Iterator<Item = f64> + '_ {
        self.values
            .iter()
            .skip(metric.index())
            .step_by(METRIC_COUNT)
            .copied()
    }

    /// Non-missing values of `metric`, user-major then day.
    pub fn valid_metric_values(&self, metric: Metric) -> Vec<f64> {
        self.metric_values(metric).filter(|v| !v.is_nan()).collect()
    }

    /// One user's daily series for `metric`.
    pub fn user_series(&self, user: usize, metric: Metric) -> impl Iterator<Item = f64> + '_ {
        let start = user * self.days * METRIC_COUNT;
        let end = start + self.days * METRIC_COUNT;
        self.values[start..end]
            .iter()
            .skip(metric.index())
            .step_by(METRIC_COUNT)
            .copied()
    }
}

/// A reading tensor proven to contain no missing cells.
///
/// The only constructor checks completeness, so analysis code accepting this
/// type never observes `NaN`.
#[derive(Clone, Debug, PartialEq)]
pub struct CleanedTensor(ReadingTensor);

impl CleanedTensor {
    pub fn try_new(readings: ReadingTensor) -> Result<Self, VitalsError> {
        let missing = readings.n_missing();
        if missing > 0 {
            return Err(VitalsError::invariant_violation(format!(
                "cleaned tensor still contains {missing} missing cells"
            )));
        }
        Ok(Self(readings))
    }

    pub fn as_tensor(&self) -> &ReadingTensor {
        &self.0
    }

    pub fn into_inner(self) -> ReadingTensor {
        self.0
    }
}

impl Deref for CleanedTensor {
    type Target = ReadingTensor;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
