// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use vitals_core::{CleanedTensor, Metric, Population, VitalsError};

#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GoalThresholds {
    pub steps: f64,
    pub calories: f64,
    pub active_minutes: f64,
}

impl Default for GoalThresholds {
    fn default() -> Self {
        Self {
            steps: 8_000.0,
            calories: 2_000.0,
            active_minutes: 60.0,
        }
    }
}

impl GoalThresholds {
    pub fn validate(&self) -> Result<(), VitalsError> {
        for (name, value) in [
            ("steps", self.steps),
            ("calories", self.calories),
            ("active_minutes", self.active_minutes),
        ] {
            if !value.is_finite() {
                return Err(VitalsError::invalid_input(format!(
                    "goal threshold {name} must be finite; got {value}"
                )));
            }
        }
        Ok(())
    }

    /// True when a single day's readings meet every threshold.
    pub fn met(&self, steps: f64, calories: f64, active_minutes: f64) -> bool {
        steps >= self.steps && calories >= self.calories && active_minutes >= self.active_minutes
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GoalAchievement {
    pub thresholds: GoalThresholds,
    pub achiever_rate: f64,
    /// Days on which each user met every goal.
    pub met: Vec<usize>,
    /// Fraction of days each user met every goal.
    pub rates: Vec<f64>,
    /// Ids of users whose rate is at least `achiever_rate`.
    pub consistent_achievers: Vec<u32>,
}

pub fn goal_achievement(
    readings: &CleanedTensor,
    population: &Population,
    thresholds: &GoalThresholds,
    achiever_rate: f64,
) -> GoalAchievement {
    let days = readings.days();
    let met: Vec<usize> = (0..readings.users())
        .map(|user| {
            (0..days)
                .filter(|&day| {
                    thresholds.met(
                        readings.get(user, day, Metric::Steps),
                        readings.get(user, day, Metric::Calories),
                        readings.get(user, day, Metric::ActiveMinutes),
                    )
                })
                .count()
        })
        .collect();
    let rates: Vec<f64> = met.iter().map(|&n| n as f64 / days as f64).collect();
    let consistent_achievers = rates
        .iter()
        .enumerate()
        .filter(|(_, rate)| **rate >= achiever_rate)
        .filter_map(|(pos, _)| population.user_id(pos))
        .collect();

    GoalAchievement {
        thresholds: *thresholds,
        achiever_rate,
        met,
        rates,
        consistent_achievers,
    }
}
