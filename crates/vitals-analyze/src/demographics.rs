// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use crate::users::UserStats;
use vitals_core::stats::mean;
use vitals_core::{Gender, Metric, Population};

/// Mean of per-user average steps for each gender; `None` when no user of
/// that gender exists.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GenderSteps {
    pub male: Option<f64>,
    pub female: Option<f64>,
}

impl GenderSteps {
    pub fn get(&self, gender: Gender) -> Option<f64> {
        match gender {
            Gender::Male => self.male,
            Gender::Female => self.female,
        }
    }
}

pub fn steps_by_gender(stats: &UserStats, population: &Population) -> GenderSteps {
    let steps = stats.metric_means(Metric::Steps);
    let group = |gender: Gender| {
        let values: Vec<f64> = population
            .profiles()
            .iter()
            .zip(&steps)
            .filter(|(profile, _)| profile.gender == gender)
            .map(|(_, avg)| *avg)
            .collect();
        let out = mean(&values);
        if out.is_none() {
            tracing::warn!(gender = gender.code(), "no users in gender group");
        }
        out
    };
    GenderSteps {
        male: group(Gender::Male),
        female: group(Gender::Female),
    }
}
