// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Statistics over a cleaned readings tensor and its user table.
//!
//! Every component is a pure function and is exported on its own;
//! [`Analyzer::analyze`] runs them all in a fixed order and bundles the
//! results into an [`AnalysisReport`].

pub mod correlation;
pub mod demographics;
pub mod goals;
pub mod temporal;
pub mod users;

pub use correlation::{Correlations, age_steps_correlation, correlations, metric_correlations};
pub use demographics::{GenderSteps, steps_by_gender};
pub use goals::{GoalAchievement, GoalThresholds, goal_achievement};
pub use temporal::{
    DAYS_PER_WEEK, MonthOverMonth, TemporalTrends, daily_means, month_over_month, rolling_mean,
    temporal_trends, trend_slopes, weekday_means,
};
pub use users::{
    ActivityLevel, ActivityTiers, HealthScores, Ranking, Standardized, UserStats, activity_ranking,
    activity_tiers, consistency_ranking, health_scores, per_user_stats, standardize_user_means,
};

use vitals_core::{CleanedTensor, MetricArray, Population, VitalsError};

/// Analysis knobs.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisConfig {
    /// Users reported by each ranking.
    pub top_k: usize,
    pub rolling_window: usize,
    /// Equal contiguous windows used for month-over-month growth.
    pub month_windows: usize,
    /// Health-score weights in metric order.
    pub health_weights: MetricArray,
    pub goals: GoalThresholds,
    /// Minimum goal rate for a consistent achiever.
    pub achiever_rate: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            rolling_window: 7,
            month_windows: 3,
            health_weights: [0.4, 0.2, 0.35, 0.05],
            goals: GoalThresholds::default(),
            achiever_rate: 0.8,
        }
    }
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), VitalsError> {
        if self.top_k == 0 {
            return Err(VitalsError::invalid_input("top_k must be >= 1"));
        }
        if self.rolling_window == 0 {
            return Err(VitalsError::invalid_input("rolling_window must be >= 1"));
        }
        if self.month_windows == 0 {
            return Err(VitalsError::invalid_input("month_windows must be >= 1"));
        }
        if let Some(bad) = self.health_weights.iter().find(|w| !w.is_finite()) {
            return Err(VitalsError::invalid_input(format!(
                "health weights must be finite; got {bad}"
            )));
        }
        if !self.achiever_rate.is_finite() || !(0.0..=1.0).contains(&self.achiever_rate) {
            return Err(VitalsError::invalid_input(format!(
                "achiever_rate must be within [0, 1]; got {}",
                self.achiever_rate
            )));
        }
        self.goals.validate()
    }

    /// Fewest days for which every temporal statistic is defined.
    pub fn min_days(&self) -> usize {
        self.rolling_window
            .max(temporal::DAYS_PER_WEEK)
            .max(self.month_windows)
    }
}

#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisReport {
    pub user_stats: UserStats,
    pub activity: Ranking,
    pub consistency: Ranking,
    pub tiers: ActivityTiers,
    pub temporal: TemporalTrends,
    pub correlations: Correlations,
    pub demographics: GenderSteps,
    pub health: HealthScores,
    pub goals: GoalAchievement,
    /// Degenerate inputs handled with a fallback.
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Result<Self, VitalsError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn analyze(
        &self,
        readings: &CleanedTensor,
        population: &Population,
    ) -> Result<AnalysisReport, VitalsError> {
        if population.len() != readings.users() {
            return Err(VitalsError::invalid_input(format!(
                "population has {} users but readings have {}",
                population.len(),
                readings.users()
            )));
        }
        let min_days = self.config.min_days();
        if readings.days() < min_days {
            return Err(VitalsError::invalid_input(format!(
                "analysis needs at least {min_days} days; got {}",
                readings.days()
            )));
        }

        let cfg = &self.config;
        let mut warnings = vec![];

        let user_stats = per_user_stats(readings);
        let standardized = standardize_user_means(&user_stats);
        for metric in &standardized.unit_scaled {
            tracing::warn!(metric = metric.as_str(), "zero population std; using unit scale");
            warnings.push(format!(
                "{metric} has zero variance across users; standardized with unit scale"
            ));
        }

        let activity = activity_ranking(&standardized, population, cfg.top_k);
        let consistency = consistency_ranking(&user_stats, population, cfg.top_k);
        let tiers = activity_tiers(&user_stats)?;
        let temporal = temporal_trends(readings, cfg.rolling_window, cfg.month_windows)?;
        let correlations = correlations(readings, &user_stats, population);
        let demographics = steps_by_gender(&user_stats, population);
        for (label, value) in [("male", demographics.male), ("female", demographics.female)] {
            if value.is_none() {
                warnings.push(format!("no {label} users; gender step mean unavailable"));
            }
        }
        let health = health_scores(&standardized, population, &cfg.health_weights, cfg.top_k);
        let goals = goal_achievement(readings, population, &cfg.goals, cfg.achiever_rate);

        tracing::info!(
            users = readings.users(),
            days = readings.days(),
            consistent_achievers = goals.consistent_achievers.len(),
            warnings = warnings.len(),
            "analysis complete"
        );

        Ok(AnalysisReport {
            user_stats,
            activity,
            consistency,
            tiers,
            temporal,
            correlations,
            demographics,
            health,
            goals,
            warnings,
        })
    }
}
