// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Number of tracked metrics per (user, day) cell.
pub const METRIC_COUNT: usize = 4;

/// One value per metric, in [`Metric::ALL`] order.
pub type MetricArray = [f64; METRIC_COUNT];

/// Daily health-tracking metric. Discriminants fix the tensor's metric axis.
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Metric {
    Steps = 0,
    Calories = 1,
    ActiveMinutes = 2,
    HeartRate = 3,
}

impl Metric {
    pub const ALL: [Metric; METRIC_COUNT] = [
        Metric::Steps,
        Metric::Calories,
        Metric::ActiveMinutes,
        Metric::HeartRate,
    ];

    /// Position on the tensor's metric axis.
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Steps => "steps",
            Self::Calories => "calories",
            Self::ActiveMinutes => "active_minutes",
            Self::HeartRate => "heart_rate",
        }
    }

    /// Plausible physiological range; synthesized readings are clamped to it.
    pub const fn valid_range(self) -> (f64, f64) {
        match self {
            Self::Steps => (2_000.0, 15_000.0),
            Self::Calories => (1_500.0, 3_500.0),
            Self::ActiveMinutes => (20.0, 180.0),
            Self::HeartRate => (60.0, 120.0),
        }
    }

    /// Low and high readings produced by a faulty sensor. Both lie outside
    /// [`Metric::valid_range`].
    pub const fn extremes(self) -> (f64, f64) {
        match self {
            Self::Steps => (0.0, 50_000.0),
            Self::Calories => (300.0, 12_000.0),
            Self::ActiveMinutes => (0.0, 720.0),
            Self::HeartRate => (0.0, 240.0),
        }
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
