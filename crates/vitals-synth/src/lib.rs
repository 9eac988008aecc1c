// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Seeded synthesis of daily health readings and simulated sensor faults.

pub mod corruptor;
pub mod generator;
pub mod sampling;

pub use corruptor::{CorruptedData, CorruptionConfig, CorruptionSummary, Corruptor, MetricOutliers};
pub use generator::{Generator, GeneratorConfig, SyntheticDataset};
