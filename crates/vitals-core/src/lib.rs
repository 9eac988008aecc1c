// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Core shared types for vitals: the reading tensor, population metadata,
//! statistics helpers and the error type.

pub mod diagnostics;
pub mod error;
pub mod metric;
pub mod population;
pub mod stats;
pub mod tensor;

pub use diagnostics::{DIAGNOSTICS_SCHEMA_VERSION, RunDiagnostics};
pub use error::VitalsError;
pub use metric::{METRIC_COUNT, Metric, MetricArray};
pub use population::{Gender, METADATA_COLUMNS, Population, UserProfile};
pub use tensor::{CleanedTensor, ReadingTensor};
