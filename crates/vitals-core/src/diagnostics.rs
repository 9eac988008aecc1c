// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

/// Diagnostics schema version for pipeline run metadata.
pub const DIAGNOSTICS_SCHEMA_VERSION: u32 = 1;

/// Structured diagnostics captured from one pipeline run.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RunDiagnostics {
    pub schema_version: u32,
    pub engine_version: Option<String>,
    pub seed: Option<u64>,
    pub runtime_ms: Option<u64>,
    pub users: usize,
    pub days: usize,
    pub missing_fraction: Option<f64>,
    pub notes: Vec<String>,
    pub warnings: Vec<String>,
}

impl Default for RunDiagnostics {
    fn default() -> Self {
        Self {
            schema_version: DIAGNOSTICS_SCHEMA_VERSION,
            engine_version: Some(env!("CARGO_PKG_VERSION").to_string()),
            seed: None,
            runtime_ms: None,
            users: 0,
            days: 0,
            missing_fraction: None,
            notes: vec![],
            warnings: vec![],
        }
    }
}
