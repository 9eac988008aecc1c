// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

//! Runs generation, corruption, cleaning and analysis from one seed.

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use vitals_analyze::{AnalysisConfig, AnalysisReport, Analyzer};
use vitals_clean::{CleanedData, CleaningConfig, CleaningPipeline, StepReport};
use vitals_core::{RunDiagnostics, VitalsError};
use vitals_synth::{
    CorruptedData, CorruptionConfig, CorruptionSummary, Corruptor, Generator, GeneratorConfig,
    SyntheticDataset,
};

pub const DEFAULT_SEED: u64 = 42;

/// Every knob of one pipeline run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub seed: u64,
    pub generator: GeneratorConfig,
    pub corruption: CorruptionConfig,
    pub cleaning: CleaningConfig,
    pub analysis: AnalysisConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: DEFAULT_SEED,
            generator: GeneratorConfig::default(),
            corruption: CorruptionConfig::default(),
            cleaning: CleaningConfig::default(),
            analysis: AnalysisConfig::default(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), VitalsError> {
        self.generator.validate()?;
        self.corruption.validate()?;
        CleaningPipeline::new(self.cleaning.clone())?;
        self.analysis.validate()?;
        let min_days = self.analysis.min_days();
        if self.generator.days < min_days {
            return Err(VitalsError::invalid_input(format!(
                "days must be >= {min_days} for the configured analysis; got {}",
                self.generator.days
            )));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ShapeSummary {
    pub raw: (usize, usize, usize),
    pub corrupted: (usize, usize, usize),
    pub cleaned: (usize, usize, usize),
    pub metadata: (usize, usize),
    pub rolling_means: (usize, usize),
}

/// Serializable outcome of one run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunReport {
    pub shapes: ShapeSummary,
    pub corruption: CorruptionSummary,
    pub cleaning: Vec<StepReport>,
    pub analysis: AnalysisReport,
    pub diagnostics: RunDiagnostics,
}

/// Every stage's output plus the report built from them.
#[derive(Clone, Debug)]
pub struct PipelineRun {
    pub dataset: SyntheticDataset,
    pub corrupted: CorruptedData,
    pub cleaned: CleanedData,
    pub report: RunReport,
}

/// Validates `config` and runs every stage against one `StdRng` seeded from
/// `config.seed`.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineRun, VitalsError> {
    config.validate()?;
    let started = Instant::now();
    let mut rng = StdRng::seed_from_u64(config.seed);

    let dataset = Generator::new(config.generator.clone())?.generate(&mut rng)?;
    let corrupted = Corruptor::new(config.corruption.clone())?.corrupt(&dataset.readings, &mut rng);
    let cleaned = CleaningPipeline::new(config.cleaning.clone())?.apply(&corrupted.readings)?;
    let analysis = Analyzer::new(config.analysis.clone())?.analyze(&cleaned.readings, &dataset.population)?;

    let shapes = ShapeSummary {
        raw: dataset.readings.shape(),
        corrupted: corrupted.readings.shape(),
        cleaned: cleaned.readings.shape(),
        metadata: dataset.population.shape(),
        rolling_means: (analysis.temporal.rolling_means.len(), vitals_core::METRIC_COUNT),
    };

    let runtime_ms = u64::try_from(started.elapsed().as_millis()).ok();
    let diagnostics = RunDiagnostics {
        seed: Some(config.seed),
        runtime_ms,
        users: config.generator.users,
        days: config.generator.days,
        missing_fraction: Some(config.corruption.missing_fraction),
        notes: vec![
            format!("missing_cells={}", corrupted.summary.missing_cells),
            format!("cleaning_steps={}", cleaned.reports.len()),
        ],
        warnings: analysis.warnings.clone(),
        ..RunDiagnostics::default()
    };
    tracing::info!(seed = config.seed, runtime_ms, "pipeline finished");

    let report = RunReport {
        shapes,
        corruption: corrupted.summary.clone(),
        cleaning: cleaned.reports.clone(),
        analysis,
        diagnostics,
    };

    Ok(PipelineRun {
        dataset,
        corrupted,
        cleaned,
        report,
    })
}

/// Parses a JSON [`PipelineConfig`] and runs it.
pub fn run_pipeline_json(config_json: &str) -> Result<PipelineRun, VitalsError> {
    let config: PipelineConfig = serde_json::from_str(config_json)
        .map_err(|err| VitalsError::invalid_input(format!("invalid pipeline config JSON: {err}")))?;
    run_pipeline(&config)
}

#[cfg(test)]
mod tests {
    use super::{PipelineConfig, run_pipeline, run_pipeline_json};
    use vitals_synth::GeneratorConfig;

    fn small() -> PipelineConfig {
        PipelineConfig {
            generator: GeneratorConfig { users: 12, days: 21 },
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn default_config_validates() {
        PipelineConfig::default()
            .validate()
            .expect("default config should validate");
    }

    #[test]
    fn too_few_days_fail_before_generation() {
        let config = PipelineConfig {
            generator: GeneratorConfig { users: 5, days: 6 },
            ..PipelineConfig::default()
        };
        let err = run_pipeline(&config).expect_err("six days must be rejected");
        assert_eq!(err.code(), "invalid_input");
        assert!(err.to_string().contains("days must be >= 7"));
    }

    #[test]
    fn oversized_dimensions_fail_validation_instead_of_overflowing() {
        let config = PipelineConfig {
            generator: GeneratorConfig {
                users: u32::MAX as usize,
                days: usize::MAX / 2,
            },
            ..PipelineConfig::default()
        };
        let err = run_pipeline(&config).expect_err("oversized shape must be rejected");
        assert_eq!(err.code(), "invalid_input");
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn run_reports_shapes_and_diagnostics() {
        let run = run_pipeline(&small()).expect("pipeline should run");
        let report = &run.report;
        assert_eq!(report.shapes.raw, (12, 21, 4));
        assert_eq!(report.shapes.cleaned, (12, 21, 4));
        assert_eq!(report.shapes.metadata, (12, 3));
        assert_eq!(report.shapes.rolling_means, (15, 4));
        assert_eq!(report.cleaning.len(), 2);
        assert_eq!(report.diagnostics.seed, Some(42));
        assert!(run.cleaned.readings.is_complete());
        assert_eq!(report.corruption.missing_cells, run.corrupted.readings.n_missing());
    }

    #[test]
    fn json_config_fills_missing_fields_with_defaults() {
        let run = run_pipeline_json(r#"{"seed": 7, "generator": {"users": 10, "days": 14}}"#)
            .expect("partial config should run");
        assert_eq!(run.report.diagnostics.seed, Some(7));
        assert_eq!(run.report.shapes.raw, (10, 14, 4));
        assert_eq!(run.report.analysis.activity.top_users.len(), 10);
    }

    #[test]
    fn malformed_json_is_invalid_input() {
        let err = run_pipeline_json("{ not json").expect_err("malformed JSON must fail");
        assert_eq!(err.code(), "invalid_input");
        assert!(err.to_string().contains("invalid pipeline config JSON"));
    }
}
