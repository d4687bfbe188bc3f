//! # Grader Library
//!
//! This crate turns grading metadata and test outcomes into a deterministic score report.
//!
//! ## Key Concepts
//! - **Metadata records**: point value, friendly name and tags for each graded test.
//! - **Outcome records**: what happened when each test ran.
//! - **Resolver**: joins the two by test identity and reports tests that did not run.
//! - **Aggregator**: folds joined results into totals and per-tag subtotals.
//! - **Extra scoring**: non-test checks and module build status scored next to the tests.
//! - **GradingJob**: wires the stages together under a [`GradingConfig`].
//!
//! Every stage is a pure, synchronous transformation, so independent runs can be graded
//! concurrently without coordination.

pub mod aggregator;
pub mod error;
pub mod parsers;
pub mod report;
pub mod resolver;
pub mod traits;
pub mod types;
pub mod utilities;

use crate::error::GraderError;
use crate::parsers::extras_parser::JsonExtrasParser;
use crate::parsers::metadata_parser::JsonMetadataParser;
use crate::parsers::outcome_parser::JsonOutcomeParser;
use crate::report::GradeReportResponse;
use crate::traits::parser::Parser;
use crate::types::{ExtraScoring, MetadataRecord, OutcomeRecord};
use std::path::Path;
use tracing::info;
use util::grading_config::{GradingConfig, MissingOutcomePolicy};

/// A grading run over one set of metadata and outcome records.
///
/// # Fields
/// - `metadata`: Grading metadata for every graded test.
/// - `outcomes`: Execution outcomes, graded or not.
/// - `extras`: Non-test checks and module build status.
/// - `config`: Scoring, resolution and reporting policy.
pub struct GradingJob {
    metadata: Vec<MetadataRecord>,
    outcomes: Vec<OutcomeRecord>,
    extras: ExtraScoring,
    config: GradingConfig,
}

impl GradingJob {
    /// Create a grading job from records that are already in memory.
    pub fn new(
        metadata: Vec<MetadataRecord>,
        outcomes: Vec<OutcomeRecord>,
        config: GradingConfig,
    ) -> Self {
        Self {
            metadata,
            outcomes,
            extras: ExtraScoring::default(),
            config,
        }
    }

    /// Create a grading job from a metadata manifest and an outcome manifest on disk.
    ///
    /// The outcome manifest may also carry `checks` and `modules` sections.
    ///
    /// # Errors
    /// * [`GraderError::Io`] / [`GraderError::InvalidJson`] if a file cannot be loaded.
    /// * [`GraderError::ParseManifest`] / [`GraderError::InvalidMetadata`] if a manifest is malformed.
    pub fn from_manifests(
        metadata_path: &Path,
        outcomes_path: &Path,
        config: GradingConfig,
    ) -> Result<Self, GraderError> {
        let loaded = utilities::file_loader::load_manifests(metadata_path, outcomes_path)?;
        let metadata = JsonMetadataParser.parse(&loaded.metadata_raw)?;
        let outcomes = JsonOutcomeParser.parse(&loaded.outcomes_raw)?;
        let extras = JsonExtrasParser.parse(&loaded.outcomes_raw)?;
        Ok(Self::new(metadata, outcomes, config).with_extra_scoring(extras))
    }

    /// Score non-test checks and module build status alongside the tests.
    pub fn with_extra_scoring(mut self, extras: ExtraScoring) -> Self {
        self.extras = extras;
        self
    }

    pub fn extra_scoring(&self) -> &ExtraScoring {
        &self.extras
    }

    /// Replace the job's configuration.
    pub fn with_config(mut self, config: GradingConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &GradingConfig {
        &self.config
    }

    /// Run the grading process and generate a report.
    ///
    /// # Steps
    /// 1. Resolves metadata against outcomes (duplicate identities abort here).
    /// 2. Applies the missing-outcome policy: strict fails listing every unresolved test,
    ///    lenient scores missing outcomes as errored.
    /// 3. Aggregates the joined results and any extra scoring under the scoring policy.
    /// 4. Wraps the report with the run-level reporting metadata.
    pub fn grade(&self) -> Result<GradeReportResponse, GraderError> {
        let resolution = resolver::resolve(&self.metadata, &self.outcomes)?;

        let joined = match self.config.resolution.missing_outcomes {
            MissingOutcomePolicy::Strict => resolution.into_strict()?,
            MissingOutcomePolicy::Lenient => resolution.into_lenient()?,
        };

        let report = aggregator::aggregate_with(joined, &self.extras, &self.config.scoring);
        let final_score = report.final_score();
        info!(
            graded = report.results().len(),
            earned = final_score.earned,
            possible = final_score.possible,
            "Grading complete"
        );

        Ok(GradeReportResponse::from(report).with_reporting(&self.config.reporting))
    }
}

/// Load a [`GradingConfig`] from a JSON file.
pub fn load_grading_config(path: &Path) -> Result<GradingConfig, GraderError> {
    util::grading_config::load_config(path).map_err(GraderError::InvalidConfig)
}
