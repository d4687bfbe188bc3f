//! # Grade Report Module
//!
//! This module defines the data structures and response envelope for returning grading results.
//!
//! ## Overview
//!
//! - [`Report`]: the immutable result of aggregation. Ordered entries (tests, compile failures
//!   and other scored checks), overall totals, per-tag subtotals, module build status and,
//!   when a cap is configured, the capped score.
//! - [`GradeReportResponse`]: wraps a [`Report`] with success/message fields, a timestamp and
//!   the run-level reporting metadata.
//!
//! ## JSON Output Example
//!
//! ```json
//! {
//!   "success": true,
//!   "message": "Grading complete.",
//!   "graded_at": "2026-10-17T12:00:00+00:00",
//!   "assignment": "MP1",
//!   "tags": { "semester": "fall" },
//!   "data": {
//!     "results": [
//!       {
//!         "type": "test",
//!         "identity": "suite.ListTest.testAppend",
//!         "metadata": { "identity": "...", "points": 10, "tags": [] },
//!         "outcome": { "identity": "...", "status": "passed" },
//!         "description": "testAppend",
//!         "passed": true,
//!         "points_earned": 10,
//!         "points_possible": 10,
//!         "counted": true,
//!         "explanation": "suite.ListTest.testAppend passed"
//!       },
//!       {
//!         "type": "checkstyle",
//!         "description": "checkstyle",
//!         "passed": true,
//!         "points_earned": 5,
//!         "points_possible": 5,
//!         "counted": true,
//!         "explanation": "No checkstyle errors were reported"
//!       }
//!     ],
//!     "points_earned": 15,
//!     "points_possible": 15,
//!     "tag_subtotals": {},
//!     "modules": [{ "name": "app", "compiled": true }]
//!   }
//! }
//! ```
//!
//! ## Design Notes
//!
//! [`Report`] carries no timestamp, so identical inputs always produce identical reports.
//! The timestamp lives on the envelope.

use crate::types::{EntryKind, JoinedResult, ModuleStatus, ScoredItem, TestIdentity, TestStatus};
use chrono::Utc;
use serde::Serialize;
use std::collections::BTreeMap;
use util::grading_config::{ReportTag, ReportingOptions};

/// Earned and possible points for some slice of the report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Score {
    pub earned: u64,
    pub possible: u64,
}

impl Score {
    pub(crate) fn add(&mut self, earned: u64, possible: u64) {
        self.earned += earned;
        self.possible += possible;
    }
}

/// Points for every test carrying one tag name, with a breakdown per tag value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TagSubtotal {
    pub earned: u64,
    pub possible: u64,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub by_value: BTreeMap<String, Score>,
}

impl TagSubtotal {
    pub fn score(&self) -> Score {
        Score {
            earned: self.earned,
            possible: self.possible,
        }
    }
}

/// One scored line of the report: a graded test, a style check or a compile failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    #[serde(rename = "type")]
    kind: EntryKind,
    #[serde(flatten)]
    result: Option<JoinedResult>,
    description: String,
    passed: bool,
    points_earned: u64,
    points_possible: u64,
    counted: bool,
    explanation: String,
}

impl ReportEntry {
    pub(crate) fn new(result: JoinedResult, points_earned: u64, points_possible: u64, counted: bool) -> Self {
        let description = result.metadata().description().to_string();
        let verb = match result.status() {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Errored => "errored",
            TestStatus::Skipped => "was skipped",
        };
        let explanation = format!("{} {}", result.identity(), verb);
        Self {
            kind: EntryKind::Test,
            passed: result.status().is_passed(),
            result: Some(result),
            description,
            points_earned,
            points_possible,
            counted,
            explanation,
        }
    }

    pub(crate) fn from_item(item: ScoredItem) -> Self {
        let possible = u64::from(item.points());
        Self {
            kind: item.kind(),
            result: None,
            description: item.description().to_string(),
            passed: item.passed(),
            points_earned: if item.passed() { possible } else { 0 },
            points_possible: possible,
            counted: true,
            explanation: item.explanation().to_string(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    /// The joined test behind this entry; `None` for non-test entries.
    pub fn result(&self) -> Option<&JoinedResult> {
        self.result.as_ref()
    }

    pub fn identity(&self) -> Option<&TestIdentity> {
        self.result.as_ref().map(JoinedResult::identity)
    }

    pub fn status(&self) -> Option<TestStatus> {
        self.result.as_ref().map(JoinedResult::status)
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn points_earned(&self) -> u64 {
        self.points_earned
    }

    pub fn points_possible(&self) -> u64 {
        self.points_possible
    }

    /// False when a scoring policy excluded this test from every total.
    pub fn counted(&self) -> bool {
        self.counted
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

/// Final score summary. Built only by the aggregator and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    results: Vec<ReportEntry>,
    points_earned: u64,
    points_possible: u64,
    tag_subtotals: BTreeMap<String, TagSubtotal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    modules: Vec<ModuleStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    capped: Option<Score>,
}

impl Report {
    pub(crate) fn new(
        results: Vec<ReportEntry>,
        totals: Score,
        tag_subtotals: BTreeMap<String, TagSubtotal>,
        modules: Vec<ModuleStatus>,
        capped: Option<Score>,
    ) -> Self {
        Self {
            results,
            points_earned: totals.earned,
            points_possible: totals.possible,
            tag_subtotals,
            modules,
            capped,
        }
    }

    /// Test entries ordered by identity, then compile failures, then other scored items.
    pub fn results(&self) -> &[ReportEntry] {
        &self.results
    }

    /// Test entries only.
    pub fn tests(&self) -> impl Iterator<Item = &ReportEntry> {
        self.results.iter().filter(|e| e.kind == EntryKind::Test)
    }

    /// Build status of every module, in the order supplied.
    pub fn modules(&self) -> &[ModuleStatus] {
        &self.modules
    }

    pub fn points_earned(&self) -> u64 {
        self.points_earned
    }

    pub fn points_possible(&self) -> u64 {
        self.points_possible
    }

    pub fn tag_subtotals(&self) -> &BTreeMap<String, TagSubtotal> {
        &self.tag_subtotals
    }

    pub fn tag_subtotal(&self, name: &str) -> Option<&TagSubtotal> {
        self.tag_subtotals.get(name)
    }

    /// The score after applying the configured maximum, if one was set.
    pub fn capped(&self) -> Option<Score> {
        self.capped
    }

    /// The capped score when a cap is configured, otherwise the raw totals.
    pub fn final_score(&self) -> Score {
        self.capped.unwrap_or(Score {
            earned: self.points_earned,
            possible: self.points_possible,
        })
    }

    /// Final score as a whole percentage (0-100).
    pub fn percentage(&self) -> u32 {
        let score = self.final_score();
        crate::aggregator::compute_percentage(score.earned, score.possible)
    }
}

/// The response envelope for grading results.
#[derive(Debug, Serialize)]
pub struct GradeReportResponse {
    success: bool,
    message: String,
    graded_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignment: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    tags: BTreeMap<String, ReportTag>,
    data: Report,
}

impl GradeReportResponse {
    /// Attach the run-level assignment name and tags.
    pub fn with_reporting(mut self, reporting: &ReportingOptions) -> Self {
        self.assignment = reporting.assignment.clone();
        self.tags = reporting.tags.clone();
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn graded_at(&self) -> &str {
        &self.graded_at
    }

    pub fn assignment(&self) -> Option<&str> {
        self.assignment.as_deref()
    }

    pub fn tags(&self) -> &BTreeMap<String, ReportTag> {
        &self.tags
    }

    pub fn report(&self) -> &Report {
        &self.data
    }

    pub fn into_report(self) -> Report {
        self.data
    }
}

impl From<Report> for GradeReportResponse {
    fn from(report: Report) -> Self {
        GradeReportResponse {
            success: true,
            message: "Grading complete.".to_string(),
            graded_at: Utc::now().to_rfc3339(),
            assignment: None,
            tags: BTreeMap::new(),
            data: report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate_default;
    use crate::resolver::resolve;
    use crate::types::{MetadataRecord, OutcomeRecord, Tag, TestIdentity};
    use chrono::DateTime;
    use serde_json::Value;

    fn sample_report() -> Report {
        let t1 = TestIdentity::new("suite.IoTest.testRead").unwrap();
        let t2 = TestIdentity::new("suite.IoTest.testWrite").unwrap();
        let metadata = [
            MetadataRecord::new(t1.clone(), 10)
                .unwrap()
                .with_friendly_name("Reads a file")
                .with_tag(Tag::new("category", Some("io")).unwrap()),
            MetadataRecord::new(t2.clone(), 5)
                .unwrap()
                .with_tag(Tag::new("category", Some("io")).unwrap()),
        ];
        let outcomes = [
            OutcomeRecord::new(t1, TestStatus::Passed),
            OutcomeRecord::new(t2, TestStatus::Failed).with_detail("expected 3 but was 4"),
        ];
        let joined = resolve(&metadata, &outcomes).unwrap().into_strict().unwrap();
        aggregate_default(joined)
    }

    #[test]
    fn report_serialization_shape() {
        let value: Value = serde_json::to_value(sample_report()).unwrap();
        assert_eq!(value["points_earned"], 10);
        assert_eq!(value["points_possible"], 15);
        assert!(value.get("capped").is_none());

        assert!(value.get("modules").is_none());

        let first = &value["results"][0];
        assert_eq!(first["type"], "test");
        assert_eq!(first["passed"], true);
        assert_eq!(first["identity"], "suite.IoTest.testRead");
        assert_eq!(first["description"], "Reads a file");
        assert_eq!(first["outcome"]["status"], "passed");
        assert_eq!(first["points_earned"], 10);
        assert_eq!(first["explanation"], "suite.IoTest.testRead passed");

        let second = &value["results"][1];
        assert_eq!(second["description"], "testWrite");
        assert_eq!(second["outcome"]["detail"], "expected 3 but was 4");
        assert_eq!(second["points_earned"], 0);
        assert_eq!(second["points_possible"], 5);

        assert_eq!(value["tag_subtotals"]["category"]["earned"], 10);
        assert_eq!(value["tag_subtotals"]["category"]["possible"], 15);
        assert_eq!(value["tag_subtotals"]["category"]["by_value"]["io"]["possible"], 15);
    }

    #[test]
    fn response_envelope_wraps_report() {
        let mut reporting = ReportingOptions::default();
        reporting.assignment = Some("MP1".to_string());
        reporting.tags.insert("year".to_string(), ReportTag::Int(2026));

        let response = GradeReportResponse::from(sample_report()).with_reporting(&reporting);
        assert!(response.success());
        assert_eq!(response.message(), "Grading complete.");
        assert!(DateTime::parse_from_rfc3339(response.graded_at()).is_ok());

        let value: Value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["assignment"], "MP1");
        assert_eq!(value["tags"]["year"], 2026);
        assert_eq!(value["data"]["points_possible"], 15);
    }

    #[test]
    fn envelope_omits_absent_reporting_metadata() {
        let value: Value = serde_json::to_value(GradeReportResponse::from(sample_report())).unwrap();
        assert!(value.get("assignment").is_none());
        assert!(value.get("tags").is_none());
    }

    #[test]
    fn final_score_without_cap_is_raw_totals() {
        let report = sample_report();
        assert_eq!(report.final_score(), Score { earned: 10, possible: 15 });
        assert_eq!(report.percentage(), 67);
    }

    #[test]
    fn identical_inputs_produce_identical_reports() {
        assert_eq!(sample_report(), sample_report());
    }

    #[test]
    fn non_test_entries_serialize_without_test_fields() {
        let entry = ReportEntry::from_item(ScoredItem::checkstyle(5, false).unwrap());
        assert_eq!(entry.kind(), EntryKind::Checkstyle);
        assert!(entry.result().is_none());
        assert_eq!(entry.status(), None);
        assert_eq!(entry.points_earned(), 0);
        assert_eq!(entry.points_possible(), 5);

        let value: Value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["type"], "checkstyle");
        assert_eq!(value["passed"], false);
        assert_eq!(value["explanation"], "checkstyle found style issues");
        assert!(value.get("identity").is_none());
        assert!(value.get("outcome").is_none());
    }
}
