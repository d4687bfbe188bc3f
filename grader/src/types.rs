//! # Types Module
//!
//! Core data structures shared by the resolver and the aggregator.
//!
//! - [`TestIdentity`]: the key used to correlate metadata with outcomes.
//! - [`MetadataRecord`]: validated grading facts for one graded test.
//! - [`OutcomeRecord`]: what happened when that test ran.
//! - [`JoinedResult`]: a metadata record paired with its single outcome.
//! - [`ScoredItem`] and [`ModuleStatus`]: non-test checks and build status scored next to the tests.
//!
//! Records validate their invariants at construction and expose read-only accessors,
//! so a value that exists is always well formed.

use crate::error::GraderError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Fully-qualified name of a test. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct TestIdentity(String);

impl TestIdentity {
    pub fn new(name: impl Into<String>) -> Result<Self, GraderError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GraderError::InvalidMetadata(
                "test identity must not be empty".to_string(),
            ));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The bare test name: the last path segment with any parameterization stripped.
    ///
    /// `suite.ListTest.testAppend[2]` and `suite::list_test::append(3)` both yield
    /// the final segment without the bracketed suffix.
    pub fn method_name(&self) -> &str {
        let unparameterized = self
            .0
            .split(['[', '('])
            .next()
            .unwrap_or(&self.0);
        let segment = unparameterized
            .rsplit(['.', '#', ':'])
            .next()
            .unwrap_or(unparameterized);
        if segment.is_empty() {
            self.0.as_str()
        } else {
            segment
        }
    }
}

impl fmt::Display for TestIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named classification with an optional value. An empty value is treated as no value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Tag {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>, value: Option<&str>) -> Result<Self, GraderError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GraderError::InvalidMetadata(
                "tag name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name,
            value: value.filter(|v| !v.is_empty()).map(str::to_string),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }
}

/// Set of tags on a graded test. Identical (name, value) pairs collapse to one entry;
/// one name may appear with several distinct values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the pair was already present.
    pub fn insert(&mut self, tag: Tag) -> bool {
        self.0.insert(tag)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }

    pub fn contains(&self, name: &str, value: Option<&str>) -> bool {
        self.0
            .iter()
            .any(|t| t.name == name && t.value.as_deref() == value)
    }

    /// Distinct tag names, in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        let mut last: Option<&str> = None;
        self.0.iter().filter_map(move |t| {
            if last == Some(t.name.as_str()) {
                None
            } else {
                last = Some(t.name.as_str());
                last
            }
        })
    }

    /// Every value recorded under `name`, in order.
    pub fn values_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |t| t.name == name)
            .filter_map(|t| t.value.as_deref())
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Grading metadata for one test: its point value, display name and tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    identity: TestIdentity,
    points: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    friendly_name: Option<String>,
    tags: TagSet,
}

impl MetadataRecord {
    /// Fails with [`GraderError::InvalidMetadata`] when `points` is negative or too large.
    pub fn new(identity: TestIdentity, points: i64) -> Result<Self, GraderError> {
        if points < 0 {
            return Err(GraderError::InvalidMetadata(format!(
                "'{identity}' has negative points ({points})"
            )));
        }
        let points = u32::try_from(points).map_err(|_| {
            GraderError::InvalidMetadata(format!("'{identity}' has too many points ({points})"))
        })?;
        Ok(Self {
            identity,
            points,
            friendly_name: None,
            tags: TagSet::new(),
        })
    }

    pub fn with_friendly_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.friendly_name = if name.is_empty() { None } else { Some(name) };
        self
    }

    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.insert(tag);
        self
    }

    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        for tag in tags {
            self.tags.insert(tag);
        }
        self
    }

    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn friendly_name(&self) -> Option<&str> {
        self.friendly_name.as_deref()
    }

    pub fn tags(&self) -> &TagSet {
        &self.tags
    }

    /// Friendly name if one was given, otherwise the bare test name.
    pub fn description(&self) -> &str {
        self.friendly_name
            .as_deref()
            .unwrap_or_else(|| self.identity.method_name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Errored,
    Skipped,
}

impl TestStatus {
    pub fn is_passed(self) -> bool {
        matches!(self, TestStatus::Passed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Errored => "errored",
            TestStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "passed" | "pass" => Ok(TestStatus::Passed),
            "failed" | "fail" | "failure" => Ok(TestStatus::Failed),
            "errored" | "error" => Ok(TestStatus::Errored),
            "skipped" | "skip" | "ignored" => Ok(TestStatus::Skipped),
            other => Err(format!("unknown test status '{other}'")),
        }
    }
}

/// What happened when one test ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutcomeRecord {
    identity: TestIdentity,
    status: TestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl OutcomeRecord {
    pub fn new(identity: TestIdentity, status: TestStatus) -> Self {
        Self {
            identity,
            status,
            detail: None,
        }
    }

    /// Attach a failure message or stack summary.
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    pub fn status(&self) -> TestStatus {
        self.status
    }

    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }
}

/// A graded test joined with its single outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JoinedResult {
    identity: TestIdentity,
    metadata: MetadataRecord,
    outcome: OutcomeRecord,
}

impl JoinedResult {
    /// Only the resolver pairs records, and only under matching identities.
    pub(crate) fn new(metadata: MetadataRecord, outcome: OutcomeRecord) -> Self {
        debug_assert_eq!(metadata.identity(), outcome.identity());
        Self {
            identity: metadata.identity().clone(),
            metadata,
            outcome,
        }
    }

    pub fn identity(&self) -> &TestIdentity {
        &self.identity
    }

    pub fn metadata(&self) -> &MetadataRecord {
        &self.metadata
    }

    pub fn outcome(&self) -> &OutcomeRecord {
        &self.outcome
    }

    pub fn status(&self) -> TestStatus {
        self.outcome.status()
    }
}

/// What produced a report entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EntryKind {
    Test,
    Checkstyle,
    CompileError,
}

impl EntryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntryKind::Test => "test",
            EntryKind::Checkstyle => "checkstyle",
            EntryKind::CompileError => "compileError",
        }
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "test" => Ok(EntryKind::Test),
            "checkstyle" => Ok(EntryKind::Checkstyle),
            "compileError" | "compile_error" => Ok(EntryKind::CompileError),
            other => Err(format!("unknown item type '{}'", other)),
        }
    }
}

/// A scored check that is not a graded test, such as a style check.
///
/// Earns `points` when `passed`, and always adds `points` to the possible total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredItem {
    #[serde(rename = "type")]
    kind: EntryKind,
    description: String,
    points: u32,
    passed: bool,
    explanation: String,
}

impl ScoredItem {
    pub fn new(
        kind: EntryKind,
        description: impl Into<String>,
        points: i64,
        passed: bool,
    ) -> Result<Self, GraderError> {
        let description = description.into();
        if description.trim().is_empty() {
            return Err(GraderError::InvalidMetadata(
                "scored item description must not be empty".to_string(),
            ));
        }
        let points = u32::try_from(points).map_err(|_| {
            GraderError::InvalidMetadata(format!(
                "'{}' has invalid points {} (must be between 0 and {})",
                description,
                points,
                u32::MAX
            ))
        })?;
        let explanation = format!("{} {}", description, if passed { "passed" } else { "failed" });
        Ok(Self {
            kind,
            description,
            points,
            passed,
            explanation,
        })
    }

    /// A style check worth `points`.
    pub fn checkstyle(points: i64, passed: bool) -> Result<Self, GraderError> {
        let explanation = if passed {
            "No checkstyle errors were reported"
        } else {
            "checkstyle found style issues"
        };
        Ok(Self::new(EntryKind::Checkstyle, "checkstyle", points, passed)?.with_explanation(explanation))
    }

    /// Replace the generated explanation. Empty text keeps the generated one.
    pub fn with_explanation(mut self, explanation: impl Into<String>) -> Self {
        let explanation = explanation.into();
        if !explanation.is_empty() {
            self.explanation = explanation;
        }
        self
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn points(&self) -> u32 {
        self.points
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

/// Whether one build module compiled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleStatus {
    name: String,
    compiled: bool,
}

impl ModuleStatus {
    pub fn new(name: impl Into<String>, compiled: bool) -> Result<Self, GraderError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(GraderError::InvalidMetadata(
                "module name must not be empty".to_string(),
            ));
        }
        Ok(Self { name, compiled })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn compiled(&self) -> bool {
        self.compiled
    }

    /// The zero-point entry recorded for a module that failed to compile.
    pub fn compile_error(&self) -> Option<ScoredItem> {
        if self.compiled {
            return None;
        }
        Some(ScoredItem {
            kind: EntryKind::CompileError,
            description: "Compiler".to_string(),
            points: 0,
            passed: false,
            explanation: format!("{} didn't compile", self.name),
        })
    }
}

/// Scored checks and module build status graded alongside the tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraScoring {
    pub items: Vec<ScoredItem>,
    pub modules: Vec<ModuleStatus>,
}

impl ExtraScoring {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.modules.is_empty()
    }
}
