//! # Resolver
//!
//! Joins graded-test metadata with execution outcomes by [`TestIdentity`].
//!
//! - Duplicate metadata identities abort immediately, before any join.
//! - A graded test with exactly one outcome becomes a [`JoinedResult`].
//! - A graded test with no outcome, or several, is recorded as a [`ResolutionError`].
//! - Outcomes without metadata belong to ungraded tests and are discarded.
//!
//! Output is sorted by identity, so the result does not depend on input order.

use crate::error::{GraderError, ResolutionError};
use crate::types::{JoinedResult, MetadataRecord, OutcomeRecord, TestIdentity, TestStatus};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Detail attached to outcomes synthesized for graded tests that never reported.
pub const MISSING_OUTCOME_DETAIL: &str = "no outcome was recorded for this test";

/// The joined results together with every identity that failed to join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    joined: Vec<JoinedResult>,
    errors: Vec<ResolutionError>,
    unresolved: Vec<MetadataRecord>,
}

impl Resolution {
    pub fn joined(&self) -> &[JoinedResult] {
        &self.joined
    }

    pub fn errors(&self) -> &[ResolutionError] {
        &self.errors
    }

    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fails with every collected error if any graded test did not resolve.
    pub fn into_strict(self) -> Result<Vec<JoinedResult>, GraderError> {
        if self.errors.is_empty() {
            Ok(self.joined)
        } else {
            Err(GraderError::Resolution(self.errors))
        }
    }

    /// Scores graded tests without an outcome as errored.
    ///
    /// Tests with more than one outcome are still ambiguous and fail the run.
    pub fn into_lenient(self) -> Result<Vec<JoinedResult>, GraderError> {
        let ambiguous: Vec<ResolutionError> = self
            .errors
            .iter()
            .filter(|e| matches!(e, ResolutionError::DuplicateOutcome { .. }))
            .cloned()
            .collect();
        if !ambiguous.is_empty() {
            return Err(GraderError::Resolution(ambiguous));
        }

        let mut joined = self.joined;
        for metadata in self.unresolved {
            warn!(
                identity = %metadata.identity(),
                "Graded test has no outcome; scoring it as errored"
            );
            let outcome = OutcomeRecord::new(metadata.identity().clone(), TestStatus::Errored)
                .with_detail(MISSING_OUTCOME_DETAIL);
            joined.push(JoinedResult::new(metadata, outcome));
        }
        joined.sort_by(|a, b| a.identity().cmp(b.identity()));
        Ok(joined)
    }
}

/// Join metadata records with outcome records.
///
/// # Errors
///
/// Returns [`GraderError::Resolution`] listing every [`ResolutionError::DuplicateIdentity`]
/// when two metadata records share an identity. Missing or repeated outcomes do not fail
/// here; they are collected in [`Resolution::errors`].
pub fn resolve(
    metadata_records: &[MetadataRecord],
    outcome_records: &[OutcomeRecord],
) -> Result<Resolution, GraderError> {
    let mut graded: BTreeMap<&TestIdentity, &MetadataRecord> = BTreeMap::new();
    let mut duplicates: BTreeSet<&TestIdentity> = BTreeSet::new();
    for record in metadata_records {
        if graded.insert(record.identity(), record).is_some() {
            duplicates.insert(record.identity());
        }
    }
    if !duplicates.is_empty() {
        return Err(GraderError::Resolution(
            duplicates
                .into_iter()
                .map(|id| ResolutionError::DuplicateIdentity(id.clone()))
                .collect(),
        ));
    }

    let mut outcomes: BTreeMap<&TestIdentity, Vec<&OutcomeRecord>> = BTreeMap::new();
    let mut ungraded = 0usize;
    for outcome in outcome_records {
        if graded.contains_key(outcome.identity()) {
            outcomes.entry(outcome.identity()).or_default().push(outcome);
        } else {
            ungraded += 1;
            debug!(identity = %outcome.identity(), "Discarding outcome of ungraded test");
        }
    }

    let mut joined = Vec::with_capacity(graded.len());
    let mut errors = Vec::new();
    let mut unresolved = Vec::new();
    for (identity, metadata) in graded {
        match outcomes.get(identity).map(Vec::as_slice) {
            Some([outcome]) => {
                joined.push(JoinedResult::new(metadata.clone(), (*outcome).clone()));
            }
            Some(many) if many.len() > 1 => {
                errors.push(ResolutionError::DuplicateOutcome {
                    identity: identity.clone(),
                    count: many.len(),
                });
            }
            _ => {
                errors.push(ResolutionError::MissingOutcome(identity.clone()));
                unresolved.push(metadata.clone());
            }
        }
    }

    debug!(
        joined = joined.len(),
        unresolved = errors.len(),
        ungraded,
        "Resolved graded tests"
    );

    Ok(Resolution {
        joined,
        errors,
        unresolved,
    })
}
