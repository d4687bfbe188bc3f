//! # Aggregator
//!
//! Folds joined results into a [`Report`].
//!
//! - A passed test earns its points; failed, errored and skipped tests earn nothing.
//! - Every counted test adds its points to the possible total. Under
//!   [`SkippedPolicy::ExcludeFromPossible`] a skipped test is listed but not counted.
//! - Each tag name gets a subtotal. A test adds to it once no matter how many values it
//!   carries under that name; each value also gets its own subtotal.
//! - Zero-point tests are kept unless the policy turns them off.
//! - Extra scored items (a style check, say) earn their points when passed and always add
//!   them to the possible total. They carry no tags.
//! - Each module that failed to compile adds a zero-point compile-error entry.
//!
//! Aggregation cannot fail: inputs are already validated by construction and resolution.

use crate::report::{Report, ReportEntry, Score, TagSubtotal};
use crate::types::{ExtraScoring, JoinedResult, TestStatus};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use util::grading_config::{ScoringPolicy, SkippedPolicy};

/// Aggregate with [`ScoringPolicy::default`].
pub fn aggregate_default(joined: impl IntoIterator<Item = JoinedResult>) -> Report {
    aggregate(joined, &ScoringPolicy::default())
}

/// Build a report from joined results under `policy`.
///
/// Results are ordered by identity whatever order they arrive in.
pub fn aggregate(joined: impl IntoIterator<Item = JoinedResult>, policy: &ScoringPolicy) -> Report {
    aggregate_with(joined, &ExtraScoring::default(), policy)
}

/// Build a report from joined results plus non-test scoring under `policy`.
///
/// Test entries come first, ordered by identity, then one compile-error entry per failed
/// module in module order, then the extra items in the order given.
pub fn aggregate_with(
    joined: impl IntoIterator<Item = JoinedResult>,
    extras: &ExtraScoring,
    policy: &ScoringPolicy,
) -> Report {
    let mut joined: Vec<JoinedResult> = joined.into_iter().collect();
    joined.sort_by(|a, b| a.identity().cmp(b.identity()));

    let mut totals = Score::default();
    let mut tag_subtotals: BTreeMap<String, TagSubtotal> = BTreeMap::new();
    let mut entries = Vec::with_capacity(joined.len());

    for result in joined {
        let points = u64::from(result.metadata().points());
        if points == 0 && !policy.include_zero_point_tests {
            debug!(identity = %result.identity(), "Leaving zero-point test out of report");
            continue;
        }

        let status = result.status();
        let counted = !(status == TestStatus::Skipped
            && policy.skipped == SkippedPolicy::ExcludeFromPossible);
        let possible = if counted { points } else { 0 };
        let earned = if counted && status.is_passed() { points } else { 0 };

        totals.add(earned, possible);

        let tags = result.metadata().tags();
        for name in tags.names() {
            let subtotal = tag_subtotals.entry(name.to_string()).or_default();
            subtotal.earned += earned;
            subtotal.possible += possible;
        }
        for tag in tags.iter() {
            if let Some(value) = tag.value() {
                if let Some(subtotal) = tag_subtotals.get_mut(tag.name()) {
                    subtotal
                        .by_value
                        .entry(value.to_string())
                        .or_default()
                        .add(earned, possible);
                }
            }
        }

        entries.push(ReportEntry::new(result, earned, possible, counted));
    }

    for module in &extras.modules {
        if let Some(item) = module.compile_error() {
            warn!(module = module.name(), "Module did not compile");
            entries.push(ReportEntry::from_item(item));
        }
    }

    for item in &extras.items {
        let entry = ReportEntry::from_item(item.clone());
        totals.add(entry.points_earned(), entry.points_possible());
        entries.push(entry);
    }

    let capped = policy.max_points.map(|max| {
        if totals.earned > max {
            warn!(
                earned = totals.earned,
                max_points = max,
                "Capping score at configured maximum"
            );
        }
        Score {
            earned: totals.earned.min(max),
            possible: max,
        }
    });

    debug!(
        results = entries.len(),
        earned = totals.earned,
        possible = totals.possible,
        "Aggregated report"
    );

    Report::new(entries, totals, tag_subtotals, extras.modules.clone(), capped)
}

/// Whole-number percentage of `earned` over `possible`, rounded to nearest.
///
/// Returns 0 when nothing is possible.
///
/// ```
/// use grader::aggregator::compute_percentage;
///
/// assert_eq!(compute_percentage(15, 20), 75);
/// assert_eq!(compute_percentage(0, 0), 0);
/// ```
pub fn compute_percentage(earned: u64, possible: u64) -> u32 {
    if possible == 0 {
        return 0;
    }
    ((earned as f64 / possible as f64) * 100.0).round() as u32
}
