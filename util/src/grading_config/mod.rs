//! Grading configuration.
//!
//! `GradingConfig` collects every policy knob the grader consults: how skipped
//! tests are scored, whether zero-point tests appear in the report, an optional
//! cap on the final score, how strictly missing outcomes are treated, and the
//! run-level reporting metadata echoed back to callers.
//!
//! Every field is defaulted, so `{}` is a valid config file.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SkippedPolicy {
    /// Skipped graded tests earn nothing but still count toward points possible.
    CountAsFailed,
    /// Skipped graded tests are listed but contribute to no total.
    ExcludeFromPossible,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MissingOutcomePolicy {
    /// A graded test without an outcome aborts report generation.
    Strict,
    /// A graded test without an outcome is scored as errored.
    Lenient,
}

/// A run-level tag value. Either a string or an integer.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ReportTag {
    Int(i64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ScoringPolicy {
    #[serde(default = "default_skipped_policy")]
    pub skipped: SkippedPolicy,

    /// If false, zero-point tests are left out of the report entirely.
    #[serde(default = "default_include_zero_point_tests")]
    pub include_zero_point_tests: bool,

    /// Optional ceiling on the final score.
    #[serde(default)]
    pub max_points: Option<u64>,
}

impl Default for ScoringPolicy {
    fn default() -> Self {
        Self {
            skipped: default_skipped_policy(),
            include_zero_point_tests: default_include_zero_point_tests(),
            max_points: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct ResolutionPolicy {
    #[serde(default = "default_missing_outcomes")]
    pub missing_outcomes: MissingOutcomePolicy,
}

impl Default for ResolutionPolicy {
    fn default() -> Self {
        Self {
            missing_outcomes: default_missing_outcomes(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ReportingOptions {
    #[serde(default)]
    pub assignment: Option<String>,

    #[serde(default)]
    pub tags: BTreeMap<String, ReportTag>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct GradingConfig {
    #[serde(default)]
    pub scoring: ScoringPolicy,

    #[serde(default)]
    pub resolution: ResolutionPolicy,

    #[serde(default)]
    pub reporting: ReportingOptions,
}

impl GradingConfig {
    pub fn default_config() -> Self {
        GradingConfig {
            scoring: ScoringPolicy::default(),
            resolution: ResolutionPolicy::default(),
            reporting: ReportingOptions::default(),
        }
    }

    /// Builds a config from `.env` and environment variables layered over the defaults.
    ///
    /// Recognised variables: `GRADER_SKIPPED_POLICY`, `GRADER_MISSING_OUTCOMES`,
    /// `GRADER_MAX_POINTS`, `GRADER_INCLUDE_ZERO_POINT_TESTS`, `GRADER_ASSIGNMENT`.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        Self::default_config().with_env_overrides()
    }

    /// Like [`GradingConfig::from_env`], but reads variables from a specific env file.
    ///
    /// Variables already set in the process environment win over the file.
    pub fn from_env_file(path: &Path) -> Result<Self, String> {
        dotenvy::from_path(path).map_err(|e| format!("Failed to load env file: {e}"))?;
        Self::default_config().with_env_overrides()
    }

    /// Applies any `GRADER_*` environment variables on top of `self`.
    pub fn with_env_overrides(mut self) -> Result<Self, String> {
        if let Ok(v) = env::var("GRADER_SKIPPED_POLICY") {
            self.scoring.skipped = match v.trim().to_lowercase().as_str() {
                "count_as_failed" => SkippedPolicy::CountAsFailed,
                "exclude_from_possible" => SkippedPolicy::ExcludeFromPossible,
                other => return Err(format!("Unknown GRADER_SKIPPED_POLICY '{other}'")),
            };
        }
        if let Ok(v) = env::var("GRADER_MISSING_OUTCOMES") {
            self.resolution.missing_outcomes = match v.trim().to_lowercase().as_str() {
                "strict" => MissingOutcomePolicy::Strict,
                "lenient" => MissingOutcomePolicy::Lenient,
                other => return Err(format!("Unknown GRADER_MISSING_OUTCOMES '{other}'")),
            };
        }
        if let Ok(v) = env::var("GRADER_MAX_POINTS") {
            let v = v.trim();
            self.scoring.max_points = if v.is_empty() {
                None
            } else {
                Some(
                    v.parse()
                        .map_err(|_| format!("GRADER_MAX_POINTS must be a non-negative integer, got '{v}'"))?,
                )
            };
        }
        if let Ok(v) = env::var("GRADER_INCLUDE_ZERO_POINT_TESTS") {
            self.scoring.include_zero_point_tests = match v.trim().to_lowercase().as_str() {
                "true" => true,
                "false" => false,
                other => {
                    return Err(format!(
                        "Unknown GRADER_INCLUDE_ZERO_POINT_TESTS '{other}' (expected true or false)"
                    ));
                }
            };
        }
        if let Ok(v) = env::var("GRADER_ASSIGNMENT") {
            self.reporting.assignment = Some(v).filter(|s| !s.is_empty());
        }
        Ok(self)
    }
}

/// Read a grading config from a JSON file.
pub fn load_config(path: &Path) -> Result<GradingConfig, String> {
    use std::io::ErrorKind;

    let s = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            let msg = match e.kind() {
                ErrorKind::NotFound => "Config file not found".to_string(),
                ErrorKind::PermissionDenied => "Permission denied reading config".to_string(),
                _ => format!("Failed to read config ({})", e.kind()),
            };
            return Err(msg);
        }
    };

    serde_json::from_str::<GradingConfig>(&s).map_err(|e| format!("Invalid config JSON: {e}"))
}

fn default_skipped_policy() -> SkippedPolicy {
    SkippedPolicy::CountAsFailed
}

fn default_include_zero_point_tests() -> bool {
    true
}

fn default_missing_outcomes() -> MissingOutcomePolicy {
    MissingOutcomePolicy::Strict
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    const MUT_VARS: &[&str] = &[
        "GRADER_SKIPPED_POLICY",
        "GRADER_MISSING_OUTCOMES",
        "GRADER_MAX_POINTS",
        "GRADER_INCLUDE_ZERO_POINT_TESTS",
        "GRADER_ASSIGNMENT",
    ];

    fn clear_mut_vars() {
        for k in MUT_VARS {
            unsafe { env::remove_var(k) };
        }
    }

    #[test]
    fn empty_object_yields_defaults() {
        let cfg: GradingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, GradingConfig::default_config());
        assert_eq!(cfg.scoring.skipped, SkippedPolicy::CountAsFailed);
        assert!(cfg.scoring.include_zero_point_tests);
        assert_eq!(cfg.scoring.max_points, None);
        assert_eq!(cfg.resolution.missing_outcomes, MissingOutcomePolicy::Strict);
    }

    #[test]
    fn parses_policies_and_mixed_tags() {
        let raw = r#"{
            "scoring": { "skipped": "exclude_from_possible", "max_points": 100 },
            "resolution": { "missing_outcomes": "lenient" },
            "reporting": { "assignment": "MP1", "tags": { "semester": "fall", "year": 2026 } }
        }"#;
        let cfg: GradingConfig = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.scoring.skipped, SkippedPolicy::ExcludeFromPossible);
        assert!(cfg.scoring.include_zero_point_tests);
        assert_eq!(cfg.scoring.max_points, Some(100));
        assert_eq!(cfg.resolution.missing_outcomes, MissingOutcomePolicy::Lenient);
        assert_eq!(cfg.reporting.assignment.as_deref(), Some("MP1"));
        assert_eq!(cfg.reporting.tags["semester"], ReportTag::Text("fall".into()));
        assert_eq!(cfg.reporting.tags["year"], ReportTag::Int(2026));
    }

    #[test]
    fn rejects_unknown_policy_value() {
        let raw = r#"{ "resolution": { "missing_outcomes": "sometimes" } }"#;
        assert!(serde_json::from_str::<GradingConfig>(raw).is_err());
    }

    #[test]
    fn load_reads_serialized_config() {
        let td = TempDir::new().unwrap();
        let path = td.path().join("grading.json");

        let mut cfg = GradingConfig::default_config();
        cfg.scoring.max_points = Some(40);
        cfg.reporting.tags.insert("section".into(), ReportTag::Text("AL1".into()));

        fs::write(&path, serde_json::to_string_pretty(&cfg).unwrap()).unwrap();
        assert_eq!(load_config(&path).unwrap(), cfg);
    }

    #[test]
    fn load_missing_file_reports_not_found() {
        let td = TempDir::new().unwrap();
        let err = load_config(&td.path().join("absent.json")).unwrap_err();
        assert_eq!(err, "Config file not found");
    }

    #[test]
    fn load_invalid_json_is_an_error() {
        let td = TempDir::new().unwrap();
        let path = td.path().join("grading.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_config(&path).unwrap_err().starts_with("Invalid config JSON"));
    }

    #[test]
    #[serial]
    fn env_overrides_apply_over_defaults() {
        clear_mut_vars();
        unsafe {
            env::set_var("GRADER_SKIPPED_POLICY", "exclude_from_possible");
            env::set_var("GRADER_MISSING_OUTCOMES", "LENIENT");
            env::set_var("GRADER_MAX_POINTS", "75");
            env::set_var("GRADER_INCLUDE_ZERO_POINT_TESTS", "false");
            env::set_var("GRADER_ASSIGNMENT", "Lab 3");
        }

        let cfg = GradingConfig::default_config().with_env_overrides().unwrap();
        clear_mut_vars();

        assert_eq!(cfg.scoring.skipped, SkippedPolicy::ExcludeFromPossible);
        assert_eq!(cfg.resolution.missing_outcomes, MissingOutcomePolicy::Lenient);
        assert_eq!(cfg.scoring.max_points, Some(75));
        assert!(!cfg.scoring.include_zero_point_tests);
        assert_eq!(cfg.reporting.assignment.as_deref(), Some("Lab 3"));
    }

    #[test]
    #[serial]
    fn env_override_with_bad_max_points_fails() {
        clear_mut_vars();
        unsafe { env::set_var("GRADER_MAX_POINTS", "-5") };

        let result = GradingConfig::default_config().with_env_overrides();
        clear_mut_vars();

        assert!(result.unwrap_err().contains("GRADER_MAX_POINTS"));
    }

    #[test]
    #[serial]
    fn no_env_leaves_config_untouched() {
        clear_mut_vars();
        let cfg = GradingConfig::default_config().with_env_overrides().unwrap();
        assert_eq!(cfg, GradingConfig::default_config());
    }

    #[test]
    #[serial]
    fn zero_point_override_accepts_only_booleans() {
        for (raw, expected) in [("TRUE ", true), (" false", false)] {
            clear_mut_vars();
            unsafe { env::set_var("GRADER_INCLUDE_ZERO_POINT_TESTS", raw) };
            let cfg = GradingConfig::default_config().with_env_overrides();
            clear_mut_vars();
            assert_eq!(cfg.unwrap().scoring.include_zero_point_tests, expected);
        }

        for raw in ["1", "yes", "ture", ""] {
            clear_mut_vars();
            unsafe { env::set_var("GRADER_INCLUDE_ZERO_POINT_TESTS", raw) };
            let result = GradingConfig::default_config().with_env_overrides();
            clear_mut_vars();
            assert!(
                result.unwrap_err().contains("GRADER_INCLUDE_ZERO_POINT_TESTS"),
                "expected rejection of {raw:?}"
            );
        }
    }

    #[test]
    #[serial]
    fn from_env_reads_process_environment() {
        clear_mut_vars();
        unsafe { env::set_var("GRADER_MISSING_OUTCOMES", "lenient") };
        let cfg = GradingConfig::from_env();
        clear_mut_vars();

        let cfg = cfg.unwrap();
        assert_eq!(cfg.resolution.missing_outcomes, MissingOutcomePolicy::Lenient);
        assert_eq!(cfg.scoring, ScoringPolicy::default());
    }

    #[test]
    #[serial]
    fn from_env_file_layers_dotenv_over_defaults() {
        clear_mut_vars();
        let td = TempDir::new().unwrap();
        let path = td.path().join(".env");
        fs::write(
            &path,
            "GRADER_SKIPPED_POLICY=exclude_from_possible\nGRADER_MAX_POINTS=80\nGRADER_ASSIGNMENT=MP2\n",
        )
        .unwrap();
        // Process environment wins over the file.
        unsafe { env::set_var("GRADER_MAX_POINTS", "90") };

        let cfg = GradingConfig::from_env_file(&path);
        clear_mut_vars();

        let cfg = cfg.unwrap();
        assert_eq!(cfg.scoring.skipped, SkippedPolicy::ExcludeFromPossible);
        assert_eq!(cfg.scoring.max_points, Some(90));
        assert_eq!(cfg.reporting.assignment.as_deref(), Some("MP2"));
    }

    #[test]
    #[serial]
    fn from_env_file_missing_is_an_error() {
        clear_mut_vars();
        let td = TempDir::new().unwrap();
        let err = GradingConfig::from_env_file(&td.path().join("absent.env")).unwrap_err();
        assert!(err.starts_with("Failed to load env file"));
    }
}
