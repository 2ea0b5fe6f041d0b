//! Check outcomes and the run report.

use std::fmt;
use std::time::Duration;

use serde::{Serialize, Serializer};

/// Result of one check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Passed,
    Failed { message: String },
    Skipped { reason: String },
}

impl Outcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, Outcome::Passed)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            Outcome::Passed => "PASSED",
            Outcome::Failed { .. } => "FAILED",
            Outcome::Skipped { .. } => "SKIPPED",
        }
    }
}

impl From<Result<(), String>> for Outcome {
    fn from(verdict: Result<(), String>) -> Self {
        match verdict {
            Ok(()) => Outcome::Passed,
            Err(message) => Outcome::Failed { message },
        }
    }
}

/// One check as it ran.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub group: String,
    pub name: String,
    #[serde(flatten)]
    pub outcome: Outcome,
    #[serde(rename = "elapsed_secs", serialize_with = "secs")]
    pub elapsed: Duration,
}

fn secs<S: Serializer>(elapsed: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl fmt::Display for CheckResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{} {}", self.group, self.name, self.outcome.label())?;
        match &self.outcome {
            Outcome::Passed => Ok(()),
            Outcome::Failed { message } => write!(f, " - {message}"),
            Outcome::Skipped { reason } => write!(f, " ({reason})"),
        }
    }
}

/// Every check result of a run, in execution order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub results: Vec<CheckResult>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, result: CheckResult) {
        self.results.push(result);
    }

    pub fn passed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_passed()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_failed()).count()
    }

    pub fn skipped(&self) -> usize {
        self.results.iter().filter(|r| r.outcome.is_skipped()).count()
    }

    /// No check failed. Skips do not count against the run.
    pub fn is_success(&self) -> bool {
        self.failed() == 0
    }

    /// Look up a result by check name.
    pub fn get(&self, name: &str) -> Option<&CheckResult> {
        self.results.iter().find(|r| r.name == name)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in &self.results {
            writeln!(f, "{result}")?;
        }
        let elapsed: Duration = self.results.iter().map(|r| r.elapsed).sum();
        write!(
            f,
            "{} passed, {} failed, {} skipped in {:.2}s",
            self.passed(),
            self.failed(),
            self.skipped(),
            elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, outcome: Outcome) -> CheckResult {
        CheckResult {
            group: "underlay".to_string(),
            name: name.to_string(),
            outcome,
            elapsed: Duration::from_millis(250),
        }
    }

    fn sample() -> Report {
        let mut report = Report::new();
        report.push(result("dc1_spine1_bgp_established", Outcome::Passed));
        report.push(result(
            "dc1_spine2_bgp_established",
            Outcome::Failed {
                message: "BGP peers not established on DC1 Spine2".to_string(),
            },
        ));
        report.push(result(
            "dc2_spine1_bgp_established",
            Outcome::Skipped {
                reason: "Cannot connect to 172.20.20.8: timed out".to_string(),
            },
        ));
        report
    }

    #[test]
    fn test_counts() {
        let report = sample();
        assert_eq!(report.passed(), 1);
        assert_eq!(report.failed(), 1);
        assert_eq!(report.skipped(), 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_skips_do_not_fail_the_run() {
        let mut report = Report::new();
        report.push(result(
            "dc2_spine1_bgp_established",
            Outcome::Skipped {
                reason: "Cannot connect to 172.20.20.8: timed out".to_string(),
            },
        ));
        assert!(report.is_success());
    }

    #[test]
    fn test_display() {
        let text = sample().to_string();
        assert!(text.contains("underlay::dc1_spine1_bgp_established PASSED"));
        assert!(text.contains(
            "underlay::dc1_spine2_bgp_established FAILED - BGP peers not established on DC1 Spine2"
        ));
        assert!(text.contains("SKIPPED (Cannot connect to 172.20.20.8: timed out)"));
        assert!(text.ends_with("1 passed, 1 failed, 1 skipped in 0.75s"));
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        let results = json["results"].as_array().unwrap();
        assert_eq!(results[0]["status"], "passed");
        assert_eq!(results[1]["status"], "failed");
        assert_eq!(results[1]["message"], "BGP peers not established on DC1 Spine2");
        assert_eq!(results[2]["reason"], "Cannot connect to 172.20.20.8: timed out");
        assert_eq!(results[0]["elapsed_secs"], 0.25);
    }
}
