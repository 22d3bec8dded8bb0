use crate::errors::{ErrorKind, PunchError};
use serde::{Deserialize, Serialize};

/// Terminal state of one case in a run
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PunchStatus {
    Success,
    /// The form could not be fetched or the submission was rejected
    Failure,
    /// The form was fetched but could not be turned into a record
    Error,
}

/// Result of punching one case
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PunchOutcome {
    /// Case identifier as listed in the case table
    pub case: String,
    pub status: PunchStatus,
    /// Human-readable message about the result
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// Record key echoed back on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub f_key: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl PunchOutcome {
    /// `response` is the submit endpoint's body; a blank one is left out.
    pub fn success(case: &str, case_name: &str, f_key: i64, response: &str) -> Self {
        let details = match response.trim() {
            "" => format!("f_key: {f_key}, work log updated"),
            body => format!("f_key: {f_key}, work log updated, response: {body}"),
        };
        Self {
            case: case.to_string(),
            status: PunchStatus::Success,
            message: format!("Case: {case_name}"),
            details: Some(details),
            f_key: Some(f_key),
            error_kind: None,
        }
    }

    pub fn form_unavailable(case: &str, error: &PunchError) -> Self {
        Self {
            case: case.to_string(),
            status: PunchStatus::Failure,
            message: "No form data for this case".to_string(),
            details: Some(format!("Check that the case number is correct ({error})")),
            f_key: None,
            error_kind: Some(error.kind()),
        }
    }

    pub fn submit_failed(case: &str, case_name: &str, error: &PunchError) -> Self {
        Self {
            case: case.to_string(),
            status: PunchStatus::Failure,
            message: format!("Case: {case_name}"),
            details: Some(format!("Failed to submit punch data ({error})")),
            f_key: None,
            error_kind: Some(error.kind()),
        }
    }

    pub fn extraction_failed(case: &str, error: &PunchError) -> Self {
        Self {
            case: case.to_string(),
            status: PunchStatus::Error,
            message: "Malformed case record".to_string(),
            details: Some(error.to_string()),
            f_key: None,
            error_kind: Some(error.kind()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PunchStatus::Success
    }
}

/// How a whole run went
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunVerdict {
    AllSucceeded,
    Partial,
    AllFailed,
}

/// Ordered outcomes of one run plus the counts derived from them
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RunSummary {
    pub results: Vec<PunchOutcome>,
    pub success_count: usize,
    pub total_count: usize,
    /// Set when the run was aborted before every case was attempted
    #[serde(default)]
    pub aborted: bool,
}

impl RunSummary {
    pub fn new(total_count: usize) -> Self {
        Self {
            results: Vec::with_capacity(total_count),
            success_count: 0,
            total_count,
            aborted: false,
        }
    }

    pub fn push(&mut self, outcome: PunchOutcome) {
        if outcome.is_success() {
            self.success_count += 1;
        }
        self.results.push(outcome);
    }

    pub fn verdict(&self) -> RunVerdict {
        if self.total_count > 0 && self.success_count == self.total_count {
            RunVerdict::AllSucceeded
        } else if self.success_count > 0 {
            RunVerdict::Partial
        } else {
            RunVerdict::AllFailed
        }
    }

    /// Success percentage; zero for an empty run.
    pub fn success_rate(&self) -> f64 {
        if self.total_count == 0 {
            0.0
        } else {
            self.success_count as f64 / self.total_count as f64 * 100.0
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &PunchOutcome> {
        self.results.iter().filter(|r| !r.is_success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdicts_and_rates() {
        let mut summary = RunSummary::new(2);
        summary.push(PunchOutcome::success("00020", "Acme", 5, "OK"));
        assert_eq!(summary.verdict(), RunVerdict::Partial);

        summary.push(PunchOutcome::form_unavailable("00021", &PunchError::NoCases));
        assert_eq!(summary.success_count, 1);
        assert_eq!(summary.verdict(), RunVerdict::Partial);
        assert_eq!(summary.success_rate(), 50.0);
        assert_eq!(summary.failures().count(), 1);

        let mut all = RunSummary::new(1);
        all.push(PunchOutcome::success("1", "x", 1, ""));
        assert_eq!(all.verdict(), RunVerdict::AllSucceeded);

        assert_eq!(RunSummary::new(0).verdict(), RunVerdict::AllFailed);
        assert_eq!(RunSummary::new(0).success_rate(), 0.0);
    }

    #[test]
    fn outcome_serializes_lowercase_status_and_skips_empty_options() {
        let outcome = PunchOutcome::success("00020", "Acme", 5, "OK");
        let json = serde_json::to_value(&outcome).expect("json");
        assert_eq!(json["status"], "success");
        assert_eq!(json["f_key"], 5);
        assert!(json.get("error_kind").is_none());
        assert_eq!(json["details"], "f_key: 5, work log updated, response: OK");
        assert_eq!(
            PunchOutcome::success("1", "x", 1, "  \n").details.as_deref(),
            Some("f_key: 1, work log updated")
        );

        let failed = PunchOutcome::extraction_failed(
            "00021",
            &PunchError::InvalidKey {
                value: "".into(),
                reason: "cannot parse integer from empty string".into(),
            },
        );
        let json = serde_json::to_value(&failed).expect("json");
        assert_eq!(json["status"], "error");
        assert_eq!(json["error_kind"], "data");
    }
}
