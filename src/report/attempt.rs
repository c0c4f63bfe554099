use std::time::Duration;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    #[default]
    Unknown,
    Passed,
    Skipped,
    Pending,
    Undefined,
    Ambiguous,
    Failed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unknown => "unknown",
            Status::Passed => "passed",
            Status::Skipped => "skipped",
            Status::Pending => "pending",
            Status::Undefined => "undefined",
            Status::Ambiguous => "ambiguous",
            Status::Failed => "failed",
        }
    }

    /// Statuses that make the whole test case a dashboard failure.
    pub fn is_failure(&self) -> bool {
        matches!(self, Status::Failed | Status::Ambiguous)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one executed step (pickle step or hook).
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    pub test_step_id: String,
    /// `Given I log in` for pickle steps, `None` for hooks.
    pub text: Option<String>,
    pub status: Status,
    pub duration: Duration,
    pub message: Option<String>,
}

/// A captured artifact, consumed once when its test case is reported.
#[derive(Debug, Clone, PartialEq)]
pub struct Attachment {
    pub test_step_id: String,
    pub media_type: String,
    pub content_encoding: String,
    pub body: String,
}

/// One completed execution of a scenario, as handed over by the test engine.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TestCaseAttempt {
    pub uri: String,
    pub feature_name: String,
    pub pickle_name: String,
    pub step_results: Vec<StepResult>,
    /// In arrival order; `step_attachments` groups them by step.
    pub attachments: Vec<Attachment>,
    pub will_be_retried: bool,
}

impl TestCaseAttempt {
    pub fn has_failed(&self) -> bool {
        self.step_results.iter().any(|s| s.status.is_failure())
    }

    /// Sum of all step durations. Zero when no step reported a result,
    /// `Duration::MAX` when the sum does not fit.
    pub fn duration(&self) -> Duration {
        self.step_results
            .iter()
            .fold(Duration::ZERO, |acc, s| acc.saturating_add(s.duration))
    }

    /// Attachments grouped by producing step, steps in first-attachment order.
    pub fn step_attachments(&self) -> Vec<(&str, Vec<&Attachment>)> {
        let mut groups: Vec<(&str, Vec<&Attachment>)> = Vec::new();
        for attachment in &self.attachments {
            let step_id = attachment.test_step_id.as_str();
            match groups.iter_mut().find(|(id, _)| *id == step_id) {
                Some((_, group)) => group.push(attachment),
                None => groups.push((step_id, vec![attachment])),
            }
        }
        groups
    }
}
