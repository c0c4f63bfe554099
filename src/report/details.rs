use super::attempt::{Status, StepResult, TestCaseAttempt};

const STEP_INDENT: &str = "   ";
const MESSAGE_INDENT: &str = "       ";

fn symbol(status: Status) -> &'static str {
    match status {
        Status::Passed => "✔",
        Status::Failed | Status::Ambiguous => "✖",
        Status::Skipped => "-",
        Status::Pending | Status::Undefined | Status::Unknown => "?",
    }
}

/// Human-readable failure summary for `testFailed` details, without colors.
///
/// ```text
/// 1) Scenario: Valid credentials # features/login.feature
///    ✔ Given I am on the login page
///    ✖ When I submit the form
///        expected 200, got 500
///    - Then I see the dashboard
/// ```
pub fn format_issue(number: usize, attempt: &TestCaseAttempt) -> String {
    let mut out = format!("{}) Scenario: {} # {}\n", number, attempt.pickle_name, attempt.uri);
    for step in &attempt.step_results {
        // Passing hooks are noise.
        if step.text.is_none() && step.status == Status::Passed {
            continue;
        }
        push_step(&mut out, step);
    }
    out
}

fn push_step(out: &mut String, step: &StepResult) {
    let label = step.text.as_deref().unwrap_or("Hook");
    out.push_str(STEP_INDENT);
    out.push_str(symbol(step.status));
    out.push(' ');
    out.push_str(label);
    match step.status {
        Status::Undefined => out.push_str(" (undefined)"),
        Status::Pending => out.push_str(" (pending)"),
        _ => {}
    }
    out.push('\n');

    if let Some(message) = step.message.as_deref().filter(|m| !m.trim().is_empty()) {
        for line in message.lines() {
            out.push_str(MESSAGE_INDENT);
            out.push_str(line);
            out.push('\n');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn step(text: Option<&str>, status: Status, message: Option<&str>) -> StepResult {
        StepResult {
            test_step_id: "id".to_string(),
            text: text.map(String::from),
            status,
            duration: Duration::ZERO,
            message: message.map(String::from),
        }
    }

    #[test]
    fn test_format_issue_layout() {
        let attempt = TestCaseAttempt {
            uri: "features/login.feature".to_string(),
            pickle_name: "Valid credentials".to_string(),
            step_results: vec![
                step(None, Status::Passed, None),
                step(Some("Given I am on the login page"), Status::Passed, None),
                step(Some("When I submit the form"), Status::Failed, Some("expected 200\ngot 500")),
                step(Some("Then I see the dashboard"), Status::Skipped, None),
            ],
            ..Default::default()
        };
        assert_eq!(
            format_issue(1, &attempt),
            "1) Scenario: Valid credentials # features/login.feature\n\
             \u{20}  ✔ Given I am on the login page\n\
             \u{20}  ✖ When I submit the form\n\
             \u{20}      expected 200\n\
             \u{20}      got 500\n\
             \u{20}  - Then I see the dashboard\n"
        );
    }

    #[test]
    fn test_failing_hook_is_shown() {
        let attempt = TestCaseAttempt {
            pickle_name: "s".to_string(),
            step_results: vec![step(None, Status::Failed, Some("browser crashed"))],
            ..Default::default()
        };
        let issue = format_issue(3, &attempt);
        assert!(issue.starts_with("3) Scenario: s"));
        assert!(issue.contains("✖ Hook\n"));
        assert!(issue.contains("browser crashed"));
    }

    #[test]
    fn test_undefined_and_pending_marked() {
        let attempt = TestCaseAttempt {
            step_results: vec![
                step(Some("Given a thing"), Status::Undefined, None),
                step(Some("When another"), Status::Pending, Some("   ")),
            ],
            ..Default::default()
        };
        let issue = format_issue(1, &attempt);
        assert!(issue.contains("? Given a thing (undefined)\n"));
        assert!(issue.contains("? When another (pending)\n"));
        assert_eq!(issue.lines().count(), 3);
    }
}
