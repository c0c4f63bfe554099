//! Cucumber message protocol, limited to what reporting a test case needs.
//!
//! Each NDJSON line is one [`Envelope`] holding exactly one message. Messages
//! and fields this crate does not use are ignored during deserialization.

pub mod collector;
pub mod stream;

use serde::Deserialize;

use crate::report::attempt::Status;

pub use collector::EventDataCollector;
pub use stream::EventStream;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub gherkin_document: Option<GherkinDocument>,
    pub pickle: Option<Pickle>,
    pub test_case: Option<TestCase>,
    pub test_case_started: Option<TestCaseStarted>,
    pub test_step_finished: Option<TestStepFinished>,
    pub attachment: Option<Attachment>,
    pub test_case_finished: Option<TestCaseFinished>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GherkinDocument {
    #[serde(default)]
    pub uri: String,
    pub feature: Option<Feature>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub children: Vec<FeatureChild>,
}

/// Backgrounds, scenarios and rules; rules nest the same children.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeatureChild {
    pub background: Option<StepContainer>,
    pub scenario: Option<StepContainer>,
    pub rule: Option<Rule>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Rule {
    #[serde(default)]
    pub children: Vec<FeatureChild>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepContainer {
    #[serde(default)]
    pub steps: Vec<GherkinStep>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GherkinStep {
    pub id: String,
    #[serde(default)]
    pub keyword: String,
}

impl GherkinDocument {
    /// Step keyword (`Given `, `When `, ...) for every step AST node.
    pub fn step_keywords(&self) -> Vec<(&str, &str)> {
        fn walk<'a>(children: &'a [FeatureChild], out: &mut Vec<(&'a str, &'a str)>) {
            for child in children {
                let containers = [child.background.as_ref(), child.scenario.as_ref()];
                for container in containers.into_iter().flatten() {
                    out.extend(container.steps.iter().map(|s| (s.id.as_str(), s.keyword.as_str())));
                }
                if let Some(rule) = &child.rule {
                    walk(&rule.children, out);
                }
            }
        }

        let mut out = Vec::new();
        if let Some(feature) = &self.feature {
            walk(&feature.children, &mut out);
        }
        out
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pickle {
    pub id: String,
    #[serde(default)]
    pub uri: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<PickleStep>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickleStep {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub ast_node_ids: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    pub id: String,
    pub pickle_id: String,
    #[serde(default)]
    pub test_steps: Vec<TestStep>,
}

/// Either a pickle step or a hook.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStep {
    pub id: String,
    pub pickle_step_id: Option<String>,
    pub hook_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseStarted {
    pub id: String,
    pub test_case_id: String,
    #[serde(default)]
    pub attempt: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestStepFinished {
    pub test_case_started_id: String,
    pub test_step_id: String,
    pub test_step_result: TestStepResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestStepResult {
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub duration: MessageDuration,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MessageDuration {
    #[serde(default)]
    pub seconds: u64,
    #[serde(default)]
    pub nanos: u32,
}

impl From<MessageDuration> for std::time::Duration {
    fn from(d: MessageDuration) -> Self {
        // nanos may exceed one second; saturate rather than overflow
        std::time::Duration::new(d.seconds, 0)
            .saturating_add(std::time::Duration::from_nanos(u64::from(d.nanos)))
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub test_case_started_id: Option<String>,
    pub test_step_id: Option<String>,
    #[serde(default)]
    pub media_type: String,
    #[serde(default)]
    pub content_encoding: String,
    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseFinished {
    pub test_case_started_id: String,
    #[serde(default)]
    pub will_be_retried: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_unknown_envelope_is_empty() {
        let env: Envelope = serde_json::from_str(r#"{"meta":{"protocolVersion":"22.0.0"}}"#).unwrap();
        assert!(env.pickle.is_none());
        assert!(env.test_case_finished.is_none());
    }

    #[test]
    fn test_step_finished_parses_status_and_duration() {
        let env: Envelope = serde_json::from_str(
            r#"{"testStepFinished":{"testCaseStartedId":"s1","testStepId":"t1",
                "testStepResult":{"status":"FAILED","duration":{"seconds":1,"nanos":500000000},
                "message":"boom"},"timestamp":{"seconds":0,"nanos":0}}}"#,
        )
        .unwrap();
        let finished = env.test_step_finished.unwrap();
        assert_eq!(finished.test_step_result.status, Status::Failed);
        assert_eq!(Duration::from(finished.test_step_result.duration), Duration::from_millis(1500));
        assert_eq!(finished.test_step_result.message.as_deref(), Some("boom"));
    }

    #[test]
    fn test_out_of_range_duration_saturates() {
        let d: MessageDuration =
            serde_json::from_str(r#"{"seconds":18446744073709551615,"nanos":4000000000}"#).unwrap();
        assert_eq!(Duration::from(d), Duration::MAX);

        let d: MessageDuration = serde_json::from_str(r#"{"seconds":1,"nanos":1500000000}"#).unwrap();
        assert_eq!(Duration::from(d), Duration::from_millis(2500));
    }

    #[test]
    fn test_step_keywords_include_backgrounds_and_rules() {
        let doc: GherkinDocument = serde_json::from_str(
            r#"{"uri":"features/a.feature","feature":{"name":"A","children":[
                {"background":{"steps":[{"id":"b1","keyword":"Given "}]}},
                {"scenario":{"steps":[{"id":"s1","keyword":"When "}]}},
                {"rule":{"children":[{"scenario":{"steps":[{"id":"r1","keyword":"Then "}]}}]}}
            ]}}"#,
        )
        .unwrap();
        assert_eq!(
            doc.step_keywords(),
            vec![("b1", "Given "), ("s1", "When "), ("r1", "Then ")]
        );
    }

    #[test]
    fn test_test_case_finished_defaults() {
        let env: Envelope =
            serde_json::from_str(r#"{"testCaseFinished":{"testCaseStartedId":"s1"}}"#).unwrap();
        assert_eq!(
            env.test_case_finished,
            Some(TestCaseFinished { test_case_started_id: "s1".to_string(), will_be_retried: false })
        );
    }
}
