use std::collections::HashMap;

use super::{Envelope, GherkinDocument, Pickle, TestCase, TestCaseFinished};
use crate::report::attempt::{Attachment, StepResult, TestCaseAttempt};

/// Per-attempt state accumulated between `testCaseStarted` and `testCaseFinished`.
#[derive(Debug, Default)]
struct AttemptData {
    test_case_id: String,
    step_results: HashMap<String, StepResult>,
    attachments: Vec<Attachment>,
    will_be_retried: bool,
}

/// Resolves opaque test-case-started ids into full [`TestCaseAttempt`]s.
#[derive(Debug, Default)]
pub struct EventDataCollector {
    documents: HashMap<String, GherkinDocument>,
    /// Gherkin step AST id -> keyword.
    keywords: HashMap<String, String>,
    pickles: HashMap<String, Pickle>,
    test_cases: HashMap<String, TestCase>,
    attempts: HashMap<String, AttemptData>,
}

impl EventDataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one envelope. Returns the finished event for `testCaseFinished`.
    pub fn ingest(&mut self, envelope: Envelope) -> Option<TestCaseFinished> {
        if let Some(doc) = envelope.gherkin_document {
            self.keywords.extend(
                doc.step_keywords()
                    .into_iter()
                    .map(|(id, keyword)| (id.to_string(), keyword.to_string())),
            );
            self.documents.insert(doc.uri.clone(), doc);
        }
        if let Some(pickle) = envelope.pickle {
            self.pickles.insert(pickle.id.clone(), pickle);
        }
        if let Some(test_case) = envelope.test_case {
            self.test_cases.insert(test_case.id.clone(), test_case);
        }
        if let Some(started) = envelope.test_case_started {
            self.attempts.insert(
                started.id,
                AttemptData { test_case_id: started.test_case_id, ..Default::default() },
            );
        }
        if let Some(finished) = envelope.test_step_finished {
            self.record_step(finished);
        }
        if let Some(attachment) = envelope.attachment {
            self.record_attachment(attachment);
        }
        if let Some(finished) = envelope.test_case_finished {
            match self.attempts.get_mut(&finished.test_case_started_id) {
                Some(data) => data.will_be_retried = finished.will_be_retried,
                None => tracing::warn!(
                    "testCaseFinished for unknown attempt {}",
                    finished.test_case_started_id
                ),
            }
            return Some(finished);
        }
        None
    }

    fn record_step(&mut self, finished: super::TestStepFinished) {
        let Some(data) = self.attempts.get_mut(&finished.test_case_started_id) else {
            tracing::warn!("testStepFinished for unknown attempt {}", finished.test_case_started_id);
            return;
        };
        let result = finished.test_step_result;
        data.step_results.insert(
            finished.test_step_id.clone(),
            StepResult {
                test_step_id: finished.test_step_id,
                text: None,
                status: result.status,
                duration: result.duration.into(),
                message: result.message,
            },
        );
    }

    fn record_attachment(&mut self, attachment: super::Attachment) {
        // Attachments outside a test step (e.g. global hooks) are not reported.
        let (Some(started_id), Some(step_id)) = (attachment.test_case_started_id, attachment.test_step_id) else {
            return;
        };
        let Some(data) = self.attempts.get_mut(&started_id) else {
            tracing::warn!("attachment for unknown attempt {}", started_id);
            return;
        };
        data.attachments.push(Attachment {
            test_step_id: step_id,
            media_type: attachment.media_type,
            content_encoding: attachment.content_encoding,
            body: attachment.body,
        });
    }

    /// Build the attempt record for a started test case.
    ///
    /// Step results follow the test case's step order; steps that never
    /// finished are left out.
    pub fn test_case_attempt(&self, test_case_started_id: &str) -> crate::Result<TestCaseAttempt> {
        let data = self
            .attempts
            .get(test_case_started_id)
            .ok_or_else(|| crate::Error::UnknownTestCaseAttempt(test_case_started_id.to_string()))?;
        let test_case = self
            .test_cases
            .get(&data.test_case_id)
            .ok_or_else(|| crate::Error::UnknownTestCase(data.test_case_id.clone()))?;
        let pickle = self
            .pickles
            .get(&test_case.pickle_id)
            .ok_or_else(|| crate::Error::UnknownPickle(test_case.pickle_id.clone()))?;
        let document = self
            .documents
            .get(&pickle.uri)
            .ok_or_else(|| crate::Error::UnknownDocument(pickle.uri.clone()))?;

        let step_results = test_case
            .test_steps
            .iter()
            .filter_map(|step| {
                let mut result = data.step_results.get(&step.id)?.clone();
                result.text = step
                    .pickle_step_id
                    .as_deref()
                    .and_then(|id| self.step_text(pickle, id));
                Some(result)
            })
            .collect();

        Ok(TestCaseAttempt {
            uri: document.uri.clone(),
            feature_name: document.feature.as_ref().map(|f| f.name.clone()).unwrap_or_default(),
            pickle_name: pickle.name.clone(),
            step_results,
            attachments: data.attachments.clone(),
            will_be_retried: data.will_be_retried,
        })
    }

    /// `Given I log in` for a pickle step; keyword omitted when unknown.
    fn step_text(&self, pickle: &Pickle, pickle_step_id: &str) -> Option<String> {
        let step = pickle.steps.iter().find(|s| s.id == pickle_step_id)?;
        let keyword = step
            .ast_node_ids
            .iter()
            .find_map(|id| self.keywords.get(id))
            .map(String::as_str)
            .unwrap_or("");
        Some(format!("{}{}", keyword, step.text))
    }

    /// Drop per-attempt state once it has been reported.
    pub fn forget(&mut self, test_case_started_id: &str) {
        self.attempts.remove(test_case_started_id);
    }

    pub fn pending_attempts(&self) -> usize {
        self.attempts.len()
    }
}
