use std::io::BufRead;

use super::{Envelope, EventDataCollector};
use crate::report::attempt::TestCaseAttempt;

/// NDJSON envelope stream with a single subscription point.
pub struct EventStream<R: BufRead> {
    reader: R,
    collector: EventDataCollector,
}

impl<R: BufRead> EventStream<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, collector: EventDataCollector::new() }
    }

    /// Read the whole stream, calling `handler` with the flow id and resolved
    /// attempt for every finished test case. Returns how many were dispatched.
    ///
    /// A malformed line or a handler error stops the stream.
    pub fn on_test_case_finished<F>(mut self, mut handler: F) -> crate::Result<usize>
    where
        F: FnMut(&str, &TestCaseAttempt) -> crate::Result<()>,
    {
        let mut dispatched = 0;
        let mut line = String::new();
        let mut line_no = 0;

        loop {
            line.clear();
            if self.reader.read_line(&mut line)? == 0 {
                break;
            }
            line_no += 1;
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let envelope: Envelope = serde_json::from_str(trimmed)
                .map_err(|source| crate::Error::MalformedMessage { line: line_no, source })?;

            let Some(finished) = self.collector.ingest(envelope) else { continue };
            let started_id = finished.test_case_started_id;
            let attempt = self.collector.test_case_attempt(&started_id)?;
            handler(&started_id, &attempt)?;
            self.collector.forget(&started_id);
            dispatched += 1;
        }

        if self.collector.pending_attempts() > 0 {
            tracing::warn!(
                "Stream ended with {} test case(s) that never finished",
                self.collector.pending_attempts()
            );
        }
        Ok(dispatched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const RUN: &str = r#"{"meta":{"protocolVersion":"22.0.0"}}
{"gherkinDocument":{"uri":"features/a.feature","feature":{"name":"A","children":[]}}}
{"pickle":{"id":"p1","uri":"features/a.feature","name":"first","steps":[]}}
{"testCase":{"id":"tc1","pickleId":"p1","testSteps":[]}}

{"testCaseStarted":{"id":"r1","testCaseId":"tc1","attempt":0}}
{"testCaseFinished":{"testCaseStartedId":"r1","willBeRetried":true}}
{"testCaseStarted":{"id":"r2","testCaseId":"tc1","attempt":1}}
{"testCaseFinished":{"testCaseStartedId":"r2","willBeRetried":false}}
"#;

    #[test]
    fn test_handler_called_per_finished_case() {
        let mut seen = Vec::new();
        let count = EventStream::new(Cursor::new(RUN))
            .on_test_case_finished(|flow_id, attempt| {
                seen.push((flow_id.to_string(), attempt.will_be_retried));
                Ok(())
            })
            .unwrap();
        assert_eq!(count, 2);
        assert_eq!(seen, vec![("r1".to_string(), true), ("r2".to_string(), false)]);
    }

    #[test]
    fn test_malformed_line_reports_line_number() {
        let input = "{\"meta\":{}}\n\n{not json\n";
        let err = EventStream::new(Cursor::new(input))
            .on_test_case_finished(|_, _| Ok(()))
            .unwrap_err();
        assert!(matches!(err, crate::Error::MalformedMessage { line: 3, .. }));
    }

    #[test]
    fn test_handler_error_stops_stream() {
        let mut calls = 0;
        let result = EventStream::new(Cursor::new(RUN)).on_test_case_finished(|id, _| {
            calls += 1;
            Err(crate::Error::UnknownTestCaseAttempt(id.to_string()))
        });
        assert!(result.is_err());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_finish_without_start_is_an_error() {
        let input = r#"{"testCaseFinished":{"testCaseStartedId":"ghost"}}"#;
        let err = EventStream::new(Cursor::new(input))
            .on_test_case_finished(|_, _| Ok(()))
            .unwrap_err();
        assert!(matches!(err, crate::Error::UnknownTestCaseAttempt(id) if id == "ghost"));
    }
}
