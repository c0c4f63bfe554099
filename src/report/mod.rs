pub mod attachments;
pub mod attempt;
pub mod details;
pub mod naming;

use std::io::Write;

use attempt::TestCaseAttempt;
use crate::config::ReporterSettings;
use crate::teamcity::ServiceMessage;

/// What the hosting test engine supplies to the reporter.
pub trait ReporterHost {
    /// Human-readable failure summary used as `testFailed` details.
    fn format_failure_details(&self, attempt: &TestCaseAttempt) -> String;

    /// Write one output line (without trailing newline).
    fn log(&mut self, line: &str) -> crate::Result<()>;

    fn emit(&mut self, message: &ServiceMessage<'_>) -> crate::Result<()> {
        self.log(&message.to_string())
    }
}

/// Host over any writer, e.g. stdout. Failure details use the plain issue format.
pub struct StreamHost<W: Write> {
    out: W,
}

impl<W: Write> StreamHost<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ReporterHost for StreamHost<W> {
    fn format_failure_details(&self, attempt: &TestCaseAttempt) -> String {
        details::format_issue(1, attempt)
    }

    fn log(&mut self, line: &str) -> crate::Result<()> {
        writeln!(self.out, "{}", line)?;
        self.out.flush()?;
        Ok(())
    }
}

/// What happened to one finished test case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The engine retries this attempt; nothing was written.
    Suppressed,
    Passed,
    Failed { screenshots: usize },
}

/// Turns finished test case attempts into service messages.
pub struct Reporter<H: ReporterHost> {
    host: H,
    settings: ReporterSettings,
}

impl<H: ReporterHost> Reporter<H> {
    pub fn new(host: H, settings: ReporterSettings) -> Self {
        Self { host, settings }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn into_host(self) -> H {
        self.host
    }

    /// Report one attempt as a start / optional failure / finish sequence,
    /// grouped under `flow_id`. Attempts the engine will retry are skipped.
    pub fn log_test_case(&mut self, flow_id: &str, attempt: &TestCaseAttempt) -> crate::Result<Outcome> {
        if attempt.will_be_retried {
            tracing::debug!("Attempt {} will be retried, not reporting", flow_id);
            return Ok(Outcome::Suppressed);
        }

        let name = naming::full_test_name(attempt);
        self.host.emit(&ServiceMessage::TestStarted { name: &name, flow_id })?;

        let outcome = if attempt.has_failed() {
            let details = self.host.format_failure_details(attempt);
            self.host.emit(&ServiceMessage::TestFailed { name: &name, details: &details, flow_id })?;
            let screenshots = attachments::publish_screenshots(&mut self.host, &self.settings, attempt)?;
            Outcome::Failed { screenshots }
        } else {
            Outcome::Passed
        };

        self.host.emit(&ServiceMessage::TestFinished {
            name: &name,
            duration: attempt.duration(),
            flow_id,
        })?;

        tracing::debug!("Reported {} as {:?}", name, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Collects logged lines in memory.
    #[derive(Default)]
    pub struct RecordingHost {
        pub lines: Vec<String>,
    }

    impl ReporterHost for RecordingHost {
        fn format_failure_details(&self, attempt: &TestCaseAttempt) -> String {
            format!("{} failed", attempt.pickle_name)
        }

        fn log(&mut self, line: &str) -> crate::Result<()> {
            self.lines.push(line.to_string());
            Ok(())
        }
    }
}
