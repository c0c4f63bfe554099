//! TeamCity service-message encoding.
//!
//! Every message renders as a single `##teamcity[...]` line. Attribute values
//! are escaped exactly once, at render time, so callers pass raw text.

use std::fmt;
use std::time::Duration;

/// Escape text for use inside a service-message attribute value.
///
/// The pipe substitution runs first so the pipes inserted by the later
/// substitutions are not escaped again.
pub fn escape(text: &str) -> String {
    text.replace('|', "||")
        .replace('\'', "|'")
        .replace('\n', "|n")
        .replace('\r', "|r")
        .replace('[', "|[")
        .replace(']', "|]")
}

/// A single line of the dashboard protocol.
#[derive(Debug, Clone, PartialEq)]
pub enum ServiceMessage<'a> {
    TestStarted {
        name: &'a str,
        flow_id: &'a str,
    },
    TestFailed {
        name: &'a str,
        details: &'a str,
        flow_id: &'a str,
    },
    TestFinished {
        name: &'a str,
        duration: Duration,
        flow_id: &'a str,
    },
    /// Single-value form: `src => dest`.
    PublishArtifacts { rule: &'a str },
    TestMetadata {
        kind: &'a str,
        test_name: &'a str,
        value: &'a str,
    },
}

impl ServiceMessage<'_> {
    pub fn event(&self) -> &'static str {
        match self {
            ServiceMessage::TestStarted { .. } => "testStarted",
            ServiceMessage::TestFailed { .. } => "testFailed",
            ServiceMessage::TestFinished { .. } => "testFinished",
            ServiceMessage::PublishArtifacts { .. } => "publishArtifacts",
            ServiceMessage::TestMetadata { .. } => "testMetadata",
        }
    }
}

/// Seconds with exactly three fractional digits, ties rounded up.
pub fn format_duration(duration: Duration) -> String {
    let millis = (duration.as_nanos() + 500_000) / 1_000_000;
    format!("{}.{:03}", millis / 1000, millis % 1000)
}

impl fmt::Display for ServiceMessage<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "##teamcity[{}", self.event())?;
        match self {
            ServiceMessage::TestStarted { name, flow_id } => {
                write_attr(f, "name", name)?;
                write_attr(f, "flowId", flow_id)?;
            }
            ServiceMessage::TestFailed { name, details, flow_id } => {
                write_attr(f, "name", name)?;
                write_attr(f, "details", details)?;
                write_attr(f, "flowId", flow_id)?;
            }
            ServiceMessage::TestFinished { name, duration, flow_id } => {
                write_attr(f, "name", name)?;
                write_attr(f, "duration", &format_duration(*duration))?;
                write_attr(f, "flowId", flow_id)?;
            }
            ServiceMessage::PublishArtifacts { rule } => {
                write!(f, " '{}'", escape(rule))?;
            }
            ServiceMessage::TestMetadata { kind, test_name, value } => {
                write_attr(f, "type", kind)?;
                write_attr(f, "testName", test_name)?;
                write_attr(f, "value", value)?;
            }
        }
        f.write_str("]")
    }
}

fn write_attr(f: &mut fmt::Formatter<'_>, key: &str, value: &str) -> fmt::Result {
    write!(f, " {}='{}'", key, escape(value))
}
