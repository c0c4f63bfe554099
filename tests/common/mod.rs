#![allow(dead_code)]

use std::path::PathBuf;

use cucumber_teamcity::report::attempt::TestCaseAttempt;
use cucumber_teamcity::report::ReporterHost;

/// Path of a message stream under `tests/fixtures`.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
}

/// Host that keeps every logged line in memory.
#[derive(Default)]
pub struct MemoryHost {
    pub lines: Vec<String>,
}

impl ReporterHost for MemoryHost {
    fn format_failure_details(&self, attempt: &TestCaseAttempt) -> String {
        format!("{} failed in {}", attempt.pickle_name, attempt.uri)
    }

    fn log(&mut self, line: &str) -> cucumber_teamcity::Result<()> {
        self.lines.push(line.to_string());
        Ok(())
    }
}

/// Event names of the service-message lines, diagnostics excluded.
pub fn events(lines: &[String]) -> Vec<String> {
    lines
        .iter()
        .filter_map(|l| l.strip_prefix("##teamcity["))
        .map(|l| l.split([' ', ']']).next().unwrap_or("").to_string())
        .collect()
}
