use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use cucumber_teamcity::messages::EventStream;
use cucumber_teamcity::report::{Reporter, StreamHost};
use cucumber_teamcity::{config, Result};

/// Report a cucumber message stream (NDJSON) to TeamCity as service messages.
#[derive(Debug, Parser)]
#[command(name = "cucumber-teamcity", version)]
struct Cli {
    /// Message stream to read; `-` or absent reads stdin
    input: Option<PathBuf>,

    /// Directory screenshots are written to [env: SCREENSHOTS_PATH]
    #[arg(long)]
    screenshots_path: Option<PathBuf>,

    /// Artifact folder screenshots are published under [env: ARTIFACTS_SUB_FOLDER]
    #[arg(long)]
    artifacts_sub_folder: Option<String>,
}

fn main() {
    // stdout carries the service messages, diagnostics go to stderr
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    if let Err(e) = run(Cli::parse()) {
        eprintln!("cucumber-teamcity: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut settings = config::resolve();
    if let Some(path) = cli.screenshots_path {
        settings.screenshots_path = path;
    }
    if let Some(folder) = cli.artifacts_sub_folder {
        settings.artifacts_sub_folder = folder;
    }

    let reader: Box<dyn BufRead> = match cli.input {
        Some(path) if path.as_os_str() != "-" => Box::new(BufReader::new(File::open(&path)?)),
        _ => Box::new(io::stdin().lock()),
    };

    let mut reporter = Reporter::new(StreamHost::new(io::stdout().lock()), settings);
    let reported = EventStream::new(reader).on_test_case_finished(|flow_id, attempt| {
        reporter.log_test_case(flow_id, attempt).map(|_| ())
    })?;

    tracing::info!("Processed {} finished test case(s)", reported);
    Ok(())
}
