//! Screenshot attachments of failed test cases: written to disk, then
//! published as build artifacts and linked to the test as image metadata.

use std::path::PathBuf;
use base64::Engine;

use super::attempt::{Attachment, TestCaseAttempt};
use super::{naming, ReporterHost};
use crate::config::ReporterSettings;
use crate::teamcity::ServiceMessage;

pub const SUPPORTED_MEDIA_TYPES: &[&str] = &["image/png"];
pub const BASE64_ENCODING: &str = "base64";

/// Names and paths for one screenshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenshotPaths {
    pub file_name: String,
    /// Where the bytes are written.
    pub file_path: PathBuf,
    /// Dashboard-side path, always `/`-separated.
    pub artifact_path: String,
}

impl ScreenshotPaths {
    pub fn new(settings: &ReporterSettings, test_name: &str, attachment: &Attachment) -> Self {
        let media_type = attachment.media_type.as_str();
        let extension = &media_type[media_type.rfind('/').map_or(0, |i| i + 1)..];
        let file_name = format!("{}.{}.{}", test_name, attachment.test_step_id, extension);
        let file_path = settings.screenshots_path.join(&file_name);
        let folder = settings.artifacts_sub_folder.trim_end_matches(['/', '\\']);
        let artifact_path = if folder.is_empty() {
            file_name.clone()
        } else {
            format!("{}/{}", folder, file_name)
        };
        Self { file_name, file_path, artifact_path }
    }

    /// `src => dest` rule for `publishArtifacts`.
    pub fn artifact_rule(&self) -> String {
        format!("{} => {}", self.file_path.display(), self.artifact_path)
    }
}

/// Publish every supported screenshot of `attempt`. Returns how many were published.
///
/// Unsupported media types are skipped silently. Unsupported encodings,
/// step ids with path separators and undecodable bodies are reported as a
/// diagnostic line and dropped.
/// Filesystem failures propagate.
pub fn publish_screenshots(
    host: &mut dyn ReporterHost,
    settings: &ReporterSettings,
    attempt: &TestCaseAttempt,
) -> crate::Result<usize> {
    let full_test_name = naming::full_test_name(attempt);
    let test_name = naming::test_name(attempt);
    let mut published = 0;

    for (_, attachments) in attempt.step_attachments() {
        for attachment in attachments {
            if publish_screenshot(host, settings, &full_test_name, &test_name, attachment)? {
                published += 1;
            }
        }
    }
    Ok(published)
}

fn publish_screenshot(
    host: &mut dyn ReporterHost,
    settings: &ReporterSettings,
    full_test_name: &str,
    test_name: &str,
    attachment: &Attachment,
) -> crate::Result<bool> {
    if !SUPPORTED_MEDIA_TYPES.contains(&attachment.media_type.as_str()) {
        tracing::debug!(
            "Skipping {} attachment of step {}",
            attachment.media_type,
            attachment.test_step_id
        );
        return Ok(false);
    }

    if !attachment.content_encoding.eq_ignore_ascii_case(BASE64_ENCODING) {
        let line = format!(
            "Test: \"{}\" step: {} screenshot content encoding: {} is not supported",
            test_name, attachment.test_step_id, attachment.content_encoding
        );
        tracing::warn!("{}", line);
        host.log(&line)?;
        return Ok(false);
    }

    // The step id becomes part of the file name and must not leave the root.
    if attachment.test_step_id.contains(['/', '\\']) {
        let line = format!(
            "Test: \"{}\" step: {} screenshot step id is not a valid file name",
            test_name, attachment.test_step_id
        );
        tracing::warn!("{}", line);
        host.log(&line)?;
        return Ok(false);
    }

    let bytes = match base64::engine::general_purpose::STANDARD.decode(attachment.body.trim()) {
        Ok(bytes) => bytes,
        Err(e) => {
            let line = format!(
                "Test: \"{}\" step: {} screenshot body is not valid base64: {}",
                test_name, attachment.test_step_id, e
            );
            tracing::warn!("{}", line);
            host.log(&line)?;
            return Ok(false);
        }
    };

    std::fs::create_dir_all(&settings.screenshots_path)?;
    let paths = ScreenshotPaths::new(settings, test_name, attachment);
    std::fs::write(&paths.file_path, &bytes)?;
    tracing::debug!("Wrote {} bytes to {}", bytes.len(), paths.file_path.display());

    host.emit(&ServiceMessage::PublishArtifacts { rule: &paths.artifact_rule() })?;
    host.emit(&ServiceMessage::TestMetadata {
        kind: "image",
        test_name: full_test_name,
        value: &paths.artifact_path,
    })?;
    Ok(true)
}
