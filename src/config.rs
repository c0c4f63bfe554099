use std::path::PathBuf;

pub const DEFAULT_SCREENSHOTS_PATH: &str = "./screenshots";
pub const DEFAULT_ARTIFACTS_SUB_FOLDER: &str = "screenshots";

/// Keys consulted for the screenshot root, first non-empty value wins.
pub const SCREENSHOTS_PATH_KEYS: [&str; 2] =
    ["SCREENSHOTS_PATH", "TEAMCITY_CUCUMBER_PATH_TO_SCREENSHOTS"];

/// Keys consulted for the artifact sub-folder, first non-empty value wins.
pub const ARTIFACTS_SUB_FOLDER_KEYS: [&str; 2] =
    ["ARTIFACTS_SUB_FOLDER", "TEAMCITY_CUCUMBER_ARTIFACTS_SUB_FOLDER"];

/// All configurable settings with their defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ReporterSettings {
    /// Directory screenshots are written to.
    pub screenshots_path: PathBuf,
    /// Logical folder the dashboard publishes screenshots under.
    pub artifacts_sub_folder: String,
}

impl Default for ReporterSettings {
    fn default() -> Self {
        Self {
            screenshots_path: PathBuf::from(DEFAULT_SCREENSHOTS_PATH),
            artifacts_sub_folder: DEFAULT_ARTIFACTS_SUB_FOLDER.to_string(),
        }
    }
}

/// Resolve settings from the process environment.
pub fn resolve() -> ReporterSettings {
    resolve_with(|key| std::env::var(key).ok())
}

/// Testable resolver that accepts an explicit key lookup (no process env dependency).
pub fn resolve_with<F>(lookup: F) -> ReporterSettings
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = ReporterSettings::default();

    if let Some(v) = first_set(&lookup, &SCREENSHOTS_PATH_KEYS) {
        settings.screenshots_path = PathBuf::from(v);
    }
    if let Some(v) = first_set(&lookup, &ARTIFACTS_SUB_FOLDER_KEYS) {
        settings.artifacts_sub_folder = v;
    }

    tracing::debug!(
        "Screenshots go to {} (artifacts under '{}')",
        settings.screenshots_path.display(),
        settings.artifacts_sub_folder
    );
    settings
}

fn first_set<F>(lookup: &F, keys: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    keys.iter()
        .filter_map(|key| lookup(key))
        .find(|value| !value.is_empty())
}
