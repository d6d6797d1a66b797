// Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Fixed fallback used when no usable output directory is configured
pub const DEFAULT_REPORT_BASE: &str = "./test-report";

/// Default base name of the report artifacts
pub const DEFAULT_REPORT_NAME: &str = "test-report";

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory the report artifacts are written into
    #[serde(default)]
    pub output_dir: Option<String>,

    /// Base name of the report files (json history and html document)
    #[serde(default = "default_report_name")]
    pub report_name: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            report_name: default_report_name(),
        }
    }
}

fn default_report_name() -> String {
    String::from(DEFAULT_REPORT_NAME)
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Option<Self> {
        // Check locations in order:
        // 1. .reportifyrc.toml (current directory)
        // 2. ~/.reportifyrc.toml (home directory)

        let cwd = std::env::current_dir().ok()?;
        let home = dirs::home_dir()?;

        let paths = [cwd.join(".reportifyrc.toml"), home.join(".reportifyrc.toml")];

        for path in &paths {
            if path.exists() {
                return Self::load_from_file(path);
            }
        }

        None
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Generate default configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }
}

/// Resolve the report base path (no extension): `<output_dir>/<name>` when
/// the directory exists, the fixed default location otherwise.
pub fn report_base(output_dir: Option<&Path>, report_name: Option<&str>) -> PathBuf {
    let name = report_name
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_REPORT_NAME);

    match output_dir {
        Some(dir) if dir.is_dir() => dir.join(name),
        _ => PathBuf::from(DEFAULT_REPORT_BASE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let toml = r#"
[report]
output_dir = "reports"
report_name = "nightly"
"#;

        let config = Config::parse(toml).expect("Failed to parse config");
        assert_eq!(config.report.output_dir.as_deref(), Some("reports"));
        assert_eq!(config.report.report_name, "nightly");
    }

    #[test]
    fn test_parse_config_defaults() {
        let config = Config::parse("").expect("Failed to parse config");
        assert!(config.report.output_dir.is_none());
        assert_eq!(config.report.report_name, DEFAULT_REPORT_NAME);
    }

    #[test]
    fn test_report_base_uses_existing_directory() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let base = report_base(Some(temp_dir.path()), Some("nightly"));
        assert_eq!(base, temp_dir.path().join("nightly"));
    }

    #[test]
    fn test_report_base_falls_back_when_directory_missing() {
        let base = report_base(Some(Path::new("/definitely/not/here")), Some("nightly"));
        assert_eq!(base, PathBuf::from(DEFAULT_REPORT_BASE));
    }

    #[test]
    fn test_report_base_defaults_name() {
        let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let base = report_base(Some(temp_dir.path()), None);
        assert_eq!(base, temp_dir.path().join(DEFAULT_REPORT_NAME));
    }
}
