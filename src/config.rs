//! Tool configuration (`webxml.toml`).
//!
//! Defines the typed configuration for the `webxml` binary: the baseline
//! descriptor merged under every application, merge strictness and output
//! checks.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::descriptor::WebXml;
use crate::version::SpecVersion;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "webxml.toml";

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level tool configuration.
///
/// Parsed from `webxml.toml`. Missing fields use defaults.
/// Missing file → all defaults (no error).
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Baseline descriptor settings.
    #[serde(default)]
    pub base: BaseConfig,

    /// Merge settings.
    #[serde(default)]
    pub merge: MergeConfig,

    /// Output settings.
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// BaseConfig
// ---------------------------------------------------------------------------

/// The baseline descriptor (typically the container's defaults).
///
/// The baseline is merged as an overridable fragment: every application
/// fragment outranks it, and the main descriptor outranks both.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BaseConfig {
    /// Path to the baseline descriptor. Relative paths resolve against the
    /// directory holding the config file.
    #[serde(default)]
    pub path: Option<PathBuf>,

    /// Add baseline welcome files even when the application declares some
    /// (default: `false`).
    #[serde(default)]
    pub always_add_welcome_files: bool,

    /// Let the application's first welcome file replace the baseline list
    /// (default: `true`).
    #[serde(default = "default_true")]
    pub replace_welcome_files: bool,
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            always_add_welcome_files: false,
            replace_welcome_files: default_true(),
        }
    }
}

const fn default_true() -> bool {
    true
}

impl BaseConfig {
    /// Resolve [`Self::path`] against `config_dir`.
    #[must_use]
    pub fn resolve_path(&self, config_dir: &Path) -> Option<PathBuf> {
        self.path.as_ref().map(|p| {
            if p.is_absolute() {
                p.clone()
            } else {
                config_dir.join(p)
            }
        })
    }

    /// Mark a loaded descriptor as the baseline.
    pub const fn apply(&self, baseline: &mut WebXml) {
        baseline.set_overridable(true);
        baseline.set_always_add_welcome_files(self.always_add_welcome_files);
        baseline.set_replace_welcome_files(self.replace_welcome_files);
    }
}

// ---------------------------------------------------------------------------
// MergeConfig
// ---------------------------------------------------------------------------

/// Merge strictness.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MergeConfig {
    /// Treat soft conflicts (dropped keys) as a failure (default: `false`).
    #[serde(default)]
    pub fail_on_conflict: bool,
}

// ---------------------------------------------------------------------------
// OutputConfig
// ---------------------------------------------------------------------------

/// Output settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    /// Re-read the merged document and fail if it has grammar errors
    /// (default: `true`).
    #[serde(default = "default_true")]
    pub validate: bool,

    /// Force the output version. `None` keeps the main descriptor's version.
    #[serde(default)]
    pub version: Option<SpecVersion>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            validate: default_true(),
            version: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Error loading or parsing the configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

impl ToolConfig {
    /// Load configuration from a TOML file.
    ///
    /// - If the file does not exist, returns `ToolConfig::default()`.
    /// - If the file exists but is malformed, returns a [`ConfigError`] with
    ///   line-level detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError {
                    path: Some(path.to_owned()),
                    message: format!("could not read file: {e}"),
                });
            }
        };
        Self::parse(&contents).map_err(|mut e| {
            e.path = Some(path.to_owned());
            e
        })
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| {
            let mut message = e.message().to_owned();
            if let Some(span) = e.span() {
                let line = toml_str[..span.start]
                    .chars()
                    .filter(|&c| c == '\n')
                    .count()
                    + 1;
                message = format!("line {line}: {message}");
            }
            ConfigError {
                path: None,
                message,
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_all_fields() {
        let cfg = ToolConfig::default();
        assert_eq!(cfg.base.path, None);
        assert!(!cfg.base.always_add_welcome_files);
        assert!(cfg.base.replace_welcome_files);
        assert!(!cfg.merge.fail_on_conflict);
        assert!(cfg.output.validate);
        assert_eq!(cfg.output.version, None);
    }

    #[test]
    fn parse_empty_string() {
        let cfg = ToolConfig::parse("").unwrap();
        assert_eq!(cfg, ToolConfig::default());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[base]
path = "conf/web.xml"
always_add_welcome_files = true
replace_welcome_files = false

[merge]
fail_on_conflict = true

[output]
validate = false
version = "2.5"
"#;
        let cfg = ToolConfig::parse(toml).unwrap();
        assert_eq!(cfg.base.path.as_deref(), Some(Path::new("conf/web.xml")));
        assert!(cfg.base.always_add_welcome_files);
        assert!(!cfg.base.replace_welcome_files);
        assert!(cfg.merge.fail_on_conflict);
        assert!(!cfg.output.validate);
        assert_eq!(cfg.output.version, Some(SpecVersion::V2_5));
    }

    #[test]
    fn parse_partial_config_uses_defaults() {
        let cfg = ToolConfig::parse("[merge]\nfail_on_conflict = true\n").unwrap();
        assert!(cfg.merge.fail_on_conflict);
        assert_eq!(cfg.base, BaseConfig::default());
        assert_eq!(cfg.output, OutputConfig::default());
    }

    #[test]
    fn parse_rejects_unknown_top_level_field() {
        let err = ToolConfig::parse("[unknown]\nfoo = 1\n").unwrap_err();
        assert!(err.message.contains("unknown"), "{}", err.message);
    }

    #[test]
    fn parse_rejects_unknown_nested_field() {
        assert!(ToolConfig::parse("[merge]\nstrict = true\n").is_err());
    }

    #[test]
    fn parse_rejects_unrecognized_version() {
        let err = ToolConfig::parse("[output]\nversion = \"4.0\"\n").unwrap_err();
        assert!(err.message.contains("line 2"), "{}", err.message);
    }

    #[test]
    fn parse_includes_line_number_on_error() {
        let toml = "[base]\nalways_add_welcome_files = 1\n";
        let err = ToolConfig::parse(toml).unwrap_err();
        assert!(
            err.message.contains("line"),
            "error should include line number: {}",
            err.message
        );
    }

    #[test]
    fn load_missing_file_returns_defaults() {
        let cfg = ToolConfig::load(Path::new("/nonexistent/webxml.toml")).unwrap();
        assert_eq!(cfg, ToolConfig::default());
    }

    #[test]
    fn load_invalid_file_shows_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "not valid [[[toml").unwrap();
        let err = ToolConfig::load(&path).unwrap_err();
        assert_eq!(err.path.as_deref(), Some(path.as_path()));
        assert!(err.to_string().starts_with(&path.display().to_string()));
    }

    #[test]
    fn base_path_resolves_against_config_dir() {
        let cfg = ToolConfig::parse("[base]\npath = \"conf/web.xml\"\n").unwrap();
        assert_eq!(
            cfg.base.resolve_path(Path::new("/srv/app")),
            Some(PathBuf::from("/srv/app/conf/web.xml"))
        );
        let cfg = ToolConfig::parse("[base]\npath = \"/etc/web.xml\"\n").unwrap();
        assert_eq!(
            cfg.base.resolve_path(Path::new("/srv/app")),
            Some(PathBuf::from("/etc/web.xml"))
        );
    }

    #[test]
    fn apply_marks_baseline() {
        let mut baseline = WebXml::new();
        BaseConfig::default().apply(&mut baseline);
        assert!(baseline.is_overridable());
        assert!(!baseline.always_add_welcome_files());
        assert!(baseline.replace_welcome_files());
    }
}
