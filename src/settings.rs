//! Process-wide fixture configuration
//!
//! Performance checks can be disabled globally for a whole test run, which
//! is the usual escape hatch on CI hosts with noisy timing. Three sources
//! feed the decision, any of which can disable:
//!
//! - the `--performance-skip` flag in the test binary's argument list,
//! - the `MEDIR_PERFORMANCE_SKIP` environment variable set to a truthy
//!   value (`1`, `true`, `yes`, `on`),
//! - `skip = true` under `[performance]` in a `medir.toml` next to the
//!   process working directory.
//!
//! Resolution happens once per process through [`Settings::global`];
//! fixtures consult the result at construction time, not per call.

use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;
use thiserror::Error;

/// Flag that disables the performance fixtures for the whole run
pub const SKIP_FLAG: &str = "--performance-skip";

/// Environment variable equivalent of [`SKIP_FLAG`]
pub const SKIP_ENV: &str = "MEDIR_PERFORMANCE_SKIP";

/// Config file consulted by [`Settings::discover`]
pub const CONFIG_FILE: &str = "medir.toml";

/// Fixed message attached to the skip outcome
pub const SKIP_MESSAGE: &str = "Performance checks are skipped (--performance-skip was set).";

/// Errors from reading a settings file
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// `medir.toml` layout
///
/// ```toml
/// [performance]
/// skip = true
/// ```
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    performance: PerformanceSection,
}

#[derive(Debug, Default, Deserialize)]
struct PerformanceSection {
    #[serde(default)]
    skip: bool,
}

/// Resolved process-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    /// Replace every fixture request with a skip outcome
    pub skip: bool,
}

impl Settings {
    /// Resolve from the argument list and environment only
    pub fn from_env() -> Self {
        let flag_set = env::args().any(|arg| arg == SKIP_FLAG);
        let env_set = env::var(SKIP_ENV)
            .map(|value| is_truthy(&value))
            .unwrap_or(false);
        Self {
            skip: flag_set || env_set,
        }
    }

    /// Load from a specific settings file
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        let config: ConfigFile = toml::from_str(&contents)?;
        Ok(Self {
            skip: config.performance.skip,
        })
    }

    /// Resolve from every source: flag, environment, and `medir.toml` if
    /// one exists in the working directory. Any source can disable.
    ///
    /// A config file that fails to parse is reported and otherwise ignored;
    /// an unreadable file must not silently disable or enable checks.
    pub fn discover() -> Self {
        let mut settings = Self::from_env();
        let path = Path::new(CONFIG_FILE);
        if path.exists() {
            match Self::load(path) {
                Ok(file_settings) => settings.skip = settings.skip || file_settings.skip,
                Err(err) => {
                    tracing::warn!(file = CONFIG_FILE, error = %err, "ignoring unreadable settings file");
                }
            }
        }
        settings
    }

    /// Process-wide settings, resolved on first access via [`Self::discover`]
    pub fn global() -> &'static Settings {
        GLOBAL.get_or_init(Self::discover)
    }

    /// Seed the process-wide settings explicitly, before first use
    ///
    /// # Errors
    ///
    /// Returns the rejected value if the global settings were already
    /// resolved.
    pub fn init(settings: Settings) -> Result<(), Settings> {
        GLOBAL.set(settings)
    }
}

static GLOBAL: OnceLock<Settings> = OnceLock::new();

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    #[test]
    fn test_truthy_values() {
        for value in ["1", "true", "TRUE", "yes", "on", " 1 "] {
            assert!(is_truthy(value), "{value:?} should be truthy");
        }
        for value in ["0", "false", "no", "off", "", "2"] {
            assert!(!is_truthy(value), "{value:?} should not be truthy");
        }
    }

    #[test]
    #[serial]
    fn test_from_env_without_sources() {
        env::remove_var(SKIP_ENV);
        // The test binary is never invoked with the skip flag
        assert!(!Settings::from_env().skip);
    }

    #[test]
    #[serial]
    fn test_from_env_with_variable() {
        env::set_var(SKIP_ENV, "1");
        assert!(Settings::from_env().skip);
        env::set_var(SKIP_ENV, "false");
        assert!(!Settings::from_env().skip);
        env::remove_var(SKIP_ENV);
    }

    #[test]
    fn test_load_skip_true() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[performance]\nskip = true").unwrap();
        let settings = Settings::load(file.path()).unwrap();
        assert!(settings.skip);
    }

    #[test]
    fn test_load_empty_file_defaults_off() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let settings = Settings::load(file.path()).unwrap();
        assert!(!settings.skip);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let err = Settings::load(Path::new("/nonexistent/medir.toml")).unwrap_err();
        assert!(matches!(err, SettingsError::Io(_)));
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[performance\nskip =").unwrap();
        let err = Settings::load(file.path()).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_skip_message_names_the_flag() {
        assert!(SKIP_MESSAGE.contains(SKIP_FLAG));
    }
}
