use serde::{Deserialize, Serialize};
use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use crate::error::DoculispError;

/// File name looked for by [DoculispConfig::discover].
pub const CONFIG_FILE_NAME: &str = "doculisp.toml";

/// Compiler settings, read from a `doculisp.toml` file.
///
/// ```toml
/// check_include_cycles = true
/// max_include_depth = 64
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DoculispConfig {
    /// Fail when a document includes itself, directly or transitively.
    pub check_include_cycles: bool,
    /// Deepest include nesting allowed before compilation fails.
    pub max_include_depth: usize,
}

impl Default for DoculispConfig {
    fn default() -> Self {
        DoculispConfig {
            check_include_cycles: true,
            max_include_depth: 64,
        }
    }
}

impl DoculispConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<DoculispConfig, DoculispError> {
        let path = path.as_ref();
        tracing::debug!("Reading config from: {:?}", path);
        let content = read_to_string(path).map_err(|e| {
            DoculispError::general(
                format!("Unable to read config: {e}"),
                Some(path.to_path_buf()),
            )
        })?;
        Self::parse(&content).map_err(|e| match e {
            DoculispError::General { message, .. } => {
                DoculispError::general(message, Some(path.to_path_buf()))
            }
            other => other,
        })
    }

    pub fn parse(content: &str) -> Result<DoculispConfig, DoculispError> {
        let config: DoculispConfig = toml::from_str(content)?;
        if config.max_include_depth == 0 {
            return Err(DoculispError::general(
                "max_include_depth must be at least 1",
                None,
            ));
        }
        Ok(config)
    }

    /// Load `doculisp.toml` from `dir`, falling back to defaults when there is none.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<DoculispConfig, DoculispError> {
        let candidate: PathBuf = dir.as_ref().join(CONFIG_FILE_NAME);
        if !candidate.exists() {
            tracing::debug!("Config file not found, using defaults.");
            return Ok(DoculispConfig::default());
        }
        Self::load(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_log::test;

    #[test]
    fn test_defaults_fill_missing_fields() {
        let config = DoculispConfig::parse("max_include_depth = 3").unwrap();
        assert!(config.check_include_cycles);
        assert_eq!(config.max_include_depth, 3);
        assert_eq!(DoculispConfig::parse("").unwrap(), DoculispConfig::default());
    }

    #[test]
    fn test_bad_config_is_general_failure() {
        assert!(DoculispConfig::parse("max_include_depth = 0")
            .unwrap_err()
            .is_general());
        assert!(DoculispConfig::parse("check_include_cycles = 'yes'")
            .unwrap_err()
            .is_general());
    }

    #[test]
    fn test_discover() {
        let dir = tempdir().unwrap();
        assert_eq!(
            DoculispConfig::discover(dir.path()).unwrap(),
            DoculispConfig::default()
        );
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "check_include_cycles = false\n",
        )
        .unwrap();
        let config = DoculispConfig::discover(dir.path()).unwrap();
        assert!(!config.check_include_cycles);
    }
}
