// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::consts::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOG_FILTER, DEFAULT_MAX_CONCURRENT_RUNS,
};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Process-level settings for the workflow core.
///
/// Every field is optional in the file; missing fields take their defaults.
///
/// # Fields
/// * `prefer_accelerator` - Use an available accelerator for GPU-compatible components
/// * `log_filter` - `tracing` filter directive, overridden by `RUST_LOG`
/// * `max_concurrent_runs` - Bound on workflow runs executing at once
///
/// # Example
/// ```yaml
/// prefer_accelerator: false
/// log_filter: "grdk_core=debug,info"
/// max_concurrent_runs: 2
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    pub prefer_accelerator: bool,
    pub log_filter: String,
    pub max_concurrent_runs: usize,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            prefer_accelerator: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            max_concurrent_runs: DEFAULT_MAX_CONCURRENT_RUNS,
        }
    }
}

/// `~/.grdk/grdk_config.yaml`, when a home directory is known.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Parse a config file. `.toml` files are read as TOML, everything else as YAML.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CoreConfig, ConfigError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let is_toml = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("toml"));
    let cfg = if is_toml {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(cfg)
}

/// Outcome of [`load_config_or_default`].
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: CoreConfig,
    /// File that was looked at, if any location was known.
    pub path: Option<PathBuf>,
    /// Why the file at `path` was ignored in favor of defaults.
    pub ignored: Option<ConfigError>,
}

impl LoadedConfig {
    /// Warn about an ignored file. Call once a subscriber is installed; the
    /// config usually decides how that subscriber filters.
    pub fn warn_if_ignored(&self) {
        if let Some(error) = &self.ignored {
            let path = self.path.as_deref().unwrap_or_else(|| Path::new(""));
            tracing::warn!(path = %path.display(), error = %error, "Ignoring unusable config file, using defaults");
        }
    }
}

/// Load `path` (or the default location) without ever failing.
///
/// A missing file means defaults. An unreadable or malformed file also means
/// defaults, with the problem kept in [`LoadedConfig::ignored`].
pub fn load_config_or_default(path: Option<&Path>) -> LoadedConfig {
    let path = match path.map(Path::to_path_buf).or_else(default_config_path) {
        Some(path) => path,
        None => {
            return LoadedConfig {
                config: CoreConfig::default(),
                path: None,
                ignored: None,
            }
        }
    };

    let (config, ignored) = if !path.exists() {
        (CoreConfig::default(), None)
    } else {
        match load_config(&path) {
            Ok(config) => (config, None),
            Err(error) => (CoreConfig::default(), Some(error)),
        }
    };

    LoadedConfig {
        config,
        path: Some(path),
        ignored,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    fn write_temp(suffix: &str, content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_config_formats() {
        struct TestCase {
            name: &'static str,
            suffix: &'static str,
            content: &'static str,
            expected: CoreConfig,
        }

        let test_cases = vec![
            TestCase {
                name: "yaml with every field",
                suffix: ".yaml",
                content: "prefer_accelerator: false\nlog_filter: debug\nmax_concurrent_runs: 8\n",
                expected: CoreConfig {
                    prefer_accelerator: false,
                    log_filter: "debug".to_string(),
                    max_concurrent_runs: 8,
                },
            },
            TestCase {
                name: "yaml with one field",
                suffix: ".yml",
                content: "max_concurrent_runs: 1\n",
                expected: CoreConfig {
                    max_concurrent_runs: 1,
                    ..CoreConfig::default()
                },
            },
            TestCase {
                name: "toml",
                suffix: ".toml",
                content: "prefer_accelerator = false\nlog_filter = \"warn\"\n",
                expected: CoreConfig {
                    prefer_accelerator: false,
                    log_filter: "warn".to_string(),
                    ..CoreConfig::default()
                },
            },
        ];

        for test_case in test_cases {
            let file = write_temp(test_case.suffix, test_case.content);
            let cfg = load_config(file.path())
                .unwrap_or_else(|e| panic!("Test case '{}': {}", test_case.name, e));
            assert_eq!(cfg, test_case.expected, "Test case '{}'", test_case.name);
        }
    }

    #[test]
    fn test_load_config_reports_errors() {
        let malformed = write_temp(".yaml", "prefer_accelerator: [not, a, bool]\n");
        assert!(matches!(load_config(malformed.path()), Err(ConfigError::Yaml(_))));

        let malformed = write_temp(".toml", "prefer_accelerator = \n");
        assert!(matches!(load_config(malformed.path()), Err(ConfigError::Toml(_))));

        assert!(matches!(
            load_config("/definitely/not/here.yaml"),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_unusable_files_fall_back_to_defaults() {
        let malformed = write_temp(".yaml", "max_concurrent_runs: many\n");
        let loaded = load_config_or_default(Some(malformed.path()));
        assert_eq!(loaded.config, CoreConfig::default());
        assert!(matches!(loaded.ignored, Some(ConfigError::Yaml(_))));

        let missing = Path::new("/definitely/not/here.yaml");
        let loaded = load_config_or_default(Some(missing));
        assert_eq!(loaded.config, CoreConfig::default());
        assert!(loaded.ignored.is_none());

        let good = write_temp(".yaml", "max_concurrent_runs: 2\n");
        let loaded = load_config_or_default(Some(good.path()));
        assert_eq!(loaded.config.max_concurrent_runs, 2);
        assert!(loaded.ignored.is_none());
    }

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_ignored_file_is_reported_once_logging_is_up() {
        let malformed = write_temp(".yaml", "prefer_accelerator: [not, a, bool]\n");
        let loaded = load_config_or_default(Some(malformed.path()));

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || loaded.warn_if_ignored());

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("WARN"), "{}", output);
        assert!(output.contains("Ignoring unusable config file"), "{}", output);
        assert!(output.contains(&malformed.path().display().to_string()), "{}", output);
    }
}
