use log::debug;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to write config file at {config_path}: {source}")]
    ConfigWriteError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to serialize config: {0}")]
    ConfigSerializeError(#[from] toml::ser::Error),
}

/// Where quillnote keeps its notes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub notes_path: PathBuf,
}

impl Config {
    pub fn new(notes_path: impl Into<PathBuf>) -> Self {
        Self {
            notes_path: notes_path.into(),
        }
    }

    /// Load the config at `config_path`, or `None` when no file exists yet.
    ///
    /// Shell variables and `~` in `notes_path` are expanded; a path that fails to
    /// expand is kept as written.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            debug!("no config at {}", config_path.display());
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        config.notes_path = Self::expand_path(&config.notes_path).unwrap_or(config.notes_path);
        debug!(
            "loaded config from {}: notes at {}",
            config_path.display(),
            config.notes_path.display()
        );

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        Self::load_from_path(Self::config_path())
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> Result<(), ConfigError> {
        let config_path = config_path.as_ref();
        let write_error = |source| ConfigError::ConfigWriteError {
            config_path: config_path.to_path_buf(),
            source,
        };
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent).map_err(write_error)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content).map_err(write_error)?;
        Ok(())
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(Self::config_path())
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/quillnote");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expand `~` and environment variables, `None` if a variable is unset
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        shellexpand::full(&path_str)
            .ok()
            .map(|expanded| PathBuf::from(expanded.as_ref()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_config_path() {
        let config_path = Config::config_path();
        let path_str = config_path.to_string_lossy();

        assert!(!path_str.starts_with('~'));
        assert!(path_str.ends_with(".config/quillnote/config.toml"));
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Config::expand_path(Path::new("~/test/path")).unwrap();

        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().ends_with("test/path"));
    }

    #[test]
    fn test_expand_path_with_env_var() {
        unsafe {
            env::set_var("QUILLNOTE_TEST_VAR", "/test/env/path");
        }

        let expanded = Config::expand_path(Path::new("$QUILLNOTE_TEST_VAR/subdir"));
        assert_eq!(expanded, Some(PathBuf::from("/test/env/path/subdir")));

        unsafe {
            env::remove_var("QUILLNOTE_TEST_VAR");
        }
    }

    #[test]
    fn test_expand_path_with_unset_var() {
        let path = Path::new("$QUILLNOTE_DEFINITELY_UNSET/notes");
        assert_eq!(Config::expand_path(path), None);
    }

    #[test]
    fn test_expand_path_leaves_plain_paths_alone() {
        for path in ["/absolute/path", "relative/path"] {
            assert_eq!(Config::expand_path(Path::new(path)), Some(PathBuf::from(path)));
        }
    }

    #[test]
    fn test_load_config_file_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let non_existent_config = temp_dir.path().join("nonexistent.toml");

        let result = Config::load_from_path(&non_existent_config).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_save_and_load_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("nested").join("config.toml");
        let test_config = Config::new("/tmp/test-notes");

        test_config.save_to_path(&config_file).unwrap();
        let loaded_config = Config::load_from_path(&config_file).unwrap().unwrap();

        assert_eq!(loaded_config, test_config);
    }

    #[test]
    fn test_load_expands_tilde_in_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "notes_path = \"~/test/notes\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();

        let expanded_path = config.notes_path.to_string_lossy();
        assert!(!expanded_path.starts_with('~'));
        assert!(expanded_path.ends_with("test/notes"));
    }

    #[test]
    fn test_load_keeps_unexpandable_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "notes_path = \"$QUILLNOTE_NOPE/notes\"\n").unwrap();

        let config = Config::load_from_path(&config_file).unwrap().unwrap();
        assert_eq!(config.notes_path, PathBuf::from("$QUILLNOTE_NOPE/notes"));
    }

    #[test]
    fn test_load_reports_malformed_toml() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "notes_path = [").unwrap();

        let err = Config::load_from_path(&config_file).unwrap_err();
        assert!(matches!(err, ConfigError::ConfigParseError { .. }));
        assert!(err.to_string().contains("config.toml"));
    }
}
