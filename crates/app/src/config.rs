use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::cli::CliArgs;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Config {
    pub version: u32,
    /// Repositories registered as providers, in order
    #[serde(default)]
    pub repos: Vec<PathBuf>,
    /// Directory scanned for further repositories
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    /// Number of commits shown by `log`
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
    /// Default tracing filter; RUST_LOG takes precedence
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub commit: CommitConfig,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct UiConfig {
    /// Hide every group while it has no resources
    pub hide_empty_groups: bool,
    pub show_untracked: bool,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CommitConfig {
    pub input_placeholder: String,
    /// Warn when the subject line is longer than this
    #[serde(default)]
    pub max_subject_length: Option<usize>,
}

fn default_history_limit() -> usize {
    20
}

fn default_log_filter() -> String {
    "warn".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: 1,
            repos: Vec::new(),
            base_dir: None,
            history_limit: default_history_limit(),
            log_filter: default_log_filter(),
            ui: UiConfig::default(),
            commit: CommitConfig::default(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            hide_empty_groups: false,
            show_untracked: true,
        }
    }
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self {
            input_placeholder: "Message (Ctrl+Enter to commit)".to_string(),
            max_subject_length: Some(72),
        }
    }
}

pub fn get_default_config_path() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "mercury-scm")
        .context("Failed to determine project directories")?;

    let config_dir = proj_dirs.config_dir();
    Ok(config_dir.join("mercury-scm.toml"))
}

/// Expand a leading `~` to the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => match dirs::home_dir() {
            Some(home) => home.join(rest),
            None => path.to_path_buf(),
        },
        Err(_) => path.to_path_buf(),
    }
}

impl Config {
    pub fn load(config_path: Option<PathBuf>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p,
            None => get_default_config_path()?,
        };

        if !path.exists() {
            let default_config = Config::default();
            // Create directory if it doesn't exist
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
            default_config.save(&path)?;
            return Ok(default_config);
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        Ok(())
    }

    pub fn from_cli_and_file(cli_args: &CliArgs, config_path: Option<PathBuf>) -> Result<Self> {
        let mut config = Self::load(config_path)?;

        // CLI args override config file
        if !cli_args.repos.is_empty() {
            config.repos = cli_args.repos.clone();
        }
        if let Some(base_dir) = &cli_args.base_dir {
            config.base_dir = Some(base_dir.clone());
        }

        config.repos = config.repos.iter().map(|p| expand_home(p)).collect();
        config.base_dir = config.base_dir.as_deref().map(expand_home);
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.version, 1);
        assert!(config.repos.is_empty());
        assert!(config.ui.show_untracked);
        assert!(!config.ui.hide_empty_groups);
        assert_eq!(config.commit.max_subject_length, Some(72));
        assert_eq!(config.history_limit, 20);
    }

    #[test]
    fn test_config_serialization_roundtrip() -> Result<()> {
        let mut config = Config::default();
        config.repos = vec![PathBuf::from("/work/api"), PathBuf::from("/work/web")];
        config.base_dir = Some(PathBuf::from("/work"));
        config.ui.show_untracked = false;
        config.commit.max_subject_length = None;

        let toml_str = toml::to_string(&config)?;
        let parsed_config: Config = toml::from_str(&toml_str)?;

        assert_eq!(config, parsed_config);
        Ok(())
    }

    #[test]
    fn test_partial_config_uses_defaults() -> Result<()> {
        let config: Config = toml::from_str("version = 1\nrepos = [\"/work/api\"]\n")?;
        assert_eq!(config.repos, vec![PathBuf::from("/work/api")]);
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.ui, UiConfig::default());
        Ok(())
    }

    #[test]
    fn test_config_load_nonexistent_creates_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested/mercury-scm.toml");

        let config = Config::load(Some(config_path.clone()))?;

        assert_eq!(config, Config::default());
        assert!(config_path.exists());
        Ok(())
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test.toml");

        let mut config = Config::default();
        config.repos = vec![PathBuf::from("/custom/repo")];
        config.commit.input_placeholder = "Commit message".to_string();

        config.save(&config_path)?;
        let loaded_config = Config::load(Some(config_path))?;

        assert_eq!(config, loaded_config);
        Ok(())
    }

    #[test]
    fn test_cli_override() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("test.toml");

        let original_config = Config {
            repos: vec![PathBuf::from("/original/repo")],
            ..Config::default()
        };
        original_config.save(&config_path)?;

        let cli_args = CliArgs::parse_from(["mercury-scm", "--repo", "/override/repo", "status"]);
        let final_config = Config::from_cli_and_file(&cli_args, Some(config_path))?;
        assert_eq!(final_config.repos, vec![PathBuf::from("/override/repo")]);
        Ok(())
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home(Path::new("/abs/path")), PathBuf::from("/abs/path"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home(Path::new("~/src")), home.join("src"));
        }
    }

    #[test]
    fn test_get_default_config_path() -> Result<()> {
        let path = get_default_config_path()?;
        assert!(path.ends_with("mercury-scm.toml"));
        Ok(())
    }
}
