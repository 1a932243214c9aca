use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, PartialEq)]
#[command(name = "mercury-scm")]
#[command(about = "Source control panel for Mercury - inspect, stage and commit Git changes")]
pub struct CliArgs {
    /// Path to configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Repository to register (repeatable; overrides config)
    #[arg(long = "repo", global = true)]
    pub repos: Vec<PathBuf>,

    /// Directory to scan for further repositories (overrides config)
    #[arg(long, global = true)]
    pub base_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum CliCommand {
    /// Show resource groups and the pending-change count
    Status,

    /// Preview the groups after staging the given paths
    Stage {
        /// Repository-relative paths
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Stage the given paths (or all changes) and commit them
    Commit {
        /// Commit message
        #[arg(short, long)]
        message: String,

        /// Stage every changed and untracked file first
        #[arg(short, long)]
        all: bool,

        /// Repository-relative paths to stage first
        paths: Vec<String>,
    },

    /// Show recent commits
    Log {
        /// Number of commits to show (defaults to the configured limit)
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_no_args() {
        let args = CliArgs::parse_from(["mercury-scm"]);
        assert_eq!(args.config, None);
        assert!(args.repos.is_empty());
        assert_eq!(args.command, None);
    }

    #[test]
    fn test_cli_parse_repeated_repos() {
        let args = CliArgs::parse_from([
            "mercury-scm",
            "--repo", "/work/api",
            "--repo", "/work/web",
            "status",
        ]);
        assert_eq!(args.repos, vec![PathBuf::from("/work/api"), PathBuf::from("/work/web")]);
        assert_eq!(args.command, Some(CliCommand::Status));
    }

    #[test]
    fn test_cli_parse_commit() {
        let args = CliArgs::parse_from([
            "mercury-scm", "commit", "-m", "Fix parser", "src/lib.rs", "--config", "/tmp/c.toml",
        ]);
        assert_eq!(args.config, Some(PathBuf::from("/tmp/c.toml")));
        assert_eq!(
            args.command,
            Some(CliCommand::Commit {
                message: "Fix parser".to_string(),
                all: false,
                paths: vec!["src/lib.rs".to_string()],
            })
        );
    }

    #[test]
    fn test_cli_parse_log_limit() {
        let args = CliArgs::parse_from(["mercury-scm", "log", "-n", "5"]);
        assert_eq!(args.command, Some(CliCommand::Log { limit: Some(5) }));
    }

    #[test]
    fn test_cli_stage_requires_paths() {
        assert!(CliArgs::try_parse_from(["mercury-scm", "stage"]).is_err());
    }
}
