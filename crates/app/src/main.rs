use anyhow::{bail, Context, Result};
use clap::Parser;
use git2::Repository as GitRepository;
use mercury_scm::adapters::{FsDiscoveryAdapter, GitAdapter, GitHistory};
use mercury_scm::cli::{CliArgs, CliCommand};
use mercury_scm::config::Config;
use mercury_scm::render::{render_log, render_status};
use mercury_scm::services::{ProviderOptions, ScmService};
use mercury_scm_core::domain::{ProviderId, CHANGES_GROUP, STAGED_GROUP, UNTRACKED_GROUP};
use mercury_scm_core::{CancellationToken, Transition};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let config = Config::from_cli_and_file(&cli_args, cli_args.config.clone())?;

    // RUST_LOG wins over the configured filter
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_filter.clone()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting Mercury SCM");

    let git_adapter = Arc::new(GitAdapter::new());
    let (mut service, _events, _commands) = ScmService::new(
        git_adapter.clone(),
        git_adapter,
        ProviderOptions::from(&config),
    );

    register_repositories(&mut service, &config).await?;
    service.refresh_all().await?;

    let result = run_command(&mut service, &config, cli_args.command).await;
    service.shutdown();
    result
}

/// Register configured repositories, discovered ones, or the repository
/// containing the current directory when neither yields anything
async fn register_repositories(service: &mut ScmService, config: &Config) -> Result<()> {
    let mut roots: Vec<PathBuf> = config.repos.clone();
    if roots.is_empty() && config.base_dir.is_none() {
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        let repo = GitRepository::discover(&cwd)
            .with_context(|| format!("{} is not inside a git repository", cwd.display()))?;
        let workdir = repo
            .workdir()
            .context("Bare repositories are not supported")?;
        roots.push(workdir.to_path_buf());
    }

    for root in roots {
        let provider_id = service.register_repository(&root, None)?;
        attach_history(service, provider_id, root);
    }

    if let Some(base_dir) = config.base_dir.clone() {
        let discovered = service
            .discover(Arc::new(FsDiscoveryAdapter::new()), base_dir)
            .await?;
        for provider_id in discovered {
            let root = PathBuf::from(provider_id.as_str());
            attach_history(service, provider_id, root);
        }
    }

    if service.framework().provider_count() == 0 {
        bail!("No repositories to show");
    }
    Ok(())
}

fn attach_history(service: &mut ScmService, provider_id: ProviderId, root: PathBuf) {
    service.register_history_provider(Box::new(GitHistory::new(provider_id, root)));
}

/// The first registered provider; path arguments are relative to its root
fn primary_provider(service: &ScmService) -> Result<(ProviderId, PathBuf)> {
    let provider = service
        .framework()
        .providers()
        .next()
        .context("No repositories registered")?;
    let root = provider
        .root_path()
        .map(Path::to_path_buf)
        .context("Provider has no repository root")?;
    Ok((provider.id().clone(), root))
}

/// Stage a changed or untracked file; returns false when it has nothing to stage
fn stage_path(service: &mut ScmService, provider_id: &ProviderId, root: &Path, path: &str) -> bool {
    let uri = root.join(path).to_string_lossy().to_string();
    if service.stage(provider_id, &uri) == Transition::Moved {
        return true;
    }
    service.move_resource(provider_id, &uri, UNTRACKED_GROUP, STAGED_GROUP) == Transition::Moved
}

fn stage_untracked(service: &mut ScmService, provider_id: &ProviderId) {
    let uris: Vec<String> = service
        .framework()
        .group(provider_id.as_str(), UNTRACKED_GROUP)
        .map(|group| group.resource_states().iter().map(|s| s.uri.to_string()).collect())
        .unwrap_or_default();
    for uri in uris {
        service.move_resource(provider_id, &uri, UNTRACKED_GROUP, STAGED_GROUP);
    }
}

async fn run_command(service: &mut ScmService, config: &Config, command: Option<CliCommand>) -> Result<()> {
    match command.unwrap_or(CliCommand::Status) {
        CliCommand::Status => {
            print!("{}", render_status(service.framework()));
        }

        CliCommand::Stage { paths } => {
            let (provider_id, root) = primary_provider(service)?;
            for path in &paths {
                if !stage_path(service, &provider_id, &root, path) {
                    warn!("Nothing to stage for {}", path);
                }
            }
            print!("{}", render_status(service.framework()));
        }

        CliCommand::Commit { message, all, paths } => {
            let (provider_id, root) = primary_provider(service)?;
            if all {
                service.stage_all(&provider_id);
                if config.ui.show_untracked {
                    stage_untracked(service, &provider_id);
                }
            }
            for path in &paths {
                if !stage_path(service, &provider_id, &root, path) {
                    warn!("Nothing to stage for {}", path);
                }
            }

            match service.commit(&provider_id, &message, CancellationToken::new()).await {
                Some(commit_id) => {
                    let changes = service.projection().group(provider_id.as_str(), CHANGES_GROUP).len();
                    println!("[{}] {}", commit_id.short(), message.lines().next().unwrap_or(""));
                    if changes > 0 {
                        println!("{} changes not staged", changes);
                    }
                }
                None => {
                    let reason = service
                        .projection()
                        .last_error
                        .clone()
                        .unwrap_or_else(|| "Commit failed".to_string());
                    bail!(reason);
                }
            }
        }

        CliCommand::Log { limit } => {
            let (provider_id, _) = primary_provider(service)?;
            let commits = service.history(&provider_id, limit.unwrap_or(config.history_limit))?;
            print!("{}", render_log(&commits));
        }
    }
    Ok(())
}
