use anyhow::Result;
use mercury_scm::adapters::{FsDiscoveryAdapter, GitAdapter, GitHistory};
use mercury_scm::services::{ProviderOptions, ScmService};
use mercury_scm_core::app::Command;
use mercury_scm_core::domain::{
    CommitEvent, Event, ProviderId, CHANGES_GROUP, STAGED_GROUP, UNTRACKED_GROUP,
};
use mercury_scm_core::{CancellationToken, Transition};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tokio::sync::mpsc;

fn create_test_git_repo(path: &Path) -> Result<()> {
    fs::create_dir_all(path)?;
    let git_repo = git2::Repository::init(path)?;
    let signature = git2::Signature::now("Test User", "test@example.com")?;

    fs::write(path.join("README.md"), "# test\n")?;
    let tree_id = {
        let mut index = git_repo.index()?;
        index.add_path(Path::new("README.md"))?;
        index.write()?;
        index.write_tree()?
    };
    let tree = git_repo.find_tree(tree_id)?;
    git_repo.commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])?;

    Ok(())
}

fn new_service() -> (ScmService, mpsc::UnboundedReceiver<Event>, mpsc::UnboundedSender<Command>) {
    let git_adapter = Arc::new(GitAdapter::new());
    ScmService::new(git_adapter.clone(), git_adapter, ProviderOptions::default())
}

fn uri(root: &Path, path: &str) -> String {
    root.join(path).to_string_lossy().to_string()
}

fn group_uris(service: &ScmService, provider_id: &ProviderId, group_id: &str) -> Vec<String> {
    service
        .framework()
        .group(provider_id.as_str(), group_id)
        .map(|g| g.resource_states().iter().map(|s| s.uri.to_string()).collect())
        .unwrap_or_default()
}

/// The projection built from events must agree with the framework
fn assert_projection_matches(service: &ScmService) {
    let projection = service.projection();
    assert_eq!(projection.count, service.framework().count());
    for provider in service.framework().providers() {
        for group in provider.groups() {
            assert_eq!(
                projection.group(provider.id().as_str(), group.id()),
                group.resource_states(),
                "group {} of {}",
                group.id(),
                provider.id()
            );
        }
    }
}

fn drain(events: &mut mpsc::UnboundedReceiver<Event>) -> Vec<Event> {
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

#[tokio::test]
async fn test_refresh_stage_commit_and_log() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("repo");
    create_test_git_repo(&root)?;
    fs::write(root.join("README.md"), "# changed\n")?;
    fs::write(root.join("notes.txt"), "new\n")?;

    let (mut service, mut events, _commands) = new_service();
    let provider_id = service.register_repository(&root, None)?;
    service.register_history_provider(Box::new(GitHistory::new(provider_id.clone(), root.clone())));
    service.refresh(&provider_id).await?;

    assert_eq!(service.framework().count(), 2);
    assert_eq!(group_uris(&service, &provider_id, CHANGES_GROUP), vec![uri(&root, "README.md")]);
    assert_eq!(group_uris(&service, &provider_id, UNTRACKED_GROUP), vec![uri(&root, "notes.txt")]);
    assert_projection_matches(&service);

    assert_eq!(service.stage(&provider_id, &uri(&root, "README.md")), Transition::Moved);
    assert_eq!(service.stage(&provider_id, &uri(&root, "README.md")), Transition::Unchanged);
    assert_eq!(group_uris(&service, &provider_id, STAGED_GROUP), vec![uri(&root, "README.md")]);
    assert_eq!(service.framework().count(), 2);
    assert_projection_matches(&service);
    drain(&mut events);

    let commit_id = service
        .commit(&provider_id, "Update readme", CancellationToken::new())
        .await
        .expect("commit should succeed");

    let git_repo = git2::Repository::open(&root)?;
    let head = git_repo.head()?.peel_to_commit()?;
    assert_eq!(head.id().to_string(), commit_id.0);
    assert_eq!(head.summary(), Some("Update readme"));

    assert!(group_uris(&service, &provider_id, STAGED_GROUP).is_empty());
    assert_eq!(service.framework().count(), 1);
    assert!(!service.framework().provider(provider_id.as_str()).unwrap().is_committing());
    assert_eq!(service.projection().last_commit, Some((provider_id.clone(), commit_id.clone())));
    assert_projection_matches(&service);

    let commit_events: Vec<_> = drain(&mut events)
        .into_iter()
        .filter_map(|e| match e {
            Event::Commit(event) => Some(event),
            _ => None,
        })
        .collect();
    assert!(matches!(commit_events.first(), Some(CommitEvent::Started { .. })));
    assert!(matches!(commit_events.last(), Some(CommitEvent::Committed { .. })));

    let history = service.history(&provider_id, 10)?;
    let messages: Vec<_> = history.iter().map(|c| c.message.as_str()).collect();
    assert_eq!(messages, vec!["Update readme", "Initial commit"]);

    // A refresh after the commit agrees with what is left in the model
    service.refresh(&provider_id).await?;
    assert!(group_uris(&service, &provider_id, CHANGES_GROUP).is_empty());
    assert_eq!(group_uris(&service, &provider_id, UNTRACKED_GROUP), vec![uri(&root, "notes.txt")]);

    Ok(())
}

#[tokio::test]
async fn test_partially_staged_file_commits_index_version() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("repo");
    create_test_git_repo(&root)?;
    fs::write(root.join("README.md"), "staged\n")?;
    let git_repo = git2::Repository::open(&root)?;
    let mut index = git_repo.index()?;
    index.add_path(Path::new("README.md"))?;
    index.write()?;
    fs::write(root.join("README.md"), "unstaged\n")?;

    let (mut service, _events, _commands) = new_service();
    let provider_id = service.register_repository(&root, None)?;
    service.refresh(&provider_id).await?;
    let readme = uri(&root, "README.md");
    assert_eq!(group_uris(&service, &provider_id, STAGED_GROUP), vec![readme.clone()]);
    assert_eq!(group_uris(&service, &provider_id, CHANGES_GROUP), vec![readme.clone()]);

    service
        .commit(&provider_id, "Only staged", CancellationToken::new())
        .await
        .expect("commit should succeed");

    let tree = git_repo.head()?.peel_to_tree()?;
    let blob = git_repo.find_blob(tree.get_path(Path::new("README.md"))?.id())?;
    assert_eq!(blob.content(), b"staged\n");

    // The model and git agree that the working-tree edit is still pending
    assert_eq!(group_uris(&service, &provider_id, CHANGES_GROUP), vec![readme.clone()]);
    service.refresh(&provider_id).await?;
    assert!(group_uris(&service, &provider_id, STAGED_GROUP).is_empty());
    assert_eq!(group_uris(&service, &provider_id, CHANGES_GROUP), vec![readme]);

    Ok(())
}

#[tokio::test]
async fn test_commit_with_nothing_staged_is_reported() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("repo");
    create_test_git_repo(&root)?;
    fs::write(root.join("README.md"), "# changed\n")?;

    let (mut service, mut events, _commands) = new_service();
    let provider_id = service.register_repository(&root, None)?;
    service.refresh(&provider_id).await?;
    drain(&mut events);

    let result = service.commit(&provider_id, "Nothing here", CancellationToken::new()).await;

    assert!(result.is_none());
    let last_error = service.projection().last_error.clone().unwrap_or_default();
    assert!(last_error.contains("Nothing to commit"), "{}", last_error);
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, Event::Commit(CommitEvent::Failed { .. }))));

    let git_repo = git2::Repository::open(&root)?;
    assert_eq!(git_repo.head()?.peel_to_commit()?.summary(), Some("Initial commit"));
    assert_eq!(group_uris(&service, &provider_id, CHANGES_GROUP), vec![uri(&root, "README.md")]);

    Ok(())
}

#[tokio::test]
async fn test_cancelled_commit_leaves_state_untouched() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("repo");
    create_test_git_repo(&root)?;
    fs::write(root.join("README.md"), "# changed\n")?;

    let (mut service, _events, _commands) = new_service();
    let provider_id = service.register_repository(&root, None)?;
    service.refresh(&provider_id).await?;
    service.stage_all(&provider_id);

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert!(service.commit(&provider_id, "Cancelled", cancel).await.is_none());

    assert_eq!(group_uris(&service, &provider_id, STAGED_GROUP), vec![uri(&root, "README.md")]);
    assert!(!service.framework().provider(provider_id.as_str()).unwrap().is_committing());
    let git_repo = git2::Repository::open(&root)?;
    assert_eq!(git_repo.head()?.peel_to_commit()?.summary(), Some("Initial commit"));

    Ok(())
}

#[tokio::test]
async fn test_stale_references_are_swallowed() -> Result<()> {
    let (mut service, _events, _commands) = new_service();
    let unknown = ProviderId::from("/nowhere");

    assert_eq!(service.stage(&unknown, "/nowhere/a"), Transition::Unchanged);
    assert_eq!(service.unstage(&unknown, "/nowhere/a"), Transition::Unchanged);
    assert_eq!(service.stage_all(&unknown), 0);
    service.refresh(&unknown).await?;
    service.close_repository(&unknown);
    assert!(service.commit(&unknown, "msg", CancellationToken::new()).await.is_none());

    Ok(())
}

#[tokio::test]
async fn test_move_into_missing_group_is_unchanged() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("repo");
    create_test_git_repo(&root)?;
    fs::write(root.join("README.md"), "# changed\n")?;

    let (mut service, _events, _commands) = new_service();
    let provider_id = service.register_repository(&root, None)?;
    service.refresh(&provider_id).await?;

    let readme = uri(&root, "README.md");
    assert_eq!(
        service.move_resource(&provider_id, &readme, CHANGES_GROUP, "archived"),
        Transition::Unchanged
    );
    assert_eq!(group_uris(&service, &provider_id, CHANGES_GROUP), vec![readme]);

    Ok(())
}

#[tokio::test]
async fn test_discover_and_refresh_all() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let base = temp_dir.path().to_path_buf();
    for name in ["one", "two"] {
        create_test_git_repo(&base.join(name))?;
        fs::write(base.join(name).join("README.md"), format!("# {}\n", name))?;
    }
    fs::write(base.join("two").join("extra.txt"), "extra\n")?;

    let (mut service, _events, _commands) = new_service();
    let registered = service.discover(Arc::new(FsDiscoveryAdapter::new()), base.clone()).await?;
    assert_eq!(registered.len(), 2);

    // Discovering again registers nothing new
    let again = service.discover(Arc::new(FsDiscoveryAdapter::new()), base.clone()).await?;
    assert!(again.is_empty());

    service.refresh_all().await?;
    assert_eq!(service.framework().count(), 3);
    let labels: Vec<_> = service.framework().providers().map(|p| p.label().to_string()).collect();
    assert_eq!(labels, vec!["one", "two"]);
    assert_projection_matches(&service);

    service.close_repository(&registered[0]);
    assert_eq!(service.framework().count(), 2);
    assert_projection_matches(&service);
    assert!(!service.projection().providers.contains_key(registered[0].as_str()));

    Ok(())
}

#[tokio::test]
async fn test_hidden_untracked_files_are_not_counted() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("repo");
    create_test_git_repo(&root)?;
    fs::write(root.join("notes.txt"), "new\n")?;

    let git_adapter = Arc::new(GitAdapter::new());
    let options = ProviderOptions {
        show_untracked: false,
        ..ProviderOptions::default()
    };
    let (mut service, _events, _commands) = ScmService::new(git_adapter.clone(), git_adapter, options);
    let provider_id = service.register_repository(&root, None)?;
    service.refresh(&provider_id).await?;

    assert_eq!(service.framework().count(), 0);

    Ok(())
}

#[tokio::test]
async fn test_run_processes_commands_until_quit() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let root = temp_dir.path().join("repo");
    create_test_git_repo(&root)?;
    fs::write(root.join("README.md"), "# changed\n")?;
    let provider_id = ProviderId::from_path(&root);

    let (mut service, mut events, commands) = new_service();
    commands.send(Command::OpenRepository { root: root.clone(), label: Some("Repo".to_string()) })?;
    commands.send(Command::StageAll { provider_id: provider_id.clone() })?;
    commands.send(Command::SetInput {
        provider_id: provider_id.clone(),
        value: "From the input box".to_string(),
    })?;
    commands.send(Command::Commit { provider_id: provider_id.clone(), message: None })?;
    commands.send(Command::Quit)?;

    service.run().await?;

    let git_repo = git2::Repository::open(&root)?;
    assert_eq!(git_repo.head()?.peel_to_commit()?.summary(), Some("From the input box"));

    // Shutdown disposes every provider
    assert_eq!(service.framework().provider_count(), 0);
    assert!(drain(&mut events)
        .iter()
        .any(|e| matches!(e, Event::Commit(CommitEvent::Committed { .. }))));

    Ok(())
}
