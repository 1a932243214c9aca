use anyhow::{Context, Result};
use mercury_scm_core::app::{Command, ReadProjection};
use mercury_scm_core::domain::{
    subject_length_validator, Commit, CommitId, Event, ProviderId, StatusSnapshot,
    DEFAULT_GROUPS,
};
use mercury_scm_core::ports::{CommitBackend, DiscoverReq, DiscoveryPort, HistoryProvider, StatusSource};
use mercury_scm_core::{CancellationToken, ScmError, ScmFramework, Transition};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::adapters::repository_label;
use crate::config::Config;

/// Provider-level settings applied when a repository is registered
#[derive(Debug, Clone)]
pub struct ProviderOptions {
    pub input_placeholder: String,
    pub max_subject_length: Option<usize>,
    pub hide_empty_groups: bool,
    pub show_untracked: bool,
}

impl Default for ProviderOptions {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

impl From<&Config> for ProviderOptions {
    fn from(config: &Config) -> Self {
        Self {
            input_placeholder: config.commit.input_placeholder.clone(),
            max_subject_length: config.commit.max_subject_length,
            hide_empty_groups: config.ui.hide_empty_groups,
            show_untracked: config.ui.show_untracked,
        }
    }
}

/// Owns the source control framework and drives it from the Git ports.
///
/// Every framework notification is queued on an internal channel, folded
/// into the read projection and forwarded to the external receiver handed
/// out by [`ScmService::new`]. Bookkeeping misses (unknown provider or group)
/// are logged and swallowed; commit failures reach callers as events.
pub struct ScmService {
    framework: ScmFramework,

    // Ports (dependency injection)
    status_source: Arc<dyn StatusSource>,
    commit_backend: Arc<dyn CommitBackend>,

    options: ProviderOptions,

    // Event bus
    event_tx: mpsc::UnboundedSender<Event>,
    event_rx: mpsc::UnboundedReceiver<Event>,

    // External event sender (for the UI layer)
    event_tx_external: mpsc::UnboundedSender<Event>,

    // Command receiver
    command_rx: mpsc::UnboundedReceiver<Command>,

    // Read projection for queries
    projection: ReadProjection,
}

impl ScmService {
    pub fn new(
        status_source: Arc<dyn StatusSource>,
        commit_backend: Arc<dyn CommitBackend>,
        options: ProviderOptions,
    ) -> (Self, mpsc::UnboundedReceiver<Event>, mpsc::UnboundedSender<Command>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (event_tx_external, event_rx_external) = mpsc::unbounded_channel();
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let mut framework = ScmFramework::new();
        Self::forward_events(&mut framework, &event_tx);

        let service = Self {
            framework,
            status_source,
            commit_backend,
            options,
            event_tx,
            event_rx,
            event_tx_external,
            command_rx,
            projection: ReadProjection::default(),
        };

        (service, event_rx_external, command_tx)
    }

    /// Subscribe to every notification kind and queue it on the event bus
    fn forward_events(framework: &mut ScmFramework, event_tx: &mpsc::UnboundedSender<Event>) {
        let tx = event_tx.clone();
        framework.on_count_changed(move |e| {
            let _ = tx.send(Event::Count(*e));
        });
        let tx = event_tx.clone();
        framework.on_group_changed(move |e| {
            let _ = tx.send(Event::Group(e.clone()));
        });
        let tx = event_tx.clone();
        framework.on_transition(move |e| {
            let _ = tx.send(Event::Transition(e.clone()));
        });
        let tx = event_tx.clone();
        framework.on_commit(move |e| {
            let _ = tx.send(Event::Commit(e.clone()));
        });
        let tx = event_tx.clone();
        framework.on_provider(move |e| {
            let _ = tx.send(Event::Provider(e.clone()));
        });
        let tx = event_tx.clone();
        framework.on_command_requested(move |e| {
            let _ = tx.send(Event::Command(e.clone()));
        });
    }

    /// Read-only access to the framework state
    pub fn framework(&self) -> &ScmFramework {
        &self.framework
    }

    /// Get the current read projection (for UI queries)
    pub fn projection(&self) -> &ReadProjection {
        &self.projection
    }

    /// Fold queued events into the projection and forward them
    fn pump_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            match &event {
                Event::Count(changed) => debug!("Pending change count is now {}", changed.count),
                Event::Error { provider_id, msg } => match provider_id {
                    Some(id) => error!("Source control error for {}: {}", id, msg),
                    None => error!("Source control error: {}", msg),
                },
                _ => {}
            }
            self.projection.apply(&event);
            let _ = self.event_tx_external.send(event);
        }
    }

    /// Log and drop bookkeeping misses; other errors pass through
    fn swallow_not_found<T: Default>(&self, result: std::result::Result<T, ScmError>) -> std::result::Result<T, ScmError> {
        match result {
            Err(err) if err.is_not_found() => {
                debug!("Ignoring stale reference: {}", err);
                Ok(T::default())
            }
            other => other,
        }
    }

    /// Register a repository as a provider with the default Git groups
    pub fn register_repository(&mut self, root: &Path, label: Option<String>) -> Result<ProviderId> {
        let provider_id = ProviderId::from_path(root);
        let label = label.unwrap_or_else(|| repository_label(root));

        self.framework
            .create_provider(provider_id.clone(), label, Some(root.to_path_buf()))
            .with_context(|| format!("Failed to register {}", root.display()))?;
        self.framework.ensure_default_groups(provider_id.as_str())?;

        let id = provider_id.as_str();
        self.framework
            .set_input_placeholder(id, self.options.input_placeholder.clone())?;
        self.framework
            .set_input_validator(id, self.options.max_subject_length.map(subject_length_validator))?;
        if self.options.hide_empty_groups {
            for (group_id, _) in DEFAULT_GROUPS {
                self.framework.set_hide_when_empty(id, group_id, true)?;
            }
        }

        info!("Registered repository {}", root.display());
        self.pump_events();
        Ok(provider_id)
    }

    /// Attach a history provider to its provider
    pub fn register_history_provider(&mut self, history: Box<dyn HistoryProvider>) {
        debug!("Registering history provider {}", history.id());
        self.framework.register_history_provider(history);
    }

    /// Register every repository found below `base`
    pub async fn discover(&mut self, discovery: Arc<dyn DiscoveryPort>, base: PathBuf) -> Result<Vec<ProviderId>> {
        info!("Discovering repositories in {}", base.display());
        let roots = tokio::task::spawn_blocking(move || discovery.scan(DiscoverReq { base }))
            .await
            .context("Discovery task failed")??;

        let mut registered = Vec::new();
        for root in roots {
            if self.framework.provider(ProviderId::from_path(&root).as_str()).is_some() {
                debug!("Repository {} is already registered", root.display());
                continue;
            }
            registered.push(self.register_repository(&root, None)?);
        }
        Ok(registered)
    }

    fn apply_snapshot(&mut self, provider_id: &ProviderId, mut snapshot: StatusSnapshot) {
        if !self.options.show_untracked {
            snapshot.untracked.clear();
        }
        let result = self.framework.apply_status_snapshot(provider_id.as_str(), &snapshot);
        if let Err(err) = self.swallow_not_found(result) {
            warn!("Failed to apply status for {}: {}", provider_id, err);
        }
    }

    fn report_error(&mut self, provider_id: Option<ProviderId>, msg: String) {
        let _ = self.event_tx.send(Event::Error { provider_id, msg });
    }

    /// Re-read git status for one provider
    pub async fn refresh(&mut self, provider_id: &ProviderId) -> Result<()> {
        let Some(root) = self
            .framework
            .provider(provider_id.as_str())
            .and_then(|p| p.root_path())
            .map(Path::to_path_buf)
        else {
            debug!("Refresh skipped for unknown provider {}", provider_id);
            return Ok(());
        };

        let status_source = self.status_source.clone();
        let result = tokio::task::spawn_blocking(move || status_source.snapshot(&root)).await;

        match result {
            Ok(Ok(snapshot)) => self.apply_snapshot(provider_id, snapshot),
            Ok(Err(e)) => {
                error!("Failed to get status for {}: {:#}", provider_id, e);
                self.report_error(Some(provider_id.clone()), format!("Status update failed: {:#}", e));
            }
            Err(e) => {
                error!("Status task panicked for {}: {}", provider_id, e);
                self.report_error(Some(provider_id.clone()), format!("Status task failed: {}", e));
            }
        }

        self.pump_events();
        Ok(())
    }

    /// Re-read git status for every provider, reading repositories in parallel
    pub async fn refresh_all(&mut self) -> Result<()> {
        let targets: Vec<(ProviderId, PathBuf)> = self
            .framework
            .providers()
            .filter_map(|p| p.root_path().map(|root| (p.id().clone(), root.to_path_buf())))
            .collect();
        info!("Refreshing status for {} repositories", targets.len());

        let status_source = self.status_source.clone();
        let results = tokio::task::spawn_blocking(move || {
            targets
                .into_par_iter()
                .map(|(id, root)| {
                    let snapshot = status_source.snapshot(&root);
                    (id, snapshot)
                })
                .collect::<Vec<_>>()
        })
        .await
        .context("Status refresh task failed")?;

        for (provider_id, snapshot) in results {
            match snapshot {
                Ok(snapshot) => self.apply_snapshot(&provider_id, snapshot),
                Err(e) => {
                    error!("Failed to get status for {}: {:#}", provider_id, e);
                    self.report_error(Some(provider_id), format!("Status update failed: {:#}", e));
                }
            }
        }

        self.pump_events();
        Ok(())
    }

    pub fn stage(&mut self, provider_id: &ProviderId, uri: &str) -> Transition {
        let result = self.framework.stage(provider_id.as_str(), uri);
        let transition = self.transition_outcome(provider_id, result);
        self.pump_events();
        transition
    }

    pub fn unstage(&mut self, provider_id: &ProviderId, uri: &str) -> Transition {
        let result = self.framework.unstage(provider_id.as_str(), uri);
        let transition = self.transition_outcome(provider_id, result);
        self.pump_events();
        transition
    }

    /// Move a resource between arbitrary groups (e.g. stage an untracked file)
    pub fn move_resource(&mut self, provider_id: &ProviderId, uri: &str, from: &str, to: &str) -> Transition {
        let result = self.framework.move_resource(provider_id.as_str(), uri, from, to);
        let transition = self.transition_outcome(provider_id, result);
        self.pump_events();
        transition
    }

    pub fn stage_all(&mut self, provider_id: &ProviderId) -> usize {
        let result = self.framework.stage_all(provider_id.as_str());
        let moved = match self.swallow_not_found(result) {
            Ok(moved) => moved,
            Err(err) => {
                warn!("Stage all failed for {}: {}", provider_id, err);
                0
            }
        };
        self.pump_events();
        moved
    }

    fn transition_outcome(
        &self,
        provider_id: &ProviderId,
        result: std::result::Result<Transition, ScmError>,
    ) -> Transition {
        match self.swallow_not_found(result) {
            Ok(transition) => transition,
            Err(err) => {
                warn!("Transition failed for {}: {}", provider_id, err);
                Transition::Unchanged
            }
        }
    }

    pub fn set_input(&mut self, provider_id: &ProviderId, value: &str) {
        let result = self.framework.set_input_value(provider_id.as_str(), value);
        if let Err(err) = self.swallow_not_found(result) {
            warn!("Failed to set input for {}: {}", provider_id, err);
        }
    }

    /// Commit the staged group of a provider.
    ///
    /// The git operation runs on the blocking pool between `begin_commit` and
    /// `finish_commit`. Failures are reported through `CommitEvent::Failed`
    /// and yield `None`.
    pub async fn commit(
        &mut self,
        provider_id: &ProviderId,
        message: &str,
        cancel: CancellationToken,
    ) -> Option<CommitId> {
        let ticket = match self.framework.begin_commit(provider_id.as_str(), message, cancel) {
            Ok(ticket) => ticket,
            Err(err) => {
                warn!("Commit rejected for {}: {}", provider_id, err);
                self.pump_events();
                return None;
            }
        };
        self.pump_events();
        info!("Committing {} resources in {}", ticket.staged().len(), provider_id);

        if ticket.is_cancelled() {
            let err = self.framework.abort_commit(ticket);
            warn!("{}", err);
            self.pump_events();
            return None;
        }

        let backend = self.commit_backend.clone();
        let root = ticket.root_path().map(Path::to_path_buf);
        let message_owned = ticket.message().to_string();
        let staged = ticket.staged().to_vec();
        let outcome = tokio::task::spawn_blocking(move || {
            backend.commit(root.as_deref(), &message_owned, &staged)
        })
        .await
        .unwrap_or_else(|e| Err(anyhow::anyhow!("Commit task failed: {}", e)));

        let result = self.framework.finish_commit(ticket, outcome);
        self.pump_events();
        match result {
            Ok(commit_id) => {
                info!("Committed {} as {}", provider_id, commit_id.short());
                Some(commit_id)
            }
            Err(err) => {
                error!("Commit failed for {}: {}", provider_id, err);
                None
            }
        }
    }

    /// Commit using the provider's input box value
    pub async fn commit_input(&mut self, provider_id: &ProviderId, cancel: CancellationToken) -> Option<CommitId> {
        let message = self
            .framework
            .provider(provider_id.as_str())
            .map(|p| p.input_box().value().to_string())
            .unwrap_or_default();
        self.commit(provider_id, &message, cancel).await
    }

    pub fn history(&self, provider_id: &ProviderId, limit: usize) -> Result<Vec<Commit>> {
        self.framework
            .history(provider_id.as_str(), limit)
            .with_context(|| format!("Failed to read history for {}", provider_id))
    }

    pub fn close_repository(&mut self, provider_id: &ProviderId) {
        let result = self.framework.dispose_provider(provider_id.as_str()).map(|_| ());
        if let Err(err) = self.swallow_not_found(result) {
            warn!("Failed to close {}: {}", provider_id, err);
        }
        self.pump_events();
    }

    /// Handle a command (CQRS Command side). Returns false once asked to quit.
    pub async fn handle_command(&mut self, cmd: Command) -> Result<bool> {
        match cmd {
            Command::OpenRepository { root, label } => {
                let provider_id = self.register_repository(&root, label)?;
                self.refresh(&provider_id).await?;
            }
            Command::Refresh { provider_id: Some(id) } => self.refresh(&id).await?,
            Command::Refresh { provider_id: None } => self.refresh_all().await?,
            Command::Stage { provider_id, uri } => {
                self.stage(&provider_id, &uri);
            }
            Command::Unstage { provider_id, uri } => {
                self.unstage(&provider_id, &uri);
            }
            Command::StageAll { provider_id } => {
                self.stage_all(&provider_id);
            }
            Command::SetInput { provider_id, value } => self.set_input(&provider_id, &value),
            Command::Commit { provider_id, message } => {
                let cancel = CancellationToken::new();
                match message {
                    Some(message) => self.commit(&provider_id, &message, cancel).await,
                    None => self.commit_input(&provider_id, cancel).await,
                };
            }
            Command::CloseRepository { provider_id } => self.close_repository(&provider_id),
            Command::Quit => {
                info!("Quit command received");
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Process commands until `Quit` or until every command sender is dropped
    pub async fn run(&mut self) -> Result<()> {
        info!("Starting source control service");
        while let Some(cmd) = self.command_rx.recv().await {
            match self.handle_command(cmd).await {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => error!("Error handling command: {:#}", e),
            }
        }
        self.shutdown();
        Ok(())
    }

    /// Dispose every provider and history provider
    pub fn shutdown(&mut self) {
        info!("Disposing source control providers");
        self.framework.dispose_all();
        self.pump_events();
    }
}
