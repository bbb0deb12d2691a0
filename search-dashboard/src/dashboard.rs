//! Dashboard driver
//!
//! A single tokio task owns the orchestrator, the form and the menus. Commands
//! arrive over an mpsc channel; backend calls run as spawned tasks and post
//! their completions back into the same loop tagged with the token they were
//! issued under. Every turn of the loop publishes a fresh
//! [`DashboardSnapshot`] on a watch channel.

use crate::backend::{DictionaryRepository, SearchBackend};
use crate::catalog::FetchGeneration;
use crate::error::{DashboardError, Result};
use crate::form::{FormChange, FormDraft, SearchForm};
use crate::menu::{MenuEvent, MenuOption, MenuState, SelectionMode};
use crate::model::{
    CriteriaDelta, DictionaryEntry, Operator, PageSize, Pagination, SearchCriteria, SearchResult, SourceDescriptor,
};
use crate::notification::Notification;
use crate::orchestrator::{ChangeOutcome, Phase, PendingQuery, QueryToken, SearchOrchestrator};
use crate::results::ResultViewState;
use crate::synonyms::{LookupToken, PendingLookup};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// User intents
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DashboardCommand {
    /// Stage a form edit
    Edit(FormChange),
    /// Commit the form draft
    Submit,
    /// Pick a source from the source menu
    SelectSource(String),
    /// Open the source menu, refreshing the catalog
    OpenSourceMenu,
    GoToPage(u32),
    SetPageSize(PageSize),
    ToggleSynonyms,
    Reset,
    Export,
    DismissNotification,
    Shutdown,
}

enum Completion {
    Sources(FetchGeneration, Result<Vec<SourceDescriptor>>),
    Query(QueryToken, Result<SearchResult>),
    Lookup(LookupToken, Result<Option<DictionaryEntry>>),
    Export(Result<Option<String>>),
}

/// Read-only view of the dashboard
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub phase: Phase,
    pub criteria: SearchCriteria,
    pub draft: FormDraft,
    pub view: ResultViewState,
    pub notification: Option<Notification>,
    pub operator_visible: bool,
    pub suggestions: Vec<String>,
    pub synonyms_expanded: bool,
    pub source_menu: MenuState,
    pub operator_menu: MenuState,
    pub freshness: String,
    pub querying_enabled: bool,
    pub disposed: bool,
}

/// Cloneable handle to a running dashboard
#[derive(Clone)]
pub struct DashboardHandle {
    commands: mpsc::Sender<DashboardCommand>,
    snapshots: watch::Receiver<DashboardSnapshot>,
}

impl DashboardHandle {
    pub async fn send(&self, command: DashboardCommand) -> Result<()> {
        self.commands.send(command).await.map_err(|_| DashboardError::Closed)
    }

    /// Stage a phrase edit and submit it
    pub async fn search(&self, phrase: impl Into<String>) -> Result<()> {
        self.send(DashboardCommand::Edit(FormChange::Phrase(phrase.into()))).await?;
        self.send(DashboardCommand::Submit).await
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(DashboardCommand::Shutdown).await
    }

    /// Latest published snapshot
    pub fn snapshot(&self) -> DashboardSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Wait until a snapshot satisfies `predicate`
    pub async fn wait_for<F>(&self, predicate: F) -> Result<DashboardSnapshot>
    where
        F: FnMut(&DashboardSnapshot) -> bool,
    {
        let mut receiver = self.snapshots.clone();
        let snapshot = receiver
            .wait_for(predicate)
            .await
            .map_err(|_| DashboardError::Closed)?
            .clone();
        Ok(snapshot)
    }
}

pub struct Dashboard {
    orchestrator: SearchOrchestrator,
    form: SearchForm,
    source_menu: MenuState,
    operator_menu: MenuState,
    search: Arc<dyn SearchBackend>,
    dictionary: Arc<dyn DictionaryRepository>,
    commands: mpsc::Receiver<DashboardCommand>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    snapshots: watch::Sender<DashboardSnapshot>,
}

impl Dashboard {
    /// Start the driver task. It mounts immediately and runs until
    /// [`DashboardCommand::Shutdown`] or until every handle is dropped.
    pub fn spawn(
        search: Arc<dyn SearchBackend>,
        dictionary: Arc<dyn DictionaryRepository>,
        page_size: PageSize,
    ) -> (DashboardHandle, JoinHandle<()>) {
        let (commands_tx, commands) = mpsc::channel(64);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();

        let operator_options = Operator::ALL
            .iter()
            .map(|op| MenuOption::new(op.as_str(), op.as_str()))
            .collect();

        let mut operator_menu = MenuState::new_static(SelectionMode::Radio, operator_options);
        operator_menu.preselect(Operator::default().as_str());

        let (snapshots, snapshot_rx) = watch::channel(Self::empty_snapshot());

        let dashboard = Self {
            orchestrator: SearchOrchestrator::with_page_size(page_size),
            form: SearchForm::new(),
            source_menu: MenuState::new_dynamic(SelectionMode::Radio),
            operator_menu,
            search,
            dictionary,
            commands,
            completions_tx,
            completions_rx,
            snapshots,
        };

        let handle = DashboardHandle {
            commands: commands_tx,
            snapshots: snapshot_rx,
        };
        let task = tokio::spawn(dashboard.run());
        (handle, task)
    }

    fn empty_snapshot() -> DashboardSnapshot {
        DashboardSnapshot {
            phase: Phase::Idle,
            criteria: SearchCriteria::default(),
            draft: FormDraft::default(),
            view: ResultViewState::default(),
            notification: None,
            operator_visible: false,
            suggestions: Vec::new(),
            synonyms_expanded: false,
            source_menu: MenuState::new_dynamic(SelectionMode::Radio),
            operator_menu: MenuState::new_static(SelectionMode::Radio, Vec::new()),
            freshness: String::new(),
            querying_enabled: false,
            disposed: false,
        }
    }

    async fn run(mut self) {
        info!("Dashboard started");
        if let Some(generation) = self.orchestrator.mount() {
            self.source_menu.open();
            self.spawn_sources(generation);
        }
        self.publish();

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(DashboardCommand::Shutdown) | None => break,
                    Some(command) => self.handle_command(command),
                },
                Some(completion) = self.completions_rx.recv() => self.handle_completion(completion),
            }
            self.publish();
        }

        self.orchestrator.dispose();
        self.publish();
        info!("Dashboard stopped");
    }

    fn handle_command(&mut self, command: DashboardCommand) {
        debug!("Dashboard command: {:?}", command);
        match command {
            DashboardCommand::Edit(change) => {
                self.form
                    .edit(change, self.orchestrator.criteria(), self.orchestrator.resolver());
                self.operator_menu.preselect(self.form.draft().operator.as_str());
            }
            DashboardCommand::Submit => {
                let outcome = self.orchestrator.apply_change(self.form.handle_submit());
                self.dispatch(outcome);
                self.sync_form();
            }
            DashboardCommand::SelectSource(id) => match self.source_menu.click(&id) {
                MenuEvent::Selected(option) => {
                    let outcome = self
                        .orchestrator
                        .apply_change(CriteriaDelta::new().with_source(option.value));
                    self.dispatch(outcome);
                }
                _ => debug!("Source selection '{}' left unchanged", id),
            },
            DashboardCommand::OpenSourceMenu => {
                if self.source_menu.open() {
                    let generation = self.orchestrator.reopen_sources();
                    self.spawn_sources(generation);
                }
            }
            DashboardCommand::GoToPage(page) => {
                let size = self.orchestrator.criteria().pagination.page_size;
                let outcome = self
                    .orchestrator
                    .apply_change(CriteriaDelta::new().with_pagination(Pagination::new(page, size)));
                self.dispatch(outcome);
            }
            DashboardCommand::SetPageSize(size) => {
                let outcome = self
                    .orchestrator
                    .apply_change(CriteriaDelta::new().with_pagination(Pagination::new(0, size)));
                self.dispatch(outcome);
            }
            DashboardCommand::ToggleSynonyms => match self.orchestrator.toggle_synonyms() {
                Ok(outcome) => {
                    self.dispatch(outcome);
                    self.form
                        .refresh(self.orchestrator.criteria(), self.orchestrator.resolver());
                }
                Err(e) => warn!("Cannot toggle synonyms: {}", e),
            },
            DashboardCommand::Reset => {
                let outcome = self.orchestrator.reset();
                self.dispatch(outcome);
                self.sync_form();
            }
            DashboardCommand::Export => match self.orchestrator.export_request() {
                Some(request) => {
                    let backend = Arc::clone(&self.search);
                    let tx = self.completions_tx.clone();
                    tokio::spawn(async move {
                        let result = backend.export(request).await;
                        let _ = tx.send(Completion::Export(result));
                    });
                }
                None => warn!("Export requested without a selected source"),
            },
            DashboardCommand::DismissNotification => self.orchestrator.dismiss_notification(),
            DashboardCommand::Shutdown => {}
        }
    }

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Sources(generation, result) => {
                let latest = self.orchestrator.catalog().is_latest(generation);
                let failed = result.is_err();
                let outcome = self.orchestrator.merge_sources(generation, result);

                if latest {
                    if failed && !self.orchestrator.catalog().is_loaded() {
                        self.source_menu.fetch_failed();
                    } else {
                        self.source_menu.options_fetched(self.orchestrator.catalog().options());
                    }
                    if let Some(id) = self.orchestrator.criteria().source_id() {
                        self.source_menu.preselect(id);
                    }
                }
                self.dispatch(outcome);
            }
            Completion::Query(token, result) => {
                self.orchestrator.merge_query(token, result);
                self.form
                    .refresh(self.orchestrator.criteria(), self.orchestrator.resolver());
            }
            Completion::Lookup(token, result) => {
                self.orchestrator.merge_lookup(token, result);
                self.form
                    .refresh(self.orchestrator.criteria(), self.orchestrator.resolver());
            }
            Completion::Export(result) => self.orchestrator.merge_export(result),
        }
    }

    fn sync_form(&mut self) {
        self.form
            .sync_from(self.orchestrator.criteria(), self.orchestrator.resolver());
        self.operator_menu.preselect(self.form.draft().operator.as_str());
    }

    fn dispatch(&self, outcome: ChangeOutcome) {
        if let Some(query) = outcome.query {
            self.spawn_query(query);
        }
        if let Some(lookup) = outcome.lookup {
            self.spawn_lookup(lookup);
        }
    }

    fn spawn_sources(&self, generation: FetchGeneration) {
        let backend = Arc::clone(&self.search);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = backend.fetch_sources().await;
            let _ = tx.send(Completion::Sources(generation, result));
        });
    }

    fn spawn_query(&self, query: PendingQuery) {
        let backend = Arc::clone(&self.search);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = backend.search(query.request).await;
            let _ = tx.send(Completion::Query(query.token, result));
        });
    }

    fn spawn_lookup(&self, lookup: PendingLookup) {
        let repository = Arc::clone(&self.dictionary);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = repository.lookup(&lookup.keyword).await;
            let _ = tx.send(Completion::Lookup(lookup.token, result));
        });
    }

    fn snapshot(&self) -> DashboardSnapshot {
        let orchestrator = &self.orchestrator;
        DashboardSnapshot {
            phase: orchestrator.phase(),
            criteria: orchestrator.criteria().clone(),
            draft: self.form.draft().clone(),
            view: orchestrator.view().clone(),
            notification: orchestrator.notification().cloned(),
            operator_visible: self.form.operator_visible(),
            suggestions: orchestrator.resolver().suggestions().to_vec(),
            synonyms_expanded: orchestrator.resolver().expansion_requested(),
            source_menu: self.source_menu.clone(),
            operator_menu: self.operator_menu.clone(),
            freshness: orchestrator.freshness_label(),
            querying_enabled: orchestrator.is_querying_enabled(),
            disposed: orchestrator.is_disposed(),
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.snapshot());
    }
}
