use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;
use curator_core::{
    update, AppState, AppViewModel, CollectionId, CompanyId, Effect, Failure, JobId, Msg,
    TransferSelection,
};
use curator_logging::{curator_debug, curator_info, curator_warn};
use futures_util::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::{Gateway, GatewayError, GatewaySettings, HttpGateway, SessionError, SessionSettings};

pub type RefreshCallback = Arc<dyn Fn() + Send + Sync>;

/// Floor for the poll period; `tokio::time::interval` rejects zero.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Async front door over the core state machine.
///
/// Every public operation dispatches a [`Msg`] into [`update`] under the state
/// lock, releases the lock, and then runs the returned effects against the
/// [`Gateway`]. Results come back as further messages. While any transfer job
/// is active a single background task polls the server.
pub struct Session {
    inner: Arc<Inner>,
}

struct Inner {
    state: Mutex<AppState>,
    gateway: Arc<dyn Gateway>,
    settings: SessionSettings,
    refresh_callbacks: Mutex<Vec<RefreshCallback>>,
    poller: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
    revision: watch::Sender<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Outcome {
    JobStarted(JobId),
    CollectionCreated(CollectionId),
    CompaniesRemoved(u64),
}

/// What running one effect produced.
#[derive(Default)]
struct Step {
    follow_ups: Vec<Msg>,
    effects: Vec<Effect>,
    outcome: Option<Outcome>,
    error: Option<SessionError>,
}

impl Step {
    fn follow(msg: Msg) -> Self {
        Self {
            follow_ups: vec![msg],
            ..Self::default()
        }
    }

    fn failed(msg: Msg, error: SessionError) -> Self {
        Self {
            follow_ups: vec![msg],
            error: Some(error),
            ..Self::default()
        }
    }
}

#[derive(Default)]
struct Report {
    outcomes: Vec<Outcome>,
    errors: Vec<SessionError>,
}

impl Report {
    fn check(self) -> Result<(), SessionError> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The first matching outcome wins over errors raised by follow-up work.
    fn into_outcome<T>(
        self,
        what: &'static str,
        pick: impl Fn(&Outcome) -> Option<T>,
    ) -> Result<T, SessionError> {
        if let Some(value) = self.outcomes.iter().find_map(pick) {
            return Ok(value);
        }
        Err(self
            .errors
            .into_iter()
            .next()
            .unwrap_or(SessionError::NoOutcome(what)))
    }
}

impl Session {
    pub fn new(gateway: Arc<dyn Gateway>, settings: SessionSettings) -> Self {
        let state = AppState::with_config(settings.core_config());
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(state),
                gateway,
                settings,
                refresh_callbacks: Mutex::new(Vec::new()),
                poller: Mutex::new(None),
                shutdown: CancellationToken::new(),
                revision,
            }),
        }
    }

    /// Session over the HTTP gateway.
    pub fn connect(
        gateway: GatewaySettings,
        settings: SessionSettings,
    ) -> Result<Self, GatewayError> {
        let gateway = HttpGateway::new(gateway)?;
        Ok(Self::new(Arc::new(gateway), settings))
    }

    pub fn settings(&self) -> &SessionSettings {
        &self.inner.settings
    }

    /// Called once per completed transfer job, before collections reload.
    pub fn on_refresh(&self, callback: impl Fn() + Send + Sync + 'static) {
        lock(&self.inner.refresh_callbacks).push(Arc::new(callback));
    }

    pub fn view(&self) -> AppViewModel {
        self.inner.lock_state().view()
    }

    pub fn with_state<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.inner.lock_state())
    }

    /// Receiver bumped every time the state changes.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    pub async fn load_collections(&self) -> Result<(), SessionError> {
        self.inner.run(Msg::CollectionsRequested).await.check()
    }

    pub async fn select_collection(&self, id: CollectionId) -> Result<(), SessionError> {
        self.inner.run(Msg::CollectionSelected(id)).await.check()
    }

    pub async fn set_page(&self, page: u64) -> Result<(), SessionError> {
        self.inner.run(Msg::PageRequested(page)).await.check()
    }

    pub async fn next_page(&self) -> Result<(), SessionError> {
        self.inner.run(Msg::NextPage).await.check()
    }

    pub async fn previous_page(&self) -> Result<(), SessionError> {
        self.inner.run(Msg::PreviousPage).await.check()
    }

    pub async fn set_search_term(&self, term: impl Into<String>) -> Result<(), SessionError> {
        self.inner.run(Msg::SearchChanged(term.into())).await.check()
    }

    pub fn select_all(&self) {
        self.inner.dispatch(Msg::SelectAll);
    }

    pub fn select_none(&self) {
        self.inner.dispatch(Msg::SelectNone);
    }

    pub fn toggle_selected(&self, company_id: CompanyId) {
        self.inner.dispatch(Msg::SelectionToggled(company_id));
    }

    /// Flips `liked` locally, then confirms with the server. On failure the
    /// previous value is restored and the error is returned.
    pub async fn toggle_favorite(
        &self,
        company_id: CompanyId,
        liked: bool,
    ) -> Result<(), SessionError> {
        self.inner
            .run(Msg::FavoriteToggled { company_id, liked })
            .await
            .check()
    }

    pub async fn transfer(
        &self,
        target: CollectionId,
        selection: TransferSelection,
    ) -> Result<JobId, SessionError> {
        self.inner
            .run(Msg::TransferRequested { target, selection })
            .await
            .into_outcome("transfer", job_started)
    }

    pub async fn transfer_selected(&self, target: CollectionId) -> Result<JobId, SessionError> {
        self.inner
            .run(Msg::TransferSelectedRequested { target })
            .await
            .into_outcome("transfer", job_started)
    }

    pub async fn create_collection(
        &self,
        name: impl Into<String>,
    ) -> Result<CollectionId, SessionError> {
        self.inner
            .run(Msg::CreateCollectionRequested(name.into()))
            .await
            .into_outcome("create collection", |outcome| match outcome {
                Outcome::CollectionCreated(id) => Some(id.clone()),
                _ => None,
            })
    }

    pub async fn delete_collection(&self, id: CollectionId) -> Result<(), SessionError> {
        self.inner.run(Msg::DeleteCollectionRequested(id)).await.check()
    }

    pub async fn remove_companies(&self, company_ids: Vec<CompanyId>) -> Result<u64, SessionError> {
        self.inner
            .run(Msg::RemoveCompaniesRequested(company_ids))
            .await
            .into_outcome("remove companies", companies_removed)
    }

    pub async fn remove_selected(&self) -> Result<u64, SessionError> {
        self.inner
            .run(Msg::RemoveSelectedRequested)
            .await
            .into_outcome("remove companies", companies_removed)
    }

    pub fn dismiss_job(&self, job_id: JobId) {
        self.inner.dispatch(Msg::JobDismissed(job_id));
    }

    pub fn dismiss_notification(&self, id: u64) {
        self.inner.dispatch(Msg::NotificationDismissed(id));
    }

    /// Resolves once no polling task is running.
    pub async fn wait_for_jobs(&self) {
        loop {
            let handle = lock(&self.inner.poller).take();
            let Some(handle) = handle else {
                return;
            };
            if let Err(err) = handle.await {
                curator_warn!("Polling task ended abnormally: {}", err);
            }
            // A job started meanwhile may have spawned a fresh poller.
            if !self.inner.lock_state().is_polling() || self.inner.shutdown.is_cancelled() {
                return;
            }
        }
    }

    /// Stops the polling task and waits for it to exit.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        let handle = lock(&self.inner.poller).take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.inner.shutdown.cancel();
    }
}

fn job_started(outcome: &Outcome) -> Option<JobId> {
    match outcome {
        Outcome::JobStarted(id) => Some(id.clone()),
        _ => None,
    }
}

fn companies_removed(outcome: &Outcome) -> Option<u64> {
    match outcome {
        Outcome::CompaniesRemoved(count) => Some(*count),
        _ => None,
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Inner {
    fn lock_state(&self) -> MutexGuard<'_, AppState> {
        lock(&self.state)
    }

    /// Runs one message through the core. The lock is released before return.
    fn dispatch(&self, msg: Msg) -> Vec<Effect> {
        let (effects, changed) = {
            let mut guard = self.lock_state();
            let state = std::mem::take(&mut *guard);
            let (mut state, effects) = update(state, msg, Utc::now());
            let changed = state.consume_dirty();
            *guard = state;
            (effects, changed)
        };
        if changed {
            self.revision.send_modify(|revision| *revision += 1);
        }
        effects
    }

    async fn run(self: &Arc<Self>, msg: Msg) -> Report {
        let effects = self.dispatch(msg);
        self.drive(effects).await
    }

    /// Executes effects until none are left, feeding results back in.
    async fn drive(self: &Arc<Self>, effects: Vec<Effect>) -> Report {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut report = Report::default();
        while let Some(effect) = queue.pop_front() {
            let step = self.execute(effect).await;
            queue.extend(step.effects);
            for msg in step.follow_ups {
                queue.extend(self.dispatch(msg));
            }
            if let Some(outcome) = step.outcome {
                report.outcomes.push(outcome);
            }
            if let Some(err) = step.error {
                report.errors.push(err);
            }
        }
        report
    }

    async fn execute(self: &Arc<Self>, effect: Effect) -> Step {
        match effect {
            Effect::LoadCollections => match self.gateway.list_collections().await {
                Ok(collections) => Step::follow(Msg::CollectionsLoaded(collections)),
                Err(err) => {
                    curator_warn!("Loading collections failed: {}", err);
                    Step::failed(
                        Msg::CollectionsLoadFailed(err.user_message()),
                        SessionError::Fetch(err),
                    )
                }
            },
            Effect::FetchPage(request) => {
                let result = self
                    .gateway
                    .get_page(&request.collection_id, request.offset, request.limit)
                    .await;
                match result {
                    Ok(page) => Step::follow(Msg::PageLoaded {
                        generation: request.generation,
                        page,
                    }),
                    Err(err) => {
                        curator_warn!(
                            "Fetching {} at offset {} failed: {}",
                            request.collection_id,
                            request.offset,
                            err
                        );
                        Step::failed(
                            Msg::PageLoadFailed {
                                generation: request.generation,
                                message: err.user_message(),
                            },
                            SessionError::Fetch(err),
                        )
                    }
                }
            }
            Effect::ToggleFavorite {
                ticket,
                favorites_list_id,
                company_id,
                liked,
            } => match self
                .gateway
                .toggle_favorite(&favorites_list_id, company_id, liked)
                .await
            {
                Ok(_) => Step::follow(Msg::FavoriteConfirmed { ticket }),
                Err(err) => Step::failed(
                    Msg::FavoriteRejected {
                        ticket,
                        message: err.user_message(),
                    },
                    SessionError::Mutation {
                        company_id,
                        source: err,
                    },
                ),
            },
            Effect::StartTransfer(request) => match self.gateway.start_transfer(&request).await {
                Ok(job_id) => {
                    curator_info!("Transfer job {} started", job_id);
                    Step {
                        outcome: Some(Outcome::JobStarted(job_id.clone())),
                        ..Step::follow(Msg::TransferStarted { job_id, request })
                    }
                }
                Err(err) => Step::failed(
                    Msg::TransferStartFailed {
                        message: err.user_message(),
                    },
                    SessionError::TransferStart(err),
                ),
            },
            Effect::StartPolling => {
                self.spawn_poller();
                Step::default()
            }
            Effect::PollJobs(ids) => Step {
                follow_ups: self.poll_jobs(ids).await,
                ..Step::default()
            },
            Effect::StopPolling => Step::default(),
            Effect::RefreshCollections => {
                self.notify_refresh();
                Step {
                    effects: vec![Effect::LoadCollections],
                    ..Step::default()
                }
            }
            Effect::CreateCollection(name) => match self.gateway.create_collection(&name).await {
                Ok(change) => Step {
                    outcome: Some(Outcome::CollectionCreated(change.id.clone())),
                    ..Step::follow(Msg::CollectionCreated {
                        id: change.id,
                        name: change.name,
                        message: change.message,
                    })
                },
                Err(err) => Step::failed(
                    Msg::CollectionCreateFailed(err.user_message()),
                    SessionError::Collection {
                        action: "create collection",
                        source: err,
                    },
                ),
            },
            Effect::DeleteCollection(id) => match self.gateway.delete_collection(&id).await {
                Ok(change) => Step::follow(Msg::CollectionDeleted {
                    id: change.id,
                    message: change.message,
                }),
                Err(err) => Step::failed(
                    Msg::CollectionDeleteFailed(err.user_message()),
                    SessionError::Collection {
                        action: "delete collection",
                        source: err,
                    },
                ),
            },
            Effect::RemoveCompanies {
                collection_id,
                company_ids,
            } => match self
                .gateway
                .remove_companies(&collection_id, &company_ids)
                .await
            {
                Ok(removed) => Step {
                    outcome: Some(Outcome::CompaniesRemoved(removed.removed_count)),
                    ..Step::follow(Msg::CompaniesRemoved {
                        collection_id: removed.collection_id,
                        removed_count: removed.removed_count,
                        message: removed.message,
                    })
                },
                Err(err) => Step::failed(
                    Msg::CompaniesRemoveFailed(err.user_message()),
                    SessionError::Collection {
                        action: "remove companies",
                        source: err,
                    },
                ),
            },
            Effect::Reject(rejection) => {
                curator_debug!("Command refused: {}", rejection);
                Step {
                    error: Some(SessionError::Rejected(rejection)),
                    ..Step::default()
                }
            }
        }
    }

    fn notify_refresh(&self) {
        let callbacks: Vec<RefreshCallback> = lock(&self.refresh_callbacks).clone();
        for callback in callbacks {
            callback();
        }
    }

    /// Polls every id concurrently. Errors leave the job as it was.
    async fn poll_jobs(&self, ids: Vec<JobId>) -> Vec<Msg> {
        let gateway = &self.gateway;
        let results = join_all(ids.into_iter().map(|job_id| async move {
            let result = gateway.job_status(&job_id).await;
            (job_id, result)
        }))
        .await;

        results
            .into_iter()
            .map(|(job_id, result)| match result {
                Ok(job) => Msg::JobPolled(job),
                Err(err) => {
                    let failure = Failure::Poll {
                        job_id: job_id.clone(),
                        message: err.user_message(),
                    };
                    curator_warn!("{}", failure);
                    Msg::JobPollFailed {
                        job_id,
                        message: err.to_string(),
                    }
                }
            })
            .collect()
    }

    fn spawn_poller(self: &Arc<Self>) {
        if self.shutdown.is_cancelled() {
            return;
        }
        let inner = Arc::clone(self);
        let task: Pin<Box<dyn Future<Output = ()> + Send>> = Box::pin(inner.poll_loop());
        let handle = tokio::spawn(task);
        if lock(&self.poller).replace(handle).is_some() {
            curator_debug!("Replaced a finished polling task");
        }
    }

    async fn poll_loop(self: Arc<Self>) {
        let period = self.settings.poll_interval.max(MIN_POLL_INTERVAL);
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        curator_debug!("Polling task started");

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    curator_debug!("Polling task cancelled");
                    return;
                }
                _ = ticker.tick() => {}
            }

            let mut follow = Vec::new();
            let mut stop = false;
            for effect in self.dispatch(Msg::PollTick) {
                match effect {
                    Effect::PollJobs(ids) => {
                        let polled = tokio::select! {
                            _ = self.shutdown.cancelled() => return,
                            polled = self.poll_jobs(ids) => polled,
                        };
                        for msg in polled {
                            follow.extend(self.dispatch(msg));
                        }
                    }
                    Effect::StopPolling => stop = true,
                    other => follow.push(other),
                }
            }

            if !follow.is_empty() {
                for err in self.drive(follow).await.errors {
                    curator_warn!("Follow-up after poll failed: {}", err);
                }
            }
            if stop {
                curator_debug!("No active transfer jobs; polling task exiting");
                return;
            }
        }
    }
}
