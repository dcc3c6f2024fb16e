//! Fire-and-poll tracking for long-running server actions.
//!
//! The backend acknowledges an action (`execute`, `crawl`, `package`,
//! `calculate`, `refresh`) immediately and finishes it in the background.
//! The tracker fires the action once, then refreshes the owning controller
//! on a fixed interval until the item satisfies a predicate or the overall
//! timeout elapses.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use curation_api::types::{RunState, Trackable};
use curation_api::Client;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tokio::time::MissedTickBehavior;

use crate::controller::ResourceController;
use crate::error::ConsoleError;
use crate::notice::{Notice, Notifier};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TrackerConfig {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            timeout: Duration::from_secs(30),
        }
    }
}

/// A tracked action as seen by callers.
#[derive(Clone, Debug, PartialEq)]
pub struct AsyncAction {
    pub status: RunState,
    pub resource_id: String,
    pub action: String,
    pub started_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActionOutcome {
    Succeeded,
    /// Carries the item's status label.
    Failed(Option<String>),
    /// The timeout elapsed first. The server may still finish.
    StillRunning,
    /// The server refused to start the action.
    Rejected(String),
    /// The poll was cancelled or its tracker dropped. Reported by
    /// [`ActionHandle::wait`] only; no notice is sent.
    Cancelled,
}

#[derive(Clone, Debug)]
struct ActionState {
    action: AsyncAction,
    outcome: Option<ActionOutcome>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct ActionKey {
    resource_id: String,
    action: String,
}

/// Cloneable view of one tracked action.
#[derive(Clone, Debug)]
pub struct ActionHandle {
    key: ActionKey,
    task_id: u64,
    rx: watch::Receiver<ActionState>,
}

impl ActionHandle {
    pub fn resource_id(&self) -> &str {
        &self.key.resource_id
    }

    pub fn action(&self) -> &str {
        &self.key.action
    }

    pub fn current(&self) -> AsyncAction {
        self.rx.borrow().action.clone()
    }

    /// The outcome, once the action has finished.
    pub fn outcome(&self) -> Option<ActionOutcome> {
        self.rx.borrow().outcome.clone()
    }

    /// Resolves when the action finishes or its poll is cancelled.
    pub async fn wait(&self) -> ActionOutcome {
        let mut rx = self.rx.clone();
        loop {
            let outcome = rx.borrow_and_update().outcome.clone();
            if let Some(outcome) = outcome {
                return outcome;
            }
            if rx.changed().await.is_err() {
                let outcome = rx.borrow().outcome.clone();
                return outcome.unwrap_or(ActionOutcome::Cancelled);
            }
        }
    }
}

struct ActiveAction {
    task_id: u64,
    handle: ActionHandle,
    abort: AbortHandle,
}

type Predicate<R> = Arc<dyn Fn(&R) -> bool + Send + Sync>;

/// Tracks long-running actions for one resource type.
///
/// At most one poll runs per resource id and action. Dropping the tracker
/// aborts every poll it started.
pub struct LongRunningActionTracker<R: Trackable> {
    controller: Arc<ResourceController<R>>,
    client: Arc<Client>,
    notifier: Arc<dyn Notifier>,
    config: TrackerConfig,
    active: Arc<DashMap<ActionKey, ActiveAction>>,
    next_task: AtomicU64,
}

impl<R: Trackable> LongRunningActionTracker<R> {
    pub fn new(
        controller: Arc<ResourceController<R>>,
        client: Arc<Client>,
        notifier: Arc<dyn Notifier>,
        config: TrackerConfig,
    ) -> Self {
        Self {
            controller,
            client,
            notifier,
            config,
            active: Arc::new(DashMap::new()),
            next_task: AtomicU64::new(1),
        }
    }

    pub fn config(&self) -> TrackerConfig {
        self.config
    }

    /// Starts `action` and polls until the item reaches a terminal status.
    pub fn start(&self, id: R::Id, action: &str) -> Result<ActionHandle, ConsoleError> {
        self.start_until(id, action, |item: &R| item.run_state().is_terminal())
    }

    /// Starts `action` and polls until `done` holds for the refreshed item.
    ///
    /// If a poll for the same id and action is already running, its handle
    /// is returned and nothing is sent.
    pub fn start_until<P>(&self, id: R::Id, action: &str, done: P) -> Result<ActionHandle, ConsoleError>
    where
        P: Fn(&R) -> bool + Send + Sync + 'static,
    {
        if !R::ACTIONS.contains(&action) {
            return Err(ConsoleError::InvalidInput(format!(
                "'{}' is not an action on {} (expected one of: {})",
                action,
                R::LABEL,
                R::ACTIONS.join(", ")
            )));
        }

        let key = ActionKey {
            resource_id: id.to_string(),
            action: action.to_string(),
        };
        match self.active.entry(key.clone()) {
            Entry::Occupied(existing) => {
                tracing::debug!("{} {} {} already tracked", R::LABEL, id, action);
                Ok(existing.get().handle.clone())
            }
            Entry::Vacant(slot) => {
                let task_id = self.next_task.fetch_add(1, Ordering::Relaxed);
                let (tx, rx) = watch::channel(ActionState {
                    action: AsyncAction {
                        status: RunState::Pending,
                        resource_id: key.resource_id.clone(),
                        action: key.action.clone(),
                        started_at: Utc::now(),
                    },
                    outcome: None,
                });
                let handle = ActionHandle {
                    key: key.clone(),
                    task_id,
                    rx,
                };
                let run = ActionRun {
                    controller: Arc::clone(&self.controller),
                    client: Arc::clone(&self.client),
                    notifier: Arc::clone(&self.notifier),
                    config: self.config,
                    id,
                    action: key.action.clone(),
                    done: Arc::new(done) as Predicate<R>,
                    tx,
                };
                let active = Arc::clone(&self.active);
                let task = tokio::spawn(async move {
                    run.execute().await;
                    active.remove_if(&key, |_, entry| entry.task_id == task_id);
                });
                slot.insert(ActiveAction {
                    task_id,
                    handle: handle.clone(),
                    abort: task.abort_handle(),
                });
                Ok(handle)
            }
        }
    }

    pub fn is_active(&self, id: &R::Id, action: &str) -> bool {
        self.active.contains_key(&ActionKey {
            resource_id: id.to_string(),
            action: action.to_string(),
        })
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Stops the poll behind `handle`. Waiters resolve to `Cancelled`.
    pub fn cancel(&self, handle: &ActionHandle) -> bool {
        match self
            .active
            .remove_if(&handle.key, |_, entry| entry.task_id == handle.task_id)
        {
            Some((_, entry)) => {
                tracing::debug!(
                    "Cancelled {} poll for {} {}",
                    handle.key.action,
                    R::LABEL,
                    handle.key.resource_id
                );
                entry.abort.abort();
                true
            }
            None => false,
        }
    }

    /// Stops every poll.
    pub fn shutdown(&self) {
        let keys: Vec<ActionKey> = self.active.iter().map(|e| e.key().clone()).collect();
        for key in keys {
            if let Some((_, entry)) = self.active.remove(&key) {
                entry.abort.abort();
            }
        }
    }
}

impl<R: Trackable> Drop for LongRunningActionTracker<R> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Everything one spawned poll owns.
struct ActionRun<R: Trackable> {
    controller: Arc<ResourceController<R>>,
    client: Arc<Client>,
    notifier: Arc<dyn Notifier>,
    config: TrackerConfig,
    id: R::Id,
    action: String,
    done: Predicate<R>,
    tx: watch::Sender<ActionState>,
}

impl<R: Trackable> ActionRun<R> {
    async fn execute(self) {
        let subject = format!("{} {} {}", self.action, R::LABEL, self.id);
        let (status, outcome, notice) = match self.fire().await {
            Err(message) => (
                RunState::Failed,
                ActionOutcome::Rejected(message.clone()),
                Notice::error(message),
            ),
            Ok(()) => {
                self.set_status(RunState::Running);
                match tokio::time::timeout(self.config.timeout, self.poll()).await {
                    Ok(item) if item.run_state() == RunState::Failed => {
                        let label = item.status_label();
                        (
                            RunState::Failed,
                            ActionOutcome::Failed(Some(label.clone())),
                            Notice::error(format!("Failed: {} ({})", subject, label)),
                        )
                    }
                    Ok(_) => (
                        RunState::Succeeded,
                        ActionOutcome::Succeeded,
                        Notice::success(format!("Finished: {}", subject)),
                    ),
                    Err(_) => (
                        RunState::Running,
                        ActionOutcome::StillRunning,
                        Notice::info(format!("Still in progress: {}", subject)),
                    ),
                }
            }
        };
        tracing::info!("{} finished: {:?}", subject, outcome);
        self.notifier.notify(notice);
        self.tx.send_modify(|state| {
            state.action.status = status;
            state.outcome = Some(outcome);
        });
    }

    /// Sends the action request. `Err` carries the message to show.
    async fn fire(&self) -> Result<(), String> {
        let error = match self.client.action::<R>(&self.id, &self.action).await {
            Ok(env) if env.is_success() => {
                tracing::info!("Started {} on {} {}", self.action, R::LABEL, self.id);
                return Ok(());
            }
            Ok(env) => ConsoleError::Application {
                code: env.code,
                message: env.message,
            },
            Err(e) => ConsoleError::Api(e),
        };
        tracing::warn!(
            "{} on {} {} was not started: {}",
            self.action,
            R::LABEL,
            self.id,
            error
        );
        Err(error.user_message())
    }

    /// Polls until the predicate holds and returns the matching item.
    async fn poll(&self) -> R {
        let mut ticker = tokio::time::interval(self.config.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let Some(item) = self.observe().await else {
                continue;
            };
            self.set_status(item.run_state());
            if (self.done)(&item) {
                return item;
            }
        }
    }

    /// Refreshes the controller and reads the item, falling back to the
    /// detail endpoint when it is not on the loaded page.
    async fn observe(&self) -> Option<R> {
        // Failures are already logged by the controller; the next tick retries.
        let _ = self.controller.refresh().await;
        if let Some(item) = self.controller.find(&self.id) {
            return Some(item);
        }
        match self.client.detail::<R>(&self.id).await {
            Ok(env) if env.is_success() => env.data,
            Ok(env) => {
                tracing::warn!("Detail poll for {} {} rejected: {}", R::LABEL, self.id, env.message);
                None
            }
            Err(e) => {
                tracing::warn!("Detail poll for {} {} failed: {}", R::LABEL, self.id, e);
                None
            }
        }
    }

    fn set_status(&self, status: RunState) {
        self.tx.send_if_modified(|state| {
            if state.action.status == status {
                return false;
            }
            state.action.status = status;
            true
        });
    }
}
