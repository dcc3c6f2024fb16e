//! List state, pagination, filters, selection and CRUD for one resource type.
//!
//! A controller may be shared (`Arc`) between a page and the trackers that
//! poll it. State sits behind a mutex that is never held across an await.
//! Every load takes a ticket from a generation counter; a response is only
//! applied if its ticket is still the latest, so a slow early response can
//! never overwrite a faster later one.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

use curation_api::types::{Envelope, Page, Resource};
use curation_api::{Client, Filters, ListQuery, Query};

use crate::error::ConsoleError;
use crate::notice::{Notice, Notifier};
use crate::validation::{validate_page, validate_page_size};

pub const DEFAULT_PAGE_SIZE: i64 = 20;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    /// 1-indexed current page.
    pub current: i64,
    pub page_size: i64,
    pub total: i64,
}

impl Pagination {
    pub fn total_pages(&self) -> i64 {
        curation_api::types::total_pages(self.total, self.page_size)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            current: 1,
            page_size: DEFAULT_PAGE_SIZE,
            total: 0,
        }
    }
}

/// Everything a page renders. Returned by value from [`ResourceController::snapshot`].
#[derive(Clone, Debug)]
pub struct ControllerState<R: Resource> {
    pub items: Vec<R>,
    pub pagination: Pagination,
    pub filters: Filters,
    pub selection: BTreeSet<R::Id>,
    pub loading: bool,
}

impl<R: Resource> Default for ControllerState<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            pagination: Pagination::default(),
            filters: Filters::default(),
            selection: BTreeSet::new(),
            loading: false,
        }
    }
}

/// What happened to a load's response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The response was the latest and is now the visible state.
    Applied,
    /// A later load started before this one finished; the response was dropped.
    Superseded,
    /// The mutation went through but the reload after it failed, so the
    /// visible page predates it.
    Stale,
}

struct Inner<R: Resource> {
    state: ControllerState<R>,
    /// Ticket of the most recently started load.
    generation: u64,
    /// Page and page size the latest load asked for. Differs from
    /// `state.pagination` while that load is in flight.
    requested: (i64, i64),
}

pub struct ResourceController<R: Resource> {
    client: Arc<Client>,
    notifier: Arc<dyn Notifier>,
    inner: Mutex<Inner<R>>,
}

/// Clears `loading` when the load holding `ticket` ends, however it ends.
struct LoadingGuard<'a, R: Resource> {
    controller: &'a ResourceController<R>,
    ticket: u64,
}

impl<R: Resource> Drop for LoadingGuard<'_, R> {
    fn drop(&mut self) {
        let mut inner = self.controller.lock();
        if inner.generation == self.ticket {
            inner.state.loading = false;
        }
    }
}

impl<R: Resource> ResourceController<R> {
    pub fn new(client: Arc<Client>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_page_size(client, notifier, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(client: Arc<Client>, notifier: Arc<dyn Notifier>, page_size: i64) -> Self {
        let state = ControllerState {
            pagination: Pagination {
                page_size,
                ..Pagination::default()
            },
            ..ControllerState::default()
        };
        Self {
            client,
            notifier,
            inner: Mutex::new(Inner {
                state,
                generation: 0,
                requested: (1, page_size),
            }),
        }
    }

    /// Seeds the filters applied by the first load.
    pub fn with_filters(self, filters: &Filters) -> Self {
        self.lock().state.filters.merge(filters);
        self
    }

    fn lock(&self) -> MutexGuard<'_, Inner<R>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    // -- Reads --

    pub fn snapshot(&self) -> ControllerState<R> {
        self.lock().state.clone()
    }

    pub fn items(&self) -> Vec<R> {
        self.lock().state.items.clone()
    }

    pub fn pagination(&self) -> Pagination {
        self.lock().state.pagination
    }

    pub fn filters(&self) -> Filters {
        self.lock().state.filters.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.lock().state.loading
    }

    /// A copy of the loaded row with this id, if it is on the current page.
    pub fn find(&self, id: &R::Id) -> Option<R> {
        self.lock()
            .state
            .items
            .iter()
            .find(|item| &item.id() == id)
            .cloned()
    }

    // -- Loading --

    /// Loads `page` with the current filters. Failures are reported as a notice.
    pub async fn load(&self, page: i64, page_size: i64) -> Result<LoadOutcome, ConsoleError> {
        self.load_page(page, page_size, true).await
    }

    /// Reloads the current page, or the page a pending load is heading for.
    pub async fn reload(&self) -> Result<LoadOutcome, ConsoleError> {
        let (page, page_size) = self.requested();
        self.load(page, page_size).await
    }

    /// Like [`reload`](Self::reload), without reporting failures as notices.
    ///
    /// Used by background polling, where a failed tick is logged and retried
    /// on the next tick instead of stacking notices. A tick that lands while
    /// the user is navigating loads the page they asked for, so taking the
    /// newer ticket never undoes the navigation.
    pub async fn refresh(&self) -> Result<LoadOutcome, ConsoleError> {
        let (page, page_size) = self.requested();
        self.load_page(page, page_size, false).await
    }

    fn requested(&self) -> (i64, i64) {
        self.lock().requested
    }

    pub async fn set_page(&self, page: i64) -> Result<LoadOutcome, ConsoleError> {
        let page = validate_page(page)?;
        let page_size = self.pagination().page_size;
        self.load(page, page_size).await
    }

    /// Changes the page size and returns to page 1.
    pub async fn set_page_size(&self, page_size: i64) -> Result<LoadOutcome, ConsoleError> {
        let page_size = validate_page_size(page_size)?;
        self.load(1, page_size).await
    }

    /// Merges `patch` into the filters and loads page 1.
    ///
    /// An undefined entry in `patch` removes that key.
    pub async fn set_filters(&self, patch: &Filters) -> Result<LoadOutcome, ConsoleError> {
        let page_size = {
            let mut inner = self.lock();
            inner.state.filters.merge(patch);
            inner.state.pagination.current = 1;
            inner.state.selection.clear();
            inner.state.pagination.page_size
        };
        self.load(1, page_size).await
    }

    /// Drops every filter and loads page 1.
    pub async fn clear_filters(&self) -> Result<LoadOutcome, ConsoleError> {
        let page_size = {
            let mut inner = self.lock();
            inner.state.filters = Filters::default();
            inner.state.pagination.current = 1;
            inner.state.selection.clear();
            inner.state.pagination.page_size
        };
        self.load(1, page_size).await
    }

    async fn load_page(
        &self,
        page: i64,
        page_size: i64,
        report: bool,
    ) -> Result<LoadOutcome, ConsoleError> {
        let (ticket, query) = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.requested = (page, page_size);
            inner.state.loading = true;
            let query = ListQuery::default()
                .with_page(page)
                .with_page_size(page_size)
                .with_filters(&inner.state.filters);
            (inner.generation, query)
        };
        let _guard = LoadingGuard {
            controller: self,
            ticket,
        };

        let result = self.client.list::<R>(&query).await;

        let mut inner = self.lock();
        if inner.generation != ticket {
            tracing::debug!(
                "Discarding superseded {} load (ticket {}, latest {})",
                R::LABEL,
                ticket,
                inner.generation
            );
            return Ok(LoadOutcome::Superseded);
        }
        inner.state.loading = false;

        let error = match result {
            Ok(Envelope {
                code: 200,
                data: Some(fetched),
                ..
            }) => {
                apply_page(&mut inner.state, fetched, page_size);
                inner.requested = (inner.state.pagination.current, inner.state.pagination.page_size);
                return Ok(LoadOutcome::Applied);
            }
            Ok(Envelope {
                code: 200,
                message,
                data: None,
            }) => ConsoleError::Api(curation_api::Error::Decode {
                reason: "list response carried no data".to_string(),
                body: message,
            }),
            Ok(env) => ConsoleError::Application {
                code: env.code,
                message: env.message,
            },
            Err(e) => ConsoleError::Api(e),
        };
        inner.requested = (inner.state.pagination.current, inner.state.pagination.page_size);
        drop(inner);

        if report {
            self.notifier.notify(Notice::error(error.user_message()));
        } else {
            tracing::warn!("Background {} refresh failed: {}", R::LABEL, error);
        }
        Err(error)
    }

    // -- Mutations --

    /// Deletes one record, then reloads. Falls back a page if the current one empties.
    ///
    /// The mutation's notice is the only one sent; a failed reload afterwards
    /// is logged and reported as [`LoadOutcome::Stale`].
    pub async fn remove(&self, id: &R::Id) -> Result<LoadOutcome, ConsoleError> {
        let result = self.client.delete::<R>(id).await;
        self.check_mutation(result, || format!("Deleted {} {}", R::LABEL, id))?;
        self.lock().state.selection.remove(id);
        Ok(self.reload_after_mutation().await)
    }

    /// Deletes every id in one request. An empty set never reaches the network.
    pub async fn bulk_remove(&self, ids: &[R::Id]) -> Result<LoadOutcome, ConsoleError> {
        if ids.is_empty() {
            self.notifier.notify(Notice::warning("Nothing selected"));
            return Err(ConsoleError::NothingSelected);
        }
        let result = self.client.bulk_delete::<R>(ids).await;
        self.check_mutation(result, || format!("Deleted {} {}(s)", ids.len(), R::LABEL))?;
        self.lock().state.selection.clear();
        Ok(self.reload_after_mutation().await)
    }

    pub async fn bulk_remove_selected(&self) -> Result<LoadOutcome, ConsoleError> {
        let ids: Vec<R::Id> = self.selection().into_iter().collect();
        self.bulk_remove(&ids).await
    }

    /// Restores soft-deleted records in one request, then reloads.
    pub async fn bulk_restore(&self, ids: &[R::Id]) -> Result<LoadOutcome, ConsoleError> {
        if ids.is_empty() {
            self.notifier.notify(Notice::warning("Nothing selected"));
            return Err(ConsoleError::NothingSelected);
        }
        let result = self.client.bulk_restore::<R>(ids).await;
        self.check_mutation(result, || format!("Restored {} {}(s)", ids.len(), R::LABEL))?;
        self.lock().state.selection.clear();
        Ok(self.reload_after_mutation().await)
    }

    /// Turns the mutation result into the single notice for this action.
    ///
    /// The envelope describes the whole request: a bulk call either fully
    /// succeeded or fully failed.
    fn check_mutation(
        &self,
        result: Result<Envelope<serde_json::Value>, curation_api::Error>,
        success: impl FnOnce() -> String,
    ) -> Result<(), ConsoleError> {
        let error = match result {
            Ok(env) if env.is_success() => {
                self.notifier.notify(Notice::success(success()));
                return Ok(());
            }
            Ok(env) => ConsoleError::Application {
                code: env.code,
                message: env.message,
            },
            Err(e) => ConsoleError::Api(e),
        };
        self.notifier.notify(Notice::error(error.user_message()));
        Err(error)
    }

    async fn reload_after_mutation(&self) -> LoadOutcome {
        let (page, page_size) = self.requested();
        let Ok(outcome) = self.load_page(page, page_size, false).await else {
            return LoadOutcome::Stale;
        };
        if outcome == LoadOutcome::Applied {
            let pagination = {
                let inner = self.lock();
                inner
                    .state
                    .items
                    .is_empty()
                    .then_some(inner.state.pagination)
            };
            if let Some(pagination) = pagination.filter(|p| p.current > 1) {
                return self
                    .load_page(pagination.current - 1, pagination.page_size, false)
                    .await
                    .unwrap_or(LoadOutcome::Stale);
            }
        }
        outcome
    }

    // -- Selection (never triggers a load) --

    pub fn selection(&self) -> BTreeSet<R::Id> {
        self.lock().state.selection.clone()
    }

    pub fn is_selected(&self, id: &R::Id) -> bool {
        self.lock().state.selection.contains(id)
    }

    /// Flips membership; returns whether `id` is now selected.
    pub fn toggle(&self, id: R::Id) -> bool {
        let mut inner = self.lock();
        if inner.state.selection.remove(&id) {
            false
        } else {
            inner.state.selection.insert(id);
            true
        }
    }

    pub fn select(&self, id: R::Id) {
        self.lock().state.selection.insert(id);
    }

    pub fn deselect(&self, id: &R::Id) {
        self.lock().state.selection.remove(id);
    }

    /// Selects every row on the current page.
    pub fn select_page(&self) {
        let mut inner = self.lock();
        let ids: Vec<R::Id> = inner.state.items.iter().map(Resource::id).collect();
        inner.state.selection.extend(ids);
    }

    pub fn clear_selection(&self) {
        self.lock().state.selection.clear();
    }
}

/// Replaces items and pagination in one step. Moving to another page or
/// page size clears the selection.
fn apply_page<R: Resource>(state: &mut ControllerState<R>, fetched: Page<R>, requested_size: i64) {
    if !fetched.is_consistent() {
        tracing::warn!(
            "{} page {} is inconsistent: {} items, page_size {}, total {}",
            R::LABEL,
            fetched.page,
            fetched.list.len(),
            fetched.page_size,
            fetched.total
        );
    }
    let page_size = if fetched.page_size > 0 {
        fetched.page_size
    } else {
        requested_size
    };
    let next = Pagination {
        current: fetched.page.max(1),
        page_size,
        total: fetched.total,
    };
    if next.current != state.pagination.current || next.page_size != state.pagination.page_size {
        state.selection.clear();
    }
    state.items = fetched.list;
    state.pagination = next;
}
