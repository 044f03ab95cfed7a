//! View-facing state holders.
//!
//! A store owns the records a screen shows, runs data-access calls on its
//! behalf and publishes a fresh [`StoreState`] snapshot on every transition
//! through a `watch` channel. Views subscribe and render whatever the latest
//! snapshot says.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;
use uuid::Uuid;

use crate::error::{HubError, HubResult};
use crate::query::ListQuery;

/// A record type a [`CollectionStore`] can manage.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    type Record: Clone + Send + Sync + 'static;
    type New: Send + 'static;
    type Patch: Send + 'static;

    const NAME: &'static str;

    fn id_of(record: &Self::Record) -> Uuid;

    async fn list(db: &DatabaseConnection, query: &ListQuery) -> HubResult<Vec<Self::Record>>;

    async fn get(db: &DatabaseConnection, id: Uuid) -> HubResult<Option<Self::Record>>;

    async fn create(db: &DatabaseConnection, input: Self::New) -> HubResult<Self::Record>;

    async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        patch: Self::Patch,
    ) -> HubResult<Self::Record>;

    async fn delete(db: &DatabaseConnection, id: Uuid) -> HubResult<bool>;
}

/// Resources with a name search.
#[async_trait]
pub trait Searchable: Resource {
    async fn search(db: &DatabaseConnection, term: &str) -> HubResult<Vec<Self::Record>>;
}

/// Cloneable error kept in store state.
#[derive(Clone, Debug, PartialEq, Eq, Error, Serialize)]
#[error("{operation} failed: {message}")]
pub struct StoreError {
    pub operation: String,
    pub message: String,
    pub not_found: bool,
}

impl StoreError {
    pub fn new(operation: impl Into<String>, err: &HubError) -> Self {
        Self {
            operation: operation.into(),
            message: err.to_string(),
            not_found: matches!(err, HubError::NotFound { .. }),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoreState<T> {
    pub items: Vec<T>,
    pub selected: Option<T>,
    pub loading: bool,
    pub error: Option<StoreError>,
}

impl<T> Default for StoreState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            loading: false,
            error: None,
        }
    }
}

/// Runs `call` with `loading` raised, then records its outcome. `apply` folds
/// a successful result into the state.
pub(crate) async fn tracked<S, T, Fut>(
    state: &watch::Sender<S>,
    operation: &str,
    call: Fut,
    begin: impl FnOnce(&mut S),
    apply: impl FnOnce(&mut S, &T),
    fail: impl FnOnce(&mut S, StoreError),
) -> Result<T, StoreError>
where
    Fut: Future<Output = HubResult<T>>,
{
    state.send_modify(begin);
    match call.await {
        Ok(value) => {
            state.send_modify(|current| apply(current, &value));
            Ok(value)
        }
        Err(err) => {
            let error = StoreError::new(operation, &err);
            warn!(operation, error = %err, "store operation failed");
            state.send_modify(|current| fail(current, error.clone()));
            Err(error)
        }
    }
}

pub struct CollectionStore<R: Resource> {
    db: Arc<DatabaseConnection>,
    state: watch::Sender<StoreState<R::Record>>,
    _resource: PhantomData<R>,
}

impl<R: Resource> CollectionStore<R> {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let (state, _) = watch::channel(StoreState::default());
        Self {
            db,
            state,
            _resource: PhantomData,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<StoreState<R::Record>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> StoreState<R::Record> {
        self.state.borrow().clone()
    }

    pub fn select(&self, record: Option<R::Record>) {
        self.state.send_modify(|state| state.selected = record);
    }

    pub fn clear_error(&self) {
        self.state.send_modify(|state| state.error = None);
    }

    async fn run<T, Fut>(
        &self,
        operation: &str,
        call: Fut,
        apply: impl FnOnce(&mut StoreState<R::Record>, &T),
    ) -> Result<T, StoreError>
    where
        Fut: Future<Output = HubResult<T>>,
    {
        tracked(
            &self.state,
            &format!("{} {operation}", R::NAME),
            call,
            |state| {
                state.loading = true;
                state.error = None;
            },
            |state, value| {
                apply(state, value);
                state.loading = false;
            },
            |state, error| {
                state.error = Some(error);
                state.loading = false;
            },
        )
        .await
    }

    /// Replaces `items` with the query result.
    pub async fn fetch_all(&self, query: &ListQuery) -> Result<Vec<R::Record>, StoreError> {
        self.run("list", R::list(&self.db, query), |state, items: &Vec<R::Record>| {
            state.items = items.clone();
        })
        .await
    }

    /// Loads one record into `selected`.
    pub async fn fetch(&self, id: Uuid) -> Result<Option<R::Record>, StoreError> {
        self.run("get", R::get(&self.db, id), |state, record: &Option<R::Record>| {
            state.selected = record.clone();
        })
        .await
    }

    pub async fn create(&self, input: R::New) -> Result<R::Record, StoreError> {
        self.run("create", R::create(&self.db, input), |state, record: &R::Record| {
            state.items.push(record.clone());
        })
        .await
    }

    pub async fn update(&self, id: Uuid, patch: R::Patch) -> Result<R::Record, StoreError> {
        self.run("update", R::update(&self.db, id, patch), |state, record: &R::Record| {
            if let Some(slot) = state.items.iter_mut().find(|item| R::id_of(item) == id) {
                *slot = record.clone();
            }
            if state.selected.as_ref().is_some_and(|item| R::id_of(item) == id) {
                state.selected = Some(record.clone());
            }
        })
        .await
    }

    pub async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        self.run("delete", R::delete(&self.db, id), |state, _: &bool| {
            state.items.retain(|item| R::id_of(item) != id);
            if state.selected.as_ref().is_some_and(|item| R::id_of(item) == id) {
                state.selected = None;
            }
        })
        .await
    }
}

impl<R: Searchable> CollectionStore<R> {
    /// Replaces `items` with the search hits. A blank term empties the list.
    pub async fn search(&self, term: &str) -> Result<Vec<R::Record>, StoreError> {
        self.run("search", R::search(&self.db, term), |state, items: &Vec<R::Record>| {
            state.items = items.clone();
        })
        .await
    }
}
