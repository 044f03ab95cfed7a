//! Cached option lists for select inputs.
//!
//! Writes are applied to the cache before the database call returns, then the
//! list is re-read so the cache always ends up matching the table. A failed
//! write is undone by that same re-read.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use chrono::Utc;
use entity::field_values::{self, FieldType};
use sea_orm::DatabaseConnection;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{HubError, HubResult};
use crate::field_values::{self as repo, FieldValuePatch, NewFieldValue};
use crate::store::StoreError;
use crate::text::slugify;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct FieldValuesState {
    pub options: HashMap<FieldType, Vec<field_values::Model>>,
    pub loading: bool,
    pub error: Option<StoreError>,
}

pub struct FieldValuesStore {
    db: Arc<DatabaseConnection>,
    state: watch::Sender<FieldValuesState>,
}

impl FieldValuesStore {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let (state, _) = watch::channel(FieldValuesState::default());
        Self { db, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<FieldValuesState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> FieldValuesState {
        self.state.borrow().clone()
    }

    fn cached(&self, field_type: FieldType) -> Option<Vec<field_values::Model>> {
        self.state.borrow().options.get(&field_type).cloned()
    }

    /// Cached options, fetched on first use.
    pub async fn options(&self, field_type: FieldType) -> Result<Vec<field_values::Model>, StoreError> {
        match self.cached(field_type) {
            Some(options) => Ok(options),
            None => self.refresh(field_type).await,
        }
    }

    /// The option flagged as default, if any.
    pub async fn default_option(
        &self,
        field_type: FieldType,
    ) -> Result<Option<field_values::Model>, StoreError> {
        let options = self.options(field_type).await?;
        Ok(options.into_iter().find(|option| option.is_default))
    }

    pub async fn refresh(&self, field_type: FieldType) -> Result<Vec<field_values::Model>, StoreError> {
        self.state.send_modify(|state| state.loading = true);
        match repo::list(self.db.as_ref(), field_type).await {
            Ok(options) => {
                self.state.send_modify(|state| {
                    state.options.insert(field_type, options.clone());
                    state.loading = false;
                });
                Ok(options)
            }
            Err(err) => Err(self.record_error("refresh", &err)),
        }
    }

    fn record_error(&self, operation: &str, err: &HubError) -> StoreError {
        let error = StoreError::new(format!("field values {operation}"), err);
        warn!(operation, error = %err, "field value operation failed");
        self.state.send_modify(|state| {
            state.error = Some(error.clone());
            state.loading = false;
        });
        error
    }

    /// Applies `optimistic` to the cached list, runs `write`, then re-reads the
    /// list whatever the outcome.
    async fn write_through<T, Fut>(
        &self,
        operation: &str,
        field_type: FieldType,
        optimistic: impl FnOnce(&mut Vec<field_values::Model>),
        write: Fut,
    ) -> Result<T, StoreError>
    where
        Fut: Future<Output = HubResult<T>>,
    {
        self.state.send_modify(|state| {
            optimistic(state.options.entry(field_type).or_default());
            state.loading = true;
            state.error = None;
        });
        let outcome = write.await;
        if let Err(err) = self.refresh(field_type).await {
            debug!(%err, "re-read after write failed");
        }
        match outcome {
            Ok(value) => Ok(value),
            Err(err) => Err(self.record_error(operation, &err)),
        }
    }

    pub async fn add_option(
        &self,
        field_type: FieldType,
        label: &str,
    ) -> Result<field_values::Model, StoreError> {
        let placeholder = field_values::Model {
            id: Uuid::new_v4(),
            field_type,
            value: slugify(label),
            label: label.trim().to_string(),
            is_default: false,
            sort_order: i32::MAX,
            created_at: Utc::now().into(),
        };
        self.write_through(
            "add",
            field_type,
            |options| options.push(placeholder),
            repo::create(&self.db, NewFieldValue::new(field_type, label)),
        )
        .await
    }

    /// Finds an option whose value or label matches `input` ignoring case,
    /// adding one when nothing matches.
    pub async fn resolve_or_add(
        &self,
        field_type: FieldType,
        input: &str,
    ) -> Result<field_values::Model, StoreError> {
        let wanted = input.trim();
        let slug = slugify(wanted);
        let existing = self.options(field_type).await?.into_iter().find(|option| {
            option.value.eq_ignore_ascii_case(wanted)
                || option.label.eq_ignore_ascii_case(wanted)
                || (!slug.is_empty() && option.value == slug)
        });
        match existing {
            Some(option) => Ok(option),
            None => self.add_option(field_type, wanted).await,
        }
    }

    pub async fn update_option(
        &self,
        field_type: FieldType,
        id: Uuid,
        patch: FieldValuePatch,
    ) -> Result<field_values::Model, StoreError> {
        let label = patch.label.clone();
        let sort_order = patch.sort_order;
        self.write_through(
            "update",
            field_type,
            |options| {
                if let Some(option) = options.iter_mut().find(|option| option.id == id) {
                    if let Some(label) = label {
                        option.label = label.trim().to_string();
                    }
                    if let Some(sort_order) = sort_order {
                        option.sort_order = sort_order;
                    }
                }
            },
            repo::update(self.db.as_ref(), id, patch),
        )
        .await
    }

    pub async fn remove_option(&self, field_type: FieldType, id: Uuid) -> Result<bool, StoreError> {
        self.write_through(
            "remove",
            field_type,
            |options| options.retain(|option| option.id != id),
            repo::delete(self.db.as_ref(), id),
        )
        .await
    }

    pub async fn set_default(
        &self,
        field_type: FieldType,
        id: Uuid,
    ) -> Result<field_values::Model, StoreError> {
        self.write_through(
            "set default",
            field_type,
            |options| {
                for option in options.iter_mut() {
                    option.is_default = option.id == id;
                }
            },
            repo::set_default(&self.db, id),
        )
        .await
    }
}
