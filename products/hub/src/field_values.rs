//! Options behind the dashboard's select inputs (statuses, types, sources).
//!
//! `value` is the stored identifier and never changes once created; `label`
//! is what users see and may be edited freely.

use chrono::Utc;
use entity::field_values::{self, FieldType};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveEnum, ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{HubError, HubResult};
use crate::text::slugify;
use crate::validation::Checks;

pub const ENTITY: &str = "field value";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewFieldValue {
    pub field_type: FieldType,
    pub label: String,
    /// Derived from the label when omitted.
    pub value: Option<String>,
    #[serde(default)]
    pub is_default: bool,
    pub sort_order: Option<i32>,
}

impl NewFieldValue {
    pub fn new(field_type: FieldType, label: impl Into<String>) -> Self {
        Self {
            field_type,
            label: label.into(),
            value: None,
            is_default: false,
            sort_order: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValuePatch {
    pub label: Option<String>,
    pub sort_order: Option<i32>,
}

/// Options seeded into an empty database. The first entry of each list is the
/// default.
pub fn default_options(field_type: FieldType) -> &'static [&'static str] {
    match field_type {
        FieldType::ContactRoles => &["Primary Contact", "Owner", "Manager", "Accounts", "Technical"],
        FieldType::ContactStatuses => &["Active", "Inactive"],
        FieldType::OrganisationTypes => &["Client", "Supplier", "Partner", "Prospect"],
        FieldType::OrganisationStatuses => &["Active", "Inactive", "Archived"],
        FieldType::LeadStatuses => &["New", "Contacted", "Qualified", "Proposal Sent", "Won", "Lost"],
        FieldType::LeadSources => &["Website", "Referral", "Phone", "Email", "Social Media", "Event"],
        FieldType::WebsiteStatuses => &["Live", "In Development", "Maintenance", "Archived"],
        FieldType::WebsiteTypes => &["Brochure", "E-commerce", "Landing Page", "Web Application"],
    }
}

pub const ALL_FIELD_TYPES: [FieldType; 8] = [
    FieldType::ContactRoles,
    FieldType::ContactStatuses,
    FieldType::OrganisationTypes,
    FieldType::OrganisationStatuses,
    FieldType::LeadStatuses,
    FieldType::LeadSources,
    FieldType::WebsiteStatuses,
    FieldType::WebsiteTypes,
];

pub async fn list<C: ConnectionTrait>(
    db: &C,
    field_type: FieldType,
) -> HubResult<Vec<field_values::Model>> {
    let rows = field_values::Entity::find()
        .filter(field_values::Column::FieldType.eq(field_type))
        .order_by_asc(field_values::Column::SortOrder)
        .order_by_asc(field_values::Column::Label)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<Option<field_values::Model>> {
    Ok(field_values::Entity::find_by_id(id).one(db).await?)
}

async fn find_by_value<C: ConnectionTrait>(
    db: &C,
    field_type: FieldType,
    value: &str,
) -> HubResult<Option<field_values::Model>> {
    let row = field_values::Entity::find()
        .filter(field_values::Column::FieldType.eq(field_type))
        .filter(field_values::Column::Value.eq(value))
        .one(db)
        .await?;
    Ok(row)
}

async fn next_sort_order<C: ConnectionTrait>(db: &C, field_type: FieldType) -> HubResult<i32> {
    let highest: Option<Option<i32>> = field_values::Entity::find()
        .select_only()
        .column_as(Expr::col(field_values::Column::SortOrder).max(), "max_sort_order")
        .filter(field_values::Column::FieldType.eq(field_type))
        .into_tuple()
        .one(db)
        .await?;
    Ok(highest.flatten().map_or(0, |max| max + 1))
}

async fn clear_defaults<C: ConnectionTrait>(
    db: &C,
    field_type: FieldType,
    keep: Uuid,
) -> HubResult<()> {
    field_values::Entity::update_many()
        .col_expr(field_values::Column::IsDefault, Expr::value(false))
        .filter(field_values::Column::FieldType.eq(field_type))
        .filter(field_values::Column::Id.ne(keep))
        .filter(field_values::Column::IsDefault.eq(true))
        .exec(db)
        .await?;
    Ok(())
}

async fn insert<C: ConnectionTrait>(
    db: &C,
    input: NewFieldValue,
) -> HubResult<field_values::Model> {
    let value = slugify(input.value.as_deref().unwrap_or(&input.label));
    Checks::new()
        .required("label", &input.label)
        .check("value", !value.is_empty(), "Value needs at least one letter or digit")
        .finish()?;

    if find_by_value(db, input.field_type, &value).await?.is_some() {
        return Err(HubError::Conflict(format!(
            "{} already has an option `{value}`",
            input.field_type.to_value()
        )));
    }
    let sort_order = match input.sort_order {
        Some(order) => order,
        None => next_sort_order(db, input.field_type).await?,
    };
    let model = field_values::ActiveModel {
        id: Set(Uuid::new_v4()),
        field_type: Set(input.field_type),
        value: Set(value),
        label: Set(input.label.trim().to_string()),
        is_default: Set(input.is_default),
        sort_order: Set(sort_order),
        created_at: Set(Utc::now().into()),
    }
    .insert(db)
    .await?;
    if model.is_default {
        clear_defaults(db, model.field_type, model.id).await?;
    }
    Ok(model)
}

#[instrument(name = "hub.field_values.create", skip_all, fields(field_type = ?input.field_type))]
pub async fn create(db: &DatabaseConnection, input: NewFieldValue) -> HubResult<field_values::Model> {
    let txn = db.begin().await?;
    let model = insert(&txn, input).await?;
    txn.commit().await?;
    info!(field_value_id = %model.id, value = %model.value, "field option created");
    Ok(model)
}

#[instrument(name = "hub.field_values.update", skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: FieldValuePatch,
) -> HubResult<field_values::Model> {
    if let Some(label) = &input.label {
        Checks::new().required("label", label).finish()?;
    }
    let existing = get(db, id)
        .await?
        .ok_or_else(|| HubError::not_found(ENTITY, id))?;
    let mut active: field_values::ActiveModel = existing.into();
    if let Some(label) = input.label {
        active.label = Set(label.trim().to_string());
    }
    if let Some(sort_order) = input.sort_order {
        active.sort_order = Set(sort_order);
    }
    Ok(active.update(db).await?)
}

#[instrument(name = "hub.field_values.delete", skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<bool> {
    let res = field_values::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// Makes `id` the only default option of its field type.
#[instrument(name = "hub.field_values.set_default", skip(db))]
pub async fn set_default(db: &DatabaseConnection, id: Uuid) -> HubResult<field_values::Model> {
    let txn = db.begin().await?;
    let existing = get(&txn, id)
        .await?
        .ok_or_else(|| HubError::not_found(ENTITY, id))?;
    clear_defaults(&txn, existing.field_type, id).await?;
    let mut active: field_values::ActiveModel = existing.into();
    active.is_default = Set(true);
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    Ok(updated)
}

/// Inserts any missing default option. Existing rows, including edited
/// labels, are left as they are.
#[instrument(name = "hub.field_values.seed", skip(db))]
pub async fn seed_defaults(db: &DatabaseConnection) -> HubResult<u64> {
    let txn = db.begin().await?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let mut inserted = 0;
    for field_type in ALL_FIELD_TYPES {
        let has_default = field_values::Entity::find()
            .filter(field_values::Column::FieldType.eq(field_type))
            .filter(field_values::Column::IsDefault.eq(true))
            .one(&txn)
            .await?
            .is_some();
        for (position, label) in default_options(field_type).iter().enumerate() {
            let value = slugify(label);
            if find_by_value(&txn, field_type, &value).await?.is_some() {
                continue;
            }
            field_values::ActiveModel {
                id: Set(Uuid::new_v4()),
                field_type: Set(field_type),
                value: Set(value),
                label: Set((*label).to_string()),
                is_default: Set(position == 0 && !has_default),
                sort_order: Set(position as i32),
                created_at: Set(now),
            }
            .insert(&txn)
            .await?;
            inserted += 1;
        }
    }
    txn.commit().await?;
    info!(inserted, "default field options seeded");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_field_type_has_seed_options() {
        for field_type in ALL_FIELD_TYPES {
            let options = default_options(field_type);
            assert!(!options.is_empty(), "{field_type:?} has no defaults");
            let mut values: Vec<_> = options.iter().map(|label| slugify(label)).collect();
            values.sort();
            values.dedup();
            assert_eq!(values.len(), options.len(), "{field_type:?} slugs collide");
        }
    }

    #[test]
    fn seeded_statuses_match_record_defaults() {
        let organisation = slugify(default_options(FieldType::OrganisationStatuses)[0]);
        assert_eq!(organisation, crate::organisations::DEFAULT_STATUS);
        let lead = slugify(default_options(FieldType::LeadStatuses)[0]);
        assert_eq!(lead, crate::leads::DEFAULT_STATUS);
    }
}
