//! Many-to-many links between contacts and organisations.
//!
//! Each association carries copies of the display fields of both ends so a
//! list renders from one table. A contact has at most one primary
//! organisation: promoting one link demotes the others in the same
//! transaction, and the `uq_organisation_contacts_primary` index turns a
//! concurrent second primary into a `Conflict`.

use chrono::Utc;
use entity::organisation_contacts::{self, PRIMARY_PRIORITY, SECONDARY_PRIORITY};
use entity::{contacts, organisations};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func, Query};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::error::{HubError, HubResult};
use crate::organisations::{self as orgs, NewOrganisation};
use crate::query::{FieldKind, ListQuery, Queryable, SortDirection, apply_list_query, like_pattern};
use crate::validation::Checks;

pub const ENTITY: &str = "relationship";
const NEGATIVE_PRIORITY_HINT: &str = "Priority cannot be negative";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRelationship {
    pub organisation_id: Uuid,
    pub contact_id: Uuid,
    pub role: String,
    #[serde(default)]
    pub is_primary: bool,
    pub priority: Option<i32>,
}

/// Link settings used when the organisation is created in the same call.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkDetails {
    pub role: String,
    #[serde(default)]
    pub is_primary: bool,
    pub priority: Option<i32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipPatch {
    pub role: Option<String>,
    pub is_primary: Option<bool>,
    pub priority: Option<i32>,
}

fn default_priority(is_primary: bool) -> i32 {
    if is_primary {
        PRIMARY_PRIORITY
    } else {
        SECONDARY_PRIORITY
    }
}

fn check_link(role: &str, priority: Option<i32>) -> HubResult<()> {
    Checks::new()
        .required("role", role)
        .check(
            "priority",
            priority.is_none_or(|p| p >= 0),
            NEGATIVE_PRIORITY_HINT,
        )
        .finish()
}

impl Queryable for organisation_contacts::Entity {
    fn field(name: &str) -> Option<(organisation_contacts::Column, FieldKind)> {
        use organisation_contacts::Column;
        let mapped = match name {
            "id" => (Column::Id, FieldKind::Uuid),
            "organisationId" => (Column::OrganisationId, FieldKind::Uuid),
            "contactId" => (Column::ContactId, FieldKind::Uuid),
            "role" => (Column::Role, FieldKind::Text),
            "isPrimary" => (Column::IsPrimary, FieldKind::Bool),
            "priority" => (Column::Priority, FieldKind::Int),
            "organisationName" => (Column::OrganisationName, FieldKind::Text),
            "contactName" => (Column::ContactName, FieldKind::Text),
            "contactEmail" => (Column::ContactEmail, FieldKind::Text),
            "contactPhone" => (Column::ContactPhone, FieldKind::Text),
            "createdAt" => (Column::CreatedAt, FieldKind::Timestamp),
            "updatedAt" => (Column::UpdatedAt, FieldKind::Timestamp),
            _ => return None,
        };
        Some(mapped)
    }

    fn default_order() -> (organisation_contacts::Column, SortDirection) {
        (organisation_contacts::Column::Priority, SortDirection::Asc)
    }
}

pub async fn list<C: ConnectionTrait>(
    db: &C,
    query: &ListQuery,
) -> HubResult<Vec<organisation_contacts::Model>> {
    let select = apply_list_query(organisation_contacts::Entity::find(), query)?;
    Ok(select.all(db).await?)
}

pub async fn get<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> HubResult<Option<organisation_contacts::Model>> {
    Ok(organisation_contacts::Entity::find_by_id(id).one(db).await?)
}

/// Clears the primary flag on every other association of the contact.
async fn demote_other_primaries<C: ConnectionTrait>(
    db: &C,
    contact_id: Uuid,
    keep: Option<Uuid>,
    now: DateTimeWithTimeZone,
) -> HubResult<u64> {
    let mut update = organisation_contacts::Entity::update_many()
        .col_expr(organisation_contacts::Column::IsPrimary, Expr::value(false))
        .col_expr(
            organisation_contacts::Column::Priority,
            Expr::value(SECONDARY_PRIORITY),
        )
        .col_expr(organisation_contacts::Column::UpdatedAt, Expr::value(now))
        .filter(organisation_contacts::Column::ContactId.eq(contact_id))
        .filter(organisation_contacts::Column::IsPrimary.eq(true));
    if let Some(id) = keep {
        update = update.filter(organisation_contacts::Column::Id.ne(id));
    }
    let res = update.exec(db).await?;
    if res.rows_affected > 0 {
        debug!(%contact_id, demoted = res.rows_affected, "previous primary demoted");
    }
    Ok(res.rows_affected)
}

async fn insert_link<C: ConnectionTrait>(
    db: &C,
    organisation: &organisations::Model,
    contact: &contacts::Model,
    link: LinkDetails,
) -> HubResult<organisation_contacts::Model> {
    let already_linked = organisation_contacts::Entity::find()
        .filter(organisation_contacts::Column::OrganisationId.eq(organisation.id))
        .filter(organisation_contacts::Column::ContactId.eq(contact.id))
        .one(db)
        .await?;
    if already_linked.is_some() {
        return Err(HubError::Conflict(format!(
            "{} is already linked to {}",
            contact.display_name(),
            organisation.organisation_name
        )));
    }

    let now: DateTimeWithTimeZone = Utc::now().into();
    if link.is_primary {
        demote_other_primaries(db, contact.id, None, now).await?;
    }
    let model = organisation_contacts::ActiveModel {
        id: Set(Uuid::new_v4()),
        organisation_id: Set(organisation.id),
        contact_id: Set(contact.id),
        role: Set(link.role.trim().to_string()),
        is_primary: Set(link.is_primary),
        priority: Set(link
            .priority
            .unwrap_or_else(|| default_priority(link.is_primary))),
        organisation_name: Set(organisation.organisation_name.clone()),
        contact_name: Set(contact.display_name()),
        contact_email: Set(contact.email.clone()),
        contact_phone: Set(contact.phone.clone()),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(
        relationship_id = %model.id,
        organisation_id = %organisation.id,
        contact_id = %contact.id,
        is_primary = model.is_primary,
        "contact linked to organisation"
    );
    Ok(model)
}

/// Links a contact to an organisation. The returned record's `id` is the
/// relationship id used by later updates and removal.
#[instrument(
    name = "hub.relationships.add",
    skip_all,
    fields(organisation_id = %input.organisation_id, contact_id = %input.contact_id)
)]
pub async fn add_contact_to_organisation(
    db: &DatabaseConnection,
    input: NewRelationship,
) -> HubResult<organisation_contacts::Model> {
    check_link(&input.role, input.priority)?;
    let txn = db.begin().await?;
    let organisation = orgs::require(&txn, input.organisation_id).await?;
    let contact = crate::contacts::require(&txn, input.contact_id).await?;
    let link = LinkDetails {
        role: input.role,
        is_primary: input.is_primary,
        priority: input.priority,
    };
    let model = insert_link(&txn, &organisation, &contact, link).await?;
    txn.commit().await?;
    Ok(model)
}

/// Changes role, primary flag or priority. Toggling the primary flag without
/// an explicit priority moves the link to the matching default priority.
#[instrument(name = "hub.relationships.update", skip(db, patch))]
pub async fn update_relationship(
    db: &DatabaseConnection,
    id: Uuid,
    patch: RelationshipPatch,
) -> HubResult<organisation_contacts::Model> {
    let mut checks = Checks::new();
    if let Some(role) = &patch.role {
        checks.required("role", role);
    }
    checks
        .check(
            "priority",
            patch.priority.is_none_or(|p| p >= 0),
            NEGATIVE_PRIORITY_HINT,
        )
        .finish()?;
    let txn = db.begin().await?;
    let existing = get(&txn, id)
        .await?
        .ok_or_else(|| HubError::not_found(ENTITY, id))?;
    let now: DateTimeWithTimeZone = Utc::now().into();

    let mut active: organisation_contacts::ActiveModel = existing.clone().into();
    if let Some(role) = patch.role {
        active.role = Set(role.trim().to_string());
    }
    if let Some(is_primary) = patch.is_primary {
        if is_primary {
            demote_other_primaries(&txn, existing.contact_id, Some(id), now).await?;
        }
        active.is_primary = Set(is_primary);
        if patch.priority.is_none() && is_primary != existing.is_primary {
            active.priority = Set(default_priority(is_primary));
        }
    }
    if let Some(priority) = patch.priority {
        active.priority = Set(priority);
    }
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;
    txn.commit().await?;
    info!(relationship_id = %id, "relationship updated");
    Ok(updated)
}

#[instrument(name = "hub.relationships.remove", skip(db))]
pub async fn remove_contact_from_organisation<C: ConnectionTrait>(
    db: &C,
    relationship_id: Uuid,
) -> HubResult<bool> {
    let res = organisation_contacts::Entity::delete_by_id(relationship_id)
        .exec(db)
        .await?;
    if res.rows_affected > 0 {
        info!(%relationship_id, "relationship removed");
    }
    Ok(res.rows_affected > 0)
}

pub async fn fetch_contacts_by_organisation<C: ConnectionTrait>(
    db: &C,
    organisation_id: Uuid,
) -> HubResult<Vec<organisation_contacts::Model>> {
    let rows = organisation_contacts::Entity::find()
        .filter(organisation_contacts::Column::OrganisationId.eq(organisation_id))
        .order_by_asc(organisation_contacts::Column::Priority)
        .order_by_asc(organisation_contacts::Column::ContactName)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn fetch_organisations_by_contact<C: ConnectionTrait>(
    db: &C,
    contact_id: Uuid,
) -> HubResult<Vec<organisation_contacts::Model>> {
    let rows = organisation_contacts::Entity::find()
        .filter(organisation_contacts::Column::ContactId.eq(contact_id))
        .order_by_asc(organisation_contacts::Column::Priority)
        .order_by_asc(organisation_contacts::Column::OrganisationName)
        .all(db)
        .await?;
    Ok(rows)
}

pub async fn primary_organisation_for_contact<C: ConnectionTrait>(
    db: &C,
    contact_id: Uuid,
) -> HubResult<Option<organisations::Model>> {
    let link = organisation_contacts::Entity::find()
        .filter(organisation_contacts::Column::ContactId.eq(contact_id))
        .filter(organisation_contacts::Column::IsPrimary.eq(true))
        .order_by_asc(organisation_contacts::Column::Priority)
        .one(db)
        .await?;
    match link {
        Some(link) => orgs::get(db, link.organisation_id).await,
        None => Ok(None),
    }
}

/// Organisations whose name contains `term` and that the contact is not yet
/// linked to.
#[instrument(name = "hub.relationships.search_unlinked", skip(db))]
pub async fn search_unlinked_organisations<C: ConnectionTrait>(
    db: &C,
    contact_id: Uuid,
    term: &str,
) -> HubResult<Vec<organisations::Model>> {
    let Some(pattern) = like_pattern(term) else {
        return Ok(vec![]);
    };
    let linked = Query::select()
        .column(organisation_contacts::Column::OrganisationId)
        .from(organisation_contacts::Entity)
        .and_where(Expr::col(organisation_contacts::Column::ContactId).eq(contact_id))
        .to_owned();
    let rows = organisations::Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col((
                organisations::Entity,
                organisations::Column::OrganisationName,
            ))))
            .like(pattern),
        )
        .filter(organisations::Column::Id.not_in_subquery(linked))
        .order_by_asc(organisations::Column::OrganisationName)
        .limit(orgs::MAX_SEARCH_RESULTS)
        .all(db)
        .await?;
    Ok(rows)
}

/// Creates an organisation and links the contact to it atomically.
#[instrument(name = "hub.relationships.create_organisation", skip(db, organisation, link))]
pub async fn create_organisation_for_contact(
    db: &DatabaseConnection,
    contact_id: Uuid,
    organisation: NewOrganisation,
    link: LinkDetails,
) -> HubResult<(organisations::Model, organisation_contacts::Model)> {
    check_link(&link.role, link.priority)?;
    let txn = db.begin().await?;
    let contact = crate::contacts::require(&txn, contact_id).await?;
    let organisation = orgs::create(&txn, organisation).await?;
    let relationship = insert_link(&txn, &organisation, &contact, link).await?;
    txn.commit().await?;
    Ok((organisation, relationship))
}
