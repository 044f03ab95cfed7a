use async_trait::async_trait;
use chrono::Utc;
use entity::{contacts, organisation_contacts};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, ConnectionTrait,
    DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{HubError, HubResult};
use crate::query::{FieldKind, ListQuery, Queryable, SortDirection, apply_list_query, like_pattern};
use crate::store::{Resource, Searchable};
use crate::text::{clean, patch};
use crate::validation::Checks;

pub const ENTITY: &str = "contact";
pub const MAX_SEARCH_RESULTS: u64 = 50;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub profile_image_url: Option<String>,
    pub colour: Option<String>,
    pub icon: Option<String>,
    pub notes: Option<String>,
}

impl NewContact {
    fn validate(&self) -> HubResult<()> {
        Checks::new()
            .required("firstName", &self.first_name)
            .email("email", self.email.as_deref())
            .phone("phone", self.phone.as_deref())
            .phone("mobile", self.mobile.as_deref())
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub mobile: Option<String>,
    pub job_title: Option<String>,
    pub department: Option<String>,
    pub role: Option<String>,
    pub status: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub profile_image_url: Option<String>,
    pub colour: Option<String>,
    pub icon: Option<String>,
    pub notes: Option<String>,
}

impl ContactPatch {
    fn validate(&self) -> HubResult<()> {
        let mut checks = Checks::new();
        if let Some(first_name) = &self.first_name {
            checks.required("firstName", first_name);
        }
        checks
            .email("email", self.email.as_deref())
            .phone("phone", self.phone.as_deref())
            .phone("mobile", self.mobile.as_deref())
            .finish()
    }
}

impl Queryable for contacts::Entity {
    fn field(name: &str) -> Option<(contacts::Column, FieldKind)> {
        use contacts::Column;
        let mapped = match name {
            "id" => (Column::Id, FieldKind::Uuid),
            "firstName" => (Column::FirstName, FieldKind::Text),
            "lastName" => (Column::LastName, FieldKind::Text),
            "email" => (Column::Email, FieldKind::Text),
            "phone" => (Column::Phone, FieldKind::Text),
            "mobile" => (Column::Mobile, FieldKind::Text),
            "jobTitle" => (Column::JobTitle, FieldKind::Text),
            "department" => (Column::Department, FieldKind::Text),
            "role" => (Column::Role, FieldKind::Text),
            "status" => (Column::Status, FieldKind::Text),
            "city" => (Column::City, FieldKind::Text),
            "state" => (Column::State, FieldKind::Text),
            "country" => (Column::Country, FieldKind::Text),
            "createdAt" => (Column::CreatedAt, FieldKind::Timestamp),
            "updatedAt" => (Column::UpdatedAt, FieldKind::Timestamp),
            _ => return None,
        };
        Some(mapped)
    }

    fn default_order() -> (contacts::Column, SortDirection) {
        (contacts::Column::FirstName, SortDirection::Asc)
    }
}

#[instrument(name = "hub.contacts.list", skip_all, fields(filters = query.filters.len()))]
pub async fn list<C: ConnectionTrait>(db: &C, query: &ListQuery) -> HubResult<Vec<contacts::Model>> {
    let select = apply_list_query(contacts::Entity::find(), query)?;
    Ok(select.all(db).await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<Option<contacts::Model>> {
    Ok(contacts::Entity::find_by_id(id).one(db).await?)
}

pub async fn require<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<contacts::Model> {
    get(db, id)
        .await?
        .ok_or_else(|| HubError::not_found(ENTITY, id))
}

#[instrument(name = "hub.contacts.create", skip_all)]
pub async fn create<C: ConnectionTrait>(db: &C, input: NewContact) -> HubResult<contacts::Model> {
    input.validate()?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = contacts::ActiveModel {
        id: Set(Uuid::new_v4()),
        first_name: Set(input.first_name.trim().to_string()),
        last_name: Set(clean(input.last_name)),
        email: Set(clean(input.email)),
        phone: Set(clean(input.phone)),
        mobile: Set(clean(input.mobile)),
        job_title: Set(clean(input.job_title)),
        department: Set(clean(input.department)),
        role: Set(clean(input.role)),
        status: Set(clean(input.status)),
        city: Set(clean(input.city)),
        state: Set(clean(input.state)),
        country: Set(clean(input.country)),
        profile_image_url: Set(clean(input.profile_image_url)),
        colour: Set(clean(input.colour)),
        icon: Set(clean(input.icon)),
        notes: Set(clean(input.notes)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(contact_id = %model.id, "contact created");
    Ok(model)
}

/// Updates a contact. When the name, email or phone changes, the copies held
/// by its organisation associations are rewritten in the same transaction.
#[instrument(name = "hub.contacts.update", skip(db, input))]
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    input: ContactPatch,
) -> HubResult<contacts::Model> {
    input.validate()?;
    let txn = db.begin().await?;
    let existing = require(&txn, id).await?;
    let now: DateTimeWithTimeZone = Utc::now().into();

    let mut active: contacts::ActiveModel = existing.clone().into();
    if let Some(first_name) = input.first_name {
        active.first_name = Set(first_name.trim().to_string());
    }
    active.last_name = Set(patch(existing.last_name.clone(), input.last_name));
    active.email = Set(patch(existing.email.clone(), input.email));
    active.phone = Set(patch(existing.phone.clone(), input.phone));
    active.mobile = Set(patch(existing.mobile.clone(), input.mobile));
    active.job_title = Set(patch(existing.job_title.clone(), input.job_title));
    active.department = Set(patch(existing.department.clone(), input.department));
    active.role = Set(patch(existing.role.clone(), input.role));
    active.status = Set(patch(existing.status.clone(), input.status));
    active.city = Set(patch(existing.city.clone(), input.city));
    active.state = Set(patch(existing.state.clone(), input.state));
    active.country = Set(patch(existing.country.clone(), input.country));
    active.profile_image_url = Set(patch(
        existing.profile_image_url.clone(),
        input.profile_image_url,
    ));
    active.colour = Set(patch(existing.colour.clone(), input.colour));
    active.icon = Set(patch(existing.icon.clone(), input.icon));
    active.notes = Set(patch(existing.notes.clone(), input.notes));
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    let display_changed = updated.display_name() != existing.display_name()
        || updated.email != existing.email
        || updated.phone != existing.phone;
    if display_changed {
        let refreshed = organisation_contacts::Entity::update_many()
            .col_expr(
                organisation_contacts::Column::ContactName,
                Expr::value(updated.display_name()),
            )
            .col_expr(
                organisation_contacts::Column::ContactEmail,
                Expr::value(updated.email.clone()),
            )
            .col_expr(
                organisation_contacts::Column::ContactPhone,
                Expr::value(updated.phone.clone()),
            )
            .col_expr(organisation_contacts::Column::UpdatedAt, Expr::value(now))
            .filter(organisation_contacts::Column::ContactId.eq(id))
            .exec(&txn)
            .await?;
        info!(
            contact_id = %id,
            associations = refreshed.rows_affected,
            "contact details copied to associations"
        );
    }
    txn.commit().await?;
    Ok(updated)
}

#[instrument(name = "hub.contacts.delete", skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> HubResult<bool> {
    let txn = db.begin().await?;
    organisation_contacts::Entity::delete_many()
        .filter(organisation_contacts::Column::ContactId.eq(id))
        .exec(&txn)
        .await?;
    let res = contacts::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    if res.rows_affected > 0 {
        info!(contact_id = %id, "contact deleted");
    }
    Ok(res.rows_affected > 0)
}

/// Matches the term against first name, last name and email.
#[instrument(name = "hub.contacts.search", skip(db))]
pub async fn search_by_name<C: ConnectionTrait>(
    db: &C,
    term: &str,
) -> HubResult<Vec<contacts::Model>> {
    let Some(pattern) = like_pattern(term) else {
        return Ok(vec![]);
    };
    let lowered = |column: contacts::Column| {
        Expr::expr(Func::lower(Expr::col((contacts::Entity, column)))).like(pattern.clone())
    };
    let rows = contacts::Entity::find()
        .filter(
            Condition::any()
                .add(lowered(contacts::Column::FirstName))
                .add(lowered(contacts::Column::LastName))
                .add(lowered(contacts::Column::Email)),
        )
        .order_by_asc(contacts::Column::FirstName)
        .order_by_asc(contacts::Column::LastName)
        .limit(MAX_SEARCH_RESULTS)
        .all(db)
        .await?;
    Ok(rows)
}

pub struct Contacts;

#[async_trait]
impl Resource for Contacts {
    type Record = contacts::Model;
    type New = NewContact;
    type Patch = ContactPatch;

    const NAME: &'static str = ENTITY;

    fn id_of(record: &contacts::Model) -> Uuid {
        record.id
    }

    async fn list(db: &DatabaseConnection, query: &ListQuery) -> HubResult<Vec<contacts::Model>> {
        list(db, query).await
    }

    async fn get(db: &DatabaseConnection, id: Uuid) -> HubResult<Option<contacts::Model>> {
        get(db, id).await
    }

    async fn create(db: &DatabaseConnection, input: NewContact) -> HubResult<contacts::Model> {
        create(db, input).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        patch: ContactPatch,
    ) -> HubResult<contacts::Model> {
        update(db, id, patch).await
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> HubResult<bool> {
        delete(db, id).await
    }
}

#[async_trait]
impl Searchable for Contacts {
    async fn search(db: &DatabaseConnection, term: &str) -> HubResult<Vec<contacts::Model>> {
        search_by_name(db, term).await
    }
}
