use async_trait::async_trait;
use chrono::Utc;
use entity::leads::{self, ContactPerson};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ConnectionTrait, DatabaseConnection, EntityTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{HubError, HubResult};
use crate::query::{FieldKind, ListQuery, Queryable, SortDirection, apply_list_query};
use crate::store::Resource;
use crate::text::{clean, patch};
use crate::validation::Checks;

pub const ENTITY: &str = "lead";
pub const DEFAULT_STATUS: &str = "new";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLead {
    pub contact_person: ContactPerson,
    pub company_name: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub organisation_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadPatch {
    pub contact_person: Option<ContactPerson>,
    pub company_name: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub organisation_id: Option<Uuid>,
    /// Detaches the lead from its organisation; wins over `organisation_id`.
    #[serde(default)]
    pub clear_organisation: bool,
    pub notes: Option<String>,
}

fn check_person(checks: &mut Checks, person: &ContactPerson) {
    checks
        .required("contactPerson.firstName", &person.first_name)
        .email("contactPerson.email", person.email.as_deref())
        .phone("contactPerson.phone", person.phone.as_deref());
}

fn cleaned_person(person: ContactPerson) -> ContactPerson {
    ContactPerson {
        first_name: person.first_name.trim().to_string(),
        last_name: clean(person.last_name),
        email: clean(person.email),
        phone: clean(person.phone),
        job_title: clean(person.job_title),
    }
}

impl Queryable for leads::Entity {
    fn field(name: &str) -> Option<(leads::Column, FieldKind)> {
        use leads::Column;
        let mapped = match name {
            "id" => (Column::Id, FieldKind::Uuid),
            "companyName" => (Column::CompanyName, FieldKind::Text),
            "status" => (Column::Status, FieldKind::Text),
            "source" => (Column::Source, FieldKind::Text),
            "organisationId" => (Column::OrganisationId, FieldKind::Uuid),
            "createdAt" => (Column::CreatedAt, FieldKind::Timestamp),
            "updatedAt" => (Column::UpdatedAt, FieldKind::Timestamp),
            _ => return None,
        };
        Some(mapped)
    }

    fn default_order() -> (leads::Column, SortDirection) {
        (leads::Column::CreatedAt, SortDirection::Desc)
    }
}

#[instrument(name = "hub.leads.list", skip_all, fields(filters = query.filters.len()))]
pub async fn list<C: ConnectionTrait>(db: &C, query: &ListQuery) -> HubResult<Vec<leads::Model>> {
    let select = apply_list_query(leads::Entity::find(), query)?;
    Ok(select.all(db).await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<Option<leads::Model>> {
    Ok(leads::Entity::find_by_id(id).one(db).await?)
}

#[instrument(name = "hub.leads.create", skip_all)]
pub async fn create<C: ConnectionTrait>(db: &C, input: NewLead) -> HubResult<leads::Model> {
    let mut checks = Checks::new();
    check_person(&mut checks, &input.contact_person);
    checks.finish()?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = leads::ActiveModel {
        id: Set(Uuid::new_v4()),
        contact_person: Set(cleaned_person(input.contact_person)),
        company_name: Set(clean(input.company_name)),
        status: Set(clean(input.status).unwrap_or_else(|| DEFAULT_STATUS.to_string())),
        source: Set(clean(input.source)),
        organisation_id: Set(input.organisation_id),
        notes: Set(clean(input.notes)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(lead_id = %model.id, status = %model.status, "lead created");
    Ok(model)
}

#[instrument(name = "hub.leads.update", skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: LeadPatch,
) -> HubResult<leads::Model> {
    let mut checks = Checks::new();
    if let Some(person) = &input.contact_person {
        check_person(&mut checks, person);
    }
    if let Some(status) = &input.status {
        checks.required("status", status);
    }
    checks.finish()?;

    let existing = get(db, id)
        .await?
        .ok_or_else(|| HubError::not_found(ENTITY, id))?;
    let mut active: leads::ActiveModel = existing.clone().into();
    if let Some(person) = input.contact_person {
        active.contact_person = Set(cleaned_person(person));
    }
    if let Some(status) = input.status {
        active.status = Set(status.trim().to_string());
    }
    active.company_name = Set(patch(existing.company_name, input.company_name));
    active.source = Set(patch(existing.source, input.source));
    active.notes = Set(patch(existing.notes, input.notes));
    if input.clear_organisation {
        active.organisation_id = Set(None);
    } else if let Some(organisation_id) = input.organisation_id {
        active.organisation_id = Set(Some(organisation_id));
    }
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(name = "hub.leads.delete", skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<bool> {
    let res = leads::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

pub struct Leads;

#[async_trait]
impl Resource for Leads {
    type Record = leads::Model;
    type New = NewLead;
    type Patch = LeadPatch;

    const NAME: &'static str = ENTITY;

    fn id_of(record: &leads::Model) -> Uuid {
        record.id
    }

    async fn list(db: &DatabaseConnection, query: &ListQuery) -> HubResult<Vec<leads::Model>> {
        list(db, query).await
    }

    async fn get(db: &DatabaseConnection, id: Uuid) -> HubResult<Option<leads::Model>> {
        get(db, id).await
    }

    async fn create(db: &DatabaseConnection, input: NewLead) -> HubResult<leads::Model> {
        create(db, input).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        patch: LeadPatch,
    ) -> HubResult<leads::Model> {
        update(db, id, patch).await
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> HubResult<bool> {
        delete(db, id).await
    }
}
