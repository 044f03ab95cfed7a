use async_graphql::{Context, InputObject, Object, SimpleObject};
use entity::leads::{ContactPerson, Model};
use hub::leads::{self, LeadPatch, NewLead};
use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::instrument;
use uuid::Uuid;

use super::{ListArgs, db, hub_error, list_query};

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "ContactPerson")]
pub struct ContactPersonNode {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
}

#[derive(Clone, Debug, InputObject)]
pub struct ContactPersonInput {
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub job_title: Option<String>,
}

impl From<ContactPersonInput> for ContactPerson {
    fn from(input: ContactPersonInput) -> Self {
        Self {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            job_title: input.job_title,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Lead")]
pub struct LeadNode {
    pub id: Uuid,
    pub contact_person: ContactPersonNode,
    pub company_name: Option<String>,
    pub status: String,
    pub source: Option<String>,
    pub organisation_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for LeadNode {
    fn from(model: Model) -> Self {
        let person = model.contact_person;
        Self {
            id: model.id,
            contact_person: ContactPersonNode {
                first_name: person.first_name,
                last_name: person.last_name,
                email: person.email,
                phone: person.phone,
                job_title: person.job_title,
            },
            company_name: model.company_name,
            status: model.status,
            source: model.source,
            organisation_id: model.organisation_id,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct CreateLeadInput {
    pub contact_person: ContactPersonInput,
    pub company_name: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub organisation_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct UpdateLeadInput {
    pub contact_person: Option<ContactPersonInput>,
    pub company_name: Option<String>,
    pub status: Option<String>,
    pub source: Option<String>,
    pub organisation_id: Option<Uuid>,
    #[graphql(default)]
    pub clear_organisation: bool,
    pub notes: Option<String>,
}

#[derive(Default)]
pub struct LeadQuery;

#[Object]
impl LeadQuery {
    async fn leads(
        &self,
        ctx: &Context<'_>,
        query: Option<ListArgs>,
    ) -> async_graphql::Result<Vec<LeadNode>> {
        let query = list_query(query)?;
        let rows = leads::list(db(ctx)?, &query).await.map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn lead(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<Option<LeadNode>> {
        let row = leads::get(db(ctx)?, id).await.map_err(hub_error)?;
        Ok(row.map(Into::into))
    }
}

#[derive(Default)]
pub struct LeadMutation;

#[Object]
impl LeadMutation {
    #[instrument(name = "graphql.create_lead", skip_all)]
    async fn create_lead(
        &self,
        ctx: &Context<'_>,
        input: CreateLeadInput,
    ) -> async_graphql::Result<LeadNode> {
        let input = NewLead {
            contact_person: input.contact_person.into(),
            company_name: input.company_name,
            status: input.status,
            source: input.source,
            organisation_id: input.organisation_id,
            notes: input.notes,
        };
        let model = leads::create(db(ctx)?, input).await.map_err(hub_error)?;
        Ok(model.into())
    }

    #[instrument(name = "graphql.update_lead", skip_all, fields(id = %id))]
    async fn update_lead(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateLeadInput,
    ) -> async_graphql::Result<LeadNode> {
        let patch = LeadPatch {
            contact_person: input.contact_person.map(Into::into),
            company_name: input.company_name,
            status: input.status,
            source: input.source,
            organisation_id: input.organisation_id,
            clear_organisation: input.clear_organisation,
            notes: input.notes,
        };
        let model = leads::update(db(ctx)?, id, patch).await.map_err(hub_error)?;
        Ok(model.into())
    }

    async fn delete_lead(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<bool> {
        leads::delete(db(ctx)?, id).await.map_err(hub_error)
    }
}
