use async_graphql::{ComplexObject, Context, InputObject, Object, SimpleObject};
use entity::contacts::Model;
use hub::contacts::{self, ContactPatch, NewContact};
use hub::relationships;
use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::instrument;
use uuid::Uuid;

use super::organisations::OrganisationNode;
use super::relationships::RelationshipNode;
use super::{ListArgs, db, hub_error, list_query};

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Contact", complex)]
pub struct ContactNode {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: Option<String>,
    pub display_name: String,
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
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for ContactNode {
    fn from(model: Model) -> Self {
        Self {
            display_name: model.display_name(),
            id: model.id,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            phone: model.phone,
            mobile: model.mobile,
            job_title: model.job_title,
            department: model.department,
            role: model.role,
            status: model.status,
            city: model.city,
            state: model.state,
            country: model.country,
            profile_image_url: model.profile_image_url,
            colour: model.colour,
            icon: model.icon,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[ComplexObject]
impl ContactNode {
    async fn organisations(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Vec<RelationshipNode>> {
        let rows = relationships::fetch_organisations_by_contact(db(ctx)?, self.id)
            .await
            .map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn primary_organisation(
        &self,
        ctx: &Context<'_>,
    ) -> async_graphql::Result<Option<OrganisationNode>> {
        let row = relationships::primary_organisation_for_contact(db(ctx)?, self.id)
            .await
            .map_err(hub_error)?;
        Ok(row.map(Into::into))
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct CreateContactInput {
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

impl From<CreateContactInput> for NewContact {
    fn from(input: CreateContactInput) -> Self {
        Self {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            mobile: input.mobile,
            job_title: input.job_title,
            department: input.department,
            role: input.role,
            status: input.status,
            city: input.city,
            state: input.state,
            country: input.country,
            profile_image_url: input.profile_image_url,
            colour: input.colour,
            icon: input.icon,
            notes: input.notes,
        }
    }
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct UpdateContactInput {
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

impl From<UpdateContactInput> for ContactPatch {
    fn from(input: UpdateContactInput) -> Self {
        Self {
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone: input.phone,
            mobile: input.mobile,
            job_title: input.job_title,
            department: input.department,
            role: input.role,
            status: input.status,
            city: input.city,
            state: input.state,
            country: input.country,
            profile_image_url: input.profile_image_url,
            colour: input.colour,
            icon: input.icon,
            notes: input.notes,
        }
    }
}

#[derive(Default)]
pub struct ContactQuery;

#[Object]
impl ContactQuery {
    #[instrument(name = "graphql.contacts", skip_all)]
    async fn contacts(
        &self,
        ctx: &Context<'_>,
        query: Option<ListArgs>,
    ) -> async_graphql::Result<Vec<ContactNode>> {
        let query = list_query(query)?;
        let rows = contacts::list(db(ctx)?, &query).await.map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn contact(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<Option<ContactNode>> {
        let row = contacts::get(db(ctx)?, id).await.map_err(hub_error)?;
        Ok(row.map(Into::into))
    }

    /// Matches first name, last name or email.
    async fn search_contacts(
        &self,
        ctx: &Context<'_>,
        term: String,
    ) -> async_graphql::Result<Vec<ContactNode>> {
        let rows = contacts::search_by_name(db(ctx)?, &term)
            .await
            .map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Default)]
pub struct ContactMutation;

#[Object]
impl ContactMutation {
    #[instrument(name = "graphql.create_contact", skip_all)]
    async fn create_contact(
        &self,
        ctx: &Context<'_>,
        input: CreateContactInput,
    ) -> async_graphql::Result<ContactNode> {
        let model = contacts::create(db(ctx)?, input.into())
            .await
            .map_err(hub_error)?;
        Ok(model.into())
    }

    #[instrument(name = "graphql.update_contact", skip_all, fields(id = %id))]
    async fn update_contact(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateContactInput,
    ) -> async_graphql::Result<ContactNode> {
        let model = contacts::update(db(ctx)?, id, input.into())
            .await
            .map_err(hub_error)?;
        Ok(model.into())
    }

    #[instrument(name = "graphql.delete_contact", skip_all, fields(id = %id))]
    async fn delete_contact(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<bool> {
        contacts::delete(db(ctx)?, id).await.map_err(hub_error)
    }
}
