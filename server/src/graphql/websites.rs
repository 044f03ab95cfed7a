use async_graphql::{Context, InputObject, Object, SimpleObject};
use chrono::NaiveDate;
use entity::websites::Model;
use hub::websites::{self, NewWebsite, WebsitePatch};
use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::instrument;
use uuid::Uuid;

use super::{ListArgs, db, hub_error, list_query};

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Website")]
pub struct WebsiteNode {
    pub id: Uuid,
    pub name: String,
    pub url: String,
    pub organisation_id: Option<Uuid>,
    pub status: Option<String>,
    pub website_type: Option<String>,
    pub hosting_provider: Option<String>,
    pub launch_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for WebsiteNode {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            url: model.url,
            organisation_id: model.organisation_id,
            status: model.status,
            website_type: model.website_type,
            hosting_provider: model.hosting_provider,
            launch_date: model.launch_date,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct CreateWebsiteInput {
    pub name: String,
    pub url: String,
    pub organisation_id: Option<Uuid>,
    pub status: Option<String>,
    pub website_type: Option<String>,
    pub hosting_provider: Option<String>,
    pub launch_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct UpdateWebsiteInput {
    pub name: Option<String>,
    pub url: Option<String>,
    pub organisation_id: Option<Uuid>,
    #[graphql(default)]
    pub clear_organisation: bool,
    pub status: Option<String>,
    pub website_type: Option<String>,
    pub hosting_provider: Option<String>,
    pub launch_date: Option<NaiveDate>,
    #[graphql(default)]
    pub clear_launch_date: bool,
    pub notes: Option<String>,
}

#[derive(Default)]
pub struct WebsiteQuery;

#[Object]
impl WebsiteQuery {
    async fn websites(
        &self,
        ctx: &Context<'_>,
        query: Option<ListArgs>,
    ) -> async_graphql::Result<Vec<WebsiteNode>> {
        let query = list_query(query)?;
        let rows = websites::list(db(ctx)?, &query).await.map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn website(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<Option<WebsiteNode>> {
        let row = websites::get(db(ctx)?, id).await.map_err(hub_error)?;
        Ok(row.map(Into::into))
    }

    /// Matches the site name or its url.
    async fn search_websites(
        &self,
        ctx: &Context<'_>,
        term: String,
    ) -> async_graphql::Result<Vec<WebsiteNode>> {
        let rows = websites::search_by_name(db(ctx)?, &term)
            .await
            .map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Default)]
pub struct WebsiteMutation;

#[Object]
impl WebsiteMutation {
    #[instrument(name = "graphql.create_website", skip_all)]
    async fn create_website(
        &self,
        ctx: &Context<'_>,
        input: CreateWebsiteInput,
    ) -> async_graphql::Result<WebsiteNode> {
        let input = NewWebsite {
            name: input.name,
            url: input.url,
            organisation_id: input.organisation_id,
            status: input.status,
            website_type: input.website_type,
            hosting_provider: input.hosting_provider,
            launch_date: input.launch_date,
            notes: input.notes,
        };
        let model = websites::create(db(ctx)?, input).await.map_err(hub_error)?;
        Ok(model.into())
    }

    #[instrument(name = "graphql.update_website", skip_all, fields(id = %id))]
    async fn update_website(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateWebsiteInput,
    ) -> async_graphql::Result<WebsiteNode> {
        let patch = WebsitePatch {
            name: input.name,
            url: input.url,
            organisation_id: input.organisation_id,
            clear_organisation: input.clear_organisation,
            status: input.status,
            website_type: input.website_type,
            hosting_provider: input.hosting_provider,
            launch_date: input.launch_date,
            clear_launch_date: input.clear_launch_date,
            notes: input.notes,
        };
        let model = websites::update(db(ctx)?, id, patch).await.map_err(hub_error)?;
        Ok(model.into())
    }

    async fn delete_website(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<bool> {
        websites::delete(db(ctx)?, id).await.map_err(hub_error)
    }
}
