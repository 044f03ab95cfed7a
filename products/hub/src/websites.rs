use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use entity::websites;
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, Condition, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{HubError, HubResult};
use crate::query::{FieldKind, ListQuery, Queryable, SortDirection, apply_list_query, like_pattern};
use crate::store::{Resource, Searchable};
use crate::text::{clean, patch};
use crate::validation::Checks;

pub const ENTITY: &str = "website";
pub const MAX_SEARCH_RESULTS: u64 = 50;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWebsite {
    pub name: String,
    pub url: String,
    pub organisation_id: Option<Uuid>,
    pub status: Option<String>,
    pub website_type: Option<String>,
    pub hosting_provider: Option<String>,
    pub launch_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebsitePatch {
    pub name: Option<String>,
    pub url: Option<String>,
    pub organisation_id: Option<Uuid>,
    #[serde(default)]
    pub clear_organisation: bool,
    pub status: Option<String>,
    pub website_type: Option<String>,
    pub hosting_provider: Option<String>,
    pub launch_date: Option<NaiveDate>,
    #[serde(default)]
    pub clear_launch_date: bool,
    pub notes: Option<String>,
}

impl Queryable for websites::Entity {
    fn field(name: &str) -> Option<(websites::Column, FieldKind)> {
        use websites::Column;
        let mapped = match name {
            "id" => (Column::Id, FieldKind::Uuid),
            "name" => (Column::Name, FieldKind::Text),
            "url" => (Column::Url, FieldKind::Text),
            "organisationId" => (Column::OrganisationId, FieldKind::Uuid),
            "status" => (Column::Status, FieldKind::Text),
            "websiteType" => (Column::WebsiteType, FieldKind::Text),
            "hostingProvider" => (Column::HostingProvider, FieldKind::Text),
            "launchDate" => (Column::LaunchDate, FieldKind::Date),
            "createdAt" => (Column::CreatedAt, FieldKind::Timestamp),
            "updatedAt" => (Column::UpdatedAt, FieldKind::Timestamp),
            _ => return None,
        };
        Some(mapped)
    }

    fn default_order() -> (websites::Column, SortDirection) {
        (websites::Column::Name, SortDirection::Asc)
    }
}

pub async fn list<C: ConnectionTrait>(db: &C, query: &ListQuery) -> HubResult<Vec<websites::Model>> {
    let select = apply_list_query(websites::Entity::find(), query)?;
    Ok(select.all(db).await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<Option<websites::Model>> {
    Ok(websites::Entity::find_by_id(id).one(db).await?)
}

#[instrument(name = "hub.websites.create", skip_all)]
pub async fn create<C: ConnectionTrait>(db: &C, input: NewWebsite) -> HubResult<websites::Model> {
    Checks::new()
        .required("name", &input.name)
        .required("url", &input.url)
        .website("url", Some(input.url.as_str()))
        .finish()?;

    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = websites::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(input.name.trim().to_string()),
        url: Set(input.url.trim().to_string()),
        organisation_id: Set(input.organisation_id),
        status: Set(clean(input.status)),
        website_type: Set(clean(input.website_type)),
        hosting_provider: Set(clean(input.hosting_provider)),
        launch_date: Set(input.launch_date),
        notes: Set(clean(input.notes)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(website_id = %model.id, url = %model.url, "website created");
    Ok(model)
}

#[instrument(name = "hub.websites.update", skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: WebsitePatch,
) -> HubResult<websites::Model> {
    let mut checks = Checks::new();
    if let Some(name) = &input.name {
        checks.required("name", name);
    }
    if let Some(url) = &input.url {
        checks.required("url", url).website("url", Some(url.as_str()));
    }
    checks.finish()?;

    let existing = get(db, id)
        .await?
        .ok_or_else(|| HubError::not_found(ENTITY, id))?;
    let mut active: websites::ActiveModel = existing.clone().into();
    if let Some(name) = input.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(url) = input.url {
        active.url = Set(url.trim().to_string());
    }
    if input.clear_organisation {
        active.organisation_id = Set(None);
    } else if let Some(organisation_id) = input.organisation_id {
        active.organisation_id = Set(Some(organisation_id));
    }
    if input.clear_launch_date {
        active.launch_date = Set(None);
    } else if let Some(launch_date) = input.launch_date {
        active.launch_date = Set(Some(launch_date));
    }
    active.status = Set(patch(existing.status, input.status));
    active.website_type = Set(patch(existing.website_type, input.website_type));
    active.hosting_provider = Set(patch(existing.hosting_provider, input.hosting_provider));
    active.notes = Set(patch(existing.notes, input.notes));
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(name = "hub.websites.delete", skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<bool> {
    let res = websites::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// Matches the term against the site name and its URL.
#[instrument(name = "hub.websites.search", skip(db))]
pub async fn search_by_name<C: ConnectionTrait>(
    db: &C,
    term: &str,
) -> HubResult<Vec<websites::Model>> {
    let Some(pattern) = like_pattern(term) else {
        return Ok(vec![]);
    };
    let rows = websites::Entity::find()
        .filter(
            Condition::any()
                .add(
                    Expr::expr(Func::lower(Expr::col((
                        websites::Entity,
                        websites::Column::Name,
                    ))))
                    .like(pattern.clone()),
                )
                .add(
                    Expr::expr(Func::lower(Expr::col((websites::Entity, websites::Column::Url))))
                        .like(pattern),
                ),
        )
        .order_by_asc(websites::Column::Name)
        .limit(MAX_SEARCH_RESULTS)
        .all(db)
        .await?;
    Ok(rows)
}

pub struct Websites;

#[async_trait]
impl Resource for Websites {
    type Record = websites::Model;
    type New = NewWebsite;
    type Patch = WebsitePatch;

    const NAME: &'static str = ENTITY;

    fn id_of(record: &websites::Model) -> Uuid {
        record.id
    }

    async fn list(db: &DatabaseConnection, query: &ListQuery) -> HubResult<Vec<websites::Model>> {
        list(db, query).await
    }

    async fn get(db: &DatabaseConnection, id: Uuid) -> HubResult<Option<websites::Model>> {
        get(db, id).await
    }

    async fn create(db: &DatabaseConnection, input: NewWebsite) -> HubResult<websites::Model> {
        create(db, input).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        patch: WebsitePatch,
    ) -> HubResult<websites::Model> {
        update(db, id, patch).await
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> HubResult<bool> {
        delete(db, id).await
    }
}

#[async_trait]
impl Searchable for Websites {
    async fn search(db: &DatabaseConnection, term: &str) -> HubResult<Vec<websites::Model>> {
        search_by_name(db, term).await
    }
}
