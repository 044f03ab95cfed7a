use async_graphql::{Context, Enum, InputObject, Object, SimpleObject};
use chrono::{NaiveDate, Utc};
use entity::quotes::{LineItem, Model};
use hub::quotes::{self, NewQuote, QuotePatch};
use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::instrument;
use uuid::Uuid;

use super::{ListArgs, db, hub_error, list_query};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "entity::quotes::Status")]
pub enum QuoteStatus {
    Draft,
    Sent,
    Accepted,
    Rejected,
    Expired,
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "LineItem")]
pub struct LineItemNode {
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
    pub amount_cents: Option<i64>,
}

impl From<LineItem> for LineItemNode {
    fn from(item: LineItem) -> Self {
        Self {
            amount_cents: item.amount_cents(),
            description: item.description,
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
}

impl From<LineItemInput> for LineItem {
    fn from(input: LineItemInput) -> Self {
        Self {
            description: input.description,
            quantity: input.quantity,
            unit_price_cents: input.unit_price_cents,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Quote")]
pub struct QuoteNode {
    pub id: Uuid,
    pub subject: String,
    pub quote_number: String,
    pub status: QuoteStatus,
    pub issue_date: NaiveDate,
    pub expiry_date: Option<NaiveDate>,
    pub line_items: Vec<LineItemNode>,
    pub total_cents: i64,
    pub organisation_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for QuoteNode {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            subject: model.subject,
            quote_number: model.quote_number,
            status: model.status.into(),
            issue_date: model.issue_date,
            expiry_date: model.expiry_date,
            line_items: model.line_items.0.into_iter().map(Into::into).collect(),
            total_cents: model.total_cents,
            organisation_id: model.organisation_id,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct CreateQuoteInput {
    pub subject: String,
    /// Generated as `Q-00001`, `Q-00002`, ... when omitted.
    pub quote_number: Option<String>,
    pub status: Option<QuoteStatus>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    #[graphql(default)]
    pub line_items: Vec<LineItemInput>,
    pub organisation_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct UpdateQuoteInput {
    pub subject: Option<String>,
    pub status: Option<QuoteStatus>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    #[graphql(default)]
    pub clear_expiry_date: bool,
    pub line_items: Option<Vec<LineItemInput>>,
    pub organisation_id: Option<Uuid>,
    #[graphql(default)]
    pub clear_organisation: bool,
    pub notes: Option<String>,
}

#[derive(Default)]
pub struct QuoteQuery;

#[Object]
impl QuoteQuery {
    async fn quotes(
        &self,
        ctx: &Context<'_>,
        query: Option<ListArgs>,
    ) -> async_graphql::Result<Vec<QuoteNode>> {
        let query = list_query(query)?;
        let rows = quotes::list(db(ctx)?, &query).await.map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn quote(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<Option<QuoteNode>> {
        let row = quotes::get(db(ctx)?, id).await.map_err(hub_error)?;
        Ok(row.map(Into::into))
    }
}

#[derive(Default)]
pub struct QuoteMutation;

#[Object]
impl QuoteMutation {
    #[instrument(name = "graphql.create_quote", skip_all)]
    async fn create_quote(
        &self,
        ctx: &Context<'_>,
        input: CreateQuoteInput,
    ) -> async_graphql::Result<QuoteNode> {
        let input = NewQuote {
            subject: input.subject,
            quote_number: input.quote_number,
            status: input.status.map(Into::into),
            issue_date: input.issue_date,
            expiry_date: input.expiry_date,
            line_items: input.line_items.into_iter().map(Into::into).collect(),
            organisation_id: input.organisation_id,
            notes: input.notes,
        };
        let model = quotes::create(db(ctx)?, input).await.map_err(hub_error)?;
        Ok(model.into())
    }

    #[instrument(name = "graphql.update_quote", skip_all, fields(id = %id))]
    async fn update_quote(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateQuoteInput,
    ) -> async_graphql::Result<QuoteNode> {
        let patch = QuotePatch {
            subject: input.subject,
            status: input.status.map(Into::into),
            issue_date: input.issue_date,
            expiry_date: input.expiry_date,
            clear_expiry_date: input.clear_expiry_date,
            line_items: input
                .line_items
                .map(|items| items.into_iter().map(Into::into).collect()),
            organisation_id: input.organisation_id,
            clear_organisation: input.clear_organisation,
            notes: input.notes,
        };
        let model = quotes::update(db(ctx)?, id, patch).await.map_err(hub_error)?;
        Ok(model.into())
    }

    async fn delete_quote(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<bool> {
        quotes::delete(db(ctx)?, id).await.map_err(hub_error)
    }

    /// Marks sent quotes past their expiry date as expired. `today` defaults
    /// to the server's current UTC date.
    #[instrument(name = "graphql.expire_overdue_quotes", skip_all)]
    async fn expire_overdue_quotes(
        &self,
        ctx: &Context<'_>,
        today: Option<NaiveDate>,
    ) -> async_graphql::Result<u64> {
        let today = today.unwrap_or_else(|| Utc::now().date_naive());
        quotes::expire_overdue(db(ctx)?, today)
            .await
            .map_err(hub_error)
    }
}
