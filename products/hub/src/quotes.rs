use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use entity::quotes::{self, LineItem, LineItems, Status};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QuerySelect,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{HubError, HubResult};
use crate::query::{FieldKind, ListQuery, Queryable, SortDirection, apply_list_query};
use crate::store::Resource;
use crate::text::{clean, patch};
use crate::validation::Checks;

pub const ENTITY: &str = "quote";
pub const NUMBER_PREFIX: &str = "Q-";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewQuote {
    pub subject: String,
    pub quote_number: Option<String>,
    pub status: Option<Status>,
    /// Defaults to today.
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub line_items: Vec<LineItem>,
    pub organisation_id: Option<Uuid>,
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotePatch {
    pub subject: Option<String>,
    pub status: Option<Status>,
    pub issue_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    /// Removes the expiry date; wins over `expiry_date`.
    #[serde(default)]
    pub clear_expiry_date: bool,
    pub line_items: Option<Vec<LineItem>>,
    pub organisation_id: Option<Uuid>,
    #[serde(default)]
    pub clear_organisation: bool,
    pub notes: Option<String>,
}

fn check_line_items(checks: &mut Checks, items: &[LineItem]) {
    for (index, item) in items.iter().enumerate() {
        checks
            .required(&format!("lineItems[{index}].description"), &item.description)
            .check(
                &format!("lineItems[{index}].quantity"),
                item.quantity.is_finite() && item.quantity >= 0.0,
                "Quantity cannot be negative",
            )
            .check(
                &format!("lineItems[{index}].unitPriceCents"),
                item.unit_price_cents >= 0,
                "Unit price cannot be negative",
            );
    }
}

fn check_dates(checks: &mut Checks, issue: NaiveDate, expiry: Option<NaiveDate>) {
    checks.check(
        "expiryDate",
        expiry.is_none_or(|expiry| expiry >= issue),
        "Expiry date cannot be before the issue date",
    );
}

fn quote_total(items: &LineItems) -> HubResult<i64> {
    items
        .total_cents()
        .ok_or_else(|| HubError::validation("lineItems: Quote total is too large"))
}

/// Formats the sequence number of a generated quote number.
pub fn format_number(sequence: u64) -> String {
    format!("{NUMBER_PREFIX}{sequence:05}")
}

fn parse_number(quote_number: &str) -> Option<u64> {
    quote_number.strip_prefix(NUMBER_PREFIX)?.parse().ok()
}

/// Next free `Q-NNNNN` number. Hand-entered numbers outside that shape are
/// ignored.
pub async fn next_quote_number<C: ConnectionTrait>(db: &C) -> HubResult<String> {
    let numbers: Vec<String> = quotes::Entity::find()
        .select_only()
        .column(quotes::Column::QuoteNumber)
        .filter(quotes::Column::QuoteNumber.starts_with(NUMBER_PREFIX))
        .into_tuple()
        .all(db)
        .await?;
    let highest = numbers
        .iter()
        .filter_map(|number| parse_number(number))
        .max()
        .unwrap_or(0);
    let next = highest.checked_add(1).ok_or_else(|| {
        HubError::Conflict(format!("no quote number follows {}", format_number(highest)))
    })?;
    Ok(format_number(next))
}

impl Queryable for quotes::Entity {
    fn field(name: &str) -> Option<(quotes::Column, FieldKind)> {
        use quotes::Column;
        let mapped = match name {
            "id" => (Column::Id, FieldKind::Uuid),
            "subject" => (Column::Subject, FieldKind::Text),
            "quoteNumber" => (Column::QuoteNumber, FieldKind::Text),
            "status" => (Column::Status, FieldKind::Text),
            "issueDate" => (Column::IssueDate, FieldKind::Date),
            "expiryDate" => (Column::ExpiryDate, FieldKind::Date),
            "totalCents" => (Column::TotalCents, FieldKind::Int),
            "organisationId" => (Column::OrganisationId, FieldKind::Uuid),
            "createdAt" => (Column::CreatedAt, FieldKind::Timestamp),
            "updatedAt" => (Column::UpdatedAt, FieldKind::Timestamp),
            _ => return None,
        };
        Some(mapped)
    }

    fn default_order() -> (quotes::Column, SortDirection) {
        (quotes::Column::IssueDate, SortDirection::Desc)
    }
}

#[instrument(name = "hub.quotes.list", skip_all, fields(filters = query.filters.len()))]
pub async fn list<C: ConnectionTrait>(db: &C, query: &ListQuery) -> HubResult<Vec<quotes::Model>> {
    let select = apply_list_query(quotes::Entity::find(), query)?;
    Ok(select.all(db).await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<Option<quotes::Model>> {
    Ok(quotes::Entity::find_by_id(id).one(db).await?)
}

#[instrument(name = "hub.quotes.create", skip_all)]
pub async fn create<C: ConnectionTrait>(db: &C, input: NewQuote) -> HubResult<quotes::Model> {
    let issue_date = input.issue_date.unwrap_or_else(|| Utc::now().date_naive());
    let mut checks = Checks::new();
    checks.required("subject", &input.subject);
    check_line_items(&mut checks, &input.line_items);
    check_dates(&mut checks, issue_date, input.expiry_date);
    checks.finish()?;

    let quote_number = match clean(input.quote_number) {
        Some(number) => {
            let taken = quotes::Entity::find()
                .filter(quotes::Column::QuoteNumber.eq(number.as_str()))
                .one(db)
                .await?;
            if taken.is_some() {
                return Err(HubError::Conflict(format!(
                    "quote number {number} is already in use"
                )));
            }
            number
        }
        None => next_quote_number(db).await?,
    };

    let line_items = LineItems(input.line_items);
    let total_cents = quote_total(&line_items)?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let model = quotes::ActiveModel {
        id: Set(Uuid::new_v4()),
        subject: Set(input.subject.trim().to_string()),
        quote_number: Set(quote_number),
        status: Set(input.status.unwrap_or(Status::Draft)),
        issue_date: Set(issue_date),
        expiry_date: Set(input.expiry_date),
        total_cents: Set(total_cents),
        line_items: Set(line_items),
        organisation_id: Set(input.organisation_id),
        notes: Set(clean(input.notes)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(
        quote_id = %model.id,
        quote_number = %model.quote_number,
        total_cents = model.total_cents,
        "quote created"
    );
    Ok(model)
}

#[instrument(name = "hub.quotes.update", skip(db, input))]
pub async fn update<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
    input: QuotePatch,
) -> HubResult<quotes::Model> {
    let existing = get(db, id)
        .await?
        .ok_or_else(|| HubError::not_found(ENTITY, id))?;

    let issue_date = input.issue_date.unwrap_or(existing.issue_date);
    let expiry_date = if input.clear_expiry_date {
        None
    } else {
        input.expiry_date.or(existing.expiry_date)
    };
    let mut checks = Checks::new();
    if let Some(subject) = &input.subject {
        checks.required("subject", subject);
    }
    if let Some(items) = &input.line_items {
        check_line_items(&mut checks, items);
    }
    check_dates(&mut checks, issue_date, expiry_date);
    checks.finish()?;

    let line_items = input
        .line_items
        .map(LineItems)
        .unwrap_or_else(|| existing.line_items.clone());
    let total_cents = quote_total(&line_items)?;
    let mut active: quotes::ActiveModel = existing.clone().into();
    if let Some(subject) = input.subject {
        active.subject = Set(subject.trim().to_string());
    }
    if let Some(status) = input.status {
        active.status = Set(status);
    }
    if input.clear_organisation {
        active.organisation_id = Set(None);
    } else if let Some(organisation_id) = input.organisation_id {
        active.organisation_id = Set(Some(organisation_id));
    }
    active.issue_date = Set(issue_date);
    active.expiry_date = Set(expiry_date);
    active.total_cents = Set(total_cents);
    active.line_items = Set(line_items);
    active.notes = Set(patch(existing.notes, input.notes));
    active.updated_at = Set(Utc::now().into());
    Ok(active.update(db).await?)
}

#[instrument(name = "hub.quotes.delete", skip(db))]
pub async fn delete<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<bool> {
    let res = quotes::Entity::delete_by_id(id).exec(db).await?;
    Ok(res.rows_affected > 0)
}

/// Marks sent quotes whose expiry date has passed as expired.
#[instrument(name = "hub.quotes.expire_overdue", skip(db))]
pub async fn expire_overdue<C: ConnectionTrait>(db: &C, today: NaiveDate) -> HubResult<u64> {
    let now: DateTimeWithTimeZone = Utc::now().into();
    let res = quotes::Entity::update_many()
        .col_expr(quotes::Column::Status, Expr::value(Status::Expired))
        .col_expr(quotes::Column::UpdatedAt, Expr::value(now))
        .filter(quotes::Column::Status.eq(Status::Sent))
        .filter(quotes::Column::ExpiryDate.lt(today))
        .exec(db)
        .await?;
    if res.rows_affected > 0 {
        info!(expired = res.rows_affected, %today, "overdue quotes expired");
    }
    Ok(res.rows_affected)
}

pub struct Quotes;

#[async_trait]
impl Resource for Quotes {
    type Record = quotes::Model;
    type New = NewQuote;
    type Patch = QuotePatch;

    const NAME: &'static str = ENTITY;

    fn id_of(record: &quotes::Model) -> Uuid {
        record.id
    }

    async fn list(db: &DatabaseConnection, query: &ListQuery) -> HubResult<Vec<quotes::Model>> {
        list(db, query).await
    }

    async fn get(db: &DatabaseConnection, id: Uuid) -> HubResult<Option<quotes::Model>> {
        get(db, id).await
    }

    async fn create(db: &DatabaseConnection, input: NewQuote) -> HubResult<quotes::Model> {
        create(db, input).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        patch: QuotePatch,
    ) -> HubResult<quotes::Model> {
        update(db, id, patch).await
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> HubResult<bool> {
        delete(db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_numbers_are_zero_padded() {
        assert_eq!(format_number(1), "Q-00001");
        assert_eq!(format_number(123456), "Q-123456");
        assert_eq!(parse_number("Q-00042"), Some(42));
        assert_eq!(parse_number("Q-4294967296"), Some(4_294_967_296));
        assert_eq!(parse_number("INV-7"), None);
        assert_eq!(parse_number("Q-draft"), None);
    }

    #[test]
    fn negative_line_items_are_rejected() {
        let mut checks = Checks::new();
        check_line_items(
            &mut checks,
            &[LineItem {
                description: "Hosting".into(),
                quantity: -1.0,
                unit_price_cents: 100,
            }],
        );
        let err = checks.finish().unwrap_err();
        assert!(err.to_string().contains("lineItems[0].quantity"));
    }

    #[test]
    fn expiry_before_issue_is_rejected() {
        let issue = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let mut checks = Checks::new();
        check_dates(&mut checks, issue, NaiveDate::from_ymd_opt(2024, 4, 30));
        assert!(checks.finish().is_err());
    }
}
