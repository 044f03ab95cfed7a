use sea_orm::FromJsonQueryResult;
use sea_orm::prelude::{DateTimeWithTimeZone, *};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quotes")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub subject: String,
    #[sea_orm(unique)]
    pub quote_number: String,
    pub status: Status,
    pub issue_date: Date,
    pub expiry_date: Option<Date>,
    #[sea_orm(column_type = "Json")]
    pub line_items: LineItems,
    pub total_cents: i64,
    #[sea_orm(indexed)]
    pub organisation_id: Option<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub description: String,
    pub quantity: f64,
    pub unit_price_cents: i64,
}

impl LineItem {
    /// `quantity * unit_price_cents` rounded to whole cents; `None` when the
    /// amount does not fit in an `i64`.
    pub fn amount_cents(&self) -> Option<i64> {
        let amount = (self.quantity * self.unit_price_cents as f64).round();
        (amount.is_finite() && amount.abs() < i64::MAX as f64).then_some(amount as i64)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct LineItems(pub Vec<LineItem>);

impl LineItems {
    /// Sum of the line amounts; `None` on overflow.
    pub fn total_cents(&self) -> Option<i64> {
        self.0
            .iter()
            .try_fold(0i64, |total, item| total.checked_add(item.amount_cents()?))
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(Some(16))")]
pub enum Status {
    #[sea_orm(string_value = "DRAFT")]
    Draft,
    #[sea_orm(string_value = "SENT")]
    Sent,
    #[sea_orm(string_value = "ACCEPTED")]
    Accepted,
    #[sea_orm(string_value = "REJECTED")]
    Rejected,
    #[sea_orm(string_value = "EXPIRED")]
    Expired,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: f64, unit_price_cents: i64) -> LineItem {
        LineItem {
            description: "Hosting".into(),
            quantity,
            unit_price_cents,
        }
    }

    #[test]
    fn totals_round_each_line() {
        let items = LineItems(vec![item(2.0, 15000), item(0.5, 999)]);
        assert_eq!(items.total_cents(), Some(30500));
        assert_eq!(LineItems::default().total_cents(), Some(0));
    }

    #[test]
    fn totals_that_overflow_are_none() {
        assert_eq!(item(4.0, i64::MAX / 2).amount_cents(), None);
        let items = LineItems(vec![item(1.0, i64::MAX / 2), item(1.0, i64::MAX / 2), item(1.0, 10)]);
        assert_eq!(items.total_cents(), None);
    }
}
