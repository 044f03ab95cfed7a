//! Filter/sort/limit arguments shared by every list operation.
//!
//! Callers name fields the way the dashboard does (`organisationName`,
//! `createdAt`, ...). Each entity maps those names onto its columns through
//! [`Queryable`], so unknown fields are rejected before a query is built.

use chrono::{DateTime, NaiveDate};
use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};
use sea_orm::{
    ColumnTrait, EntityTrait, Order, QueryFilter, QueryOrder, QuerySelect, Select,
    Value,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{HubError, HubResult};

pub const MAX_LIST_RESULTS: u64 = 500;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl From<SortDirection> for Order {
    fn from(value: SortDirection) -> Self {
        match value {
            SortDirection::Asc => Order::Asc,
            SortDirection::Desc => Order::Desc,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Contains,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    Null,
    Bool(bool),
    Int(i64),
    Text(String),
    List(Vec<FilterValue>),
}

impl From<&str> for FilterValue {
    fn from(value: &str) -> Self {
        FilterValue::Text(value.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(value: String) -> Self {
        FilterValue::Text(value)
    }
}

impl From<bool> for FilterValue {
    fn from(value: bool) -> Self {
        FilterValue::Bool(value)
    }
}

impl From<i64> for FilterValue {
    fn from(value: i64) -> Self {
        FilterValue::Int(value)
    }
}

impl From<Uuid> for FilterValue {
    fn from(value: Uuid) -> Self {
        FilterValue::Text(value.to_string())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub value: FilterValue,
}

impl Filter {
    pub fn new(field: impl Into<String>, op: FilterOp, value: impl Into<FilterValue>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    pub fn eq(field: impl Into<String>, value: impl Into<FilterValue>) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub filters: Vec<Filter>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortDirection>,
    pub max_results: Option<u64>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort_field = Some(field.into());
        self.sort_direction = Some(direction);
        self
    }

    pub fn limit(mut self, max_results: u64) -> Self {
        self.max_results = Some(max_results);
        self
    }
}

/// How a filter value is coerced before it is bound to a column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Uuid,
    Bool,
    Int,
    Date,
    Timestamp,
}

pub trait Queryable: EntityTrait {
    fn field(name: &str) -> Option<(Self::Column, FieldKind)>;

    fn default_order() -> (Self::Column, SortDirection);
}

pub fn apply_list_query<E: Queryable>(
    mut select: Select<E>,
    query: &ListQuery,
) -> HubResult<Select<E>> {
    for filter in &query.filters {
        let (column, kind) = E::field(&filter.field)
            .ok_or_else(|| HubError::validation(format!("unknown field `{}`", filter.field)))?;
        select = select.filter(filter_expr::<E>(column, kind, filter)?);
    }

    let (column, direction) = match &query.sort_field {
        Some(field) => {
            let (column, _) = E::field(field)
                .ok_or_else(|| HubError::validation(format!("cannot sort by `{field}`")))?;
            (column, query.sort_direction.unwrap_or_default())
        }
        None => {
            let (column, default_direction) = E::default_order();
            (column, query.sort_direction.unwrap_or(default_direction))
        }
    };
    let limit = query
        .max_results
        .unwrap_or(MAX_LIST_RESULTS)
        .clamp(1, MAX_LIST_RESULTS);

    Ok(select.order_by(column, direction.into()).limit(limit))
}

fn filter_expr<E: Queryable>(
    column: E::Column,
    kind: FieldKind,
    filter: &Filter,
) -> HubResult<SimpleExpr> {
    let expr = match (filter.op, &filter.value) {
        (FilterOp::Eq, FilterValue::Null) => column.is_null(),
        (FilterOp::Ne, FilterValue::Null) => column.is_not_null(),
        (FilterOp::In, FilterValue::List(values)) => {
            let bound = values
                .iter()
                .map(|value| coerce(&filter.field, kind, value))
                .collect::<HubResult<Vec<_>>>()?;
            column.is_in(bound)
        }
        (FilterOp::In, _) => {
            return Err(HubError::validation(format!(
                "`in` filter on `{}` needs a list",
                filter.field
            )));
        }
        (FilterOp::Contains, FilterValue::Text(text)) if kind == FieldKind::Text => {
            let Some(pattern) = like_pattern(text) else {
                return Ok(Expr::val(1).eq(1));
            };
            Expr::expr(Func::lower(Expr::col((E::default(), column)))).like(pattern)
        }
        (FilterOp::Contains, _) => {
            return Err(HubError::validation(format!(
                "`contains` filter on `{}` needs a text field and value",
                filter.field
            )));
        }
        (op, value) => {
            let bound = coerce(&filter.field, kind, value)?;
            match op {
                FilterOp::Eq => column.eq(bound),
                FilterOp::Ne => column.ne(bound),
                FilterOp::Lt => column.lt(bound),
                FilterOp::Lte => column.lte(bound),
                FilterOp::Gt => column.gt(bound),
                FilterOp::Gte => column.gte(bound),
                FilterOp::In | FilterOp::Contains => unreachable!("handled above"),
            }
        }
    };
    Ok(expr)
}

fn coerce(field: &str, kind: FieldKind, value: &FilterValue) -> HubResult<Value> {
    let mismatch = || HubError::validation(format!("invalid value for `{field}`"));
    let bound = match (kind, value) {
        (FieldKind::Text, FilterValue::Text(text)) => Value::from(text.clone()),
        (FieldKind::Uuid, FilterValue::Text(text)) => {
            Value::from(Uuid::parse_str(text.trim()).map_err(|_| mismatch())?)
        }
        (FieldKind::Bool, FilterValue::Bool(flag)) => Value::from(*flag),
        (FieldKind::Bool, FilterValue::Text(text)) => match text.trim() {
            "true" => Value::from(true),
            "false" => Value::from(false),
            _ => return Err(mismatch()),
        },
        (FieldKind::Int, FilterValue::Int(number)) => Value::from(*number),
        (FieldKind::Date, FilterValue::Text(text)) => Value::from(
            NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d").map_err(|_| mismatch())?,
        ),
        (FieldKind::Timestamp, FilterValue::Text(text)) => {
            Value::from(DateTime::parse_from_rfc3339(text.trim()).map_err(|_| mismatch())?)
        }
        _ => return Err(mismatch()),
    };
    Ok(bound)
}

/// Case-insensitive `%term%` match for a lower-cased column, or `None` when
/// the term is blank. `%`, `_` and `\` in the term match themselves.
pub fn like_pattern(term: &str) -> Option<LikeExpr> {
    escaped_pattern(term).map(|pattern| LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

const LIKE_ESCAPE: char = '\\';

fn escaped_pattern(term: &str) -> Option<String> {
    let term = term.trim();
    if term.is_empty() {
        return None;
    }
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for ch in term.to_lowercase().chars() {
        if matches!(ch, '%' | '_' | LIKE_ESCAPE) {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(ch);
    }
    pattern.push('%');
    Some(pattern)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_pattern_escapes_wildcards_and_lowercases() {
        assert_eq!(escaped_pattern("  Acme "), Some("%acme%".to_string()));
        assert_eq!(escaped_pattern("100% Solar"), Some(r"%100\% solar%".to_string()));
        assert_eq!(escaped_pattern(r"acme_tools\x"), Some(r"%acme\_tools\\x%".to_string()));
        assert_eq!(escaped_pattern("   "), None);
        assert!(like_pattern("").is_none());
    }

    #[test]
    fn coerce_rejects_mismatched_kinds() {
        let err = coerce("isPrimary", FieldKind::Bool, &FilterValue::Int(1)).unwrap_err();
        assert!(matches!(err, HubError::Validation(_)));
        assert!(coerce("id", FieldKind::Uuid, &FilterValue::from("nope")).is_err());
        assert!(coerce("createdAt", FieldKind::Timestamp, &"2024-05-01T00:00:00Z".into()).is_ok());
    }

    #[test]
    fn list_query_deserializes_from_dashboard_shape() {
        let raw = serde_json::json!({
            "filters": [
                { "field": "status", "op": "eq", "value": "active" },
                { "field": "priority", "op": "in", "value": [1, 10] }
            ],
            "sortField": "organisationName",
            "sortDirection": "desc",
            "maxResults": 20
        });
        let query: ListQuery = serde_json::from_value(raw).unwrap();
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[0].value, FilterValue::Text("active".into()));
        assert_eq!(
            query.filters[1].value,
            FilterValue::List(vec![FilterValue::Int(1), FilterValue::Int(10)])
        );
        assert_eq!(query.sort_direction, Some(SortDirection::Desc));
        assert_eq!(query.max_results, Some(20));
    }
}
