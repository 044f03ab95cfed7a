mod contacts;
mod field_values;
mod leads;
mod organisations;
mod quotes;
mod relationships;
mod system;
mod websites;

use async_graphql::{
    Context, EmptySubscription, Enum, ErrorExtensions, InputObject, Json, MergedObject, Schema,
};
use hub::{Filter, FilterOp, FilterValue, HubError, ListQuery, SortDirection};
use platform_api::ApiError;
use platform_db::DbPool;
use sea_orm::DatabaseConnection;

pub type SchemaType = Schema<QueryRoot, MutationRoot, EmptySubscription>;

/// Shared state injected into every resolver.
#[derive(Clone)]
pub struct GraphqlData {
    pub pool: DbPool,
}

#[derive(MergedObject, Default)]
pub struct QueryRoot(
    system::SystemQuery,
    organisations::OrganisationQuery,
    contacts::ContactQuery,
    relationships::RelationshipQuery,
    leads::LeadQuery,
    quotes::QuoteQuery,
    websites::WebsiteQuery,
    field_values::FieldValueQuery,
);

#[derive(MergedObject, Default)]
pub struct MutationRoot(
    organisations::OrganisationMutation,
    contacts::ContactMutation,
    relationships::RelationshipMutation,
    leads::LeadMutation,
    quotes::QuoteMutation,
    websites::WebsiteMutation,
    field_values::FieldValueMutation,
);

pub fn build_schema(data: GraphqlData) -> SchemaType {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .data(data)
    .finish()
}

/// Schema without a database, used to print the SDL.
pub fn schema_sdl() -> String {
    Schema::build(
        QueryRoot::default(),
        MutationRoot::default(),
        EmptySubscription,
    )
    .finish()
    .sdl()
}

pub(crate) fn db<'a>(ctx: &Context<'a>) -> async_graphql::Result<&'a DatabaseConnection> {
    Ok(ctx.data::<GraphqlData>()?.pool.as_ref())
}

pub(crate) fn hub_error(err: HubError) -> async_graphql::Error {
    let api = match err {
        HubError::NotFound { .. } => ApiError::NotFound(err.to_string()),
        HubError::Validation(message) => ApiError::InvalidInput(message),
        HubError::Conflict(message) => ApiError::Conflict(message),
        HubError::Database(db_err) => ApiError::internal(db_err.into()),
    };
    api.extend()
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "hub::FilterOp")]
pub enum FilterOperator {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    In,
    Contains,
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "hub::SortDirection")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(InputObject, Clone, Debug)]
pub struct FilterInput {
    /// Field name as exposed on the node type, e.g. `organisationName`.
    pub field: String,
    pub op: FilterOperator,
    /// Any JSON scalar, or a list for `IN`.
    pub value: Json<serde_json::Value>,
}

#[derive(InputObject, Clone, Debug, Default)]
pub struct ListArgs {
    #[graphql(default)]
    pub filters: Vec<FilterInput>,
    pub sort_field: Option<String>,
    pub sort_direction: Option<SortOrder>,
    pub max_results: Option<i32>,
}

impl ListArgs {
    pub(crate) fn into_query(self) -> async_graphql::Result<ListQuery> {
        let mut query = ListQuery::new();
        for filter in self.filters {
            let value: FilterValue = serde_json::from_value(filter.value.0).map_err(|err| {
                ApiError::InvalidInput(format!("filter `{}`: {err}", filter.field)).extend()
            })?;
            query = query.filter(Filter::new(filter.field, FilterOp::from(filter.op), value));
        }
        query.sort_field = self.sort_field;
        query.sort_direction = self.sort_direction.map(SortDirection::from);
        query.max_results = self
            .max_results
            .map(|max| u64::try_from(max.max(1)).unwrap_or(1));
        Ok(query)
    }
}

pub(crate) fn list_query(args: Option<ListArgs>) -> async_graphql::Result<ListQuery> {
    args.map_or_else(|| Ok(ListQuery::new()), ListArgs::into_query)
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_graphql::{Request, Variables};
    use migration::{Migrator, MigratorTrait};
    use platform_db::{DatabaseSettings, connect};
    use serde_json::Value;

    use super::{GraphqlData, SchemaType, build_schema};

    pub async fn schema() -> SchemaType {
        let pool = connect(&DatabaseSettings::with_url("sqlite::memory:"))
            .await
            .expect("sqlite pool");
        Migrator::up(pool.as_ref(), None)
            .await
            .expect("migrations");
        build_schema(GraphqlData {
            pool: Arc::clone(&pool),
        })
    }

    /// Executes `query` and returns `data`, panicking on GraphQL errors.
    pub async fn run(schema: &SchemaType, query: &str, variables: Value) -> Value {
        let response = schema
            .execute(Request::new(query).variables(Variables::from_json(variables)))
            .await;
        assert!(response.errors.is_empty(), "{:?}", response.errors);
        response.data.into_json().expect("json data")
    }

    /// Executes `query` and returns the `code` extension of its first error.
    pub async fn error_code(schema: &SchemaType, query: &str, variables: Value) -> String {
        let response = schema
            .execute(Request::new(query).variables(Variables::from_json(variables)))
            .await;
        let error = response.errors.first().expect("an error");
        error
            .extensions
            .as_ref()
            .and_then(|ext| ext.get("code"))
            .map(|code| code.to_string().trim_matches('"').to_string())
            .unwrap_or_default()
    }
}
