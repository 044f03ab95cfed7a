use async_graphql::{Context, Enum, Object, SimpleObject};
use hub::validation::{self, FieldCheck};
use serde::Serialize;
use tracing::instrument;

use super::GraphqlData;

#[derive(Default)]
pub struct SystemQuery;

#[Object]
impl SystemQuery {
    #[instrument(name = "graphql.health", skip_all)]
    async fn health(&self, ctx: &Context<'_>) -> async_graphql::Result<HealthPayload> {
        let data = ctx.data::<GraphqlData>()?;
        let db_ok = platform_db::ping(data.pool.as_ref()).await;
        Ok(HealthPayload { ok: db_ok, db_ok })
    }

    #[instrument(name = "graphql.version", skip_all)]
    async fn version(&self) -> String {
        env!("CARGO_PKG_VERSION").to_string()
    }

    /// Runs the same check a form applies to a single input.
    async fn validate_field(
        &self,
        kind: FieldKind,
        value: String,
        #[graphql(default)] required: bool,
    ) -> FieldCheckPayload {
        validation::validate_field(kind.into(), &value, required).into()
    }
}

#[derive(Clone, Debug, SimpleObject, Serialize)]
pub struct HealthPayload {
    pub ok: bool,
    pub db_ok: bool,
}

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "hub::InputKind")]
pub enum FieldKind {
    Text,
    Email,
    Phone,
    Website,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct FieldCheckPayload {
    pub is_valid: bool,
    pub hint: Option<String>,
}

impl From<FieldCheck> for FieldCheckPayload {
    fn from(check: FieldCheck) -> Self {
        Self {
            is_valid: check.is_valid,
            hint: check.hint.map(str::to_string),
        }
    }
}
