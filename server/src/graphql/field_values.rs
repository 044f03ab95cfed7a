use async_graphql::{Context, Enum, InputObject, Object, SimpleObject};
use entity::field_values::Model;
use hub::field_values::{self, FieldValuePatch, NewFieldValue};
use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::instrument;
use uuid::Uuid;

use super::{db, hub_error};

#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
#[graphql(remote = "entity::field_values::FieldType")]
pub enum FieldType {
    ContactRoles,
    ContactStatuses,
    OrganisationTypes,
    OrganisationStatuses,
    LeadStatuses,
    LeadSources,
    WebsiteStatuses,
    WebsiteTypes,
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "FieldValue")]
pub struct FieldValueNode {
    pub id: Uuid,
    pub field_type: FieldType,
    pub value: String,
    pub label: String,
    pub is_default: bool,
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
}

impl From<Model> for FieldValueNode {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            field_type: model.field_type.into(),
            value: model.value,
            label: model.label,
            is_default: model.is_default,
            sort_order: model.sort_order,
            created_at: model.created_at,
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct CreateFieldValueInput {
    pub field_type: FieldType,
    pub label: String,
    /// Stored identifier; derived from the label when omitted.
    pub value: Option<String>,
    #[graphql(default)]
    pub is_default: bool,
    pub sort_order: Option<i32>,
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct UpdateFieldValueInput {
    pub label: Option<String>,
    pub sort_order: Option<i32>,
}

#[derive(Default)]
pub struct FieldValueQuery;

#[Object]
impl FieldValueQuery {
    /// Options of one select input, in display order.
    async fn field_values(
        &self,
        ctx: &Context<'_>,
        field_type: FieldType,
    ) -> async_graphql::Result<Vec<FieldValueNode>> {
        let rows = field_values::list(db(ctx)?, field_type.into())
            .await
            .map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Default)]
pub struct FieldValueMutation;

#[Object]
impl FieldValueMutation {
    #[instrument(name = "graphql.create_field_value", skip_all)]
    async fn create_field_value(
        &self,
        ctx: &Context<'_>,
        input: CreateFieldValueInput,
    ) -> async_graphql::Result<FieldValueNode> {
        let input = NewFieldValue {
            field_type: input.field_type.into(),
            label: input.label,
            value: input.value,
            is_default: input.is_default,
            sort_order: input.sort_order,
        };
        let model = field_values::create(db(ctx)?, input)
            .await
            .map_err(hub_error)?;
        Ok(model.into())
    }

    async fn update_field_value(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateFieldValueInput,
    ) -> async_graphql::Result<FieldValueNode> {
        let patch = FieldValuePatch {
            label: input.label,
            sort_order: input.sort_order,
        };
        let model = field_values::update(db(ctx)?, id, patch)
            .await
            .map_err(hub_error)?;
        Ok(model.into())
    }

    async fn delete_field_value(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<bool> {
        field_values::delete(db(ctx)?, id).await.map_err(hub_error)
    }

    async fn set_default_field_value(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<FieldValueNode> {
        let model = field_values::set_default(db(ctx)?, id)
            .await
            .map_err(hub_error)?;
        Ok(model.into())
    }

    /// Inserts any missing built-in options and returns how many were added.
    #[instrument(name = "graphql.seed_field_values", skip_all)]
    async fn seed_field_values(&self, ctx: &Context<'_>) -> async_graphql::Result<u64> {
        field_values::seed_defaults(db(ctx)?)
            .await
            .map_err(hub_error)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::graphql::test_support::{error_code, run, schema};

    #[tokio::test]
    async fn seeded_lead_statuses_default_to_new() {
        let schema = schema().await;
        let seeded = run(&schema, "mutation { seedFieldValues }", json!({})).await;
        assert!(seeded["seedFieldValues"].as_u64().unwrap_or_default() > 0);
        let again = run(&schema, "mutation { seedFieldValues }", json!({})).await;
        assert_eq!(again["seedFieldValues"], json!(0));

        let body = run(
            &schema,
            "{ fieldValues(fieldType: LEAD_STATUSES) { value isDefault } }",
            json!({}),
        )
        .await;
        let options = body["fieldValues"].as_array().cloned().unwrap_or_default();
        let defaults: Vec<_> = options
            .iter()
            .filter(|option| option["isDefault"] == json!(true))
            .collect();
        assert_eq!(defaults, vec![&json!({"value": "new", "isDefault": true})]);
    }

    #[tokio::test]
    async fn duplicate_label_conflicts() {
        let schema = schema().await;
        let create = r#"mutation {
            createFieldValue(input: {fieldType: CONTACT_ROLES, label: "Key Account"}) { value }
        }"#;
        let body = run(&schema, create, json!({})).await;
        assert_eq!(body["createFieldValue"]["value"], json!("key_account"));
        assert_eq!(error_code(&schema, create, json!({})).await, "CONFLICT");
    }

    #[tokio::test]
    async fn set_default_moves_the_flag() {
        let schema = schema().await;
        let body = run(
            &schema,
            r#"mutation {
                a: createFieldValue(input: {fieldType: WEBSITE_TYPES, label: "Blog", isDefault: true}) { id }
                b: createFieldValue(input: {fieldType: WEBSITE_TYPES, label: "Shop"}) { id }
            }"#,
            json!({}),
        )
        .await;
        run(
            &schema,
            "mutation($id: UUID!) { setDefaultFieldValue(id: $id) { id } }",
            json!({"id": body["b"]["id"]}),
        )
        .await;
        let listed = run(
            &schema,
            "{ fieldValues(fieldType: WEBSITE_TYPES) { label isDefault } }",
            json!({}),
        )
        .await;
        assert_eq!(
            listed["fieldValues"],
            json!([
                {"label": "Blog", "isDefault": false},
                {"label": "Shop", "isDefault": true}
            ])
        );
    }
}
