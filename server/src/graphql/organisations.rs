use async_graphql::{ComplexObject, Context, InputObject, Object, SimpleObject};
use entity::organisations::Model;
use hub::organisations::{self, Address, NewOrganisation, OrganisationPatch};
use hub::relationships;
use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::instrument;
use uuid::Uuid;

use super::relationships::RelationshipNode;
use super::{ListArgs, db, hub_error, list_query};

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Address")]
pub struct AddressNode {
    pub street: Option<String>,
    pub suburb: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

impl From<Address> for AddressNode {
    fn from(value: Address) -> Self {
        Self {
            street: value.street,
            suburb: value.suburb,
            state: value.state,
            postcode: value.postcode,
            country: value.country,
        }
    }
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct AddressInput {
    pub street: Option<String>,
    pub suburb: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

impl From<AddressInput> for Address {
    fn from(value: AddressInput) -> Self {
        Self {
            street: value.street,
            suburb: value.suburb,
            state: value.state,
            postcode: value.postcode,
            country: value.country,
        }
    }
}

#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Organisation", complex)]
pub struct OrganisationNode {
    pub id: Uuid,
    pub organisation_name: String,
    pub organisation_type: Option<String>,
    pub status: String,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: AddressNode,
    pub shipping_address: AddressNode,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for OrganisationNode {
    fn from(model: Model) -> Self {
        Self {
            billing_address: Address::billing(&model).into(),
            shipping_address: Address::shipping(&model).into(),
            id: model.id,
            organisation_name: model.organisation_name,
            organisation_type: model.organisation_type,
            status: model.status,
            industry: model.industry,
            website: model.website,
            email: model.email,
            phone: model.phone,
            notes: model.notes,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[ComplexObject]
impl OrganisationNode {
    /// Linked contacts, primary links first.
    async fn contacts(&self, ctx: &Context<'_>) -> async_graphql::Result<Vec<RelationshipNode>> {
        let rows = relationships::fetch_contacts_by_organisation(db(ctx)?, self.id)
            .await
            .map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct CreateOrganisationInput {
    pub organisation_name: String,
    pub organisation_type: Option<String>,
    pub status: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<AddressInput>,
    pub shipping_address: Option<AddressInput>,
    pub notes: Option<String>,
}

impl From<CreateOrganisationInput> for NewOrganisation {
    fn from(input: CreateOrganisationInput) -> Self {
        Self {
            organisation_name: input.organisation_name,
            organisation_type: input.organisation_type,
            status: input.status,
            industry: input.industry,
            website: input.website,
            email: input.email,
            phone: input.phone,
            billing_address: input.billing_address.map(Into::into).unwrap_or_default(),
            shipping_address: input.shipping_address.map(Into::into).unwrap_or_default(),
            notes: input.notes,
        }
    }
}

/// Omitted fields are left unchanged; an empty string clears a field.
#[derive(Clone, Debug, Default, InputObject)]
pub struct UpdateOrganisationInput {
    pub organisation_name: Option<String>,
    pub organisation_type: Option<String>,
    pub status: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<AddressInput>,
    pub shipping_address: Option<AddressInput>,
    pub notes: Option<String>,
}

impl From<UpdateOrganisationInput> for OrganisationPatch {
    fn from(input: UpdateOrganisationInput) -> Self {
        Self {
            organisation_name: input.organisation_name,
            organisation_type: input.organisation_type,
            status: input.status,
            industry: input.industry,
            website: input.website,
            email: input.email,
            phone: input.phone,
            billing_address: input.billing_address.map(Into::into),
            shipping_address: input.shipping_address.map(Into::into),
            notes: input.notes,
        }
    }
}

#[derive(Default)]
pub struct OrganisationQuery;

#[Object]
impl OrganisationQuery {
    #[instrument(name = "graphql.organisations", skip_all)]
    async fn organisations(
        &self,
        ctx: &Context<'_>,
        query: Option<ListArgs>,
    ) -> async_graphql::Result<Vec<OrganisationNode>> {
        let query = list_query(query)?;
        let rows = organisations::list(db(ctx)?, &query)
            .await
            .map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn organisation(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<Option<OrganisationNode>> {
        let row = organisations::get(db(ctx)?, id).await.map_err(hub_error)?;
        Ok(row.map(Into::into))
    }

    async fn search_organisations(
        &self,
        ctx: &Context<'_>,
        term: String,
    ) -> async_graphql::Result<Vec<OrganisationNode>> {
        let rows = organisations::search_by_name(db(ctx)?, &term)
            .await
            .map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Default)]
pub struct OrganisationMutation;

#[Object]
impl OrganisationMutation {
    #[instrument(name = "graphql.create_organisation", skip_all)]
    async fn create_organisation(
        &self,
        ctx: &Context<'_>,
        input: CreateOrganisationInput,
    ) -> async_graphql::Result<OrganisationNode> {
        let model = organisations::create(db(ctx)?, input.into())
            .await
            .map_err(hub_error)?;
        Ok(model.into())
    }

    #[instrument(name = "graphql.update_organisation", skip_all, fields(id = %id))]
    async fn update_organisation(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateOrganisationInput,
    ) -> async_graphql::Result<OrganisationNode> {
        let model = organisations::update(db(ctx)?, id, input.into())
            .await
            .map_err(hub_error)?;
        Ok(model.into())
    }

    /// Removes the organisation and its contact links.
    #[instrument(name = "graphql.delete_organisation", skip_all, fields(id = %id))]
    async fn delete_organisation(&self, ctx: &Context<'_>, id: Uuid) -> async_graphql::Result<bool> {
        organisations::delete(db(ctx)?, id).await.map_err(hub_error)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::graphql::test_support::{error_code, run, schema};

    const CREATE: &str = r#"
        mutation($input: CreateOrganisationInput!) {
            createOrganisation(input: $input) {
                id organisationName status billingAddress { state }
            }
        }"#;

    #[tokio::test]
    async fn create_then_search_by_name() {
        let schema = schema().await;
        let created = run(
            &schema,
            CREATE,
            json!({"input": {
                "organisationName": "Acme Pty Ltd",
                "billingAddress": {"state": "NSW"}
            }}),
        )
        .await;
        assert_eq!(created["createOrganisation"]["status"], json!("active"));
        assert_eq!(
            created["createOrganisation"]["billingAddress"]["state"],
            json!("NSW")
        );

        let found = run(
            &schema,
            r#"{ hit: searchOrganisations(term: "acme") { organisationName }
                 miss: searchOrganisations(term: "zzz") { organisationName } }"#,
            json!({}),
        )
        .await;
        assert_eq!(found["hit"], json!([{"organisationName": "Acme Pty Ltd"}]));
        assert_eq!(found["miss"], json!([]));
    }

    #[tokio::test]
    async fn invalid_email_is_rejected_as_input_error() {
        let schema = schema().await;
        let code = error_code(
            &schema,
            CREATE,
            json!({"input": {"organisationName": "Acme", "email": "nope"}}),
        )
        .await;
        assert_eq!(code, "INVALID_INPUT");
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let schema = schema().await;
        for (name, status) in [("Alpha", "active"), ("Beta", "inactive")] {
            run(
                &schema,
                CREATE,
                json!({"input": {"organisationName": name, "status": status}}),
            )
            .await;
        }
        let body = run(
            &schema,
            r#"{ organisations(query: {
                    filters: [{field: "status", op: EQ, value: "inactive"}]
                 }) { organisationName } }"#,
            json!({}),
        )
        .await;
        assert_eq!(body["organisations"], json!([{"organisationName": "Beta"}]));
    }
}
