use async_graphql::{Context, InputObject, Object, SimpleObject};
use entity::organisation_contacts::Model;
use hub::relationships::{self, LinkDetails, NewRelationship, RelationshipPatch};
use sea_orm::prelude::DateTimeWithTimeZone;
use tracing::instrument;
use uuid::Uuid;

use super::organisations::{CreateOrganisationInput, OrganisationNode};
use super::{db, hub_error};

/// A contact-organisation link with the display fields of both ends.
#[derive(Clone, Debug, SimpleObject)]
#[graphql(name = "Relationship")]
pub struct RelationshipNode {
    pub id: Uuid,
    pub organisation_id: Uuid,
    pub contact_id: Uuid,
    pub role: String,
    pub is_primary: bool,
    pub priority: i32,
    pub organisation_name: String,
    pub contact_name: String,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

impl From<Model> for RelationshipNode {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            organisation_id: model.organisation_id,
            contact_id: model.contact_id,
            role: model.role,
            is_primary: model.is_primary,
            priority: model.priority,
            organisation_name: model.organisation_name,
            contact_name: model.contact_name,
            contact_email: model.contact_email,
            contact_phone: model.contact_phone,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Clone, Debug, InputObject)]
pub struct AddContactInput {
    pub organisation_id: Uuid,
    pub contact_id: Uuid,
    pub role: String,
    #[graphql(default)]
    pub is_primary: bool,
    /// Defaults to 1 for a primary link and 10 otherwise.
    pub priority: Option<i32>,
}

#[derive(Clone, Debug, InputObject)]
pub struct LinkInput {
    pub role: String,
    #[graphql(default)]
    pub is_primary: bool,
    pub priority: Option<i32>,
}

#[derive(Clone, Debug, Default, InputObject)]
pub struct UpdateRelationshipInput {
    pub role: Option<String>,
    pub is_primary: Option<bool>,
    pub priority: Option<i32>,
}

#[derive(Clone, Debug, SimpleObject)]
pub struct CreatedOrganisationPayload {
    pub organisation: OrganisationNode,
    pub relationship: RelationshipNode,
}

#[derive(Default)]
pub struct RelationshipQuery;

#[Object]
impl RelationshipQuery {
    async fn contacts_by_organisation(
        &self,
        ctx: &Context<'_>,
        organisation_id: Uuid,
    ) -> async_graphql::Result<Vec<RelationshipNode>> {
        let rows = relationships::fetch_contacts_by_organisation(db(ctx)?, organisation_id)
            .await
            .map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn organisations_by_contact(
        &self,
        ctx: &Context<'_>,
        contact_id: Uuid,
    ) -> async_graphql::Result<Vec<RelationshipNode>> {
        let rows = relationships::fetch_organisations_by_contact(db(ctx)?, contact_id)
            .await
            .map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn primary_organisation(
        &self,
        ctx: &Context<'_>,
        contact_id: Uuid,
    ) -> async_graphql::Result<Option<OrganisationNode>> {
        let row = relationships::primary_organisation_for_contact(db(ctx)?, contact_id)
            .await
            .map_err(hub_error)?;
        Ok(row.map(Into::into))
    }

    /// Organisations matching `term` that the contact is not linked to.
    async fn unlinked_organisations(
        &self,
        ctx: &Context<'_>,
        contact_id: Uuid,
        term: String,
    ) -> async_graphql::Result<Vec<OrganisationNode>> {
        let rows = relationships::search_unlinked_organisations(db(ctx)?, contact_id, &term)
            .await
            .map_err(hub_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[derive(Default)]
pub struct RelationshipMutation;

#[Object]
impl RelationshipMutation {
    #[instrument(name = "graphql.add_contact_to_organisation", skip_all)]
    async fn add_contact_to_organisation(
        &self,
        ctx: &Context<'_>,
        input: AddContactInput,
    ) -> async_graphql::Result<RelationshipNode> {
        let input = NewRelationship {
            organisation_id: input.organisation_id,
            contact_id: input.contact_id,
            role: input.role,
            is_primary: input.is_primary,
            priority: input.priority,
        };
        let model = relationships::add_contact_to_organisation(db(ctx)?, input)
            .await
            .map_err(hub_error)?;
        Ok(model.into())
    }

    #[instrument(name = "graphql.update_relationship", skip_all, fields(id = %id))]
    async fn update_relationship(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
        input: UpdateRelationshipInput,
    ) -> async_graphql::Result<RelationshipNode> {
        let patch = RelationshipPatch {
            role: input.role,
            is_primary: input.is_primary,
            priority: input.priority,
        };
        let model = relationships::update_relationship(db(ctx)?, id, patch)
            .await
            .map_err(hub_error)?;
        Ok(model.into())
    }

    #[instrument(name = "graphql.remove_contact_from_organisation", skip_all, fields(id = %id))]
    async fn remove_contact_from_organisation(
        &self,
        ctx: &Context<'_>,
        id: Uuid,
    ) -> async_graphql::Result<bool> {
        relationships::remove_contact_from_organisation(db(ctx)?, id)
            .await
            .map_err(hub_error)
    }

    #[instrument(name = "graphql.create_organisation_for_contact", skip_all)]
    async fn create_organisation_for_contact(
        &self,
        ctx: &Context<'_>,
        contact_id: Uuid,
        organisation: CreateOrganisationInput,
        link: LinkInput,
    ) -> async_graphql::Result<CreatedOrganisationPayload> {
        let link = LinkDetails {
            role: link.role,
            is_primary: link.is_primary,
            priority: link.priority,
        };
        let (organisation, relationship) = relationships::create_organisation_for_contact(
            db(ctx)?,
            contact_id,
            organisation.into(),
            link,
        )
        .await
        .map_err(hub_error)?;
        Ok(CreatedOrganisationPayload {
            organisation: organisation.into(),
            relationship: relationship.into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};

    use crate::graphql::SchemaType;
    use crate::graphql::test_support::{error_code, run, schema};

    const ADD: &str = r#"
        mutation($input: AddContactInput!) {
            addContactToOrganisation(input: $input) { id role isPrimary priority contactName }
        }"#;

    async fn seed(schema: &SchemaType) -> (Value, Value) {
        let body = run(
            schema,
            r#"mutation {
                org: createOrganisation(input: {organisationName: "Acme Pty Ltd"}) { id }
                contact: createContact(input: {
                    firstName: "Jane", lastName: "Doe", email: "jane@acme.com"
                }) { id }
            }"#,
            json!({}),
        )
        .await;
        (body["org"]["id"].clone(), body["contact"]["id"].clone())
    }

    #[tokio::test]
    async fn primary_manager_link_is_listed_once() {
        let schema = schema().await;
        let (org, contact) = seed(&schema).await;
        let added = run(
            &schema,
            ADD,
            json!({"input": {
                "organisationId": org, "contactId": contact,
                "role": "manager", "isPrimary": true
            }}),
        )
        .await;
        let link = &added["addContactToOrganisation"];
        assert_eq!(link["priority"], json!(1));
        assert_eq!(link["contactName"], json!("Jane Doe"));

        let listed = run(
            &schema,
            r#"query($org: UUID!) {
                contactsByOrganisation(organisationId: $org) { id role isPrimary priority }
            }"#,
            json!({"org": org}),
        )
        .await;
        assert_eq!(
            listed["contactsByOrganisation"],
            json!([{"id": link["id"], "role": "manager", "isPrimary": true, "priority": 1}])
        );
    }

    #[tokio::test]
    async fn second_link_for_same_pair_conflicts() {
        let schema = schema().await;
        let (org, contact) = seed(&schema).await;
        let input = json!({"input": {"organisationId": org, "contactId": contact, "role": "owner"}});
        run(&schema, ADD, input.clone()).await;
        assert_eq!(error_code(&schema, ADD, input).await, "CONFLICT");
    }

    #[tokio::test]
    async fn removed_link_disappears_from_both_directions() {
        let schema = schema().await;
        let (org, contact) = seed(&schema).await;
        let added = run(
            &schema,
            ADD,
            json!({"input": {"organisationId": org, "contactId": contact, "role": "owner"}}),
        )
        .await;
        let id = added["addContactToOrganisation"]["id"].clone();
        let removed = run(
            &schema,
            "mutation($id: UUID!) { removeContactFromOrganisation(id: $id) }",
            json!({"id": id}),
        )
        .await;
        assert_eq!(removed["removeContactFromOrganisation"], json!(true));

        let lists = run(
            &schema,
            r#"query($org: UUID!, $contact: UUID!) {
                contactsByOrganisation(organisationId: $org) { id }
                organisationsByContact(contactId: $contact) { id }
            }"#,
            json!({"org": org, "contact": contact}),
        )
        .await;
        assert_eq!(lists["contactsByOrganisation"], json!([]));
        assert_eq!(lists["organisationsByContact"], json!([]));
    }

    #[tokio::test]
    async fn unlinked_search_excludes_linked_and_unmatched_organisations() {
        let schema = schema().await;
        let (org, contact) = seed(&schema).await;
        run(
            &schema,
            ADD,
            json!({"input": {"organisationId": org, "contactId": contact, "role": "owner"}}),
        )
        .await;
        run(
            &schema,
            r#"mutation { createOrganisation(input: {organisationName: "Acme Holdings"}) { id } }"#,
            json!({}),
        )
        .await;

        let body = run(
            &schema,
            r#"query($contact: UUID!) {
                acme: unlinkedOrganisations(contactId: $contact, term: "acme") { organisationName }
                none: unlinkedOrganisations(contactId: $contact, term: "Zebra") { organisationName }
            }"#,
            json!({"contact": contact}),
        )
        .await;
        assert_eq!(body["acme"], json!([{"organisationName": "Acme Holdings"}]));
        assert_eq!(body["none"], json!([]));
    }

    #[tokio::test]
    async fn linking_a_missing_contact_is_not_found() {
        let schema = schema().await;
        let (org, _) = seed(&schema).await;
        let code = error_code(
            &schema,
            ADD,
            json!({"input": {
                "organisationId": org,
                "contactId": "00000000-0000-0000-0000-000000000000",
                "role": "owner"
            }}),
        )
        .await;
        assert_eq!(code, "NOT_FOUND");
    }
}
