use async_trait::async_trait;
use chrono::Utc;
use entity::{organisation_contacts, organisations};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{Expr, Func};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::error::{HubError, HubResult};
use crate::query::{FieldKind, ListQuery, Queryable, SortDirection, apply_list_query, like_pattern};
use crate::store::{Resource, Searchable};
use crate::text::{clean, patch};
use crate::validation::Checks;

pub const ENTITY: &str = "organisation";
pub const DEFAULT_STATUS: &str = "active";
pub const MAX_SEARCH_RESULTS: u64 = 50;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: Option<String>,
    pub suburb: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
}

impl Address {
    fn cleaned(self) -> Self {
        Self {
            street: clean(self.street),
            suburb: clean(self.suburb),
            state: clean(self.state),
            postcode: clean(self.postcode),
            country: clean(self.country),
        }
    }

    pub fn billing(model: &organisations::Model) -> Self {
        Self {
            street: model.billing_street.clone(),
            suburb: model.billing_suburb.clone(),
            state: model.billing_state.clone(),
            postcode: model.billing_postcode.clone(),
            country: model.billing_country.clone(),
        }
    }

    pub fn shipping(model: &organisations::Model) -> Self {
        Self {
            street: model.shipping_street.clone(),
            suburb: model.shipping_suburb.clone(),
            state: model.shipping_state.clone(),
            postcode: model.shipping_postcode.clone(),
            country: model.shipping_country.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrganisation {
    pub organisation_name: String,
    pub organisation_type: Option<String>,
    pub status: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub billing_address: Address,
    #[serde(default)]
    pub shipping_address: Address,
    pub notes: Option<String>,
}

impl NewOrganisation {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            organisation_name: name.into(),
            ..Self::default()
        }
    }

    fn validate(&self) -> HubResult<()> {
        Checks::new()
            .required("organisationName", &self.organisation_name)
            .website("website", self.website.as_deref())
            .email("email", self.email.as_deref())
            .phone("phone", self.phone.as_deref())
            .finish()
    }
}

/// Partial update. `None` leaves a field alone; an empty string clears it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrganisationPatch {
    pub organisation_name: Option<String>,
    pub organisation_type: Option<String>,
    pub status: Option<String>,
    pub industry: Option<String>,
    pub website: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub billing_address: Option<Address>,
    pub shipping_address: Option<Address>,
    pub notes: Option<String>,
}

impl OrganisationPatch {
    fn validate(&self) -> HubResult<()> {
        let mut checks = Checks::new();
        if let Some(name) = &self.organisation_name {
            checks.required("organisationName", name);
        }
        if let Some(status) = &self.status {
            checks.required("status", status);
        }
        checks
            .website("website", self.website.as_deref())
            .email("email", self.email.as_deref())
            .phone("phone", self.phone.as_deref())
            .finish()
    }
}

impl Queryable for organisations::Entity {
    fn field(name: &str) -> Option<(organisations::Column, FieldKind)> {
        use organisations::Column;
        let mapped = match name {
            "id" => (Column::Id, FieldKind::Uuid),
            "organisationName" => (Column::OrganisationName, FieldKind::Text),
            "organisationType" => (Column::OrganisationType, FieldKind::Text),
            "status" => (Column::Status, FieldKind::Text),
            "industry" => (Column::Industry, FieldKind::Text),
            "website" => (Column::Website, FieldKind::Text),
            "email" => (Column::Email, FieldKind::Text),
            "phone" => (Column::Phone, FieldKind::Text),
            "billingSuburb" => (Column::BillingSuburb, FieldKind::Text),
            "billingState" => (Column::BillingState, FieldKind::Text),
            "billingPostcode" => (Column::BillingPostcode, FieldKind::Text),
            "billingCountry" => (Column::BillingCountry, FieldKind::Text),
            "shippingSuburb" => (Column::ShippingSuburb, FieldKind::Text),
            "shippingState" => (Column::ShippingState, FieldKind::Text),
            "shippingPostcode" => (Column::ShippingPostcode, FieldKind::Text),
            "shippingCountry" => (Column::ShippingCountry, FieldKind::Text),
            "createdAt" => (Column::CreatedAt, FieldKind::Timestamp),
            "updatedAt" => (Column::UpdatedAt, FieldKind::Timestamp),
            _ => return None,
        };
        Some(mapped)
    }

    fn default_order() -> (organisations::Column, SortDirection) {
        (organisations::Column::OrganisationName, SortDirection::Asc)
    }
}

#[instrument(name = "hub.organisations.list", skip_all, fields(filters = query.filters.len()))]
pub async fn list<C: ConnectionTrait>(
    db: &C,
    query: &ListQuery,
) -> HubResult<Vec<organisations::Model>> {
    let select = apply_list_query(organisations::Entity::find(), query)?;
    Ok(select.all(db).await?)
}

pub async fn get<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<Option<organisations::Model>> {
    Ok(organisations::Entity::find_by_id(id).one(db).await?)
}

pub async fn require<C: ConnectionTrait>(db: &C, id: Uuid) -> HubResult<organisations::Model> {
    get(db, id)
        .await?
        .ok_or_else(|| HubError::not_found(ENTITY, id))
}

#[instrument(name = "hub.organisations.create", skip_all)]
pub async fn create<C: ConnectionTrait>(
    db: &C,
    input: NewOrganisation,
) -> HubResult<organisations::Model> {
    input.validate()?;
    let now: DateTimeWithTimeZone = Utc::now().into();
    let billing = input.billing_address.cleaned();
    let shipping = input.shipping_address.cleaned();
    let model = organisations::ActiveModel {
        id: Set(Uuid::new_v4()),
        organisation_name: Set(input.organisation_name.trim().to_string()),
        organisation_type: Set(clean(input.organisation_type)),
        status: Set(clean(input.status).unwrap_or_else(|| DEFAULT_STATUS.to_string())),
        industry: Set(clean(input.industry)),
        website: Set(clean(input.website)),
        email: Set(clean(input.email)),
        phone: Set(clean(input.phone)),
        billing_street: Set(billing.street),
        billing_suburb: Set(billing.suburb),
        billing_state: Set(billing.state),
        billing_postcode: Set(billing.postcode),
        billing_country: Set(billing.country),
        shipping_street: Set(shipping.street),
        shipping_suburb: Set(shipping.suburb),
        shipping_state: Set(shipping.state),
        shipping_postcode: Set(shipping.postcode),
        shipping_country: Set(shipping.country),
        notes: Set(clean(input.notes)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(db)
    .await?;
    info!(organisation_id = %model.id, "organisation created");
    Ok(model)
}

/// Updates an organisation. A rename is copied onto its associations in the
/// same transaction.
#[instrument(name = "hub.organisations.update", skip(db, input))]
pub async fn update(
    db: &DatabaseConnection,
    id: Uuid,
    input: OrganisationPatch,
) -> HubResult<organisations::Model> {
    input.validate()?;
    let txn = db.begin().await?;
    let existing = require(&txn, id).await?;
    let previous_name = existing.organisation_name.clone();
    let now: DateTimeWithTimeZone = Utc::now().into();

    let mut active: organisations::ActiveModel = existing.clone().into();
    if let Some(name) = input.organisation_name {
        active.organisation_name = Set(name.trim().to_string());
    }
    if let Some(status) = input.status {
        active.status = Set(status.trim().to_string());
    }
    active.organisation_type = Set(patch(existing.organisation_type, input.organisation_type));
    active.industry = Set(patch(existing.industry, input.industry));
    active.website = Set(patch(existing.website, input.website));
    active.email = Set(patch(existing.email, input.email));
    active.phone = Set(patch(existing.phone, input.phone));
    active.notes = Set(patch(existing.notes, input.notes));
    if let Some(address) = input.billing_address.map(Address::cleaned) {
        active.billing_street = Set(address.street);
        active.billing_suburb = Set(address.suburb);
        active.billing_state = Set(address.state);
        active.billing_postcode = Set(address.postcode);
        active.billing_country = Set(address.country);
    }
    if let Some(address) = input.shipping_address.map(Address::cleaned) {
        active.shipping_street = Set(address.street);
        active.shipping_suburb = Set(address.suburb);
        active.shipping_state = Set(address.state);
        active.shipping_postcode = Set(address.postcode);
        active.shipping_country = Set(address.country);
    }
    active.updated_at = Set(now);
    let updated = active.update(&txn).await?;

    if updated.organisation_name != previous_name {
        let refreshed = organisation_contacts::Entity::update_many()
            .col_expr(
                organisation_contacts::Column::OrganisationName,
                Expr::value(updated.organisation_name.clone()),
            )
            .col_expr(organisation_contacts::Column::UpdatedAt, Expr::value(now))
            .filter(organisation_contacts::Column::OrganisationId.eq(id))
            .exec(&txn)
            .await?;
        info!(
            organisation_id = %id,
            associations = refreshed.rows_affected,
            "organisation renamed; associations refreshed"
        );
    }
    txn.commit().await?;
    Ok(updated)
}

/// Deletes an organisation together with its contact associations.
#[instrument(name = "hub.organisations.delete", skip(db))]
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> HubResult<bool> {
    let txn = db.begin().await?;
    let links = organisation_contacts::Entity::delete_many()
        .filter(organisation_contacts::Column::OrganisationId.eq(id))
        .exec(&txn)
        .await?;
    let res = organisations::Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    if res.rows_affected > 0 {
        info!(
            organisation_id = %id,
            associations = links.rows_affected,
            "organisation deleted"
        );
    }
    Ok(res.rows_affected > 0)
}

/// Case-insensitive substring match on the organisation name.
#[instrument(name = "hub.organisations.search", skip(db))]
pub async fn search_by_name<C: ConnectionTrait>(
    db: &C,
    term: &str,
) -> HubResult<Vec<organisations::Model>> {
    let Some(pattern) = like_pattern(term) else {
        return Ok(vec![]);
    };
    let rows = organisations::Entity::find()
        .filter(
            Expr::expr(Func::lower(Expr::col((
                organisations::Entity,
                organisations::Column::OrganisationName,
            ))))
            .like(pattern),
        )
        .order_by_asc(organisations::Column::OrganisationName)
        .limit(MAX_SEARCH_RESULTS)
        .all(db)
        .await?;
    Ok(rows)
}

pub struct Organisations;

#[async_trait]
impl Resource for Organisations {
    type Record = organisations::Model;
    type New = NewOrganisation;
    type Patch = OrganisationPatch;

    const NAME: &'static str = ENTITY;

    fn id_of(record: &organisations::Model) -> Uuid {
        record.id
    }

    async fn list(db: &DatabaseConnection, query: &ListQuery) -> HubResult<Vec<organisations::Model>> {
        list(db, query).await
    }

    async fn get(db: &DatabaseConnection, id: Uuid) -> HubResult<Option<organisations::Model>> {
        get(db, id).await
    }

    async fn create(db: &DatabaseConnection, input: NewOrganisation) -> HubResult<organisations::Model> {
        create(db, input).await
    }

    async fn update(
        db: &DatabaseConnection,
        id: Uuid,
        patch: OrganisationPatch,
    ) -> HubResult<organisations::Model> {
        update(db, id, patch).await
    }

    async fn delete(db: &DatabaseConnection, id: Uuid) -> HubResult<bool> {
        delete(db, id).await
    }
}

#[async_trait]
impl Searchable for Organisations {
    async fn search(db: &DatabaseConnection, term: &str) -> HubResult<Vec<organisations::Model>> {
        search_by_name(db, term).await
    }
}
