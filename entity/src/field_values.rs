use sea_orm::prelude::{DateTimeWithTimeZone, *};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "field_values")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub field_type: FieldType,
    pub value: String,
    pub label: String,
    pub is_default: bool,
    pub sort_order: i32,
    pub created_at: DateTimeWithTimeZone,
}

/// Select inputs whose options are user-managed.
#[derive(
    Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq, Hash, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum FieldType {
    #[sea_orm(string_value = "contact_roles")]
    ContactRoles,
    #[sea_orm(string_value = "contact_statuses")]
    ContactStatuses,
    #[sea_orm(string_value = "organisation_types")]
    OrganisationTypes,
    #[sea_orm(string_value = "organisation_statuses")]
    OrganisationStatuses,
    #[sea_orm(string_value = "lead_statuses")]
    LeadStatuses,
    #[sea_orm(string_value = "lead_sources")]
    LeadSources,
    #[sea_orm(string_value = "website_statuses")]
    WebsiteStatuses,
    #[sea_orm(string_value = "website_types")]
    WebsiteTypes,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
