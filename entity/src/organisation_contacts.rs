use crate::{contacts, organisations};
use sea_orm::prelude::{DateTimeWithTimeZone, *};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Priority given to a primary association when the caller does not pick one.
pub const PRIMARY_PRIORITY: i32 = 1;
/// Priority given to every other association.
pub const SECONDARY_PRIORITY: i32 = 10;

/// Join row between a contact and an organisation. Display fields of both ends
/// are copied in at write time so lists render without a second lookup.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "organisation_contacts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub organisation_id: Uuid,
    #[sea_orm(indexed)]
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

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "organisations::Entity",
        from = "Column::OrganisationId",
        to = "organisations::Column::Id"
    )]
    Organisation,
    #[sea_orm(
        belongs_to = "contacts::Entity",
        from = "Column::ContactId",
        to = "contacts::Column::Id"
    )]
    Contact,
}

impl Related<organisations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Organisation.def()
    }
}

impl Related<contacts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contact.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
