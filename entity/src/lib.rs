//! Table models for the hub. One module per table.

pub mod contacts;
pub mod field_values;
pub mod leads;
pub mod organisation_contacts;
pub mod organisations;
pub mod quotes;
pub mod websites;
