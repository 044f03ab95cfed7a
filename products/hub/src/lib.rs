//! Data layer of the Jezweb Hub dashboard: organisations, contacts and the
//! links between them, leads, quotes, websites and the managed option lists
//! that feed select inputs.
//!
//! Every data-access function takes a sea-orm connection. Functions that
//! write to more than one table open their own transaction and therefore take
//! a [`sea_orm::DatabaseConnection`]; the rest are generic over
//! [`sea_orm::ConnectionTrait`] and can run inside a caller's transaction.

pub mod contacts;
pub mod debounce;
pub mod error;
pub mod field_store;
pub mod field_values;
pub mod leads;
pub mod organisations;
pub mod query;
pub mod quotes;
pub mod relationship_store;
pub mod relationships;
pub mod store;
mod text;
pub mod validation;
pub mod websites;

pub use debounce::{SEARCH_DEBOUNCE, SearchDebouncer};
pub use error::{HubError, HubResult};
pub use field_store::{FieldValuesState, FieldValuesStore};
pub use query::{Filter, FilterOp, FilterValue, ListQuery, SortDirection};
pub use relationship_store::{RelationshipState, RelationshipStore};
pub use store::{CollectionStore, Resource, Searchable, StoreError, StoreState};
pub use text::slugify;
pub use validation::{FieldCheck, InputKind};
