//! Core domain logic for facetnav.
//! This crate is the single source of truth for the namespace invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod nav;
pub mod repo;
pub mod traverse;

pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::category::{Category, CategoryId};
pub use model::entity::{Entity, EntityId};
pub use model::relationship::{Relationship, RelationshipId};
pub use model::tag::{Facet, FacetProperty, FacetPropertyId, Tag, TagId};
pub use model::value::{FacetPropertyType, FacetValue};
pub use nav::{
    Item, ItemType, NavError, NavNode, NavPath, NavResult, Namespace, NewItemValue, PropertyBag,
    PropertyValue,
};
pub use repo::store::{ChangeAction, DomainStore, SqliteDomainStore, StoreChange};
pub use repo::{RepoError, RepoResult, StoredKind};
pub use traverse::{CopyTraverser, RemovalTraverser};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
