//! Relationship model.
//!
//! Relationships only matter to the engine through the entity deletion rule:
//! an entity referenced by any relationship cannot be deleted.

use super::entity::EntityId;
use super::tag::TagId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type RelationshipId = Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    pub id: RelationshipId,
    pub name: String,
    pub from: EntityId,
    pub to: EntityId,
    pub tag: Option<TagId>,
}

impl Relationship {
    pub fn new(name: impl Into<String>, from: EntityId, to: EntityId) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            from,
            to,
            tag: None,
        }
    }
}
