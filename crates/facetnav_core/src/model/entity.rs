//! Entity model: taggable leaves of the category tree.
//!
//! # Invariants
//! - An entity belongs to exactly one category.
//! - `tags` holds each tag id at most once, in assignment order.
//! - `values` is keyed by facet property id.

use super::category::{Category, CategoryId};
use super::tag::{FacetPropertyId, Tag, TagId};
use super::value::FacetValue;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

pub type EntityId = Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub category: CategoryId,
    pub tags: Vec<TagId>,
    pub values: BTreeMap<FacetPropertyId, FacetValue>,
}

impl Entity {
    /// Builds a detached entity inside `category`. Persist it with `upsert`.
    pub fn new(name: impl Into<String>, category: &Category) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.id,
            tags: Vec::new(),
            values: BTreeMap::new(),
        }
    }

    pub fn has_tag(&self, tag: TagId) -> bool {
        self.tags.contains(&tag)
    }

    /// Assigns a tag. Returns `false` when it was already assigned.
    pub fn assign_tag(&mut self, tag: TagId) -> bool {
        if self.has_tag(tag) {
            return false;
        }
        self.tags.push(tag);
        true
    }

    /// Unassigns `tag` and drops the values stored for its properties.
    pub fn unassign_tag(&mut self, tag: &Tag) -> bool {
        let before = self.tags.len();
        self.tags.retain(|assigned| *assigned != tag.id);
        for property in &tag.facet.properties {
            self.values.remove(&property.id);
        }
        self.tags.len() != before
    }

    pub fn value(&self, property: FacetPropertyId) -> Option<&FacetValue> {
        self.values.get(&property)
    }

    /// Content copy under another category with a fresh identity.
    pub fn duplicate_under(&self, category: &Category, name: impl Into<String>) -> Entity {
        Entity {
            id: Uuid::new_v4(),
            name: name.into(),
            category: category.id,
            tags: self.tags.clone(),
            values: self.values.clone(),
        }
    }
}
