//! Category tree model.
//!
//! # Invariants
//! - Exactly one root exists; it has no parent and an empty name.
//! - Every other category has exactly one parent and a non-empty name.

use super::tag::Facet;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type CategoryId = Uuid;

/// Grouping node of the single-rooted category tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    /// `None` only for the root.
    pub parent: Option<CategoryId>,
    /// Carried opaquely; the engine never interprets it.
    pub facet: Option<Facet>,
}

impl Category {
    /// Builds the distinguished root category.
    pub fn root() -> Self {
        Self {
            id: Uuid::new_v4(),
            name: String::new(),
            parent: None,
            facet: None,
        }
    }

    /// Builds a detached child of `parent`. Persist it with `upsert`.
    pub fn new(name: impl Into<String>, parent: &Category) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            parent: Some(parent.id),
            facet: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Content copy under another parent with a fresh identity.
    pub fn duplicate_under(&self, parent: &Category, name: impl Into<String>) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.into(),
            parent: Some(parent.id),
            facet: self.facet.clone(),
        }
    }
}
