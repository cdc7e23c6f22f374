//! Name guards shared by every mutation path.
//!
//! # Invariants
//! - Categories and entities under one parent share a single namespace.
//! - Invalid names are rejected before any store write.
//! - Facet property names hold no `.` and never equal a structural key of an
//!   assigned tag, so every facet slot has a key of its own.

use super::node::ItemType;
use super::projection::{
    ENTITY_PROPERTY, ID_PROPERTY, ITEM_TYPE_PROPERTY, NAME_PROPERTY,
    NEW_ITEM_TYPE_NAMES_PROPERTY, PROPERTY_NAMES_PROPERTY,
};
use super::{NavError, NavResult};
use crate::model::category::CategoryId;
use crate::model::names_equal;
use crate::repo::store::DomainStore;
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

static FORBIDDEN_NAME_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"[\\/*?\[\]<>|"\x00-\x1F\x7F]"#).expect("valid forbidden-name regex")
});

/// Trims `name` and checks it can be used as a path segment.
pub fn normalize_name(name: &str) -> NavResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() || FORBIDDEN_NAME_CHARS.is_match(trimmed) {
        return Err(NavError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}

/// Keys an assigned tag projects next to its facet values.
const ASSIGNED_TAG_KEYS: [&str; 6] = [
    ID_PROPERTY,
    NAME_PROPERTY,
    ITEM_TYPE_PROPERTY,
    ENTITY_PROPERTY,
    PROPERTY_NAMES_PROPERTY,
    NEW_ITEM_TYPE_NAMES_PROPERTY,
];

/// Checks an already normalized facet property name.
///
/// Entity-level keys are `<tag>.<property>`; a dot in the property part would
/// let two tags project the same key.
pub fn ensure_property_name(name: &str) -> NavResult<()> {
    if name.contains('.')
        || ASSIGNED_TAG_KEYS
            .iter()
            .any(|reserved| names_equal(reserved, name))
    {
        return Err(NavError::InvalidName(name.to_string()));
    }
    Ok(())
}

/// Fails when `name` is held by a category or an entity under `parent`.
///
/// `ignore` is the item being renamed or moved, so that it never collides
/// with itself (for example on a case-only rename).
pub fn ensure_name_available<S: DomainStore>(
    store: &S,
    parent: CategoryId,
    name: &str,
    ignore: Option<Uuid>,
) -> NavResult<()> {
    if let Some(category) = store.categories().find_by_parent_and_name(parent, name)? {
        if Some(category.id) != ignore {
            return Err(NavError::NameConflict {
                item_type: ItemType::Category,
                name: name.to_string(),
            });
        }
    }
    if let Some(entity) = store.entities().find_by_category_and_name(parent, name)? {
        if Some(entity.id) != ignore {
            return Err(NavError::NameConflict {
                item_type: ItemType::Entity,
                name: name.to_string(),
            });
        }
    }
    Ok(())
}
