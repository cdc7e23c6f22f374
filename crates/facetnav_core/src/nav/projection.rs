//! Item projection: nodes as flat, named property bags.
//!
//! # Responsibility
//! - Build the structural properties every node exposes.
//! - Synthesize facet-derived properties for entities and assigned tags.
//! - Stage typed facet writes and clears onto a detached entity copy.
//!
//! # Invariants
//! - Property-name lookup is case-insensitive.
//! - Unset facet values project as `PropertyValue::Absent`.
//! - A staged write either accepts every matched value or fails on the first
//!   type mismatch or unstorable value without producing an entity.
//! - Facet values never reach the log.

use super::node::{ItemType, NavNode};
use super::{NavError, NavResult};
use crate::model::entity::Entity;
use crate::model::names_equal;
use crate::model::tag::{FacetProperty, Tag};
use crate::model::value::FacetValue;
use crate::repo::store::DomainStore;

pub const ID_PROPERTY: &str = "Id";
pub const NAME_PROPERTY: &str = "Name";
pub const ITEM_TYPE_PROPERTY: &str = "ItemType";
pub const ENTITY_PROPERTY: &str = "Entity";
pub const PROPERTY_NAMES_PROPERTY: &str = "PropertyNames";
pub const NEW_ITEM_TYPE_NAMES_PROPERTY: &str = "NewItemTypeNames";
pub const VALUE_PROPERTY: &str = "Value";
pub const VALUE_TYPE_PROPERTY: &str = "ValueType";

/// Value of one projected property.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Value(FacetValue),
    Names(Vec<String>),
    /// Known property without a value.
    Absent,
}

impl PropertyValue {
    pub fn as_value(&self) -> Option<&FacetValue> {
        match self {
            Self::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl From<FacetValue> for PropertyValue {
    fn from(value: FacetValue) -> Self {
        Self::Value(value)
    }
}

impl From<Option<FacetValue>> for PropertyValue {
    fn from(value: Option<FacetValue>) -> Self {
        value.map_or(Self::Absent, Self::Value)
    }
}

/// Ordered, case-insensitive property map.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyBag {
    entries: Vec<(String, PropertyValue)>,
}

impl PropertyBag {
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.entries
            .iter()
            .find(|(key, _)| names_equal(key, name))
            .map(|(_, value)| value)
    }

    /// Shorthand for a property holding a scalar value.
    pub fn value(&self, name: &str) -> Option<&FacetValue> {
        self.get(name).and_then(PropertyValue::as_value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Adds a property unless one with the same name is already present.
    fn insert(&mut self, name: impl Into<String>, value: impl Into<PropertyValue>) {
        let name = name.into();
        if self.get(&name).is_none() {
            self.entries.push((name, value.into()));
        }
    }

    /// Keeps only the requested properties; unknown names are ignored and an
    /// empty request keeps everything.
    pub(crate) fn select(self, names: &[&str]) -> PropertyBag {
        if names.is_empty() {
            return self;
        }
        PropertyBag {
            entries: self
                .entries
                .into_iter()
                .filter(|(key, _)| names.iter().any(|name| names_equal(key, name)))
                .collect(),
        }
    }
}

/// Projection of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub item_type: ItemType,
    pub is_container: bool,
    pub properties: PropertyBag,
}

/// One facet property reachable through a node, under the key used to
/// address it there.
#[derive(Debug, Clone)]
pub(crate) struct FacetSlot {
    pub key: String,
    pub property: FacetProperty,
}

/// Entity and facet slots behind a node that carries facet values.
///
/// `None` for node kinds without facet values.
pub(crate) fn facet_slots<S: DomainStore>(
    store: &S,
    node: &NavNode,
) -> NavResult<Option<(Entity, Vec<FacetSlot>)>> {
    let slots = match node {
        NavNode::Entity(entity) => {
            let mut slots = Vec::new();
            for tag in assigned_tags(store, entity)? {
                slots.extend(tag.facet.properties.iter().map(|property| FacetSlot {
                    key: format!("{}.{}", tag.name, property.name),
                    property: property.clone(),
                }));
            }
            (entity.clone(), slots)
        }
        NavNode::AssignedTag { entity, tag } => (
            entity.clone(),
            tag.facet
                .properties
                .iter()
                .map(|property| FacetSlot {
                    key: property.name.clone(),
                    property: property.clone(),
                })
                .collect(),
        ),
        NavNode::AssignedFacetProperty {
            entity, property, ..
        } => (
            entity.clone(),
            vec![FacetSlot {
                key: VALUE_PROPERTY.to_string(),
                property: property.clone(),
            }],
        ),
        _ => return Ok(None),
    };
    Ok(Some(slots))
}

/// Tags assigned to `entity` that still exist, in assignment order.
pub(crate) fn assigned_tags<S: DomainStore>(store: &S, entity: &Entity) -> NavResult<Vec<Tag>> {
    let mut tags = Vec::with_capacity(entity.tags.len());
    for id in &entity.tags {
        if let Some(tag) = store.tags().find_by_id(*id)? {
            tags.push(tag);
        }
    }
    Ok(tags)
}

/// Projects `node` into an item.
pub fn project<S: DomainStore>(store: &S, node: &NavNode) -> NavResult<Item> {
    let item_type = node.item_type();
    let facet = facet_slots(store, node)?;
    let mut properties = PropertyBag::default();

    if let Some(id) = node.id() {
        properties.insert(ID_PROPERTY, FacetValue::Guid(id));
    }
    properties.insert(NAME_PROPERTY, FacetValue::from(node.name()));
    properties.insert(ITEM_TYPE_PROPERTY, FacetValue::from(item_type.as_str()));

    match node {
        NavNode::Tag(tag) => {
            properties.insert("FacetName", FacetValue::from(tag.facet.name.as_str()));
        }
        NavNode::FacetProperty { tag, property } => {
            properties.insert("Tag", FacetValue::from(tag.name.as_str()));
            properties.insert(
                VALUE_TYPE_PROPERTY,
                FacetValue::from(property.value_type.as_str()),
            );
        }
        NavNode::Category(category) => {
            if let Some(parent) = category.parent {
                properties.insert("Parent", FacetValue::Guid(parent));
            }
        }
        NavNode::Entity(entity) => {
            properties.insert("Category", FacetValue::Guid(entity.category));
            let tag_names = assigned_tags(store, entity)?
                .into_iter()
                .map(|tag| tag.name)
                .collect();
            properties.insert("Tags", PropertyValue::Names(tag_names));
        }
        NavNode::AssignedTag { entity, .. } => {
            properties.insert(ENTITY_PROPERTY, FacetValue::Guid(entity.id));
        }
        NavNode::AssignedFacetProperty {
            entity, property, ..
        } => {
            properties.insert(
                VALUE_TYPE_PROPERTY,
                FacetValue::from(property.value_type.as_str()),
            );
            properties.insert(VALUE_PROPERTY, entity.value(property.id).cloned());
        }
        NavNode::Relationship(relationship) => {
            properties.insert("From", FacetValue::Guid(relationship.from));
            properties.insert("To", FacetValue::Guid(relationship.to));
            properties.insert("Tag", relationship.tag.map(FacetValue::Guid));
        }
        _ => {}
    }

    if node.is_container() {
        let property_names = match node {
            NavNode::Tag(tag) => tag
                .facet
                .properties
                .iter()
                .map(|property| property.name.clone())
                .collect(),
            _ => facet
                .as_ref()
                .map(|(_, slots)| slots.iter().map(|slot| slot.key.clone()).collect())
                .unwrap_or_default(),
        };
        properties.insert(PROPERTY_NAMES_PROPERTY, PropertyValue::Names(property_names));
        properties.insert(
            NEW_ITEM_TYPE_NAMES_PROPERTY,
            PropertyValue::Names(
                node.new_item_type_names()
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
            ),
        );
    }

    if let Some((entity, slots)) = facet {
        if !matches!(node, NavNode::AssignedFacetProperty { .. }) {
            for slot in slots {
                properties.insert(slot.key, entity.value(slot.property.id).cloned());
            }
        }
    }

    Ok(Item {
        name: node.name().to_string(),
        item_type,
        is_container: node.is_container(),
        properties,
    })
}

/// Applies `pairs` to a copy of `entity`.
///
/// Names matching no slot are skipped. Returns `None` when nothing matched.
pub(crate) fn stage_writes(
    entity: &Entity,
    slots: &[FacetSlot],
    pairs: &[(&str, FacetValue)],
) -> NavResult<Option<Entity>> {
    let mut staged = entity.clone();
    let mut matched = false;
    for (name, value) in pairs {
        let Some(slot) = find_slot(slots, name) else {
            continue;
        };
        if !slot.property.accepts(value) {
            return Err(NavError::TypeMismatch {
                property: slot.key.clone(),
                expected: slot.property.value_type,
                actual: value.value_type(),
            });
        }
        if !value.is_storable() {
            return Err(NavError::InvalidValue {
                property: slot.key.clone(),
                value: value.to_string(),
            });
        }
        staged.values.insert(slot.property.id, value.clone());
        matched = true;
    }
    Ok(matched.then_some(staged))
}

/// Removes the values named by `names` from a copy of `entity`.
///
/// Returns `None` when no stored value was removed.
pub(crate) fn stage_clears(entity: &Entity, slots: &[FacetSlot], names: &[&str]) -> Option<Entity> {
    let mut staged = entity.clone();
    let mut changed = false;
    for name in names {
        if let Some(slot) = find_slot(slots, name) {
            changed |= staged.values.remove(&slot.property.id).is_some();
        }
    }
    changed.then_some(staged)
}

fn find_slot<'a>(slots: &'a [FacetSlot], name: &str) -> Option<&'a FacetSlot> {
    slots.iter().find(|slot| names_equal(&slot.key, name))
}
