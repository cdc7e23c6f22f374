//! Namespace verb engine.
//!
//! # Responsibility
//! - Expose the file-system-like verbs over resolved nodes: list, get,
//!   create, copy, move, rename, remove and property get/set/clear.
//! - Expose the facet-property-as-child-item verbs of tag nodes.
//!
//! # Invariants
//! - Every mutating verb runs in one atomic store scope; a failed verb leaves
//!   the store exactly as it was.
//! - Names are validated and checked against the shared category/entity
//!   namespace before any write.
//! - The root category is never renamed, moved or removed.

use super::names::{ensure_name_available, ensure_property_name, normalize_name};
use super::node::{Capabilities, ItemType, NavNode, TAGS_CONTAINER_NAME};
use super::path::{self, NavPath};
use super::projection::{facet_slots, project, stage_clears, stage_writes, Item, PropertyBag};
use super::{NavError, NavResult};
use crate::model::category::{Category, CategoryId};
use crate::model::entity::Entity;
use crate::model::names_equal;
use crate::model::relationship::Relationship;
use crate::model::tag::{FacetProperty, FacetPropertyId, Tag, TagId};
use crate::model::value::{FacetPropertyType, FacetValue};
use crate::repo::store::DomainStore;
use crate::traverse::{CopyTraverser, RemovalTraverser};
use log::info;
use std::collections::HashSet;

/// Extra input some item types need on `create`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum NewItemValue {
    #[default]
    None,
    /// Declared type of a new facet property.
    PropertyType(FacetPropertyType),
    /// Entity paths of both ends plus an optional tag name.
    Relationship {
        from: String,
        to: String,
        tag: Option<String>,
    },
}

/// Path-addressable view over one domain store.
pub struct Namespace<'s, S: DomainStore> {
    store: &'s S,
}

impl<'s, S: DomainStore> Namespace<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Resolves `path`; a trailing separator yields the children of its
    /// last node. Not found is an empty vector.
    pub fn resolve(&self, path: &str) -> NavResult<Vec<NavNode>> {
        path::resolve(self.store, &NavPath::parse(path))
    }

    /// Projects the children of the node at `path`.
    pub fn list(&self, path: &str) -> NavResult<Vec<Item>> {
        path::resolve(self.store, &NavPath::parse(path).children())?
            .iter()
            .map(|node| project(self.store, node))
            .collect()
    }

    /// Projects the node at `path`, or `None` when nothing resolves.
    pub fn get(&self, path: &str) -> NavResult<Option<Item>> {
        self.find_node(path)?
            .map(|node| project(self.store, &node))
            .transpose()
    }

    /// Creates an item whose full path is `path`.
    ///
    /// `item_type_name` must be one of the parent's new-item type names.
    pub fn create(
        &self,
        path: &str,
        item_type_name: &str,
        value: NewItemValue,
    ) -> NavResult<Item> {
        let parsed = NavPath::parse(path);
        let (parent_path, leaf) = parsed
            .split_leaf()
            .ok_or_else(|| NavError::InvalidDestination(path.to_string()))?;
        let parent = path::resolve(self.store, &parent_path)?
            .pop()
            .ok_or_else(|| NavError::ItemNotFound(parent_path.to_string()))?;
        let item_type = allowed_item_type(&parent, item_type_name)?;
        let name = normalize_name(leaf)?;

        let node = self
            .store
            .atomically(|| self.create_under(&parent, item_type, &name, &value))?;
        log_mutation("item_created", &node);
        project(self.store, &node)
    }

    /// Copies the item at `path` into `destination`, optionally renaming the
    /// copy. Category copies include their subtree when `recurse` is set.
    pub fn copy(
        &self,
        path: &str,
        new_name: Option<&str>,
        destination: &str,
        recurse: bool,
    ) -> NavResult<Item> {
        let source = self.target(path)?;
        ensure_capable(&source, |caps| caps.copy_item, "copy")?;
        let target = self.destination(destination)?;
        let name = new_name.map(normalize_name).transpose()?;

        let copy = self.store.atomically(|| {
            self.copy_node(&source, &target, name.as_deref(), recurse, destination)
        })?;
        log_mutation("item_copied", &copy);
        project(self.store, &copy)
    }

    /// Moves the item at `path` into `destination`, optionally renaming it.
    pub fn move_item(
        &self,
        path: &str,
        new_name: Option<&str>,
        destination: &str,
    ) -> NavResult<Item> {
        let source = self.target(path)?;
        ensure_not_root(&source)?;
        ensure_capable(&source, |caps| caps.move_item, "move")?;
        let target = self.destination(destination)?;
        let name = new_name.map(normalize_name).transpose()?;

        let moved = self
            .store
            .atomically(|| self.move_node(&source, &target, name.as_deref(), destination))?;
        log_mutation("item_moved", &moved);
        project(self.store, &moved)
    }

    pub fn rename(&self, path: &str, new_name: &str) -> NavResult<Item> {
        let node = self.target(path)?;
        ensure_not_root(&node)?;
        ensure_capable(&node, |caps| caps.rename_item, "rename")?;
        let name = normalize_name(new_name)?;

        let renamed = self.store.atomically(|| self.rename_node(&node, &name))?;
        log_mutation("item_renamed", &renamed);
        project(self.store, &renamed)
    }

    /// Removes the item at `path`.
    ///
    /// A category holding anything is only removed when `recurse` is set.
    pub fn remove(&self, path: &str, recurse: bool) -> NavResult<()> {
        let node = self.target(path)?;
        ensure_not_root(&node)?;
        ensure_capable(&node, |caps| caps.remove_item, "remove")?;

        self.store
            .atomically(|| self.remove_node(&node, path, recurse))?;
        log_mutation("item_removed", &node);
        Ok(())
    }

    /// Reads the named properties; an empty `names` reads them all.
    ///
    /// Unknown names are skipped. `None` when `path` does not resolve.
    pub fn get_properties(&self, path: &str, names: &[&str]) -> NavResult<Option<PropertyBag>> {
        let Some(node) = self.find_node(path)? else {
            return Ok(None);
        };
        Ok(Some(project(self.store, &node)?.properties.select(names)))
    }

    /// Writes facet values; unknown names are skipped.
    ///
    /// Every matched value is type-checked before anything is written.
    pub fn set_properties(&self, path: &str, pairs: &[(&str, FacetValue)]) -> NavResult<()> {
        let node = self.target(path)?;
        ensure_capable(&node, |caps| caps.set_properties, "set properties")?;
        let Some((entity, slots)) = facet_slots(self.store, &node)? else {
            return Err(not_supported(&node, "set properties"));
        };
        let Some(staged) = stage_writes(&entity, &slots, pairs)? else {
            return Ok(());
        };

        self.store
            .atomically(|| self.store.entities().upsert(&staged))?;
        info!(
            "event=properties_set module=nav status=ok entity_id={} requested={}",
            staged.id,
            pairs.len()
        );
        Ok(())
    }

    /// Clears facet values; unknown or unset names are skipped.
    pub fn clear_property(&self, path: &str, names: &[&str]) -> NavResult<()> {
        let node = self.target(path)?;
        ensure_capable(&node, |caps| caps.clear_property, "clear property")?;
        let Some((entity, slots)) = facet_slots(self.store, &node)? else {
            return Err(not_supported(&node, "clear property"));
        };
        let Some(staged) = stage_clears(&entity, &slots, names) else {
            return Ok(());
        };

        self.store
            .atomically(|| self.store.entities().upsert(&staged))?;
        info!(
            "event=properties_cleared module=nav status=ok entity_id={} requested={}",
            staged.id,
            names.len()
        );
        Ok(())
    }

    /// Adds a facet property to the tag at `path`.
    pub fn new_item_property(
        &self,
        path: &str,
        name: &str,
        value_type: FacetPropertyType,
    ) -> NavResult<Item> {
        let tag = self.tag_at(path)?;
        let name = normalize_name(name)?;

        let node = self
            .store
            .atomically(|| self.add_facet_property(tag, &name, value_type))?;
        log_mutation("item_created", &node);
        project(self.store, &node)
    }

    pub fn rename_item_property(&self, path: &str, name: &str, new_name: &str) -> NavResult<Item> {
        let tag = self.tag_at(path)?;
        let property = property_of(&tag, path, name)?;
        let new_name = normalize_name(new_name)?;

        let node = self
            .store
            .atomically(|| self.rename_facet_property(tag, property.id, &new_name))?;
        log_mutation("item_renamed", &node);
        project(self.store, &node)
    }

    /// Removes a facet property and the values entities hold for it.
    pub fn remove_item_property(&self, path: &str, name: &str) -> NavResult<()> {
        let tag = self.tag_at(path)?;
        let property = property_of(&tag, path, name)?;

        self.store
            .atomically(|| self.remove_facet_property(tag, &property.name))?;
        info!(
            "event=item_removed module=nav status=ok item_type={} id={}",
            ItemType::FacetProperty,
            property.id
        );
        Ok(())
    }

    /// Copies a facet property to the tag at `destination` with a new identity.
    pub fn copy_item_property(&self, path: &str, name: &str, destination: &str) -> NavResult<Item> {
        self.transfer_item_property(path, name, destination, false)
    }

    /// Moves a facet property to the tag at `destination`, keeping its identity.
    pub fn move_item_property(&self, path: &str, name: &str, destination: &str) -> NavResult<Item> {
        self.transfer_item_property(path, name, destination, true)
    }

    fn transfer_item_property(
        &self,
        path: &str,
        name: &str,
        destination: &str,
        keep_identity: bool,
    ) -> NavResult<Item> {
        let tag = self.tag_at(path)?;
        let property = property_of(&tag, path, name)?;
        let target = match self.find_node(destination)? {
            Some(NavNode::Tag(target)) => target,
            _ => return Err(NavError::InvalidDestination(destination.to_string())),
        };

        let node = self.store.atomically(|| {
            self.transfer_facet_property(tag, &property, target, &property.name, keep_identity)
        })?;
        log_mutation(
            if keep_identity {
                "item_moved"
            } else {
                "item_copied"
            },
            &node,
        );
        project(self.store, &node)
    }

    fn find_node(&self, path: &str) -> NavResult<Option<NavNode>> {
        Ok(path::resolve(self.store, &NavPath::parse(path).node())?.pop())
    }

    fn target(&self, path: &str) -> NavResult<NavNode> {
        self.find_node(path)?
            .ok_or_else(|| NavError::ItemNotFound(path.to_string()))
    }

    fn destination(&self, path: &str) -> NavResult<NavNode> {
        self.find_node(path)?
            .ok_or_else(|| NavError::InvalidDestination(path.to_string()))
    }

    fn tag_at(&self, path: &str) -> NavResult<Tag> {
        match self.target(path)? {
            NavNode::Tag(tag) => Ok(tag),
            other => Err(not_supported(&other, "item properties")),
        }
    }

    fn entity_at(&self, path: &str) -> NavResult<Entity> {
        match self.find_node(path)? {
            Some(NavNode::Entity(entity)) => Ok(entity),
            _ => Err(NavError::InvalidDestination(path.to_string())),
        }
    }

    fn create_under(
        &self,
        parent: &NavNode,
        item_type: ItemType,
        name: &str,
        value: &NewItemValue,
    ) -> NavResult<NavNode> {
        match (parent, item_type) {
            (NavNode::TagsContainer, ItemType::Tag) => {
                let tag = Tag::new(name);
                self.store.tags().upsert(&tag)?;
                Ok(NavNode::Tag(tag))
            }
            (NavNode::Tag(tag), ItemType::FacetProperty) => {
                let NewItemValue::PropertyType(value_type) = value else {
                    return Err(NavError::MissingValue("facet property type"));
                };
                self.add_facet_property(tag.clone(), name, *value_type)
            }
            (
                NavNode::EntitiesContainer(category) | NavNode::Category(category),
                ItemType::Category,
            ) => {
                ensure_name_available(self.store, category.id, name, None)?;
                let child = Category::new(name, category);
                self.store.categories().upsert(&child)?;
                Ok(NavNode::Category(child))
            }
            (
                NavNode::EntitiesContainer(category) | NavNode::Category(category),
                ItemType::Entity,
            ) => {
                ensure_name_available(self.store, category.id, name, None)?;
                let entity = Entity::new(name, category);
                self.store.entities().upsert(&entity)?;
                Ok(NavNode::Entity(entity))
            }
            (NavNode::Entity(entity), ItemType::AssignedTag) => {
                let tag = self.store.tags().find_by_name(name)?.ok_or_else(|| {
                    NavError::ItemNotFound(format!("{TAGS_CONTAINER_NAME}\\{name}"))
                })?;
                let mut entity = entity.clone();
                if !entity.assign_tag(tag.id) {
                    return Err(NavError::NameConflict {
                        item_type: ItemType::AssignedTag,
                        name: tag.name,
                    });
                }
                self.store.entities().upsert(&entity)?;
                Ok(NavNode::AssignedTag { entity, tag })
            }
            (NavNode::RelationshipsContainer, ItemType::Relationship) => {
                let NewItemValue::Relationship { from, to, tag } = value else {
                    return Err(NavError::MissingValue("relationship endpoints"));
                };
                let from = self.entity_at(from)?;
                let to = self.entity_at(to)?;
                let mut relationship = Relationship::new(name, from.id, to.id);
                if let Some(tag_name) = tag {
                    let tag = self.store.tags().find_by_name(tag_name)?.ok_or_else(|| {
                        NavError::ItemNotFound(format!("{TAGS_CONTAINER_NAME}\\{tag_name}"))
                    })?;
                    relationship.tag = Some(tag.id);
                }
                self.store.relationships().upsert(&relationship)?;
                Ok(NavNode::Relationship(relationship))
            }
            _ => Err(NavError::ItemTypeNotAllowed(item_type.as_str().to_string())),
        }
    }

    fn copy_node(
        &self,
        source: &NavNode,
        target: &NavNode,
        name: Option<&str>,
        recurse: bool,
        destination: &str,
    ) -> NavResult<NavNode> {
        let name = name.unwrap_or_else(|| source.name());
        match (source, target) {
            (
                NavNode::Category(category),
                NavNode::EntitiesContainer(parent) | NavNode::Category(parent),
            ) => {
                ensure_name_available(self.store, parent.id, name, None)?;
                let copy = CopyTraverser::new(self.store)
                    .copy_category_as(category, parent, name, recurse)?;
                Ok(NavNode::Category(copy))
            }
            (
                NavNode::Entity(entity),
                NavNode::EntitiesContainer(parent) | NavNode::Category(parent),
            ) => {
                ensure_name_available(self.store, parent.id, name, None)?;
                let copy = entity.duplicate_under(parent, name);
                self.store.entities().upsert(&copy)?;
                Ok(NavNode::Entity(copy))
            }
            (NavNode::Tag(tag), NavNode::TagsContainer) => {
                let copy = tag.duplicate(name);
                self.store.tags().upsert(&copy)?;
                Ok(NavNode::Tag(copy))
            }
            (NavNode::FacetProperty { tag, property }, NavNode::Tag(target)) => {
                self.transfer_facet_property(tag.clone(), property, target.clone(), name, false)
            }
            (NavNode::AssignedTag { entity, tag }, NavNode::Entity(target)) => {
                self.transfer_assigned_tag(entity, tag, target, false)
            }
            _ => Err(NavError::InvalidDestination(destination.to_string())),
        }
    }

    fn move_node(
        &self,
        source: &NavNode,
        target: &NavNode,
        name: Option<&str>,
        destination: &str,
    ) -> NavResult<NavNode> {
        let name = name.unwrap_or_else(|| source.name());
        match (source, target) {
            (
                NavNode::Category(category),
                NavNode::EntitiesContainer(parent) | NavNode::Category(parent),
            ) => {
                if self.would_create_cycle(category.id, parent.id)? {
                    return Err(NavError::CycleDetected {
                        item: category.name.clone(),
                        destination: destination.to_string(),
                    });
                }
                ensure_name_available(self.store, parent.id, name, Some(category.id))?;
                let mut moved = category.clone();
                moved.parent = Some(parent.id);
                moved.name = name.to_string();
                self.store.categories().upsert(&moved)?;
                Ok(NavNode::Category(moved))
            }
            (
                NavNode::Entity(entity),
                NavNode::EntitiesContainer(parent) | NavNode::Category(parent),
            ) => {
                ensure_name_available(self.store, parent.id, name, Some(entity.id))?;
                let mut moved = entity.clone();
                moved.category = parent.id;
                moved.name = name.to_string();
                self.store.entities().upsert(&moved)?;
                Ok(NavNode::Entity(moved))
            }
            (NavNode::FacetProperty { tag, property }, NavNode::Tag(target)) => {
                self.transfer_facet_property(tag.clone(), property, target.clone(), name, true)
            }
            (NavNode::AssignedTag { entity, tag }, NavNode::Entity(target)) => {
                self.transfer_assigned_tag(entity, tag, target, true)
            }
            _ => Err(NavError::InvalidDestination(destination.to_string())),
        }
    }

    fn rename_node(&self, node: &NavNode, name: &str) -> NavResult<NavNode> {
        match node {
            NavNode::Category(category) => {
                let parent = category.parent.ok_or(NavError::RootNotModifiable)?;
                ensure_name_available(self.store, parent, name, Some(category.id))?;
                let mut renamed = category.clone();
                renamed.name = name.to_string();
                self.store.categories().upsert(&renamed)?;
                Ok(NavNode::Category(renamed))
            }
            NavNode::Entity(entity) => {
                ensure_name_available(self.store, entity.category, name, Some(entity.id))?;
                let mut renamed = entity.clone();
                renamed.name = name.to_string();
                self.store.entities().upsert(&renamed)?;
                Ok(NavNode::Entity(renamed))
            }
            NavNode::Tag(tag) => {
                let mut renamed = tag.clone();
                renamed.name = name.to_string();
                self.store.tags().upsert(&renamed)?;
                Ok(NavNode::Tag(renamed))
            }
            NavNode::FacetProperty { tag, property } => {
                self.rename_facet_property(tag.clone(), property.id, name)
            }
            NavNode::Relationship(relationship) => {
                let mut renamed = relationship.clone();
                renamed.name = name.to_string();
                self.store.relationships().upsert(&renamed)?;
                Ok(NavNode::Relationship(renamed))
            }
            other => Err(not_supported(other, "rename")),
        }
    }

    fn remove_node(&self, node: &NavNode, path: &str, recurse: bool) -> NavResult<()> {
        match node {
            NavNode::Category(category) => {
                let removal = RemovalTraverser::new(self.store);
                let removed = if recurse {
                    removal.delete_recursively(category)?
                } else {
                    removal.delete_if_empty(category)?
                };
                if !removed {
                    return Err(NavError::CategoryNotEmpty(path.to_string()));
                }
                Ok(())
            }
            NavNode::Entity(entity) => Ok(self.store.entities().delete(entity.id)?),
            NavNode::Tag(tag) => Ok(self.store.tags().delete(tag.id)?),
            NavNode::FacetProperty { tag, property } => {
                self.remove_facet_property(tag.clone(), &property.name)
            }
            NavNode::AssignedTag { entity, tag } => {
                let mut updated = entity.clone();
                updated.unassign_tag(tag);
                Ok(self.store.entities().upsert(&updated)?)
            }
            NavNode::Relationship(relationship) => {
                Ok(self.store.relationships().delete(relationship.id)?)
            }
            other => Err(not_supported(other, "remove")),
        }
    }

    fn add_facet_property(
        &self,
        mut tag: Tag,
        name: &str,
        value_type: FacetPropertyType,
    ) -> NavResult<NavNode> {
        ensure_property_name(name)?;
        let property = FacetProperty::new(name, value_type);
        if !tag.facet.add_property(property.clone()) {
            return Err(facet_property_conflict(name));
        }
        self.store.tags().upsert(&tag)?;
        Ok(NavNode::FacetProperty { tag, property })
    }

    fn rename_facet_property(
        &self,
        mut tag: Tag,
        property: FacetPropertyId,
        name: &str,
    ) -> NavResult<NavNode> {
        ensure_property_name(name)?;
        if tag
            .facet
            .properties
            .iter()
            .any(|other| other.id != property && names_equal(&other.name, name))
        {
            return Err(facet_property_conflict(name));
        }
        let Some(slot) = tag
            .facet
            .properties
            .iter_mut()
            .find(|candidate| candidate.id == property)
        else {
            return Err(NavError::ItemNotFound(format!("{}\\{name}", tag.name)));
        };
        slot.name = name.to_string();
        let renamed = slot.clone();
        self.store.tags().upsert(&tag)?;
        Ok(NavNode::FacetProperty {
            tag,
            property: renamed,
        })
    }

    fn remove_facet_property(&self, mut tag: Tag, name: &str) -> NavResult<()> {
        let removed = tag
            .facet
            .remove_property(name)
            .ok_or_else(|| NavError::ItemNotFound(format!("{}\\{name}", tag.name)))?;
        self.store.tags().upsert(&tag)?;
        self.purge_values(tag.id, removed.id, None)
    }

    /// Copies (fresh identity) or moves (same identity) a facet property.
    fn transfer_facet_property(
        &self,
        source: Tag,
        property: &FacetProperty,
        target: Tag,
        name: &str,
        keep_identity: bool,
    ) -> NavResult<NavNode> {
        ensure_property_name(name)?;
        if source.id == target.id {
            return if keep_identity {
                self.rename_facet_property(source, property.id, name)
            } else {
                self.add_facet_property(source, name, property.value_type)
            };
        }
        if target.facet.property(name).is_some() {
            return Err(facet_property_conflict(name));
        }

        let mut transferred = FacetProperty::new(name, property.value_type);
        if keep_identity {
            transferred.id = property.id;
            let mut source = source;
            source
                .facet
                .properties
                .retain(|candidate| candidate.id != property.id);
            self.store.tags().upsert(&source)?;
            self.purge_values(source.id, property.id, Some(target.id))?;
        }

        let mut target = target;
        target.facet.properties.push(transferred.clone());
        self.store.tags().upsert(&target)?;
        Ok(NavNode::FacetProperty {
            tag: target,
            property: transferred,
        })
    }

    /// Drops values for `property` from entities tagged with `tag`, except
    /// those also carrying `keep_if_tagged`.
    fn purge_values(
        &self,
        tag: TagId,
        property: FacetPropertyId,
        keep_if_tagged: Option<TagId>,
    ) -> NavResult<()> {
        for mut entity in self.store.entities().find_by_tag(tag)? {
            if keep_if_tagged.is_some_and(|kept| entity.has_tag(kept)) {
                continue;
            }
            if entity.values.remove(&property).is_some() {
                self.store.entities().upsert(&entity)?;
            }
        }
        Ok(())
    }

    /// Copies or moves a tag assignment together with that tag's values.
    fn transfer_assigned_tag(
        &self,
        source: &Entity,
        tag: &Tag,
        target: &Entity,
        keep_identity: bool,
    ) -> NavResult<NavNode> {
        if source.id == target.id && keep_identity {
            return Ok(NavNode::AssignedTag {
                entity: source.clone(),
                tag: tag.clone(),
            });
        }

        let mut target = target.clone();
        if !target.assign_tag(tag.id) {
            return Err(NavError::NameConflict {
                item_type: ItemType::AssignedTag,
                name: tag.name.clone(),
            });
        }
        for property in &tag.facet.properties {
            if let Some(value) = source.value(property.id) {
                target.values.insert(property.id, value.clone());
            }
        }
        self.store.entities().upsert(&target)?;

        if keep_identity {
            let mut source = source.clone();
            source.unassign_tag(tag);
            self.store.entities().upsert(&source)?;
        }
        Ok(NavNode::AssignedTag {
            entity: target,
            tag: tag.clone(),
        })
    }

    fn would_create_cycle(
        &self,
        category: CategoryId,
        candidate_parent: CategoryId,
    ) -> NavResult<bool> {
        let mut visited = HashSet::new();
        let mut cursor = Some(candidate_parent);
        while let Some(current) = cursor {
            if current == category || !visited.insert(current) {
                return Ok(true);
            }
            cursor = self
                .store
                .categories()
                .find_by_id(current)?
                .and_then(|parent| parent.parent);
        }
        Ok(false)
    }
}

fn allowed_item_type(parent: &NavNode, item_type_name: &str) -> NavResult<ItemType> {
    parent
        .new_item_type_names()
        .iter()
        .find(|allowed| names_equal(allowed, item_type_name.trim()))
        .and_then(|allowed| ItemType::parse(allowed))
        .ok_or_else(|| NavError::ItemTypeNotAllowed(item_type_name.to_string()))
}

fn property_of(tag: &Tag, path: &str, name: &str) -> NavResult<FacetProperty> {
    tag.facet
        .property(name)
        .cloned()
        .ok_or_else(|| NavError::ItemNotFound(format!("{path}\\{name}")))
}

fn ensure_not_root(node: &NavNode) -> NavResult<()> {
    if matches!(node, NavNode::EntitiesContainer(_)) {
        return Err(NavError::RootNotModifiable);
    }
    Ok(())
}

fn ensure_capable(
    node: &NavNode,
    capable: fn(&Capabilities) -> bool,
    operation: &'static str,
) -> NavResult<()> {
    if capable(&node.capabilities()) {
        return Ok(());
    }
    Err(not_supported(node, operation))
}

fn not_supported(node: &NavNode, operation: &'static str) -> NavError {
    NavError::NotSupported {
        item_type: node.item_type(),
        operation,
    }
}

fn facet_property_conflict(name: &str) -> NavError {
    NavError::NameConflict {
        item_type: ItemType::FacetProperty,
        name: name.to_string(),
    }
}

fn log_mutation(event: &str, node: &NavNode) {
    info!(
        "event={event} module=nav status=ok item_type={} id={}",
        node.item_type(),
        node.id().map(|id| id.to_string()).unwrap_or_default()
    );
}
