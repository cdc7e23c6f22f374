//! Node taxonomy: every kind of addressable node and what it can do.
//!
//! # Responsibility
//! - Enumerate the closed set of node kinds and their capability table.
//! - Resolve one path segment below a node (or list all children).
//!
//! # Invariants
//! - Segment matching is case-insensitive.
//! - A segment resolves to at most one node: below a category the shared
//!   namespace makes category and entity names disjoint.
//! - Tag references whose tag no longer exists are skipped.

use super::NavResult;
use crate::model::category::Category;
use crate::model::entity::Entity;
use crate::model::names_equal;
use crate::model::relationship::Relationship;
use crate::model::tag::{FacetProperty, Tag};
use crate::repo::store::DomainStore;
use crate::repo::StoredKind;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const TAGS_CONTAINER_NAME: &str = "Tags";
pub const ENTITIES_CONTAINER_NAME: &str = "Entities";
pub const RELATIONSHIPS_CONTAINER_NAME: &str = "Relationships";

/// Kind of an addressable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Root,
    TagsContainer,
    Tag,
    FacetProperty,
    EntitiesContainer,
    Category,
    Entity,
    AssignedTag,
    AssignedFacetProperty,
    RelationshipsContainer,
    Relationship,
}

/// Verbs a node kind implements. Fixed per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Capabilities {
    pub is_container: bool,
    pub new_item: bool,
    pub copy_item: bool,
    pub move_item: bool,
    pub rename_item: bool,
    pub remove_item: bool,
    pub get_properties: bool,
    pub set_properties: bool,
    pub clear_property: bool,
    /// Facet-property-as-child-item verbs; tags only.
    pub item_properties: bool,
}

impl ItemType {
    pub const ALL: [ItemType; 11] = [
        Self::Root,
        Self::TagsContainer,
        Self::Tag,
        Self::FacetProperty,
        Self::EntitiesContainer,
        Self::Category,
        Self::Entity,
        Self::AssignedTag,
        Self::AssignedFacetProperty,
        Self::RelationshipsContainer,
        Self::Relationship,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Root => "Root",
            Self::TagsContainer => "TagsContainer",
            Self::Tag => "Tag",
            Self::FacetProperty => "FacetProperty",
            Self::EntitiesContainer => "EntitiesContainer",
            Self::Category => "Category",
            Self::Entity => "Entity",
            Self::AssignedTag => "AssignedTag",
            Self::AssignedFacetProperty => "AssignedFacetProperty",
            Self::RelationshipsContainer => "RelationshipsContainer",
            Self::Relationship => "Relationship",
        }
    }

    /// Parses an item type name, ignoring case.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|item_type| names_equal(item_type.as_str(), value.trim()))
    }

    /// Item types `create` accepts below a node of this kind.
    pub fn new_item_type_names(self) -> &'static [&'static str] {
        match self {
            Self::TagsContainer => &["Tag"],
            Self::Tag => &["FacetProperty"],
            Self::EntitiesContainer | Self::Category => &["Category", "Entity"],
            Self::Entity => &["AssignedTag"],
            Self::RelationshipsContainer => &["Relationship"],
            _ => &[],
        }
    }

    pub fn capabilities(self) -> Capabilities {
        let leaf = Capabilities {
            get_properties: true,
            ..Capabilities::default()
        };
        let container = Capabilities {
            is_container: true,
            ..leaf
        };
        match self {
            Self::Root => container,
            Self::TagsContainer | Self::EntitiesContainer | Self::RelationshipsContainer => {
                Capabilities {
                    new_item: true,
                    ..container
                }
            }
            Self::Tag => Capabilities {
                new_item: true,
                copy_item: true,
                rename_item: true,
                remove_item: true,
                item_properties: true,
                ..container
            },
            Self::FacetProperty => Capabilities {
                copy_item: true,
                move_item: true,
                rename_item: true,
                remove_item: true,
                ..leaf
            },
            Self::Category => Capabilities {
                new_item: true,
                copy_item: true,
                move_item: true,
                rename_item: true,
                remove_item: true,
                ..container
            },
            Self::Entity => Capabilities {
                new_item: true,
                copy_item: true,
                move_item: true,
                rename_item: true,
                remove_item: true,
                set_properties: true,
                clear_property: true,
                ..container
            },
            Self::AssignedTag => Capabilities {
                copy_item: true,
                move_item: true,
                remove_item: true,
                set_properties: true,
                clear_property: true,
                ..container
            },
            Self::AssignedFacetProperty => Capabilities {
                set_properties: true,
                clear_property: true,
                ..leaf
            },
            Self::Relationship => Capabilities {
                rename_item: true,
                remove_item: true,
                ..leaf
            },
        }
    }
}

impl Display for ItemType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<StoredKind> for ItemType {
    fn from(value: StoredKind) -> Self {
        match value {
            StoredKind::Category => Self::Category,
            StoredKind::Entity => Self::Entity,
            StoredKind::Tag => Self::Tag,
            StoredKind::FacetProperty => Self::FacetProperty,
            StoredKind::Relationship => Self::Relationship,
        }
    }
}

/// One resolved node. Domain objects inside are detached copies.
#[derive(Debug, Clone, PartialEq)]
pub enum NavNode {
    Root,
    TagsContainer,
    Tag(Tag),
    FacetProperty {
        tag: Tag,
        property: FacetProperty,
    },
    /// Wraps the root category.
    EntitiesContainer(Category),
    Category(Category),
    Entity(Entity),
    AssignedTag {
        entity: Entity,
        tag: Tag,
    },
    AssignedFacetProperty {
        entity: Entity,
        tag: Tag,
        property: FacetProperty,
    },
    RelationshipsContainer,
    Relationship(Relationship),
}

impl NavNode {
    pub fn item_type(&self) -> ItemType {
        match self {
            Self::Root => ItemType::Root,
            Self::TagsContainer => ItemType::TagsContainer,
            Self::Tag(_) => ItemType::Tag,
            Self::FacetProperty { .. } => ItemType::FacetProperty,
            Self::EntitiesContainer(_) => ItemType::EntitiesContainer,
            Self::Category(_) => ItemType::Category,
            Self::Entity(_) => ItemType::Entity,
            Self::AssignedTag { .. } => ItemType::AssignedTag,
            Self::AssignedFacetProperty { .. } => ItemType::AssignedFacetProperty,
            Self::RelationshipsContainer => ItemType::RelationshipsContainer,
            Self::Relationship(_) => ItemType::Relationship,
        }
    }

    /// The path segment this node matches.
    pub fn name(&self) -> &str {
        match self {
            Self::Root => "",
            Self::TagsContainer => TAGS_CONTAINER_NAME,
            Self::EntitiesContainer(_) => ENTITIES_CONTAINER_NAME,
            Self::RelationshipsContainer => RELATIONSHIPS_CONTAINER_NAME,
            Self::Tag(tag) | Self::AssignedTag { tag, .. } => &tag.name,
            Self::FacetProperty { property, .. }
            | Self::AssignedFacetProperty { property, .. } => &property.name,
            Self::Category(category) => &category.name,
            Self::Entity(entity) => &entity.name,
            Self::Relationship(relationship) => &relationship.name,
        }
    }

    /// Identifier of the backing object, when there is one.
    pub fn id(&self) -> Option<Uuid> {
        match self {
            Self::Root | Self::TagsContainer | Self::RelationshipsContainer => None,
            Self::Tag(tag) | Self::AssignedTag { tag, .. } => Some(tag.id),
            Self::FacetProperty { property, .. }
            | Self::AssignedFacetProperty { property, .. } => Some(property.id),
            Self::EntitiesContainer(category) | Self::Category(category) => Some(category.id),
            Self::Entity(entity) => Some(entity.id),
            Self::Relationship(relationship) => Some(relationship.id),
        }
    }

    pub fn is_container(&self) -> bool {
        self.capabilities().is_container
    }

    pub fn capabilities(&self) -> Capabilities {
        self.item_type().capabilities()
    }

    pub fn new_item_type_names(&self) -> &'static [&'static str] {
        self.item_type().new_item_type_names()
    }

    /// All children of a container; empty for leaves.
    pub fn child_nodes<S: DomainStore>(&self, store: &S) -> NavResult<Vec<NavNode>> {
        self.resolve(store, None)
    }

    /// Resolves `segment` below this node.
    ///
    /// `None` (or an empty segment) yields every child. Otherwise the result
    /// holds zero or one node; zero means "not found" and is not an error.
    pub fn resolve<S: DomainStore>(
        &self,
        store: &S,
        segment: Option<&str>,
    ) -> NavResult<Vec<NavNode>> {
        let segment = segment.filter(|value| !value.is_empty());
        match self {
            Self::Root => {
                let nodes = vec![
                    Self::TagsContainer,
                    Self::EntitiesContainer(store.categories().root()?),
                    Self::RelationshipsContainer,
                ];
                Ok(keep_matching(nodes, segment))
            }
            Self::TagsContainer => match segment {
                Some(name) => Ok(store.tags().find_by_name(name)?.map(Self::Tag).into_iter().collect()),
                None => Ok(store.tags().find_all()?.into_iter().map(Self::Tag).collect()),
            },
            Self::Tag(tag) => Ok(facet_children(tag, segment, |property| Self::FacetProperty {
                tag: tag.clone(),
                property,
            })),
            Self::EntitiesContainer(category) | Self::Category(category) => {
                resolve_in_category(store, category, segment)
            }
            Self::Entity(entity) => {
                let mut nodes = Vec::new();
                for tag_id in &entity.tags {
                    let Some(tag) = store.tags().find_by_id(*tag_id)? else {
                        continue;
                    };
                    if segment.map_or(true, |name| names_equal(&tag.name, name)) {
                        nodes.push(Self::AssignedTag {
                            entity: entity.clone(),
                            tag,
                        });
                    }
                }
                Ok(nodes)
            }
            Self::AssignedTag { entity, tag } => {
                Ok(facet_children(tag, segment, |property| {
                    Self::AssignedFacetProperty {
                        entity: entity.clone(),
                        tag: tag.clone(),
                        property,
                    }
                }))
            }
            Self::RelationshipsContainer => match segment {
                Some(name) => Ok(store
                    .relationships()
                    .find_by_name(name)?
                    .map(Self::Relationship)
                    .into_iter()
                    .collect()),
                None => Ok(store
                    .relationships()
                    .find_all()?
                    .into_iter()
                    .map(Self::Relationship)
                    .collect()),
            },
            Self::FacetProperty { .. }
            | Self::AssignedFacetProperty { .. }
            | Self::Relationship(_) => Ok(Vec::new()),
        }
    }
}

fn keep_matching(nodes: Vec<NavNode>, segment: Option<&str>) -> Vec<NavNode> {
    match segment {
        Some(name) => nodes
            .into_iter()
            .filter(|node| names_equal(node.name(), name))
            .collect(),
        None => nodes,
    }
}

fn facet_children(
    tag: &Tag,
    segment: Option<&str>,
    build: impl Fn(FacetProperty) -> NavNode,
) -> Vec<NavNode> {
    tag.facet
        .properties
        .iter()
        .filter(|property| segment.map_or(true, |name| names_equal(&property.name, name)))
        .cloned()
        .map(build)
        .collect()
}

/// Categories first, then entities: both share the category's namespace.
fn resolve_in_category<S: DomainStore>(
    store: &S,
    category: &Category,
    segment: Option<&str>,
) -> NavResult<Vec<NavNode>> {
    match segment {
        Some(name) => {
            if let Some(child) = store
                .categories()
                .find_by_parent_and_name(category.id, name)?
            {
                return Ok(vec![NavNode::Category(child)]);
            }
            Ok(store
                .entities()
                .find_by_category_and_name(category.id, name)?
                .map(NavNode::Entity)
                .into_iter()
                .collect())
        }
        None => {
            let mut nodes: Vec<NavNode> = store
                .categories()
                .find_by_parent(category.id)?
                .into_iter()
                .map(NavNode::Category)
                .collect();
            nodes.extend(
                store
                    .entities()
                    .find_by_category(category.id)?
                    .into_iter()
                    .map(NavNode::Entity),
            );
            Ok(nodes)
        }
    }
}
