use super::node::ItemType;
use crate::model::value::FacetPropertyType;
use crate::repo::{RepoError, StoredKind};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type NavResult<T> = Result<T, NavError>;

/// Errors from namespace verbs.
#[derive(Debug)]
pub enum NavError {
    /// A verb that needs an existing target got a path resolving to nothing.
    ItemNotFound(String),
    /// Destination path does not resolve to a node able to receive the item.
    InvalidDestination(String),
    /// The parent node does not list this item type among its new-item types.
    ItemTypeNotAllowed(String),
    /// The name is taken in the namespace the item would land in.
    NameConflict { item_type: ItemType, name: String },
    /// Name is blank or contains characters forbidden in a path segment.
    InvalidName(String),
    /// Non-recursive removal of a category that still holds items.
    CategoryNotEmpty(String),
    /// The root category cannot be renamed, moved or removed.
    RootNotModifiable,
    /// Entity is still referenced by a relationship.
    EntityReferenced(String),
    /// Move would place a category under itself or one of its descendants.
    CycleDetected { item: String, destination: String },
    /// Supplied value does not have the facet property's declared type.
    TypeMismatch {
        property: String,
        expected: FacetPropertyType,
        actual: FacetPropertyType,
    },
    /// Value has the right type but cannot be stored (NaN or infinite double).
    InvalidValue { property: String, value: String },
    /// The node kind does not implement the requested capability.
    NotSupported {
        item_type: ItemType,
        operation: &'static str,
    },
    /// A create call lacked the value its item type needs.
    MissingValue(&'static str),
    /// Domain store failure.
    Repo(RepoError),
}

impl Display for NavError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ItemNotFound(path) => write!(f, "item not found: '{path}'"),
            Self::InvalidDestination(path) => write!(f, "invalid destination: '{path}'"),
            Self::ItemTypeNotAllowed(value) => write!(f, "ItemType not allowed: '{value}'"),
            Self::NameConflict { item_type, .. } => {
                write!(f, "Name is already used by an item of type '{item_type}'")
            }
            Self::InvalidName(name) => write!(f, "invalid item name: '{name}'"),
            Self::CategoryNotEmpty(path) => write!(f, "category is not empty: '{path}'"),
            Self::RootNotModifiable => write!(f, "the root category cannot be modified"),
            Self::EntityReferenced(id) => {
                write!(f, "entity {id} is still referenced by a relationship")
            }
            Self::CycleDetected { item, destination } => write!(
                f,
                "move would create cycle: '{item}' under '{destination}'"
            ),
            Self::TypeMismatch {
                property,
                expected,
                actual,
            } => write!(
                f,
                "property '{property}' expects a value of type {expected}, got {actual}"
            ),
            Self::InvalidValue { property, value } => {
                write!(f, "property '{property}' cannot hold value {value}")
            }
            Self::NotSupported {
                item_type,
                operation,
            } => write!(f, "{operation} is not supported by items of type '{item_type}'"),
            Self::MissingValue(what) => write!(f, "a value is required: {what}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NavError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for NavError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::DuplicateName { kind, name } => Self::NameConflict {
                item_type: ItemType::from(kind),
                name,
            },
            RepoError::StillReferenced {
                id,
                by: StoredKind::Relationship,
                ..
            } => Self::EntityReferenced(id.to_string()),
            RepoError::StillReferenced { id, .. } => Self::CategoryNotEmpty(id.to_string()),
            RepoError::RootImmutable => Self::RootNotModifiable,
            other => Self::Repo(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::NavError;
    use crate::nav::node::ItemType;
    use crate::repo::{RepoError, StoredKind};
    use uuid::Uuid;

    #[test]
    fn duplicate_name_maps_to_conflict_naming_the_kind() {
        let err = NavError::from(RepoError::DuplicateName {
            kind: StoredKind::Entity,
            name: "e1".to_string(),
        });
        assert!(matches!(
            err,
            NavError::NameConflict {
                item_type: ItemType::Entity,
                ..
            }
        ));
        assert_eq!(
            err.to_string(),
            "Name is already used by an item of type 'Entity'"
        );
    }

    #[test]
    fn relationship_reference_maps_to_entity_referenced() {
        let err = NavError::from(RepoError::StillReferenced {
            id: Uuid::nil(),
            by: StoredKind::Relationship,
            count: 1,
        });
        assert!(matches!(err, NavError::EntityReferenced(_)));
    }

    #[test]
    fn item_type_not_allowed_names_the_value() {
        let err = NavError::ItemTypeNotAllowed("Folder".to_string());
        assert_eq!(err.to_string(), "ItemType not allowed: 'Folder'");
    }
}
