//! Tag catalog model: tags, their facet schema and facet properties.
//!
//! # Invariants
//! - Tag names are globally unique (case-insensitive); the store enforces it.
//! - Property names are unique within one facet (case-insensitive).

use super::names_equal;
use super::value::{FacetPropertyType, FacetValue};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type TagId = Uuid;
pub type FacetPropertyId = Uuid;

/// One typed, named slot within a facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetProperty {
    pub id: FacetPropertyId,
    pub name: String,
    pub value_type: FacetPropertyType,
}

impl FacetProperty {
    /// Creates a property with a fresh identity.
    pub fn new(name: impl Into<String>, value_type: FacetPropertyType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            value_type,
        }
    }

    /// Returns whether `value` has this property's declared type.
    pub fn accepts(&self, value: &FacetValue) -> bool {
        value.value_type() == self.value_type
    }
}

/// Named schema contributed by a tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub name: String,
    pub properties: Vec<FacetProperty>,
}

impl Facet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            properties: Vec::new(),
        }
    }

    /// Finds a property by name, ignoring case.
    pub fn property(&self, name: &str) -> Option<&FacetProperty> {
        self.properties
            .iter()
            .find(|property| names_equal(&property.name, name))
    }

    /// Adds a property unless the name is already taken.
    ///
    /// Returns `false` and leaves the facet unchanged on a name collision.
    pub fn add_property(&mut self, property: FacetProperty) -> bool {
        if self.property(&property.name).is_some() {
            return false;
        }
        self.properties.push(property);
        true
    }

    /// Removes a property by name and returns it.
    pub fn remove_property(&mut self, name: &str) -> Option<FacetProperty> {
        let index = self
            .properties
            .iter()
            .position(|property| names_equal(&property.name, name))?;
        Some(self.properties.remove(index))
    }
}

/// A named reference to one facet, assignable to entities.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub facet: Facet,
}

impl Tag {
    /// Creates a tag whose facet carries the tag's name and no properties.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let facet = Facet::new(name.clone());
        Self::with_facet(name, facet)
    }

    pub fn with_facet(name: impl Into<String>, facet: Facet) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            facet,
        }
    }

    /// Copy of this tag under a new name where the tag and every property get
    /// fresh identities.
    pub fn duplicate(&self, name: impl Into<String>) -> Tag {
        let properties = self
            .facet
            .properties
            .iter()
            .map(|property| FacetProperty::new(property.name.clone(), property.value_type))
            .collect();
        Tag::with_facet(
            name,
            Facet {
                name: self.facet.name.clone(),
                properties,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{FacetProperty, Tag};
    use crate::model::value::FacetPropertyType;

    #[test]
    fn add_property_rejects_case_insensitive_duplicates() {
        let mut tag = Tag::new("t1");
        assert!(tag
            .facet
            .add_property(FacetProperty::new("text", FacetPropertyType::String)));
        assert!(!tag
            .facet
            .add_property(FacetProperty::new("TEXT", FacetPropertyType::Long)));
        assert_eq!(tag.facet.properties.len(), 1);
    }

    #[test]
    fn duplicate_assigns_fresh_identities() {
        let mut tag = Tag::new("t1");
        tag.facet
            .add_property(FacetProperty::new("text", FacetPropertyType::String));
        let copy = tag.duplicate("t2");

        assert_ne!(copy.id, tag.id);
        assert_eq!(copy.name, "t2");
        assert_eq!(copy.facet.properties[0].name, "text");
        assert_ne!(copy.facet.properties[0].id, tag.facet.properties[0].id);
    }
}
