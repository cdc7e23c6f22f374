//! Typed facet values.
//!
//! # Invariants
//! - Every `FacetValue` variant maps to exactly one `FacetPropertyType`.
//! - Values are persisted as tagged JSON, so the stored form carries its type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Declared type of one facet property slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacetPropertyType {
    String,
    Long,
    Double,
    Bool,
    Guid,
    Decimal,
    DateTime,
}

impl FacetPropertyType {
    /// All supported declared types.
    pub const ALL: [FacetPropertyType; 7] = [
        Self::String,
        Self::Long,
        Self::Double,
        Self::Bool,
        Self::Guid,
        Self::Decimal,
        Self::DateTime,
    ];

    /// Stable name used in storage and in projected items.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Long => "Long",
            Self::Double => "Double",
            Self::Bool => "Bool",
            Self::Guid => "Guid",
            Self::Decimal => "Decimal",
            Self::DateTime => "DateTime",
        }
    }

    /// Parses a type name case-insensitively.
    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|candidate| candidate.as_str().eq_ignore_ascii_case(trimmed))
    }
}

impl Display for FacetPropertyType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed value stored for an entity facet property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum FacetValue {
    String(String),
    Long(i64),
    Double(f64),
    Bool(bool),
    Guid(Uuid),
    Decimal(Decimal),
    DateTime(DateTime<Utc>),
}

impl FacetValue {
    /// Runtime type of this value.
    pub fn value_type(&self) -> FacetPropertyType {
        match self {
            Self::String(_) => FacetPropertyType::String,
            Self::Long(_) => FacetPropertyType::Long,
            Self::Double(_) => FacetPropertyType::Double,
            Self::Bool(_) => FacetPropertyType::Bool,
            Self::Guid(_) => FacetPropertyType::Guid,
            Self::Decimal(_) => FacetPropertyType::Decimal,
            Self::DateTime(_) => FacetPropertyType::DateTime,
        }
    }

    /// Whether the stored JSON form reads back as the same value.
    ///
    /// Non-finite doubles serialize to `null` and are not storable.
    pub fn is_storable(&self) -> bool {
        match self {
            Self::Double(value) => value.is_finite(),
            _ => true,
        }
    }
}

impl Display for FacetValue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(value) => f.write_str(value),
            Self::Long(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Guid(value) => write!(f, "{value}"),
            Self::Decimal(value) => write!(f, "{value}"),
            Self::DateTime(value) => write!(f, "{}", value.to_rfc3339()),
        }
    }
}

impl From<&str> for FacetValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for FacetValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for FacetValue {
    fn from(value: i64) -> Self {
        Self::Long(value)
    }
}

impl From<f64> for FacetValue {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<bool> for FacetValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Uuid> for FacetValue {
    fn from(value: Uuid) -> Self {
        Self::Guid(value)
    }
}

impl From<Decimal> for FacetValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<DateTime<Utc>> for FacetValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}
