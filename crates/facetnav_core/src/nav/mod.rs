//! Path-addressable namespace over the category/entity/tag graph.
//!
//! # Responsibility
//! - Model every addressable node kind and its capabilities (`node`).
//! - Resolve textual paths against the store (`path`).
//! - Guard names and the shared category/entity namespace (`names`).
//! - Project nodes into property bags and apply facet writes (`projection`).
//! - Run file-system-like verbs against resolved nodes (`engine`).
//!
//! # Invariants
//! - The engine holds no state between calls besides its store handle.
//! - Not found is an empty resolution, never an error, for read verbs.

mod engine;
mod error;
pub mod names;
pub mod node;
pub mod path;
pub mod projection;

pub use engine::{Namespace, NewItemValue};
pub use error::{NavError, NavResult};
pub use node::{Capabilities, ItemType, NavNode};
pub use path::NavPath;
pub use projection::{Item, PropertyBag, PropertyValue};
