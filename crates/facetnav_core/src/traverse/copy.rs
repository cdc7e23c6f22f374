//! Category copy traversal.
//!
//! # Responsibility
//! - Copy one category, alone or with its subtree, under a destination.
//!
//! # Invariants
//! - Copies never share an id with their source; tags and values are carried
//!   over as-is.
//! - The source subtree is read in full before the first write.
//! - The root category is never a copy source.

use crate::model::category::Category;
use crate::model::entity::Entity;
use crate::repo::store::DomainStore;
use crate::repo::{RepoError, RepoResult};
use log::info;

/// In-memory image of a source subtree, read before any write happens.
///
/// Copying from a snapshot keeps the traversal finite when the destination
/// lies inside the source subtree.
struct CategorySnapshot {
    category: Category,
    entities: Vec<Entity>,
    children: Vec<CategorySnapshot>,
}

impl CategorySnapshot {
    fn count(&self) -> (usize, usize) {
        self.children
            .iter()
            .map(CategorySnapshot::count)
            .fold((1, self.entities.len()), |(c, e), (cc, ce)| (c + cc, e + ce))
    }
}

/// Copies categories, optionally with everything beneath them.
pub struct CopyTraverser<'s, S: DomainStore> {
    store: &'s S,
}

impl<'s, S: DomainStore> CopyTraverser<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Creates an empty category named like `source` under `destination`.
    pub fn copy_category(&self, source: &Category, destination: &Category) -> RepoResult<Category> {
        self.copy_category_as(source, destination, &source.name, false)
    }

    /// Copies `source`, its entities and all descendants under `destination`.
    ///
    /// Every copied category and entity gets a fresh identity; names, tag
    /// assignments and facet values are preserved.
    pub fn copy_category_recursively(
        &self,
        source: &Category,
        destination: &Category,
    ) -> RepoResult<Category> {
        self.copy_category_as(source, destination, &source.name, true)
    }

    /// Copies `source` under `destination` using `name` for the new top node.
    pub fn copy_category_as(
        &self,
        source: &Category,
        destination: &Category,
        name: &str,
        recurse: bool,
    ) -> RepoResult<Category> {
        if source.is_root() {
            return Err(RepoError::InvalidData(
                "the root category cannot be copied".to_string(),
            ));
        }

        let snapshot = if recurse {
            self.snapshot(source)?
        } else {
            CategorySnapshot {
                category: source.clone(),
                entities: Vec::new(),
                children: Vec::new(),
            }
        };

        let copy = self
            .store
            .atomically(|| self.write_snapshot(&snapshot, destination, name))?;

        let (categories, entities) = snapshot.count();
        info!(
            "event=category_copy module=traverse status=ok source_id={} copy_id={} recurse={} categories={} entities={}",
            source.id, copy.id, recurse, categories, entities
        );
        Ok(copy)
    }

    fn snapshot(&self, category: &Category) -> RepoResult<CategorySnapshot> {
        let entities = self.store.entities().find_by_category(category.id)?;
        let children = self
            .store
            .categories()
            .find_by_parent(category.id)?
            .iter()
            .map(|child| self.snapshot(child))
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(CategorySnapshot {
            category: category.clone(),
            entities,
            children,
        })
    }

    fn write_snapshot(
        &self,
        snapshot: &CategorySnapshot,
        destination: &Category,
        name: &str,
    ) -> RepoResult<Category> {
        let copy = snapshot.category.duplicate_under(destination, name);
        self.store.categories().upsert(&copy)?;

        for entity in &snapshot.entities {
            let entity_copy = entity.duplicate_under(&copy, entity.name.clone());
            self.store.entities().upsert(&entity_copy)?;
        }
        for child in &snapshot.children {
            self.write_snapshot(child, &copy, &child.category.name)?;
        }
        Ok(copy)
    }
}
