//! Category removal traversal.
//!
//! # Invariants
//! - The root category is never removed.
//! - A rejected removal leaves the tree untouched; a recursive one deletes
//!   children and entities before their category.

use crate::model::category::{Category, CategoryId};
use crate::repo::store::DomainStore;
use crate::repo::RepoResult;
use log::info;

/// Removes categories, either only when empty or with their whole subtree.
pub struct RemovalTraverser<'s, S: DomainStore> {
    store: &'s S,
}

impl<'s, S: DomainStore> RemovalTraverser<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }

    /// Deletes `category` if it is not the root and holds nothing.
    ///
    /// Returns `false` without touching the store when the category is the
    /// root or has any sub-category or member entity.
    pub fn delete_if_empty(&self, category: &Category) -> RepoResult<bool> {
        if category.is_root() {
            return Ok(false);
        }
        if !self.store.categories().find_by_parent(category.id)?.is_empty()
            || !self.store.entities().find_by_category(category.id)?.is_empty()
        {
            info!(
                "event=category_delete module=traverse status=rejected reason=not_empty category_id={}",
                category.id
            );
            return Ok(false);
        }

        self.store
            .atomically(|| self.store.categories().delete(category.id))?;
        info!(
            "event=category_delete module=traverse status=ok recurse=false category_id={}",
            category.id
        );
        Ok(true)
    }

    /// Deletes `category` with every descendant category and entity.
    ///
    /// Returns `false` without touching the store for the root. Any failure
    /// underway (for example an entity still referenced by a relationship)
    /// rolls the whole removal back.
    pub fn delete_recursively(&self, category: &Category) -> RepoResult<bool> {
        if category.is_root() {
            return Ok(false);
        }

        let (categories, entities) = self
            .store
            .atomically(|| self.delete_subtree(category.id))?;
        info!(
            "event=category_delete module=traverse status=ok recurse=true category_id={} categories={} entities={}",
            category.id, categories, entities
        );
        Ok(true)
    }

    /// Depth-first: children, then member entities, then the category itself.
    fn delete_subtree(&self, id: CategoryId) -> RepoResult<(usize, usize)> {
        let mut removed = (1, 0);
        for child in self.store.categories().find_by_parent(id)? {
            let (categories, entities) = self.delete_subtree(child.id)?;
            removed.0 += categories;
            removed.1 += entities;
        }
        for entity in self.store.entities().find_by_category(id)? {
            self.store.entities().delete(entity.id)?;
            removed.1 += 1;
        }
        self.store.categories().delete(id)?;
        Ok(removed)
    }
}
