//! Domain store: the four repositories behind one handle.
//!
//! # Responsibility
//! - Bundle category, entity, tag and relationship repositories over one
//!   connection.
//! - Provide atomic scopes for multi-step operations.
//! - Raise change notifications to subscribers.
//!
//! # Invariants
//! - Changes raised inside an atomic scope reach subscribers only after the
//!   outermost scope commits; a rolled-back scope drops them.
//! - Opening a store guarantees the root category exists.

use super::category_repo::{CategoryRepository, SqliteCategoryRepository};
use super::entity_repo::{EntityRepository, SqliteEntityRepository};
use super::relationship_repo::{RelationshipRepository, SqliteRelationshipRepository};
use super::tag_repo::{SqliteTagRepository, TagRepository};
use super::{ensure_schema_ready, in_savepoint, RepoError, RepoResult, StoredKind};
use crate::model::category::Category;
use log::info;
use rusqlite::Connection;
use std::cell::RefCell;
use std::rc::Rc;
use uuid::Uuid;

/// What happened to a stored object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// One change notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChange {
    pub action: ChangeAction,
    pub kind: StoredKind,
    pub id: Uuid,
}

type ChangeListener = Box<dyn Fn(&StoreChange)>;

/// Subscriber list plus the buffer for changes raised inside open scopes.
///
/// Listeners must not subscribe new listeners from inside a callback.
#[derive(Default)]
pub struct ChangeFeed {
    listeners: RefCell<Vec<ChangeListener>>,
    pending: RefCell<Vec<StoreChange>>,
    /// Length of `pending` when each open scope started.
    scope_marks: RefCell<Vec<usize>>,
}

impl ChangeFeed {
    pub fn subscribe(&self, listener: impl Fn(&StoreChange) + 'static) {
        self.listeners.borrow_mut().push(Box::new(listener));
    }

    pub(crate) fn record(&self, change: StoreChange) {
        if self.scope_marks.borrow().is_empty() {
            self.deliver(&[change]);
        } else {
            self.pending.borrow_mut().push(change);
        }
    }

    fn open_scope(&self) {
        let mark = self.pending.borrow().len();
        self.scope_marks.borrow_mut().push(mark);
    }

    fn commit_scope(&self) {
        let mut marks = self.scope_marks.borrow_mut();
        marks.pop();
        if !marks.is_empty() {
            return;
        }
        drop(marks);
        let flushed: Vec<StoreChange> = self.pending.borrow_mut().drain(..).collect();
        self.deliver(&flushed);
    }

    fn rollback_scope(&self) {
        if let Some(mark) = self.scope_marks.borrow_mut().pop() {
            self.pending.borrow_mut().truncate(mark);
        }
    }

    fn deliver(&self, changes: &[StoreChange]) {
        let listeners = self.listeners.borrow();
        for change in changes {
            for listener in listeners.iter() {
                listener(change);
            }
        }
    }
}

/// Handle the navigation engine and traversers work against.
pub trait DomainStore {
    fn categories(&self) -> &dyn CategoryRepository;
    fn entities(&self) -> &dyn EntityRepository;
    fn tags(&self) -> &dyn TagRepository;
    fn relationships(&self) -> &dyn RelationshipRepository;

    /// Runs `op` so that either all of its writes become visible or none do.
    fn atomically<T, E, F>(&self, op: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce() -> Result<T, E>;
}

/// SQLite-backed domain store over one migrated connection.
pub struct SqliteDomainStore<'conn> {
    conn: &'conn Connection,
    feed: Rc<ChangeFeed>,
    categories: SqliteCategoryRepository<'conn>,
    entities: SqliteEntityRepository<'conn>,
    tags: SqliteTagRepository<'conn>,
    relationships: SqliteRelationshipRepository<'conn>,
}

impl<'conn> SqliteDomainStore<'conn> {
    /// Creates the store from a connection returned by `db::open_db*`.
    ///
    /// Creates the root category on first use.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn)?;
        let feed = Rc::new(ChangeFeed::default());
        let store = Self {
            conn,
            categories: SqliteCategoryRepository::new(conn, Rc::clone(&feed)),
            entities: SqliteEntityRepository::new(conn, Rc::clone(&feed)),
            tags: SqliteTagRepository::new(conn, Rc::clone(&feed)),
            relationships: SqliteRelationshipRepository::new(conn, Rc::clone(&feed)),
            feed,
        };
        store.ensure_root()?;
        Ok(store)
    }

    /// Registers a change listener.
    pub fn subscribe(&self, listener: impl Fn(&StoreChange) + 'static) {
        self.feed.subscribe(listener);
    }

    fn ensure_root(&self) -> RepoResult<()> {
        if self.categories.find_root()?.is_some() {
            return Ok(());
        }
        let root = Category::root();
        self.categories.upsert(&root)?;
        info!(
            "event=root_created module=repo status=ok category_id={}",
            root.id
        );
        Ok(())
    }
}

impl DomainStore for SqliteDomainStore<'_> {
    fn categories(&self) -> &dyn CategoryRepository {
        &self.categories
    }

    fn entities(&self) -> &dyn EntityRepository {
        &self.entities
    }

    fn tags(&self) -> &dyn TagRepository {
        &self.tags
    }

    fn relationships(&self) -> &dyn RelationshipRepository {
        &self.relationships
    }

    fn atomically<T, E, F>(&self, op: F) -> Result<T, E>
    where
        E: From<RepoError>,
        F: FnOnce() -> Result<T, E>,
    {
        self.feed.open_scope();
        match in_savepoint(self.conn, "store_scope", op) {
            Ok(value) => {
                self.feed.commit_scope();
                Ok(value)
            }
            Err(err) => {
                self.feed.rollback_scope();
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChangeAction, ChangeFeed, StoreChange};
    use crate::repo::StoredKind;
    use std::cell::RefCell;
    use std::rc::Rc;
    use uuid::Uuid;

    fn change(action: ChangeAction) -> StoreChange {
        StoreChange {
            action,
            kind: StoredKind::Entity,
            id: Uuid::new_v4(),
        }
    }

    #[test]
    fn nested_scopes_flush_once_on_outer_commit() {
        let feed = ChangeFeed::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        feed.subscribe(move |change| sink.borrow_mut().push(change.action));

        feed.open_scope();
        feed.record(change(ChangeAction::Created));
        feed.open_scope();
        feed.record(change(ChangeAction::Updated));
        feed.commit_scope();
        assert!(seen.borrow().is_empty());
        feed.commit_scope();

        assert_eq!(
            *seen.borrow(),
            vec![ChangeAction::Created, ChangeAction::Updated]
        );
    }

    #[test]
    fn rolled_back_inner_scope_drops_only_its_changes() {
        let feed = ChangeFeed::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        feed.subscribe(move |change| sink.borrow_mut().push(change.action));

        feed.open_scope();
        feed.record(change(ChangeAction::Created));
        feed.open_scope();
        feed.record(change(ChangeAction::Deleted));
        feed.rollback_scope();
        feed.commit_scope();

        assert_eq!(*seen.borrow(), vec![ChangeAction::Created]);
    }
}
