//! Category repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist the single-rooted category tree.
//! - Enforce one name per parent (case-insensitive) through the unique index.
//!
//! # Invariants
//! - Exactly one root exists; it has an empty name and no parent.
//! - The root is never renamed, re-parented or deleted.
//! - A category with sub-categories or member entities is never deleted.
//! - Child listing is deterministic: `name COLLATE NOCASE ASC, id ASC`.

use super::store::{ChangeAction, ChangeFeed, StoreChange};
use super::{classify_write_error, parse_uuid, row_exists, RepoError, RepoResult, StoredKind};
use crate::model::category::{Category, CategoryId};
use crate::model::tag::Facet;
use rusqlite::{params, Connection, Row};
use std::rc::Rc;

const CATEGORY_SELECT_SQL: &str = "SELECT id, parent_id, name, facet_json FROM categories";

/// Repository interface for the category tree.
pub trait CategoryRepository {
    /// Loads the distinguished root category.
    fn root(&self) -> RepoResult<Category>;
    fn find_by_id(&self, id: CategoryId) -> RepoResult<Option<Category>>;
    /// Finds a direct child of `parent` by name, ignoring case.
    fn find_by_parent_and_name(
        &self,
        parent: CategoryId,
        name: &str,
    ) -> RepoResult<Option<Category>>;
    /// Lists direct children of `parent`.
    fn find_by_parent(&self, parent: CategoryId) -> RepoResult<Vec<Category>>;
    /// Inserts or replaces one category row.
    fn upsert(&self, category: &Category) -> RepoResult<()>;
    /// Deletes one empty, non-root category.
    fn delete(&self, id: CategoryId) -> RepoResult<()>;
}

/// SQLite-backed category repository.
pub struct SqliteCategoryRepository<'conn> {
    conn: &'conn Connection,
    feed: Rc<ChangeFeed>,
}

impl<'conn> SqliteCategoryRepository<'conn> {
    pub fn new(conn: &'conn Connection, feed: Rc<ChangeFeed>) -> Self {
        Self { conn, feed }
    }

    /// Loads the root without treating its absence as an error.
    pub fn find_root(&self) -> RepoResult<Option<Category>> {
        self.query_one(&format!("{CATEGORY_SELECT_SQL} WHERE parent_id IS NULL;"), [])
    }

    fn query_one<P: rusqlite::Params>(&self, sql: &str, params: P) -> RepoResult<Option<Category>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_category_row(row)?));
        }
        Ok(None)
    }

    fn validate_shape(&self, category: &Category) -> RepoResult<()> {
        match category.parent {
            None => {
                if !category.name.is_empty() {
                    return Err(RepoError::RootImmutable);
                }
                if let Some(existing) = self.find_root()? {
                    if existing.id != category.id {
                        return Err(RepoError::InvalidData(
                            "only one root category may exist".to_string(),
                        ));
                    }
                }
            }
            Some(parent) => {
                if category.name.is_empty() {
                    return Err(RepoError::InvalidData(
                        "non-root category requires a name".to_string(),
                    ));
                }
                if parent == category.id {
                    return Err(RepoError::InvalidData(format!(
                        "category {} cannot be its own parent",
                        category.id
                    )));
                }
                if let Some(root) = self.find_root()? {
                    if root.id == category.id {
                        return Err(RepoError::RootImmutable);
                    }
                }
            }
        }
        Ok(())
    }
}

impl CategoryRepository for SqliteCategoryRepository<'_> {
    fn root(&self) -> RepoResult<Category> {
        self.find_root()?
            .ok_or_else(|| RepoError::InvalidData("root category is missing".to_string()))
    }

    fn find_by_id(&self, id: CategoryId) -> RepoResult<Option<Category>> {
        self.query_one(
            &format!("{CATEGORY_SELECT_SQL} WHERE id = ?1;"),
            [id.to_string()],
        )
    }

    fn find_by_parent_and_name(
        &self,
        parent: CategoryId,
        name: &str,
    ) -> RepoResult<Option<Category>> {
        self.query_one(
            &format!("{CATEGORY_SELECT_SQL} WHERE parent_id = ?1 AND name = ?2 COLLATE NOCASE;"),
            params![parent.to_string(), name],
        )
    }

    fn find_by_parent(&self, parent: CategoryId) -> RepoResult<Vec<Category>> {
        let mut stmt = self.conn.prepare(&format!(
            "{CATEGORY_SELECT_SQL}
             WHERE parent_id = ?1
             ORDER BY name COLLATE NOCASE ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([parent.to_string()])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_category_row(row)?);
        }
        Ok(items)
    }

    fn upsert(&self, category: &Category) -> RepoResult<()> {
        self.validate_shape(category)?;
        let existed = row_exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM categories WHERE id = ?1);",
            category.id,
        )?;
        let facet_json = category
            .facet
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        self.conn
            .execute(
                "INSERT INTO categories (id, parent_id, name, facet_json)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                    parent_id = excluded.parent_id,
                    name = excluded.name,
                    facet_json = excluded.facet_json,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    category.id.to_string(),
                    category.parent.map(|value| value.to_string()),
                    category.name,
                    facet_json,
                ],
            )
            .map_err(|err| classify_write_error(err, StoredKind::Category, &category.name))?;

        self.feed.record(StoreChange {
            action: if existed {
                ChangeAction::Updated
            } else {
                ChangeAction::Created
            },
            kind: StoredKind::Category,
            id: category.id,
        });
        Ok(())
    }

    fn delete(&self, id: CategoryId) -> RepoResult<()> {
        let category = self.find_by_id(id)?.ok_or(RepoError::NotFound(id))?;
        if category.is_root() {
            return Err(RepoError::RootImmutable);
        }

        let children: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE parent_id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )?;
        if children > 0 {
            return Err(RepoError::StillReferenced {
                id,
                by: StoredKind::Category,
                count: children as usize,
            });
        }
        let members: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entities WHERE category_id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )?;
        if members > 0 {
            return Err(RepoError::StillReferenced {
                id,
                by: StoredKind::Entity,
                count: members as usize,
            });
        }

        self.conn
            .execute("DELETE FROM categories WHERE id = ?1;", [id.to_string()])?;
        self.feed.record(StoreChange {
            action: ChangeAction::Deleted,
            kind: StoredKind::Category,
            id,
        });
        Ok(())
    }
}

fn parse_category_row(row: &Row<'_>) -> RepoResult<Category> {
    let id_text: String = row.get("id")?;
    let parent = row
        .get::<_, Option<String>>("parent_id")?
        .map(|value| parse_uuid(&value, "categories.parent_id"))
        .transpose()?;
    let facet = row
        .get::<_, Option<String>>("facet_json")?
        .map(|value| serde_json::from_str::<Facet>(&value))
        .transpose()?;

    Ok(Category {
        id: parse_uuid(&id_text, "categories.id")?,
        name: row.get("name")?,
        parent,
        facet,
    })
}
