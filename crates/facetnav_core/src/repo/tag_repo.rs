//! Tag catalog repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist tags and the facet schema each tag contributes.
//!
//! # Invariants
//! - Tag names are globally unique (case-insensitive).
//! - Facet property names are unique within one tag (case-insensitive).
//! - Deleting a tag never touches entities that still list it.

use super::store::{ChangeAction, ChangeFeed, StoreChange};
use super::{
    classify_write_error, in_savepoint, parse_uuid, row_exists, RepoError, RepoResult,
    StoredKind,
};
use crate::model::tag::{Facet, FacetProperty, Tag, TagId};
use crate::model::value::FacetPropertyType;
use rusqlite::{params, Connection, Row};
use std::rc::Rc;

const TAG_SELECT_SQL: &str = "SELECT id, name, facet_name FROM tags";

/// Repository interface for the tag catalog.
pub trait TagRepository {
    fn find_by_id(&self, id: TagId) -> RepoResult<Option<Tag>>;
    /// Finds a tag by its global name, ignoring case.
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>>;
    fn find_all(&self) -> RepoResult<Vec<Tag>>;
    /// Inserts or replaces a tag and its full facet schema.
    fn upsert(&self, tag: &Tag) -> RepoResult<()>;
    fn delete(&self, id: TagId) -> RepoResult<()>;
}

/// SQLite-backed tag repository.
pub struct SqliteTagRepository<'conn> {
    conn: &'conn Connection,
    feed: Rc<ChangeFeed>,
}

impl<'conn> SqliteTagRepository<'conn> {
    pub fn new(conn: &'conn Connection, feed: Rc<ChangeFeed>) -> Self {
        Self { conn, feed }
    }

    fn query_many<P: rusqlite::Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Tag>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut shells = Vec::new();
        while let Some(row) = rows.next()? {
            shells.push(parse_tag_row(row)?);
        }
        drop(rows);

        for tag in &mut shells {
            tag.facet.properties = load_properties(self.conn, tag.id)?;
        }
        Ok(shells)
    }

    fn write_rows(&self, tag: &Tag) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO tags (id, name, facet_name)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    facet_name = excluded.facet_name,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![tag.id.to_string(), tag.name, tag.facet.name],
            )
            .map_err(|err| classify_write_error(err, StoredKind::Tag, &tag.name))?;

        let tag_id = tag.id.to_string();
        self.conn
            .execute("DELETE FROM facet_properties WHERE tag_id = ?1;", [&tag_id])?;
        for (position, property) in tag.facet.properties.iter().enumerate() {
            self.conn
                .execute(
                    "INSERT INTO facet_properties (id, tag_id, name, value_type, position)
                     VALUES (?1, ?2, ?3, ?4, ?5);",
                    params![
                        property.id.to_string(),
                        tag_id,
                        property.name,
                        property.value_type.as_str(),
                        position as i64,
                    ],
                )
                .map_err(|err| {
                    classify_write_error(err, StoredKind::FacetProperty, &property.name)
                })?;
        }
        Ok(())
    }
}

impl TagRepository for SqliteTagRepository<'_> {
    fn find_by_id(&self, id: TagId) -> RepoResult<Option<Tag>> {
        Ok(self
            .query_many(&format!("{TAG_SELECT_SQL} WHERE id = ?1;"), [id.to_string()])?
            .pop())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Tag>> {
        Ok(self
            .query_many(
                &format!("{TAG_SELECT_SQL} WHERE name = ?1 COLLATE NOCASE;"),
                [name],
            )?
            .pop())
    }

    fn find_all(&self) -> RepoResult<Vec<Tag>> {
        self.query_many(
            &format!("{TAG_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"),
            [],
        )
    }

    fn upsert(&self, tag: &Tag) -> RepoResult<()> {
        let existed = row_exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM tags WHERE id = ?1);",
            tag.id,
        )?;
        in_savepoint(self.conn, "tag_upsert", || self.write_rows(tag))?;

        self.feed.record(StoreChange {
            action: if existed {
                ChangeAction::Updated
            } else {
                ChangeAction::Created
            },
            kind: StoredKind::Tag,
            id: tag.id,
        });
        Ok(())
    }

    fn delete(&self, id: TagId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tags WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        self.feed.record(StoreChange {
            action: ChangeAction::Deleted,
            kind: StoredKind::Tag,
            id,
        });
        Ok(())
    }
}

fn parse_tag_row(row: &Row<'_>) -> RepoResult<Tag> {
    let id_text: String = row.get("id")?;
    Ok(Tag {
        id: parse_uuid(&id_text, "tags.id")?,
        name: row.get("name")?,
        facet: Facet::new(row.get::<_, String>("facet_name")?),
    })
}

fn load_properties(conn: &Connection, tag: TagId) -> RepoResult<Vec<FacetProperty>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, value_type
         FROM facet_properties
         WHERE tag_id = ?1
         ORDER BY position ASC, id ASC;",
    )?;
    let mut rows = stmt.query([tag.to_string()])?;
    let mut properties = Vec::new();
    while let Some(row) = rows.next()? {
        let id_text: String = row.get(0)?;
        let type_text: String = row.get(2)?;
        let value_type = FacetPropertyType::parse(&type_text).ok_or_else(|| {
            RepoError::InvalidData(format!(
                "invalid value type `{type_text}` in facet_properties.value_type"
            ))
        })?;
        properties.push(FacetProperty {
            id: parse_uuid(&id_text, "facet_properties.id")?,
            name: row.get(1)?,
            value_type,
        });
    }
    Ok(properties)
}
