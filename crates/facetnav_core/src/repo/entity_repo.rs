//! Entity repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist entities together with their tag assignments and facet values.
//!
//! # Invariants
//! - Entity name is unique per category (case-insensitive).
//! - An upsert replaces tags and values as one unit.
//! - An entity referenced by any relationship is never deleted.
//! - Tag references are stored by id only; orphaned ids survive tag deletion.
//! - Only values that read back unchanged are written (no NaN or infinity).

use super::store::{ChangeAction, ChangeFeed, StoreChange};
use super::{
    classify_write_error, in_savepoint, parse_uuid, row_exists, RepoError, RepoResult,
    StoredKind,
};
use crate::model::category::CategoryId;
use crate::model::entity::{Entity, EntityId};
use crate::model::tag::{FacetPropertyId, TagId};
use crate::model::value::FacetValue;
use rusqlite::{params, Connection, Row};
use std::collections::{BTreeMap, HashSet};
use std::rc::Rc;

const ENTITY_SELECT_SQL: &str = "SELECT id, category_id, name FROM entities";

/// Repository interface for entities.
pub trait EntityRepository {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Entity>>;
    /// Finds an entity of `category` by name, ignoring case.
    fn find_by_category_and_name(
        &self,
        category: CategoryId,
        name: &str,
    ) -> RepoResult<Option<Entity>>;
    /// Lists entities directly inside `category`.
    fn find_by_category(&self, category: CategoryId) -> RepoResult<Vec<Entity>>;
    /// Lists entities carrying `tag`.
    fn find_by_tag(&self, tag: TagId) -> RepoResult<Vec<Entity>>;
    fn upsert(&self, entity: &Entity) -> RepoResult<()>;
    fn delete(&self, id: EntityId) -> RepoResult<()>;
}

/// SQLite-backed entity repository.
pub struct SqliteEntityRepository<'conn> {
    conn: &'conn Connection,
    feed: Rc<ChangeFeed>,
}

impl<'conn> SqliteEntityRepository<'conn> {
    pub fn new(conn: &'conn Connection, feed: Rc<ChangeFeed>) -> Self {
        Self { conn, feed }
    }

    fn query_many<P: rusqlite::Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Entity>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            let shell = parse_entity_row(row)?;
            items.push(self.hydrate(shell)?);
        }
        Ok(items)
    }

    fn hydrate(&self, mut entity: Entity) -> RepoResult<Entity> {
        entity.tags = load_tag_ids(self.conn, entity.id)?;
        entity.values = load_values(self.conn, entity.id)?;
        Ok(entity)
    }

    fn write_rows(&self, entity: &Entity) -> RepoResult<()> {
        self.conn
            .execute(
                "INSERT INTO entities (id, category_id, name)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(id) DO UPDATE SET
                    category_id = excluded.category_id,
                    name = excluded.name,
                    updated_at = (strftime('%s', 'now') * 1000);",
                params![
                    entity.id.to_string(),
                    entity.category.to_string(),
                    entity.name
                ],
            )
            .map_err(|err| classify_write_error(err, StoredKind::Entity, &entity.name))?;

        let entity_id = entity.id.to_string();
        self.conn
            .execute("DELETE FROM entity_tags WHERE entity_id = ?1;", [&entity_id])?;
        let mut seen = HashSet::new();
        let mut position: i64 = 0;
        for tag in &entity.tags {
            if !seen.insert(*tag) {
                continue;
            }
            self.conn.execute(
                "INSERT INTO entity_tags (entity_id, tag_id, position)
                 VALUES (?1, ?2, ?3);",
                params![entity_id, tag.to_string(), position],
            )?;
            position += 1;
        }

        self.conn
            .execute("DELETE FROM entity_values WHERE entity_id = ?1;", [&entity_id])?;
        for (property, value) in &entity.values {
            let value_json = serde_json::to_string(value)?;
            self.conn.execute(
                "INSERT INTO entity_values (entity_id, property_id, value_json)
                 VALUES (?1, ?2, ?3);",
                params![entity_id, property.to_string(), value_json],
            )?;
        }
        Ok(())
    }
}

impl EntityRepository for SqliteEntityRepository<'_> {
    fn find_by_id(&self, id: EntityId) -> RepoResult<Option<Entity>> {
        Ok(self
            .query_many(
                &format!("{ENTITY_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
            )?
            .pop())
    }

    fn find_by_category_and_name(
        &self,
        category: CategoryId,
        name: &str,
    ) -> RepoResult<Option<Entity>> {
        Ok(self
            .query_many(
                &format!(
                    "{ENTITY_SELECT_SQL} WHERE category_id = ?1 AND name = ?2 COLLATE NOCASE;"
                ),
                params![category.to_string(), name],
            )?
            .pop())
    }

    fn find_by_category(&self, category: CategoryId) -> RepoResult<Vec<Entity>> {
        self.query_many(
            &format!(
                "{ENTITY_SELECT_SQL}
                 WHERE category_id = ?1
                 ORDER BY name COLLATE NOCASE ASC, id ASC;"
            ),
            [category.to_string()],
        )
    }

    fn find_by_tag(&self, tag: TagId) -> RepoResult<Vec<Entity>> {
        self.query_many(
            "SELECT e.id AS id, e.category_id AS category_id, e.name AS name
             FROM entities e
             INNER JOIN entity_tags t ON t.entity_id = e.id
             WHERE t.tag_id = ?1
             ORDER BY e.name COLLATE NOCASE ASC, e.id ASC;",
            [tag.to_string()],
        )
    }

    fn upsert(&self, entity: &Entity) -> RepoResult<()> {
        if let Some((property, value)) = entity
            .values
            .iter()
            .find(|(_, value)| !value.is_storable())
        {
            return Err(RepoError::InvalidData(format!(
                "value {value} for property {property} of entity {} cannot be stored",
                entity.id
            )));
        }
        let existed = row_exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM entities WHERE id = ?1);",
            entity.id,
        )?;
        in_savepoint(self.conn, "entity_upsert", || self.write_rows(entity))?;

        self.feed.record(StoreChange {
            action: if existed {
                ChangeAction::Updated
            } else {
                ChangeAction::Created
            },
            kind: StoredKind::Entity,
            id: entity.id,
        });
        Ok(())
    }

    fn delete(&self, id: EntityId) -> RepoResult<()> {
        let references: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM relationships
             WHERE from_entity_id = ?1 OR to_entity_id = ?1;",
            [id.to_string()],
            |row| row.get(0),
        )?;
        if references > 0 {
            return Err(RepoError::StillReferenced {
                id,
                by: StoredKind::Relationship,
                count: references as usize,
            });
        }

        let changed = self
            .conn
            .execute("DELETE FROM entities WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        self.feed.record(StoreChange {
            action: ChangeAction::Deleted,
            kind: StoredKind::Entity,
            id,
        });
        Ok(())
    }
}

fn parse_entity_row(row: &Row<'_>) -> RepoResult<Entity> {
    let id_text: String = row.get("id")?;
    let category_text: String = row.get("category_id")?;
    Ok(Entity {
        id: parse_uuid(&id_text, "entities.id")?,
        name: row.get("name")?,
        category: parse_uuid(&category_text, "entities.category_id")?,
        tags: Vec::new(),
        values: BTreeMap::new(),
    })
}

fn load_tag_ids(conn: &Connection, entity: EntityId) -> RepoResult<Vec<TagId>> {
    let mut stmt = conn.prepare(
        "SELECT tag_id
         FROM entity_tags
         WHERE entity_id = ?1
         ORDER BY position ASC;",
    )?;
    let mut rows = stmt.query([entity.to_string()])?;
    let mut tags = Vec::new();
    while let Some(row) = rows.next()? {
        let value: String = row.get(0)?;
        tags.push(parse_uuid(&value, "entity_tags.tag_id")?);
    }
    Ok(tags)
}

fn load_values(
    conn: &Connection,
    entity: EntityId,
) -> RepoResult<BTreeMap<FacetPropertyId, FacetValue>> {
    let mut stmt = conn.prepare(
        "SELECT property_id, value_json
         FROM entity_values
         WHERE entity_id = ?1;",
    )?;
    let mut rows = stmt.query([entity.to_string()])?;
    let mut values = BTreeMap::new();
    while let Some(row) = rows.next()? {
        let property_text: String = row.get(0)?;
        let json: String = row.get(1)?;
        let value: FacetValue = serde_json::from_str(&json).map_err(|err| {
            RepoError::InvalidData(format!(
                "invalid value for property {property_text} in entity_values: {err}"
            ))
        })?;
        values.insert(
            parse_uuid(&property_text, "entity_values.property_id")?,
            value,
        );
    }
    Ok(values)
}
