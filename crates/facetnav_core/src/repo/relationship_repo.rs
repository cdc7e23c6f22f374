//! Relationship repository contracts and SQLite implementation.

use super::store::{ChangeAction, ChangeFeed, StoreChange};
use super::{classify_write_error, parse_uuid, row_exists, RepoError, RepoResult, StoredKind};
use crate::model::relationship::{Relationship, RelationshipId};
use rusqlite::{params, Connection, Row};
use std::rc::Rc;

const RELATIONSHIP_SELECT_SQL: &str =
    "SELECT id, name, from_entity_id, to_entity_id, tag_id FROM relationships";

/// Repository interface for relationships between entities.
pub trait RelationshipRepository {
    fn find_by_id(&self, id: RelationshipId) -> RepoResult<Option<Relationship>>;
    fn find_by_name(&self, name: &str) -> RepoResult<Option<Relationship>>;
    fn find_all(&self) -> RepoResult<Vec<Relationship>>;
    fn upsert(&self, relationship: &Relationship) -> RepoResult<()>;
    fn delete(&self, id: RelationshipId) -> RepoResult<()>;
}

/// SQLite-backed relationship repository.
pub struct SqliteRelationshipRepository<'conn> {
    conn: &'conn Connection,
    feed: Rc<ChangeFeed>,
}

impl<'conn> SqliteRelationshipRepository<'conn> {
    pub fn new(conn: &'conn Connection, feed: Rc<ChangeFeed>) -> Self {
        Self { conn, feed }
    }

    fn query_many<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> RepoResult<Vec<Relationship>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_relationship_row(row)?);
        }
        Ok(items)
    }
}

impl RelationshipRepository for SqliteRelationshipRepository<'_> {
    fn find_by_id(&self, id: RelationshipId) -> RepoResult<Option<Relationship>> {
        Ok(self
            .query_many(
                &format!("{RELATIONSHIP_SELECT_SQL} WHERE id = ?1;"),
                [id.to_string()],
            )?
            .pop())
    }

    fn find_by_name(&self, name: &str) -> RepoResult<Option<Relationship>> {
        Ok(self
            .query_many(
                &format!("{RELATIONSHIP_SELECT_SQL} WHERE name = ?1 COLLATE NOCASE;"),
                [name],
            )?
            .pop())
    }

    fn find_all(&self) -> RepoResult<Vec<Relationship>> {
        self.query_many(
            &format!("{RELATIONSHIP_SELECT_SQL} ORDER BY name COLLATE NOCASE ASC, id ASC;"),
            [],
        )
    }

    fn upsert(&self, relationship: &Relationship) -> RepoResult<()> {
        let existed = row_exists(
            self.conn,
            "SELECT EXISTS(SELECT 1 FROM relationships WHERE id = ?1);",
            relationship.id,
        )?;
        self.conn
            .execute(
                "INSERT INTO relationships (id, name, from_entity_id, to_entity_id, tag_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    name = excluded.name,
                    from_entity_id = excluded.from_entity_id,
                    to_entity_id = excluded.to_entity_id,
                    tag_id = excluded.tag_id;",
                params![
                    relationship.id.to_string(),
                    relationship.name,
                    relationship.from.to_string(),
                    relationship.to.to_string(),
                    relationship.tag.map(|value| value.to_string()),
                ],
            )
            .map_err(|err| {
                classify_write_error(err, StoredKind::Relationship, &relationship.name)
            })?;

        self.feed.record(StoreChange {
            action: if existed {
                ChangeAction::Updated
            } else {
                ChangeAction::Created
            },
            kind: StoredKind::Relationship,
            id: relationship.id,
        });
        Ok(())
    }

    fn delete(&self, id: RelationshipId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM relationships WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        self.feed.record(StoreChange {
            action: ChangeAction::Deleted,
            kind: StoredKind::Relationship,
            id,
        });
        Ok(())
    }
}

fn parse_relationship_row(row: &Row<'_>) -> RepoResult<Relationship> {
    let id_text: String = row.get("id")?;
    let from_text: String = row.get("from_entity_id")?;
    let to_text: String = row.get("to_entity_id")?;
    let tag = row
        .get::<_, Option<String>>("tag_id")?
        .map(|value| parse_uuid(&value, "relationships.tag_id"))
        .transpose()?;

    Ok(Relationship {
        id: parse_uuid(&id_text, "relationships.id")?,
        name: row.get("name")?,
        from: parse_uuid(&from_text, "relationships.from_entity_id")?,
        to: parse_uuid(&to_text, "relationships.to_entity_id")?,
        tag,
    })
}
