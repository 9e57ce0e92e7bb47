//! [`SqliteStore`]: the SQLite implementation of [`CommerceStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use cherry_core::{
  identity::EntityKind,
  persistent::{BaseEntity, DocumentEntity},
  store::CommerceStore,
};

use crate::{
  Result,
  encode::{RawDocument, RawEntity, encode_uuid},
  schema::{DOCUMENT_COLUMNS, ENTITY_COLUMNS, SCHEMA},
};

const UPSERT_ENTITY: &str = "
INSERT INTO entities (
  id, entity_type, name, description, reference,
  status_type, status_since, created_date, modified_date, created_by, modified_by
) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
ON CONFLICT(id) DO UPDATE SET
  entity_type   = excluded.entity_type,
  name          = excluded.name,
  description   = excluded.description,
  reference     = excluded.reference,
  status_type   = excluded.status_type,
  status_since  = excluded.status_since,
  created_date  = excluded.created_date,
  modified_date = excluded.modified_date,
  created_by    = excluded.created_by,
  modified_by   = excluded.modified_by";

const UPSERT_DOCUMENT: &str = "
INSERT INTO documents (
  id, name, description, reference,
  status_type, status_since, created_date, modified_date, created_by, modified_by,
  document_type, file_name, extension, tags, mime_type, content_length, content_path,
  content_id, owner_id, owner_type
) VALUES (
  ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10,
  ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20
)
ON CONFLICT(id) DO UPDATE SET
  name           = excluded.name,
  description    = excluded.description,
  reference      = excluded.reference,
  status_type    = excluded.status_type,
  status_since   = excluded.status_since,
  created_date   = excluded.created_date,
  modified_date  = excluded.modified_date,
  created_by     = excluded.created_by,
  modified_by    = excluded.modified_by,
  document_type  = excluded.document_type,
  file_name      = excluded.file_name,
  extension      = excluded.extension,
  tags           = excluded.tags,
  mime_type      = excluded.mime_type,
  content_length = excluded.content_length,
  content_path   = excluded.content_path,
  content_id     = excluded.content_id,
  owner_id       = excluded.owner_id,
  owner_type     = excluded.owner_type";

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Cherry entity store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn count(&self, table: &'static str) -> Result<u64> {
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
      })
      .await?;
    Ok(u64::try_from(n).unwrap_or_default())
  }

  async fn delete(&self, table: &'static str, id: Uuid) -> Result<bool> {
    let id_str = encode_uuid(id);
    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          &format!("DELETE FROM {table} WHERE id = ?1"),
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    Ok(changed > 0)
  }

  /// Run a document query with at most one parameter.
  async fn query_documents(
    &self,
    filter: &'static str,
    param: Option<String>,
  ) -> Result<Vec<DocumentEntity>> {
    let raws: Vec<RawDocument> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents {filter} ORDER BY rowid");
        let mut stmt = conn.prepare(&sql)?;
        let rows = match param {
          Some(p) => stmt
            .query_map(rusqlite::params![p], RawDocument::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
          None => stmt
            .query_map([], RawDocument::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?,
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDocument::into_document).collect()
  }
}

// ─── CommerceStore impl ──────────────────────────────────────────────────────

impl CommerceStore for SqliteStore {
  type Error = crate::Error;

  // ── Entities ──────────────────────────────────────────────────────────────

  async fn save_entity(&self, entity: &BaseEntity) -> Result<()> {
    let raw = RawEntity::encode(entity);

    self
      .conn
      .call(move |conn| {
        let c = raw.common;
        conn.execute(
          UPSERT_ENTITY,
          rusqlite::params![
            raw.id,
            raw.entity_type,
            c.name,
            c.description,
            c.reference,
            c.status_type,
            c.status_since,
            c.created_date,
            c.modified_date,
            c.created_by,
            c.modified_by,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_entity(&self, id: Uuid) -> Result<Option<BaseEntity>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawEntity> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {ENTITY_COLUMNS} FROM entities WHERE id = ?1"),
            rusqlite::params![id_str],
            RawEntity::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawEntity::into_entity).transpose()
  }

  async fn find_entities(&self, kind: Option<EntityKind>) -> Result<Vec<BaseEntity>> {
    let kind_str = kind.map(|k| k.to_string());

    let raws: Vec<RawEntity> = self
      .conn
      .call(move |conn| {
        let rows = if let Some(k) = kind_str {
          let mut stmt = conn.prepare(&format!(
            "SELECT {ENTITY_COLUMNS} FROM entities WHERE entity_type = ?1 ORDER BY rowid"
          ))?;
          stmt
            .query_map(rusqlite::params![k], RawEntity::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        } else {
          let mut stmt =
            conn.prepare(&format!("SELECT {ENTITY_COLUMNS} FROM entities ORDER BY rowid"))?;
          stmt
            .query_map([], RawEntity::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawEntity::into_entity).collect()
  }

  async fn delete_entity(&self, id: Uuid) -> Result<bool> { self.delete("entities", id).await }

  async fn count_entities(&self) -> Result<u64> { self.count("entities").await }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn save_document(&self, document: &DocumentEntity) -> Result<()> {
    let raw = RawDocument::encode(document)?;

    self
      .conn
      .call(move |conn| {
        let c = raw.common;
        conn.execute(
          UPSERT_DOCUMENT,
          rusqlite::params![
            raw.id,
            c.name,
            c.description,
            c.reference,
            c.status_type,
            c.status_since,
            c.created_date,
            c.modified_date,
            c.created_by,
            c.modified_by,
            raw.document_type,
            raw.file_name,
            raw.extension,
            raw.tags,
            raw.mime_type,
            raw.content_length,
            raw.content_path,
            raw.content_id,
            raw.owner_id,
            raw.owner_type,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn find_document(&self, id: Uuid) -> Result<Option<DocumentEntity>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = ?1"),
            rusqlite::params![id_str],
            RawDocument::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawDocument::into_document).transpose()
  }

  async fn find_documents(&self) -> Result<Vec<DocumentEntity>> {
    self.query_documents("", None).await
  }

  async fn find_documents_by_owner(&self, owner_id: Uuid) -> Result<Vec<DocumentEntity>> {
    self
      .query_documents("WHERE owner_id = ?1", Some(encode_uuid(owner_id)))
      .await
  }

  async fn delete_document(&self, id: Uuid) -> Result<bool> { self.delete("documents", id).await }

  async fn count_documents(&self) -> Result<u64> { self.count("documents").await }
}
