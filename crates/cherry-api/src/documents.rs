//! Handlers for `/documents` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/documents` | All documents |
//! | `GET`    | `/documents/count` | `{"count": n}` |
//! | `POST`   | `/documents` | Body: [`DocumentBody`] with `ownerId`; 201 |
//! | `GET`    | `/documents/{id}` | 404 if not found |
//! | `PUT`    | `/documents/{id}` | Metadata update; content id kept |
//! | `DELETE` | `/documents/{id}` | Removes the payload too; 204 |
//! | `PUT`    | `/documents/{id}/content` | Raw payload; optional `?filename=` |
//! | `GET`    | `/documents/{id}/content` | Payload with `Content-Type` and `ETag` |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::{HeaderMap, StatusCode, header},
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use cherry_core::{
  Error,
  client::Document,
  content::ContentStore,
  document::DocumentKind,
  identity::EntityKind,
  mapper::{DocumentMapper, MappingContext},
  persistent::DocumentEntity,
  status::StatusType,
  store::CommerceStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::{AppState, error::ApiError, etag};

// ─── Conversions ─────────────────────────────────────────────────────────────

pub(crate) fn to_client(document: DocumentEntity) -> Result<Arc<Document>, ApiError> {
  Ok(DocumentMapper::from_persistent(
    &Arc::new(document),
    &mut MappingContext::new(),
  )?)
}

fn to_persistent(document: Document) -> Result<DocumentEntity, ApiError> {
  let stored = DocumentMapper::from_client(&Arc::new(document), &mut MappingContext::new())?;
  Ok(Arc::unwrap_or_clone(stored))
}

async fn find<S, C>(state: &AppState<S, C>, id: Uuid) -> Result<DocumentEntity, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let document = state.documents.find_by_id(id).await?.ok_or(Error::NotFound {
    kind: EntityKind::Document,
    id,
  })?;
  Ok(document)
}

// ─── Body ────────────────────────────────────────────────────────────────────

/// Document metadata accepted on create and update. Absent fields are left
/// unchanged. `ownerId` is required on create and must not change on update.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DocumentBody {
  pub owner_id:      Option<Uuid>,
  pub document_type: Option<DocumentKind>,
  pub name:          Option<String>,
  pub description:   Option<String>,
  pub reference:     Option<String>,
  pub tags:          Option<String>,
  pub file_name:     Option<String>,
  pub status_type:   Option<StatusType>,
}

impl DocumentBody {
  fn apply(self, document: &mut Document) {
    if let Some(document_type) = self.document_type {
      document.document_type = document_type;
    }
    if let Some(file_name) = self.file_name.as_deref() {
      document.set_file_name(file_name);
    }
    if self.name.is_some() {
      document.name = self.name;
    }
    if self.description.is_some() {
      document.description = self.description;
    }
    if self.reference.is_some() {
      document.reference = self.reference;
    }
    if self.tags.is_some() {
      document.tags = self.tags;
    }
    if let Some(status_type) = self.status_type {
      document.status.set_status_type(status_type);
    }
  }
}

// ─── List / count ────────────────────────────────────────────────────────────

/// `GET /documents`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
) -> Result<Json<Vec<Arc<Document>>>, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let stored: Vec<_> = state
    .documents
    .find_all()
    .await?
    .into_iter()
    .map(Arc::new)
    .collect();
  let documents = DocumentMapper::from_persistent_list(&stored, &mut MappingContext::new())?;
  Ok(Json(documents))
}

/// `GET /documents/count`
pub async fn count<S, C>(State(state): State<AppState<S, C>>) -> Result<Json<Value>, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let count = state.documents.count().await?;
  Ok(Json(json!({ "count": count })))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /documents`
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<DocumentBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let owner_id = body.owner_id.ok_or(Error::InvalidField {
    kind:  EntityKind::Document,
    field: "ownerId",
    value: "null".to_owned(),
  })?;
  let owner = state.entities.find_by_id(owner_id).await?.ok_or(Error::NotFound {
    kind: EntityKind::Unspecified,
    id:   owner_id,
  })?;
  if !owner.kind().can_own_documents() {
    return Err(Error::CannotOwnDocuments(owner.kind()).into());
  }

  let mut document = Document::new(DocumentKind::default()).with_owner(owner.identity());
  body.apply(&mut document);

  let saved = state.documents.save(to_persistent(document)?).await?;
  Ok((StatusCode::CREATED, Json(to_client(saved)?)))
}

// ─── Get / update / delete ───────────────────────────────────────────────────

/// `GET /documents/{id}`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Arc<Document>>, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  Ok(Json(to_client(find(&state, id).await?)?))
}

/// `PUT /documents/{id}`
pub async fn update<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
  Json(body): Json<DocumentBody>,
) -> Result<Json<Arc<Document>>, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let stored = find(&state, id).await?;
  if body.owner_id.is_some() && body.owner_id != stored.owner_identity().map(|o| o.id) {
    return Err(ApiError::BadRequest("a document's owner cannot be changed".into()));
  }

  let mut document = Arc::unwrap_or_clone(to_client(stored)?);
  body.apply(&mut document);

  let saved = state.documents.save(to_persistent(document)?).await?;
  Ok(Json(to_client(saved)?))
}

/// `DELETE /documents/{id}`
pub async fn delete_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  if !state.documents.delete_by_id(id).await? {
    return Err(Error::NotFound { kind: EntityKind::Document, id }.into());
  }
  Ok(StatusCode::NO_CONTENT)
}

// ─── Content ─────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ContentParams {
  pub filename: Option<String>,
}

/// `PUT /documents/{id}/content[?filename=<name>]`
pub async fn put_content<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ContentParams>,
  content: Bytes,
) -> Result<Json<Arc<Document>>, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let mut document = find(&state, id).await?;
  if let Some(filename) = params.filename.as_deref() {
    document.set_file_name(filename);
  }
  document.set_content(content);

  let saved = state.documents.save(document).await?;
  Ok(Json(to_client(saved)?))
}

/// `GET /documents/{id}/content`
pub async fn get_content<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
  headers: HeaderMap,
) -> Result<Response, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let document = find(&state, id).await?;
  let content = state.documents.get_content(&document).await?;
  let etag = etag::compute_etag(&content);

  let not_modified = headers
    .get(header::IF_NONE_MATCH)
    .and_then(|v| v.to_str().ok())
    .is_some_and(|v| etag::matches(v, &etag));
  if not_modified {
    return Ok((StatusCode::NOT_MODIFIED, [(header::ETAG, etag)]).into_response());
  }

  Ok(
    (
      [(header::CONTENT_TYPE, document.mime_type), (header::ETAG, etag)],
      content,
    )
      .into_response(),
  )
}
