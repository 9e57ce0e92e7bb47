//! Handlers for `/entities` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/entities` | Optional `?kind=PERSON\|CUSTOMER\|...` |
//! | `POST`   | `/entities` | Body: `{"entityType":"CUSTOMER","name":"..."}`; 201; document kinds 400 |
//! | `GET`    | `/entities/{id}` | The entity with its documents |
//! | `PUT`    | `/entities/{id}` | Metadata update |
//! | `DELETE` | `/entities/{id}` | Removes its documents and payloads too; 204 |
//! | `GET`    | `/entities/{id}/documents` | Documents owned by the entity |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use cherry_core::{
  Error,
  client::{Document, Entity},
  content::ContentStore,
  identity::EntityKind,
  mapper::{EntityMapper, MappingContext},
  persistent::BaseEntity,
  status::StatusType,
  store::CommerceStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{AppState, error::ApiError};

fn to_client(entity: Arc<BaseEntity>) -> Result<Arc<Entity>, ApiError> {
  Ok(EntityMapper::from_persistent(&entity, &mut MappingContext::new())?)
}

fn not_found(id: Uuid) -> ApiError {
  Error::NotFound { kind: EntityKind::Unspecified, id }.into()
}

// ─── List ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub kind: Option<EntityKind>,
}

/// `GET /entities[?kind=<kind>]`
pub async fn list<S, C>(
  State(state): State<AppState<S, C>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Arc<Entity>>>, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let stored: Vec<_> = state
    .entities
    .find_all(params.kind)
    .await?
    .into_iter()
    .map(Arc::new)
    .collect();
  let entities = EntityMapper::from_persistent_list(&stored, &mut MappingContext::new())?;
  Ok(Json(entities))
}

// ─── Create / update ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
  pub entity_type: EntityKind,
  pub name:        Option<String>,
  pub description: Option<String>,
  pub reference:   Option<String>,
}

/// `POST /entities`
pub async fn create<S, C>(
  State(state): State<AppState<S, C>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let mut entity = BaseEntity::new(body.entity_type);
  entity.name = body.name;
  entity.description = body.description;
  entity.reference = body.reference;

  let saved = state.entities.save(entity).await?;
  Ok((StatusCode::CREATED, Json(to_client(Arc::new(saved))?)))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateBody {
  pub name:        Option<String>,
  pub description: Option<String>,
  pub reference:   Option<String>,
  pub status_type: Option<StatusType>,
}

/// `PUT /entities/{id}`
pub async fn update<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
  Json(body): Json<UpdateBody>,
) -> Result<Json<Arc<Entity>>, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let mut entity = state.entities.find_by_id(id).await?.ok_or_else(|| not_found(id))?;
  if body.name.is_some() {
    entity.name = body.name;
  }
  if body.description.is_some() {
    entity.description = body.description;
  }
  if body.reference.is_some() {
    entity.reference = body.reference;
  }
  if let Some(status_type) = body.status_type {
    entity.status.set_status_type(status_type);
  }

  state.entities.save(entity).await?;
  let aggregate = state
    .entities
    .load_aggregate(id)
    .await?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(to_client(aggregate)?))
}

// ─── Get / delete ────────────────────────────────────────────────────────────

/// `GET /entities/{id}`
pub async fn get_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Arc<Entity>>, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let aggregate = state
    .entities
    .load_aggregate(id)
    .await?
    .ok_or_else(|| not_found(id))?;
  Ok(Json(to_client(aggregate)?))
}

/// `GET /entities/{id}/documents`
pub async fn documents<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Arc<Document>>>, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  let aggregate = state
    .entities
    .load_aggregate(id)
    .await?
    .ok_or_else(|| not_found(id))?;
  let owner = to_client(aggregate)?;
  Ok(Json(owner.documents().to_vec()))
}

/// `DELETE /entities/{id}`
pub async fn delete_one<S, C>(
  State(state): State<AppState<S, C>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: CommerceStore,
  C: ContentStore,
{
  if !state.entities.delete_by_id(id).await? {
    return Err(not_found(id));
  }
  Ok(StatusCode::NO_CONTENT)
}
