//! JSON REST API for Cherry.
//!
//! Exposes an axum [`Router`] over the document and entity services, backed
//! by any [`CommerceStore`] and [`ContentStore`]. Domain errors become JSON
//! bodies of the form `{"error": "...", "entityType": "..."}`. TLS, auth and
//! request tracing are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", cherry_api::api_router(state))
//! ```

pub mod documents;
pub mod entities;
pub mod error;
pub mod etag;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, put},
};
use cherry_core::{
  content::ContentStore,
  service::{DocumentService, EntityService},
  store::CommerceStore,
};

pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<S, C> {
  pub documents: Arc<DocumentService<S, C>>,
  pub entities:  Arc<EntityService<S, C>>,
}

impl<S, C> AppState<S, C>
where
  S: CommerceStore,
  C: ContentStore,
{
  pub fn new(documents: DocumentService<S, C>) -> Self {
    let documents = Arc::new(documents);
    Self {
      entities: Arc::new(EntityService::new(documents.clone())),
      documents,
    }
  }
}

impl<S, C> Clone for AppState<S, C> {
  fn clone(&self) -> Self {
    Self {
      documents: self.documents.clone(),
      entities:  self.entities.clone(),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, C>(state: AppState<S, C>) -> Router<()>
where
  S: CommerceStore + 'static,
  C: ContentStore + 'static,
{
  Router::new()
    // Entities
    .route("/entities", get(entities::list::<S, C>).post(entities::create::<S, C>))
    .route(
      "/entities/{id}",
      get(entities::get_one::<S, C>)
        .put(entities::update::<S, C>)
        .delete(entities::delete_one::<S, C>),
    )
    .route("/entities/{id}/documents", get(entities::documents::<S, C>))
    // Documents
    .route("/documents", get(documents::list::<S, C>).post(documents::create::<S, C>))
    .route("/documents/count", get(documents::count::<S, C>))
    .route(
      "/documents/{id}",
      get(documents::get_one::<S, C>)
        .put(documents::update::<S, C>)
        .delete(documents::delete_one::<S, C>),
    )
    .route(
      "/documents/{id}/content",
      put(documents::put_content::<S, C>).get(documents::get_content::<S, C>),
    )
    .with_state(state)
}
