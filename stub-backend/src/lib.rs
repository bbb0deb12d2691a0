//! stub-backend: in-memory search backend
//!
//! Serves the routes the dashboard's HTTP client talks to, backed by sample
//! datasets and a mutable synonym dictionary. Used for local development
//! and end-to-end tests.
//!
//! | Route | Purpose |
//! |---|---|
//! | `GET /sources` | list sources |
//! | `POST /search` | run a search |
//! | `POST /search/export` | export a search |
//! | `GET /synonyms` | list dictionary |
//! | `PUT /synonyms` | upsert entry |
//! | `DELETE /synonyms/:keyword` | remove entry |

pub mod config;
pub mod error;
pub mod store;

pub use config::StubConfig;
pub use error::{Result, StubError};
pub use store::{sample_store, Dataset, StubStore};

use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use search_dashboard::model::{ApiResponse, DictionaryEntry, SearchPayload, SearchRequest, SourceDescriptor};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

/// Build the application router
pub fn router(store: Arc<StubStore>) -> Router {
    // The dashboard may be served from another origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_check))
        .route("/sources", get(list_sources))
        .route("/search", post(search))
        .route("/search/export", post(export))
        .route("/synonyms", get(list_synonyms).put(upsert_synonym))
        .route("/synonyms/:keyword", axum::routing::delete(delete_synonym))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(store)
}

/// Health check
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "stub-backend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn list_sources(State(store): State<Arc<StubStore>>) -> Json<ApiResponse<Vec<SourceDescriptor>>> {
    Json(ApiResponse::ok(store.sources()))
}

async fn search(
    State(store): State<Arc<StubStore>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ApiResponse<SearchPayload>>> {
    let payload = store.search(&request).await?;
    Ok(Json(ApiResponse::ok(payload)))
}

async fn export(
    State(store): State<Arc<StubStore>>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<ApiResponse<()>>> {
    let rows = store.export(&request).await?;
    Ok(Json(ApiResponse::acknowledged(format!("Exported {} rows", rows))))
}

async fn list_synonyms(State(store): State<Arc<StubStore>>) -> Json<ApiResponse<Vec<DictionaryEntry>>> {
    Json(ApiResponse::ok(store.entries().await))
}

async fn upsert_synonym(
    State(store): State<Arc<StubStore>>,
    Json(entry): Json<DictionaryEntry>,
) -> Result<Json<ApiResponse<()>>> {
    let keyword = entry.keyword.clone();
    let created = store.upsert(entry).await?;
    info!("Dictionary entry '{}' {}", keyword, if created { "created" } else { "updated" });
    Ok(Json(ApiResponse::acknowledged(if created { "Created" } else { "Updated" })))
}

async fn delete_synonym(
    State(store): State<Arc<StubStore>>,
    Path(keyword): Path<String>,
) -> Result<Json<ApiResponse<()>>> {
    store.remove(&keyword).await?;
    info!("Dictionary entry '{}' deleted", keyword);
    Ok(Json(ApiResponse::acknowledged("Deleted")))
}
