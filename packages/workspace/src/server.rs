//! HTTP surface: content API, uploads, previews and published pages.

use crate::api::{ApiError, ContentApi, CreatePreviewRequest, SaveContentRequest, UploadedAsset};
use crate::config::Config;
use crate::memory::MemoryContentStore;
use crate::preview::{PreviewError, PreviewHandle, PreviewService};
use crate::site::{SiteRenderer, HOME_PAGE};
use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tessera_blocks::{ContentDocument, PreviewId, PreviewRevision};
use tessera_evaluator::{standard_registry, standard_templates, BlockSummary, EvalError};
use thiserror::Error;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Multipart framing allowance on top of the upload cap
const MULTIPART_OVERHEAD: usize = 64 * 1024;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Upload too large")]
    PayloadTooLarge,

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Preview(#[from] PreviewError),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NotFound", self.to_string()),
            Self::InvalidRequest(_) => {
                (StatusCode::BAD_REQUEST, "InvalidRequest", self.to_string())
            }
            Self::PayloadTooLarge => (
                StatusCode::PAYLOAD_TOO_LARGE,
                "PayloadTooLarge",
                self.to_string(),
            ),
            Self::Api(ApiError::Persistence { status, message }) => (
                StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
                "PersistenceFailure",
                message,
            ),
            Self::Api(ApiError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "NotFound", self.to_string())
            }
            Self::Api(ApiError::Transport(_) | ApiError::Decode(_)) => {
                error!("Upstream error: {}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    "UpstreamError",
                    "The content store could not be reached".to_string(),
                )
            }
            Self::Preview(PreviewError::Api(err)) => return Self::Api(err).into_response(),
            Self::Preview(PreviewError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, "PreviewNotFound", self.to_string())
            }
            Self::Preview(PreviewError::PageNotFound(_)) | Self::Eval(EvalError::PageNotFound(_)) => {
                (StatusCode::NOT_FOUND, "PageNotFound", self.to_string())
            }
        };

        let body = Json(json!({
            "error": code,
            "message": message,
        }));

        (status, body).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Shared application state accessible to all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<MemoryContentStore>,
    pub site: SiteRenderer,
    pub previews: PreviewService,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(store: Arc<MemoryContentStore>, site: SiteRenderer, config: Config) -> Self {
        let api: Arc<dyn ContentApi> = store.clone();
        Self {
            previews: PreviewService::new(api, site.clone()),
            store,
            site,
            config: Arc::new(config),
        }
    }

    /// State for a standalone server: seed content from the config, the
    /// standard block set and the standard templates.
    pub fn from_config(config: Config, root: &std::path::Path) -> anyhow::Result<Self> {
        let document = config.load_content(root)?;
        info!(pages = document.pages.len(), "content loaded");

        let store = MemoryContentStore::new(document)
            .with_preview_ttl(config.preview_ttl())
            .with_max_upload_bytes(config.max_upload_bytes);
        let site = SiteRenderer::new(
            Arc::new(standard_registry()),
            Arc::new(standard_templates()),
        )
        .with_default_template(config.default_template.clone());

        Ok(Self::new(Arc::new(store), site, config))
    }
}

/// Default filter when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info,tessera=debug";

/// Install the global subscriber: `RUST_LOG` if set, else `default_filter`.
/// Events go to stderr so command output on stdout stays clean.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Bind the configured address and serve until the process exits
pub async fn serve(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.listen_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("tessera server listening on http://{}", addr);
    info!("Endpoints:");
    info!("  - GET  /  and  /:page[?preview=<id>]");
    info!("  - GET  /content, GET|PUT /admin/content");
    info!("  - POST /admin/upload, POST /admin/preview/create");
    info!("  - GET  /admin/blocks, GET /health");

    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub fn router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes + MULTIPART_OVERHEAD;

    Router::new()
        .route("/health", get(health))
        .route("/content", get(get_content))
        .route("/admin/content", get(get_admin_content).put(put_admin_content))
        .route("/admin/upload", post(upload))
        .route("/admin/preview/create", post(create_preview))
        .route("/admin/preview/:id", get(get_preview))
        .route("/admin/blocks", get(list_blocks))
        .route("/uploads/:name", get(get_upload))
        .route("/", get(home_page))
        .route("/:page", get(page))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_content(State(state): State<AppState>) -> ServerResult<Json<ContentDocument>> {
    Ok(Json(state.store.fetch_public().await?))
}

async fn get_admin_content(State(state): State<AppState>) -> ServerResult<Json<ContentDocument>> {
    Ok(Json(state.store.fetch_admin().await?))
}

async fn put_admin_content(
    State(state): State<AppState>,
    Json(request): Json<SaveContentRequest>,
) -> ServerResult<Json<ContentDocument>> {
    Ok(Json(state.store.save(&request.content).await?))
}

async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadedAsset>> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let bytes = field.bytes().await.map_err(multipart_error)?;
        let asset = state.store.upload(&file_name, bytes.to_vec()).await?;
        info!(url = %asset.url, "asset uploaded");
        return Ok(Json(asset));
    }

    Err(ServerError::InvalidRequest(
        "missing multipart field 'file'".to_string(),
    ))
}

fn multipart_error(err: MultipartError) -> ServerError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ServerError::PayloadTooLarge
    } else {
        ServerError::InvalidRequest(err.body_text())
    }
}

async fn get_upload(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ServerResult<Response> {
    let asset = state
        .store
        .asset(&name)
        .await
        .ok_or_else(|| ServerError::NotFound(format!("upload {}", name)))?;

    Ok(([(header::CONTENT_TYPE, asset.content_type)], asset.bytes).into_response())
}

async fn create_preview(
    State(state): State<AppState>,
    Json(request): Json<CreatePreviewRequest>,
) -> ServerResult<(StatusCode, Json<PreviewHandle>)> {
    let revision = PreviewRevision::new(request.preview_id, request.page, request.content);
    state.store.create_preview(&revision).await?;
    info!(preview_id = %revision.id, page = %revision.page, "preview stored");

    Ok((
        StatusCode::CREATED,
        Json(PreviewHandle::new(revision.id, revision.page)),
    ))
}

async fn get_preview(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<PreviewRevision>> {
    Ok(Json(state.previews.load(&PreviewId::new(id)).await?))
}

async fn list_blocks(State(state): State<AppState>) -> Json<Vec<BlockSummary>> {
    Json(state.site.registry().summaries())
}

#[derive(Debug, Deserialize)]
struct PageQuery {
    preview: Option<String>,
}

async fn home_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ServerResult<Html<String>> {
    render(&state, HOME_PAGE, query).await
}

async fn page(
    State(state): State<AppState>,
    Path(page): Path<String>,
    Query(query): Query<PageQuery>,
) -> ServerResult<Html<String>> {
    render(&state, &page, query).await
}

async fn render(state: &AppState, page: &str, query: PageQuery) -> ServerResult<Html<String>> {
    match query.preview.filter(|id| !id.is_empty()) {
        Some(id) => {
            let html = state
                .previews
                .render_html(&PreviewId::new(id), Some(page))
                .await?;
            Ok(Html(html))
        }
        None => {
            let doc = state.store.fetch_public().await?;
            Ok(Html(state.site.render_page_html(&doc, page)?))
        }
    }
}
