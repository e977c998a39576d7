//! Content store boundary, preview snapshots and the HTTP server.

pub mod api;
pub mod client;
pub mod config;
pub mod memory;
pub mod preview;
pub mod server;
pub mod site;

pub use api::{
    ApiError, ApiResult, ContentApi, CreatePreviewRequest, SaveContentRequest, UploadedAsset,
};
pub use client::HttpContentApi;
pub use config::{Config, ConfigError, CONFIG_ENV, DEFAULT_CONFIG_NAME};
pub use memory::{MemoryContentStore, StoredAsset};
pub use preview::{page_path, preview_url, PreviewError, PreviewHandle, PreviewService};
pub use server::{init_tracing, router, serve, AppState, ServerError, DEFAULT_LOG_FILTER};
pub use site::{SiteRenderer, HOME_PAGE};
