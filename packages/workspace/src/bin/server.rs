use std::path::PathBuf;
use tessera_workspace::{init_tracing, serve, AppState, Config, DEFAULT_LOG_FILTER};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing(DEFAULT_LOG_FILTER);

    let root_dir = match std::env::args().nth(1) {
        Some(dir) => PathBuf::from(dir),
        None => std::env::current_dir()?,
    };

    let config = Config::load(&root_dir)?;
    serve(AppState::from_config(config, &root_dir)?).await
}
