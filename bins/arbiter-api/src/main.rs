mod handlers;
mod routes;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use arbiter_judge::{EngineConfig, JudgeEngine, MemoryStore, ToolchainRegistry};
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

pub struct AppState {
    pub engine: JudgeEngine,
    pub store: MemoryStore,
}

#[tokio::main]
async fn main() {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    info!("Arbiter API booting...");

    // Toolchain table: built-in unless a languages.json is provided
    let registry = match std::env::var("ARBITER_LANGUAGES") {
        Ok(path) => ToolchainRegistry::load(Path::new(&path))
            .expect("Failed to load toolchain config"),
        Err(_) => ToolchainRegistry::builtin(),
    };
    info!("Configured languages: {:?}", registry.list_languages());

    let time_limit_ms: u64 = std::env::var("ARBITER_TIME_LIMIT_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5000);

    let mut config = EngineConfig::default();
    config.time_limit = Duration::from_millis(time_limit_ms);
    if let Ok(root) = std::env::var("ARBITER_WORKSPACE_ROOT") {
        std::fs::create_dir_all(&root).expect("Failed to create workspace root");
        config.workspace_root = root.into();
    }

    let engine = JudgeEngine::new(Arc::new(registry), config);

    // Problem/test-case store: in-memory, optionally seeded from disk
    let store = match std::env::var("ARBITER_PROBLEMS") {
        Ok(path) => MemoryStore::load(Path::new(&path))
            .expect("Failed to load problem store"),
        Err(_) => MemoryStore::new(),
    };

    let state = Arc::new(AppState { engine, store });

    // Build router
    let app = Router::new()
        .merge(routes::routes())
        .with_state(state);

    // Start server
    let addr = std::env::var("ARBITER_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr).await
        .expect("Failed to bind to address");

    info!("HTTP server listening on {}", addr);
    info!("Ready to judge submissions");

    axum::serve(listener, app).await
        .expect("Server error");
}
