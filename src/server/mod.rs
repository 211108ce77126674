use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use crate::ui;
use crate::vdb::Database;
use crate::Error;

pub mod routes;

/// Server state
pub struct AppState {
    pub db: Mutex<Database>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/tables", get(routes::list_tables))
        .route("/tables/{name}", get(routes::get_table))
        .route("/query", post(routes::run_query))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve an initialised database until the process is stopped.
pub async fn start_server(addr: SocketAddr, db: Database) -> anyhow::Result<()> {
    if !db.is_initialized() {
        return Err(Error::DatabaseNotInitialized.into());
    }

    let tables = db.table_names().len();
    let name = db.name().to_string();
    let state = Arc::new(AppState { db: Mutex::new(db) });
    let app = router(state);

    tracing::info!(database = %name, tables, "Starting server on {}", addr);
    ui::serving(tables, &name, &addr.to_string());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
