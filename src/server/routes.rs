use axum::{
    extract::{Path, State},
    Json,
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use crate::server::AppState;
use crate::column::SqlColumn;
use crate::vdb::QueryResult;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct QueryRequest {
    pub sql: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct TableList {
    pub database: String,
    pub tables: Vec<String>,
}

#[derive(Serialize)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<SqlColumn>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, error: impl ToString) -> ApiError {
    (status, Json(ErrorResponse { error: error.to_string() }))
}

pub async fn list_tables(State(state): State<Arc<AppState>>) -> Json<TableList> {
    let db = state.db.lock().await;
    Json(TableList {
        database: db.name().to_string(),
        tables: db.table_names().into_iter().map(String::from).collect(),
    })
}

pub async fn get_table(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<TableSchema>, ApiError> {
    let db = state.db.lock().await;
    let columns = db
        .schema(&name)
        .ok_or_else(|| api_error(StatusCode::NOT_FOUND, format!("no such table: {}", name)))?;

    Ok(Json(TableSchema {
        name: name.clone(),
        columns: columns.to_vec(),
    }))
}

pub async fn run_query(
    State(state): State<Arc<AppState>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResult>, ApiError> {
    tracing::debug!(sql = %request.sql, "Query received");
    let db = state.db.lock().await;
    db.query(&request.sql)
        .map(Json)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, e))
}
