use std::{sync::Arc, time::Instant};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    catalog::SchemaCatalog,
    executor::{ExecutionError, WarehouseExecutor},
    generation::{guardrail, guardrail::RejectionReason, GeneratedQuery, GenerationError, SqlGenerator},
    prompt,
};

use super::{
    models::{ErrorBody, QueryRequest, QueryResponse, SchemaSummary, TableSummary},
    AppState,
};

/// Simple health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "service": "asksql",
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Rejected(#[from] RejectionReason),

    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

/// Run one question through compile, generate, extract, validate, execute.
/// Each stage fails fast; a rejected statement never reaches the executor.
pub async fn answer_question(
    catalog: &SchemaCatalog,
    generator: &dyn SqlGenerator,
    executor: &dyn WarehouseExecutor,
    question: &str,
    request_id: Uuid,
) -> Result<QueryResponse, PipelineError> {
    let compiled = prompt::compile(catalog, question);
    log::debug!(
        "[{}] compiled prompt (~{} tokens)",
        request_id,
        compiled.estimated_tokens
    );

    let generation_start = Instant::now();
    let raw = generator.generate(&compiled).await?;
    log::info!(
        "[{}] completion received ({} chars) in {:.0}ms",
        request_id,
        raw.len(),
        generation_start.elapsed().as_secs_f64() * 1000.0
    );

    let generated = GeneratedQuery::from_completion(raw);
    log::debug!(
        "[{}] extracted {} of {} chars, select_only={}",
        request_id,
        generated.sql.len(),
        generated.raw.len(),
        generated.is_select_only
    );

    let sql = guardrail::validate(&generated.sql)?;

    let execution_start = Instant::now();
    let result = executor.execute(&sql).await?;
    log::info!(
        "[{}] {} rows in {:.0}ms",
        request_id,
        result.data.len(),
        execution_start.elapsed().as_secs_f64() * 1000.0
    );

    Ok(QueryResponse {
        generated_sql: sql,
        result,
    })
}

pub async fn query_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, (StatusCode, Json<ErrorBody>)> {
    let request_id = Uuid::new_v4();
    log::info!(
        "[{}] question received ({} chars)",
        request_id,
        payload.question.len()
    );

    match answer_question(
        &app_state.catalog,
        app_state.generator.as_ref(),
        app_state.executor.as_ref(),
        &payload.question,
        request_id,
    )
    .await
    {
        Ok(response) => Ok(Json(response)),
        Err(e) => Err(error_response(request_id, e)),
    }
}

/// Guardrail rejections are actionable and surfaced verbatim. Generation
/// and execution failures are logged in full and surfaced generically so
/// warehouse diagnostics never reach an untrusted caller.
fn error_response(request_id: Uuid, error: PipelineError) -> (StatusCode, Json<ErrorBody>) {
    match error {
        PipelineError::Rejected(reason) => {
            log::warn!("[{}] statement rejected: {}", request_id, reason);
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new(reason.to_string())),
            )
        }
        PipelineError::Generation(e) => {
            log::error!("[{}] generation failed: {}", request_id, e);
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody::new("query generation failed")),
            )
        }
        PipelineError::Execution(e) => {
            match &e {
                ExecutionError::Warehouse { detail, sql }
                | ExecutionError::Response { detail, sql } => {
                    log::error!(
                        "[{}] execution failed: {}; statement was:\n{}",
                        request_id,
                        detail,
                        sql
                    );
                }
            }
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody::new("query execution failed")),
            )
        }
    }
}

pub async fn schema_handler(State(app_state): State<Arc<AppState>>) -> Json<SchemaSummary> {
    let catalog = &app_state.catalog;
    Json(SchemaSummary {
        catalog: catalog.catalog().map(str::to_string),
        schema: catalog.schema().to_string(),
        tables: catalog
            .tables()
            .map(|table| TableSummary {
                name: table.name.clone(),
                columns: table.columns.len(),
            })
            .collect(),
        join_edges: catalog.join_graph().edges().len(),
        join_paths: catalog.join_graph().paths().len(),
    })
}
