use serde::{Deserialize, Serialize};

use crate::executor::QueryResult;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub generated_sql: String,
    pub result: QueryResult,
}

/// Error envelope returned with any non-2xx status.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl ErrorBody {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// Operator-facing summary of the loaded catalog.
#[derive(Debug, Serialize)]
pub struct SchemaSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,
    pub schema: String,
    pub tables: Vec<TableSummary>,
    pub join_edges: usize,
    pub join_paths: usize,
}

#[derive(Debug, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub columns: usize,
}
