//! Warehouse execution boundary.

pub mod clickhouse;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Columnar result set: column names in result-set order, rows aligned
/// positionally with the names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub columns: Vec<String>,
    pub data: Vec<Vec<Value>>,
}

/// Both variants carry the warehouse diagnostic and the offending
/// statement for operator logs. Neither is echoed to callers beyond a
/// generic message.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("Warehouse rejected the statement: {detail}")]
    Warehouse { detail: String, sql: String },

    #[error("Failed to read the warehouse response: {detail}")]
    Response { detail: String, sql: String },
}

/// Runs one already-validated statement per call. Session acquisition and
/// release are scoped inside `execute`; release happens on success,
/// warehouse failure, and caller cancellation alike.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WarehouseExecutor: Send + Sync {
    async fn execute(&self, sql: &str) -> Result<QueryResult, ExecutionError>;
}
