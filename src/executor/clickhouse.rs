//! ClickHouse implementation of the execution boundary.

use async_trait::async_trait;
use clickhouse::Client;
use serde::Deserialize;
use serde_json::Value;
use tokio::io::AsyncReadExt;

use crate::config::ServerConfig;

use super::{ExecutionError, QueryResult, WarehouseExecutor};

pub struct ClickhouseExecutor {
    client: Client,
}

impl ClickhouseExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

pub fn build_client(config: &ServerConfig) -> Client {
    Client::default()
        .with_url(config.warehouse_url.as_str())
        .with_user(config.warehouse_user.as_str())
        .with_password(config.warehouse_password.as_str())
        .with_database(config.schema.as_str())
        .with_option("join_use_nulls", "1") // Return NULL for unmatched LEFT JOIN columns
}

/// Shape of a ClickHouse JSONCompact response. Extra fields (rows,
/// statistics) are ignored.
#[derive(Debug, Deserialize)]
struct CompactBody {
    meta: Vec<CompactColumn>,
    #[serde(default)]
    data: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
struct CompactColumn {
    name: String,
}

fn parse_compact_body(body: &[u8], sql: &str) -> Result<QueryResult, ExecutionError> {
    let parsed: CompactBody =
        serde_json::from_slice(body).map_err(|e| ExecutionError::Response {
            detail: e.to_string(),
            sql: sql.to_string(),
        })?;
    Ok(QueryResult {
        columns: parsed.meta.into_iter().map(|column| column.name).collect(),
        data: parsed.data,
    })
}

#[async_trait]
impl WarehouseExecutor for ClickhouseExecutor {
    async fn execute(&self, sql: &str) -> Result<QueryResult, ExecutionError> {
        // JSONCompact carries column metadata alongside the rows, so the
        // zero-row case still yields column names.
        let mut cursor = self
            .client
            .query(sql)
            .fetch_bytes("JSONCompact")
            .map_err(|e| ExecutionError::Warehouse {
                detail: e.to_string(),
                sql: sql.to_string(),
            })?;

        // One HTTP exchange per statement: the connection is released
        // whether this read completes, fails, or the task is dropped.
        let mut body = Vec::new();
        cursor
            .read_to_end(&mut body)
            .await
            .map_err(|e| ExecutionError::Warehouse {
                detail: e.to_string(),
                sql: sql.to_string(),
            })?;

        parse_compact_body(&body, sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_rows_and_columns() {
        let body = r#"{
            "meta": [
                { "name": "patient_id", "type": "String" },
                { "name": "gender", "type": "String" }
            ],
            "data": [
                ["p-1", "F"],
                ["p-2", "M"]
            ],
            "rows": 2,
            "statistics": { "elapsed": 0.001, "rows_read": 2, "bytes_read": 32 }
        }"#;

        let result = parse_compact_body(body.as_bytes(), "SELECT 1").unwrap();
        assert_eq!(result.columns, vec!["patient_id", "gender"]);
        assert_eq!(result.data.len(), 2);
        assert_eq!(result.data[0], vec![json!("p-1"), json!("F")]);
    }

    #[test]
    fn test_zero_rows_still_has_columns() {
        let body = r#"{ "meta": [{ "name": "amount", "type": "Float64" }], "data": [] }"#;
        let result = parse_compact_body(body.as_bytes(), "SELECT 1").unwrap();
        assert_eq!(result.columns, vec!["amount"]);
        assert!(result.data.is_empty());
    }

    #[test]
    fn test_column_order_is_preserved() {
        let body = r#"{
            "meta": [
                { "name": "z", "type": "String" },
                { "name": "a", "type": "String" },
                { "name": "m", "type": "String" }
            ],
            "data": []
        }"#;
        let result = parse_compact_body(body.as_bytes(), "SELECT 1").unwrap();
        assert_eq!(result.columns, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_malformed_body_is_a_response_error() {
        let result = parse_compact_body(b"not json", "SELECT 1");
        assert!(matches!(result, Err(ExecutionError::Response { .. })));
    }
}
