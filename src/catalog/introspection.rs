//! Catalog construction from warehouse metadata views.
//!
//! Two read-only queries against `information_schema`, filtered to one
//! schema and ordered by table name then ordinal position so that repeated
//! builds over the same metadata produce identical catalogs. Values are
//! cast to plain `String` in SQL so the decode does not depend on which
//! columns the server declares as Nullable.

use clickhouse::Client;
use serde::Deserialize;

use super::errors::CatalogError;
use super::types::{ColumnSchema, TableSchema};

#[derive(Debug, clickhouse::Row, Deserialize)]
struct TableRow {
    name: String,
    comment: String,
}

#[derive(Debug, clickhouse::Row, Deserialize)]
struct ColumnRow {
    table_name: String,
    name: String,
    declared_type: String,
    comment: String,
}

/// Read table and column metadata for one schema. Fails when the metadata
/// query fails or the schema holds no tables at all.
pub async fn introspect_tables(
    client: &Client,
    schema: &str,
) -> Result<Vec<TableSchema>, CatalogError> {
    let table_query = format!(
        "SELECT toString(table_name) AS name, \
                ifNull(toString(table_comment), '') AS comment \
         FROM information_schema.tables \
         WHERE table_schema = '{}' \
         ORDER BY table_name",
        schema
    );
    let table_rows: Vec<TableRow> = client
        .query(&table_query)
        .fetch_all()
        .await
        .map_err(|e| CatalogError::Introspection {
            detail: e.to_string(),
        })?;

    if table_rows.is_empty() {
        return Err(CatalogError::EmptySchema {
            schema: schema.to_string(),
        });
    }

    let column_query = format!(
        "SELECT toString(table_name) AS table_name, \
                toString(column_name) AS name, \
                toString(data_type) AS declared_type, \
                ifNull(toString(column_comment), '') AS comment \
         FROM information_schema.columns \
         WHERE table_schema = '{}' \
         ORDER BY table_name, ordinal_position",
        schema
    );
    let column_rows: Vec<ColumnRow> = client
        .query(&column_query)
        .fetch_all()
        .await
        .map_err(|e| CatalogError::Introspection {
            detail: e.to_string(),
        })?;

    Ok(assemble(table_rows, column_rows))
}

/// Group column rows under their tables, keeping both orderings from the
/// metadata queries intact.
fn assemble(table_rows: Vec<TableRow>, column_rows: Vec<ColumnRow>) -> Vec<TableSchema> {
    let mut tables: Vec<TableSchema> = table_rows
        .into_iter()
        .map(|row| TableSchema {
            name: row.name,
            description: non_empty(row.comment),
            columns: Vec::new(),
        })
        .collect();

    for row in column_rows {
        if let Some(table) = tables.iter_mut().find(|t| t.name == row.table_name) {
            table.columns.push(ColumnSchema {
                name: row.name,
                declared_type: row.declared_type,
                description: non_empty(row.comment),
            });
        }
    }

    tables
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_row(name: &str, comment: &str) -> TableRow {
        TableRow {
            name: name.to_string(),
            comment: comment.to_string(),
        }
    }

    fn column_row(table: &str, name: &str, declared_type: &str) -> ColumnRow {
        ColumnRow {
            table_name: table.to_string(),
            name: name.to_string(),
            declared_type: declared_type.to_string(),
            comment: String::new(),
        }
    }

    #[test]
    fn test_assemble_groups_columns_by_table() {
        let tables = assemble(
            vec![table_row("admission", ""), table_row("patient", "Patients")],
            vec![
                column_row("admission", "admission_id", "String"),
                column_row("admission", "patient_id", "String"),
                column_row("patient", "patient_id", "String"),
            ],
        );

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].name, "admission");
        assert_eq!(tables[0].columns.len(), 2);
        assert_eq!(tables[1].name, "patient");
        assert_eq!(tables[1].description.as_deref(), Some("Patients"));
        assert_eq!(tables[1].columns[0].name, "patient_id");
    }

    #[test]
    fn test_assemble_keeps_column_order() {
        let tables = assemble(
            vec![table_row("billing", "")],
            vec![
                column_row("billing", "bill_id", "String"),
                column_row("billing", "admission_id", "String"),
                column_row("billing", "amount", "Float64"),
            ],
        );
        let names: Vec<&str> = tables[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["bill_id", "admission_id", "amount"]);
    }

    #[test]
    fn test_empty_comment_becomes_none() {
        let tables = assemble(vec![table_row("patient", "")], vec![]);
        assert!(tables[0].description.is_none());
    }

    #[test]
    fn test_orphan_column_rows_are_dropped() {
        let tables = assemble(
            vec![table_row("patient", "")],
            vec![column_row("unknown", "x", "String")],
        );
        assert!(tables[0].columns.is_empty());
    }
}
