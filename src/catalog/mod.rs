//! Schema catalog: read-only description of the queryable tables, columns,
//! and sanctioned join relationships.

pub mod errors;
pub mod introspection;
pub mod join_graph;
pub mod static_config;
pub mod types;

pub use errors::CatalogError;
pub use join_graph::{ColumnRef, JoinEdge, JoinGraph, JoinPath};
pub use types::{ColumnSchema, SchemaCatalog, TableSchema};

use clickhouse::Client;

use crate::config::ServerConfig;

/// Build the catalog from the configured source, behind one interface:
/// a declaration file that lists tables is used as-is; otherwise the
/// warehouse metadata views are introspected, with the file (if any)
/// contributing the join graph. Errors here are fatal at startup.
pub async fn build(config: &ServerConfig, client: &Client) -> Result<SchemaCatalog, CatalogError> {
    let file = match &config.schema_file {
        Some(path) => Some(static_config::CatalogFile::from_yaml_file(path)?),
        None => None,
    };

    let join_graph = match &file {
        Some(file) => file.join_graph()?,
        None => JoinGraph::empty(),
    };

    let tables = match &file {
        Some(file) if file.has_tables() => {
            log::info!("Loading catalog from declaration file");
            file.tables()
        }
        _ => {
            log::info!(
                "Introspecting schema '{}' from warehouse metadata",
                config.schema
            );
            introspection::introspect_tables(client, &config.schema).await?
        }
    };

    SchemaCatalog::new(
        config.catalog.clone(),
        config.schema.clone(),
        tables,
        join_graph,
    )
}
