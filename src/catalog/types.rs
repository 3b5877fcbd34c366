use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use super::errors::CatalogError;
use super::join_graph::JoinGraph;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub declared_type: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSchema {
    pub name: String,
    pub description: Option<String>,
    pub columns: Vec<ColumnSchema>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// Read-only description of the queryable warehouse schema.
///
/// Built once at startup and shared behind `Arc` afterward. Rebuilding
/// means constructing a new instance, never mutating this one in place.
/// Tables are keyed in a `BTreeMap` so iteration order, and therefore
/// every rendering of the catalog, is deterministic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaCatalog {
    catalog: Option<String>,
    schema: String,
    tables: BTreeMap<String, TableSchema>,
    join_graph: JoinGraph,
}

impl SchemaCatalog {
    /// Assemble a catalog, enforcing the structural invariants: at least
    /// one table, unique table and column names, and a join graph whose
    /// every table and column reference resolves.
    pub fn new(
        catalog: Option<String>,
        schema: String,
        tables: Vec<TableSchema>,
        join_graph: JoinGraph,
    ) -> Result<Self, CatalogError> {
        if tables.is_empty() {
            return Err(CatalogError::EmptySchema { schema });
        }

        let mut table_map = BTreeMap::new();
        for table in tables {
            let mut seen = HashSet::new();
            for column in &table.columns {
                if !seen.insert(column.name.clone()) {
                    return Err(CatalogError::DuplicateColumn {
                        table: table.name.clone(),
                        column: column.name.clone(),
                    });
                }
            }
            let name = table.name.clone();
            if table_map.insert(name.clone(), table).is_some() {
                return Err(CatalogError::DuplicateTable { table: name });
            }
        }

        let built = Self {
            catalog,
            schema,
            tables: table_map,
            join_graph,
        };
        built.check_join_graph()?;
        Ok(built)
    }

    fn check_join_graph(&self) -> Result<(), CatalogError> {
        for edge in self.join_graph.edges() {
            for reference in [&edge.from, &edge.to] {
                let table = self.tables.get(&reference.table).ok_or_else(|| {
                    CatalogError::UnknownTable {
                        table: reference.table.clone(),
                    }
                })?;
                if table.column(&reference.column).is_none() {
                    return Err(CatalogError::UnknownColumn {
                        table: reference.table.clone(),
                        column: reference.column.clone(),
                    });
                }
            }
        }

        for path in self.join_graph.paths() {
            if path.tables().len() < 2 {
                return Err(CatalogError::InvalidPath {
                    path: path.tables().to_vec(),
                    reason: "a path must traverse at least two tables".to_string(),
                });
            }
            for table in path.tables() {
                if !self.tables.contains_key(table) {
                    return Err(CatalogError::InvalidPath {
                        path: path.tables().to_vec(),
                        reason: format!("unknown table '{}'", table),
                    });
                }
            }
        }

        Ok(())
    }

    pub fn catalog(&self) -> Option<&str> {
        self.catalog.as_deref()
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Tables in deterministic (name) order.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values()
    }

    pub fn table(&self, name: &str) -> Option<&TableSchema> {
        self.tables.get(name)
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    pub fn join_graph(&self) -> &JoinGraph {
        &self.join_graph
    }

    /// Fully qualified table name. The catalog part is omitted when no
    /// catalog label is configured (two-part warehouse naming).
    pub fn qualified_name(&self, table: &str) -> String {
        match &self.catalog {
            Some(catalog) => format!("{}.{}.{}", catalog, self.schema, table),
            None => format!("{}.{}", self.schema, table),
        }
    }
}
