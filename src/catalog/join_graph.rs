//! Curated join relationships between catalog tables.
//!
//! Edges and paths are operator-declared, never inferred from naming
//! conventions. Declaration order is preserved so that renderings of the
//! same graph are stable across rebuilds.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::CatalogError;

/// A `table.column` reference used by join edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnRef {
    pub table: String,
    pub column: String,
}

impl ColumnRef {
    pub fn parse(reference: &str) -> Result<Self, CatalogError> {
        match reference.split_once('.') {
            Some((table, column))
                if !table.is_empty() && !column.is_empty() && !column.contains('.') =>
            {
                Ok(Self {
                    table: table.to_string(),
                    column: column.to_string(),
                })
            }
            _ => Err(CatalogError::MalformedColumnRef {
                reference: reference.to_string(),
            }),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.table, self.column)
    }
}

/// Directed reference between two columns. The direction documents which
/// side holds the reference; a join may be traversed either way at
/// generation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinEdge {
    pub from: ColumnRef,
    pub to: ColumnRef,
}

impl fmt::Display for JoinEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Ordered sequence of table names sanctioned for a multi-table query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JoinPath(Vec<String>);

impl JoinPath {
    pub fn new(tables: Vec<String>) -> Self {
        Self(tables)
    }

    pub fn tables(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for JoinPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(" -> "))
    }
}

/// The exhaustive set of legal join relationships. Paths not listed here
/// must not be used, so an empty graph means single-table queries only.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JoinGraph {
    edges: Vec<JoinEdge>,
    paths: Vec<JoinPath>,
}

impl JoinGraph {
    pub fn new(edges: Vec<JoinEdge>, paths: Vec<JoinPath>) -> Self {
        Self { edges, paths }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn edges(&self) -> &[JoinEdge] {
        &self.edges
    }

    pub fn paths(&self) -> &[JoinPath] {
        &self.paths
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty() && self.paths.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_column_ref() {
        let reference = ColumnRef::parse("admission.patient_id").unwrap();
        assert_eq!(reference.table, "admission");
        assert_eq!(reference.column, "patient_id");
    }

    #[test]
    fn test_parse_rejects_missing_dot() {
        assert!(matches!(
            ColumnRef::parse("patient_id"),
            Err(CatalogError::MalformedColumnRef { .. })
        ));
    }

    #[test]
    fn test_parse_rejects_extra_dots() {
        assert!(ColumnRef::parse("db.table.column").is_err());
        assert!(ColumnRef::parse(".column").is_err());
        assert!(ColumnRef::parse("table.").is_err());
    }

    #[test]
    fn test_edge_display() {
        let edge = JoinEdge {
            from: ColumnRef::parse("admission.patient_id").unwrap(),
            to: ColumnRef::parse("patient.patient_id").unwrap(),
        };
        assert_eq!(edge.to_string(), "admission.patient_id -> patient.patient_id");
    }

    #[test]
    fn test_path_display() {
        let path = JoinPath::new(vec![
            "patient".to_string(),
            "admission".to_string(),
            "billing".to_string(),
        ]);
        assert_eq!(path.to_string(), "patient -> admission -> billing");
    }

    #[test]
    fn test_empty_graph() {
        assert!(JoinGraph::empty().is_empty());
    }
}
