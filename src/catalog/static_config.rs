//! Catalog declarations loaded from YAML.
//!
//! A declaration file may carry the full table set (static catalogs), only
//! the join graph (to accompany live introspection), or both:
//!
//! ```yaml
//! tables:
//!   - name: patient
//!     description: Registered patients
//!     columns:
//!       - name: patient_id
//!         type: String
//!         description: Primary identifier
//!       - name: gender
//!         type: String
//! joins:
//!   edges:
//!     - from: admission.patient_id
//!       to: patient.patient_id
//!   paths:
//!     - [patient, admission]
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::errors::CatalogError;
use super::join_graph::{ColumnRef, JoinEdge, JoinGraph, JoinPath};
use super::types::{ColumnSchema, TableSchema};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub tables: Vec<TableDecl>,
    #[serde(default)]
    pub joins: JoinsDecl,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDecl {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub columns: Vec<ColumnDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnDecl {
    pub name: String,
    #[serde(rename = "type")]
    pub declared_type: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JoinsDecl {
    #[serde(default)]
    pub edges: Vec<EdgeDecl>,
    #[serde(default)]
    pub paths: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeDecl {
    pub from: String,
    pub to: String,
}

impl CatalogFile {
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let display = path.as_ref().display().to_string();
        let content = fs::read_to_string(&path).map_err(|e| CatalogError::ConfigRead {
            path: display.clone(),
            detail: e.to_string(),
        })?;
        serde_yaml::from_str(&content).map_err(|e| CatalogError::ConfigParse {
            path: display,
            detail: e.to_string(),
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, CatalogError> {
        serde_yaml::from_str(content).map_err(|e| CatalogError::ConfigParse {
            path: "<inline>".to_string(),
            detail: e.to_string(),
        })
    }

    pub fn has_tables(&self) -> bool {
        !self.tables.is_empty()
    }

    /// Declared tables in declaration shape; catalog assembly enforces the
    /// uniqueness invariants.
    pub fn tables(&self) -> Vec<TableSchema> {
        self.tables
            .iter()
            .map(|table| TableSchema {
                name: table.name.clone(),
                description: table.description.clone(),
                columns: table
                    .columns
                    .iter()
                    .map(|column| ColumnSchema {
                        name: column.name.clone(),
                        declared_type: column.declared_type.clone(),
                        description: column.description.clone(),
                    })
                    .collect(),
            })
            .collect()
    }

    pub fn join_graph(&self) -> Result<JoinGraph, CatalogError> {
        let mut edges = Vec::with_capacity(self.joins.edges.len());
        for edge in &self.joins.edges {
            edges.push(JoinEdge {
                from: ColumnRef::parse(&edge.from)?,
                to: ColumnRef::parse(&edge.to)?,
            });
        }
        let paths = self
            .joins
            .paths
            .iter()
            .map(|tables| JoinPath::new(tables.clone()))
            .collect();
        Ok(JoinGraph::new(edges, paths))
    }
}
