use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CatalogError {
    #[error("Schema introspection failed: {detail}")]
    Introspection { detail: String },

    #[error("Schema '{schema}' contains no tables")]
    EmptySchema { schema: String },

    #[error("Join reference '{reference}' is not of the form table.column")]
    MalformedColumnRef { reference: String },

    #[error("Join edge references unknown table '{table}'")]
    UnknownTable { table: String },

    #[error("Join edge references unknown column '{column}' on table '{table}'")]
    UnknownColumn { table: String, column: String },

    #[error("Join path {path:?} is invalid: {reason}")]
    InvalidPath { path: Vec<String>, reason: String },

    #[error("Duplicate table '{table}' in catalog declaration")]
    DuplicateTable { table: String },

    #[error("Duplicate column '{column}' on table '{table}'")]
    DuplicateColumn { table: String, column: String },

    #[error("Failed to read catalog file '{path}': {detail}")]
    ConfigRead { path: String, detail: String },

    #[error("Failed to parse catalog file '{path}': {detail}")]
    ConfigParse { path: String, detail: String },
}
