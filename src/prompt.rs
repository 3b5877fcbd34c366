//! Deterministic prompt compilation.
//!
//! The same catalog and question always compile to byte-identical text,
//! which keeps generation behavior reproducible across runs. Sections are
//! concatenated in a fixed order: preamble, warehouse identity, tables,
//! allowed joins, rules, question.

use crate::catalog::SchemaCatalog;

/// Compiled instruction text with the literal question appended at the
/// end. Created per request, sent once, never mutated.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptContext {
    pub text: String,
    pub estimated_tokens: usize,
}

const PREAMBLE: &str = "You are a SQL analyst for an analytical warehouse. Translate the user's \
question into one SQL query over the tables described below.";

const RULES: &str = "## Rules\n\
1. Only SELECT statements are permitted.\n\
2. INSERT, UPDATE, DELETE, DROP, ALTER and TRUNCATE are forbidden.\n\
3. Refer to every table by its fully qualified name exactly as listed.\n\
4. Combine tables only along the allowed join paths listed above.\n\
5. Never invent columns, tables or relationships that are not listed.\n\
6. Return only the SQL text, with no explanation and no formatting.";

/// Render the catalog, join graph, rule block and question into one
/// instruction string. An empty or whitespace-only question still
/// compiles; shaping input is the caller's concern, not ours.
pub fn compile(catalog: &SchemaCatalog, question: &str) -> PromptContext {
    let mut text = String::with_capacity(catalog.table_count() * 256);

    text.push_str(PREAMBLE);

    text.push_str("\n\n## Warehouse\n");
    if let Some(catalog_name) = catalog.catalog() {
        text.push_str(&format!("Catalog: {}\n", catalog_name));
    }
    text.push_str(&format!("Schema: {}\n", catalog.schema()));

    text.push_str("\n## Tables\n\n");
    for table in catalog.tables() {
        text.push_str(&format!("### {}\n", catalog.qualified_name(&table.name)));
        if let Some(description) = &table.description {
            text.push_str(&format!("{}\n", description));
        }
        text.push_str("Columns:\n");
        for column in &table.columns {
            match &column.description {
                Some(description) => text.push_str(&format!(
                    "  - {} {} -- {}\n",
                    column.name, column.declared_type, description
                )),
                None => text.push_str(&format!("  - {} {}\n", column.name, column.declared_type)),
            }
        }
        text.push('\n');
    }

    let joins = catalog.join_graph();
    text.push_str("## Allowed joins\n");
    if joins.is_empty() {
        text.push_str(
            "No join relationships are declared. Every query must read from exactly one table.\n",
        );
    } else {
        if !joins.edges().is_empty() {
            text.push_str("Join keys:\n");
            for edge in joins.edges() {
                text.push_str(&format!("  - {}\n", edge));
            }
        }
        if !joins.paths().is_empty() {
            text.push_str("Allowed join paths:\n");
            for path in joins.paths() {
                text.push_str(&format!("  - {}\n", path));
            }
        }
    }

    text.push('\n');
    text.push_str(RULES);
    text.push_str("\n\n## Question\n");
    text.push_str(question);

    // Rough token estimation: ~4 chars per token for English text
    let estimated_tokens = text.len() / 4;

    PromptContext {
        text,
        estimated_tokens,
    }
}
