//! Whole-pipeline scenarios with scripted collaborators standing in for
//! the language model and the warehouse.

use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use asksql::catalog::{static_config::CatalogFile, CatalogError, SchemaCatalog};
use asksql::executor::{ExecutionError, QueryResult, WarehouseExecutor};
use asksql::generation::{guardrail::RejectionReason, GenerationError, SqlGenerator};
use asksql::prompt::{self, PromptContext};
use asksql::server::handlers::{answer_question, PipelineError};

struct ScriptedGenerator {
    completion: &'static str,
}

#[async_trait]
impl SqlGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &PromptContext) -> Result<String, GenerationError> {
        Ok(self.completion.to_string())
    }
}

/// Records every statement it is asked to run, so tests can assert the
/// executor saw exactly the validated text, or nothing at all.
#[derive(Default)]
struct RecordingExecutor {
    statements: Mutex<Vec<String>>,
}

impl RecordingExecutor {
    fn executed(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

#[async_trait]
impl WarehouseExecutor for RecordingExecutor {
    async fn execute(&self, sql: &str) -> Result<QueryResult, ExecutionError> {
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(QueryResult {
            columns: vec!["patient_id".to_string(), "gender".to_string()],
            data: vec![vec!["p-1".into(), "F".into()]],
        })
    }
}

const HMIS_DECLARATION: &str = r#"
tables:
  - name: patient
    description: Registered patients
    columns:
      - name: patient_id
        type: String
      - name: gender
        type: String
  - name: admission
    columns:
      - name: admission_id
        type: String
      - name: patient_id
        type: String
  - name: billing
    columns:
      - name: bill_id
        type: String
      - name: admission_id
        type: String
      - name: amount
        type: Float64
joins:
  edges:
    - from: admission.patient_id
      to: patient.patient_id
    - from: billing.admission_id
      to: admission.admission_id
  paths:
    - [patient, admission]
    - [patient, admission, billing]
"#;

fn hmis_catalog() -> SchemaCatalog {
    let file = CatalogFile::from_yaml_str(HMIS_DECLARATION).unwrap();
    SchemaCatalog::new(
        None,
        "hmis".to_string(),
        file.tables(),
        file.join_graph().unwrap(),
    )
    .unwrap()
}

#[tokio::test]
async fn fenced_select_flows_through_to_the_executor() {
    let catalog = hmis_catalog();
    let prompt = prompt::compile(&catalog, "show all patients");
    assert!(prompt.text.contains("patient"));
    assert!(prompt.text.contains("patient_id"));

    let generator = ScriptedGenerator {
        completion: "```sql\nSELECT * FROM patient\n```",
    };
    let executor = RecordingExecutor::default();

    let response = answer_question(
        &catalog,
        &generator,
        &executor,
        "show all patients",
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    assert_eq!(response.generated_sql, "SELECT * FROM patient");
    assert_eq!(executor.executed(), vec!["SELECT * FROM patient"]);
    assert_eq!(response.result.columns, vec!["patient_id", "gender"]);
    assert_eq!(response.result.data.len(), 1);
}

#[tokio::test]
async fn destructive_response_is_rejected_before_execution() {
    let generator = ScriptedGenerator {
        completion: "DROP TABLE patient;",
    };
    let executor = RecordingExecutor::default();

    let result = answer_question(
        &hmis_catalog(),
        &generator,
        &executor,
        "delete all patients",
        Uuid::new_v4(),
    )
    .await;

    assert!(matches!(
        result,
        Err(PipelineError::Rejected(RejectionReason::NotSelectOnly))
    ));
    assert!(executor.executed().is_empty());
}

#[tokio::test]
async fn prose_prefixed_response_executes_the_statement_only() {
    let generator = ScriptedGenerator {
        completion: "Here is the query: SELECT amount FROM billing WHERE bill_id = 1",
    };
    let executor = RecordingExecutor::default();

    let response = answer_question(
        &hmis_catalog(),
        &generator,
        &executor,
        "how much was bill 1",
        Uuid::new_v4(),
    )
    .await
    .unwrap();

    assert_eq!(
        response.generated_sql,
        "SELECT amount FROM billing WHERE bill_id = 1"
    );
    assert_eq!(
        executor.executed(),
        vec!["SELECT amount FROM billing WHERE bill_id = 1"]
    );
}

#[tokio::test]
async fn compiled_prompts_are_byte_identical_across_builds() {
    let first = prompt::compile(&hmis_catalog(), "show all patients");
    let second = prompt::compile(&hmis_catalog(), "show all patients");
    assert_eq!(first.text, second.text);
}

#[test]
fn declaration_without_tables_cannot_become_a_catalog() {
    let file = CatalogFile::from_yaml_str("joins:\n  paths: []\n").unwrap();
    let result = SchemaCatalog::new(
        None,
        "hmis".to_string(),
        file.tables(),
        file.join_graph().unwrap(),
    );
    assert!(matches!(result, Err(CatalogError::EmptySchema { .. })));
}

#[test]
fn declaration_with_dangling_join_edge_fails_to_build() {
    let file = CatalogFile::from_yaml_str(
        r#"
tables:
  - name: patient
    columns:
      - name: patient_id
        type: String
joins:
  edges:
    - from: billing.admission_id
      to: patient.patient_id
"#,
    )
    .unwrap();
    let result = SchemaCatalog::new(
        None,
        "hmis".to_string(),
        file.tables(),
        file.join_graph().unwrap(),
    );
    assert!(matches!(result, Err(CatalogError::UnknownTable { .. })));
}
