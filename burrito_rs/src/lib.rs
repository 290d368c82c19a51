//! Roll up a JSON API schema into a typed Rust client library.
//!
//! A run validates the schema, sends one sample request per route, infers data
//! types from the responses (and from example payloads for POST routes), builds a
//! code model, and renders it to Rust source.

mod assemble;
mod diagnostics;
mod emit;
mod error;
mod infer;
mod json_pointer;
mod model;
mod probe;
mod route;
mod schema;
mod settings;
mod validate;

pub use assemble::assemble;
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use emit::{IndexFile, Manifest, ManifestFile, emit};
pub use error::{
    BurritoError, InferenceError, SchemaValidationError, SchemaValidationIssue,
    SchemaValidationIssueKind,
};
pub use infer::{FieldSpec, Inferrer, TypeKind, TypeRecord, TypeRegistry};
pub use model::{
    ClassDef, ConstantDef, DATA_NAMESPACE, GLOBALS_CLASS, MethodDef, MethodVerb, Namespace,
    Project, ROOT_NAMESPACE,
};
pub use probe::Prober;
pub use route::{derive_method_name, effective_url, extract_path_variables, route_summary};
pub use schema::{
    HttpMethod, Route, RouteDocument, Schema, SchemaDocument, Section, SectionDocument,
};
pub use settings::GenerateSettings;
pub use validate::validate_schema;

use std::path::Path;
use std::time::Instant;

/// The outcome of a successful run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub manifest: Manifest,
    /// Number of generated class files.
    pub file_count: usize,
    /// Every diagnostic, in the order it was reported.
    pub diagnostics: Vec<Diagnostic>,
}

/// Runs the whole pipeline for the schema file at `schema_path`.
///
/// # Errors
///
/// Returns `BurritoError` if the file cannot be read, the schema is malformed or
/// invalid, or the model cannot be assembled. Per-route failures are diagnostics,
/// not errors.
pub async fn run(
    schema_path: impl AsRef<Path>,
    settings: &GenerateSettings,
) -> Result<Generation, BurritoError> {
    let schema_json: String = tokio::fs::read_to_string(schema_path).await?;
    run_from_str(&schema_json, settings).await
}

/// Runs the whole pipeline for a schema given as JSON text.
///
/// # Errors
///
/// Returns `BurritoError::JsonError` for malformed JSON and
/// `BurritoError::SchemaError` listing every validation issue.
pub async fn run_from_str(
    schema_json: &str,
    settings: &GenerateSettings,
) -> Result<Generation, BurritoError> {
    let document: SchemaDocument = serde_json::from_str(schema_json)?;
    let schema: Schema = validate_schema(document)?;
    run_schema(&schema, settings).await
}

/// Runs probing, inference, assembly, and emission for an already validated schema.
///
/// # Errors
///
/// Returns `BurritoError` if the HTTP client cannot be built or the model cannot be
/// assembled or rendered.
pub async fn run_schema(
    schema: &Schema,
    settings: &GenerateSettings,
) -> Result<Generation, BurritoError> {
    let started: Instant = Instant::now();
    let mut diagnostics: Diagnostics = Diagnostics::new();
    let project: Project = assemble(schema, settings, &mut diagnostics).await?;
    let manifest: Manifest = emit(project, settings)?;
    let file_count: usize = manifest.files.len();

    tracing::info!(
        project = %schema.name,
        classes = file_count,
        errors = diagnostics.count(Severity::Error),
        warnings = diagnostics.count(Severity::Warning),
        elapsed_secs = started.elapsed().as_secs_f64(),
        "Rolled up the API schema."
    );
    Ok(Generation {
        manifest,
        file_count,
        diagnostics: diagnostics.into_vec(),
    })
}
