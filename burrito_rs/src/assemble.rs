//! Builds the code model from a validated schema.
//!
//! Probes run concurrently but are collected in declaration order. Inference then
//! walks sections and routes in that same order on one task, returned type before
//! sent type, so registry names and collision suffixes are reproducible.

use crate::diagnostics::Diagnostics;
use crate::error::{BurritoError, InferenceError};
use crate::infer::{Inferrer, TypeKind, TypeRegistry};
use crate::model::{ClassDef, DATA_NAMESPACE, MethodDef, MethodVerb, Project, ROOT_NAMESPACE};
use crate::probe::Prober;
use crate::route;
use crate::schema::{HttpMethod, Route, Schema};
use crate::settings::GenerateSettings;
use futures_util::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, info};

/// The sent type name and example payload of a POST route, `None` for GET.
/// Fails before any request or registration when the example cannot describe a
/// record, so a skipped route leaves no trace in the registry.
fn sent_example(route: &Route) -> Result<Option<(&str, &Value)>, InferenceError> {
    match (route.http_method, &route.sent_type_name) {
        (HttpMethod::Get, _) => Ok(None),
        (HttpMethod::Post, Some(sent_type_name)) => match &route.example_payload {
            Some(payload @ Value::Object(_)) => Ok(Some((sent_type_name.as_str(), payload))),
            _ => Err(InferenceError::UnsupportedPayload {
                type_name: sent_type_name.clone(),
            }),
        },
        (HttpMethod::Post, None) => Err(InferenceError::UnsupportedPayload {
            type_name: route.returned_type_name.clone(),
        }),
    }
}

/// One route's sample request.
struct ProbeJob<'a> {
    route: &'a Route,
    url: String,
}

impl ProbeJob<'_> {
    async fn run(self, prober: &Prober) -> (String, Result<String, InferenceError>) {
        let body = match sent_example(self.route) {
            Ok(example) => {
                let payload: Option<&Value> = example.map(|(_, payload)| payload);
                prober.fetch(&self.url, self.route.http_method, payload).await
            }
            Err(error) => Err(error),
        };
        (self.url, body)
    }
}

/// Infers the method for one route from its probe result.
fn build_method(
    inferrer: &mut Inferrer<'_>,
    route: &Route,
    url: &str,
    body: Result<String, InferenceError>,
) -> Result<MethodDef, InferenceError> {
    let body: String = body?;
    let example: Option<(&str, &Value)> = sent_example(route)?;
    let returns: TypeKind = inferrer.infer_response(&route.returned_type_name, url, &body)?;
    let verb: MethodVerb = match example {
        Some((sent_type_name, payload)) => MethodVerb::Post {
            sends: inferrer.infer_example(sent_type_name, payload)?,
        },
        None => MethodVerb::Get,
    };
    Ok(MethodDef::from_route(route, verb, returns))
}

/// Probes every route, infers its types, and assembles the project. Routes whose
/// inference fails are skipped with an error diagnostic.
///
/// # Errors
///
/// Returns `BurritoError` if the HTTP client cannot be built or the model cannot
/// be assembled.
pub async fn assemble(
    schema: &Schema,
    settings: &GenerateSettings,
    diagnostics: &mut Diagnostics,
) -> Result<Project, BurritoError> {
    let prober: Prober = Prober::new(settings.probe_timeout)?;
    let jobs: Vec<ProbeJob<'_>> = schema
        .sections
        .iter()
        .flat_map(|section| section.routes.iter())
        .map(|route| ProbeJob {
            route,
            url: format!("{}{}", schema.root_path, route::effective_url(route)),
        })
        .collect();

    info!(
        routes = jobs.len(),
        concurrency = settings.probe_concurrency(),
        "Probing routes."
    );
    let probes: Vec<(String, Result<String, InferenceError>)> = stream::iter(jobs)
        .map(|job| job.run(&prober))
        .buffered(settings.probe_concurrency())
        .collect()
        .await;

    let mut registry: TypeRegistry = TypeRegistry::new();
    let mut probes = probes.into_iter();
    let mut section_classes: Vec<ClassDef> = Vec::with_capacity(schema.sections.len());
    {
        let mut inferrer: Inferrer<'_> = Inferrer::new(&mut registry, diagnostics);
        for section in &schema.sections {
            let mut class: ClassDef = ClassDef::new(&section.name);
            for route in &section.routes {
                let Some((url, body)) = probes.next() else {
                    return Err(BurritoError::AssemblyError(format!(
                        "no probe result for route '{}' in section '{}'",
                        route.url_template, section.name
                    )));
                };
                match build_method(&mut inferrer, route, &url, body) {
                    Ok(method) => {
                        debug!(section = %section.name, method = %method.name(), "Built method.");
                        class.methods.push(method);
                    }
                    Err(error) => inferrer.diagnostics().error(format!(
                        "Skipped route '{}' in '{}': {error}",
                        route.url_template, section.name
                    )),
                }
            }
            section_classes.push(class);
        }
    }

    let mut project: Project = Project::new(&schema.name, &schema.root_path);
    project.add_namespace(DATA_NAMESPACE)?;
    for record in registry.into_records() {
        project.add_class(DATA_NAMESPACE, ClassDef::from_record(record))?;
    }
    project.add_namespace(ROOT_NAMESPACE)?;
    for class in section_classes {
        project.add_class(ROOT_NAMESPACE, class)?;
    }
    Ok(project)
}
