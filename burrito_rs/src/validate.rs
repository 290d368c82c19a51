//! Schema validation.
//!
//! Walks the parsed schema document and collects every issue before failing,
//! so a caller sees all of them at once. Any issue aborts the whole run.

use crate::error::{SchemaValidationError, SchemaValidationIssue, SchemaValidationIssueKind};
use crate::json_pointer::Pointer;
use crate::route;
use crate::schema::{
    HttpMethod, Route, RouteDocument, Schema, SchemaDocument, Section, SectionDocument,
};
use std::collections::BTreeSet;

fn push_issue(
    issues: &mut Vec<SchemaValidationIssue>,
    path: &Pointer,
    kind: SchemaValidationIssueKind,
) {
    issues.push(SchemaValidationIssue {
        path: path.to_string(),
        kind,
    });
}

/// Appends `/` to the root URL if it is missing.
fn normalize_root(root: &str) -> String {
    if root.ends_with('/') {
        root.to_string()
    } else {
        format!("{root}/")
    }
}

/// Parses and validates a schema document.
///
/// # Errors
///
/// Returns `SchemaValidationError` with every issue found.
pub fn validate_schema(document: SchemaDocument) -> Result<Schema, SchemaValidationError> {
    let mut issues: Vec<SchemaValidationIssue> = Vec::new();
    let root: Pointer = Pointer::root();

    match document.name {
        None => push_issue(&mut issues, &root, SchemaValidationIssueKind::MissingName),
        Some(ref name) if !route::is_identifier(name) => push_issue(
            &mut issues,
            &root.key("name"),
            SchemaValidationIssueKind::InvalidName(name.clone()),
        ),
        Some(_) => {}
    }
    if document.root.is_none() {
        push_issue(&mut issues, &root, SchemaValidationIssueKind::MissingRoot);
    }
    if document.sections.is_none() {
        push_issue(&mut issues, &root, SchemaValidationIssueKind::MissingSections);
    }

    let mut sections: Vec<Section> = Vec::new();
    let mut section_names: BTreeSet<String> = BTreeSet::new();
    let sections_path: Pointer = root.key("sections");
    for (index, section_document) in document.sections.unwrap_or_default().into_iter().enumerate()
    {
        let path: Pointer = sections_path.index(index);
        if let Some(ref name) = section_document.name
            && !section_names.insert(name.clone())
        {
            push_issue(
                &mut issues,
                &path.key("name"),
                SchemaValidationIssueKind::DuplicateSectionName(name.clone()),
            );
        }
        if let Some(section) = validate_section(section_document, &path, &mut issues) {
            sections.push(section);
        }
    }

    match (document.name, document.root) {
        (Some(name), Some(root_path)) if issues.is_empty() => Ok(Schema {
            name,
            root_path: normalize_root(&root_path),
            sections,
        }),
        _ => Err(SchemaValidationError { issues }),
    }
}

fn validate_section(
    document: SectionDocument,
    path: &Pointer,
    issues: &mut Vec<SchemaValidationIssue>,
) -> Option<Section> {
    match document.name {
        None => push_issue(issues, path, SchemaValidationIssueKind::MissingSectionName),
        Some(ref name) if !route::is_identifier(name) => push_issue(
            issues,
            &path.key("name"),
            SchemaValidationIssueKind::InvalidSectionName(name.clone()),
        ),
        Some(_) => {}
    }
    let Some(route_documents) = document.routes else {
        push_issue(issues, path, SchemaValidationIssueKind::MissingRoutes);
        return None;
    };

    let mut routes: Vec<Route> = Vec::new();
    let mut method_names: BTreeSet<String> = BTreeSet::new();
    let routes_path: Pointer = path.key("routes");
    for (index, route_document) in route_documents.into_iter().enumerate() {
        let route_path: Pointer = routes_path.index(index);
        if let Some(route) = validate_route(route_document, &route_path, issues) {
            let method_name: String = route::derive_method_name(&route);
            if !method_names.insert(method_name.clone()) {
                push_issue(
                    issues,
                    &route_path,
                    SchemaValidationIssueKind::DuplicateMethodName(method_name),
                );
            }
            routes.push(route);
        }
    }

    Some(Section {
        name: document.name?,
        routes,
    })
}

/// POST routes must name their sent type and carry an example payload.
fn validate_post_fields(
    document: &RouteDocument,
    path: &Pointer,
    issues: &mut Vec<SchemaValidationIssue>,
) {
    match document.sent_data_name {
        None => push_issue(issues, path, SchemaValidationIssueKind::MissingSentTypeName),
        Some(ref name) if !route::is_identifier(name) => push_issue(
            issues,
            &path.key("sends"),
            SchemaValidationIssueKind::InvalidSentTypeName(name.clone()),
        ),
        Some(_) => {}
    }
    if document.example_data.is_none() {
        push_issue(
            issues,
            path,
            SchemaValidationIssueKind::MissingExamplePayload,
        );
    }
}

/// Validates a single route. Returns `None` if any issue was pushed.
fn validate_route(
    document: RouteDocument,
    path: &Pointer,
    issues: &mut Vec<SchemaValidationIssue>,
) -> Option<Route> {
    let issues_before: usize = issues.len();

    match document.relative_url {
        None => push_issue(issues, path, SchemaValidationIssueKind::MissingRouteUrl),
        Some(ref url) => {
            if !url.is_empty() && !route::is_valid_url_template(url) {
                push_issue(
                    issues,
                    &path.key("route"),
                    SchemaValidationIssueKind::InvalidRouteUrl(url.clone()),
                );
            }
            let variables: Vec<String> = route::extract_path_variables(url);
            if !variables.is_empty() && document.valid_url.is_none() {
                push_issue(issues, path, SchemaValidationIssueKind::MissingResolvedUrl);
            }
            let mut seen: BTreeSet<&str> = BTreeSet::new();
            for variable in &variables {
                if !seen.insert(variable.as_str()) {
                    push_issue(
                        issues,
                        &path.key("route"),
                        SchemaValidationIssueKind::DuplicateRouteVariable(variable.clone()),
                    );
                }
            }
        }
    }

    match document.returned_data_name {
        None => push_issue(
            issues,
            path,
            SchemaValidationIssueKind::MissingReturnedTypeName,
        ),
        Some(ref name) if !route::is_identifier(name) => push_issue(
            issues,
            &path.key("returns"),
            SchemaValidationIssueKind::InvalidReturnedTypeName(name.clone()),
        ),
        Some(_) => {}
    }

    if let Some(ref name) = document.method_name
        && !route::is_identifier(name)
    {
        push_issue(
            issues,
            &path.key("method"),
            SchemaValidationIssueKind::InvalidMethodName(name.clone()),
        );
    }

    let http_method: Option<HttpMethod> = match document.http_method {
        None => {
            push_issue(issues, path, SchemaValidationIssueKind::MissingHttpMethod);
            None
        }
        Some(ref verb) => {
            let parsed: Option<HttpMethod> = HttpMethod::parse(verb);
            if parsed.is_none() {
                push_issue(
                    issues,
                    &path.key("type"),
                    SchemaValidationIssueKind::UnsupportedHttpMethod(verb.clone()),
                );
            }
            parsed
        }
    };

    if http_method == Some(HttpMethod::Post) {
        validate_post_fields(&document, path, issues);
    }

    if issues.len() != issues_before {
        return None;
    }

    Some(Route {
        url_template: document.relative_url?,
        http_method: http_method?,
        example_payload: document.example_data,
        returned_type_name: document.returned_data_name?,
        sent_type_name: document.sent_data_name,
        is_async: document.is_async.unwrap_or(false),
        description: document.description,
        method_name_override: document.method_name,
        resolved_url_template: document.valid_url,
    })
}
