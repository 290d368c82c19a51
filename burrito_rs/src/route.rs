//! Method names and URLs derived from route metadata.
//!
//! Everything here is pure: identical route metadata always yields identical output.

use crate::schema::Route;
use regress::Regex;
use std::sync::LazyLock;

/// A `{name}` placeholder in a URL template.
static PATH_VARIABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").expect("path variable pattern is valid"));

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("identifier pattern is valid"));

static URL_TEMPLATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_.0-9?=%#@/{}-]+$").expect("url template pattern is valid")
});

const ASYNC_SUFFIX: &str = "Async";

/// Returns true if `s` is non-empty and only alphanumeric or `_`.
#[must_use]
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.find(s).is_some()
}

/// Returns true if `s` only uses characters allowed in a relative route.
#[must_use]
pub fn is_valid_url_template(s: &str) -> bool {
    URL_TEMPLATE.find(s).is_some()
}

/// Names of the `{var}` placeholders in `template`, left to right.
/// Duplicates are kept so validation can report them.
#[must_use]
pub fn extract_path_variables(template: &str) -> Vec<String> {
    PATH_VARIABLE
        .find_iter(template)
        .filter_map(|m| m.group(1).map(|range| template[range].to_string()))
        .collect()
}

/// A piece of a URL template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateSegment<'a> {
    Literal(&'a str),
    /// Name of a `{var}` placeholder, without braces.
    Variable(&'a str),
}

/// Splits `template` into literal text and placeholders, left to right. Empty
/// literals are omitted.
#[must_use]
pub fn template_segments(template: &str) -> Vec<TemplateSegment<'_>> {
    let mut segments: Vec<TemplateSegment<'_>> = Vec::new();
    let mut last: usize = 0;
    for m in PATH_VARIABLE.find_iter(template) {
        let range = m.range();
        if range.start > last {
            segments.push(TemplateSegment::Literal(&template[last..range.start]));
        }
        if let Some(name) = m.group(1) {
            segments.push(TemplateSegment::Variable(&template[name]));
        }
        last = range.end;
    }
    if last < template.len() {
        segments.push(TemplateSegment::Literal(&template[last..]));
    }
    segments
}

/// `template` with every `{var}` placeholder removed.
fn strip_path_variables(template: &str) -> String {
    template_segments(template)
        .into_iter()
        .filter_map(|segment| match segment {
            TemplateSegment::Literal(text) => Some(text),
            TemplateSegment::Variable(_) => None,
        })
        .collect()
}

/// Uppercase the first character, leaving the rest untouched.
fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().chain(chars).collect(),
    }
}

/// Method name without the `Async` suffix.
///
/// An explicit override wins. Otherwise the verb prefix (`Get`/`Post`) is followed
/// by each path segment of the placeholder-free URL, query strings dropped and
/// first letter capitalized. The empty URL is the API root.
#[must_use]
pub fn base_method_name(route: &Route) -> String {
    if let Some(ref name) = route.method_name_override {
        return name.clone();
    }

    let prefix: &str = route.http_method.prefix();
    if route.url_template.is_empty() {
        return format!("{prefix}Root");
    }

    let cleaned: String = strip_path_variables(&route.url_template);
    let mut name: String = prefix.to_string();
    for part in cleaned.split('/') {
        let valid_part: &str = part.split_once('?').map_or(part, |(path, _)| path);
        name.push_str(&capitalize_first(valid_part));
    }
    name
}

/// Appends `Async` when `is_async` is set.
#[must_use]
pub fn with_async_suffix(base_name: &str, is_async: bool) -> String {
    if is_async {
        format!("{base_name}{ASYNC_SUFFIX}")
    } else {
        base_name.to_string()
    }
}

/// The generated method name for `route`.
#[must_use]
pub fn derive_method_name(route: &Route) -> String {
    with_async_suffix(&base_method_name(route), route.is_async)
}

/// The URL actually fetched when sampling: the resolved URL if the template has
/// placeholders, otherwise the template itself.
#[must_use]
pub fn effective_url(route: &Route) -> &str {
    match route.resolved_url_template {
        Some(ref resolved) if !extract_path_variables(&route.url_template).is_empty() => resolved,
        _ => &route.url_template,
    }
}

/// Doc summary: the route description, or `"<VERB>s /<url>/."`.
#[must_use]
pub fn route_summary(route: &Route) -> String {
    match route.description {
        Some(ref description) => description.clone(),
        None => format!("{}s /{}/.", route.http_method, route.url_template),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::HttpMethod;

    fn get(url: &str) -> Route {
        Route::new(HttpMethod::Get, url, "Thing")
    }

    #[test]
    fn extract_path_variables_in_order() {
        let actual: Vec<String> = extract_path_variables("users/{id}/posts/{postId}");
        let expected: Vec<String> = vec!["id".to_string(), "postId".to_string()];
        assert_eq!(expected, actual);
    }

    #[test]
    fn extract_path_variables_keeps_duplicates() {
        let actual: Vec<String> = extract_path_variables("a/{x}/b/{x}");
        assert_eq!(vec!["x".to_string(), "x".to_string()], actual);
    }

    #[test]
    fn extract_path_variables_none() {
        assert!(extract_path_variables("users/all").is_empty());
        assert!(extract_path_variables("users/{}").is_empty());
    }

    #[test]
    fn template_segments_split_literals_and_variables() {
        let actual: Vec<TemplateSegment<'_>> = template_segments("users/{id}/posts{x}");
        let expected: Vec<TemplateSegment<'_>> = vec![
            TemplateSegment::Literal("users/"),
            TemplateSegment::Variable("id"),
            TemplateSegment::Literal("/posts"),
            TemplateSegment::Variable("x"),
        ];
        assert_eq!(expected, actual);
        assert!(template_segments("").is_empty());
    }

    #[test]
    fn derive_method_name_strips_placeholders() {
        let route: Route = get("users/{id}/posts");
        assert_eq!("GetUsersPosts", derive_method_name(&route));
    }

    #[test]
    fn derive_method_name_async_suffix() {
        let route: Route = Route {
            is_async: true,
            ..get("users/{id}/posts")
        };
        assert_eq!("GetUsersPostsAsync", derive_method_name(&route));
    }

    #[test]
    fn derive_method_name_is_deterministic() {
        let route: Route = get("users/{id}/posts");
        assert_eq!(derive_method_name(&route), derive_method_name(&route.clone()));
    }

    #[test]
    fn derive_method_name_drops_query_string() {
        let route: Route = get("search?q=1/items");
        assert_eq!("GetSearchItems", derive_method_name(&route));
    }

    #[test]
    fn derive_method_name_root() {
        assert_eq!("GetRoot", derive_method_name(&get("")));
        let post: Route = Route::new(HttpMethod::Post, "", "Thing");
        assert_eq!("PostRoot", derive_method_name(&post));
    }

    #[test]
    fn derive_method_name_post_prefix() {
        let route: Route = Route::new(HttpMethod::Post, "users/create", "User");
        assert_eq!("PostUsersCreate", derive_method_name(&route));
    }

    #[test]
    fn derive_method_name_override() {
        let route: Route = Route {
            method_name_override: Some("FetchAll".to_string()),
            ..get("users")
        };
        assert_eq!("FetchAll", derive_method_name(&route));
        let async_route: Route = Route {
            is_async: true,
            ..route
        };
        assert_eq!("FetchAllAsync", derive_method_name(&async_route));
    }

    #[test]
    fn effective_url_uses_resolved_only_with_placeholders() {
        let with_vars: Route = Route {
            resolved_url_template: Some("users/7".to_string()),
            ..get("users/{id}")
        };
        assert_eq!("users/7", effective_url(&with_vars));

        let without_vars: Route = Route {
            resolved_url_template: Some("ignored".to_string()),
            ..get("users")
        };
        assert_eq!("users", effective_url(&without_vars));
    }

    #[test]
    fn route_summary_defaults_to_verb_and_url() {
        assert_eq!("GETs /users/.", route_summary(&get("users")));
        let described: Route = Route {
            description: Some("Lists users.".to_string()),
            ..get("users")
        };
        assert_eq!("Lists users.", route_summary(&described));
    }

    #[test]
    fn identifier_and_url_patterns() {
        assert!(is_identifier("Demo_1"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("has-dash"));
        assert!(!is_identifier("has space"));
        assert!(is_valid_url_template("users/{id}/posts?limit=10#top"));
        assert!(is_valid_url_template("a-b.c%20@d"));
        assert!(!is_valid_url_template("users list"));
        assert!(!is_valid_url_template("quote\"d"));
    }
}
