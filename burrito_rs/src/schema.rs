use serde::Deserialize;
use std::fmt;

/// The API schema document exactly as written.
///
/// Every key is optional here so that missing properties can be reported as
/// validation issues instead of a deserialization failure. See `validate.rs`
/// for the rules that turn this into a [`Schema`].
#[derive(Debug, Deserialize)]
pub struct SchemaDocument {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub root: Option<String>,

    #[serde(default)]
    pub sections: Option<Vec<SectionDocument>>,
}

#[derive(Debug, Deserialize)]
pub struct SectionDocument {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub routes: Option<Vec<RouteDocument>>,
}

#[derive(Debug, Deserialize)]
pub struct RouteDocument {
    #[serde(default, rename = "method")]
    pub method_name: Option<String>,

    #[serde(default, rename = "type")]
    pub http_method: Option<String>,

    #[serde(default, rename = "route")]
    pub relative_url: Option<String>,

    #[serde(default, rename = "validroute")]
    pub valid_url: Option<String>,

    #[serde(default, rename = "returns")]
    pub returned_data_name: Option<String>,

    #[serde(default, rename = "sends")]
    pub sent_data_name: Option<String>,

    /// `"data": null` is treated the same as an absent key.
    #[serde(default, rename = "data")]
    pub example_data: Option<serde_json::Value>,

    #[serde(default, rename = "async")]
    pub is_async: Option<bool>,

    #[serde(default, rename = "desc")]
    pub description: Option<String>,
}

/// A validated API schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    pub name: String,
    /// Base URL, always ending in `/`.
    pub root_path: String,
    pub sections: Vec<Section>,
}

/// One logical group of routes; becomes one generated class.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub name: String,
    pub routes: Vec<Route>,
}

/// One HTTP endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct Route {
    /// Relative URL, may contain `{var}` placeholders. Empty means the API root.
    pub url_template: String,
    pub http_method: HttpMethod,
    pub example_payload: Option<serde_json::Value>,
    pub returned_type_name: String,
    /// Always set for POST routes.
    pub sent_type_name: Option<String>,
    pub is_async: bool,
    pub description: Option<String>,
    pub method_name_override: Option<String>,
    /// Concrete URL used for sampling when the template has placeholders.
    pub resolved_url_template: Option<String>,
}

impl Route {
    /// A route with no example, override, description, or resolved URL.
    #[must_use]
    pub fn new(http_method: HttpMethod, url_template: &str, returned_type_name: &str) -> Self {
        Self {
            url_template: url_template.to_string(),
            http_method,
            example_payload: None,
            returned_type_name: returned_type_name.to_string(),
            sent_type_name: None,
            is_async: false,
            description: None,
            method_name_override: None,
            resolved_url_template: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Case-insensitive parse of `GET` / `POST`.
    #[must_use]
    pub fn parse(verb: &str) -> Option<Self> {
        if verb.eq_ignore_ascii_case("GET") {
            Some(Self::Get)
        } else if verb.eq_ignore_ascii_case("POST") {
            Some(Self::Post)
        } else {
            None
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }

    /// `Get` / `Post`, used as the method-name prefix.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Get => "Get",
            Self::Post => "Post",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_method_parse_is_case_insensitive() {
        assert_eq!(Some(HttpMethod::Get), HttpMethod::parse("get"));
        assert_eq!(Some(HttpMethod::Get), HttpMethod::parse("GET"));
        assert_eq!(Some(HttpMethod::Post), HttpMethod::parse("Post"));
        assert_eq!(None, HttpMethod::parse("PUT"));
        assert_eq!(None, HttpMethod::parse(""));
    }

    #[test]
    fn route_document_reads_schema_keys() {
        let json: &str = r#"{
            "method": "Fetch",
            "type": "POST",
            "route": "users/{id}",
            "validroute": "users/1",
            "returns": "User",
            "sends": "NewUser",
            "data": { "name": "a" },
            "async": true,
            "desc": "Creates a user."
        }"#;
        let route: RouteDocument = serde_json::from_str(json).unwrap();
        assert_eq!(Some("Fetch"), route.method_name.as_deref());
        assert_eq!(Some("POST"), route.http_method.as_deref());
        assert_eq!(Some("users/{id}"), route.relative_url.as_deref());
        assert_eq!(Some("users/1"), route.valid_url.as_deref());
        assert_eq!(Some("User"), route.returned_data_name.as_deref());
        assert_eq!(Some("NewUser"), route.sent_data_name.as_deref());
        assert_eq!(Some(serde_json::json!({ "name": "a" })), route.example_data);
        assert_eq!(Some(true), route.is_async);
        assert_eq!(Some("Creates a user."), route.description.as_deref());
    }

    #[test]
    fn null_example_data_is_absent() {
        let route: RouteDocument =
            serde_json::from_str(r#"{ "type": "GET", "route": "a", "data": null }"#).unwrap();
        assert!(route.example_data.is_none());
    }
}
