use std::error;
use std::fmt;

/// Fatal error for a generation run. Any of these aborts before output is produced.
#[derive(Debug)]
pub enum BurritoError {
    /// Generic error with a message.
    GenericError(String),

    /// I/O error (e.g., reading the schema file, writing the generated tree).
    IoError(std::io::Error),

    /// The schema document is not valid JSON.
    JsonError(serde_json::Error),

    /// The schema parsed but failed validation.
    SchemaError(SchemaValidationError),

    /// The HTTP client used for probing could not be constructed.
    HttpClientError(reqwest::Error),

    /// The code model violated an internal invariant (e.g. a dangling type reference).
    AssemblyError(String),
}

impl error::Error for BurritoError {}

impl fmt::Display for BurritoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GenericError(message) => write!(f, "{message}"),
            Self::IoError(io_error) => fmt::Display::fmt(io_error, f),
            Self::JsonError(json_error) => write!(f, "Failed to load API schema: {json_error}"),
            Self::SchemaError(validation_error) => fmt::Display::fmt(validation_error, f),
            Self::HttpClientError(http_error) => {
                write!(f, "Failed to build HTTP client: {http_error}")
            }
            Self::AssemblyError(message) => write!(f, "Internal code model error: {message}"),
        }
    }
}

impl From<&str> for BurritoError {
    fn from(message: &str) -> Self {
        Self::GenericError(message.to_string())
    }
}

impl From<String> for BurritoError {
    fn from(message: String) -> Self {
        Self::GenericError(message)
    }
}

impl From<std::io::Error> for BurritoError {
    fn from(io_error: std::io::Error) -> Self {
        Self::IoError(io_error)
    }
}

impl From<serde_json::Error> for BurritoError {
    fn from(json_error: serde_json::Error) -> Self {
        Self::JsonError(json_error)
    }
}

impl From<SchemaValidationError> for BurritoError {
    fn from(validation_error: SchemaValidationError) -> Self {
        Self::SchemaError(validation_error)
    }
}

/// All issues found while validating a schema document.
#[derive(Debug)]
pub struct SchemaValidationError {
    pub issues: Vec<SchemaValidationIssue>,
}

impl error::Error for SchemaValidationError {}

impl fmt::Display for SchemaValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "API schema failed validation ({} issue", self.issues.len())?;
        if self.issues.len() != 1 {
            write!(f, "s")?;
        }
        write!(f, ")")?;
        for issue in &self.issues {
            write!(f, "\n  {issue}")?;
        }
        Ok(())
    }
}

/// A single validation failure, located by a JSON Pointer into the schema document.
#[derive(Debug)]
pub struct SchemaValidationIssue {
    pub path: String,
    pub kind: SchemaValidationIssueKind,
}

impl fmt::Display for SchemaValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "(root): {}", self.kind)
        } else {
            write!(f, "{}: {}", self.path, self.kind)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaValidationIssueKind {
    MissingName,
    InvalidName(String),
    MissingRoot,
    MissingSections,
    MissingSectionName,
    InvalidSectionName(String),
    DuplicateSectionName(String),
    MissingRoutes,
    MissingRouteUrl,
    InvalidRouteUrl(String),
    MissingResolvedUrl,
    DuplicateRouteVariable(String),
    MissingReturnedTypeName,
    InvalidReturnedTypeName(String),
    MissingHttpMethod,
    UnsupportedHttpMethod(String),
    MissingSentTypeName,
    InvalidSentTypeName(String),
    MissingExamplePayload,
    InvalidMethodName(String),
    DuplicateMethodName(String),
}

impl fmt::Display for SchemaValidationIssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "required schema property 'name' is missing"),
            Self::InvalidName(name) => write!(
                f,
                "invalid schema name '{name}', must only be alphanumeric or underscores"
            ),
            Self::MissingRoot => write!(f, "required schema property 'root' is missing"),
            Self::MissingSections => write!(f, "required schema property 'sections' is missing"),
            Self::MissingSectionName => write!(f, "section has no 'name'"),
            Self::InvalidSectionName(name) => write!(
                f,
                "invalid section name '{name}', must only be alphanumeric or underscores"
            ),
            Self::DuplicateSectionName(name) => {
                write!(f, "duplicate section name '{name}' detected")
            }
            Self::MissingRoutes => write!(f, "section has no 'routes'"),
            Self::MissingRouteUrl => write!(f, "no URL provided for route"),
            Self::InvalidRouteUrl(url) => write!(f, "invalid relative route provided ('{url}')"),
            Self::MissingResolvedUrl => write!(
                f,
                "routes with variables must include a 'validroute' with the variables filled out"
            ),
            Self::DuplicateRouteVariable(var) => {
                write!(f, "route variable '{var}' is declared more than once")
            }
            Self::MissingReturnedTypeName => {
                write!(f, "no 'returns' name given for data returned from route")
            }
            Self::InvalidReturnedTypeName(name) => write!(
                f,
                "invalid returned data name '{name}', must be a valid identifier"
            ),
            Self::MissingHttpMethod => write!(f, "no HTTP method ('type') provided for route"),
            Self::UnsupportedHttpMethod(verb) => {
                write!(f, "unsupported HTTP method '{verb}', expected GET or POST")
            }
            Self::MissingSentTypeName => write!(f, "POST route has no 'sends' data type name"),
            Self::InvalidSentTypeName(name) => write!(
                f,
                "invalid sent data name '{name}', must be a valid identifier"
            ),
            Self::MissingExamplePayload => write!(f, "POST route has no example 'data'"),
            Self::InvalidMethodName(name) => write!(
                f,
                "invalid method name override '{name}', must be a valid identifier"
            ),
            Self::DuplicateMethodName(name) => {
                write!(f, "method name '{name}' is generated by more than one route")
            }
        }
    }
}

/// Recoverable, per-route failure during type inference. The route is skipped.
#[derive(Debug)]
pub enum InferenceError {
    /// The probe request could not be sent or timed out.
    Request { url: String, source: reqwest::Error },

    /// The endpoint answered with a non-success status.
    Status { url: String, status: u16 },

    /// The response body was neither a JSON object nor a JSON array.
    InvalidResponse { url: String },

    /// The example payload could not be turned into a record type.
    UnsupportedPayload { type_name: String },
}

impl error::Error for InferenceError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Request { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl fmt::Display for InferenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request { url, source } => {
                write!(f, "failed to derive data from '{url}', request failed: {source}")
            }
            Self::Status { url, status } => {
                write!(f, "failed to derive data from '{url}', server answered {status}")
            }
            Self::InvalidResponse { url } => {
                write!(f, "failed to derive data from '{url}', invalid JSON response")
            }
            Self::UnsupportedPayload { type_name } => write!(
                f,
                "example data for '{type_name}' must be a JSON object to derive a type from"
            ),
        }
    }
}
