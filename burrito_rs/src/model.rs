//! In-memory model of the client library to generate.
//!
//! A [`Project`] holds ordered namespaces, each holding [`ClassDef`]s. Classes carry
//! fields (data types), constants (globals), and methods (section endpoints).
//! Nothing here knows how the model is rendered.

use crate::error::BurritoError;
use crate::infer::{FieldSpec, TypeKind, TypeRecord};
use crate::route;
use crate::schema::{HttpMethod, Route};

/// Namespace holding every inferred data type.
pub const DATA_NAMESPACE: &str = "Data";

/// The root namespace, holding section classes and the globals class.
pub const ROOT_NAMESPACE: &str = "@";

/// Conventional name of the class carrying the root URL.
pub const GLOBALS_CLASS: &str = "_globals";

/// Name of the root URL constant on the globals class.
pub const ROOT_URL_CONSTANT: &str = "ROOT_URL";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstantDef {
    pub name: String,
    pub value: String,
}

/// HTTP verb of a generated method. POST carries the name of the data type it sends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodVerb {
    Get,
    Post { sends: String },
}

impl MethodVerb {
    #[must_use]
    pub const fn http_method(&self) -> HttpMethod {
        match self {
            Self::Get => HttpMethod::Get,
            Self::Post { .. } => HttpMethod::Post,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDef {
    /// Derived method name without the `Async` suffix.
    pub base_name: String,
    pub verb: MethodVerb,
    /// URL template relative to the root URL.
    pub route: String,
    /// Path variables, in order of appearance.
    pub route_params: Vec<String>,
    pub returns: TypeKind,
    pub is_async: bool,
    pub summary: String,
}

impl MethodDef {
    /// Builds the method for `route` once its types are known.
    #[must_use]
    pub fn from_route(route: &Route, verb: MethodVerb, returns: TypeKind) -> Self {
        Self {
            base_name: route::base_method_name(route),
            verb,
            route: route.url_template.clone(),
            route_params: route::extract_path_variables(&route.url_template),
            returns,
            is_async: route.is_async,
            summary: route::route_summary(route),
        }
    }

    /// The method name, `Async`-suffixed when asynchronous.
    #[must_use]
    pub fn name(&self) -> String {
        route::with_async_suffix(&self.base_name, self.is_async)
    }

    /// Synchronous copy of this method; nothing else differs.
    #[must_use]
    pub fn sync_twin(&self) -> Self {
        Self {
            is_async: false,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDef {
    pub name: String,
    pub summary: Option<String>,
    pub fields: Vec<FieldSpec>,
    pub constants: Vec<ConstantDef>,
    pub methods: Vec<MethodDef>,
}

impl ClassDef {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            summary: None,
            fields: Vec::new(),
            constants: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// The class backing an inferred data type.
    #[must_use]
    pub fn from_record(record: TypeRecord) -> Self {
        Self {
            fields: record.fields,
            ..Self::new(&record.name)
        }
    }

    /// The class holding the project's root URL.
    #[must_use]
    pub fn globals(root_url: &str) -> Self {
        Self {
            constants: vec![ConstantDef {
                name: ROOT_URL_CONSTANT.to_string(),
                value: root_url.to_string(),
            }],
            ..Self::new(GLOBALS_CLASS)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub name: String,
    pub classes: Vec<ClassDef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    pub name: String,
    pub root_url: String,
    pub namespaces: Vec<Namespace>,
}

impl Project {
    #[must_use]
    pub fn new(name: &str, root_url: &str) -> Self {
        Self {
            name: name.to_string(),
            root_url: root_url.to_string(),
            namespaces: Vec::new(),
        }
    }

    /// Adds an empty namespace.
    ///
    /// # Errors
    ///
    /// Returns `BurritoError::AssemblyError` if a namespace with that name already exists.
    pub fn add_namespace(&mut self, name: &str) -> Result<(), BurritoError> {
        if self.namespace(name).is_some() {
            return Err(BurritoError::AssemblyError(format!(
                "a namespace named '{name}' already exists"
            )));
        }
        self.namespaces.push(Namespace {
            name: name.to_string(),
            classes: Vec::new(),
        });
        Ok(())
    }

    #[must_use]
    pub fn namespace(&self, name: &str) -> Option<&Namespace> {
        self.namespaces.iter().find(|ns| ns.name == name)
    }

    /// Appends `class` to the namespace `name`.
    ///
    /// # Errors
    ///
    /// Returns `BurritoError::AssemblyError` if the namespace does not exist.
    pub fn add_class(&mut self, namespace: &str, class: ClassDef) -> Result<(), BurritoError> {
        let Some(ns) = self.namespaces.iter_mut().find(|ns| ns.name == namespace) else {
            return Err(BurritoError::AssemblyError(format!(
                "no namespace named '{namespace}' to add class '{}' to",
                class.name
            )));
        };
        ns.classes.push(class);
        Ok(())
    }

    /// Within every namespace, appends `_` to later-declared classes until all names
    /// are unique. Earlier classes keep their names.
    pub fn resolve_collisions(&mut self) {
        for ns in &mut self.namespaces {
            let names: Vec<String> = ns.classes.iter().map(|c| c.name.clone()).collect();
            for (renamed, class) in resolve_names(&names).into_iter().zip(ns.classes.iter_mut()) {
                if renamed != class.name {
                    tracing::debug!(
                        namespace = %ns.name,
                        from = %class.name,
                        to = %renamed,
                        "Renamed colliding class."
                    );
                    class.name = renamed;
                }
            }
        }
    }

    /// Checks that every record a field or method refers to exists in the data namespace.
    ///
    /// # Errors
    ///
    /// Returns `BurritoError::AssemblyError` naming the first dangling reference.
    pub fn check_references(&self) -> Result<(), BurritoError> {
        let data: Option<&Namespace> = self.namespace(DATA_NAMESPACE);
        let exists = |name: &str| data.is_some_and(|ns| ns.classes.iter().any(|c| c.name == name));
        for ns in &self.namespaces {
            for class in &ns.classes {
                let field_refs = class.fields.iter().map(|f| &f.kind);
                let return_refs = class.methods.iter().map(|m| &m.returns);
                for kind in field_refs.chain(return_refs) {
                    if let TypeKind::Record(name) = kind.element()
                        && !exists(name)
                    {
                        return Err(BurritoError::AssemblyError(format!(
                            "class '{}' refers to missing data type '{name}'",
                            class.name
                        )));
                    }
                }
                for method in &class.methods {
                    if let MethodVerb::Post { ref sends } = method.verb
                        && !exists(sends)
                    {
                        return Err(BurritoError::AssemblyError(format!(
                            "method '{}' sends missing data type '{sends}'",
                            method.name()
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Makes `names` unique by suffixing later duplicates with `_`. A suffixed name is
/// also checked against every other name, so it never lands on an existing one.
#[must_use]
pub fn resolve_names(names: &[String]) -> Vec<String> {
    let mut resolved: Vec<String> = Vec::with_capacity(names.len());
    for (index, name) in names.iter().enumerate() {
        if !resolved.contains(name) {
            resolved.push(name.clone());
            continue;
        }
        let mut candidate: String = name.clone();
        while resolved.contains(&candidate) || names[index + 1..].contains(&candidate) {
            candidate.push('_');
        }
        resolved.push(candidate);
    }
    resolved
}
