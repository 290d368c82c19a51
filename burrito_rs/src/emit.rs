//! Renders the code model to Rust source text.
//!
//! The `Data` namespace becomes a `data/` module with one file per record; the root
//! namespace becomes one file per section class at the crate root, next to the
//! globals class holding the root URL.

use crate::error::BurritoError;
use crate::infer::{FieldSpec, TypeKind};
use crate::model::{
    ClassDef, ConstantDef, DATA_NAMESPACE, MethodDef, MethodVerb, Namespace, Project,
    ROOT_NAMESPACE, ROOT_URL_CONSTANT, resolve_names,
};
use crate::route::{self, TemplateSegment};
use crate::settings::GenerateSettings;
use heck::ToSnakeCase;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

const DATA_MODULE: &str = "data";

const RUST_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers.
const PATH_KEYWORDS: &[&str] = &["crate", "self", "Self", "super"];

/// Names every generated method already binds.
const RESERVED_PARAMS: &[&str] = &["client", "payload", "request_url"];

/// One generated class file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestFile {
    pub namespace: String,
    pub class_name: String,
    /// Relative to the output directory.
    pub path: PathBuf,
    pub source: String,
}

/// A module index (`lib.rs`, `data/mod.rs`) declaring the class modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexFile {
    pub path: PathBuf,
    pub source: String,
}

/// Everything the emitter produced for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    pub project_name: String,
    pub root_url: String,
    pub files: Vec<ManifestFile>,
    pub indexes: Vec<IndexFile>,
}

impl Manifest {
    /// The rendered source of a class, by namespace and final class name.
    #[must_use]
    pub fn source(&self, namespace: &str, class_name: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|f| f.namespace == namespace && f.class_name == class_name)
            .map(|f| f.source.as_str())
    }

    /// Writes every class file and module index under `dir`, creating directories
    /// as needed. Returns the number of files written.
    ///
    /// # Errors
    ///
    /// Returns `BurritoError::IoError` if a directory or file cannot be written.
    pub fn write_to_dir(&self, dir: impl AsRef<Path>) -> Result<usize, BurritoError> {
        let dir: &Path = dir.as_ref();
        let sources = self
            .files
            .iter()
            .map(|f| (&f.path, &f.source))
            .chain(self.indexes.iter().map(|i| (&i.path, &i.source)));

        let mut written: usize = 0;
        for (relative, source) in sources {
            let path: PathBuf = dir.join(relative);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&path, source)?;
            tracing::debug!(path = %path.display(), "Wrote generated file.");
            written += 1;
        }
        Ok(written)
    }
}

/// Replaces every character that cannot appear in an identifier with `_`.
fn sanitize_identifier(s: &str) -> String {
    s.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

/// Makes `name` a valid Rust identifier. Empty names become `fallback`, leading
/// digits get a `_` prefix, keywords are raw-escaped.
fn to_rust_ident(name: &str, fallback: &str) -> String {
    let mut ident: String = sanitize_identifier(name);
    if ident.is_empty() || ident == "_" {
        ident = fallback.to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if PATH_KEYWORDS.contains(&ident.as_str()) {
        ident.push('_');
    } else if RUST_KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    }
    ident
}

/// Module name for a class. Keywords get a `_` suffix since the name is also a
/// file stem. A name with no usable characters becomes `type_`.
fn to_module_name(class_name: &str) -> String {
    let mut module: String = sanitize_identifier(&class_name.to_ascii_lowercase());
    if module.is_empty() || module == "_" {
        module = "type".to_string();
    }
    if module.starts_with(|c: char| c.is_ascii_digit()) {
        module.insert(0, '_');
    }
    if RUST_KEYWORDS.contains(&module.as_str()) || PATH_KEYWORDS.contains(&module.as_str()) {
        module.push('_');
    }
    module
}

/// Identifier for a JSON key or path variable.
fn to_value_ident(name: &str, settings: &GenerateSettings) -> String {
    if settings.follow_naming_conventions {
        to_rust_ident(&name.to_snake_case(), "field")
    } else {
        to_rust_ident(name, "field")
    }
}

/// Resolves `names` with `reserved` claimed first; only the resolved `names` are returned.
fn resolve_names_after(reserved: &[&str], names: Vec<String>) -> Vec<String> {
    let mut all: Vec<String> = reserved.iter().map(|name| (*name).to_string()).collect();
    all.extend(names);
    resolve_names(&all).split_off(reserved.len())
}

/// Escape a string for use inside a Rust double-quoted literal.
fn escape_for_rust_str(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Module and type identifiers of one namespace's classes, in class order.
struct ClassSymbols {
    modules: Vec<String>,
    types: Vec<String>,
}

impl ClassSymbols {
    fn new(namespace: &Namespace, reserved_modules: &[&str]) -> Self {
        let modules: Vec<String> = resolve_names_after(
            reserved_modules,
            namespace
                .classes
                .iter()
                .map(|c| to_module_name(&c.name))
                .collect(),
        );
        let types: Vec<String> = resolve_names(
            &namespace
                .classes
                .iter()
                .map(|c| to_rust_ident(&c.name, "Type"))
                .collect::<Vec<String>>(),
        );
        Self { modules, types }
    }
}

/// Fully qualified paths of every data class, keyed by class name.
struct DataPaths(BTreeMap<String, String>);

impl DataPaths {
    fn rust_type(&self, kind: &TypeKind) -> Result<String, BurritoError> {
        let rendered: String = match kind {
            TypeKind::Boolean => "bool".to_string(),
            TypeKind::Integer => "i64".to_string(),
            TypeKind::Float => "f64".to_string(),
            TypeKind::String | TypeKind::Bytes => "String".to_string(),
            TypeKind::DateTime => "chrono::DateTime<chrono::FixedOffset>".to_string(),
            TypeKind::Uuid => "uuid::Uuid".to_string(),
            TypeKind::Empty => "serde_json::Value".to_string(),
            TypeKind::List(inner) => format!("Vec<{}>", self.rust_type(inner)?),
            TypeKind::Record(name) => self.path(name)?.to_string(),
        };
        Ok(rendered)
    }

    fn path(&self, class_name: &str) -> Result<&str, BurritoError> {
        self.0.get(class_name).map(String::as_str).ok_or_else(|| {
            BurritoError::AssemblyError(format!("no data class named '{class_name}'"))
        })
    }
}

fn emit_header<W: Write>(writer: &mut W, project: &Project) -> std::io::Result<()> {
    writeln!(
        writer,
        "//! Generated by burrito-rs from the `{}` API schema. Do not edit manually.",
        project.name
    )?;
    writeln!(writer)?;
    writeln!(writer, "#![allow(non_camel_case_types, non_snake_case)]")?;
    writeln!(writer)?;
    Ok(())
}

/// Emit a doc comment: each line becomes a `///` line prefixed by `line_prefix`.
fn emit_doc_comment<W: Write>(
    writer: &mut W,
    description: Option<&str>,
    line_prefix: &str,
) -> std::io::Result<()> {
    let Some(desc) = description else {
        return Ok(());
    };
    for line in desc.trim().lines() {
        writeln!(writer, "{line_prefix}/// {line}")?;
    }
    Ok(())
}

fn emit_data_class<W: Write>(
    writer: &mut W,
    class: &ClassDef,
    type_ident: &str,
    paths: &DataPaths,
    settings: &GenerateSettings,
) -> Result<(), BurritoError> {
    let idents: Vec<String> = resolve_names(
        &class
            .fields
            .iter()
            .map(|f| to_value_ident(&f.name, settings))
            .collect::<Vec<String>>(),
    );

    writeln!(writer, "use serde::{{Deserialize, Serialize}};")?;
    writeln!(writer)?;
    emit_doc_comment(writer, class.summary.as_deref(), "")?;
    writeln!(writer, "#[derive(Debug, Clone, Serialize, Deserialize)]")?;
    writeln!(writer, "pub struct {type_ident} {{")?;
    for (FieldSpec { name, kind }, ident) in class.fields.iter().zip(&idents) {
        if ident.trim_start_matches("r#") != name.as_str() {
            writeln!(writer, "    #[serde(rename = \"{}\")]", escape_for_rust_str(name))?;
        }
        writeln!(writer, "    pub {ident}: {},", paths.rust_type(kind)?)?;
    }
    writeln!(writer, "}}")?;
    Ok(())
}

/// The `format!` string building a method's URL, and one argument per path
/// variable. Literal braces are escaped.
fn url_format(method: &MethodDef, params: &[String]) -> (String, Vec<String>) {
    let mut format_string: String = "{root}".to_string();
    let mut arguments: Vec<String> = Vec::with_capacity(params.len());
    for segment in route::template_segments(&method.route) {
        match segment {
            TemplateSegment::Literal(text) => {
                format_string.push_str(&text.replace('{', "{{").replace('}', "}}"));
            }
            TemplateSegment::Variable(_) => {
                let index: usize = arguments.len();
                format_string.push_str(&format!("{{p{index}}}"));
                arguments.push(match params.get(index) {
                    Some(param) => format!("p{index} = {param}.unwrap_or_default()"),
                    None => format!("p{index} = \"\""),
                });
            }
        }
    }
    (format_string, arguments)
}

fn emit_method<W: Write>(
    writer: &mut W,
    method: &MethodDef,
    method_ident: &str,
    root_url: &str,
    paths: &DataPaths,
    settings: &GenerateSettings,
) -> Result<(), BurritoError> {
    let params: Vec<String> = resolve_names_after(
        RESERVED_PARAMS,
        method
            .route_params
            .iter()
            .map(|p| to_value_ident(p, settings))
            .collect(),
    );
    let (client_type, fn_keyword, awaited): (&str, &str, &str) = if method.is_async {
        ("reqwest::Client", "pub async fn", ".await")
    } else {
        ("reqwest::blocking::Client", "pub fn", "")
    };
    let returns: String = paths.rust_type(&method.returns)?;

    emit_doc_comment(writer, Some(&method.summary), "    ")?;
    writeln!(writer, "    {fn_keyword} {method_ident}(")?;
    writeln!(writer, "        client: &{client_type},")?;
    for param in &params {
        writeln!(writer, "        {param}: Option<&str>,")?;
    }
    if let MethodVerb::Post { ref sends } = method.verb {
        writeln!(writer, "        payload: &{},", paths.path(sends)?)?;
    }
    writeln!(writer, "    ) -> Result<{returns}, reqwest::Error> {{")?;

    let (format_string, arguments): (String, Vec<String>) = url_format(method, &params);
    writeln!(writer, "        let request_url: String = format!(")?;
    writeln!(writer, "            \"{}\",", escape_for_rust_str(&format_string))?;
    writeln!(writer, "            root = {root_url},")?;
    for argument in &arguments {
        writeln!(writer, "            {argument},")?;
    }
    writeln!(writer, "        );")?;

    writeln!(writer, "        client")?;
    match method.verb {
        MethodVerb::Get => writeln!(writer, "            .get(request_url)")?,
        MethodVerb::Post { .. } => {
            writeln!(writer, "            .post(request_url)")?;
            writeln!(writer, "            .json(payload)")?;
        }
    }
    writeln!(writer, "            .send(){awaited}?")?;
    writeln!(writer, "            .error_for_status()?")?;
    writeln!(writer, "            .json(){awaited}")?;
    writeln!(writer, "    }}")?;
    Ok(())
}

fn emit_constant<W: Write>(writer: &mut W, constant: &ConstantDef) -> std::io::Result<()> {
    writeln!(
        writer,
        "    pub const {}: &'static str = \"{}\";",
        constant.name,
        escape_for_rust_str(&constant.value)
    )
}

/// Synchronous twins go right before the async method they copy.
fn expand_methods(methods: &[MethodDef], settings: &GenerateSettings) -> Vec<MethodDef> {
    let mut expanded: Vec<MethodDef> = Vec::with_capacity(methods.len());
    for method in methods {
        if settings.generate_async_and_sync && method.is_async {
            expanded.push(method.sync_twin());
        }
        expanded.push(method.clone());
    }
    expanded
}

fn emit_root_class<W: Write>(
    writer: &mut W,
    class: &ClassDef,
    type_ident: &str,
    root_url: &str,
    paths: &DataPaths,
    settings: &GenerateSettings,
) -> Result<(), BurritoError> {
    let methods: Vec<MethodDef> = expand_methods(&class.methods, settings);
    let method_idents: Vec<String> = resolve_names(
        &methods
            .iter()
            .map(|m| to_rust_ident(&m.name().to_snake_case(), "call"))
            .collect::<Vec<String>>(),
    );

    emit_doc_comment(writer, class.summary.as_deref(), "")?;
    writeln!(writer, "pub struct {type_ident};")?;
    writeln!(writer)?;
    writeln!(writer, "impl {type_ident} {{")?;
    for constant in &class.constants {
        emit_constant(writer, constant)?;
    }
    for (index, (method, ident)) in methods.iter().zip(&method_idents).enumerate() {
        if index > 0 || !class.constants.is_empty() {
            writeln!(writer)?;
        }
        emit_method(writer, method, ident, root_url, paths, settings)?;
    }
    writeln!(writer, "}}")?;
    Ok(())
}

fn emit_index<W: Write>(
    writer: &mut W,
    project: &Project,
    modules: &[String],
) -> std::io::Result<()> {
    emit_header(writer, project)?;
    for module in modules {
        writeln!(writer, "pub mod {module};")?;
    }
    Ok(())
}

fn render<F>(emit: F) -> Result<String, BurritoError>
where
    F: FnOnce(&mut Vec<u8>) -> Result<(), BurritoError>,
{
    let mut buffer: Vec<u8> = Vec::new();
    emit(&mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| BurritoError::GenericError(format!("Generated source is not UTF-8: {e}")))
}

fn namespace<'a>(project: &'a Project, name: &str) -> Result<&'a Namespace, BurritoError> {
    project
        .namespace(name)
        .ok_or_else(|| BurritoError::AssemblyError(format!("the '{name}' namespace is missing")))
}

/// Injects the globals class, resolves class name collisions, checks references,
/// and renders every class.
///
/// # Errors
///
/// Returns `BurritoError::AssemblyError` if a namespace or referenced data class
/// is missing.
pub fn emit(mut project: Project, settings: &GenerateSettings) -> Result<Manifest, BurritoError> {
    let globals: ClassDef = ClassDef::globals(&project.root_url);
    project.add_class(ROOT_NAMESPACE, globals)?;
    project.resolve_collisions();
    project.check_references()?;

    let data: &Namespace = namespace(&project, DATA_NAMESPACE)?;
    let root: &Namespace = namespace(&project, ROOT_NAMESPACE)?;
    let data_symbols: ClassSymbols = ClassSymbols::new(data, &[]);
    let root_symbols: ClassSymbols = ClassSymbols::new(root, &[DATA_MODULE, "lib"]);

    let paths: DataPaths = DataPaths(
        data.classes
            .iter()
            .zip(data_symbols.modules.iter().zip(&data_symbols.types))
            .map(|(class, (module, ident))| {
                (class.name.clone(), format!("crate::{DATA_MODULE}::{module}::{ident}"))
            })
            .collect(),
    );
    let root_url: String = root
        .classes
        .iter()
        .zip(root_symbols.modules.iter().zip(&root_symbols.types))
        .find(|(class, _)| class.constants.iter().any(|c| c.name == ROOT_URL_CONSTANT))
        .map(|(_, (module, ident))| format!("crate::{module}::{ident}::{ROOT_URL_CONSTANT}"))
        .ok_or_else(|| BurritoError::AssemblyError("the globals class is missing".to_string()))?;

    let mut files: Vec<ManifestFile> = Vec::with_capacity(data.classes.len() + root.classes.len());
    let data_entries = data
        .classes
        .iter()
        .zip(&data_symbols.modules)
        .zip(&data_symbols.types);
    for ((class, module), ident) in data_entries {
        let source: String = render(|w| {
            emit_header(w, &project)?;
            emit_data_class(w, class, ident, &paths, settings)
        })?;
        files.push(ManifestFile {
            namespace: data.name.clone(),
            class_name: class.name.clone(),
            path: Path::new(DATA_MODULE).join(format!("{module}.rs")),
            source,
        });
    }
    let root_entries = root
        .classes
        .iter()
        .zip(&root_symbols.modules)
        .zip(&root_symbols.types);
    for ((class, module), ident) in root_entries {
        let source: String = render(|w| {
            emit_header(w, &project)?;
            emit_root_class(w, class, ident, &root_url, &paths, settings)
        })?;
        files.push(ManifestFile {
            namespace: root.name.clone(),
            class_name: class.name.clone(),
            path: PathBuf::from(format!("{module}.rs")),
            source,
        });
    }

    let mut root_modules: Vec<String> = vec![DATA_MODULE.to_string()];
    root_modules.extend(root_symbols.modules.iter().cloned());
    let indexes: Vec<IndexFile> = vec![
        IndexFile {
            path: PathBuf::from("lib.rs"),
            source: render(|w| Ok(emit_index(w, &project, &root_modules)?))?,
        },
        IndexFile {
            path: Path::new(DATA_MODULE).join("mod.rs"),
            source: render(|w| Ok(emit_index(w, &project, &data_symbols.modules)?))?,
        },
    ];

    tracing::info!(
        project = %project.name,
        classes = files.len(),
        "Rendered project."
    );
    Ok(Manifest {
        project_name: project.name.clone(),
        root_url: project.root_url.clone(),
        files,
        indexes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::GLOBALS_CLASS;
    use crate::schema::{HttpMethod, Route};

    fn field(name: &str, kind: TypeKind) -> FieldSpec {
        FieldSpec {
            name: name.to_string(),
            kind,
        }
    }

    fn record(name: &str) -> TypeKind {
        TypeKind::Record(name.to_string())
    }

    /// A project with data classes `User` and `User_posts`, and section `Users`.
    fn demo_project() -> Project {
        let mut project: Project = Project::new("Demo", "http://x/");
        project.add_namespace(DATA_NAMESPACE).unwrap();
        project.add_namespace(ROOT_NAMESPACE).unwrap();

        let mut posts: ClassDef = ClassDef::new("User_posts");
        posts.fields.push(field("title", TypeKind::String));
        project.add_class(DATA_NAMESPACE, posts).unwrap();

        let mut user: ClassDef = ClassDef::new("User");
        user.fields = vec![
            field("id", TypeKind::Integer),
            field("userName", TypeKind::String),
            field("type", TypeKind::Boolean),
            field("score", TypeKind::Float),
            field("createdAt", TypeKind::DateTime),
            field("guid", TypeKind::Uuid),
            field("avatar", TypeKind::Bytes),
            field("extra", TypeKind::Empty),
            field("tags", TypeKind::List(Box::new(TypeKind::Empty))),
            field("posts", TypeKind::List(Box::new(record("User_posts")))),
        ];
        project.add_class(DATA_NAMESPACE, user).unwrap();

        let mut section: ClassDef = ClassDef::new("Users");
        section.methods.push(MethodDef::from_route(
            &Route::new(HttpMethod::Get, "users/{id}", "User"),
            MethodVerb::Get,
            record("User"),
        ));
        project.add_class(ROOT_NAMESPACE, section).unwrap();
        project
    }

    #[test]
    fn rust_ident_rules() {
        assert_eq!("user_id", to_rust_ident("user_id", "field"));
        assert_eq!("r#type", to_rust_ident("type", "field"));
        assert_eq!("self_", to_rust_ident("self", "field"));
        assert_eq!("_1st", to_rust_ident("1st", "field"));
        assert_eq!("field", to_rust_ident("", "field"));
        assert_eq!("field", to_rust_ident("$", "field"));
        assert_eq!("a_b", to_rust_ident("a-b", "field"));
        assert_eq!("type_", to_module_name("Type"));
        assert_eq!("user_posts", to_module_name("User_posts"));
        assert_eq!("type_", to_module_name("_"));
        assert_eq!("type_", to_module_name(""));
    }

    #[test]
    fn data_class_fields_and_types() {
        let manifest: Manifest = emit(demo_project(), &GenerateSettings::default()).unwrap();
        let actual: &str = manifest.source(DATA_NAMESPACE, "User").unwrap();
        let expected: &str = r#"//! Generated by burrito-rs from the `Demo` API schema. Do not edit manually.

#![allow(non_camel_case_types, non_snake_case)]

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(rename = "userName")]
    pub user_name: String,
    pub r#type: bool,
    pub score: f64,
    #[serde(rename = "createdAt")]
    pub created_at: chrono::DateTime<chrono::FixedOffset>,
    pub guid: uuid::Uuid,
    pub avatar: String,
    pub extra: serde_json::Value,
    pub tags: Vec<serde_json::Value>,
    pub posts: Vec<crate::data::user_posts::User_posts>,
}
"#;
        assert_eq!(expected, actual);
    }

    #[test]
    fn raw_field_names_are_kept() {
        let settings: GenerateSettings = GenerateSettings {
            follow_naming_conventions: false,
            ..GenerateSettings::default()
        };
        let manifest: Manifest = emit(demo_project(), &settings).unwrap();
        let actual: &str = manifest.source(DATA_NAMESPACE, "User").unwrap();
        assert!(actual.contains("    pub userName: String,\n"));
        assert!(!actual.contains("rename = \"userName\""));
    }

    #[test]
    fn duplicate_field_idents_are_suffixed() {
        let mut project: Project = Project::new("Demo", "http://x/");
        project.add_namespace(DATA_NAMESPACE).unwrap();
        project.add_namespace(ROOT_NAMESPACE).unwrap();
        let mut thing: ClassDef = ClassDef::new("Thing");
        thing.fields = vec![
            field("a_b", TypeKind::Integer),
            field("a-b", TypeKind::Integer),
        ];
        project.add_class(DATA_NAMESPACE, thing).unwrap();

        let manifest: Manifest = emit(project, &GenerateSettings::default()).unwrap();
        let actual: &str = manifest.source(DATA_NAMESPACE, "Thing").unwrap();
        assert!(actual.contains("    pub a_b: i64,\n"));
        assert!(actual.contains("    #[serde(rename = \"a-b\")]\n    pub a_b_: i64,\n"));
    }

    #[test]
    fn section_method_builds_url_from_globals() {
        let manifest: Manifest = emit(demo_project(), &GenerateSettings::default()).unwrap();
        let actual: &str = manifest.source(ROOT_NAMESPACE, "Users").unwrap();
        let expected: &str = r#"//! Generated by burrito-rs from the `Demo` API schema. Do not edit manually.

#![allow(non_camel_case_types, non_snake_case)]

pub struct Users;

impl Users {
    /// GETs /users/{id}/.
    pub fn get_users(
        client: &reqwest::blocking::Client,
        id: Option<&str>,
    ) -> Result<crate::data::user::User, reqwest::Error> {
        let request_url: String = format!(
            "{root}users/{p0}",
            root = crate::_globals::_globals::ROOT_URL,
            p0 = id.unwrap_or_default(),
        );
        client
            .get(request_url)
            .send()?
            .error_for_status()?
            .json()
    }
}
"#;
        assert_eq!(expected, actual);
    }

    #[test]
    fn post_method_sends_payload_and_async_awaits() {
        let mut project: Project = demo_project();
        let route: Route = Route {
            is_async: true,
            sent_type_name: Some("User".to_string()),
            ..Route::new(HttpMethod::Post, "users/{client}", "User")
        };
        let method: MethodDef = MethodDef::from_route(
            &route,
            MethodVerb::Post {
                sends: "User".to_string(),
            },
            TypeKind::List(Box::new(record("User"))),
        );
        project.namespaces[1].classes[0].methods = vec![method];

        let manifest: Manifest = emit(project, &GenerateSettings::default()).unwrap();
        let actual: &str = manifest.source(ROOT_NAMESPACE, "Users").unwrap();
        assert!(actual.contains("    pub async fn post_users_async(\n"));
        assert!(actual.contains("        client: &reqwest::Client,\n        client_: Option<&str>,"));
        assert!(actual.contains("        payload: &crate::data::user::User,\n"));
        assert!(actual.contains(") -> Result<Vec<crate::data::user::User>, reqwest::Error> {"));
        assert!(actual.contains("            p0 = client_.unwrap_or_default(),\n"));
        assert!(actual.contains("            .post(request_url)\n            .json(payload)\n"));
        assert!(actual.contains("            .send().await?\n"));
        assert!(actual.contains("            .json().await\n"));
    }

    #[test]
    fn sync_twin_is_emitted_before_async_method() {
        let mut project: Project = demo_project();
        project.namespaces[1].classes[0].methods[0].is_async = true;
        let settings: GenerateSettings = GenerateSettings {
            generate_async_and_sync: true,
            ..GenerateSettings::default()
        };

        let manifest: Manifest = emit(project, &settings).unwrap();
        let actual: &str = manifest.source(ROOT_NAMESPACE, "Users").unwrap();
        let sync_at: usize = actual.find("pub fn get_users(").unwrap();
        let async_at: usize = actual.find("pub async fn get_users_async(").unwrap();
        assert!(sync_at < async_at);
    }

    #[test]
    fn async_only_without_twin_setting() {
        let mut project: Project = demo_project();
        project.namespaces[1].classes[0].methods[0].is_async = true;

        let manifest: Manifest = emit(project, &GenerateSettings::default()).unwrap();
        let actual: &str = manifest.source(ROOT_NAMESPACE, "Users").unwrap();
        assert!(!actual.contains("pub fn get_users("));
        assert!(actual.contains("pub async fn get_users_async("));
    }

    #[test]
    fn literal_braces_in_route_are_escaped() {
        let method: MethodDef = MethodDef::from_route(
            &Route::new(HttpMethod::Get, "a/{}/{id}", "User"),
            MethodVerb::Get,
            record("User"),
        );
        let (format_string, arguments) = url_format(&method, &["id".to_string()]);
        assert_eq!("{root}a/{{}}/{p0}", format_string);
        assert_eq!(vec!["p0 = id.unwrap_or_default()".to_string()], arguments);
    }

    #[test]
    fn globals_class_is_collision_resolved() {
        let mut project: Project = demo_project();
        project
            .add_class(ROOT_NAMESPACE, ClassDef::new(GLOBALS_CLASS))
            .unwrap();

        let manifest: Manifest = emit(project, &GenerateSettings::default()).unwrap();
        let globals: &str = manifest.source(ROOT_NAMESPACE, "_globals_").unwrap();
        assert!(globals.contains("pub struct _globals_;"));
        assert!(globals.contains("    pub const ROOT_URL: &'static str = \"http://x/\";\n"));

        let users: &str = manifest.source(ROOT_NAMESPACE, "Users").unwrap();
        assert!(users.contains("root = crate::_globals_::_globals_::ROOT_URL,"));
    }

    #[test]
    fn root_modules_avoid_data_and_lib() {
        let mut project: Project = demo_project();
        project.add_class(ROOT_NAMESPACE, ClassDef::new("Data")).unwrap();
        project.add_class(ROOT_NAMESPACE, ClassDef::new("Lib")).unwrap();

        let manifest: Manifest = emit(project, &GenerateSettings::default()).unwrap();
        let paths: Vec<PathBuf> = manifest
            .files
            .iter()
            .filter(|f| f.namespace == ROOT_NAMESPACE)
            .map(|f| f.path.clone())
            .collect();
        let expected: Vec<PathBuf> = vec![
            PathBuf::from("users.rs"),
            PathBuf::from("data_.rs"),
            PathBuf::from("lib_.rs"),
            PathBuf::from("_globals.rs"),
        ];
        assert_eq!(expected, paths);

        let lib: &IndexFile = &manifest.indexes[0];
        assert_eq!(PathBuf::from("lib.rs"), lib.path);
        assert!(lib.source.contains("pub mod data;\npub mod users;\npub mod data_;\n"));
    }

    #[test]
    fn underscore_class_gets_fallback_module_and_type() {
        let mut project: Project = demo_project();
        project.add_class(DATA_NAMESPACE, ClassDef::new("_")).unwrap();

        let manifest: Manifest = emit(project, &GenerateSettings::default()).unwrap();
        let file: &ManifestFile = manifest
            .files
            .iter()
            .find(|f| f.namespace == DATA_NAMESPACE && f.class_name == "_")
            .unwrap();
        assert_eq!(PathBuf::from("data/type_.rs"), file.path);
        assert!(file.source.contains("pub struct Type {"));

        let data_index: &IndexFile = &manifest.indexes[1];
        assert!(data_index.source.ends_with("pub mod user;\npub mod type_;\n"));
    }

    #[test]
    fn dangling_record_fails_emission() {
        let mut project: Project = Project::new("Demo", "http://x/");
        project.add_namespace(DATA_NAMESPACE).unwrap();
        project.add_namespace(ROOT_NAMESPACE).unwrap();
        let mut thing: ClassDef = ClassDef::new("Thing");
        thing.fields.push(field("other", record("Missing")));
        project.add_class(DATA_NAMESPACE, thing).unwrap();

        let actual: Result<Manifest, BurritoError> = emit(project, &GenerateSettings::default());
        assert!(matches!(actual, Err(BurritoError::AssemblyError(_))));
    }

    #[test]
    fn write_to_dir_writes_classes_and_indexes() {
        let manifest: Manifest = emit(demo_project(), &GenerateSettings::default()).unwrap();
        let dir: tempfile::TempDir = tempfile::tempdir().unwrap();

        let written: usize = manifest.write_to_dir(dir.path()).unwrap();
        assert_eq!(manifest.files.len() + 2, written);
        for relative in ["lib.rs", "users.rs", "_globals.rs", "data/mod.rs", "data/user.rs"] {
            assert!(dir.path().join(relative).is_file(), "{relative} missing");
        }
        let data_index: String = std::fs::read_to_string(dir.path().join("data/mod.rs")).unwrap();
        assert!(data_index.ends_with("pub mod user_posts;\npub mod user;\n"));
    }
}
