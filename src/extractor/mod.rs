//! Route extraction from Rust web projects.
//!
//! Turns parsed source files into an [`Application`] the documentation
//! pipeline can read without a running server. Framework-specific
//! extractors find the URL registrations; this module indexes the handler
//! functions and resource implementations they point at, with their `///`
//! docs and source text, and joins the two.
//!
//! # Supported Frameworks
//!
//! - **Axum**: See [`axum::AxumExtractor`]
//! - **Actix-Web**: See [`actix::ActixExtractor`]
//!
//! Resources (`impl Resource for X` registered with `.add_resource(X, ...)`)
//! are recognized regardless of framework.
//!
//! # Example
//!
//! ```no_run
//! use routedoc::cli::Framework;
//! use routedoc::extractor::build_application;
//! use routedoc::parser::ParsedFile;
//!
//! let source = std::fs::read_to_string("src/api.rs").unwrap();
//! let parsed = ParsedFile::from_source("src/api.rs", Some("api"), &source).unwrap();
//! let app = build_application(&[parsed], &[Framework::Axum]);
//! ```

pub mod actix;
pub mod axum;

use crate::cli::Framework;
use crate::parser::ParsedFile;
use crate::registry::{Application, Handler, Resource, RouteSource};
use log::{debug, info, warn};
use std::collections::HashMap;
use syn::spanned::Spanned;
use syn::visit::{self, Visit};
use syn::{Attribute, Expr, ExprMethodCall, ImplItem, ItemFn, ItemImpl, ItemMod, ItemStruct, Lit};

/// Trait for extracting URL registrations from parsed Rust files.
///
/// Implementations know one framework's way of binding URLs to handler
/// functions. They see every file at once since routers and handlers are
/// usually defined in different modules.
pub trait RouteExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteInfo>;
}

/// What a registration points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerTarget {
    /// A handler function, by name
    Function(String),
    /// A resource type, by name
    Resource(String),
}

/// One URL registration found in source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteInfo {
    pub path: String,
    /// Upper-case HTTP methods; empty for resources, which bring their own
    pub methods: Vec<String>,
    pub target: HandlerTarget,
    /// Module qualifying the handler path (`api::add_data`), or else the
    /// module of the file holding the registration
    pub module: Option<String>,
}

impl RouteInfo {
    pub fn function(
        path: impl Into<String>,
        methods: Vec<String>,
        handler: impl Into<String>,
        module: Option<String>,
    ) -> Self {
        Self {
            path: path.into(),
            methods,
            target: HandlerTarget::Function(handler.into()),
            module,
        }
    }

    pub fn resource(path: impl Into<String>, resource: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            methods: Vec::new(),
            target: HandlerTarget::Resource(resource.into()),
            module: None,
        }
    }
}

/// Upper-case verb for a lower-case routing function or method name.
pub fn http_method(name: &str) -> Option<String> {
    match name.to_ascii_lowercase().as_str() {
        verb @ ("get" | "post" | "put" | "delete" | "patch" | "head" | "options") => {
            Some(verb.to_ascii_uppercase())
        }
        _ => None,
    }
}

/// Joins the `///` lines of `attrs` into a docstring.
pub fn doc_comment(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            syn::Meta::NameValue(nv) => match &nv.value {
                Expr::Lit(expr_lit) => match &expr_lit.lit {
                    Lit::Str(s) => Some(s.value()),
                    _ => None,
                },
                _ => None,
            },
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').map(str::to_string).unwrap_or(line))
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

/// Extracts a string literal from an expression.
pub fn string_literal(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Lit(expr_lit) => match &expr_lit.lit {
            Lit::Str(lit_str) => Some(lit_str.value()),
            _ => None,
        },
        Expr::Reference(reference) => string_literal(&reference.expr),
        _ => None,
    }
}

/// Joins a mount prefix and a rule, with exactly one slash between them.
pub fn combine_paths(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }

    let prefix = prefix.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        prefix.to_string()
    } else {
        format!("{}/{}", prefix, path)
    }
}

/// Splits a handler path into its qualifying module and its name:
/// `api::add_data` is `(Some("api"), "add_data")`.
pub fn handler_path(path: &syn::Path) -> Option<(Option<String>, String)> {
    let mut segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
    let name = segments.pop()?;
    let module = segments
        .into_iter()
        .rev()
        .find(|s| !matches!(s.as_str(), "crate" | "self" | "super"));
    Some((module, name))
}

fn item_source(file: &ParsedFile, item: &impl Spanned) -> String {
    let span = item.span();
    file.lines(span.start().line, span.end().line)
}

#[derive(Debug, Clone)]
struct IndexedFn {
    module: Option<String>,
    handler: Handler,
}

/// Every function, struct doc and resource implementation in the project.
#[derive(Debug, Default)]
pub struct HandlerIndex {
    functions: HashMap<String, Vec<IndexedFn>>,
    struct_docs: HashMap<String, String>,
    resources: HashMap<String, Vec<(String, Handler)>>,
}

impl HandlerIndex {
    pub fn build(parsed_files: &[ParsedFile]) -> Self {
        let mut index = HandlerIndex::default();
        for file in parsed_files {
            let mut visitor = IndexVisitor {
                file,
                module: file.module.clone(),
                index: &mut index,
            };
            visitor.visit_file(&file.syntax_tree);
        }
        debug!(
            "Indexed {} function names and {} resources",
            index.functions.len(),
            index.resources.len()
        );
        index
    }

    /// Finds `name`, preferring the definition in `module`.
    ///
    /// Returns the module the function lives in along with its handler.
    pub fn function(&self, module: Option<&str>, name: &str) -> Option<(Option<&str>, &Handler)> {
        let candidates = self.functions.get(name)?;
        let found = candidates
            .iter()
            .find(|f| f.module.as_deref() == module)
            .or_else(|| candidates.first())?;
        Some((found.module.as_deref(), &found.handler))
    }

    /// Builds the resource named `name` from its implementation.
    pub fn resource(&self, name: &str) -> Option<Resource> {
        let methods = self.resources.get(name)?;
        let mut resource = Resource::new(name);
        if let Some(doc) = self.struct_docs.get(name) {
            resource = resource.with_doc(doc.clone());
        }
        for (verb, handler) in methods {
            resource = resource.method(verb, handler.clone());
        }
        Some(resource)
    }
}

struct IndexVisitor<'a> {
    file: &'a ParsedFile,
    module: Option<String>,
    index: &'a mut HandlerIndex,
}

impl<'ast> Visit<'ast> for IndexVisitor<'_> {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        let name = node.sig.ident.to_string();
        let mut handler = Handler::new(&name).with_source(item_source(self.file, node));
        if let Some(doc) = doc_comment(&node.attrs) {
            handler = handler.with_doc(doc);
        }
        self.index.functions.entry(name).or_default().push(IndexedFn {
            module: self.module.clone(),
            handler,
        });
        visit::visit_item_fn(self, node);
    }

    fn visit_item_struct(&mut self, node: &'ast ItemStruct) {
        if let Some(doc) = doc_comment(&node.attrs) {
            self.index.struct_docs.insert(node.ident.to_string(), doc);
        }
        visit::visit_item_struct(self, node);
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        let is_resource = node
            .trait_
            .as_ref()
            .and_then(|(_, path, _)| path.segments.last())
            .is_some_and(|seg| seg.ident == "Resource" || seg.ident == "MethodView");
        let self_name = match node.self_ty.as_ref() {
            syn::Type::Path(type_path) => {
                type_path.path.segments.last().map(|s| s.ident.to_string())
            }
            _ => None,
        };

        if let (true, Some(self_name)) = (is_resource, self_name) {
            let mut methods = Vec::new();
            for item in &node.items {
                let ImplItem::Fn(method) = item else { continue };
                let fn_name = method.sig.ident.to_string();
                let Some(verb) = http_method(&fn_name) else {
                    debug!("Skipping non-verb method {}::{}", self_name, fn_name);
                    continue;
                };
                let mut handler = Handler::new(fn_name).with_source(item_source(self.file, method));
                if let Some(doc) = doc_comment(&method.attrs) {
                    handler = handler.with_doc(doc);
                }
                methods.push((verb, handler));
            }
            debug!("Found resource {} with {} methods", self_name, methods.len());
            self.index.resources.insert(self_name, methods);
            return;
        }

        visit::visit_item_impl(self, node);
    }

    fn visit_item_mod(&mut self, node: &'ast ItemMod) {
        // Inline modules of a crate root name their own endpoints
        let outer = self.module.clone();
        if outer.is_none() && node.content.is_some() {
            self.module = Some(node.ident.to_string());
        }
        visit::visit_item_mod(self, node);
        self.module = outer;
    }
}

/// Finds `.add_resource(X, "/a", "/b")` registrations.
pub fn collect_resource_registrations(parsed_files: &[ParsedFile]) -> Vec<RouteInfo> {
    let mut visitor = ResourceVisitor::default();
    for file in parsed_files {
        visitor.visit_file(&file.syntax_tree);
    }
    visitor.routes
}

#[derive(Default)]
struct ResourceVisitor {
    routes: Vec<RouteInfo>,
}

impl<'ast> Visit<'ast> for ResourceVisitor {
    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        // Receiver first so chained registrations keep source order
        self.visit_expr(&node.receiver);

        if node.method == "add_resource" {
            let mut args = node.args.iter();
            match args.next().and_then(resource_name) {
                Some(name) => {
                    for url in args.filter_map(string_literal) {
                        debug!("Found resource registration {} at {}", name, url);
                        self.routes.push(RouteInfo::resource(url, name.clone()));
                    }
                }
                None => warn!("Unrecognized resource in add_resource call"),
            }
        }

        for arg in &node.args {
            self.visit_expr(arg);
        }
    }
}

/// `TodoList`, `TodoList::new()`, `TodoList {}` and references to them.
fn resource_name(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Path(expr_path) => Some(expr_path.path.segments.last()?.ident.to_string()),
        Expr::Struct(expr_struct) => Some(expr_struct.path.segments.last()?.ident.to_string()),
        Expr::Call(call) => match call.func.as_ref() {
            Expr::Path(func) => {
                let segments = &func.path.segments;
                let owner = if segments.len() >= 2 {
                    segments.iter().nth_back(1)
                } else {
                    segments.last()
                };
                Some(owner?.ident.to_string())
            }
            _ => None,
        },
        Expr::Reference(reference) => resource_name(&reference.expr),
        Expr::Paren(paren) => resource_name(&paren.expr),
        _ => None,
    }
}

/// Builds the route table of a project.
///
/// Function routes are registered under `module.function` (or the bare name
/// for crate-root handlers), resource routes under the resource. Handlers
/// that cannot be found are registered without documentation.
pub fn build_application(parsed_files: &[ParsedFile], frameworks: &[Framework]) -> Application {
    let index = HandlerIndex::build(parsed_files);
    let mut routes = Vec::new();

    for framework in frameworks {
        let extractor: Box<dyn RouteExtractor> = match framework {
            Framework::Axum => Box::new(axum::AxumExtractor),
            Framework::ActixWeb => Box::new(actix::ActixExtractor),
        };
        let found = extractor.extract_routes(parsed_files);
        debug!("Extracted {} routes for {:?}", found.len(), framework);
        routes.extend(found);
    }
    routes.extend(collect_resource_registrations(parsed_files));

    let mut app = Application::new();
    let mut pending_resources: Vec<(String, Vec<String>)> = Vec::new();

    for route in routes {
        match route.target {
            HandlerTarget::Function(name) => {
                let (module, handler) = match index.function(route.module.as_deref(), &name) {
                    Some((module, handler)) => (module.map(str::to_string), handler.clone()),
                    None => {
                        warn!("Unknown handler: {}", name);
                        (route.module.clone(), Handler::new(&name))
                    }
                };
                let endpoint = match &module {
                    Some(module) => format!("{}.{}", module, name),
                    None => name.clone(),
                };
                app.route_with_endpoint(&route.path, &route.methods, &endpoint, handler);
            }
            HandlerTarget::Resource(name) => {
                match pending_resources.iter_mut().find(|(n, _)| *n == name) {
                    Some((_, urls)) => urls.push(route.path),
                    None => pending_resources.push((name, vec![route.path])),
                }
            }
        }
    }

    for (name, urls) in pending_resources {
        let resource = index.resource(&name).unwrap_or_else(|| {
            warn!("Unknown resource: {}", name);
            Resource::new(&name)
        });
        app.add_resource(resource, &urls);
    }

    info!("Registered {} routes", app.routes().len());
    app
}
