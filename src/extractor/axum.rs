use crate::extractor::{
    combine_paths, handler_path, http_method, string_literal, RouteExtractor, RouteInfo,
};
use crate::parser::ParsedFile;
use log::debug;
use std::collections::HashMap;
use syn::{visit::Visit, Expr, ExprMethodCall, ItemFn};

/// Axum route extractor
///
/// Understands `Router::route(path, method_router)` where the method router
/// is a chain like `get(list).post(create)`, and `Router::nest(prefix, r)`
/// where `r` is either an inline router or a call to a function building
/// one.
pub struct AxumExtractor;

impl RouteExtractor for AxumExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteInfo> {
        // First pass: which router-building functions are mounted where
        let mut nests = NestVisitor::default();
        for parsed_file in parsed_files {
            nests.visit_file(&parsed_file.syntax_tree);
        }

        let mut visitor = AxumVisitor::new(nests.mounts);
        for parsed_file in parsed_files {
            visitor.file_module = parsed_file.module.clone();
            visitor.visit_file(&parsed_file.syntax_tree);
        }

        debug!("Found {} axum routes", visitor.routes.len());
        visitor.routes
    }
}

/// A `nest(prefix, builder())` call: the function it sits in and its prefix.
#[derive(Debug, Clone)]
struct Mount {
    parent: Option<String>,
    prefix: String,
}

#[derive(Default)]
struct NestVisitor {
    current_fn: Option<String>,
    prefix: String,
    mounts: HashMap<String, Mount>,
}

impl<'ast> Visit<'ast> for NestVisitor {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        let outer = self.current_fn.replace(node.sig.ident.to_string());
        syn::visit::visit_item_fn(self, node);
        self.current_fn = outer;
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        self.visit_expr(&node.receiver);

        let nested = match (node.method == "nest", node.args.first().and_then(string_literal)) {
            (true, Some(prefix)) => Some(combine_paths(&self.prefix, &prefix)),
            _ => None,
        };

        match (nested, node.args.iter().nth(1)) {
            (Some(prefix), Some(inner)) => {
                if let Some(builder) = called_function(inner) {
                    debug!("Router {} is nested at {}", builder, prefix);
                    self.mounts.insert(
                        builder,
                        Mount {
                            parent: self.current_fn.clone(),
                            prefix: prefix.clone(),
                        },
                    );
                }
                let outer = std::mem::replace(&mut self.prefix, prefix);
                self.visit_expr(inner);
                self.prefix = outer;
            }
            _ => node.args.iter().for_each(|arg| self.visit_expr(arg)),
        }
    }
}

/// Name of the function called by `builder()` or `routes::builder()`.
fn called_function(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Call(call) => match call.func.as_ref() {
            Expr::Path(path) => handler_path(&path.path).map(|(_, name)| name),
            _ => None,
        },
        _ => None,
    }
}

/// Visitor for traversing the AST and finding Axum routes
struct AxumVisitor {
    routes: Vec<RouteInfo>,
    mounts: HashMap<String, Mount>,
    file_module: Option<String>,
    current_prefix: String,
}

impl AxumVisitor {
    fn new(mounts: HashMap<String, Mount>) -> Self {
        Self {
            routes: Vec::new(),
            mounts,
            file_module: None,
            current_prefix: String::new(),
        }
    }

    /// Prefix a router-building function is mounted under, following the
    /// chain of `nest` calls up to the root router.
    fn mount_prefix(&self, function: &str) -> String {
        let mut prefixes = Vec::new();
        let mut current = Some(function.to_string());
        while let Some(name) = current {
            let Some(mount) = self.mounts.get(&name) else { break };
            if prefixes.len() > self.mounts.len() {
                debug!("Cyclic nest involving {}", name);
                break;
            }
            prefixes.push(mount.prefix.clone());
            current = mount.parent.clone();
        }
        // Each recorded prefix already includes inline nesting within its function
        prefixes
            .iter()
            .rev()
            .fold(String::new(), |acc, prefix| combine_paths(&acc, prefix))
    }

    /// Parse a `.route(path, method_router)` call.
    fn parse_route_method(&mut self, expr: &ExprMethodCall) {
        let mut args = expr.args.iter();
        let (Some(path), Some(router)) = (args.next().and_then(string_literal), args.next()) else {
            return;
        };
        let full_path = combine_paths(&self.current_prefix, &path);

        // One registration per handler, carrying every verb bound to it
        let mut bindings: Vec<((Option<String>, String), Vec<String>)> = Vec::new();
        for (verb, handler) in method_router(router) {
            match bindings.iter_mut().find(|(h, _)| *h == handler) {
                Some((_, verbs)) => verbs.push(verb),
                None => bindings.push((handler, vec![verb])),
            }
        }

        if bindings.is_empty() {
            debug!("No recognizable method router at {}", full_path);
        }

        for ((module, name), methods) in bindings {
            debug!("Found route {} {:?} -> {}", full_path, methods, name);
            let module = module.or_else(|| self.file_module.clone());
            self.routes.push(RouteInfo::function(full_path.clone(), methods, name, module));
        }
    }
}

/// Verb and handler pairs of `get(a).post(b)` or `routing::get(a)`.
fn method_router(expr: &Expr) -> Vec<(String, (Option<String>, String))> {
    match expr {
        Expr::MethodCall(call) => {
            let mut bindings = method_router(&call.receiver);
            if let (Some(verb), Some(handler)) = (
                http_method(&call.method.to_string()),
                call.args.first().and_then(handler_name),
            ) {
                bindings.push((verb, handler));
            }
            bindings
        }
        Expr::Call(call) => {
            let verb = match call.func.as_ref() {
                Expr::Path(path) => path
                    .path
                    .segments
                    .last()
                    .and_then(|s| http_method(&s.ident.to_string())),
                _ => None,
            };
            match (verb, call.args.first().and_then(handler_name)) {
                (Some(verb), Some(handler)) => vec![(verb, handler)],
                _ => Vec::new(),
            }
        }
        Expr::Paren(paren) => method_router(&paren.expr),
        _ => Vec::new(),
    }
}

/// Extract handler function name from an expression
fn handler_name(expr: &Expr) -> Option<(Option<String>, String)> {
    match expr {
        Expr::Path(path) => handler_path(&path.path),
        Expr::Reference(reference) => handler_name(&reference.expr),
        _ => None,
    }
}

impl<'ast> Visit<'ast> for AxumVisitor {
    fn visit_item_fn(&mut self, node: &'ast ItemFn) {
        let prefix = self.mount_prefix(&node.sig.ident.to_string());
        let outer = std::mem::replace(&mut self.current_prefix, prefix);
        syn::visit::visit_item_fn(self, node);
        self.current_prefix = outer;
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        // The receiver holds the earlier links of a builder chain
        self.visit_expr(&node.receiver);

        match node.method.to_string().as_str() {
            "route" => self.parse_route_method(node),
            "nest" => {
                if let (Some(prefix), Some(inner)) =
                    (node.args.first().and_then(string_literal), node.args.iter().nth(1))
                {
                    let nested = combine_paths(&self.current_prefix, &prefix);
                    let outer = std::mem::replace(&mut self.current_prefix, nested);
                    self.visit_expr(inner);
                    self.current_prefix = outer;
                    return;
                }
            }
            _ => {}
        }

        for arg in &node.args {
            self.visit_expr(arg);
        }
    }
}
