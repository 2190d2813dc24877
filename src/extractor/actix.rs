use crate::extractor::{
    combine_paths, handler_path, http_method, string_literal, RouteExtractor, RouteInfo,
};
use crate::parser::ParsedFile;
use log::{debug, warn};
use std::collections::HashMap;
use syn::punctuated::Punctuated;
use syn::{visit::Visit, Attribute, Expr, ExprMethodCall, Token};

/// Actix-Web route extractor
///
/// Reads route macros (`#[get("/p")]`, `#[route("/p", method = "GET")]`) on
/// handler functions and `.route("/p", web::get().to(handler))` calls. A
/// handler mounted with `.service(handler)` inside `web::scope("/api")` gets
/// the scope as a prefix.
pub struct ActixExtractor;

impl RouteExtractor for ActixExtractor {
    fn extract_routes(&self, parsed_files: &[ParsedFile]) -> Vec<RouteInfo> {
        let mut visitor = ActixVisitor::new();

        for parsed_file in parsed_files {
            visitor.file_module = parsed_file.module.clone();
            visitor.visit_file(&parsed_file.syntax_tree);
        }

        // Services are often mounted in a different file than they are defined
        visitor.apply_scopes();
        debug!("Found {} actix routes", visitor.routes.len());
        visitor.routes
    }
}

/// Visitor for traversing the AST and finding Actix-Web routes
struct ActixVisitor {
    routes: Vec<RouteInfo>,
    /// Indexes of routes declared by macros, keyed by handler name
    macro_routes: HashMap<String, Vec<usize>>,
    /// Scope prefix each `.service(handler)` is mounted under
    services: HashMap<String, String>,
    file_module: Option<String>,
    current_scope: String,
}

impl ActixVisitor {
    fn new() -> Self {
        Self {
            routes: Vec::new(),
            macro_routes: HashMap::new(),
            services: HashMap::new(),
            file_module: None,
            current_scope: String::new(),
        }
    }

    fn apply_scopes(&mut self) {
        for (handler, scope) in &self.services {
            for &idx in self.macro_routes.get(handler).into_iter().flatten() {
                let route = &mut self.routes[idx];
                route.path = combine_paths(scope, &route.path);
            }
        }
    }

    /// Find and parse route macros (#[get], #[post], #[route], etc.)
    fn find_route_macros(&mut self, item_fn: &syn::ItemFn) {
        let fn_name = item_fn.sig.ident.to_string();

        for attr in &item_fn.attrs {
            if let Some((methods, path)) = parse_route_macro(attr) {
                debug!("Found route macro {} {:?} -> {}", path, methods, fn_name);
                self.macro_routes.entry(fn_name.clone()).or_default().push(self.routes.len());
                self.routes.push(RouteInfo::function(
                    path,
                    methods,
                    fn_name.clone(),
                    self.file_module.clone(),
                ));
            }
        }
    }

    /// `.route("/p", web::get().to(h))`, or `.route(web::get().to(h))` on a
    /// `web::resource("/p")`.
    fn parse_route_call(&mut self, expr: &ExprMethodCall) {
        let (path, route) = match expr.args.len() {
            2 => (string_literal(&expr.args[0]), &expr.args[1]),
            1 => (chain_argument(&expr.receiver, "resource"), &expr.args[0]),
            _ => return,
        };
        let Some(path) = path else { return };

        let Some((verb, (module, name))) = route_target(route) else {
            debug!("No recognizable route target at {}", path);
            return;
        };
        let scope = chain_argument(&expr.receiver, "scope").unwrap_or_default();
        let full_path = combine_paths(&combine_paths(&self.current_scope, &scope), &path);
        let module = module.or_else(|| self.file_module.clone());
        self.routes.push(RouteInfo::function(full_path, vec![verb], name, module));
    }
}

/// Parse a route macro attribute into its methods and path.
fn parse_route_macro(attr: &Attribute) -> Option<(Vec<String>, String)> {
    let attr_name = attr.path().segments.last()?.ident.to_string();
    let single = http_method(&attr_name);
    if single.is_none() && attr_name != "route" {
        return None;
    }

    let args = match attr.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
        Ok(args) => args,
        Err(e) => {
            warn!("Unreadable #[{}] attribute: {}", attr_name, e);
            return None;
        }
    };
    let path = args.first().and_then(string_literal)?;

    let methods = match single {
        Some(verb) => vec![verb],
        None => args
            .iter()
            .skip(1)
            .filter_map(|arg| match arg {
                Expr::Assign(assign) if is_ident(&assign.left, "method") => {
                    string_literal(&assign.right)
                }
                _ => None,
            })
            .map(|m| m.to_ascii_uppercase())
            .collect(),
    };
    Some((methods, path))
}

fn is_ident(expr: &Expr, name: &str) -> bool {
    matches!(expr, Expr::Path(path) if path.path.is_ident(name))
}

/// String argument of the `name(...)` call at the root of a builder chain,
/// as in `web::scope("/api").service(..)`.
fn chain_argument(expr: &Expr, name: &str) -> Option<String> {
    match expr {
        Expr::MethodCall(call) => chain_argument(&call.receiver, name),
        Expr::Call(call) => match call.func.as_ref() {
            Expr::Path(func) if func.path.segments.last()?.ident == name => {
                call.args.first().and_then(string_literal)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Verb and handler of `web::get().to(handler)`.
fn route_target(expr: &Expr) -> Option<(String, (Option<String>, String))> {
    let Expr::MethodCall(to) = expr else { return None };
    if to.method != "to" {
        return None;
    }
    let Expr::Call(verb_call) = to.receiver.as_ref() else { return None };
    let Expr::Path(func) = verb_call.func.as_ref() else { return None };
    let verb = http_method(&func.path.segments.last()?.ident.to_string())?;
    let Expr::Path(handler) = to.args.first()? else { return None };
    Some((verb, handler_path(&handler.path)?))
}

impl<'ast> Visit<'ast> for ActixVisitor {
    fn visit_item_fn(&mut self, node: &'ast syn::ItemFn) {
        // Look for route macros on this function
        self.find_route_macros(node);

        syn::visit::visit_item_fn(self, node);
    }

    fn visit_expr_method_call(&mut self, node: &'ast ExprMethodCall) {
        self.visit_expr(&node.receiver);

        let method_name = node.method.to_string();
        let scope = chain_argument(&node.receiver, "scope")
            .map(|scope| combine_paths(&self.current_scope, &scope))
            .unwrap_or_else(|| self.current_scope.clone());

        match method_name.as_str() {
            "route" => self.parse_route_call(node),
            "service" => {
                if let Some(Expr::Path(path)) = node.args.first() {
                    if let Some((_, name)) = handler_path(&path.path) {
                        if !scope.is_empty() {
                            debug!("Service {} is mounted at {}", name, scope);
                            self.services.insert(name, scope.clone());
                        }
                    }
                }
            }
            _ => {}
        }

        // Nested scopes and resources live in the arguments
        let outer = std::mem::replace(&mut self.current_scope, scope);
        for arg in &node.args {
            self.visit_expr(arg);
        }
        self.current_scope = outer;
    }
}
