//! Explicit route registry.
//!
//! The documentation pipeline does not inspect a running web framework.
//! Instead the host application (or the source scanner) registers its
//! routes, the functions handling them and the method-dispatching
//! resources here, and the pipeline reads them through [`RouteSource`].

use crate::args::RequestParser;
use crate::docstring::apply_replacements;
use log::{debug, warn};
use std::collections::HashMap;

/// One URL rule bound to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    pub rule: String,
    /// Upper-case HTTP methods the rule accepts
    pub methods: Vec<String>,
    /// `module.function`, a bare function name, or a lowercase resource name
    pub endpoint: String,
}

impl Route {
    pub fn new<S: AsRef<str>>(
        rule: impl Into<String>,
        methods: &[S],
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            rule: rule.into(),
            methods: methods.iter().map(|m| m.as_ref().to_ascii_uppercase()).collect(),
            endpoint: endpoint.into(),
        }
    }
}

/// A function handling requests, with whatever documentation is known
/// about it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Handler {
    pub name: String,
    pub doc: Option<String>,
    /// Source text, used for legacy argument scraping
    pub source: Option<String>,
    /// Structured argument declarations
    pub parser: Option<RequestParser>,
    /// Resource class dispatching the endpoint; set on the handler
    /// [`Application::add_resource`] registers for a resource
    pub view_class: Option<String>,
}

impl Handler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_parser(mut self, parser: RequestParser) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn with_view_class(mut self, view_class: impl Into<String>) -> Self {
        self.view_class = Some(view_class.into());
        self
    }

    /// Substitutes shared text into the docstring.
    ///
    /// Each `(placeholder, text)` pair replaces every occurrence of
    /// `placeholder`. A handler without a docstring is left untouched.
    pub fn change_doc(mut self, replacements: &[(&str, &str)]) -> Self {
        if let Some(doc) = &self.doc {
            let owned: Vec<(String, String)> = replacements
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.doc = Some(apply_replacements(doc, &owned));
        }
        self
    }

    /// The docstring, when it has any non-blank content.
    pub fn docstring(&self) -> Option<&str> {
        self.doc.as_deref().filter(|doc| !doc.trim().is_empty())
    }
}

/// A class dispatching requests to one handler per HTTP method.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub doc: Option<String>,
    methods: Vec<(String, Handler)>,
}

impl Resource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// Binds `handler` to `verb`; a later binding of the same verb wins.
    pub fn method(mut self, verb: &str, handler: Handler) -> Self {
        let verb = verb.to_ascii_uppercase();
        match self.methods.iter_mut().find(|(v, _)| *v == verb) {
            Some(slot) => slot.1 = handler,
            None => self.methods.push((verb, handler)),
        }
        self
    }

    pub fn handler(&self, method: &str) -> Option<&Handler> {
        self.methods
            .iter()
            .find(|(verb, _)| verb.eq_ignore_ascii_case(method))
            .map(|(_, handler)| handler)
    }

    /// Upper-case verbs in binding order.
    pub fn methods(&self) -> Vec<String> {
        self.methods.iter().map(|(verb, _)| verb.clone()).collect()
    }

    /// Endpoint name the resource's routes are registered under.
    pub fn endpoint(&self) -> String {
        self.name.to_lowercase()
    }
}

/// Read access to everything the documentation pipeline needs.
pub trait RouteSource {
    /// Routes in registration order.
    fn routes(&self) -> &[Route];

    /// Function registered for a plain endpoint.
    fn handler(&self, endpoint: &str) -> Option<&Handler>;

    /// Resource class registered under `name`.
    fn resource(&self, name: &str) -> Option<&Resource>;
}

/// In-memory [`RouteSource`] filled by registration calls.
#[derive(Debug, Clone, Default)]
pub struct Application {
    routes: Vec<Route>,
    handlers: HashMap<String, Handler>,
    resources: HashMap<String, Resource>,
}

impl Application {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for `rule`; the endpoint is the handler's name.
    pub fn route<S: AsRef<str>>(
        &mut self,
        rule: &str,
        methods: &[S],
        handler: Handler,
    ) -> &mut Self {
        let endpoint = handler.name.clone();
        self.route_with_endpoint(rule, methods, &endpoint, handler)
    }

    /// Registers `handler` for `rule` under an explicit endpoint.
    ///
    /// Several rules may share an endpoint; the first handler registered for
    /// it is kept.
    pub fn route_with_endpoint<S: AsRef<str>>(
        &mut self,
        rule: &str,
        methods: &[S],
        endpoint: &str,
        handler: Handler,
    ) -> &mut Self {
        debug!("Registering route {} -> {}", rule, endpoint);
        self.routes.push(Route::new(rule, methods, endpoint));
        if self.handlers.contains_key(endpoint) {
            debug!("Endpoint {} already has a handler, keeping it", endpoint);
        } else {
            self.handlers.insert(endpoint.to_string(), handler);
        }
        self
    }

    /// Starts a group of routes sharing a module name and URL prefix.
    pub fn blueprint<'a>(&'a mut self, name: &str, url_prefix: &str) -> Blueprint<'a> {
        Blueprint {
            app: self,
            name: name.to_string(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    /// Registers a resource under every URL in `urls`.
    ///
    /// The resource accepts exactly the verbs it binds handlers for. Its
    /// endpoint gets a dispatch handler whose `view_class` names the
    /// resource.
    pub fn add_resource<S: AsRef<str>>(&mut self, resource: Resource, urls: &[S]) -> &mut Self {
        let endpoint = resource.endpoint();
        let methods = resource.methods();
        if methods.is_empty() {
            warn!("Resource {} binds no HTTP methods", resource.name);
        }

        for url in urls {
            debug!("Registering resource {} at {}", resource.name, url.as_ref());
            self.routes.push(Route::new(url.as_ref(), &methods, endpoint.clone()));
        }
        self.handlers
            .entry(endpoint.clone())
            .or_insert_with(|| Handler::new(endpoint).with_view_class(resource.name.clone()));
        self.resources.entry(resource.name.clone()).or_insert(resource);
        self
    }
}

impl RouteSource for Application {
    fn routes(&self) -> &[Route] {
        &self.routes
    }

    fn handler(&self, endpoint: &str) -> Option<&Handler> {
        self.handlers.get(endpoint)
    }

    fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.get(name)
    }
}

/// Routes registered with a shared module name and URL prefix.
pub struct Blueprint<'a> {
    app: &'a mut Application,
    name: String,
    url_prefix: String,
}

impl Blueprint<'_> {
    /// Registers `handler` at `prefix + rule` under endpoint `module.handler`.
    pub fn route<S: AsRef<str>>(
        &mut self,
        rule: &str,
        methods: &[S],
        handler: Handler,
    ) -> &mut Self {
        let endpoint = format!("{}.{}", self.name, handler.name);
        let rule = format!("{}{}", self.url_prefix, rule);
        self.app.route_with_endpoint(&rule, methods, &endpoint, handler);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_blueprint_routes() {
        let mut app = Application::new();
        app.blueprint("api", "/api/")
            .route("/add_data", &["POST"], Handler::new("add_data").with_doc("Add some data"))
            .route("/delete_data", &["get"], Handler::new("delete_data"));

        let routes = app.routes();
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].rule, "/api/add_data");
        assert_eq!(routes[0].endpoint, "api.add_data");
        assert_eq!(routes[1].methods, vec!["GET"]);
        assert_eq!(
            app.handler("api.add_data").and_then(Handler::docstring),
            Some("Add some data")
        );
    }

    #[test]
    fn test_shared_endpoint_keeps_first_handler() {
        let mut app = Application::new();
        app.route_with_endpoint("/a", &["GET"], "index", Handler::new("index").with_doc("first"));
        app.route_with_endpoint("/b", &["GET"], "index", Handler::new("index").with_doc("second"));

        assert_eq!(app.routes().len(), 2);
        assert_eq!(app.handler("index").and_then(|h| h.doc.as_deref()), Some("first"));
    }

    #[test]
    fn test_add_resource() {
        let todo = Resource::new("TodoList")
            .with_doc("Manage TodoList")
            .method("get", Handler::new("get").with_doc("Get todo"))
            .method("POST", Handler::new("post"));

        let mut app = Application::new();
        app.add_resource(todo, &["/todolist", "/todos"]);

        assert_eq!(app.routes().len(), 2);
        assert_eq!(app.routes()[1].endpoint, "todolist");
        assert_eq!(app.routes()[1].methods, vec!["GET", "POST"]);

        let dispatch = app.handler("todolist").unwrap();
        assert_eq!(dispatch.view_class.as_deref(), Some("TodoList"));
        assert_eq!(dispatch.docstring(), None);

        let resource = app.resource("TodoList").unwrap();
        assert_eq!(resource.handler("GET").and_then(Handler::docstring), Some("Get todo"));
        assert!(resource.handler("DELETE").is_none());
        assert!(app.resource("todolist").is_none());
    }

    #[test]
    fn test_change_doc() {
        let handler = Handler::new("delete_data")
            .with_doc("Delete some data\n\nreturn_json")
            .change_doc(&[("return_json", "{\"code\": 0}")]);
        assert_eq!(handler.doc.as_deref(), Some("Delete some data\n\n{\"code\": 0}"));

        let undocumented = Handler::new("x").change_doc(&[("a", "b")]);
        assert_eq!(undocumented.doc, None);
    }

    #[test]
    fn test_blank_docstring() {
        assert_eq!(Handler::new("x").with_doc("  \n ").docstring(), None);
    }
}
