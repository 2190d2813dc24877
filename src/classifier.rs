//! Route classification.
//!
//! Every registered route becomes zero or more [`ClassifiedRoute`] values:
//! resource routes yield one per allowed HTTP method, plain handler routes
//! yield one carrying all their allowed methods. Exclusion lists and the
//! method allow-list are applied here, before any grouping happens.

use crate::config::DocConfig;
use crate::docstring::{capitalize, humanize};
use crate::registry::{Handler, Resource, Route, RouteSource};
use log::{debug, warn};
use serde::Serialize;

/// How a route is handled, which drives grouping and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiType {
    /// Free function, grouped by its module
    Api,
    /// Method of a resource class, grouped by the class
    RestfulApi,
}

/// A route ready to be merged into the aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedRoute<'a> {
    pub api_type: ApiType,
    /// Group key: capitalized module name or resource class name
    pub logical_name: String,
    /// Docstring of the owning resource class
    pub group_doc: Option<&'a str>,
    /// Entry key inside the group
    pub name: String,
    pub url: String,
    /// Allowed methods, in allow-list order
    pub methods: Vec<String>,
    pub handler: Option<&'a Handler>,
}

pub struct RouteClassifier<'c> {
    config: &'c DocConfig,
}

impl<'c> RouteClassifier<'c> {
    pub fn new(config: &'c DocConfig) -> Self {
        Self { config }
    }

    /// Classifies every route of `source`, in route-table order.
    pub fn classify<'a>(&self, source: &'a dyn RouteSource) -> Vec<ClassifiedRoute<'a>> {
        let mut classified = Vec::new();

        for route in source.routes() {
            let handler = source.handler(&route.endpoint);
            match handler.and_then(|h| h.view_class.as_deref()) {
                Some(class) => match source.resource(class) {
                    Some(resource) => self.classify_resource(route, resource, &mut classified),
                    None => warn!("Route {} is dispatched by unknown class {}", route.rule, class),
                },
                None => self.classify_function(route, handler, &mut classified),
            }
        }

        debug!(
            "Classified {} routes into {} entries",
            source.routes().len(),
            classified.len()
        );
        classified
    }

    fn classify_resource<'a>(
        &self,
        route: &Route,
        resource: &'a Resource,
        out: &mut Vec<ClassifiedRoute<'a>>,
    ) {
        let excluded = self
            .config
            .restful_exclude
            .iter()
            .any(|name| *name == resource.name || *name == route.endpoint);
        if excluded {
            debug!("Resource {} is excluded", resource.name);
            return;
        }

        for method in self.config.allowed_methods(&route.methods) {
            out.push(ClassifiedRoute {
                api_type: ApiType::RestfulApi,
                logical_name: resource.name.clone(),
                group_doc: resource.doc.as_deref(),
                name: method.clone(),
                url: route.rule.clone(),
                handler: resource.handler(&method),
                methods: vec![method],
            });
        }
    }

    fn classify_function<'a>(
        &self,
        route: &Route,
        handler: Option<&'a Handler>,
        out: &mut Vec<ClassifiedRoute<'a>>,
    ) {
        let module = module_of(route);
        if !self.config.member.iter().any(|m| *m == module) {
            return;
        }

        let function_name = handler
            .map(|h| h.name.as_str())
            .unwrap_or_else(|| route.endpoint.rsplit('.').next().unwrap_or_default());

        let suppressed = self
            .config
            .member_sub_exclude
            .iter()
            .any(|name| name == function_name || *name == route.endpoint);
        if suppressed {
            debug!("Handler {} is excluded", route.endpoint);
            return;
        }

        let methods = self.config.allowed_methods(&route.methods);
        if methods.is_empty() {
            debug!("Route {} exposes no allowed method", route.rule);
            return;
        }

        out.push(ClassifiedRoute {
            api_type: ApiType::Api,
            logical_name: capitalize(module),
            group_doc: None,
            name: humanize(function_name),
            url: route.rule.clone(),
            methods,
            handler,
        });
    }
}

/// Module owning a plain route: the first segment of a dotted endpoint, or
/// the first URL segment for endpoints registered at the crate root.
fn module_of(route: &Route) -> &str {
    match route.endpoint.split_once('.') {
        Some((module, _)) => module,
        None => route
            .rule
            .trim_start_matches('/')
            .split('/')
            .next()
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Application;
    use pretty_assertions::assert_eq;

    fn config() -> DocConfig {
        DocConfig {
            member: vec!["api".to_string(), "platform".to_string()],
            member_sub_exclude: vec!["delete_data".to_string()],
            restful_exclude: vec!["TodoListExclude".to_string()],
            ..DocConfig::default()
        }
    }

    fn app() -> Application {
        let mut app = Application::new();
        app.blueprint("api", "/api")
            .route("/add_data", &["POST", "OPTIONS"], Handler::new("add_data"))
            .route("/delete_data", &["GET"], Handler::new("delete_data"))
            .route("/head_only", &["HEAD"], Handler::new("head_only"));
        app.blueprint("internal", "/internal")
            .route("/secret", &["GET"], Handler::new("secret"));
        app.route("/platform/ping", &["GET"], Handler::new("ping"));
        app.add_resource(
            Resource::new("TodoList")
                .with_doc("Manage todolist")
                .method("get", Handler::new("get"))
                .method("post", Handler::new("post")),
            &["/todolist"],
        );
        app.add_resource(
            Resource::new("TodoListExclude").method("get", Handler::new("get")),
            &["/todolist_exclude"],
        );
        app
    }

    #[test]
    fn test_classify_functions() {
        let config = config();
        let app = app();
        let classified = RouteClassifier::new(&config).classify(&app);

        let apis: Vec<(&str, &str, Vec<String>)> = classified
            .iter()
            .filter(|c| c.api_type == ApiType::Api)
            .map(|c| (c.logical_name.as_str(), c.name.as_str(), c.methods.clone()))
            .collect();

        assert_eq!(
            apis,
            vec![
                ("Api", "Add Data", vec!["POST".to_string()]),
                ("Platform", "Ping", vec!["GET".to_string()]),
            ]
        );
    }

    #[test]
    fn test_classify_resources() {
        let config = config();
        let app = app();
        let classified = RouteClassifier::new(&config).classify(&app);

        let restful: Vec<&ClassifiedRoute> = classified
            .iter()
            .filter(|c| c.api_type == ApiType::RestfulApi)
            .collect();

        assert_eq!(restful.len(), 2);
        assert!(restful.iter().all(|c| c.logical_name == "TodoList"));
        assert_eq!(restful[0].name, "GET");
        assert_eq!(restful[1].name, "POST");
        assert_eq!(restful[0].group_doc, Some("Manage todolist"));
        assert_eq!(restful[1].handler.map(|h| h.name.as_str()), Some("post"));
    }

    #[test]
    fn test_classify_by_view_class() {
        let config = config();
        let mut app = Application::new();
        app.add_resource(
            Resource::new("TodoList").method("get", Handler::new("get")),
            &["/todolist"],
        );
        let dispatch = |name: &str, class: &str| Handler::new(name).with_view_class(class);
        app.route_with_endpoint("/v2/todos", &["GET"], "todos_v2", dispatch("todos_v2", "TodoList"))
            .route_with_endpoint("/api/gone", &["GET"], "api.gone", dispatch("gone", "Gone"));

        let classified = RouteClassifier::new(&config).classify(&app);
        let entries: Vec<(ApiType, &str, &str)> = classified
            .iter()
            .map(|c| (c.api_type, c.logical_name.as_str(), c.url.as_str()))
            .collect();
        assert_eq!(
            entries,
            vec![
                (ApiType::RestfulApi, "TodoList", "/todolist"),
                (ApiType::RestfulApi, "TodoList", "/v2/todos"),
            ]
        );
    }

    #[test]
    fn test_methods_outside_allow_list_are_dropped() {
        let config = DocConfig {
            member: vec!["api".to_string()],
            methods_list: vec!["POST".to_string()],
            ..DocConfig::default()
        };
        let app = app();
        let classified = RouteClassifier::new(&config).classify(&app);

        let names: Vec<&str> = classified.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Add Data", "POST"]);
    }

    #[test]
    fn test_module_of() {
        let route = Route::new("/api/x", &["GET"], "api.x");
        assert_eq!(module_of(&route), "api");
        let route = Route::new("/platform/ping", &["GET"], "ping");
        assert_eq!(module_of(&route), "platform");
        let route = Route::new("/", &["GET"], "index");
        assert_eq!(module_of(&route), "");
    }

    #[test]
    fn test_api_type_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&ApiType::RestfulApi).unwrap(), "\"restful_api\"");
        assert_eq!(serde_json::to_string(&ApiType::Api).unwrap(), "\"api\"");
    }
}
