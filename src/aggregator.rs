//! Aggregation of classified routes into documentation groups.

use crate::args::{extract_args, render_table};
use crate::classifier::{ApiType, ClassifiedRoute, RouteClassifier};
use crate::config::DocConfig;
use crate::docstring::DocstringSplitter;
use crate::registry::{Handler, RouteSource};
use log::{debug, error};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// One documented entry: a plain handler, or one method of a resource.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ApiEntry {
    pub name: String,
    pub name_extra: String,
    /// Space-separated URL rules
    pub url: String,
    /// Space-separated methods; plain handlers only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub doc: String,
    pub doc_md: String,
    /// Logical name of the owning group
    pub router: String,
    pub api_type: ApiType,
}

/// A group of entries sharing a module or resource class.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RouteEntry {
    #[serde(skip)]
    pub logical_name: String,
    pub name_extra: String,
    pub api_type: ApiType,
    pub children: Vec<ApiEntry>,
}

/// Groups in insertion order. Serializes as a map keyed by logical name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    groups: Vec<RouteEntry>,
}

impl Aggregate {
    pub fn groups(&self) -> &[RouteEntry] {
        &self.groups
    }

    pub fn get(&self, logical_name: &str) -> Option<&RouteEntry> {
        self.groups.iter().find(|g| g.logical_name == logical_name)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    fn group_mut(
        &mut self,
        route: &ClassifiedRoute,
        splitter: &DocstringSplitter,
    ) -> &mut RouteEntry {
        let position = match self
            .groups
            .iter()
            .position(|g| g.logical_name == route.logical_name)
        {
            Some(position) => position,
            None => {
                let name_extra = route
                    .group_doc
                    .map(|doc| splitter.split(doc).summary)
                    .unwrap_or_default();
                self.groups.push(RouteEntry {
                    logical_name: route.logical_name.clone(),
                    name_extra,
                    api_type: route.api_type,
                    children: Vec::new(),
                });
                self.groups.len() - 1
            }
        };
        &mut self.groups[position]
    }
}

impl Serialize for Aggregate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for group in &self.groups {
            map.serialize_entry(&group.logical_name, group)?;
        }
        map.end()
    }
}

/// Why a classified route produced no entry.
#[derive(Debug)]
enum EntryError {
    MissingHandler { group: String, name: String },
}

impl fmt::Display for EntryError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntryError::MissingHandler { group, name } => {
                write!(f, "no handler registered for {} / {}", group, name)
            }
        }
    }
}

pub struct Aggregator<'c> {
    config: &'c DocConfig,
    splitter: DocstringSplitter,
}

impl<'c> Aggregator<'c> {
    pub fn new(config: &'c DocConfig) -> Self {
        Self {
            config,
            splitter: DocstringSplitter::new(config),
        }
    }

    /// Builds a fresh aggregate from the current state of `source`.
    pub fn aggregate(&self, source: &dyn RouteSource) -> Aggregate {
        let classified = RouteClassifier::new(self.config).classify(source);
        let mut aggregate = Aggregate::default();

        for route in &classified {
            let group = aggregate.group_mut(route, &self.splitter);

            // Same entry registered again: union its URLs and methods
            if let Some(existing) = group.children.iter_mut().find(|e| e.name == route.name) {
                debug!("Merging {} into {} / {}", route.url, route.logical_name, route.name);
                existing.url = union_tokens(&existing.url, &route.url);
                if let Some(method) = existing.method.as_mut() {
                    *method = union_tokens(method, &route.methods.join(" "));
                }
                continue;
            }

            match self.build_entry(route) {
                Ok(entry) => group.children.push(entry),
                Err(err) => error!("Skipping entry: {}", err),
            }
        }

        aggregate.groups.retain(|g| {
            if g.children.is_empty() {
                debug!("Dropping empty group {}", g.logical_name);
            }
            !g.children.is_empty()
        });
        for group in &mut aggregate.groups {
            group.children.sort_by(|a, b| a.name.cmp(&b.name));
        }

        aggregate
    }

    fn build_entry(&self, route: &ClassifiedRoute) -> Result<ApiEntry, EntryError> {
        let handler = route.handler.ok_or_else(|| EntryError::MissingHandler {
            group: route.logical_name.clone(),
            name: route.name.clone(),
        })?;

        let parts = self.splitter.split(handler.docstring().unwrap_or_default());
        let (name_extra, doc, method) = match route.api_type {
            ApiType::Api => (String::new(), parts.prose, Some(route.methods.join(" "))),
            ApiType::RestfulApi => (parts.summary, parts.body, None),
        };

        Ok(ApiEntry {
            name: route.name.clone(),
            name_extra,
            url: route.url.clone(),
            method,
            doc,
            doc_md: self.with_args_table(handler, parts.markdown),
            router: route.logical_name.clone(),
            api_type: route.api_type,
        })
    }

    fn with_args_table(&self, handler: &Handler, doc_md: String) -> String {
        if !self.config.auto_generating_args_md {
            return doc_md;
        }
        match render_table(&extract_args(handler)) {
            Some(table) if doc_md.is_empty() => table,
            Some(table) => format!("{}\n\n{}", table, doc_md),
            None => doc_md,
        }
    }
}

/// Convenience wrapper building an aggregate in one call.
pub fn build_aggregate(config: &DocConfig, source: &dyn RouteSource) -> Aggregate {
    Aggregator::new(config).aggregate(source)
}

/// Appends the tokens of `addition` missing from `existing`.
fn union_tokens(existing: &str, addition: &str) -> String {
    let mut tokens: Vec<&str> = existing.split_whitespace().collect();
    for token in addition.split_whitespace() {
        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }
    tokens.join(" ")
}
