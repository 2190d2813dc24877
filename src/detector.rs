use crate::cli::Framework;
use crate::parser::ParsedFile;
use log::debug;
use syn::visit::{self, Visit};
use syn::{ItemUse, UseTree};

/// Framework detector for identifying the web framework a project uses.
///
/// Looks at `use` items anywhere in the tree, including inline modules and
/// function bodies. Detection order is the order frameworks are first seen.
pub struct FrameworkDetector;

pub struct DetectionResult {
    pub frameworks: Vec<Framework>,
}

impl FrameworkDetector {
    pub fn detect(parsed_files: &[ParsedFile]) -> DetectionResult {
        let mut visitor = UseVisitor::default();
        for parsed_file in parsed_files {
            visitor.visit_file(&parsed_file.syntax_tree);
        }

        debug!("Detected frameworks: {:?}", visitor.frameworks);
        DetectionResult {
            frameworks: visitor.frameworks,
        }
    }
}

#[derive(Default)]
struct UseVisitor {
    frameworks: Vec<Framework>,
}

impl UseVisitor {
    fn record(&mut self, ident: &syn::Ident) {
        let framework = match ident.to_string().as_str() {
            "axum" => Framework::Axum,
            "actix_web" => Framework::ActixWeb,
            _ => return,
        };
        if !self.frameworks.contains(&framework) {
            self.frameworks.push(framework);
        }
    }

    /// Only the first segment of a path names a crate.
    fn check_root(&mut self, tree: &UseTree) {
        match tree {
            UseTree::Path(path) => self.record(&path.ident),
            UseTree::Name(name) => self.record(&name.ident),
            UseTree::Rename(rename) => self.record(&rename.ident),
            UseTree::Group(group) => group.items.iter().for_each(|item| self.check_root(item)),
            UseTree::Glob(_) => {}
        }
    }
}

impl<'ast> Visit<'ast> for UseVisitor {
    fn visit_item_use(&mut self, node: &'ast ItemUse) {
        self.check_root(&node.tree);
        visit::visit_item_use(self, node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> ParsedFile {
        ParsedFile::from_source("test.rs", None, source).unwrap()
    }

    #[test]
    fn test_detect_axum_framework() {
        let parsed = parse(
            r#"
            use axum::{Router, routing::get};

            pub fn app() -> Router {
                Router::new().route("/", get(hello))
            }
        "#,
        );
        assert_eq!(FrameworkDetector::detect(&[parsed]).frameworks, vec![Framework::Axum]);
    }

    #[test]
    fn test_detect_actix_in_nested_module() {
        let parsed = parse(
            r#"
            mod handlers {
                use actix_web::{get, HttpResponse};
            }
        "#,
        );
        assert_eq!(FrameworkDetector::detect(&[parsed]).frameworks, vec![Framework::ActixWeb]);
    }

    #[test]
    fn test_detect_mixed_frameworks_in_first_seen_order() {
        let actix = parse("use actix_web::App;");
        let axum = parse("use axum::Router;\nuse axum::routing::get;");
        let result = FrameworkDetector::detect(&[actix, axum]);
        assert_eq!(result.frameworks, vec![Framework::ActixWeb, Framework::Axum]);
    }

    #[test]
    fn test_detect_ignores_non_root_segments() {
        let parsed = parse("use crate::axum::Router;\nuse std::collections::HashMap;");
        assert!(FrameworkDetector::detect(&[parsed]).frameworks.is_empty());
    }

    #[test]
    fn test_detect_renamed_and_grouped_imports() {
        let parsed = parse("use {actix_web as actix, serde::Serialize};");
        assert_eq!(FrameworkDetector::detect(&[parsed]).frameworks, vec![Framework::ActixWeb]);
    }
}
