//! Documentation settings.
//!
//! A [`DocConfig`] value is built once (from defaults, a YAML/JSON file, or
//! code) and handed to every component that needs it. Nothing reads global
//! state.

use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// HTTP methods a route may expose.
pub const HTTP_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// All settings that influence route collection and rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocConfig {
    /// Title shown by the viewer and the exports
    pub title: String,
    /// Version string of the documented API
    pub version: String,
    /// Free-text description of the documented API
    pub description: String,
    /// Fallback text used wherever a handler has no documentation
    pub no_doc_text: String,
    /// Master switch; when off no documentation endpoint is mounted
    pub enable: bool,
    /// Load viewer assets from a CDN instead of the local static folder
    pub cdn: bool,
    /// Replacement for the built-in CDN stylesheet block (empty keeps the default)
    pub cdn_css_template: String,
    /// Replacement for the built-in CDN script block (empty keeps the default)
    pub cdn_js_template: String,
    /// Mount path of the viewer and its data endpoint
    pub url_prefix: String,
    /// Modules whose plain handlers are documented
    pub member: Vec<String>,
    /// Handler names suppressed inside the documented modules
    pub member_sub_exclude: Vec<String>,
    /// Resource classes that are never documented
    pub restful_exclude: Vec<String>,
    /// HTTP methods that are ever shown, in display order
    pub methods_list: Vec<String>,
    /// SHA-256 hex digest the `Auth-Password-SHA2` header must carry
    pub password_sha2: Option<String>,
    /// Prepend a table of declared request arguments to each markdown block
    pub auto_generating_args_md: bool,
    /// Treat a docstring without delimiters as one markdown block
    pub all_md: bool,
}

impl Default for DocConfig {
    fn default() -> Self {
        Self {
            title: "Api Doc".to_string(),
            version: "1.0.0".to_string(),
            description: String::new(),
            no_doc_text: "No doc found for this Api".to_string(),
            enable: true,
            cdn: false,
            cdn_css_template: String::new(),
            cdn_js_template: String::new(),
            url_prefix: "/docs/api".to_string(),
            member: Vec::new(),
            member_sub_exclude: Vec::new(),
            restful_exclude: Vec::new(),
            methods_list: ["GET", "POST", "PUT", "DELETE", "PATCH"]
                .iter()
                .map(|m| m.to_string())
                .collect(),
            password_sha2: None,
            auto_generating_args_md: false,
            all_md: false,
        }
    }
}

impl DocConfig {
    /// Loads settings from a `.yaml`/`.yml` or `.json` file.
    ///
    /// Keys that are absent keep their defaults. A value of the wrong type is
    /// a hard error, never coerced.
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        let config = match extension.as_deref() {
            Some("json") => Self::from_json_str(&content)?,
            Some("yaml") | Some("yml") => Self::from_yaml_str(&content)?,
            _ => {
                return Err(Error::ConfigError(format!(
                    "unsupported configuration file type: {}",
                    path.display()
                )))
            }
        };

        Ok(config)
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: DocConfig = serde_yaml::from_str(content)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        let config: DocConfig = serde_json::from_str(content)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Checks constraints the type system cannot express.
    pub fn validate(&self) -> Result<()> {
        if !self.url_prefix.starts_with('/') {
            return Err(Error::ConfigError(format!(
                "url_prefix must start with '/', got {:?}",
                self.url_prefix
            )));
        }

        if let Some(method) = self
            .methods_list
            .iter()
            .find(|m| !HTTP_METHODS.contains(&m.as_str()))
        {
            return Err(Error::ConfigError(format!(
                "methods_list contains unknown HTTP method {:?}",
                method
            )));
        }

        if let Some(hash) = &self.password_sha2 {
            if hash.len() != 64 || !hash.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(Error::ConfigError(
                    "password_sha2 must be a 64 character hex SHA-256 digest".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Filters `methods` down to the allowed ones, in allow-list order.
    pub fn allowed_methods<S: AsRef<str>>(&self, methods: &[S]) -> Vec<String> {
        self.methods_list
            .iter()
            .filter(|allowed| {
                methods
                    .iter()
                    .any(|m| m.as_ref().eq_ignore_ascii_case(allowed))
            })
            .cloned()
            .collect()
    }
}
