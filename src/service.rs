//! Framework-agnostic viewer endpoints.
//!
//! [`DocService`] answers requests for the viewer page and its data. Host
//! glue mounts [`DocService::endpoints`] in its router and forwards matching
//! requests to [`DocService::handle`].

use crate::aggregator::build_aggregate;
use crate::config::DocConfig;
use crate::error::Result;
use crate::registry::RouteSource;
use crate::render::{build_payload, HtmlBuilder};
use log::{debug, error, warn};
use sha2::{Digest, Sha256};

/// Header carrying the hex SHA-256 digest of the viewer password.
pub const PASSWORD_HEADER: &str = "Auth-Password-SHA2";

const CONTENT_TYPE_HTML: &str = "text/html; charset=utf-8";
const CONTENT_TYPE_JSON: &str = "application/json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocEndpoint {
    /// Viewer page
    Index,
    /// JSON payload
    Data,
}

/// The parts of an HTTP request the service looks at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocRequest {
    pub path: String,
    pub headers: Vec<(String, String)>,
}

impl DocRequest {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            headers: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocResponse {
    pub status: u16,
    pub content_type: &'static str,
    pub body: String,
}

impl DocResponse {
    fn html(body: String) -> Self {
        Self {
            status: 200,
            content_type: CONTENT_TYPE_HTML,
            body,
        }
    }

    fn json(status: u16, body: String) -> Self {
        Self {
            status,
            content_type: CONTENT_TYPE_JSON,
            body,
        }
    }

    fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }).to_string())
    }
}

pub struct DocService {
    config: DocConfig,
}

impl DocService {
    /// Validates `config` and builds the service.
    pub fn new(config: DocConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DocConfig {
        &self.config
    }

    /// Paths to mount; none when documentation is disabled.
    pub fn endpoints(&self) -> Vec<(String, DocEndpoint)> {
        if !self.config.enable {
            return Vec::new();
        }
        let prefix = self.prefix();
        vec![
            (format!("{}/", prefix), DocEndpoint::Index),
            (format!("{}/data", prefix), DocEndpoint::Data),
        ]
    }

    pub fn handle(&self, request: &DocRequest, source: &dyn RouteSource) -> DocResponse {
        let path = request.path.split('?').next().unwrap_or_default();
        let endpoint = self
            .endpoints()
            .into_iter()
            .find(|(mounted, _)| mounted == path || mounted.trim_end_matches('/') == path)
            .map(|(_, endpoint)| endpoint);

        match endpoint {
            Some(DocEndpoint::Index) => {
                DocResponse::html(HtmlBuilder::new(&self.config).index_page())
            }
            Some(DocEndpoint::Data) => self.data(request, source),
            None => {
                debug!("No documentation endpoint at {}", request.path);
                DocResponse::error(404, "Not Found")
            }
        }
    }

    fn data(&self, request: &DocRequest, source: &dyn RouteSource) -> DocResponse {
        if let Some(expected) = &self.config.password_sha2 {
            let supplied = request.header(PASSWORD_HEADER).unwrap_or_default();
            if !digests_match(supplied, expected) {
                warn!("Rejected documentation request: missing or wrong password");
                return DocResponse::error(401, "Unauthorized");
            }
        }

        let aggregate = build_aggregate(&self.config, source);
        let payload = build_payload(&self.config, aggregate, request.header("Referer"));
        match payload.to_json() {
            Ok(body) => DocResponse::json(200, body),
            Err(err) => {
                error!("Failed to serialize documentation: {}", err);
                DocResponse::error(500, "Internal Server Error")
            }
        }
    }

    fn prefix(&self) -> &str {
        self.config.url_prefix.trim_end_matches('/')
    }
}

/// Hex SHA-256 digest of `password`, the value [`PASSWORD_HEADER`] carries.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

/// Compares two hex digests case-insensitively without short-circuiting on
/// the first differing byte.
fn digests_match(supplied: &str, expected: &str) -> bool {
    let supplied = supplied.trim().as_bytes();
    let expected = expected.as_bytes();
    if supplied.len() != expected.len() {
        return false;
    }
    supplied
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| {
            diff | (a.to_ascii_lowercase() ^ b.to_ascii_lowercase())
        })
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Application, Handler};
    use pretty_assertions::assert_eq;

    fn app() -> Application {
        let mut app = Application::new();
        let handler = Handler::new("add_data").with_doc("Add some data");
        app.blueprint("api", "/api").route("/add_data", &["POST"], handler);
        app
    }

    fn config() -> DocConfig {
        DocConfig {
            member: vec!["api".to_string()],
            ..DocConfig::default()
        }
    }

    #[test]
    fn test_endpoints() {
        let service = DocService::new(config()).unwrap();
        let paths: Vec<String> = service.endpoints().into_iter().map(|(p, _)| p).collect();
        assert_eq!(paths, vec!["/docs/api/", "/docs/api/data"]);

        let disabled = DocService::new(DocConfig {
            enable: false,
            ..config()
        })
        .unwrap();
        assert!(disabled.endpoints().is_empty());
        assert_eq!(disabled.handle(&DocRequest::new("/docs/api/data"), &app()).status, 404);
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = DocService::new(DocConfig {
            url_prefix: "docs".to_string(),
            ..DocConfig::default()
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_index_and_data() {
        let service = DocService::new(config()).unwrap();
        let app = app();

        let index = service.handle(&DocRequest::new("/docs/api"), &app);
        assert_eq!(index.status, 200);
        assert_eq!(index.content_type, "text/html; charset=utf-8");

        let request =
            DocRequest::new("/docs/api/data?t=1").with_header("referer", "http://h:8/docs");
        let data = service.handle(&request, &app);
        assert_eq!(data.status, 200);
        assert_eq!(data.content_type, "application/json");
        let value: serde_json::Value = serde_json::from_str(&data.body).unwrap();
        assert_eq!(value["host"], "http://h:8");
        assert_eq!(value["data"]["Api"]["children"][0]["doc"], "Add some data");

        assert_eq!(service.handle(&DocRequest::new("/docs/other"), &app).status, 404);
    }

    #[test]
    fn test_password_protection() {
        let service = DocService::new(DocConfig {
            password_sha2: Some(hash_password("secret")),
            ..config()
        })
        .unwrap();
        let app = app();

        let denied = service.handle(&DocRequest::new("/docs/api/data"), &app);
        assert_eq!(denied.status, 401);
        assert_eq!(denied.body, r#"{"error":"Unauthorized"}"#);

        let wrong = DocRequest::new("/docs/api/data")
            .with_header(PASSWORD_HEADER, hash_password("guess"));
        assert_eq!(service.handle(&wrong, &app).status, 401);

        let upper = hash_password("secret").to_uppercase();
        let allowed = DocRequest::new("/docs/api/data").with_header("auth-password-sha2", upper);
        assert_eq!(service.handle(&allowed, &app).status, 200);

        // The page itself is never protected
        assert_eq!(service.handle(&DocRequest::new("/docs/api/"), &app).status, 200);
    }

    #[test]
    fn test_hash_password() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
