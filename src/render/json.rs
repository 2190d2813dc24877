use crate::aggregator::Aggregate;
use crate::config::DocConfig;
use crate::error::Result;
use log::debug;
use serde::Serialize;

/// Document served at `{url_prefix}/data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocPayload {
    pub data: Aggregate,
    pub title: String,
    pub version: String,
    pub description: String,
    #[serde(rename = "noDocText")]
    pub no_doc_text: String,
    /// Origin of the page that requested the data, or empty
    pub host: String,
}

impl DocPayload {
    pub fn to_json(&self) -> Result<String> {
        debug!("Serializing payload with {} groups", self.data.len());
        Ok(serde_json::to_string(self)?)
    }
}

/// Wraps `aggregate` with the metadata the viewer displays.
pub fn build_payload(
    config: &DocConfig,
    aggregate: Aggregate,
    referrer: Option<&str>,
) -> DocPayload {
    DocPayload {
        data: aggregate,
        title: config.title.clone(),
        version: config.version.clone(),
        description: config.description.clone(),
        no_doc_text: config.no_doc_text.clone(),
        host: referrer.map(host_from_referrer).unwrap_or_default(),
    }
}

/// `scheme://authority` of a referring URL, or an empty string when the
/// value is not an absolute URL.
pub fn host_from_referrer(referrer: &str) -> String {
    let Some((scheme, rest)) = referrer.trim().split_once("://") else {
        return String::new();
    };
    let authority = rest
        .split(|c| c == '/' || c == '?' || c == '#')
        .next()
        .unwrap_or_default();

    let scheme_ok = !scheme.is_empty()
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !scheme_ok || authority.is_empty() {
        return String::new();
    }
    format!("{}://{}", scheme, authority)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::build_aggregate;
    use crate::registry::{Application, Handler};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_host_from_referrer() {
        assert_eq!(
            host_from_referrer("http://127.0.0.1:5000/docs/api/?x=1"),
            "http://127.0.0.1:5000"
        );
        assert_eq!(host_from_referrer("https://example.com"), "https://example.com");
        assert_eq!(host_from_referrer("https://example.com#top"), "https://example.com");
        assert_eq!(host_from_referrer("/docs/api/"), "");
        assert_eq!(host_from_referrer("://nohost"), "");
        assert_eq!(host_from_referrer("http:///path"), "");
    }

    #[test]
    fn test_payload_shape() {
        let config = DocConfig {
            title: "Sample".to_string(),
            member: vec!["api".to_string()],
            ..DocConfig::default()
        };
        let mut app = Application::new();
        let handler = Handler::new("add_data").with_doc("Add some data");
        app.blueprint("api", "/api").route("/add_data", &["POST"], handler);

        let aggregate = build_aggregate(&config, &app);
        let payload = build_payload(&config, aggregate, Some("http://h:1/x"));
        let value: serde_json::Value = serde_json::from_str(&payload.to_json().unwrap()).unwrap();

        assert_eq!(value["title"], "Sample");
        assert_eq!(value["version"], "1.0.0");
        assert_eq!(value["noDocText"], "No doc found for this Api");
        assert_eq!(value["host"], "http://h:1");
        assert_eq!(value["data"]["Api"]["children"][0]["name"], "Add Data");
        assert_eq!(value["data"]["Api"]["children"][0]["url"], "/api/add_data");
        assert_eq!(value["data"]["Api"]["children"][0]["api_type"], "api");
    }

    #[test]
    fn test_group_order_is_insertion_order() {
        let config = DocConfig {
            member: vec!["zoo".to_string(), "api".to_string()],
            ..DocConfig::default()
        };
        let mut app = Application::new();
        app.blueprint("zoo", "/zoo").route("/a", &["GET"], Handler::new("a"));
        app.blueprint("api", "/api").route("/b", &["GET"], Handler::new("b"));

        let json = build_payload(&config, build_aggregate(&config, &app), None)
            .to_json()
            .unwrap();
        let zoo = json.find("\"Zoo\"").unwrap();
        let api = json.find("\"Api\"").unwrap();
        assert!(zoo < api);
    }
}
