//! Viewer page.
//!
//! The page is a fixed template with three markers: one for the stylesheet
//! block, one for the script block and one for inlined data. Asset blocks
//! come either from the CDN templates (optionally overridden by
//! configuration) or from the local static-asset templates.

use crate::config::DocConfig;
use log::debug;

const INDEX_HTML: &str = include_str!("templates/index.html");
const CSS_TEMPLATE_CDN: &str = include_str!("templates/css_template_cdn.html");
const CSS_TEMPLATE_LOCAL: &str = include_str!("templates/css_template_local.html");
const JS_TEMPLATE_CDN: &str = include_str!("templates/js_template_cdn.html");
const JS_TEMPLATE_LOCAL: &str = include_str!("templates/js_template_local.html");

pub const CSS_MARKER: &str = "<!-- ___CSS_TEMPLATE___ -->";
pub const JS_MARKER: &str = "<!-- ___JS_TEMPLATE___ -->";
pub const DATA_MARKER: &str = "<!-- ___DATA_TEMPLATE___ -->";

pub struct HtmlBuilder<'c> {
    config: &'c DocConfig,
}

impl<'c> HtmlBuilder<'c> {
    pub fn new(config: &'c DocConfig) -> Self {
        Self { config }
    }

    /// Page served at `{url_prefix}/`; it fetches its data from
    /// `{url_prefix}/data`.
    pub fn index_page(&self) -> String {
        self.render(self.config.cdn, "")
    }

    /// Self-contained page with `json` inlined. Always uses CDN assets since
    /// there is no server to provide the local ones.
    pub fn offline_page(&self, json: &str) -> String {
        let data = format!(
            "<script>window.API_DOC_DATA = {};</script>",
            json.replace("</", "<\\/")
        );
        self.render(true, &data)
    }

    fn render(&self, cdn: bool, data: &str) -> String {
        let (css, js) = if cdn {
            (
                non_empty_or(&self.config.cdn_css_template, CSS_TEMPLATE_CDN),
                non_empty_or(&self.config.cdn_js_template, JS_TEMPLATE_CDN),
            )
        } else {
            (CSS_TEMPLATE_LOCAL, JS_TEMPLATE_LOCAL)
        };
        debug!("Rendering viewer page (cdn: {})", cdn);

        // Inlined data is never scanned for placeholders
        INDEX_HTML
            .replace(CSS_MARKER, css.trim_end())
            .replace(JS_MARKER, js.trim_end())
            .replace("{{ url_prefix }}", &escape_html(&self.config.url_prefix))
            .replace("{{ title }}", &escape_html(&self.config.title))
            .replace(DATA_MARKER, data)
    }
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_assets_by_default() {
        let config = DocConfig::default();
        let page = HtmlBuilder::new(&config).index_page();

        assert!(page.contains("/docs/api/static/css/github-markdown-light.min.css"));
        assert!(page.contains("/docs/api/static/js/marked.min.js"));
        assert!(page.contains("\"/docs/api/data\""));
        assert!(!page.contains(CSS_MARKER));
        assert!(!page.contains(JS_MARKER));
        assert!(!page.contains(DATA_MARKER));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_cdn_assets_and_overrides() {
        let config = DocConfig {
            cdn: true,
            cdn_js_template: "<script src=\"https://cdn.example/marked.js\"></script>".to_string(),
            ..DocConfig::default()
        };
        let page = HtmlBuilder::new(&config).index_page();

        assert!(page.contains("cdn.jsdelivr.net/npm/github-markdown-css"));
        assert!(page.contains("https://cdn.example/marked.js"));
        assert!(!page.contains("cdn.jsdelivr.net/npm/marked"));
        assert!(!page.contains("/static/js/"));
    }

    #[test]
    fn test_offline_page_inlines_data() {
        let config = DocConfig {
            title: "<Demo>".to_string(),
            ..DocConfig::default()
        };
        let page = HtmlBuilder::new(&config).offline_page(r#"{"doc":"</script>"}"#);

        assert!(page.contains(r#"window.API_DOC_DATA = {"doc":"<\/script>"};"#));
        assert!(page.contains("<title>&lt;Demo&gt;</title>"));
        assert!(page.contains("cdn.jsdelivr.net"));
    }

    #[test]
    fn test_offline_page_keeps_placeholders_in_data() {
        let config = DocConfig {
            title: "Todo Service".to_string(),
            ..DocConfig::default()
        };
        let json = r#"{"doc":"Use {{ title }} under {{ url_prefix }}"}"#;
        let page = HtmlBuilder::new(&config).offline_page(json);

        assert!(page.contains(r#"{"doc":"Use {{ title }} under {{ url_prefix }}"}"#));
        assert!(page.contains("<title>Todo Service</title>"));
    }
}
