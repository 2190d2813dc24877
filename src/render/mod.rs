//! Consumers of an [`Aggregate`](crate::aggregator::Aggregate): the JSON
//! payload served to the viewer, the viewer page itself, and the Markdown
//! export.

pub mod html;
pub mod json;
pub mod markdown;

pub use html::HtmlBuilder;
pub use json::{build_payload, host_from_referrer, DocPayload};
pub use markdown::MarkdownBuilder;
