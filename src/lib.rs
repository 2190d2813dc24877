//! routedoc - API documentation from route tables and handler doc comments.
//!
//! Handlers document themselves: the text of a handler's docstring becomes
//! its entry in a browsable document. An `@@@` line switches between plain
//! prose and a markdown block; request arguments declared with
//! `.add_argument(...)` or a structured [`args::RequestParser`] can be turned
//! into a table automatically.
//!
//! # Architecture
//!
//! 1. [`registry`] - Routes, handlers and resources the host registers
//! 2. [`docstring`] - Splits docstrings into summary, prose and markdown
//! 3. [`args`] - Request argument declarations and their table
//! 4. [`classifier`] - Decides which routes are documented, and how
//! 5. [`aggregator`] - Groups documented routes by module or resource
//! 6. [`render`] - JSON payload, HTML viewer and Markdown document
//! 7. [`service`] - Viewer endpoints for a running server
//! 8. [`export`] - Offline HTML and Markdown files
//!
//! The offline CLI builds the registry from source instead of a running
//! server, through [`scanner`], [`parser`], [`detector`] and [`extractor`].
//!
//! # Example Usage
//!
//! ```
//! use routedoc::aggregator::build_aggregate;
//! use routedoc::config::DocConfig;
//! use routedoc::registry::{Application, Handler};
//! use routedoc::render::MarkdownBuilder;
//!
//! let mut app = Application::new();
//! app.blueprint("api", "/api")
//!     .route("/add_data", &["POST"], Handler::new("add_data").with_doc("Add some data"));
//!
//! let config = DocConfig {
//!     member: vec!["api".to_string()],
//!     ..DocConfig::default()
//! };
//! let aggregate = build_aggregate(&config, &app);
//! let markdown = MarkdownBuilder::new(&config).build(&aggregate);
//! assert!(markdown.contains("### Add Data"));
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod aggregator;
pub mod args;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod detector;
pub mod docstring;
pub mod error;
pub mod export;
pub mod extractor;
pub mod parser;
pub mod registry;
pub mod render;
pub mod scanner;
pub mod service;
