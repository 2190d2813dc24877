use crate::aggregator::build_aggregate;
use crate::config::DocConfig;
use crate::detector::FrameworkDetector;
use crate::export::{export_html, export_markdown};
use crate::extractor::build_application;
use crate::parser::{AstParser, ParsedFile};
use crate::registry::{Application, RouteSource};
use crate::render::{build_payload, HtmlBuilder, MarkdownBuilder};
use crate::scanner::FileScanner;
use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, info, warn};
use std::path::PathBuf;

/// routedoc - Export API documentation written in handler doc comments
#[derive(Parser, Debug)]
#[command(name = "routedoc")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Documentation settings (YAML or JSON)
    #[arg(short = 'c', long = "config", value_name = "FILE", global = true)]
    pub config: Option<PathBuf>,

    /// Specify the web framework to parse (if not specified, auto-detect)
    #[arg(short = 'w', long = "framework", value_enum, global = true)]
    pub framework: Option<Framework>,

    /// Path to the Rust project directory
    #[arg(short = 'p', long = "project", value_name = "DIR", default_value = ".")]
    #[arg(global = true)]
    pub project: PathBuf,

    /// Module to document, in addition to the configured ones (repeatable)
    #[arg(short = 'm', long = "member", value_name = "MODULE", global = true)]
    pub member: Vec<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose", global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Write a single self-contained HTML page
    Html {
        /// Output directory
        #[arg(short = 'o', long = "output", value_name = "DIR", default_value = "htmldoc")]
        output: PathBuf,

        /// Replace an existing output
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
    /// Write a Markdown document
    Markdown {
        /// Output file
        #[arg(short = 'o', long = "output", value_name = "FILE", default_value = "doc.md")]
        output: PathBuf,

        /// Replace an existing output
        #[arg(short = 'f', long = "force")]
        force: bool,
    },
}

/// Supported web frameworks
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Hash)]
pub enum Framework {
    /// Axum framework
    Axum,
    /// Actix-Web framework
    #[value(name = "actix-web")]
    ActixWeb,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if !args.project.is_dir() {
        anyhow::bail!("Project path is not a directory: {}", args.project.display());
    }

    info!("Project path: {}", args.project.display());
    match &args.config {
        Some(config) => info!("Config file: {}", config.display()),
        None => info!("Config file: none, using defaults"),
    }
    match &args.framework {
        Some(framework) => info!("Framework: {:?}", framework),
        None => info!("Framework: auto-detect"),
    }

    Ok(args)
}

/// Settings from `--config`, extended by `--member`.
pub fn load_config(args: &CliArgs) -> Result<DocConfig> {
    let mut config = match &args.config {
        Some(path) => DocConfig::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => DocConfig::default(),
    };

    for member in &args.member {
        if !config.member.contains(member) {
            config.member.push(member.clone());
        }
    }
    if config.member.is_empty() {
        warn!("No member modules configured; only resources will be documented");
    }

    Ok(config)
}

/// Scans, parses and extracts the route table of the project.
pub fn load_application(args: &CliArgs) -> Result<Application> {
    info!("Scanning project directory...");
    let scan_result = FileScanner::new(args.project.clone())
        .scan()
        .with_context(|| format!("Failed to scan {}", args.project.display()))?;

    info!("Found {} Rust files", scan_result.files.len());
    if scan_result.files.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    info!("Parsing Rust files...");
    let parsed_files: Vec<ParsedFile> = AstParser::parse_files(&scan_result.files)
        .into_iter()
        .filter_map(|r| match r {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                debug!("Skipping file due to parse error: {}", e);
                None
            }
        })
        .collect();

    info!("Successfully parsed {} files", parsed_files.len());
    if parsed_files.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    let frameworks = match args.framework {
        Some(framework) => {
            info!("Using user-specified framework: {:?}", framework);
            vec![framework]
        }
        None => {
            info!("Detecting web frameworks...");
            let detection = FrameworkDetector::detect(&parsed_files);
            if detection.frameworks.is_empty() {
                anyhow::bail!(
                    "No supported web framework detected. Please specify a framework using --framework option.\n\
                     Supported frameworks: axum, actix-web"
                );
            }
            info!("Detected frameworks: {:?}", detection.frameworks);
            detection.frameworks
        }
    };

    let app = build_application(&parsed_files, &frameworks);
    if app.routes().is_empty() {
        warn!("No routes found in the project");
    }
    Ok(app)
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;
    let app = load_application(&args)?;

    info!("Building documentation...");
    let aggregate = build_aggregate(&config, &app);
    info!("Documented {} groups", aggregate.len());

    match &args.command {
        Command::Html { output, force } => {
            let json = build_payload(&config, aggregate, None)
                .to_json()
                .context("Failed to serialize documentation")?;
            let page = HtmlBuilder::new(&config).offline_page(&json);
            let index = export_html(output, &page, *force)?;
            println!("Exported HTML documentation to {}", index.display());
        }
        Command::Markdown { output, force } => {
            let markdown = MarkdownBuilder::new(&config).build(&aggregate);
            let path = export_markdown(output, &markdown, *force)?;
            println!("Exported Markdown documentation to {}", path.display());
        }
    }

    Ok(())
}
