//! routedoc - Command-line tool for exporting API documentation.
//!
//! Reads a Rust web project, collects its routes and the doc comments of
//! their handlers, and writes them as a single HTML page or a Markdown file.
//!
//! # Usage
//!
//! ```bash
//! routedoc [OPTIONS] <COMMAND>
//! ```
//!
//! # Examples
//!
//! Write `htmldoc/index.html` for the modules listed in a config file:
//! ```bash
//! routedoc --config docs.yaml --project ./my-api html
//! ```
//!
//! Write or replace a Markdown document:
//! ```bash
//! routedoc --project ./my-api -m api markdown -o API.md --force
//! ```

use anyhow::Result;
use clap::Parser;
use log::info;
use routedoc::cli;

fn main() -> Result<()> {
    let args = cli::CliArgs::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("routedoc starting...");

    let args = cli::parse_args_from_parsed(args)?;
    cli::run(args)?;

    Ok(())
}
