use crate::error::{Error, Result};
use crate::scanner::SourceFile;
use log::{debug, warn};
use std::fs;
use std::path::PathBuf;

/// AST parser for Rust source files.
///
/// Keeps the source text next to the tree so handler bodies can later be
/// sliced out by line for argument scraping.
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    /// Module the file declares, `None` for crate roots
    pub module: Option<String>,
    pub source: String,
    pub syntax_tree: syn::File,
}

impl ParsedFile {
    /// Parses in-memory source, used by tests and host glue.
    pub fn from_source(
        path: impl Into<PathBuf>,
        module: Option<&str>,
        source: &str,
    ) -> Result<Self> {
        let path = path.into();
        let syntax_tree = syn::parse_file(source).map_err(|e| Error::ParseError {
            file: path.clone(),
            message: e.to_string(),
        })?;

        Ok(ParsedFile {
            path,
            module: module.map(str::to_string),
            source: source.to_string(),
            syntax_tree,
        })
    }

    /// Lines `start..=end` (1-based) of the source.
    pub fn lines(&self, start: usize, end: usize) -> String {
        self.source
            .lines()
            .skip(start.saturating_sub(1))
            .take(end.saturating_sub(start) + 1)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The file contains invalid Rust syntax
    pub fn parse_file(file: &SourceFile) -> Result<ParsedFile> {
        debug!("Parsing file: {}", file.path.display());

        let content = fs::read_to_string(&file.path)?;
        ParsedFile::from_source(file.path.clone(), file.module.as_deref(), &content)
    }

    /// Parses multiple Rust source files, continuing even if some fail.
    ///
    /// Files that fail to parse are logged as warnings, so the documentation
    /// of the remaining files is still produced.
    pub fn parse_files(files: &[SourceFile]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", files.len());

        let results: Vec<Result<ParsedFile>> = files
            .iter()
            .map(|file| {
                Self::parse_file(file).map_err(|e| {
                    warn!("Failed to parse {}: {}", file.path.display(), e);
                    e
                })
            })
            .collect();

        let success_count = results.iter().filter(|r| r.is_ok()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            success_count,
            results.len() - success_count
        );

        results
    }
}
