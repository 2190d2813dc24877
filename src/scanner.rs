use crate::error::{Error, Result};
use log::warn;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File scanner for traversing project directories.
///
/// The `FileScanner` recursively walks a project directory for `.rs` files and
/// names the module each file declares. The `target` directory and hidden
/// directories (those starting with `.`) are skipped.
///
/// # Example
///
/// ```no_run
/// use routedoc::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let scanner = FileScanner::new(PathBuf::from("./my-project"));
/// let result = scanner.scan().unwrap();
/// println!("Found {} Rust files", result.files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// A discovered source file and the module it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// `None` for crate roots (`main.rs`, `lib.rs`)
    pub module: Option<String>,
}

/// Result of directory scanning operation.
pub struct ScanResult {
    /// Discovered `.rs` files, in walk order
    pub files: Vec<SourceFile>,
    /// Warning messages for paths that could not be accessed
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Scans the directory tree and collects all `.rs` files.
    ///
    /// Inaccessible entries are logged and recorded in
    /// [`ScanResult::warnings`]; scanning continues past them.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a readable directory.
    pub fn scan(&self) -> Result<ScanResult> {
        if !self.root_path.is_dir() {
            return Err(Error::ConfigError(format!(
                "project path is not a directory: {}",
                self.root_path.display()
            )));
        }

        let mut files = Vec::new();
        let mut warnings = Vec::new();

        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                if e.path() == self.root_path {
                    return true;
                }
                let file_name = e.file_name().to_string_lossy();
                !file_name.starts_with('.') && file_name != "target"
            });

        for entry in walker {
            match entry {
                Ok(entry) => {
                    let path = entry.path();
                    if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("rs") {
                        files.push(SourceFile {
                            path: path.to_path_buf(),
                            module: module_name(path),
                        });
                    }
                }
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    warnings.push(warning);
                }
            }
        }

        Ok(ScanResult { files, warnings })
    }
}

/// Module declared by a file: its stem, the parent directory for `mod.rs`,
/// and nothing for crate roots.
pub fn module_name(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    match stem {
        "main" | "lib" => None,
        "mod" => path
            .parent()
            .and_then(Path::file_name)
            .and_then(|name| name.to_str())
            .map(str::to_string),
        _ => Some(stem.to_string()),
    }
}
