use std::path::PathBuf;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the library
#[derive(Debug)]
pub enum Error {
    IoError(std::io::Error),
    /// A configuration value is missing, has the wrong type, or is out of range.
    ConfigError(String),
    /// An export destination already exists and overwriting was not requested.
    TargetExists(PathBuf),
    /// An export destination whose replacement would remove the working
    /// directory or the filesystem root.
    UnsafeTarget(PathBuf),
    ParseError { file: PathBuf, message: String },
    SerializationError(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "IO error: {}", e),
            Error::ConfigError(msg) => write!(f, "Invalid configuration: {}", msg),
            Error::TargetExists(dest) => write!(
                f,
                "Target {} exists, use -f or --force to override",
                dest.display()
            ),
            Error::UnsafeTarget(dest) => write!(
                f,
                "Refusing to replace {}: it contains the working directory",
                dest.display()
            ),
            Error::ParseError { file, message } => {
                write!(f, "Parse error in {}: {}", file.display(), message)
            }
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::SerializationError(format!("JSON: {}", err))
    }
}
