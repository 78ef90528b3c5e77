//! Error types shared by every configuration backend.

/// Errors raised by the configuration layer.
///
/// "Key not found" is deliberately absent: scalar reads return `Ok(None)` and
/// recursive reads return an empty tree or map.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The URI handed to the factory has no usable scheme.
    #[error("Ill-formed URI '{uri}': {message}")]
    IllFormedUri { uri: String, message: String },

    /// No backend constructor is registered for the URI scheme.
    #[error("Unrecognized backend '{scheme}'")]
    UnrecognizedBackend { scheme: String },

    /// The backend exists but was compiled out of this build.
    #[error("Back-end '{backend}' not enabled")]
    BackendDisabled { backend: String },

    /// The backing document could not be parsed.
    #[error("Parse error in {source_name}{}: {message}", .line.map(|l| format!(" line {}", l)).unwrap_or_default())]
    Parse {
        source_name: String,
        line: Option<usize>,
        message: String,
    },

    /// A stored value could not be converted to the requested type.
    #[error("Cannot convert value '{value}' at '{path}' to {target}")]
    Conversion {
        path: String,
        value: String,
        target: &'static str,
    },

    /// A path requires a node to be both a leaf and a branch.
    #[error("Path conflict at '{path}': {message}")]
    PathConflict { path: String, message: String },

    /// A path cannot be used for the requested operation.
    #[error("Invalid path: {message}")]
    InvalidPath { message: String },

    /// A file backend was pointed at a file type it cannot parse.
    #[error("Invalid type in file name '{path}'")]
    UnsupportedFileType { path: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Backend-specific failure (connection, protocol, encoding).
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl Error {
    /// Shorthand for [`Error::Backend`].
    pub fn backend(message: impl Into<String>) -> Self {
        Error::Backend {
            message: message.into(),
        }
    }
}
