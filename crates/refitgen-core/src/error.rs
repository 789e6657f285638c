//! Error handling for the refitgen code generation library.
//!
//! This module defines the main error type `Error` used throughout the library,
//! along with a convenient `Result` type alias, and the `ValidationError` type
//! returned when command input is rejected before any generation work starts.
//!
//! # Examples
//!
//! ```
//! use refitgen_core::error::{Error, Result};
//!
//! fn might_fail() -> Result<()> {
//!     Err(Error::openapi("Missing 'paths' object"))
//! }
//!
//! let err = might_fail().unwrap_err();
//! assert_eq!(err.exit_code(), 65);
//! ```

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use thiserror::Error;

/// Result type for refitgen generation operations
pub type Result<T> = std::result::Result<T, Error>;

/// Exit codes from the BSD `sysexits.h` table, used for errors without an OS code.
mod sysexits {
    pub const EX_USAGE: i32 = 64;
    pub const EX_DATAERR: i32 = 65;
    pub const EX_UNAVAILABLE: i32 = 69;
    pub const EX_SOFTWARE: i32 = 70;
    pub const EX_IOERR: i32 = 74;
    pub const EX_CONFIG: i32 = 78;
}

/// Main error type for refitgen generation operations
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Settings document could not be loaded
    #[error("Failed to load settings file {}: {source}", .path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// OpenAPI error
    #[error("OpenAPI error: {0}")]
    OpenApi(String),

    /// Remote document fetch error
    #[error("Fetch error: {0}")]
    Fetch(String),

    /// Template error
    #[error("Template error: {0}")]
    Template(String),

    /// Template engine error
    #[error("Template engine error: {0}")]
    Tera(#[from] tera::Error),
}

impl Error {
    /// Create a new OpenAPI error
    pub fn openapi<S: Into<String>>(msg: S) -> Self {
        Self::OpenApi(msg.into())
    }

    /// Create a new fetch error
    pub fn fetch<S: Into<String>>(msg: S) -> Self {
        Self::Fetch(msg.into())
    }

    /// Create a new template error
    pub fn template<S: Into<String>>(msg: S) -> Self {
        Self::Template(msg.into())
    }

    /// Short, stable name of the error kind, used in reports and telemetry.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Yaml(_) => "yaml",
            Self::Json(_) => "json",
            Self::Settings { .. } => "settings",
            Self::OpenApi(_) => "openapi",
            Self::Fetch(_) => "fetch",
            Self::Template(_) | Self::Tera(_) => "template",
        }
    }

    /// Process exit code for this error.
    ///
    /// I/O errors report the operating system's error number when one is
    /// available, so that different causes stay distinguishable. Everything
    /// else maps onto a `sysexits.h` code. The result is never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(e) => match e.raw_os_error() {
                Some(code) if code != 0 => code,
                _ => sysexits::EX_IOERR,
            },
            Self::Yaml(_) | Self::OpenApi(_) => sysexits::EX_DATAERR,
            Self::Json(_) | Self::Settings { .. } => sysexits::EX_CONFIG,
            Self::Fetch(_) => sysexits::EX_UNAVAILABLE,
            Self::Template(_) | Self::Tera(_) => sysexits::EX_SOFTWARE,
        }
    }
}

/// Reasons command input is rejected before generation starts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// No input source was given
    #[error("Input file is required")]
    MissingInput,

    /// The input names a local file that does not exist
    #[error("File not found - {}", .path.display())]
    FileNotFound { path: PathBuf },
}

impl ValidationError {
    /// Process exit code for rejected input (`EX_USAGE`)
    pub fn exit_code(&self) -> i32 {
        sysexits::EX_USAGE
    }
}
