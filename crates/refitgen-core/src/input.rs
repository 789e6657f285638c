//! Classification of the input source given on the command line.
//!
//! An input is either an absolute `http`/`https` URL, whose existence is only
//! checked when the document is fetched, or a local path, which must name an
//! existing file before any generation work starts.

// Internal imports (std, crate)
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ValidationError;

// External imports (alphabetized)
use url::Url;

/// Where the OpenAPI document is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// Remote document fetched over HTTP(S)
    Remote(Url),
    /// Local file
    Local(PathBuf),
}

impl InputSource {
    /// Classify `input` without touching the filesystem.
    pub fn classify(input: &str) -> Self {
        match remote_url(input) {
            Some(url) => Self::Remote(url),
            None => Self::Local(PathBuf::from(input)),
        }
    }

    /// Classify and validate `input`.
    ///
    /// Blank input is rejected first. Remote URLs always pass. Local paths
    /// must name an existing file, and the error carries the absolute path.
    pub fn resolve(input: &str) -> Result<Self, ValidationError> {
        if input.trim().is_empty() {
            return Err(ValidationError::MissingInput);
        }

        let source = Self::classify(input);
        if let Self::Local(path) = &source {
            if !path.is_file() {
                return Err(ValidationError::FileNotFound {
                    path: absolute_path(path),
                });
            }
        }
        Ok(source)
    }

    /// Returns true for HTTP(S) sources
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(url) => write!(f, "{url}"),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parse `input` as an absolute URL with an `http` or `https` scheme.
pub fn remote_url(input: &str) -> Option<Url> {
    Url::parse(input)
        .ok()
        .filter(|url| matches!(url.scheme(), "http" | "https"))
}

/// Resolve `path` against the current working directory.
pub fn absolute_path(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_http_and_https_are_remote() {
        for input in [
            "http://localhost:5000/swagger.json",
            "https://petstore3.swagger.io/api/v3/openapi.json",
        ] {
            let source = InputSource::resolve(input).expect("remote input validates");
            assert!(source.is_remote(), "{input} should be remote");
        }
    }

    #[test]
    fn test_remote_ignores_filesystem() {
        let source = InputSource::resolve("https://does-not-exist.invalid/openapi.yaml");
        assert!(matches!(source, Ok(InputSource::Remote(_))));
    }

    #[test]
    fn test_other_schemes_are_local() {
        assert!(!InputSource::classify("ftp://example.com/openapi.json").is_remote());
        assert!(!InputSource::classify("file:///tmp/openapi.json").is_remote());
        assert!(!InputSource::classify("openapi.json").is_remote());
    }

    #[test]
    fn test_blank_input_rejected() {
        assert_eq!(
            InputSource::resolve("   "),
            Err(ValidationError::MissingInput)
        );
        assert_eq!(InputSource::resolve(""), Err(ValidationError::MissingInput));
    }

    #[test]
    fn test_missing_file_reports_absolute_path() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("nope").join("openapi.json");
        let err = InputSource::resolve(missing.to_str().unwrap()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::FileNotFound {
                path: missing.clone()
            }
        );
        assert!(err.to_string().contains(&missing.display().to_string()));
    }

    #[test]
    fn test_relative_missing_file_is_resolved() {
        let err = InputSource::resolve("definitely-missing-openapi.json").unwrap_err();
        match err {
            ValidationError::FileNotFound { path } => {
                assert!(path.is_absolute());
                assert!(path.ends_with("definitely-missing-openapi.json"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_existing_file_is_local() -> std::io::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("openapi.json");
        std::fs::write(&path, "{}")?;
        let source = InputSource::resolve(path.to_str().unwrap()).unwrap();
        assert_eq!(source, InputSource::Local(path));
        Ok(())
    }
}
