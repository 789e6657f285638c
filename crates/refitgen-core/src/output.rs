//! Writing generated source to disk.

// Internal imports (std, crate)
use std::path::{Path, PathBuf};

use crate::{error::Result, input::absolute_path};

// External imports (alphabetized)
use tokio::fs;

/// File name used when no output path is given
pub const DEFAULT_OUTPUT_FILE: &str = "Output.cs";

/// Line terminator of the host platform
pub const HOST_NEWLINE: &str = if cfg!(windows) { "\r\n" } else { "\n" };

/// Rewrite every line ending to the host's convention
pub fn normalize_line_endings(code: &str) -> String {
    let unix = code.replace("\r\n", "\n").replace('\r', "\n");
    if HOST_NEWLINE == "\n" {
        unix
    } else {
        unix.replace('\n', HOST_NEWLINE)
    }
}

/// Path the output will be written to
pub fn output_path(output: Option<&Path>) -> PathBuf {
    match output {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => PathBuf::from(DEFAULT_OUTPUT_FILE),
    }
}

/// Write `code` to `output` (or [`DEFAULT_OUTPUT_FILE`]), creating the parent
/// directory when it is missing. Returns the absolute path written.
pub async fn write_output(output: Option<&Path>, code: &str) -> Result<PathBuf> {
    let path = output_path(output);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if !fs::try_exists(parent).await? {
            log::debug!("Creating output directory {}", parent.display());
            fs::create_dir_all(parent).await?;
        }
    }

    fs::write(&path, code).await?;
    Ok(absolute_path(&path))
}
