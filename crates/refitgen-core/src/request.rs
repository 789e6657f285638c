//! Raw options supplied for a single generation run.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use serde::Serialize;

/// The user-supplied options of one invocation, exactly as given.
///
/// Several flags are phrased as negations (`no_accept_headers`,
/// `interface_only`, ...). They are inverted when the request is turned into a
/// [`GenerationConfiguration`](crate::config::GenerationConfiguration).
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerationRequest {
    /// Path or URL of the OpenAPI document
    pub input: String,
    /// Output file; `Output.cs` when absent
    pub output: Option<PathBuf>,
    /// Namespace for the generated code
    pub namespace: Option<String>,
    /// JSON settings document used as the base configuration
    pub settings_file: Option<PathBuf>,
    pub no_auto_generated_header: bool,
    pub no_accept_headers: bool,
    pub interface_only: bool,
    pub use_api_response: bool,
    pub cancellation_tokens: bool,
    pub no_operation_headers: bool,
    pub use_iso_date_format: bool,
    /// Emit `internal` instead of `public` types
    pub internal: bool,
    pub additional_namespaces: Vec<String>,
    /// One interface per endpoint instead of a single client interface
    pub multiple_interfaces: bool,
    /// Disable usage and error telemetry
    pub no_logging: bool,
}

impl GenerationRequest {
    /// Create a request for `input` with every flag unset
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            ..Default::default()
        }
    }
}
