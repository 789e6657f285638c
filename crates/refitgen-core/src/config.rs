//! Configuration management for refitgen code generation.
//!
//! This module defines [`GenerationConfiguration`], the settings record read by
//! the generator, and the rules for assembling it from a
//! [`GenerationRequest`]:
//!
//! 1. the base is either the defaults with the command-line flags applied, or
//!    a JSON settings document loaded from disk;
//! 2. the [`CommandLineOverrides`] are then applied on top, so a settings
//!    document can never redirect which OpenAPI document is read.
//!
//! # Examples
//!
//! ```
//! use refitgen_core::config::{GenerationConfiguration, TypeAccessibility};
//! use refitgen_core::GenerationRequest;
//!
//! let mut request = GenerationRequest::new("openapi.json");
//! request.no_accept_headers = true;
//! request.internal = true;
//!
//! let config = GenerationConfiguration::from_request(&request);
//! assert!(!config.add_accept_headers);
//! assert!(config.add_auto_generated_header);
//! assert_eq!(config.type_accessibility, TypeAccessibility::Internal);
//! assert_eq!(config.namespace, "GeneratedCode");
//! ```

// Internal imports (std, crate)
use std::fmt;
use std::path::Path;

use crate::{Error, GenerationRequest};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Namespace used when none is given
pub const DEFAULT_NAMESPACE: &str = "GeneratedCode";

/// Visibility keyword applied to every generated type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeAccessibility {
    #[default]
    #[serde(alias = "Public")]
    Public,
    #[serde(alias = "Internal")]
    Internal,
}

impl TypeAccessibility {
    /// The C# keyword
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for TypeAccessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Settings consumed by the generator
///
/// Serialized field names are camelCase; this is also the shape of a settings
/// document. Unknown fields are ignored and absent fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationConfiguration {
    /// Path or URL of the OpenAPI document
    #[serde(rename = "openApiPath")]
    pub input_source: String,

    /// Namespace of the generated code
    pub namespace: String,

    /// Emit the `<auto-generated>` file header
    pub add_auto_generated_header: bool,

    /// Emit `[Headers("Accept: ...")]` attributes
    pub add_accept_headers: bool,

    /// Emit contract types for the document's schemas
    pub generate_contracts: bool,

    /// Wrap return types in `IApiResponse`
    #[serde(rename = "returnIApiResponse")]
    pub return_api_response: bool,

    /// Add a trailing `CancellationToken` parameter to every method
    pub use_cancellation_tokens: bool,

    /// Emit header parameters declared by operations
    pub generate_operation_headers: bool,

    /// Format `date` query parameters as `yyyy-MM-dd`
    pub use_iso_date_format: bool,

    /// Visibility of generated types
    pub type_accessibility: TypeAccessibility,

    /// Extra `using` directives
    pub additional_namespaces: Vec<String>,

    /// Generate one interface per endpoint
    pub multiple_interfaces: bool,
}

impl Default for GenerationConfiguration {
    fn default() -> Self {
        Self {
            input_source: String::new(),
            namespace: DEFAULT_NAMESPACE.to_string(),
            add_auto_generated_header: true,
            add_accept_headers: true,
            generate_contracts: true,
            return_api_response: false,
            use_cancellation_tokens: false,
            generate_operation_headers: true,
            use_iso_date_format: false,
            type_accessibility: TypeAccessibility::Public,
            additional_namespaces: Vec::new(),
            multiple_interfaces: false,
        }
    }
}

impl GenerationConfiguration {
    /// Map command-line flags onto configuration fields.
    ///
    /// Negated flags are inverted: `no_auto_generated_header`,
    /// `no_accept_headers`, `interface_only` and `no_operation_headers`.
    pub fn from_request(request: &GenerationRequest) -> Self {
        Self {
            input_source: request.input.clone(),
            namespace: request
                .namespace
                .clone()
                .filter(|ns| !ns.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()),
            add_auto_generated_header: !request.no_auto_generated_header,
            add_accept_headers: !request.no_accept_headers,
            generate_contracts: !request.interface_only,
            return_api_response: request.use_api_response,
            use_cancellation_tokens: request.cancellation_tokens,
            generate_operation_headers: !request.no_operation_headers,
            use_iso_date_format: request.use_iso_date_format,
            type_accessibility: if request.internal {
                TypeAccessibility::Internal
            } else {
                TypeAccessibility::Public
            },
            additional_namespaces: request.additional_namespaces.clone(),
            multiple_interfaces: request.multiple_interfaces,
        }
    }

    /// Load a configuration from a JSON settings document
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        serde_json::from_str(&content).map_err(|source| Error::Settings {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Save the configuration as a JSON settings document
    pub async fn save<P: AsRef<Path>>(&self, path: P) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Assemble the configuration for `request`.
    ///
    /// The base comes from the settings file when one is given, otherwise from
    /// the command-line flags. [`CommandLineOverrides`] are applied last.
    pub async fn resolve(request: &GenerationRequest) -> crate::Result<Self> {
        let mut config = match request
            .settings_file
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
        {
            Some(path) => {
                log::info!("Loading settings from {}", path.display());
                Self::from_file(path).await?
            }
            None => Self::from_request(request),
        };

        CommandLineOverrides::from_request(request).apply(&mut config);
        log::debug!("Resolved configuration: {config:?}");
        Ok(config)
    }
}

/// Fields that the command line always wins on, whatever the base was.
///
/// Only the input source is overridden. The remaining flags are ignored when
/// a settings document is used.
#[derive(Debug, Clone)]
pub struct CommandLineOverrides {
    input_source: String,
}

impl CommandLineOverrides {
    /// Settings-document field names covered by the overrides
    pub const FIELDS: &'static [&'static str] = &["openApiPath"];

    pub fn from_request(request: &GenerationRequest) -> Self {
        Self {
            input_source: request.input.clone(),
        }
    }

    /// Overwrite the covered fields of `config`
    pub fn apply(&self, config: &mut GenerationConfiguration) {
        config.input_source.clone_from(&self.input_source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_without_flags() {
        let config = GenerationConfiguration::from_request(&GenerationRequest::new("api.json"));
        assert_eq!(config.input_source, "api.json");
        assert_eq!(config.namespace, DEFAULT_NAMESPACE);
        assert!(config.add_auto_generated_header);
        assert!(config.add_accept_headers);
        assert!(config.generate_contracts);
        assert!(config.generate_operation_headers);
        assert!(!config.return_api_response);
        assert!(!config.use_cancellation_tokens);
        assert!(!config.use_iso_date_format);
        assert!(!config.multiple_interfaces);
        assert_eq!(config.type_accessibility, TypeAccessibility::Public);
        assert_eq!(
            config,
            GenerationConfiguration {
                input_source: "api.json".into(),
                ..Default::default()
            }
        );
    }

    #[test]
    fn test_negated_flags_invert() {
        let mut request = GenerationRequest::new("api.json");
        request.no_auto_generated_header = true;
        request.no_accept_headers = true;
        request.interface_only = true;
        request.no_operation_headers = true;

        let config = GenerationConfiguration::from_request(&request);
        assert!(!config.add_auto_generated_header);
        assert!(!config.add_accept_headers);
        assert!(!config.generate_contracts);
        assert!(!config.generate_operation_headers);
    }

    #[test]
    fn test_direct_flags_pass_through() {
        let mut request = GenerationRequest::new("api.json");
        request.namespace = Some("Petstore.Client".into());
        request.use_api_response = true;
        request.cancellation_tokens = true;
        request.use_iso_date_format = true;
        request.multiple_interfaces = true;
        request.internal = true;
        request.additional_namespaces = vec!["System.Net.Http".into()];

        let config = GenerationConfiguration::from_request(&request);
        assert_eq!(config.namespace, "Petstore.Client");
        assert!(config.return_api_response);
        assert!(config.use_cancellation_tokens);
        assert!(config.use_iso_date_format);
        assert!(config.multiple_interfaces);
        assert_eq!(config.type_accessibility, TypeAccessibility::Internal);
        assert_eq!(config.additional_namespaces, vec!["System.Net.Http"]);
    }

    #[tokio::test]
    async fn test_settings_file_cannot_redirect_input() -> crate::Result<()> {
        let dir = tempdir()?;
        let settings_path = dir.path().join("petstore.json");
        tokio::fs::write(
            &settings_path,
            r#"{
                "openApiPath": "https://elsewhere.example.com/openapi.json",
                "namespace": "FromSettings",
                "addAcceptHeaders": false,
                "typeAccessibility": "internal",
                "someFutureField": 42
            }"#,
        )
        .await?;

        let mut request = GenerationRequest::new("local/openapi.yaml");
        request.settings_file = Some(settings_path);
        request.namespace = Some("FromFlags".into());

        let config = GenerationConfiguration::resolve(&request).await?;
        assert_eq!(config.input_source, "local/openapi.yaml");
        assert_eq!(config.namespace, "FromSettings");
        assert!(!config.add_accept_headers);
        assert!(config.generate_contracts);
        assert_eq!(config.type_accessibility, TypeAccessibility::Internal);
        Ok(())
    }

    #[tokio::test]
    async fn test_malformed_settings_is_fatal() -> crate::Result<()> {
        let dir = tempdir()?;
        let settings_path = dir.path().join("broken.json");
        tokio::fs::write(&settings_path, r#"{"namespace": 12}"#).await?;

        let mut request = GenerationRequest::new("openapi.json");
        request.settings_file = Some(settings_path.clone());

        let err = GenerationConfiguration::resolve(&request).await.unwrap_err();
        match &err {
            Error::Settings { path, .. } => assert_eq!(path, &settings_path),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.exit_code(), 78);
        Ok(())
    }

    #[tokio::test]
    async fn test_settings_roundtrip() -> crate::Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("settings.json");

        let mut config = GenerationConfiguration {
            input_source: "openapi.json".into(),
            ..Default::default()
        };
        config.multiple_interfaces = true;
        config.additional_namespaces = vec!["Contoso.Shared".into()];
        config.save(&file_path).await?;

        let saved = tokio::fs::read_to_string(&file_path).await?;
        assert!(saved.contains("\"openApiPath\""));
        assert!(saved.contains("\"returnIApiResponse\""));

        let loaded = GenerationConfiguration::from_file(&file_path).await?;
        assert_eq!(loaded, config);
        Ok(())
    }

    #[test]
    fn test_overrides_cover_input_source() {
        let mut config = GenerationConfiguration {
            input_source: "settings.yaml".into(),
            ..Default::default()
        };
        CommandLineOverrides::from_request(&GenerationRequest::new("cli.yaml")).apply(&mut config);
        assert_eq!(config.input_source, "cli.yaml");
        assert_eq!(CommandLineOverrides::FIELDS, &["openApiPath"]);
    }

    #[test]
    fn test_accessibility_accepts_pascal_case() -> crate::Result<()> {
        let internal: TypeAccessibility = serde_json::from_str("\"Internal\"")?;
        let public: TypeAccessibility = serde_json::from_str("\"Public\"")?;
        assert_eq!(internal, TypeAccessibility::Internal);
        assert_eq!(public, TypeAccessibility::Public);
        assert_eq!(serde_json::to_string(&internal)?, "\"internal\"");
        Ok(())
    }
}
