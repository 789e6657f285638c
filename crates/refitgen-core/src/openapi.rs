//! OpenAPI specification parsing and utilities.
//!
//! This module provides functionality for loading and querying OpenAPI 3 and
//! Swagger 2 documents. It supports loading from files or HTTP(S) URLs, in
//! either JSON or YAML, and provides accessors for the pieces the generator
//! needs: document metadata, operations and named schemas.
//!
//! # Examples
//!
//! ```no_run
//! use refitgen_core::openapi::OpenApiContext;
//! use refitgen_core::error::Result;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<()> {
//! let spec = OpenApiContext::from_file_or_url("openapi.yaml").await?;
//!
//! if let Some(title) = spec.title() {
//!     println!("API Title: {}", title);
//! }
//! for op in spec.parse_operations()? {
//!     println!("{} {}", op.method.to_uppercase(), op.path);
//! }
//! # Ok(())
//! # }
//! ```

// Internal imports (std, crate)
use std::collections::BTreeMap;
use std::path::Path;

use crate::{input, Error};

// External imports (alphabetized)
use serde::{Deserialize, Serialize};
use serde_json::{json, Map as JsonMap, Value as JsonValue};
use tokio::fs;

/// HTTP methods recognised on a path item, in emission order
pub const HTTP_METHODS: [&str; 8] = [
    "get", "put", "post", "delete", "options", "head", "patch", "trace",
];

/// Represents an OpenAPI specification
#[derive(Debug, serde::Serialize)]
#[serde(transparent)]
pub struct OpenApiContext {
    /// The raw JSON value of the OpenAPI spec
    pub json: JsonValue,
}

impl OpenApiContext {
    /// Create a new OpenApiContext from a file or URL (supports both YAML and JSON)
    pub async fn from_file_or_url<P: AsRef<str>>(location: P) -> crate::Result<Self> {
        let location = location.as_ref();

        if let Some(url) = input::remote_url(location) {
            return Self::from_url(url.as_str()).await;
        }

        Self::from_file(location).await
    }

    /// Create a new OpenApiContext from a file (supports both YAML and JSON)
    pub async fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).await?;
        Self::parse_content(&content).map_err(|e| {
            Error::openapi(format!(
                "Failed to parse OpenAPI spec at {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Create a new OpenApiContext from a URL (supports both YAML and JSON)
    pub async fn from_url(url: &str) -> crate::Result<Self> {
        log::debug!("Fetching OpenAPI spec from {url}");
        let response = reqwest::get(url).await.map_err(|e| {
            Error::fetch(format!("Failed to fetch OpenAPI spec from {}: {}", url, e))
        })?;

        if !response.status().is_success() {
            return Err(Error::fetch(format!(
                "Failed to fetch OpenAPI spec from {}: HTTP {}",
                url,
                response.status()
            )));
        }

        let content = response.text().await.map_err(|e| {
            Error::fetch(format!("Failed to read response from {}: {}", url, e))
        })?;

        Self::parse_content(&content).map_err(|e| {
            Error::openapi(format!("Failed to parse OpenAPI spec from {}: {}", url, e))
        })
    }

    /// Parse content as either JSON or YAML
    pub fn parse_content(content: &str) -> Result<Self, String> {
        if let Ok(json) = serde_json::from_str(content) {
            return Ok(Self { json });
        }

        if let Ok(json) = serde_yaml::from_str(content) {
            return Ok(Self { json });
        }

        Err("content is neither valid JSON nor YAML".to_string())
    }

    /// Get the title of the API
    pub fn title(&self) -> Option<&str> {
        self.json.get("info")?.get("title")?.as_str()
    }

    /// Get the version of the API
    pub fn version(&self) -> Option<&str> {
        self.json.get("info")?.get("version")?.as_str()
    }

    /// Returns true for Swagger 2.0 documents
    pub fn is_swagger2(&self) -> bool {
        self.json.get("swagger").is_some()
    }

    /// Get the base path of the API
    pub fn base_path(&self) -> Option<String> {
        // OpenAPI 3.0+ servers
        if let Some(servers) = self.json.get("servers").and_then(|s| s.as_array()) {
            if let Some(url) = servers
                .first()
                .and_then(|server| server.get("url"))
                .and_then(|u| u.as_str())
            {
                return Some(url.to_string());
            }
        }

        // Swagger 2.0 host + basePath
        let host = self.json.get("host").and_then(|h| h.as_str())?;
        let base_path = self
            .json
            .get("basePath")
            .and_then(|bp| bp.as_str())
            .unwrap_or("");
        let scheme = match self.json.get("schemes").and_then(|s| s.as_array()) {
            Some(schemes) if schemes.iter().any(|s| s.as_str() == Some("https")) => "https",
            Some(schemes) => schemes.first().and_then(|s| s.as_str()).unwrap_or("https"),
            None => "https",
        };
        Some(format!("{}://{}{}", scheme, host, base_path))
    }

    /// Follow a local `$ref` (e.g. `#/components/schemas/Pet`).
    ///
    /// Values without a `$ref` are returned unchanged. Unresolvable references
    /// yield `None`.
    pub fn resolve_ref<'a>(&'a self, value: &'a JsonValue) -> Option<&'a JsonValue> {
        match value.get("$ref").and_then(JsonValue::as_str) {
            Some(reference) => reference
                .strip_prefix('#')
                .and_then(|pointer| self.json.pointer(pointer)),
            None => Some(value),
        }
    }

    /// Named schemas, from `components/schemas` or Swagger 2 `definitions`
    pub fn schemas(&self) -> BTreeMap<String, JsonValue> {
        self.json
            .pointer("/components/schemas")
            .or_else(|| self.json.get("definitions"))
            .and_then(JsonValue::as_object)
            .map(|map| map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default()
    }

    /// Media types the document produces by default (Swagger 2 `produces`)
    pub fn default_produces(&self) -> Vec<String> {
        string_array(self.json.get("produces"))
    }

    /// Parse every operation of every path
    ///
    /// Paths are visited in key order and methods in [`HTTP_METHODS`] order,
    /// so the result is stable for a given document.
    pub fn parse_operations(&self) -> crate::Result<Vec<OpenApiOperation>> {
        let mut operations = Vec::new();
        let paths = self
            .json
            .get("paths")
            .and_then(JsonValue::as_object)
            .ok_or_else(|| Error::openapi("Missing 'paths' object"))?;

        for (path, item) in paths {
            let path_params = self.extract_parameters(item);
            for method in HTTP_METHODS {
                let Some(method_value) = item.get(method) else {
                    continue;
                };
                let Some(method_item) = method_value.as_object() else {
                    continue;
                };

                let operation_id = method_item
                    .get("operationId")
                    .and_then(JsonValue::as_str)
                    .map(String::from)
                    .unwrap_or_else(|| {
                        format!(
                            "{}_{}",
                            method,
                            path.trim_start_matches('/').replace('/', "_")
                        )
                    });

                let mut parameters = path_params.clone();
                for param in self.extract_parameters(method_value) {
                    // Operation-level parameters replace path-level ones with the same name/location
                    parameters.retain(|p| !(p.name == param.name && p.in_ == param.in_));
                    parameters.push(param);
                }

                operations.push(OpenApiOperation {
                    id: operation_id,
                    method: method.to_string(),
                    path: path.clone(),
                    summary: string_field(method_item, "summary"),
                    description: string_field(method_item, "description"),
                    tags: Some(string_array(method_item.get("tags"))).filter(|t| !t.is_empty()),
                    parameters,
                    request_body: method_item
                        .get("requestBody")
                        .and_then(|body| self.resolve_ref(body))
                        .cloned(),
                    responses: self.extract_responses(method_item),
                    deprecated: method_item.get("deprecated").and_then(JsonValue::as_bool),
                    produces: Some(string_array(method_item.get("produces")))
                        .filter(|p| !p.is_empty()),
                });
            }
        }
        Ok(operations)
    }

    /// Extract the parameters declared on a path item or operation, resolving `$ref`s
    pub fn extract_parameters(&self, item: &JsonValue) -> Vec<OpenApiParameter> {
        item.get("parameters")
            .and_then(JsonValue::as_array)
            .map(|arr| {
                arr.iter()
                    .filter_map(|param| self.resolve_ref(param))
                    .filter_map(|param| serde_json::from_value(param.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Extract responses from an operation object, resolving `$ref`s
    pub fn extract_responses(
        &self,
        operation: &JsonMap<String, JsonValue>,
    ) -> BTreeMap<String, OpenApiResponse> {
        operation
            .get("responses")
            .and_then(JsonValue::as_object)
            .map(|map| {
                map.iter()
                    .filter_map(|(status, response)| {
                        let response = self.resolve_ref(response)?;
                        serde_json::from_value(response.clone())
                            .ok()
                            .map(|resp| (status.clone(), resp))
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

fn string_field(map: &JsonMap<String, JsonValue>, key: &str) -> Option<String> {
    map.get(key).and_then(JsonValue::as_str).map(String::from)
}

fn string_array(value: Option<&JsonValue>) -> Vec<String> {
    value
        .and_then(JsonValue::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(JsonValue::as_str)
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

/// Name of the schema a `$ref` points at (its last path segment)
pub fn ref_name(reference: &str) -> Option<&str> {
    reference.rsplit('/').next().filter(|name| !name.is_empty())
}

/// Parsed OpenAPI operation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OpenApiOperation {
    /// Unique string used to identify the operation.
    #[serde(rename = "operationId")]
    pub id: String,
    /// Lowercase HTTP method (e.g., "get")
    pub method: String,
    /// The path where this operation is defined (e.g., "/pet/findByStatus")
    pub path: String,
    /// Tags for logical grouping of operations.
    pub tags: Option<Vec<String>>,
    /// A short summary of what the operation does.
    pub summary: Option<String>,
    /// A verbose explanation of the operation behavior.
    pub description: Option<String>,
    /// Path-level and operation-level parameters, with `$ref`s resolved.
    pub parameters: Vec<OpenApiParameter>,
    /// The request body applicable for this operation (OpenAPI 3).
    #[serde(rename = "requestBody")]
    pub request_body: Option<JsonValue>,
    /// Responses keyed by status code.
    pub responses: BTreeMap<String, OpenApiResponse>,
    /// Declares this operation to be deprecated.
    pub deprecated: Option<bool>,
    /// Media types the operation produces (Swagger 2).
    pub produces: Option<Vec<String>>,
}

impl OpenApiOperation {
    /// The first 2xx response, or `default` when there is none
    pub fn success_response(&self) -> Option<(&str, &OpenApiResponse)> {
        self.responses
            .iter()
            .find(|(status, _)| status.starts_with('2'))
            .or_else(|| self.responses.get_key_value("default"))
            .map(|(status, resp)| (status.as_str(), resp))
    }

    /// Schema of the request body, from `requestBody` or a Swagger 2 `in: body` parameter
    pub fn request_body_schema(&self) -> Option<JsonValue> {
        if let Some(body) = &self.request_body {
            return body
                .get("content")
                .and_then(JsonValue::as_object)
                .and_then(preferred_media)
                .and_then(|media| media.get("schema"))
                .cloned();
        }

        self.parameters
            .iter()
            .find(|p| p.in_ == "body")
            .and_then(|p| p.schema.clone())
    }

    /// Whether the request body is marked required
    pub fn request_body_required(&self) -> bool {
        match &self.request_body {
            Some(body) => body
                .get("required")
                .and_then(JsonValue::as_bool)
                .unwrap_or(false),
            None => self
                .parameters
                .iter()
                .any(|p| p.in_ == "body" && p.required.unwrap_or(false)),
        }
    }
}

/// Prefer JSON content when several media types are declared
fn preferred_media(content: &JsonMap<String, JsonValue>) -> Option<&JsonValue> {
    content
        .iter()
        .find(|(media, _)| media.contains("json"))
        .or_else(|| content.iter().next())
        .map(|(_, value)| value)
}

/// Information about a single parameter in an OpenAPI operation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenApiParameter {
    /// The name of the parameter. Parameter names are case sensitive.
    pub name: String,
    /// The location of the parameter: "query", "header", "path", "cookie", or "body"/"formData" in Swagger 2.
    #[serde(rename = "in")]
    pub in_: String,
    /// A brief description of the parameter.
    pub description: Option<String>,
    /// Determines whether this parameter is mandatory.
    pub required: Option<bool>,
    /// The schema defining the type used for the parameter.
    pub schema: Option<JsonValue>,
    /// Swagger 2 inline type
    #[serde(rename = "type")]
    pub type_: Option<String>,
    /// Swagger 2 inline format
    pub format: Option<String>,
    /// Swagger 2 inline array items
    pub items: Option<JsonValue>,
}

impl OpenApiParameter {
    /// The parameter's schema, synthesised from Swagger 2 inline fields when needed
    pub fn effective_schema(&self) -> Option<JsonValue> {
        if let Some(schema) = &self.schema {
            return Some(schema.clone());
        }
        let type_ = self.type_.as_ref()?;
        let mut schema = json!({ "type": type_ });
        if let Some(format) = &self.format {
            schema["format"] = json!(format);
        }
        if let Some(items) = &self.items {
            schema["items"] = items.clone();
        }
        Some(schema)
    }

    pub fn is_required(&self) -> bool {
        self.in_ == "path" || self.required.unwrap_or(false)
    }
}

/// A single response of an operation
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct OpenApiResponse {
    /// A short description of the response.
    pub description: Option<String>,
    /// Payloads keyed by media type (OpenAPI 3).
    pub content: Option<BTreeMap<String, JsonValue>>,
    /// Payload schema (Swagger 2).
    pub schema: Option<JsonValue>,
}

impl OpenApiResponse {
    /// Schema of the response body, preferring JSON media types
    pub fn body_schema(&self) -> Option<JsonValue> {
        if let Some(schema) = &self.schema {
            return Some(schema.clone());
        }
        let content = self.content.as_ref()?;
        content
            .iter()
            .find(|(media, _)| media.contains("json"))
            .or_else(|| content.iter().next())
            .and_then(|(_, media)| media.get("schema"))
            .cloned()
    }

    /// Declared media types (OpenAPI 3)
    pub fn media_types(&self) -> Vec<String> {
        self.content
            .as_ref()
            .map(|content| content.keys().cloned().collect())
            .unwrap_or_default()
    }
}
