//! C# Refit endpoint context builder.

use std::collections::BTreeSet;

use super::contracts::is_contract_schema;
use super::EndpointContextBuilder;
use crate::config::GenerationConfiguration;
use crate::openapi::{ref_name, OpenApiContext, OpenApiOperation, OpenApiParameter};
use crate::utils::{
    escape_string_literal, to_doc_text, to_parameter_name, to_type_name, unique_name,
};
use serde::Serialize;
use serde_json::Value as JsonValue;

/// C# types that need a `?` suffix to become optional
const VALUE_TYPES: &[&str] = &[
    "bool",
    "int",
    "long",
    "float",
    "double",
    "System.DateTimeOffset",
    "System.Guid",
];

/// Longest chain of `$ref` aliases followed before giving up
const MAX_REF_DEPTH: usize = 16;

const BODY_PARAMETER: &str = "body";
const CANCELLATION_PARAMETER: &str = "cancellationToken";

/// Where a parameter is bound in the HTTP request
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterKind {
    Path,
    Query,
    Header,
    Body,
    Cancellation,
}

/// A single C# method parameter
#[derive(Clone, Debug, Serialize)]
pub struct CSharpParameterInfo {
    /// Name as declared in the document
    pub original_name: String,
    /// C# identifier
    pub name: String,
    pub type_name: String,
    pub kind: ParameterKind,
    pub required: bool,
    /// Complete declaration, e.g. `[Query] int? limit = default`
    pub declaration: String,
}

/// Context for one Refit method
#[derive(Clone, Debug, Serialize)]
pub struct CSharpEndpointContext {
    /// PascalCase operation name
    pub name: String,
    /// Refit verb attribute name (`Get`, `Post`, ...)
    pub http_method: String,
    /// Raw path as defined in the document (e.g., "/pet/{petId}")
    pub path: String,
    pub summary: Option<String>,
    pub deprecated: bool,
    /// Value of the `Accept` header attribute, when emitted
    pub accept_header: Option<String>,
    /// Full return type, e.g. `Task<IApiResponse<Pet>>`
    pub return_type: String,
    pub parameters: Vec<CSharpParameterInfo>,
    pub tags: Vec<String>,
}

impl CSharpEndpointContext {
    /// Parameter declarations in signature order
    pub fn declarations(&self) -> Vec<String> {
        self.parameters
            .iter()
            .map(|p| p.declaration.clone())
            .collect()
    }
}


/// Maps OpenAPI schemas to C# types.
///
/// A `$ref` keeps the schema's name only when that schema is generated as a
/// contract. References to aliases (arrays, primitives, free-form maps) are
/// followed and mapped inline.
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    spec: &'a OpenApiContext,
}

impl<'a> TypeMapper<'a> {
    pub fn new(spec: &'a OpenApiContext) -> Self {
        Self { spec }
    }

    /// C# type for `schema`
    pub fn csharp_type(&self, schema: Option<&JsonValue>) -> String {
        self.map(schema, 0)
    }

    /// `type_name` as an optional value; value types and enums get a `?`
    pub fn optional(&self, schema: Option<&JsonValue>, type_name: &str) -> String {
        if VALUE_TYPES.contains(&type_name) || self.is_enum_ref(schema) {
            format!("{type_name}?")
        } else {
            type_name.to_string()
        }
    }

    fn map(&self, schema: Option<&JsonValue>, depth: usize) -> String {
        let Some(schema) = schema else {
            return "object".to_string();
        };

        if let Some(reference) = schema.get("$ref").and_then(JsonValue::as_str) {
            return match self.spec.resolve_ref(schema) {
                Some(target) if is_contract_schema(target) => ref_name(reference)
                    .map(to_type_name)
                    .unwrap_or_else(|| "object".to_string()),
                Some(target) if depth < MAX_REF_DEPTH => self.map(Some(target), depth + 1),
                _ => {
                    log::debug!("Cannot resolve '{reference}', mapping to object");
                    "object".to_string()
                }
            };
        }

        let format = schema.get("format").and_then(JsonValue::as_str);
        match schema.get("type").and_then(JsonValue::as_str) {
            Some("string") => match format {
                Some("date") | Some("date-time") => "System.DateTimeOffset",
                Some("uuid") => "System.Guid",
                Some("binary") => "System.IO.Stream",
                _ => "string",
            }
            .to_string(),
            Some("integer") => match format {
                Some("int64") => "long",
                _ => "int",
            }
            .to_string(),
            Some("number") => match format {
                Some("float") => "float",
                _ => "double",
            }
            .to_string(),
            Some("boolean") => "bool".to_string(),
            Some("array") => format!("ICollection<{}>", self.map(schema.get("items"), depth)),
            _ => match schema.get("additionalProperties") {
                Some(values @ JsonValue::Object(_)) => {
                    format!("IDictionary<string, {}>", self.map(Some(values), depth))
                }
                Some(JsonValue::Bool(true)) => "IDictionary<string, object>".to_string(),
                _ => "object".to_string(),
            },
        }
    }

    /// True when `schema` reaches an enum through one or more `$ref`s
    fn is_enum_ref(&self, schema: Option<&JsonValue>) -> bool {
        let mut current = schema;
        let mut followed = false;
        for _ in 0..=MAX_REF_DEPTH {
            match current {
                Some(value) if value.get("$ref").is_some() => {
                    current = self.spec.resolve_ref(value);
                    followed = true;
                }
                Some(value) => {
                    return followed && value.get("enum").is_some_and(JsonValue::is_array);
                }
                None => return false,
            }
        }
        false
    }
}

/// A parameter whose name may still change
struct PendingParameter {
    original_name: String,
    name: String,
    type_name: String,
    kind: ParameterKind,
    required: bool,
    attributes: Vec<String>,
}

impl PendingParameter {
    fn declare(self) -> CSharpParameterInfo {
        let mut attributes = self.attributes;
        if matches!(self.kind, ParameterKind::Path | ParameterKind::Query)
            && self.name.trim_start_matches('@') != self.original_name
        {
            attributes.push(format!(
                "AliasAs(\"{}\")",
                escape_string_literal(&self.original_name)
            ));
        }
        let attributes = if attributes.is_empty() {
            String::new()
        } else {
            format!("[{}] ", attributes.join(", "))
        };
        let default = if self.required { "" } else { " = default" };
        CSharpParameterInfo {
            declaration: format!("{attributes}{} {}{default}", self.type_name, self.name),
            original_name: self.original_name,
            name: self.name,
            type_name: self.type_name,
            kind: self.kind,
            required: self.required,
        }
    }
}

/// Builds [`CSharpEndpointContext`]s according to the generation settings
#[derive(Debug, Clone)]
pub struct CSharpEndpointContextBuilder<'a> {
    config: &'a GenerationConfiguration,
    types: TypeMapper<'a>,
    default_produces: Vec<String>,
}

impl<'a> CSharpEndpointContextBuilder<'a> {
    pub fn new(config: &'a GenerationConfiguration, spec: &'a OpenApiContext) -> Self {
        Self {
            config,
            types: TypeMapper::new(spec),
            default_produces: spec.default_produces(),
        }
    }

    fn return_type(&self, op: &OpenApiOperation) -> String {
        let payload = op
            .success_response()
            .and_then(|(_, response)| response.body_schema())
            .map(|schema| self.types.csharp_type(Some(&schema)));

        match (payload, self.config.return_api_response) {
            (Some(t), true) => format!("Task<IApiResponse<{t}>>"),
            (None, true) => "Task<IApiResponse>".to_string(),
            (Some(t), false) => format!("Task<{t}>"),
            (None, false) => "Task".to_string(),
        }
    }

    fn accept_header(&self, op: &OpenApiOperation) -> Option<String> {
        if !self.config.add_accept_headers {
            return None;
        }
        let mut media_types = op
            .success_response()
            .map(|(_, response)| response.media_types())
            .unwrap_or_default();
        if media_types.is_empty() {
            media_types = op
                .produces
                .clone()
                .unwrap_or_else(|| self.default_produces.clone());
        }
        Some(media_types.join(", ")).filter(|accept| !accept.is_empty())
    }

    fn pending(
        &self,
        original_name: String,
        name: String,
        schema: Option<&JsonValue>,
        kind: ParameterKind,
        required: bool,
        attributes: Vec<String>,
    ) -> PendingParameter {
        let type_name = self.types.csharp_type(schema);
        let type_name = if required {
            type_name
        } else {
            self.types.optional(schema, &type_name)
        };
        PendingParameter {
            original_name,
            name,
            type_name,
            kind,
            required,
            attributes,
        }
    }

    fn parameter(&self, param: &OpenApiParameter) -> Option<PendingParameter> {
        let schema = param.effective_schema();

        let (kind, attributes) = match param.in_.as_str() {
            "path" => (ParameterKind::Path, Vec::new()),
            "query" => {
                let field = |key: &str| {
                    schema
                        .as_ref()
                        .and_then(|s| s.get(key))
                        .and_then(JsonValue::as_str)
                };
                let is_array = field("type") == Some("array");
                let is_date = field("format") == Some("date");
                let query = if is_array {
                    "Query(CollectionFormat.Multi)".to_string()
                } else if is_date && self.config.use_iso_date_format {
                    "Query(Format = \"yyyy-MM-dd\")".to_string()
                } else {
                    "Query".to_string()
                };
                (ParameterKind::Query, vec![query])
            }
            "header" if self.config.generate_operation_headers => (
                ParameterKind::Header,
                vec![format!("Header(\"{}\")", escape_string_literal(&param.name))],
            ),
            // Swagger 2 body parameters come through the request body
            "body" => return None,
            other => {
                log::debug!("Skipping {other} parameter '{}'", param.name);
                return None;
            }
        };

        Some(self.pending(
            param.name.clone(),
            to_parameter_name(&param.name),
            schema.as_ref(),
            kind,
            param.is_required(),
            attributes,
        ))
    }
}

impl EndpointContextBuilder for CSharpEndpointContextBuilder<'_> {
    type Context = CSharpEndpointContext;

    fn build(&self, op: &OpenApiOperation) -> crate::Result<Option<CSharpEndpointContext>> {
        let Some(http_method) = refit_verb(&op.method) else {
            log::warn!(
                "Skipping {} {}: HTTP method not supported by Refit",
                op.method.to_uppercase(),
                op.path
            );
            return Ok(None);
        };

        // Synthetic parameters keep their names, document parameters get suffixed
        let mut taken = BTreeSet::new();
        let body = op.request_body_schema().map(|schema| {
            taken.insert(BODY_PARAMETER.to_string());
            self.pending(
                BODY_PARAMETER.to_string(),
                BODY_PARAMETER.to_string(),
                Some(&schema),
                ParameterKind::Body,
                op.request_body_required(),
                vec!["Body".to_string()],
            )
        });
        if self.config.use_cancellation_tokens {
            taken.insert(CANCELLATION_PARAMETER.to_string());
        }

        let mut pending: Vec<PendingParameter> = op
            .parameters
            .iter()
            .filter_map(|param| self.parameter(param))
            .collect();
        for param in &mut pending {
            param.name = unique_name(&param.name, &mut taken);
        }
        pending.extend(body);

        // Optional parameters must follow required ones in a C# signature
        pending.sort_by_key(|p| !p.required);

        let mut parameters: Vec<CSharpParameterInfo> =
            pending.into_iter().map(PendingParameter::declare).collect();

        if self.config.use_cancellation_tokens {
            parameters.push(CSharpParameterInfo {
                original_name: CANCELLATION_PARAMETER.to_string(),
                name: CANCELLATION_PARAMETER.to_string(),
                type_name: "CancellationToken".to_string(),
                kind: ParameterKind::Cancellation,
                required: false,
                declaration: format!("CancellationToken {CANCELLATION_PARAMETER} = default"),
            });
        }

        let summary = op
            .summary
            .as_deref()
            .or(op.description.as_deref())
            .map(to_doc_text)
            .filter(|s| !s.is_empty());

        Ok(Some(CSharpEndpointContext {
            name: to_type_name(&op.id),
            http_method: http_method.to_string(),
            path: op.path.clone(),
            summary,
            deprecated: op.deprecated.unwrap_or(false),
            accept_header: self.accept_header(op),
            return_type: self.return_type(op),
            parameters,
            tags: op.tags.clone().unwrap_or_default(),
        }))
    }

    fn sort_key(context: &CSharpEndpointContext) -> &str {
        &context.name
    }

    fn rename(context: &mut CSharpEndpointContext, name: String) {
        context.name = name;
    }
}

/// Refit attribute for a lowercase HTTP method
fn refit_verb(method: &str) -> Option<&'static str> {
    match method {
        "get" => Some("Get"),
        "put" => Some("Put"),
        "post" => Some("Post"),
        "delete" => Some("Delete"),
        "patch" => Some("Patch"),
        "head" => Some("Head"),
        "options" => Some("Options"),
        _ => None,
    }
}
