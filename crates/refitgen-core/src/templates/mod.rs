//! Template system for code generation
//!
//! Templates are compiled into the binary and rendered with Tera.

// Internal imports (std, crate)
use std::sync::Arc;

use crate::builders::{CSharpEndpointContext, ContractContext};

// External imports (alphabetized)
use serde::Serialize;
use tera::{Context, Tera};

const CLIENT_TEMPLATE_NAME: &str = "client.cs";
const CLIENT_TEMPLATE: &str = include_str!("csharp/client.cs.tera");

/// Namespaces every generated file imports
pub const DEFAULT_USINGS: &[&str] = &[
    "Refit",
    "System.Collections.Generic",
    "System.Text.Json.Serialization",
    "System.Threading",
    "System.Threading.Tasks",
];

/// One method of a Refit interface
#[derive(Debug, Clone, Serialize)]
pub struct MethodContext {
    pub name: String,
    pub http_method: String,
    pub path: String,
    pub summary: Option<String>,
    pub deprecated: bool,
    pub accept_header: Option<String>,
    pub return_type: String,
    /// Parameter declarations in signature order
    pub parameters: Vec<String>,
}

impl MethodContext {
    /// Method for `endpoint`, named `name`
    pub fn from_endpoint(endpoint: &CSharpEndpointContext, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            http_method: endpoint.http_method.clone(),
            path: endpoint.path.clone(),
            summary: endpoint.summary.clone(),
            deprecated: endpoint.deprecated,
            accept_header: endpoint.accept_header.clone(),
            return_type: endpoint.return_type.clone(),
            parameters: endpoint.declarations(),
        }
    }
}

/// A generated Refit interface
#[derive(Debug, Clone, Serialize)]
pub struct InterfaceContext {
    pub name: String,
    pub summary: Option<String>,
    pub methods: Vec<MethodContext>,
}

/// Everything the client template renders
#[derive(Debug, Clone, Serialize)]
pub struct ClientContext {
    pub generator: String,
    pub generator_version: String,
    pub add_auto_generated_header: bool,
    /// Sorted, de-duplicated `using` namespaces
    pub usings: Vec<String>,
    pub namespace: String,
    /// `public` or `internal`
    pub accessibility: String,
    pub interfaces: Vec<InterfaceContext>,
    pub contracts: Vec<ContractContext>,
}

/// Renders generated source files
#[derive(Debug, Clone)]
pub struct TemplateManager {
    /// Cached Tera template engine instance
    tera: Arc<Tera>,
}

impl TemplateManager {
    /// Compile the built-in templates
    pub fn new() -> crate::Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(CLIENT_TEMPLATE_NAME, CLIENT_TEMPLATE)?;
        Ok(Self {
            tera: Arc::new(tera),
        })
    }

    /// Names of the registered templates
    pub fn list_templates(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }

    /// Render the client file
    pub fn render_client(&self, context: &ClientContext) -> crate::Result<String> {
        let context = Context::from_serialize(context)?;
        let rendered = self.tera.render(CLIENT_TEMPLATE_NAME, &context)?;
        Ok(rendered)
    }
}
