//! Code generation entry points.
//!
//! Generation happens in two steps. [`GeneratorFactory::create`] is async
//! because it may read or fetch the OpenAPI document. The resulting
//! [`CodeGenerator`] then renders the source synchronously, and the same
//! generator always produces the same text.

// Internal imports (std, crate)
use std::collections::BTreeSet;

use crate::{
    builders::{ContractContextBuilder, CSharpEndpointContextBuilder, EndpointContext},
    config::GenerationConfiguration,
    error::Result,
    openapi::OpenApiContext,
    templates::{ClientContext, InterfaceContext, MethodContext, TemplateManager, DEFAULT_USINGS},
    utils::{to_doc_text, to_type_name},
};

// External imports (alphabetized)
use async_trait::async_trait;

/// Name written into generated file headers
pub const GENERATOR_NAME: &str = "refitgen";

/// Version written into generated file headers
pub const GENERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Produces source text for a fixed configuration
pub trait CodeGenerator: Send {
    /// Render the source file
    fn generate(&self) -> Result<String>;
}

/// Builds a [`CodeGenerator`] bound to a configuration
#[async_trait]
pub trait GeneratorFactory: Send + Sync {
    /// Load whatever the generator needs; failures propagate unchanged
    async fn create(&self, config: &GenerationConfiguration) -> Result<Box<dyn CodeGenerator>>;
}

/// Factory for [`RefitGenerator`]
#[derive(Debug, Default, Clone, Copy)]
pub struct RefitGeneratorFactory;

#[async_trait]
impl GeneratorFactory for RefitGeneratorFactory {
    async fn create(&self, config: &GenerationConfiguration) -> Result<Box<dyn CodeGenerator>> {
        Ok(Box::new(RefitGenerator::create(config).await?))
    }
}

/// Generates Refit interfaces and contracts from an OpenAPI document
#[derive(Debug, Clone)]
pub struct RefitGenerator {
    context: ClientContext,
    templates: TemplateManager,
}

impl RefitGenerator {
    /// Load the document named by `config.input_source` and prepare generation
    pub async fn create(config: &GenerationConfiguration) -> Result<Self> {
        log::info!("Loading OpenAPI document from {}", config.input_source);
        let spec = OpenApiContext::from_file_or_url(&config.input_source).await?;
        log::info!(
            "Loaded {} document '{}' v{} (base URL: {})",
            if spec.is_swagger2() { "Swagger 2.0" } else { "OpenAPI 3" },
            spec.title().unwrap_or("untitled"),
            spec.version().unwrap_or("unknown"),
            spec.base_path().as_deref().unwrap_or("none")
        );
        Self::from_spec(&spec, config)
    }

    /// Prepare generation for an already loaded document
    pub fn from_spec(spec: &OpenApiContext, config: &GenerationConfiguration) -> Result<Self> {
        let operations = spec.parse_operations()?;
        let builder = CSharpEndpointContextBuilder::new(config, spec);
        let endpoints = EndpointContext::transform_endpoints(&builder, &operations)?;
        log::debug!(
            "Built {} endpoints from {} operations",
            endpoints.len(),
            operations.len()
        );

        let interfaces = if config.multiple_interfaces {
            endpoints
                .iter()
                .map(|endpoint| InterfaceContext {
                    name: format!("I{}Endpoint", endpoint.name),
                    summary: endpoint.summary.clone(),
                    methods: vec![MethodContext {
                        summary: None,
                        ..MethodContext::from_endpoint(endpoint, "Execute")
                    }],
                })
                .collect()
        } else {
            vec![InterfaceContext {
                name: interface_name(spec.title()),
                summary: spec.title().map(to_doc_text).filter(|s| !s.is_empty()),
                methods: endpoints
                    .iter()
                    .map(|endpoint| MethodContext::from_endpoint(endpoint, endpoint.name.clone()))
                    .collect(),
            }]
        };

        let contracts = if config.generate_contracts {
            ContractContextBuilder::new(spec).build_all()
        } else {
            Vec::new()
        };

        let usings: BTreeSet<String> = DEFAULT_USINGS
            .iter()
            .map(|ns| ns.to_string())
            .chain(
                config
                    .additional_namespaces
                    .iter()
                    .map(|ns| ns.trim().to_string())
                    .filter(|ns| !ns.is_empty()),
            )
            .collect();

        let context = ClientContext {
            generator: GENERATOR_NAME.to_string(),
            generator_version: GENERATOR_VERSION.to_string(),
            add_auto_generated_header: config.add_auto_generated_header,
            usings: usings.into_iter().collect(),
            namespace: config.namespace.clone(),
            accessibility: config.type_accessibility.to_string(),
            interfaces,
            contracts,
        };

        Ok(Self {
            context,
            templates: TemplateManager::new()?,
        })
    }

    /// The prepared template context
    pub fn context(&self) -> &ClientContext {
        &self.context
    }
}

impl CodeGenerator for RefitGenerator {
    fn generate(&self) -> Result<String> {
        self.templates.render_client(&self.context)
    }
}

/// `I{Title}Api`, or `IApiClient` for untitled documents
fn interface_name(title: Option<&str>) -> String {
    match title.map(to_type_name).filter(|name| name != "Anonymous") {
        Some(name) if name.ends_with("Api") => format!("I{name}"),
        Some(name) => format!("I{name}Api"),
        None => "IApiClient".to_string(),
    }
}
