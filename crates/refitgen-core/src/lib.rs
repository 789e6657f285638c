//! Refitgen Core Library
//!
//! This library generates Refit client interfaces and contracts for C# from
//! OpenAPI and Swagger documents, and runs a single generation request from
//! command-line options to a written source file.

pub mod builders;
pub mod config;
pub mod error;
pub mod generator;
pub mod input;
pub mod openapi;
pub mod orchestrator;
pub mod output;
pub mod request;
pub mod telemetry;
pub mod templates;
pub mod utils;

pub use crate::{
    config::{CommandLineOverrides, GenerationConfiguration, TypeAccessibility},
    error::{Error, Result, ValidationError},
    generator::{CodeGenerator, GeneratorFactory, RefitGenerator, RefitGeneratorFactory},
    input::InputSource,
    openapi::OpenApiContext,
    orchestrator::{FailureReport, Orchestrator, Outcome, SuccessReport},
    request::GenerationRequest,
    telemetry::{NoopTelemetry, RefitgenTelemetry, Telemetry},
    templates::TemplateManager,
};
