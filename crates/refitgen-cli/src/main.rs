//! refitgen CLI entrypoint
//! Parses command-line arguments, validates the input and runs the generator.

// Internal imports (std, crate)
use std::path::PathBuf;
use std::process::ExitCode;

// External imports (alphabetized)
use clap::Parser;
use console::style;
use refitgen_core::{
    telemetry, GenerationRequest, InputSource, NoopTelemetry, Orchestrator, RefitGeneratorFactory,
    RefitgenTelemetry, Telemetry,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "refitgen")]
#[command(author, version, about = "Generate Refit client interfaces from OpenAPI documents", long_about = None)]
struct Cli {
    /// Path or URL to the OpenAPI document (YAML or JSON)
    ///
    /// Example: refitgen petstore.json
    /// Example: refitgen https://petstore3.swagger.io/api/v3/openapi.json
    input: Option<String>,

    /// Output file for the generated code (default: Output.cs)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Namespace for the generated code (default: GeneratedCode)
    #[arg(short, long)]
    namespace: Option<String>,

    /// JSON settings file; only the input argument overrides its values
    #[arg(long)]
    settings_file: Option<PathBuf>,

    /// Don't add the <auto-generated> header to the output
    #[arg(long)]
    no_auto_generated_header: bool,

    /// Don't add [Headers("Accept: ...")] attributes
    #[arg(long)]
    no_accept_headers: bool,

    /// Generate only the Refit interface, without contract types
    #[arg(long)]
    interface_only: bool,

    /// Return IApiResponse<T> instead of T
    #[arg(long)]
    use_api_response: bool,

    /// Add a CancellationToken parameter to every method
    #[arg(long)]
    cancellation_tokens: bool,

    /// Don't generate parameters for operation headers
    #[arg(long)]
    no_operation_headers: bool,

    /// Send date query parameters as yyyy-MM-dd
    #[arg(long)]
    use_iso_date_format: bool,

    /// Emit internal types instead of public ones
    #[arg(long)]
    internal: bool,

    /// Extra namespace to import (repeatable)
    #[arg(long = "additional-namespace", value_name = "NAMESPACE")]
    additional_namespaces: Vec<String>,

    /// Generate one interface per endpoint
    #[arg(long)]
    multiple_interfaces: bool,

    /// Don't record usage and error telemetry
    #[arg(long)]
    no_logging: bool,
}

impl Cli {
    fn into_request(self) -> GenerationRequest {
        GenerationRequest {
            input: self.input.unwrap_or_default(),
            output: self.output,
            namespace: self.namespace,
            settings_file: self.settings_file,
            no_auto_generated_header: self.no_auto_generated_header,
            no_accept_headers: self.no_accept_headers,
            interface_only: self.interface_only,
            use_api_response: self.use_api_response,
            cancellation_tokens: self.cancellation_tokens,
            no_operation_headers: self.no_operation_headers,
            use_iso_date_format: self.use_iso_date_format,
            internal: self.internal,
            additional_namespaces: self.additional_namespaces,
            multiple_interfaces: self.multiple_interfaces,
            no_logging: self.no_logging,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Initialize logging; RUST_LOG overrides the default level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let request = Cli::parse().into_request();

    match InputSource::resolve(&request.input) {
        Ok(source) => tracing::debug!(remote = source.is_remote(), "Validated input {source}"),
        Err(e) => {
            eprintln!("{} {e}", style("Error:").red().bold());
            return Ok(exit_code(e.exit_code()));
        }
    }

    let telemetry: Box<dyn Telemetry> = if request.no_logging || telemetry::disabled_by_env() {
        Box::new(NoopTelemetry)
    } else {
        Box::new(RefitgenTelemetry::new())
    };

    let factory = RefitGeneratorFactory;
    let outcome = Orchestrator::new(&factory, telemetry.as_ref())
        .run(&request)
        .await;

    Ok(exit_code(outcome.exit_code()))
}

/// Map a run's exit status onto the byte the OS keeps
fn exit_code(code: i32) -> ExitCode {
    match u8::try_from(code) {
        Ok(code) => ExitCode::from(code),
        Err(_) => ExitCode::FAILURE,
    }
}
