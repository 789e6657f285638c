//! Runs one generation request from configuration to written file.
//!
//! The pipeline is resolve configuration, create the generator, generate,
//! normalize line endings and write. Every failure on the way is turned into
//! an [`Outcome::Failure`] carrying the error's exit code, so callers never see
//! a raw error.

// Internal imports (std, crate)
use std::error::Error as StdError;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::{
    config::GenerationConfiguration,
    error::{Error, Result},
    generator::{GeneratorFactory, GENERATOR_VERSION},
    output::{normalize_line_endings, write_output},
    request::GenerationRequest,
    telemetry::{support_key, Telemetry},
};

// External imports (alphabetized)
use console::style;

/// Result of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessReport {
    /// Length of the written source in bytes
    pub length: usize,
    /// Absolute path of the written file
    pub output_path: PathBuf,
    pub duration: Duration,
}

/// Result of a failed run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureReport {
    pub kind: &'static str,
    pub message: String,
    /// Messages of the error's source chain, outermost first
    pub detail: Vec<String>,
    pub exit_code: i32,
    pub duration: Duration,
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success(SuccessReport),
    Failure(FailureReport),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Process exit code; zero only on success
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Success(_) => 0,
            Self::Failure(report) => report.exit_code,
        }
    }
}

/// Drives a [`GenerationRequest`] through generation and reports the result
pub struct Orchestrator<'a> {
    factory: &'a dyn GeneratorFactory,
    telemetry: &'a dyn Telemetry,
}

impl<'a> Orchestrator<'a> {
    pub fn new(factory: &'a dyn GeneratorFactory, telemetry: &'a dyn Telemetry) -> Self {
        Self { factory, telemetry }
    }

    /// Run `request`. The request must already have passed input validation.
    pub async fn run(&self, request: &GenerationRequest) -> Outcome {
        println!("{}", style(format!("refitgen v{GENERATOR_VERSION}")).bold());
        println!("Support key: {}", support_key());

        let started = Instant::now();
        match self.execute(request).await {
            Ok((length, output_path)) => {
                let duration = started.elapsed();
                println!(
                    "{} {} bytes to {}",
                    style("Wrote").green(),
                    length,
                    output_path.display()
                );
                println!("Duration: {}", format_duration(duration));

                if let Err(e) = self.telemetry.log_feature_usage(request).await {
                    log::warn!("Failed to record feature usage: {e}");
                }

                Outcome::Success(SuccessReport {
                    length,
                    output_path,
                    duration,
                })
            }
            Err(error) => {
                let duration = started.elapsed();
                let report = FailureReport {
                    kind: error.kind(),
                    message: error.to_string(),
                    detail: source_chain(&error),
                    exit_code: error.exit_code(),
                    duration,
                };
                log::info!("Reporting failure ({})", report.kind);

                eprintln!("{} {}", style("Error:").red().bold(), report.message);
                if !report.detail.is_empty() {
                    eprintln!("{}", style("Error chain:").yellow());
                    for cause in &report.detail {
                        eprintln!("  {}", style(cause).yellow());
                    }
                }

                if let Err(e) = self.telemetry.log_error(&error, request).await {
                    log::warn!("Failed to record error: {e}");
                }

                Outcome::Failure(report)
            }
        }
    }

    async fn execute(&self, request: &GenerationRequest) -> Result<(usize, PathBuf)> {
        log::info!("Resolving configuration");
        let config = GenerationConfiguration::resolve(request).await?;

        log::info!("Generating code for {}", config.input_source);
        let generator = self.factory.create(&config).await?;
        let code = normalize_line_endings(&generator.generate()?);

        log::info!("Writing {} bytes", code.len());
        let output_path = write_output(request.output.as_deref(), &code).await?;

        log::info!("Generated {}", output_path.display());
        Ok((code.len(), output_path))
    }
}

fn source_chain(error: &Error) -> Vec<String> {
    let mut chain = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        chain.push(cause.to_string());
        source = cause.source();
    }
    chain
}

/// `hh:mm:ss.mmm`
fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!(
        "{:02}:{:02}:{:02}.{:03}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60,
        duration.subsec_millis()
    )
}
