//! Test utilities for refitgen integration tests
#![allow(dead_code)]

// Internal imports (std, crate)
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

// External imports (alphabetized)
use anyhow::Context;
use tempfile::TempDir;

/// Creates a temporary directory for test outputs
pub fn create_temp_dir() -> anyhow::Result<(TempDir, PathBuf)> {
    let temp_dir = tempfile::tempdir()?;
    let temp_path = temp_dir.path().to_path_buf();
    Ok((temp_dir, temp_path))
}

/// Runs the refitgen binary in `dir` with telemetry disabled
pub fn run_refitgen(dir: &Path, args: &[&str]) -> anyhow::Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_refitgen"))
        .current_dir(dir)
        .env("REFITGEN_TELEMETRY_DISABLED", "1")
        .arg("--no-logging")
        .args(args)
        .output()
        .context("Failed to run refitgen")
}

/// Creates a test OpenAPI spec file in the given directory
pub fn create_test_openapi_spec(dir: &Path) -> anyhow::Result<PathBuf> {
    let spec_path = dir.join("openapi.yaml");
    let spec_content = r#"
openapi: 3.0.0
info:
  title: Test API
  version: 1.0.0
  description: Test API for refitgen integration tests

servers:
  - url: http://localhost:8080/api/v1
    description: Development server

paths:
  /pets:
    get:
      operationId: listPets
      summary: List all pets
      description: Returns all pets from the system that the user has access to
      parameters:
        - $ref: '#/components/parameters/limitParam'
      responses:
        '200':
          description: A list of pets
          content:
            application/json:
              schema:
                type: array
                items:
                  $ref: '#/components/schemas/Pet'
        default:
          description: Unexpected error
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Error'

    post:
      operationId: createPet
      summary: Create a pet
      requestBody:
        required: true
        content:
          application/json:
            schema:
              $ref: '#/components/schemas/NewPet'
      responses:
        '201':
          description: Pet created successfully
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
        default:
          $ref: '#/components/responses/Error'

  /pets/{petId}:
    get:
      operationId: getPetById
      summary: Get pet by ID
      parameters:
        - $ref: '#/components/parameters/petIdParam'
      responses:
        '200':
          description: A pet
          content:
            application/json:
              schema:
                $ref: '#/components/schemas/Pet'
        '404':
          description: Pet not found

components:
  schemas:
    Pet:
      type: object
      required:
        - id
        - name
      properties:
        id:
          type: integer
          format: int64
        name:
          type: string
        tag:
          type: string

    NewPet:
      type: object
      required:
        - name
      properties:
        name:
          type: string
        tag:
          type: string

    Error:
      type: object
      required:
        - code
        - message
      properties:
        code:
          type: integer
          format: int32
        message:
          type: string

  parameters:
    limitParam:
      name: limit
      in: query
      description: Maximum number of items to return
      required: false
      schema:
        type: integer
        format: int32
        minimum: 1
        default: 10

    petIdParam:
      name: petId
      in: path
      description: ID of pet to return
      required: true
      schema:
        type: integer
        format: int64

  responses:
    Error:
      description: Unexpected error
      content:
        application/json:
          schema:
            $ref: '#/components/schemas/Error'"#;

    fs::write(&spec_path, spec_content)?;
    Ok(spec_path)
}

/// Asserts that a file contains specific content
///
/// # Arguments
/// * `path` - Path to the file to check
/// * `contents` - Slice of string slices that should all be present in the file
///
/// # Returns
/// * `Ok(())` if all contents are found
/// * `Err` with a descriptive message if the file is missing or any content is not found
pub fn assert_file_contains<P: AsRef<Path>>(path: P, contents: &[&str]) -> anyhow::Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(anyhow::anyhow!("File not found: {}", path.display()));
    }

    let file_content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    let missing_contents: Vec<&str> = contents
        .iter()
        .copied()
        .filter(|expected| !file_content.contains(expected))
        .collect();

    if !missing_contents.is_empty() {
        return Err(anyhow::anyhow!(
            "File {} is missing expected content:\n  {}",
            path.display(),
            missing_contents.join("\n  ")
        ));
    }

    Ok(())
}

/// Asserts that a file contains none of the given snippets
pub fn assert_file_lacks<P: AsRef<Path>>(path: P, contents: &[&str]) -> anyhow::Result<()> {
    let path = path.as_ref();
    let file_content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;

    if let Some(found) = contents.iter().find(|c| file_content.contains(*c)) {
        return Err(anyhow::anyhow!(
            "File {} unexpectedly contains: {}",
            path.display(),
            found
        ));
    }

    Ok(())
}
