//! Schema compiler for data-access layers.
//!
//! This module turns a [`GenerationRequest`] (tables, typed properties, keys,
//! foreign keys and naming/style options) into a deterministic set of C#
//! source files: entity models, a persistence context, generic and per-table
//! repositories, and optional services, test scaffolds and DI wiring.

pub mod types;
pub mod utils;
pub mod relationships;
pub mod strategy;
pub mod request_loader;
pub mod fs_utils;
pub mod csharp;

use std::fmt;
use std::path::Path;

// Re-export key types
pub use types::{
    ConfigurationStyle, DataType, DeleteBehavior, GenerationRequest, NamingConventionOptions,
    PropertyDefinition, TableDefinition,
};
pub use relationships::{resolve_relationships, InverseRelationshipInfo, RelationshipMap};
pub use strategy::EmissionStrategy;
pub use request_loader::{load_request, parse_request, validate_request, RequestFormat};
pub use csharp::{ArtifactKind, GeneratedFile, GenerationContext};

use crate::error::GenerationError;

/// Compile already-validated tables into the full artifact set
///
/// Per-table artifacts come first, table by table in request order,
/// followed by the once-only artifacts. Identical inputs always produce
/// identical output.
pub fn compile(request: &GenerationRequest, tables: &[TableDefinition]) -> Result<Vec<GeneratedFile>, fmt::Error> {
    let relationships = resolve_relationships(tables);
    let ctx = GenerationContext::new(request, tables, &relationships);

    let mut files = Vec::new();
    for table in tables {
        files.extend(csharp::generate_table_artifacts(table, &ctx)?);
    }
    files.extend(csharp::generate_shared_artifacts(&ctx)?);

    tracing::debug!(tables = tables.len(), files = files.len(), "Compiled request");
    Ok(files)
}

/// Write compiled artifacts below `output_dir`
pub fn write_artifacts(files: &[GeneratedFile], output_dir: &Path) -> Result<(), GenerationError> {
    for file in files {
        let path = output_dir.join(&file.path);
        fs_utils::write_file(&path, &file.contents).map_err(|e| GenerationError::io(&path, e))?;
    }
    Ok(())
}

/// Stage compiled artifacts in a fresh temporary tree and zip them into `archive_path`
///
/// Nothing outside the temporary tree is read or removed. Returns the number
/// of files archived.
pub fn write_archive(files: &[GeneratedFile], archive_path: &Path) -> Result<usize, GenerationError> {
    let staging = tempfile::Builder::new()
        .prefix("dalgen-staging-")
        .tempdir()
        .map_err(|e| GenerationError::io(std::env::temp_dir(), e))?;

    write_artifacts(files, staging.path())?;
    let count = fs_utils::archive_directory(staging.path(), archive_path)?;

    let root = staging.path().to_path_buf();
    staging.close().map_err(|e| GenerationError::io(root, e))?;
    Ok(count)
}
