//! Generation request loader and input-shape validation.
//!
//! Requests are read from YAML (`.yaml`/`.yml`) or JSON (`.json`) files with
//! snake_case field names. Validation reports every offending field at once;
//! blank-named or property-less tables are not errors, they are filtered out.

use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

use crate::codegen::csharp::SOFT_DELETE_FIELD;
use crate::codegen::types::{DataType, GenerationRequest, PropertyDefinition, TableDefinition};
use crate::codegen::utils::to_pascal_case;
use crate::error::{FieldError, LoadError, ValidationError};

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z_][a-zA-Z0-9_]*$").expect("Invalid regex"));

static AFFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-zA-Z0-9_]*$").expect("Invalid regex"));

/// Upper bound for `min_length` and `max_length`
pub const MAX_TEXT_LENGTH: i64 = 65_535;

/// On-disk request encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestFormat {
    Yaml,
    Json,
}

impl RequestFormat {
    /// Pick a format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, LoadError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_lowercase();

        match ext.as_str() {
            "yaml" | "yml" => Ok(RequestFormat::Yaml),
            "json" => Ok(RequestFormat::Json),
            _ => Err(LoadError::UnsupportedFormat(ext)),
        }
    }
}

/// Load a generation request from a YAML or JSON file
///
/// # Example
///
/// ```ignore
/// use dalgen::codegen::load_request;
///
/// let request = load_request("schema.yaml").unwrap();
/// ```
pub fn load_request<P: AsRef<Path>>(path: P) -> Result<GenerationRequest, LoadError> {
    let path = path.as_ref();
    let format = RequestFormat::from_path(path)?;

    let contents = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!("Loading {:?} request from {}", format, path.display());
    parse_request(&contents, format)
}

/// Parse a request from an in-memory document
pub fn parse_request(contents: &str, format: RequestFormat) -> Result<GenerationRequest, LoadError> {
    match format {
        RequestFormat::Yaml => Ok(serde_yaml::from_str(contents)?),
        RequestFormat::Json => Ok(serde_json::from_str(contents)?),
    }
}

/// Validate the request shape and return the tables that take part in compilation
pub fn validate_request(request: &GenerationRequest) -> Result<Vec<TableDefinition>, ValidationError> {
    let errors = collect_field_errors(request);
    if !errors.is_empty() {
        return Err(ValidationError::InvalidRequest(errors));
    }

    let tables = request.valid_tables();
    if tables.is_empty() {
        return Err(ValidationError::NoValidTables);
    }

    Ok(tables)
}

/// Every field-level problem in the request, in document order
pub fn collect_field_errors(request: &GenerationRequest) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if request.root_namespace.trim().is_empty() {
        errors.push(FieldError::new("root_namespace", "is required"));
    }
    if request.context_name.trim().is_empty() {
        errors.push(FieldError::new("context_name", "is required"));
    } else if !IDENTIFIER_RE.is_match(&request.context_name) {
        errors.push(FieldError::new("context_name", "must be a valid identifier"));
    }

    let naming = &request.naming;
    for (field, value) in [
        ("naming.repository_interface_prefix", &naming.repository_interface_prefix),
        ("naming.repository_class_suffix", &naming.repository_class_suffix),
        ("naming.service_interface_prefix", &naming.service_interface_prefix),
        ("naming.service_class_suffix", &naming.service_class_suffix),
    ] {
        if !AFFIX_RE.is_match(value) {
            errors.push(FieldError::new(field, "may only contain letters, digits and underscores"));
        }
    }

    let mut entity_names = HashSet::new();
    for (t, table) in request.tables.iter().enumerate() {
        // Blank-named tables are dropped, not reported
        if table.name.trim().is_empty() {
            continue;
        }
        if !IDENTIFIER_RE.is_match(&table.name) {
            errors.push(FieldError::new(format!("tables[{}].name", t), "must be a valid identifier"));
        }
        // Entity names must stay distinct after normalization
        if table.is_valid() && !entity_names.insert(to_pascal_case(&table.name)) {
            errors.push(FieldError::new(
                format!("tables[{}].name", t),
                format!("duplicates the entity name '{}'", to_pascal_case(&table.name)),
            ));
        }
        let soft_delete = table.soft_delete_enabled(request.soft_delete);
        for (p, prop) in table.properties.iter().enumerate() {
            let path = format!("tables[{}].properties[{}]", t, p);
            validate_property(&path, prop, &mut errors);
            if soft_delete && to_pascal_case(&prop.name) == SOFT_DELETE_FIELD && !is_soft_delete_flag(prop) {
                errors.push(FieldError::new(
                    format!("{}.data_type", path),
                    "must be a non-nullable bool when soft delete is enabled",
                ));
            }
        }
    }

    errors
}

fn validate_property(path: &str, prop: &PropertyDefinition, errors: &mut Vec<FieldError>) {
    if !IDENTIFIER_RE.is_match(&prop.name) {
        errors.push(FieldError::new(format!("{}.name", path), "must be a valid identifier"));
    }

    if let Some(max) = prop.max_length {
        if !(1..=MAX_TEXT_LENGTH).contains(&max) {
            errors.push(FieldError::new(
                format!("{}.max_length", path),
                format!("must be between 1 and {}", MAX_TEXT_LENGTH),
            ));
        }
    }
    if let Some(min) = prop.min_length {
        if !(0..=MAX_TEXT_LENGTH).contains(&min) {
            errors.push(FieldError::new(
                format!("{}.min_length", path),
                format!("must be between 0 and {}", MAX_TEXT_LENGTH),
            ));
        }
        if matches!(prop.max_length, Some(max) if min > max) {
            errors.push(FieldError::new(
                format!("{}.min_length", path),
                "must not exceed max_length",
            ));
        }
    }
    if let (Some(min), Some(max)) = (prop.range_min, prop.range_max) {
        if min > max {
            errors.push(FieldError::new(
                format!("{}.range_min", path),
                "must not exceed range_max",
            ));
        }
    }
}

fn is_soft_delete_flag(prop: &PropertyDefinition) -> bool {
    prop.data_type == DataType::Boolean && !prop.nullable
}
