//! Emission strategies for configuration styles.
//!
//! A strategy decides which in-type annotations and which fluent property
//! entries are produced for a property. Keys, associations and soft-delete
//! filters are emitted unconditionally by the context generator and never
//! consult the strategy.

use crate::codegen::types::{ConfigurationStyle, DataType, PropertyDefinition};
use crate::codegen::utils::{csharp_number, escape_csharp_string};

/// Contract shared by every configuration style
pub trait EmissionStrategy: Send + Sync {
    /// Style this strategy implements
    fn style(&self) -> ConfigurationStyle;

    /// Attribute lines placed above a scalar property
    fn property_annotations(&self, property: &PropertyDefinition, single_key: bool) -> Vec<String>;

    /// Attribute lines placed above a dependent-side reference navigation
    fn navigation_annotations(&self, foreign_key: &str, referenced_entity: &str) -> Vec<String>;

    /// Fluent fragments chained onto `.Property(e => e.X)`
    fn property_configuration(&self, property: &PropertyDefinition) -> Vec<String>;
}

impl ConfigurationStyle {
    pub fn strategy(&self) -> &'static dyn EmissionStrategy {
        match self {
            ConfigurationStyle::AnnotationsAndFluentApi => &AnnotationsAndFluentApi,
            ConfigurationStyle::AnnotationsOnly => &AnnotationsOnly,
            ConfigurationStyle::FluentApiOnly => &FluentApiOnly,
        }
    }
}

/// Annotations on the model and fluent entries in the context
pub struct AnnotationsAndFluentApi;

/// Annotations only; the context keeps keys, associations and filters
pub struct AnnotationsOnly;

/// No annotations; everything expressible goes to the context
pub struct FluentApiOnly;

impl EmissionStrategy for AnnotationsAndFluentApi {
    fn style(&self) -> ConfigurationStyle {
        ConfigurationStyle::AnnotationsAndFluentApi
    }

    fn property_annotations(&self, property: &PropertyDefinition, single_key: bool) -> Vec<String> {
        annotations(property, single_key)
    }

    fn navigation_annotations(&self, foreign_key: &str, referenced_entity: &str) -> Vec<String> {
        foreign_key_annotation(foreign_key, referenced_entity)
    }

    fn property_configuration(&self, property: &PropertyDefinition) -> Vec<String> {
        fluent_entries(property)
    }
}

impl EmissionStrategy for AnnotationsOnly {
    fn style(&self) -> ConfigurationStyle {
        ConfigurationStyle::AnnotationsOnly
    }

    fn property_annotations(&self, property: &PropertyDefinition, single_key: bool) -> Vec<String> {
        annotations(property, single_key)
    }

    fn navigation_annotations(&self, foreign_key: &str, referenced_entity: &str) -> Vec<String> {
        foreign_key_annotation(foreign_key, referenced_entity)
    }

    fn property_configuration(&self, _property: &PropertyDefinition) -> Vec<String> {
        Vec::new()
    }
}

impl EmissionStrategy for FluentApiOnly {
    fn style(&self) -> ConfigurationStyle {
        ConfigurationStyle::FluentApiOnly
    }

    fn property_annotations(&self, _property: &PropertyDefinition, _single_key: bool) -> Vec<String> {
        Vec::new()
    }

    fn navigation_annotations(&self, _foreign_key: &str, _referenced_entity: &str) -> Vec<String> {
        Vec::new()
    }

    fn property_configuration(&self, property: &PropertyDefinition) -> Vec<String> {
        fluent_entries(property)
    }
}

fn requires_value(property: &PropertyDefinition) -> bool {
    !property.nullable && !property.primary_key && property.data_type == DataType::Text
}

fn annotations(property: &PropertyDefinition, single_key: bool) -> Vec<String> {
    let mut lines = Vec::new();

    if property.primary_key && single_key {
        lines.push("[Key]".to_string());
    }
    if let Some(max) = property.max_length {
        lines.push(format!("[MaxLength({})]", max));
    }
    if let Some(min) = property.min_length {
        lines.push(format!("[MinLength({})]", min));
    }
    if requires_value(property) {
        lines.push("[Required]".to_string());
    }
    if property.range_min.is_some() || property.range_max.is_some() {
        let min = property.range_min.map(csharp_number).unwrap_or_else(|| "double.MinValue".to_string());
        let max = property.range_max.map(csharp_number).unwrap_or_else(|| "double.MaxValue".to_string());
        lines.push(format!("[Range({}, {})]", min, max));
    }
    if property.email {
        lines.push("[EmailAddress]".to_string());
    }
    if property.phone {
        lines.push("[Phone]".to_string());
    }
    if property.url {
        lines.push("[Url]".to_string());
    }
    if let Some(pattern) = non_blank(&property.regex_pattern) {
        lines.push(format!("[RegularExpression(\"{}\")]", escape_csharp_string(pattern)));
    }
    if let Some(column_type) = non_blank(&property.column_type) {
        lines.push(format!("[Column(TypeName = \"{}\")]", escape_csharp_string(column_type)));
    }
    if property.timestamp {
        lines.push("[Timestamp]".to_string());
    }
    if property.concurrency_token {
        lines.push("[ConcurrencyCheck]".to_string());
    }

    lines
}

fn foreign_key_annotation(foreign_key: &str, referenced_entity: &str) -> Vec<String> {
    if foreign_key == format!("{}Id", referenced_entity) {
        Vec::new()
    } else {
        vec![format!("[ForeignKey(\"{}\")]", foreign_key)]
    }
}

fn fluent_entries(property: &PropertyDefinition) -> Vec<String> {
    let mut entries = Vec::new();

    if requires_value(property) {
        entries.push(".IsRequired()".to_string());
    }
    if let Some(max) = property.max_length {
        entries.push(format!(".HasMaxLength({})", max));
    }
    if let Some(column_type) = non_blank(&property.column_type) {
        entries.push(format!(".HasColumnType(\"{}\")", escape_csharp_string(column_type)));
    }
    if property.timestamp {
        entries.push(".IsRowVersion()".to_string());
    }
    if property.concurrency_token {
        entries.push(".IsConcurrencyToken()".to_string());
    }

    entries
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}
