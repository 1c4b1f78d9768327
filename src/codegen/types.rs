//! Type definitions for schema generation requests.
//!
//! These types represent the structure of a generation request (tables,
//! typed properties, keys, relationships and naming/style options) and are
//! consumed by every generator.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn default_true() -> bool {
    true
}

fn default_root_namespace() -> String {
    "MyProject.Generated".to_string()
}

fn default_context_name() -> String {
    "ApplicationDbContext".to_string()
}

fn default_interface_prefix() -> String {
    "I".to_string()
}

fn default_repository_suffix() -> String {
    "Repository".to_string()
}

fn default_service_suffix() -> String {
    "Service".to_string()
}

/// Logical data type of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(try_from = "String", into = "String")]
pub enum DataType {
    Integer32,
    Integer64,
    #[default]
    Text,
    Boolean,
    DateTime,
    Decimal,
    Double,
    Float32,
    Guid,
    Bytes,
}

impl DataType {
    /// Canonical token used in request files
    pub fn as_str(&self) -> &'static str {
        match self {
            DataType::Integer32 => "int",
            DataType::Integer64 => "long",
            DataType::Text => "string",
            DataType::Boolean => "bool",
            DataType::DateTime => "datetime",
            DataType::Decimal => "decimal",
            DataType::Double => "double",
            DataType::Float32 => "float",
            DataType::Guid => "guid",
            DataType::Bytes => "byte[]",
        }
    }

    /// Reference types never take a nullable suffix in emitted code
    pub fn is_reference_type(&self) -> bool {
        matches!(self, DataType::Text | DataType::Bytes)
    }
}

impl FromStr for DataType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "int" | "int32" | "integer" => Ok(DataType::Integer32),
            "long" | "int64" => Ok(DataType::Integer64),
            "string" | "text" => Ok(DataType::Text),
            "bool" | "boolean" => Ok(DataType::Boolean),
            "datetime" => Ok(DataType::DateTime),
            "decimal" => Ok(DataType::Decimal),
            "double" => Ok(DataType::Double),
            "float" | "float32" | "single" => Ok(DataType::Float32),
            "guid" | "uuid" => Ok(DataType::Guid),
            "byte[]" | "bytes" | "binary" => Ok(DataType::Bytes),
            other => Err(format!("Unknown data type: '{}'", other)),
        }
    }
}

impl TryFrom<String> for DataType {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DataType> for String {
    fn from(value: DataType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy applied to dependents when a principal row is removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteBehavior {
    Cascade,
    ClientSetNull,
    SetNull,
    Restrict,
    NoAction,
}

impl DeleteBehavior {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeleteBehavior::Cascade => "Cascade",
            DeleteBehavior::ClientSetNull => "ClientSetNull",
            DeleteBehavior::SetNull => "SetNull",
            DeleteBehavior::Restrict => "Restrict",
            DeleteBehavior::NoAction => "NoAction",
        }
    }

    /// Parse a free-form token, case-insensitively
    pub fn parse_token(token: &str) -> Option<Self> {
        match token.trim().to_lowercase().as_str() {
            "cascade" => Some(DeleteBehavior::Cascade),
            "clientsetnull" => Some(DeleteBehavior::ClientSetNull),
            "setnull" => Some(DeleteBehavior::SetNull),
            "restrict" => Some(DeleteBehavior::Restrict),
            "noaction" => Some(DeleteBehavior::NoAction),
            _ => None,
        }
    }
}

/// How relational and validation metadata is expressed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ConfigurationStyle {
    #[default]
    AnnotationsAndFluentApi,
    AnnotationsOnly,
    FluentApiOnly,
}

/// Property definition in a table
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyDefinition {
    /// Property name
    pub name: String,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default = "default_true")]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,

    // Foreign key
    #[serde(default)]
    pub foreign_key: bool,
    #[serde(default)]
    pub referenced_table: Option<String>,
    #[serde(default)]
    pub referenced_property: Option<String>,
    #[serde(default)]
    pub navigation_property: Option<String>,
    /// Free-form token, resolved against [`DeleteBehavior`] at emission time
    #[serde(default)]
    pub delete_behavior: Option<String>,
    #[serde(default)]
    pub constraint_name: Option<String>,

    // Validation
    #[serde(default)]
    pub max_length: Option<i64>,
    #[serde(default)]
    pub min_length: Option<i64>,
    #[serde(default)]
    pub range_min: Option<f64>,
    #[serde(default)]
    pub range_max: Option<f64>,
    #[serde(default)]
    pub email: bool,
    #[serde(default)]
    pub phone: bool,
    #[serde(default)]
    pub url: bool,
    #[serde(default)]
    pub regex_pattern: Option<String>,

    // Storage
    #[serde(default)]
    pub column_type: Option<String>,
    #[serde(default)]
    pub timestamp: bool,
    #[serde(default)]
    pub concurrency_token: bool,
}

impl PropertyDefinition {
    /// Create a nullable text property with no metadata
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            foreign_key: false,
            referenced_table: None,
            referenced_property: None,
            navigation_property: None,
            delete_behavior: None,
            constraint_name: None,
            max_length: None,
            min_length: None,
            range_min: None,
            range_max: None,
            email: false,
            phone: false,
            url: false,
            regex_pattern: None,
            column_type: None,
            timestamp: false,
            concurrency_token: false,
        }
    }

    /// Non-nullable primary key
    pub fn key(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            primary_key: true,
            nullable: false,
            ..Self::new(name, data_type)
        }
    }

    /// Foreign key referencing `table.property`
    pub fn reference(
        name: impl Into<String>,
        data_type: DataType,
        table: impl Into<String>,
        property: impl Into<String>,
    ) -> Self {
        Self {
            foreign_key: true,
            referenced_table: Some(table.into()),
            referenced_property: Some(property.into()),
            ..Self::new(name, data_type)
        }
    }

    pub fn required(mut self) -> Self {
        self.nullable = false;
        self
    }

    pub fn with_navigation(mut self, navigation: impl Into<String>) -> Self {
        self.navigation_property = Some(navigation.into());
        self
    }

    pub fn with_max_length(mut self, max_length: i64) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Referenced table name when this is a foreign key naming a non-empty table
    pub fn principal(&self) -> Option<&str> {
        if !self.foreign_key {
            return None;
        }
        non_empty(self.referenced_table.as_deref())
    }

    /// Navigation name when set and non-empty
    pub fn navigation(&self) -> Option<&str> {
        non_empty(self.navigation_property.as_deref())
    }

    /// Explicit delete behavior, or the nullability-based default
    pub fn resolved_delete_behavior(&self) -> DeleteBehavior {
        self.delete_behavior
            .as_deref()
            .and_then(DeleteBehavior::parse_token)
            .unwrap_or(if self.nullable {
                DeleteBehavior::ClientSetNull
            } else {
                DeleteBehavior::Cascade
            })
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Table definition in a generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableDefinition {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
    /// Per-table soft-delete override; `None` inherits the request default
    #[serde(default)]
    pub soft_delete: Option<bool>,
}

impl TableDefinition {
    pub fn new(name: impl Into<String>, properties: Vec<PropertyDefinition>) -> Self {
        Self {
            name: name.into(),
            properties,
            soft_delete: None,
        }
    }

    /// Non-blank name and at least one property
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.properties.is_empty()
    }

    /// Primary key properties in declaration order
    pub fn primary_keys(&self) -> impl Iterator<Item = &PropertyDefinition> {
        self.properties.iter().filter(|p| p.primary_key)
    }

    pub fn soft_delete_enabled(&self, global_default: bool) -> bool {
        self.soft_delete.unwrap_or(global_default)
    }
}

/// Interface/class naming options for data-access and service layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamingConventionOptions {
    #[serde(default = "default_interface_prefix")]
    pub repository_interface_prefix: String,
    #[serde(default = "default_repository_suffix")]
    pub repository_class_suffix: String,
    #[serde(default = "default_interface_prefix")]
    pub service_interface_prefix: String,
    #[serde(default = "default_service_suffix")]
    pub service_class_suffix: String,
}

impl Default for NamingConventionOptions {
    fn default() -> Self {
        Self {
            repository_interface_prefix: default_interface_prefix(),
            repository_class_suffix: default_repository_suffix(),
            service_interface_prefix: default_interface_prefix(),
            service_class_suffix: default_service_suffix(),
        }
    }
}

impl NamingConventionOptions {
    pub fn repository_class(&self, entity: &str) -> String {
        format!("{}{}", entity, self.repository_class_suffix)
    }

    pub fn repository_interface(&self, entity: &str) -> String {
        format!("{}{}", self.repository_interface_prefix, self.repository_class(entity))
    }

    pub fn service_class(&self, entity: &str) -> String {
        format!("{}{}", entity, self.service_class_suffix)
    }

    pub fn service_interface(&self, entity: &str) -> String {
        format!("{}{}", self.service_interface_prefix, self.service_class(entity))
    }
}

/// Root of a generation request
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationRequest {
    #[serde(default = "default_root_namespace")]
    pub root_namespace: String,
    #[serde(default = "default_context_name")]
    pub context_name: String,
    #[serde(default)]
    pub tables: Vec<TableDefinition>,
    #[serde(default = "default_true")]
    pub service_interfaces: bool,
    #[serde(default = "default_true")]
    pub service_classes: bool,
    #[serde(default = "default_true")]
    pub async_only: bool,
    #[serde(default)]
    pub tests: bool,
    #[serde(default = "default_true")]
    pub dependency_injection: bool,
    #[serde(default)]
    pub soft_delete: bool,
    #[serde(default)]
    pub configuration_style: ConfigurationStyle,
    #[serde(default)]
    pub naming: NamingConventionOptions,
}

impl Default for GenerationRequest {
    fn default() -> Self {
        Self {
            root_namespace: default_root_namespace(),
            context_name: default_context_name(),
            tables: Vec::new(),
            service_interfaces: true,
            service_classes: true,
            async_only: true,
            tests: false,
            dependency_injection: true,
            soft_delete: false,
            configuration_style: ConfigurationStyle::default(),
            naming: NamingConventionOptions::default(),
        }
    }
}

impl GenerationRequest {
    /// Tables that participate in compilation, in request order
    pub fn valid_tables(&self) -> Vec<TableDefinition> {
        self.tables.iter().filter(|t| t.is_valid()).cloned().collect()
    }

    /// Whether any service artifact is requested
    pub fn services_requested(&self) -> bool {
        self.service_interfaces || self.service_classes
    }

    /// Starter schema: products, categories, orders and product details
    pub fn sample() -> Self {
        let products = TableDefinition::new(
            "Products",
            vec![
                PropertyDefinition::key("Id", DataType::Integer32),
                PropertyDefinition::new("Name", DataType::Text)
                    .required()
                    .with_max_length(255),
            ],
        );

        let categories = TableDefinition::new(
            "Categories",
            vec![
                PropertyDefinition::key("CategoryId", DataType::Integer32),
                PropertyDefinition::new("CategoryName", DataType::Text)
                    .required()
                    .with_max_length(100),
            ],
        );

        let orders = TableDefinition::new(
            "Orders",
            vec![
                PropertyDefinition::key("OrderId", DataType::Integer32),
                PropertyDefinition::reference("ProductId", DataType::Integer32, "Products", "Id")
                    .required()
                    .with_navigation("Product"),
                PropertyDefinition::new("OrderDate", DataType::DateTime),
                PropertyDefinition::new("Quantity", DataType::Integer32).required(),
            ],
        );

        let product_details = TableDefinition::new(
            "ProductDetails",
            vec![
                PropertyDefinition::key("DetailId", DataType::Integer32),
                PropertyDefinition::reference("ProductId", DataType::Integer32, "Products", "Id")
                    .required()
                    .with_navigation("Product"),
                PropertyDefinition::new("Description", DataType::Text).with_max_length(500),
            ],
        );

        Self {
            tables: vec![products, categories, orders, product_details],
            ..Self::default()
        }
    }
}
