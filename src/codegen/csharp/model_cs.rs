/// Generate one entity model class per table

use std::fmt::{self, Write};

use super::GenerationContext;
use crate::codegen::relationships::{plan_collections, CollectionSlot};
use crate::codegen::types::TableDefinition;
use crate::codegen::utils::{csharp_type, to_pascal_case};

/// Name of the appended soft-delete flag
pub const SOFT_DELETE_FIELD: &str = "IsDeleted";

pub fn generate_model_cs(table: &TableDefinition, ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let entity = to_pascal_case(&table.name);
    let single_key = table.primary_keys().count() == 1;

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Entities"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using System;")?;
    writeln!(output, "    using System.Collections.Generic;")?;
    writeln!(output, "    using System.ComponentModel.DataAnnotations;")?;
    writeln!(output, "    using System.ComponentModel.DataAnnotations.Schema;")?;
    writeln!(output)?;
    writeln!(output, "    public class {}", entity)?;
    writeln!(output, "    {{")?;

    for prop in &table.properties {
        let name = to_pascal_case(&prop.name);

        for annotation in ctx.strategy.property_annotations(prop, single_key) {
            writeln!(output, "        {}", annotation)?;
        }
        writeln!(
            output,
            "        public {} {} {{ get; set; }}",
            csharp_type(prop.data_type, prop.nullable),
            name
        )?;

        if let (Some(principal), Some(navigation)) = (prop.principal(), prop.navigation()) {
            let referenced = to_pascal_case(principal);
            for annotation in ctx.strategy.navigation_annotations(&name, &referenced) {
                writeln!(output, "        {}", annotation)?;
            }
            writeln!(
                output,
                "        public virtual {}{} {} {{ get; set; }}",
                referenced,
                if prop.nullable { "?" } else { "" },
                to_pascal_case(navigation)
            )?;
        }
    }

    for slot in plan_collections(table, ctx.relationships) {
        let info = slot.info();
        let dependent = to_pascal_case(&info.referencing_table);
        writeln!(output)?;
        match slot {
            CollectionSlot::Emitted(_) => {
                writeln!(
                    output,
                    "        public virtual ICollection<{dep}> {name} {{ get; set; }} = new List<{dep}>();",
                    dep = dependent,
                    name = info.collection_name
                )?;
            }
            CollectionSlot::Skipped(_) => {
                writeln!(output, "        {}", skipped_collection_comment(&info.collection_name, &info.referencing_table, &info.foreign_key_property))?;
            }
        }
    }

    if table.soft_delete_enabled(ctx.request.soft_delete) && !declares_soft_delete_field(table) {
        writeln!(output)?;
        writeln!(output, "        public bool {} {{ get; set; }}", SOFT_DELETE_FIELD)?;
    }

    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(output)
}

/// Placeholder emitted instead of a colliding inverse collection
pub fn skipped_collection_comment(collection: &str, referencing_table: &str, foreign_key: &str) -> String {
    format!(
        "// Inverse collection '{}' for {}.{} skipped: name conflicts with an existing member.",
        collection, referencing_table, foreign_key
    )
}

/// Whether the table already declares a property that normalizes to the flag name
pub fn declares_soft_delete_field(table: &TableDefinition) -> bool {
    table
        .properties
        .iter()
        .any(|p| to_pascal_case(&p.name) == SOFT_DELETE_FIELD)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::csharp::tests_support::{context_for, products_and_orders};
    use crate::codegen::types::{ConfigurationStyle, DataType, GenerationRequest, PropertyDefinition};

    #[test]
    fn test_model_with_inverse_collection() {
        let request = products_and_orders();
        let code = context_for(&request, |ctx| generate_model_cs(&ctx.tables[0], ctx)).unwrap();

        assert!(code.contains("namespace Shop.Entities"));
        assert!(code.contains("public class Products"));
        assert!(code.contains("[Key]\n        public int Id { get; set; }"));
        assert!(code.contains("public virtual ICollection<Orders> Orders { get; set; } = new List<Orders>();"));
    }

    #[test]
    fn test_dependent_navigation() {
        let request = products_and_orders();
        let code = context_for(&request, |ctx| generate_model_cs(&ctx.tables[1], ctx)).unwrap();

        assert!(code.contains("public int Productid { get; set; }"));
        assert!(code.contains("[ForeignKey(\"Productid\")]"));
        assert!(code.contains("public virtual Products Product { get; set; }"));
    }

    #[test]
    fn test_conflicting_collection_emits_placeholder() {
        let mut request = products_and_orders();
        request.tables[0].properties.push(PropertyDefinition::new("Orders", DataType::Text));
        let code = context_for(&request, |ctx| generate_model_cs(&ctx.tables[0], ctx)).unwrap();

        assert_eq!(code.matches(" Orders {").count(), 1);
        assert!(!code.contains("ICollection<Orders>"));
        assert_eq!(
            code.matches(&skipped_collection_comment("Orders", "Orders", "ProductId")).count(),
            1
        );
    }

    #[test]
    fn test_soft_delete_inherits_and_overrides() {
        let mut request = products_and_orders();
        request.soft_delete = true;
        request.tables[1].soft_delete = Some(false);

        let products = context_for(&request, |ctx| generate_model_cs(&ctx.tables[0], ctx)).unwrap();
        let orders = context_for(&request, |ctx| generate_model_cs(&ctx.tables[1], ctx)).unwrap();

        assert!(products.contains("public bool IsDeleted { get; set; }"));
        assert!(!orders.contains("IsDeleted"));
    }

    #[test]
    fn test_declared_flag_is_not_duplicated() {
        let mut request = GenerationRequest {
            root_namespace: "Shop".to_string(),
            soft_delete: true,
            ..GenerationRequest::default()
        };
        request.tables.push(TableDefinition::new(
            "Notes",
            vec![
                PropertyDefinition::key("Id", DataType::Integer32),
                PropertyDefinition::new("is_deleted", DataType::Boolean).required(),
            ],
        ));

        let code = context_for(&request, |ctx| generate_model_cs(&ctx.tables[0], ctx)).unwrap();
        assert_eq!(code.matches("IsDeleted").count(), 1);
    }

    #[test]
    fn test_fluent_only_model_has_no_attributes() {
        let mut request = products_and_orders();
        request.configuration_style = ConfigurationStyle::FluentApiOnly;
        let code = context_for(&request, |ctx| generate_model_cs(&ctx.tables[1], ctx)).unwrap();

        assert!(!code.contains("[Key]"));
        assert!(!code.contains("[ForeignKey"));
        assert!(code.contains("public virtual Products Product { get; set; }"));
    }
}
