/// Generate the persistence context for the whole table list

use std::fmt::{self, Write};

use super::GenerationContext;
use crate::codegen::csharp::model_cs::SOFT_DELETE_FIELD;
use crate::codegen::relationships::inverse_collection_for;
use crate::codegen::types::TableDefinition;
use crate::codegen::utils::{collection_name, escape_csharp_string, to_pascal_case};

pub fn generate_context_cs(ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let context_name = &ctx.request.context_name;

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Data"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using Microsoft.EntityFrameworkCore;")?;
    writeln!(output, "    using {};", ctx.namespace("Entities"))?;
    writeln!(output)?;
    writeln!(output, "    public class {} : DbContext", context_name)?;
    writeln!(output, "    {{")?;
    writeln!(output, "        public {0}(DbContextOptions<{0}> options) : base(options)", context_name)?;
    writeln!(output, "        {{")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;

    for table in ctx.tables {
        let entity = to_pascal_case(&table.name);
        writeln!(
            output,
            "        public DbSet<{}> {} {{ get; set; }}",
            entity,
            collection_name(&entity)
        )?;
    }

    writeln!(output)?;
    writeln!(output, "        protected override void OnModelCreating(ModelBuilder modelBuilder)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            base.OnModelCreating(modelBuilder);")?;

    for table in ctx.tables {
        writeln!(output)?;
        write_entity_configuration(&mut output, table, ctx)?;
    }

    writeln!(output, "        }}")?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(output)
}

fn write_entity_configuration(
    output: &mut String,
    table: &TableDefinition,
    ctx: &GenerationContext<'_>,
) -> fmt::Result {
    let entity = to_pascal_case(&table.name);
    writeln!(output, "            // {}", entity)?;

    // Keys
    let keys: Vec<String> = table
        .primary_keys()
        .map(|p| format!("e.{}", to_pascal_case(&p.name)))
        .collect();
    match keys.len() {
        0 => writeln!(output, "            modelBuilder.Entity<{}>().HasNoKey();", entity)?,
        1 => writeln!(output, "            modelBuilder.Entity<{}>().HasKey(e => {});", entity, keys[0])?,
        _ => writeln!(
            output,
            "            modelBuilder.Entity<{}>().HasKey(e => new {{ {} }});",
            entity,
            keys.join(", ")
        )?,
    }

    // Property constraints
    for prop in &table.properties {
        let entries = ctx.strategy.property_configuration(prop);
        if entries.is_empty() {
            continue;
        }
        writeln!(output, "            modelBuilder.Entity<{}>()", entity)?;
        write!(output, "                .Property(e => e.{})", to_pascal_case(&prop.name))?;
        for entry in entries {
            write!(output, "\n                {}", entry)?;
        }
        writeln!(output, ";")?;
    }

    // Associations
    for prop in &table.properties {
        let Some(principal) = prop.principal() else {
            continue;
        };
        let referenced = to_pascal_case(principal);

        writeln!(output, "            modelBuilder.Entity<{}>()", entity)?;
        match prop.navigation() {
            Some(nav) => write!(output, "                .HasOne(e => e.{})", to_pascal_case(nav))?,
            None => write!(output, "                .HasOne<{}>()", referenced)?,
        }
        match inverse_collection_for(ctx.tables, ctx.relationships, table, &prop.name, principal) {
            Some(collection) => write!(output, "\n                .WithMany(p => p.{})", collection)?,
            None => write!(output, "\n                .WithMany()")?,
        }
        write!(output, "\n                .HasForeignKey(e => e.{})", to_pascal_case(&prop.name))?;
        write!(
            output,
            "\n                .OnDelete(DeleteBehavior.{})",
            prop.resolved_delete_behavior().as_str()
        )?;
        if let Some(constraint) = prop.constraint_name.as_deref().filter(|c| !c.trim().is_empty()) {
            write!(output, "\n                .HasConstraintName(\"{}\")", escape_csharp_string(constraint))?;
        }
        writeln!(output, ";")?;
    }

    if table.soft_delete_enabled(ctx.request.soft_delete) {
        writeln!(
            output,
            "            modelBuilder.Entity<{}>().HasQueryFilter(e => !e.{});",
            entity, SOFT_DELETE_FIELD
        )?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::csharp::tests_support::{context_for, products_and_orders};
    use crate::codegen::types::{ConfigurationStyle, DataType, PropertyDefinition};

    #[test]
    fn test_context_sets_and_keys() {
        let request = products_and_orders();
        let code = context_for(&request, generate_context_cs).unwrap();

        assert!(code.contains("public class ShopContext : DbContext"));
        assert!(code.contains("public DbSet<Products> Products { get; set; }"));
        assert!(code.contains("public DbSet<Orders> Orders { get; set; }"));
        assert!(code.contains("modelBuilder.Entity<Products>().HasKey(e => e.Id);"));
        assert!(code.contains("modelBuilder.Entity<Orders>().HasKey(e => e.Orderid);"));
    }

    #[test]
    fn test_association_binds_inverse_collection() {
        let request = products_and_orders();
        let code = context_for(&request, generate_context_cs).unwrap();

        assert!(code.contains(
            "modelBuilder.Entity<Orders>()\n                .HasOne(e => e.Product)\n                .WithMany(p => p.Orders)\n                .HasForeignKey(e => e.Productid)\n                .OnDelete(DeleteBehavior.Cascade);"
        ));
    }

    #[test]
    fn test_composite_key_order() {
        let mut request = products_and_orders();
        request.tables.push(TableDefinition::new(
            "order_line",
            vec![
                PropertyDefinition::key("order_id", DataType::Integer32),
                PropertyDefinition::key("line_no", DataType::Integer32),
            ],
        ));
        let code = context_for(&request, generate_context_cs).unwrap();

        assert!(code.contains("modelBuilder.Entity<OrderLine>().HasKey(e => new { e.OrderId, e.LineNo });"));
    }

    #[test]
    fn test_dangling_reference_uses_unnamed_many() {
        let mut request = products_and_orders();
        let mut customer = PropertyDefinition::reference("CustomerId", DataType::Integer32, "Customers", "Id");
        customer.delete_behavior = Some("NoAction".to_string());
        customer.constraint_name = Some("FK_Orders_Customers".to_string());
        request.tables[1].properties.push(customer);

        let code = context_for(&request, generate_context_cs).unwrap();
        assert!(code.contains(
            ".HasOne<Customers>()\n                .WithMany()\n                .HasForeignKey(e => e.Customerid)\n                .OnDelete(DeleteBehavior.NoAction)\n                .HasConstraintName(\"FK_Orders_Customers\");"
        ));
    }

    #[test]
    fn test_fluent_entries_follow_style() {
        let mut request = products_and_orders();
        request.tables[0]
            .properties
            .push(PropertyDefinition::new("Name", DataType::Text).required().with_max_length(255));

        let both = context_for(&request, generate_context_cs).unwrap();
        assert!(both.contains(".Property(e => e.Name)\n                .IsRequired()\n                .HasMaxLength(255);"));

        request.configuration_style = ConfigurationStyle::AnnotationsOnly;
        let annotations_only = context_for(&request, generate_context_cs).unwrap();
        assert!(!annotations_only.contains(".Property(e => e.Name)"));
        assert!(annotations_only.contains("HasKey(e => e.Id)"));
        assert!(annotations_only.contains(".WithMany(p => p.Orders)"));
    }

    #[test]
    fn test_soft_delete_filter() {
        let mut request = products_and_orders();
        request.soft_delete = true;
        request.tables[1].soft_delete = Some(false);
        let code = context_for(&request, generate_context_cs).unwrap();

        assert!(code.contains("modelBuilder.Entity<Products>().HasQueryFilter(e => !e.IsDeleted);"));
        assert!(!code.contains("modelBuilder.Entity<Orders>().HasQueryFilter"));
    }

    #[test]
    fn test_keyless_table() {
        let mut request = products_and_orders();
        request.tables.push(TableDefinition::new(
            "AuditEntry",
            vec![PropertyDefinition::new("Message", DataType::Text)],
        ));
        let code = context_for(&request, generate_context_cs).unwrap();
        assert!(code.contains("modelBuilder.Entity<Auditentry>().HasNoKey();"));
    }
}
