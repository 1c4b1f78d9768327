/// Generate xUnit test scaffolds for the data-access and service layers

use std::fmt::{self, Write};

use super::GenerationContext;
use crate::codegen::request_loader::MAX_TEXT_LENGTH;
use crate::codegen::types::{DataType, PropertyDefinition, TableDefinition};
use crate::codegen::utils::{escape_csharp_string, to_pascal_case};

/// Literal used to populate a property in generated tests
fn sample_literal(prop: &PropertyDefinition) -> String {
    match prop.data_type {
        DataType::Integer32 => "1".to_string(),
        DataType::Integer64 => "1L".to_string(),
        DataType::Text => format!("\"{}\"", escape_csharp_string(&sample_text(prop))),
        DataType::Boolean => "true".to_string(),
        DataType::DateTime => "new DateTime(2024, 1, 1)".to_string(),
        DataType::Decimal => "1m".to_string(),
        DataType::Double => "1d".to_string(),
        DataType::Float32 => "1f".to_string(),
        DataType::Guid => "Guid.Parse(\"00000000-0000-0000-0000-000000000001\")".to_string(),
        DataType::Bytes => "new byte[] { 1 }".to_string(),
    }
}

/// Text that fits the property's length bounds
fn sample_text(prop: &PropertyDefinition) -> String {
    let mut text = format!("Sample{}", to_pascal_case(&prop.name));
    let current = text.chars().count();
    let min = prop.min_length.unwrap_or(0).clamp(0, MAX_TEXT_LENGTH) as usize;
    if min > current {
        text.extend(std::iter::repeat('x').take(min - current));
    }
    if let Some(max) = prop.max_length {
        text = text.chars().take(max.clamp(1, MAX_TEXT_LENGTH) as usize).collect();
    }
    text
}

/// Properties the tests assign explicitly
fn populated(table: &TableDefinition) -> impl Iterator<Item = &PropertyDefinition> {
    table
        .properties
        .iter()
        .filter(|p| !p.foreign_key && !p.timestamp)
}

fn write_entity_initializer(output: &mut String, table: &TableDefinition, indent: &str) -> fmt::Result {
    let entity = to_pascal_case(&table.name);
    writeln!(output, "{}var entity = new {}", indent, entity)?;
    writeln!(output, "{}{{", indent)?;
    for prop in populated(table) {
        writeln!(output, "{}    {} = {},", indent, to_pascal_case(&prop.name), sample_literal(prop))?;
    }
    writeln!(output, "{}}};", indent)
}

pub fn generate_repository_tests_cs(table: &TableDefinition, ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let entity = to_pascal_case(&table.name);
    let context_name = &ctx.request.context_name;
    let repository = ctx.request.naming.repository_class(&entity);
    let keys: Vec<&PropertyDefinition> = table.primary_keys().collect();

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Tests.Repositories"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using System;")?;
    writeln!(output, "    using System.Linq;")?;
    writeln!(output, "    using System.Threading.Tasks;")?;
    writeln!(output, "    using Microsoft.EntityFrameworkCore;")?;
    writeln!(output, "    using Xunit;")?;
    writeln!(output, "    using {};", ctx.namespace("Data"))?;
    writeln!(output, "    using {};", ctx.namespace("Entities"))?;
    writeln!(output, "    using {};", ctx.namespace("Repositories.Implementations"))?;
    writeln!(output)?;
    writeln!(output, "    public class {}RepositoryTests", entity)?;
    writeln!(output, "    {{")?;
    writeln!(output, "        private static {} CreateContext()", context_name)?;
    writeln!(output, "        {{")?;
    writeln!(output, "            var options = new DbContextOptionsBuilder<{}>()", context_name)?;
    writeln!(output, "                .UseInMemoryDatabase(Guid.NewGuid().ToString())")?;
    writeln!(output, "                .Options;")?;
    writeln!(output, "            return new {}(options);", context_name)?;
    writeln!(output, "        }}")?;
    writeln!(output)?;

    if keys.is_empty() {
        // Keyless entities cannot be tracked, only queried
        writeln!(output, "        [Fact]")?;
        writeln!(output, "        public async Task CountAsync_EmptyStore_ReturnsZero()")?;
        writeln!(output, "        {{")?;
        writeln!(output, "            using var context = CreateContext();")?;
        writeln!(output, "            var repository = new {}(context);", repository)?;
        writeln!(output)?;
        writeln!(output, "            Assert.Equal(0, await repository.CountAsync());")?;
        writeln!(output, "        }}")?;
    } else {
        writeln!(output, "        [Fact]")?;
        writeln!(output, "        public async Task AddAsync_ThenRead_ReturnsEntity()")?;
        writeln!(output, "        {{")?;
        writeln!(output, "            using var context = CreateContext();")?;
        writeln!(output, "            var repository = new {}(context);", repository)?;
        write_entity_initializer(&mut output, table, "            ")?;
        writeln!(output)?;
        writeln!(output, "            await repository.AddAsync(entity);")?;
        writeln!(output, "            await repository.SaveChangesAsync();")?;
        writeln!(output)?;
        if keys.len() == 1 {
            let key = to_pascal_case(&keys[0].name);
            writeln!(output, "            var loaded = await repository.GetByIdAsync(entity.{});", key)?;
            writeln!(output, "            Assert.NotNull(loaded);")?;
            writeln!(output, "            Assert.Equal(entity.{0}, loaded!.{0});", key)?;
        } else {
            writeln!(output, "            var all = await repository.GetAllAsync();")?;
            writeln!(output, "            Assert.Single(all);")?;
        }
        writeln!(output, "            Assert.Equal(1, await repository.CountAsync());")?;
        writeln!(output, "        }}")?;
    }

    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(output)
}

pub fn generate_service_tests_cs(table: &TableDefinition, ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let naming = &ctx.request.naming;
    let entity = to_pascal_case(&table.name);
    let context_name = &ctx.request.context_name;
    let repository = naming.repository_interface(&entity);
    let service = naming.service_class(&entity);

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Tests.Services"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using System;")?;
    writeln!(output, "    using System.Collections.Generic;")?;
    writeln!(output, "    using System.Threading;")?;
    writeln!(output, "    using System.Threading.Tasks;")?;
    writeln!(output, "    using Microsoft.EntityFrameworkCore;")?;
    writeln!(output, "    using Moq;")?;
    writeln!(output, "    using Xunit;")?;
    writeln!(output, "    using {};", ctx.namespace("Data"))?;
    writeln!(output, "    using {};", ctx.namespace("Entities"))?;
    writeln!(output, "    using {};", ctx.namespace("Repositories.Interfaces"))?;
    writeln!(output, "    using {};", ctx.namespace("Services.Implementations"))?;
    writeln!(output)?;
    writeln!(output, "    public class {}ServiceTests", entity)?;
    writeln!(output, "    {{")?;
    writeln!(output, "        private readonly Mock<{}> _repository = new Mock<{}>();", repository, repository)?;
    writeln!(output, "        private readonly Mock<{}> _context;", context_name)?;
    writeln!(output, "        private readonly {} _service;", service)?;
    writeln!(output)?;
    writeln!(output, "        public {}ServiceTests()", entity)?;
    writeln!(output, "        {{")?;
    writeln!(output, "            var options = new DbContextOptionsBuilder<{}>()", context_name)?;
    writeln!(output, "                .UseInMemoryDatabase(Guid.NewGuid().ToString())")?;
    writeln!(output, "                .Options;")?;
    writeln!(output, "            _context = new Mock<{}>(options) {{ CallBase = true }};", context_name)?;
    writeln!(output, "            _context")?;
    writeln!(output, "                .Setup(c => c.SaveChangesAsync(It.IsAny<CancellationToken>()))")?;
    writeln!(output, "                .ReturnsAsync(1);")?;
    writeln!(output, "            _service = new {}(_repository.Object, _context.Object);", service)?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        [Fact]")?;
    writeln!(output, "        public async Task CreateAsync_AddsAndSavesOnce()")?;
    writeln!(output, "        {{")?;
    write_entity_initializer(&mut output, table, "            ")?;
    writeln!(output)?;
    writeln!(output, "            var created = await _service.CreateAsync(entity);")?;
    writeln!(output)?;
    writeln!(output, "            Assert.Same(entity, created);")?;
    writeln!(output, "            _repository.Verify(r => r.AddAsync(entity), Times.Once);")?;
    writeln!(output, "            _context.Verify(c => c.SaveChangesAsync(It.IsAny<CancellationToken>()), Times.Once);")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        [Fact]")?;
    writeln!(output, "        public async Task GetByIdAsync_CallsThroughToRepository()")?;
    writeln!(output, "        {{")?;
    write_entity_initializer(&mut output, table, "            ")?;
    writeln!(output, "            _repository")?;
    writeln!(output, "                .Setup(r => r.GetByIdAsync(It.IsAny<object>(), It.IsAny<bool>()))")?;
    writeln!(output, "                .ReturnsAsync(entity);")?;
    writeln!(output)?;
    writeln!(output, "            var loaded = await _service.GetByIdAsync(1);")?;
    writeln!(output)?;
    writeln!(output, "            Assert.Same(entity, loaded);")?;
    writeln!(output, "            _repository.Verify(r => r.GetByIdAsync(It.IsAny<object>(), It.IsAny<bool>()), Times.Once);")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        [Fact]")?;
    writeln!(output, "        public async Task UpdateAsync_MissingRecord_Throws()")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            _repository")?;
    writeln!(output, "                .Setup(r => r.GetByIdAsync(It.IsAny<object>(), It.IsAny<bool>()))")?;
    writeln!(output, "                .ReturnsAsync(({}?)null);", entity)?;
    writeln!(output)?;
    writeln!(
        output,
        "            await Assert.ThrowsAsync<KeyNotFoundException>(() => _service.UpdateAsync(1, new {}()));",
        entity
    )?;
    writeln!(output, "            _context.Verify(c => c.SaveChangesAsync(It.IsAny<CancellationToken>()), Times.Never);")?;
    writeln!(output, "        }}")?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::csharp::tests_support::{context_for, products_and_orders};

    #[test]
    fn test_repository_test_round_trip() {
        let mut request = products_and_orders();
        request.tables[1]
            .properties
            .push(PropertyDefinition::new("Note", DataType::Text).with_max_length(4));
        let code = context_for(&request, |ctx| generate_repository_tests_cs(&ctx.tables[1], ctx)).unwrap();

        assert!(code.contains("public class OrdersRepositoryTests"));
        assert!(code.contains(".UseInMemoryDatabase(Guid.NewGuid().ToString())"));
        assert!(code.contains("Orderid = 1,"));
        assert!(code.contains("Note = \"Samp\","));
        assert!(!code.contains("Productid = "));
        assert!(code.contains("var loaded = await repository.GetByIdAsync(entity.Orderid);"));
    }

    #[test]
    fn test_keyless_repository_test() {
        let mut request = products_and_orders();
        request.tables.push(TableDefinition::new(
            "Audit",
            vec![PropertyDefinition::new("Message", DataType::Text)],
        ));
        let code = context_for(&request, |ctx| generate_repository_tests_cs(&ctx.tables[2], ctx)).unwrap();

        assert!(code.contains("CountAsync_EmptyStore_ReturnsZero"));
        assert!(!code.contains("AddAsync(entity)"));
    }

    #[test]
    fn test_service_test_verifies_counts() {
        let request = products_and_orders();
        let code = context_for(&request, |ctx| generate_service_tests_cs(&ctx.tables[0], ctx)).unwrap();

        assert!(code.contains("private readonly Mock<IProductsRepository> _repository"));
        assert!(code.contains("new Mock<ShopContext>(options) { CallBase = true }"));
        assert!(code.contains("_repository.Verify(r => r.AddAsync(entity), Times.Once);"));
        assert!(code.contains("Assert.ThrowsAsync<KeyNotFoundException>"));
    }

    #[test]
    fn test_sample_text_respects_bounds() {
        let mut prop = PropertyDefinition::new("Code", DataType::Text);
        prop.min_length = Some(14);
        assert_eq!(sample_text(&prop), "SampleCodexxxx");
        prop.max_length = Some(3);
        assert_eq!(sample_text(&prop), "Sam");
    }

    #[test]
    fn test_sample_text_is_capped() {
        let mut prop = PropertyDefinition::new("Code", DataType::Text);
        prop.min_length = Some(1_000_000_000_000);
        assert_eq!(sample_text(&prop).chars().count(), MAX_TEXT_LENGTH as usize);
    }
}
