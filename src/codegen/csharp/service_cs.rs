/// Generate the optional service layer wrapping each table's repository

use std::fmt::{self, Write};

use super::GenerationContext;
use crate::codegen::types::TableDefinition;
use crate::codegen::utils::to_pascal_case;

pub fn generate_service_interface_cs(table: &TableDefinition, ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let entity = to_pascal_case(&table.name);

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Services.Interfaces"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using System.Collections.Generic;")?;
    writeln!(output, "    using System.Threading.Tasks;")?;
    writeln!(output, "    using {};", ctx.namespace("Entities"))?;
    writeln!(output)?;
    writeln!(output, "    public interface {}", ctx.request.naming.service_interface(&entity))?;
    writeln!(output, "    {{")?;
    writeln!(output, "        Task<{}?> GetByIdAsync(object id);", entity)?;
    writeln!(output, "        Task<IEnumerable<{}>> GetAllAsync();", entity)?;
    writeln!(output, "        Task<{0}> CreateAsync({0} entity);", entity)?;
    writeln!(output, "        Task UpdateAsync(object id, {} entity);", entity)?;
    writeln!(output, "        Task DeleteAsync(object id, bool hardDelete = false);")?;

    if !ctx.request.async_only {
        writeln!(output)?;
        writeln!(output, "        {}? GetById(object id);", entity)?;
        writeln!(output, "        IEnumerable<{}> GetAll();", entity)?;
        writeln!(output, "        {0} Create({0} entity);", entity)?;
        writeln!(output, "        void Update(object id, {} entity);", entity)?;
        writeln!(output, "        void Delete(object id, bool hardDelete = false);")?;
    }

    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(output)
}

pub fn generate_service_cs(table: &TableDefinition, ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let naming = &ctx.request.naming;
    let entity = to_pascal_case(&table.name);
    let class = naming.service_class(&entity);
    let repository = naming.repository_interface(&entity);
    let context_name = &ctx.request.context_name;

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Services.Implementations"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using System.Collections.Generic;")?;
    writeln!(output, "    using System.Threading.Tasks;")?;
    writeln!(output, "    using {};", ctx.namespace("Data"))?;
    writeln!(output, "    using {};", ctx.namespace("Entities"))?;
    writeln!(output, "    using {};", ctx.namespace("Repositories.Interfaces"))?;
    if ctx.request.service_interfaces {
        writeln!(output, "    using {};", ctx.namespace("Services.Interfaces"))?;
    }
    writeln!(output)?;
    if ctx.request.service_interfaces {
        writeln!(output, "    public class {} : {}", class, naming.service_interface(&entity))?;
    } else {
        writeln!(output, "    public class {}", class)?;
    }
    writeln!(output, "    {{")?;
    writeln!(output, "        private readonly {} _repository;", repository)?;
    writeln!(output, "        private readonly {} _context;", context_name)?;
    writeln!(output)?;
    writeln!(output, "        public {}({} repository, {} context)", class, repository, context_name)?;
    writeln!(output, "        {{")?;
    writeln!(output, "            _repository = repository;")?;
    writeln!(output, "            _context = context;")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task<{}?> GetByIdAsync(object id)", entity)?;
    writeln!(output, "        {{")?;
    writeln!(output, "            return await _repository.GetByIdAsync(id);")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task<IEnumerable<{}>> GetAllAsync()", entity)?;
    writeln!(output, "        {{")?;
    writeln!(output, "            return await _repository.GetAllAsync();")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task<{0}> CreateAsync({0} entity)", entity)?;
    writeln!(output, "        {{")?;
    writeln!(output, "            await _repository.AddAsync(entity);")?;
    writeln!(output, "            await _context.SaveChangesAsync();")?;
    writeln!(output, "            return entity;")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task UpdateAsync(object id, {} entity)", entity)?;
    writeln!(output, "        {{")?;
    write_existing_lookup(&mut output, &entity)?;
    writeln!(output, "            _context.Entry(existing).CurrentValues.SetValues(entity);")?;
    writeln!(output, "            await _context.SaveChangesAsync();")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task DeleteAsync(object id, bool hardDelete = false)")?;
    writeln!(output, "        {{")?;
    write_existing_lookup(&mut output, &entity)?;
    writeln!(output, "            _repository.Remove(existing, hardDelete);")?;
    writeln!(output, "            await _context.SaveChangesAsync();")?;
    writeln!(output, "        }}")?;

    if !ctx.request.async_only {
        writeln!(output)?;
        writeln!(output, "        public {}? GetById(object id)", entity)?;
        writeln!(output, "        {{")?;
        writeln!(output, "            return GetByIdAsync(id).GetAwaiter().GetResult();")?;
        writeln!(output, "        }}")?;
        writeln!(output)?;
        writeln!(output, "        public IEnumerable<{}> GetAll()", entity)?;
        writeln!(output, "        {{")?;
        writeln!(output, "            return GetAllAsync().GetAwaiter().GetResult();")?;
        writeln!(output, "        }}")?;
        writeln!(output)?;
        writeln!(output, "        public {0} Create({0} entity)", entity)?;
        writeln!(output, "        {{")?;
        writeln!(output, "            return CreateAsync(entity).GetAwaiter().GetResult();")?;
        writeln!(output, "        }}")?;
        writeln!(output)?;
        writeln!(output, "        public void Update(object id, {} entity)", entity)?;
        writeln!(output, "        {{")?;
        writeln!(output, "            UpdateAsync(id, entity).GetAwaiter().GetResult();")?;
        writeln!(output, "        }}")?;
        writeln!(output)?;
        writeln!(output, "        public void Delete(object id, bool hardDelete = false)")?;
        writeln!(output, "        {{")?;
        writeln!(output, "            DeleteAsync(id, hardDelete).GetAwaiter().GetResult();")?;
        writeln!(output, "        }}")?;
    }

    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(output)
}

fn write_existing_lookup(output: &mut String, entity: &str) -> fmt::Result {
    writeln!(output, "            var existing = await _repository.GetByIdAsync(id);")?;
    writeln!(output, "            if (existing == null)")?;
    writeln!(output, "            {{")?;
    writeln!(
        output,
        "                throw new KeyNotFoundException($\"{} with id '{{id}}' was not found.\");",
        entity
    )?;
    writeln!(output, "            }}")?;
    writeln!(output)
}
