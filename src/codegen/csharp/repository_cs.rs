/// Generate generic and per-table data-access (repository) code

use std::fmt::{self, Write};

use super::GenerationContext;
use crate::codegen::csharp::model_cs::SOFT_DELETE_FIELD;
use crate::codegen::types::TableDefinition;
use crate::codegen::utils::to_pascal_case;

/// Generic repository interface name, e.g. `IRepository`
pub fn generic_interface_name(ctx: &GenerationContext<'_>) -> String {
    format!(
        "{}{}",
        ctx.request.naming.repository_interface_prefix, ctx.request.naming.repository_class_suffix
    )
}

/// Generic repository class name, e.g. `Repository`
pub fn generic_class_name(ctx: &GenerationContext<'_>) -> String {
    ctx.request.naming.repository_class_suffix.clone()
}

pub fn generate_generic_interface_cs(ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Repositories.Interfaces"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using System;")?;
    writeln!(output, "    using System.Collections.Generic;")?;
    writeln!(output, "    using System.Linq.Expressions;")?;
    writeln!(output, "    using System.Threading.Tasks;")?;
    writeln!(output)?;
    writeln!(output, "    public interface {}<TEntity>", generic_interface_name(ctx))?;
    writeln!(output, "        where TEntity : class")?;
    writeln!(output, "    {{")?;
    writeln!(output, "        Task<TEntity?> GetByIdAsync(object id, bool includeSoftDeleted = false);")?;
    writeln!(output, "        Task<IEnumerable<TEntity>> GetAllAsync(bool includeSoftDeleted = false);")?;
    writeln!(output, "        Task<IEnumerable<TEntity>> FindAsync(Expression<Func<TEntity, bool>> predicate, bool includeSoftDeleted = false);")?;
    writeln!(output, "        Task AddAsync(TEntity entity);")?;
    writeln!(output, "        Task AddRangeAsync(IEnumerable<TEntity> entities);")?;
    writeln!(output, "        void Update(TEntity entity);")?;
    writeln!(output, "        void Remove(TEntity entity, bool hardDelete = false);")?;
    writeln!(output, "        void RemoveRange(IEnumerable<TEntity> entities, bool hardDelete = false);")?;
    writeln!(output, "        Task<int> CountAsync(Expression<Func<TEntity, bool>>? predicate = null, bool includeSoftDeleted = false);")?;
    writeln!(output, "        Task<bool> ExistsAsync(Expression<Func<TEntity, bool>> predicate, bool includeSoftDeleted = false);")?;
    writeln!(output, "        Task<int> SaveChangesAsync();")?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(output)
}

pub fn generate_generic_repository_cs(ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let class = generic_class_name(ctx);
    let context_name = &ctx.request.context_name;

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Repositories.Implementations"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using System;")?;
    writeln!(output, "    using System.Collections.Generic;")?;
    writeln!(output, "    using System.Linq;")?;
    writeln!(output, "    using System.Linq.Expressions;")?;
    writeln!(output, "    using System.Reflection;")?;
    writeln!(output, "    using System.Threading.Tasks;")?;
    writeln!(output, "    using Microsoft.EntityFrameworkCore;")?;
    writeln!(output, "    using {};", ctx.namespace("Data"))?;
    writeln!(output, "    using {};", ctx.namespace("Repositories.Interfaces"))?;
    writeln!(output)?;
    writeln!(output, "    public class {}<TEntity> : {}<TEntity>", class, generic_interface_name(ctx))?;
    writeln!(output, "        where TEntity : class")?;
    writeln!(output, "    {{")?;
    writeln!(output, "        private static readonly PropertyInfo? SoftDeleteFlag = FindSoftDeleteFlag();")?;
    writeln!(output)?;
    writeln!(output, "        protected readonly {} _context;", context_name)?;
    writeln!(output)?;
    writeln!(output, "        public {}({} context)", class, context_name)?;
    writeln!(output, "        {{")?;
    writeln!(output, "            _context = context;")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        protected IQueryable<TEntity> Query(bool includeSoftDeleted)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            return includeSoftDeleted")?;
    writeln!(output, "                ? _context.Set<TEntity>().IgnoreQueryFilters()")?;
    writeln!(output, "                : _context.Set<TEntity>();")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task<TEntity?> GetByIdAsync(object id, bool includeSoftDeleted = false)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            var entity = await _context.Set<TEntity>().FindAsync(id);")?;
    writeln!(output, "            if (entity != null || !includeSoftDeleted)")?;
    writeln!(output, "            {{")?;
    writeln!(output, "                return entity;")?;
    writeln!(output, "            }}")?;
    writeln!(output)?;
    // The soft-deleted fallback only covers single-column keys
    writeln!(output, "            var key = _context.Model.FindEntityType(typeof(TEntity))?.FindPrimaryKey();")?;
    writeln!(output, "            if (key == null || key.Properties.Count != 1)")?;
    writeln!(output, "            {{")?;
    writeln!(output, "                return null;")?;
    writeln!(output, "            }}")?;
    writeln!(output, "            var keyName = key.Properties[0].Name;")?;
    writeln!(output, "            return await Query(true).FirstOrDefaultAsync(e => Equals(EF.Property<object>(e, keyName), id));")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task<IEnumerable<TEntity>> GetAllAsync(bool includeSoftDeleted = false)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            return await Query(includeSoftDeleted).ToListAsync();")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task<IEnumerable<TEntity>> FindAsync(Expression<Func<TEntity, bool>> predicate, bool includeSoftDeleted = false)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            return await Query(includeSoftDeleted).Where(predicate).ToListAsync();")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task AddAsync(TEntity entity)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            await _context.Set<TEntity>().AddAsync(entity);")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task AddRangeAsync(IEnumerable<TEntity> entities)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            await _context.Set<TEntity>().AddRangeAsync(entities);")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public void Update(TEntity entity)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            _context.Set<TEntity>().Update(entity);")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public void Remove(TEntity entity, bool hardDelete = false)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            if (!hardDelete && SoftDeleteFlag != null)")?;
    writeln!(output, "            {{")?;
    writeln!(output, "                SoftDeleteFlag.SetValue(entity, true);")?;
    writeln!(output, "                _context.Set<TEntity>().Update(entity);")?;
    writeln!(output, "                return;")?;
    writeln!(output, "            }}")?;
    writeln!(output, "            _context.Set<TEntity>().Remove(entity);")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public void RemoveRange(IEnumerable<TEntity> entities, bool hardDelete = false)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            foreach (var entity in entities.ToList())")?;
    writeln!(output, "            {{")?;
    writeln!(output, "                Remove(entity, hardDelete);")?;
    writeln!(output, "            }}")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task<int> CountAsync(Expression<Func<TEntity, bool>>? predicate = null, bool includeSoftDeleted = false)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            var query = Query(includeSoftDeleted);")?;
    writeln!(output, "            return predicate == null ? await query.CountAsync() : await query.CountAsync(predicate);")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public async Task<bool> ExistsAsync(Expression<Func<TEntity, bool>> predicate, bool includeSoftDeleted = false)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            return await Query(includeSoftDeleted).AnyAsync(predicate);")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        public Task<int> SaveChangesAsync()")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            return _context.SaveChangesAsync();")?;
    writeln!(output, "        }}")?;
    writeln!(output)?;
    writeln!(output, "        private static PropertyInfo? FindSoftDeleteFlag()")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            var property = typeof(TEntity).GetProperty(\"{}\");", SOFT_DELETE_FIELD)?;
    writeln!(output, "            return property != null && property.PropertyType == typeof(bool) ? property : null;")?;
    writeln!(output, "        }}")?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(output)
}

pub fn generate_repository_interface_cs(table: &TableDefinition, ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let entity = to_pascal_case(&table.name);

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Repositories.Interfaces"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using {};", ctx.namespace("Entities"))?;
    writeln!(output)?;
    writeln!(
        output,
        "    public interface {} : {}<{}>",
        ctx.request.naming.repository_interface(&entity),
        generic_interface_name(ctx),
        entity
    )?;
    writeln!(output, "    {{")?;
    writeln!(output, "        // {}-specific queries go here.", entity)?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(output)
}

pub fn generate_repository_cs(table: &TableDefinition, ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let entity = to_pascal_case(&table.name);
    let class = ctx.request.naming.repository_class(&entity);

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Repositories.Implementations"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using {};", ctx.namespace("Data"))?;
    writeln!(output, "    using {};", ctx.namespace("Entities"))?;
    writeln!(output, "    using {};", ctx.namespace("Repositories.Interfaces"))?;
    writeln!(output)?;
    writeln!(
        output,
        "    public class {} : {}<{}>, {}",
        class,
        generic_class_name(ctx),
        entity,
        ctx.request.naming.repository_interface(&entity)
    )?;
    writeln!(output, "    {{")?;
    writeln!(output, "        public {}({} context) : base(context)", class, ctx.request.context_name)?;
    writeln!(output, "        {{")?;
    writeln!(output, "        }}")?;
    writeln!(output, "    }}")?;
    writeln!(output, "}}")?;

    Ok(output)
}
