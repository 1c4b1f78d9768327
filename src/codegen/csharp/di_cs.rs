/// Generate the dependency-injection registration extension

use std::fmt::{self, Write};

use super::repository_cs::{generic_class_name, generic_interface_name};
use super::GenerationContext;
use crate::codegen::utils::to_pascal_case;

/// Name of the generated registration method
pub const REGISTRATION_METHOD: &str = "AddGeneratedDataAccess";

pub fn generate_di_cs(ctx: &GenerationContext<'_>) -> Result<String, fmt::Error> {
    let mut output = String::new();
    let naming = &ctx.request.naming;

    writeln!(output, "// <auto-generated />")?;
    writeln!(output, "namespace {}", ctx.namespace("Extensions"))?;
    writeln!(output, "{{")?;
    writeln!(output, "    using System;")?;
    writeln!(output, "    using Microsoft.EntityFrameworkCore;")?;
    writeln!(output, "    using Microsoft.Extensions.DependencyInjection;")?;
    writeln!(output, "    using {};", ctx.namespace("Data"))?;
    writeln!(output, "    using {};", ctx.namespace("Repositories.Implementations"))?;
    writeln!(output, "    using {};", ctx.namespace("Repositories.Interfaces"))?;
    if ctx.request.service_classes {
        if ctx.request.service_interfaces {
            writeln!(output, "    using {};", ctx.namespace("Services.Interfaces"))?;
        }
        writeln!(output, "    using {};", ctx.namespace("Services.Implementations"))?;
    }
    writeln!(output)?;
    writeln!(output, "    public static class ServiceCollectionExtensions")?;
    writeln!(output, "    {{")?;
    writeln!(output, "        public static IServiceCollection {}(", REGISTRATION_METHOD)?;
    writeln!(output, "            this IServiceCollection services,")?;
    writeln!(output, "            Action<DbContextOptionsBuilder> configureContext)")?;
    writeln!(output, "        {{")?;
    writeln!(output, "            services.AddDbContext<{}>(configureContext);", ctx.request.context_name)?;
    writeln!(
        output,
        "            services.AddScoped(typeof({}<>), typeof({}<>));",
        generic_interface_name(ctx),
        generic_class_name(ctx)
    )?;

    writeln!(output)?;
    for table in ctx.tables {
        let entity = to_pascal_case(&table.name);
        writeln!(
            output,
            "            services.AddScoped<{}, {}>();",
            naming.repository_interface(&entity),
            naming.repository_class(&entity)
        )?;
    }

    // A service interface without a class has nothing to bind
    if ctx.request.service_classes {
        writeln!(output)?;
        for table in ctx.tables {
            let entity = to_pascal_case(&table.name);
            if ctx.request.service_interfaces {
                writeln!(
                    output,
                    "            services.AddScoped<{}, {}>();",
                    naming.service_interface(&entity),
                    naming.service_class(&entity)
                )?;
            } else {
                writeln!(output, "            services.AddScoped<{}>();", naming.service_class(&entity))?;
            }
        }
    }

    writeln!(output)?;
    writeln!(output, "            return services;")?;
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
    fn test_registers_every_pair() {
        let request = products_and_orders();
        let code = context_for(&request, generate_di_cs).unwrap();

        assert!(code.contains("services.AddDbContext<ShopContext>(configureContext);"));
        assert!(code.contains("services.AddScoped(typeof(IRepository<>), typeof(Repository<>));"));
        assert!(code.contains("services.AddScoped<IProductsRepository, ProductsRepository>();"));
        assert!(code.contains("services.AddScoped<IOrdersRepository, OrdersRepository>();"));
        assert!(code.contains("services.AddScoped<IOrdersService, OrdersService>();"));
    }

    #[test]
    fn test_service_registration_follows_toggles() {
        let mut request = products_and_orders();
        request.service_interfaces = false;
        let code = context_for(&request, generate_di_cs).unwrap();
        assert!(code.contains("services.AddScoped<OrdersService>();"));

        request.service_classes = false;
        let code = context_for(&request, generate_di_cs).unwrap();
        assert!(!code.contains("Service>"));
        assert!(!code.contains("Services.Implementations"));
    }
}
