/// C# / Entity Framework Core artifact generation
///
/// One generator per artifact kind:
/// - Entity models with inverse collections and soft-delete flags
/// - The persistence context with keys, associations and query filters
/// - Generic and per-table repositories
/// - Optional services, xUnit scaffolds and DI registration

use std::fmt;
use std::path::PathBuf;

use crate::codegen::relationships::RelationshipMap;
use crate::codegen::strategy::EmissionStrategy;
use crate::codegen::types::{GenerationRequest, TableDefinition};
use crate::codegen::utils::to_pascal_case;

mod context_cs;
mod di_cs;
mod model_cs;
mod repository_cs;
mod service_cs;
mod tests_cs;

pub use context_cs::generate_context_cs;
pub use di_cs::{generate_di_cs, REGISTRATION_METHOD};
pub use model_cs::{declares_soft_delete_field, generate_model_cs, skipped_collection_comment, SOFT_DELETE_FIELD};
pub use repository_cs::{
    generate_generic_interface_cs, generate_generic_repository_cs, generate_repository_cs,
    generate_repository_interface_cs, generic_class_name, generic_interface_name,
};
pub use service_cs::{generate_service_cs, generate_service_interface_cs};
pub use tests_cs::{generate_repository_tests_cs, generate_service_tests_cs};

/// Read-only inputs shared by every generator for one request
pub struct GenerationContext<'a> {
    pub request: &'a GenerationRequest,
    /// Valid tables only, in request order
    pub tables: &'a [TableDefinition],
    pub relationships: &'a RelationshipMap,
    pub strategy: &'static dyn EmissionStrategy,
}

impl<'a> GenerationContext<'a> {
    pub fn new(
        request: &'a GenerationRequest,
        tables: &'a [TableDefinition],
        relationships: &'a RelationshipMap,
    ) -> Self {
        Self {
            request,
            tables,
            relationships,
            strategy: request.configuration_style.strategy(),
        }
    }

    /// Namespace below the request's root namespace
    pub fn namespace(&self, sub: &str) -> String {
        format!("{}.{}", self.request.root_namespace, sub)
    }
}

/// Kind of emitted artifact, each with its own logical subdirectory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    Model,
    Context,
    GenericRepositoryInterface,
    GenericRepository,
    RepositoryInterface,
    Repository,
    ServiceInterface,
    Service,
    RepositoryTests,
    ServiceTests,
    DependencyInjection,
}

impl ArtifactKind {
    pub fn subdirectory(&self) -> &'static str {
        match self {
            ArtifactKind::Model => "Entities",
            ArtifactKind::Context => "Data",
            ArtifactKind::GenericRepositoryInterface | ArtifactKind::RepositoryInterface => {
                "Repositories/Interfaces"
            }
            ArtifactKind::GenericRepository | ArtifactKind::Repository => "Repositories/Implementations",
            ArtifactKind::ServiceInterface => "Services/Interfaces",
            ArtifactKind::Service => "Services/Implementations",
            ArtifactKind::RepositoryTests => "Tests/Repositories",
            ArtifactKind::ServiceTests => "Tests/Services",
            ArtifactKind::DependencyInjection => "Extensions",
        }
    }
}

/// One generated source file, with a path relative to the artifact root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    fn new(kind: ArtifactKind, file_name: String, contents: String) -> Self {
        Self {
            kind,
            path: PathBuf::from(kind.subdirectory()).join(file_name),
            contents,
        }
    }
}

/// Every requested per-table artifact for one table
pub fn generate_table_artifacts(
    table: &TableDefinition,
    ctx: &GenerationContext<'_>,
) -> Result<Vec<GeneratedFile>, fmt::Error> {
    let request = ctx.request;
    let naming = &request.naming;
    let entity = to_pascal_case(&table.name);
    let mut files = Vec::new();

    files.push(GeneratedFile::new(
        ArtifactKind::Model,
        format!("{}.cs", entity),
        generate_model_cs(table, ctx)?,
    ));
    files.push(GeneratedFile::new(
        ArtifactKind::RepositoryInterface,
        format!("{}.cs", naming.repository_interface(&entity)),
        generate_repository_interface_cs(table, ctx)?,
    ));
    files.push(GeneratedFile::new(
        ArtifactKind::Repository,
        format!("{}.cs", naming.repository_class(&entity)),
        generate_repository_cs(table, ctx)?,
    ));

    if request.service_interfaces {
        files.push(GeneratedFile::new(
            ArtifactKind::ServiceInterface,
            format!("{}.cs", naming.service_interface(&entity)),
            generate_service_interface_cs(table, ctx)?,
        ));
    }
    if request.service_classes {
        files.push(GeneratedFile::new(
            ArtifactKind::Service,
            format!("{}.cs", naming.service_class(&entity)),
            generate_service_cs(table, ctx)?,
        ));
    }

    if request.tests {
        files.push(GeneratedFile::new(
            ArtifactKind::RepositoryTests,
            format!("{}RepositoryTests.cs", entity),
            generate_repository_tests_cs(table, ctx)?,
        ));
        // The service test needs a concrete service to construct
        if request.service_classes {
            files.push(GeneratedFile::new(
                ArtifactKind::ServiceTests,
                format!("{}ServiceTests.cs", entity),
                generate_service_tests_cs(table, ctx)?,
            ));
        }
    }

    Ok(files)
}

/// Once-per-request artifacts: context, generic repository pair and DI wiring
pub fn generate_shared_artifacts(ctx: &GenerationContext<'_>) -> Result<Vec<GeneratedFile>, fmt::Error> {
    let mut files = vec![
        GeneratedFile::new(
            ArtifactKind::Context,
            format!("{}.cs", ctx.request.context_name),
            generate_context_cs(ctx)?,
        ),
        GeneratedFile::new(
            ArtifactKind::GenericRepositoryInterface,
            format!("{}.cs", generic_interface_name(ctx)),
            generate_generic_interface_cs(ctx)?,
        ),
        GeneratedFile::new(
            ArtifactKind::GenericRepository,
            format!("{}.cs", generic_class_name(ctx)),
            generate_generic_repository_cs(ctx)?,
        ),
    ];

    if ctx.request.dependency_injection {
        files.push(GeneratedFile::new(
            ArtifactKind::DependencyInjection,
            "ServiceCollectionExtensions.cs".to_string(),
            generate_di_cs(ctx)?,
        ));
    }

    Ok(files)
}
