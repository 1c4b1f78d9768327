//! # dalgen: Data-Access Layer Generator
//!
//! dalgen compiles a declarative relational schema into a coherent set of
//! C# / Entity Framework Core sources, and runs that compiler as background
//! jobs that package their output for download.
//!
//! ## Features
//!
//! - **Schema compiler**: entity models, a persistence context, generic and
//!   per-table repositories, optional services, xUnit scaffolds and DI wiring
//! - **Relationship resolution**: inverse collections derived from foreign keys
//! - **Configuration styles**: annotations, fluent configuration, or both
//! - **Job pipeline**: submit / poll / download with per-job staging and zip packaging
//!
//! ## Example request
//!
//! ```yaml
//! root_namespace: Shop.Data
//! context_name: ShopContext
//! tables:
//!   - name: Products
//!     properties:
//!       - name: Id
//!         data_type: int
//!         primary_key: true
//!         nullable: false
//!   - name: Orders
//!     properties:
//!       - name: OrderId
//!         data_type: int
//!         primary_key: true
//!         nullable: false
//!       - name: ProductId
//!         data_type: int
//!         nullable: false
//!         foreign_key: true
//!         referenced_table: Products
//!         referenced_property: Id
//!         navigation_property: Product
//! ```

// Schema compiler
pub mod codegen;

// Background generation jobs
pub mod jobs;

// HTTP adapter
pub mod api;

pub mod error;

// Re-export key types
pub use codegen::{compile, load_request, validate_request, GeneratedFile, GenerationRequest};
pub use error::{DownloadError, FieldError, GenerationError, LoadError, ValidationError};
pub use jobs::{GenerationPipeline, JobState, JobStatus, JobStatusResponse, PipelineConfig};
