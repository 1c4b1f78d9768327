/// Background generation jobs
///
/// Provides the job registry, the submit/poll/download pipeline and its
/// configuration.

pub mod config;
pub mod pipeline;
pub mod registry;

pub use config::PipelineConfig;
pub use pipeline::{is_safe_file_name, package_name, GenerationPipeline, JobStatusResponse};
pub use registry::{JobRecord, JobRegistry, JobState, JobStatus};
