/// Generation pipeline configuration
///
/// Read from the environment (after `.env` is loaded):
/// - `DALGEN_OUTPUT_DIR` - where finished packages are kept
/// - `DALGEN_STAGING_DIR` - parent of the per-job staging trees
/// - `DALGEN_MAX_CONCURRENT_JOBS` - optional cap on running jobs

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub output_dir: PathBuf,
    pub staging_dir: PathBuf,
    /// `None` runs every submitted job immediately
    pub max_concurrent_jobs: Option<usize>,
}

impl PipelineConfig {
    /// Packages in `output_dir`, staging in `output_dir/staging`, no cap
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        Self {
            staging_dir: output_dir.join("staging"),
            output_dir,
            max_concurrent_jobs: None,
        }
    }

    pub fn with_max_concurrent_jobs(mut self, max: usize) -> Self {
        self.max_concurrent_jobs = Some(max);
        self
    }

    pub fn from_env() -> Self {
        let output_dir = std::env::var("DALGEN_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| std::env::temp_dir().join("dalgen"));

        let mut config = Self::new(output_dir);

        if let Ok(staging) = std::env::var("DALGEN_STAGING_DIR") {
            config.staging_dir = PathBuf::from(staging);
        }

        if let Ok(raw) = std::env::var("DALGEN_MAX_CONCURRENT_JOBS") {
            match raw.trim().parse::<usize>() {
                Ok(max) if max > 0 => config.max_concurrent_jobs = Some(max),
                _ => tracing::warn!("Ignoring invalid DALGEN_MAX_CONCURRENT_JOBS value '{}'", raw),
            }
        }

        config
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
