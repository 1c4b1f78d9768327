//! Generation job pipeline.
//!
//! `submit` validates a request, records a Queued job and hands the
//! compilation to a background task, returning the job id immediately. Each
//! job compiles into its own staging tree, archives it into
//! `GeneratedCode_<job id>.zip` in the output directory and then removes the
//! staging tree. Every job task is watched by a supervisor so that a panic or
//! abort still ends in a terminal `Error` status.

use regex::Regex;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};
use tokio::sync::{watch, Mutex, Semaphore};
use tokio::task::{AbortHandle, JoinHandle};
use uuid::Uuid;

use crate::codegen::csharp::{generate_shared_artifacts, generate_table_artifacts, GeneratedFile, GenerationContext};
use crate::codegen::fs_utils::{archive_directory, remove_tree};
use crate::codegen::relationships::resolve_relationships;
use crate::codegen::request_loader::validate_request;
use crate::codegen::types::{GenerationRequest, TableDefinition};
use crate::error::{DownloadError, GenerationError, ValidationError};
use crate::jobs::config::PipelineConfig;
use crate::jobs::registry::{JobRegistry, JobState, JobStatus};

static SAFE_FILE_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_.-]*$").expect("Invalid regex"));

/// Deterministic package name for a job
pub fn package_name(job_id: &str) -> String {
    format!("GeneratedCode_{}.zip", job_id)
}

/// Whether a requested download name is a plain file name
pub fn is_safe_file_name(name: &str) -> bool {
    SAFE_FILE_NAME_RE.is_match(name) && !name.contains("..")
}

/// Poll result for one job id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatusResponse {
    pub status: JobState,
    pub message: String,
    pub download_name: Option<String>,
}

struct JobHandle {
    abort: AbortHandle,
    // Flips to true once the supervisor has recorded a terminal status
    finished: watch::Receiver<bool>,
}

struct PipelineInner {
    config: PipelineConfig,
    registry: JobRegistry,
    handles: Mutex<HashMap<String, JobHandle>>,
    permits: Option<Arc<Semaphore>>,
}

#[derive(Clone)]
pub struct GenerationPipeline {
    inner: Arc<PipelineInner>,
}

impl GenerationPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        let permits = config.max_concurrent_jobs.map(|max| Arc::new(Semaphore::new(max)));
        Self {
            inner: Arc::new(PipelineInner {
                config,
                registry: JobRegistry::new(),
                handles: Mutex::new(HashMap::new()),
                permits,
            }),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.inner.config
    }

    /// Number of jobs ever accepted
    pub async fn job_count(&self) -> usize {
        self.inner.registry.len().await
    }

    /// Validate and enqueue a request, returning the new job id
    ///
    /// Rejected requests create no job.
    pub async fn submit(&self, request: GenerationRequest) -> Result<String, ValidationError> {
        let tables = match validate_request(&request) {
            Ok(tables) => tables,
            Err(e) => {
                tracing::info!("Rejected generation request: {}", e);
                return Err(e);
            }
        };

        let job_id = Uuid::new_v4().to_string();
        self.inner
            .registry
            .insert_queued(&job_id, "Job queued for processing")
            .await;
        tracing::info!(job_id = %job_id, tables = tables.len(), "Generation job queued");

        // Hold the handle map while spawning so the supervisor's cleanup
        // always runs after the insert below
        let mut handles = self.inner.handles.lock().await;

        let worker = tokio::spawn(run_job(self.inner.clone(), job_id.clone(), request, tables));
        let abort = worker.abort_handle();
        let (done, finished) = watch::channel(false);
        tokio::spawn(supervise(self.inner.clone(), job_id.clone(), worker, done));

        handles.insert(job_id.clone(), JobHandle { abort, finished });

        Ok(job_id)
    }

    pub async fn get_status(&self, job_id: &str) -> JobStatusResponse {
        match self.inner.registry.get(job_id).await {
            Some(record) => JobStatusResponse {
                status: record.status.into(),
                message: record.message,
                download_name: record.download_name,
            },
            None => JobStatusResponse {
                status: JobState::NotFound,
                message: "Job not found".to_string(),
                download_name: None,
            },
        }
    }

    /// Read a finished package by name
    pub async fn download(&self, file_name: &str) -> Result<Vec<u8>, DownloadError> {
        if !is_safe_file_name(file_name) {
            tracing::warn!("Rejected download name '{}'", file_name);
            return Err(DownloadError::InvalidName);
        }

        let path = self.inner.config.output_dir.join(file_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(DownloadError::NotFound),
            Err(e) => Err(DownloadError::Io(e)),
        }
    }

    /// Abort a running job; it ends in `Error`. Returns false for unknown or
    /// already finished jobs.
    pub async fn cancel(&self, job_id: &str) -> bool {
        match self.inner.handles.lock().await.get(job_id) {
            Some(handle) => {
                handle.abort.abort();
                tracing::info!(job_id = %job_id, "Cancellation requested");
                true
            }
            None => false,
        }
    }

    /// Wait until a job has reached a terminal status
    ///
    /// The job stays cancellable while callers wait on it.
    pub async fn wait(&self, job_id: &str) -> JobStatusResponse {
        let finished = self
            .inner
            .handles
            .lock()
            .await
            .get(job_id)
            .map(|handle| handle.finished.clone());
        if let Some(mut finished) = finished {
            if finished.wait_for(|done| *done).await.is_err() {
                tracing::error!(job_id = %job_id, "Supervisor task ended without reporting");
            }
        }
        self.get_status(job_id).await
    }
}

/// Turn a worker panic or abort into a terminal status
async fn supervise(inner: Arc<PipelineInner>, job_id: String, worker: JoinHandle<()>, done: watch::Sender<bool>) {
    if let Err(e) = worker.await {
        let message = if e.is_cancelled() {
            "Job was cancelled".to_string()
        } else {
            "Job terminated unexpectedly".to_string()
        };
        tracing::error!(job_id = %job_id, "{}", message);
        inner
            .registry
            .transition(&job_id, JobStatus::Error, message, None)
            .await;
        remove_staging(&inner.config.staging_dir.join(&job_id), &job_id).await;
    }

    inner.handles.lock().await.remove(&job_id);
    done.send_replace(true);
}

async fn run_job(inner: Arc<PipelineInner>, job_id: String, request: GenerationRequest, tables: Vec<TableDefinition>) {
    // Jobs waiting for a permit stay Queued
    let _permit = match &inner.permits {
        Some(permits) => match permits.clone().acquire_owned().await {
            Ok(permit) => Some(permit),
            Err(e) => {
                fail(&inner, &job_id, &GenerationError::Task(e.to_string())).await;
                return;
            }
        },
        None => None,
    };

    inner
        .registry
        .transition(&job_id, JobStatus::Processing, "Generating code...", None)
        .await;
    tracing::info!(job_id = %job_id, "Generation job processing");

    let staging = inner.config.staging_dir.join(&job_id);
    match build_package(&inner.config, &job_id, &staging, &request, &tables).await {
        Ok(download_name) => {
            inner
                .registry
                .transition(
                    &job_id,
                    JobStatus::Completed,
                    "Code generation completed successfully",
                    Some(download_name.clone()),
                )
                .await;
            tracing::info!(job_id = %job_id, package = %download_name, "Generation job completed");
        }
        Err(e) => fail(&inner, &job_id, &e).await,
    }

    remove_staging(&staging, &job_id).await;
}

async fn fail(inner: &PipelineInner, job_id: &str, error: &GenerationError) {
    tracing::error!(job_id = %job_id, "Generation job failed: {}", error);
    inner
        .registry
        .transition(job_id, JobStatus::Error, format!("Error: {}", error), None)
        .await;
}

async fn remove_staging(staging: &Path, job_id: &str) {
    let tree = staging.to_path_buf();
    match tokio::task::spawn_blocking(move || remove_tree(&tree)).await {
        Ok(Ok(())) => tracing::debug!(job_id = %job_id, "Removed staging tree"),
        Ok(Err(e)) => tracing::warn!(job_id = %job_id, "Failed to remove staging tree {}: {}", staging.display(), e),
        Err(e) => tracing::warn!(job_id = %job_id, "Staging cleanup task failed: {}", e),
    }
}

/// Stage every artifact and archive the staging tree, returning the package name
async fn build_package(
    config: &PipelineConfig,
    job_id: &str,
    staging: &Path,
    request: &GenerationRequest,
    tables: &[TableDefinition],
) -> Result<String, GenerationError> {
    tokio::fs::create_dir_all(staging)
        .await
        .map_err(|e| GenerationError::io(staging, e))?;

    let relationships = resolve_relationships(tables);
    let ctx = GenerationContext::new(request, tables, &relationships);

    for table in tables {
        let files = generate_table_artifacts(table, &ctx)?;
        stage_files(staging, job_id, &files).await?;
    }
    let shared = generate_shared_artifacts(&ctx)?;
    stage_files(staging, job_id, &shared).await?;

    let download_name = package_name(job_id);
    let archive_path = config.output_dir.join(&download_name);
    let source = staging.to_path_buf();
    let target = archive_path.clone();
    let count = tokio::task::spawn_blocking(move || archive_directory(&source, &target))
        .await
        .map_err(|e| GenerationError::Task(e.to_string()))??;

    tracing::info!(
        job_id = %job_id,
        files = count,
        archive = %archive_path.display(),
        "Archive created"
    );

    Ok(download_name)
}

async fn stage_files(staging: &Path, job_id: &str, files: &[GeneratedFile]) -> Result<(), GenerationError> {
    for file in files {
        let path: PathBuf = staging.join(&file.path);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| GenerationError::io(parent, e))?;
        }
        tokio::fs::write(&path, &file.contents)
            .await
            .map_err(|e| GenerationError::io(&path, e))?;
        tracing::debug!(job_id = %job_id, file = %file.path.display(), "Staged artifact");
    }
    Ok(())
}
