//! Integration tests for the generation job pipeline

use std::fs;
use std::time::Duration;

use dalgen::codegen::{DataType, GenerationRequest, PropertyDefinition, TableDefinition};
use dalgen::error::{DownloadError, ValidationError};
use dalgen::jobs::{package_name, GenerationPipeline, JobState, PipelineConfig};
use tempfile::TempDir;

fn shop() -> GenerationRequest {
    GenerationRequest {
        root_namespace: "Shop".to_string(),
        context_name: "ShopContext".to_string(),
        tables: vec![
            TableDefinition::new("Products", vec![PropertyDefinition::key("Id", DataType::Integer32)]),
            TableDefinition::new(
                "Orders",
                vec![
                    PropertyDefinition::key("OrderId", DataType::Integer32),
                    PropertyDefinition::reference("ProductId", DataType::Integer32, "Products", "Id")
                        .required()
                        .with_navigation("Product"),
                ],
            ),
        ],
        ..GenerationRequest::default()
    }
}

fn rank(state: JobState) -> u8 {
    match state {
        JobState::Queued => 0,
        JobState::Processing => 1,
        JobState::Completed | JobState::Error => 2,
        JobState::NotFound => panic!("accepted job reported NotFound"),
    }
}

fn zip_entries(bytes: Vec<u8>) -> Vec<String> {
    let archive = zip::ZipArchive::new(std::io::Cursor::new(bytes)).unwrap();
    archive.file_names().map(str::to_string).collect()
}

#[tokio::test]
async fn test_no_valid_tables_creates_no_job() {
    let dir = TempDir::new().unwrap();
    let pipeline = GenerationPipeline::new(PipelineConfig::new(dir.path()));

    let request = GenerationRequest {
        tables: vec![
            TableDefinition::new("", vec![PropertyDefinition::key("Id", DataType::Integer32)]),
            TableDefinition::new("Empty", vec![]),
        ],
        ..GenerationRequest::default()
    };

    let result = pipeline.submit(request).await;
    assert!(matches!(result, Err(ValidationError::NoValidTables)));
    assert_eq!(pipeline.job_count().await, 0);
    assert_eq!(pipeline.get_status("anything").await.status, JobState::NotFound);
}

#[tokio::test]
async fn test_invalid_shape_creates_no_job() {
    let dir = TempDir::new().unwrap();
    let pipeline = GenerationPipeline::new(PipelineConfig::new(dir.path()));

    let mut request = shop();
    request.tables[0].properties[0].name = "not valid".to_string();

    match pipeline.submit(request).await {
        Err(ValidationError::InvalidRequest(errors)) => {
            assert_eq!(errors[0].field, "tables[0].properties[0].name");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(pipeline.job_count().await, 0);
}

#[tokio::test]
async fn test_job_lifecycle_produces_package() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::new(dir.path());
    let staging_root = config.staging_dir.clone();
    let pipeline = GenerationPipeline::new(config);

    let mut request = shop();
    request.tests = true;
    let job_id = pipeline.submit(request).await.unwrap();

    // Status never moves backwards while we poll
    let mut last = 0;
    for _ in 0..500 {
        let status = pipeline.get_status(&job_id).await;
        let current = rank(status.status);
        assert!(current >= last, "status regressed to {:?}", status.status);
        last = current;
        if current == 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let status = pipeline.wait(&job_id).await;
    assert_eq!(status.status, JobState::Completed, "{}", status.message);
    let download_name = status.download_name.unwrap();
    assert_eq!(download_name, package_name(&job_id));
    assert!(dir.path().join(&download_name).is_file());
    assert!(!staging_root.join(&job_id).exists());

    let entries = zip_entries(pipeline.download(&download_name).await.unwrap());
    // 2 tables x (model, repo pair, service pair, two tests) + context, generic pair, DI
    assert_eq!(entries.len(), 2 * 7 + 4);
    for expected in [
        "Entities/Products.cs",
        "Entities/Orders.cs",
        "Data/ShopContext.cs",
        "Repositories/Interfaces/IRepository.cs",
        "Repositories/Implementations/Repository.cs",
        "Repositories/Interfaces/IOrdersRepository.cs",
        "Repositories/Implementations/OrdersRepository.cs",
        "Services/Interfaces/IOrdersService.cs",
        "Services/Implementations/OrdersService.cs",
        "Tests/Repositories/OrdersRepositoryTests.cs",
        "Tests/Services/OrdersServiceTests.cs",
        "Extensions/ServiceCollectionExtensions.cs",
    ] {
        assert!(entries.iter().any(|e| e == expected), "missing {}", expected);
    }
}

#[tokio::test]
async fn test_concurrent_jobs_do_not_collide() {
    let dir = TempDir::new().unwrap();
    let pipeline = GenerationPipeline::new(PipelineConfig::new(dir.path()).with_max_concurrent_jobs(2));

    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(pipeline.submit(shop()).await.unwrap());
    }

    for id in &ids {
        let status = pipeline.wait(id).await;
        assert_eq!(status.status, JobState::Completed, "{}", status.message);
        assert!(dir.path().join(package_name(id)).is_file());
    }
    assert_eq!(pipeline.job_count().await, 4);
}

#[tokio::test]
async fn test_oversized_length_with_tests_is_rejected() {
    let dir = TempDir::new().unwrap();
    let pipeline = GenerationPipeline::new(PipelineConfig::new(dir.path()));

    let mut code = PropertyDefinition::new("Code", DataType::Text);
    code.min_length = Some(1_000_000_000_000);
    let mut request = shop();
    request.tests = true;
    request.tables[0].properties.push(code);

    match pipeline.submit(request).await {
        Err(ValidationError::InvalidRequest(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "tables[0].properties[1].min_length");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(pipeline.job_count().await, 0);
}

#[tokio::test]
async fn test_colliding_table_names_create_no_job() {
    let dir = TempDir::new().unwrap();
    let pipeline = GenerationPipeline::new(PipelineConfig::new(dir.path()));

    let mut request = shop();
    request.tables.push(TableDefinition::new(
        "products",
        vec![PropertyDefinition::key("Id", DataType::Integer32)],
    ));

    match pipeline.submit(request).await {
        Err(ValidationError::InvalidRequest(errors)) => {
            assert_eq!(errors[0].field, "tables[2].name");
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(pipeline.job_count().await, 0);
}

#[tokio::test]
async fn test_failure_is_reported_through_status() {
    let dir = TempDir::new().unwrap();
    // A regular file where the output directory should be
    let blocked = dir.path().join("blocked");
    fs::write(&blocked, "not a directory").unwrap();
    let mut config = PipelineConfig::new(&blocked);
    config.staging_dir = dir.path().join("staging");
    let pipeline = GenerationPipeline::new(config);

    let job_id = pipeline.submit(shop()).await.unwrap();
    let status = pipeline.wait(&job_id).await;

    assert_eq!(status.status, JobState::Error);
    assert!(!status.message.is_empty());
    assert!(status.download_name.is_none());
    assert!(!dir.path().join("staging").join(&job_id).exists());
}

#[tokio::test]
async fn test_waiting_job_stays_queued_until_cancelled() {
    let dir = TempDir::new().unwrap();
    // No permits at all: the job can never start
    let pipeline = GenerationPipeline::new(PipelineConfig::new(dir.path()).with_max_concurrent_jobs(0));

    let job_id = pipeline.submit(shop()).await.unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(pipeline.get_status(&job_id).await.status, JobState::Queued);

    assert!(pipeline.cancel(&job_id).await);
    let status = pipeline.wait(&job_id).await;
    assert_eq!(status.status, JobState::Error);
    assert_eq!(status.message, "Job was cancelled");
}

#[tokio::test]
async fn test_download_rejects_unsafe_and_missing_names() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("secret.txt"), "x").unwrap();
    let output = dir.path().join("out");
    let pipeline = GenerationPipeline::new(PipelineConfig::new(&output));

    assert!(matches!(pipeline.download("../secret.txt").await, Err(DownloadError::InvalidName)));
    assert!(matches!(pipeline.download("a/b.zip").await, Err(DownloadError::InvalidName)));
    assert!(matches!(pipeline.download("GeneratedCode_missing.zip").await, Err(DownloadError::NotFound)));
}

#[tokio::test]
async fn test_job_stays_cancellable_while_awaited() {
    let dir = TempDir::new().unwrap();
    let pipeline = GenerationPipeline::new(PipelineConfig::new(dir.path()).with_max_concurrent_jobs(0));
    let job_id = pipeline.submit(shop()).await.unwrap();

    let waiter = {
        let pipeline = pipeline.clone();
        let job_id = job_id.clone();
        tokio::spawn(async move { pipeline.wait(&job_id).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(pipeline.cancel(&job_id).await);
    let status = waiter.await.unwrap();
    assert_eq!(status.status, JobState::Error);
    assert_eq!(status.message, "Job was cancelled");
    assert!(!pipeline.cancel(&job_id).await);
}
