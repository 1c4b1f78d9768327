//! HTTP adapter tests driven through the router with `oneshot`

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use dalgen::api::router;
use dalgen::jobs::{GenerationPipeline, PipelineConfig};

async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

fn post_generate(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/generate")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn shop_request() -> Value {
    json!({
        "root_namespace": "Shop",
        "context_name": "ShopContext",
        "tables": [
            {
                "name": "Products",
                "properties": [
                    { "name": "Id", "data_type": "int", "primary_key": true, "nullable": false }
                ]
            },
            {
                "name": "Orders",
                "properties": [
                    { "name": "OrderId", "data_type": "int", "primary_key": true, "nullable": false },
                    {
                        "name": "ProductId",
                        "data_type": "int",
                        "nullable": false,
                        "foreign_key": true,
                        "referenced_table": "Products",
                        "referenced_property": "Id"
                    }
                ]
            }
        ]
    })
}

#[tokio::test]
async fn test_submit_poll_download() {
    let dir = TempDir::new().unwrap();
    let pipeline = GenerationPipeline::new(PipelineConfig::new(dir.path()));
    let app = router(pipeline.clone());

    let (status, body) = send(app.clone(), post_generate(shop_request())).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let submitted: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(submitted["success"], true);
    let job_id = submitted["jobId"].as_str().unwrap().to_string();

    pipeline.wait(&job_id).await;

    let (status, body) = send(app.clone(), get(&format!("/jobs/{}", job_id))).await;
    assert_eq!(status, StatusCode::OK);
    let polled: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(polled["status"], "Completed");
    let download_name = polled["downloadName"].as_str().unwrap().to_string();

    let (status, body) = send(app, get(&format!("/download/{}", download_name))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..2], b"PK");
}

#[tokio::test]
async fn test_no_valid_tables_is_rejected() {
    let dir = TempDir::new().unwrap();
    let pipeline = GenerationPipeline::new(PipelineConfig::new(dir.path()));
    let app = router(pipeline.clone());

    let (status, body) = send(app, post_generate(json!({ "tables": [{ "name": "Empty" }] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response["success"], false);
    assert!(response["jobId"].is_null());
    assert!(response["message"].as_str().unwrap().contains("No valid tables"));
    assert_eq!(pipeline.job_count().await, 0);
}

#[tokio::test]
async fn test_field_errors_are_listed() {
    let dir = TempDir::new().unwrap();
    let app = router(GenerationPipeline::new(PipelineConfig::new(dir.path())));

    let mut request = shop_request();
    request["context_name"] = json!("");
    let (status, body) = send(app.clone(), post_generate(request)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response["errors"][0]["field"], "context_name");

    let (status, body) = send(
        app,
        Request::builder()
            .method("POST")
            .uri("/generate")
            .body(Body::from("{not json"))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let response: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(response["errors"][0]["field"], "body");
}

#[tokio::test]
async fn test_unknown_job_and_bad_download() {
    let dir = TempDir::new().unwrap();
    let app = router(GenerationPipeline::new(PipelineConfig::new(dir.path())));

    let (status, body) = send(app.clone(), get("/jobs/does-not-exist")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let polled: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(polled["status"], "NotFound");
    assert!(polled["downloadName"].is_null());

    let (status, _) = send(app.clone(), get("/download/..secret.zip")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(app.clone(), get("/download/GeneratedCode_missing.zip")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "healthy");
}
