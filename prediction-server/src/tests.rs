//! Router tests: real handlers, stub classifier

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use prediction_core::{Classifier, FeatureVector, InferenceError, ModelMetadata, PredictionService};
use serde_json::{json, Value};
use tower::ServiceExt;

use crate::{config::Config, create_router, AppState};

/// Predicts 1 for damaged vehicles that were not previously insured
struct StubClassifier {
    calls: AtomicUsize,
    fail: bool,
    metadata: ModelMetadata,
}

impl StubClassifier {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
            metadata: ModelMetadata {
                source: "stub.onnx".to_string(),
                engine: "stub".to_string(),
                checksum: None,
                feature_names: None,
                loaded_at: chrono::Utc::now(),
            },
        }
    }
}

impl Classifier for StubClassifier {
    fn predict(&self, batch: &[FeatureVector]) -> Result<Vec<i64>, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(InferenceError::Runtime("input tensor rejected".to_string()));
        }
        Ok(batch
            .iter()
            .map(|v| i64::from(v.get_by_name("Vehicle_Damage_Yes") == Some(1.0)
                && v.get_by_name("Previously_Insured") == Some(0.0)))
            .collect())
    }

    fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }
}

fn app_with(service: PredictionService) -> Router {
    create_router(AppState {
        service: Arc::new(service),
        config: Config::default(),
    })
}

fn app() -> (Router, Arc<StubClassifier>) {
    let stub = Arc::new(StubClassifier::new(false));
    (app_with(PredictionService::new(stub.clone())), stub)
}

fn degraded_app() -> Router {
    app_with(PredictionService::unavailable("Model not found: lgb_model.onnx"))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(b) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(b)
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
    (status, value)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, Some(body.to_string())).await
}

fn reference_record() -> Value {
    json!({
        "Age": 35,
        "Driving_License": 1,
        "Previously_Insured": 0,
        "Annual_Premium": 2500,
        "Gender_Male": 1,
        "Vehicle_Damage_Yes": 1,
        "Vehicle_Age_1_2_Year": 1,
        "Vehicle_Age_lt_1_Year": 0,
        "Vehicle_Age_gt_2_Years": 0
    })
}

#[tokio::test]
async fn test_root() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Insurance Prediction API");
}

#[tokio::test]
async fn test_health_ok() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "OK" }));
}

#[tokio::test]
async fn test_health_degraded() {
    let (status, body) = send(&degraded_app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ERROR" }));
}

#[tokio::test]
async fn test_predict_reference_record() {
    let (app, _) = app();
    let (status, body) = post(&app, "/predict", reference_record()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["label"], "will buy");
    assert_eq!(body["numeric_class"], 1);
    assert_eq!(body["request_id"], 1);
}

#[tokio::test]
async fn test_request_ids_increase() {
    let (app, _) = app();
    let mut record = reference_record();
    record["Previously_Insured"] = json!(true);

    let (_, first) = post(&app, "/predict", record.clone()).await;
    let (_, second) = post(&app, "/predict", record).await;

    assert_eq!(first["label"], "will not buy");
    assert_eq!(first["request_id"], 1);
    assert_eq!(second["request_id"], 2);
}

#[tokio::test]
async fn test_predict_two_vehicle_ages_rejected() {
    let (app, stub) = app();
    let mut record = reference_record();
    record["Vehicle_Age_lt_1_Year"] = json!(1);

    let (status, body) = post(&app, "/predict", record).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
    assert!(body["error"].as_str().unwrap().contains("exactly one Vehicle Age"));
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_predict_no_vehicle_age_rejected() {
    let (app, _) = app();
    let mut record = reference_record();
    record["Vehicle_Age_1_2_Year"] = json!(false);

    let (status, _) = post(&app, "/predict", record).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_age_out_of_range() {
    let (app, _) = app();
    let mut record = reference_record();
    record["Age"] = json!(17);

    let (status, body) = post(&app, "/predict", record).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "Age");
}

#[tokio::test]
async fn test_predict_negative_premium() {
    let (app, _) = app();
    let mut record = reference_record();
    record["Annual_Premium"] = json!(-1.0);

    let (status, body) = post(&app, "/predict", record).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "Annual_Premium");
}

#[tokio::test]
async fn test_predict_premium_too_large() {
    let (app, stub) = app();
    let mut record = reference_record();
    record["Annual_Premium"] = json!(1e39);

    let (status, body) = post(&app, "/predict", record).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "Annual_Premium");
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_predict_missing_field() {
    let (app, _) = app();
    let mut record = reference_record();
    record.as_object_mut().unwrap().remove("Gender_Male");

    let (status, body) = post(&app, "/predict", record).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Gender_Male"));
}

#[tokio::test]
async fn test_predict_malformed_json() {
    let (app, _) = app();
    let (status, body) = send(&app, Method::POST, "/predict", Some("{not json".to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_predict_without_model() {
    let app = degraded_app();
    let (status, body) = post(&app, "/predict", reference_record()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Model not loaded");
}

#[tokio::test]
async fn test_predict_validation_before_model_check() {
    let mut record = reference_record();
    record["Age"] = json!(150);

    let (status, _) = post(&degraded_app(), "/predict", record).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_predict_inference_failure() {
    let app = app_with(PredictionService::new(Arc::new(StubClassifier::new(true))));
    let (status, body) = post(&app, "/predict", reference_record()).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("input tensor rejected"));
}

#[tokio::test]
async fn test_batch_preserves_order() {
    let (app, stub) = app();
    let mut insured = reference_record();
    insured["Previously_Insured"] = json!(1);
    let mut undamaged = reference_record();
    undamaged["Vehicle_Damage_Yes"] = json!(0);

    let (status, body) = post(
        &app,
        "/predict_batch",
        json!({ "data": [reference_record(), insured, undamaged, reference_record()] }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "predictions": [1, 0, 0, 1] }));
    assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_empty_batch() {
    let (app, stub) = app();
    let (status, body) = post(&app, "/predict_batch", json!({ "data": [] })).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "predictions": [] }));
    assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_empty_batch_without_model() {
    let (status, body) = post(&degraded_app(), "/predict_batch", json!({ "data": [] })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "predictions": [] }));
}

#[tokio::test]
async fn test_batch_invalid_record_index() {
    let (app, _) = app();
    let mut bad = reference_record();
    bad["Vehicle_Age_gt_2_Years"] = json!(1);

    let (status, body) = post(&app, "/predict_batch", json!({ "data": [reference_record(), bad] })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["index"], 1);
    assert!(body["error"].as_str().unwrap().starts_with("Record 1"));
}

#[tokio::test]
async fn test_batch_limit() {
    let stub = Arc::new(StubClassifier::new(false));
    let app = app_with(PredictionService::new(stub).with_max_batch_size(1));

    let (status, _) = post(
        &app,
        "/predict_batch",
        json!({ "data": [reference_record(), reference_record()] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_model_status() {
    let (app, _) = app();
    post(&app, "/predict", reference_record()).await;

    let (status, body) = send(&app, Method::GET, "/model", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
    assert_eq!(body["requests_served"], 1);
    assert_eq!(body["model"]["source"], "stub.onnx");
    assert_eq!(body["layout"]["feature_count"], 9);
    assert_eq!(body["stats"]["inference_count"], 1);
}

#[tokio::test]
async fn test_model_status_degraded() {
    let (_, body) = send(&degraded_app(), Method::GET, "/model", None).await;
    assert_eq!(body["status"], "ERROR");
    assert_eq!(body["reason"], "Model not found: lgb_model.onnx");
    assert!(body["model"].is_null());
}
