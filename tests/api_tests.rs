/// HTTP endpoint tests for the job-lifecycle shell
/// Drives the handlers through an in-process router with mocked providers.
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use http_body_util::BodyExt;
use rust_prospect_api::config::Config;
use rust_prospect_api::generate::ScriptedGenerator;
use rust_prospect_api::handlers::{self, AppState};
use rust_prospect_api::job_store::InMemoryJobStore;
use rust_prospect_api::services::{
    MailerService, ProfileEnrichService, ProspectSearchService, WebSearchService,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(base_url: String) -> Config {
    Config {
        port: 8000,
        http_timeout_secs: 5,
        search_base_url: base_url.clone(),
        search_api_key: "test_search_key".to_string(),
        enrich_base_url: base_url.clone(),
        enrich_api_key: "test_enrich_key".to_string(),
        generator_base_url: base_url.clone(),
        generator_api_key: "test_generator_key".to_string(),
        generator_model: "test-model".to_string(),
        web_search_base_url: None,
        web_search_api_key: None,
        mailer_base_url: None,
        mailer_api_key: None,
        mailer_user_id: "me".to_string(),
        outreach_enabled: false,
    }
}

fn test_app(config: Config, generator: ScriptedGenerator) -> Router {
    let search = ProspectSearchService::new(&config).unwrap();
    let enrich = ProfileEnrichService::new(&config).unwrap();
    let web_search = WebSearchService::from_config(&config).unwrap();
    let mailer = MailerService::from_config(&config).unwrap();

    let state = Arc::new(AppState {
        config,
        store: Arc::new(InMemoryJobStore::new()),
        generator: Arc::new(generator),
        search,
        enrich,
        web_search,
        mailer,
    });

    Router::new()
        .route("/health", get(handlers::health))
        .route("/start_job", post(handlers::start_job))
        .route("/status", get(handlers::check_status))
        .route("/provide_input", post(handlers::provide_input))
        .route("/availability", get(handlers::availability))
        .route("/input_schema", get(handlers::input_schema))
        .with_state(state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn availability_and_schema_report_the_convention_shapes() {
    let mock_server = MockServer::start().await;
    let app = test_app(create_test_config(mock_server.uri()), ScriptedGenerator::new());

    let response = app.clone().oneshot(get_request("/availability")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "available");
    assert!(body["message"].is_string());

    let response = app.clone().oneshot(get_request("/input_schema")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["input_data"][0]["key"], "text");

    let response = app.oneshot(get_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn start_job_runs_the_workflow_and_completes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/people/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "people": [
                {"first_name": "Ada", "last_name": "Lovelace", "organization_name": "Analytical Engines"}
            ]
        })))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/people/match"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "person": {"email": "ada@analytical.com"}
        })))
        .mount(&mock_server)
        .await;

    let generator =
        ScriptedGenerator::new().with_reply(r#"{"q_keywords": "blockchain investors"}"#);
    let app = test_app(create_test_config(mock_server.uri()), generator);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/start_job",
            json!({"text": "find blockchain investors"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
    let job_id = body["job_id"].as_str().unwrap().to_string();
    assert!(body["payment_id"].is_string());

    // The job is completed and carries the workflow report.
    let response = app
        .clone()
        .oneshot(get_request(&format!("/status?job_id={}", job_id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["job_id"], job_id.as_str());
    assert_eq!(body["status"], "completed");
    assert_eq!(body["result"]["contacts"][0]["email"], "ada@analytical.com");

    // Known jobs acknowledge extra input.
    let response = app
        .oneshot(json_request(
            "POST",
            "/provide_input",
            json!({"job_id": job_id}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn empty_goal_text_is_rejected() {
    let mock_server = MockServer::start().await;
    let app = test_app(create_test_config(mock_server.uri()), ScriptedGenerator::new());

    let response = app
        .oneshot(json_request("POST", "/start_job", json!({"text": "   "})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_job_ids_return_not_found() {
    let mock_server = MockServer::start().await;
    let app = test_app(create_test_config(mock_server.uri()), ScriptedGenerator::new());

    let response = app
        .clone()
        .oneshot(get_request("/status?job_id=missing"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert!(body["error"].as_str().unwrap().contains("missing"));

    let response = app
        .oneshot(json_request(
            "POST",
            "/provide_input",
            json!({"job_id": "missing"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
