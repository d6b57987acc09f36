use api_exception_filter::prelude::*;
use axum::{
    body::Body,
    http::{Request, header},
    routing::{get, post},
};
use serde_json::{Value, json};
use std::sync::Mutex;
use tower::ServiceExt;
use tower_http::trace::TraceLayer;

#[derive(Default)]
struct RecordingTrace {
    messages: Mutex<Vec<String>>,
}

impl RecordingTrace {
    fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl TraceService for RecordingTrace {
    fn trace(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

async fn find_widget(Path(id): Path<u32>) -> Result<Json<Value>, Failure> {
    match id {
        1 => Ok(Json(json!({ "id": 1, "name": "sprocket" }))),
        2 => Err(Failure::not_found("widget 2 was archived").not_logged()),
        _ => Err(Failure::not_found(format!("widget {id} missing"))),
    }
}

async fn create_widget(validation: Validation) -> Result<Json<Value>, Failure> {
    validation.add_error("email", "is required");
    validation.add_error("name", "is too long");
    validation.add_error("email", "is malformed");
    Err(Failure::unknown("widget payload rejected"))
}

async fn duplicate_widget() -> Result<Json<Value>, Failure> {
    Err(Failure::conflict("widget sprocket already registered").not_logged())
}

async fn secret() -> Result<Json<Value>, Failure> {
    Err(Failure::unauthorized("token expired at 12:00"))
}

async fn admin() -> Result<Json<Value>, Failure> {
    Err(Failure::forbidden("role viewer lacks admin"))
}

async fn explode() -> Result<Json<Value>, Failure> {
    Err(anyhow::anyhow!("connection pool exhausted").into())
}

fn app(options: FilterOptions) -> (Router, Arc<RecordingTrace>) {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let trace = Arc::new(RecordingTrace::default());
    let filter = ApiExceptionFilter::new(trace.clone()).with_options(options);

    let router = Router::new()
        .route("/widgets", post(create_widget))
        .route("/widgets/{id}", get(find_widget))
        .route("/widgets/duplicate", post(duplicate_widget))
        .route("/secret", get(secret))
        .route("/admin", get(admin))
        .route("/explode", get(explode))
        .layer(ExceptionFilterLayer::new(filter))
        .layer(TraceLayer::new_for_http());

    (router, trace)
}

async fn send(router: Router, method: &str, uri: &str) -> (StatusCode, Option<String>, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|value| value.to_str().unwrap().to_string());
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, content_type, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_success_is_untouched() {
    let (router, trace) = app(FilterOptions::default());

    let (status, content_type, body) = send(router, "GET", "/widgets/1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/json"));
    assert_eq!(body["name"], "sprocket");
    assert!(trace.messages().is_empty());
}

#[tokio::test]
async fn test_not_found_is_traced_and_described() {
    let (router, trace) = app(FilterOptions::default());

    let (status, content_type, body) = send(router, "GET", "/widgets/7").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    assert_eq!(
        body,
        json!({
            "type": "https://tools.ietf.org/html/rfc7231#section-6.5.4",
            "title": "The specified resource was not found.",
            "status": 404,
            "detail": "widget 7 missing",
        })
    );
    assert_eq!(trace.messages(), vec!["widget 7 missing"]);
}

#[tokio::test]
async fn test_not_logged_not_found_is_quiet() {
    let (router, trace) = app(FilterOptions::default());

    let (status, _, body) = send(router, "GET", "/widgets/2").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "widget 2 was archived");
    assert!(trace.messages().is_empty());
}

#[tokio::test]
async fn test_conflict_is_traced_despite_not_logged() {
    let (router, trace) = app(FilterOptions::default());

    let (status, _, body) = send(router, "POST", "/widgets/duplicate").await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["title"], "Conflict.");
    assert_eq!(body["detail"], "The resource already exists.");
    assert_eq!(trace.messages(), vec!["widget sprocket already registered"]);
}

#[tokio::test]
async fn test_conflict_detail_in_french() {
    let config = ConfigService::default();
    config.set("EXCEPTION_FILTER_LOCALE", "fr");
    let (router, _) = app(FilterOptions::from_config(&config).unwrap());

    let (_, _, body) = send(router, "POST", "/widgets/duplicate").await;

    assert_eq!(body["detail"], "La ressource existe déjà.");
}

#[tokio::test]
async fn test_auth_failures_hide_their_message() {
    let (router, trace) = app(FilterOptions::default());

    let (status, _, body) = send(router.clone(), "GET", "/secret").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["title"], "Unauthorized");
    assert!(body.get("detail").is_none());

    let (status, _, body) = send(router, "GET", "/admin").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["title"], "Forbidden");
    assert!(body.get("detail").is_none());

    assert_eq!(
        trace.messages(),
        vec!["token expired at 12:00", "role viewer lacks admin"]
    );
}

#[tokio::test]
async fn test_validation_errors_win_over_generic_failure() {
    let (router, trace) = app(FilterOptions::default());

    let (status, _, body) = send(router, "POST", "/widgets").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["type"], "https://tools.ietf.org/html/rfc7231#section-6.5.1");
    assert_eq!(
        body["errors"],
        json!({ "email": ["is required", "is malformed"], "name": ["is too long"] })
    );
    assert!(trace.messages().is_empty());
}

#[tokio::test]
async fn test_unexpected_failure_is_generic_500() {
    let (router, trace) = app(FilterOptions::default());

    let (status, _, body) = send(router, "GET", "/explode").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({
            "type": "https://tools.ietf.org/html/rfc7231#section-6.6.1",
            "title": "An error occurred while processing your request.",
            "status": 500,
        })
    );
    assert!(trace.messages().is_empty());
}
