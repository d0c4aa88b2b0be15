use crate::cities::{CitiesController, CitiesDb};
use crate::weather::WeatherController;
use crate::{AppModule, GithubClient};
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use garnish::logging::{FINISH_PREFIX, MemorySink, START_PREFIX};
use garnish::prelude::*;
use garnish::{GarnishError, RouteInfo};
use serde_json::{Value, json};
use tower::ServiceExt;

async fn get_json(app: &App, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[test]
fn test_generated_metadata() {
    assert_eq!(<CitiesDb as Injectable>::ID, "CitiesDB");
    assert_eq!(<CitiesController as Controller>::base_path(), "/api");
    assert_eq!(<WeatherController as Controller>::base_path(), "/api");
}

#[test]
fn test_module_wires_both_controllers() {
    let app = App::wire(AppModule::registry()).unwrap();
    assert_eq!(
        app.routes(),
        &[
            RouteInfo {
                method: Method::Get,
                path: "/api/forecast".into(),
                handler: "WeatherController::get".into(),
            },
            RouteInfo {
                method: Method::Get,
                path: "/api/cities".into(),
                handler: "CitiesController::get".into(),
            },
        ]
    );
    assert!(app.service::<CitiesDb>("CitiesDB").is_ok());
}

#[tokio::test]
async fn test_get_cities() {
    let app = App::wire(AppModule::registry()).unwrap();
    let (status, body) = get_json(&app, "/api/cities").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "cities": ["London", "New York", "Dublin"] }));
}

#[tokio::test]
async fn test_get_forecast_for_city() {
    let app = App::wire(AppModule::registry()).unwrap();
    let (status, body) = get_json(&app, "/api/forecast?cityName=Dublin").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "apiVersion": "v1", "temperature": 20, "humidity": 80, "city": "Dublin" })
    );
}

#[tokio::test]
async fn test_get_forecast_without_city() {
    let app = App::wire(AppModule::registry()).unwrap();
    let (status, body) = get_json(&app, "/api/forecast").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.get("city").is_none());
    assert_eq!(body["apiVersion"], "v1");
}

#[controller(path = "/api")]
struct ShadowController;

#[routes]
impl ShadowController {
    #[get("/cities")]
    fn list(&self) -> Vec<String> {
        Vec::new()
    }
}

#[test]
fn test_duplicate_route_across_controllers_fails() {
    let mut registry = AppModule::registry();
    registry.mount::<ShadowController>();

    match App::wire(registry) {
        Err(GarnishError::DuplicateRoute { path, first, second, .. }) => {
            assert_eq!(path, "/api/cities");
            assert_eq!(first, "CitiesController::get");
            assert_eq!(second, "ShadowController::list");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("duplicate route was accepted"),
    }
}

#[controller(path = "/archive")]
struct ArchiveController {
    #[inject("ArchiveDB")]
    _db: Arc<CitiesDb>,
}

#[routes]
impl ArchiveController {}

#[test]
fn test_missing_injectable_fails() {
    let mut registry = AppModule::registry();
    registry.mount::<ArchiveController>();

    match App::wire(registry) {
        Err(GarnishError::UnresolvedInjection { owner, field, id }) => {
            assert_eq!(owner, "ArchiveController");
            assert_eq!(field, "_db");
            assert_eq!(id, "ArchiveDB");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("missing service was accepted"),
    }
}

#[derive(Injectable)]
#[injectable(id = "Greeter")]
struct Greeter {
    #[inject("CitiesDB")]
    cities: Arc<CitiesDb>,
    punctuation: String,
}

#[controller(path = "/echo")]
struct EchoController {
    #[inject("Greeter")]
    greeter: Arc<Greeter>,
}

#[routes]
impl EchoController {
    #[get("/words")]
    async fn words(&self, #[query] word: String, #[query("n")] count: Option<String>) -> Vec<String> {
        let count = count.and_then(|n| n.parse().ok()).unwrap_or(1);
        vec![format!("{word}{}", self.greeter.punctuation); count]
    }

    #[post("/first-city")]
    fn first_city(&self) -> Option<String> {
        self.greeter.cities.get_cities().into_iter().next()
    }

    #[get("/static")]
    fn motto() -> &'static str {
        "hello"
    }
}

fn echo_app() -> App {
    let mut registry = Registry::new();
    registry
        .mount::<EchoController>()
        .provide::<Greeter>()
        .provide::<CitiesDb>();
    App::wire(registry).unwrap()
}

#[tokio::test]
async fn test_async_handler_with_named_and_bare_query_params() {
    let app = echo_app();

    let (status, body) = get_json(&app, "/echo/words?word=hi&n=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!(["hi", "hi"]));

    let (_, body) = get_json(&app, "/echo/words").await;
    assert_eq!(body, json!([""]));
}

#[tokio::test]
async fn test_post_route_and_nested_service_injection() {
    let app = echo_app();
    let request = Request::builder()
        .method("POST")
        .uri("/echo/first-city")
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(serde_json::from_slice::<Value>(&bytes).unwrap(), json!("London"));

    let (_, body) = get_json(&app, "/echo/static").await;
    assert_eq!(body, json!("hello"));
}

#[test]
fn test_logged_method_returns_original_value() {
    let sink = MemorySink::new();
    let client = GithubClient::with_sink(sink.clone());

    let repos = client.get_repos();
    assert_eq!(repos, vec!["garnish", "weather-server"]);

    let lines = sink.lines();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with(START_PREFIX));
    assert!(lines[1].starts_with(FINISH_PREFIX));
}

#[test]
fn test_logged_method_passes_arguments_and_errors_through() {
    let sink = MemorySink::new();
    let client = GithubClient::with_sink(sink.clone());

    assert_eq!(client.get_repo("hello-world"), Ok("octocat/hello-world".to_string()));
    assert_eq!(client.get_repo(""), Err("repository name is empty".to_string()));
    assert_eq!(sink.lines().len(), 4);
}

#[tokio::test]
async fn test_logged_async_method() {
    let sink = MemorySink::new();
    let client = GithubClient::with_sink(sink.clone());

    assert_eq!(client.count_stars("garnish").await, 7);
    assert_eq!(sink.lines().len(), 2);
}
