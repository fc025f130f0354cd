use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use deskmate_adapters::{AdapterError, Adapters, Geocoder, RateSource, TimezoneLookup};
use deskmate_api::{build_router, build_state, Settings};
use deskmate_core::{Coordinates, ASK_FOR_PLACE_REPLY, FALLBACK_REPLY, TIME_UNAVAILABLE_REPLY};
use futures::future::BoxFuture;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "deskmate-test-boundary";

struct StaticGeocoder;

impl Geocoder for StaticGeocoder {
    fn geocode<'a>(
        &'a self,
        place: &'a str,
    ) -> BoxFuture<'a, Result<Option<Coordinates>, AdapterError>> {
        let found = (!place.contains("atlantis")).then_some(Coordinates {
            latitude: 35.6762,
            longitude: 139.6503,
        });
        Box::pin(async move { Ok(found) })
    }
}

struct StaticTimezone;

impl TimezoneLookup for StaticTimezone {
    fn timezone_at(&self, _coordinates: Coordinates) -> Result<Option<String>, AdapterError> {
        Ok(Some("Asia/Tokyo".to_string()))
    }
}

struct StaticRates;

impl RateSource for StaticRates {
    fn rate<'a>(
        &'a self,
        from: &'a str,
        to: &'a str,
    ) -> BoxFuture<'a, Result<Option<f64>, AdapterError>> {
        let rate = match (from, to) {
            ("USD", "EUR") => Some(2.0),
            ("USD", "INR") => Some(83.25),
            _ => None,
        };
        Box::pin(async move { Ok(rate) })
    }
}

fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let settings = Settings {
        upload_dir: dir.path().join("uploads"),
        session_ttl: Duration::from_secs(600),
        ..Settings::default()
    };
    let adapters = Adapters {
        geocoder: Arc::new(StaticGeocoder),
        timezones: Arc::new(StaticTimezone),
        rates: Arc::new(StaticRates),
    };

    let state = build_state(&settings, adapters).expect("state should build");
    (build_router(state), dir)
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn ask(app: &Router, question: &str) -> String {
    let request = Request::builder()
        .method("POST")
        .uri("/ask")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "question": question }).to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let parsed: Value = serde_json::from_str(&body_text(response).await).unwrap();
    parsed["response"].as_str().unwrap().to_string()
}

fn multipart_request(field: &str, filename: &str, content: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
         Content-Type: text/plain\r\n\r\n\
         {content}\r\n\
         --{BOUNDARY}--\r\n"
    );

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn upload(app: &Router, filename: &str, content: &str) -> String {
    let response = app
        .clone()
        .oneshot(multipart_request("file", filename, content))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/read");

    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|value| value.to_str().ok())
        .expect("set-cookie header should be present");
    assert!(set_cookie.contains("HttpOnly"));

    set_cookie
        .split(';')
        .next()
        .expect("cookie pair should be present")
        .to_string()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn health_reports_model_and_metrics() {
    let (app, _dir) = test_app();

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));

    let parsed: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(parsed["status"], "ok");
    assert_eq!(parsed["model"]["name"], "lexical-overlap");
    assert_eq!(parsed["model"]["loaded"], false);
    assert_eq!(parsed["metrics"]["requests_total"], 0);
}

#[tokio::test]
async fn pages_and_script_are_served() {
    let (app, _dir) = test_app();

    for uri in ["/", "/chatbot"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers()[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("text/html"));
        assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    }

    let response = app.oneshot(get("/static/script.js", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("fetch('/ask'"));
}

#[tokio::test]
async fn ask_routes_every_intent() {
    let (app, _dir) = test_app();

    assert_eq!(ask(&app, "What time is it").await, ASK_FOR_PLACE_REPLY);

    let city = ask(&app, "time in tokyo").await;
    assert!(city.starts_with("The current time in Tokyo is "), "{city}");

    assert_eq!(ask(&app, "time in atlantis").await, TIME_UNAVAILABLE_REPLY);

    assert_eq!(
        ask(&app, "10 USD to EUR").await,
        "10.0 USD is equal to 20.0 EUR (Live Rate)."
    );
    assert_eq!(
        ask(&app, "3 abc to xyz").await,
        "Sorry, I couldn't fetch the exchange rate for ABC to XYZ."
    );

    assert_eq!(ask(&app, "Hi").await, "Hello! How can I help you?");
    assert_eq!(ask(&app, "zzz qwerty").await, FALLBACK_REPLY);
}

#[tokio::test]
async fn time_outranks_currency_and_faq() {
    let (app, _dir) = test_app();

    let reply = ask(&app, "time in paris 10 usd to eur").await;
    assert!(reply.starts_with("The current time in Paris"), "{reply}");

    let reply = ask(&app, "hi, what time is it in london").await;
    assert!(reply.starts_with("The current time in London is "), "{reply}");

    let reply = ask(&app, "hi, convert 10 usd into inr").await;
    assert_eq!(reply, "10.0 USD is equal to 832.5 INR (Live Rate).");
}

#[tokio::test]
async fn ask_without_question_falls_back() {
    let (app, _dir) = test_app();

    let request = Request::builder()
        .method("POST")
        .uri("/ask")
        .header("content-type", "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(parsed["response"], FALLBACK_REPLY);
}

#[tokio::test]
async fn read_without_upload_reports_missing_file() {
    let (app, _dir) = test_app();

    let response = app.clone().oneshot(get("/read", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "No file uploaded");

    let response = app
        .oneshot(get("/read", Some("deskmate_session=unknown")))
        .await
        .unwrap();
    assert_eq!(body_text(response).await, "No file uploaded");
}

#[tokio::test]
async fn upload_rejects_missing_field_and_empty_filename() {
    let (app, _dir) = test_app();

    let response = app
        .clone()
        .oneshot(multipart_request("attachment", "notes.txt", "hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "No file uploaded");

    let response = app
        .oneshot(multipart_request("file", "", "hello"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, "No file selected");
}

#[tokio::test]
async fn uploaded_text_reads_back_verbatim() {
    let (app, dir) = test_app();
    let content = "Chapter 1\nThe <quick> brown fox & friends.";

    let cookie = upload(&app, "story.txt", content).await;
    assert!(dir.path().join("uploads").join("story.txt").exists());

    let response = app
        .clone()
        .oneshot(get("/read/raw", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_text(response).await, content);

    let response = app.oneshot(get("/read", Some(&cookie))).await.unwrap();
    let page = body_text(response).await;
    assert!(page.contains("The &lt;quick&gt; brown fox &amp; friends."));
}

#[tokio::test]
async fn uploaded_path_components_are_stripped() {
    let (app, dir) = test_app();

    let cookie = upload(&app, "../../escape.txt", "contained").await;
    assert!(dir.path().join("uploads").join("escape.txt").exists());
    assert!(!dir.path().join("escape.txt").exists());

    let response = app.oneshot(get("/read/raw", Some(&cookie))).await.unwrap();
    assert_eq!(body_text(response).await, "contained");
}

#[tokio::test]
async fn corrupt_pdf_reports_read_error() {
    let (app, _dir) = test_app();

    let cookie = upload(&app, "broken.pdf", "not a pdf at all").await;
    let response = app.oneshot(get("/read", Some(&cookie))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.starts_with("Error reading file: "));
}

#[tokio::test]
async fn document_questions_use_session_upload() {
    let (app, _dir) = test_app();
    let content = "Submissions close on 1 March. The abstract is limited to 250 words.";
    let cookie = upload(&app, "guide.txt", content).await;

    let request = Request::builder()
        .method("POST")
        .uri("/ask_document")
        .header("content-type", "application/json")
        .header(header::COOKIE, &cookie)
        .body(Body::from(
            json!({ "question": "How many words for the abstract?" }).to_string(),
        ))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let parsed: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(parsed["response"], "The abstract is limited to 250 words.");
    assert!(parsed["score"].as_f64().unwrap() > 0.0);

    let response = app.oneshot(get("/health", None)).await.unwrap();
    let parsed: Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(parsed["model"]["loaded"], true);
    assert_eq!(parsed["metrics"]["uploads_total"], 1);
    assert_eq!(parsed["metrics"]["qa_inference_total"], 1);
}
