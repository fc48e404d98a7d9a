//! HTTP client tests against a mock form service, plus the offline file
//! service.

use std::io::Write;

use forms::{FileFormService, FormService, HttpFormService, Identity, RegisterOutcome, ServiceError};
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ada() -> Identity {
    Identity {
        roll_number: "RA2211003".into(),
        name: "Ada".into(),
    }
}

fn form_body() -> serde_json::Value {
    json!({
        "message": "Form fetched",
        "form": {
            "formTitle": "Feedback",
            "formId": "fb-1",
            "version": "2",
            "sections": [{
                "sectionId": 1,
                "title": "Rating",
                "description": "How was it?",
                "fields": [{
                    "fieldId": "rating", "type": "dropdown", "label": "Rating",
                    "required": true,
                    "options": [
                        { "label": "Good", "value": "good" },
                        { "label": "Bad", "value": "bad" }
                    ]
                }]
            }]
        }
    })
}

async fn client(server: &MockServer) -> HttpFormService {
    HttpFormService::new(server.uri()).unwrap()
}

#[tokio::test]
async fn register_posts_identity_as_camel_case() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-user"))
        .and(body_json(json!({ "rollNumber": "RA2211003", "name": "Ada" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "message": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = client(&server).await.register_user(&ada()).await.unwrap();
    assert_eq!(outcome, RegisterOutcome::Created);
}

#[tokio::test]
async fn existing_user_counts_as_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-user"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({ "message": "User already exists" })),
        )
        .mount(&server)
        .await;

    let outcome = client(&server).await.register_user(&ada()).await.unwrap();
    assert_eq!(outcome, RegisterOutcome::AlreadyExists);
}

#[tokio::test]
async fn register_server_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/create-user"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client(&server).await.register_user(&ada()).await.unwrap_err();
    match err {
        ServiceError::Api { status, body, endpoint } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
            assert!(endpoint.ends_with("/create-user"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn fetch_form_passes_roll_number_and_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-form"))
        .and(query_param("rollNumber", "RA2211003"))
        .respond_with(ResponseTemplate::new(200).set_body_json(form_body()))
        .expect(1)
        .mount(&server)
        .await;

    let schema = client(&server).await.fetch_form("RA2211003").await.unwrap();
    assert_eq!(schema.title, "Feedback");
    assert_eq!(schema.form_id.as_deref(), Some("fb-1"));
    assert_eq!(schema.field("rating").unwrap().kind.options().len(), 2);
}

#[tokio::test]
async fn fetch_form_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-form"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server).await.fetch_form("nobody").await.unwrap_err();
    assert!(matches!(err, ServiceError::NotFound(r) if r == "nobody"));
}

#[tokio::test]
async fn fetch_form_rejects_invalid_schema() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/get-form"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "ok",
            "form": { "formTitle": "Empty", "sections": [] }
        })))
        .mount(&server)
        .await;

    let err = client(&server).await.fetch_form("x").await.unwrap_err();
    assert!(matches!(err, ServiceError::Schema(_)), "{err:?}");
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    // Nothing listens on the discard port.
    let svc = HttpFormService::new("http://127.0.0.1:9").unwrap();
    let err = svc.fetch_form("x").await.unwrap_err();
    assert!(matches!(err, ServiceError::Http { .. }), "{err:?}");
}

#[tokio::test]
async fn file_service_reads_envelope_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{}", form_body()).unwrap();

    let svc = FileFormService::new(file.path());
    assert_eq!(svc.register_user(&ada()).await.unwrap(), RegisterOutcome::Created);
    let schema = svc.fetch_form("anyone").await.unwrap();
    assert_eq!(schema.sections[0].title, "Rating");
}

#[tokio::test]
async fn file_service_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let svc = FileFormService::new(dir.path().join("missing.json"));
    let err = svc.fetch_form("x").await.unwrap_err();
    assert!(matches!(err, ServiceError::Io(_)));
}
