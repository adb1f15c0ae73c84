use super::*;
use async_trait::async_trait;
use axum::{body, body::Body, http::Request};
use mailer::{EmailProvider, OutboundEmail, ProviderCredential, ProviderError};
use serde_json::Value;
use server_api::{MailSettings, Posture};
use tokio::sync::Mutex;
use tower::ServiceExt;

#[derive(Default)]
struct RecordingProvider {
    fail_with_status: Option<u16>,
    panic: bool,
    sent: Mutex<Vec<OutboundEmail>>,
}

#[async_trait]
impl EmailProvider for RecordingProvider {
    async fn send(
        &self,
        _credential: &ProviderCredential,
        email: &OutboundEmail,
    ) -> Result<(), ProviderError> {
        if self.panic {
            panic!("provider exploded");
        }
        self.sent.lock().await.push(email.clone());
        match self.fail_with_status {
            Some(status) => Err(ProviderError::Status { status, body: None }),
            None => Ok(()),
        }
    }
}

fn test_app(provider: Arc<RecordingProvider>, api_key: Option<&str>, posture: Posture) -> Router {
    let contact = ContactContext {
        provider,
        mail: MailSettings {
            api_key: api_key.map(str::to_string),
            from_email: "sender@port24.tech".into(),
            contact_email: "inbox@port24.tech".into(),
        },
        posture,
    };
    build_router(Arc::new(AppState { contact }), 1024)
}

fn post_contact(body: impl Into<Body>) -> Request<Body> {
    Request::post(CONTACT_ROUTE)
        .header("content-type", "application/json")
        .body(body.into())
        .expect("request")
}

async fn json_body(response: Response) -> Value {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

fn jane() -> String {
    serde_json::json!({
        "name": "Jane Doe",
        "email": "jane@example.com",
        "phone": "",
        "message": "Hello",
    })
    .to_string()
}

#[tokio::test]
async fn healthz_reports_ok() {
    let app = test_app(Arc::default(), None, Posture::Production);
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn valid_submission_is_confirmed() {
    let provider = Arc::new(RecordingProvider::default());
    let app = test_app(provider.clone(), Some("SG.key"), Posture::Production);

    let response = app.oneshot(post_contact(jane())).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let body = json_body(response).await;
    assert_eq!(
        body,
        serde_json::json!({ "message": "Thank you! Your message has been sent successfully." })
    );

    let sent = provider.sent.lock().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].reply_to.email, "jane@example.com");
    assert_eq!(sent[0].to.email, "inbox@port24.tech");
    assert_eq!(sent[0].from.email, "sender@port24.tech");
}

#[tokio::test]
async fn missing_fields_are_a_caller_fault() {
    let app = test_app(Arc::default(), Some("SG.key"), Posture::Production);

    let response = app
        .oneshot(post_contact(r#"{"email":"jane@example.com"}"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = json_body(response).await;
    assert_eq!(body["error"], "Missing required fields");
    assert_eq!(body["code"], "missing_fields");
    assert_eq!(body["details"]["name"], false);
    assert_eq!(body["details"]["email"], true);
    assert_eq!(body["details"]["message"], false);
}

#[tokio::test]
async fn malformed_json_is_invalid_request_format() {
    let app = test_app(Arc::default(), Some("SG.key"), Posture::Production);

    let response = app
        .oneshot(post_contact("name=Jane"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Invalid request format");
}

#[tokio::test]
async fn array_body_is_invalid_request_format() {
    let provider = Arc::new(RecordingProvider::default());
    let app = test_app(provider.clone(), Some("SG.key"), Posture::Production);

    let response = app
        .oneshot(post_contact(r#"["Jane","jane@example.com",null,"Hi"]"#))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["code"], "invalid_request_format");
    assert!(provider.sent.lock().await.is_empty());
}

#[tokio::test]
async fn invalid_email_is_a_caller_fault() {
    let app = test_app(Arc::default(), Some("SG.key"), Posture::Production);

    let response = app
        .oneshot(post_contact(
            r#"{"name":"Jane","email":"jane at example.com","message":"Hi"}"#,
        ))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "Invalid email format");
}

#[tokio::test]
async fn unconfigured_service_makes_no_delivery_attempt() {
    let provider = Arc::new(RecordingProvider::default());
    let app = test_app(provider.clone(), None, Posture::Production);

    let response = app.oneshot(post_contact(jane())).await.expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(
        body["error"],
        "Email service is not configured. Please contact support."
    );
    assert!(body.get("details").is_none());
    assert!(provider.sent.lock().await.is_empty());
}

#[tokio::test]
async fn provider_auth_failure_is_not_passed_through() {
    let provider = Arc::new(RecordingProvider {
        fail_with_status: Some(401),
        ..Default::default()
    });
    let app = test_app(provider, Some("SG.key"), Posture::Production);

    let response = app.oneshot(post_contact(jane())).await.expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = json_body(response).await;
    assert_eq!(
        body["error"],
        "Email service authentication failed. Please contact support."
    );
    assert_eq!(body["code"], "provider_authentication");
    assert!(body.get("details").is_none());
}

#[tokio::test]
async fn development_posture_includes_diagnostics() {
    let provider = Arc::new(RecordingProvider {
        fail_with_status: Some(403),
        ..Default::default()
    });
    let app = test_app(provider, Some("SG.key"), Posture::Development);

    let response = app.oneshot(post_contact(jane())).await.expect("response");
    let body = json_body(response).await;
    assert_eq!(body["code"], "provider_authorization");
    assert_eq!(body["details"]["statusCode"], 403);
}

#[tokio::test]
async fn panicking_handler_still_answers() {
    let provider = Arc::new(RecordingProvider {
        panic: true,
        ..Default::default()
    });
    let app = test_app(provider, Some("SG.key"), Posture::Production);

    let response = app.oneshot(post_contact(jane())).await.expect("response");
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        json_body(response).await["error"],
        "An unexpected error occurred. Please try again later."
    );
}

#[tokio::test]
async fn oversized_body_is_refused() {
    let provider = Arc::new(RecordingProvider::default());
    let app = test_app(provider.clone(), Some("SG.key"), Posture::Production);

    let message = "x".repeat(4096);
    let payload = serde_json::json!({
        "name": "Jane",
        "email": "jane@example.com",
        "message": message,
    })
    .to_string();
    let response = app.oneshot(post_contact(payload)).await.expect("response");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(provider.sent.lock().await.is_empty());
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = test_app(Arc::default(), None, Posture::Production);
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");

    for (name, value) in SECURITY_HEADERS {
        assert_eq!(
            response.headers().get(name).and_then(|v| v.to_str().ok()),
            Some(value),
            "{name}"
        );
    }
}

#[tokio::test]
async fn only_post_is_routed() {
    let app = test_app(Arc::default(), Some("SG.key"), Posture::Production);
    let request = Request::get(CONTACT_ROUTE)
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
