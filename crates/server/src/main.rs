use std::{any::Any, sync::Arc};

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{HeaderName, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use mailer::SendGridClient;
use server_api::{log_failure, public_message, submit_contact, ContactContext};
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{ContactResponse, CONTACT_ROUTE},
};
use tower_http::{
    catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer,
};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

mod app_state;
mod config;

use app_state::AppState;
use config::load_settings;

const REQUEST_ID_HEADER: &str = "x-request-id";

const SECURITY_HEADERS: [(&str, &str); 7] = [
    ("x-dns-prefetch-control", "on"),
    (
        "strict-transport-security",
        "max-age=63072000; includeSubDomains; preload",
    ),
    ("x-frame-options", "SAMEORIGIN"),
    ("x-content-type-options", "nosniff"),
    ("x-xss-protection", "1; mode=block"),
    ("referrer-policy", "origin-when-cross-origin"),
    (
        "permissions-policy",
        "camera=(), microphone=(), geolocation=()",
    ),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let settings = load_settings()?;
    if settings.sendgrid_api_key.is_none() {
        warn!("SENDGRID_API_KEY is not set; contact submissions will fail until it is configured");
    }

    let contact = ContactContext {
        provider: Arc::new(SendGridClient::new(settings.sendgrid_api_url.clone())),
        mail: settings.mail_settings(),
        posture: settings.posture(),
    };
    let state = AppState { contact };
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr = settings.bind_addr()?;
    info!(%addr, posture = ?settings.posture(), "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    let mut router = Router::new()
        .route("/healthz", get(healthz))
        .route(CONTACT_ROUTE, post(http_submit_contact))
        .with_state(state)
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(CatchPanicLayer::custom(panic_response));

    for (name, value) in SECURITY_HEADERS {
        router = router.layer(SetResponseHeaderLayer::if_not_present(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        ));
    }

    router.layer(middleware::from_fn(with_request_id))
}

async fn with_request_id(request: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4().simple().to_string();
    let span = info_span!(
        "request",
        %request_id,
        method = %request.method(),
        path = %request.uri().path(),
    );

    let mut response = next.run(request).instrument(span).await;
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response
            .headers_mut()
            .insert(HeaderName::from_static(REQUEST_ID_HEADER), value);
    }
    response
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(%detail, "handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiError::new(
            ErrorCode::Internal,
            public_message(ErrorCode::Internal),
        )),
    )
        .into_response()
}

async fn healthz() -> &'static str {
    "ok"
}

async fn http_submit_contact(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<ContactResponse>, (StatusCode, Json<ApiError>)> {
    submit_contact(&state.contact, &body)
        .await
        .map(Json)
        .map_err(|err| {
            log_failure(&err);
            let status =
                StatusCode::from_u16(err.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, Json(err.to_api_error(state.contact.posture)))
        })
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
