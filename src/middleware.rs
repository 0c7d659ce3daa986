use crate::auth::CurrentUser;
use rocket::fairing::{Fairing, Info, Kind};
use rocket::http::{Header, Status};
use rocket::request::Request;
use rocket::{Data, Response};
use std::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "X-Request-Id";

/// Per-request correlation id, stored in the request-local cache.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn new() -> Self {
        RequestId(Uuid::new_v4().to_string())
    }

    pub fn of(request: &Request<'_>) -> String {
        request
            .local_cache(|| None::<RequestId>)
            .as_ref()
            .map(|r| r.0.clone())
            .unwrap_or_else(|| "unknown".to_string())
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy)]
struct RequestStart(Instant);

/// Tags every request with an id, logs it on the way in and out, and sets
/// response headers common to the whole API.
pub struct RequestLogger;

#[rocket::async_trait]
impl Fairing for RequestLogger {
    fn info(&self) -> Info {
        Info {
            name: "Request Logger",
            kind: Kind::Request | Kind::Response,
        }
    }

    async fn on_request(&self, request: &mut Request<'_>, _: &mut Data<'_>) {
        let request_id = RequestId::new();
        request.local_cache(|| Some(request_id.clone()));
        request.local_cache(|| Some(RequestStart(Instant::now())));

        debug!(
            request_id = %request_id.0,
            method = %request.method(),
            uri = %request.uri(),
            "incoming request"
        );
    }

    async fn on_response<'r>(&self, request: &'r Request<'_>, response: &mut Response<'r>) {
        let request_id = RequestId::of(request);
        let elapsed_ms = request
            .local_cache(|| None::<RequestStart>)
            .map(|start| start.0.elapsed().as_millis())
            .unwrap_or_default();
        let user_id = request.local_cache(|| None::<CurrentUser>).as_ref().map(|u| u.id.to_string());

        response.set_header(Header::new(REQUEST_ID_HEADER, request_id.clone()));
        response.set_header(Header::new("X-Content-Type-Options", "nosniff"));
        response.set_header(Header::new("X-Frame-Options", "DENY"));
        response.set_header(Header::new("Cache-Control", "no-store"));

        let status = response.status();
        if is_failure(status) {
            warn!(
                request_id = %request_id,
                user_id = ?user_id,
                method = %request.method(),
                uri = %request.uri(),
                status = status.code,
                elapsed_ms = elapsed_ms as u64,
                "request completed with error"
            );
        } else {
            info!(
                request_id = %request_id,
                user_id = ?user_id,
                method = %request.method(),
                uri = %request.uri(),
                status = status.code,
                elapsed_ms = elapsed_ms as u64,
                "request completed"
            );
        }
    }
}

fn is_failure(status: Status) -> bool {
    status.class().is_client_error() || status.class().is_server_error()
}
