//! Health & readiness handlers.
//!
//! - GET /healthz  -> simple liveness ("ok")
//! - GET /readyz   -> readiness that checks the archiver answers `index/list`

use crate::services::gateway_service::GatewayService;
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// `GET /healthz`
///
/// Very small liveness probe — always returns 200 OK with a plain JSON body.
/// This endpoint should be cheap and never perform I/O.
pub async fn healthz() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok".into(),
        }),
    )
}

/// `GET /readyz`
///
/// Readiness probe that asks the archiver for its index list.
///
/// HTTP 200 when the archiver answers 200, HTTP 503 otherwise.
pub async fn readyz(State(service): State<GatewayService>) -> impl IntoResponse {
    let archiver_check = match service.archiver_ready().await {
        Ok(()) => CheckStatus {
            ok: true,
            error: None,
        },
        Err(e) => {
            tracing::warn!("readiness check failed: {}", e);
            CheckStatus {
                ok: false,
                error: Some(e),
            }
        }
    };

    let overall_ok = archiver_check.ok;
    let mut checks = HashMap::new();
    checks.insert("archiver".to_string(), archiver_check);

    let body = ReadyResponse {
        status: if overall_ok {
            "ok".into()
        } else {
            "error".into()
        },
        checks,
    };

    let status = if overall_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(body))
}

#[derive(Serialize, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Serialize, Deserialize)]
struct ReadyResponse {
    status: String,
    checks: HashMap<String, CheckStatus>,
}

#[derive(Serialize, Deserialize)]
struct CheckStatus {
    ok: bool,
    error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        routes::routes::routes,
        services::archiver_client::{Endpoint, fake::FakeArchiver},
    };
    use axum_test::TestServer;
    use std::sync::Arc;

    fn server(fake: FakeArchiver) -> TestServer {
        let service = GatewayService::new(Arc::new(fake));
        TestServer::new(routes().with_state(service)).unwrap()
    }

    #[tokio::test]
    async fn healthz_never_touches_the_archiver() {
        let fake = FakeArchiver::new();
        let server = server(fake.clone());

        let response = server.get("/healthz").await;

        response.assert_status_ok();
        assert_eq!(response.json::<HealthResponse>().status, "ok");
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn readyz_ok_when_archiver_answers() {
        let server = server(FakeArchiver::new().respond(Endpoint::ListIndexes, 200, "[]"));

        let response = server.get("/readyz").await;

        response.assert_status_ok();
        let body = response.json::<ReadyResponse>();
        assert_eq!(body.status, "ok");
        assert!(body.checks["archiver"].ok);
    }

    #[tokio::test]
    async fn readyz_unavailable_when_archiver_down_or_failing() {
        let server = server(
            FakeArchiver::new()
                .respond(Endpoint::ListIndexes, 500, "")
                .unreachable(Endpoint::ListIndexes),
        );

        let failing = server.get("/readyz").await;
        failing.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        let body = failing.json::<ReadyResponse>();
        assert!(body.checks["archiver"].error.as_deref().unwrap().contains("500"));

        let down = server.get("/readyz").await;
        down.assert_status(StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(down.json::<ReadyResponse>().status, "error");
    }
}
