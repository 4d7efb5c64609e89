//src/main.rs

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::{
    config::{AppConfig, AppState},
    docs::ApiDoc,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG controla o nível; sem ele, info
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // Se a configuração falhar, a aplicação não deve iniciar.
    let config = AppConfig::from_env()?;
    let app_state = AppState::new(&config).await?;

    let app = router(app_state);

    let listener = TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("🚀 Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(app_state: AppState) -> Router {
    let referral_routes = Router::new()
        .route("/", post(handlers::referrals::register_referral))
        .route(
            "/code",
            post(handlers::referrals::issue_code).get(handlers::referrals::get_code),
        )
        .route("/code/qr", get(handlers::referrals::get_code_qr))
        .route("/stats", get(handlers::referrals::get_stats))
        .route("/dashboard", get(handlers::referrals::get_dashboard))
        .route("/{id}/complete", post(handlers::referrals::complete_referral))
        .route("/{id}/earnings", post(handlers::referrals::record_earnings));

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/referrals", referral_routes)
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
        response::Response,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::{db::InMemoryReferralRepository, services::ReferralService};

    fn create_test_router() -> Router {
        let store = Arc::new(InMemoryReferralRepository::new());
        router(AppState {
            referral_service: ReferralService::new(store, "https://app.fightnet.app/join"),
        })
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        user: Option<Uuid>,
        body: Option<Value>,
    ) -> Response {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header("x-user-id", user.to_string());
        }
        let body = match body {
            Some(body) => {
                request = request.header("content-type", "application/json");
                Body::from(body.to_string())
            }
            None => Body::empty(),
        };

        app.clone().oneshot(request.body(body).unwrap()).await.unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_referral_flow_over_http() {
        let app = create_test_router();
        let coach = Uuid::new_v4();
        let fighter = Uuid::new_v4();

        let response = send(
            &app,
            "POST",
            "/api/referrals/code",
            Some(coach),
            Some(json!({ "displayName": "Coach Rivera", "role": "coach" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let code = body_json(response).await["code"].as_str().unwrap().to_string();

        let response = send(
            &app,
            "POST",
            "/api/referrals",
            Some(fighter),
            Some(json!({ "code": code, "name": "Leo", "role": "fighter" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let referral_id = body_json(response).await["id"].as_str().unwrap().to_string();

        // O treinador não conclui no lugar do lutador
        let uri = format!("/api/referrals/{}/complete", referral_id);
        let response = send(&app, "POST", &uri, Some(coach), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = send(&app, "POST", &uri, Some(fighter), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "completed");

        let response = send(&app, "GET", "/api/referrals/stats", Some(coach), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let stats = body_json(response).await;
        assert_eq!(stats["totalReferrals"], 1);
        assert_eq!(stats["completedReferrals"], 1);

        let response = send(&app, "GET", "/api/referrals/code/qr", Some(coach), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["content-type"], "image/svg+xml");
    }

    #[tokio::test]
    async fn test_session_header_is_required() {
        let app = create_test_router();

        let response = send(&app, "GET", "/api/referrals/dashboard", None, None).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "The x-user-id header is required.");
    }

    #[tokio::test]
    async fn test_validation_details_over_http() {
        let app = create_test_router();

        let response = send(
            &app,
            "POST",
            "/api/referrals",
            Some(Uuid::new_v4()),
            Some(json!({ "code": "AB", "name": "Leo", "role": "fighter" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "One or more fields are invalid.");
        assert_eq!(body["details"]["code"][0], "Referral codes have 4 to 16 characters.");
    }

    #[tokio::test]
    async fn test_health_and_docs() {
        let app = create_test_router();

        let response = send(&app, "GET", "/api/health", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = send(&app, "GET", "/api-docs/openapi.json", None, None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_json(response).await["paths"]["/api/referrals/dashboard"].is_object());
    }
}
