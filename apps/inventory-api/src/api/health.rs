//! Readiness endpoint

use axum::{Router, extract::State, response::IntoResponse, routing::get};
use axum_helpers::{HealthCheckFuture, run_health_checks};
use database::postgres::check_health;

use crate::state::{AppState, Backend};

async fn ready(State(state): State<AppState>) -> impl IntoResponse {
    let mut checks: Vec<(&str, HealthCheckFuture<'_>)> = Vec::new();

    if let Backend::Postgres(db) = &state.backend {
        checks.push((
            "database",
            Box::pin(async move { check_health(db).await.map_err(|e| e.to_string()) }),
        ));
    }

    run_health_checks(checks).await
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/ready", get(ready)).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, Environment, StorageBackend};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use core_config::{app_info, server::ServerConfig};
    use domain_products::InMemoryProductStore;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    fn memory_state() -> AppState {
        AppState {
            config: Config {
                app: app_info!(),
                environment: Environment::Development,
                server: ServerConfig::default(),
                storage: StorageBackend::Memory,
                postgres: None,
                run_migrations: false,
            },
            backend: Backend::Memory(InMemoryProductStore::new()),
        }
    }

    #[tokio::test]
    async fn test_memory_backend_is_always_ready() {
        let response = router(memory_state())
            .oneshot(Request::builder().uri("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "ready");
        assert!(json.get("database").is_none());
    }

    #[tokio::test]
    async fn test_products_are_mounted_under_api() {
        let state = memory_state();
        let app = Router::new().nest("/api", crate::api::routes(&state));

        let response = app
            .oneshot(Request::builder().uri("/api/products").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
