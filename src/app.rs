use axum::{middleware, routing::get, Json, Router};
use serde_json::json;

use crate::{
    app_state::AppState,
    auth,
    middleware::tracing::observability_middleware,
    modules::{
        assessments::routes::assessment_routes, dashboard::routes::dashboard_routes,
        employees::routes::employee_routes, notifications::routes::notification_routes,
        sessions::routes::session_routes, training_modules::routes::module_routes,
    },
};

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(dashboard_routes())
        .merge(employee_routes())
        .merge(module_routes())
        .merge(session_routes())
        .merge(assessment_routes())
        .merge(notification_routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ));

    let static_dir = state.env.app.static_dir.to_string();

    Router::new()
        .route("/", get(hello))
        .route("/health", get(health_check))
        .nest("/api", api)
        .nest_service(
            "/static",
            tower_http::services::ServeDir::new(static_dir),
        )
        .layer(middleware::from_fn(observability_middleware))
        .with_state(state)
}

async fn hello() -> &'static str {
    "Training backend says hello!\n"
}

async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> Json<serde_json::Value> {
    let db_result = sqlx::query("SELECT 1").execute(&state.db).await;

    let db_status = match db_result {
        Ok(_) => "healthy",
        Err(e) => {
            tracing::info!("Database health check failed: {}", e);
            "unhealthy"
        }
    };

    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "services": {
            "database": db_status,
            "storage": if state.storage.is_some() { "configured" } else { "disabled" },
            "archive": if state.archive.is_some() { "configured" } else { "disabled" }
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, AuthConfig, Config, DatabaseConfig, Environment, ServerConfig};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use secrecy::SecretString;
    use tower::util::ServiceExt;

    fn test_state() -> AppState {
        let config = Config {
            server: ServerConfig {
                host: "127.0.0.1".parse().expect("valid test address"),
                port: 0,
            },
            database: DatabaseConfig {
                url: "postgres://localhost/unused".to_string(),
                max_connections: Some(1),
                min_connections: Some(1),
            },
            auth: AuthConfig {
                jwt_secret: SecretString::from("test-secret".to_string()),
            },
            storage: None,
            archive: None,
            app: AppConfig {
                name: "Training Backend".to_string(),
                environment: Environment::Development,
                static_dir: "static".to_string(),
                public_base_url: "http://localhost:8000".to_string(),
            },
        };
        // Lazy pool: never connects unless a handler actually queries.
        let db = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy(&config.database.url)
            .expect("lazy pool");
        AppState::new(db, config)
    }

    #[tokio::test]
    async fn hello_route_responds() {
        let app = create_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_routes_require_a_bearer_token() {
        let app = create_router(test_state());
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/employees")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
