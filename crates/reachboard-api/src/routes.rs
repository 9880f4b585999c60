use crate::{handlers, AppState};
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Dashboard page and its JSON description
        .route("/", get(handlers::dashboard_page))
        .route("/api/dashboard", get(handlers::dashboard_json))
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum_test::TestServer;

    #[tokio::test]
    async fn unknown_route_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(create_router(AppState::new_for_testing(dir.path()))).unwrap();

        let resp = server.get("/missing").expect_failure().await;
        assert_eq!(resp.status_code(), 404);
    }

    #[tokio::test]
    async fn empty_data_dir_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let server = TestServer::new(create_router(AppState::new_for_testing(dir.path()))).unwrap();

        let resp = server.get("/api/dashboard").expect_failure().await;
        assert_eq!(resp.status_code(), 500);
        let body: serde_json::Value = resp.json();
        assert_eq!(body["status"], 500);
    }
}
