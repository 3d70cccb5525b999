//! HTTP API route definitions.

use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use super::handlers::{
    create_pet, delete_pet, get_pet, health, list_pets, prometheus_metrics, update_pet, AppState,
};

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Pet collection
        .route("/pets", get(list_pets).post(create_pet))
        // Pet detail
        .route(
            "/pets/:pet_id",
            get(get_pet).delete(delete_pet).patch(update_pet),
        )
        // Operational endpoints
        .route("/health", get(health))
        .route("/metrics", get(prometheus_metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::store::PetStore;

    async fn test_app() -> Router {
        let state = AppState {
            store: PetStore::open_in_memory().await.unwrap(),
            page_size: 10,
            prometheus: None,
        };
        create_router(state)
    }

    #[tokio::test]
    async fn health_endpoint_returns_ok() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_pet_returns_404() {
        let app = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/pets/999")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_list_returns_one_empty_page() {
        let app = test_app().await;

        let response = app
            .oneshot(Request::builder().uri("/pets").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }
}
