use axum::{
    routing::{get, post},
    Router,
};

use super::{
    api::{collections, ingredients, recipes, shopping_cart, tags},
    versions,
};
use crate::AppState;

pub(crate) fn make_router() -> Router<AppState> {
    Router::new()
        .route("/_", get(versions))
        .route(
            "/recipes/",
            get(recipes::list_recipes).post(recipes::create_recipe),
        )
        .route(
            "/recipes/download_shopping_cart/",
            get(shopping_cart::download_shopping_cart),
        )
        .route(
            "/recipes/{recipe_id}/",
            get(recipes::get_recipe)
                .put(recipes::update_recipe)
                .patch(recipes::patch_recipe)
                .delete(recipes::delete_recipe),
        )
        .route(
            "/recipes/{recipe_id}/favorite/",
            post(collections::add_favorite).delete(collections::remove_favorite),
        )
        .route(
            "/recipes/{recipe_id}/shopping_cart/",
            post(collections::add_to_cart).delete(collections::remove_from_cart),
        )
        .route("/tags/", get(tags::list_tags))
        .route("/tags/{tag_id}/", get(tags::get_tag))
        .route("/ingredients/", get(ingredients::search_ingredients))
        .route("/ingredients/{ingredient_id}/", get(ingredients::get_ingredient))
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::http_server::test_helpers::{response_body_json, test_app};
    use db::MemoryStore;

    #[tokio::test]
    async fn versions_route_reports_the_package_version() {
        let app = test_app(Arc::new(MemoryStore::new()));

        let response = app
            .oneshot(Request::builder().uri("/_").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body: serde_json::Value = response_body_json(response).await;
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[tokio::test]
    async fn unknown_routes_are_not_found() {
        let app = test_app(Arc::new(MemoryStore::new()));

        let response = app
            .oneshot(Request::builder().uri("/nope/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
