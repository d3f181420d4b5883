use axum::{
    body::Body,
    extract::State,
    http::header,
    response::IntoResponse,
};
use tokio_util::io::ReaderStream;

use crate::{
    http_server::{current_user::MaybeUser, errors::ApiError, ResponseResult},
    shopping_list::{self, ShoppingListError, ATTACHMENT_FILENAME},
    AppState,
};

impl From<ShoppingListError> for ApiError {
    fn from(err: ShoppingListError) -> Self {
        match err {
            ShoppingListError::AuthorizationRequired => {
                ApiError::AuthorizationRequired(shopping_list::AUTHORIZATION_REQUIRED)
            }
            ShoppingListError::EmptyCart => ApiError::EmptyResource(shopping_list::EMPTY_CART),
            ShoppingListError::File(err) => ApiError::Internal(
                color_eyre::Report::new(err).wrap_err("Failed to write shopping list"),
            ),
            ShoppingListError::Store(report) => ApiError::Internal(report),
        }
    }
}

/// Streams the caller's aggregated cart as a text attachment.
pub async fn download_shopping_cart(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
) -> ResponseResult {
    let file = shopping_list::build_for(
        state.store.as_ref(),
        user.as_ref(),
        state.app.shopping_list_dir.clone(),
    )
    .await?;

    let stream = ReaderStream::new(tokio::fs::File::from_std(file));
    let headers = [
        (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{ATTACHMENT_FILENAME}\""),
        ),
    ];

    Ok((headers, Body::from_stream(stream)).into_response())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::{header, StatusCode};
    use db::{cooking::RecipeCollection, MemoryStore, Store};
    use tower::ServiceExt;

    use crate::http_server::test_helpers::{
        app_with_state, empty_request, response_body_text, seed_recipe, signed_in, test_app,
        test_state,
    };

    const DOWNLOAD: &str = "/recipes/download_shopping_cart/";

    #[tokio::test]
    async fn anonymous_download_is_unauthorized() {
        let store = Arc::new(MemoryStore::new());

        let response = test_app(store)
            .oneshot(empty_request("GET", DOWNLOAD, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response_body_text(response).await,
            "You have to authorize in order to download shopping cart."
        );
    }

    #[tokio::test]
    async fn empty_cart_is_a_bad_request() {
        let store = Arc::new(MemoryStore::new());
        let (_, token) = signed_in(&store, "cook").await;

        let response = test_app(store)
            .oneshot(empty_request("GET", DOWNLOAD, Some(token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_body_text(response).await,
            "You do not have a shopping cart on your account."
        );
    }

    #[tokio::test]
    async fn shared_ingredients_are_summed_in_the_attachment() {
        let store = Arc::new(MemoryStore::new());
        let (cook, token) = signed_in(&store, "cook").await;
        let salt = store.create_ingredient("salt", "g").await.unwrap();
        let water = store.create_ingredient("water", "ml").await.unwrap();

        let soup = seed_recipe(
            &store,
            &cook,
            "Soup",
            &[(salt.ingredient_id, 5), (water.ingredient_id, 500)],
            &[],
        )
        .await;
        let bread = seed_recipe(&store, &cook, "Bread", &[(salt.ingredient_id, 10)], &[]).await;
        for recipe in [&soup, &bread] {
            store
                .add_to_collection(RecipeCollection::ShoppingCart, cook.user_id, recipe.recipe_id)
                .await
                .unwrap();
        }

        let response = test_app(store)
            .oneshot(empty_request("GET", DOWNLOAD, Some(token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"shopping_list.txt\""
        );
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/plain; charset=utf-8"
        );
        assert_eq!(
            response_body_text(response).await,
            "salt (g) — 15\nwater (ml) — 500\n"
        );
    }

    #[tokio::test]
    async fn unknown_token_is_rejected_before_the_cart_is_read() {
        let store = Arc::new(MemoryStore::new());

        let response = test_app(store)
            .oneshot(empty_request("GET", DOWNLOAD, Some(uuid::Uuid::new_v4())))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response_body_text(response).await, "Invalid token.");
    }

    #[tokio::test]
    async fn unwritable_list_directory_is_an_internal_error() {
        let store = Arc::new(MemoryStore::new());
        let (cook, token) = signed_in(&store, "cook").await;
        let salt = store.create_ingredient("salt", "g").await.unwrap();
        let soup = seed_recipe(&store, &cook, "Soup", &[(salt.ingredient_id, 5)], &[]).await;
        store
            .add_to_collection(RecipeCollection::ShoppingCart, cook.user_id, soup.recipe_id)
            .await
            .unwrap();

        let scratch = tempfile::tempdir().unwrap();
        let mut state = test_state(store);
        state.app.shopping_list_dir = Some(scratch.path().join("missing"));

        let response = app_with_state(state)
            .oneshot(empty_request("GET", DOWNLOAD, Some(token)))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response_body_text(response).await,
            "We have some troubles, please, try later."
        );
    }
}
