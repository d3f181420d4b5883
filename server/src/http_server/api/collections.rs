//! Favorites and the shopping cart share one shape: a (user, recipe) pair
//! that can be added once and removed once.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use color_eyre::eyre::WrapErr;
use db::{
    cooking::{CollectionAdd, RecipeCollection},
    users::User,
};
use uuid::Uuid;

use super::responses::RecipeSummary;
use crate::{
    http_server::{current_user::CurrentUser, errors::ApiError, ResponseResult},
    AppState,
};

fn already_listed(collection: RecipeCollection) -> &'static str {
    match collection {
        RecipeCollection::Favorites => "Recipe is already in favorites.",
        RecipeCollection::ShoppingCart => "Recipe is already in the shopping cart.",
    }
}

fn not_listed(collection: RecipeCollection) -> &'static str {
    match collection {
        RecipeCollection::Favorites => "Recipe is not in favorites.",
        RecipeCollection::ShoppingCart => "Recipe is not in the shopping cart.",
    }
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn add(
    state: &AppState,
    user: &User,
    recipe_id: Uuid,
    collection: RecipeCollection,
) -> ResponseResult<(StatusCode, Json<RecipeSummary>)> {
    let outcome = state
        .store
        .add_to_collection(collection, user.user_id, recipe_id)
        .await
        .wrap_err("Failed to add recipe to collection")?;

    match outcome {
        CollectionAdd::Added => {}
        CollectionAdd::AlreadyPresent => {
            return Err(ApiError::Conflict(already_listed(collection)));
        }
        CollectionAdd::RecipeMissing => return Err(ApiError::NotFound("Recipe")),
    }

    // A delete can land between the insert and this read; the pair is gone with it.
    let recipe = state
        .store
        .recipe_by_id(recipe_id)
        .await?
        .ok_or(ApiError::NotFound("Recipe"))?;

    Ok((StatusCode::CREATED, Json(recipe.into())))
}

#[tracing::instrument(skip(state, user), fields(user_id = %user.user_id))]
async fn remove(
    state: &AppState,
    user: &User,
    recipe_id: Uuid,
    collection: RecipeCollection,
) -> ResponseResult<StatusCode> {
    if state.store.recipe_by_id(recipe_id).await?.is_none() {
        return Err(ApiError::NotFound("Recipe"));
    }

    let removed = state
        .store
        .remove_from_collection(collection, user.user_id, recipe_id)
        .await
        .wrap_err("Failed to remove recipe from collection")?;
    if !removed {
        return Err(ApiError::EmptyResource(not_listed(collection)));
    }

    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<(StatusCode, Json<RecipeSummary>)> {
    add(&state, &user, recipe_id, RecipeCollection::Favorites).await
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<StatusCode> {
    remove(&state, &user, recipe_id, RecipeCollection::Favorites).await
}

pub async fn add_to_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<(StatusCode, Json<RecipeSummary>)> {
    add(&state, &user, recipe_id, RecipeCollection::ShoppingCart).await
}

pub async fn remove_from_cart(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<StatusCode> {
    remove(&state, &user, recipe_id, RecipeCollection::ShoppingCart).await
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use db::{cooking::RecipeCollection, MemoryStore, Store};
    use tower::ServiceExt;

    use super::RecipeSummary;
    use crate::http_server::test_helpers::{
        empty_request, response_body_json, response_body_text, seed_recipe, signed_in, test_app,
    };

    #[tokio::test]
    async fn favoriting_twice_is_a_conflict() {
        let store = Arc::new(MemoryStore::new());
        let (cook, token) = signed_in(&store, "cook").await;
        let eggs = store.create_ingredient("eggs", "pcs").await.unwrap();
        let recipe = seed_recipe(&store, &cook, "Eggs", &[(eggs.ingredient_id, 2)], &[]).await;
        let uri = format!("/recipes/{}/favorite/", recipe.recipe_id);

        let response = test_app(store.clone())
            .oneshot(empty_request("POST", &uri, Some(token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        let summary: RecipeSummary = response_body_json(response).await;
        assert_eq!(summary.id, recipe.recipe_id);
        assert_eq!(summary.cooking_time, 15);

        let response = test_app(store.clone())
            .oneshot(empty_request("POST", &uri, Some(token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_body_text(response).await,
            "Recipe is already in favorites."
        );

        assert_eq!(store.favorite_count(recipe.recipe_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn removing_a_missing_entry_is_described() {
        let store = Arc::new(MemoryStore::new());
        let (cook, token) = signed_in(&store, "cook").await;
        let eggs = store.create_ingredient("eggs", "pcs").await.unwrap();
        let recipe = seed_recipe(&store, &cook, "Eggs", &[(eggs.ingredient_id, 2)], &[]).await;

        let response = test_app(store.clone())
            .oneshot(empty_request(
                "DELETE",
                &format!("/recipes/{}/shopping_cart/", recipe.recipe_id),
                Some(token),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response_body_text(response).await,
            "Recipe is not in the shopping cart."
        );

        let response = test_app(store)
            .oneshot(empty_request(
                "DELETE",
                &format!("/recipes/{}/favorite/", recipe.recipe_id),
                Some(token),
            ))
            .await
            .unwrap();
        assert_eq!(
            response_body_text(response).await,
            "Recipe is not in favorites."
        );
    }

    #[tokio::test]
    async fn cart_entries_can_be_removed() {
        let store = Arc::new(MemoryStore::new());
        let (cook, token) = signed_in(&store, "cook").await;
        let eggs = store.create_ingredient("eggs", "pcs").await.unwrap();
        let recipe = seed_recipe(&store, &cook, "Eggs", &[(eggs.ingredient_id, 2)], &[]).await;
        let uri = format!("/recipes/{}/shopping_cart/", recipe.recipe_id);

        let response = test_app(store.clone())
            .oneshot(empty_request("POST", &uri, Some(token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = test_app(store.clone())
            .oneshot(empty_request("DELETE", &uri, Some(token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        assert!(!store
            .in_collection(RecipeCollection::ShoppingCart, cook.user_id, recipe.recipe_id)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn deleted_recipe_cannot_be_added() {
        let store = Arc::new(MemoryStore::new());
        let (cook, token) = signed_in(&store, "cook").await;
        let eggs = store.create_ingredient("eggs", "pcs").await.unwrap();
        let recipe = seed_recipe(&store, &cook, "Eggs", &[(eggs.ingredient_id, 2)], &[]).await;
        store.delete_recipe(recipe.recipe_id).await.unwrap();

        let response = test_app(store.clone())
            .oneshot(empty_request(
                "POST",
                &format!("/recipes/{}/shopping_cart/", recipe.recipe_id),
                Some(token),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response_body_text(response).await, "Recipe not found");
        assert_eq!(
            store
                .collection_size(RecipeCollection::ShoppingCart, cook.user_id)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn unknown_recipes_and_anonymous_callers_are_rejected() {
        let store = Arc::new(MemoryStore::new());
        let (_, token) = signed_in(&store, "cook").await;
        let uri = format!("/recipes/{}/favorite/", uuid::Uuid::new_v4());

        let response = test_app(store.clone())
            .oneshot(empty_request("POST", &uri, Some(token)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = test_app(store)
            .oneshot(empty_request("POST", &uri, None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
