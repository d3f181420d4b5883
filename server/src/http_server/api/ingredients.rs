use axum::{
    extract::{Path, Query, State},
    Json,
};
use color_eyre::eyre::WrapErr;
use serde::Deserialize;
use uuid::Uuid;

use super::responses::IngredientResponse;
use crate::{
    http_server::{errors::ApiError, ResponseResult},
    AppState,
};

#[derive(Debug, Default, Deserialize)]
pub struct IngredientSearch {
    /// Case-insensitive prefix of the ingredient name.
    name: Option<String>,
}

pub async fn search_ingredients(
    State(state): State<AppState>,
    Query(search): Query<IngredientSearch>,
) -> ResponseResult<Json<Vec<IngredientResponse>>> {
    let prefix = search.name.as_deref().map(str::trim).filter(|p| !p.is_empty());

    let ingredients = state
        .store
        .search_ingredients(prefix)
        .await
        .wrap_err("Failed to search ingredients")?;

    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

pub async fn get_ingredient(
    State(state): State<AppState>,
    Path(ingredient_id): Path<Uuid>,
) -> ResponseResult<Json<IngredientResponse>> {
    let ingredient = state
        .store
        .ingredient_by_id(ingredient_id)
        .await?
        .ok_or(ApiError::NotFound("Ingredient"))?;

    Ok(Json(ingredient.into()))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use db::{MemoryStore, Store};
    use tower::ServiceExt;

    use super::IngredientResponse;
    use crate::http_server::test_helpers::{empty_request, response_body_json, test_app};

    async fn pantry() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for (name, unit) in [("Sugar", "g"), ("salt", "g"), ("Salmon", "g"), ("salt", "pinch")] {
            store.create_ingredient(name, unit).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn prefix_search_ignores_case() {
        let response = test_app(pantry().await)
            .oneshot(empty_request("GET", "/ingredients/?name=SAL", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let found: Vec<IngredientResponse> = response_body_json(response).await;
        let found: Vec<_> = found
            .iter()
            .map(|i| (i.name.as_str(), i.measurement_unit.as_str()))
            .collect();
        assert_eq!(found, [("Salmon", "g"), ("salt", "g"), ("salt", "pinch")]);
    }

    #[tokio::test]
    async fn no_prefix_lists_everything() {
        let response = test_app(pantry().await)
            .oneshot(empty_request("GET", "/ingredients/", None))
            .await
            .unwrap();

        let found: Vec<IngredientResponse> = response_body_json(response).await;
        assert_eq!(found.len(), 4);
    }

    #[tokio::test]
    async fn fetch_single_ingredient() {
        let store = pantry().await;
        let salt = store.ingredient_by_name_and_unit("salt", "g").await.unwrap().unwrap();

        let response = test_app(store)
            .oneshot(empty_request(
                "GET",
                &format!("/ingredients/{}/", salt.ingredient_id),
                None,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let found: IngredientResponse = response_body_json(response).await;
        assert_eq!(found.id, salt.ingredient_id);
    }
}
