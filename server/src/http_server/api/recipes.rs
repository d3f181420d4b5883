use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use axum_extra::extract::Query;
use color_eyre::eyre::WrapErr;
use db::{
    cooking::{Recipe, RecipeFilter, RecipePage},
    users::User,
    Store,
};
use serde::Deserialize;
use uuid::Uuid;

use super::responses::{recipe_response, RecipeResponse};
use crate::{
    http_server::{
        current_user::{CurrentUser, MaybeUser},
        errors::ApiError,
        pagination::{Page, PageNumber},
        validation::{
            check_references, validate_recipe, IngredientAmountPayload, RecipePatch,
            RecipePayload,
        },
        ResponseResult,
    },
    AppState,
};

const RECIPES_PATH: &str = "/recipes/";

#[derive(Debug, Default, Deserialize)]
pub struct RecipeListQuery {
    #[serde(default)]
    tags: Vec<Uuid>,
    author: Option<Uuid>,
    page: Option<u32>,
    limit: Option<u32>,
}

impl RecipeListQuery {
    fn filter(&self) -> RecipeFilter {
        RecipeFilter {
            tag_ids: self.tags.clone(),
            author_user_id: self.author,
        }
    }

    /// Filter pairs repeated in the `next`/`previous` links.
    fn link_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs: Vec<(&'static str, String)> = self
            .tags
            .iter()
            .map(|tag| ("tags", tag.to_string()))
            .collect();
        if let Some(author) = self.author {
            pairs.push(("author", author.to_string()));
        }
        pairs
    }
}

pub async fn list_recipes(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Query(query): Query<RecipeListQuery>,
) -> ResponseResult<Json<Page<RecipeResponse>>> {
    let page = PageNumber::resolve(query.page, query.limit, state.app.page_size)?;

    let RecipePage { recipes, total } = state
        .store
        .list_recipes(&query.filter(), page.request())
        .await
        .wrap_err("Failed to list recipes")?;
    page.check_in_range(total)?;

    let mut results = Vec::with_capacity(recipes.len());
    for recipe in recipes {
        results.push(recipe_response(state.store.as_ref(), recipe, viewer.as_ref()).await?);
    }

    Ok(Json(Page::new(
        &state.app,
        RECIPES_PATH,
        &query.link_pairs(),
        page,
        total,
        results,
    )))
}

pub async fn get_recipe(
    State(state): State<AppState>,
    MaybeUser(viewer): MaybeUser,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<Json<RecipeResponse>> {
    let recipe = find_recipe(state.store.as_ref(), recipe_id).await?;

    Ok(Json(
        recipe_response(state.store.as_ref(), recipe, viewer.as_ref()).await?,
    ))
}

pub async fn create_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(payload): Json<RecipePayload>,
) -> ResponseResult<(StatusCode, Json<RecipeResponse>)> {
    let draft = validate_recipe(payload)?;
    check_references(state.store.as_ref(), &draft).await?;

    let recipe = state
        .store
        .create_recipe(user.user_id, &draft)
        .await
        .wrap_err("Failed to create recipe")?;
    tracing::info!(recipe_id = %recipe.recipe_id, author = %user.user_id, "Created recipe");

    let response = recipe_response(state.store.as_ref(), recipe, Some(&user)).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
    Json(payload): Json<RecipePayload>,
) -> ResponseResult<Json<RecipeResponse>> {
    authored_recipe(state.store.as_ref(), recipe_id, &user).await?;

    save_recipe(&state, recipe_id, payload, &user).await
}

pub async fn patch_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
    Json(patch): Json<RecipePatch>,
) -> ResponseResult<Json<RecipeResponse>> {
    let recipe = authored_recipe(state.store.as_ref(), recipe_id, &user).await?;
    let current = current_payload(state.store.as_ref(), recipe).await?;

    save_recipe(&state, recipe_id, patch.apply_to(current), &user).await
}

pub async fn delete_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(recipe_id): Path<Uuid>,
) -> ResponseResult<StatusCode> {
    authored_recipe(state.store.as_ref(), recipe_id, &user).await?;

    if !state.store.delete_recipe(recipe_id).await? {
        return Err(ApiError::NotFound("Recipe"));
    }
    tracing::info!(%recipe_id, "Deleted recipe");

    Ok(StatusCode::NO_CONTENT)
}

async fn find_recipe(store: &dyn Store, recipe_id: Uuid) -> Result<Recipe, ApiError> {
    store
        .recipe_by_id(recipe_id)
        .await?
        .ok_or(ApiError::NotFound("Recipe"))
}

/// Only the author may change a recipe.
async fn authored_recipe(store: &dyn Store, recipe_id: Uuid, user: &User) -> Result<Recipe, ApiError> {
    let recipe = find_recipe(store, recipe_id).await?;

    if recipe.author_user_id != user.user_id {
        return Err(ApiError::Forbidden);
    }

    Ok(recipe)
}

async fn current_payload(store: &dyn Store, recipe: Recipe) -> Result<RecipePayload, ApiError> {
    let ingredients = store
        .recipe_ingredients(recipe.recipe_id)
        .await?
        .into_iter()
        .map(|line| IngredientAmountPayload {
            id: line.ingredient_id,
            amount: line.amount,
        })
        .collect();
    let tags = store
        .recipe_tags(recipe.recipe_id)
        .await?
        .into_iter()
        .map(|tag| tag.tag_id)
        .collect();

    Ok(RecipePayload {
        name: recipe.name,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
        ingredients,
        tags,
    })
}

async fn save_recipe(
    state: &AppState,
    recipe_id: Uuid,
    payload: RecipePayload,
    user: &User,
) -> ResponseResult<Json<RecipeResponse>> {
    let draft = validate_recipe(payload)?;
    check_references(state.store.as_ref(), &draft).await?;

    let recipe = state
        .store
        .update_recipe(recipe_id, &draft)
        .await
        .wrap_err("Failed to update recipe")?
        .ok_or(ApiError::NotFound("Recipe"))?;

    Ok(Json(
        recipe_response(state.store.as_ref(), recipe, Some(user)).await?,
    ))
}
