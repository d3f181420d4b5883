use chrono::{DateTime, Utc};
use color_eyre::eyre::{eyre, WrapErr};
use db::{
    cooking::{Ingredient, Recipe, RecipeCollection, RecipeIngredient, Tag},
    users::User,
    Store,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorResponse {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
}

impl From<Tag> for TagResponse {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.tag_id,
            name: tag.name,
            color: tag.color,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(ingredient: Ingredient) -> Self {
        Self {
            id: ingredient.ingredient_id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeIngredientResponse {
    pub id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl From<RecipeIngredient> for RecipeIngredientResponse {
    fn from(line: RecipeIngredient) -> Self {
        Self {
            id: line.ingredient_id,
            name: line.name,
            measurement_unit: line.measurement_unit,
            amount: line.amount,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeResponse {
    pub id: Uuid,
    pub author: AuthorResponse,
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub tags: Vec<TagResponse>,
    pub ingredients: Vec<RecipeIngredientResponse>,
    pub total_favorites: i64,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub created_at: DateTime<Utc>,
}

/// Returned when a recipe is added to favorites or the cart.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeSummary {
    pub id: Uuid,
    pub name: String,
    pub cooking_time: i32,
}

impl From<Recipe> for RecipeSummary {
    fn from(recipe: Recipe) -> Self {
        Self {
            id: recipe.recipe_id,
            name: recipe.name,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Full representation of `recipe` as seen by `viewer`. Anonymous viewers
/// never have a recipe favorited or in their cart.
pub(crate) async fn recipe_response(
    store: &dyn Store,
    recipe: Recipe,
    viewer: Option<&User>,
) -> color_eyre::Result<RecipeResponse> {
    let author = store
        .user_by_id(recipe.author_user_id)
        .await?
        .ok_or_else(|| eyre!("Recipe {} has no author", recipe.recipe_id))?;

    let tags = store
        .recipe_tags(recipe.recipe_id)
        .await
        .wrap_err("Failed to fetch recipe tags")?;
    let ingredients = store
        .recipe_ingredients(recipe.recipe_id)
        .await
        .wrap_err("Failed to fetch recipe ingredients")?;
    let total_favorites = store.favorite_count(recipe.recipe_id).await?;

    let (is_favorited, is_in_shopping_cart) = match viewer {
        Some(viewer) => (
            store
                .in_collection(RecipeCollection::Favorites, viewer.user_id, recipe.recipe_id)
                .await?,
            store
                .in_collection(RecipeCollection::ShoppingCart, viewer.user_id, recipe.recipe_id)
                .await?,
        ),
        None => (false, false),
    };

    Ok(RecipeResponse {
        id: recipe.recipe_id,
        author: AuthorResponse {
            id: author.user_id,
            username: author.username,
        },
        name: recipe.name,
        text: recipe.text,
        cooking_time: recipe.cooking_time,
        tags: tags.into_iter().map(TagResponse::from).collect(),
        ingredients: ingredients
            .into_iter()
            .map(RecipeIngredientResponse::from)
            .collect(),
        total_favorites,
        is_favorited,
        is_in_shopping_cart,
        created_at: recipe.created_at,
    })
}
