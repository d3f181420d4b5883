use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::ingredients::{IngredientAmount, RecipeIngredient};
use super::tags::RecipeTag;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct Recipe {
    pub recipe_id: Uuid,
    pub author_user_id: Uuid,
    pub name: String,
    pub text: String,
    pub cooking_time: i32, // minutes
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A validated recipe body, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub ingredients: Vec<IngredientAmount>,
    pub tag_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    /// Matches recipes carrying any of these tags. Empty means no tag filter.
    pub tag_ids: Vec<Uuid>,
    pub author_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: i64,
    pub limit: i64,
}

#[derive(Debug, Clone)]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub total: i64,
}

fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &RecipeFilter) {
    builder.push(" WHERE TRUE");

    if let Some(author_user_id) = filter.author_user_id {
        builder.push(" AND r.author_user_id = ");
        builder.push_bind(author_user_id);
    }

    if !filter.tag_ids.is_empty() {
        builder.push(
            " AND EXISTS (SELECT 1 FROM recipe_tags rt WHERE rt.recipe_id = r.recipe_id AND rt.tag_id = ANY(",
        );
        builder.push_bind(filter.tag_ids.clone());
        builder.push("))");
    }
}

impl Recipe {
    pub async fn create(pool: &PgPool, author_user_id: Uuid, new: &NewRecipe) -> Result<Self> {
        let mut transaction = pool.begin().await?;

        let recipe = sqlx::query_as::<_, Recipe>(
            "
            INSERT INTO recipes (author_user_id, name, text, cooking_time)
            VALUES ($1, $2, $3, $4)
            RETURNING
                recipe_id,
                author_user_id,
                name,
                text,
                cooking_time,
                created_at,
                updated_at
            ",
        )
        .bind(author_user_id)
        .bind(&new.name)
        .bind(&new.text)
        .bind(new.cooking_time)
        .fetch_one(&mut *transaction)
        .await?;

        RecipeIngredient::set_for_recipe(&mut transaction, recipe.recipe_id, &new.ingredients)
            .await?;
        RecipeTag::set_tags_for_recipe(&mut transaction, recipe.recipe_id, &new.tag_ids).await?;

        transaction.commit().await?;

        Ok(recipe)
    }

    pub async fn get_by_id(pool: &PgPool, recipe_id: Uuid) -> Result<Option<Self>> {
        let recipe = sqlx::query_as::<_, Recipe>(
            "
            SELECT
                recipe_id,
                author_user_id,
                name,
                text,
                cooking_time,
                created_at,
                updated_at
            FROM recipes
            WHERE recipe_id = $1
            ",
        )
        .bind(recipe_id)
        .fetch_optional(pool)
        .await?;

        Ok(recipe)
    }

    /// Newest first.
    pub async fn list(pool: &PgPool, filter: &RecipeFilter, page: PageRequest) -> Result<RecipePage> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM recipes r");
        push_filter(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

        let mut list_query = QueryBuilder::<Postgres>::new(
            "SELECT r.recipe_id, r.author_user_id, r.name, r.text, r.cooking_time, r.created_at, r.updated_at FROM recipes r",
        );
        push_filter(&mut list_query, filter);
        list_query.push(" ORDER BY r.created_at DESC, r.recipe_id LIMIT ");
        list_query.push_bind(page.limit);
        list_query.push(" OFFSET ");
        list_query.push_bind(page.offset);

        let recipes = list_query.build_query_as::<Recipe>().fetch_all(pool).await?;

        Ok(RecipePage { recipes, total })
    }

    pub async fn update(pool: &PgPool, recipe_id: Uuid, new: &NewRecipe) -> Result<Option<Self>> {
        let mut transaction = pool.begin().await?;

        let updated = sqlx::query_as::<_, Recipe>(
            "
            UPDATE recipes
            SET name = $2,
                text = $3,
                cooking_time = $4,
                updated_at = NOW()
            WHERE recipe_id = $1
            RETURNING
                recipe_id,
                author_user_id,
                name,
                text,
                cooking_time,
                created_at,
                updated_at
            ",
        )
        .bind(recipe_id)
        .bind(&new.name)
        .bind(&new.text)
        .bind(new.cooking_time)
        .fetch_optional(&mut *transaction)
        .await?;

        let Some(updated) = updated else {
            return Ok(None);
        };

        RecipeIngredient::set_for_recipe(&mut transaction, recipe_id, &new.ingredients).await?;
        RecipeTag::set_tags_for_recipe(&mut transaction, recipe_id, &new.tag_ids).await?;

        transaction.commit().await?;

        Ok(Some(updated))
    }

    pub async fn delete(pool: &PgPool, recipe_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM recipes WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
