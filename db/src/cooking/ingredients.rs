use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct Ingredient {
    pub ingredient_id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Escapes `LIKE` wildcards so user input only ever matches literally.
pub(crate) fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.to_lowercase().chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl Ingredient {
    pub async fn create(pool: &PgPool, name: &str, measurement_unit: &str) -> Result<Self> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "
            INSERT INTO ingredients (name, measurement_unit)
            VALUES ($1, $2)
            RETURNING
                ingredient_id,
                name,
                measurement_unit,
                created_at,
                updated_at
            ",
        )
        .bind(name)
        .bind(measurement_unit)
        .fetch_one(pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn get_by_id(pool: &PgPool, ingredient_id: Uuid) -> Result<Option<Self>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "
            SELECT
                ingredient_id,
                name,
                measurement_unit,
                created_at,
                updated_at
            FROM ingredients
            WHERE ingredient_id = $1
            ",
        )
        .bind(ingredient_id)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    pub async fn get_by_name_and_unit(
        pool: &PgPool,
        name: &str,
        measurement_unit: &str,
    ) -> Result<Option<Self>> {
        let ingredient = sqlx::query_as::<_, Ingredient>(
            "
            SELECT
                ingredient_id,
                name,
                measurement_unit,
                created_at,
                updated_at
            FROM ingredients
            WHERE name = $1 AND measurement_unit = $2
            ",
        )
        .bind(name)
        .bind(measurement_unit)
        .fetch_optional(pool)
        .await?;

        Ok(ingredient)
    }

    /// Case-insensitive name prefix search. `None` lists everything.
    pub async fn search(pool: &PgPool, name_prefix: Option<&str>) -> Result<Vec<Self>> {
        let pattern = like_prefix(name_prefix.unwrap_or_default());

        let ingredients = sqlx::query_as::<_, Ingredient>(
            r"
            SELECT
                ingredient_id,
                name,
                measurement_unit,
                created_at,
                updated_at
            FROM ingredients
            WHERE LOWER(name) LIKE $1 ESCAPE '\'
            ORDER BY name, measurement_unit
            ",
        )
        .bind(pattern)
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// Returns the subset of `ingredient_ids` that has no row in `ingredients`.
    pub async fn missing_ids(pool: &PgPool, ingredient_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let missing = sqlx::query_scalar::<_, Uuid>(
            "
            SELECT wanted.id
            FROM UNNEST($1::UUID[]) AS wanted(id)
            LEFT JOIN ingredients i ON i.ingredient_id = wanted.id
            WHERE i.ingredient_id IS NULL
            ",
        )
        .bind(ingredient_ids)
        .fetch_all(pool)
        .await?;

        Ok(missing)
    }
}

/// One ingredient line of a recipe as submitted by a client.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngredientAmount {
    pub ingredient_id: Uuid,
    pub amount: i32,
}

/// One ingredient line of a recipe joined with the ingredient it points at.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct RecipeIngredient {
    pub ingredient_id: Uuid,
    pub name: String,
    pub measurement_unit: String,
    pub amount: i32,
}

impl RecipeIngredient {
    pub async fn get_by_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Self>> {
        let ingredients = sqlx::query_as::<_, RecipeIngredient>(
            "
            SELECT
                i.ingredient_id,
                i.name,
                i.measurement_unit,
                ri.amount
            FROM recipe_ingredients ri
            JOIN ingredients i ON i.ingredient_id = ri.ingredient_id
            WHERE ri.recipe_id = $1
            ORDER BY ri.display_order
            ",
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(ingredients)
    }

    /// Replaces the recipe's ingredient lines, keeping the submitted order.
    pub async fn set_for_recipe(
        conn: &mut PgConnection,
        recipe_id: Uuid,
        lines: &[IngredientAmount],
    ) -> Result<()> {
        sqlx::query("DELETE FROM recipe_ingredients WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *conn)
            .await?;

        for (display_order, line) in (0_i32..).zip(lines) {
            sqlx::query(
                "
                INSERT INTO recipe_ingredients (recipe_id, ingredient_id, amount, display_order)
                VALUES ($1, $2, $3, $4)
                ",
            )
            .bind(recipe_id)
            .bind(line.ingredient_id)
            .bind(line.amount)
            .bind(display_order)
            .execute(&mut *conn)
            .await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::like_prefix;

    #[test]
    fn like_prefix_lowercases_and_appends_wildcard() {
        assert_eq!(like_prefix("Sal"), "sal%");
        assert_eq!(like_prefix(""), "%");
    }

    #[test]
    fn like_prefix_escapes_wildcards() {
        assert_eq!(like_prefix("50%_a"), r"50\%\_a%");
        assert_eq!(like_prefix(r"a\b"), r"a\\b%");
    }
}
