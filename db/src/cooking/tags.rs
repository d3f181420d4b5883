use chrono::{DateTime, Utc};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct Tag {
    pub tag_id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tag {
    pub async fn create(pool: &PgPool, name: &str, color: Option<&str>) -> Result<Self> {
        let tag = sqlx::query_as::<_, Tag>(
            "
            INSERT INTO tags (name, color)
            VALUES ($1, $2)
            RETURNING
                tag_id,
                name,
                color,
                created_at,
                updated_at
            ",
        )
        .bind(name)
        .bind(color)
        .fetch_one(pool)
        .await?;

        Ok(tag)
    }

    pub async fn get_by_id(pool: &PgPool, tag_id: Uuid) -> Result<Option<Self>> {
        let tag = sqlx::query_as::<_, Tag>(
            "
            SELECT
                tag_id,
                name,
                color,
                created_at,
                updated_at
            FROM tags
            WHERE tag_id = $1
            ",
        )
        .bind(tag_id)
        .fetch_optional(pool)
        .await?;

        Ok(tag)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        let tags = sqlx::query_as::<_, Tag>(
            "
            SELECT
                tag_id,
                name,
                color,
                created_at,
                updated_at
            FROM tags
            ORDER BY name
            ",
        )
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Returns the subset of `tag_ids` that has no row in `tags`.
    pub async fn missing_ids(pool: &PgPool, tag_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let missing = sqlx::query_scalar::<_, Uuid>(
            "
            SELECT wanted.id
            FROM UNNEST($1::UUID[]) AS wanted(id)
            LEFT JOIN tags t ON t.tag_id = wanted.id
            WHERE t.tag_id IS NULL
            ",
        )
        .bind(tag_ids)
        .fetch_all(pool)
        .await?;

        Ok(missing)
    }
}

pub struct RecipeTag;

impl RecipeTag {
    pub async fn get_by_recipe(pool: &PgPool, recipe_id: Uuid) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>(
            "
            SELECT
                t.tag_id,
                t.name,
                t.color,
                t.created_at,
                t.updated_at
            FROM tags t
            JOIN recipe_tags rt ON t.tag_id = rt.tag_id
            WHERE rt.recipe_id = $1
            ORDER BY t.name
            ",
        )
        .bind(recipe_id)
        .fetch_all(pool)
        .await?;

        Ok(tags)
    }

    /// Replaces the recipe's tag links. Meant to run inside the caller's transaction.
    pub async fn set_tags_for_recipe(
        conn: &mut PgConnection,
        recipe_id: Uuid,
        tag_ids: &[Uuid],
    ) -> Result<()> {
        sqlx::query("DELETE FROM recipe_tags WHERE recipe_id = $1")
            .bind(recipe_id)
            .execute(&mut *conn)
            .await?;

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO recipe_tags (recipe_id, tag_id) VALUES ($1, $2)")
                .bind(recipe_id)
                .bind(tag_id)
                .execute(&mut *conn)
                .await?;
        }

        Ok(())
    }
}
