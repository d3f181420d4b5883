use color_eyre::Result;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// The per-user recipe collections. Each is a set of (user, recipe) pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecipeCollection {
    Favorites,
    ShoppingCart,
}

/// Outcome of adding a recipe to a [`RecipeCollection`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionAdd {
    Added,
    AlreadyPresent,
    RecipeMissing,
}

impl RecipeCollection {
    fn table(self) -> &'static str {
        match self {
            RecipeCollection::Favorites => "user_favorites",
            RecipeCollection::ShoppingCart => "user_carts",
        }
    }

    /// The existence check and the insert are one statement. A recipe deleted
    /// concurrently still surfaces as a foreign key violation, which maps to
    /// [`CollectionAdd::RecipeMissing`] as well.
    pub async fn add(self, pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<CollectionAdd> {
        let sql = format!(
            "WITH target AS (SELECT recipe_id FROM recipes WHERE recipe_id = $2),
             inserted AS (
                INSERT INTO {} (user_id, recipe_id)
                SELECT $1, recipe_id FROM target
                ON CONFLICT DO NOTHING
                RETURNING recipe_id
             )
             SELECT EXISTS (SELECT 1 FROM target), EXISTS (SELECT 1 FROM inserted)",
            self.table()
        );
        let outcome = sqlx::query_as::<_, (bool, bool)>(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .fetch_one(pool)
            .await;

        match outcome {
            Ok((false, _)) => Ok(CollectionAdd::RecipeMissing),
            Ok((true, true)) => Ok(CollectionAdd::Added),
            Ok((true, false)) => Ok(CollectionAdd::AlreadyPresent),
            Err(sqlx::Error::Database(err)) if err.is_foreign_key_violation() => {
                Ok(CollectionAdd::RecipeMissing)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Returns `false` when there was nothing to remove.
    pub async fn remove(self, pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool> {
        let sql = format!(
            "DELETE FROM {} WHERE user_id = $1 AND recipe_id = $2",
            self.table()
        );
        let result = sqlx::query(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn contains(self, pool: &PgPool, user_id: Uuid, recipe_id: Uuid) -> Result<bool> {
        let sql = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE user_id = $1 AND recipe_id = $2)",
            self.table()
        );
        let exists: bool = sqlx::query_scalar(&sql)
            .bind(user_id)
            .bind(recipe_id)
            .fetch_one(pool)
            .await?;

        Ok(exists)
    }

    pub async fn count_for_user(self, pool: &PgPool, user_id: Uuid) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE user_id = $1", self.table());
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    pub async fn count_for_recipe(self, pool: &PgPool, recipe_id: Uuid) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {} WHERE recipe_id = $1", self.table());
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(recipe_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}

/// One ingredient line of one recipe sitting in a user's cart. Not aggregated.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, PartialEq, Eq)]
pub struct CartIngredientLine {
    pub name: String,
    pub measurement_unit: String,
    pub amount: i64,
}

impl CartIngredientLine {
    pub async fn for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>> {
        let lines = sqlx::query_as::<_, CartIngredientLine>(
            "
            SELECT
                i.name,
                i.measurement_unit,
                ri.amount::BIGINT AS amount
            FROM user_carts uc
            JOIN recipe_ingredients ri ON ri.recipe_id = uc.recipe_id
            JOIN ingredients i ON i.ingredient_id = ri.ingredient_id
            WHERE uc.user_id = $1
            ORDER BY i.name, i.measurement_unit
            ",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(lines)
    }
}
