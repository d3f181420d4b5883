use async_trait::async_trait;
use color_eyre::Result;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use super::Store;
use crate::cooking::{
    CartIngredientLine, CollectionAdd, Ingredient, NewRecipe, PageRequest, Recipe, RecipeCollection,
    RecipeFilter, RecipeIngredient, RecipePage, RecipeTag, Tag,
};
use crate::users::{ApiToken, User};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, username: &str) -> Result<User> {
        User::create(&self.pool, username).await
    }

    async fn issue_token(&self, user_id: Uuid) -> Result<ApiToken> {
        ApiToken::create(&self.pool, user_id).await
    }

    async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        User::get_by_id(&self.pool, user_id).await
    }

    async fn user_by_token(&self, token: Uuid) -> Result<Option<User>> {
        User::get_by_token(&self.pool, token).await
    }

    async fn create_tag(&self, name: &str, color: Option<&str>) -> Result<Tag> {
        Tag::create(&self.pool, name, color).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        Tag::list_all(&self.pool).await
    }

    async fn tag_by_id(&self, tag_id: Uuid) -> Result<Option<Tag>> {
        Tag::get_by_id(&self.pool, tag_id).await
    }

    async fn missing_tags(&self, tag_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        Tag::missing_ids(&self.pool, tag_ids).await
    }

    async fn create_ingredient(&self, name: &str, measurement_unit: &str) -> Result<Ingredient> {
        Ingredient::create(&self.pool, name, measurement_unit).await
    }

    async fn ingredient_by_id(&self, ingredient_id: Uuid) -> Result<Option<Ingredient>> {
        Ingredient::get_by_id(&self.pool, ingredient_id).await
    }

    async fn ingredient_by_name_and_unit(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<Option<Ingredient>> {
        Ingredient::get_by_name_and_unit(&self.pool, name, measurement_unit).await
    }

    async fn search_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>> {
        Ingredient::search(&self.pool, name_prefix).await
    }

    async fn missing_ingredients(&self, ingredient_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        Ingredient::missing_ids(&self.pool, ingredient_ids).await
    }

    #[instrument(skip(self, recipe), err)]
    async fn create_recipe(&self, author_user_id: Uuid, recipe: &NewRecipe) -> Result<Recipe> {
        Recipe::create(&self.pool, author_user_id, recipe).await
    }

    #[instrument(skip(self, recipe), err)]
    async fn update_recipe(&self, recipe_id: Uuid, recipe: &NewRecipe) -> Result<Option<Recipe>> {
        Recipe::update(&self.pool, recipe_id, recipe).await
    }

    #[instrument(skip(self), err)]
    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<bool> {
        Recipe::delete(&self.pool, recipe_id).await
    }

    async fn recipe_by_id(&self, recipe_id: Uuid) -> Result<Option<Recipe>> {
        Recipe::get_by_id(&self.pool, recipe_id).await
    }

    #[instrument(skip(self), err)]
    async fn list_recipes(&self, filter: &RecipeFilter, page: PageRequest) -> Result<RecipePage> {
        Recipe::list(&self.pool, filter, page).await
    }

    async fn recipe_ingredients(&self, recipe_id: Uuid) -> Result<Vec<RecipeIngredient>> {
        RecipeIngredient::get_by_recipe(&self.pool, recipe_id).await
    }

    async fn recipe_tags(&self, recipe_id: Uuid) -> Result<Vec<Tag>> {
        RecipeTag::get_by_recipe(&self.pool, recipe_id).await
    }

    #[instrument(skip(self), err)]
    async fn add_to_collection(
        &self,
        collection: RecipeCollection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<CollectionAdd> {
        collection.add(&self.pool, user_id, recipe_id).await
    }

    #[instrument(skip(self), err)]
    async fn remove_from_collection(
        &self,
        collection: RecipeCollection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool> {
        collection.remove(&self.pool, user_id, recipe_id).await
    }

    async fn in_collection(
        &self,
        collection: RecipeCollection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool> {
        collection.contains(&self.pool, user_id, recipe_id).await
    }

    async fn collection_size(&self, collection: RecipeCollection, user_id: Uuid) -> Result<i64> {
        collection.count_for_user(&self.pool, user_id).await
    }

    async fn favorite_count(&self, recipe_id: Uuid) -> Result<i64> {
        RecipeCollection::Favorites
            .count_for_recipe(&self.pool, recipe_id)
            .await
    }

    #[instrument(skip(self), err)]
    async fn cart_ingredient_lines(&self, user_id: Uuid) -> Result<Vec<CartIngredientLine>> {
        CartIngredientLine::for_user(&self.pool, user_id).await
    }
}
