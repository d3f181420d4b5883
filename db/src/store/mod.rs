use async_trait::async_trait;
use color_eyre::Result;
use uuid::Uuid;

use crate::cooking::{
    CartIngredientLine, CollectionAdd, Ingredient, NewRecipe, PageRequest, Recipe, RecipeCollection,
    RecipeFilter, RecipeIngredient, RecipePage, Tag,
};
use crate::users::{ApiToken, User};

pub mod memory;
pub mod postgres;

/// Everything the HTTP layer and the CLI need from persistence.
///
/// `PgStore` is the production implementation; `MemoryStore` keeps the same
/// semantics in process so handlers can be exercised without a database.
#[async_trait]
pub trait Store: std::fmt::Debug + Send + Sync {
    async fn create_user(&self, username: &str) -> Result<User>;
    async fn issue_token(&self, user_id: Uuid) -> Result<ApiToken>;
    async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>>;
    async fn user_by_token(&self, token: Uuid) -> Result<Option<User>>;

    async fn create_tag(&self, name: &str, color: Option<&str>) -> Result<Tag>;
    async fn list_tags(&self) -> Result<Vec<Tag>>;
    async fn tag_by_id(&self, tag_id: Uuid) -> Result<Option<Tag>>;
    async fn missing_tags(&self, tag_ids: &[Uuid]) -> Result<Vec<Uuid>>;

    async fn create_ingredient(&self, name: &str, measurement_unit: &str) -> Result<Ingredient>;
    async fn ingredient_by_id(&self, ingredient_id: Uuid) -> Result<Option<Ingredient>>;
    async fn ingredient_by_name_and_unit(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<Option<Ingredient>>;
    async fn search_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>>;
    async fn missing_ingredients(&self, ingredient_ids: &[Uuid]) -> Result<Vec<Uuid>>;

    async fn create_recipe(&self, author_user_id: Uuid, recipe: &NewRecipe) -> Result<Recipe>;
    async fn update_recipe(&self, recipe_id: Uuid, recipe: &NewRecipe) -> Result<Option<Recipe>>;
    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<bool>;
    async fn recipe_by_id(&self, recipe_id: Uuid) -> Result<Option<Recipe>>;
    async fn list_recipes(&self, filter: &RecipeFilter, page: PageRequest) -> Result<RecipePage>;
    async fn recipe_ingredients(&self, recipe_id: Uuid) -> Result<Vec<RecipeIngredient>>;
    async fn recipe_tags(&self, recipe_id: Uuid) -> Result<Vec<Tag>>;

    async fn add_to_collection(
        &self,
        collection: RecipeCollection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<CollectionAdd>;
    async fn remove_from_collection(
        &self,
        collection: RecipeCollection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool>;
    async fn in_collection(
        &self,
        collection: RecipeCollection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool>;
    async fn collection_size(&self, collection: RecipeCollection, user_id: Uuid) -> Result<i64>;
    async fn favorite_count(&self, recipe_id: Uuid) -> Result<i64>;
    async fn cart_ingredient_lines(&self, user_id: Uuid) -> Result<Vec<CartIngredientLine>>;
}
