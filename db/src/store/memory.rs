use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use color_eyre::{eyre::eyre, Result};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::Store;
use crate::cooking::{
    CartIngredientLine, CollectionAdd, Ingredient, IngredientAmount, NewRecipe, PageRequest, Recipe,
    RecipeCollection, RecipeFilter, RecipeIngredient, RecipePage, Tag,
};
use crate::users::{ApiToken, User};

#[derive(Debug)]
struct StoredRecipe {
    recipe: Recipe,
    ingredients: Vec<IngredientAmount>,
    tag_ids: Vec<Uuid>,
}

#[derive(Debug, Default)]
struct Tables {
    users: Vec<User>,
    tokens: HashMap<Uuid, Uuid>,
    tags: Vec<Tag>,
    ingredients: Vec<Ingredient>,
    // Insertion order; listing walks it backwards to get newest first.
    recipes: Vec<StoredRecipe>,
    favorites: BTreeSet<(Uuid, Uuid)>,
    carts: BTreeSet<(Uuid, Uuid)>,
}

impl Tables {
    fn collection(&self, collection: RecipeCollection) -> &BTreeSet<(Uuid, Uuid)> {
        match collection {
            RecipeCollection::Favorites => &self.favorites,
            RecipeCollection::ShoppingCart => &self.carts,
        }
    }

    fn collection_mut(&mut self, collection: RecipeCollection) -> &mut BTreeSet<(Uuid, Uuid)> {
        match collection {
            RecipeCollection::Favorites => &mut self.favorites,
            RecipeCollection::ShoppingCart => &mut self.carts,
        }
    }

    fn stored_recipe(&self, recipe_id: Uuid) -> Option<&StoredRecipe> {
        self.recipes
            .iter()
            .find(|stored| stored.recipe.recipe_id == recipe_id)
    }

    fn ingredient(&self, ingredient_id: Uuid) -> Option<&Ingredient> {
        self.ingredients
            .iter()
            .find(|i| i.ingredient_id == ingredient_id)
    }

    fn matches(stored: &StoredRecipe, filter: &RecipeFilter) -> bool {
        let author_matches = filter
            .author_user_id
            .map_or(true, |author| stored.recipe.author_user_id == author);
        let tags_match = filter.tag_ids.is_empty()
            || filter.tag_ids.iter().any(|tag| stored.tag_ids.contains(tag));

        author_matches && tags_match
    }
}

/// In-process [`Store`] with the same uniqueness, ordering and filtering rules
/// as the Postgres schema.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, username: &str) -> Result<User> {
        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| u.username == username) {
            return Err(eyre!("username {username} is already taken"));
        }

        let now = Utc::now();
        let user = User {
            user_id: Uuid::new_v4(),
            username: username.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());

        Ok(user)
    }

    async fn issue_token(&self, user_id: Uuid) -> Result<ApiToken> {
        let mut tables = self.tables.lock().await;
        if !tables.users.iter().any(|u| u.user_id == user_id) {
            return Err(eyre!("no user {user_id} to issue a token for"));
        }

        let token = ApiToken {
            token: Uuid::new_v4(),
            user_id,
            created_at: Utc::now(),
        };
        tables.tokens.insert(token.token, user_id);

        Ok(token)
    }

    async fn user_by_id(&self, user_id: Uuid) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.user_id == user_id).cloned())
    }

    async fn user_by_token(&self, token: Uuid) -> Result<Option<User>> {
        let tables = self.tables.lock().await;
        let user = tables
            .tokens
            .get(&token)
            .and_then(|user_id| tables.users.iter().find(|u| u.user_id == *user_id))
            .cloned();

        Ok(user)
    }

    async fn create_tag(&self, name: &str, color: Option<&str>) -> Result<Tag> {
        let mut tables = self.tables.lock().await;
        if tables.tags.iter().any(|t| t.name == name) {
            return Err(eyre!("tag {name} already exists"));
        }

        let now = Utc::now();
        let tag = Tag {
            tag_id: Uuid::new_v4(),
            name: name.to_string(),
            color: color.map(str::to_string),
            created_at: now,
            updated_at: now,
        };
        tables.tags.push(tag.clone());

        Ok(tag)
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let tables = self.tables.lock().await;
        let mut tags = tables.tags.clone();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(tags)
    }

    async fn tag_by_id(&self, tag_id: Uuid) -> Result<Option<Tag>> {
        let tables = self.tables.lock().await;
        Ok(tables.tags.iter().find(|t| t.tag_id == tag_id).cloned())
    }

    async fn missing_tags(&self, tag_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let tables = self.tables.lock().await;
        let missing = tag_ids
            .iter()
            .filter(|id| !tables.tags.iter().any(|t| t.tag_id == **id))
            .copied()
            .collect();

        Ok(missing)
    }

    async fn create_ingredient(&self, name: &str, measurement_unit: &str) -> Result<Ingredient> {
        let mut tables = self.tables.lock().await;
        if tables
            .ingredients
            .iter()
            .any(|i| i.name == name && i.measurement_unit == measurement_unit)
        {
            return Err(eyre!("ingredient {name} ({measurement_unit}) already exists"));
        }

        let now = Utc::now();
        let ingredient = Ingredient {
            ingredient_id: Uuid::new_v4(),
            name: name.to_string(),
            measurement_unit: measurement_unit.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.ingredients.push(ingredient.clone());

        Ok(ingredient)
    }

    async fn ingredient_by_id(&self, ingredient_id: Uuid) -> Result<Option<Ingredient>> {
        let tables = self.tables.lock().await;
        Ok(tables.ingredient(ingredient_id).cloned())
    }

    async fn ingredient_by_name_and_unit(
        &self,
        name: &str,
        measurement_unit: &str,
    ) -> Result<Option<Ingredient>> {
        let tables = self.tables.lock().await;
        let ingredient = tables
            .ingredients
            .iter()
            .find(|i| i.name == name && i.measurement_unit == measurement_unit)
            .cloned();

        Ok(ingredient)
    }

    async fn search_ingredients(&self, name_prefix: Option<&str>) -> Result<Vec<Ingredient>> {
        let prefix = name_prefix.unwrap_or_default().to_lowercase();
        let tables = self.tables.lock().await;
        let mut found: Vec<Ingredient> = tables
            .ingredients
            .iter()
            .filter(|i| i.name.to_lowercase().starts_with(&prefix))
            .cloned()
            .collect();
        found.sort_by(|a, b| {
            a.name
                .cmp(&b.name)
                .then_with(|| a.measurement_unit.cmp(&b.measurement_unit))
        });

        Ok(found)
    }

    async fn missing_ingredients(&self, ingredient_ids: &[Uuid]) -> Result<Vec<Uuid>> {
        let tables = self.tables.lock().await;
        let missing = ingredient_ids
            .iter()
            .filter(|id| tables.ingredient(**id).is_none())
            .copied()
            .collect();

        Ok(missing)
    }

    async fn create_recipe(&self, author_user_id: Uuid, recipe: &NewRecipe) -> Result<Recipe> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let stored = StoredRecipe {
            recipe: Recipe {
                recipe_id: Uuid::new_v4(),
                author_user_id,
                name: recipe.name.clone(),
                text: recipe.text.clone(),
                cooking_time: recipe.cooking_time,
                created_at: now,
                updated_at: now,
            },
            ingredients: recipe.ingredients.clone(),
            tag_ids: recipe.tag_ids.clone(),
        };
        let created = stored.recipe.clone();
        tables.recipes.push(stored);

        Ok(created)
    }

    async fn update_recipe(&self, recipe_id: Uuid, recipe: &NewRecipe) -> Result<Option<Recipe>> {
        let mut tables = self.tables.lock().await;
        let Some(stored) = tables
            .recipes
            .iter_mut()
            .find(|stored| stored.recipe.recipe_id == recipe_id)
        else {
            return Ok(None);
        };

        stored.recipe.name.clone_from(&recipe.name);
        stored.recipe.text.clone_from(&recipe.text);
        stored.recipe.cooking_time = recipe.cooking_time;
        stored.recipe.updated_at = Utc::now();
        stored.ingredients.clone_from(&recipe.ingredients);
        stored.tag_ids.clone_from(&recipe.tag_ids);

        Ok(Some(stored.recipe.clone()))
    }

    async fn delete_recipe(&self, recipe_id: Uuid) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        let before = tables.recipes.len();
        tables
            .recipes
            .retain(|stored| stored.recipe.recipe_id != recipe_id);
        let deleted = tables.recipes.len() != before;

        if deleted {
            tables.favorites.retain(|(_, recipe)| *recipe != recipe_id);
            tables.carts.retain(|(_, recipe)| *recipe != recipe_id);
        }

        Ok(deleted)
    }

    async fn recipe_by_id(&self, recipe_id: Uuid) -> Result<Option<Recipe>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .stored_recipe(recipe_id)
            .map(|stored| stored.recipe.clone()))
    }

    async fn list_recipes(&self, filter: &RecipeFilter, page: PageRequest) -> Result<RecipePage> {
        let tables = self.tables.lock().await;
        let matching: Vec<&StoredRecipe> = tables
            .recipes
            .iter()
            .rev()
            .filter(|stored| Tables::matches(stored, filter))
            .collect();

        let total = i64::try_from(matching.len())?;
        let offset = usize::try_from(page.offset)?;
        let limit = usize::try_from(page.limit)?;
        let recipes = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|stored| stored.recipe.clone())
            .collect();

        Ok(RecipePage { recipes, total })
    }

    async fn recipe_ingredients(&self, recipe_id: Uuid) -> Result<Vec<RecipeIngredient>> {
        let tables = self.tables.lock().await;
        let Some(stored) = tables.stored_recipe(recipe_id) else {
            return Ok(vec![]);
        };

        let lines = stored
            .ingredients
            .iter()
            .filter_map(|line| {
                tables.ingredient(line.ingredient_id).map(|i| RecipeIngredient {
                    ingredient_id: i.ingredient_id,
                    name: i.name.clone(),
                    measurement_unit: i.measurement_unit.clone(),
                    amount: line.amount,
                })
            })
            .collect();

        Ok(lines)
    }

    async fn recipe_tags(&self, recipe_id: Uuid) -> Result<Vec<Tag>> {
        let tables = self.tables.lock().await;
        let Some(stored) = tables.stored_recipe(recipe_id) else {
            return Ok(vec![]);
        };

        let mut tags: Vec<Tag> = tables
            .tags
            .iter()
            .filter(|t| stored.tag_ids.contains(&t.tag_id))
            .cloned()
            .collect();
        tags.sort_by(|a, b| a.name.cmp(&b.name));

        Ok(tags)
    }

    async fn add_to_collection(
        &self,
        collection: RecipeCollection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<CollectionAdd> {
        let mut tables = self.tables.lock().await;
        if tables.stored_recipe(recipe_id).is_none() {
            return Ok(CollectionAdd::RecipeMissing);
        }

        let outcome = if tables
            .collection_mut(collection)
            .insert((user_id, recipe_id))
        {
            CollectionAdd::Added
        } else {
            CollectionAdd::AlreadyPresent
        };

        Ok(outcome)
    }

    async fn remove_from_collection(
        &self,
        collection: RecipeCollection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .collection_mut(collection)
            .remove(&(user_id, recipe_id)))
    }

    async fn in_collection(
        &self,
        collection: RecipeCollection,
        user_id: Uuid,
        recipe_id: Uuid,
    ) -> Result<bool> {
        let tables = self.tables.lock().await;
        Ok(tables
            .collection(collection)
            .contains(&(user_id, recipe_id)))
    }

    async fn collection_size(&self, collection: RecipeCollection, user_id: Uuid) -> Result<i64> {
        let tables = self.tables.lock().await;
        let size = tables
            .collection(collection)
            .iter()
            .filter(|(user, _)| *user == user_id)
            .count();

        Ok(i64::try_from(size)?)
    }

    async fn favorite_count(&self, recipe_id: Uuid) -> Result<i64> {
        let tables = self.tables.lock().await;
        let count = tables
            .favorites
            .iter()
            .filter(|(_, recipe)| *recipe == recipe_id)
            .count();

        Ok(i64::try_from(count)?)
    }

    async fn cart_ingredient_lines(&self, user_id: Uuid) -> Result<Vec<CartIngredientLine>> {
        let tables = self.tables.lock().await;
        let mut lines = Vec::new();

        for (_, recipe_id) in tables.carts.iter().filter(|(user, _)| *user == user_id) {
            let Some(stored) = tables.stored_recipe(*recipe_id) else {
                continue;
            };

            for line in &stored.ingredients {
                if let Some(ingredient) = tables.ingredient(line.ingredient_id) {
                    lines.push(CartIngredientLine {
                        name: ingredient.name.clone(),
                        measurement_unit: ingredient.measurement_unit.clone(),
                        amount: i64::from(line.amount),
                    });
                }
            }
        }

        Ok(lines)
    }
}
