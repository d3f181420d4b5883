pub mod collections;
pub mod ingredients;
pub mod recipe;
pub mod tags;

pub use collections::{CartIngredientLine, CollectionAdd, RecipeCollection};
pub use ingredients::{Ingredient, IngredientAmount, RecipeIngredient};
pub use recipe::{NewRecipe, PageRequest, Recipe, RecipeFilter, RecipePage};
pub use tags::{RecipeTag, Tag};
