use std::collections::HashSet;

use db::{
    cooking::{IngredientAmount, NewRecipe},
    Store,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::errors::ApiError;

pub(crate) const MAX_RECIPE_NAME_LEN: usize = 200;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngredientAmountPayload {
    pub id: Uuid,
    pub amount: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipePayload {
    pub name: String,
    pub text: String,
    pub cooking_time: i32,
    pub ingredients: Vec<IngredientAmountPayload>,
    #[serde(default)]
    pub tags: Vec<Uuid>,
}

/// `PATCH` body. Absent fields keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<IngredientAmountPayload>>,
    pub tags: Option<Vec<Uuid>>,
}

impl RecipePatch {
    pub fn apply_to(self, current: RecipePayload) -> RecipePayload {
        RecipePayload {
            name: self.name.unwrap_or(current.name),
            text: self.text.unwrap_or(current.text),
            cooking_time: self.cooking_time.unwrap_or(current.cooking_time),
            ingredients: self.ingredients.unwrap_or(current.ingredients),
            tags: self.tags.unwrap_or(current.tags),
        }
    }
}

/// Shape checks that need no store access. Every problem found is reported, not just the first.
pub fn validate_recipe(payload: RecipePayload) -> Result<NewRecipe, ApiError> {
    let mut errors = Vec::new();

    let name = payload.name.trim().to_string();
    if name.is_empty() {
        errors.push("name: must not be empty".to_string());
    } else if name.chars().count() > MAX_RECIPE_NAME_LEN {
        errors.push(format!(
            "name: must be at most {MAX_RECIPE_NAME_LEN} characters"
        ));
    }

    let text = payload.text.trim().to_string();
    if text.is_empty() {
        errors.push("text: must not be empty".to_string());
    }

    if payload.cooking_time < 1 {
        errors.push("cooking_time: must be at least 1 minute".to_string());
    }

    if payload.ingredients.is_empty() {
        errors.push("ingredients: at least one ingredient is required".to_string());
    }

    let mut seen_ingredients = HashSet::new();
    for line in &payload.ingredients {
        if !seen_ingredients.insert(line.id) {
            errors.push(format!("ingredients: {} is listed more than once", line.id));
        }
        if line.amount < 1 {
            errors.push(format!("ingredients: amount for {} must be at least 1", line.id));
        }
    }

    let mut seen_tags = HashSet::new();
    for tag in &payload.tags {
        if !seen_tags.insert(*tag) {
            errors.push(format!("tags: {tag} is listed more than once"));
        }
    }

    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    Ok(NewRecipe {
        name,
        text,
        cooking_time: payload.cooking_time,
        ingredients: payload
            .ingredients
            .into_iter()
            .map(|line| IngredientAmount {
                ingredient_id: line.id,
                amount: line.amount,
            })
            .collect(),
        tag_ids: payload.tags,
    })
}

/// Referenced ingredients and tags must exist.
pub async fn check_references(store: &dyn Store, recipe: &NewRecipe) -> Result<(), ApiError> {
    let ingredient_ids: Vec<Uuid> = recipe
        .ingredients
        .iter()
        .map(|line| line.ingredient_id)
        .collect();

    let mut errors: Vec<String> = store
        .missing_ingredients(&ingredient_ids)
        .await?
        .into_iter()
        .map(|id| format!("ingredients: unknown ingredient {id}"))
        .collect();

    errors.extend(
        store
            .missing_tags(&recipe.tag_ids)
            .await?
            .into_iter()
            .map(|id| format!("tags: unknown tag {id}")),
    );

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::Validation(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> RecipePayload {
        RecipePayload {
            name: "  Pancakes ".to_string(),
            text: "Whisk, fry, flip.".to_string(),
            cooking_time: 20,
            ingredients: vec![IngredientAmountPayload {
                id: Uuid::new_v4(),
                amount: 200,
            }],
            tags: vec![Uuid::new_v4()],
        }
    }

    fn errors_of(payload: RecipePayload) -> Vec<String> {
        match validate_recipe(payload) {
            Err(ApiError::Validation(errors)) => errors,
            other => panic!("expected validation errors, got {other:?}"),
        }
    }

    #[test]
    fn valid_payload_becomes_a_trimmed_draft() {
        let payload = payload();
        let ingredient = payload.ingredients[0].id;

        let draft = validate_recipe(payload).unwrap();

        assert_eq!(draft.name, "Pancakes");
        assert_eq!(draft.ingredients[0].ingredient_id, ingredient);
        assert_eq!(draft.ingredients[0].amount, 200);
    }

    #[test]
    fn reports_every_problem_at_once() {
        let errors = errors_of(RecipePayload {
            name: " ".to_string(),
            text: String::new(),
            cooking_time: 0,
            ingredients: vec![],
            tags: vec![],
        });

        assert_eq!(errors.len(), 4);
        assert!(errors[0].starts_with("name:"));
        assert!(errors[1].starts_with("text:"));
        assert!(errors[2].starts_with("cooking_time:"));
        assert!(errors[3].starts_with("ingredients:"));
    }

    #[test]
    fn rejects_duplicates_and_non_positive_amounts() {
        let mut payload = payload();
        let line = payload.ingredients[0].clone();
        payload.ingredients.push(IngredientAmountPayload {
            id: line.id,
            amount: 0,
        });
        payload.tags.push(payload.tags[0]);

        let errors = errors_of(payload);

        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("listed more than once") && e.starts_with("ingredients:")));
        assert!(errors.iter().any(|e| e.contains("must be at least 1")));
        assert!(errors.iter().any(|e| e.starts_with("tags:")));
    }

    #[test]
    fn name_length_counts_characters() {
        let mut payload = payload();
        payload.name = "é".repeat(MAX_RECIPE_NAME_LEN);
        assert!(validate_recipe(payload.clone()).is_ok());

        payload.name.push('é');
        assert_eq!(errors_of(payload).len(), 1);
    }

    #[test]
    fn patch_keeps_absent_fields() {
        let current = payload();
        let patched = RecipePatch {
            cooking_time: Some(5),
            ..RecipePatch::default()
        }
        .apply_to(current.clone());

        assert_eq!(patched.cooking_time, 5);
        assert_eq!(patched.name, current.name);
        assert_eq!(patched.tags, current.tags);
    }
}
