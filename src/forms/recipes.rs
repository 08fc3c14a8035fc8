use std::collections::HashSet;

use base64ct::{Base64, Encoding};
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::recipe::{NewRecipe, UpdateRecipe};
use crate::domain::recipe_ingredient::{Amount, NewRecipeIngredient};
use crate::forms::{sanitize_inline_text, sanitize_multiline_text};

/// Maximum allowed length for a recipe name.
const NAME_MAX_LEN: usize = 200;
const NAME_MAX_LEN_VALIDATOR: u64 = NAME_MAX_LEN as u64;

/// Result type returned by the recipe form helpers.
pub type RecipeFormResult<T> = Result<T, RecipeFormError>;

/// Errors that can occur while processing recipe payloads.
#[derive(Debug, Error)]
pub enum RecipeFormError {
    /// Validation failures from the `validator` crate.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("recipe name cannot be empty")]
    EmptyName,
    #[error("recipe text cannot be empty")]
    EmptyText,
    #[error("duplicate ingredient {id}")]
    DuplicateIngredient { id: i32 },
    #[error("duplicate tag {id}")]
    DuplicateTag { id: i32 },
    #[error("amount of ingredient {id} must be at least {min}")]
    InvalidAmount { id: i32, min: Amount },
    #[error("image must be a base64 encoded data URL")]
    InvalidImage,
}

/// Ingredient reference inside a recipe payload.
#[derive(Debug, Clone, Deserialize)]
pub struct IngredientAmountForm {
    /// Identifier of an existing ingredient.
    pub id: i32,
    pub amount: Amount,
}

/// Decoded image waiting to be handed to the blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    /// File extension taken from the data URL media type.
    pub extension: String,
}

/// Validated create payload. The recipe image is empty until the upload is stored.
#[derive(Debug)]
pub struct RecipeSubmission {
    pub recipe: NewRecipe,
    pub image: ImageUpload,
}

/// Validated update payload.
#[derive(Debug)]
pub struct RecipeUpdateSubmission {
    pub update: UpdateRecipe,
    pub image: Option<ImageUpload>,
}

/// JSON body accepted when publishing a recipe.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRecipeForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: String,
    #[validate(length(min = 1))]
    pub text: String,
    /// Minutes.
    #[validate(range(min = 1))]
    pub cooking_time: i32,
    /// `data:image/<ext>;base64,<payload>`
    #[validate(length(min = 1))]
    pub image: String,
    pub ingredients: Vec<IngredientAmountForm>,
    pub tags: Vec<i32>,
}

impl CreateRecipeForm {
    /// Validates and sanitizes the payload for the given author.
    pub fn into_submission(self, author_id: i32) -> RecipeFormResult<RecipeSubmission> {
        self.validate()?;

        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(RecipeFormError::EmptyName);
        }

        let text = sanitize_multiline_text(&self.text);
        if text.is_empty() {
            return Err(RecipeFormError::EmptyText);
        }

        let ingredients = convert_ingredients(&self.ingredients)?;
        let tag_ids = check_tags(self.tags)?;
        let image = decode_image(&self.image)?;

        let recipe = NewRecipe::new(author_id, name, String::new(), text, self.cooking_time)
            .with_ingredients(ingredients)
            .with_tags(tag_ids);

        Ok(RecipeSubmission { recipe, image })
    }
}

/// JSON body accepted when editing a recipe. Omitted fields stay untouched.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditRecipeForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN_VALIDATOR))]
    pub name: Option<String>,
    #[validate(length(min = 1))]
    pub text: Option<String>,
    #[validate(range(min = 1))]
    pub cooking_time: Option<i32>,
    pub image: Option<String>,
    pub ingredients: Option<Vec<IngredientAmountForm>>,
    pub tags: Option<Vec<i32>>,
}

impl EditRecipeForm {
    pub fn into_submission(self) -> RecipeFormResult<RecipeUpdateSubmission> {
        self.validate()?;

        let mut update = UpdateRecipe::new();

        if let Some(name) = self.name.as_deref() {
            let name = sanitize_inline_text(name);
            if name.is_empty() {
                return Err(RecipeFormError::EmptyName);
            }
            update = update.name(name);
        }

        if let Some(text) = self.text.as_deref() {
            let text = sanitize_multiline_text(text);
            if text.is_empty() {
                return Err(RecipeFormError::EmptyText);
            }
            update = update.text(text);
        }

        if let Some(cooking_time) = self.cooking_time {
            update = update.cooking_time(cooking_time);
        }

        if let Some(ingredients) = self.ingredients.as_deref() {
            update = update.ingredients(convert_ingredients(ingredients)?);
        }

        if let Some(tags) = self.tags {
            update = update.tags(check_tags(tags)?);
        }

        let image = self.image.as_deref().map(decode_image).transpose()?;

        Ok(RecipeUpdateSubmission { update, image })
    }
}

/// Decodes a `data:image/<ext>;base64,<payload>` URL.
pub fn decode_image(data_url: &str) -> RecipeFormResult<ImageUpload> {
    let (media_type, payload) = data_url
        .trim()
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .ok_or(RecipeFormError::InvalidImage)?;

    let extension = media_type
        .strip_prefix("image/")
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .ok_or(RecipeFormError::InvalidImage)?
        .to_ascii_lowercase();

    let bytes = Base64::decode_vec(payload.trim()).map_err(|_| RecipeFormError::InvalidImage)?;
    if bytes.is_empty() {
        return Err(RecipeFormError::InvalidImage);
    }

    Ok(ImageUpload { bytes, extension })
}

fn convert_ingredients(
    entries: &[IngredientAmountForm],
) -> RecipeFormResult<Vec<NewRecipeIngredient>> {
    let mut seen = HashSet::with_capacity(entries.len());
    let mut ingredients = Vec::with_capacity(entries.len());

    for entry in entries {
        if !seen.insert(entry.id) {
            return Err(RecipeFormError::DuplicateIngredient { id: entry.id });
        }
        if entry.amount < Amount::MIN {
            return Err(RecipeFormError::InvalidAmount {
                id: entry.id,
                min: Amount::MIN,
            });
        }
        ingredients.push(NewRecipeIngredient::new(entry.id, entry.amount));
    }

    Ok(ingredients)
}

fn check_tags(tags: Vec<i32>) -> RecipeFormResult<Vec<i32>> {
    let mut seen = HashSet::with_capacity(tags.len());
    for id in &tags {
        if !seen.insert(*id) {
            return Err(RecipeFormError::DuplicateTag { id: *id });
        }
    }
    Ok(tags)
}
