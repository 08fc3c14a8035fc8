use chrono::{NaiveDate, NaiveDateTime};
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

use crate::domain::recipe_ingredient::{NewRecipeIngredient, RecipeIngredient};
use crate::domain::tag::Tag;

/// Domain representation of a published recipe with its expanded relations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Recipe {
    /// Unique identifier of the recipe.
    pub id: i32,
    /// Identifier of the user who owns the recipe.
    pub author_id: i32,
    pub name: String,
    /// URL of the stored image.
    pub image: String,
    pub text: String,
    /// Cooking time in minutes.
    pub cooking_time: i32,
    pub pub_date: NaiveDate,
    /// Ingredient rows ordered by insertion.
    pub ingredients: Vec<RecipeIngredient>,
    /// Tags ordered by identifier.
    pub tags: Vec<Tag>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// Recipe paired with the flags computed for the viewing user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotatedRecipe {
    pub recipe: Recipe,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
}

impl AnnotatedRecipe {
    /// Wrap a recipe with both flags unset, as seen by an anonymous viewer.
    pub fn anonymous(recipe: Recipe) -> Self {
        Self {
            recipe,
            is_favorited: false,
            is_in_shopping_cart: false,
        }
    }
}

/// Compact recipe projection used for previews and relation responses.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecipeSummary {
    pub id: i32,
    #[serde(skip_serializing)]
    pub author_id: i32,
    pub name: String,
    pub image: String,
    pub cooking_time: i32,
}

impl From<&Recipe> for RecipeSummary {
    fn from(value: &Recipe) -> Self {
        Self {
            id: value.id,
            author_id: value.author_id,
            name: value.name.clone(),
            image: value.image.clone(),
            cooking_time: value.cooking_time,
        }
    }
}

/// Payload persisted by the recipe create transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecipe {
    pub author_id: i32,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
    pub pub_date: NaiveDate,
    pub ingredients: Vec<NewRecipeIngredient>,
    pub tag_ids: Vec<i32>,
}

impl NewRecipe {
    /// Build a payload dated today; ingredients and tags start empty.
    pub fn new(
        author_id: i32,
        name: impl Into<String>,
        image: impl Into<String>,
        text: impl Into<String>,
        cooking_time: i32,
    ) -> Self {
        Self {
            author_id,
            name: name.into(),
            image: image.into(),
            text: text.into(),
            cooking_time,
            pub_date: chrono::Utc::now().date_naive(),
            ingredients: Vec::new(),
            tag_ids: Vec::new(),
        }
    }

    pub fn with_ingredients(mut self, ingredients: Vec<NewRecipeIngredient>) -> Self {
        self.ingredients = ingredients;
        self
    }

    pub fn with_tags(mut self, tag_ids: Vec<i32>) -> Self {
        self.tag_ids = tag_ids;
        self
    }
}

/// Patch applied by the recipe update transaction.
///
/// `None` leaves a field or association untouched. `Some(vec![])` for
/// `ingredients` or `tag_ids` clears the association.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateRecipe {
    pub name: Option<String>,
    pub image: Option<String>,
    pub text: Option<String>,
    pub cooking_time: Option<i32>,
    pub ingredients: Option<Vec<NewRecipeIngredient>>,
    pub tag_ids: Option<Vec<i32>>,
    /// Timestamp captured when the patch was created.
    pub updated_at: NaiveDateTime,
}

impl Default for UpdateRecipe {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateRecipe {
    pub fn new() -> Self {
        Self {
            name: None,
            image: None,
            text: None,
            cooking_time: None,
            ingredients: None,
            tag_ids: None,
            updated_at: chrono::Utc::now().naive_utc(),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn cooking_time(mut self, cooking_time: i32) -> Self {
        self.cooking_time = Some(cooking_time);
        self
    }

    /// Replace the whole ingredient set of the recipe.
    pub fn ingredients(mut self, ingredients: Vec<NewRecipeIngredient>) -> Self {
        self.ingredients = Some(ingredients);
        self
    }

    /// Replace the whole tag set of the recipe.
    pub fn tags(mut self, tag_ids: Vec<i32>) -> Self {
        self.tag_ids = Some(tag_ids);
        self
    }
}

/// Query definition used to list recipes.
#[derive(Debug, Clone, Default)]
pub struct RecipeListQuery {
    /// User the annotations are computed for; `None` for anonymous viewers.
    pub viewer_id: Option<i32>,
    /// Tag slugs; a recipe matches when it carries at least one of them.
    pub tags: Vec<String>,
    /// Exact author filter.
    pub author_id: Option<i32>,
    pub is_favorited: Option<bool>,
    pub is_in_shopping_cart: Option<bool>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl RecipeListQuery {
    pub fn new(viewer_id: Option<i32>) -> Self {
        Self {
            viewer_id,
            ..Self::default()
        }
    }

    pub fn tags<I, S>(mut self, slugs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = slugs.into_iter().map(Into::into).collect();
        self
    }

    pub fn author(mut self, author_id: i32) -> Self {
        self.author_id = Some(author_id);
        self
    }

    pub fn favorited(mut self, value: bool) -> Self {
        self.is_favorited = Some(value);
        self
    }

    pub fn in_shopping_cart(mut self, value: bool) -> Self {
        self.is_in_shopping_cart = Some(value);
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
