use serde::{Deserialize, Serialize};

/// Ingredient reference data shared by all recipes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ingredient {
    pub id: i32,
    pub name: String,
    pub measurement_unit: String,
}

/// Payload required to insert a new ingredient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewIngredient {
    pub name: String,
    pub measurement_unit: String,
}

impl NewIngredient {
    pub fn new(name: impl Into<String>, measurement_unit: impl Into<String>) -> Self {
        Self {
            name: name.into().trim().to_string(),
            measurement_unit: measurement_unit.into().trim().to_string(),
        }
    }
}

/// Query definition used to list ingredients.
#[derive(Debug, Clone, Default)]
pub struct IngredientListQuery {
    /// Case-insensitive prefix the ingredient name must start with.
    pub name_prefix: Option<String>,
}

impl IngredientListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only ingredients whose name starts with `prefix`, ignoring case.
    pub fn name_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let trimmed = prefix.trim();
        if !trimmed.is_empty() {
            self.name_prefix = Some(trimmed.to_string());
        }
        self
    }
}
