use diesel::prelude::*;

use crate::domain::recipe_ingredient::{
    Amount, NewRecipeIngredient as DomainNewRecipeIngredient,
    RecipeIngredient as DomainRecipeIngredient,
};
use crate::models::ingredient::Ingredient;

#[derive(Debug, Clone, Identifiable, Queryable, Associations, Selectable)]
#[diesel(
    table_name = crate::schema::recipe_ingredients,
    belongs_to(super::recipe::Recipe, foreign_key = recipe_id),
    belongs_to(super::ingredient::Ingredient, foreign_key = ingredient_id)
)]
pub struct RecipeIngredient {
    pub id: i32,
    pub recipe_id: i32,
    pub ingredient_id: i32,
    /// Tenths of the ingredient's measurement unit.
    pub amount: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_ingredients)]
pub struct NewRecipeIngredient {
    pub recipe_id: i32,
    pub ingredient_id: i32,
    pub amount: i32,
}

impl NewRecipeIngredient {
    pub fn from_domain(recipe_id: i32, value: &DomainNewRecipeIngredient) -> Self {
        Self {
            recipe_id,
            ingredient_id: value.ingredient_id,
            // forms cap amounts to the column range
            amount: i32::try_from(value.amount.tenths()).unwrap_or(i32::MAX),
        }
    }
}

impl From<(RecipeIngredient, Ingredient)> for DomainRecipeIngredient {
    fn from((row, ingredient): (RecipeIngredient, Ingredient)) -> Self {
        Self {
            id: ingredient.id,
            name: ingredient.name,
            measurement_unit: ingredient.measurement_unit,
            amount: Amount::from_tenths(i64::from(row.amount)),
        }
    }
}
