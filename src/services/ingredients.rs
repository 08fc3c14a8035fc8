use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Deserialize;

use crate::domain::ingredient::{Ingredient, IngredientListQuery};
use crate::forms::ingredients::{AddIngredientForm, UploadIngredientsForm};
use crate::repository::{IngredientReader, IngredientWriter};
use crate::services::{ServiceError, ServiceResult, ensure_admin};

/// Query parameters accepted by the ingredient listing.
#[derive(Debug, Default, Deserialize)]
pub struct IngredientsQuery {
    /// Case-insensitive name prefix.
    pub name: Option<String>,
}

pub fn list_ingredients<R>(repo: &R, query: IngredientsQuery) -> ServiceResult<Vec<Ingredient>>
where
    R: IngredientReader + ?Sized,
{
    let mut list_query = IngredientListQuery::new();
    if let Some(name) = query.name {
        list_query = list_query.name_prefix(name);
    }

    Ok(repo.list_ingredients(list_query)?)
}

pub fn get_ingredient<R>(repo: &R, ingredient_id: i32) -> ServiceResult<Ingredient>
where
    R: IngredientReader + ?Sized,
{
    repo.get_ingredient_by_id(ingredient_id)?
        .ok_or(ServiceError::NotFound)
}

/// Adds one ingredient. Requires the admin role.
pub fn create_ingredient<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AddIngredientForm,
) -> ServiceResult<usize>
where
    R: IngredientWriter + ?Sized,
{
    ensure_admin(user)?;

    let new_ingredient = form
        .into_new_ingredient()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    Ok(repo.create_ingredients(std::slice::from_ref(&new_ingredient))?)
}

/// Imports ingredients from an uploaded CSV file. Requires the admin role.
pub fn import_ingredients<R>(
    repo: &R,
    user: &AuthenticatedUser,
    mut form: UploadIngredientsForm,
) -> ServiceResult<usize>
where
    R: IngredientWriter + ?Sized,
{
    ensure_admin(user)?;

    let new_ingredients = form
        .into_new_ingredients()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let created = repo.create_ingredients(&new_ingredients)?;
    log::info!("Imported {created} ingredients");
    Ok(created)
}
