use diesel::prelude::*;
use pushkind_common::repository::errors::{RepositoryError, RepositoryResult};

use crate::domain::ingredient::{
    Ingredient as DomainIngredient, IngredientListQuery, NewIngredient as DomainNewIngredient,
};
use crate::models::ingredient::{Ingredient as DbIngredient, NewIngredient as DbNewIngredient};
use crate::repository::{DieselRepository, IngredientReader, IngredientWriter};

impl IngredientReader for DieselRepository {
    fn get_ingredient_by_id(&self, id: i32) -> RepositoryResult<Option<DomainIngredient>> {
        use crate::schema::ingredients;

        let mut conn = self.conn()?;
        let ingredient = ingredients::table
            .filter(ingredients::id.eq(id))
            .first::<DbIngredient>(&mut conn)
            .optional()?;

        Ok(ingredient.map(Into::into))
    }

    fn get_ingredients_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<DomainIngredient>> {
        use crate::schema::ingredients;

        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.conn()?;
        let ingredients = ingredients::table
            .filter(ingredients::id.eq_any(ids))
            .order(ingredients::id.asc())
            .load::<DbIngredient>(&mut conn)?;

        Ok(ingredients.into_iter().map(Into::into).collect())
    }

    fn list_ingredients(
        &self,
        query: IngredientListQuery,
    ) -> RepositoryResult<Vec<DomainIngredient>> {
        use crate::schema::ingredients;

        let mut conn = self.conn()?;
        let rows = ingredients::table
            .order((ingredients::name.asc(), ingredients::id.asc()))
            .load::<DbIngredient>(&mut conn)?;

        // SQLite LIKE folds ASCII case only, so the prefix match runs here.
        let prefix = query.name_prefix.map(|prefix| prefix.to_lowercase());
        let ingredients = rows
            .into_iter()
            .filter(|row| match prefix.as_deref() {
                Some(prefix) => row.name.to_lowercase().starts_with(prefix),
                None => true,
            })
            .map(Into::into)
            .collect();

        Ok(ingredients)
    }
}

impl IngredientWriter for DieselRepository {
    fn create_ingredients(
        &self,
        new_ingredients: &[DomainNewIngredient],
    ) -> RepositoryResult<usize> {
        use crate::schema::ingredients;

        if new_ingredients.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn()?;
        let payload: Vec<DbNewIngredient> =
            new_ingredients.iter().map(DbNewIngredient::from).collect();

        conn.transaction::<usize, RepositoryError, _>(|conn| {
            let inserted = diesel::insert_into(ingredients::table)
                .values(&payload)
                .execute(conn)?;
            Ok(inserted)
        })
    }
}
