use diesel::prelude::*;
use pushkind_common::repository::errors::RepositoryResult;

use crate::{
    domain::recipe_ingredient::Amount,
    domain::shopping_list::ShoppingListRow,
    repository::{DieselRepository, ShoppingListReader},
};

impl ShoppingListReader for DieselRepository {
    fn list_shopping_list_rows(&self, user_id: i32) -> RepositoryResult<Vec<ShoppingListRow>> {
        use crate::schema::{ingredients, recipe_ingredients, shopping_carts};

        let mut conn = self.conn()?;

        let rows = recipe_ingredients::table
            .inner_join(ingredients::table)
            .filter(
                recipe_ingredients::recipe_id.eq_any(
                    shopping_carts::table
                        .filter(shopping_carts::user_id.eq(user_id))
                        .select(shopping_carts::recipe_id),
                ),
            )
            .order((ingredients::id.asc(), recipe_ingredients::recipe_id.asc()))
            .select((
                ingredients::id,
                ingredients::name,
                ingredients::measurement_unit,
                recipe_ingredients::amount,
            ))
            .load::<(i32, String, String, i32)>(&mut conn)?;

        Ok(rows
            .into_iter()
            .map(
                |(ingredient_id, name, measurement_unit, amount)| ShoppingListRow {
                    ingredient_id,
                    name,
                    measurement_unit,
                    amount: Amount::from_tenths(i64::from(amount)),
                },
            )
            .collect())
    }
}
