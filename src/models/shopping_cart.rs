use diesel::prelude::*;

#[derive(Insertable)]
#[diesel(table_name = crate::schema::shopping_carts)]
pub struct NewShoppingCart {
    pub user_id: i32,
    pub recipe_id: i32,
}
