use diesel::prelude::*;

#[derive(Debug, Clone, Identifiable, Queryable, Associations, Selectable)]
#[diesel(
    table_name = crate::schema::recipe_tags,
    belongs_to(super::recipe::Recipe, foreign_key = recipe_id),
    belongs_to(super::tag::Tag, foreign_key = tag_id)
)]
pub struct RecipeTag {
    pub id: i32,
    pub recipe_id: i32,
    pub tag_id: i32,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::recipe_tags)]
pub struct NewRecipeTag {
    pub recipe_id: i32,
    pub tag_id: i32,
}

impl NewRecipeTag {
    pub fn new(recipe_id: i32, tag_id: i32) -> Self {
        Self { recipe_id, tag_id }
    }
}
