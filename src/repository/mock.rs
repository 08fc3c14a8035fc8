use std::collections::HashSet;

use mockall::mock;

use super::{
    IngredientReader, IngredientWriter, RecipeReader, RecipeWriter, RelationReader,
    RelationWriter, ShoppingListReader, TagReader, TagWriter, UserReader, UserWriter,
};
use crate::domain::{
    ingredient::{Ingredient, IngredientListQuery, NewIngredient},
    recipe::{AnnotatedRecipe, NewRecipe, Recipe, RecipeListQuery, RecipeSummary, UpdateRecipe},
    relation::RelationKind,
    shopping_list::ShoppingListRow,
    tag::{NewTag, Tag, UpdateTag},
    user::{NewUser, User, UserListQuery},
};
use pushkind_common::repository::errors::RepositoryResult;

mock! {
    pub UserReader {}

    impl UserReader for UserReader {
        fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>>;
        fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
        fn get_users_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<User>>;
        fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
    }
}

mock! {
    pub UserWriter {}

    impl UserWriter for UserWriter {
        fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
    }
}

mock! {
    pub TagReader {}

    impl TagReader for TagReader {
        fn get_tag_by_id(&self, id: i32) -> RepositoryResult<Option<Tag>>;
        fn get_tags_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Tag>>;
        fn list_tags(&self) -> RepositoryResult<Vec<Tag>>;
    }
}

mock! {
    pub TagWriter {}

    impl TagWriter for TagWriter {
        fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag>;
        fn update_tag(&self, tag_id: i32, updates: &UpdateTag) -> RepositoryResult<Tag>;
        fn delete_tag(&self, tag_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub IngredientReader {}

    impl IngredientReader for IngredientReader {
        fn get_ingredient_by_id(&self, id: i32) -> RepositoryResult<Option<Ingredient>>;
        fn get_ingredients_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Ingredient>>;
        fn list_ingredients(&self, query: IngredientListQuery) -> RepositoryResult<Vec<Ingredient>>;
    }
}

mock! {
    pub IngredientWriter {}

    impl IngredientWriter for IngredientWriter {
        fn create_ingredients(&self, new_ingredients: &[NewIngredient]) -> RepositoryResult<usize>;
    }
}

mock! {
    pub RecipeReader {}

    impl RecipeReader for RecipeReader {
        fn get_recipe_by_id(&self, id: i32, viewer_id: Option<i32>) -> RepositoryResult<Option<AnnotatedRecipe>>;
        fn list_recipes(&self, query: RecipeListQuery) -> RepositoryResult<(usize, Vec<AnnotatedRecipe>)>;
        fn list_recipe_summaries(&self, author_ids: &[i32]) -> RepositoryResult<Vec<RecipeSummary>>;
    }
}

mock! {
    pub RecipeWriter {}

    impl RecipeWriter for RecipeWriter {
        fn create_recipe(&self, new_recipe: &NewRecipe) -> RepositoryResult<Recipe>;
        fn update_recipe(&self, recipe_id: i32, updates: &UpdateRecipe) -> RepositoryResult<Recipe>;
        fn delete_recipe(&self, recipe_id: i32) -> RepositoryResult<()>;
    }
}

mock! {
    pub RelationReader {}

    impl RelationReader for RelationReader {
        fn related_target_ids(&self, kind: RelationKind, actor_id: i32, target_ids: &[i32]) -> RepositoryResult<HashSet<i32>>;
    }
}

mock! {
    pub RelationWriter {}

    impl RelationWriter for RelationWriter {
        fn add_relation(&self, kind: RelationKind, actor_id: i32, target_id: i32) -> RepositoryResult<bool>;
        fn remove_relation(&self, kind: RelationKind, actor_id: i32, target_id: i32) -> RepositoryResult<bool>;
    }
}

mock! {
    pub ShoppingListReader {}

    impl ShoppingListReader for ShoppingListReader {
        fn list_shopping_list_rows(&self, user_id: i32) -> RepositoryResult<Vec<ShoppingListRow>>;
    }
}

/// Bundles every mock so a service test can configure only the traits it uses.
#[derive(Default)]
pub struct FakeRepo {
    pub users: MockUserReader,
    pub user_writer: MockUserWriter,
    pub tags: MockTagReader,
    pub tag_writer: MockTagWriter,
    pub ingredients: MockIngredientReader,
    pub ingredient_writer: MockIngredientWriter,
    pub recipes: MockRecipeReader,
    pub recipe_writer: MockRecipeWriter,
    pub relations: MockRelationReader,
    pub relation_writer: MockRelationWriter,
    pub shopping_list: MockShoppingListReader,
}

impl FakeRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl UserReader for FakeRepo {
    fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>> {
        self.users.get_user_by_id(id)
    }

    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.users.get_user_by_email(email)
    }

    fn get_users_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<User>> {
        self.users.get_users_by_ids(ids)
    }

    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)> {
        self.users.list_users(query)
    }
}

impl UserWriter for FakeRepo {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User> {
        self.user_writer.create_user(new_user)
    }
}

impl TagReader for FakeRepo {
    fn get_tag_by_id(&self, id: i32) -> RepositoryResult<Option<Tag>> {
        self.tags.get_tag_by_id(id)
    }

    fn get_tags_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Tag>> {
        self.tags.get_tags_by_ids(ids)
    }

    fn list_tags(&self) -> RepositoryResult<Vec<Tag>> {
        self.tags.list_tags()
    }
}

impl TagWriter for FakeRepo {
    fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag> {
        self.tag_writer.create_tag(new_tag)
    }

    fn update_tag(&self, tag_id: i32, updates: &UpdateTag) -> RepositoryResult<Tag> {
        self.tag_writer.update_tag(tag_id, updates)
    }

    fn delete_tag(&self, tag_id: i32) -> RepositoryResult<()> {
        self.tag_writer.delete_tag(tag_id)
    }
}

impl IngredientReader for FakeRepo {
    fn get_ingredient_by_id(&self, id: i32) -> RepositoryResult<Option<Ingredient>> {
        self.ingredients.get_ingredient_by_id(id)
    }

    fn get_ingredients_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Ingredient>> {
        self.ingredients.get_ingredients_by_ids(ids)
    }

    fn list_ingredients(&self, query: IngredientListQuery) -> RepositoryResult<Vec<Ingredient>> {
        self.ingredients.list_ingredients(query)
    }
}

impl IngredientWriter for FakeRepo {
    fn create_ingredients(&self, new_ingredients: &[NewIngredient]) -> RepositoryResult<usize> {
        self.ingredient_writer.create_ingredients(new_ingredients)
    }
}

impl RecipeReader for FakeRepo {
    fn get_recipe_by_id(
        &self,
        id: i32,
        viewer_id: Option<i32>,
    ) -> RepositoryResult<Option<AnnotatedRecipe>> {
        self.recipes.get_recipe_by_id(id, viewer_id)
    }

    fn list_recipes(
        &self,
        query: RecipeListQuery,
    ) -> RepositoryResult<(usize, Vec<AnnotatedRecipe>)> {
        self.recipes.list_recipes(query)
    }

    fn list_recipe_summaries(&self, author_ids: &[i32]) -> RepositoryResult<Vec<RecipeSummary>> {
        self.recipes.list_recipe_summaries(author_ids)
    }
}

impl RecipeWriter for FakeRepo {
    fn create_recipe(&self, new_recipe: &NewRecipe) -> RepositoryResult<Recipe> {
        self.recipe_writer.create_recipe(new_recipe)
    }

    fn update_recipe(&self, recipe_id: i32, updates: &UpdateRecipe) -> RepositoryResult<Recipe> {
        self.recipe_writer.update_recipe(recipe_id, updates)
    }

    fn delete_recipe(&self, recipe_id: i32) -> RepositoryResult<()> {
        self.recipe_writer.delete_recipe(recipe_id)
    }
}

impl RelationReader for FakeRepo {
    fn related_target_ids(
        &self,
        kind: RelationKind,
        actor_id: i32,
        target_ids: &[i32],
    ) -> RepositoryResult<HashSet<i32>> {
        self.relations.related_target_ids(kind, actor_id, target_ids)
    }
}

impl RelationWriter for FakeRepo {
    fn add_relation(
        &self,
        kind: RelationKind,
        actor_id: i32,
        target_id: i32,
    ) -> RepositoryResult<bool> {
        self.relation_writer.add_relation(kind, actor_id, target_id)
    }

    fn remove_relation(
        &self,
        kind: RelationKind,
        actor_id: i32,
        target_id: i32,
    ) -> RepositoryResult<bool> {
        self.relation_writer
            .remove_relation(kind, actor_id, target_id)
    }
}

impl ShoppingListReader for FakeRepo {
    fn list_shopping_list_rows(&self, user_id: i32) -> RepositoryResult<Vec<ShoppingListRow>> {
        self.shopping_list.list_shopping_list_rows(user_id)
    }
}
