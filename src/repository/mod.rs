use std::collections::HashSet;

use pushkind_common::db::{DbConnection, DbPool};
use pushkind_common::repository::errors::RepositoryResult;

use crate::domain::{
    ingredient::{Ingredient, IngredientListQuery, NewIngredient},
    recipe::{AnnotatedRecipe, NewRecipe, Recipe, RecipeListQuery, RecipeSummary, UpdateRecipe},
    relation::RelationKind,
    shopping_list::ShoppingListRow,
    tag::{NewTag, Tag, UpdateTag},
    user::{NewUser, User, UserListQuery},
};

pub mod ingredient;
pub mod recipe;
pub mod relation;
pub mod shopping_list;
pub mod tag;
pub mod user;

#[cfg(test)]
pub mod mock;

#[derive(Clone)]
/// Diesel-backed repository implementation that wraps an r2d2 pool.
pub struct DieselRepository {
    pool: DbPool, // r2d2::Pool is cheap to clone
}

impl DieselRepository {
    /// Create a new repository using the provided connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(self.pool.get()?)
    }
}

/// Read-only operations over user records.
pub trait UserReader {
    fn get_user_by_id(&self, id: i32) -> RepositoryResult<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    fn get_users_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<User>>;
    fn list_users(&self, query: UserListQuery) -> RepositoryResult<(usize, Vec<User>)>;
}

/// Write operations over user records.
pub trait UserWriter {
    fn create_user(&self, new_user: &NewUser) -> RepositoryResult<User>;
}

/// Read-only operations over tag records.
pub trait TagReader {
    fn get_tag_by_id(&self, id: i32) -> RepositoryResult<Option<Tag>>;
    fn get_tags_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Tag>>;
    fn list_tags(&self) -> RepositoryResult<Vec<Tag>>;
}

/// Write operations over tag records.
pub trait TagWriter {
    fn create_tag(&self, new_tag: &NewTag) -> RepositoryResult<Tag>;
    fn update_tag(&self, tag_id: i32, updates: &UpdateTag) -> RepositoryResult<Tag>;
    fn delete_tag(&self, tag_id: i32) -> RepositoryResult<()>;
}

/// Read-only operations over ingredient records.
pub trait IngredientReader {
    fn get_ingredient_by_id(&self, id: i32) -> RepositoryResult<Option<Ingredient>>;
    fn get_ingredients_by_ids(&self, ids: &[i32]) -> RepositoryResult<Vec<Ingredient>>;
    fn list_ingredients(&self, query: IngredientListQuery) -> RepositoryResult<Vec<Ingredient>>;
}

/// Write operations over ingredient records.
pub trait IngredientWriter {
    fn create_ingredients(&self, new_ingredients: &[NewIngredient]) -> RepositoryResult<usize>;
}

/// Read-only operations over recipes, annotated for a viewer.
pub trait RecipeReader {
    fn get_recipe_by_id(
        &self,
        id: i32,
        viewer_id: Option<i32>,
    ) -> RepositoryResult<Option<AnnotatedRecipe>>;
    fn list_recipes(&self, query: RecipeListQuery)
    -> RepositoryResult<(usize, Vec<AnnotatedRecipe>)>;
    /// Newest-first summaries of every recipe written by the given authors.
    fn list_recipe_summaries(&self, author_ids: &[i32]) -> RepositoryResult<Vec<RecipeSummary>>;
}

/// Transactional write operations over recipes and their associations.
pub trait RecipeWriter {
    fn create_recipe(&self, new_recipe: &NewRecipe) -> RepositoryResult<Recipe>;
    fn update_recipe(&self, recipe_id: i32, updates: &UpdateRecipe) -> RepositoryResult<Recipe>;
    fn delete_recipe(&self, recipe_id: i32) -> RepositoryResult<()>;
}

/// Existence lookups for favorites, shopping carts and subscriptions.
pub trait RelationReader {
    /// Returns the subset of `target_ids` related to `actor_id` by `kind`.
    fn related_target_ids(
        &self,
        kind: RelationKind,
        actor_id: i32,
        target_ids: &[i32],
    ) -> RepositoryResult<HashSet<i32>>;
}

/// Add/remove operations for favorites, shopping carts and subscriptions.
pub trait RelationWriter {
    /// Returns `false` when the relation already existed.
    fn add_relation(&self, kind: RelationKind, actor_id: i32, target_id: i32)
    -> RepositoryResult<bool>;
    /// Returns `false` when there was no relation to remove.
    fn remove_relation(
        &self,
        kind: RelationKind,
        actor_id: i32,
        target_id: i32,
    ) -> RepositoryResult<bool>;
}

/// Read access to the ingredient rows behind a user's shopping cart.
pub trait ShoppingListReader {
    fn list_shopping_list_rows(&self, user_id: i32) -> RepositoryResult<Vec<ShoppingListRow>>;
}
