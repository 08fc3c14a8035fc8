use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::domain::recipe::{AnnotatedRecipe, Recipe, RecipeListQuery};
use crate::domain::recipe_ingredient::{NewRecipeIngredient, RecipeIngredient};
use crate::domain::tag::Tag;
use crate::domain::user::User;
use crate::forms::recipes::{CreateRecipeForm, EditRecipeForm, ImageUpload};
use crate::repository::{
    IngredientReader, RecipeReader, RecipeWriter, RelationReader, TagReader, UserReader,
};
use crate::services::users::{UserView, subscribed_ids};
use crate::services::{ListPage, ServiceError, ServiceResult, page_params};
use crate::storage::ImageStore;

/// Query parameters accepted by the recipe listing.
#[derive(Debug, Default, Deserialize)]
pub struct RecipesQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    /// Tag slugs; repeat the parameter to match any of several tags.
    #[serde(default)]
    pub tags: Vec<String>,
    pub author: Option<i32>,
    pub is_favorited: Option<String>,
    pub is_in_shopping_cart: Option<String>,
}

/// Recipe as returned by read endpoints, annotated for the viewer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeView {
    pub id: i32,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredient>,
    pub is_favorited: bool,
    pub is_in_shopping_cart: bool,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeView {
    fn new(annotated: AnnotatedRecipe, author: UserView) -> Self {
        let AnnotatedRecipe {
            recipe,
            is_favorited,
            is_in_shopping_cart,
        } = annotated;

        Self {
            id: recipe.id,
            tags: recipe.tags,
            author,
            ingredients: recipe.ingredients,
            is_favorited,
            is_in_shopping_cart,
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Recipe as returned by create and update.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RecipeWriteView {
    pub id: i32,
    pub tags: Vec<Tag>,
    pub author: UserView,
    pub ingredients: Vec<RecipeIngredient>,
    pub name: String,
    pub image: String,
    pub text: String,
    pub cooking_time: i32,
}

impl RecipeWriteView {
    fn new(recipe: Recipe, author: &User) -> Self {
        Self {
            id: recipe.id,
            tags: recipe.tags,
            author: UserView::new(author.clone(), false),
            ingredients: recipe.ingredients,
            name: recipe.name,
            image: recipe.image,
            text: recipe.text,
            cooking_time: recipe.cooking_time,
        }
    }
}

/// Parses a boolean filter flag given as `1`, `true`, `0` or `false`.
pub fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

fn flag_param(name: &str, value: Option<&str>) -> ServiceResult<Option<bool>> {
    match value {
        None => Ok(None),
        Some(raw) => parse_flag(raw)
            .map(Some)
            .ok_or_else(|| ServiceError::Form(format!("`{name}` must be one of 1, true, 0, false"))),
    }
}

/// Lists recipes matching the query, newest first.
pub fn list_recipes<R>(
    repo: &R,
    viewer: Option<&User>,
    query: RecipesQuery,
) -> ServiceResult<ListPage<RecipeView>>
where
    R: RecipeReader + UserReader + RelationReader + ?Sized,
{
    let (page, per_page) = page_params(query.page, query.limit);

    let mut list_query = RecipeListQuery::new(viewer.map(|user| user.id))
        .tags(query.tags.iter().map(|slug| slug.trim()).filter(|slug| !slug.is_empty()))
        .paginate(page, per_page);

    if let Some(author_id) = query.author {
        list_query = list_query.author(author_id);
    }
    if let Some(flag) = flag_param("is_favorited", query.is_favorited.as_deref())? {
        list_query = list_query.favorited(flag);
    }
    if let Some(flag) = flag_param("is_in_shopping_cart", query.is_in_shopping_cart.as_deref())? {
        list_query = list_query.in_shopping_cart(flag);
    }

    let (total, recipes) = repo.list_recipes(list_query)?;
    let views = attach_authors(repo, viewer, recipes)?;

    Ok(ListPage::new(views, total, page, per_page))
}

pub fn get_recipe<R>(repo: &R, viewer: Option<&User>, recipe_id: i32) -> ServiceResult<RecipeView>
where
    R: RecipeReader + UserReader + RelationReader + ?Sized,
{
    let recipe = repo
        .get_recipe_by_id(recipe_id, viewer.map(|user| user.id))?
        .ok_or(ServiceError::NotFound)?;

    attach_authors(repo, viewer, vec![recipe])?
        .pop()
        .ok_or(ServiceError::NotFound)
}

/// Publishes a recipe authored by `author`.
pub fn create_recipe<R, S>(
    repo: &R,
    store: &S,
    author: &User,
    form: CreateRecipeForm,
) -> ServiceResult<RecipeWriteView>
where
    R: RecipeWriter + IngredientReader + TagReader + ?Sized,
    S: ImageStore + ?Sized,
{
    let submission = form
        .into_submission(author.id)
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let mut new_recipe = submission.recipe;
    ensure_references_exist(
        repo,
        Some(new_recipe.ingredients.as_slice()),
        Some(new_recipe.tag_ids.as_slice()),
    )?;

    new_recipe.image = store_image(store, &submission.image)?;

    let created = match repo.create_recipe(&new_recipe) {
        Ok(recipe) => recipe,
        Err(err) => {
            discard_image(store, &new_recipe.image);
            return Err(err.into());
        }
    };

    log::info!("User {} published recipe {}", author.id, created.id);

    Ok(RecipeWriteView::new(created, author))
}

/// Applies a partial update to a recipe owned by `user`.
pub fn update_recipe<R, S>(
    repo: &R,
    store: &S,
    user: &User,
    recipe_id: i32,
    form: EditRecipeForm,
) -> ServiceResult<RecipeWriteView>
where
    R: RecipeReader + RecipeWriter + IngredientReader + TagReader + ?Sized,
    S: ImageStore + ?Sized,
{
    let existing = load_owned_recipe(repo, user, recipe_id)?;

    let submission = form
        .into_submission()
        .map_err(|err| ServiceError::Form(err.to_string()))?;

    let mut update = submission.update;
    ensure_references_exist(repo, update.ingredients.as_deref(), update.tag_ids.as_deref())?;

    if let Some(image) = submission.image.as_ref() {
        update.image = Some(store_image(store, image)?);
    }

    let updated = match repo.update_recipe(recipe_id, &update) {
        Ok(recipe) => recipe,
        Err(err) => {
            if let Some(url) = update.image.as_deref() {
                discard_image(store, url);
            }
            return Err(err.into());
        }
    };

    if update.image.is_some() {
        discard_image(store, &existing.image);
    }

    Ok(RecipeWriteView::new(updated, user))
}

/// Deletes a recipe owned by `user` together with its image.
pub fn delete_recipe<R, S>(repo: &R, store: &S, user: &User, recipe_id: i32) -> ServiceResult<()>
where
    R: RecipeReader + RecipeWriter + ?Sized,
    S: ImageStore + ?Sized,
{
    let existing = load_owned_recipe(repo, user, recipe_id)?;

    repo.delete_recipe(recipe_id)?;
    discard_image(store, &existing.image);

    log::info!("User {} deleted recipe {}", user.id, recipe_id);

    Ok(())
}

fn load_owned_recipe<R>(repo: &R, user: &User, recipe_id: i32) -> ServiceResult<Recipe>
where
    R: RecipeReader + ?Sized,
{
    let recipe = repo
        .get_recipe_by_id(recipe_id, None)?
        .ok_or(ServiceError::NotFound)?
        .recipe;

    if recipe.author_id != user.id {
        return Err(ServiceError::Forbidden);
    }

    Ok(recipe)
}

/// Rejects payloads referencing ingredients or tags that do not exist.
fn ensure_references_exist<R>(
    repo: &R,
    ingredients: Option<&[NewRecipeIngredient]>,
    tag_ids: Option<&[i32]>,
) -> ServiceResult<()>
where
    R: IngredientReader + TagReader + ?Sized,
{
    if let Some(ingredients) = ingredients.filter(|items| !items.is_empty()) {
        let requested: Vec<i32> = ingredients.iter().map(|item| item.ingredient_id).collect();
        let found: HashSet<i32> = repo
            .get_ingredients_by_ids(&requested)?
            .into_iter()
            .map(|ingredient| ingredient.id)
            .collect();
        let missing = missing_ids(&requested, &found);
        if !missing.is_empty() {
            return Err(ServiceError::Form(format!("unknown ingredients: {missing}")));
        }
    }

    if let Some(tag_ids) = tag_ids.filter(|ids| !ids.is_empty()) {
        let found: HashSet<i32> = repo
            .get_tags_by_ids(tag_ids)?
            .into_iter()
            .map(|tag| tag.id)
            .collect();
        let missing = missing_ids(tag_ids, &found);
        if !missing.is_empty() {
            return Err(ServiceError::Form(format!("unknown tags: {missing}")));
        }
    }

    Ok(())
}

fn missing_ids(requested: &[i32], found: &HashSet<i32>) -> String {
    requested
        .iter()
        .filter(|id| !found.contains(*id))
        .map(i32::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

fn store_image<S>(store: &S, image: &ImageUpload) -> ServiceResult<String>
where
    S: ImageStore + ?Sized,
{
    store
        .save_image(&image.bytes, &image.extension)
        .map_err(|err| ServiceError::Internal(err.to_string()))
}

fn discard_image<S>(store: &S, url: &str)
where
    S: ImageStore + ?Sized,
{
    if let Err(err) = store.delete_image(url) {
        log::error!("Failed to delete image {url}: {err}");
    }
}

/// Resolves authors of a page of recipes with one user and one subscription lookup.
fn attach_authors<R>(
    repo: &R,
    viewer: Option<&User>,
    recipes: Vec<AnnotatedRecipe>,
) -> ServiceResult<Vec<RecipeView>>
where
    R: UserReader + RelationReader + ?Sized,
{
    let mut author_ids: Vec<i32> = recipes.iter().map(|item| item.recipe.author_id).collect();
    author_ids.sort_unstable();
    author_ids.dedup();

    let authors: HashMap<i32, User> = repo
        .get_users_by_ids(&author_ids)?
        .into_iter()
        .map(|user| (user.id, user))
        .collect();
    let subscribed = subscribed_ids(repo, viewer, &author_ids)?;

    recipes
        .into_iter()
        .map(|item| {
            let author_id = item.recipe.author_id;
            let author = authors
                .get(&author_id)
                .cloned()
                .ok_or_else(|| ServiceError::Internal(format!("author {author_id} is missing")))?;
            let author = UserView::new(author, subscribed.contains(&author_id));
            Ok(RecipeView::new(item, author))
        })
        .collect()
}
