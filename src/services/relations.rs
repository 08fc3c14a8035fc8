use crate::domain::recipe::RecipeSummary;
use crate::domain::relation::RelationKind;
use crate::domain::user::User;
use crate::repository::{RecipeReader, RelationWriter, UserReader};
use crate::services::users::{AuthorView, load_author_view};
use crate::services::{ServiceError, ServiceResult};

const SELF_SUBSCRIPTION_MESSAGE: &str = "cannot subscribe to yourself";

pub fn add_favorite<R>(repo: &R, user: &User, recipe_id: i32) -> ServiceResult<RecipeSummary>
where
    R: RecipeReader + RelationWriter + ?Sized,
{
    add_recipe_relation(repo, RelationKind::Favorite, user, recipe_id)
}

pub fn remove_favorite<R>(repo: &R, user: &User, recipe_id: i32) -> ServiceResult<()>
where
    R: RecipeReader + RelationWriter + ?Sized,
{
    remove_recipe_relation(repo, RelationKind::Favorite, user, recipe_id)
}

pub fn add_to_shopping_cart<R>(
    repo: &R,
    user: &User,
    recipe_id: i32,
) -> ServiceResult<RecipeSummary>
where
    R: RecipeReader + RelationWriter + ?Sized,
{
    add_recipe_relation(repo, RelationKind::ShoppingCart, user, recipe_id)
}

pub fn remove_from_shopping_cart<R>(repo: &R, user: &User, recipe_id: i32) -> ServiceResult<()>
where
    R: RecipeReader + RelationWriter + ?Sized,
{
    remove_recipe_relation(repo, RelationKind::ShoppingCart, user, recipe_id)
}

/// Follows `author_id` and returns the author with a preview of their recipes.
pub fn subscribe<R>(
    repo: &R,
    user: &User,
    author_id: i32,
    recipes_limit: Option<usize>,
) -> ServiceResult<AuthorView>
where
    R: UserReader + RecipeReader + RelationWriter + ?Sized,
{
    if author_id == user.id {
        return Err(ServiceError::Conflict(SELF_SUBSCRIPTION_MESSAGE.to_string()));
    }

    let author = repo
        .get_user_by_id(author_id)?
        .ok_or(ServiceError::NotFound)?;

    toggle(repo, RelationKind::Subscription, user.id, author.id, true)?;

    load_author_view(repo, author, true, recipes_limit)
}

pub fn unsubscribe<R>(repo: &R, user: &User, author_id: i32) -> ServiceResult<()>
where
    R: UserReader + RelationWriter + ?Sized,
{
    repo.get_user_by_id(author_id)?
        .ok_or(ServiceError::NotFound)?;

    toggle(repo, RelationKind::Subscription, user.id, author_id, false)
}

fn add_recipe_relation<R>(
    repo: &R,
    kind: RelationKind,
    user: &User,
    recipe_id: i32,
) -> ServiceResult<RecipeSummary>
where
    R: RecipeReader + RelationWriter + ?Sized,
{
    let recipe = repo
        .get_recipe_by_id(recipe_id, None)?
        .ok_or(ServiceError::NotFound)?;

    toggle(repo, kind, user.id, recipe_id, true)?;

    Ok(RecipeSummary::from(&recipe.recipe))
}

fn remove_recipe_relation<R>(
    repo: &R,
    kind: RelationKind,
    user: &User,
    recipe_id: i32,
) -> ServiceResult<()>
where
    R: RecipeReader + RelationWriter + ?Sized,
{
    repo.get_recipe_by_id(recipe_id, None)?
        .ok_or(ServiceError::NotFound)?;

    toggle(repo, kind, user.id, recipe_id, false)
}

/// Adds or removes one relation row, turning a no-op into a conflict.
fn toggle<R>(
    repo: &R,
    kind: RelationKind,
    actor_id: i32,
    target_id: i32,
    add: bool,
) -> ServiceResult<()>
where
    R: RelationWriter + ?Sized,
{
    let changed = if add {
        repo.add_relation(kind, actor_id, target_id)?
    } else {
        repo.remove_relation(kind, actor_id, target_id)?
    };

    match (changed, add) {
        (true, _) => Ok(()),
        (false, true) => Err(ServiceError::Conflict(
            kind.already_present_message().to_string(),
        )),
        (false, false) => Err(ServiceError::Conflict(kind.not_present_message().to_string())),
    }
}
