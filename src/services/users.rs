use std::collections::{HashMap, HashSet};

use pushkind_common::domain::auth::AuthenticatedUser;
use serde::{Deserialize, Serialize};

use crate::domain::recipe::RecipeSummary;
use crate::domain::relation::RelationKind;
use crate::domain::user::{NewUser, User, UserListQuery};
use crate::repository::{RecipeReader, RelationReader, UserReader, UserWriter};
use crate::services::{ListPage, ServiceError, ServiceResult, page_params};

/// Query parameters accepted by the user listing.
#[derive(Debug, Default, Deserialize)]
pub struct UsersQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Query parameters accepted by the subscriptions listing.
#[derive(Debug, Default, Deserialize)]
pub struct SubscriptionsQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    /// Maximum number of recipe previews per author.
    pub recipes_limit: Option<usize>,
}

/// Public representation of a user as seen by the viewer.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct UserView {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub is_subscribed: bool,
}

impl UserView {
    pub fn new(user: User, is_subscribed: bool) -> Self {
        Self {
            id: user.id,
            email: user.email,
            username: user.username,
            first_name: user.first_name,
            last_name: user.last_name,
            is_subscribed,
        }
    }
}

/// User view extended with a preview of the author's recipes.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct AuthorView {
    #[serde(flatten)]
    pub user: UserView,
    pub recipes: Vec<RecipeSummary>,
    pub recipes_count: usize,
}

/// Returns the local profile for an identity, creating it on first sight.
pub fn ensure_user<R>(repo: &R, identity: &AuthenticatedUser) -> ServiceResult<User>
where
    R: UserReader + UserWriter + ?Sized,
{
    let new_user = NewUser::from(identity);

    if let Some(user) = repo.get_user_by_email(&new_user.email)? {
        return Ok(user);
    }

    match repo.create_user(&new_user) {
        Ok(user) => {
            log::info!("Provisioned user {} for {}", user.id, user.email);
            Ok(user)
        }
        Err(err) => {
            // a concurrent request may have provisioned the same identity
            repo.get_user_by_email(&new_user.email)?
                .ok_or_else(|| ServiceError::from(err))
        }
    }
}

/// Resolves the optional identity of a request into a local user.
pub fn resolve_viewer<R>(
    repo: &R,
    identity: Option<&AuthenticatedUser>,
) -> ServiceResult<Option<User>>
where
    R: UserReader + UserWriter + ?Sized,
{
    identity.map(|identity| ensure_user(repo, identity)).transpose()
}

/// Lists users with subscription flags computed for the viewer.
pub fn list_users<R>(
    repo: &R,
    viewer: Option<&User>,
    query: UsersQuery,
) -> ServiceResult<ListPage<UserView>>
where
    R: UserReader + RelationReader + ?Sized,
{
    let (page, per_page) = page_params(query.page, query.limit);

    let (total, users) = repo.list_users(UserListQuery::new().paginate(page, per_page))?;
    let ids: Vec<i32> = users.iter().map(|user| user.id).collect();
    let subscribed = subscribed_ids(repo, viewer, &ids)?;

    let items = users
        .into_iter()
        .map(|user| {
            let is_subscribed = subscribed.contains(&user.id);
            UserView::new(user, is_subscribed)
        })
        .collect();

    Ok(ListPage::new(items, total, page, per_page))
}

pub fn get_user<R>(repo: &R, viewer: Option<&User>, user_id: i32) -> ServiceResult<UserView>
where
    R: UserReader + RelationReader + ?Sized,
{
    let user = repo.get_user_by_id(user_id)?.ok_or(ServiceError::NotFound)?;
    let subscribed = subscribed_ids(repo, viewer, &[user.id])?;
    let is_subscribed = subscribed.contains(&user.id);

    Ok(UserView::new(user, is_subscribed))
}

/// Profile of the requesting user. Nobody is subscribed to themselves.
pub fn me(user: &User) -> UserView {
    UserView::new(user.clone(), false)
}

/// Authors the viewer follows, each with a preview of their recipes.
pub fn list_subscriptions<R>(
    repo: &R,
    viewer: &User,
    query: SubscriptionsQuery,
) -> ServiceResult<ListPage<AuthorView>>
where
    R: UserReader + RecipeReader + ?Sized,
{
    let (page, per_page) = page_params(query.page, query.limit);

    let (total, authors) = repo.list_users(
        UserListQuery::new()
            .subscribed_by(viewer.id)
            .paginate(page, per_page),
    )?;

    let ids: Vec<i32> = authors.iter().map(|author| author.id).collect();
    let mut recipes = group_summaries(repo.list_recipe_summaries(&ids)?);

    let items = authors
        .into_iter()
        .map(|author| {
            let summaries = recipes.remove(&author.id).unwrap_or_default();
            author_view(author, true, summaries, query.recipes_limit)
        })
        .collect();

    Ok(ListPage::new(items, total, page, per_page))
}

/// Builds the extended representation of a single author.
pub fn load_author_view<R>(
    repo: &R,
    author: User,
    is_subscribed: bool,
    recipes_limit: Option<usize>,
) -> ServiceResult<AuthorView>
where
    R: RecipeReader + ?Sized,
{
    let summaries = repo.list_recipe_summaries(&[author.id])?;
    Ok(author_view(author, is_subscribed, summaries, recipes_limit))
}

/// Ids among `user_ids` the viewer is subscribed to; empty for anonymous viewers.
pub(crate) fn subscribed_ids<R>(
    repo: &R,
    viewer: Option<&User>,
    user_ids: &[i32],
) -> ServiceResult<HashSet<i32>>
where
    R: RelationReader + ?Sized,
{
    match viewer {
        Some(viewer) if !user_ids.is_empty() => {
            Ok(repo.related_target_ids(RelationKind::Subscription, viewer.id, user_ids)?)
        }
        _ => Ok(HashSet::new()),
    }
}

fn author_view(
    author: User,
    is_subscribed: bool,
    mut summaries: Vec<RecipeSummary>,
    recipes_limit: Option<usize>,
) -> AuthorView {
    let recipes_count = summaries.len();
    if let Some(limit) = recipes_limit {
        summaries.truncate(limit);
    }

    AuthorView {
        user: UserView::new(author, is_subscribed),
        recipes: summaries,
        recipes_count,
    }
}

fn group_summaries(summaries: Vec<RecipeSummary>) -> HashMap<i32, Vec<RecipeSummary>> {
    let mut grouped: HashMap<i32, Vec<RecipeSummary>> = HashMap::new();
    for summary in summaries {
        grouped.entry(summary.author_id).or_default().push(summary);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::mock::FakeRepo;
    use crate::services::test_support::{identity, user};
    use pushkind_common::repository::errors::RepositoryError;

    fn summary(id: i32, author_id: i32) -> RecipeSummary {
        RecipeSummary {
            id,
            author_id,
            name: format!("Recipe {id}"),
            image: format!("/media/recipes/{id}.png"),
            cooking_time: 10,
        }
    }

    #[test]
    fn ensure_user_returns_existing_profile() {
        let mut repo = FakeRepo::new();
        repo.users
            .expect_get_user_by_email()
            .withf(|email| email == "cook@example.com")
            .returning(|_| Ok(Some(user(4, "cook"))));
        repo.user_writer.expect_create_user().never();

        let resolved = ensure_user(&repo, &identity(&[])).expect("user");

        assert_eq!(resolved.id, 4);
    }

    #[test]
    fn ensure_user_provisions_missing_profile() {
        let mut repo = FakeRepo::new();
        repo.users
            .expect_get_user_by_email()
            .returning(|_| Ok(None));
        repo.user_writer
            .expect_create_user()
            .withf(|new_user| {
                new_user.username == "cook"
                    && new_user.first_name == "Julia"
                    && new_user.last_name == "Child"
            })
            .returning(|_| Ok(user(9, "cook")));

        let resolved = ensure_user(&repo, &identity(&[])).expect("user");

        assert_eq!(resolved.id, 9);
    }

    #[test]
    fn ensure_user_propagates_failure_without_profile() {
        let mut repo = FakeRepo::new();
        repo.users
            .expect_get_user_by_email()
            .times(2)
            .returning(|_| Ok(None));
        repo.user_writer
            .expect_create_user()
            .returning(|_| Err(RepositoryError::NotFound));

        let result = ensure_user(&repo, &identity(&[]));

        assert!(matches!(result, Err(ServiceError::NotFound)));
    }

    #[test]
    fn list_users_flags_subscriptions_for_viewer() {
        let mut repo = FakeRepo::new();
        repo.users
            .expect_list_users()
            .returning(|_| Ok((2, vec![user(2, "anna"), user(3, "boris")])));
        repo.relations
            .expect_related_target_ids()
            .withf(|kind, actor, targets| {
                *kind == RelationKind::Subscription && *actor == 1 && targets.to_vec() == vec![2, 3]
            })
            .returning(|_, _, _| Ok(HashSet::from([3])));

        let viewer = user(1, "viewer");
        let page = list_users(&repo, Some(&viewer), UsersQuery::default()).expect("page");

        assert_eq!(page.count, 2);
        assert!(!page.results[0].is_subscribed);
        assert!(page.results[1].is_subscribed);
    }

    #[test]
    fn get_user_skips_lookup_for_anonymous_viewer() {
        let mut repo = FakeRepo::new();
        repo.users
            .expect_get_user_by_id()
            .returning(|id| Ok(Some(user(id, "anna"))));
        repo.relations.expect_related_target_ids().never();

        let view = get_user(&repo, None, 2).expect("view");

        assert_eq!(view.id, 2);
        assert!(!view.is_subscribed);
    }

    #[test]
    fn get_user_reports_missing_user() {
        let mut repo = FakeRepo::new();
        repo.users.expect_get_user_by_id().returning(|_| Ok(None));

        assert!(matches!(
            get_user(&repo, None, 42),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn list_subscriptions_limits_previews_but_counts_all() {
        let mut repo = FakeRepo::new();
        repo.users
            .expect_list_users()
            .withf(|query| query.subscribed_by == Some(1))
            .returning(|_| Ok((1, vec![user(2, "anna")])));
        repo.recipes
            .expect_list_recipe_summaries()
            .returning(|_| Ok(vec![summary(12, 2), summary(11, 2), summary(10, 2)]));

        let viewer = user(1, "viewer");
        let query = SubscriptionsQuery {
            recipes_limit: Some(2),
            ..SubscriptionsQuery::default()
        };
        let page = list_subscriptions(&repo, &viewer, query).expect("page");

        let value = serde_json::to_value(&page).expect("serialize");
        let author = &value["results"][0];
        assert_eq!(author["username"], "anna");
        assert_eq!(author["is_subscribed"], true);
        assert_eq!(author["recipes_count"], 3);
        assert_eq!(author["recipes"].as_array().map(Vec::len), Some(2));
        assert!(author["recipes"][0].get("author_id").is_none());
    }
}
