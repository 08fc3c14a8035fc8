use crate::domain::shopping_list::{aggregate, render};
use crate::domain::user::User;
use crate::repository::ShoppingListReader;
use crate::services::ServiceResult;

/// Renders the user's aggregated shopping list as plain text.
pub fn download_shopping_list<R>(repo: &R, user: &User) -> ServiceResult<String>
where
    R: ShoppingListReader + ?Sized,
{
    let rows = repo.list_shopping_list_rows(user.id)?;
    Ok(render(&aggregate(rows)))
}
