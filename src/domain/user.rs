use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::Pagination;
use serde::{Deserialize, Serialize};

/// Local profile of a person known to the identity provider.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct User {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl NewUser {
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        username: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into().trim().to_lowercase(),
            username: username.into().trim().to_string(),
            first_name: first_name.into().trim().to_string(),
            last_name: last_name.into().trim().to_string(),
        }
    }
}

impl From<&AuthenticatedUser> for NewUser {
    fn from(value: &AuthenticatedUser) -> Self {
        let mut parts = value.name.trim().splitn(2, char::is_whitespace);
        let first_name = parts.next().unwrap_or_default();
        let last_name = parts.next().unwrap_or_default();
        NewUser::new(value.email.as_str(), value.sub.as_str(), first_name, last_name)
    }
}

/// Query definition used to list users.
#[derive(Debug, Clone, Default)]
pub struct UserListQuery {
    /// Only return authors followed by this subscriber.
    pub subscribed_by: Option<i32>,
    /// Optional pagination options applied to the query.
    pub pagination: Option<Pagination>,
}

impl UserListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the results to authors the given user is subscribed to.
    pub fn subscribed_by(mut self, user_id: i32) -> Self {
        self.subscribed_by = Some(user_id);
        self
    }

    /// Apply pagination to the query with the given page number and page size.
    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}
