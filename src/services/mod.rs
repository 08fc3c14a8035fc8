use pushkind_common::domain::auth::AuthenticatedUser;
use pushkind_common::pagination::DEFAULT_ITEMS_PER_PAGE;
use pushkind_common::repository::errors::RepositoryError;
use pushkind_common::routes::check_role;
use serde::Serialize;
use thiserror::Error;

use crate::SERVICE_ACCESS_ROLE;

pub mod ingredients;
pub mod recipes;
pub mod relations;
pub mod shopping_list;
pub mod tags;
pub mod users;

/// Errors surfaced by the service layer and mapped onto HTTP responses.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthorized,
    #[error("not allowed")]
    Forbidden,
    #[error("not found")]
    NotFound,
    /// Invalid client payload.
    #[error("{0}")]
    Form(String),
    /// Request clashes with the current state, e.g. a duplicate favorite.
    #[error("{0}")]
    Conflict(String),
    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServiceResult<T> = Result<T, ServiceError>;

impl From<RepositoryError> for ServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound => ServiceError::NotFound,
            other => ServiceError::Internal(other.to_string()),
        }
    }
}

/// One page of a listing together with the total number of matches.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ListPage<T> {
    pub count: usize,
    pub page: usize,
    pub total_pages: usize,
    pub results: Vec<T>,
}

impl<T> ListPage<T> {
    pub fn new(results: Vec<T>, count: usize, page: usize, per_page: usize) -> Self {
        Self {
            count,
            page,
            total_pages: count.div_ceil(per_page.max(1)),
            results,
        }
    }
}

/// Largest page size a client may request.
pub const MAX_ITEMS_PER_PAGE: usize = 100;

/// Resolves 1-based `page` and `limit` query parameters with defaults.
pub(crate) fn page_params(page: Option<usize>, limit: Option<usize>) -> (usize, usize) {
    let page = page.unwrap_or(1).max(1);
    let per_page = limit
        .unwrap_or(DEFAULT_ITEMS_PER_PAGE)
        .clamp(1, MAX_ITEMS_PER_PAGE);
    (page, per_page)
}

/// Reference data is managed by holders of [`SERVICE_ACCESS_ROLE`].
pub(crate) fn ensure_admin(user: &AuthenticatedUser) -> ServiceResult<()> {
    if check_role(SERVICE_ACCESS_ROLE, &user.roles) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}
