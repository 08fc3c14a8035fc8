use actix_web::{HttpResponse, Responder, delete, get, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde::Deserialize;

use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::users::{
    self, SubscriptionsQuery, UsersQuery, ensure_user, resolve_viewer,
};
use crate::services::relations;

/// Query parameters accepted by the subscribe endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct SubscribeQuery {
    pub recipes_limit: Option<usize>,
}

#[get("/users")]
pub async fn list_users(
    params: web::Query<UsersQuery>,
    identity: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = resolve_viewer(repo.get_ref(), identity.as_ref())
        .and_then(|viewer| users::list_users(repo.get_ref(), viewer.as_ref(), params.into_inner()));

    match result {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err),
    }
}

#[get("/users/me")]
pub async fn me(identity: AuthenticatedUser, repo: web::Data<DieselRepository>) -> impl Responder {
    match ensure_user(repo.get_ref(), &identity) {
        Ok(user) => HttpResponse::Ok().json(users::me(&user)),
        Err(err) => error_response(err),
    }
}

#[get("/users/subscriptions")]
/// Authors followed by the caller with their recipe previews.
pub async fn list_subscriptions(
    params: web::Query<SubscriptionsQuery>,
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity)
        .and_then(|user| users::list_subscriptions(repo.get_ref(), &user, params.into_inner()));

    match result {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err),
    }
}

#[get("/users/{user_id}")]
pub async fn get_user(
    user_id: web::Path<i32>,
    identity: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = resolve_viewer(repo.get_ref(), identity.as_ref()).and_then(|viewer| {
        users::get_user(repo.get_ref(), viewer.as_ref(), user_id.into_inner())
    });

    match result {
        Ok(user) => HttpResponse::Ok().json(user),
        Err(err) => error_response(err),
    }
}

#[post("/users/{user_id}/subscribe")]
pub async fn subscribe(
    user_id: web::Path<i32>,
    params: web::Query<SubscribeQuery>,
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity).and_then(|user| {
        relations::subscribe(
            repo.get_ref(),
            &user,
            user_id.into_inner(),
            params.recipes_limit,
        )
    });

    match result {
        Ok(author) => HttpResponse::Created().json(author),
        Err(err) => error_response(err),
    }
}

#[delete("/users/{user_id}/subscribe")]
pub async fn unsubscribe(
    user_id: web::Path<i32>,
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity)
        .and_then(|user| relations::unsubscribe(repo.get_ref(), &user, user_id.into_inner()));

    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
