use actix_web::{HttpResponse, Responder, delete, get, patch, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::forms::tags::{AddTagForm, EditTagForm};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::tags;

#[get("/tags")]
pub async fn list_tags(repo: web::Data<DieselRepository>) -> impl Responder {
    match tags::list_tags(repo.get_ref()) {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(err) => error_response(err),
    }
}

#[get("/tags/{tag_id}")]
pub async fn get_tag(tag_id: web::Path<i32>, repo: web::Data<DieselRepository>) -> impl Responder {
    match tags::get_tag(repo.get_ref(), tag_id.into_inner()) {
        Ok(tag) => HttpResponse::Ok().json(tag),
        Err(err) => error_response(err),
    }
}

#[post("/tags")]
pub async fn create_tag(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddTagForm>,
) -> impl Responder {
    match tags::create_tag(repo.get_ref(), &user, form.into_inner()) {
        Ok(tag) => HttpResponse::Created().json(tag),
        Err(err) => error_response(err),
    }
}

#[patch("/tags/{tag_id}")]
pub async fn update_tag(
    tag_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<EditTagForm>,
) -> impl Responder {
    match tags::update_tag(repo.get_ref(), &user, tag_id.into_inner(), form.into_inner()) {
        Ok(tag) => HttpResponse::Ok().json(tag),
        Err(err) => error_response(err),
    }
}

#[delete("/tags/{tag_id}")]
pub async fn delete_tag(
    tag_id: web::Path<i32>,
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match tags::delete_tag(repo.get_ref(), &user, tag_id.into_inner()) {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
