use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, Responder, get, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;
use serde_json::json;

use crate::forms::ingredients::{AddIngredientForm, UploadIngredientsForm};
use crate::repository::DieselRepository;
use crate::routes::error_response;
use crate::services::ingredients::{self, IngredientsQuery};

#[get("/ingredients")]
/// Lists ingredients, optionally narrowed by a `name` prefix.
pub async fn list_ingredients(
    params: web::Query<IngredientsQuery>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match ingredients::list_ingredients(repo.get_ref(), params.into_inner()) {
        Ok(items) => HttpResponse::Ok().json(items),
        Err(err) => error_response(err),
    }
}

#[get("/ingredients/{ingredient_id}")]
pub async fn get_ingredient(
    ingredient_id: web::Path<i32>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    match ingredients::get_ingredient(repo.get_ref(), ingredient_id.into_inner()) {
        Ok(ingredient) => HttpResponse::Ok().json(ingredient),
        Err(err) => error_response(err),
    }
}

#[post("/ingredients")]
pub async fn create_ingredient(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    form: web::Json<AddIngredientForm>,
) -> impl Responder {
    match ingredients::create_ingredient(repo.get_ref(), &user, form.into_inner()) {
        Ok(created) => HttpResponse::Created().json(json!({ "created": created })),
        Err(err) => error_response(err),
    }
}

#[post("/ingredients/upload")]
pub async fn upload_ingredients(
    user: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    MultipartForm(form): MultipartForm<UploadIngredientsForm>,
) -> impl Responder {
    match ingredients::import_ingredients(repo.get_ref(), &user, form) {
        Ok(created) => HttpResponse::Created().json(json!({ "created": created })),
        Err(err) => error_response(err),
    }
}
