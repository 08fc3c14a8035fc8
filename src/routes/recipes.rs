use actix_web::http::header::{ContentDisposition, DispositionParam, DispositionType};
use actix_web::{HttpRequest, HttpResponse, Responder, delete, get, patch, post, web};
use pushkind_common::domain::auth::AuthenticatedUser;

use crate::domain::shopping_list::SHOPPING_LIST_FILENAME;
use crate::forms::recipes::{CreateRecipeForm, EditRecipeForm};
use crate::repository::DieselRepository;
use crate::routes::{bad_request, error_response};
use crate::services::users::{ensure_user, resolve_viewer};
use crate::services::recipes::{self, RecipesQuery};
use crate::services::{relations, shopping_list};
use crate::storage::LocalImageStore;

#[get("/recipes")]
/// Lists recipes; `tags` may be repeated to match any of several slugs.
pub async fn list_recipes(
    req: HttpRequest,
    identity: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let query: RecipesQuery = match serde_html_form::from_str(req.query_string()) {
        Ok(query) => query,
        Err(err) => return bad_request(&err.to_string()),
    };

    let result = resolve_viewer(repo.get_ref(), identity.as_ref())
        .and_then(|viewer| recipes::list_recipes(repo.get_ref(), viewer.as_ref(), query));

    match result {
        Ok(page) => HttpResponse::Ok().json(page),
        Err(err) => error_response(err),
    }
}

#[post("/recipes")]
pub async fn create_recipe(
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    store: web::Data<LocalImageStore>,
    form: web::Json<CreateRecipeForm>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity).and_then(|user| {
        recipes::create_recipe(repo.get_ref(), store.get_ref(), &user, form.into_inner())
    });

    match result {
        Ok(recipe) => HttpResponse::Created().json(recipe),
        Err(err) => error_response(err),
    }
}

#[get("/recipes/download_shopping_cart")]
/// Sends the aggregated shopping list as a text attachment.
pub async fn download_shopping_cart(
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity)
        .and_then(|user| shopping_list::download_shopping_list(repo.get_ref(), &user));

    match result {
        Ok(text) => HttpResponse::Ok()
            .content_type("text/plain; charset=utf-8")
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(
                    SHOPPING_LIST_FILENAME.to_string(),
                )],
            })
            .body(text),
        Err(err) => error_response(err),
    }
}

#[get("/recipes/{recipe_id}")]
pub async fn get_recipe(
    recipe_id: web::Path<i32>,
    identity: Option<AuthenticatedUser>,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = resolve_viewer(repo.get_ref(), identity.as_ref()).and_then(|viewer| {
        recipes::get_recipe(repo.get_ref(), viewer.as_ref(), recipe_id.into_inner())
    });

    match result {
        Ok(recipe) => HttpResponse::Ok().json(recipe),
        Err(err) => error_response(err),
    }
}

#[patch("/recipes/{recipe_id}")]
pub async fn update_recipe(
    recipe_id: web::Path<i32>,
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    store: web::Data<LocalImageStore>,
    form: web::Json<EditRecipeForm>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity).and_then(|user| {
        recipes::update_recipe(
            repo.get_ref(),
            store.get_ref(),
            &user,
            recipe_id.into_inner(),
            form.into_inner(),
        )
    });

    match result {
        Ok(recipe) => HttpResponse::Ok().json(recipe),
        Err(err) => error_response(err),
    }
}

#[delete("/recipes/{recipe_id}")]
pub async fn delete_recipe(
    recipe_id: web::Path<i32>,
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
    store: web::Data<LocalImageStore>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity).and_then(|user| {
        recipes::delete_recipe(repo.get_ref(), store.get_ref(), &user, recipe_id.into_inner())
    });

    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

#[post("/recipes/{recipe_id}/favorite")]
pub async fn add_favorite(
    recipe_id: web::Path<i32>,
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity)
        .and_then(|user| relations::add_favorite(repo.get_ref(), &user, recipe_id.into_inner()));

    match result {
        Ok(summary) => HttpResponse::Created().json(summary),
        Err(err) => error_response(err),
    }
}

#[delete("/recipes/{recipe_id}/favorite")]
pub async fn remove_favorite(
    recipe_id: web::Path<i32>,
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity).and_then(|user| {
        relations::remove_favorite(repo.get_ref(), &user, recipe_id.into_inner())
    });

    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}

#[post("/recipes/{recipe_id}/shopping_cart")]
pub async fn add_to_shopping_cart(
    recipe_id: web::Path<i32>,
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity).and_then(|user| {
        relations::add_to_shopping_cart(repo.get_ref(), &user, recipe_id.into_inner())
    });

    match result {
        Ok(summary) => HttpResponse::Created().json(summary),
        Err(err) => error_response(err),
    }
}

#[delete("/recipes/{recipe_id}/shopping_cart")]
pub async fn remove_from_shopping_cart(
    recipe_id: web::Path<i32>,
    identity: AuthenticatedUser,
    repo: web::Data<DieselRepository>,
) -> impl Responder {
    let result = ensure_user(repo.get_ref(), &identity).and_then(|user| {
        relations::remove_from_shopping_cart(repo.get_ref(), &user, recipe_id.into_inner())
    });

    match result {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => error_response(err),
    }
}
