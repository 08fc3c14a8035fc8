use std::env;

use actix_files::Files;
use actix_identity::IdentityMiddleware;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use pushkind_common::models::config::CommonServerConfig;

use foodgram::repository::DieselRepository;
use foodgram::routes::ingredients::{
    create_ingredient, get_ingredient, list_ingredients, upload_ingredients,
};
use foodgram::routes::json_config;
use foodgram::routes::recipes::{
    add_favorite, add_to_shopping_cart, create_recipe, delete_recipe, download_shopping_cart,
    get_recipe, list_recipes, remove_favorite, remove_from_shopping_cart, update_recipe,
};
use foodgram::routes::tags::{create_tag, delete_tag, get_tag, list_tags, update_tag};
use foodgram::routes::users::{
    get_user, list_subscriptions, list_users, me, subscribe, unsubscribe,
};
use foodgram::storage::LocalImageStore;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let database_url = env::var("DATABASE_URL").unwrap_or("app.db".to_string());
    let port = env::var("PORT").unwrap_or("8080".to_string());
    let port = port.parse::<u16>().unwrap_or(8080);
    let address = env::var("ADDRESS").unwrap_or("127.0.0.1".to_string());

    let secret = env::var("SECRET_KEY");
    let secret_key = match &secret {
        Ok(key) => Key::from(key.as_bytes()),
        Err(_) => Key::generate(),
    };

    let auth_service_url = match env::var("AUTH_SERVICE_URL") {
        Ok(auth_service_url) => auth_service_url,
        Err(_) => {
            log::error!("AUTH_SERVICE_URL environment variable not set");
            std::process::exit(1);
        }
    };

    let common_config = CommonServerConfig {
        secret: secret.unwrap_or_default(),
        auth_service_url,
    };

    let domain = env::var("DOMAIN").unwrap_or("localhost".to_string());
    let media_root = env::var("MEDIA_ROOT").unwrap_or("media".to_string());
    let media_url = env::var("MEDIA_URL").unwrap_or("/media".to_string());

    let pool = match establish_connection_pool(&database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);
    let image_store = LocalImageStore::new(&media_root, &media_url);

    log::info!("Serving media from {media_root} at {media_url}");

    HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{domain}")))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(Files::new(&media_url, &media_root))
            .service(
                web::scope("/api")
                    // static segments first so they are not taken for ids
                    .service(download_shopping_cart)
                    .service(list_recipes)
                    .service(create_recipe)
                    .service(get_recipe)
                    .service(update_recipe)
                    .service(delete_recipe)
                    .service(add_favorite)
                    .service(remove_favorite)
                    .service(add_to_shopping_cart)
                    .service(remove_from_shopping_cart)
                    .service(list_tags)
                    .service(get_tag)
                    .service(create_tag)
                    .service(update_tag)
                    .service(delete_tag)
                    .service(upload_ingredients)
                    .service(list_ingredients)
                    .service(get_ingredient)
                    .service(create_ingredient)
                    .service(me)
                    .service(list_subscriptions)
                    .service(list_users)
                    .service(get_user)
                    .service(subscribe)
                    .service(unsubscribe),
            )
            .app_data(json_config())
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(image_store.clone()))
            .app_data(web::Data::new(common_config.clone()))
    })
    .bind((address, port))?
    .run()
    .await
}
