#[macro_use]
extern crate log;
extern crate pretty_env_logger;

use actix_web::{web, App, HttpServer};
use dotenvy::dotenv;
use utoipa_actix_web::AppExt;

use pizzeria::auth::{AuthConfig, AuthLayer};
use pizzeria::{api, AppState};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = dotenv() {
        eprintln!("Failed to load .env file: {}", e);
    }

    // Setup logging
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    pretty_env_logger::init();

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let auth_cfg = AuthConfig::from_env();

    // Database Connection
    info!("Initializing database connection pool...");
    let state = AppState::new(&database_url, auth_cfg.clone());

    let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(8080);

    info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .into_utoipa_app()
            .map(|app| {
                app.wrap(AuthLayer::new(auth_cfg.clone())).app_data(
                    web::JsonConfig::default().error_handler(api::default_error_handler),
                )
            })
            .configure(|cfg| api::configure(cfg, &state))
            .into_app()
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}
