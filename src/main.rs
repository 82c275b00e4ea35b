// src/main.rs

use std::io;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use shopfront::config::AppConfig;
use shopfront::shared::db;
use shopfront::shared::spa_fallback::storefront_files;
use shopfront::users::token::TokenSigner;
use shopfront::{configure_api, AppState};

#[actix_web::main]
async fn main() -> io::Result<()> {
    // A missing .env is fine; the environment may already be populated
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "shopfront=info,actix_web=info".into());
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let db_pool = db::create_pool(&config.database);
    match db::ping(&db_pool).await {
        Ok(()) => {
            tracing::info!(host = %config.database.host, database = %config.database.name, "Database connected");
            if let Err(e) = db::run_migrations(&db_pool).await {
                tracing::error!(error = %e, "Database migrations failed");
            }
        }
        Err(e) => {
            tracing::error!(error = %e, "Database connection failed; check DB_* settings and that the server is running");
        }
    }

    let state = web::Data::new(AppState {
        db_pool,
        tokens: TokenSigner::new(&config.jwt_secret, config.token_ttl_secs),
    });
    let static_dir = config.static_dir.clone();

    tracing::info!(
        host = %config.host,
        port = config.port,
        token_ttl_secs = state.tokens.ttl_secs(),
        "Starting storefront API"
    );

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(Logger::default())
            .wrap(Cors::permissive())
            .configure(configure_api)
            .service(storefront_files(&static_dir))
    })
    .bind((config.host, config.port))?
    .run()
    .await
}
