use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use feed_service::handlers;
use feed_service::middleware::JwtAuth;
use feed_service::realtime::{self, PostBroadcaster};
use feed_service::security::jwt::JwtKeys;
use feed_service::services::PostService;
use feed_service::Config;

async fn health_summary(pool: web::Data<sqlx::PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "feed-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "feed-service"
        })),
    }
}

async fn liveness_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"alive": true}))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting feed-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    let pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {}", e);
            eprintln!("ERROR: Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("migration failed: {e}")))?;

    tracing::info!("Connected to database, migrations applied");

    tokio::fs::create_dir_all(&config.media.upload_dir).await?;

    let jwt_keys = JwtKeys::from_secret(&config.auth.jwt_secret);
    let broadcaster = PostBroadcaster::new();
    let post_service = PostService::new(pool.clone(), broadcaster.clone());

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let pool_data = web::Data::new(pool);
    let config_data = web::Data::new(config.clone());
    let keys_data = web::Data::new(jwt_keys.clone());
    let broadcaster_data = web::Data::new(broadcaster);
    let service_data = web::Data::new(post_service);

    HttpServer::new(move || {
        // Build CORS configuration
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .app_data(keys_data.clone())
            .app_data(broadcaster_data.clone())
            .app_data(service_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/health", web::get().to(health_summary))
            .route("/health/live", web::get().to(liveness_check))
            .service(
                web::scope("/auth")
                    .route("/signup", web::post().to(handlers::signup))
                    .route("/login", web::post().to(handlers::login)),
            )
            .service(
                web::scope("/feed")
                    .wrap(JwtAuth::new(jwt_keys.clone()))
                    .route("/posts", web::get().to(handlers::get_posts))
                    .route("/post", web::post().to(handlers::create_post))
                    .service(
                        web::resource("/post/{post_id}")
                            .route(web::get().to(handlers::get_post))
                            .route(web::put().to(handlers::update_post))
                            .route(web::delete().to(handlers::delete_post)),
                    ),
            )
            .route("/ws/posts", web::get().to(realtime::session::posts_ws))
    })
    .bind(&bind_address)?
    .run()
    .await
}
