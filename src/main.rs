use actix_cors::Cors;
use actix_files::Files;
use actix_web::{get, http::header, middleware::NormalizePath, web, App, HttpResponse, HttpServer, Responder};
use tracing_actix_web::TracingLogger;

use blue_api::{
    constants::UPLOADS_PREFIX,
    db::postgres::create_pool,
    graceful_shutdown::shutdown_signal,
    handlers::{
        articles::{
            create_article, delete_article, get_all_articles, get_article_by_id,
            manage_article_images, update_article, upload_article_images,
        },
        json_error::json_config,
        users::{
            change_password, delete_user, get_all_users, get_user_by_id, register,
            set_user_image, update_user,
        },
    },
    middlewares::auth::AuthMiddleware,
    settings::AppConfig,
    storage::disk::DiskStorage,
    AppState,
};

#[get("/")]
async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Blue articles API",
        "status": "Ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

fn cors(origins: &[String]) -> Cors {
    let base = Cors::default()
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origins.iter().any(|o| o == "*") {
        base.allow_any_origin()
    } else {
        origins
            .iter()
            .fold(base, |cors, origin| cors.allowed_origin(origin))
    }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt::init();

    let config = match AppConfig::new() {
        Ok(cfg) => {
            tracing::info!("Loaded configuration: {:?}", cfg);
            cfg
        }
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    let pool = create_pool(&config.database_url)
        .await
        .expect("Failed to create database connection pool");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    DiskStorage::new(&config.upload_dir)
        .init()
        .await
        .expect("Failed to create upload directory");

    let app_state = web::Data::new(AppState::new(&config, pool.clone()));

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "Starting {} v{} on {}",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr
    );

    let worker_count = config.worker_count;
    let upload_dir = config.upload_dir.clone();
    let cors_origins = config.cors_origins();

    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(json_config())
            .wrap(NormalizePath::trim())
            .wrap(AuthMiddleware)
            .wrap(cors(&cors_origins))
            .wrap(TracingLogger::default())
            .service(home)
            .service(Files::new(UPLOADS_PREFIX, &upload_dir))
            .service(
                web::scope("/api")
                    .service(get_all_articles)
                    .service(create_article)
                    .service(get_article_by_id)
                    .service(update_article)
                    .service(delete_article)
                    .service(manage_article_images)
                    .service(upload_article_images)
                    .service(register)
                    .service(get_all_users)
                    .service(get_user_by_id)
                    .service(update_user)
                    .service(change_password)
                    .service(delete_user)
                    .service(set_user_image),
            )
    })
    .workers(worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res,
        _ = shutdown_signal() => Ok(()),
    }
}
