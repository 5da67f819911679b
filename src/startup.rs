use actix_files as fs;
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
use std::net::TcpListener;
use std::sync::Arc;

use crate::auth::SessionManager;
use crate::configuration::Settings;
use crate::error::{AppError, ValidationError};
use crate::middleware::{ApiMetrics, HitCounter, RequestLogger};
use crate::repository::Repository;
use crate::routes::{
    billing_webhook, create_post, create_user, delete_post, get_post, health_check, list_posts,
    login, metrics, refresh, reset, revoke, update_user,
};

pub fn run(
    listener: TcpListener,
    repository: Arc<dyn Repository>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let sessions = web::Data::new(SessionManager::new(repository.clone(), &settings.jwt));
    let repository: web::Data<dyn Repository> = web::Data::from(repository);
    let metrics_data = web::Data::new(ApiMetrics::new());
    let settings = web::Data::new(settings);

    let server = HttpServer::new(move || {
        // Malformed JSON and query strings share the error envelope
        let json_config = web::JsonConfig::default().error_handler(|err, _req| {
            AppError::from(ValidationError::MalformedBody(err.to_string())).into()
        });
        let query_config = web::QueryConfig::default().error_handler(|err, _req| {
            AppError::from(ValidationError::MalformedBody(err.to_string())).into()
        });

        App::new()
            .wrap(RequestLogger)

            // Shared state
            .app_data(json_config)
            .app_data(query_config)
            .app_data(repository.clone())
            .app_data(sessions.clone())
            .app_data(metrics_data.clone())
            .app_data(settings.clone())

            .service(
                web::scope("/api")
                    .route("/healthz", web::get().to(health_check))
                    .route("/login", web::post().to(login))
                    .route("/refresh", web::post().to(refresh))
                    .route("/revoke", web::post().to(revoke))
                    .route("/users", web::post().to(create_user))
                    .route("/users", web::put().to(update_user))
                    .route("/posts", web::get().to(list_posts))
                    .route("/posts", web::post().to(create_post))
                    .route("/posts/{id}", web::get().to(get_post))
                    .route("/posts/{id}", web::delete().to(delete_post))
                    .route("/billing/webhooks", web::post().to(billing_webhook)),
            )
            .service(
                web::scope("/admin")
                    .route("/metrics", web::get().to(metrics))
                    .route("/reset", web::post().to(reset)),
            )

            // Static front-end, counted
            .service(
                web::scope("/app")
                    .wrap(HitCounter)
                    .service(fs::Files::new("/", "./public").index_file("index.html")),
            )
    })
    .listen(listener)?
    .run();

    Ok(server)
}
