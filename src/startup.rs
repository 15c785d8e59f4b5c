use crate::configuration::{CorsSettings, Settings};
use crate::helpers::{JsonResponse, UploadPolicy};
use crate::middleware;
use crate::routes;
use actix_cors::Cors;
use actix_web::{dev::Server, http::header, web, App, HttpServer};
use sqlx::{Pool, Postgres};
use std::net::TcpListener;
use std::time::Duration;
use tracing_actix_web::TracingLogger;

fn cors(settings: &CorsSettings) -> Cors {
    settings
        .allowed_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS", "PATCH"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers(vec![header::AUTHORIZATION])
        .supports_credentials()
        .max_age(3600)
}

pub async fn run(
    listener: TcpListener,
    pg_pool: Pool<Postgres>,
    settings: Settings,
) -> Result<Server, std::io::Error> {
    let keep_alive = Duration::from_secs(settings.keep_alive_secs);

    let upload_policy = UploadPolicy::from(&settings.uploads);
    tokio::fs::create_dir_all(&upload_policy.dir).await?;
    let upload_policy = web::Data::new(upload_policy);

    let settings = web::Data::new(settings);
    let pg_pool = web::Data::new(pg_pool);

    let authorization = middleware::authorization::try_new().await?;
    let path_config = web::PathConfig::default().error_handler(|err, _req| {
        tracing::debug!("unmatched path parameters: {}", err);
        JsonResponse::<()>::build().not_found("Route not found")
    });
    let query_config = web::QueryConfig::default().error_handler(|err, _req| {
        JsonResponse::<()>::build().bad_request(format!("Invalid query string: {}", err))
    });

    let server = HttpServer::new(move || {
        App::new()
            .wrap(cors(&settings.cors))
            .route("/ping", web::get().to(routes::health_check))
            .service(
                web::scope("")
                    .wrap(authorization.clone())
                    .wrap(middleware::authentication::Manager::new())
                    .wrap(TracingLogger::default())
                    .service(routes::user::register_handler)
                    .service(routes::user::login_handler)
                    .service(routes::user::verify_token_handler)
                    .service(routes::user::get_profile_handler)
                    .service(routes::user::update_profile_handler)
                    .service(routes::service::search_handler)
                    .service(routes::service::item_handler)
                    .service(routes::service::add_handler)
                    .service(routes::service::update_handler)
                    .service(routes::service::delete_handler)
                    .service(routes::service::seller_list_handler)
                    .service(
                        web::scope("/order")
                            .service(routes::order::create_handler)
                            .service(routes::order::buyer_list_handler)
                            .service(routes::order::seller_orders_handler)
                            .service(routes::order::seller_list_handler)
                            .service(routes::order::update_handler)
                            .service(routes::order::delete_handler)
                            .service(routes::order::item_handler)
                            .service(routes::order::status_handler)
                            .service(routes::order::message_handler)
                            .service(routes::order::extend_delivery_handler)
                            .service(routes::order::file_handler)
                            .service(routes::order::review_handler)
                            .service(routes::order::cancel_handler)
                            .service(routes::order::add_milestone_handler)
                            .service(routes::order::update_milestone_handler)
                            .service(routes::order::delete_milestone_handler)
                            .service(routes::order::complete_milestone_handler)
                            .service(routes::order::approve_milestone_handler)
                            .service(routes::order::revision_milestone_handler)
                            .default_service(web::to(routes::not_found)),
                    )
                    .service(routes::upload::upload_handler)
                    .service(routes::upload::upload_multiple_handler)
                    .service(routes::upload::serve_handler)
                    .default_service(web::to(routes::not_found)),
            )
            .app_data(path_config.clone())
            .app_data(query_config.clone())
            .app_data(pg_pool.clone())
            .app_data(upload_policy.clone())
            .app_data(settings.clone())
    })
    .keep_alive(keep_alive)
    .client_request_timeout(keep_alive)
    .listen(listener)?
    .run();

    Ok(server)
}
