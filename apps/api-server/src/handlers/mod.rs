//! HTTP handlers and route configuration.

mod health;
mod posts;
mod stories;

use actix_web::{HttpRequest, HttpResponse, error, web};

use campus_shared::ErrorResponse;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(path_config())
        .app_data(query_config())
        .service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                .service(
                    web::scope("/v1")
                        .service(
                            web::scope("/posts")
                                .route("", web::post().to(posts::create_post))
                                .route("", web::get().to(posts::list_posts))
                                .route("/{id}", web::get().to(posts::get_post))
                                .route("/{id}", web::put().to(posts::update_post))
                                .route("/{id}", web::delete().to(posts::delete_post))
                                .route("/{id}/hard", web::delete().to(posts::hard_delete_post))
                                .route("/{id}/like", web::post().to(posts::toggle_like))
                                .route("/{id}/comment", web::post().to(posts::add_comment))
                                .route("/{id}/comments", web::get().to(posts::list_comments))
                                .route(
                                    "/{id}/comments/{comment_id}",
                                    web::delete().to(posts::delete_comment),
                                )
                                .route("/{id}/share", web::post().to(posts::share_post))
                                .route("/{id}/view", web::post().to(posts::record_view)),
                        )
                        .service(
                            web::scope("/stories")
                                .route("", web::post().to(stories::create_story))
                                .route("", web::get().to(stories::list_stories))
                                .route("/{id}/like", web::post().to(stories::toggle_like))
                                .route("/{id}/view", web::post().to(stories::record_view))
                                .route(
                                    "/{id}/hard",
                                    web::delete().to(stories::hard_delete_story),
                                ),
                        ),
                ),
        );
}

// Extractor failures are rendered as problem details like every other error.

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, req| bad_request(err, "Invalid request body", req))
}

fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|err, req| bad_request(err, "Invalid path parameter", req))
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|err, req| bad_request(err, "Invalid query string", req))
}

/// 400 problem details with the request path as `instance`.
fn bad_request<E>(err: E, context: &str, req: &HttpRequest) -> error::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let body = ErrorResponse::bad_request(format!("{context}: {err}")).with_instance(req.path());
    error::InternalError::from_response(err, HttpResponse::BadRequest().json(body)).into()
}
