//! HTTP handlers and route configuration.

#[cfg(feature = "auth")]
mod admin;
mod blog;
mod comment;
mod feed;
mod health;
mod search;
mod share;


use actix_web::web;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

#[cfg(feature = "rate-limit")]
use crate::middleware::rate_limit::RateLimitMiddleware;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig, state: &AppState) {
    cfg.route("/health", web::get().to(health::health_check));

    #[cfg(feature = "auth")]
    cfg.service(
        web::scope("/admin/api")
            .service(
                web::resource("/posts")
                    .route(web::get().to(admin::list_posts))
                    .route(web::post().to(admin::create_post)),
            )
            .service(
                web::resource("/posts/{id}")
                    .route(web::get().to(admin::get_post))
                    .route(web::put().to(admin::update_post))
                    .route(web::delete().to(admin::delete_post)),
            )
            .route("/posts/{id}/publish", web::post().to(admin::publish))
            .route("/comments", web::get().to(admin::list_comments))
            .route("/comments/approve", web::post().to(admin::approve_comments))
            .route("/comments/{id}", web::patch().to(admin::set_comment_active)),
    );

    cfg.route("/", web::get().to(blog::post_list))
        .route("/feed/", web::get().to(feed::latest_posts_feed))
        .route("/search/", web::get().to(search::post_search))
        .route("/sitemap.xml", web::get().to(feed::sitemap))
        .route("/tags/{tag_slug}/", web::get().to(blog::post_list_by_tag))
        .route(
            "/{year}/{month}/{day}/{slug}/",
            web::get().to(blog::post_detail),
        );

    let share = web::resource("/{post_id}/share/")
        .route(web::get().to(share::share_form))
        .route(web::post().to(share::share_submit));
    let comment = web::resource("/{post_id}/comment/")
        .route(web::post().to(comment::post_comment))
        .default_service(web::to(comment::comment_method_not_allowed));

    #[cfg(feature = "rate-limit")]
    {
        let throttle =
            || RateLimitMiddleware::new(state.rate_limiter.clone(), state.site.trust_proxy);
        cfg.service(share.wrap(throttle()))
            .service(comment.wrap(throttle()));
    }

    #[cfg(not(feature = "rate-limit"))]
    {
        let _ = state;
        cfg.service(share).service(comment);
    }
}

/// Fallback for unmatched paths.
pub async fn not_found() -> AppResult<actix_web::HttpResponse> {
    Err(AppError::NotFound("No such page".to_string()))
}
