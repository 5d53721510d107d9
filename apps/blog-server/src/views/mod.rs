//! Server-side rendering with Tera.

mod markdown;
mod models;

pub use markdown::{excerpt, markdown_to_html, truncate_words_html};
pub use models::{CommentView, FormView, PageView, PostView, SimilarPostView, TagView};

use actix_web::HttpResponse;
use actix_web::http::header::ContentType;
use tera::{Context, Tera};

use crate::middleware::error::{AppError, AppResult};

/// Load every template under `template_dir`. HTML and XML output is escaped.
pub fn load_templates(template_dir: &str) -> Result<Tera, tera::Error> {
    let dir_glob = format!("{}/**/*", template_dir.trim_end_matches('/'));
    let mut engine = Tera::new(&dir_glob)?;
    engine.autoescape_on(vec![".html", ".xml"]);

    tracing::info!(
        templates = engine.get_template_names().count(),
        dir = %template_dir,
        "Templates loaded"
    );
    Ok(engine)
}

fn render_to_string(engine: &Tera, template: &str, context: &Context) -> AppResult<String> {
    engine.render(template, context).map_err(|e| {
        AppError::Internal(format!("template '{}' failed to render: {:?}", template, e))
    })
}

/// Render an HTML page.
pub fn render_html(engine: &Tera, template: &str, context: &Context) -> AppResult<HttpResponse> {
    let body = render_to_string(engine, template, context)?;
    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(body))
}

/// Render an XML document with the given media type.
pub fn render_xml(
    engine: &Tera,
    template: &str,
    context: &Context,
    media_type: &'static str,
) -> AppResult<HttpResponse> {
    let body = render_to_string(engine, template, context)?;
    Ok(HttpResponse::Ok()
        .content_type(format!("{}; charset=utf-8", media_type))
        .body(body))
}
