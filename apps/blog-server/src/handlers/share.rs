use actix_web::{HttpResponse, web};
use tera::Context;
use uuid::Uuid;

use scribe_core::domain::Post;
use scribe_core::forms::EmailPostForm;
use scribe_core::share::compose_share_email;

use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::state::AppState;
use crate::views::{FormView, PostView, render_html};

pub(super) async fn published_post(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_published_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No published post {}", id)))
}

fn render_share(
    state: &AppState,
    post: &Post,
    form: FormView<EmailPostForm>,
    sent: bool,
) -> AppResult<HttpResponse> {
    let mut context = Context::new();
    context.insert("post", &PostView::from(post));
    context.insert("form", &form);
    context.insert("sent", &sent);
    render_html(&state.views, "blog/post/share.html", &context)
}

/// GET /{post_id}/share/
pub async fn share_form(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = published_post(&state, path.into_inner()).await?;
    render_share(&state, &post, FormView::unbound(EmailPostForm::default()), false)
}

/// POST /{post_id}/share/
pub async fn share_submit(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Form<EmailPostForm>,
    request_id: RequestId,
) -> AppResult<HttpResponse> {
    let post = published_post(&state, path.into_inner()).await?;
    let form = form.into_inner();

    let request = match form.validate() {
        Ok(request) => request,
        Err(errors) => {
            tracing::debug!(post_id = %post.id, errors = ?errors.messages(), "Share form rejected");
            return render_share(&state, &post, FormView::with_errors(form, errors), false);
        }
    };

    let post_url = state.site.absolute(&post.absolute_url());
    let message = compose_share_email(&post, &request, &post_url, &state.site.mail_from);
    if let Err(e) = state.mailer.send(message).await {
        tracing::error!(post_id = %post.id, request_id = %request_id.as_str(), error = %e, "Share email failed");
        return Err(e.into());
    }

    tracing::info!(post_id = %post.id, request_id = %request_id.as_str(), "Post recommended by email");
    render_share(&state, &post, FormView::unbound(form), true)
}
