use actix_web::{HttpResponse, web};
use tera::Context;
use uuid::Uuid;

use scribe_core::domain::Comment;
use scribe_core::forms::CommentForm;

use super::share::published_post;
use crate::middleware::error::{AppError, AppResult};
use crate::observability::RequestId;
use crate::state::AppState;
use crate::views::{CommentView, FormView, PostView, render_html};

/// POST /{post_id}/comment/
///
/// An invalid form re-renders with its errors and stores nothing.
pub async fn post_comment(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    form: web::Form<CommentForm>,
    request_id: RequestId,
) -> AppResult<HttpResponse> {
    let post = published_post(&state, path.into_inner()).await?;
    let form = form.into_inner();

    let mut context = Context::new();
    context.insert("post", &PostView::from(&post));

    match form.validate() {
        Ok(new_comment) => {
            let comment = state
                .comments
                .save(Comment::new(
                    post.id,
                    new_comment.name,
                    new_comment.email,
                    new_comment.body,
                ))
                .await?;
            tracing::info!(
                post_id = %post.id,
                comment_id = %comment.id,
                request_id = %request_id.as_str(),
                "Comment added"
            );

            context.insert("comment", &Some(CommentView::from(&comment)));
            context.insert("form", &FormView::unbound(CommentForm::default()));
        }
        Err(errors) => {
            tracing::debug!(post_id = %post.id, errors = ?errors.messages(), "Comment rejected");
            context.insert("comment", &None::<CommentView>);
            context.insert("form", &FormView::with_errors(form, errors));
        }
    }

    render_html(&state.views, "blog/post/comment.html", &context)
}

/// Any other method on the comment resource.
pub async fn comment_method_not_allowed() -> AppResult<HttpResponse> {
    Err(AppError::MethodNotAllowed("POST"))
}
