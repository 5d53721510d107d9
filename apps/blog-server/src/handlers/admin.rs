//! Admin JSON API. Every handler requires a token carrying the admin role.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use scribe_core::domain::{Comment, Post, PostStatus, User};
use scribe_core::editorial::{publish_post, resolve_tags, save_post};
use scribe_core::ports::PostFilter;
use scribe_shared::ApiResponse;
use scribe_shared::dto::{
    ApproveCommentsRequest, ApproveCommentsResponse, CommentListQuery, CommentResponse,
    PostListQuery, PostRequest, PostResponse, SetActiveRequest,
};

use crate::middleware::auth::AdminIdentity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn post_response(state: &AppState, post: Post) -> PostResponse {
    PostResponse {
        url: state.site.absolute(&post.absolute_url()),
        id: post.id,
        author_id: post.author_id,
        title: post.title,
        slug: post.slug,
        body: post.body,
        status: post.status.label().to_string(),
        publish: post.publish,
        created_at: post.created_at,
        updated_at: post.updated_at,
        tags: post.tags.into_iter().map(|t| t.name).collect(),
    }
}

fn comment_response(comment: Comment) -> CommentResponse {
    CommentResponse {
        id: comment.id,
        post_id: comment.post_id,
        name: comment.name,
        email: comment.email,
        body: comment.body,
        active: comment.active,
        created_at: comment.created_at,
        updated_at: comment.updated_at,
    }
}

async fn load_post(state: &AppState, id: Uuid) -> AppResult<Post> {
    state
        .posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Post {} not found", id)))
}

/// Apply the editable fields of `req` to `post`.
async fn apply_request(state: &AppState, post: &mut Post, req: PostRequest) -> AppResult<()> {
    if let Some(status) = req.status.as_deref() {
        post.status = status.parse::<PostStatus>()?;
    }
    if let Some(slug) = req.slug {
        post.slug = slug;
    }
    if let Some(publish) = req.publish {
        post.publish = publish;
    }
    post.title = req.title;
    post.body = req.body;
    post.tags = resolve_tags(state.tags.as_ref(), &req.tags).await?;
    Ok(())
}

/// GET /admin/api/posts
pub async fn list_posts(
    _admin: AdminIdentity,
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let filter = PostFilter {
        status: query
            .status
            .as_deref()
            .map(str::parse::<PostStatus>)
            .transpose()?,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };

    let posts = state.posts.list(&filter).await?;
    let body: Vec<PostResponse> = posts.into_iter().map(|p| post_response(&state, p)).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// POST /admin/api/posts
///
/// The caller becomes the author.
pub async fn create_post(
    AdminIdentity(identity): AdminIdentity,
    state: web::Data<AppState>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    if state.users.find_by_id(identity.user_id).await?.is_none() {
        let author = User::from_email(identity.user_id, &identity.email);
        state.users.save(author).await?;
        tracing::info!(user_id = %identity.user_id, "Registered author from token");
    }

    let mut post = Post::new(identity.user_id, String::new(), String::new());
    apply_request(&state, &mut post, body.into_inner()).await?;
    let post = save_post(state.posts.as_ref(), post).await?;

    tracing::info!(post_id = %post.id, slug = %post.slug, status = %post.status, "Post created");
    Ok(HttpResponse::Created().json(ApiResponse::ok(post_response(&state, post))))
}

/// GET /admin/api/posts/{id}
pub async fn get_post(
    _admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = load_post(&state, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&state, post))))
}

/// PUT /admin/api/posts/{id}
pub async fn update_post(
    _admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let mut post = load_post(&state, path.into_inner()).await?;
    apply_request(&state, &mut post, body.into_inner()).await?;
    let post = save_post(state.posts.as_ref(), post).await?;

    tracing::info!(post_id = %post.id, "Post updated");
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&state, post))))
}

/// DELETE /admin/api/posts/{id}
pub async fn delete_post(
    _admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    state.posts.delete(id).await?;

    tracing::info!(post_id = %id, "Post deleted");
    Ok(HttpResponse::NoContent().finish())
}

/// POST /admin/api/posts/{id}/publish
pub async fn publish(
    _admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    let post = publish_post(state.posts.as_ref(), path.into_inner()).await?;

    tracing::info!(post_id = %post.id, "Post published");
    Ok(HttpResponse::Ok().json(ApiResponse::ok(post_response(&state, post))))
}

/// GET /admin/api/comments
pub async fn list_comments(
    _admin: AdminIdentity,
    state: web::Data<AppState>,
    query: web::Query<CommentListQuery>,
) -> AppResult<HttpResponse> {
    let comments = state.comments.list(query.active).await?;
    let body: Vec<CommentResponse> = comments.into_iter().map(comment_response).collect();
    Ok(HttpResponse::Ok().json(ApiResponse::ok(body)))
}

/// PATCH /admin/api/comments/{id}
pub async fn set_comment_active(
    _admin: AdminIdentity,
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    body: web::Json<SetActiveRequest>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let mut comment = state
        .comments
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Comment {} not found", id)))?;

    comment.set_active(body.active);
    let comment = state.comments.save(comment).await?;

    tracing::info!(comment_id = %id, active = comment.active, "Comment moderated");
    Ok(HttpResponse::Ok().json(ApiResponse::ok(comment_response(comment))))
}

/// POST /admin/api/comments/approve
pub async fn approve_comments(
    _admin: AdminIdentity,
    state: web::Data<AppState>,
    body: web::Json<ApproveCommentsRequest>,
) -> AppResult<HttpResponse> {
    let approved = state.comments.set_active(&body.ids, true).await?;

    tracing::info!(requested = body.ids.len(), approved, "Comments approved");
    Ok(HttpResponse::Ok().json(ApiResponse::ok(ApproveCommentsResponse { approved })))
}
