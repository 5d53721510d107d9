//! Post listing and post detail pages.

use actix_web::{HttpResponse, web};
use chrono::NaiveDate;
use tera::Context;

use scribe_core::domain::Tag;
use scribe_core::forms::CommentForm;
use scribe_core::similarity::SIMILAR_POSTS_LIMIT;

use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::views::{
    CommentView, FormView, PageView, PostView, SimilarPostView, TagView, render_html,
};

/// Raw query pairs. A repeated `page` parameter resolves to its last value.
type QueryPairs = web::Query<Vec<(String, String)>>;

fn requested_page(query: &QueryPairs) -> Option<&str> {
    query
        .iter()
        .rev()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.as_str())
}

async fn render_list(
    state: &AppState,
    tag: Option<Tag>,
    page: Option<&str>,
) -> AppResult<HttpResponse> {
    let page = state.posts.list_published(tag.as_ref(), page).await?;
    tracing::debug!(
        tag = tag.as_ref().map(|t| t.slug.as_str()),
        page = page.number,
        total = page.total,
        "Listing posts"
    );

    let mut context = Context::new();
    context.insert("posts", &page.items.iter().map(PostView::from).collect::<Vec<_>>());
    context.insert("page", &PageView::from(&page));
    context.insert("tag", &tag.as_ref().map(TagView::from));
    render_html(&state.views, "blog/post/list.html", &context)
}

/// GET /
pub async fn post_list(
    state: web::Data<AppState>,
    query: QueryPairs,
) -> AppResult<HttpResponse> {
    render_list(&state, None, requested_page(&query)).await
}

/// GET /tags/{tag_slug}/
pub async fn post_list_by_tag(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: QueryPairs,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let tag = state
        .tags
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No tag '{}'", slug)))?;

    render_list(&state, Some(tag), requested_page(&query)).await
}

/// GET /{year}/{month}/{day}/{slug}/
pub async fn post_detail(
    state: web::Data<AppState>,
    path: web::Path<(i32, u32, u32, String)>,
) -> AppResult<HttpResponse> {
    let (year, month, day, slug) = path.into_inner();
    let not_found = || AppError::NotFound(format!("No post '{}' on {}-{}-{}", slug, year, month, day));

    let date = NaiveDate::from_ymd_opt(year, month, day).ok_or_else(not_found)?;
    let post = state
        .posts
        .find_by_slug_and_date(&slug, date)
        .await?
        .filter(|p| p.is_published())
        .ok_or_else(not_found)?;

    let comments = state.comments.active_for_post(post.id).await?;
    let similar = state.posts.similar_to(&post, SIMILAR_POSTS_LIMIT).await?;

    let mut context = Context::new();
    context.insert("post", &PostView::from(&post));
    context.insert(
        "comments",
        &comments.iter().map(CommentView::from).collect::<Vec<_>>(),
    );
    context.insert("form", &FormView::unbound(CommentForm::default()));
    context.insert(
        "similar_posts",
        &similar.iter().map(SimilarPostView::from).collect::<Vec<_>>(),
    );
    render_html(&state.views, "blog/post/detail.html", &context)
}
