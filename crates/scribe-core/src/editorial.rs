//! Author-side operations: saving, publishing and tagging posts.

use std::collections::HashSet;

use uuid::Uuid;

use crate::domain::{Post, Tag, slugify};
use crate::error::DomainError;
use crate::ports::{PostRepository, TagRepository};

const MAX_TITLE_CHARS: usize = 250;
const MAX_SLUG_CHARS: usize = 250;

/// Validate and persist a post. Fills in a missing slug from the title and
/// rejects a slug already used by another post on the same publish date.
pub async fn save_post(posts: &dyn PostRepository, mut post: Post) -> Result<Post, DomainError> {
    post.title = post.title.trim().to_string();
    post.slug = post.slug.trim().to_string();

    if post.title.is_empty() {
        return Err(DomainError::Validation("title is required".into()));
    }
    if post.title.chars().count() > MAX_TITLE_CHARS {
        return Err(DomainError::Validation(format!(
            "title must be at most {} characters",
            MAX_TITLE_CHARS
        )));
    }
    if post.slug.is_empty() {
        post.slug = slugify(&post.title);
    }
    if post.slug.is_empty() || post.slug != slugify(&post.slug) {
        return Err(DomainError::Validation(format!(
            "'{}' is not a valid slug",
            post.slug
        )));
    }
    if post.slug.chars().count() > MAX_SLUG_CHARS {
        return Err(DomainError::Validation(format!(
            "slug must be at most {} characters",
            MAX_SLUG_CHARS
        )));
    }

    let clash = posts
        .find_by_slug_and_date(&post.slug, post.publish_date())
        .await?
        .is_some_and(|existing| existing.id != post.id);
    if clash {
        return Err(DomainError::Duplicate(format!(
            "slug '{}' is already used on {}",
            post.slug,
            post.publish_date()
        )));
    }

    post.touch();
    Ok(posts.save(post).await?)
}

/// Draft -> Published for the post with this id.
pub async fn publish_post(posts: &dyn PostRepository, id: Uuid) -> Result<Post, DomainError> {
    let mut post = posts
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("post", id))?;
    post.mark_published()?;
    Ok(posts.save(post).await?)
}

/// Resolve tag names to stored tags, creating missing ones. Blank names and
/// names that collapse to the same slug are dropped.
pub async fn resolve_tags(
    tags: &dyn TagRepository,
    names: &[String],
) -> Result<Vec<Tag>, DomainError> {
    let mut seen = HashSet::new();
    let mut resolved = Vec::new();

    for name in names {
        let slug = slugify(name);
        if slug.is_empty() || !seen.insert(slug) {
            continue;
        }
        resolved.push(tags.get_or_create(name.trim()).await?);
    }

    Ok(resolved)
}
