//! Template-facing view models.

use serde::Serialize;

use scribe_core::domain::{Comment, Post, Tag};
use scribe_core::forms::FormErrors;
use scribe_core::pagination::Page;
use scribe_core::similarity::SimilarPost;

use super::markdown::{excerpt, markdown_to_html};

#[derive(Debug, Clone, Serialize)]
pub struct TagView {
    pub name: String,
    pub slug: String,
    pub url: String,
}

impl From<&Tag> for TagView {
    fn from(tag: &Tag) -> Self {
        Self {
            name: tag.name.clone(),
            slug: tag.slug.clone(),
            url: tag.url(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub url: String,
    pub share_url: String,
    pub comment_url: String,
    /// e.g. `Jan 2, 2024`
    pub publish: String,
    pub tags: Vec<TagView>,
    pub body_html: String,
    pub excerpt_html: String,
}

impl From<&Post> for PostView {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id.to_string(),
            title: post.title.clone(),
            slug: post.slug.clone(),
            url: post.absolute_url(),
            share_url: format!("/{}/share/", post.id),
            comment_url: format!("/{}/comment/", post.id),
            publish: post.publish.format("%b %-d, %Y").to_string(),
            tags: post.tags.iter().map(TagView::from).collect(),
            body_html: markdown_to_html(&post.body),
            excerpt_html: excerpt(&post.body),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SimilarPostView {
    pub title: String,
    pub url: String,
    pub same_tags: usize,
}

impl From<&SimilarPost> for SimilarPostView {
    fn from(similar: &SimilarPost) -> Self {
        Self {
            title: similar.post.title.clone(),
            url: similar.post.absolute_url(),
            same_tags: similar.same_tags,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommentView {
    pub name: String,
    pub body: String,
    pub created: String,
}

impl From<&Comment> for CommentView {
    fn from(comment: &Comment) -> Self {
        Self {
            name: comment.name.clone(),
            body: comment.body.clone(),
            created: comment.created_at.format("%b %-d, %Y %H:%M").to_string(),
        }
    }
}

/// Navigation data of a listing page.
#[derive(Debug, Clone, Serialize)]
pub struct PageView {
    pub number: u64,
    pub num_pages: u64,
    pub total: u64,
    pub previous: Option<u64>,
    pub next: Option<u64>,
}

impl<T> From<&Page<T>> for PageView {
    fn from(page: &Page<T>) -> Self {
        Self {
            number: page.number,
            num_pages: page.num_pages,
            total: page.total,
            previous: page.previous_page_number(),
            next: page.next_page_number(),
        }
    }
}

/// Submitted values plus per-field errors, for re-rendering a form.
#[derive(Debug, Clone, Serialize)]
pub struct FormView<F: Serialize> {
    pub data: F,
    pub errors: FormErrors,
}

impl<F: Serialize> FormView<F> {
    pub fn unbound(data: F) -> Self {
        Self {
            data,
            errors: FormErrors::new(),
        }
    }

    pub fn with_errors(data: F, errors: FormErrors) -> Self {
        Self { data, errors }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use scribe_core::domain::PostStatus;
    use scribe_core::pagination::Paginator;
    use uuid::Uuid;

    #[test]
    fn test_post_view_links_and_dates() {
        let post = Post::new(Uuid::nil(), "Hello World".into(), "Some *body*".into())
            .with_status(PostStatus::Published)
            .with_publish(Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap())
            .with_tags(vec![Tag::new("Rust")]);

        let view = PostView::from(&post);

        assert_eq!(view.url, "/2024/1/2/hello-world/");
        assert_eq!(view.publish, "Jan 2, 2024");
        assert_eq!(view.share_url, format!("/{}/share/", post.id));
        assert_eq!(view.tags[0].url, "/tags/rust/");
        assert!(view.body_html.contains("<em>body</em>"));
    }

    #[test]
    fn test_page_view_navigation() {
        let page = Paginator::paginate((1..=7).collect::<Vec<u32>>(), 5, Some("2"));
        let view = PageView::from(&page);

        assert_eq!(view.number, 2);
        assert_eq!(view.previous, Some(1));
        assert_eq!(view.next, None);
    }
}
