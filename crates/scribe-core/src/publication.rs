//! The published subset of posts, newest first.

use std::cmp::Reverse;

use uuid::Uuid;

use crate::domain::Post;

/// Keep published posts, ordered by publish timestamp descending.
/// The sort is stable, so equal timestamps keep their input order.
pub fn published<I>(posts: I) -> Vec<Post>
where
    I: IntoIterator<Item = Post>,
{
    let mut posts: Vec<Post> = posts.into_iter().filter(Post::is_published).collect();
    sort_by_recency(&mut posts);
    posts
}

/// Published posts carrying the given tag.
pub fn published_with_tag<I>(posts: I, tag_id: Uuid) -> Vec<Post>
where
    I: IntoIterator<Item = Post>,
{
    published(posts.into_iter().filter(|p| p.has_tag(tag_id)))
}

pub fn sort_by_recency(posts: &mut [Post]) {
    posts.sort_by_key(|p| Reverse(p.publish));
}
