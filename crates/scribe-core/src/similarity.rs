//! "Similar posts" ranking by shared tags.

use std::cmp::Reverse;
use std::collections::HashSet;

use serde::Serialize;
use uuid::Uuid;

use crate::domain::Post;

/// Maximum number of recommendations shown under a post.
pub const SIMILAR_POSTS_LIMIT: usize = 4;

/// A recommended post and the number of tags it shares with the reference.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarPost {
    pub post: Post,
    pub same_tags: usize,
}

/// Rank published candidates by how many of `reference`'s tags they carry,
/// then by recency. The reference itself and drafts are never returned.
pub fn rank_similar<I>(reference: &Post, candidates: I, limit: usize) -> Vec<SimilarPost>
where
    I: IntoIterator<Item = Post>,
{
    let wanted: HashSet<Uuid> = reference.tag_ids().collect();
    if wanted.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<SimilarPost> = candidates
        .into_iter()
        .filter(|p| p.is_published() && p.id != reference.id)
        .filter_map(|post| {
            let same_tags = shared_tag_count(&wanted, &post);
            (same_tags > 0).then_some(SimilarPost { post, same_tags })
        })
        .collect();

    ranked.sort_by_key(|s| (Reverse(s.same_tags), Reverse(s.post.publish)));
    ranked.truncate(limit);
    ranked
}

fn shared_tag_count(wanted: &HashSet<Uuid>, post: &Post) -> usize {
    post.tag_ids()
        .collect::<HashSet<_>>()
        .intersection(wanted)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{PostStatus, Tag};
    use chrono::{Duration, Utc};

    fn post(title: &str, tags: &[&Tag], age_days: i64) -> Post {
        Post::new(Uuid::nil(), title.into(), String::new())
            .with_status(PostStatus::Published)
            .with_publish(Utc::now() - Duration::days(age_days))
            .with_tags(tags.iter().map(|t| (*t).clone()).collect())
    }

    fn titles(ranked: &[SimilarPost]) -> Vec<&str> {
        ranked.iter().map(|s| s.post.title.as_str()).collect()
    }

    #[test]
    fn test_more_shared_tags_rank_first() {
        let python = Tag::new("python");
        let web = Tag::new("web");
        let a = post("A", &[&python, &web], 0);
        let b = post("B", &[&python], 1);
        let c = post("C", &[&web, &python], 2);

        let ranked = rank_similar(&a, vec![a.clone(), b, c], SIMILAR_POSTS_LIMIT);

        assert_eq!(titles(&ranked), vec!["C", "B"]);
        assert_eq!(ranked[0].same_tags, 2);
        assert_eq!(ranked[1].same_tags, 1);
    }

    #[test]
    fn test_recency_breaks_ties_and_limit_applies() {
        let rust = Tag::new("rust");
        let reference = post("ref", &[&rust], 0);
        let candidates: Vec<Post> = (1..=6)
            .map(|age| post(&format!("p{}", age), &[&rust], age))
            .collect();

        let ranked = rank_similar(&reference, candidates, SIMILAR_POSTS_LIMIT);

        assert_eq!(titles(&ranked), vec!["p1", "p2", "p3", "p4"]);
    }

    #[test]
    fn test_untagged_reference_has_no_similar_posts() {
        let rust = Tag::new("rust");
        let reference = post("ref", &[], 0);
        let ranked = rank_similar(&reference, vec![post("x", &[&rust], 1)], 4);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_drafts_and_unrelated_posts_excluded() {
        let rust = Tag::new("rust");
        let go = Tag::new("go");
        let reference = post("ref", &[&rust], 0);
        let draft = post("draft", &[&rust], 1).with_status(PostStatus::Draft);
        let unrelated = post("go", &[&go], 1);

        let ranked = rank_similar(&reference, vec![draft, unrelated], 4);
        assert!(ranked.is_empty());
    }

    #[test]
    fn test_same_tags_is_non_increasing() {
        let tags: Vec<Tag> = ["a", "b", "c"].iter().map(|n| Tag::new(*n)).collect();
        let reference = post("ref", &[&tags[0], &tags[1], &tags[2]], 0);
        let candidates = vec![
            post("one", &[&tags[0]], 1),
            post("three", &[&tags[0], &tags[1], &tags[2]], 5),
            post("two", &[&tags[1], &tags[2]], 2),
            post("one-b", &[&tags[2]], 3),
        ];

        let ranked = rank_similar(&reference, candidates, 4);
        assert!(ranked.windows(2).all(|w| w[0].same_tags >= w[1].same_tags));
        assert_eq!(titles(&ranked), vec!["three", "two", "one", "one-b"]);
    }
}
