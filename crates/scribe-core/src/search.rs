//! Trigram search over post titles and bodies.
//!
//! Scoring follows PostgreSQL's `pg_trgm`: every word (maximal run of
//! alphanumerics, lowercased) is padded with two leading blanks and one
//! trailing blank, and the padded word contributes all of its 3-character
//! windows to a trigram set. Similarity is the Jaccard index of two sets.

use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Post;
use crate::error::DomainError;

/// Combined title + body similarity a post must exceed to match.
pub const SIMILARITY_THRESHOLD: f64 = 0.1;

/// A validated, non-empty search query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// `None` for missing or blank input.
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        let trimmed = raw?.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction results are ordered by similarity.
///
/// Defaults to ascending (least similar first), which is what the blog has
/// always shipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchOrder {
    #[default]
    Ascending,
    Descending,
}

impl FromStr for SearchOrder {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Ok(SearchOrder::Ascending),
            "desc" | "descending" => Ok(SearchOrder::Descending),
            other => Err(DomainError::Validation(format!(
                "unknown search order '{}'",
                other
            ))),
        }
    }
}

/// A matching post with its combined similarity.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredPost {
    pub post: Post,
    pub similarity: f64,
}

/// Set of padded trigrams of `text`.
pub fn trigrams(text: &str) -> HashSet<String> {
    let mut set = HashSet::new();
    let lowered = text.to_lowercase();

    for word in lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let padded: Vec<char> = "  "
            .chars()
            .chain(word.chars())
            .chain(std::iter::once(' '))
            .collect();
        for window in padded.windows(3) {
            set.insert(window.iter().collect());
        }
    }

    set
}

/// Jaccard similarity of the trigram sets of `a` and `b`, in `[0, 1]`.
pub fn trigram_similarity(a: &str, b: &str) -> f64 {
    let left = trigrams(a);
    let right = trigrams(b);
    let common = left.intersection(&right).count();
    let union = left.len() + right.len() - common;

    if union == 0 {
        0.0
    } else {
        common as f64 / union as f64
    }
}

/// Title similarity plus body similarity.
pub fn score(query: &SearchQuery, post: &Post) -> f64 {
    trigram_similarity(query.as_str(), &post.title) + trigram_similarity(query.as_str(), &post.body)
}

/// Score published candidates, keep those above the threshold, and order them.
/// Equal scores are ordered newest first.
pub fn rank_matches<I>(query: &SearchQuery, candidates: I, order: SearchOrder) -> Vec<ScoredPost>
where
    I: IntoIterator<Item = Post>,
{
    let mut matches: Vec<ScoredPost> = candidates
        .into_iter()
        .filter(Post::is_published)
        .map(|post| ScoredPost {
            similarity: score(query, &post),
            post,
        })
        .filter(|m| m.similarity > SIMILARITY_THRESHOLD)
        .collect();

    matches.sort_by(|a, b| {
        let by_score = match order {
            SearchOrder::Ascending => a.similarity.total_cmp(&b.similarity),
            SearchOrder::Descending => b.similarity.total_cmp(&a.similarity),
        };
        by_score.then_with(|| Reverse(a.post.publish).cmp(&Reverse(b.post.publish)))
    });
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::PostStatus;
    use uuid::Uuid;

    fn published(title: &str, body: &str) -> Post {
        Post::new(Uuid::nil(), title.into(), body.into()).with_status(PostStatus::Published)
    }

    fn query(q: &str) -> SearchQuery {
        SearchQuery::parse(Some(q)).unwrap()
    }

    #[test]
    fn test_trigrams_match_pg_trgm() {
        let set = trigrams("cat");
        let expected: HashSet<String> = ["  c", " ca", "cat", "at "]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(set, expected);
    }

    #[test]
    fn test_trigrams_split_words_and_ignore_case() {
        let set = trigrams("Hi, HI!");
        assert_eq!(set.len(), 3);
        assert!(set.contains(" hi"));
    }

    #[test]
    fn test_identical_strings_score_one() {
        assert_eq!(trigram_similarity("django", "Django"), 1.0);
        assert_eq!(trigram_similarity("", ""), 0.0);
        assert_eq!(trigram_similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_misspelled_query_matches_title() {
        let post = published("Django Tips", "");
        let similarity = score(&query("djano"), &post);
        // 4 shared trigrams out of 14 distinct ones.
        assert!((similarity - 4.0 / 14.0).abs() < 1e-9);

        let matches = rank_matches(&query("djano"), vec![post], SearchOrder::Ascending);
        assert_eq!(matches.len(), 1);
    }

    #[test]
    fn test_blank_query_is_rejected() {
        assert!(SearchQuery::parse(None).is_none());
        assert!(SearchQuery::parse(Some("")).is_none());
        assert!(SearchQuery::parse(Some("   ")).is_none());
        assert_eq!(query("  rust ").as_str(), "rust");
    }

    #[test]
    fn test_drafts_and_weak_matches_are_dropped() {
        let draft = Post::new(Uuid::nil(), "Django Tips".into(), String::new());
        let unrelated = published("Gardening", "tomatoes and basil");
        let matches = rank_matches(&query("django"), vec![draft, unrelated], SearchOrder::Ascending);
        assert!(matches.is_empty());
    }

    #[test]
    fn test_order_direction() {
        let exact = published("django", "");
        let partial = published("Django Tips", "");

        let asc = rank_matches(
            &query("django"),
            vec![exact.clone(), partial.clone()],
            SearchOrder::Ascending,
        );
        assert_eq!(asc[0].post.title, "Django Tips");
        assert!(asc[0].similarity <= asc[1].similarity);

        let desc = rank_matches(&query("django"), vec![exact, partial], SearchOrder::Descending);
        assert_eq!(desc[0].post.title, "django");
    }

    #[test]
    fn test_order_parsing() {
        assert_eq!("DESC".parse::<SearchOrder>().unwrap(), SearchOrder::Descending);
        assert_eq!(SearchOrder::default(), SearchOrder::Ascending);
        assert!("sideways".parse::<SearchOrder>().is_err());
    }
}
