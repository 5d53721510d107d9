use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag entity - a label shared by many posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into().trim().to_string();
        Self {
            id: Uuid::new_v4(),
            slug: slugify(&name),
            name,
        }
    }

    pub fn url(&self) -> String {
        format!("/tags/{}/", self.slug)
    }
}

/// Lowercase, keep alphanumerics, collapse everything else into single `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("  Rust -- Web  "), "rust-web");
        assert_eq!(slugify("What's new?"), "whats-new");
        assert_eq!(slugify(""), "");
    }

    #[test]
    fn test_tag_url() {
        let tag = Tag::new("Machine Learning");
        assert_eq!(tag.slug, "machine-learning");
        assert_eq!(tag.url(), "/tags/machine-learning/");
    }
}
