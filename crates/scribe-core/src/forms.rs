//! Form input and validation.
//!
//! Inputs deserialize leniently (every field defaults to empty) so a missing
//! field becomes a validation message instead of a rejected request.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::search::SearchQuery;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

const REQUIRED: &str = "This field is required.";
const INVALID_EMAIL: &str = "Enter a valid email address.";

/// Field name -> messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// Flattened `field: message` strings.
    pub fn messages(&self) -> Vec<String> {
        self.0
            .iter()
            .flat_map(|(field, msgs)| msgs.iter().map(move |m| format!("{}: {}", field, m)))
            .collect()
    }

    fn required(&mut self, field: &str, value: &str) -> bool {
        if value.is_empty() {
            self.add(field, REQUIRED);
            return false;
        }
        true
    }

    fn max_chars(&mut self, field: &str, value: &str, max: usize) {
        let len = value.chars().count();
        if len > max {
            self.add(
                field,
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    max, len
                ),
            );
        }
    }

    fn email(&mut self, field: &str, value: &str) {
        if self.required(field, value) && !is_valid_email(value) {
            self.add(field, INVALID_EMAIL);
        }
    }

    fn finish<T>(self, cleaned: T) -> Result<T, FormErrors> {
        if self.is_empty() { Ok(cleaned) } else { Err(self) }
    }
}

pub fn is_valid_email(value: &str) -> bool {
    value.len() <= 254 && EMAIL_RE.is_match(value)
}

/// Share-by-email form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailPostForm {
    pub name: String,
    pub email: String,
    pub to: String,
    pub comments: String,
}

/// Cleaned share request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub name: String,
    pub email: String,
    pub to: String,
    pub comments: String,
}

impl EmailPostForm {
    pub fn validate(&self) -> Result<ShareRequest, FormErrors> {
        let cleaned = ShareRequest {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            to: self.to.trim().to_string(),
            comments: self.comments.trim().to_string(),
        };

        let mut errors = FormErrors::new();
        if errors.required("name", &cleaned.name) {
            errors.max_chars("name", &cleaned.name, 25);
        }
        errors.email("email", &cleaned.email);
        errors.email("to", &cleaned.to);
        errors.finish(cleaned)
    }
}

/// Public comment form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub name: String,
    pub email: String,
    pub body: String,
}

/// Cleaned comment submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewComment {
    pub name: String,
    pub email: String,
    pub body: String,
}

impl CommentForm {
    pub fn validate(&self) -> Result<NewComment, FormErrors> {
        let cleaned = NewComment {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            body: self.body.trim().to_string(),
        };

        let mut errors = FormErrors::new();
        if errors.required("name", &cleaned.name) {
            errors.max_chars("name", &cleaned.name, 80);
        }
        errors.email("email", &cleaned.email);
        errors.required("body", &cleaned.body);
        errors.finish(cleaned)
    }
}

/// Search box.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchForm {
    pub query: Option<String>,
}

impl SearchForm {
    /// Whether a query was submitted at all (even an empty one).
    pub fn is_bound(&self) -> bool {
        self.query.is_some()
    }

    pub fn validate(&self) -> Result<SearchQuery, FormErrors> {
        SearchQuery::parse(self.query.as_deref()).ok_or_else(|| {
            let mut errors = FormErrors::new();
            errors.add("query", REQUIRED);
            errors
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        assert!(is_valid_email("ana@example.com"));
        assert!(is_valid_email("first.last+tag@mail.example.org"));
        assert!(!is_valid_email("ana@localhost"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a b@example.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_share_form_cleans_and_accepts() {
        let form = EmailPostForm {
            name: " Ana ".into(),
            email: "ana@example.com".into(),
            to: "bob@example.com".into(),
            comments: String::new(),
        };
        let cleaned = form.validate().unwrap();
        assert_eq!(cleaned.name, "Ana");
        assert!(cleaned.comments.is_empty());
    }

    #[test]
    fn test_share_form_reports_each_field() {
        let form = EmailPostForm {
            name: "x".repeat(26),
            email: "nope".into(),
            to: String::new(),
            comments: String::new(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("name").unwrap().len(), 1);
        assert_eq!(errors.get("email").unwrap(), [INVALID_EMAIL.to_string()]);
        assert_eq!(errors.get("to").unwrap(), [REQUIRED.to_string()]);
        assert!(errors.get("comments").is_none());
    }

    #[test]
    fn test_comment_form_requires_body() {
        let form = CommentForm {
            name: "Ana".into(),
            email: "ana@example.com".into(),
            body: "   ".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.messages(), vec!["body: This field is required."]);
    }

    #[test]
    fn test_search_form() {
        assert!(!SearchForm::default().is_bound());
        let blank = SearchForm {
            query: Some(" ".into()),
        };
        assert!(blank.is_bound());
        assert!(blank.validate().is_err());
        let ok = SearchForm {
            query: Some("rust".into()),
        };
        assert_eq!(ok.validate().unwrap().as_str(), "rust");
    }
}
