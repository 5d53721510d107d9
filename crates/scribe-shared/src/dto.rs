//! Data Transfer Objects - request/response types for the admin API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create or edit a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostRequest {
    pub title: String,
    /// Derived from the title when absent or empty.
    #[serde(default)]
    pub slug: Option<String>,
    pub body: String,
    /// `draft` (default) or `published`.
    #[serde(default)]
    pub status: Option<String>,
    /// Defaults to now on create, unchanged on edit.
    #[serde(default)]
    pub publish: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Query parameters of the admin post listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PostListQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

/// A post as seen by the admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
    pub id: Uuid,
    pub author_id: Uuid,
    pub title: String,
    pub slug: String,
    pub body: String,
    pub status: String,
    pub publish: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub url: String,
}

/// Query parameters of the admin comment listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentListQuery {
    pub active: Option<bool>,
}

/// A comment as seen by the admin API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub id: Uuid,
    pub post_id: Uuid,
    pub name: String,
    pub email: String,
    pub body: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Toggle the moderation flag of one comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetActiveRequest {
    pub active: bool,
}

/// Bulk "approve comments" action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveCommentsRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApproveCommentsResponse {
    pub approved: u64,
}
