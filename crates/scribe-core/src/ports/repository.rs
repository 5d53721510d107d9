use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::domain::{Comment, Post, PostStatus, Tag, User};
use crate::error::RepoError;
use crate::pagination::Page;
use crate::search::{ScoredPost, SearchOrder, SearchQuery};
use crate::similarity::SimilarPost;

/// Generic repository trait defining standard CRUD operations.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Save an entity (create or update).
    async fn save(&self, entity: T) -> Result<T, RepoError>;

    /// Delete an entity by its ID.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// Post authors.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;
}

/// Filter for the administrative post listing.
#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub status: Option<PostStatus>,
    /// Substring of title or body.
    pub search: Option<String>,
}

/// Post repository. Every `*_published` method and `search` / `similar_to`
/// only ever return posts with status `Published`.
///
/// `save` persists the post row and replaces its tag associations; the tags
/// must already exist (see [`TagRepository::get_or_create`]). `delete`
/// cascades to comments and tag associations.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, Uuid> {
    /// Published posts, newest first, optionally restricted to a tag, sliced
    /// to the requested page (see [`crate::pagination`]).
    async fn list_published(
        &self,
        tag: Option<&Tag>,
        page: Option<&str>,
    ) -> Result<Page<Post>, RepoError>;

    /// The `limit` most recent published posts.
    async fn latest_published(&self, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Every published post, newest first.
    async fn all_published(&self) -> Result<Vec<Post>, RepoError>;

    async fn find_published_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError>;

    /// Any post (regardless of status) with this slug published on `date`.
    async fn find_by_slug_and_date(
        &self,
        slug: &str,
        date: NaiveDate,
    ) -> Result<Option<Post>, RepoError>;

    /// Trigram search over title and body.
    async fn search(
        &self,
        query: &SearchQuery,
        order: SearchOrder,
    ) -> Result<Vec<ScoredPost>, RepoError>;

    /// Published posts sharing tags with `post`, best match first.
    async fn similar_to(&self, post: &Post, limit: usize) -> Result<Vec<SimilarPost>, RepoError>;

    /// All posts ordered by status then publish date.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError>;
}

/// Comment repository.
#[async_trait]
pub trait CommentRepository: BaseRepository<Comment, Uuid> {
    /// Active comments of a post, oldest first.
    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError>;

    /// All comments, oldest first, optionally filtered by moderation flag.
    async fn list(&self, active: Option<bool>) -> Result<Vec<Comment>, RepoError>;

    /// Set the moderation flag on the given comments. Returns the number of comments found.
    async fn set_active(&self, ids: &[Uuid], active: bool) -> Result<u64, RepoError>;
}

/// Tag repository.
#[async_trait]
pub trait TagRepository: Send + Sync {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError>;

    /// Fetch the tag with this name's slug, creating it if missing.
    async fn get_or_create(&self, name: &str) -> Result<Tag, RepoError>;
}
