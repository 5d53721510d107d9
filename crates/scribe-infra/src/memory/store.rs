//! In-memory blog store - used when no database is configured, and in tests.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use uuid::Uuid;

use scribe_core::domain::{Comment, Post, Tag, User};
use scribe_core::error::RepoError;
use scribe_core::pagination::{POSTS_PER_PAGE, Page, Paginator};
use scribe_core::ports::{
    BaseRepository, CommentRepository, PostFilter, PostRepository, TagRepository, UserRepository,
};
use scribe_core::publication::{published, published_with_tag};
use scribe_core::search::{ScoredPost, SearchOrder, SearchQuery, rank_matches};
use scribe_core::similarity::{SimilarPost, rank_similar};

#[derive(Default)]
struct StoreState {
    users: Vec<User>,
    posts: Vec<Post>,
    comments: Vec<Comment>,
    tags: Vec<Tag>,
}

/// Every repository port over one lock-protected set of vectors.
///
/// Rows keep insertion order, which is the tie-break wherever two rows sort
/// equal. The same constraints as the relational schema are enforced: unique
/// slug per publish date, unique tag slug, unique user email, and comments
/// and posts must reference existing rows.
/// Note: Data is lost on process restart.
pub struct InMemoryStore {
    state: RwLock<StoreState>,
    operations: AtomicU64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            operations: AtomicU64::new(0),
        }
    }

    /// Number of repository calls served so far.
    pub fn operation_count(&self) -> u64 {
        self.operations.load(Ordering::Relaxed)
    }

    fn record(&self) {
        self.operations.fetch_add(1, Ordering::Relaxed);
    }

    fn upsert<T>(rows: &mut Vec<T>, row: T, id_of: impl Fn(&T) -> Uuid) {
        let id = id_of(&row);
        match rows.iter_mut().find(|r| id_of(r) == id) {
            Some(existing) => *existing = row,
            None => rows.push(row),
        }
    }

    fn remove<T>(rows: &mut Vec<T>, id: Uuid, id_of: impl Fn(&T) -> Uuid) -> Result<(), RepoError> {
        let before = rows.len();
        rows.retain(|r| id_of(r) != id);
        if rows.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn already_exists() -> RepoError {
    RepoError::Constraint("Entity already exists".to_string())
}

fn missing_reference() -> RepoError {
    RepoError::Constraint("Referenced entity does not exist".to_string())
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        self.record();
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        self.record();
        let mut state = self.state.write().await;
        if state
            .users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(already_exists());
        }
        Self::upsert(&mut state.users, user.clone(), |u| u.id);
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.record();
        let mut state = self.state.write().await;
        if state.posts.iter().any(|p| p.author_id == id) {
            return Err(RepoError::Constraint("User still has posts".to_string()));
        }
        Self::remove(&mut state.users, id, |u| u.id)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        self.record();
        let state = self.state.read().await;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.record();
        let state = self.state.read().await;
        Ok(state.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        self.record();
        let mut state = self.state.write().await;

        if !state.users.iter().any(|u| u.id == post.author_id) {
            return Err(missing_reference());
        }
        if post
            .tags
            .iter()
            .any(|t| !state.tags.iter().any(|stored| stored.id == t.id))
        {
            return Err(missing_reference());
        }
        let date = post.publish_date();
        if state
            .posts
            .iter()
            .any(|p| p.id != post.id && p.slug == post.slug && p.publish_date() == date)
        {
            return Err(already_exists());
        }

        Self::upsert(&mut state.posts, post.clone(), |p| p.id);
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.record();
        let mut state = self.state.write().await;
        Self::remove(&mut state.posts, id, |p| p.id)?;
        state.comments.retain(|c| c.post_id != id);
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn list_published(
        &self,
        tag: Option<&Tag>,
        page: Option<&str>,
    ) -> Result<Page<Post>, RepoError> {
        self.record();
        let state = self.state.read().await;
        let posts = state.posts.iter().cloned();
        let matching = match tag {
            Some(tag) => published_with_tag(posts, tag.id),
            None => published(posts),
        };
        Ok(Paginator::paginate(matching, POSTS_PER_PAGE, page))
    }

    async fn latest_published(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        self.record();
        let state = self.state.read().await;
        let mut posts = published(state.posts.iter().cloned());
        posts.truncate(limit as usize);
        Ok(posts)
    }

    async fn all_published(&self) -> Result<Vec<Post>, RepoError> {
        self.record();
        let state = self.state.read().await;
        Ok(published(state.posts.iter().cloned()))
    }

    async fn find_published_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        self.record();
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .find(|p| p.id == id && p.is_published())
            .cloned())
    }

    async fn find_by_slug_and_date(
        &self,
        slug: &str,
        date: NaiveDate,
    ) -> Result<Option<Post>, RepoError> {
        self.record();
        let state = self.state.read().await;
        Ok(state
            .posts
            .iter()
            .find(|p| p.slug == slug && p.publish_date() == date)
            .cloned())
    }

    async fn search(
        &self,
        query: &SearchQuery,
        order: SearchOrder,
    ) -> Result<Vec<ScoredPost>, RepoError> {
        self.record();
        let state = self.state.read().await;
        Ok(rank_matches(query, state.posts.iter().cloned(), order))
    }

    async fn similar_to(&self, post: &Post, limit: usize) -> Result<Vec<SimilarPost>, RepoError> {
        self.record();
        let state = self.state.read().await;
        Ok(rank_similar(post, state.posts.iter().cloned(), limit))
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        self.record();
        let state = self.state.read().await;
        let term = filter
            .search
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);

        let mut posts: Vec<Post> = state
            .posts
            .iter()
            .filter(|p| filter.status.is_none_or(|s| p.status == s))
            .filter(|p| {
                term.as_deref().is_none_or(|t| {
                    p.title.to_lowercase().contains(t) || p.body.to_lowercase().contains(t)
                })
            })
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            a.status
                .code()
                .cmp(b.status.code())
                .then(a.publish.cmp(&b.publish))
        });
        Ok(posts)
    }
}

#[async_trait]
impl BaseRepository<Comment, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Comment>, RepoError> {
        self.record();
        let state = self.state.read().await;
        Ok(state.comments.iter().find(|c| c.id == id).cloned())
    }

    async fn save(&self, comment: Comment) -> Result<Comment, RepoError> {
        self.record();
        let mut state = self.state.write().await;
        if !state.posts.iter().any(|p| p.id == comment.post_id) {
            return Err(missing_reference());
        }
        Self::upsert(&mut state.comments, comment.clone(), |c| c.id);
        Ok(comment)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        self.record();
        let mut state = self.state.write().await;
        Self::remove(&mut state.comments, id, |c| c.id)
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        self.record();
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| c.post_id == post_id && c.active)
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn list(&self, active: Option<bool>) -> Result<Vec<Comment>, RepoError> {
        self.record();
        let state = self.state.read().await;
        let mut comments: Vec<Comment> = state
            .comments
            .iter()
            .filter(|c| active.is_none_or(|a| c.active == a))
            .cloned()
            .collect();
        comments.sort_by_key(|c| c.created_at);
        Ok(comments)
    }

    async fn set_active(&self, ids: &[Uuid], active: bool) -> Result<u64, RepoError> {
        self.record();
        let mut state = self.state.write().await;
        let mut updated = 0;
        for comment in state.comments.iter_mut().filter(|c| ids.contains(&c.id)) {
            comment.set_active(active);
            updated += 1;
        }
        Ok(updated)
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        self.record();
        let state = self.state.read().await;
        Ok(state.tags.iter().find(|t| t.slug == slug).cloned())
    }

    async fn get_or_create(&self, name: &str) -> Result<Tag, RepoError> {
        self.record();
        let candidate = Tag::new(name);
        let mut state = self.state.write().await;
        if let Some(existing) = state.tags.iter().find(|t| t.slug == candidate.slug) {
            return Ok(existing.clone());
        }
        state.tags.push(candidate.clone());
        Ok(candidate)
    }
}
