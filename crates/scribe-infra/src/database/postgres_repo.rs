//! PostgreSQL repository implementations.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeDelta, Utc};
use sea_orm::sea_query::extension::postgres::PgExpr;
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ColumnTrait, Condition, DbBackend, DbConn, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Select, Set, Statement, TransactionTrait,
};
use uuid::Uuid;

use scribe_core::domain::{Comment, Post, Tag, User};
use scribe_core::error::RepoError;
use scribe_core::pagination::{POSTS_PER_PAGE, Page, Paginator};
use scribe_core::ports::{
    BaseRepository, CommentRepository, PostFilter, PostRepository, TagRepository, UserRepository,
};
use scribe_core::search::{SIMILARITY_THRESHOLD, ScoredPost, SearchOrder, SearchQuery};
use scribe_core::similarity::SimilarPost;

use super::entity::comment::{self, Entity as CommentEntity};
use super::entity::post::{self, Entity as PostEntity, Status};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::postgres_base::{PostgresBaseRepository, query_err, upsert, write_err};
use crate::mail::mask_email;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

/// PostgreSQL comment repository.
pub type PostgresCommentRepository = PostgresBaseRepository<CommentEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// Trigram search, scored by `pg_trgm`'s `similarity()`.
fn search_sql(order: SearchOrder) -> String {
    let direction = match order {
        SearchOrder::Ascending => "ASC",
        SearchOrder::Descending => "DESC",
    };
    format!(
        "SELECT id, (similarity(title, $1) + similarity(body, $1))::float8 AS score \
         FROM posts \
         WHERE status = 'PB' \
         AND (similarity(title, $1) + similarity(body, $1))::float8 > $2 \
         ORDER BY score {}, publish DESC",
        direction
    )
}

/// Published posts sharing tags with post `$1`, most shared tags first.
const SIMILAR_SQL: &str = "SELECT p.id AS id, COUNT(*) AS same_tags \
     FROM posts p \
     JOIN post_tags pt ON pt.post_id = p.id \
     WHERE p.status = 'PB' \
     AND p.id <> $1 \
     AND pt.tag_id IN (SELECT tag_id FROM post_tags WHERE post_id = $1) \
     GROUP BY p.id, p.publish \
     ORDER BY same_tags DESC, p.publish DESC \
     LIMIT $2";

#[derive(Debug, FromQueryResult)]
struct SearchHit {
    id: Uuid,
    score: f64,
}

#[derive(Debug, FromQueryResult)]
struct SimilarHit {
    id: Uuid,
    same_tags: i64,
}

/// PostgreSQL post repository. Posts carry their tags, so loading and saving
/// go through the `post_tags` association table.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    #[cfg(test)]
    pub(crate) fn into_connection(self) -> DbConn {
        self.db
    }

    fn published() -> Select<PostEntity> {
        PostEntity::find().filter(post::Column::Status.eq(Status::Published))
    }

    fn newest_first(select: Select<PostEntity>) -> Select<PostEntity> {
        select
            .order_by_desc(post::Column::Publish)
            .order_by_asc(post::Column::CreatedAt)
    }

    /// Attach tags to each model, two queries regardless of how many posts.
    async fn with_tags(&self, models: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
        let links = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(ids))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        let tag_ids: HashSet<Uuid> = links.iter().map(|l| l.tag_id).collect();
        let tags: HashMap<Uuid, Tag> = if tag_ids.is_empty() {
            HashMap::new()
        } else {
            TagEntity::find()
                .filter(tag::Column::Id.is_in(tag_ids))
                .all(&self.db)
                .await
                .map_err(query_err)?
                .into_iter()
                .map(|m| (m.id, Tag::from(m)))
                .collect()
        };

        Ok(models
            .into_iter()
            .map(|model| {
                let mut post_tags: Vec<Tag> = links
                    .iter()
                    .filter(|l| l.post_id == model.id)
                    .filter_map(|l| tags.get(&l.tag_id).cloned())
                    .collect();
                post_tags.sort_by(|a, b| a.name.cmp(&b.name));
                Post::from(model).with_tags(post_tags)
            })
            .collect())
    }

    async fn one_with_tags(&self, model: Option<post::Model>) -> Result<Option<Post>, RepoError> {
        match model {
            Some(model) => Ok(self.with_tags(vec![model]).await?.pop()),
            None => Ok(None),
        }
    }

    /// Load posts by id, returned in the order of `ids`.
    async fn load_in_order(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Post>, RepoError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let models = PostEntity::find()
            .filter(post::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(self
            .with_tags(models)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Post, Uuid> for PostgresPostRepository {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = PostEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(query_err)?;
        self.one_with_tags(model).await
    }

    async fn save(&self, post: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(query_err)?;

        upsert::<PostEntity, _>(&txn, post.clone().into()).await?;

        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(query_err)?;

        if !post.tags.is_empty() {
            let links = post.tags.iter().map(|t| post_tag::ActiveModel {
                post_id: Set(post.id),
                tag_id: Set(t.id),
            });
            PostTagEntity::insert_many(links)
                .exec_without_returning(&txn)
                .await
                .map_err(write_err)?;
        }

        txn.commit().await.map_err(query_err)?;
        tracing::debug!(post_id = %post.id, tags = post.tags.len(), "Post saved");
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let result = PostEntity::delete_by_id(id)
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn list_published(
        &self,
        tag: Option<&Tag>,
        page: Option<&str>,
    ) -> Result<Page<Post>, RepoError> {
        let mut select = Self::published();
        if let Some(tag) = tag {
            select = select.filter(
                post::Column::Id.in_subquery(
                    Query::select()
                        .column(post_tag::Column::PostId)
                        .from(PostTagEntity)
                        .and_where(post_tag::Column::TagId.eq(tag.id))
                        .to_owned(),
                ),
            );
        }

        let total = select.clone().count(&self.db).await.map_err(query_err)?;
        let paginator = Paginator::new(total, POSTS_PER_PAGE);
        let window = paginator.resolve(page);

        let models = Self::newest_first(select)
            .offset(window.offset)
            .limit(window.limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(Page::new(self.with_tags(models).await?, window, &paginator))
    }

    async fn latest_published(&self, limit: u64) -> Result<Vec<Post>, RepoError> {
        let models = Self::newest_first(Self::published())
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        self.with_tags(models).await
    }

    async fn all_published(&self) -> Result<Vec<Post>, RepoError> {
        let models = Self::newest_first(Self::published())
            .all(&self.db)
            .await
            .map_err(query_err)?;
        self.with_tags(models).await
    }

    async fn find_published_by_id(&self, id: Uuid) -> Result<Option<Post>, RepoError> {
        let model = Self::published()
            .filter(post::Column::Id.eq(id))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        self.one_with_tags(model).await
    }

    async fn find_by_slug_and_date(
        &self,
        slug: &str,
        date: NaiveDate,
    ) -> Result<Option<Post>, RepoError> {
        let day_start = date.and_time(NaiveTime::MIN).and_utc();
        let day_end = day_start + TimeDelta::days(1);

        let model = PostEntity::find()
            .filter(post::Column::Slug.eq(slug))
            .filter(post::Column::Publish.gte(day_start))
            .filter(post::Column::Publish.lt(day_end))
            .one(&self.db)
            .await
            .map_err(query_err)?;
        self.one_with_tags(model).await
    }

    async fn search(
        &self,
        query: &SearchQuery,
        order: SearchOrder,
    ) -> Result<Vec<ScoredPost>, RepoError> {
        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            search_sql(order),
            [query.as_str().into(), SIMILARITY_THRESHOLD.into()],
        );
        let hits = SearchHit::find_by_statement(statement)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        tracing::debug!(query = %query, hits = hits.len(), "Trigram search");

        let ids: Vec<Uuid> = hits.iter().map(|h| h.id).collect();
        let mut posts = self.load_in_order(&ids).await?;

        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                posts.remove(&hit.id).map(|post| ScoredPost {
                    post,
                    similarity: hit.score,
                })
            })
            .collect())
    }

    async fn similar_to(&self, post: &Post, limit: usize) -> Result<Vec<SimilarPost>, RepoError> {
        if post.tags.is_empty() {
            return Ok(Vec::new());
        }

        let statement = Statement::from_sql_and_values(
            DbBackend::Postgres,
            SIMILAR_SQL,
            [post.id.into(), (limit as i64).into()],
        );
        let hits = SimilarHit::find_by_statement(statement)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        let ids: Vec<Uuid> = hits.iter().map(|h| h.id).collect();
        let mut posts = self.load_in_order(&ids).await?;

        Ok(hits
            .into_iter()
            .filter_map(|hit| {
                posts.remove(&hit.id).map(|post| SimilarPost {
                    post,
                    same_tags: hit.same_tags as usize,
                })
            })
            .collect())
    }

    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, RepoError> {
        let mut select = PostEntity::find();
        if let Some(status) = filter.status {
            select = select.filter(post::Column::Status.eq(Status::from(status)));
        }
        if let Some(term) = filter.search.as_deref().filter(|t| !t.is_empty()) {
            let pattern = format!("%{}%", term);
            select = select.filter(
                Condition::any()
                    .add(Expr::col(post::Column::Title).ilike(pattern.as_str()))
                    .add(Expr::col(post::Column::Body).ilike(pattern.as_str())),
            );
        }

        let models = select
            .order_by_asc(post::Column::Status)
            .order_by_asc(post::Column::Publish)
            .all(&self.db)
            .await
            .map_err(query_err)?;
        self.with_tags(models).await
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn active_for_post(&self, post_id: Uuid) -> Result<Vec<Comment>, RepoError> {
        let result = CommentEntity::find()
            .filter(comment::Column::PostId.eq(post_id))
            .filter(comment::Column::Active.eq(true))
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn list(&self, active: Option<bool>) -> Result<Vec<Comment>, RepoError> {
        let mut select = CommentEntity::find();
        if let Some(active) = active {
            select = select.filter(comment::Column::Active.eq(active));
        }

        let result = select
            .order_by_asc(comment::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn set_active(&self, ids: &[Uuid], active: bool) -> Result<u64, RepoError> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = CommentEntity::update_many()
            .col_expr(comment::Column::Active, Expr::value(active))
            .col_expr(comment::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(comment::Column::Id.is_in(ids.iter().copied()))
            .exec(&self.db)
            .await
            .map_err(query_err)?;

        tracing::info!(count = result.rows_affected, active, "Comment moderation updated");
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, RepoError> {
        let result = TagEntity::find()
            .filter(tag::Column::Slug.eq(slug))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }

    async fn get_or_create(&self, name: &str) -> Result<Tag, RepoError> {
        let candidate = Tag::new(name);
        if let Some(existing) = self.find_by_slug(&candidate.slug).await? {
            return Ok(existing);
        }

        // A concurrent writer may win the race; the slug index keeps one row.
        TagEntity::insert(tag::ActiveModel::from(candidate.clone()))
            .on_conflict(OnConflict::column(tag::Column::Slug).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await
            .map_err(write_err)?;

        self.find_by_slug(&candidate.slug)
            .await?
            .ok_or(RepoError::NotFound)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(user_email = %mask_email(email), "Finding user by email");

        let result = UserEntity::find()
            .filter(user::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(query_err)?;

        Ok(result.map(Into::into))
    }
}
