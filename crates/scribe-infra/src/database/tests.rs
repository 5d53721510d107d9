use std::collections::BTreeMap;

use chrono::{TimeDelta, Utc};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use uuid::Uuid;

use scribe_core::domain::{Post, Tag};
use scribe_core::error::RepoError;
use scribe_core::ports::{BaseRepository, CommentRepository, PostFilter, PostRepository};
use scribe_core::search::{SearchOrder, SearchQuery};

use crate::database::entity::{post, post_tag, tag};
use crate::database::postgres_repo::{PostgresCommentRepository, PostgresPostRepository};

fn post_model(title: &str, days_ago: i64) -> post::Model {
    let now = Utc::now() - TimeDelta::days(days_ago);
    post::Model {
        id: Uuid::new_v4(),
        author_id: Uuid::new_v4(),
        title: title.to_owned(),
        slug: title.to_lowercase().replace(' ', "-"),
        body: "Content".to_owned(),
        publish: now.into(),
        created_at: now.into(),
        updated_at: now.into(),
        status: post::Status::Published,
    }
}

#[tokio::test]
async fn test_find_post_by_id_attaches_tags() {
    let model = post_model("Test Post", 0);
    let post_id = model.id;
    let tag_id = Uuid::new_v4();

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![model]])
        .append_query_results([vec![post_tag::Model { post_id, tag_id }]])
        .append_query_results([vec![tag::Model {
            id: tag_id,
            name: "Rust".to_owned(),
            slug: "rust".to_owned(),
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post: Option<Post> = repo.find_by_id(post_id).await.unwrap();

    let post = post.unwrap();
    assert_eq!(post.id, post_id);
    assert_eq!(post.title, "Test Post");
    assert_eq!(post.tags.len(), 1);
    assert_eq!(post.tags[0].slug, "rust");
}

#[tokio::test]
async fn test_find_post_by_id_missing_skips_tag_queries() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = repo.find_by_id(Uuid::new_v4()).await.unwrap();

    assert!(post.is_none());
    assert_eq!(repo.into_connection().into_transaction_log().len(), 1);
}

#[tokio::test]
async fn test_search_keeps_score_order() {
    let weak = post_model("Django Tips", 2);
    let strong = post_model("Django Deep Dive", 1);

    let hit = |id: Uuid, score: f64| {
        BTreeMap::from([("id", Value::from(id)), ("score", Value::from(score))])
    };

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![hit(strong.id, 0.6), hit(weak.id, 0.3)]])
        // Model lookup comes back in arbitrary order.
        .append_query_results([vec![weak.clone(), strong.clone()]])
        .append_query_results([Vec::<post_tag::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let query = SearchQuery::parse(Some("django")).unwrap();
    let results = repo.search(&query, SearchOrder::Descending).await.unwrap();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].post.id, strong.id);
    assert!((results[0].similarity - 0.6).abs() < f64::EPSILON);
    assert_eq!(results[1].post.id, weak.id);

    let log = format!("{:?}", repo.into_connection().into_transaction_log());
    assert!(log.contains("similarity(title, $1)"));
    assert!(log.contains("ORDER BY score DESC"));
}

#[tokio::test]
async fn test_similar_to_untagged_post_runs_no_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresPostRepository::new(db);
    let post = Post::from(post_model("Lonely", 0));

    let similar = repo.similar_to(&post, 4).await.unwrap();

    assert!(similar.is_empty());
    assert!(repo.into_connection().into_transaction_log().is_empty());
}

#[tokio::test]
async fn test_similar_to_carries_shared_tag_count() {
    let other = post_model("Other", 1);
    let post = Post::from(post_model("Reference", 0)).with_tags(vec![Tag::new("rust")]);

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([
            ("id", Value::from(other.id)),
            ("same_tags", Value::from(2i64)),
        ])]])
        .append_query_results([vec![other.clone()]])
        .append_query_results([Vec::<post_tag::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let similar = repo.similar_to(&post, 4).await.unwrap();

    assert_eq!(similar.len(), 1);
    assert_eq!(similar[0].post.id, other.id);
    assert_eq!(similar[0].same_tags, 2);
}

#[tokio::test]
async fn test_list_published_second_page() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![BTreeMap::from([(
            "num_items",
            Value::BigInt(Some(7)),
        )])]])
        .append_query_results([vec![post_model("Six", 6), post_model("Seven", 7)]])
        .append_query_results([Vec::<post_tag::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let page = repo.list_published(None, Some("2")).await.unwrap();

    assert_eq!(page.number, 2);
    assert_eq!(page.num_pages, 2);
    assert_eq!(page.total, 7);
    assert_eq!(page.items.len(), 2);
    assert!(page.has_previous());
    assert!(!page.has_next());
}

#[tokio::test]
async fn test_save_post_replaces_tag_links() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 3,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            },
        ])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = Post::from(post_model("Tagged", 0))
        .with_tags(vec![Tag::new("rust"), Tag::new("web")]);

    let saved = repo.save(post.clone()).await.unwrap();
    assert_eq!(saved.id, post.id);

    let log = format!("{:?}", repo.into_connection().into_transaction_log());
    assert!(log.contains("ON CONFLICT"));
    assert!(log.contains("DELETE FROM \\\"post_tags\\\""));
}

#[tokio::test]
async fn test_admin_list_search_ignores_case() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let filter = PostFilter {
        search: Some("Django".to_owned()),
        ..PostFilter::default()
    };
    assert!(repo.list(&filter).await.unwrap().is_empty());

    let log = format!("{:?}", repo.into_connection().into_transaction_log());
    assert!(log.contains("ILIKE"));
    assert!(log.contains("%Django%"));
}

#[tokio::test]
async fn test_delete_missing_post_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let result = repo.delete(Uuid::new_v4()).await;

    assert!(matches!(result, Err(RepoError::NotFound)));
}

#[tokio::test]
async fn test_set_active_reports_rows_affected() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 3,
        }])
        .into_connection();

    let repo = PostgresCommentRepository::new(db);
    let ids = vec![Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];

    assert_eq!(repo.set_active(&ids, true).await.unwrap(), 3);
}

#[tokio::test]
async fn test_set_active_with_no_ids_skips_query() {
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresCommentRepository::new(db);

    assert_eq!(repo.set_active(&[], false).await.unwrap(), 0);
    assert!(repo.into_connection().into_transaction_log().is_empty());
}
