use chrono::{Duration, Utc};
use uuid::Uuid;

use scribe_core::domain::{Comment, Post, PostStatus, Tag, User};
use scribe_core::editorial::{resolve_tags, save_post};
use scribe_core::error::{DomainError, RepoError};
use scribe_core::ports::{
    BaseRepository, CommentRepository, PostFilter, PostRepository, TagRepository, UserRepository,
};
use scribe_core::search::{SearchOrder, SearchQuery};

use super::InMemoryStore;

async fn seed_author(store: &InMemoryStore) -> User {
    let user = User::new(
        Uuid::new_v4(),
        "admin".to_string(),
        "admin@example.com".to_string(),
    );
    BaseRepository::<User, Uuid>::save(store, user).await.unwrap()
}

fn published(author: &User, title: &str, age_days: i64) -> Post {
    Post::new(author.id, title.to_string(), format!("Body of {}", title))
        .with_status(PostStatus::Published)
        .with_publish(Utc::now() - Duration::days(age_days))
}

async fn store_post(store: &InMemoryStore, post: Post) -> Post {
    BaseRepository::<Post, Uuid>::save(store, post).await.unwrap()
}

#[tokio::test]
async fn test_list_published_paginates_newest_first() {
    let store = InMemoryStore::new();
    let author = seed_author(&store).await;
    for age in 1..=7 {
        store_post(&store, published(&author, &format!("Post {}", age), age)).await;
    }
    store_post(
        &store,
        published(&author, "Draft", 0).with_status(PostStatus::Draft),
    )
    .await;

    let first = store.list_published(None, None).await.unwrap();
    assert_eq!(first.total, 7);
    assert_eq!(first.num_pages, 2);
    assert_eq!(first.items[0].title, "Post 1");
    assert_eq!(first.items.len(), 5);

    let second = store.list_published(None, Some("2")).await.unwrap();
    assert_eq!(second.items.len(), 2);
    assert_eq!(second.items[1].title, "Post 7");

    let clamped = store.list_published(None, Some("99")).await.unwrap();
    assert_eq!(clamped.number, 2);

    let garbage = store.list_published(None, Some("abc")).await.unwrap();
    assert_eq!(garbage.number, 1);
}

#[tokio::test]
async fn test_list_published_by_tag() {
    let store = InMemoryStore::new();
    let author = seed_author(&store).await;
    let rust = store.get_or_create("Rust").await.unwrap();

    store_post(
        &store,
        published(&author, "Tagged", 1).with_tags(vec![rust.clone()]),
    )
    .await;
    store_post(&store, published(&author, "Untagged", 2)).await;

    let page = store.list_published(Some(&rust), None).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Tagged");
}

#[tokio::test]
async fn test_post_requires_existing_author_and_tags() {
    let store = InMemoryStore::new();
    let orphan = Post::new(Uuid::new_v4(), "Orphan".into(), String::new());

    let result = BaseRepository::<Post, Uuid>::save(&store, orphan).await;
    assert!(matches!(result, Err(RepoError::Constraint(_))));

    let author = seed_author(&store).await;
    let unsaved_tag = Post::new(author.id, "Ghost tag".into(), String::new())
        .with_tags(vec![Tag::new("ghost")]);
    let result = BaseRepository::<Post, Uuid>::save(&store, unsaved_tag).await;
    assert!(matches!(result, Err(RepoError::Constraint(_))));
}

#[tokio::test]
async fn test_save_post_rejects_slug_clash_on_same_day() {
    let store = InMemoryStore::new();
    let author = seed_author(&store).await;
    let now = Utc::now();

    let first = Post::new(author.id, "Hello World".into(), String::new()).with_publish(now);
    save_post(&store, first).await.unwrap();

    let clash = Post::new(author.id, "Hello World".into(), String::new()).with_publish(now);
    let result = save_post(&store, clash).await;
    assert!(matches!(result, Err(DomainError::Duplicate(_))));

    let next_day = Post::new(author.id, "Hello World".into(), String::new())
        .with_publish(now + Duration::days(1));
    let saved = save_post(&store, next_day).await.unwrap();
    assert_eq!(saved.slug, "hello-world");
}

#[tokio::test]
async fn test_save_post_derives_and_validates_slug() {
    let store = InMemoryStore::new();
    let author = seed_author(&store).await;

    let derived = Post::new(author.id, "  Rust Tips  ".into(), String::new()).with_slug("");
    let saved = save_post(&store, derived).await.unwrap();
    assert_eq!(saved.title, "Rust Tips");
    assert_eq!(saved.slug, "rust-tips");

    let invalid = Post::new(author.id, "Other".into(), String::new()).with_slug("Not A Slug");
    let result = save_post(&store, invalid).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));

    let untitled = Post::new(author.id, "   ".into(), String::new());
    let result = save_post(&store, untitled).await;
    assert!(matches!(result, Err(DomainError::Validation(_))));
}

#[tokio::test]
async fn test_resolve_tags_reuses_existing() {
    let store = InMemoryStore::new();
    let names = vec![
        "Rust".to_string(),
        "rust".to_string(),
        " ".to_string(),
        "Web Dev".to_string(),
    ];

    let first = resolve_tags(&store, &names).await.unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first[1].slug, "web-dev");

    let again = resolve_tags(&store, &["RUST".to_string()]).await.unwrap();
    assert_eq!(again[0].id, first[0].id);
}

#[tokio::test]
async fn test_search_skips_drafts_and_orders() {
    let store = InMemoryStore::new();
    let author = seed_author(&store).await;

    store_post(&store, published(&author, "Django Tips", 2)).await;
    store_post(&store, published(&author, "Django", 1)).await;
    store_post(
        &store,
        published(&author, "Django Draft", 0).with_status(PostStatus::Draft),
    )
    .await;
    store_post(&store, published(&author, "Rust Async", 3)).await;

    let query = SearchQuery::parse(Some("djano")).unwrap();
    let ascending = store.search(&query, SearchOrder::Ascending).await.unwrap();
    let titles: Vec<&str> = ascending.iter().map(|m| m.post.title.as_str()).collect();
    assert_eq!(titles, vec!["Django Tips", "Django"]);

    let descending = store.search(&query, SearchOrder::Descending).await.unwrap();
    assert_eq!(descending[0].post.title, "Django");
}

#[tokio::test]
async fn test_similar_posts_by_shared_tags() {
    let store = InMemoryStore::new();
    let author = seed_author(&store).await;
    let x = store.get_or_create("x").await.unwrap();
    let y = store.get_or_create("y").await.unwrap();
    let z = store.get_or_create("z").await.unwrap();

    let a = store_post(
        &store,
        published(&author, "A", 3).with_tags(vec![x.clone(), y.clone()]),
    )
    .await;
    store_post(
        &store,
        published(&author, "B", 2).with_tags(vec![x.clone(), y.clone(), z.clone()]),
    )
    .await;
    store_post(&store, published(&author, "C", 1).with_tags(vec![x.clone()])).await;
    store_post(&store, published(&author, "D", 0).with_tags(vec![z])).await;

    let similar = store.similar_to(&a, 4).await.unwrap();
    let ranked: Vec<(&str, usize)> = similar
        .iter()
        .map(|s| (s.post.title.as_str(), s.same_tags))
        .collect();
    assert_eq!(ranked, vec![("B", 2), ("C", 1)]);
}

#[tokio::test]
async fn test_comment_moderation_round_trip() {
    let store = InMemoryStore::new();
    let author = seed_author(&store).await;
    let post = store_post(&store, published(&author, "Commented", 1)).await;

    let comment = Comment::new(
        post.id,
        "Reader".into(),
        "reader@example.com".into(),
        "Nice post".into(),
    );
    BaseRepository::<Comment, Uuid>::save(&store, comment.clone())
        .await
        .unwrap();
    assert_eq!(store.active_for_post(post.id).await.unwrap().len(), 1);

    assert_eq!(store.set_active(&[comment.id], false).await.unwrap(), 1);
    assert!(store.active_for_post(post.id).await.unwrap().is_empty());
    assert_eq!(CommentRepository::list(&store, Some(false)).await.unwrap().len(), 1);

    assert_eq!(store.set_active(&[comment.id, Uuid::new_v4()], true).await.unwrap(), 1);
    assert_eq!(store.active_for_post(post.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_comment_requires_post_and_is_deleted_with_it() {
    let store = InMemoryStore::new();
    let author = seed_author(&store).await;

    let stray = Comment::new(Uuid::new_v4(), "x".into(), "x@example.com".into(), "x".into());
    let result = BaseRepository::<Comment, Uuid>::save(&store, stray).await;
    assert!(matches!(result, Err(RepoError::Constraint(_))));

    let post = store_post(&store, published(&author, "Doomed", 1)).await;
    let comment = Comment::new(post.id, "x".into(), "x@example.com".into(), "x".into());
    BaseRepository::<Comment, Uuid>::save(&store, comment.clone())
        .await
        .unwrap();

    BaseRepository::<Post, Uuid>::delete(&store, post.id)
        .await
        .unwrap();
    let found = BaseRepository::<Comment, Uuid>::find_by_id(&store, comment.id)
        .await
        .unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn test_admin_list_filters_and_orders() {
    let store = InMemoryStore::new();
    let author = seed_author(&store).await;

    store_post(&store, published(&author, "Newer", 1)).await;
    store_post(&store, published(&author, "Older", 5)).await;
    store_post(
        &store,
        published(&author, "Draft about Rust", 0).with_status(PostStatus::Draft),
    )
    .await;

    let all = PostRepository::list(&store, &PostFilter::default()).await.unwrap();
    let titles: Vec<&str> = all.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Draft about Rust", "Older", "Newer"]);

    let drafts = PostRepository::list(
        &store,
        &PostFilter {
            status: Some(PostStatus::Draft),
            search: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(drafts.len(), 1);

    for term in ["Rust", "rust", "ABOUT RUST"] {
        let searched = PostRepository::list(
            &store,
            &PostFilter {
                status: None,
                search: Some(term.to_string()),
            },
        )
        .await
        .unwrap();
        assert_eq!(searched.len(), 1, "term = {}", term);
    }
}

#[tokio::test]
async fn test_users_have_unique_emails() {
    let store = InMemoryStore::new();
    let author = seed_author(&store).await;

    let found = store.find_by_email("admin@example.com").await.unwrap();
    assert_eq!(found.map(|u| u.id), Some(author.id));

    let twin = User::new(
        Uuid::new_v4(),
        "twin".to_string(),
        "admin@example.com".to_string(),
    );
    let result = BaseRepository::<User, Uuid>::save(&store, twin).await;
    assert!(matches!(result, Err(RepoError::Constraint(_))));
}

#[tokio::test]
async fn test_operation_count_tracks_calls() {
    let store = InMemoryStore::new();
    assert_eq!(store.operation_count(), 0);

    store.find_by_slug("nothing").await.unwrap();
    store.all_published().await.unwrap();
    assert_eq!(store.operation_count(), 2);
}
