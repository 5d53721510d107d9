//! RSS feed and sitemap.

use actix_web::{HttpResponse, web};
use serde::Serialize;
use tera::Context;

use crate::middleware::error::AppResult;
use crate::state::AppState;
use crate::views::{excerpt, render_xml};

const FEED_TITLE: &str = "My blog";
const FEED_DESCRIPTION: &str = "New posts of my blog.";
const FEED_ITEMS: u64 = 5;

const SITEMAP_CHANGEFREQ: &str = "weekly";
const SITEMAP_PRIORITY: &str = "0.9";

#[derive(Serialize)]
struct FeedItem {
    title: String,
    link: String,
    guid: String,
    pub_date: String,
    description: String,
}

#[derive(Serialize)]
struct SitemapEntry {
    loc: String,
    lastmod: String,
    changefreq: &'static str,
    priority: &'static str,
}

/// GET /feed/
pub async fn latest_posts_feed(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.latest_published(FEED_ITEMS).await?;
    let items: Vec<FeedItem> = posts
        .iter()
        .map(|post| {
            let link = state.site.absolute(&post.absolute_url());
            FeedItem {
                title: post.title.clone(),
                guid: link.clone(),
                link,
                pub_date: post.publish.to_rfc2822(),
                description: excerpt(&post.body),
            }
        })
        .collect();

    let mut context = Context::new();
    context.insert("title", FEED_TITLE);
    context.insert("description", FEED_DESCRIPTION);
    context.insert("link", &state.site.absolute("/"));
    context.insert("feed_url", &state.site.absolute("/feed/"));
    context.insert("last_build", &posts.first().map(|p| p.publish.to_rfc2822()));
    context.insert("items", &items);
    render_xml(&state.views, "feed.xml", &context, "application/rss+xml")
}

/// GET /sitemap.xml
pub async fn sitemap(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.all_published().await?;
    let entries: Vec<SitemapEntry> = posts
        .iter()
        .map(|post| SitemapEntry {
            loc: state.site.absolute(&post.absolute_url()),
            lastmod: post.updated_at.format("%Y-%m-%d").to_string(),
            changefreq: SITEMAP_CHANGEFREQ,
            priority: SITEMAP_PRIORITY,
        })
        .collect();

    let mut context = Context::new();
    context.insert("entries", &entries);
    render_xml(&state.views, "sitemap.xml", &context, "application/xml")
}
