//! Application state - shared across all handlers.

use std::sync::Arc;

use tera::Tera;

use scribe_core::ports::{
    CommentRepository, Mailer, PostRepository, TagRepository, UserRepository,
};
use scribe_infra::{InMemoryStore, LogMailer};

#[cfg(feature = "postgres")]
use scribe_infra::database::{
    self, DbConn, PostgresCommentRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};

#[cfg(feature = "rate-limit")]
use scribe_core::ports::RateLimiter;
#[cfg(feature = "rate-limit")]
use scribe_infra::rate_limit::{InMemoryRateLimiter, RateLimitConfig};

use crate::config::{AppConfig, SiteConfig};
use crate::views;

/// Which backend the repositories talk to.
#[derive(Clone)]
pub enum Storage {
    Memory,
    #[cfg(feature = "postgres")]
    Postgres(DbConn),
}

impl Storage {
    pub fn name(&self) -> &'static str {
        match self {
            Storage::Memory => "memory",
            #[cfg(feature = "postgres")]
            Storage::Postgres(_) => "postgres",
        }
    }

    /// Whether the backend answers.
    pub async fn is_reachable(&self) -> bool {
        match self {
            Storage::Memory => true,
            #[cfg(feature = "postgres")]
            Storage::Postgres(conn) => match database::ping(conn).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(error = %e, "Database ping failed");
                    false
                }
            },
        }
    }
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
    pub users: Arc<dyn UserRepository>,
    pub mailer: Arc<dyn Mailer>,
    pub views: Arc<Tera>,
    pub site: Arc<SiteConfig>,
    pub storage: Storage,
    #[cfg(feature = "rate-limit")]
    pub rate_limiter: Arc<dyn RateLimiter>,
}

impl AppState {
    /// Wire every repository port to one in-memory store.
    pub fn in_memory(
        store: Arc<InMemoryStore>,
        mailer: Arc<dyn Mailer>,
        views: Arc<Tera>,
        site: SiteConfig,
    ) -> Self {
        Self {
            posts: store.clone(),
            comments: store.clone(),
            tags: store.clone(),
            users: store,
            mailer,
            views,
            site: Arc::new(site),
            storage: Storage::Memory,
            #[cfg(feature = "rate-limit")]
            rate_limiter: Arc::new(InMemoryRateLimiter::new(RateLimitConfig::default())),
        }
    }

    #[cfg(feature = "rate-limit")]
    pub fn with_rate_limiter(mut self, limiter: Arc<dyn RateLimiter>) -> Self {
        self.rate_limiter = limiter;
        self
    }

    #[cfg(feature = "postgres")]
    fn postgres(conn: DbConn, mailer: Arc<dyn Mailer>, views: Arc<Tera>, site: SiteConfig) -> Self {
        Self {
            posts: Arc::new(PostgresPostRepository::new(conn.clone())),
            comments: Arc::new(PostgresCommentRepository::new(conn.clone())),
            tags: Arc::new(PostgresTagRepository::new(conn.clone())),
            users: Arc::new(PostgresUserRepository::new(conn.clone())),
            mailer,
            views,
            site: Arc::new(site),
            storage: Storage::Postgres(conn),
            #[cfg(feature = "rate-limit")]
            rate_limiter: Arc::new(InMemoryRateLimiter::new(RateLimitConfig::default())),
        }
    }

    /// Build the application state with appropriate implementations.
    pub async fn new(config: &AppConfig) -> Result<Self, tera::Error> {
        let views = Arc::new(views::load_templates(&config.site.template_dir)?);
        let mailer: Arc<dyn Mailer> = Arc::new(LogMailer::new());
        let site = config.site.clone();

        #[cfg(feature = "postgres")]
        let state = match &config.database {
            Some(db_config) => match database::connect(db_config).await {
                Ok(conn) => Self::postgres(conn, mailer, views, site),
                Err(e) => {
                    tracing::error!(
                        "Failed to connect to database: {}. Using in-memory fallback.",
                        e
                    );
                    Self::in_memory(Arc::new(InMemoryStore::new()), mailer, views, site)
                }
            },
            None => {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                Self::in_memory(Arc::new(InMemoryStore::new()), mailer, views, site)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let state = {
            if config.database.is_some() {
                tracing::warn!("DATABASE_URL ignored: built without the postgres feature");
            }
            Self::in_memory(Arc::new(InMemoryStore::new()), mailer, views, site)
        };

        #[cfg(feature = "rate-limit")]
        let state = state.with_rate_limiter(Arc::new(InMemoryRateLimiter::new(
            config.rate_limit.clone(),
        )));

        tracing::info!(storage = state.storage.name(), "Application state initialized");
        Ok(state)
    }
}
