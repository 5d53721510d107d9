//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;

use scribe_core::search::SearchOrder;
use scribe_infra::database::DatabaseConfig;

#[cfg(feature = "auth")]
use scribe_infra::auth::JwtConfig;
#[cfg(feature = "rate-limit")]
use scribe_infra::rate_limit::RateLimitConfig;

/// Settings the views need at request time.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// Scheme and host used for absolute links (feed, sitemap, share email).
    pub site_url: String,
    pub template_dir: String,
    pub search_order: SearchOrder,
    pub mail_from: String,
    /// Identify clients by `X-Forwarded-For` / `Forwarded` instead of the
    /// socket peer. Only safe behind a proxy that overwrites those headers.
    pub trust_proxy: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost:8080".to_string(),
            template_dir: default_template_dir(),
            search_order: SearchOrder::default(),
            mail_from: "webmaster@localhost".to_string(),
            trust_proxy: false,
        }
    }
}

impl SiteConfig {
    /// Absolute form of a site path.
    pub fn absolute(&self, path: &str) -> String {
        format!("{}{}", self.site_url.trim_end_matches('/'), path)
    }
}

pub fn default_template_dir() -> String {
    concat!(env!("CARGO_MANIFEST_DIR"), "/templates").to_string()
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub database: Option<DatabaseConfig>,
    pub site: SiteConfig,
    #[cfg(feature = "auth")]
    pub jwt: JwtConfig,
    #[cfg(feature = "rate-limit")]
    pub rate_limit: RateLimitConfig,
    pub production: bool,
}

fn parsed<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(100),
            min_connections: parsed("DB_MIN_CONNECTIONS").unwrap_or(10),
        });

        let defaults = SiteConfig::default();
        let search_order = match env::var("SEARCH_ORDER") {
            Ok(raw) => raw.parse::<SearchOrder>().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Ignoring SEARCH_ORDER");
                SearchOrder::default()
            }),
            Err(_) => SearchOrder::default(),
        };
        let site = SiteConfig {
            site_url: env::var("SITE_URL").unwrap_or(defaults.site_url),
            template_dir: env::var("TEMPLATE_DIR").unwrap_or(defaults.template_dir),
            search_order,
            mail_from: env::var("MAIL_FROM").unwrap_or(defaults.mail_from),
            trust_proxy: parsed("TRUST_PROXY").unwrap_or(defaults.trust_proxy),
        };

        let production = env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false);

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            database,
            site,
            #[cfg(feature = "auth")]
            jwt: Self::jwt_from_env(production),
            #[cfg(feature = "rate-limit")]
            rate_limit: Self::rate_limit_from_env(),
            production,
        }
    }

    #[cfg(feature = "auth")]
    fn jwt_from_env(production: bool) -> JwtConfig {
        let defaults = JwtConfig::default();
        let config = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or(defaults.secret),
            expiration_hours: parsed("JWT_EXPIRATION_HOURS").unwrap_or(defaults.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(defaults.issuer),
        };

        if config.uses_default_secret() {
            if production {
                tracing::error!(
                    "SECURITY: Using default JWT secret in production! Set JWT_SECRET environment variable."
                );
            } else {
                tracing::warn!("Using default JWT secret. Set JWT_SECRET for production use.");
            }
        }

        config
    }

    #[cfg(feature = "rate-limit")]
    fn rate_limit_from_env() -> RateLimitConfig {
        let defaults = RateLimitConfig::default();
        RateLimitConfig {
            max_requests: parsed("RATE_LIMIT_MAX_REQUESTS").unwrap_or(defaults.max_requests),
            window: parsed::<u64>("RATE_LIMIT_WINDOW_SECS")
                .map(std::time::Duration::from_secs)
                .unwrap_or(defaults.window),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_url_joins_without_double_slash() {
        let site = SiteConfig {
            site_url: "https://blog.example.com/".to_string(),
            ..SiteConfig::default()
        };

        assert_eq!(
            site.absolute("/2024/1/2/hello/"),
            "https://blog.example.com/2024/1/2/hello/"
        );
    }

    #[test]
    fn test_site_defaults() {
        let site = SiteConfig::default();

        assert_eq!(site.search_order, SearchOrder::Ascending);
        assert_eq!(site.mail_from, "webmaster@localhost");
        assert!(site.template_dir.ends_with("/templates"));
    }
}
