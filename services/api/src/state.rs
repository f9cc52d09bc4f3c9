use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context as _;
use sea_orm::DatabaseConnection;

use crate::config::ApiConfig;
use crate::domain::types::MailSettings;
use crate::infra::cache::{ProfileCacheBackend, RedisProfileCache};
use crate::infra::db::{DbTokenRepository, DbUserRepository, DbWishRepository};
use crate::infra::mail::{LogMailer, MailerBackend, SmtpMailer};
use crate::infra::social::HttpSocialVerifier;
use crate::infra::upload::DiskFileStore;
use crate::usecase::token::TokenService;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub cache: ProfileCacheBackend,
    pub mailer: MailerBackend,
    pub social: HttpSocialVerifier,
    pub config: Arc<ApiConfig>,
}

impl AppState {
    /// Wire collaborators from config: Redis only with `REDIS_URL`, SMTP only
    /// with `SMTP_URL`.
    pub fn from_config(db: DatabaseConnection, config: ApiConfig) -> anyhow::Result<Self> {
        let cache = match &config.redis_url {
            Some(url) => {
                let pool = deadpool_redis::Config::from_url(url)
                    .create_pool(Some(deadpool_redis::Runtime::Tokio1))
                    .context("create Redis pool")?;
                ProfileCacheBackend::Redis(RedisProfileCache {
                    pool,
                    ttl_secs: config.user_cache_ttl_secs,
                })
            }
            None => ProfileCacheBackend::Disabled,
        };
        let mailer = match &config.smtp_url {
            Some(url) => MailerBackend::Smtp(SmtpMailer::from_url(url, &config.email_from)?),
            None => MailerBackend::Log(LogMailer),
        };
        let social = HttpSocialVerifier::new(config.google_client_id.clone());
        Ok(Self {
            db,
            cache,
            mailer,
            social,
            config: Arc::new(config),
        })
    }

    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_repo(&self) -> DbTokenRepository {
        DbTokenRepository {
            db: self.db.clone(),
        }
    }

    pub fn wish_repo(&self) -> DbWishRepository {
        DbWishRepository {
            db: self.db.clone(),
        }
    }

    pub fn token_service(&self) -> TokenService<DbTokenRepository> {
        TokenService {
            tokens: self.token_repo(),
            jwt_secret: self.config.jwt_secret.clone(),
            auth_ttl_secs: self.config.token_exp_secs,
            email_verify_ttl_secs: self.config.email_token_exp_secs,
        }
    }

    pub fn mail_settings(&self) -> MailSettings {
        MailSettings {
            app_name: self.config.app_name.clone(),
            public_url: self.config.public_url.clone(),
        }
    }

    pub fn file_store(&self) -> DiskFileStore {
        DiskFileStore {
            dir: PathBuf::from(&self.config.uploads_folder),
        }
    }
}
