use anyhow::Context as _;
use serde::Deserialize;
use url::Url;

use crate::domain::repository::SocialVerifier;
use crate::domain::types::{SocialIdentity, SocialProvider};
use crate::error::ApiError;

const GOOGLE_TOKENINFO_URL: &str = "https://oauth2.googleapis.com/tokeninfo";
const FACEBOOK_ME_URL: &str = "https://graph.facebook.com/me";

/// Checks credentials against the providers' own verification endpoints.
#[derive(Clone)]
pub struct HttpSocialVerifier {
    pub client: reqwest::Client,
    /// Required `aud` of Google ID tokens. `None` disables Google login.
    pub google_client_id: Option<String>,
}

/// Google sends `email_verified` as a string, other issuers as a bool.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Text(String),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Self::Bool(b) => *b,
            Self::Text(s) => s.eq_ignore_ascii_case("true"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoogleTokenInfo {
    sub: String,
    aud: String,
    email: Option<String>,
    email_verified: Option<Flag>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FacebookMe {
    id: String,
    name: Option<String>,
    email: Option<String>,
}

fn upstream(e: reqwest::Error) -> ApiError {
    ApiError::Upstream(e.into())
}

impl HttpSocialVerifier {
    pub fn new(google_client_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            google_client_id,
        }
    }

    /// A 4xx from the provider means the credential was rejected.
    async fn fetch<T: serde::de::DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let resp = self.client.get(url).send().await.map_err(upstream)?;
        if resp.status().is_client_error() {
            return Err(ApiError::InvalidToken);
        }
        resp.error_for_status()
            .map_err(upstream)?
            .json::<T>()
            .await
            .map_err(upstream)
    }

    async fn verify_google(&self, id_token: &str) -> Result<SocialIdentity, ApiError> {
        let client_id = self.google_client_id.as_deref().ok_or_else(|| {
            ApiError::Upstream(anyhow::anyhow!("google login is not configured"))
        })?;
        let url = Url::parse_with_params(GOOGLE_TOKENINFO_URL, &[("id_token", id_token)])
            .context("build google tokeninfo url")?;
        let info: GoogleTokenInfo = self.fetch(url).await?;
        identity_from_google(info, client_id)
    }

    async fn verify_facebook(&self, access_token: &str) -> Result<SocialIdentity, ApiError> {
        let url = Url::parse_with_params(
            FACEBOOK_ME_URL,
            &[("fields", "id,name,email"), ("access_token", access_token)],
        )
        .context("build facebook graph url")?;
        let me: FacebookMe = self.fetch(url).await?;
        Ok(identity_from_facebook(me))
    }
}

fn identity_from_google(
    info: GoogleTokenInfo,
    client_id: &str,
) -> Result<SocialIdentity, ApiError> {
    if info.aud != client_id {
        return Err(ApiError::InvalidToken);
    }
    Ok(SocialIdentity {
        provider: SocialProvider::Google,
        external_id: info.sub,
        email: info.email,
        name: info.name,
        email_verified: info.email_verified.is_some_and(|f| f.is_set()),
    })
}

/// Facebook only returns confirmed addresses, so any e-mail counts as verified.
fn identity_from_facebook(me: FacebookMe) -> SocialIdentity {
    SocialIdentity {
        provider: SocialProvider::Facebook,
        external_id: me.id,
        email_verified: me.email.is_some(),
        email: me.email,
        name: me.name,
    }
}

impl SocialVerifier for HttpSocialVerifier {
    async fn verify(
        &self,
        provider: SocialProvider,
        credential: &str,
    ) -> Result<SocialIdentity, ApiError> {
        match provider {
            SocialProvider::Google => self.verify_google(credential).await,
            SocialProvider::Facebook => self.verify_facebook(credential).await,
        }
    }
}
