use uuid::Uuid;

use wishlist_auth_types::token::{TokenSubject, decode_token, sign_token};
use wishlist_domain::access::TokenPurpose;

use crate::domain::repository::TokenRepository;
use crate::error::ApiError;

/// Issues, verifies and revokes purpose-scoped tokens.
///
/// A token is valid only while its signature checks out, it has not expired
/// and its row is still stored for the user.
pub struct TokenService<T: TokenRepository> {
    pub tokens: T,
    pub jwt_secret: String,
    pub auth_ttl_secs: u64,
    pub email_verify_ttl_secs: u64,
}

impl<T: TokenRepository> TokenService<T> {
    fn ttl(&self, purpose: TokenPurpose) -> u64 {
        match purpose {
            TokenPurpose::Auth => self.auth_ttl_secs,
            TokenPurpose::EmailVerify => self.email_verify_ttl_secs,
        }
    }

    pub async fn issue(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<String, ApiError> {
        let signed = sign_token(user_id, purpose, self.ttl(purpose), &self.jwt_secret)
            .map_err(|e| ApiError::Internal(e.into()))?;
        self.tokens.insert(user_id, purpose, &signed.token).await?;
        tracing::debug!(%user_id, %purpose, "token issued");
        Ok(signed.token)
    }

    /// `InvalidToken` on a bad signature or expiry, `TokenNotFound` when the
    /// token was revoked or never stored.
    pub async fn verify(&self, token: &str) -> Result<TokenSubject, ApiError> {
        let subject =
            decode_token(token, &self.jwt_secret).map_err(|_| ApiError::InvalidToken)?;
        if !self
            .tokens
            .exists(subject.user_id, subject.purpose, token)
            .await?
        {
            return Err(ApiError::TokenNotFound);
        }
        Ok(subject)
    }

    /// Same as [`TokenService::verify`] but also requires `purpose`.
    pub async fn verify_for(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<TokenSubject, ApiError> {
        let subject = self.verify(token).await?;
        if subject.purpose != purpose {
            return Err(ApiError::InvalidToken);
        }
        Ok(subject)
    }

    /// Spend a single-use token. The stored row is deleted in one statement
    /// and only the caller that removed it succeeds; everyone else gets
    /// `TokenNotFound`.
    pub async fn consume(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<TokenSubject, ApiError> {
        let subject =
            decode_token(token, &self.jwt_secret).map_err(|_| ApiError::InvalidToken)?;
        if subject.purpose != purpose {
            return Err(ApiError::InvalidToken);
        }
        if !self.tokens.delete(subject.user_id, token).await? {
            return Err(ApiError::TokenNotFound);
        }
        tracing::debug!(user_id = %subject.user_id, %purpose, "token consumed");
        Ok(subject)
    }

    /// Idempotent.
    pub async fn revoke(&self, user_id: Uuid, token: &str) -> Result<(), ApiError> {
        let removed = self.tokens.delete(user_id, token).await?;
        tracing::debug!(%user_id, removed, "token revoked");
        Ok(())
    }
}
