use chrono::{DateTime, FixedOffset};
use uuid::Uuid;

use super::{
    AccessClaims, EmailTokenClaims, RefreshClaims, TokenError, TokenPurpose,
    jwt::{JwtKeys, decode_token, encode_token, now_unix},
};
use crate::{config::AuthConfig, db::dao::RevokedTokenDao};

/// Signs and checks every token the service hands out.
///
/// Access, refresh and email tokens use three distinct secrets. Refresh tokens
/// carry a `jti`; once retired it sits in the blacklist until the token's own
/// expiry, and any later presentation of it fails as [`TokenError::Reused`].
#[derive(Clone)]
pub struct TokenIssuer {
    access: JwtKeys,
    refresh: JwtKeys,
    email: JwtKeys,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
    verify_ttl_secs: i64,
    reset_ttl_secs: i64,
    blacklist: RevokedTokenDao,
}

impl TokenIssuer {
    pub fn new(cfg: &AuthConfig, blacklist: RevokedTokenDao) -> Self {
        Self {
            access: JwtKeys::from_secret(cfg.access_secret.as_bytes()),
            refresh: JwtKeys::from_secret(cfg.refresh_secret.as_bytes()),
            email: JwtKeys::from_secret(cfg.email_secret.as_bytes()),
            access_ttl_secs: cfg.access_ttl_secs,
            refresh_ttl_secs: cfg.refresh_ttl_secs,
            verify_ttl_secs: cfg.verify_ttl_secs,
            reset_ttl_secs: cfg.reset_ttl_secs,
            blacklist,
        }
    }

    pub fn access_ttl_secs(&self) -> i64 {
        self.access_ttl_secs
    }

    pub fn refresh_ttl_secs(&self) -> i64 {
        self.refresh_ttl_secs
    }

    pub fn issue_access_token(&self, user_id: &str) -> Result<String, TokenError> {
        let iat = now_unix();
        let claims = AccessClaims {
            sub: user_id.to_string(),
            iat,
            exp: expiry(iat, self.access_ttl_secs),
        };
        encode_token(&self.access, &claims)
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode_token(&self.access, token, true)
    }

    /// Signs a refresh token. A fresh `jti` is generated unless `reuse_jti` is given.
    pub fn issue_refresh_token(
        &self,
        user_id: &str,
        reuse_jti: Option<&str>,
    ) -> Result<(String, RefreshClaims), TokenError> {
        let iat = now_unix();
        let claims = RefreshClaims {
            sub: user_id.to_string(),
            jti: reuse_jti
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            iat,
            exp: expiry(iat, self.refresh_ttl_secs),
        };
        let token = encode_token(&self.refresh, &claims)?;
        Ok((token, claims))
    }

    pub async fn validate_refresh_token(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims: RefreshClaims = decode_token(&self.refresh, token, true)?;

        if self.blacklist.is_revoked(&claims.jti).await? {
            tracing::warn!(
                user_id = %claims.sub,
                jti = %claims.jti,
                "retired refresh token presented again"
            );
            return Err(TokenError::Reused);
        }

        Ok(claims)
    }

    /// Retires `old` and signs its successor. Of two concurrent rotations of the
    /// same token only one inserts the blacklist row; the other gets `Reused`.
    pub async fn rotate_refresh_token(
        &self,
        old: &RefreshClaims,
    ) -> Result<(String, RefreshClaims), TokenError> {
        if !self.retire(old).await? {
            tracing::warn!(
                user_id = %old.sub,
                jti = %old.jti,
                "refresh token rotated twice"
            );
            return Err(TokenError::Reused);
        }

        self.issue_refresh_token(&old.sub, None)
    }

    /// Blacklists a presented refresh token for the rest of its lifetime.
    ///
    /// Tokens that fail signature checks or have already expired have nothing
    /// left to revoke and yield `Ok(None)`.
    pub async fn revoke_refresh_token(
        &self,
        token: &str,
    ) -> Result<Option<RefreshClaims>, TokenError> {
        let claims: RefreshClaims = match decode_token(&self.refresh, token, false) {
            Ok(claims) => claims,
            Err(TokenError::Expired | TokenError::Malformed) => return Ok(None),
            Err(err) => return Err(err),
        };

        if claims.exp <= now_unix() {
            return Ok(None);
        }

        self.retire(&claims).await?;
        Ok(Some(claims))
    }

    pub fn issue_email_token(
        &self,
        user_id: &str,
        purpose: TokenPurpose,
    ) -> Result<String, TokenError> {
        let ttl = match purpose {
            TokenPurpose::VerifyEmail => self.verify_ttl_secs,
            TokenPurpose::ResetPassword => self.reset_ttl_secs,
        };
        let iat = now_unix();
        let claims = EmailTokenClaims {
            sub: user_id.to_string(),
            purpose,
            iat,
            exp: expiry(iat, ttl),
        };
        encode_token(&self.email, &claims)
    }

    pub fn verify_email_token(
        &self,
        token: &str,
        purpose: TokenPurpose,
    ) -> Result<EmailTokenClaims, TokenError> {
        let claims: EmailTokenClaims = decode_token(&self.email, token, true)?;
        if claims.purpose != purpose {
            return Err(TokenError::Malformed);
        }
        Ok(claims)
    }

    async fn retire(&self, claims: &RefreshClaims) -> Result<bool, TokenError> {
        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| TokenError::Malformed)?;
        let expires_at = unix_to_datetime(claims.exp)?;
        Ok(self.blacklist.revoke(&claims.jti, user_id, expires_at).await?)
    }
}

fn expiry(iat: usize, ttl_secs: i64) -> usize {
    iat.saturating_add(ttl_secs.max(0) as usize)
}

fn unix_to_datetime(secs: usize) -> Result<DateTime<FixedOffset>, TokenError> {
    DateTime::from_timestamp(secs as i64, 0)
        .map(|at| at.fixed_offset())
        .ok_or(TokenError::Malformed)
}
