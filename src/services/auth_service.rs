use chrono::{DateTime, Duration, FixedOffset, Utc};
use push::server::SessionRegistry;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    auth::{
        AccessClaims, AuthError, ClientTag, SessionTokens, TokenIssuer, TokenPurpose, password,
    },
    config::ClientsConfig,
    db::{
        dao::{
            ActivityEventDao, DaoBase, DaoLayerError, OneTimeCodeDao, UserDao,
            activity_event_dao::ActivityAction,
        },
        entities::user,
    },
    services::{
        notifier::{Notification, NotificationDispatcher},
        session_status::{ClientSessionStatus, ClientStatusScan},
    },
};

/// Number of events returned by [`AuthService::recent_activity`].
pub const RECENT_ACTIVITY_LIMIT: u64 = 5;
const CLIENT_HISTORY_PAGE_SIZE: u64 = 50;

/// Public view of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<user::Model> for UserProfile {
    fn from(model: user::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            email: model.email,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    AlreadyVerified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityEntry {
    pub action: String,
    pub client: Option<String>,
    pub at: DateTime<FixedOffset>,
}

/// Identity asserted by the OAuth callback layer after the provider has
/// authenticated the user.
#[derive(Debug, Clone)]
pub struct FederatedProfile {
    pub provider: String,
    pub subject: String,
    pub email: String,
    pub name: String,
    pub client: ClientTag,
}

#[derive(Debug)]
pub struct EstablishedSession {
    pub user: UserProfile,
    pub tokens: SessionTokens,
}

/// Settings the flow needs beyond its collaborators.
#[derive(Debug, Clone)]
pub struct FlowSettings {
    pub clients: ClientsConfig,
    pub mfa_code_ttl_secs: i64,
    pub mfa_max_attempts: u32,
    pub federation_secret: Option<String>,
}

/// Register, verify, login, MFA, refresh, logout and password reset.
///
/// Every check that must hold across instances is delegated to a conditional
/// write in the stores: the unique email index, the single-row code claim, the
/// `verified = false` update and the blacklist's unique `jti`.
#[derive(Clone)]
pub struct AuthService {
    users: UserDao,
    codes: OneTimeCodeDao,
    activity: ActivityEventDao,
    issuer: TokenIssuer,
    notifier: NotificationDispatcher,
    push: SessionRegistry,
    settings: FlowSettings,
}

impl AuthService {
    pub fn new(
        users: UserDao,
        codes: OneTimeCodeDao,
        activity: ActivityEventDao,
        issuer: TokenIssuer,
        notifier: NotificationDispatcher,
        push: SessionRegistry,
        settings: FlowSettings,
    ) -> Self {
        Self {
            users,
            codes,
            activity,
            issuer,
            notifier,
            push,
            settings,
        }
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AuthError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AuthError::MissingField("name"));
        }
        let email = normalize_email(email)?;
        let hash = password::hash_password(password)?;

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailInUse);
        }
        let user = match self.users.create_local(name, &email, &hash).await {
            Ok(user) => user,
            Err(err) if err.is_unique_violation() => return Err(AuthError::EmailInUse),
            Err(err) => return Err(err.into()),
        };

        let token = self
            .issuer
            .issue_email_token(&user.id.to_string(), TokenPurpose::VerifyEmail)?;
        self.notifier.submit(Notification::VerifyEmail {
            to: user.email.clone(),
            link: self.link("verify", &token),
        });

        tracing::info!(user_id = %user.id, "account registered");
        Ok(user.into())
    }

    pub async fn verify_email(&self, token: Option<&str>) -> Result<VerifyOutcome, AuthError> {
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let claims = self
            .issuer
            .verify_email_token(token, TokenPurpose::VerifyEmail)
            .map_err(|_| AuthError::InvalidOrExpiredToken)?;
        let user_id = parse_user_id(&claims.sub).ok_or(AuthError::InvalidOrExpiredToken)?;

        let user = self
            .find_user(user_id)
            .await?
            .ok_or(AuthError::InvalidOrExpiredToken)?;
        if user.verified || !self.users.mark_verified(user.id).await? {
            return Ok(VerifyOutcome::AlreadyVerified);
        }

        self.activity
            .record(user.id, ActivityAction::EmailVerified, None)
            .await?;
        tracing::info!(user_id = %user.id, "email verified");
        Ok(VerifyOutcome::Verified)
    }

    /// Checks primary credentials and sends a login code. Returns the pending
    /// identifier to present with that code; never a session.
    pub async fn login(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AuthError::InvalidCredentials)?;
        if !password::verify_password(password, hash)? {
            return Err(AuthError::InvalidCredentials);
        }
        if !user.verified {
            return Err(AuthError::EmailNotVerified);
        }

        let code = password::one_time_code();
        let expires_at = Utc::now().fixed_offset() + Duration::seconds(self.settings.mfa_code_ttl_secs);
        self.codes
            .replace_for_user(user.id, &password::hash_secret(&code)?, expires_at)
            .await?;
        self.notifier.submit(Notification::LoginCode {
            to: user.email.clone(),
            code,
            valid_minutes: (self.settings.mfa_code_ttl_secs / 60).max(1),
        });

        tracing::info!(user_id = %user.id, "login code issued");
        Ok(user.id.to_string())
    }

    pub async fn verify_mfa(
        &self,
        pending_id: &str,
        code: &str,
        client: ClientTag,
    ) -> Result<EstablishedSession, AuthError> {
        let user_id = parse_user_id(pending_id).ok_or(AuthError::CodeExpiredOrMissing)?;
        let stored = self
            .codes
            .latest_for_user(user_id)
            .await?
            .ok_or(AuthError::CodeExpiredOrMissing)?;
        if stored.expires_at <= Utc::now().fixed_offset() {
            return Err(AuthError::CodeExpiredOrMissing);
        }
        if !password::verify_password(code.trim(), &stored.code_hash)? {
            let dropped = self
                .codes
                .record_failed_attempt(stored.id, self.settings.mfa_max_attempts)
                .await?;
            tracing::warn!(user_id = %user_id, dropped, "login code mismatch");
            return Err(AuthError::InvalidCode);
        }
        if !self.codes.consume(stored.id, user_id).await? {
            return Err(AuthError::CodeExpiredOrMissing);
        }

        let user = self
            .find_user(user_id)
            .await?
            .ok_or(AuthError::CodeExpiredOrMissing)?;
        self.start_session(user, client).await
    }

    pub async fn refresh_session(
        &self,
        refresh_token: Option<&str>,
    ) -> Result<SessionTokens, AuthError> {
        let token = refresh_token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::Unauthorized)?;
        let claims = self.issuer.validate_refresh_token(token).await?;
        let (refresh_token, _) = self.issuer.rotate_refresh_token(&claims).await?;
        let access_token = self.issuer.issue_access_token(&claims.sub)?;

        Ok(self.session_tokens(access_token, refresh_token))
    }

    /// Retires the presented refresh token, records the logout and tells every
    /// live push connection of the user to drop its session. Returns how many
    /// connections were notified.
    pub async fn logout(
        &self,
        claims: &AccessClaims,
        refresh_token: Option<&str>,
        client: ClientTag,
    ) -> Result<usize, AuthError> {
        let user_id = parse_user_id(&claims.sub).ok_or(AuthError::Unauthenticated)?;

        if let Some(token) = refresh_token.filter(|token| !token.is_empty()) {
            match self.issuer.revoke_refresh_token(token).await? {
                Some(revoked) if revoked.sub != claims.sub => tracing::warn!(
                    user_id = %user_id,
                    token_owner = %revoked.sub,
                    "logout presented another user's refresh token"
                ),
                Some(_) | None => {}
            }
        }

        self.activity
            .record(user_id, ActivityAction::LoggedOut, Some(client))
            .await?;
        let notified = self.push.force_logout(&claims.sub);

        tracing::info!(
            user_id = %user_id,
            client = client.as_str(),
            notified,
            "logged out"
        );
        Ok(notified)
    }

    /// Sends a reset link when the account exists. The caller sees the same
    /// result either way.
    pub async fn forgot_password(&self, email: &str) -> Result<(), AuthError> {
        let Ok(email) = normalize_email(email) else {
            return Ok(());
        };
        let Some(user) = self.users.find_by_email(&email).await? else {
            tracing::debug!("password reset requested for unknown email");
            return Ok(());
        };

        let token = self
            .issuer
            .issue_email_token(&user.id.to_string(), TokenPurpose::ResetPassword)?;
        self.notifier.submit(Notification::PasswordReset {
            to: user.email,
            link: self.link("reset", &token),
        });
        Ok(())
    }

    pub async fn reset_password(
        &self,
        token: Option<&str>,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let hash = password::hash_password(new_password)?;
        let token = token
            .filter(|token| !token.is_empty())
            .ok_or(AuthError::MissingToken)?;
        let claims = self
            .issuer
            .verify_email_token(token, TokenPurpose::ResetPassword)
            .map_err(|_| AuthError::InvalidOrExpiredToken)?;
        let user_id = parse_user_id(&claims.sub).ok_or(AuthError::InvalidOrExpiredToken)?;

        match self.users.set_password_hash(user_id, &hash).await {
            Ok(()) => {
                tracing::info!(user_id = %user_id, "password reset");
                Ok(())
            }
            Err(DaoLayerError::NotFound { .. }) => Err(AuthError::InvalidOrExpiredToken),
            Err(err) => Err(err.into()),
        }
    }

    /// Checks the shared secret presented by the OAuth callback layer.
    pub fn authorize_federation(&self, presented: Option<&str>) -> Result<(), AuthError> {
        let expected = self
            .settings
            .federation_secret
            .as_deref()
            .ok_or(AuthError::FederationDisabled)?;
        match presented {
            Some(presented) if secrets_match(presented, expected) => Ok(()),
            _ => Err(AuthError::FederationDenied),
        }
    }

    /// Signs in a provider-authenticated identity, creating or linking the
    /// account as needed. No login code is involved.
    pub async fn federated_login(
        &self,
        profile: FederatedProfile,
    ) -> Result<EstablishedSession, AuthError> {
        let provider = profile.provider.trim();
        let subject = profile.subject.trim();
        if provider.is_empty() {
            return Err(AuthError::MissingField("provider"));
        }
        if subject.is_empty() {
            return Err(AuthError::MissingField("subject"));
        }
        let email = normalize_email(&profile.email)?;
        let name = profile.name.trim();
        let federated_id = format!("{provider}:{subject}");

        let user = self.upsert_federated(&federated_id, &email, name).await?;
        self.start_session(user, profile.client).await
    }

    pub async fn current_user(&self, claims: &AccessClaims) -> Result<UserProfile, AuthError> {
        let user_id = parse_user_id(&claims.sub).ok_or(AuthError::Unauthenticated)?;
        self.find_user(user_id)
            .await?
            .map(UserProfile::from)
            .ok_or(AuthError::Unauthenticated)
    }

    pub async fn recent_activity(
        &self,
        claims: &AccessClaims,
    ) -> Result<Vec<ActivityEntry>, AuthError> {
        let user_id = parse_user_id(&claims.sub).ok_or(AuthError::Unauthenticated)?;
        let events = self
            .activity
            .recent_for_user(user_id, RECENT_ACTIVITY_LIMIT)
            .await?;
        Ok(events
            .into_iter()
            .map(|event| ActivityEntry {
                action: event.action,
                client: event.client,
                at: event.created_at,
            })
            .collect())
    }

    /// Walks the user's client-tagged history newest first until every client
    /// tag has a login or logout.
    pub async fn client_session_status(
        &self,
        user_id: Uuid,
    ) -> Result<ClientSessionStatus, AuthError> {
        let mut scan = ClientStatusScan::new();
        let mut pages = self
            .activity
            .client_history(user_id, CLIENT_HISTORY_PAGE_SIZE);

        'pages: while let Some(page) = pages.next_page().await? {
            for event in page.data {
                let (Some(client), Ok(action)) = (
                    event.client.as_deref().and_then(|tag| ClientTag::try_from(tag).ok()),
                    ActivityAction::try_from(event.action.as_str()),
                ) else {
                    continue;
                };
                scan.observe(client, action);
                if scan.is_complete() {
                    break 'pages;
                }
            }
        }

        Ok(scan.finish())
    }

    async fn start_session(
        &self,
        user: user::Model,
        client: ClientTag,
    ) -> Result<EstablishedSession, AuthError> {
        let subject = user.id.to_string();
        let access_token = self.issuer.issue_access_token(&subject)?;
        let (refresh_token, _) = self.issuer.issue_refresh_token(&subject, None)?;

        self.activity
            .record(user.id, ActivityAction::LoggedIn, Some(client))
            .await?;
        tracing::info!(user_id = %user.id, client = client.as_str(), "session established");

        Ok(EstablishedSession {
            user: user.into(),
            tokens: self.session_tokens(access_token, refresh_token),
        })
    }

    async fn upsert_federated(
        &self,
        federated_id: &str,
        email: &str,
        name: &str,
    ) -> Result<user::Model, AuthError> {
        if let Some(user) = self.users.find_by_federated_id(federated_id).await? {
            return self.sync_federated(user, email, name).await;
        }
        if let Some(user) = self.users.find_by_email(email).await? {
            if !user.verified && user.password_hash.is_some() {
                tracing::warn!(
                    user_id = %user.id,
                    "dropping password of unverified account linked to federated identity"
                );
            }
            return Ok(self
                .users
                .link_federated(user.id, federated_id, name, user.verified)
                .await?);
        }

        let display_name = if name.is_empty() { email } else { name };
        match self
            .users
            .create_federated(display_name, email, federated_id)
            .await
        {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "federated account created");
                Ok(user)
            }
            Err(err) if err.is_unique_violation() => self
                .users
                .find_by_federated_id(federated_id)
                .await?
                .ok_or(AuthError::EmailInUse),
            Err(err) => Err(err.into()),
        }
    }

    async fn sync_federated(
        &self,
        user: user::Model,
        email: &str,
        name: &str,
    ) -> Result<user::Model, AuthError> {
        if user.email == email && (name.is_empty() || user.name == name) {
            return Ok(user);
        }
        match self.users.sync_federated_profile(user.id, email, name).await {
            Ok(user) => Ok(user),
            Err(err) if err.is_unique_violation() => {
                tracing::warn!(
                    user_id = %user.id,
                    "federated email already belongs to another account; keeping stored email"
                );
                Ok(self
                    .users
                    .sync_federated_profile(user.id, &user.email, name)
                    .await?)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_user(&self, id: Uuid) -> Result<Option<user::Model>, AuthError> {
        match self.users.find_by_id(id).await {
            Ok(user) => Ok(Some(user)),
            Err(DaoLayerError::NotFound { .. }) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn session_tokens(&self, access_token: String, refresh_token: String) -> SessionTokens {
        SessionTokens {
            access_token,
            refresh_token,
            access_ttl_secs: self.issuer.access_ttl_secs(),
            refresh_ttl_secs: self.issuer.refresh_ttl_secs(),
        }
    }

    fn link(&self, page: &str, token: &str) -> String {
        format!(
            "{}/{page}?token={token}",
            self.settings.clients.client_a_url.trim_end_matches('/')
        )
    }
}

/// Trims and lower-cases an address and rejects obviously malformed ones.
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    let Some((local, domain)) = email.split_once('@') else {
        return Err(AuthError::InvalidEmail);
    };
    let well_formed = !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace);
    if !well_formed {
        return Err(AuthError::InvalidEmail);
    }
    Ok(email)
}

fn parse_user_id(raw: &str) -> Option<Uuid> {
    Uuid::parse_str(raw.trim()).ok()
}

fn secrets_match(presented: &str, expected: &str) -> bool {
    let (presented, expected) = (presented.as_bytes(), expected.as_bytes());
    presented.len() == expected.len()
        && presented
            .iter()
            .zip(expected)
            .fold(0u8, |diff, (a, b)| diff | (a ^ b))
            == 0
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::{
        auth::password,
        db::dao::DaoContext,
        test_helpers::{TestApp, test_app},
    };

    async fn verified_user(app: &TestApp, email: &str) -> Uuid {
        let service = app.auth();
        let user = service
            .register("Alice", email, "password1")
            .await
            .expect("register");
        DaoContext::new(&app.state.db)
            .user()
            .mark_verified(user.id)
            .await
            .expect("verify");
        user.id
    }

    #[test]
    fn normalizes_and_validates_email() {
        assert_eq!(
            normalize_email("  Alice@Example.COM ").expect("valid"),
            "alice@example.com"
        );
        for bad in ["", "alice", "@x.com", "alice@", "a b@x.com", "a@b@c", "a@.com"] {
            assert!(
                matches!(normalize_email(bad), Err(AuthError::InvalidEmail)),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn secret_comparison() {
        assert!(secrets_match("s3cret", "s3cret"));
        assert!(!secrets_match("s3cret", "s3cre"));
        assert!(!secrets_match("s3creT", "s3cret"));
    }

    #[tokio::test]
    async fn register_rejects_weak_password_and_duplicate_email() {
        let app = test_app().await;
        let service = app.auth();

        assert!(matches!(
            service.register("Alice", "a@x.com", "short").await,
            Err(AuthError::WeakPassword)
        ));
        service
            .register("Alice", "a@x.com", "password1")
            .await
            .expect("first registration");
        assert!(matches!(
            service.register("Alice", " A@X.com", "password1").await,
            Err(AuthError::EmailInUse)
        ));
    }

    #[tokio::test]
    async fn login_does_not_reveal_unknown_accounts() {
        let app = test_app().await;
        let service = app.auth();
        verified_user(&app, "a@x.com").await;

        assert!(matches!(
            service.login("nobody@x.com", "password1").await,
            Err(AuthError::InvalidCredentials)
        ));
        assert!(matches!(
            service.login("a@x.com", "wrong-password").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    async fn store_code(app: &TestApp, user_id: Uuid, code: &str) {
        let hash = password::hash_secret(code).expect("hash");
        DaoContext::new(&app.state.db)
            .one_time_code()
            .replace_for_user(user_id, &hash, Utc::now().fixed_offset() + Duration::minutes(5))
            .await
            .expect("store code");
    }

    #[tokio::test]
    async fn only_latest_code_validates() {
        let app = test_app().await;
        let service = app.auth();
        let user_id = verified_user(&app, "a@x.com").await;
        let pending = user_id.to_string();

        store_code(&app, user_id, "111111").await;
        store_code(&app, user_id, "222222").await;

        assert!(matches!(
            service.verify_mfa(&pending, "111111", ClientTag::A).await,
            Err(AuthError::InvalidCode)
        ));
        let session = service
            .verify_mfa(&pending, "222222", ClientTag::A)
            .await
            .expect("latest code validates");
        assert_eq!(session.user.id, user_id);
    }

    #[tokio::test]
    async fn repeated_misses_discard_the_code() {
        let app = test_app().await;
        let service = app.auth();
        let user_id = verified_user(&app, "a@x.com").await;
        let pending = user_id.to_string();
        store_code(&app, user_id, "123456").await;

        let max_attempts = app.state.config.auth.mfa_max_attempts;
        for _ in 1..max_attempts {
            assert!(matches!(
                service.verify_mfa(&pending, "654321", ClientTag::A).await,
                Err(AuthError::InvalidCode)
            ));
        }
        assert!(
            DaoContext::new(&app.state.db)
                .one_time_code()
                .latest_for_user(user_id)
                .await
                .expect("lookup")
                .is_some(),
            "code survives until the last allowed miss"
        );

        assert!(matches!(
            service.verify_mfa(&pending, "654321", ClientTag::A).await,
            Err(AuthError::InvalidCode)
        ));
        assert!(matches!(
            service.verify_mfa(&pending, "123456", ClientTag::A).await,
            Err(AuthError::CodeExpiredOrMissing)
        ));
    }

    #[tokio::test]
    async fn expired_code_never_validates() {
        let app = test_app().await;
        let service = app.auth();
        let user_id = verified_user(&app, "a@x.com").await;

        let hash = password::hash_secret("123456").expect("hash");
        DaoContext::new(&app.state.db)
            .one_time_code()
            .replace_for_user(user_id, &hash, Utc::now().fixed_offset() - Duration::seconds(1))
            .await
            .expect("store code");

        assert!(matches!(
            service
                .verify_mfa(&user_id.to_string(), "123456", ClientTag::A)
                .await,
            Err(AuthError::CodeExpiredOrMissing)
        ));
    }

    #[tokio::test]
    async fn federated_login_links_existing_account_by_email() {
        let app = test_app().await;
        let service = app.auth();
        let user_id = verified_user(&app, "a@x.com").await;

        let session = service
            .federated_login(FederatedProfile {
                provider: "google".to_string(),
                subject: "1234".to_string(),
                email: "A@x.com".to_string(),
                name: "Alice G".to_string(),
                client: ClientTag::B,
            })
            .await
            .expect("federated login");
        assert_eq!(session.user.id, user_id);
        assert_eq!(session.user.name, "Alice G");
        service
            .login("a@x.com", "password1")
            .await
            .expect("verified account keeps its password");

        let status = service
            .client_session_status(user_id)
            .await
            .expect("status");
        assert_eq!(status, ClientSessionStatus { a: false, b: true });
    }

    fn google_profile(subject: &str, email: &str, name: &str) -> FederatedProfile {
        FederatedProfile {
            provider: "google".to_string(),
            subject: subject.to_string(),
            email: email.to_string(),
            name: name.to_string(),
            client: ClientTag::A,
        }
    }

    #[tokio::test]
    async fn federated_login_drops_password_of_unverified_account() {
        let app = test_app().await;
        let service = app.auth();
        let squatter = service
            .register("Mallory", "a@x.com", "password1")
            .await
            .expect("register");

        let session = service
            .federated_login(google_profile("1234", "a@x.com", "Alice"))
            .await
            .expect("federated login");
        assert_eq!(session.user.id, squatter.id);
        assert!(matches!(
            service.login("a@x.com", "password1").await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn federated_login_syncs_provider_profile() {
        let app = test_app().await;
        let service = app.auth();

        let first = service
            .federated_login(google_profile("1234", "old@x.com", "Alice"))
            .await
            .expect("first login");
        let second = service
            .federated_login(google_profile("1234", "New@x.com", "Alice Smith"))
            .await
            .expect("second login");

        assert_eq!(second.user.id, first.user.id);
        assert_eq!(second.user.email, "new@x.com");
        assert_eq!(second.user.name, "Alice Smith");
        let users = DaoContext::new(&app.state.db).user();
        assert!(users.find_by_email("old@x.com").await.expect("lookup").is_none());
        assert_eq!(
            users
                .find_by_email("new@x.com")
                .await
                .expect("lookup")
                .map(|user| user.id),
            Some(first.user.id)
        );
    }

    #[tokio::test]
    async fn federation_requires_configured_secret() {
        let app = test_app().await;
        let service = app.auth();

        assert!(service.authorize_federation(Some("federation-test-secret")).is_ok());
        assert!(matches!(
            service.authorize_federation(Some("nope")),
            Err(AuthError::FederationDenied)
        ));
        assert!(matches!(
            service.authorize_federation(None),
            Err(AuthError::FederationDenied)
        ));
    }
}
