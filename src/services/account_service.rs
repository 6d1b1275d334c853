use crate::config::AuthConfig;
use crate::domain::auth::{Claims, Password};
use crate::domain::auth_session::AuthSession;
use crate::domain::user::User;
use crate::error::{AppError, Result};
use crate::storage::user_repo::UserRepository;
use opentelemetry::{global, metrics::Counter};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Clone, Debug)]
struct Metrics {
    registered_total: Counter<u64>,
    login_total: Counter<u64>,
}

impl Metrics {
    fn new() -> Self {
        let meter = global::meter("lendahand-server");
        Self {
            registered_total: meter
                .u64_counter("users_registered_total")
                .with_description("Total number of successful signups")
                .build(),
            login_total: meter
                .u64_counter("auth_login_total")
                .with_description("Total number of successful login attempts")
                .build(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AccountService {
    config: AuthConfig,
    users: UserRepository,
    metrics: Metrics,
}

impl AccountService {
    #[must_use]
    pub fn new(config: AuthConfig, users: UserRepository) -> Self {
        Self { config, users, metrics: Metrics::new() }
    }

    #[tracing::instrument(
        skip(self, name, email, phone, password),
        fields(user_id = tracing::field::Empty),
        err(level = "warn")
    )]
    pub async fn signup(&self, name: String, email: String, phone: String, password: String) -> Result<(AuthSession, User)> {
        validate_institutional_email(&email, &self.config.email_domain)?;

        let password_hash = self.hash_password(&password).await?;

        let user = User {
            id: Uuid::new_v4(),
            name,
            email,
            phone,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
        };

        self.users.create(&user).await?;

        tracing::Span::current().record("user_id", tracing::field::display(user.id));
        tracing::info!("User registered");
        self.metrics.registered_total.add(1, &[]);

        let session = self.issue_session(&user)?;
        Ok((session, user))
    }

    #[tracing::instrument(
        skip(self, email, password),
        fields(user_id = tracing::field::Empty),
        err(level = "warn")
    )]
    pub async fn login(&self, email: String, password: String) -> Result<(AuthSession, User)> {
        let user = match self.users.find_by_email(&email).await? {
            Some(u) => u,
            None => {
                tracing::warn!("Login failed: user not found");
                return Err(AppError::AuthError);
            }
        };

        tracing::Span::current().record("user_id", tracing::field::display(user.id));

        let is_valid = self.verify_password(&password, &user.password_hash).await?;
        if !is_valid {
            tracing::warn!("Login failed: invalid password");
            return Err(AppError::AuthError);
        }

        tracing::info!("User logged in");
        self.metrics.login_total.add(1, &[]);

        let session = self.issue_session(&user)?;
        Ok((session, user))
    }

    /// Resolves an authenticated subject to a live user record. A token for a
    /// user that no longer exists is treated as a bad credential.
    pub async fn current_user(&self, user_id: Uuid) -> Result<User> {
        self.users.find_by_id(user_id).await?.ok_or(AppError::AuthError)
    }

    fn issue_session(&self, user: &User) -> Result<AuthSession> {
        let ttl_secs = u64::try_from(self.config.token_ttl_days).unwrap_or(7) * 86_400;
        let claims = Claims::new(user.id, user.email.clone(), ttl_secs);
        let token = claims.encode(&self.config.jwt_secret)?;

        Ok(AuthSession { token, expires_at: claims.exp as i64 })
    }

    async fn hash_password(&self, password: &str) -> Result<String> {
        let password = password.to_string();
        tokio::task::spawn_blocking(move || Password::hash(&password)).await.map_err(|_| AppError::Internal)?
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool> {
        let password = password.to_string();
        let password_hash = password_hash.to_string();
        tokio::task::spawn_blocking(move || Password::verify(&password, &password_hash))
            .await
            .map_err(|_| AppError::Internal)?
    }
}

/// Signup is restricted to institutional addresses: a non-empty local part
/// followed by the configured domain suffix.
fn validate_institutional_email(email: &str, domain: &str) -> Result<()> {
    let local = email.strip_suffix(domain).unwrap_or("");
    if local.is_empty() || local.contains('@') {
        return Err(AppError::Validation(format!("Only {domain} college emails are allowed")));
    }
    Ok(())
}
