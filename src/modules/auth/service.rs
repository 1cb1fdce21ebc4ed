use std::sync::LazyLock;

use sqlx::{Pool, Sqlite};

use crate::modules::auth::crud::TokenCrud;
use crate::modules::users::{crud::UserCrud, model::User};
use crate::services::error::AppError;
use crate::services::hashing;
use crate::services::jwt::{Claims, IssuedToken, JwtService};

const INVALID_CREDENTIALS: &str = "Invalid credentials";

// Verified against when there is no usable account, so every failed login pays for one hash.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hashing::hash_password("timing-equalizer-not-a-password").ok());

#[derive(Debug)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Composes the password hasher, token issuer, user store and token store.
pub struct AuthService<'a> {
    users: UserCrud,
    tokens: TokenCrud,
    jwt_service: &'a JwtService,
}

impl<'a> AuthService<'a> {
    pub fn new(pool: Pool<Sqlite>, jwt_service: &'a JwtService) -> Self {
        Self {
            users: UserCrud::new(pool.clone()),
            tokens: TokenCrud::new(pool),
            jwt_service,
        }
    }

    /// Fails identically for unknown, inactive and wrong-password users, in
    /// roughly the same time.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let user = self
            .users
            .find_by_username(&username.to_lowercase())
            .await?
            .filter(|user| user.is_active);

        let Some(user) = user else {
            burn_verification(password);
            return Err(invalid_credentials());
        };

        if !hashing::verify_password(password, &user.password_hash)? {
            return Err(invalid_credentials());
        }

        Ok(user)
    }

    /// Authenticates, stamps `last_login` and issues a persisted token pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = self.authenticate(username, password).await?;
        self.record_login(&user).await?;

        let pair = self.issue_tokens(&user).await?;
        tracing::info!(user_id = user.id, "user_logged_in");
        Ok(pair)
    }

    pub async fn record_login(&self, user: &User) -> Result<(), AppError> {
        self.users.touch_last_login(user.id).await?;
        Ok(())
    }

    pub async fn issue_tokens(&self, user: &User) -> Result<TokenPair, AppError> {
        let access = self.jwt_service.create_access_token(user.id, user.role)?;
        let refresh = self.jwt_service.create_refresh_token(user.id)?;

        self.persist(user.id, &access).await?;
        self.persist(user.id, &refresh).await?;

        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
            expires_in: self.jwt_service.access_token_duration_secs(),
        })
    }

    /// Returns the owning user id of a live, unrevoked refresh token.
    pub async fn verify_refresh(&self, token: &str) -> Result<i64, AppError> {
        let claims = self.jwt_service.verify_refresh_token(token)?;
        self.ensure_usable(&claims).await?;
        claims.user_id().ok_or_else(invalid_token)
    }

    /// Same checks as [`Self::verify_refresh`], for bearer access tokens.
    pub async fn verify_access(&self, token: &str) -> Result<Claims, AppError> {
        let claims = self.jwt_service.verify_access_token(token)?;
        self.ensure_usable(&claims).await?;
        Ok(claims)
    }

    /// Issues a new access token for the owner of `refresh_token`.
    pub async fn refresh(&self, refresh_token: &str) -> Result<(String, i64), AppError> {
        let user_id = self.verify_refresh(refresh_token).await?;

        let user = self
            .users
            .find_active_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let access = self.jwt_service.create_access_token(user.id, user.role)?;
        self.persist(user.id, &access).await?;

        Ok((access.token, self.jwt_service.access_token_duration_secs()))
    }

    /// Idempotent; unknown identifiers are a no-op.
    pub async fn revoke(&self, jti: &str) -> Result<(), AppError> {
        self.tokens.revoke(jti).await?;
        Ok(())
    }

    /// Revokes a refresh token presented at logout, provided it belongs to `user_id`.
    /// Anything that does not verify is ignored; logout itself still succeeds.
    pub async fn revoke_refresh_for(&self, refresh_token: &str, user_id: i64) -> Result<(), AppError> {
        let Ok(claims) = self.jwt_service.verify_refresh_token(refresh_token) else {
            return Ok(());
        };

        if claims.user_id() == Some(user_id) {
            self.revoke(&claims.jti).await?;
        }
        Ok(())
    }

    /// Re-hashes and stores `new_password`; `updated_at` moves with it.
    pub async fn change_password(&self, user: &User, new_password: &str) -> Result<(), AppError> {
        let password_hash = hashing::hash_password(new_password)?;
        self.users.update_password(user.id, &password_hash).await?;

        tracing::info!(user_id = user.id, "password_changed");
        Ok(())
    }

    async fn persist(&self, user_id: i64, issued: &IssuedToken) -> Result<(), AppError> {
        let expires_at = issued
            .claims
            .expires_at()
            .ok_or_else(|| AppError::Internal("token expiry out of range".to_string()))?;

        self.tokens
            .create(&issued.claims.jti, user_id, issued.claims.kind, expires_at)
            .await?;
        Ok(())
    }

    /// A token is only honoured while its record exists, is unrevoked and unexpired.
    async fn ensure_usable(&self, claims: &Claims) -> Result<(), AppError> {
        match self.tokens.find_by_jti(&claims.jti).await? {
            Some(record) if record.is_usable() => Ok(()),
            Some(record) if record.revoked => {
                Err(AppError::Authentication("Token has been revoked".to_string()))
            }
            Some(_) => Err(AppError::Authentication("Token has expired".to_string())),
            None => Err(invalid_token()),
        }
    }
}

fn burn_verification(password: &str) {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = hashing::verify_password(password, hash);
    }
}

fn invalid_credentials() -> AppError {
    AppError::Authentication(INVALID_CREDENTIALS.to_string())
}

fn invalid_token() -> AppError {
    AppError::Authentication("Invalid token".to_string())
}
