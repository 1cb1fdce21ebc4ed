use chrono::{DateTime, Utc};
use sqlx::{Pool, Sqlite};

use crate::modules::auth::model::{TokenKind, TokenRecord};

/// Revocation store over the `tokens` table.
pub struct TokenCrud {
    pool: Pool<Sqlite>,
}

impl TokenCrud {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        jti: &str,
        user_id: i64,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO tokens (jti, user_id, token_type, expires_at, revoked, created_at)
            VALUES (?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(jti)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(expires_at)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn find_by_jti(&self, jti: &str) -> Result<Option<TokenRecord>, sqlx::Error> {
        sqlx::query_as::<_, TokenRecord>("SELECT * FROM tokens WHERE jti = ?")
            .bind(jti)
            .fetch_optional(&self.pool)
            .await
    }

    /// Idempotent; unknown identifiers are ignored.
    pub async fn revoke(&self, jti: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE tokens SET revoked = 1 WHERE jti = ?")
            .bind(jti)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn count_for_user(&self, user_id: i64) -> Result<i64, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tokens WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0)
    }
}
