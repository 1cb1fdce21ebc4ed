use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown token type: {0}")]
pub struct UnknownTokenKind(String);

impl TryFrom<String> for TokenKind {
    type Error = UnknownTokenKind;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "access" => Ok(Self::Access),
            "refresh" => Ok(Self::Refresh),
            _ => Err(UnknownTokenKind(value)),
        }
    }
}

/// Persisted record of an issued JWT, keyed by its `jti`.
#[derive(Debug, Clone, FromRow)]
pub struct TokenRecord {
    pub id: i64,
    pub jti: String,
    pub user_id: Option<i64>,
    #[sqlx(rename = "token_type", try_from = "String")]
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
    pub revoked: bool,
    pub created_at: DateTime<Utc>,
}

impl TokenRecord {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Neither revoked nor past its stored expiry.
    pub fn is_usable(&self) -> bool {
        !self.revoked && !self.is_expired()
    }
}
