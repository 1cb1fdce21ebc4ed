use chrono::Utc;
use sqlx::{Sqlite, Pool};

use crate::config::environment::AdminSeed;
use crate::modules::users::model::{NewUser, User, UserChanges, UserRole};
use crate::services::error::{is_unique_violation, AppError};
use crate::services::hashing;

pub struct UserCrud {
    pool: Pool<Sqlite>,
}

impl UserCrud {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, user: &NewUser) -> Result<User, sqlx::Error> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, password_hash, full_name, phone_number,
                               is_active, is_verified, is_superuser, role, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, 1, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.phone_number)
        .bind(user.is_verified)
        .bind(user.is_superuser)
        .bind(user.role.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        self.find_by_id(result.last_insert_rowid())
            .await?
            .ok_or(sqlx::Error::RowNotFound)
    }

    /// Any row, active or not.
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_active_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ? AND is_active = 1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username.to_lowercase())
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?")
            .bind(email.to_lowercase())
            .fetch_optional(&self.pool)
            .await
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ?")
            .bind(username.to_lowercase())
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    pub async fn email_exists(&self, email: &str) -> Result<bool, sqlx::Error> {
        let result: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email.to_lowercase())
            .fetch_one(&self.pool)
            .await?;

        Ok(result.0 > 0)
    }

    /// One page of active users ordered by id, plus the total active count.
    pub async fn list_active(&self, limit: i64, offset: i64) -> Result<(Vec<User>, i64), sqlx::Error> {
        let users = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE is_active = 1 ORDER BY id LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok((users, total.0))
    }

    pub async fn apply_changes(&self, id: i64, changes: &UserChanges) -> Result<Option<User>, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                full_name = COALESCE(?, full_name),
                phone_number = COALESCE(?, phone_number),
                is_active = COALESCE(?, is_active),
                role = COALESCE(?, role),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&changes.full_name)
        .bind(&changes.phone_number)
        .bind(changes.is_active)
        .bind(changes.role.map(|role| role.as_str()))
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_by_id(id).await
    }

    /// Flips `is_active` off. Returns false if there was no active row to flip.
    pub async fn deactivate(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn update_password(&self, id: i64, password_hash: &str) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn touch_last_login(&self, id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Registers a regular user, rejecting taken usernames and emails with 409.
    pub async fn register(&self, mut user: NewUser) -> Result<User, AppError> {
        user.username = user.username.to_lowercase();
        user.email = user.email.to_lowercase();

        if self.username_exists(&user.username).await? {
            return Err(AppError::Conflict("Username already registered".to_string()));
        }
        if self.email_exists(&user.email).await? {
            return Err(AppError::Conflict("Email already registered".to_string()));
        }

        match self.insert(&user).await {
            Ok(created) => {
                tracing::info!(user_id = created.id, username = %created.username, "user_registered");
                Ok(created)
            }
            // lost a race against a concurrent registration
            Err(e) if is_unique_violation(&e) => {
                Err(AppError::Conflict("Username or email already registered".to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Creates the admin account unless a user with that email already exists.
    /// A different account already holding the username is a conflict.
    pub async fn create_admin(&self, seed: &AdminSeed) -> Result<User, AppError> {
        if let Some(existing) = self.find_by_email(&seed.email).await? {
            return Ok(existing);
        }
        if self.username_exists(&seed.username).await? {
            return Err(AppError::Conflict(format!(
                "Username '{}' is taken by another account",
                seed.username.to_lowercase()
            )));
        }

        let admin = NewUser {
            username: seed.username.to_lowercase(),
            email: seed.email.to_lowercase(),
            password_hash: hashing::hash_password(&seed.password)?,
            full_name: Some("Administrator".to_string()),
            phone_number: None,
            role: UserRole::Admin,
            is_superuser: true,
            is_verified: true,
        };

        let created = match self.insert(&admin).await {
            Ok(created) => created,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict("Admin username or email already registered".to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        tracing::info!(user_id = created.id, username = %created.username, "admin_created");
        Ok(created)
    }
}
