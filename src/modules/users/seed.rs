use sqlx::{Pool, Sqlite};

use crate::config::environment::AdminSeed;
use crate::modules::users::{
    crud::UserCrud,
    model::{NewUser, UserRole},
};
use crate::services::error::AppError;
use crate::services::hashing;

/// Password shared by every sample account.
pub const SAMPLE_PASSWORD: &str = "Password123";

const SAMPLE_USERS: [(&str, &str, &str, UserRole); 3] = [
    ("alice", "alice@example.com", "Alice Example", UserRole::User),
    ("bob", "bob@example.com", "Bob Example", UserRole::User),
    ("carol", "carol@example.com", "Carol Example", UserRole::Moderator),
];

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedSummary {
    pub created: usize,
    pub skipped: usize,
}

/// Ensures the admin account exists, then adds the sample users that are not
/// already present. Safe to run repeatedly.
pub async fn seed_database(pool: &Pool<Sqlite>, admin: &AdminSeed) -> Result<SeedSummary, AppError> {
    let users = UserCrud::new(pool.clone());
    users.create_admin(admin).await?;

    let mut summary = SeedSummary::default();
    for (username, email, full_name, role) in SAMPLE_USERS {
        if users.username_exists(username).await? || users.email_exists(email).await? {
            summary.skipped += 1;
            continue;
        }

        users
            .insert(&NewUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash: hashing::hash_password(SAMPLE_PASSWORD)?,
                full_name: Some(full_name.to_string()),
                phone_number: None,
                role,
                is_superuser: false,
                is_verified: true,
            })
            .await?;
        summary.created += 1;
    }

    tracing::info!(created = summary.created, skipped = summary.skipped, "database_seeded");
    Ok(summary)
}
