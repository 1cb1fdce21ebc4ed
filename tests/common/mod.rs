use api_scaffold::config::environment::AdminSeed;
use api_scaffold::config::{init_db, Config, DbPool};
use api_scaffold::modules::users::crud::UserCrud;
use axum_test::TestServer;
use serde_json::json;

// Allow dead_code for utilities used by other test files
#[allow(dead_code)]
pub struct TestContext {
    pub server: TestServer,
    pub db: DbPool,
    pub config: Config,
}

#[allow(dead_code)]
pub fn test_config() -> Config {
    Config {
        app_name: "api-scaffold-test".to_string(),
        database_url: "sqlite::memory:".to_string(),
        database_max_connections: 1,
        jwt_secret: "test-secret-key-for-testing-only".to_string(),
        access_token_expire_minutes: 30,
        refresh_token_expire_days: 7,
        log_level: "debug".to_string(),
        debug: true,
        host: "127.0.0.1".to_string(),
        port: 0,
        rate_limit_per_minute: 10_000,
        seed_admin: false,
        admin: AdminSeed {
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            password: "Admin123!".to_string(),
        },
    }
}

#[allow(dead_code)]
impl TestContext {
    /// Fresh app over its own in-memory database.
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let db = init_db(&config).await.expect("Failed to initialize test database");
        let app = api_scaffold::create_app(db.clone(), config.clone());
        let server = TestServer::new(app).expect("Failed to create test server");

        Self { server, db, config }
    }

    /// Registers a user through the public endpoint and returns its id.
    pub async fn register(&self, username: &str) -> i64 {
        let response = self
            .server
            .post("/users")
            .json(&json!({
                "username": username,
                "email": format!("{}@example.com", username.to_lowercase()),
                "password": test_password(),
                "full_name": "Test User"
            }))
            .await;

        let body: serde_json::Value = response.json();
        body["data"]["id"].as_i64().expect("registration failed")
    }

    /// Returns `(access_token, refresh_token)`.
    pub async fn login(&self, username: &str, password: &str) -> (String, String) {
        let response = self
            .server
            .post("/auth/login")
            .json(&json!({
                "username": username,
                "password": password
            }))
            .await;

        let body: serde_json::Value = response.json();
        let access_token = body["data"]["access_token"].as_str().expect("login failed").to_string();
        let refresh_token = body["data"]["refresh_token"].as_str().expect("login failed").to_string();

        (access_token, refresh_token)
    }

    /// Registers `username` and logs in; returns `(user_id, access_token, refresh_token)`.
    pub async fn register_and_login(&self, username: &str) -> (i64, String, String) {
        let id = self.register(username).await;
        let (access, refresh) = self.login(username, test_password()).await;
        (id, access, refresh)
    }

    /// Seeds the configured admin and returns its access token.
    pub async fn admin_token(&self) -> String {
        UserCrud::new(self.db.clone())
            .create_admin(&self.config.admin)
            .await
            .expect("Failed to seed admin");

        let (access, _) = self.login(&self.config.admin.username, &self.config.admin.password).await;
        access
    }

    pub async fn token_count(&self) -> i64 {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tokens")
            .fetch_one(&self.db)
            .await
            .expect("Failed to count tokens");
        row.0
    }
}

// Helper to generate unique test username
#[allow(dead_code)]
pub fn test_username() -> String {
    format!("user_{}", uuid::Uuid::new_v4().simple())[..20].to_string()
}

// Helper to generate test password
#[allow(dead_code)]
pub fn test_password() -> &'static str {
    "TestPassword123!"
}
