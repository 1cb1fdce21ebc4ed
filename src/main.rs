use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use api_scaffold::config::environment::IN_MEMORY_DATABASE_URL;
use api_scaffold::config::{database, init_db, logging::init_tracing, Config, DbPool};
use api_scaffold::modules::users::{crud::UserCrud, seed::seed_database};
use api_scaffold::services::error::AppError;

#[tokio::main]
async fn main() -> ExitCode {
    // Load configuration
    let config = Config::from_env().expect("Failed to load environment configuration");
    init_tracing(&config);

    if config.database_url == IN_MEMORY_DATABASE_URL {
        tracing::warn!("DATABASE_URL not set, using in-memory SQLite");
    }

    let db = init_db(&config).await.expect("Failed to initialize database");
    tracing::info!("Database ready");

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Some(command) = args.first() {
        return run_command(command, &args[1..], &db, &config).await;
    }

    if config.seed_admin {
        // a taken admin username should not keep the API down
        if let Err(e) = seed_admin(&db, &config).await {
            tracing::warn!(error = %e, "Skipping admin seed");
        }
    }

    let address = config.bind_address();
    tracing::info!("Starting {}", config.app_name);

    let app = api_scaffold::create_app(db, config);

    let listener = tokio::net::TcpListener::bind(&address).await.unwrap();
    tracing::info!("Server running on http://{}", address);
    axum::serve(listener, app).await.unwrap();

    ExitCode::SUCCESS
}

async fn run_command(command: &str, flags: &[String], db: &DbPool, config: &Config) -> ExitCode {
    let result = match command {
        // migrations already ran in init_db
        "init-db" => {
            tracing::info!("Database initialized");
            Ok(())
        }
        "drop-db" => {
            if !flags.iter().any(|f| f == "--yes") && !confirm("Are you sure you want to drop all tables?") {
                tracing::info!("Aborted");
                return ExitCode::SUCCESS;
            }
            database::drop_all(db)
                .await
                .map(|()| tracing::info!("Database dropped"))
                .map_err(AppError::from)
        }
        "seed-db" => seed_database(db, &config.admin).await.map(|summary| {
            tracing::info!(created = summary.created, skipped = summary.skipped, "Database seeded")
        }),
        "create-admin" => seed_admin(db, config).await,
        other => {
            eprintln!("unknown command: {other}");
            eprintln!("commands: init-db, drop-db [--yes], seed-db, create-admin");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "{command} failed");
            ExitCode::FAILURE
        }
    }
}

async fn seed_admin(db: &DbPool, config: &Config) -> Result<(), AppError> {
    let admin = UserCrud::new(db.clone()).create_admin(&config.admin).await?;
    tracing::info!("Admin user ready: {} ({})", admin.username, admin.email);
    Ok(())
}

fn confirm(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    let _ = io::stdout().flush();

    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
