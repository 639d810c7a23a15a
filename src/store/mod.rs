//! Schemaless document store over SQLite.
//!
//! SQLite is the source of truth for all application data. Records are kept
//! as JSON documents in a single table keyed by collection name and id, the
//! shape the frontend's remote-store contract assumes.

mod collection;

pub use collection::*;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;

use crate::errors::AppError;
use crate::models::{AdminRole, AdminUser, Batch, Book, GoLiveSession, LiveClass, MasterCode};

/// Username of the seeded master admin.
pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Master codes seeded into an empty deployment: (code, purpose, description).
pub const ESSENTIAL_MASTER_CODES: [(&str, &str, &str); 5] = [
    (
        "MASTER2024",
        "create_batch_admin",
        "Create new batch administrators",
    ),
    (
        "BOOK2024",
        "create_book_admin",
        "Create new book administrators",
    ),
    (
        "ADMIN2024",
        "create_master_admin",
        "Create new master administrators",
    ),
    ("SUPER2024", "super_admin", "Super admin access code"),
    (
        "ARCHIVE2024",
        "archive_management",
        "Internet Archive management",
    ),
];

/// Batch names left behind by earlier demo deployments, purged at bootstrap.
const PLACEHOLDER_BATCH_NAMES: [&str; 10] = [
    "Music Theory",
    "Art and Design",
    "Economics Principles",
    "History World Wars",
    "Biology Advanced",
    "English Literature",
    "Computer Science Fundamentals",
    "Chemistry Grade 12",
    "Physics Grade 11",
    "Mathematics Grade 10",
];

/// Description fragments that mark a batch as placeholder data.
const PLACEHOLDER_DESCRIPTION_MARKERS: [&str; 10] = [
    "Learn music",
    "Creative arts",
    "Microeconomics",
    "Comprehensive study",
    "Advanced biology",
    "Classic and modern",
    "Introduction to programming",
    "Comprehensive chemistry",
    "Advanced physics",
    "Complete mathematics",
];

/// Initialize the database connection pool and run migrations.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool, sqlx::Error> {
    // Ensure the parent directory exists
    if let Some(parent) = db_path.parent() {
        tokio::fs::create_dir_all(parent).await.ok();
    }

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());

    let options = SqliteConnectOptions::from_str(&db_url)?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
        .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
        .busy_timeout(std::time::Duration::from_secs(30));

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    run_migrations(&pool).await?;

    Ok(pool)
}

/// Run database migrations.
async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            collection TEXT NOT NULL,
            id TEXT NOT NULL,
            body TEXT NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (collection, id)
        );
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_documents_created ON documents(collection, created_at)",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Typed handles to every collection. Construct once per process so all
/// clones share the same change feeds.
#[derive(Clone)]
pub struct Store {
    pub batches: Collection<Batch>,
    pub live_classes: Collection<LiveClass>,
    pub books: Collection<Book>,
    pub sessions: Collection<GoLiveSession>,
    pub admin_users: Collection<AdminUser>,
    pub master_codes: Collection<MasterCode>,
}

impl Store {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            batches: Collection::new(pool.clone()),
            live_classes: Collection::new(pool.clone()),
            books: Collection::new(pool.clone()),
            sessions: Collection::new(pool.clone()),
            admin_users: Collection::new(pool.clone()),
            master_codes: Collection::new(pool),
        }
    }

    /// Seed the default master admin and essential master codes. Idempotent:
    /// existing records are detected before anything is inserted.
    pub async fn ensure_defaults(&self) -> Result<(), AppError> {
        let admins = self.admin_users.list().await?;
        let has_master = admins
            .iter()
            .any(|user| user.role == AdminRole::Master && user.username == DEFAULT_ADMIN_USERNAME);

        if !has_master {
            tracing::info!("Creating default master admin");
            self.admin_users
                .add(AdminUser {
                    id: String::new(),
                    username: DEFAULT_ADMIN_USERNAME.to_string(),
                    password: DEFAULT_ADMIN_PASSWORD.to_string(),
                    role: AdminRole::Master,
                    name: "System Administrator".to_string(),
                    email: "admin@edumaster.com".to_string(),
                    batch_id: None,
                    created_at: String::new(),
                })
                .await?;
        }

        let codes = self.master_codes.list().await?;
        if codes.is_empty() {
            tracing::info!("Creating essential master codes");
            for (code, purpose, description) in ESSENTIAL_MASTER_CODES {
                self.master_codes
                    .add(MasterCode {
                        id: String::new(),
                        code: code.to_string(),
                        purpose: purpose.to_string(),
                        description: description.to_string(),
                        is_active: true,
                        created_at: String::new(),
                    })
                    .await?;
            }
        }

        Ok(())
    }

    /// Delete batches matching the known placeholder names or description
    /// markers. Returns the number of batches removed.
    pub async fn purge_placeholder_batches(&self) -> Result<usize, AppError> {
        let batches = self.batches.list().await?;
        let mut removed = 0;

        for batch in batches {
            let is_placeholder = PLACEHOLDER_BATCH_NAMES.contains(&batch.name.as_str())
                || PLACEHOLDER_DESCRIPTION_MARKERS
                    .iter()
                    .any(|marker| batch.description.contains(marker));

            if is_placeholder {
                tracing::info!(name = %batch.name, "Purging placeholder batch");
                if self.batches.delete(batch.id()).await?.is_some() {
                    removed += 1;
                }
            }
        }

        Ok(removed)
    }
}
