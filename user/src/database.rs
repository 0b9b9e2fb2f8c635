use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use authz::Role;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{migrate::MigrateDatabase, Pool, Sqlite};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::auth::types::AuthenticatedUser;
use crate::error::{Result, UserError};
use crate::store::{Account, AccountStore, NewUser, UserStore};

const USER_COLUMNS: &str = "id, email, first_name, last_name, role, account_id, \
                            created_at, updated_at, archived_at";

/// Configuration for the user database
#[derive(Debug, Clone)]
pub struct UserDatabaseConfig {
    /// Path to the database file
    pub database_path: PathBuf,
    /// Maximum number of connections in the pool
    pub max_connections: u32,
    /// Connection timeout in seconds
    pub connection_timeout: u64,
}

impl Default for UserDatabaseConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("data/docsign.db"),
            max_connections: 5,
            connection_timeout: 30,
        }
    }
}

/// SQLite storage for users and accounts
pub struct UserDatabase {
    pool: Pool<Sqlite>,
    config: UserDatabaseConfig,
}

impl UserDatabase {
    /// Initialize the user database
    pub async fn new(config: UserDatabaseConfig) -> Result<Self> {
        if let Some(parent) = config.database_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let db_url = format!("sqlite:{}", config.database_path.display());

        if !Sqlite::database_exists(&db_url).await.unwrap_or(false) {
            info!("Creating user database at: {}", config.database_path.display());
            Sqlite::create_database(&db_url).await.map_err(|e| {
                UserError::Initialization(format!("Failed to create database: {}", e))
            })?;
        }

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect_with(
                SqliteConnectOptions::new()
                    .filename(&config.database_path)
                    .create_if_missing(true)
                    .busy_timeout(Duration::from_secs(config.connection_timeout)),
            )
            .await?;

        let db = Self { pool, config };
        db.run_migrations().await?;

        info!("User database initialized successfully");
        Ok(db)
    }

    async fn run_migrations(&self) -> Result<()> {
        info!("Running user database migrations");

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                created_at TIMESTAMP NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                role TEXT NOT NULL,
                account_id TEXT NOT NULL,
                credential_digest TEXT NOT NULL,
                created_at TIMESTAMP NOT NULL,
                updated_at TIMESTAMP NOT NULL,
                archived_at TIMESTAMP,
                FOREIGN KEY (account_id) REFERENCES accounts(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Email is only unique among active users.
        sqlx::query(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_active_email \
             ON users(email) WHERE archived_at IS NULL",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_account ON users(account_id)")
            .execute(&self.pool)
            .await?;

        info!("User database migrations completed");
        Ok(())
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub fn config(&self) -> &UserDatabaseConfig {
        &self.config
    }

    /// Marks a user archived. Archived users no longer hold their email.
    pub async fn archive_user(&self, id: &str) -> Result<()> {
        let now = Utc::now();
        let result = sqlx::query(
            "UPDATE users SET archived_at = ?, updated_at = ? WHERE id = ? AND archived_at IS NULL",
        )
        .bind(now)
        .bind(now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound(id.to_string()));
        }

        info!("Archived user {}", id);
        Ok(())
    }

    /// Number of user rows, archived ones included.
    pub async fn count_users(&self) -> Result<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?)
    }

    pub async fn count_accounts(&self) -> Result<i64> {
        Ok(sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?)
    }

    /// Verify database integrity
    pub async fn verify_integrity(&self) -> Result<bool> {
        for table in ["accounts", "users"] {
            let exists = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?)",
            )
            .bind(table)
            .fetch_one(&self.pool)
            .await?;

            if !exists {
                warn!("Missing table: {}", table);
                return Ok(false);
            }
        }

        info!("Database integrity check passed");
        Ok(true)
    }

    /// Close the database connection
    pub async fn close(self) -> Result<()> {
        self.pool.close().await;
        info!("User database connection closed");
        Ok(())
    }

    async fn fetch_user(&self, id: &str) -> Result<AuthenticatedUser> {
        self.find_active_by_id(id)
            .await?
            .ok_or_else(|| UserError::UserNotFound(id.to_string()))
    }
}

fn digest_credential(credential: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(credential.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| UserError::Credential(format!("Failed to digest credential: {}", e)))
}

fn is_unique_violation(error: &sqlx::Error) -> bool {
    matches!(error, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserStore for UserDatabase {
    async fn find_active_by_email(&self, email: &str) -> Result<Option<AuthenticatedUser>> {
        let query = format!(
            "SELECT {} FROM users WHERE email = ? AND archived_at IS NULL",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, AuthenticatedUser>(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_active_by_id(&self, id: &str) -> Result<Option<AuthenticatedUser>> {
        let query = format!(
            "SELECT {} FROM users WHERE id = ? AND archived_at IS NULL",
            USER_COLUMNS
        );
        Ok(sqlx::query_as::<_, AuthenticatedUser>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_user(&self, user: NewUser) -> Result<AuthenticatedUser> {
        let id = ulid::Ulid::new().to_string();
        let digest = digest_credential(&user.credential)?;
        let now = Utc::now();

        let inserted = sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, role, account_id,
                               credential_digest, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.role.as_str())
        .bind(&user.account_id)
        .bind(&digest)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => {
                debug!("Inserted user {}", id);
                self.fetch_user(&id).await
            }
            Err(e) if is_unique_violation(&e) => Err(UserError::DuplicateEmail(user.email)),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_role(&self, id: &str, role: Role) -> Result<AuthenticatedUser> {
        sqlx::query("UPDATE users SET role = ?, updated_at = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.fetch_user(id).await
    }

    async fn update_names(
        &self,
        id: &str,
        first_name: &str,
        last_name: &str,
    ) -> Result<AuthenticatedUser> {
        sqlx::query("UPDATE users SET first_name = ?, last_name = ?, updated_at = ? WHERE id = ?")
            .bind(first_name)
            .bind(last_name)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await?;
        self.fetch_user(id).await
    }
}

#[async_trait]
impl AccountStore for UserDatabase {
    async fn get_or_create_default_account(&self, name: &str) -> Result<Account> {
        let existing = sqlx::query_as::<_, Account>(
            "SELECT id, name, created_at FROM accounts WHERE name = ?",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(account) = existing {
            return Ok(account);
        }

        let id = ulid::Ulid::new().to_string();
        // Another process may have created it since the read above.
        sqlx::query("INSERT OR IGNORE INTO accounts (id, name, created_at) VALUES (?, ?, ?)")
            .bind(&id)
            .bind(name)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        let account = sqlx::query_as::<_, Account>(
            "SELECT id, name, created_at FROM accounts WHERE name = ?",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        if account.id == id {
            info!("Created account '{}' ({})", name, id);
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn open(temp_dir: &TempDir) -> UserDatabase {
        let config = UserDatabaseConfig {
            database_path: temp_dir.path().join("test_user.db"),
            max_connections: 5,
            connection_timeout: 30,
        };
        UserDatabase::new(config).await.unwrap()
    }

    fn new_user(email: &str, account_id: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            first_name: None,
            last_name: None,
            role: Role::Member,
            account_id: account_id.to_string(),
            credential: "secret".to_string(),
        }
    }

    #[tokio::test]
    async fn test_database_initialization() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir).await;

        assert!(temp_dir.path().join("test_user.db").exists());
        assert!(db.verify_integrity().await.unwrap());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn test_default_account_is_created_once() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir).await;

        let first = db.get_or_create_default_account("Default Account").await.unwrap();
        let second = db.get_or_create_default_account("Default Account").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(db.count_accounts().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_create_and_find_user() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir).await;
        let account = db.get_or_create_default_account("Acme").await.unwrap();

        let created = db
            .create_user(new_user("ada@example.com", &account.id))
            .await
            .unwrap();
        assert_eq!(created.role(), Some(Role::Member));
        assert_eq!(created.account_id, account.id);

        let found = db.find_active_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);

        // Lookup is exact.
        assert!(db.find_active_by_email("ADA@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_credential_is_stored_as_digest() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir).await;
        let account = db.get_or_create_default_account("Acme").await.unwrap();
        let user = db
            .create_user(new_user("ada@example.com", &account.id))
            .await
            .unwrap();

        let digest: String =
            sqlx::query_scalar("SELECT credential_digest FROM users WHERE id = ?")
                .bind(&user.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_ne!(digest, "secret");
        assert!(digest.starts_with("$argon2"));
    }

    #[tokio::test]
    async fn test_duplicate_active_email_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir).await;
        let account = db.get_or_create_default_account("Acme").await.unwrap();

        db.create_user(new_user("ada@example.com", &account.id))
            .await
            .unwrap();
        let result = db.create_user(new_user("ada@example.com", &account.id)).await;

        assert!(matches!(result, Err(UserError::DuplicateEmail(_))));
    }

    #[tokio::test]
    async fn test_archived_user_releases_email() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir).await;
        let account = db.get_or_create_default_account("Acme").await.unwrap();

        let first = db
            .create_user(new_user("ada@example.com", &account.id))
            .await
            .unwrap();
        db.archive_user(&first.id).await.unwrap();

        assert!(db.find_active_by_email("ada@example.com").await.unwrap().is_none());
        assert!(db.find_active_by_id(&first.id).await.unwrap().is_none());

        let second = db
            .create_user(new_user("ada@example.com", &account.id))
            .await
            .unwrap();
        assert_ne!(first.id, second.id);

        assert!(matches!(
            db.archive_user(&first.id).await,
            Err(UserError::UserNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_role_and_names() {
        let temp_dir = TempDir::new().unwrap();
        let db = open(&temp_dir).await;
        let account = db.get_or_create_default_account("Acme").await.unwrap();
        let user = db
            .create_user(new_user("ada@example.com", &account.id))
            .await
            .unwrap();

        let user = db.update_role(&user.id, Role::Editor).await.unwrap();
        assert_eq!(user.role, "editor");

        let user = db.update_names(&user.id, "Ada", "Lovelace").await.unwrap();
        assert_eq!(user.first_name.as_deref(), Some("Ada"));
        assert_eq!(user.last_name.as_deref(), Some("Lovelace"));
        assert_eq!(user.role(), Some(Role::Editor));

        assert!(matches!(
            db.update_role("missing", Role::Admin).await,
            Err(UserError::UserNotFound(_))
        ));
    }
}
