//! SQLite account and session index storage.
//!
//! Unique and primary key violations surface as `RepositoryError::AlreadyExists`
//! so the resolver can recover from a lost creation race.

use std::path::Path;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

use oidcache_core::auth::Account;
use oidcache_core::storage::{
    RepositoryError, Result, SessionBinding, SessionIndexRepository, UserRepository,
};

/// SQLite-backed store for accounts and session bindings.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Wraps an existing pool. Call [`SqliteStore::migrate`] before use.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database file at `path`.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Opens a private in-memory database.
    ///
    /// The pool holds a single connection since every SQLite in-memory
    /// connection sees its own database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| RepositoryError::ConnectionFailed(e.to_string()))?;
        Ok(Self::new(pool))
    }

    /// Runs database migrations to create required tables.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS accounts (
                id TEXT PRIMARY KEY,
                email TEXT NOT NULL UNIQUE,
                username TEXT NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS oidc_sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                sid TEXT NOT NULL,
                uid TEXT NOT NULL,
                sub TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_oidc_sessions_uid ON oidc_sessions(uid);
            CREATE INDEX IF NOT EXISTS idx_oidc_sessions_sub ON oidc_sessions(sub);
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "Schema", "migrate"))?;

        Ok(())
    }

    /// Records which user and subject a session key belongs to.
    pub async fn bind_session(&self, binding: &SessionBinding) -> Result<()> {
        sqlx::query("INSERT INTO oidc_sessions (sid, uid, sub) VALUES (?, ?, ?)")
            .bind(&binding.sid)
            .bind(&binding.uid)
            .bind(&binding.sub)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "SessionBinding", &binding.sid))?;

        Ok(())
    }

    async fn sids_where(&self, column: SessionColumn, value: &str) -> Result<Vec<String>> {
        let sql = match column {
            SessionColumn::Uid => "SELECT sid FROM oidc_sessions WHERE uid = ? ORDER BY id",
            SessionColumn::Sub => "SELECT sid FROM oidc_sessions WHERE sub = ? ORDER BY id",
        };

        sqlx::query_scalar::<_, String>(sql)
            .bind(value)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "SessionBinding", value))
    }
}

#[derive(Debug, Clone, Copy)]
enum SessionColumn {
    Uid,
    Sub,
}

#[async_trait]
impl UserRepository for SqliteStore {
    async fn get_user_by_email(&self, email: &str) -> Result<Option<Account>> {
        let row = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, email, username, created_at FROM accounts WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error(e, "Account", email))?;

        row.map(row_to_account).transpose()
    }

    async fn create_user(&self, account: &Account) -> Result<()> {
        sqlx::query("INSERT INTO accounts (id, email, username, created_at) VALUES (?, ?, ?, ?)")
            .bind(account.id.to_string())
            .bind(&account.email)
            .bind(&account.username)
            .bind(account.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error(e, "Account", &account.email))?;

        Ok(())
    }
}

#[async_trait]
impl SessionIndexRepository for SqliteStore {
    async fn sids_by_uid(&self, uid: &str) -> Result<Vec<String>> {
        self.sids_where(SessionColumn::Uid, uid).await
    }

    async fn sids_by_sub(&self, sub: &str) -> Result<Vec<String>> {
        self.sids_where(SessionColumn::Sub, sub).await
    }
}

/// Convert an `accounts` row to an Account.
///
/// Expected columns: id, email, username, created_at
fn row_to_account(
    (id, email, username, created_at): (String, String, String, String),
) -> Result<Account> {
    let id = Uuid::parse_str(&id)
        .map_err(|e| RepositoryError::InvalidData(format!("invalid account id '{id}': {e}")))?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map_err(|e| RepositoryError::InvalidData(format!("invalid created_at: {e}")))?
        .with_timezone(&Utc);

    Ok(Account {
        id,
        email,
        username,
        created_at,
    })
}

/// Maps an sqlx error to a RepositoryError.
///
/// - unique/primary key violations → `AlreadyExists`
/// - pool and I/O failures → `ConnectionFailed`
/// - everything else → `QueryFailed`
fn map_sqlx_error(err: sqlx::Error, entity_type: &'static str, id: &str) -> RepositoryError {
    match &err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::AlreadyExists {
                entity_type,
                id: id.to_string(),
            }
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            RepositoryError::ConnectionFailed(err.to_string())
        }
        _ => RepositoryError::QueryFailed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteStore {
        let store = SqliteStore::in_memory().await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let store = store().await;

        assert!(store.migrate().await.is_ok());
    }

    #[tokio::test]
    async fn test_create_and_get_user() {
        let store = store().await;
        let account = Account::new("alice@example.com");

        store.create_user(&account).await.unwrap();

        let found = store
            .get_user_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, account.id);
        assert_eq!(found.email, "alice@example.com");
        assert_eq!(found.username, "alice");
        assert_eq!(found.created_at.timestamp(), account.created_at.timestamp());
    }

    #[tokio::test]
    async fn test_get_unknown_user() {
        let store = store().await;

        assert!(store
            .get_user_by_email("nobody@example.com")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_maps_to_already_exists() {
        let store = store().await;
        store
            .create_user(&Account::new("alice@example.com"))
            .await
            .unwrap();

        let result = store.create_user(&Account::new("alice@example.com")).await;

        assert!(matches!(
            result,
            Err(RepositoryError::AlreadyExists { entity_type: "Account", .. })
        ));
    }

    #[tokio::test]
    async fn test_sids_by_uid_and_sub() {
        let store = store().await;
        for binding in [
            SessionBinding::new("s2", "42", "abc"),
            SessionBinding::new("s1", "42", "def"),
            SessionBinding::new("s3", "7", "abc"),
        ] {
            store.bind_session(&binding).await.unwrap();
        }

        assert_eq!(store.sids_by_uid("42").await.unwrap(), vec!["s2", "s1"]);
        assert_eq!(store.sids_by_sub("abc").await.unwrap(), vec!["s2", "s3"]);
        assert!(store.sids_by_uid("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_corrupt_account_row_is_invalid_data() {
        let store = store().await;
        sqlx::query(
            "INSERT INTO accounts (id, email, username, created_at) VALUES ('nope', 'x@y.z', 'x', 'yesterday')",
        )
        .execute(&store.pool)
        .await
        .unwrap();

        let result = store.get_user_by_email("x@y.z").await;

        assert!(matches!(result, Err(RepositoryError::InvalidData(_))));
    }

    #[tokio::test]
    async fn test_connect_creates_database_file() {
        let path = std::env::temp_dir().join(format!("oidcache-{}.db", Uuid::new_v4()));

        let store = SqliteStore::connect(&path).await.unwrap();
        store.migrate().await.unwrap();

        assert!(path.exists());
        drop(store);
        let _ = std::fs::remove_file(&path);
    }
}
