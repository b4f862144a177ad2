//! SQLite Account Store
//! Mission: Durable account storage with transactional create-if-absent
//!
//! Key properties:
//! - WAL mode so readers never wait on the single writer
//! - One connection per operation; SQLite owns all concurrency control
//! - `register` runs inside a `BEGIN IMMEDIATE` transaction
//! - Blocking SQLite and bcrypt work runs on the tokio blocking pool, and is
//!   abandoned (rolled back) once the awaiting caller has gone away

use crate::accounts::{verify_credential, Account, AccountStore, ProfilePatch, StoreError};
use crate::auth::password::PasswordHasher;
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::{params, Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

const SCHEMA_SQL: &str = r#"
PRAGMA journal_mode = WAL;
PRAGMA synchronous = NORMAL;

CREATE TABLE IF NOT EXISTS accounts (
    id TEXT PRIMARY KEY,
    password_hash TEXT NOT NULL,
    nickname TEXT NOT NULL,
    comment TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
) WITHOUT ROWID;
"#;

/// Writers queue behind each other for at most this long before `SQLITE_BUSY`.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Backend(Box::new(err))
    }
}

/// Tells a blocking unit whether the future awaiting it still exists.
///
/// The receiving half lives in the awaiting future; dropping that future
/// (timeout, client disconnect) closes the channel.
struct Cancellation(oneshot::Sender<()>);

impl Cancellation {
    fn check(&self) -> Result<(), StoreError> {
        if self.0.is_closed() {
            Err(StoreError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Account store persisted in a SQLite database file
pub struct SqliteAccountStore {
    db_path: PathBuf,
    hasher: Arc<PasswordHasher>,
}

impl SqliteAccountStore {
    /// Open (or create) the database and apply the schema
    pub fn open(db_path: impl AsRef<Path>, hasher: Arc<PasswordHasher>) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();
        let conn = open_connection(&db_path)
            .with_context(|| format!("Failed to open database at {}", db_path.display()))?;

        conn.execute_batch(SCHEMA_SQL)
            .context("Failed to initialize account schema")?;

        let journal_mode: String = conn
            .query_row("PRAGMA journal_mode", [], |row| row.get(0))
            .context("Failed to read journal mode")?;
        if !journal_mode.eq_ignore_ascii_case("wal") {
            warn!("WAL mode not active, journal_mode = {}", journal_mode);
        }

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))
            .context("Failed to count accounts")?;
        info!(path = %db_path.display(), accounts = count, "Account database ready");

        Ok(Self { db_path, hasher })
    }

    /// Run `op` on a fresh connection on the blocking pool.
    ///
    /// Work that has not started by the time the caller is gone is skipped.
    async fn with_connection<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection, &PasswordHasher, &Cancellation) -> Result<T, StoreError>
            + Send
            + 'static,
    {
        let db_path = self.db_path.clone();
        let hasher = Arc::clone(&self.hasher);
        let (signal, caller_alive) = oneshot::channel::<()>();
        let cancellation = Cancellation(signal);

        let result = tokio::task::spawn_blocking(move || {
            cancellation.check()?;
            let mut conn = open_connection(&db_path)?;
            op(&mut conn, &hasher, &cancellation)
        })
        .await?;

        drop(caller_alive);
        result
    }
}

fn open_connection(path: &Path) -> rusqlite::Result<Connection> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(conn)
}

fn row_to_account(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        nickname: row.get(1)?,
        comment: row.get(2)?,
    })
}

fn is_constraint_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn register(&self, id: &str, password: &str) -> Result<Account, StoreError> {
        let id = id.to_owned();
        let password = password.to_owned();
        self.with_connection(move |conn, hasher, cancellation| {
            // Hash before the write lock is taken
            let password_hash = hasher.hash(&password)?;
            let now = Utc::now().to_rfc3339();

            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let exists = tx
                .query_row("SELECT 1 FROM accounts WHERE id = ?1", params![id], |_| Ok(()))
                .optional()?
                .is_some();
            if exists {
                // Dropping the transaction rolls it back
                return Err(StoreError::AlreadyExists);
            }

            tx.execute(
                "INSERT INTO accounts (id, password_hash, nickname, comment, created_at, updated_at)
                 VALUES (?1, ?2, ?1, '', ?3, ?3)",
                params![id, password_hash, now],
            )
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    StoreError::AlreadyExists
                } else {
                    e.into()
                }
            })?;

            // Last point where an abandoned register can still leave no trace
            if let Err(e) = cancellation.check() {
                debug!(user_id = %id, "Register abandoned by caller, rolling back");
                return Err(e);
            }
            tx.commit()?;

            info!(user_id = %id, "Account registered");
            Ok(Account::new(id))
        })
        .await
    }

    async fn authenticate(&self, id: &str, password: &str) -> Result<(), StoreError> {
        let id = id.to_owned();
        let password = password.to_owned();
        self.with_connection(move |conn, hasher, _| {
            let stored_hash: Option<String> = conn
                .query_row(
                    "SELECT password_hash FROM accounts WHERE id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            verify_credential(hasher, &password, stored_hash.as_deref())
        })
        .await
    }

    async fn fetch(&self, id: &str) -> Result<Account, StoreError> {
        let id = id.to_owned();
        self.with_connection(move |conn, _, _| {
            conn.query_row(
                "SELECT id, nickname, comment FROM accounts WHERE id = ?1",
                params![id],
                row_to_account,
            )
            .optional()?
            .ok_or(StoreError::NotFound)
        })
        .await
    }

    async fn patch_fields(&self, id: &str, patch: &ProfilePatch) -> Result<Account, StoreError> {
        let nickname = patch.resolved_nickname(id);
        let comment = patch.comment.clone();
        let id = id.to_owned();
        self.with_connection(move |conn, _, _| {
            // Only the profile columns are written; NULL keeps the stored value
            let account = conn
                .query_row(
                    "UPDATE accounts
                     SET nickname = COALESCE(?1, nickname),
                         comment = COALESCE(?2, comment),
                         updated_at = ?3
                     WHERE id = ?4
                     RETURNING id, nickname, comment",
                    params![nickname, comment, Utc::now().to_rfc3339(), id],
                    row_to_account,
                )
                .optional()?
                .ok_or(StoreError::NotFound)?;

            debug!(user_id = %id, "Account profile updated");
            Ok(account)
        })
        .await
    }

    async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let id = id.to_owned();
        self.with_connection(move |conn, _, _| {
            let rows_affected = conn.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
            if rows_affected > 0 {
                info!(user_id = %id, "Account removed");
            }
            Ok(())
        })
        .await
    }
}
