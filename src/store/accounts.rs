//! Account Store
//!
//! Persists registered users and answers login attempts.

use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};

use crate::auth::PasswordService;
use crate::store::db::Database;
use crate::store::error::StoreResult;
use crate::store::types::{new_id, Account, NewAccount, PublicAccount};

/// Result of a login attempt
#[derive(Debug, Clone, PartialEq)]
pub enum LoginOutcome {
    /// Email and password matched
    Success(PublicAccount),
    /// An account exists for the email but the password did not match
    PasswordIncorrect,
    /// No account has that email
    NoRecord,
}

/// Store of user accounts
#[derive(Clone)]
pub struct AccountStore {
    db: Database,
    passwords: PasswordService,
}

impl AccountStore {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            passwords: PasswordService::new(),
        }
    }

    /// Register an account. The password is hashed before it is written.
    ///
    /// Email uniqueness is not enforced; see [`AccountStore::find_by_email`].
    pub fn create(&self, new: NewAccount) -> StoreResult<Account> {
        let account = Account {
            id: new_id(),
            password_hash: self.passwords.hash(&new.password)?,
            name: new.name,
            email: new.email,
            phone: new.phone,
            created_at: Utc::now(),
        };

        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO accounts (id, name, email, password_hash, phone, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    account.id,
                    account.name,
                    account.email,
                    account.password_hash,
                    account.phone,
                    account.created_at.timestamp_millis(),
                ],
            )?;
            Ok(())
        })?;

        tracing::info!(account_id = %account.id, "Created account");
        Ok(account)
    }

    /// Look up an account by id
    pub fn get(&self, id: &str) -> StoreResult<Option<Account>> {
        self.db.with_conn(|conn| {
            let account = conn
                .query_row(
                    "SELECT id, name, email, password_hash, phone, created_at
                     FROM accounts WHERE id = ?1",
                    params![id],
                    account_from_row,
                )
                .optional()?;
            Ok(account)
        })
    }

    /// Earliest-registered account with the given email
    pub fn find_by_email(&self, email: &str) -> StoreResult<Option<Account>> {
        self.db.with_conn(|conn| {
            let account = conn
                .query_row(
                    "SELECT id, name, email, password_hash, phone, created_at
                     FROM accounts WHERE email = ?1
                     ORDER BY created_at ASC, rowid ASC
                     LIMIT 1",
                    params![email],
                    account_from_row,
                )
                .optional()?;
            Ok(account)
        })
    }

    /// Check an email/password pair
    pub fn authenticate(&self, email: &str, password: &str) -> StoreResult<LoginOutcome> {
        let Some(account) = self.find_by_email(email)? else {
            tracing::debug!("Login for unknown email");
            return Ok(LoginOutcome::NoRecord);
        };

        if self.passwords.verify(&account.password_hash, password)? {
            tracing::info!(account_id = %account.id, "Login succeeded");
            Ok(LoginOutcome::Success(account.to_public()))
        } else {
            tracing::info!(account_id = %account.id, "Login rejected: password mismatch");
            Ok(LoginOutcome::PasswordIncorrect)
        }
    }

    /// Number of registered accounts
    pub fn count(&self) -> StoreResult<u64> {
        self.db.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM accounts", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }
}

fn account_from_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        phone: row.get(4)?,
        created_at: timestamp_from_millis(row.get(5)?),
    })
}

/// Convert stored epoch milliseconds back to a timestamp
pub(crate) fn timestamp_from_millis(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
