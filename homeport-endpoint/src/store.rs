//! Settings storage for candidate URLs and account base URLs.
//!
//! Two small synchronous lookups back the endpoint pipeline: the per-kind
//! candidate URLs learned during setup, and the per-account base URL the
//! switcher keeps current. Both live in one SQLite file so connection
//! settings are isolated from the host application's own stores.

use crate::error::{EndpointError, EndpointResult};
use homeport_types::PathKind;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use tracing::warn;

/// Read access to the last learned base URL per path kind.
pub trait CandidateStore: Send + Sync {
    /// Returns the stored base URL for a path kind, if any.
    fn candidate(&self, kind: PathKind) -> Option<String>;
}

/// Read/write access to the per-account base URL.
pub trait AccountStore: Send + Sync {
    /// Returns the account's currently persisted base URL, if any.
    fn account_base_url(&self, account: &str) -> Option<String>;

    /// Persists the account's base URL; `None` clears it.
    fn set_account_base_url(&self, account: &str, url: Option<&str>) -> EndpointResult<()>;
}

/// SQLite-backed settings store implementing both lookup traits.
pub struct SettingsStore {
    conn: Arc<Mutex<Connection>>,
}

impl SettingsStore {
    /// Opens (or creates) a settings store at the given path.
    pub fn new(path: &str) -> EndpointResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| EndpointError::Storage(format!("failed to open settings store: {e}")))?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Opens an in-memory settings store (for testing).
    pub fn open_in_memory() -> EndpointResult<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            EndpointError::Storage(format!("failed to open in-memory settings store: {e}"))
        })?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> EndpointResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS candidates (
                kind TEXT PRIMARY KEY,
                base_url TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS accounts (
                account TEXT PRIMARY KEY,
                base_url TEXT NOT NULL
            );
            ",
        )
        .map_err(|e| EndpointError::Storage(format!("failed to init settings schema: {e}")))?;
        Ok(())
    }

    /// Stores (or clears, with `None` or a blank URL) the candidate base
    /// URL for a path kind.
    pub fn set_candidate(&self, kind: PathKind, url: Option<&str>) -> EndpointResult<()> {
        let conn = self.conn.lock().unwrap();
        match url.map(str::trim).filter(|u| !u.is_empty()) {
            Some(url) => conn
                .execute(
                    "INSERT INTO candidates (kind, base_url) VALUES (?1, ?2)
                     ON CONFLICT(kind) DO UPDATE SET base_url = excluded.base_url",
                    params![kind.as_str(), url],
                )
                .map_err(|e| EndpointError::Storage(format!("failed to save candidate: {e}")))?,
            None => conn
                .execute(
                    "DELETE FROM candidates WHERE kind = ?1",
                    params![kind.as_str()],
                )
                .map_err(|e| EndpointError::Storage(format!("failed to clear candidate: {e}")))?,
        };
        Ok(())
    }
}

impl CandidateStore for SettingsStore {
    fn candidate(&self, kind: PathKind) -> Option<String> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            "SELECT base_url FROM candidates WHERE kind = ?1",
            params![kind.as_str()],
            |row| row.get::<_, String>(0),
        ) {
            Ok(url) => Some(url),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                warn!(kind = %kind, error = %e, "candidate lookup failed");
                None
            }
        }
    }
}

impl AccountStore for SettingsStore {
    fn account_base_url(&self, account: &str) -> Option<String> {
        let conn = self.conn.lock().unwrap();
        match conn.query_row(
            "SELECT base_url FROM accounts WHERE account = ?1",
            params![account],
            |row| row.get::<_, String>(0),
        ) {
            Ok(url) => Some(url),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => {
                warn!(account, error = %e, "account base URL lookup failed");
                None
            }
        }
    }

    fn set_account_base_url(&self, account: &str, url: Option<&str>) -> EndpointResult<()> {
        let conn = self.conn.lock().unwrap();
        match url {
            Some(url) => conn
                .execute(
                    "INSERT INTO accounts (account, base_url) VALUES (?1, ?2)
                     ON CONFLICT(account) DO UPDATE SET base_url = excluded.base_url",
                    params![account, url],
                )
                .map_err(|e| {
                    EndpointError::Storage(format!("failed to save account base URL: {e}"))
                })?,
            None => conn
                .execute("DELETE FROM accounts WHERE account = ?1", params![account])
                .map_err(|e| {
                    EndpointError::Storage(format!("failed to clear account base URL: {e}"))
                })?,
        };
        Ok(())
    }
}

/// In-memory stores for testing.
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// An in-memory settings store that counts reads and writes.
    #[derive(Default)]
    pub struct MemoryStore {
        candidates: Mutex<HashMap<PathKind, String>>,
        accounts: Mutex<HashMap<String, String>>,
        candidate_reads: AtomicUsize,
        account_writes: AtomicUsize,
        failed_writes: AtomicUsize,
        fail_writes: AtomicBool,
    }

    impl MemoryStore {
        /// Creates an empty store.
        pub fn new() -> Self {
            Self::default()
        }

        /// Seeds a candidate URL.
        pub fn set_candidate(&self, kind: PathKind, url: impl Into<String>) {
            self.candidates.lock().unwrap().insert(kind, url.into());
        }

        /// Number of candidate lookups performed.
        pub fn candidate_reads(&self) -> usize {
            self.candidate_reads.load(Ordering::SeqCst)
        }

        /// Number of account base URL writes performed (including clears).
        pub fn account_writes(&self) -> usize {
            self.account_writes.load(Ordering::SeqCst)
        }

        /// Number of account writes rejected while failing.
        pub fn failed_writes(&self) -> usize {
            self.failed_writes.load(Ordering::SeqCst)
        }

        /// Makes subsequent account writes fail.
        pub fn fail_writes(&self, fail: bool) {
            self.fail_writes.store(fail, Ordering::SeqCst);
        }
    }

    impl CandidateStore for MemoryStore {
        fn candidate(&self, kind: PathKind) -> Option<String> {
            self.candidate_reads.fetch_add(1, Ordering::SeqCst);
            self.candidates.lock().unwrap().get(&kind).cloned()
        }
    }

    impl AccountStore for MemoryStore {
        fn account_base_url(&self, account: &str) -> Option<String> {
            self.accounts.lock().unwrap().get(account).cloned()
        }

        fn set_account_base_url(&self, account: &str, url: Option<&str>) -> EndpointResult<()> {
            if self.fail_writes.load(Ordering::SeqCst) {
                self.failed_writes.fetch_add(1, Ordering::SeqCst);
                return Err(EndpointError::Storage("simulated write failure".into()));
            }
            self.account_writes.fetch_add(1, Ordering::SeqCst);
            let mut accounts = self.accounts.lock().unwrap();
            match url {
                Some(url) => {
                    accounts.insert(account.to_string(), url.to_string());
                }
                None => {
                    accounts.remove(account);
                }
            }
            Ok(())
        }
    }
}
