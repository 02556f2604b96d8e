//! The configuration store.
//!
//! All persistence goes through [`ConfigStore`]. Every operation returns a
//! typed result or a tagged [`StoreError`]; "row not found" is detected by
//! a `COUNT(*)` pre-check and lifted to [`StoreError::UnknownId`] /
//! [`StoreError::UnknownKey`] rather than surfacing as an empty result.
//!
//! The store, not the key generator, is the authority on key uniqueness:
//! [`ConfigStore::create_config`] retries insertion with fresh keys until
//! the unique indexes accept them or the attempt budget runs out.

use std::path::Path;

use albinos_core::{AccessLevel, ConfigDocument, ConfigId};
use rusqlite::{params, Connection};
use thiserror::Error;
use tracing::{debug, warn};

use crate::keygen::{KeyGenerator, RandomKeyGenerator};
use crate::statements;

/// Total insertion attempts in [`ConfigStore::create_config`]: the first
/// try plus three regenerations.
pub const MAX_KEY_ATTEMPTS: u32 = 4;

/// Tagged failure of a store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Neither key column matches the supplied key.
    #[error("no configuration matches the supplied key")]
    UnknownKey,

    /// No row with this id.
    #[error("no configuration with id {0}")]
    UnknownId(ConfigId),

    /// SQLite reported a failure.
    #[error("sqlite failure: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The stored document cannot be parsed, or a document cannot be
    /// serialized. Not retryable.
    #[error("configuration document damaged or unserializable: {0}")]
    Document(#[from] serde_json::Error),
}

/// Result of a successful configuration creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedConfig {
    pub config_key: String,
    pub readonly_config_key: String,
    pub config_id: ConfigId,
}

/// SQLite-backed configuration store.
pub struct ConfigStore {
    conn: Connection,
    keygen: Box<dyn KeyGenerator>,
}

impl ConfigStore {
    /// Open (or create) the store at `path` with the default key generator.
    ///
    /// Ensures the `config` table and its three unique indexes exist;
    /// idempotent on an existing database.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        Self::open_with_keygen(path, Box::new(RandomKeyGenerator))
    }

    /// Open the store with a caller-supplied key generator.
    pub fn open_with_keygen(
        path: impl AsRef<Path>,
        keygen: Box<dyn KeyGenerator>,
    ) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        for statement in [
            statements::CREATE_TABLE,
            statements::CREATE_UNIQUE_INDEX_ID,
            statements::CREATE_UNIQUE_INDEX_KEY,
            statements::CREATE_UNIQUE_INDEX_READONLY_KEY,
        ] {
            conn.execute(statement, [])?;
        }
        Ok(ConfigStore { conn, keygen })
    }

    /// Create a configuration named `name` with an empty document.
    ///
    /// Both keys are regenerated on every attempt; SQLite failures
    /// (collisions included) retry up to [`MAX_KEY_ATTEMPTS`] times in
    /// total, after which the last error surfaces.
    pub fn create_config(&mut self, name: &str) -> Result<CreatedConfig, StoreError> {
        let text = serde_json::to_string(&ConfigDocument::new(name))?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let config_key = self.keygen.generate(name);
            let readonly_config_key = self.keygen.generate(name);

            match self.conn.execute(
                statements::INSERT_CONFIG,
                params![text, config_key, readonly_config_key],
            ) {
                Ok(_) => {
                    let config_id = ConfigId(self.conn.last_insert_rowid());
                    return Ok(CreatedConfig {
                        config_key,
                        readonly_config_key,
                        config_id,
                    });
                }
                Err(e) if attempt >= MAX_KEY_ATTEMPTS => return Err(StoreError::Sqlite(e)),
                Err(e) if is_unique_violation(&e) => {
                    debug!(attempt, "generated key already taken, regenerating");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "configuration insert failed, retrying");
                }
            }
        }
    }

    /// Resolve a key (read-write or read-only) to its configuration id and
    /// the access level that key grants.
    pub fn config_id_by_key(&self, key: &str) -> Result<(ConfigId, AccessLevel), StoreError> {
        if self.count(statements::COUNT_KEY, params![key])? == 0 {
            return Err(StoreError::UnknownKey);
        }

        let (id, matched_read_write): (i64, bool) = self.conn.query_row(
            statements::SELECT_ID_FROM_KEY,
            params![key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;

        let access = if matched_read_write {
            AccessLevel::ReadWrite
        } else {
            AccessLevel::ReadOnly
        };
        Ok((ConfigId(id), access))
    }

    /// Name of the configuration `id`.
    pub fn config_name(&self, id: ConfigId) -> Result<String, StoreError> {
        Ok(self.config(id)?.name)
    }

    /// Full document of the configuration `id`.
    pub fn config(&self, id: ConfigId) -> Result<ConfigDocument, StoreError> {
        self.ensure_exists(id)?;
        let text: String =
            self.conn
                .query_row(statements::SELECT_TEXT_FROM_ID, params![id.0], |row| {
                    row.get(0)
                })?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Overwrite the document of the configuration `id`.
    pub fn update_config(&self, id: ConfigId, document: &ConfigDocument) -> Result<(), StoreError> {
        self.ensure_exists(id)?;
        let text = serde_json::to_string(document)?;
        self.conn
            .execute(statements::UPDATE_TEXT_FROM_ID, params![text, id.0])?;
        Ok(())
    }

    /// Append `src` to `dst`'s include list and persist.
    ///
    /// The list stays sorted ascending and deduplicated; the returned
    /// value is its resulting length. Either row missing is
    /// [`StoreError::UnknownId`].
    pub fn include_config(&self, dst: ConfigId, src: ConfigId) -> Result<usize, StoreError> {
        self.ensure_exists(dst)?;
        self.ensure_exists(src)?;

        let mut document = self.config(dst)?;
        let nb_configs = document.insert_include(src);
        self.update_config(dst, &document)?;
        Ok(nb_configs)
    }

    fn ensure_exists(&self, id: ConfigId) -> Result<(), StoreError> {
        if self.count(statements::COUNT_ID, params![id.0])? == 0 {
            return Err(StoreError::UnknownId(id));
        }
        Ok(())
    }

    fn count(&self, sql: &str, params: impl rusqlite::Params) -> Result<i64, rusqlite::Error> {
        self.conn.query_row(sql, params, |row| row.get(0))
    }
}

fn is_unique_violation(error: &rusqlite::Error) -> bool {
    matches!(
        error,
        rusqlite::Error::SqliteFailure(f, _) if f.code == rusqlite::ErrorCode::ConstraintViolation
    )
}
