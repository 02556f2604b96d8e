//! SQL statements for the `config` table.
//!
//! Schema: one row per configuration. `config_text` holds the JSON
//! document; `config_key` and `readonly_config_key` are the two opaque
//! credentials, each globally unique.

pub const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS config (\
     config_text TEXT, \
     id INTEGER NOT NULL CONSTRAINT config_pk PRIMARY KEY AUTOINCREMENT, \
     config_key TEXT, \
     readonly_config_key TEXT)";

pub const CREATE_UNIQUE_INDEX_ID: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS config_id_uindex ON config (id)";

pub const CREATE_UNIQUE_INDEX_KEY: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS config_config_key_uindex ON config (config_key)";

pub const CREATE_UNIQUE_INDEX_READONLY_KEY: &str =
    "CREATE UNIQUE INDEX IF NOT EXISTS config_readonly_config_key_uindex \
     ON config (readonly_config_key)";

pub const INSERT_CONFIG: &str =
    "INSERT INTO config (config_text, config_key, readonly_config_key) VALUES (?1, ?2, ?3)";

pub const SELECT_ID_FROM_KEY: &str =
    "SELECT id, config_key = ?1 FROM config WHERE config_key = ?1 OR readonly_config_key = ?1";

pub const SELECT_TEXT_FROM_ID: &str = "SELECT config_text FROM config WHERE id = ?1";

pub const UPDATE_TEXT_FROM_ID: &str = "UPDATE config SET config_text = ?1 WHERE id = ?2";

pub const COUNT_KEY: &str =
    "SELECT COUNT(*) FROM config WHERE config_key = ?1 OR readonly_config_key = ?1";

pub const COUNT_ID: &str = "SELECT COUNT(*) FROM config WHERE id = ?1";
