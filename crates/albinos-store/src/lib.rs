//! albinos-store
//!
//! SQLite-backed persistence for the configuration service:
//! - the `config` table and its three unique indexes
//! - typed operations used by the dispatcher
//! - collision-retrying key generation

pub mod keygen;
pub mod statements;
pub mod store;

pub use keygen::{KeyGenerator, RandomKeyGenerator};
pub use store::{ConfigStore, CreatedConfig, StoreError, MAX_KEY_ATTEMPTS};
