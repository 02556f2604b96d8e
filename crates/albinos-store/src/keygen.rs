//! Configuration key generation.
//!
//! Key = random alphanumeric token ∥ decimal hash of the configuration
//! name. The hash salt only needs to be deterministic, not cryptographic;
//! uniqueness is enforced by the store's unique indexes, with
//! [`crate::store::ConfigStore::create_config`] retrying on collision.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of the random token part of a key. 62^32 possible tokens;
/// collisions are the store's problem, not the generator's.
pub const KEY_TOKEN_LEN: usize = 32;

/// Source of candidate configuration keys.
///
/// Injectable so the create retry discipline can be exercised with a
/// deterministic generator.
pub trait KeyGenerator: Send {
    /// Produce one candidate key for a configuration called `config_name`.
    fn generate(&mut self, config_name: &str) -> String;
}

/// Default generator: uniform random token salted with a hash of the name.
#[derive(Debug, Default)]
pub struct RandomKeyGenerator;

impl KeyGenerator for RandomKeyGenerator {
    fn generate(&mut self, config_name: &str) -> String {
        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(KEY_TOKEN_LEN)
            .map(char::from)
            .collect();

        let mut hasher = DefaultHasher::new();
        config_name.hash(&mut hasher);

        format!("{}{}", token, hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_share_the_name_salt_but_not_the_token() {
        let mut gen = RandomKeyGenerator;
        let a = gen.generate("ma_config");
        let b = gen.generate("ma_config");

        assert_ne!(a, b);
        // Both end in the same decimal salt for the same name.
        let salt_len = a.len() - KEY_TOKEN_LEN;
        assert_eq!(a[KEY_TOKEN_LEN..], b[KEY_TOKEN_LEN..]);
        assert!(a[KEY_TOKEN_LEN..].chars().all(|c| c.is_ascii_digit()));
        assert!(salt_len > 0);
    }

    #[test]
    fn different_names_produce_different_salts() {
        let mut gen = RandomKeyGenerator;
        let a = gen.generate("first");
        let b = gen.generate("second");
        assert_ne!(a[KEY_TOKEN_LEN..], b[KEY_TOKEN_LEN..]);
    }
}
