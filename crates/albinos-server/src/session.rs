//! Per-connection session state.
//!
//! Each connected client owns a [`Session`]: the table of configurations
//! it has loaded (temp-id ↔ persistent id, with the access level the key
//! granted) and its subscription set. Sessions are created on accept and
//! dropped wholesale on disconnect; nothing here is shared between
//! clients or persisted.

use std::collections::{HashMap, HashSet};

use albinos_core::{AccessLevel, ConfigId, TempId};

/// What a session knows about one loaded handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedConfig {
    pub config_id: ConfigId,
    pub access: AccessLevel,
}

/// State of one client connection.
///
/// Subscriptions are keyed by persistent `ConfigId`, not temp-id, so the
/// post-mutation fan-out never has to translate through another session's
/// id space.
#[derive(Debug)]
pub struct Session {
    next_temp_id: u64,
    loaded: HashMap<TempId, LoadedConfig>,
    temp_by_config: HashMap<ConfigId, TempId>,
    subscriptions: HashSet<(ConfigId, String)>,
}

impl Session {
    pub fn new() -> Self {
        Session {
            next_temp_id: 1,
            loaded: HashMap::new(),
            temp_by_config: HashMap::new(),
            subscriptions: HashSet::new(),
        }
    }

    /// Record a loaded configuration and hand out a fresh temp-id.
    ///
    /// Loading the same configuration again yields a new temp-id; both
    /// stay valid until unloaded.
    pub fn insert(&mut self, config_id: ConfigId, access: AccessLevel) -> TempId {
        let temp_id = TempId(self.next_temp_id);
        self.next_temp_id += 1;
        self.loaded.insert(temp_id, LoadedConfig { config_id, access });
        self.temp_by_config.insert(config_id, temp_id);
        temp_id
    }

    /// Drop a handle and every subscription on its configuration.
    /// Silent when the temp-id was never loaded.
    pub fn remove(&mut self, temp_id: TempId) {
        let Some(dropped) = self.loaded.remove(&temp_id) else {
            return;
        };

        self.subscriptions
            .retain(|(config_id, _)| *config_id != dropped.config_id);

        // Keep the inverse mapping alive while another handle still refers
        // to the same configuration.
        let other = self
            .loaded
            .iter()
            .find(|(_, l)| l.config_id == dropped.config_id)
            .map(|(&t, _)| t);
        match other {
            Some(other_temp_id) => {
                self.temp_by_config.insert(dropped.config_id, other_temp_id);
            }
            None => {
                self.temp_by_config.remove(&dropped.config_id);
            }
        }
    }

    pub fn has_loaded(&self, temp_id: TempId) -> bool {
        self.loaded.contains_key(&temp_id)
    }

    /// The handle behind a temp-id, if loaded.
    pub fn loaded(&self, temp_id: TempId) -> Option<LoadedConfig> {
        self.loaded.get(&temp_id).copied()
    }

    /// This session's temp-id for a persistent id, for fan-out.
    ///
    /// When the configuration was loaded several times, any one of its
    /// temp-ids is returned; the client cannot tell them apart on inbound
    /// events.
    pub fn temp_id_for(&self, config_id: ConfigId) -> Option<TempId> {
        self.temp_by_config.get(&config_id).copied()
    }

    /// Record interest in `(config_id, setting_name)`. Idempotent.
    pub fn subscribe(&mut self, config_id: ConfigId, setting_name: &str) {
        self.subscriptions
            .insert((config_id, setting_name.to_string()));
    }

    /// Drop interest in `(config_id, setting_name)`. Idempotent.
    pub fn unsubscribe(&mut self, config_id: ConfigId, setting_name: &str) {
        self.subscriptions
            .remove(&(config_id, setting_name.to_string()));
    }

    pub fn is_subscribed(&self, config_id: ConfigId, setting_name: &str) -> bool {
        self.subscriptions
            .contains(&(config_id, setting_name.to_string()))
    }
}

impl Default for Session {
    fn default() -> Self {
        Session::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temp_ids_start_at_one_and_increase() {
        let mut session = Session::new();
        assert_eq!(session.insert(ConfigId(10), AccessLevel::ReadWrite), TempId(1));
        assert_eq!(session.insert(ConfigId(11), AccessLevel::ReadOnly), TempId(2));
        assert!(session.has_loaded(TempId(1)));
        assert!(!session.has_loaded(TempId(3)));
    }

    #[test]
    fn loading_the_same_config_twice_yields_distinct_temp_ids() {
        let mut session = Session::new();
        let first = session.insert(ConfigId(10), AccessLevel::ReadWrite);
        let second = session.insert(ConfigId(10), AccessLevel::ReadWrite);
        assert_ne!(first, second);
        assert!(session.has_loaded(first));
        assert!(session.has_loaded(second));
    }

    #[test]
    fn remove_is_silent_on_unknown_temp_ids() {
        let mut session = Session::new();
        session.remove(TempId(9999));
    }

    #[test]
    fn remove_drops_the_configs_subscriptions() {
        let mut session = Session::new();
        let temp_id = session.insert(ConfigId(10), AccessLevel::ReadWrite);
        session.subscribe(ConfigId(10), "k");

        session.remove(temp_id);
        assert!(!session.is_subscribed(ConfigId(10), "k"));
        assert_eq!(session.temp_id_for(ConfigId(10)), None);
    }

    #[test]
    fn remove_keeps_the_inverse_mapping_while_another_handle_remains() {
        let mut session = Session::new();
        let first = session.insert(ConfigId(10), AccessLevel::ReadWrite);
        let second = session.insert(ConfigId(10), AccessLevel::ReadWrite);

        session.remove(second);
        assert_eq!(session.temp_id_for(ConfigId(10)), Some(first));
        assert!(session.has_loaded(first));
        assert!(!session.has_loaded(second));
    }

    #[test]
    fn subscribe_and_unsubscribe_are_idempotent() {
        let mut session = Session::new();
        session.insert(ConfigId(10), AccessLevel::ReadWrite);

        session.subscribe(ConfigId(10), "k");
        session.subscribe(ConfigId(10), "k");
        assert!(session.is_subscribed(ConfigId(10), "k"));

        session.unsubscribe(ConfigId(10), "k");
        session.unsubscribe(ConfigId(10), "k");
        assert!(!session.is_subscribed(ConfigId(10), "k"));
    }

    #[test]
    fn subscriptions_do_not_require_the_setting_to_exist() {
        let mut session = Session::new();
        session.insert(ConfigId(10), AccessLevel::ReadOnly);
        session.subscribe(ConfigId(10), "not_written_yet");
        assert!(session.is_subscribed(ConfigId(10), "not_written_yet"));
    }
}
