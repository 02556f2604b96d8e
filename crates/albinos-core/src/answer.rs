//! Answer and event types produced by the dispatcher.
//!
//! Every reply is a single JSON object carrying `REQUEST_STATE` plus the
//! command-specific fields. Subscription events travel on the same socket
//! as replies, so they are modeled as one more [`Answer`] variant and the
//! connection writer does not need to distinguish the two.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ids::TempId;
use crate::state::RequestState;

/// A message queued for delivery to one client socket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Answer {
    State(StateAnswer),
    ConfigCreate(ConfigCreateAnswer),
    ConfigLoad(ConfigLoadAnswer),
    SettingGet(SettingGetAnswer),
    Settings(SettingsAnswer),
    SettingsNames(SettingsNamesAnswer),
    Event(SubscriptionEvent),
}

/// Bare `{"REQUEST_STATE": ...}` reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateAnswer {
    #[serde(rename = "REQUEST_STATE")]
    pub request_state: RequestState,
}

/// Reply to `CONFIG_CREATE`.
///
/// On failure both key fields are empty strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigCreateAnswer {
    #[serde(rename = "CONFIG_KEY")]
    pub config_key: String,

    #[serde(rename = "READONLY_CONFIG_KEY")]
    pub readonly_config_key: String,

    #[serde(rename = "REQUEST_STATE")]
    pub request_state: RequestState,
}

/// Reply to `CONFIG_LOAD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigLoadAnswer {
    #[serde(rename = "CONFIG_NAME")]
    pub config_name: String,

    #[serde(rename = "CONFIG_ID")]
    pub config_id: TempId,

    #[serde(rename = "REQUEST_STATE")]
    pub request_state: RequestState,
}

/// Reply to `SETTING_GET`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingGetAnswer {
    #[serde(rename = "SETTING_VALUE")]
    pub setting_value: Value,

    #[serde(rename = "REQUEST_STATE")]
    pub request_state: RequestState,
}

/// Reply to `CONFIG_GET_SETTINGS`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsAnswer {
    #[serde(rename = "SETTINGS")]
    pub settings: IndexMap<String, Value>,

    #[serde(rename = "REQUEST_STATE")]
    pub request_state: RequestState,
}

/// Reply to `CONFIG_GET_SETTINGS_NAMES`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsNamesAnswer {
    #[serde(rename = "SETTINGS_NAMES")]
    pub settings_names: Vec<String>,

    #[serde(rename = "REQUEST_STATE")]
    pub request_state: RequestState,
}

/// Unsolicited subscription event.
///
/// `CONFIG_ID` is the temp-id in the *receiving* session's space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionEvent {
    #[serde(rename = "CONFIG_ID")]
    pub config_id: TempId,

    #[serde(rename = "SETTING_NAME")]
    pub setting_name: String,

    #[serde(rename = "SUBSCRIPTION_EVENT_TYPE")]
    pub event_type: SubscriptionEventType,
}

/// What happened to the subscribed setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubscriptionEventType {
    #[serde(rename = "UPDATE")]
    Update,

    #[serde(rename = "DELETE")]
    Delete,
}

// -----------------------------------------------------------------------------
// Convenience constructors
// -----------------------------------------------------------------------------

impl Answer {
    /// Bare state reply.
    pub fn state(state: RequestState) -> Self {
        Answer::State(StateAnswer { request_state: state })
    }

    /// Successful `CONFIG_CREATE` reply.
    pub fn config_created(config_key: impl Into<String>, readonly_config_key: impl Into<String>) -> Self {
        Answer::ConfigCreate(ConfigCreateAnswer {
            config_key: config_key.into(),
            readonly_config_key: readonly_config_key.into(),
            request_state: RequestState::Success,
        })
    }

    /// Failed `CONFIG_CREATE` reply: empty keys, `DB_ERROR`.
    pub fn config_create_failed() -> Self {
        Answer::ConfigCreate(ConfigCreateAnswer {
            config_key: String::new(),
            readonly_config_key: String::new(),
            request_state: RequestState::DbError,
        })
    }

    /// Successful `CONFIG_LOAD` reply.
    pub fn config_loaded(config_name: impl Into<String>, config_id: TempId) -> Self {
        Answer::ConfigLoad(ConfigLoadAnswer {
            config_name: config_name.into(),
            config_id,
            request_state: RequestState::Success,
        })
    }

    /// Successful `SETTING_GET` reply.
    pub fn setting_value(value: Value) -> Self {
        Answer::SettingGet(SettingGetAnswer {
            setting_value: value,
            request_state: RequestState::Success,
        })
    }

    /// Successful `CONFIG_GET_SETTINGS` reply.
    pub fn settings(settings: IndexMap<String, Value>) -> Self {
        Answer::Settings(SettingsAnswer {
            settings,
            request_state: RequestState::Success,
        })
    }

    /// Successful `CONFIG_GET_SETTINGS_NAMES` reply.
    pub fn settings_names(names: Vec<String>) -> Self {
        Answer::SettingsNames(SettingsNamesAnswer {
            settings_names: names,
            request_state: RequestState::Success,
        })
    }

    /// Subscription event addressed to one subscriber.
    pub fn event(config_id: TempId, setting_name: impl Into<String>, event_type: SubscriptionEventType) -> Self {
        Answer::Event(SubscriptionEvent {
            config_id,
            setting_name: setting_name.into(),
            event_type,
        })
    }
}
