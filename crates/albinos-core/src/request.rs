//! Request types consumed by the dispatcher.
//!
//! These are the logical forms of the thirteen wire commands. The JSON
//! envelope parsing lives in the `albinos-protocol` crate; this module is
//! purely typed payloads.

use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;

use crate::ids::TempId;

/// A parsed client request.
///
/// One variant per `REQUEST_NAME`. Subscribe and unsubscribe share a
/// payload shape and differ only in direction.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    ConfigCreate(ConfigCreate),
    ConfigLoad(ConfigLoad),
    ConfigUnload(ConfigUnload),
    ConfigInclude(ConfigInclude),
    SettingUpdate(SettingUpdate),
    SettingRemove(SettingRemove),
    SettingGet(SettingGet),
    ConfigGetSettings(ConfigGetSettings),
    ConfigGetSettingsNames(ConfigGetSettingsNames),
    AliasSet(AliasSet),
    AliasUnset(AliasUnset),
    Subscribe(SettingSubscribe),
    Unsubscribe(SettingSubscribe),
}

impl Request {
    /// Wire name of the command, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Request::ConfigCreate(_) => "CONFIG_CREATE",
            Request::ConfigLoad(_) => "CONFIG_LOAD",
            Request::ConfigUnload(_) => "CONFIG_UNLOAD",
            Request::ConfigInclude(_) => "CONFIG_INCLUDE",
            Request::SettingUpdate(_) => "SETTING_UPDATE",
            Request::SettingRemove(_) => "SETTING_REMOVE",
            Request::SettingGet(_) => "SETTING_GET",
            Request::ConfigGetSettings(_) => "CONFIG_GET_SETTINGS",
            Request::ConfigGetSettingsNames(_) => "CONFIG_GET_SETTINGS_NAMES",
            Request::AliasSet(_) => "ALIAS_SET",
            Request::AliasUnset(_) => "ALIAS_UNSET",
            Request::Subscribe(_) => "SUBSCRIBE_SETTING",
            Request::Unsubscribe(_) => "UNSUBSCRIBE_SETTING",
        }
    }
}

/// `CONFIG_CREATE`: create a new named configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigCreate {
    #[serde(rename = "CONFIG_NAME")]
    pub config_name: String,
}

/// `CONFIG_LOAD`: load a configuration through one of its keys.
///
/// Exactly one of the two fields is expected; a request with neither is
/// answered with `UNKNOWN_REQUEST`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigLoad {
    #[serde(rename = "CONFIG_KEY", default)]
    pub config_key: Option<String>,

    #[serde(rename = "READONLY_CONFIG_KEY", default)]
    pub readonly_config_key: Option<String>,
}

/// `CONFIG_UNLOAD`: drop a loaded handle.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigUnload {
    #[serde(rename = "CONFIG_ID")]
    pub id: TempId,
}

/// `CONFIG_INCLUDE`: append `src`'s configuration to `id`'s include list.
///
/// Both fields are temp-ids in the requesting session's space.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigInclude {
    #[serde(rename = "CONFIG_ID")]
    pub id: TempId,

    #[serde(rename = "SRC")]
    pub src: TempId,
}

/// `SETTING_UPDATE`: write one or more settings.
///
/// The map preserves the order the client sent, which is also the order
/// the resulting subscription events are emitted in.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingUpdate {
    #[serde(rename = "CONFIG_ID")]
    pub id: TempId,

    #[serde(rename = "SETTINGS_TO_UPDATE")]
    pub settings_to_update: IndexMap<String, Value>,
}

/// `SETTING_REMOVE`: delete a single setting.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingRemove {
    #[serde(rename = "CONFIG_ID")]
    pub id: TempId,

    #[serde(rename = "SETTING_NAME")]
    pub setting_name: String,
}

/// `SETTING_GET`: read a single setting.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingGet {
    #[serde(rename = "CONFIG_ID")]
    pub id: TempId,

    #[serde(rename = "SETTING_NAME")]
    pub setting_name: String,
}

/// `CONFIG_GET_SETTINGS`: read the whole settings map.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigGetSettings {
    #[serde(rename = "CONFIG_ID")]
    pub id: TempId,
}

/// `CONFIG_GET_SETTINGS_NAMES`: list the setting names in insertion order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ConfigGetSettingsNames {
    #[serde(rename = "CONFIG_ID")]
    pub id: TempId,
}

/// `ALIAS_SET`: acknowledged but not implemented.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AliasSet {
    #[serde(rename = "CONFIG_ID")]
    pub id: TempId,

    #[serde(rename = "SETTING_NAME")]
    pub setting_name: String,

    #[serde(rename = "ALIAS_NAME")]
    pub alias_name: String,
}

/// `ALIAS_UNSET`: acknowledged but not implemented.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AliasUnset {
    #[serde(rename = "CONFIG_ID")]
    pub id: TempId,

    #[serde(rename = "ALIAS_NAME")]
    pub alias_name: String,
}

/// `SUBSCRIBE_SETTING` / `UNSUBSCRIBE_SETTING` payload.
///
/// The setting form is the implemented one; the alias form is answered
/// with `INTERNAL_ERROR`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SettingSubscribe {
    #[serde(rename = "CONFIG_ID")]
    pub id: TempId,

    #[serde(rename = "SETTING_NAME", default)]
    pub setting_name: Option<String>,

    #[serde(rename = "ALIAS_NAME", default)]
    pub alias_name: Option<String>,
}
