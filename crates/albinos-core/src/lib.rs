//! albinos-core
//!
//! Pure configuration-service logic:
//! - identifiers and access levels
//! - request / answer / event types
//! - request states
//! - the persisted configuration document

pub mod access;
pub mod answer;
pub mod document;
pub mod ids;
pub mod request;
pub mod state;

pub use access::AccessLevel;
pub use ids::{ConfigId, TempId};
pub use state::RequestState;

pub use request::{
    AliasSet,
    AliasUnset,
    ConfigCreate,
    ConfigGetSettings,
    ConfigGetSettingsNames,
    ConfigInclude,
    ConfigLoad,
    ConfigUnload,
    Request,
    SettingGet,
    SettingRemove,
    SettingSubscribe,
    SettingUpdate,
};

pub use answer::{
    Answer,
    ConfigCreateAnswer,
    ConfigLoadAnswer,
    SettingGetAnswer,
    SettingsAnswer,
    SettingsNamesAnswer,
    StateAnswer,
    SubscriptionEvent,
    SubscriptionEventType,
};

pub use document::ConfigDocument;
