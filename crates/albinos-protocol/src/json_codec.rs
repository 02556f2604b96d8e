//! JSON encoding/decoding for configuration-service messages.
//!
//! Inbound frame = one complete JSON object whose `REQUEST_NAME` field
//! selects the command; the remaining fields are the command payload.
//! Outbound frame = one JSON object. Frames carry no length prefix; the
//! stream-level splitting lives in [`crate::framing`].
//!
//! Error mapping (what the dispatcher replies with):
//! - missing or unrecognized `REQUEST_NAME` → `UNKNOWN_REQUEST`
//! - malformed JSON or an invalid payload   → `INTERNAL_ERROR`

use std::fmt;

use albinos_core::{Answer, Request, RequestState};
use serde_json::Value;

/// Errors that can arise when decoding an inbound frame.
#[derive(Debug)]
pub enum ProtocolError {
    /// The frame is not valid JSON.
    Malformed(serde_json::Error),

    /// The frame parsed but is not the expected structure.
    Structural(&'static str),

    /// The object has no `REQUEST_NAME` field.
    MissingRequestName,

    /// `REQUEST_NAME` names no known command.
    UnknownRequestName(String),

    /// The payload fields do not match the command's shape.
    Payload {
        request: &'static str,
        source: serde_json::Error,
    },
}

impl ProtocolError {
    /// The request state to reply with for this decode failure.
    pub fn reply_state(&self) -> RequestState {
        match self {
            ProtocolError::MissingRequestName | ProtocolError::UnknownRequestName(_) => {
                RequestState::UnknownRequest
            }
            _ => RequestState::InternalError,
        }
    }
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::Malformed(e) => write!(f, "malformed JSON frame: {}", e),
            ProtocolError::Structural(what) => write!(f, "unexpected frame structure: {}", what),
            ProtocolError::MissingRequestName => write!(f, "frame has no REQUEST_NAME field"),
            ProtocolError::UnknownRequestName(name) => write!(f, "unknown request name: {}", name),
            ProtocolError::Payload { request, source } => {
                write!(f, "invalid payload for {}: {}", request, source)
            }
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Decode a single inbound frame into a typed request.
pub fn decode_request(frame: &[u8]) -> Result<Request, ProtocolError> {
    let value: Value = serde_json::from_slice(frame).map_err(ProtocolError::Malformed)?;

    let object = value
        .as_object()
        .ok_or(ProtocolError::Structural("frame is not a JSON object"))?;

    let name = match object.get("REQUEST_NAME") {
        None => return Err(ProtocolError::MissingRequestName),
        Some(Value::String(name)) => name.as_str(),
        Some(_) => return Err(ProtocolError::Structural("REQUEST_NAME is not a string")),
    };

    match name {
        "CONFIG_CREATE" => payload(&value, "CONFIG_CREATE", Request::ConfigCreate),
        "CONFIG_LOAD" => payload(&value, "CONFIG_LOAD", Request::ConfigLoad),
        "CONFIG_UNLOAD" => payload(&value, "CONFIG_UNLOAD", Request::ConfigUnload),
        "CONFIG_INCLUDE" => payload(&value, "CONFIG_INCLUDE", Request::ConfigInclude),
        "SETTING_UPDATE" => payload(&value, "SETTING_UPDATE", Request::SettingUpdate),
        "SETTING_REMOVE" => payload(&value, "SETTING_REMOVE", Request::SettingRemove),
        "SETTING_GET" => payload(&value, "SETTING_GET", Request::SettingGet),
        "CONFIG_GET_SETTINGS" => payload(&value, "CONFIG_GET_SETTINGS", Request::ConfigGetSettings),
        "CONFIG_GET_SETTINGS_NAMES" => {
            payload(&value, "CONFIG_GET_SETTINGS_NAMES", Request::ConfigGetSettingsNames)
        }
        "ALIAS_SET" => payload(&value, "ALIAS_SET", Request::AliasSet),
        "ALIAS_UNSET" => payload(&value, "ALIAS_UNSET", Request::AliasUnset),
        "SUBSCRIBE_SETTING" => payload(&value, "SUBSCRIBE_SETTING", Request::Subscribe),
        "UNSUBSCRIBE_SETTING" => payload(&value, "UNSUBSCRIBE_SETTING", Request::Unsubscribe),
        other => Err(ProtocolError::UnknownRequestName(other.to_string())),
    }
}

/// Encode one outbound answer as a bare JSON object.
pub fn encode_answer(answer: &Answer) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(answer)
}

fn payload<P, F>(value: &Value, request: &'static str, wrap: F) -> Result<Request, ProtocolError>
where
    P: serde::de::DeserializeOwned,
    F: FnOnce(P) -> Request,
{
    serde_json::from_value::<P>(value.clone())
        .map(wrap)
        .map_err(|source| ProtocolError::Payload { request, source })
}
