//! Request states reported in every reply.

use serde::{Deserialize, Serialize};

/// Outcome of a request, carried in the `REQUEST_STATE` field of every
/// reply envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RequestState {
    /// The request was executed.
    Success,

    /// Missing or unrecognized `REQUEST_NAME`, or a load request carrying
    /// neither key field.
    UnknownRequest,

    /// The request referenced a temp-id this session has not loaded.
    UnknownId,

    /// No configuration matches the supplied key.
    UnknownKey,

    /// The named setting does not exist in the configuration.
    UnknownSetting,

    /// The store reported a failure.
    DbError,

    /// A mutating request addressed a handle loaded with the read-only key.
    ReadOnly,

    /// Malformed input or an unexpected failure inside the service.
    InternalError,
}

impl RequestState {
    /// Wire spelling of the state.
    pub fn as_str(self) -> &'static str {
        match self {
            RequestState::Success => "SUCCESS",
            RequestState::UnknownRequest => "UNKNOWN_REQUEST",
            RequestState::UnknownId => "UNKNOWN_ID",
            RequestState::UnknownKey => "UNKNOWN_KEY",
            RequestState::UnknownSetting => "UNKNOWN_SETTING",
            RequestState::DbError => "DB_ERROR",
            RequestState::ReadOnly => "READ_ONLY",
            RequestState::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl std::fmt::Display for RequestState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
