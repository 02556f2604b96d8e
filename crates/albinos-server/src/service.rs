//! Central service loop.
//!
//! This task owns the `ConfigStore` and every `Session`, and processes
//! all `ClientEvent`s coming from client tasks, one at a time. Because
//! the loop is the only writer, no handler ever observes a partially
//! mutated document, responses go out in per-connection request order,
//! and a mutator's reply is queued before any subscription event derived
//! from it.
//!
//! Routing policy:
//! - replies: **only** to the originating client;
//! - subscription events: to every session subscribed to the changed
//!   setting, addressed with that session's own temp-id.

use std::collections::HashMap;

use albinos_core::{
    Answer, ConfigCreate, ConfigGetSettings, ConfigGetSettingsNames, ConfigId, ConfigInclude,
    ConfigLoad, ConfigUnload, Request, RequestState, SettingGet, SettingRemove, SettingSubscribe,
    SettingUpdate, SubscriptionEventType,
};
use albinos_store::{ConfigStore, StoreError};
use tracing::{debug, error, warn};

use crate::session::Session;
use crate::types::{ClientEvent, ClientId, ClientRegistry, OutboundTx, ServiceRx};

/// What a handler produced: the reply for the originating client, plus an
/// optional fan-out of subscription events.
struct HandlerOutcome {
    reply: Answer,
    fanout: Option<FanOut>,
}

impl HandlerOutcome {
    fn reply(reply: Answer) -> Self {
        HandlerOutcome { reply, fanout: None }
    }

    fn state(state: RequestState) -> Self {
        HandlerOutcome::reply(Answer::state(state))
    }
}

/// One mutation's worth of subscription events, before translation into
/// each subscriber's temp-id space.
struct FanOut {
    config_id: ConfigId,
    event_type: SubscriptionEventType,
    setting_names: Vec<String>,
}

/// Run the central service processing loop.
///
/// - `service_rx`: receives events from all client tasks.
/// - `clients`: registry of connected clients and their outbound channels.
/// - `store`: the persistence layer, owned exclusively by this loop.
pub async fn run_service_loop(
    mut service_rx: ServiceRx,
    clients: ClientRegistry,
    mut store: ConfigStore,
) {
    let mut sessions: HashMap<ClientId, Session> = HashMap::new();

    while let Some(event) = service_rx.recv().await {
        match event {
            ClientEvent::Connected { client_id } => {
                sessions.insert(client_id, Session::new());
            }
            ClientEvent::Disconnected { client_id } => {
                sessions.remove(&client_id);
            }
            ClientEvent::Request { client_id, request } => {
                let outcome = match request {
                    Err(state) => HandlerOutcome::state(state),
                    Ok(request) => {
                        debug!(client = client_id.0, request = request.name(), "dispatch");
                        match sessions.get_mut(&client_id) {
                            Some(session) => handle_request(&mut store, session, request),
                            None => {
                                warn!(client = client_id.0, "request from unregistered client");
                                HandlerOutcome::state(RequestState::InternalError)
                            }
                        }
                    }
                };

                // Snapshot of current clients to minimize lock hold time.
                let current_clients = {
                    let guard = clients.read().await;
                    guard.clone()
                };

                if let Some(tx) = current_clients.get(&client_id) {
                    let _ = tx.send(outcome.reply);
                }

                if let Some(fanout) = outcome.fanout {
                    deliver_events(&sessions, &current_clients, &fanout);
                }
            }
        }
    }

    debug!("service loop shutting down (service_rx closed)");
}

/// Queue one event per matching subscription, translated into each
/// session's own temp-id. Best-effort: a full or closed channel is the
/// receiver's problem.
fn deliver_events(
    sessions: &HashMap<ClientId, Session>,
    clients: &HashMap<ClientId, OutboundTx>,
    fanout: &FanOut,
) {
    for (client_id, session) in sessions {
        let Some(temp_id) = session.temp_id_for(fanout.config_id) else {
            continue;
        };
        for name in &fanout.setting_names {
            if session.is_subscribed(fanout.config_id, name) {
                if let Some(tx) = clients.get(client_id) {
                    let _ = tx.send(Answer::event(temp_id, name.clone(), fanout.event_type));
                }
            }
        }
    }
}

fn handle_request(store: &mut ConfigStore, session: &mut Session, request: Request) -> HandlerOutcome {
    match request {
        Request::ConfigCreate(r) => create_config(store, r),
        Request::ConfigLoad(r) => load_config(store, session, r),
        Request::ConfigUnload(r) => unload_config(session, r),
        Request::ConfigInclude(r) => include_config(store, session, r),
        Request::SettingUpdate(r) => update_setting(store, session, r),
        Request::SettingRemove(r) => remove_setting(store, session, r),
        Request::SettingGet(r) => get_setting(store, session, r),
        Request::ConfigGetSettings(r) => get_all_settings(store, session, r),
        Request::ConfigGetSettingsNames(r) => get_settings_names(store, session, r),
        Request::AliasSet(_) | Request::AliasUnset(_) => alias_noop(),
        Request::Subscribe(r) => subscribe_setting(session, r),
        Request::Unsubscribe(r) => unsubscribe_setting(session, r),
    }
}

fn create_config(store: &mut ConfigStore, request: ConfigCreate) -> HandlerOutcome {
    match store.create_config(&request.config_name) {
        Ok(created) => HandlerOutcome::reply(Answer::config_created(
            created.config_key,
            created.readonly_config_key,
        )),
        Err(e) => {
            error!(name = %request.config_name, error = %e, "configuration creation failed");
            HandlerOutcome::reply(Answer::config_create_failed())
        }
    }
}

fn load_config(store: &mut ConfigStore, session: &mut Session, request: ConfigLoad) -> HandlerOutcome {
    let key = request
        .config_key
        .as_deref()
        .or(request.readonly_config_key.as_deref());
    let Some(key) = key else {
        return HandlerOutcome::state(RequestState::UnknownRequest);
    };

    let (config_id, access) = match store.config_id_by_key(key) {
        Ok(found) => found,
        Err(StoreError::UnknownKey) => return HandlerOutcome::state(RequestState::UnknownKey),
        Err(e) => {
            error!(error = %e, "key lookup failed");
            return HandlerOutcome::state(RequestState::DbError);
        }
    };

    let name = match store.config_name(config_id) {
        Ok(name) => name,
        Err(e) => {
            error!(config = %config_id, error = %e, "name lookup failed");
            return HandlerOutcome::state(RequestState::DbError);
        }
    };

    let temp_id = session.insert(config_id, access);
    HandlerOutcome::reply(Answer::config_loaded(name, temp_id))
}

fn unload_config(session: &mut Session, request: ConfigUnload) -> HandlerOutcome {
    session.remove(request.id);
    HandlerOutcome::state(RequestState::Success)
}

fn include_config(
    store: &mut ConfigStore,
    session: &mut Session,
    request: ConfigInclude,
) -> HandlerOutcome {
    let (Some(dst), Some(src)) = (session.loaded(request.id), session.loaded(request.src)) else {
        return HandlerOutcome::state(RequestState::UnknownId);
    };
    if !dst.access.can_write() {
        return HandlerOutcome::state(RequestState::ReadOnly);
    }

    match store.include_config(dst.config_id, src.config_id) {
        Ok(nb_configs) => {
            debug!(dst = %dst.config_id, src = %src.config_id, nb_configs, "include recorded");
            HandlerOutcome::state(RequestState::Success)
        }
        Err(StoreError::UnknownId(_)) => HandlerOutcome::state(RequestState::UnknownId),
        Err(e) => {
            error!(error = %e, "include failed");
            HandlerOutcome::state(RequestState::DbError)
        }
    }
}

fn update_setting(
    store: &mut ConfigStore,
    session: &mut Session,
    request: SettingUpdate,
) -> HandlerOutcome {
    let Some(loaded) = session.loaded(request.id) else {
        return HandlerOutcome::state(RequestState::UnknownId);
    };
    if !loaded.access.can_write() {
        return HandlerOutcome::state(RequestState::ReadOnly);
    }

    let mut document = match store.config(loaded.config_id) {
        Ok(document) => document,
        Err(e) => {
            error!(config = %loaded.config_id, error = %e, "document fetch failed");
            return HandlerOutcome::state(RequestState::DbError);
        }
    };

    let mut changed = Vec::with_capacity(request.settings_to_update.len());
    for (name, value) in request.settings_to_update {
        document.settings.insert(name.clone(), value);
        changed.push(name);
    }

    if let Err(e) = store.update_config(loaded.config_id, &document) {
        error!(config = %loaded.config_id, error = %e, "document update failed");
        return HandlerOutcome::state(RequestState::DbError);
    }

    HandlerOutcome {
        reply: Answer::state(RequestState::Success),
        fanout: Some(FanOut {
            config_id: loaded.config_id,
            event_type: SubscriptionEventType::Update,
            setting_names: changed,
        }),
    }
}

fn remove_setting(
    store: &mut ConfigStore,
    session: &mut Session,
    request: SettingRemove,
) -> HandlerOutcome {
    // An unloaded temp-id is still acknowledged; nothing else happens.
    let Some(loaded) = session.loaded(request.id) else {
        return HandlerOutcome::state(RequestState::Success);
    };
    if !loaded.access.can_write() {
        return HandlerOutcome::state(RequestState::ReadOnly);
    }

    // The reply goes out first; the deletion itself is best-effort and the
    // DELETE event fans out whether or not the setting existed.
    match store.config(loaded.config_id) {
        Ok(mut document) => {
            if document.settings.shift_remove(&request.setting_name).is_some() {
                if let Err(e) = store.update_config(loaded.config_id, &document) {
                    warn!(config = %loaded.config_id, error = %e, "setting removal not persisted");
                }
            }
        }
        Err(e) => {
            warn!(config = %loaded.config_id, error = %e, "document fetch failed during removal");
        }
    }

    HandlerOutcome {
        reply: Answer::state(RequestState::Success),
        fanout: Some(FanOut {
            config_id: loaded.config_id,
            event_type: SubscriptionEventType::Delete,
            setting_names: vec![request.setting_name],
        }),
    }
}

fn get_setting(store: &mut ConfigStore, session: &mut Session, request: SettingGet) -> HandlerOutcome {
    let Some(loaded) = session.loaded(request.id) else {
        return HandlerOutcome::state(RequestState::UnknownId);
    };

    let document = match store.config(loaded.config_id) {
        Ok(document) => document,
        Err(e) => {
            error!(config = %loaded.config_id, error = %e, "document fetch failed");
            return HandlerOutcome::state(RequestState::DbError);
        }
    };

    match document.settings.get(&request.setting_name) {
        Some(value) => HandlerOutcome::reply(Answer::setting_value(value.clone())),
        None => HandlerOutcome::state(RequestState::UnknownSetting),
    }
}

fn get_all_settings(
    store: &mut ConfigStore,
    session: &mut Session,
    request: ConfigGetSettings,
) -> HandlerOutcome {
    let Some(loaded) = session.loaded(request.id) else {
        return HandlerOutcome::state(RequestState::UnknownId);
    };

    match store.config(loaded.config_id) {
        Ok(document) => HandlerOutcome::reply(Answer::settings(document.settings)),
        Err(e) => {
            error!(config = %loaded.config_id, error = %e, "document fetch failed");
            HandlerOutcome::state(RequestState::DbError)
        }
    }
}

fn get_settings_names(
    store: &mut ConfigStore,
    session: &mut Session,
    request: ConfigGetSettingsNames,
) -> HandlerOutcome {
    let Some(loaded) = session.loaded(request.id) else {
        return HandlerOutcome::state(RequestState::UnknownId);
    };

    match store.config(loaded.config_id) {
        Ok(document) => HandlerOutcome::reply(Answer::settings_names(document.setting_names())),
        Err(e) => {
            error!(config = %loaded.config_id, error = %e, "document fetch failed");
            HandlerOutcome::state(RequestState::DbError)
        }
    }
}

fn alias_noop() -> HandlerOutcome {
    // Aliases are acknowledged on the wire but carry no behavior.
    HandlerOutcome::state(RequestState::Success)
}

fn subscribe_setting(session: &mut Session, request: SettingSubscribe) -> HandlerOutcome {
    let Some(loaded) = session.loaded(request.id) else {
        return HandlerOutcome::state(RequestState::UnknownId);
    };

    match request.setting_name {
        Some(name) => {
            session.subscribe(loaded.config_id, &name);
            HandlerOutcome::state(RequestState::Success)
        }
        // Alias subscriptions are not implemented.
        None => HandlerOutcome::state(RequestState::InternalError),
    }
}

fn unsubscribe_setting(session: &mut Session, request: SettingSubscribe) -> HandlerOutcome {
    let Some(loaded) = session.loaded(request.id) else {
        return HandlerOutcome::state(RequestState::UnknownId);
    };

    match request.setting_name {
        Some(name) => {
            session.unsubscribe(loaded.config_id, &name);
            HandlerOutcome::state(RequestState::Success)
        }
        None => HandlerOutcome::state(RequestState::InternalError),
    }
}
