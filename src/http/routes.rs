//! `POST /sync` and `POST /reset_damage`.

use std::collections::HashMap;
use std::sync::Arc;

use log::warn;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{post, State};
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::RwLock;

use super::dto::SnapshotDto;
use super::error::ApiError;
use crate::error::ControlError;
use crate::registers::SignalId;
use crate::state::{ControlValue, SimState};

#[derive(Debug, Deserialize)]
pub struct SyncRequest {
    #[serde(default)]
    pub controls: HashMap<String, Value>,
}

/// Apply each provided control key/value pair and return the resulting
/// snapshot. A key that doesn't name a writable signal, or a value of the
/// wrong JSON type for its signal, is rejected outright with `400`,
/// chosen over silently ignoring unknown keys so a client typo surfaces
/// immediately instead of appearing to work.
#[post("/sync", data = "<body>")]
pub async fn sync(
    state: &State<Arc<RwLock<SimState>>>,
    body: Json<SyncRequest>,
) -> Result<Json<SnapshotDto>, ApiError> {
    let mut guard = state.write().await;
    for (key, value) in &body.controls {
        let signal = SignalId::from_control_key(key).ok_or(ControlError::UnknownSignal)?;
        let control_value = control_value_from_json(value).ok_or(ControlError::UnknownSignal)?;
        guard.apply_control(signal, control_value)?;
    }
    let snapshot = guard.snapshot();
    drop(guard);
    Ok(Json(SnapshotDto::from(&snapshot)))
}

fn control_value_from_json(value: &Value) -> Option<ControlValue> {
    match value {
        Value::Bool(b) => Some(ControlValue::Bool(*b)),
        Value::Number(n) => n.as_f64().map(ControlValue::Number),
        _ => None,
    }
}

#[post("/reset_damage")]
pub async fn reset_damage(state: &State<Arc<RwLock<SimState>>>) -> Status {
    let mut guard = state.write().await;
    guard.health.reset_damage();
    warn!("operator reset all equipment health to 100.0");
    Status::NoContent
}
