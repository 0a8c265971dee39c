//! Normalization of decision-service actions.
//!
//! The service answers in several loose shapes:
//!
//! - flat: `{"type": "move_to", "x": 10, "y": 20}`
//! - nested: `{"move_to": {"x": 10, "y": 20}}`, `{"say": "text"}`,
//!   `{"set_mode": "engage"}`, `{"despawn": true}`
//! - composite: `{"engage": {"move_to": {...}, "fire_burst": {...}}}`
//!
//! Every shape maps to one [`WingmanAction`]. Anything unrecognized or
//! missing a required field is dropped on its own; the rest of the batch
//! is still applied.

use serde_json::Value;
use sortie_core::decision::{BurstOrder, WingmanAction};
use sortie_core::enums::WingmanMode;

const NESTED_KEYS: [&str; 6] = ["engage", "move_to", "fire_burst", "set_mode", "say", "despawn"];

/// Normalize a whole batch, dropping invalid entries.
pub fn normalize_actions(raw: &[Value]) -> Vec<WingmanAction> {
    raw.iter()
        .filter_map(|value| {
            let action = normalize_action(value);
            if action.is_none() {
                tracing::debug!(%value, "dropping unrecognized wingman action");
            }
            action
        })
        .collect()
}

/// Normalize a single raw action.
pub fn normalize_action(raw: &Value) -> Option<WingmanAction> {
    let obj = raw.as_object()?;
    if let Some(kind) = obj.get("type").and_then(Value::as_str) {
        return from_flat(kind, raw);
    }
    NESTED_KEYS
        .iter()
        .find_map(|key| obj.get(*key).map(|body| (*key, body)))
        .and_then(|(key, body)| from_nested(key, body))
}

fn from_flat(kind: &str, body: &Value) -> Option<WingmanAction> {
    match kind.trim().to_ascii_lowercase().as_str() {
        "set_mode" => mode(body.get("mode")?),
        "move_to" => point(body).map(|(x, y)| WingmanAction::MoveTo { x, y }),
        "fire_burst" => Some(WingmanAction::FireBurst(burst(body))),
        "say" => say(body.get("text")?),
        "despawn" => Some(WingmanAction::Despawn),
        "engage" => Some(engage(body)),
        _ => None,
    }
}

fn from_nested(key: &str, body: &Value) -> Option<WingmanAction> {
    match key {
        "set_mode" if body.is_string() => mode(body),
        "set_mode" => mode(body.get("mode")?),
        "move_to" => point(body).map(|(x, y)| WingmanAction::MoveTo { x, y }),
        "fire_burst" if body.is_object() => Some(WingmanAction::FireBurst(burst(body))),
        "say" if body.is_string() => say(body),
        "say" => say(body.get("text")?),
        "despawn" => match body {
            Value::Null | Value::Bool(false) => None,
            _ => Some(WingmanAction::Despawn),
        },
        "engage" => Some(engage(body)),
        _ => None,
    }
}

fn mode(value: &Value) -> Option<WingmanAction> {
    let mode = WingmanMode::from_wire(value.as_str()?)?;
    Some(WingmanAction::SetMode { mode })
}

fn say(value: &Value) -> Option<WingmanAction> {
    let text = value.as_str()?.trim();
    if text.is_empty() {
        return None;
    }
    Some(WingmanAction::Say {
        text: text.to_string(),
    })
}

fn point(value: &Value) -> Option<(f64, f64)> {
    Some((number(value.get("x"))?, number(value.get("y"))?))
}

fn burst(value: &Value) -> BurstOrder {
    BurstOrder {
        cadence_ms: number(value.get("cadence_ms")),
        duration_ms: number(value.get("duration_ms")),
        spread: number(value.get("spread")),
    }
}

fn engage(value: &Value) -> WingmanAction {
    WingmanAction::Engage {
        move_to: value.get("move_to").and_then(point),
        fire_burst: value
            .get("fire_burst")
            .filter(|b| b.is_object())
            .map(burst),
    }
}

/// Finite number from a JSON number or numeric string.
fn number(value: Option<&Value>) -> Option<f64> {
    let n = match value? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}
