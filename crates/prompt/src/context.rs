//! Session context: display-ready fields for template rendering.
//!
//! Built from one feature row; every field is coerced to a string and the
//! defaulting table fills whatever the row does not carry. The feature row
//! itself is never mutated; the context is a separate flat mapping.

use std::collections::BTreeMap;

use coach_core::SessionFeatureRow;
use serde_json::Value;

use crate::{render, PromptError, PromptStore, SCENARIO_NOK, SCENARIO_OK};

/// Field defaults, applied field-by-field when the feature row lacks a value.
/// Present values always pass through unchanged.
const CONTEXT_DEFAULTS: &[(&str, &str)] = &[
    ("patient_name", "Unknown"),
    ("therapy_name", "Unknown Therapy"),
    ("session_number", ""),
    ("session_is_nok", "0"),
    ("pain", "0"),
    ("fatigue", "0"),
    ("quality", "5"),
    ("number_exercises", "0"),
    ("exercise_with_most_incorrect", "N/A"),
    ("first_exercise_skipped", "N/A"),
    ("leave_session", "No early leave"),
    ("number_of_distinct_exercises", "N/A"),
    ("perc_correct_repeats", "N/A"),
];

/// Flat mapping of display-ready session fields, keyed by field name.
///
/// An empty context signals "no data for this session group" to the caller;
/// that is a user-visible condition, not an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionContext {
    fields: BTreeMap<String, String>,
}

impl SessionContext {
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(field.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// True when `session_is_nok` carries a truthy value ("1", "true", ...).
    pub fn is_nok(&self) -> bool {
        match self.get("session_is_nok") {
            Some(value) => {
                let value = value.trim();
                !value.is_empty() && value != "0" && !value.eq_ignore_ascii_case("false")
            }
            None => false,
        }
    }
}

/// Builds the display context for one session group.
///
/// `None` (unknown session group) yields an empty context. Otherwise the
/// feature row is flattened field-by-field; null fields are dropped, then the
/// defaulting table fills every absent field.
pub fn build_context(feature: Option<&SessionFeatureRow>) -> SessionContext {
    let mut context = SessionContext::default();

    let Some(feature) = feature else {
        return context;
    };

    // The row serializes to a flat JSON object, so every field lands in the
    // map under its own name without a hand-written field list.
    if let Ok(Value::Object(map)) = serde_json::to_value(feature) {
        for (field, value) in map {
            if let Some(display) = display_value(&value) {
                context.insert(field, display);
            }
        }
    }

    for (field, default) in CONTEXT_DEFAULTS {
        if context.get(field).is_none() {
            context.insert(*field, *default);
        }
    }

    context
}

/// String form of a flat JSON value; `None` for null (treated as absent).
fn display_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}

/// Scenario template file name for this context's NOK status.
pub fn scenario_file(context: &SessionContext) -> &'static str {
    if context.is_nok() {
        SCENARIO_NOK
    } else {
        SCENARIO_OK
    }
}

/// Loads and renders the appropriate scenario template. The caller merges the
/// result back into the context under `scenario_description`.
pub fn scenario_description(
    store: &PromptStore,
    context: &SessionContext,
) -> Result<String, PromptError> {
    let template = store.load(scenario_file(context))?;
    render(&template, context)
}
