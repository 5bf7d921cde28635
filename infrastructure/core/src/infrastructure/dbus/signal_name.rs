// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Signal member names
//!
//! A signal member encodes the event it carries as
//! `<lowercase namespace tokens>_<EventSimpleName>`, e.g.
//! `pythoneda_realm_rydnr_events_SomethingHappened` for the event type
//! `pythoneda.realm.rydnr.events.SomethingHappened`.

/// Split a signal member name into namespace tokens followed by the event name.
///
/// Lowercase-leading tokens belong to the namespace; the first
/// uppercase-leading token starts the event name, and anything after it is
/// re-joined with `_`. Empty tokens are skipped.
pub fn parse_signal_name(value: &str) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    let mut event_name: Option<String> = None;

    for token in value.split('_').filter(|t| !t.is_empty()) {
        match event_name.as_mut() {
            Some(name) => {
                name.push('_');
                name.push_str(token);
            }
            None if token.starts_with(|c: char| c.is_uppercase()) => {
                event_name = Some(token.to_string());
            }
            None => result.push(token.to_lowercase()),
        }
    }

    if let Some(name) = event_name {
        result.push(name);
    }

    result
}

/// Recover the fully-qualified event type a signal member refers to.
///
/// Returns `None` when the member carries no event name.
pub fn event_type_for_signal(signal: &str) -> Option<String> {
    let tokens = parse_signal_name(signal);
    let (name, namespace) = tokens.split_last()?;
    if !name.starts_with(|c: char| c.is_uppercase()) {
        return None;
    }
    if namespace.is_empty() {
        Some(name.clone())
    } else {
        Some(format!("{}.{}", namespace.join("."), name))
    }
}

/// Signal member name for a fully-qualified event type.
pub fn signal_name_for(event_type: &str) -> String {
    event_type.replace('.', "_")
}

/// `SomethingHappened` -> `something_happened`.
pub fn camel_to_snake(value: &str) -> String {
    let mut result = String::with_capacity(value.len() + 4);
    let mut previous: Option<char> = None;

    for c in value.chars() {
        if c.is_uppercase() {
            if matches!(previous, Some(p) if p.is_lowercase() || p.is_ascii_digit()) {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
        previous = Some(c);
    }

    result
}
