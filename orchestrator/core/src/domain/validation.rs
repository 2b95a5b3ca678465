// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// Structural message validation.
//
// Structural validators gate the envelope shape independent of plugin
// semantics. They check a fixed field order and stop at the first
// defect: a structural hole is a programmer error, not data variance,
// so there is nothing useful to aggregate. Plugin-level validation
// (see `domain::plugin`) is the opposite: it records a verdict for
// every action so the caller can report all problems at once.

use serde_json::{json, Value};

use crate::domain::activity::ActivityKind;

/// Outcome of a structural check. Never an `Err`; an invalid message
/// is an expected outcome, not a fault in the validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub ok: bool,
    pub reason: String,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            ok: true,
            reason: String::new(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            ok: false,
            reason: reason.into(),
        }
    }
}

/// Outcome of validating a single plugin action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionVerdict {
    pub action: String,
    pub ok: bool,
    pub reason: String,
}

impl ActionVerdict {
    pub fn pass(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ok: true,
            reason: String::new(),
        }
    }

    pub fn fail(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            ok: false,
            reason: reason.into(),
        }
    }
}

/// Keys an activity envelope must carry. Values may be empty at
/// template time; the keys themselves are non-negotiable.
const ACTIVITY_REQUIRED_FIELDS: [&str; 4] = ["message_id", "type", "activity_id", "campaign_id"];

/// The recognized minimal status field set. Extra fields are tolerated.
const STATUS_REQUIRED_FIELDS: [&str; 7] = [
    "message_id",
    "type",
    "activity_id",
    "agent_id",
    "campaign_id",
    "submission_time",
    "status",
];

/// Blank activity envelope. Callers fill the fields, then hand the
/// skeleton back to the message factory for validation.
pub fn activity_template() -> Value {
    json!({
        "message_id": "",
        "type": "",
        "activity_id": "",
        "origin_agent_id": "",
        "running_agent_ids": [],
        "campaign_id": "",
        "credential": {},
        "submission_time": "",
        "body": {},
        "needs": [],
    })
}

/// Blank status envelope.
pub fn status_template() -> Value {
    json!({
        "message_id": "",
        "type": "STATUS",
        "activity_id": "",
        "agent_id": "",
        "campaign_id": "",
        "submission_time": "",
        "status": "",
    })
}

/// Validate an activity envelope: required keys present (values may be
/// empty) and a recognized `type` tag.
pub fn validate_activity(fields: &Value) -> Verdict {
    let map = match fields.as_object() {
        Some(map) => map,
        None => return Verdict::fail("activity message must be a JSON object"),
    };

    for field in ACTIVITY_REQUIRED_FIELDS {
        if !map.contains_key(field) {
            return Verdict::fail(format!("missing required field: {field}"));
        }
    }

    let tag = map
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default();
    if ActivityKind::from_tag(tag).is_none() {
        return Verdict::fail(format!("unrecognized activity type: '{tag}'"));
    }

    Verdict::pass()
}

/// Validate a status envelope: the recognized minimal field set must
/// be present; anything extra passes through untouched.
pub fn validate_status(fields: &Value) -> Verdict {
    let map = match fields.as_object() {
        Some(map) => map,
        None => return Verdict::fail("status message must be a JSON object"),
    };

    for field in STATUS_REQUIRED_FIELDS {
        if !map.contains_key(field) {
            return Verdict::fail(format!("missing required field: {field}"));
        }
    }

    Verdict::pass()
}
