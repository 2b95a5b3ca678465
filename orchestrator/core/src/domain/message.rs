// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// Wire-level message envelopes.
//
// Field names are stable contract surface shared with every agent on
// the queue: message_id, type, activity_id, origin_agent_id,
// running_agent_ids, campaign_id, submission_time, body, needs.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// The two message kinds carried by the queue transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MessageKind {
    Activity,
    Status,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Activity => "ACTIVITY",
            MessageKind::Status => "STATUS",
        }
    }
}

/// An activity dispatch envelope. `body` is shaped by the activity
/// kind; for plugin-backed kinds `body.plugin` names the backend and
/// `body.<action>` holds the action payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityMessage {
    pub message_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub activity_id: String,
    #[serde(default)]
    pub origin_agent_id: String,
    #[serde(default)]
    pub running_agent_ids: Vec<String>,
    pub campaign_id: String,
    #[serde(default)]
    pub credential: Value,
    #[serde(default)]
    pub submission_time: String,
    #[serde(default)]
    pub body: Value,
    /// Activity ids that must complete before this one may be claimed.
    #[serde(default)]
    pub needs: Vec<String>,
}

/// Agent/activity health report. A recognized minimal field set plus
/// whatever extra fields the reporting agent attaches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub activity_id: String,
    pub agent_id: String,
    pub campaign_id: String,
    #[serde(default)]
    pub submission_time: String,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// A validated, concrete message ready for the transport.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Message {
    Activity(ActivityMessage),
    Status(StatusMessage),
}

// The two envelopes overlap structurally (a status carries every field
// an activity requires), so the variant must be picked off the `type`
// tag rather than by shape.
impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        let is_status = value.get("type").and_then(Value::as_str) == Some("STATUS");
        if is_status {
            StatusMessage::deserialize(value)
                .map(Message::Status)
                .map_err(serde::de::Error::custom)
        } else {
            ActivityMessage::deserialize(value)
                .map(Message::Activity)
                .map_err(serde::de::Error::custom)
        }
    }
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Activity(_) => MessageKind::Activity,
            Message::Status(_) => MessageKind::Status,
        }
    }

    pub fn message_id(&self) -> &str {
        match self {
            Message::Activity(m) => &m.message_id,
            Message::Status(m) => &m.message_id,
        }
    }
}

/// Fatal message construction errors. Expected validation outcomes are
/// verdict values (see `domain::validation`); by the time the factory
/// raises one of these the caller was expected to have supplied a
/// fully populated template.
#[derive(Debug, Error)]
pub enum MessageError {
    #[error("plugin not found: '{0}'")]
    PluginNotFound(String),

    #[error("invalid activity message: {0}")]
    InvalidActivity(String),

    #[error("invalid status message: {0}")]
    InvalidStatus(String),

    #[error("invalid plugin message body: {0}")]
    InvalidPluginBody(String),

    #[error("malformed message template: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_activity_message_wire_field_names() {
        let msg = ActivityMessage {
            message_id: "m-1".into(),
            kind: "SHELL".into(),
            activity_id: "a-1".into(),
            origin_agent_id: "agent-1".into(),
            running_agent_ids: vec!["agent-2".into()],
            campaign_id: "c-1".into(),
            credential: json!({}),
            submission_time: "2026-08-24 10:00:00.000".into(),
            body: json!({"type": "SHELL", "program": "echo"}),
            needs: vec![],
        };
        let wire = serde_json::to_value(&msg).unwrap();
        for field in [
            "message_id",
            "type",
            "activity_id",
            "origin_agent_id",
            "running_agent_ids",
            "campaign_id",
            "submission_time",
            "body",
            "needs",
        ] {
            assert!(wire.get(field).is_some(), "missing wire field {field}");
        }
        assert_eq!(wire["type"], "SHELL");
    }

    #[test]
    fn test_activity_message_defaults_optional_fields() {
        let msg: ActivityMessage = serde_json::from_value(json!({
            "message_id": "m",
            "type": "BASIC",
            "activity_id": "a",
            "campaign_id": "c",
        }))
        .unwrap();
        assert!(msg.running_agent_ids.is_empty());
        assert!(msg.needs.is_empty());
        assert!(msg.body.is_null());
    }

    #[test]
    fn test_status_message_tolerates_extra_fields() {
        let msg: StatusMessage = serde_json::from_value(json!({
            "message_id": "m",
            "type": "STATUS",
            "activity_id": "a",
            "agent_id": "ag",
            "campaign_id": "c",
            "submission_time": "",
            "status": "RUNNING",
            "cpu_load": 0.75,
        }))
        .unwrap();
        assert_eq!(msg.extra["cpu_load"], 0.75);
    }

    #[test]
    fn test_status_message_round_trips_as_status() {
        // A status envelope is a structural superset of an activity
        // envelope; the round trip must still land on Status.
        let status = StatusMessage {
            message_id: "m-1".into(),
            kind: "STATUS".into(),
            activity_id: "a-1".into(),
            agent_id: "ag-1".into(),
            campaign_id: "c-1".into(),
            submission_time: "2026-08-24 10:00:00.000".into(),
            status: "RUNNING".into(),
            extra: serde_json::Map::new(),
        };
        let wire = serde_json::to_value(Message::Status(status)).unwrap();
        let back: Message = serde_json::from_value(wire).unwrap();
        match back {
            Message::Status(s) => {
                assert_eq!(s.agent_id, "ag-1");
                assert_eq!(s.status, "RUNNING");
            }
            Message::Activity(_) => panic!("status message deserialized as activity"),
        }
    }

    #[test]
    fn test_activity_message_round_trips_as_activity() {
        let wire = serde_json::json!({
            "message_id": "m-2",
            "type": "SHELL",
            "activity_id": "a-2",
            "campaign_id": "c-2",
            "body": {"type": "SHELL", "program": "echo"},
        });
        let back: Message = serde_json::from_value(wire).unwrap();
        assert_eq!(back.kind(), MessageKind::Activity);
    }

    #[test]
    fn test_message_kind_accessor() {
        let status: StatusMessage = serde_json::from_value(json!({
            "message_id": "m",
            "type": "STATUS",
            "activity_id": "",
            "agent_id": "",
            "campaign_id": "",
        }))
        .unwrap();
        let msg = Message::Status(status);
        assert_eq!(msg.kind(), MessageKind::Status);
        assert_eq!(msg.message_id(), "m");
    }
}
