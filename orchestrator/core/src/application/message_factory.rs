// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// Message Factory - Validated Message Construction
//
// Orchestrates template creation and validated construction of the
// concrete wire messages. Structural validation runs first; when the
// skeleton carries a plugin body, the named backend validates its own
// action payload. By `create` time the caller is expected to have
// fully populated the template, so any failed verdict escalates to a
// fatal error.

use serde_json::{json, Value};
use std::sync::Arc;
use tracing::warn;

use crate::domain::activity::{Activity, ActivityKind};
use crate::domain::message::{Message, MessageError, MessageKind};
use crate::domain::plugin::{Endpoint, Move};
use crate::domain::validation::{
    activity_template, status_template, validate_activity, validate_status,
};
use crate::infrastructure::plugins::PluginRegistry;

/// A message kind paired with its unvalidated skeleton. Replaces the
/// loose two-tuple of the wire protocol's description; arity mistakes
/// are unrepresentable.
#[derive(Debug, Clone)]
pub struct MessageTemplate {
    pub kind: MessageKind,
    pub fields: Value,
}

pub struct MessageFactory {
    plugins: Arc<PluginRegistry>,
}

impl MessageFactory {
    pub fn new(plugins: Arc<PluginRegistry>) -> Self {
        Self { plugins }
    }

    /// Create a blank skeleton for the given message kind. For
    /// activity templates with a plugin name, the skeleton body is
    /// seeded by that plugin; an unregistered name is fatal.
    pub fn create_template(
        &self,
        kind: MessageKind,
        plugin: Option<&str>,
        args: Option<&Value>,
    ) -> Result<MessageTemplate, MessageError> {
        match kind {
            MessageKind::Activity => {
                let mut fields = activity_template();
                if let Some(name) = plugin {
                    fields["body"] = self.plugins.message_template(name, args)?;
                }
                Ok(MessageTemplate { kind, fields })
            }
            MessageKind::Status => Ok(MessageTemplate {
                kind,
                fields: status_template(),
            }),
        }
    }

    /// Validate a populated skeleton and construct the concrete typed
    /// message.
    pub fn create(&self, template: MessageTemplate) -> Result<Message, MessageError> {
        match template.kind {
            MessageKind::Activity => {
                let verdict = validate_activity(&template.fields);
                if !verdict.ok {
                    warn!(reason = %verdict.reason, "activity message failed structural validation");
                    return Err(MessageError::InvalidActivity(verdict.reason));
                }

                let body = &template.fields["body"];
                if let Some(name) = body.get("plugin").and_then(Value::as_str) {
                    let verdicts = self.plugins.validate_message(name, body)?;
                    let failures: Vec<String> = verdicts
                        .iter()
                        .filter(|v| !v.ok)
                        .map(|v| format!("{}: {}", v.action, v.reason))
                        .collect();
                    if !failures.is_empty() {
                        warn!(plugin = name, "plugin message body failed validation");
                        return Err(MessageError::InvalidPluginBody(failures.join("; ")));
                    }
                }

                let message = serde_json::from_value(template.fields)?;
                Ok(Message::Activity(message))
            }
            MessageKind::Status => {
                let verdict = validate_status(&template.fields);
                if !verdict.ok {
                    warn!(reason = %verdict.reason, "status message failed structural validation");
                    return Err(MessageError::InvalidStatus(verdict.reason));
                }
                let message = serde_json::from_value(template.fields)?;
                Ok(Message::Status(message))
            }
        }
    }
}

impl Activity {
    /// Build this activity's wire message: seed a template, fill the
    /// envelope and the kind-specific body, then hand the result to
    /// the factory for validation and construction.
    pub fn generate_message(&self, factory: &MessageFactory) -> Result<Message, MessageError> {
        let plugin = match self.kind {
            ActivityKind::Plugin | ActivityKind::Transfer => {
                Some(self.plugin.as_deref().ok_or_else(|| {
                    MessageError::InvalidActivity(format!(
                        "{} activity requires a plugin name",
                        self.kind.as_str()
                    ))
                })?)
            }
            _ => None,
        };

        let mut template =
            factory.create_template(MessageKind::Activity, plugin, self.plugin_args.as_ref())?;
        let fields = &mut template.fields;

        fields["message_id"] = json!(self.message_id.to_string());
        fields["type"] = json!(self.kind.as_str());
        fields["activity_id"] = json!(self.id.to_string());
        fields["origin_agent_id"] = json!(self
            .origin_agent_id
            .map(|id| id.to_string())
            .unwrap_or_default());
        fields["running_agent_ids"] = json!(self
            .running_agent_ids
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>());
        fields["campaign_id"] = json!(self
            .campaign_id
            .map(|id| id.to_string())
            .unwrap_or_default());
        fields["submission_time"] = json!(self.submission_time());

        match self.kind {
            ActivityKind::Basic => {
                let function = self.function.as_deref().ok_or_else(|| {
                    MessageError::InvalidActivity(
                        "basic activity requires a registered function name".to_string(),
                    )
                })?;
                fields["body"] = json!({
                    "type": "BASIC",
                    "fn": function,
                    "args": self.arguments,
                });
            }
            ActivityKind::Shell => {
                let program = self.command.as_deref().ok_or_else(|| {
                    MessageError::InvalidActivity("shell activity requires a command".to_string())
                })?;
                fields["body"] = json!({
                    "type": "SHELL",
                    "program": program,
                    "args": self.arguments,
                    "files": self.files,
                });
            }
            ActivityKind::Plugin => {
                // Overlay the caller's action payload onto the
                // plugin-seeded skeleton.
                if let Some(Value::Object(args)) = &self.plugin_args {
                    if let Some(body) = fields["body"].as_object_mut() {
                        for (key, value) in args {
                            body.insert(key.clone(), value.clone());
                        }
                    }
                }
            }
            ActivityKind::Transfer => {
                let source = self.parse_endpoint(self.source_file.as_deref(), "source")?;
                let destination =
                    self.parse_endpoint(self.dest_directory.as_deref(), "destination")?;
                fields["body"]["transfer"]["items"] = json!([Move {
                    source,
                    destination
                }]);
                fields["body"]["transfer"]["override_existing"] = json!(self.override_existing);
            }
        }

        factory.create(template)
    }

    fn parse_endpoint(&self, spec: Option<&str>, role: &str) -> Result<Endpoint, MessageError> {
        let spec = spec.ok_or_else(|| {
            MessageError::InvalidActivity(format!("transfer activity requires a {role}"))
        })?;
        Endpoint::parse(spec).ok_or_else(|| {
            MessageError::InvalidActivity(format!(
                "transfer {role} must look like user@host:/path, got '{spec}'"
            ))
        })
    }
}
