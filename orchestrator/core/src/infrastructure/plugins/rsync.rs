// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// Rsync transfer backend.
//
// Supports a single "transfer" action. A transfer is valid only when
// both source and destination endpoints are fully populated
// ip/path/user triples. Actual byte movement happens on the executing
// agent; this side stops at validation and command assembly.

use serde_json::{json, Value};
use std::path::Path;
use tracing::{debug, info};

use crate::domain::plugin::{Endpoint, Move, PluginError, TransferPlugin, TransferSpec};
use crate::domain::validation::ActionVerdict;

pub const PLUGIN_NAME: &str = "rsync";

const SUPPORTED_ACTIONS: [&str; 1] = ["transfer"];

#[derive(Debug, Default)]
pub struct RsyncPlugin {
    config: Value,
    configured: bool,
}

impl RsyncPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    fn validate_transfer(&self, payload: &Value) -> Result<(), String> {
        let source = match payload.get("source") {
            Some(v) => v,
            None => return Err("missing source endpoint".to_string()),
        };
        let destination = match payload.get("destination") {
            Some(v) => v,
            None => return Err("missing destination endpoint".to_string()),
        };

        let source: Endpoint = serde_json::from_value(source.clone())
            .map_err(|e| format!("malformed source endpoint: {e}"))?;
        if !source.is_complete() {
            return Err("source endpoint requires non-empty ip, path and user".to_string());
        }

        let destination: Endpoint = serde_json::from_value(destination.clone())
            .map_err(|e| format!("malformed destination endpoint: {e}"))?;
        if !destination.is_complete() {
            return Err("destination endpoint requires non-empty ip, path and user".to_string());
        }

        Ok(())
    }

    /// Assemble the rsync invocation for a validated move.
    fn build_command(&self, item: &Move) -> Vec<String> {
        let mut cmd = vec!["rsync".to_string(), "-avtr".to_string()];
        if let Some(key) = self.config.get("private_ssh_key").and_then(Value::as_str) {
            cmd.push("-e".to_string());
            cmd.push(format!("ssh -i {key}"));
        }
        cmd.push(format!(
            "{}@{}:{}",
            item.source.user, item.source.ip, item.source.path
        ));
        cmd.push(format!(
            "{}@{}:{}",
            item.destination.user, item.destination.ip, item.destination.path
        ));
        cmd
    }

    fn moves(arguments: &Value) -> Vec<Move> {
        arguments
            .get("transfer")
            .and_then(|t| t.get("items"))
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| serde_json::from_value(item.clone()).ok())
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl TransferPlugin for RsyncPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn supported_actions(&self) -> &[&str] {
        &SUPPORTED_ACTIONS
    }

    fn configure(&mut self, config: &Value) -> Result<(), PluginError> {
        if let Some(key) = config.get("private_ssh_key").and_then(Value::as_str) {
            if !Path::new(key).exists() {
                return Err(PluginError::Configuration(format!(
                    "private ssh key not found: {key}"
                )));
            }
        }
        self.config = config.clone();
        self.configured = true;
        Ok(())
    }

    fn configured(&self) -> bool {
        self.configured
    }

    fn message_template(&self, _args: Option<&Value>) -> Value {
        json!({
            "plugin": PLUGIN_NAME,
            "transfer": TransferSpec::synchronous(),
        })
    }

    fn validate_action(&self, arguments: &Value, action: &str) -> Vec<ActionVerdict> {
        if !SUPPORTED_ACTIONS.contains(&action) {
            return vec![ActionVerdict::fail(action, "unsupported action")];
        }

        let payload = match arguments.get(action) {
            Some(p) => p,
            None => return vec![ActionVerdict::fail(action, "missing action payload")],
        };

        // A payload may carry the items list from a template or be a
        // bare source/destination pair.
        let items: Vec<Value> = match payload.get("items").and_then(Value::as_array) {
            Some(items) => items.clone(),
            None => vec![payload.clone()],
        };

        for item in &items {
            if let Err(reason) = self.validate_transfer(item) {
                return vec![ActionVerdict::fail(
                    action,
                    format!("error detected for {action}: {reason}"),
                )];
            }
        }

        vec![ActionVerdict::pass(action)]
    }

    fn check(&self, arguments: &Value) -> Result<(), PluginError> {
        let verdicts = self.validate_message(std::slice::from_ref(arguments));
        for verdict in verdicts {
            if !verdict.ok {
                return Err(PluginError::Execution(verdict.reason));
            }
        }
        for item in Self::moves(arguments) {
            debug!(command = ?self.build_command(&item), "rsync dry run");
        }
        Ok(())
    }

    fn process(&self, arguments: &Value) -> Result<(), PluginError> {
        if !self.configured {
            return Err(PluginError::NotConfigured(PLUGIN_NAME.to_string()));
        }
        self.check(arguments)?;
        for item in Self::moves(arguments) {
            // Command assembly only; the executing agent owns the bytes.
            info!(command = ?self.build_command(&item), "rsync transfer accepted");
        }
        Ok(())
    }
}
