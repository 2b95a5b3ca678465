// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// Transfer plugin capability contract.
//
// Every transfer/execution backend (shell, rsync, future Globus-style
// movers) plugs into the same message envelope through this trait. The
// registry and message factory only ever speak this contract; what a
// valid message body looks like is decided entirely by the plugin.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::domain::validation::ActionVerdict;

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("plugin '{0}' must be configured before it can process")]
    NotConfigured(String),

    #[error("plugin '{0}' is not registered")]
    NotRegistered(String),

    #[error("invalid plugin configuration: {0}")]
    Configuration(String),

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("plugin execution failed: {0}")]
    Execution(String),
}

/// One end of a move: address, path and credential user, rsync style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoint {
    pub ip: String,
    pub path: String,
    pub user: String,
}

impl Endpoint {
    /// All three components are non-empty.
    pub fn is_complete(&self) -> bool {
        !self.ip.is_empty() && !self.path.is_empty() && !self.user.is_empty()
    }

    /// Parse an rsync-style spec of the form `user@host:/path`.
    pub fn parse(spec: &str) -> Option<Self> {
        let (user, rest) = spec.split_once('@')?;
        let (ip, path) = rest.split_once(':')?;
        if user.is_empty() || ip.is_empty() || path.is_empty() {
            return None;
        }
        Some(Self {
            ip: ip.to_string(),
            path: path.to_string(),
            user: user.to_string(),
        })
    }
}

/// A single source/destination pair inside a transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub source: Endpoint,
    pub destination: Endpoint,
}

/// The transfer action payload seeded into a message body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferSpec {
    #[serde(rename = "type")]
    pub mode: String,
    pub items: Vec<Move>,
}

impl TransferSpec {
    /// One placeholder move with empty-string triples; callers fill
    /// these in before validation.
    pub fn synchronous() -> Self {
        Self {
            mode: "synchronous".to_string(),
            items: vec![Move::default()],
        }
    }
}

/// Contract every transfer/execution backend implements.
///
/// `validate_action` and `validate_message` never error for expected
/// validation failure; they always return verdicts so a caller can
/// aggregate every problem found. Only misuse (`process` before
/// `configure`) is fatal.
pub trait TransferPlugin: Send + Sync {
    /// Stable lowercase identifier. Registry lookup key and the
    /// `body.plugin` discriminator.
    fn name(&self) -> &str;

    /// Action keywords this backend recognizes. Anything outside this
    /// set fails validation with an "unsupported action" reason.
    fn supported_actions(&self) -> &[&str];

    /// Accept backend-specific settings. Idempotent to re-invoke; the
    /// new configuration overwrites the old one.
    fn configure(&mut self, config: &Value) -> Result<(), PluginError>;

    fn configured(&self) -> bool;

    /// A fresh, type-specific blank template used to seed a message
    /// body. Each call returns an independent instance and must not
    /// mutate plugin state.
    fn message_template(&self, args: Option<&Value>) -> Value;

    /// Validate a single action's argument mapping.
    fn validate_action(&self, arguments: &Value, action: &str) -> Vec<ActionVerdict>;

    /// Validate every action across a sequence of argument mappings,
    /// concatenating verdicts in input order. No short-circuit: one
    /// verdict is recorded per action entry even after a failure.
    fn validate_message(&self, arguments: &[Value]) -> Vec<ActionVerdict> {
        let mut verdicts = Vec::new();
        for entry in arguments {
            match entry.as_object() {
                Some(map) => {
                    for action in map.keys() {
                        verdicts.extend(self.validate_action(entry, action));
                    }
                }
                None => verdicts.push(ActionVerdict::fail(
                    "",
                    "action mapping must be a JSON object",
                )),
            }
        }
        verdicts
    }

    /// Pre-flight dry run over the argument mapping.
    fn check(&self, arguments: &Value) -> Result<(), PluginError>;

    /// Execute. Fails fast with `PluginError::NotConfigured` when
    /// `configure` has not been called.
    fn process(&self, arguments: &Value) -> Result<(), PluginError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// Contract probe: one recognized action, validity decided by a
    /// boolean in the payload.
    struct EchoPlugin;

    impl TransferPlugin for EchoPlugin {
        fn name(&self) -> &str {
            "echo"
        }

        fn supported_actions(&self) -> &[&str] {
            &["echo"]
        }

        fn configure(&mut self, _config: &Value) -> Result<(), PluginError> {
            Ok(())
        }

        fn configured(&self) -> bool {
            true
        }

        fn message_template(&self, _args: Option<&Value>) -> Value {
            json!({"plugin": "echo", "echo": {"ok": false}})
        }

        fn validate_action(&self, arguments: &Value, action: &str) -> Vec<ActionVerdict> {
            if action != "echo" {
                return vec![ActionVerdict::fail(action, "unsupported action")];
            }
            if arguments[action]["ok"].as_bool().unwrap_or(false) {
                vec![ActionVerdict::pass(action)]
            } else {
                vec![ActionVerdict::fail(action, "payload not ok")]
            }
        }

        fn check(&self, _arguments: &Value) -> Result<(), PluginError> {
            Ok(())
        }

        fn process(&self, _arguments: &Value) -> Result<(), PluginError> {
            Ok(())
        }
    }

    #[test]
    fn test_endpoint_parse() {
        let ep = Endpoint::parse("alice@10.0.0.7:/data/in.csv").unwrap();
        assert_eq!(ep.user, "alice");
        assert_eq!(ep.ip, "10.0.0.7");
        assert_eq!(ep.path, "/data/in.csv");
        assert!(ep.is_complete());

        assert!(Endpoint::parse("no-user-or-colon").is_none());
        assert!(Endpoint::parse("@host:/p").is_none());
        assert!(Endpoint::parse("u@:/p").is_none());
    }

    #[test]
    fn test_transfer_spec_placeholder() {
        let spec = TransferSpec::synchronous();
        assert_eq!(spec.mode, "synchronous");
        assert_eq!(spec.items.len(), 1);
        assert!(!spec.items[0].source.is_complete());

        let wire = serde_json::to_value(&spec).unwrap();
        assert_eq!(wire["type"], "synchronous");
        assert_eq!(wire["items"][0]["source"]["ip"], "");
    }

    #[test]
    fn test_validate_message_does_not_short_circuit() {
        let plugin = EchoPlugin;
        let arguments = vec![
            json!({"echo": {"ok": false}}),
            json!({"echo": {"ok": true}}),
            json!({"bogus": {}}),
        ];
        let verdicts = plugin.validate_message(&arguments);
        assert_eq!(verdicts.len(), 3);
        assert!(!verdicts[0].ok);
        assert!(verdicts[1].ok);
        assert!(!verdicts[2].ok);
        assert_eq!(verdicts[2].action, "bogus");
    }

    #[test]
    fn test_validate_message_flags_non_object_entries() {
        let plugin = EchoPlugin;
        let verdicts = plugin.validate_message(&[json!("not a mapping")]);
        assert_eq!(verdicts.len(), 1);
        assert!(!verdicts[0].ok);
    }
}
