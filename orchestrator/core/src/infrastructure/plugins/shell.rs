// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// Minimal shell backend. Declares no supported actions, so any action
// submitted to it fails validation; it exists to prove the capability
// contract, not to execute.

use serde_json::{json, Value};
use tracing::debug;

use crate::domain::plugin::{PluginError, TransferPlugin};
use crate::domain::validation::ActionVerdict;

pub const PLUGIN_NAME: &str = "shell";

#[derive(Debug, Default)]
pub struct ShellPlugin {
    config: Value,
    configured: bool,
}

impl ShellPlugin {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TransferPlugin for ShellPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn supported_actions(&self) -> &[&str] {
        &[]
    }

    fn configure(&mut self, config: &Value) -> Result<(), PluginError> {
        self.config = config.clone();
        self.configured = true;
        Ok(())
    }

    fn configured(&self) -> bool {
        self.configured
    }

    fn message_template(&self, _args: Option<&Value>) -> Value {
        json!({"plugin": PLUGIN_NAME})
    }

    fn validate_action(&self, _arguments: &Value, action: &str) -> Vec<ActionVerdict> {
        vec![ActionVerdict::fail(action, "unsupported action")]
    }

    fn check(&self, _arguments: &Value) -> Result<(), PluginError> {
        debug!("shell plugin dry run: no actions to check");
        Ok(())
    }

    fn process(&self, _arguments: &Value) -> Result<(), PluginError> {
        if !self.configured {
            return Err(PluginError::NotConfigured(PLUGIN_NAME.to_string()));
        }
        Err(PluginError::Unsupported(
            "shell plugin does not execute actions".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_action_fails_validation() {
        let plugin = ShellPlugin::new();
        for action in ["run", "transfer", ""] {
            let verdicts = plugin.validate_action(&json!({action: {}}), action);
            assert_eq!(verdicts.len(), 1);
            assert!(!verdicts[0].ok);
            assert_eq!(verdicts[0].reason, "unsupported action");
        }
    }

    #[test]
    fn test_supported_actions_is_empty() {
        assert!(ShellPlugin::new().supported_actions().is_empty());
    }

    #[test]
    fn test_process_requires_configuration() {
        let plugin = ShellPlugin::new();
        assert!(matches!(
            plugin.process(&json!({})),
            Err(PluginError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_process_is_a_stub_even_when_configured() {
        let mut plugin = ShellPlugin::new();
        plugin.configure(&json!({})).unwrap();
        assert!(matches!(
            plugin.process(&json!({})),
            Err(PluginError::Unsupported(_))
        ));
    }

    #[test]
    fn test_configure_is_idempotent_and_overwrites() {
        let mut plugin = ShellPlugin::new();
        plugin.configure(&json!({"a": 1})).unwrap();
        plugin.configure(&json!({"a": 2})).unwrap();
        assert!(plugin.configured());
        assert_eq!(plugin.config["a"], 2);
    }
}
