// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// Plugin Registry - Transfer Backend Lookup and Dispatch
//
// Holds the configured plugin instances and dispatches template and
// validation calls to the named backend. The registry itself performs
// no validation logic; what a valid body looks like is decided by each
// plugin and the structural validators.

pub mod rsync;
pub mod shell;

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::config::AgentSettings;
use crate::domain::message::MessageError;
use crate::domain::plugin::{PluginError, TransferPlugin};
use crate::domain::validation::ActionVerdict;

use rsync::RsyncPlugin;
use shell::ShellPlugin;

/// Name -> configured plugin instance. Written once at startup, then
/// treated as read-only during steady-state dispatch.
pub struct PluginRegistry {
    plugins: HashMap<String, Arc<dyn TransferPlugin>>,
}

impl PluginRegistry {
    pub fn empty() -> Self {
        Self {
            plugins: HashMap::new(),
        }
    }

    /// Build the registry from agent settings, configuring each
    /// built-in backend with its settings entry. A backend that fails
    /// to configure is skipped, not fatal.
    pub fn from_settings(settings: &AgentSettings) -> Self {
        let mut registry = Self::empty();

        info!("initializing transfer plugin registry");

        let empty = Value::Object(serde_json::Map::new());
        let builtins: Vec<Box<dyn TransferPlugin>> =
            vec![Box::new(ShellPlugin::new()), Box::new(RsyncPlugin::new())];

        for mut plugin in builtins {
            let name = plugin.name().to_string();
            let config = settings.plugin_config(&name).unwrap_or(&empty);
            match plugin.configure(config) {
                Ok(()) => {
                    info!(plugin = %name, "configured plugin");
                    registry.plugins.insert(name, Arc::from(plugin));
                }
                Err(e) => {
                    warn!(plugin = %name, error = %e, "failed to configure plugin, skipping");
                }
            }
        }

        registry
    }

    /// Register an already configured plugin under its own name.
    pub fn register(&mut self, plugin: Box<dyn TransferPlugin>) {
        let name = plugin.name().to_string();
        if self.plugins.insert(name.clone(), Arc::from(plugin)).is_some() {
            warn!(plugin = %name, "replaced previously registered plugin");
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.plugins.keys().cloned().collect()
    }

    fn get(&self, name: &str) -> Result<&Arc<dyn TransferPlugin>, MessageError> {
        self.plugins
            .get(name)
            .ok_or_else(|| MessageError::PluginNotFound(name.to_string()))
    }

    /// Delegate template creation to the named backend.
    pub fn message_template(
        &self,
        name: &str,
        args: Option<&Value>,
    ) -> Result<Value, MessageError> {
        Ok(self.get(name)?.message_template(args))
    }

    /// Delegate body validation to the named backend. The body's
    /// `plugin` discriminator is stripped; everything else is treated
    /// as an action mapping.
    pub fn validate_message(
        &self,
        name: &str,
        body: &Value,
    ) -> Result<Vec<ActionVerdict>, MessageError> {
        let plugin = self.get(name)?;

        let mut actions = serde_json::Map::new();
        if let Some(map) = body.as_object() {
            for (key, value) in map {
                if key != "plugin" {
                    actions.insert(key.clone(), value.clone());
                }
            }
        }

        Ok(plugin.validate_message(&[Value::Object(actions)]))
    }

    pub fn check(&self, name: &str, arguments: &Value) -> Result<(), PluginError> {
        let plugin = self
            .plugins
            .get(name)
            .ok_or_else(|| PluginError::NotRegistered(name.to_string()))?;
        plugin.check(arguments)
    }

    pub fn process(&self, name: &str, arguments: &Value) -> Result<(), PluginError> {
        let plugin = self
            .plugins
            .get(name)
            .ok_or_else(|| PluginError::NotRegistered(name.to_string()))?;
        plugin.process(arguments)
    }
}
