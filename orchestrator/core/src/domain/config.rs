// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// Agent settings.
//
// YAML manifest selecting the broker technology and carrying the
// per-plugin configuration maps handed to `TransferPlugin::configure`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use crate::domain::transport::QueueKind;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSettings {
    #[serde(default)]
    pub queue: QueueSettings,

    /// Plugin name -> backend-specific configuration.
    #[serde(default)]
    pub plugins: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueSettings {
    #[serde(default = "default_queue_kind")]
    pub kind: QueueKind,

    #[serde(default = "default_queue_host")]
    pub host: String,

    #[serde(default = "default_queue_port")]
    pub port: u16,
}

fn default_queue_kind() -> QueueKind {
    QueueKind::RabbitMq
}

fn default_queue_host() -> String {
    "localhost".to_string()
}

fn default_queue_port() -> u16 {
    5672
}

impl Default for QueueSettings {
    fn default() -> Self {
        Self {
            kind: default_queue_kind(),
            host: default_queue_host(),
            port: default_queue_port(),
        }
    }
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            queue: QueueSettings::default(),
            plugins: HashMap::new(),
        }
    }
}

impl AgentSettings {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let settings = serde_yaml::from_str(&raw)?;
        Ok(settings)
    }

    pub fn plugin_config(&self, name: &str) -> Option<&Value> {
        self.plugins.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let settings = AgentSettings::default();
        assert_eq!(settings.queue.kind, QueueKind::RabbitMq);
        assert_eq!(settings.queue.host, "localhost");
        assert_eq!(settings.queue.port, 5672);
        assert!(settings.plugins.is_empty());
    }

    #[test]
    fn test_load_from_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "queue:\n  kind: nats\n  host: broker.internal\n  port: 4222\nplugins:\n  rsync:\n    private_ssh_key: /home/svc/.ssh/id_ed25519\n  shell: {{}}"
        )
        .unwrap();

        let settings = AgentSettings::load(file.path()).unwrap();
        assert_eq!(settings.queue.kind, QueueKind::Nats);
        assert_eq!(settings.queue.port, 4222);
        assert_eq!(
            settings.plugin_config("rsync").unwrap()["private_ssh_key"],
            "/home/svc/.ssh/id_ed25519"
        );
        assert!(settings.plugin_config("globus").is_none());
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let settings: AgentSettings = serde_yaml::from_str("plugins:\n  shell: {}\n").unwrap();
        assert_eq!(settings.queue.kind, QueueKind::RabbitMq);
        assert!(settings.plugin_config("shell").is_some());
    }
}
