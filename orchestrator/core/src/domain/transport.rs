// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::message::Message;

/// Logical channels carried by the broker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChannelKind {
    Activity,
    Status,
    Test,
}

impl ChannelKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChannelKind::Activity => "ACTIVITY",
            ChannelKind::Status => "STATUS",
            ChannelKind::Test => "TEST",
        }
    }
}

/// Broker technology behind the transport. Selected by configuration,
/// never by the protocol core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueKind {
    RabbitMq,
    Nats,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("send failed: {0}")]
    Send(String),

    #[error("send timed out after {0} ms")]
    Timeout(u64),

    #[error("queue is closed")]
    Closed,
}

/// The minimal contract the dispatch boundary consumes: a single-shot
/// asynchronous send with an unambiguous success/failure report. No
/// internal retry; a failed send leaves the caller free to retry the
/// whole dispatch.
#[async_trait]
pub trait QueueTransport: Send + Sync {
    async fn send(&self, channel: ChannelKind, message: &Message) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_kind_wire_tags() {
        assert_eq!(ChannelKind::Activity.as_str(), "ACTIVITY");
        assert_eq!(ChannelKind::Status.as_str(), "STATUS");
        assert_eq!(ChannelKind::Test.as_str(), "TEST");
    }

    #[test]
    fn test_queue_kind_config_tags() {
        let kind: QueueKind = serde_json::from_str("\"rabbitmq\"").unwrap();
        assert_eq!(kind, QueueKind::RabbitMq);
        let kind: QueueKind = serde_json::from_str("\"nats\"").unwrap();
        assert_eq!(kind, QueueKind::Nats);
    }
}
