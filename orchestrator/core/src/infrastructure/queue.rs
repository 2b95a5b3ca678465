// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// In-Memory Queue - Local Broker for In-Process Agents
//
// Provides the QueueTransport contract over tokio broadcast channels,
// one per logical channel. Used by tests and single-process
// deployments; a RabbitMQ or NATS client takes its place across
// machines, selected by configuration.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

use crate::domain::message::Message;
use crate::domain::transport::{ChannelKind, QueueTransport, TransportError};

#[derive(Clone)]
pub struct InMemoryQueue {
    channels: Arc<HashMap<ChannelKind, broadcast::Sender<Message>>>,
}

impl InMemoryQueue {
    /// Capacity bounds how many undelivered messages a slow subscriber
    /// may lag behind before old ones are dropped.
    pub fn new(capacity: usize) -> Self {
        let mut channels = HashMap::new();
        for kind in [ChannelKind::Activity, ChannelKind::Status, ChannelKind::Test] {
            let (sender, _) = broadcast::channel(capacity);
            channels.insert(kind, sender);
        }
        Self {
            channels: Arc::new(channels),
        }
    }

    pub fn with_default_capacity() -> Self {
        Self::new(1000)
    }

    pub fn subscribe(&self, channel: ChannelKind) -> broadcast::Receiver<Message> {
        self.channels[&channel].subscribe()
    }

    pub fn subscriber_count(&self, channel: ChannelKind) -> usize {
        self.channels[&channel].receiver_count()
    }
}

impl Default for InMemoryQueue {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

#[async_trait]
impl QueueTransport for InMemoryQueue {
    async fn send(&self, channel: ChannelKind, message: &Message) -> Result<(), TransportError> {
        let sender = self
            .channels
            .get(&channel)
            .ok_or(TransportError::Closed)?;

        // send() only errors when nobody is subscribed; for a local
        // bus that is not a dispatch failure.
        let receivers = sender.send(message.clone()).unwrap_or(0);
        if receivers == 0 {
            debug!(channel = channel.as_str(), "no subscribers on channel");
        }
        Ok(())
    }
}
