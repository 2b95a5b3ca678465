// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// Agent Dispatch - The Boundary Between Activities and the Queue
//
// One send per activity, awaited before the lifecycle moves to Queued.
// A failed or cancelled send leaves the activity at Created so the
// caller can retry the whole dispatch; there is no internal retry.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use crate::application::message_factory::MessageFactory;
use crate::domain::activity::{Activity, ActivityError, ActivityKind, ActivityStatus, AgentId};
use crate::domain::message::MessageError;
use crate::domain::transport::{ChannelKind, QueueTransport, TransportError};

/// In-process callable backing a `Basic` activity. The wire carries
/// only the registered name.
pub type ActivityFn = Arc<dyn Fn(&[String]) -> Value + Send + Sync>;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Message(#[from] MessageError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Activity(#[from] ActivityError),

    #[error("no registered function named '{0}'")]
    UnknownFunction(String),
}

/// The process-level endpoint that owns dispatch of activities onto
/// the queue transport.
pub struct AgentDispatcher {
    id: AgentId,
    factory: MessageFactory,
    transport: Arc<dyn QueueTransport>,
    functions: HashMap<String, ActivityFn>,
}

impl AgentDispatcher {
    pub fn new(factory: MessageFactory, transport: Arc<dyn QueueTransport>) -> Self {
        Self {
            id: AgentId::new(),
            factory,
            transport,
            functions: HashMap::new(),
        }
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    /// Register a callable under a stable name so Basic activities can
    /// reference it serializably.
    pub fn register_function<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(&[String]) -> Value + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(function = %name, "registered activity function");
        self.functions.insert(name, Arc::new(function));
    }

    /// Run a registered function locally. Execution semantics beyond
    /// the lookup are the caller's business.
    pub fn invoke(&self, name: &str, args: &[String]) -> Result<Value, DispatchError> {
        let function = self
            .functions
            .get(name)
            .ok_or_else(|| DispatchError::UnknownFunction(name.to_string()))?;
        Ok(function(args))
    }

    /// Generate the activity's message, send it, and only then advance
    /// the lifecycle to Queued.
    pub async fn dispatch_activity(&self, activity: &mut Activity) -> Result<(), DispatchError> {
        if activity.kind == ActivityKind::Basic {
            if let Some(function) = activity.function.as_deref() {
                if !self.functions.contains_key(function) {
                    return Err(DispatchError::UnknownFunction(function.to_string()));
                }
            }
        }

        if activity.origin_agent_id.is_none() {
            activity.origin_agent_id = Some(self.id);
        }

        let message = activity.generate_message(&self.factory)?;
        self.transport.send(ChannelKind::Activity, &message).await?;
        activity.advance_status(ActivityStatus::Queued)?;
        info!(activity = %activity.id, name = %activity.name, "activity queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::AgentSettings;
    use crate::domain::message::Message;
    use crate::infrastructure::plugins::PluginRegistry;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use uuid::Uuid;

    /// Records every send and always succeeds.
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(ChannelKind, Message)>>,
    }

    #[async_trait]
    impl QueueTransport for RecordingTransport {
        async fn send(
            &self,
            channel: ChannelKind,
            message: &Message,
        ) -> Result<(), TransportError> {
            self.sent.lock().unwrap().push((channel, message.clone()));
            Ok(())
        }
    }

    /// Always reports the broker unreachable.
    struct FailingTransport;

    #[async_trait]
    impl QueueTransport for FailingTransport {
        async fn send(&self, _: ChannelKind, _: &Message) -> Result<(), TransportError> {
            Err(TransportError::Send("broker unreachable".to_string()))
        }
    }

    fn dispatcher(transport: Arc<dyn QueueTransport>) -> AgentDispatcher {
        let registry = Arc::new(PluginRegistry::from_settings(&AgentSettings::default()));
        let mut dispatcher = AgentDispatcher::new(MessageFactory::new(registry), transport);
        dispatcher.register_function("count_words", |args: &[String]| {
            json!(args.join(" ").split_whitespace().count())
        });
        dispatcher
    }

    #[tokio::test]
    async fn test_count_words_end_to_end() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone());

        let mut activity = Activity::basic("Count Words", "count_words");
        activity.add_argument("Hello World");
        assert_eq!(activity.status(), ActivityStatus::Created);

        dispatcher.dispatch_activity(&mut activity).await.unwrap();
        assert_eq!(activity.status(), ActivityStatus::Queued);
        assert_eq!(activity.origin_agent_id, Some(dispatcher.id()));

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, ChannelKind::Activity);
        let wire = match &sent[0].1 {
            Message::Activity(m) => m,
            _ => panic!("expected an activity message"),
        };
        assert_eq!(wire.body["type"], "BASIC");
        assert!(!wire.body["fn"].is_null());
        assert!(Uuid::parse_str(&wire.activity_id).is_ok());

        // The registered function itself still runs locally.
        let count = dispatcher.invoke("count_words", &["Hello World".to_string()]);
        assert_eq!(count.unwrap(), json!(2));
    }

    #[tokio::test]
    async fn test_failed_send_leaves_activity_created() {
        let dispatcher = dispatcher(Arc::new(FailingTransport));
        let mut activity = Activity::basic("Count Words", "count_words");
        activity.add_argument("Hello World");

        let result = dispatcher.dispatch_activity(&mut activity).await;
        assert!(matches!(result, Err(DispatchError::Transport(_))));
        assert_eq!(activity.status(), ActivityStatus::Created);
    }

    #[tokio::test]
    async fn test_unregistered_function_is_rejected_before_send() {
        let transport = Arc::new(RecordingTransport::default());
        let dispatcher = dispatcher(transport.clone());
        let mut activity = Activity::basic("Mystery", "reverse_words");

        let result = dispatcher.dispatch_activity(&mut activity).await;
        assert!(matches!(result, Err(DispatchError::UnknownFunction(_))));
        assert!(transport.sent.lock().unwrap().is_empty());
        assert_eq!(activity.status(), ActivityStatus::Created);
    }

    #[test]
    fn test_invoke_unknown_function() {
        let dispatcher = dispatcher(Arc::new(RecordingTransport::default()));
        assert!(matches!(
            dispatcher.invoke("nope", &[]),
            Err(DispatchError::UnknownFunction(_))
        ));
    }
}
