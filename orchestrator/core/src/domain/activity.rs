// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use uuid::Uuid;

/// Timestamp layout used on the wire, millisecond precision.
pub const SUBMISSION_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActivityId(pub Uuid);

impl ActivityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for ActivityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub Uuid);

impl MessageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MessageId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CampaignId(pub Uuid);

impl CampaignId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CampaignId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CampaignId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AgentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// The four activity kinds carried in a message's `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActivityKind {
    Basic,
    Shell,
    Plugin,
    Transfer,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Basic => "BASIC",
            ActivityKind::Shell => "SHELL",
            ActivityKind::Plugin => "PLUGIN",
            ActivityKind::Transfer => "TRANSFER",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "BASIC" => Some(ActivityKind::Basic),
            "SHELL" => Some(ActivityKind::Shell),
            "PLUGIN" => Some(ActivityKind::Plugin),
            "TRANSFER" => Some(ActivityKind::Transfer),
            _ => None,
        }
    }
}

/// Lifecycle of an activity. `Created` is the only construction state;
/// `Queued` is set exclusively by the dispatch boundary after a
/// successful send; the remaining states arrive via status messages
/// from the executing agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityStatus {
    Created,
    Queued,
    Running,
    Completed,
    Failed,
}

impl ActivityStatus {
    fn rank(&self) -> u8 {
        match self {
            ActivityStatus::Created => 0,
            ActivityStatus::Queued => 1,
            ActivityStatus::Running => 2,
            ActivityStatus::Completed | ActivityStatus::Failed => 3,
        }
    }
}

#[derive(Debug, Error)]
pub enum ActivityError {
    #[error("activity status may only move forward: {from:?} -> {to:?}")]
    BackwardTransition {
        from: ActivityStatus,
        to: ActivityStatus,
    },
}

/// A unit of campaign work.
///
/// Identity (`id`, `message_id`) and the submission timestamp are
/// assigned once at construction and never reassigned. Files and
/// arguments are append-only until dispatch; each instance owns
/// freshly allocated collections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    pub id: ActivityId,
    pub message_id: MessageId,
    pub name: String,
    pub kind: ActivityKind,
    pub command: Option<String>,
    pub arguments: Vec<String>,
    pub files: Vec<String>,
    pub campaign_id: Option<CampaignId>,
    pub origin_agent_id: Option<AgentId>,
    pub running_agent_ids: Vec<AgentId>,
    /// Registered function name carried by `Basic` activities. A name,
    /// not a callable, so the body stays serializable across the wire.
    pub function: Option<String>,
    /// Backend name for `Plugin` and `Transfer` activities.
    pub plugin: Option<String>,
    /// Caller-supplied action payload overlaid onto the plugin template.
    pub plugin_args: Option<Value>,
    pub source_file: Option<String>,
    pub dest_directory: Option<String>,
    pub override_existing: bool,
    submission_time: String,
    status: ActivityStatus,
}

impl Activity {
    pub fn new(name: impl Into<String>, kind: ActivityKind) -> Self {
        Self {
            id: ActivityId::new(),
            message_id: MessageId::new(),
            name: name.into(),
            kind,
            command: None,
            arguments: Vec::new(),
            files: Vec::new(),
            campaign_id: None,
            origin_agent_id: None,
            running_agent_ids: Vec::new(),
            function: None,
            plugin: None,
            plugin_args: None,
            source_file: None,
            dest_directory: None,
            override_existing: false,
            submission_time: Utc::now().format(SUBMISSION_TIME_FORMAT).to_string(),
            status: ActivityStatus::Created,
        }
    }

    /// An in-process function activity. `function` must name an entry
    /// in the dispatching agent's function table.
    pub fn basic(name: impl Into<String>, function: impl Into<String>) -> Self {
        let mut activity = Self::new(name, ActivityKind::Basic);
        activity.function = Some(function.into());
        activity
    }

    pub fn shell(name: impl Into<String>, command: impl Into<String>) -> Self {
        let mut activity = Self::new(name, ActivityKind::Shell);
        activity.command = Some(command.into());
        activity
    }

    pub fn plugin(name: impl Into<String>, plugin: impl Into<String>, args: Value) -> Self {
        let mut activity = Self::new(name, ActivityKind::Plugin);
        activity.plugin = Some(plugin.into());
        activity.plugin_args = Some(args);
        activity
    }

    /// A data movement activity. Source and destination are rsync-style
    /// specs of the form `user@host:/path`.
    pub fn transfer(
        name: impl Into<String>,
        plugin: impl Into<String>,
        source: impl Into<String>,
        dest: impl Into<String>,
    ) -> Self {
        let mut activity = Self::new(name, ActivityKind::Transfer);
        activity.plugin = Some(plugin.into());
        activity.source_file = Some(source.into());
        activity.dest_directory = Some(dest.into());
        activity
    }

    pub fn add_file(&mut self, file: impl Into<String>) {
        self.files.push(file.into());
    }

    pub fn add_files<I, S>(&mut self, files: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files.extend(files.into_iter().map(Into::into));
    }

    pub fn add_argument(&mut self, arg: impl Into<String>) {
        self.arguments.push(arg.into());
    }

    pub fn add_arguments<I, S>(&mut self, args: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.arguments.extend(args.into_iter().map(Into::into));
    }

    pub fn set_command(&mut self, command: impl Into<String>) {
        self.command = Some(command.into());
    }

    pub fn status(&self) -> ActivityStatus {
        self.status
    }

    /// Submission timestamp, `YYYY-MM-DD HH:MM:SS.mmm`.
    pub fn submission_time(&self) -> &str {
        &self.submission_time
    }

    /// Move the lifecycle forward. Same-state and backward transitions
    /// are rejected.
    pub fn advance_status(&mut self, next: ActivityStatus) -> Result<(), ActivityError> {
        if next.rank() <= self.status.rank() {
            return Err(ActivityError::BackwardTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }

    /// Snapshot for the external persistence recorder. The core holds
    /// the data; it performs no I/O itself.
    pub fn record(&self) -> ActivityRecord {
        ActivityRecord {
            activity_id: self.id,
            agent_id: self.origin_agent_id,
            created_at: self.submission_time.clone(),
            started_at: None,
            ended_at: None,
            params: json!({
                "name": self.name,
                "kind": self.kind.as_str(),
                "command": self.command,
                "arguments": self.arguments,
                "files": self.files,
            }),
        }
    }
}

/// Row-shaped activity snapshot handed to an external recorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub activity_id: ActivityId,
    pub agent_id: Option<AgentId>,
    pub created_at: String,
    pub started_at: Option<String>,
    pub ended_at: Option<String>,
    pub params: Value,
}
