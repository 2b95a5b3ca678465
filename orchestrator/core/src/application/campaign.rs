// Copyright (c) 2026 Watershed Contributors
// SPDX-License-Identifier: MIT

// A scientific campaign: an ordered collection of activities submitted
// together. Dispatch is per-activity independent; one failure never
// aborts the activities that already queued or the ones still waiting.

use tracing::{debug, warn};

use crate::application::dispatch::{AgentDispatcher, DispatchError};
use crate::domain::activity::{Activity, ActivityId, CampaignId};

pub struct Campaign {
    pub id: CampaignId,
    pub name: String,
    pub activities: Vec<Activity>,
}

impl Campaign {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CampaignId::new(),
            name: name.into(),
            activities: Vec::new(),
        }
    }

    /// Add an activity, stamping this campaign's id onto it.
    pub fn add_activity(&mut self, mut activity: Activity) {
        debug!(campaign = %self.name, activity = %activity.name, "adding activity");
        activity.campaign_id = Some(self.id);
        self.activities.push(activity);
    }

    /// Dispatch every activity in order, collecting a verdict per
    /// activity.
    pub async fn dispatch(
        &mut self,
        agent: &AgentDispatcher,
    ) -> Vec<(ActivityId, Result<(), DispatchError>)> {
        let mut results = Vec::with_capacity(self.activities.len());
        for activity in &mut self.activities {
            debug!(campaign = %self.name, activity = %activity.name, "dispatching activity");
            let outcome = agent.dispatch_activity(activity).await;
            if let Err(e) = &outcome {
                warn!(activity = %activity.id, error = %e, "activity dispatch failed");
            }
            results.push((activity.id, outcome));
        }
        results
    }
}
