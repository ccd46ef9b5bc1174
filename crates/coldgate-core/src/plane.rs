//! The control plane: inspection and the three triggers.
//!
//! Every operation is a short-lived read-then-write against the provider,
//! invoked once per admin request. The only write values are the bounded
//! targets 1 and 0 and the two literal pattern sets, never a computed
//! delta, which is the whole correctness argument for running without a
//! distributed lock (see crate docs).

use std::sync::Arc;

use tracing::{info, warn};

use coldgate_cloud::{
    AutoscalingApi, CloudError, CloudResult, OrchestratorApi, RemoteCommandApi, RoutingApi,
};

use crate::routing::RouteFlip;
use crate::snapshot::CapacitySnapshot;

/// Shell command issued to the instance to bounce the container runtime.
pub const RESTART_COMMAND: &str = "sudo systemctl restart docker";

/// Identifiers of the externally-owned resources this plane drives.
#[derive(Debug, Clone)]
pub struct WorkloadRefs {
    pub group: String,
    pub cluster: String,
    pub service: String,
    pub rule: String,
}

/// Result of a scale-up request, mirroring the admin page's states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleUpOutcome {
    /// Capacity was 0 and has been raised; the workload is launching.
    Triggered,
    /// Capacity already 1 but no task running yet.
    StillScaling,
    /// Capacity 1 and a task running; nothing to do.
    AlreadyRunning,
    /// Desired capacity outside {0, 1}; this plane never wrote that
    /// value, so report it instead of pretending progress.
    Unexpected,
}

/// Result of a scale-down request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleDownOutcome {
    ShuttingDown,
    AlreadyStopped,
}

/// Result of a restart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestartOutcome {
    /// The restart command was issued and routing was parked at not-ready.
    Restarted { command_id: String },
    /// Preconditions not met; no command was issued. Distinct from a
    /// provider failure: nothing external went wrong.
    NoRunningInstance,
}

/// Stateless handle over the four provider surfaces for one workload.
#[derive(Clone)]
pub struct ControlPlane {
    asg: Arc<dyn AutoscalingApi>,
    orchestrator: Arc<dyn OrchestratorApi>,
    commands: Arc<dyn RemoteCommandApi>,
    route: RouteFlip,
    refs: WorkloadRefs,
}

impl ControlPlane {
    pub fn new(
        asg: Arc<dyn AutoscalingApi>,
        orchestrator: Arc<dyn OrchestratorApi>,
        routing: Arc<dyn RoutingApi>,
        commands: Arc<dyn RemoteCommandApi>,
        refs: WorkloadRefs,
    ) -> Self {
        let route = RouteFlip::new(routing, refs.rule.clone());
        Self {
            asg,
            orchestrator,
            commands,
            route,
            refs,
        }
    }

    pub fn refs(&self) -> &WorkloadRefs {
        &self.refs
    }

    /// The route flip controller for this workload's front-door rule.
    pub fn route(&self) -> &RouteFlip {
        &self.route
    }

    /// Read the combined autoscaler + orchestrator state. No side effects.
    pub async fn inspect(&self) -> CloudResult<CapacitySnapshot> {
        let group = self.asg.describe_group(&self.refs.group).await?;
        let service = self
            .orchestrator
            .describe_service(&self.refs.cluster, &self.refs.service)
            .await?;
        Ok(CapacitySnapshot {
            desired_capacity: group.desired_capacity,
            instances: group.instances,
            service_desired_count: service.desired_count,
            service_running_count: service.running_count,
        })
    }

    /// Raise the group to capacity 1 and the service to desired count 1.
    ///
    /// Safe to invoke repeatedly and concurrently: both writes set the
    /// fixed target 1, so racing callers cannot overshoot.
    pub async fn scale_up(&self) -> CloudResult<ScaleUpOutcome> {
        let group = self.asg.describe_group(&self.refs.group).await?;

        if group.desired_capacity == 0 {
            self.asg.set_desired_capacity(&self.refs.group, 1).await?;

            // Re-read after the capacity write; another caller may have
            // raised the service count in the meantime.
            let service = self
                .orchestrator
                .describe_service(&self.refs.cluster, &self.refs.service)
                .await?;
            if service.desired_count < 1 {
                self.orchestrator
                    .set_desired_count(&self.refs.cluster, &self.refs.service, 1)
                    .await?;
            }

            info!(group = %self.refs.group, "scale-up triggered");
            return Ok(ScaleUpOutcome::Triggered);
        }

        if group.desired_capacity != 1 {
            warn!(
                group = %self.refs.group,
                desired = group.desired_capacity,
                "desired capacity outside [0,1]"
            );
            return Ok(ScaleUpOutcome::Unexpected);
        }

        let service = self
            .orchestrator
            .describe_service(&self.refs.cluster, &self.refs.service)
            .await?;
        if service.running_count == 0 {
            Ok(ScaleUpOutcome::StillScaling)
        } else {
            Ok(ScaleUpOutcome::AlreadyRunning)
        }
    }

    /// Drive the group to capacity 0. Not a decrement: the only valid
    /// capacities are 0 and 1.
    pub async fn scale_down(&self) -> CloudResult<ScaleDownOutcome> {
        let group = self.asg.describe_group(&self.refs.group).await?;
        if group.desired_capacity == 1 {
            self.asg.set_desired_capacity(&self.refs.group, 0).await?;
            info!(group = %self.refs.group, "scale-down triggered");
            Ok(ScaleDownOutcome::ShuttingDown)
        } else {
            Ok(ScaleDownOutcome::AlreadyStopped)
        }
    }

    /// Bounce the container runtime on the sole instance, then park
    /// routing at not-ready until the workload reports RUNNING again.
    ///
    /// Requires capacity 1, a running task, and an instance to target;
    /// otherwise no command is issued.
    pub async fn restart(&self) -> CloudResult<RestartOutcome> {
        let group = self.asg.describe_group(&self.refs.group).await?;
        if group.desired_capacity != 1 {
            return Ok(RestartOutcome::NoRunningInstance);
        }

        let service = self
            .orchestrator
            .describe_service(&self.refs.cluster, &self.refs.service)
            .await?;
        if service.running_count < 1 {
            return Ok(RestartOutcome::NoRunningInstance);
        }

        // Max capacity is 1 everywhere, so the first instance is the
        // only one.
        let Some(instance) = group.instances.first() else {
            warn!(group = %self.refs.group, "capacity up but no instance to restart");
            return Ok(RestartOutcome::NoRunningInstance);
        };

        let command_id = self
            .commands
            .run_command(&instance.instance_id, RESTART_COMMAND)
            .await?;

        // Once the command is out, the not-ready flip must land even if
        // the caller's deadline drops this future; run it on its own
        // task and await the handle.
        let route = self.route.clone();
        tokio::spawn(async move { route.set_not_ready().await })
            .await
            .map_err(|e| CloudError::Dependency(format!("route flip task failed: {e}")))??;

        info!(instance = %instance.instance_id, %command_id, "restart command sent");
        Ok(RestartOutcome::Restarted { command_id })
    }
}
