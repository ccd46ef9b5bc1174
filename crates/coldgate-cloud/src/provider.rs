//! Control-surface traits and the snapshot types they return.
//!
//! Method shapes follow the calls the control plane actually needs:
//! describe + bounded-target set on the autoscaler and orchestrator,
//! full-replacement writes on the routing rule, and a single run-command
//! on an instance. All desired-value writes take the target value itself,
//! never a delta — that is what makes concurrent callers converge.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CloudResult;

/// Reference to a single compute instance in the autoscaler group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceRef {
    pub instance_id: String,
}

/// Point-in-time description of an autoscaler group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDescription {
    pub desired_capacity: u32,
    pub instances: Vec<InstanceRef>,
}

/// Point-in-time description of an orchestrated service.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ServiceDescription {
    pub desired_count: u32,
    pub running_count: u32,
}

/// Autoscaler group control surface.
#[async_trait]
pub trait AutoscalingApi: Send + Sync {
    /// Look up a group by name. A name that does not exist is an error,
    /// not an empty group.
    async fn describe_group(&self, group: &str) -> CloudResult<GroupDescription>;

    /// Set the group's desired capacity to a fixed target, bypassing any
    /// cooldown.
    async fn set_desired_capacity(&self, group: &str, capacity: u32) -> CloudResult<()>;
}

/// Container-orchestrator service control surface.
#[async_trait]
pub trait OrchestratorApi: Send + Sync {
    async fn describe_service(&self, cluster: &str, service: &str)
    -> CloudResult<ServiceDescription>;

    /// Set the service's desired task count to a fixed target.
    async fn set_desired_count(&self, cluster: &str, service: &str, count: u32) -> CloudResult<()>;
}

/// Front-door routing-rule control surface.
#[async_trait]
pub trait RoutingApi: Send + Sync {
    async fn path_patterns(&self, rule: &str) -> CloudResult<Vec<String>>;

    /// Replace the rule's matched path patterns wholesale.
    async fn set_path_patterns(&self, rule: &str, patterns: &[String]) -> CloudResult<()>;
}

/// Remote one-shot command execution on an instance.
#[async_trait]
pub trait RemoteCommandApi: Send + Sync {
    /// Issue a shell command on the instance; returns the provider's
    /// command id for correlation.
    async fn run_command(&self, instance_id: &str, command: &str) -> CloudResult<String>;
}
