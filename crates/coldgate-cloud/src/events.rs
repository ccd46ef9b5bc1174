//! Infrastructure lifecycle events consumed by the control plane.
//!
//! These arrive from the event source with at-least-once delivery; every
//! handler downstream must be idempotent.

use serde::{Deserialize, Serialize};

/// Task state as reported by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Provisioning,
    Running,
    Stopped,
}

/// A lifecycle event emitted by the autoscaler or the orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum LifecycleEvent {
    /// An instance in the group has begun terminating (scale-in or
    /// replacement — the listener distinguishes via desired capacity).
    InstanceTerminating {
        group: String,
        instance_id: String,
    },

    /// A task in the cluster changed state.
    TaskStateChange {
        cluster: String,
        service: String,
        status: TaskStatus,
    },

    /// The autoscaler failed to launch or terminate an instance.
    ScalingFailure {
        group: String,
        detail_type: String,
        cause: String,
    },
}
