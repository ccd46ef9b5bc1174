//! Point-in-time capacity snapshot read by the admin page.

use coldgate_cloud::InstanceRef;

use crate::status::{WorkloadState, classify};

/// The combined autoscaler + orchestrator state at one instant.
///
/// Read-only; produced by [`ControlPlane::inspect`] and consumed by the
/// classifier and the admin page.
///
/// [`ControlPlane::inspect`]: crate::ControlPlane::inspect
#[derive(Debug, Clone)]
pub struct CapacitySnapshot {
    pub desired_capacity: u32,
    pub instances: Vec<InstanceRef>,
    pub service_desired_count: u32,
    pub service_running_count: u32,
}

impl CapacitySnapshot {
    pub fn instances_present(&self) -> bool {
        !self.instances.is_empty()
    }

    /// Classify this snapshot into a workload state.
    pub fn state(&self) -> WorkloadState {
        classify(
            self.desired_capacity > 0,
            self.service_running_count > 0,
            self.instances_present(),
        )
    }
}
