//! Workload status classification.
//!
//! Maps the inspected capacity state onto the five states the admin page
//! can show. The classification is a total function over three booleans,
//! written as one exhaustive match so the priority order is fixed by
//! construction rather than by if-chain ordering.

/// What the workload is doing right now, as far as capacity state can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkloadState {
    /// Compute up, task running — show restart and shutdown controls.
    Running,
    /// Compute up, task not yet running — status only.
    ScalingUp,
    /// Capacity driven to zero while a task still runs — status only.
    ScalingDown,
    /// Fully parked — show the scale-up control.
    Stopped,
    /// A combination none of the above should produce.
    Unexpected,
}

impl WorkloadState {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkloadState::Running => "running",
            WorkloadState::ScalingUp => "scaling-up",
            WorkloadState::ScalingDown => "scaling-down",
            WorkloadState::Stopped => "stopped",
            WorkloadState::Unexpected => "unexpected",
        }
    }
}

/// Classify `(desired_capacity > 0, running_tasks > 0, instances present)`.
///
/// `Running` requires all three: a desired and running workload with no
/// instance in the group is inconsistent external state and must surface
/// as `Unexpected`, not as `Running`.
pub fn classify(desired_up: bool, tasks_running: bool, instances_present: bool) -> WorkloadState {
    match (desired_up, tasks_running, instances_present) {
        (true, true, true) => WorkloadState::Running,
        (true, false, true) => WorkloadState::ScalingUp,
        (false, true, _) => WorkloadState::ScalingDown,
        (false, false, _) => WorkloadState::Stopped,
        (true, _, false) => WorkloadState::Unexpected,
    }
}
