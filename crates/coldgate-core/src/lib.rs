//! coldgate-core — the scale-to-zero control logic.
//!
//! Everything in this crate is a stateless operation over externally-held
//! infrastructure state: the autoscaler group's desired capacity, the
//! orchestrated service's task counts, and the front-door routing rule's
//! path patterns. There is no lock and no coordinator; every mutation
//! writes a fixed bounded target (capacity 1, capacity 0, a literal
//! pattern set), so concurrent invocations converge last-writer-wins at
//! the same value.
//!
//! The entry point is [`ControlPlane`], which bundles the provider
//! handles and the workload's identifiers and exposes the four
//! operations: [`inspect`], [`scale_up`], [`scale_down`], [`restart`].
//!
//! [`inspect`]: ControlPlane::inspect
//! [`scale_up`]: ControlPlane::scale_up
//! [`scale_down`]: ControlPlane::scale_down
//! [`restart`]: ControlPlane::restart

pub mod plane;
pub mod routing;
pub mod snapshot;
pub mod status;

pub use plane::{
    ControlPlane, RESTART_COMMAND, RestartOutcome, ScaleDownOutcome, ScaleUpOutcome, WorkloadRefs,
};
pub use routing::{NOT_READY_PATTERNS, READY_PATTERNS, RouteFlip};
pub use snapshot::CapacitySnapshot;
pub use status::{WorkloadState, classify};
