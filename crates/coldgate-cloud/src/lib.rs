//! coldgate-cloud — provider seam for the Coldgate control plane.
//!
//! The control plane owns no state: everything it reads and writes lives
//! in externally-managed infrastructure. This crate defines the four
//! control surfaces that boundary exposes:
//!
//! - [`AutoscalingApi`] — desired capacity and instance list of the
//!   compute group backing the workload
//! - [`OrchestratorApi`] — desired/running task counts of the container
//!   service
//! - [`RoutingApi`] — the path-pattern set of the front-door routing rule
//! - [`RemoteCommandApi`] — one-shot remote execution on an instance
//!
//! plus the [`LifecycleEvent`] stream those systems emit, and
//! [`LocalCloud`], an in-process provider used in local mode and tests.
//! Cloud-specific bindings implement the same traits out of tree.

pub mod error;
pub mod events;
pub mod local;
pub mod provider;

pub use error::{CloudError, CloudResult, with_timeout};
pub use events::{LifecycleEvent, TaskStatus};
pub use local::{LocalCloud, SentCommand};
pub use provider::{
    AutoscalingApi, GroupDescription, InstanceRef, OrchestratorApi, RemoteCommandApi, RoutingApi,
    ServiceDescription,
};
