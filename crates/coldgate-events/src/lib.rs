//! coldgate-events — lifecycle-event listeners.
//!
//! Two listeners keep the front-door routing rule in sync with the
//! workload's actual state, with no coordination beyond the ambient
//! capacity counters:
//!
//! - scale-in: instance begins terminating and desired capacity is 0
//!   ⇒ park routing at not-ready
//! - scale-up: a task reaches RUNNING and capacity confirms health
//!   ⇒ open routing to the application
//!
//! A third listener forwards autoscaler launch/terminate failures to a
//! [`Notifier`]. All listeners are fire-and-forget: errors are logged and
//! swallowed, and every action is idempotent so at-least-once event
//! delivery is harmless.

pub mod listeners;
pub mod notify;
pub mod pump;

pub use listeners::Listeners;
pub use notify::{LogNotifier, Notifier};
pub use pump::run_pump;
