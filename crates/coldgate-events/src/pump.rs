//! Event pump — drains the lifecycle-event stream into the listeners.

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

use coldgate_cloud::LifecycleEvent;

use crate::listeners::Listeners;

/// Dispatch events until the stream closes or shutdown is signalled.
///
/// Events are handled one at a time; a slow provider call delays later
/// events rather than overlapping with them, which keeps the (already
/// idempotent) route writes strictly ordered.
pub async fn run_pump(
    mut events: mpsc::UnboundedReceiver<LifecycleEvent>,
    listeners: Listeners,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("event pump started");
    loop {
        tokio::select! {
            maybe = events.recv() => match maybe {
                Some(event) => {
                    debug!(?event, "dispatching lifecycle event");
                    listeners.handle(&event).await;
                }
                None => {
                    info!("event stream closed, pump exiting");
                    break;
                }
            },
            _ = shutdown.changed() => {
                info!("event pump shutting down");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use coldgate_cloud::{LocalCloud, RoutingApi};
    use coldgate_core::{ControlPlane, NOT_READY_PATTERNS, READY_PATTERNS, WorkloadRefs};

    use crate::notify::LogNotifier;

    #[tokio::test]
    async fn pump_resynchronizes_routing_end_to_end() {
        let (cloud, rx) = LocalCloud::new();
        cloud.register_group("gpu", 0);
        cloud.register_service("studio", "comfy", "gpu");
        cloud.register_rule("front", NOT_READY_PATTERNS);
        let shared = Arc::new(cloud.clone());
        let plane = Arc::new(ControlPlane::new(
            shared.clone(),
            shared.clone(),
            shared.clone(),
            shared,
            WorkloadRefs {
                group: "gpu".into(),
                cluster: "studio".into(),
                service: "comfy".into(),
                rule: "front".into(),
            },
        ));

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let listeners = Listeners::new(plane.clone(), Arc::new(LogNotifier));
        let pump = tokio::spawn(run_pump(rx, listeners, shutdown_rx));

        // Scale up and let the provider converge; the RUNNING event must
        // open the route.
        plane.scale_up().await.unwrap();
        cloud.step();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(cloud.path_patterns("front").await.unwrap(), READY_PATTERNS);

        // Scale back down; the terminating event must park it again.
        plane.scale_down().await.unwrap();
        cloud.step();
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert_eq!(
            cloud.path_patterns("front").await.unwrap(),
            NOT_READY_PATTERNS
        );

        shutdown_tx.send(true).unwrap();
        pump.await.unwrap();
    }
}
