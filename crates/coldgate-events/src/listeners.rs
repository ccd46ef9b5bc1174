//! The listener handlers themselves.
//!
//! Each handler re-reads the ambient capacity state before acting: the
//! event alone is not trusted. An instance terminating during a
//! replacement must not park the route, and a task that is RUNNING but
//! already scheduled for teardown must not open it.

use std::sync::Arc;

use tracing::{debug, error, info};

use coldgate_cloud::{LifecycleEvent, TaskStatus};
use coldgate_core::ControlPlane;

use crate::notify::Notifier;

/// Dispatches lifecycle events for one workload.
#[derive(Clone)]
pub struct Listeners {
    plane: Arc<ControlPlane>,
    notifier: Arc<dyn Notifier>,
}

impl Listeners {
    pub fn new(plane: Arc<ControlPlane>, notifier: Arc<dyn Notifier>) -> Self {
        Self { plane, notifier }
    }

    /// Route an event to its handler, dropping events for other
    /// groups/clusters. Never returns an error: listener failures are
    /// terminal for the single invocation only.
    pub async fn handle(&self, event: &LifecycleEvent) {
        let refs = self.plane.refs();
        match event {
            LifecycleEvent::InstanceTerminating { group, instance_id } if *group == refs.group => {
                debug!(%group, %instance_id, "instance terminating");
                self.on_instance_terminating().await;
            }
            LifecycleEvent::TaskStateChange {
                cluster,
                service,
                status: TaskStatus::Running,
            } if *cluster == refs.cluster && *service == refs.service => {
                debug!(%cluster, %service, "task reached RUNNING");
                self.on_task_running().await;
            }
            LifecycleEvent::ScalingFailure {
                group,
                detail_type,
                cause,
            } if *group == refs.group => {
                self.on_scaling_failure(detail_type, cause).await;
            }
            _ => {}
        }
    }

    /// Scale-in listener: park routing only when capacity is deliberately
    /// at zero. A non-zero desired capacity means the instance is being
    /// replaced, not drained — leave the route alone.
    async fn on_instance_terminating(&self) {
        let snapshot = match self.plane.inspect().await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "scale-in listener could not read capacity");
                return;
            }
        };
        if snapshot.desired_capacity != 0 {
            debug!(
                desired = snapshot.desired_capacity,
                "instance churn, not a drain; routing unchanged"
            );
            return;
        }
        if let Err(e) = self.plane.route().set_not_ready().await {
            error!(error = %e, "scale-in listener could not park routing");
            return;
        }
        info!("workload drained to zero; routing parked at landing page");
    }

    /// Scale-up listener: open routing only when both capacity and the
    /// running count confirm the workload is healthy.
    async fn on_task_running(&self) {
        let snapshot = match self.plane.inspect().await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, "scale-up listener could not read capacity");
                return;
            }
        };
        if snapshot.desired_capacity != 1 || snapshot.service_running_count < 1 {
            debug!(
                desired = snapshot.desired_capacity,
                running = snapshot.service_running_count,
                "premature RUNNING signal; routing unchanged"
            );
            return;
        }
        if let Err(e) = self.plane.route().set_ready().await {
            error!(error = %e, "scale-up listener could not open routing");
            return;
        }
        info!("workload healthy; routing opened to application");
    }

    async fn on_scaling_failure(&self, detail_type: &str, cause: &str) {
        let group = &self.plane.refs().group;
        let subject = format!("Scaling failure — {group}");
        let message = format!("{detail_type}: {cause} (group {group})");
        if let Err(e) = self.notifier.publish(&subject, &message).await {
            error!(error = %e, "failed to publish scaling-failure notification");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    use coldgate_cloud::{AutoscalingApi, LocalCloud, OrchestratorApi, RoutingApi};
    use coldgate_core::{NOT_READY_PATTERNS, READY_PATTERNS, WorkloadRefs};

    struct RecordingNotifier {
        published: Mutex<Vec<(String, String)>>,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn publish(&self, subject: &str, message: &str) -> anyhow::Result<()> {
            self.published
                .lock()
                .unwrap()
                .push((subject.to_string(), message.to_string()));
            Ok(())
        }
    }

    fn setup() -> (LocalCloud, Listeners, Arc<RecordingNotifier>) {
        let (cloud, _rx) = LocalCloud::new();
        cloud.register_group("gpu", 0);
        cloud.register_service("studio", "comfy", "gpu");
        cloud.register_rule("front", READY_PATTERNS);
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
        let notifier = Arc::new(RecordingNotifier {
            published: Mutex::new(Vec::new()),
        });
        let listeners = Listeners::new(plane, notifier.clone());
        (cloud, listeners, notifier)
    }

    fn terminating(group: &str) -> LifecycleEvent {
        LifecycleEvent::InstanceTerminating {
            group: group.into(),
            instance_id: "i-000001".into(),
        }
    }

    fn running(cluster: &str, service: &str) -> LifecycleEvent {
        LifecycleEvent::TaskStateChange {
            cluster: cluster.into(),
            service: service.into(),
            status: TaskStatus::Running,
        }
    }

    #[tokio::test]
    async fn scale_in_parks_routing_when_drained() {
        let (cloud, listeners, _) = setup();
        listeners.handle(&terminating("gpu")).await;
        assert_eq!(
            cloud.path_patterns("front").await.unwrap(),
            NOT_READY_PATTERNS
        );
    }

    #[tokio::test]
    async fn scale_in_ignores_instance_replacement() {
        let (cloud, listeners, _) = setup();
        cloud.set_desired_capacity("gpu", 1).await.unwrap();
        listeners.handle(&terminating("gpu")).await;
        // Guard held: desired capacity is non-zero, routing untouched.
        assert_eq!(cloud.path_patterns("front").await.unwrap(), READY_PATTERNS);
    }

    #[tokio::test]
    async fn scale_in_ignores_other_groups() {
        let (cloud, listeners, _) = setup();
        listeners.handle(&terminating("other-asg")).await;
        assert_eq!(cloud.path_patterns("front").await.unwrap(), READY_PATTERNS);
    }

    #[tokio::test]
    async fn task_running_opens_routing_when_healthy() {
        let (cloud, listeners, _) = setup();
        cloud.register_rule("front", NOT_READY_PATTERNS);
        cloud.set_desired_capacity("gpu", 1).await.unwrap();
        cloud.set_desired_count("studio", "comfy", 1).await.unwrap();
        cloud.step();

        listeners.handle(&running("studio", "comfy")).await;
        assert_eq!(cloud.path_patterns("front").await.unwrap(), READY_PATTERNS);
    }

    #[tokio::test]
    async fn task_running_guard_blocks_when_not_running() {
        let (cloud, listeners, _) = setup();
        cloud.register_rule("front", NOT_READY_PATTERNS);
        cloud.set_desired_capacity("gpu", 1).await.unwrap();
        // Event arrives but the service reports no running task.
        listeners.handle(&running("studio", "comfy")).await;
        assert_eq!(
            cloud.path_patterns("front").await.unwrap(),
            NOT_READY_PATTERNS
        );
    }

    #[tokio::test]
    async fn task_running_guard_blocks_when_parked() {
        let (cloud, listeners, _) = setup();
        cloud.register_rule("front", NOT_READY_PATTERNS);
        // Running count up but capacity driven to zero: about to stop.
        cloud.force_running("studio", "comfy", 1);
        listeners.handle(&running("studio", "comfy")).await;
        assert_eq!(
            cloud.path_patterns("front").await.unwrap(),
            NOT_READY_PATTERNS
        );
    }

    #[tokio::test]
    async fn redelivery_is_harmless() {
        let (cloud, listeners, _) = setup();
        listeners.handle(&terminating("gpu")).await;
        listeners.handle(&terminating("gpu")).await;
        assert_eq!(
            cloud.path_patterns("front").await.unwrap(),
            NOT_READY_PATTERNS
        );
    }

    #[tokio::test]
    async fn listener_swallows_provider_failures() {
        let (cloud, listeners, _) = setup();
        cloud.set_failure(Some("throttled"));
        // Must not panic or propagate.
        listeners.handle(&terminating("gpu")).await;
        listeners.handle(&running("studio", "comfy")).await;
    }

    #[tokio::test]
    async fn scaling_failure_is_published() {
        let (_cloud, listeners, notifier) = setup();
        listeners
            .handle(&LifecycleEvent::ScalingFailure {
                group: "gpu".into(),
                detail_type: "Instance Launch Unsuccessful".into(),
                cause: "insufficient capacity".into(),
            })
            .await;
        let published = notifier.published.lock().unwrap();
        assert_eq!(published.len(), 1);
        assert!(published[0].1.contains("insufficient capacity"));
    }

    #[tokio::test]
    async fn scaling_failure_for_other_group_is_ignored() {
        let (_cloud, listeners, notifier) = setup();
        listeners
            .handle(&LifecycleEvent::ScalingFailure {
                group: "other-asg".into(),
                detail_type: "Instance Launch Unsuccessful".into(),
                cause: "spot interruption".into(),
            })
            .await;
        assert!(notifier.published.lock().unwrap().is_empty());
    }
}
