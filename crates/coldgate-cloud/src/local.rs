//! In-process provider backing local mode and tests.
//!
//! `LocalCloud` keeps the group/service/rule state behind one `RwLock`
//! and implements all four control surfaces against it. A [`step`]
//! convergence pass plays the role of the real autoscaler and
//! orchestrator control loops: it launches or terminates instances
//! toward the group's desired capacity, starts or stops tasks toward the
//! service's desired count, and emits the matching [`LifecycleEvent`]s.
//!
//! [`step`]: LocalCloud::step

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tokio::sync::mpsc;
use tracing::debug;

use crate::error::{CloudError, CloudResult};
use crate::events::{LifecycleEvent, TaskStatus};
use crate::provider::{
    AutoscalingApi, GroupDescription, InstanceRef, OrchestratorApi, RemoteCommandApi, RoutingApi,
    ServiceDescription,
};

/// A remote command recorded by the local provider.
#[derive(Debug, Clone)]
pub struct SentCommand {
    pub instance_id: String,
    pub command: String,
    pub command_id: String,
}

struct GroupState {
    desired: u32,
    instances: Vec<InstanceRef>,
}

struct ServiceState {
    desired: u32,
    running: u32,
    /// Group whose instances host this service's tasks.
    backing_group: String,
}

struct Inner {
    groups: HashMap<String, GroupState>,
    services: HashMap<(String, String), ServiceState>,
    rules: HashMap<String, Vec<String>>,
    sent_commands: Vec<SentCommand>,
    next_instance: u64,
    next_command: u64,
    /// When set, every provider call fails with this message.
    failure: Option<String>,
}

/// In-memory implementation of every provider trait.
#[derive(Clone)]
pub struct LocalCloud {
    inner: Arc<RwLock<Inner>>,
    events: mpsc::UnboundedSender<LifecycleEvent>,
}

impl LocalCloud {
    /// Create an empty provider and the lifecycle-event receiver fed by
    /// its convergence passes.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<LifecycleEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let cloud = Self {
            inner: Arc::new(RwLock::new(Inner {
                groups: HashMap::new(),
                services: HashMap::new(),
                rules: HashMap::new(),
                sent_commands: Vec::new(),
                next_instance: 1,
                next_command: 1,
                failure: None,
            })),
            events,
        };
        (cloud, rx)
    }

    pub fn register_group(&self, name: &str, desired: u32) {
        let mut inner = self.inner.write().expect("state lock");
        inner.groups.insert(
            name.to_string(),
            GroupState {
                desired,
                instances: Vec::new(),
            },
        );
    }

    pub fn register_service(&self, cluster: &str, service: &str, backing_group: &str) {
        let mut inner = self.inner.write().expect("state lock");
        inner.services.insert(
            (cluster.to_string(), service.to_string()),
            ServiceState {
                desired: 0,
                running: 0,
                backing_group: backing_group.to_string(),
            },
        );
    }

    pub fn register_rule(&self, rule: &str, patterns: &[&str]) {
        let mut inner = self.inner.write().expect("state lock");
        inner.rules.insert(
            rule.to_string(),
            patterns.iter().map(|p| p.to_string()).collect(),
        );
    }

    /// Make every subsequent provider call fail (fault injection).
    pub fn set_failure(&self, message: Option<&str>) {
        let mut inner = self.inner.write().expect("state lock");
        inner.failure = message.map(str::to_string);
    }

    /// Force a service's running count, bypassing convergence. Lets tests
    /// construct inconsistent external states (e.g. running task, no
    /// instance).
    pub fn force_running(&self, cluster: &str, service: &str, running: u32) {
        let mut inner = self.inner.write().expect("state lock");
        if let Some(state) = inner
            .services
            .get_mut(&(cluster.to_string(), service.to_string()))
        {
            state.running = running;
        }
    }

    /// Commands issued through the remote-command surface so far.
    pub fn sent_commands(&self) -> Vec<SentCommand> {
        let inner = self.inner.read().expect("state lock");
        inner.sent_commands.clone()
    }

    /// Inject a lifecycle event as if the infrastructure emitted it.
    pub fn emit(&self, event: LifecycleEvent) {
        let _ = self.events.send(event);
    }

    /// Run one convergence pass over all groups and services.
    ///
    /// Mirrors what the real autoscaler and orchestrator do between
    /// control-plane calls: actual state drifts toward desired state, and
    /// lifecycle events fire on each transition.
    pub fn step(&self) {
        let mut emitted = Vec::new();
        {
            let mut inner = self.inner.write().expect("state lock");

            let mut next_instance = inner.next_instance;
            for (name, group) in inner.groups.iter_mut() {
                while group.instances.len() < group.desired as usize {
                    let id = format!("i-{next_instance:06}");
                    next_instance += 1;
                    group.instances.push(InstanceRef { instance_id: id });
                }
                while group.instances.len() > group.desired as usize {
                    if let Some(instance) = group.instances.pop() {
                        emitted.push(LifecycleEvent::InstanceTerminating {
                            group: name.clone(),
                            instance_id: instance.instance_id,
                        });
                    }
                }
            }
            inner.next_instance = next_instance;

            let hosted: HashMap<String, bool> = inner
                .groups
                .iter()
                .map(|(name, g)| (name.clone(), !g.instances.is_empty()))
                .collect();

            for ((cluster, service), svc) in inner.services.iter_mut() {
                let has_instance = hosted.get(&svc.backing_group).copied().unwrap_or(false);
                if svc.running < svc.desired && has_instance {
                    svc.running = svc.desired;
                    emitted.push(LifecycleEvent::TaskStateChange {
                        cluster: cluster.clone(),
                        service: service.clone(),
                        status: TaskStatus::Running,
                    });
                } else if svc.running > 0 && (!has_instance || svc.desired < svc.running) {
                    svc.running = if has_instance { svc.desired } else { 0 };
                    emitted.push(LifecycleEvent::TaskStateChange {
                        cluster: cluster.clone(),
                        service: service.clone(),
                        status: TaskStatus::Stopped,
                    });
                }
            }
        }

        for event in emitted {
            debug!(?event, "lifecycle event");
            let _ = self.events.send(event);
        }
    }

    fn check_failure(&self) -> CloudResult<()> {
        let inner = self.inner.read().expect("state lock");
        match &inner.failure {
            Some(message) => Err(CloudError::Dependency(message.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl AutoscalingApi for LocalCloud {
    async fn describe_group(&self, group: &str) -> CloudResult<GroupDescription> {
        self.check_failure()?;
        let inner = self.inner.read().expect("state lock");
        let state = inner
            .groups
            .get(group)
            .ok_or_else(|| CloudError::NotFound(format!("autoscaler group {group}")))?;
        Ok(GroupDescription {
            desired_capacity: state.desired,
            instances: state.instances.clone(),
        })
    }

    async fn set_desired_capacity(&self, group: &str, capacity: u32) -> CloudResult<()> {
        self.check_failure()?;
        let mut inner = self.inner.write().expect("state lock");
        let state = inner
            .groups
            .get_mut(group)
            .ok_or_else(|| CloudError::NotFound(format!("autoscaler group {group}")))?;
        state.desired = capacity;
        Ok(())
    }
}

#[async_trait::async_trait]
impl OrchestratorApi for LocalCloud {
    async fn describe_service(
        &self,
        cluster: &str,
        service: &str,
    ) -> CloudResult<ServiceDescription> {
        self.check_failure()?;
        let inner = self.inner.read().expect("state lock");
        let state = inner
            .services
            .get(&(cluster.to_string(), service.to_string()))
            .ok_or_else(|| CloudError::NotFound(format!("service {cluster}/{service}")))?;
        Ok(ServiceDescription {
            desired_count: state.desired,
            running_count: state.running,
        })
    }

    async fn set_desired_count(&self, cluster: &str, service: &str, count: u32) -> CloudResult<()> {
        self.check_failure()?;
        let mut inner = self.inner.write().expect("state lock");
        let state = inner
            .services
            .get_mut(&(cluster.to_string(), service.to_string()))
            .ok_or_else(|| CloudError::NotFound(format!("service {cluster}/{service}")))?;
        state.desired = count;
        Ok(())
    }
}

#[async_trait::async_trait]
impl RoutingApi for LocalCloud {
    async fn path_patterns(&self, rule: &str) -> CloudResult<Vec<String>> {
        self.check_failure()?;
        let inner = self.inner.read().expect("state lock");
        inner
            .rules
            .get(rule)
            .cloned()
            .ok_or_else(|| CloudError::NotFound(format!("routing rule {rule}")))
    }

    async fn set_path_patterns(&self, rule: &str, patterns: &[String]) -> CloudResult<()> {
        self.check_failure()?;
        let mut inner = self.inner.write().expect("state lock");
        let slot = inner
            .rules
            .get_mut(rule)
            .ok_or_else(|| CloudError::NotFound(format!("routing rule {rule}")))?;
        *slot = patterns.to_vec();
        Ok(())
    }
}

#[async_trait::async_trait]
impl RemoteCommandApi for LocalCloud {
    async fn run_command(&self, instance_id: &str, command: &str) -> CloudResult<String> {
        self.check_failure()?;
        let mut inner = self.inner.write().expect("state lock");
        let command_id = format!("cmd-{:06}", inner.next_command);
        inner.next_command += 1;
        inner.sent_commands.push(SentCommand {
            instance_id: instance_id.to_string(),
            command: command.to_string(),
            command_id: command_id.clone(),
        });
        Ok(command_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> (LocalCloud, mpsc::UnboundedReceiver<LifecycleEvent>) {
        let (cloud, rx) = LocalCloud::new();
        cloud.register_group("gpu", 0);
        cloud.register_service("studio", "comfy", "gpu");
        cloud.register_rule("front", &["/", "/admin"]);
        (cloud, rx)
    }

    #[tokio::test]
    async fn step_launches_instance_and_starts_task() {
        let (cloud, mut rx) = seeded();
        cloud.set_desired_capacity("gpu", 1).await.unwrap();
        cloud.set_desired_count("studio", "comfy", 1).await.unwrap();

        cloud.step();

        let group = cloud.describe_group("gpu").await.unwrap();
        assert_eq!(group.instances.len(), 1);
        let svc = cloud.describe_service("studio", "comfy").await.unwrap();
        assert_eq!(svc.running_count, 1);

        let event = rx.try_recv().unwrap();
        assert!(matches!(
            event,
            LifecycleEvent::TaskStateChange {
                status: TaskStatus::Running,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn step_drains_tasks_when_instance_terminates() {
        let (cloud, mut rx) = seeded();
        cloud.set_desired_capacity("gpu", 1).await.unwrap();
        cloud.set_desired_count("studio", "comfy", 1).await.unwrap();
        cloud.step();
        while rx.try_recv().is_ok() {}

        cloud.set_desired_capacity("gpu", 0).await.unwrap();
        cloud.step();

        let svc = cloud.describe_service("studio", "comfy").await.unwrap();
        assert_eq!(svc.running_count, 0);
        // Service desired count is untouched; tasks die with the host.
        assert_eq!(svc.desired_count, 1);

        let mut saw_terminating = false;
        let mut saw_stopped = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                LifecycleEvent::InstanceTerminating { .. } => saw_terminating = true,
                LifecycleEvent::TaskStateChange {
                    status: TaskStatus::Stopped,
                    ..
                } => saw_stopped = true,
                _ => {}
            }
        }
        assert!(saw_terminating);
        assert!(saw_stopped);
    }

    #[tokio::test]
    async fn unknown_names_report_not_found() {
        let (cloud, _rx) = seeded();
        let err = cloud.describe_group("missing").await.unwrap_err();
        assert!(matches!(err, CloudError::NotFound(_)));
        let err = cloud.describe_service("studio", "missing").await.unwrap_err();
        assert!(matches!(err, CloudError::NotFound(_)));
    }

    #[tokio::test]
    async fn injected_failure_poisons_every_call() {
        let (cloud, _rx) = seeded();
        cloud.set_failure(Some("throttled"));
        assert!(matches!(
            cloud.describe_group("gpu").await,
            Err(CloudError::Dependency(_))
        ));
        assert!(matches!(
            cloud.path_patterns("front").await,
            Err(CloudError::Dependency(_))
        ));
        cloud.set_failure(None);
        assert!(cloud.describe_group("gpu").await.is_ok());
    }

    #[tokio::test]
    async fn run_command_records_what_was_sent() {
        let (cloud, _rx) = seeded();
        let id = cloud.run_command("i-000001", "uptime").await.unwrap();
        let sent = cloud.sent_commands();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].command_id, id);
        assert_eq!(sent[0].command, "uptime");
    }
}
