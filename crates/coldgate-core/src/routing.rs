//! Route flip controller for the front-door routing rule.
//!
//! The rule's matched path patterns decide whether root traffic reaches
//! the workload or is held at the admin/landing page. Both flips are
//! full-replacement writes of a literal pattern set, so they are
//! idempotent and safe under at-least-once event delivery.

use std::sync::Arc;

use tracing::info;

use coldgate_cloud::{CloudResult, RoutingApi};

/// Patterns when the workload is ready: only the admin path is
/// intercepted, root traffic flows to the application.
pub const READY_PATTERNS: &[&str] = &["/admin"];

/// Patterns while the workload is not ready: root traffic is held at the
/// landing page too.
pub const NOT_READY_PATTERNS: &[&str] = &["/", "/admin"];

/// Flips one routing rule between the ready and not-ready pattern sets.
#[derive(Clone)]
pub struct RouteFlip {
    routing: Arc<dyn RoutingApi>,
    rule: String,
}

impl RouteFlip {
    pub fn new(routing: Arc<dyn RoutingApi>, rule: impl Into<String>) -> Self {
        Self {
            routing,
            rule: rule.into(),
        }
    }

    /// Root traffic flows to the application.
    pub async fn set_ready(&self) -> CloudResult<()> {
        self.replace(READY_PATTERNS).await
    }

    /// Root traffic is intercepted to the landing page.
    pub async fn set_not_ready(&self) -> CloudResult<()> {
        self.replace(NOT_READY_PATTERNS).await
    }

    async fn replace(&self, patterns: &[&str]) -> CloudResult<()> {
        let patterns: Vec<String> = patterns.iter().map(|p| p.to_string()).collect();
        self.routing.set_path_patterns(&self.rule, &patterns).await?;
        info!(rule = %self.rule, ?patterns, "routing rule updated");
        Ok(())
    }
}
