//! Serve mode — wires the provider, control plane, listeners, and admin
//! surface together.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::info;

use coldgate_admin::{AdminState, SignoutConfig, admin_router};
use coldgate_cloud::LocalCloud;
use coldgate_core::{ControlPlane, NOT_READY_PATTERNS, WorkloadRefs};
use coldgate_events::{Listeners, LogNotifier, run_pump};

use crate::settings::Settings;

pub async fn run(port: u16, op_timeout: u64, step_interval: u64) -> anyhow::Result<()> {
    let settings = Settings::from_env()?;
    info!(
        group = %settings.group,
        cluster = %settings.cluster,
        service = %settings.service,
        rule = %settings.rule,
        "coldgated starting"
    );

    // ── Provider (local mode) ────────────────────────────────────
    // The workload starts parked: capacity 0, routing held at the
    // landing page.
    let (cloud, events) = LocalCloud::new();
    cloud.register_group(&settings.group, 0);
    cloud.register_service(&settings.cluster, &settings.service, &settings.group);
    cloud.register_rule(&settings.rule, NOT_READY_PATTERNS);

    // ── Control plane ────────────────────────────────────────────
    let shared = Arc::new(cloud.clone());
    let plane = Arc::new(ControlPlane::new(
        shared.clone(),
        shared.clone(),
        shared.clone(),
        shared,
        WorkloadRefs {
            group: settings.group.clone(),
            cluster: settings.cluster.clone(),
            service: settings.service.clone(),
            rule: settings.rule.clone(),
        },
    ));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    // ── Event pump ───────────────────────────────────────────────
    let listeners = Listeners::new(plane.clone(), Arc::new(LogNotifier));
    let pump = tokio::spawn(run_pump(events, listeners, shutdown_rx.clone()));

    // ── Convergence loop ─────────────────────────────────────────
    // Plays the role of the real autoscaler/orchestrator control loops.
    let step_cloud = cloud.clone();
    let mut step_shutdown = shutdown_rx;
    let stepper = tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(step_interval.max(1)));
        loop {
            tokio::select! {
                _ = ticker.tick() => step_cloud.step(),
                _ = step_shutdown.changed() => break,
            }
        }
    });

    // ── Admin surface ────────────────────────────────────────────
    let state = AdminState {
        plane,
        op_timeout: Duration::from_secs(op_timeout),
        signout: SignoutConfig {
            redirect_url: settings.logout_url.clone(),
            cookies: settings.session_cookies.clone(),
        },
        app_name: settings.app_name.clone(),
    };
    let router = admin_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "admin surface listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await?;

    let _ = shutdown_tx.send(true);
    let _ = pump.await;
    let _ = stepper.await;
    info!("coldgated stopped");
    Ok(())
}
