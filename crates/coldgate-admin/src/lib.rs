//! coldgate-admin — the operator-facing HTTP surface.
//!
//! Served behind the externally-provisioned authenticated front door;
//! every handler here assumes authentication already happened upstream.
//!
//! # Routes
//!
//! | Route | Handler |
//! |---|---|
//! | `/admin` | Status page with contextual controls |
//! | `/admin/scaleup` | Scale-up trigger, 302 to `/` |
//! | `/admin/shutdown` | Scale-down trigger, 302 to `/` |
//! | `/admin/restart` | Restart trigger, 302 to `/` |
//! | `/signout` | Session-cookie expiry, 302 to the IdP logout URL |
//!
//! Dependency failures never surface as HTTP errors: the status page
//! renders a generic message with a 200, and the trigger endpoints
//! redirect regardless — the operator discovers failures by revisiting
//! `/admin`.

pub mod actions;
pub mod pages;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::routing::get;

use coldgate_core::ControlPlane;

/// Session/signout wiring for the front door's identity provider.
#[derive(Clone)]
pub struct SignoutConfig {
    /// Where to send the browser after clearing the session.
    pub redirect_url: String,
    /// Front-door session cookie names to expire. The front door splits
    /// the session across numbered cookie slots, hence a list.
    pub cookies: Vec<String>,
}

/// Shared state for admin handlers.
#[derive(Clone)]
pub struct AdminState {
    pub plane: Arc<ControlPlane>,
    /// Deadline applied to each provider round-trip.
    pub op_timeout: Duration,
    pub signout: SignoutConfig,
    /// Display name of the hosted workload, e.g. "ComfyUI".
    pub app_name: String,
}

/// Build the admin router.
pub fn admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/admin", get(pages::admin_page))
        .route("/admin/scaleup", get(actions::scale_up))
        .route("/admin/shutdown", get(actions::shut_down))
        .route("/admin/restart", get(actions::restart))
        .route("/signout", get(actions::signout))
        .with_state(state)
}
