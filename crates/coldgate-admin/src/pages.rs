//! The admin status page.
//!
//! Always renders with HTTP 200, even when the provider is unreachable:
//! the operator gets a page with a message, never a bare error code.

use askama::Template;
use axum::extract::State;
use axum::response::Html;
use tracing::error;

use coldgate_cloud::with_timeout;
use coldgate_core::WorkloadState;

use crate::AdminState;

fn render<T: Template>(tmpl: T) -> Html<String> {
    Html(
        tmpl.render()
            .unwrap_or_else(|e| format!("<pre>Template error: {e}</pre>")),
    )
}

#[derive(Template)]
#[template(path = "admin.html")]
struct AdminTemplate {
    app_name: String,
    status_message: String,
    show_restart_shutdown: bool,
    show_scaleup: bool,
    show_loader: bool,
}

impl AdminTemplate {
    fn status_only(app_name: &str, message: String) -> Self {
        Self {
            app_name: app_name.to_string(),
            status_message: message,
            show_restart_shutdown: false,
            show_scaleup: false,
            show_loader: false,
        }
    }
}

pub async fn admin_page(State(state): State<AdminState>) -> Html<String> {
    let app = &state.app_name;
    let tmpl = match with_timeout(state.op_timeout, state.plane.inspect()).await {
        Ok(snapshot) => match snapshot.state() {
            WorkloadState::Running => AdminTemplate {
                app_name: app.clone(),
                status_message: String::new(),
                show_restart_shutdown: true,
                show_scaleup: false,
                show_loader: false,
            },
            WorkloadState::ScalingUp => AdminTemplate {
                show_loader: true,
                ..AdminTemplate::status_only(
                    app,
                    format!("{app} is currently scaling up. It may take 5-10 minutes."),
                )
            },
            WorkloadState::ScalingDown => {
                AdminTemplate::status_only(app, format!("{app} is currently scaling down."))
            }
            WorkloadState::Stopped => AdminTemplate {
                app_name: app.clone(),
                status_message: String::new(),
                show_restart_shutdown: false,
                show_scaleup: true,
                show_loader: false,
            },
            WorkloadState::Unexpected => {
                AdminTemplate::status_only(app, format!("{app} is in an unexpected state."))
            }
        },
        Err(e) => {
            error!(error = %e, "unable to inspect capacity for admin page");
            AdminTemplate::status_only(app, format!("Unable to determine the status of {app}."))
        }
    };
    render(tmpl)
}
