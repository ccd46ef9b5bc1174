//! coldgated — the Coldgate daemon.
//!
//! Single binary that assembles the control plane: provider, admin HTTP
//! surface, lifecycle-event pump, and (in local mode) the in-process
//! convergence loop standing in for the real autoscaler/orchestrator.
//!
//! # Usage
//!
//! ```text
//! COLDGATE_ASG_NAME=gpu-asg COLDGATE_CLUSTER_NAME=studio \
//! COLDGATE_SERVICE_NAME=comfy COLDGATE_RULE_ID=front \
//! COLDGATE_LOGOUT_URL=https://idp.example.com/logout \
//! coldgated serve --port 8080
//! ```

mod serve;
mod settings;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "coldgated", about = "Coldgate scale-to-zero control plane")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the admin surface and run the event listeners.
    Serve {
        /// Port to listen on.
        #[arg(long, default_value = "8080")]
        port: u16,

        /// Per-operation provider deadline in seconds.
        #[arg(long, default_value = "30")]
        op_timeout: u64,

        /// Local-provider convergence interval in seconds.
        #[arg(long, default_value = "5")]
        step_interval: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| {
                    "info,coldgated=debug,coldgate_core=debug,coldgate_events=debug"
                        .parse()
                        .unwrap()
                }),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            op_timeout,
            step_interval,
        } => serve::run(port, op_timeout, step_interval).await,
    }
}
