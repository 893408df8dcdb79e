use clap::Parser;
use project_planner::planner::{cli::Args, run_workflow};
use project_planner_sdk::log_error;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let default_filter = if args.debug { "project_planner=debug" } else { "warn" };
    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    tokio::select! {
        result = run_workflow(args) => result,
        _ = tokio::signal::ctrl_c() => {
            log_error!("Interrupted, no plan written");
            std::process::exit(130);
        }
    }
}
