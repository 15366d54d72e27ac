use clap::Parser;

use mortgage_sim::api::{Cli, run};
use mortgage_sim::telemetry::init_tracing;

#[tokio::main]
async fn main() {
    init_tracing();
    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        tracing::error!(error = %e, "mortgage-sim failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
