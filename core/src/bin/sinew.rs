/// Sinew CLI
///
/// Runs sample skeleton programs and prints the effective configuration.
use sinew_core::cli;

#[tokio::main]
async fn main() {
    if let Err(e) = cli::run_cli().await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
