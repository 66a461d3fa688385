use std::process::ExitCode;

use chausson_scraper::{RunRequest, RunService, ScraperConfig};
use tower::Service;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // ログ設定（RUST_LOG で上書き可）
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,chausson_scraper=info")),
        )
        .init();

    let config = ScraperConfig::from_env();
    let request = RunRequest::from_config(config).with_interactive(true);
    let mut service = RunService::new();

    let code = match service.call(request).await {
        Ok(report) => {
            info!(
                "{} scraped, {} invalid, {} failed",
                report.scraped, report.invalid, report.failed
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Run failed: {}", e);
            println!("\nAn unexpected error occurred: {}\n", e);
            ExitCode::FAILURE
        }
    };

    println!("\nScraper finished and browser closed.");
    code
}
