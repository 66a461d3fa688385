//! Chausson 商品価格スクレイパー
//!
//! - 入力CSVの商品ページをブラウザで1件ずつ開き、価格・商品名・単位などを取得
//! - 商品ごとにスクリーンショットを保存し、結果をExcelに出力
//!
//! # 使用例
//!
//! ```rust,ignore
//! use chausson_scraper::{RunRequest, RunService};
//! use tower::Service;
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut service = RunService::new();
//!
//!     let request = RunRequest::new("input/input.csv")
//!         .with_output_dir("./output")
//!         .with_browser_path("./chromedriver/chrome");
//!
//!     let report = service.call(request).await.unwrap();
//!     println!("Excel: {:?}", report.export_path);
//! }
//! ```

pub mod browser;
pub mod chausson;
pub mod config;
pub mod error;
pub mod gate;
pub mod input;
pub mod output;
pub mod runner;
pub mod service;
pub mod traits;
pub mod wait;

#[cfg(test)]
pub(crate) mod testing;

// 主要な型をリエクスポート
pub use browser::{BrowserSession, ChromePage};
pub use chausson::{ArticleRecord, ArticleScraper, ProductInfo, ScrapeResult};
pub use config::ScraperConfig;
pub use error::ScraperError;
pub use gate::{await_operator_setup, AlwaysReady, ConsoleSignal};
pub use input::{column_names, load_articles};
pub use output::{capture_screenshot, export_results, screenshot_file_name, OutputFolder};
pub use runner::{
    progress_line, scrape_all, scrape_all_with_progress, BatchOutcome, RunReport, Runner,
};
pub use service::{RunRequest, RunService};
pub use traits::{OperatorSignal, PageDriver, WaitStrategy};
pub use wait::{FixedDelay, StableDom};
