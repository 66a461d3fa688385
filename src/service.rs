use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use tower::Service;
use tracing::info;

use crate::config::ScraperConfig;
use crate::error::ScraperError;
use crate::gate::{AlwaysReady, ConsoleSignal};
use crate::runner::{RunReport, Runner};
use crate::traits::OperatorSignal;

/// 実行リクエスト
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub config: ScraperConfig,
    /// true ならコンソールでオペレーターの設定完了を待つ
    pub interactive: bool,
}

impl RunRequest {
    pub fn new(input_path: impl Into<PathBuf>) -> Self {
        Self::from_config(ScraperConfig::new(input_path))
    }

    pub fn from_config(config: ScraperConfig) -> Self {
        Self {
            config,
            interactive: true,
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config = self.config.with_output_dir(dir);
        self
    }

    pub fn with_browser_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config = self.config.with_browser_path(path);
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.config = self.config.with_headless(headless);
        self
    }

    pub fn with_interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }
}

impl From<RunRequest> for ScraperConfig {
    fn from(req: RunRequest) -> Self {
        req.config
    }
}

/// tower::Serviceを実装した実行サービス
#[derive(Debug, Clone, Default)]
pub struct RunService {}

impl RunService {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Service<RunRequest> for RunService {
    type Response = RunReport;
    type Error = ScraperError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: RunRequest) -> Self::Future {
        info!("Run request received: input={:?}", req.config.input_path);

        Box::pin(async move {
            let signal: Arc<dyn OperatorSignal> = if req.interactive {
                Arc::new(ConsoleSignal)
            } else {
                Arc::new(AlwaysReady)
            };
            let runner = Runner::new(req.into());

            let report = runner.run(signal.as_ref()).await?;

            info!(
                "Run finished: export={:?}, rows={}",
                report.export_path,
                report.articles.len()
            );

            Ok(report)
        })
    }
}
