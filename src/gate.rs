//! オペレーターによる手動設定の待機

use std::io::{BufRead, Write};

use async_trait::async_trait;
use tracing::info;

use crate::error::ScraperError;
use crate::traits::{OperatorSignal, PageDriver};

const SETUP_PROMPT: &str = "\n******* Please configure the site (select the appropriate store, \
display prices excluding tax). Press Enter to start scraping when ready\n >>>";

/// 標準入力で1行待つ
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSignal;

#[async_trait]
impl OperatorSignal for ConsoleSignal {
    async fn wait_ready(&self) -> Result<(), ScraperError> {
        tokio::task::spawn_blocking(|| {
            let mut stdout = std::io::stdout();
            write!(stdout, "{}", SETUP_PROMPT)?;
            stdout.flush()?;

            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line)?;
            Ok::<_, std::io::Error>(())
        })
        .await
        .map_err(|e| ScraperError::Operator(e.to_string()))?
        .map_err(|e| ScraperError::Operator(e.to_string()))
    }
}

/// 即座に準備完了（ヘッドレス実行・テスト用）
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysReady;

#[async_trait]
impl OperatorSignal for AlwaysReady {
    async fn wait_ready(&self) -> Result<(), ScraperError> {
        Ok(())
    }
}

/// トップページを開き、オペレーターが店舗・税表示を設定するまで待つ
pub async fn await_operator_setup(
    page: &dyn PageDriver,
    landing_url: &str,
    signal: &dyn OperatorSignal,
) -> Result<(), ScraperError> {
    page.goto(landing_url).await?;
    info!("Waiting for operator setup on {}", landing_url);

    signal.wait_ready().await?;

    println!("{}", "-".repeat(100));
    info!("Operator setup done");
    Ok(())
}
